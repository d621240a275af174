//! 플래시카드 CRUD, 목록 조회, 검토 후 저장 흐름의 HTTP 수준 테스트

mod common;

use axum::http::{Method, StatusCode};
use common::{call, register, source_text};
use flashdeck::models::{FlashcardSource, InitiateGenerationResponse};
use flashdeck::services::{FlashcardGateway, ReviewSession};
use serde_json::{json, Value};

async fn create(app: &axum::Router, token: &str, cards: Value) -> (StatusCode, Value) {
    call(app, Method::POST, "/api/v1/flashcards", Some(token), Some(json!({ "flashcards": cards }))).await
}

async fn generate(app: &axum::Router, token: &str) -> InitiateGenerationResponse {
    let (status, json) = call(
        app,
        Method::POST,
        "/api/v1/generations",
        Some(token),
        Some(json!({ "source_text": source_text(1500) })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    serde_json::from_value(json).unwrap()
}

async fn user_id(app: &axum::Router, token: &str) -> String {
    let (_, me) = call(app, Method::GET, "/api/v1/auth/me", Some(token), None).await;
    me["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn filter_matches_front_or_back_case_insensitively() {
    let (app, _pool) = common::build_test_app().await;
    let token = register(&app, "cats@example.com").await;

    let cards = json!([
        { "front": "What is a CAT?", "back": "A small feline", "source": "manual", "generation_id": null },
        { "front": "Dog", "back": "Loves to chase the cat", "source": "manual", "generation_id": null },
        { "front": "Fish", "back": "Swims", "source": "manual", "generation_id": null },
        { "front": "Catalog", "back": "A list", "source": "manual", "generation_id": null },
        { "front": "Bird", "back": "Flies", "source": "manual", "generation_id": null },
    ]);
    let (status, _) = create(&app, &token, cards).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, json) = call(
        &app,
        Method::GET,
        "/api/v1/flashcards?filter=cat&limit=2&page=1&sort=front&order=asc",
        Some(&token),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["pagination"]["total"], 3);
    assert_eq!(json["pagination"]["limit"], 2);
    let fronts: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["front"].as_str().unwrap())
        .collect();
    assert_eq!(fronts, ["Catalog", "Dog"]);

    let (_, page2) = call(
        &app,
        Method::GET,
        "/api/v1/flashcards?filter=cat&limit=2&page=2&sort=front&order=asc",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(page2["pagination"]["total"], 3);
    assert_eq!(page2["data"][0]["front"], "What is a CAT?");
}

#[tokio::test]
async fn list_defaults_and_rejects_bad_limit() {
    let (app, _pool) = common::build_test_app().await;
    let token = register(&app, "defaults@example.com").await;

    let (status, json) = call(&app, Method::GET, "/api/v1/flashcards", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["pagination"], json!({ "page": 1, "limit": 10, "total": 0 }));

    let (status, _) = call(&app, Method::GET, "/api/v1/flashcards?limit=500", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn cross_user_generation_rejects_entire_batch() {
    let (app, pool) = common::build_test_app().await;
    let alice = register(&app, "alice@example.com").await;
    let bob = register(&app, "bob@example.com").await;
    let bobs_generation = generate(&app, &bob).await.generation_id;

    let (status, json) = create(
        &app,
        &alice,
        json!([
            { "front": "Mine", "back": "Manual", "source": "manual", "generation_id": null },
            { "front": "Stolen", "back": "Card", "source": "ai-complete", "generation_id": bobs_generation },
        ]),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["error"]["code"], "unauthorized_generation_access");

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM flashcards")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(rows, 0);

    let (_, logs) = call(&app, Method::GET, "/api/v1/generation-logs", Some(&alice), None).await;
    assert_eq!(logs[0]["error_code"], "UNAUTHORIZED_GENERATION_ACCESS");
}

#[tokio::test]
async fn invalid_cards_are_422() {
    let (app, _pool) = common::build_test_app().await;
    let token = register(&app, "invalid@example.com").await;

    for card in [
        json!({ "front": "", "back": "x", "source": "manual", "generation_id": null }),
        json!({ "front": "x".repeat(201), "back": "x", "source": "manual", "generation_id": null }),
        json!({ "front": "x", "back": "x".repeat(501), "source": "manual", "generation_id": null }),
        json!({ "front": "x", "back": "x", "source": "ai-complete", "generation_id": null }),
    ] {
        let (status, _) = create(&app, &token, json!([card])).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    let (status, _) = create(&app, &token, json!([])).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn crud_round_trip_is_owner_scoped() {
    let (app, _pool) = common::build_test_app().await;
    let alice = register(&app, "owner@example.com").await;
    let bob = register(&app, "intruder@example.com").await;

    let (_, created) = create(
        &app,
        &alice,
        json!([{ "front": "Q", "back": "A", "source": "manual", "generation_id": null }]),
    )
    .await;
    let id = created["data"][0]["id"].as_str().unwrap().to_string();
    let uri = format!("/api/v1/flashcards/{id}");

    let (status, _) = call(&app, Method::GET, &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = call(&app, Method::DELETE, &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, updated) = call(&app, Method::PUT, &uri, Some(&alice), Some(json!({ "back": "Answer" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["front"], "Q");
    assert_eq!(updated["back"], "Answer");

    let (status, _) = call(&app, Method::PUT, &uri, Some(&alice), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(&app, Method::DELETE, &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = call(&app, Method::GET, &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn edited_proposal_is_saved_with_edited_text() {
    let (app, pool) = common::build_test_app().await;
    let token = register(&app, "review@example.com").await;
    let owner = user_id(&app, &token).await;
    let generation = generate(&app, &token).await;
    let generation_id = generation.generation_id.clone();

    let mut session = ReviewSession::from_generation(generation);
    let ids: Vec<String> = session.proposals().iter().map(|p| p.id.clone()).collect();
    session.accept(&ids[0]).unwrap();
    session.edit(&ids[1], "Edited front", "Edited back").unwrap();
    session.reject(&ids[2]).unwrap();

    let gateway = FlashcardGateway::new(pool);
    let saved = session.save_approved(&gateway, &owner).await.unwrap();
    assert_eq!(saved.len(), 2);
    assert!(session.proposals().is_empty());

    let (_, json) = call(
        &app,
        Method::GET,
        "/api/v1/flashcards?source=ai-with-updates",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(json["pagination"]["total"], 1);
    assert_eq!(json["data"][0]["front"], "Edited front");
    assert_eq!(json["data"][0]["back"], "Edited back");
    assert_eq!(json["data"][0]["generation_id"], generation_id.as_str());

    let (_, json) = call(
        &app,
        Method::GET,
        "/api/v1/flashcards?has_generation=true",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(json["pagination"]["total"], 2);
    assert!(json["data"]
        .as_array()
        .unwrap()
        .iter()
        .any(|c| c["source"] == FlashcardSource::AiComplete.as_str()));
}
