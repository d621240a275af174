//! 로컬 개발용 고정 응답 프로바이더 (`AI_MOCK=true`)

use async_trait::async_trait;
use serde_json::json;

use super::{ApiError, CompletionOutput, CompletionProvider, CompletionRequest};

#[derive(Debug, Clone, Default)]
pub struct MockCompletionProvider;

#[async_trait]
impl CompletionProvider for MockCompletionProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionOutput, ApiError> {
        tracing::debug!(model = %request.model, "Returning mock completion");

        let content = json!({
            "flashcards": [
                {
                    "front": "What is the capital of France?",
                    "back": "Paris is the capital of France"
                },
                {
                    "front": "What is the largest planet in our solar system?",
                    "back": "Jupiter is the largest planet in our solar system"
                },
                {
                    "front": "Who wrote 'Romeo and Juliet'?",
                    "back": "William Shakespeare wrote 'Romeo and Juliet'"
                }
            ]
        });

        Ok(CompletionOutput {
            content: content.to_string(),
            total_tokens: 0,
        })
    }
}
