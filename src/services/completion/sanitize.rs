//! 로그 컨텍스트에서 민감한 값을 가립니다.
//!
//! 키 이름만 봅니다. 값의 내용은 검사하지 않습니다.

use serde_json::{Map, Value};

pub const REDACTED: &str = "[REDACTED]";

const SENSITIVE_KEYS: &[&str] = &[
    "apikey",
    "api_key",
    "authorization",
    "password",
    "token",
    "email",
    "user",
    "userdata",
    "auth",
    "credentials",
    "userid",
    "user_id",
    "refreshtoken",
    "accesstoken",
];

pub fn is_sensitive_key(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    SENSITIVE_KEYS.contains(&key.as_str()) || key.contains("password") || key.contains("token")
}

/// 객체 안의 민감한 키를 재귀적으로 `[REDACTED]`로 바꾼 사본을 돌려줍니다.
pub fn sanitize(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| {
                    let v = if is_sensitive_key(k) {
                        Value::String(REDACTED.to_string())
                    } else {
                        sanitize(v)
                    };
                    (k.clone(), v)
                })
                .collect::<Map<_, _>>(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(sanitize).collect()),
        other => other.clone(),
    }
}
