use serde::{Deserialize, Serialize};

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user_id: i64,
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user_id: i64,
    pub username: String,
    pub token: String,
}

// -- Messages --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SendMessageRequest {
    pub inscription: String,
}

/// Confirmation payload returned after a successful submission. Field names
/// and the `dateOfDispatch` format (`dd.MM.yyyy HH:mm:ss`) are consumed by
/// existing clients verbatim — do not rename or reformat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchReceipt {
    pub avatar: String,
    #[serde(rename = "dateOfDispatch")]
    pub date_of_dispatch: String,
    #[serde(rename = "userName")]
    pub user_name: String,
    pub userid: i64,
    pub inscription: String,
}

#[derive(Debug, Serialize)]
pub struct MessageView {
    pub id: i64,
    pub author_id: i64,
    pub author_username: String,
    pub author_avatar: String,
    pub inscription: String,
    pub date_of_dispatch: String,
}

// -- Errors --

/// Failure payloads carry exactly one human-readable `error` field.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
