use serde::{Deserialize, Serialize};

// -- Envelope --

/// Body of every successful response.
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub code: u16,
    pub message: String,
    pub data: T,
}

/// Body of every failed response.
#[derive(Debug, Serialize, Deserialize)]
pub struct FailureEnvelope {
    pub code: u16,
    pub message: String,
    pub error: ErrorDetail,
}

/// A single message, or one message per violated validation rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorDetail {
    Message(String),
    Fields(Vec<String>),
}

// -- JWT Claims --

/// Claims carried by every access token. Canonical definition lives here so
/// the token service and the auth middleware agree on the format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

// Request payloads default missing fields so that the validation layer, not
// the JSON parser, reports them.

// -- Users --

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub age: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

// -- Photos --

/// Used for both create and update.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PhotoRequest {
    pub title: String,
    pub photo_url: String,
}

// -- Comments --

#[derive(Debug, Default, Deserialize)]
#[serde(from = "CommentPayload")]
pub struct CommentRequest {
    pub message: String,
}

/// Older clients send the text as `comment`. `message` wins when both are set.
#[derive(Default, Deserialize)]
#[serde(default)]
struct CommentPayload {
    message: Option<String>,
    comment: Option<String>,
}

impl From<CommentPayload> for CommentRequest {
    fn from(payload: CommentPayload) -> Self {
        Self {
            message: payload.message.or(payload.comment).unwrap_or_default(),
        }
    }
}

// -- Social media --

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SocialMediaRequest {
    pub name: String,
    pub social_media_url: String,
}

// -- Home --

#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub name: String,
    pub version: String,
    pub about: String,
}
