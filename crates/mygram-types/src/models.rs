use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Public view of a user. The password hash never leaves the store layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub age: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Photo {
    pub photo_id: String,
    pub title: String,
    pub photo_url: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A photo together with the comments attached to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoDetail {
    #[serde(flatten)]
    pub photo: Photo,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub comment_id: String,
    pub message: String,
    pub user_id: String,
    pub photo_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialMedia {
    pub social_id: String,
    pub name: String,
    pub social_media_url: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
