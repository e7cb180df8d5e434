//! Database row types: these map directly to SQLite rows.
//! Distinct from mygram-types API models to keep the DB layer independent.

use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: String,
    pub username: String,
    pub email: String,
    /// Argon2 PHC string.
    pub password: String,
    pub age: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct PhotoRow {
    pub id: String,
    pub title: String,
    pub photo_url: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CommentRow {
    pub id: String,
    pub message: String,
    pub user_id: String,
    pub photo_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct SocialMediaRow {
    pub id: String,
    pub name: String,
    pub social_media_url: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// -- Writes --

pub struct NewUser<'a> {
    pub id: &'a str,
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub age: i64,
}

/// Partial overwrite of a photo. `None` leaves the column untouched.
#[derive(Debug, Default)]
pub struct PhotoChanges {
    pub title: Option<String>,
    pub photo_url: Option<String>,
}

#[derive(Debug, Default)]
pub struct CommentChanges {
    pub message: Option<String>,
}

#[derive(Debug, Default)]
pub struct SocialMediaChanges {
    pub name: Option<String>,
    pub social_media_url: Option<String>,
}
