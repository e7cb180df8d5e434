use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::debug;

use crate::models::{
    CommentChanges, CommentRow, NewUser, PhotoChanges, PhotoRow, SocialMediaChanges,
    SocialMediaRow, UserRow,
};
use crate::{Database, DbError, Result};

const USER_COLUMNS: &str = "id, username, email, password, age, created_at, updated_at";
const PHOTO_COLUMNS: &str = "id, title, photo_url, user_id, created_at, updated_at";
const COMMENT_COLUMNS: &str = "id, message, user_id, photo_id, created_at, updated_at";
const SOCIAL_COLUMNS: &str = "id, name, social_media_url, user_id, created_at, updated_at";

impl Database {
    // -- Users --

    /// Insert a user. Duplicate username or email surfaces as `DbError::Conflict`.
    pub fn create_user(&self, user: &NewUser<'_>) -> Result<UserRow> {
        let now = Utc::now();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, username, email, password, age, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
                params![user.id, user.username, user.email, user.password_hash, user.age, now],
            )
            .map_err(|e| match DbError::from(e) {
                DbError::Conflict(msg) if msg.contains("users.email") => {
                    DbError::Conflict("email already registered".to_string())
                }
                DbError::Conflict(msg) if msg.contains("users.username") => {
                    DbError::Conflict("username already taken".to_string())
                }
                other => other,
            })?;

            Ok(UserRow {
                id: user.id.to_string(),
                username: user.username.to_string(),
                email: user.email.to_string(),
                password: user.password_hash.to_string(),
                age: user.age,
                created_at: now,
                updated_at: now,
            })
        })
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id", id))
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "email", email))
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "username", username))
    }

    pub fn list_users(&self) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], user_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Photos --

    pub fn create_photo(
        &self,
        id: &str,
        user_id: &str,
        title: &str,
        photo_url: &str,
    ) -> Result<PhotoRow> {
        let now = Utc::now();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO photos (id, title, photo_url, user_id, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
                params![id, title, photo_url, user_id, now],
            )?;

            Ok(PhotoRow {
                id: id.to_string(),
                title: title.to_string(),
                photo_url: photo_url.to_string(),
                user_id: user_id.to_string(),
                created_at: now,
                updated_at: now,
            })
        })
    }

    pub fn get_photo(&self, id: &str) -> Result<Option<PhotoRow>> {
        self.with_conn(|conn| query_photo(conn, id))
    }

    pub fn list_photos(&self) -> Result<Vec<PhotoRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {PHOTO_COLUMNS} FROM photos ORDER BY created_at");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], photo_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn update_photo(&self, id: &str, changes: &PhotoChanges) -> Result<PhotoRow> {
        let now = Utc::now();
        self.with_conn(|conn| {
            let updated = conn.execute(
                "UPDATE photos
                 SET title = COALESCE(?2, title),
                     photo_url = COALESCE(?3, photo_url),
                     updated_at = ?4
                 WHERE id = ?1",
                params![id, changes.title, changes.photo_url, now],
            )?;
            if updated == 0 {
                return Err(DbError::NotFound);
            }
            query_photo(conn, id)?.ok_or(DbError::NotFound)
        })
    }

    /// Delete a photo and every comment attached to it in one transaction.
    /// Returns the number of comments removed.
    pub fn delete_photo(&self, id: &str) -> Result<usize> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let comments = tx.execute("DELETE FROM comments WHERE photo_id = ?1", [id])?;
            let photos = tx.execute("DELETE FROM photos WHERE id = ?1", [id])?;
            if photos == 0 {
                // dropping the transaction rolls it back
                return Err(DbError::NotFound);
            }
            tx.commit()?;

            debug!("Deleted photo {} with {} comments", id, comments);
            Ok(comments)
        })
    }

    // -- Comments --

    pub fn create_comment(
        &self,
        id: &str,
        user_id: &str,
        photo_id: &str,
        message: &str,
    ) -> Result<CommentRow> {
        let now = Utc::now();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO comments (id, message, user_id, photo_id, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
                params![id, message, user_id, photo_id, now],
            )?;

            Ok(CommentRow {
                id: id.to_string(),
                message: message.to_string(),
                user_id: user_id.to_string(),
                photo_id: photo_id.to_string(),
                created_at: now,
                updated_at: now,
            })
        })
    }

    pub fn get_comment(&self, id: &str) -> Result<Option<CommentRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE id = ?1");
            Ok(conn.query_row(&sql, [id], comment_from_row).optional()?)
        })
    }

    pub fn list_comments(&self) -> Result<Vec<CommentRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {COMMENT_COLUMNS} FROM comments ORDER BY created_at");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], comment_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn find_comments_by_photo(&self, photo_id: &str) -> Result<Vec<CommentRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {COMMENT_COLUMNS} FROM comments WHERE photo_id = ?1 ORDER BY created_at"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([photo_id], comment_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn update_comment(&self, id: &str, changes: &CommentChanges) -> Result<CommentRow> {
        let now = Utc::now();
        self.with_conn(|conn| {
            let updated = conn.execute(
                "UPDATE comments SET message = COALESCE(?2, message), updated_at = ?3 WHERE id = ?1",
                params![id, changes.message, now],
            )?;
            if updated == 0 {
                return Err(DbError::NotFound);
            }
            let sql = format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE id = ?1");
            conn.query_row(&sql, [id], comment_from_row)
                .optional()?
                .ok_or(DbError::NotFound)
        })
    }

    pub fn delete_comment(&self, id: &str) -> Result<()> {
        self.with_conn(|conn| {
            let deleted = conn.execute("DELETE FROM comments WHERE id = ?1", [id])?;
            if deleted == 0 {
                return Err(DbError::NotFound);
            }
            Ok(())
        })
    }

    // -- Social media --

    pub fn create_social_media(
        &self,
        id: &str,
        user_id: &str,
        name: &str,
        social_media_url: &str,
    ) -> Result<SocialMediaRow> {
        let now = Utc::now();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO social_media (id, name, social_media_url, user_id, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
                params![id, name, social_media_url, user_id, now],
            )?;

            Ok(SocialMediaRow {
                id: id.to_string(),
                name: name.to_string(),
                social_media_url: social_media_url.to_string(),
                user_id: user_id.to_string(),
                created_at: now,
                updated_at: now,
            })
        })
    }

    pub fn get_social_media(&self, id: &str) -> Result<Option<SocialMediaRow>> {
        self.with_conn(|conn| query_social_media(conn, id))
    }

    pub fn list_social_media(&self) -> Result<Vec<SocialMediaRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {SOCIAL_COLUMNS} FROM social_media ORDER BY created_at");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], social_media_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn update_social_media(
        &self,
        id: &str,
        changes: &SocialMediaChanges,
    ) -> Result<SocialMediaRow> {
        let now = Utc::now();
        self.with_conn(|conn| {
            let updated = conn.execute(
                "UPDATE social_media
                 SET name = COALESCE(?2, name),
                     social_media_url = COALESCE(?3, social_media_url),
                     updated_at = ?4
                 WHERE id = ?1",
                params![id, changes.name, changes.social_media_url, now],
            )?;
            if updated == 0 {
                return Err(DbError::NotFound);
            }
            query_social_media(conn, id)?.ok_or(DbError::NotFound)
        })
    }

    pub fn delete_social_media(&self, id: &str) -> Result<()> {
        self.with_conn(|conn| {
            let deleted = conn.execute("DELETE FROM social_media WHERE id = ?1", [id])?;
            if deleted == 0 {
                return Err(DbError::NotFound);
            }
            Ok(())
        })
    }
}

// `column` is always one of the fixed names passed in by `Database`.
fn query_user(conn: &Connection, column: &str, value: &str) -> Result<Option<UserRow>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = ?1");
    Ok(conn.query_row(&sql, [value], user_from_row).optional()?)
}

fn query_photo(conn: &Connection, id: &str) -> Result<Option<PhotoRow>> {
    let sql = format!("SELECT {PHOTO_COLUMNS} FROM photos WHERE id = ?1");
    Ok(conn.query_row(&sql, [id], photo_from_row).optional()?)
}

fn query_social_media(conn: &Connection, id: &str) -> Result<Option<SocialMediaRow>> {
    let sql = format!("SELECT {SOCIAL_COLUMNS} FROM social_media WHERE id = ?1");
    Ok(conn.query_row(&sql, [id], social_media_from_row).optional()?)
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password: row.get(3)?,
        age: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

fn photo_from_row(row: &Row<'_>) -> rusqlite::Result<PhotoRow> {
    Ok(PhotoRow {
        id: row.get(0)?,
        title: row.get(1)?,
        photo_url: row.get(2)?,
        user_id: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

fn comment_from_row(row: &Row<'_>) -> rusqlite::Result<CommentRow> {
    Ok(CommentRow {
        id: row.get(0)?,
        message: row.get(1)?,
        user_id: row.get(2)?,
        photo_id: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

fn social_media_from_row(row: &Row<'_>) -> rusqlite::Result<SocialMediaRow> {
    Ok(SocialMediaRow {
        id: row.get(0)?,
        name: row.get(1)?,
        social_media_url: row.get(2)?,
        user_id: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn new_id() -> String {
        Uuid::new_v4().to_string()
    }

    fn seed_user(db: &Database, username: &str, email: &str) -> UserRow {
        let id = new_id();
        db.create_user(&NewUser {
            id: &id,
            username,
            email,
            password_hash: "$argon2id$stub",
            age: 20,
        })
        .unwrap()
    }

    #[test]
    fn user_lookup_by_secondary_keys() {
        let db = Database::open_in_memory().unwrap();
        let user = seed_user(&db, "alice", "alice@example.com");

        let by_email = db.get_user_by_email("alice@example.com").unwrap().unwrap();
        assert_eq!(by_email.id, user.id);
        let by_name = db.get_user_by_username("alice").unwrap().unwrap();
        assert_eq!(by_name.id, user.id);
        assert!(db.get_user_by_email("nobody@example.com").unwrap().is_none());
        assert_eq!(db.list_users().unwrap().len(), 1);
    }

    #[test]
    fn duplicate_email_is_a_conflict() {
        let db = Database::open_in_memory().unwrap();
        seed_user(&db, "alice", "same@example.com");

        let id = new_id();
        let err = db
            .create_user(&NewUser {
                id: &id,
                username: "bob",
                email: "same@example.com",
                password_hash: "$argon2id$stub",
                age: 30,
            })
            .unwrap_err();
        assert!(matches!(err, DbError::Conflict(ref msg) if msg == "email already registered"));

        let users = db.list_users().unwrap();
        assert_eq!(users.iter().filter(|u| u.email == "same@example.com").count(), 1);
    }

    #[test]
    fn duplicate_username_is_a_conflict() {
        let db = Database::open_in_memory().unwrap();
        seed_user(&db, "alice", "a1@example.com");

        let id = new_id();
        let err = db
            .create_user(&NewUser {
                id: &id,
                username: "alice",
                email: "a2@example.com",
                password_hash: "$argon2id$stub",
                age: 30,
            })
            .unwrap_err();
        assert!(matches!(err, DbError::Conflict(ref msg) if msg == "username already taken"));
    }

    #[test]
    fn photo_update_is_partial() {
        let db = Database::open_in_memory().unwrap();
        let user = seed_user(&db, "alice", "alice@example.com");
        let photo_id = new_id();
        db.create_photo(&photo_id, &user.id, "sunset", "https://img/1").unwrap();

        let updated = db
            .update_photo(
                &photo_id,
                &PhotoChanges {
                    title: Some("sunrise".into()),
                    photo_url: None,
                },
            )
            .unwrap();
        assert_eq!(updated.title, "sunrise");
        assert_eq!(updated.photo_url, "https://img/1");
        assert_eq!(updated.user_id, user.id);
    }

    #[test]
    fn missing_rows_report_not_found() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.get_photo("nope").unwrap().is_none());
        assert!(matches!(
            db.update_photo("nope", &PhotoChanges::default()),
            Err(DbError::NotFound)
        ));
        assert!(matches!(db.delete_photo("nope"), Err(DbError::NotFound)));
        assert!(matches!(db.delete_comment("nope"), Err(DbError::NotFound)));
        assert!(matches!(db.delete_social_media("nope"), Err(DbError::NotFound)));
    }

    #[test]
    fn deleting_a_photo_removes_its_comments() {
        let db = Database::open_in_memory().unwrap();
        let user = seed_user(&db, "alice", "alice@example.com");
        let keep = new_id();
        let doomed = new_id();
        db.create_photo(&keep, &user.id, "keep", "u1").unwrap();
        db.create_photo(&doomed, &user.id, "doomed", "u2").unwrap();

        let c1 = new_id();
        let c2 = new_id();
        let c3 = new_id();
        db.create_comment(&c1, &user.id, &doomed, "first").unwrap();
        db.create_comment(&c2, &user.id, &doomed, "second").unwrap();
        db.create_comment(&c3, &user.id, &keep, "other").unwrap();
        assert_eq!(db.find_comments_by_photo(&doomed).unwrap().len(), 2);

        assert_eq!(db.delete_photo(&doomed).unwrap(), 2);

        assert!(db.get_photo(&doomed).unwrap().is_none());
        assert!(db.get_comment(&c1).unwrap().is_none());
        assert!(db.get_comment(&c2).unwrap().is_none());
        assert!(db.get_comment(&c3).unwrap().is_some());
        assert!(db.find_comments_by_photo(&doomed).unwrap().is_empty());
    }

    #[test]
    fn comment_requires_existing_photo() {
        let db = Database::open_in_memory().unwrap();
        let user = seed_user(&db, "alice", "alice@example.com");
        let id = new_id();

        assert!(matches!(
            db.create_comment(&id, &user.id, "missing-photo", "hi"),
            Err(DbError::NotFound)
        ));
        assert!(db.list_comments().unwrap().is_empty());
    }

    #[test]
    fn social_media_crud() {
        let db = Database::open_in_memory().unwrap();
        let user = seed_user(&db, "alice", "alice@example.com");
        let id = new_id();

        db.create_social_media(&id, &user.id, "github", "https://github.com/alice")
            .unwrap();
        let updated = db
            .update_social_media(
                &id,
                &SocialMediaChanges {
                    name: None,
                    social_media_url: Some("https://github.com/alice2".into()),
                },
            )
            .unwrap();
        assert_eq!(updated.name, "github");
        assert_eq!(updated.social_media_url, "https://github.com/alice2");
        assert_eq!(db.list_social_media().unwrap().len(), 1);

        db.delete_social_media(&id).unwrap();
        assert!(db.get_social_media(&id).unwrap().is_none());
    }
}
