//! Ownership-checked mutation.
//!
//! Every update and delete of a photo, comment or social media record goes
//! through [`authorize_and_mutate`]: fetch the record, compare its owner with
//! the acting user, and only then run the mutation. A missing record is
//! `NotFound`, a foreign one is `ForbiddenAccess`, and the mutation closure
//! never sees either.

use tracing::warn;

use mygram_db::Database;
use mygram_db::models::{CommentRow, PhotoRow, SocialMediaRow};

use crate::error::ApiError;

/// A record with an owning user.
pub trait OwnedResource {
    fn owner_id(&self) -> &str;
}

impl OwnedResource for PhotoRow {
    fn owner_id(&self) -> &str {
        &self.user_id
    }
}

impl OwnedResource for CommentRow {
    fn owner_id(&self) -> &str {
        &self.user_id
    }
}

impl OwnedResource for SocialMediaRow {
    fn owner_id(&self) -> &str {
        &self.user_id
    }
}

/// Fetch-by-id capability of a resource store.
pub trait ResourceStore {
    type Record: OwnedResource;

    /// Name used in error messages and logs.
    const KIND: &'static str;

    fn fetch(db: &Database, id: &str) -> mygram_db::Result<Option<Self::Record>>;
}

pub struct PhotoStore;

impl ResourceStore for PhotoStore {
    type Record = PhotoRow;
    const KIND: &'static str = "photo";

    fn fetch(db: &Database, id: &str) -> mygram_db::Result<Option<PhotoRow>> {
        db.get_photo(id)
    }
}

pub struct CommentStore;

impl ResourceStore for CommentStore {
    type Record = CommentRow;
    const KIND: &'static str = "comment";

    fn fetch(db: &Database, id: &str) -> mygram_db::Result<Option<CommentRow>> {
        db.get_comment(id)
    }
}

pub struct SocialMediaStore;

impl ResourceStore for SocialMediaStore {
    type Record = SocialMediaRow;
    const KIND: &'static str = "social media";

    fn fetch(db: &Database, id: &str) -> mygram_db::Result<Option<SocialMediaRow>> {
        db.get_social_media(id)
    }
}

/// Fetch a record or fail with `NotFound`.
pub fn fetch_existing<S: ResourceStore>(db: &Database, id: &str) -> Result<S::Record, ApiError> {
    S::fetch(db, id)?.ok_or(ApiError::NotFound(S::KIND))
}

pub fn authorize_and_mutate<S, T, F>(
    db: &Database,
    id: &str,
    acting_user_id: &str,
    mutate: F,
) -> Result<T, ApiError>
where
    S: ResourceStore,
    F: FnOnce(S::Record) -> Result<T, ApiError>,
{
    let record = fetch_existing::<S>(db, id)?;

    if record.owner_id() != acting_user_id {
        warn!(
            "User {} tried to modify {} {} owned by {}",
            acting_user_id,
            S::KIND,
            id,
            record.owner_id()
        );
        return Err(ApiError::ForbiddenAccess(S::KIND));
    }

    mutate(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mygram_db::models::NewUser;

    fn setup() -> (Database, PhotoRow) {
        let db = Database::open_in_memory().unwrap();
        for (id, name) in [("u1", "owner"), ("u2", "intruder")] {
            db.create_user(&NewUser {
                id,
                username: name,
                email: &format!("{name}@example.com"),
                password_hash: "$argon2id$stub",
                age: 30,
            })
            .unwrap();
        }
        let photo = db.create_photo("p1", "u1", "sunset", "https://img/1").unwrap();
        (db, photo)
    }

    #[test]
    fn owner_mutation_is_applied() {
        let (db, _) = setup();
        let title = authorize_and_mutate::<PhotoStore, _, _>(&db, "p1", "u1", |photo| {
            Ok(photo.title)
        })
        .unwrap();
        assert_eq!(title, "sunset");
    }

    #[test]
    fn non_owner_is_rejected_before_mutation() {
        let (db, _) = setup();
        let mut ran = false;
        let result = authorize_and_mutate::<PhotoStore, (), _>(&db, "p1", "u2", |_| {
            ran = true;
            Ok(())
        });

        assert!(matches!(result, Err(ApiError::ForbiddenAccess("photo"))));
        assert!(!ran);
    }

    #[test]
    fn missing_record_short_circuits() {
        let (db, _) = setup();
        let mut ran = false;
        let result = authorize_and_mutate::<CommentStore, (), _>(&db, "nope", "u1", |_| {
            ran = true;
            Ok(())
        });

        assert!(matches!(result, Err(ApiError::NotFound("comment"))));
        assert!(!ran);
    }

    #[test]
    fn mutation_errors_propagate() {
        let (db, _) = setup();
        let result = authorize_and_mutate::<PhotoStore, (), _>(&db, "p1", "u1", |_| {
            Err(ApiError::Internal("write failed".into()))
        });
        assert!(matches!(result, Err(ApiError::Internal(_))));
    }
}
