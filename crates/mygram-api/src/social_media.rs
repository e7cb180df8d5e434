use axum::{
    Extension,
    extract::{Path, State},
};
use tracing::info;
use uuid::Uuid;

use mygram_db::Database;
use mygram_db::models::{SocialMediaChanges, SocialMediaRow};
use mygram_types::api::SocialMediaRequest;
use mygram_types::models::SocialMedia;

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::ownership::{SocialMediaStore, authorize_and_mutate, fetch_existing};
use crate::response::ApiResponse;
use crate::state::{AppState, run_blocking};
use crate::validation::ValidJson;

pub struct SocialMediaService<'a> {
    db: &'a Database,
}

impl<'a> SocialMediaService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub fn create(&self, owner_id: &str, req: SocialMediaRequest) -> Result<SocialMedia, ApiError> {
        let id = Uuid::new_v4().to_string();
        let row = self
            .db
            .create_social_media(&id, owner_id, &req.name, &req.social_media_url)?;

        info!("User {} linked {} ({})", owner_id, row.name, row.id);
        Ok(social_media_view(row))
    }

    pub fn list(&self) -> Result<Vec<SocialMedia>, ApiError> {
        Ok(self
            .db
            .list_social_media()?
            .into_iter()
            .map(social_media_view)
            .collect())
    }

    pub fn get(&self, id: &str) -> Result<SocialMedia, ApiError> {
        fetch_existing::<SocialMediaStore>(self.db, id).map(social_media_view)
    }

    pub fn update(
        &self,
        id: &str,
        actor_id: &str,
        req: SocialMediaRequest,
    ) -> Result<SocialMedia, ApiError> {
        authorize_and_mutate::<SocialMediaStore, _, _>(self.db, id, actor_id, |_| {
            let changes = SocialMediaChanges {
                name: Some(req.name),
                social_media_url: Some(req.social_media_url),
            };
            Ok(social_media_view(self.db.update_social_media(id, &changes)?))
        })
    }

    pub fn delete(&self, id: &str, actor_id: &str) -> Result<(), ApiError> {
        authorize_and_mutate::<SocialMediaStore, _, _>(self.db, id, actor_id, |_| {
            self.db.delete_social_media(id)?;
            info!("User {} removed social media {}", actor_id, id);
            Ok(())
        })
    }
}

fn social_media_view(row: SocialMediaRow) -> SocialMedia {
    SocialMedia {
        social_id: row.id,
        name: row.name,
        social_media_url: row.social_media_url,
        user_id: row.user_id,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

pub async fn create_social_media(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidJson(req): ValidJson<SocialMediaRequest>,
) -> Result<ApiResponse<SocialMedia>, ApiError> {
    let link = run_blocking(&state, move |s| {
        SocialMediaService::new(&s.db).create(&user.user_id, req)
    })
    .await?;
    Ok(ApiResponse(link))
}

pub async fn list_social_media(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<SocialMedia>>, ApiError> {
    let links = run_blocking(&state, |s| SocialMediaService::new(&s.db).list()).await?;
    Ok(ApiResponse(links))
}

pub async fn get_social_media(
    State(state): State<AppState>,
    Path(social_id): Path<String>,
) -> Result<ApiResponse<SocialMedia>, ApiError> {
    let link = run_blocking(&state, move |s| SocialMediaService::new(&s.db).get(&social_id)).await?;
    Ok(ApiResponse(link))
}

pub async fn update_social_media(
    State(state): State<AppState>,
    Path(social_id): Path<String>,
    Extension(user): Extension<AuthUser>,
    ValidJson(req): ValidJson<SocialMediaRequest>,
) -> Result<ApiResponse<SocialMedia>, ApiError> {
    let link = run_blocking(&state, move |s| {
        SocialMediaService::new(&s.db).update(&social_id, &user.user_id, req)
    })
    .await?;
    Ok(ApiResponse(link))
}

pub async fn delete_social_media(
    State(state): State<AppState>,
    Path(social_id): Path<String>,
    Extension(user): Extension<AuthUser>,
) -> Result<ApiResponse<String>, ApiError> {
    run_blocking(&state, move |s| {
        SocialMediaService::new(&s.db).delete(&social_id, &user.user_id)
    })
    .await?;
    Ok(ApiResponse("social media deleted".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mygram_db::models::NewUser;

    fn setup() -> Database {
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
        db
    }

    fn link(name: &str, url: &str) -> SocialMediaRequest {
        SocialMediaRequest {
            name: name.into(),
            social_media_url: url.into(),
        }
    }

    #[test]
    fn ownership_guards_every_mutation() {
        let db = setup();
        let links = SocialMediaService::new(&db);
        let created = links
            .create("u1", link("github", "https://github.com/owner"))
            .unwrap();
        assert_eq!(created.user_id, "u1");

        assert!(matches!(
            links.update(&created.social_id, "u2", link("github", "https://evil")),
            Err(ApiError::ForbiddenAccess(_))
        ));
        assert!(matches!(
            links.delete(&created.social_id, "u2"),
            Err(ApiError::ForbiddenAccess(_))
        ));
        assert_eq!(
            links.get(&created.social_id).unwrap().social_media_url,
            "https://github.com/owner"
        );

        let updated = links
            .update(&created.social_id, "u1", link("gitlab", "https://gitlab.com/owner"))
            .unwrap();
        assert_eq!(updated.name, "gitlab");

        links.delete(&created.social_id, "u1").unwrap();
        assert!(links.list().unwrap().is_empty());
    }

    #[test]
    fn unknown_id_is_not_found() {
        let db = setup();
        let links = SocialMediaService::new(&db);
        assert!(matches!(links.get("nope"), Err(ApiError::NotFound(_))));
        assert!(matches!(
            links.update("nope", "u1", link("x", "y")),
            Err(ApiError::NotFound(_))
        ));
        assert!(matches!(links.delete("nope", "u1"), Err(ApiError::NotFound(_))));
    }
}
