use axum::{
    Extension,
    extract::{Path, State},
};
use tracing::info;
use uuid::Uuid;

use mygram_db::{Database, DbError};
use mygram_db::models::{CommentChanges, CommentRow};
use mygram_types::api::CommentRequest;
use mygram_types::models::Comment;

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::ownership::{CommentStore, PhotoStore, authorize_and_mutate, fetch_existing};
use crate::response::ApiResponse;
use crate::state::{AppState, run_blocking};
use crate::validation::ValidJson;

pub struct CommentService<'a> {
    db: &'a Database,
}

impl<'a> CommentService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// The parent photo must exist; no orphan comments are ever written.
    pub fn create(
        &self,
        owner_id: &str,
        photo_id: &str,
        req: CommentRequest,
    ) -> Result<Comment, ApiError> {
        fetch_existing::<PhotoStore>(self.db, photo_id)?;

        let id = Uuid::new_v4().to_string();
        // The photo can still vanish before the insert; the foreign key catches it.
        let row = self
            .db
            .create_comment(&id, owner_id, photo_id, &req.message)
            .map_err(|e| match e {
                DbError::NotFound => ApiError::NotFound("photo"),
                other => other.into(),
            })?;

        info!("User {} commented {} on photo {}", owner_id, row.id, photo_id);
        Ok(comment_view(row))
    }

    pub fn list(&self) -> Result<Vec<Comment>, ApiError> {
        Ok(self.db.list_comments()?.into_iter().map(comment_view).collect())
    }

    pub fn get(&self, id: &str) -> Result<Comment, ApiError> {
        fetch_existing::<CommentStore>(self.db, id).map(comment_view)
    }

    pub fn update(&self, id: &str, actor_id: &str, req: CommentRequest) -> Result<Comment, ApiError> {
        authorize_and_mutate::<CommentStore, _, _>(self.db, id, actor_id, |_| {
            let changes = CommentChanges {
                message: Some(req.message),
            };
            Ok(comment_view(self.db.update_comment(id, &changes)?))
        })
    }

    pub fn delete(&self, id: &str, actor_id: &str) -> Result<(), ApiError> {
        authorize_and_mutate::<CommentStore, _, _>(self.db, id, actor_id, |_| {
            self.db.delete_comment(id)?;
            info!("User {} deleted comment {}", actor_id, id);
            Ok(())
        })
    }
}

pub(crate) fn comment_view(row: CommentRow) -> Comment {
    Comment {
        comment_id: row.id,
        message: row.message,
        user_id: row.user_id,
        photo_id: row.photo_id,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

pub async fn create_comment(
    State(state): State<AppState>,
    Path(photo_id): Path<String>,
    Extension(user): Extension<AuthUser>,
    ValidJson(req): ValidJson<CommentRequest>,
) -> Result<ApiResponse<Comment>, ApiError> {
    let comment = run_blocking(&state, move |s| {
        CommentService::new(&s.db).create(&user.user_id, &photo_id, req)
    })
    .await?;
    Ok(ApiResponse(comment))
}

pub async fn list_comments(State(state): State<AppState>) -> Result<ApiResponse<Vec<Comment>>, ApiError> {
    let comments = run_blocking(&state, |s| CommentService::new(&s.db).list()).await?;
    Ok(ApiResponse(comments))
}

pub async fn get_comment(
    State(state): State<AppState>,
    Path(comment_id): Path<String>,
) -> Result<ApiResponse<Comment>, ApiError> {
    let comment = run_blocking(&state, move |s| CommentService::new(&s.db).get(&comment_id)).await?;
    Ok(ApiResponse(comment))
}

pub async fn update_comment(
    State(state): State<AppState>,
    Path(comment_id): Path<String>,
    Extension(user): Extension<AuthUser>,
    ValidJson(req): ValidJson<CommentRequest>,
) -> Result<ApiResponse<Comment>, ApiError> {
    let comment = run_blocking(&state, move |s| {
        CommentService::new(&s.db).update(&comment_id, &user.user_id, req)
    })
    .await?;
    Ok(ApiResponse(comment))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    Path(comment_id): Path<String>,
    Extension(user): Extension<AuthUser>,
) -> Result<ApiResponse<String>, ApiError> {
    run_blocking(&state, move |s| {
        CommentService::new(&s.db).delete(&comment_id, &user.user_id)
    })
    .await?;
    Ok(ApiResponse("comment deleted".to_string()))
}
