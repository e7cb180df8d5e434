use axum::{
    Extension,
    extract::{Path, State},
};
use tracing::info;
use uuid::Uuid;

use mygram_db::Database;
use mygram_db::models::{PhotoChanges, PhotoRow};
use mygram_types::api::PhotoRequest;
use mygram_types::models::{Photo, PhotoDetail};

use crate::comments::comment_view;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::ownership::{PhotoStore, authorize_and_mutate, fetch_existing};
use crate::response::ApiResponse;
use crate::state::{AppState, run_blocking};
use crate::validation::ValidJson;

pub struct PhotoService<'a> {
    db: &'a Database,
}

impl<'a> PhotoService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub fn create(&self, owner_id: &str, req: PhotoRequest) -> Result<Photo, ApiError> {
        let id = Uuid::new_v4().to_string();
        let row = self.db.create_photo(&id, owner_id, &req.title, &req.photo_url)?;

        info!("User {} created photo {}", owner_id, row.id);
        Ok(photo_view(row))
    }

    pub fn list(&self) -> Result<Vec<Photo>, ApiError> {
        Ok(self.db.list_photos()?.into_iter().map(photo_view).collect())
    }

    /// The photo with its comments.
    pub fn get(&self, id: &str) -> Result<PhotoDetail, ApiError> {
        let photo = fetch_existing::<PhotoStore>(self.db, id)?;
        let comments = self.db.find_comments_by_photo(id)?;

        Ok(PhotoDetail {
            photo: photo_view(photo),
            comments: comments.into_iter().map(comment_view).collect(),
        })
    }

    pub fn update(&self, id: &str, actor_id: &str, req: PhotoRequest) -> Result<Photo, ApiError> {
        authorize_and_mutate::<PhotoStore, _, _>(self.db, id, actor_id, |_| {
            let changes = PhotoChanges {
                title: Some(req.title),
                photo_url: Some(req.photo_url),
            };
            Ok(photo_view(self.db.update_photo(id, &changes)?))
        })
    }

    /// Removes the photo and, atomically, every comment on it.
    pub fn delete(&self, id: &str, actor_id: &str) -> Result<(), ApiError> {
        authorize_and_mutate::<PhotoStore, _, _>(self.db, id, actor_id, |_| {
            let comments = self.db.delete_photo(id)?;
            info!("User {} deleted photo {} ({} comments)", actor_id, id, comments);
            Ok(())
        })
    }
}

pub(crate) fn photo_view(row: PhotoRow) -> Photo {
    Photo {
        photo_id: row.id,
        title: row.title,
        photo_url: row.photo_url,
        user_id: row.user_id,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

pub async fn create_photo(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidJson(req): ValidJson<PhotoRequest>,
) -> Result<ApiResponse<Photo>, ApiError> {
    let photo = run_blocking(&state, move |s| PhotoService::new(&s.db).create(&user.user_id, req)).await?;
    Ok(ApiResponse(photo))
}

pub async fn list_photos(State(state): State<AppState>) -> Result<ApiResponse<Vec<Photo>>, ApiError> {
    let photos = run_blocking(&state, |s| PhotoService::new(&s.db).list()).await?;
    Ok(ApiResponse(photos))
}

pub async fn get_photo(
    State(state): State<AppState>,
    Path(photo_id): Path<String>,
) -> Result<ApiResponse<PhotoDetail>, ApiError> {
    let photo = run_blocking(&state, move |s| PhotoService::new(&s.db).get(&photo_id)).await?;
    Ok(ApiResponse(photo))
}

pub async fn update_photo(
    State(state): State<AppState>,
    Path(photo_id): Path<String>,
    Extension(user): Extension<AuthUser>,
    ValidJson(req): ValidJson<PhotoRequest>,
) -> Result<ApiResponse<Photo>, ApiError> {
    let photo = run_blocking(&state, move |s| {
        PhotoService::new(&s.db).update(&photo_id, &user.user_id, req)
    })
    .await?;
    Ok(ApiResponse(photo))
}

pub async fn delete_photo(
    State(state): State<AppState>,
    Path(photo_id): Path<String>,
    Extension(user): Extension<AuthUser>,
) -> Result<ApiResponse<String>, ApiError> {
    run_blocking(&state, move |s| PhotoService::new(&s.db).delete(&photo_id, &user.user_id)).await?;
    Ok(ApiResponse("photo deleted".to_string()))
}
