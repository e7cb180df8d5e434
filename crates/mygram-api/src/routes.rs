use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};

use crate::middleware::require_auth;
use crate::state::AppState;
use crate::{comments, home, photos, social_media, users};

/// The full MyGram API, mounted under `/mygram`.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/user/register", post(users::register))
        .route("/user/login", post(users::login));

    let protected_routes = Router::new()
        .route("/photos/create", post(photos::create_photo))
        .route("/photos/get/all", get(photos::list_photos))
        .route("/photos/get/{id}", get(photos::get_photo))
        .route("/photos/update/{id}", put(photos::update_photo))
        .route("/photos/delete/{id}", delete(photos::delete_photo))
        .route("/comments/{photo_id}", post(comments::create_comment))
        .route("/comments/get/all", get(comments::list_comments))
        .route("/comments/get/{id}", get(comments::get_comment))
        .route("/comments/update/{id}", put(comments::update_comment))
        .route("/comments/delete/{id}", delete(comments::delete_comment))
        .route("/social_media/", post(social_media::create_social_media))
        .route("/social_media/get/all", get(social_media::list_social_media))
        .route("/social_media/get/{id}", get(social_media::get_social_media))
        .route("/social_media/update/{id}", put(social_media::update_social_media))
        .route("/social_media/delete/{id}", delete(social_media::delete_social_media))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/mygram", get(home::info))
        .nest("/mygram", public_routes.merge(protected_routes))
        .with_state(state)
}
