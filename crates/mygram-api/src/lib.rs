//! HTTP-facing layer of MyGram: credentials, validation, the ownership
//! check shared by every mutating route, and the axum handlers themselves.

pub mod comments;
pub mod credentials;
pub mod error;
pub mod home;
pub mod middleware;
pub mod ownership;
pub mod photos;
pub mod response;
pub mod routes;
pub mod social_media;
pub mod state;
pub mod users;
pub mod validation;
