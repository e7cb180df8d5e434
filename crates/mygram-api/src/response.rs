use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use mygram_types::api::Envelope;

/// A successful response. Wraps the payload in the success envelope.
#[derive(Debug)]
pub struct ApiResponse<T>(pub T);

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::OK;
        let body = Envelope {
            code: status.as_u16(),
            message: status.canonical_reason().unwrap_or_default().to_string(),
            data: self.0,
        };

        (status, Json(body)).into_response()
    }
}
