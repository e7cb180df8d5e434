use mygram_types::api::ServiceInfo;

use crate::response::ApiResponse;

pub async fn info() -> ApiResponse<ServiceInfo> {
    ApiResponse(ServiceInfo {
        name: "MyGram".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        about: "Share photos, comment on them, and link your social media accounts.".into(),
    })
}
