use axum::Json;
use utoipa::OpenApi;

use crate::error::ErrorBody;
use crate::routes::{health, sessions};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "ytcreator",
        description = "Generate YouTube video titles and scripts from a topic"
    ),
    paths(
        health::health_check,
        sessions::create_session,
        sessions::generate,
        sessions::get_history,
        sessions::delete_session,
    ),
    components(schemas(
        ErrorBody,
        health::HealthResponse,
        sessions::SessionResponse,
        sessions::GenerateRequest,
        sessions::GenerateResponse,
        sessions::GenerationResponse,
        sessions::HistoryEntryResponse,
        sessions::HistoryResponse,
        sessions::SessionHistoryResponse,
    )),
    tags(
        (name = "health", description = "Service status"),
        (name = "sessions", description = "Per-user generation sessions")
    )
)]
pub struct ApiDoc;

/// OpenAPI document for the JSON API
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
