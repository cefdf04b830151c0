use axum::Json;
use utils_core::response::ApiResponse;

pub async fn health_check() -> Json<ApiResponse<&'static str>> {
    Json(ApiResponse::success("ok"))
}
