mod categories;
mod questions;
mod quizzes;

use axum::Json;
use serde::Serialize;

use crate::server::error::ApiError;

pub use categories::category_router;
pub use questions::questions_router;
pub use quizzes::quiz_router;

/// Successful bodies are the handler payload plus `"success": true`.
#[derive(Serialize)]
pub struct Success<T> {
    success: bool,
    #[serde(flatten)]
    body: T,
}

pub type ApiResponse<T> = Result<Json<Success<T>>, ApiError>;

fn success<T>(body: T) -> ApiResponse<T> {
    Ok(Json(Success {
        success: true,
        body,
    }))
}
