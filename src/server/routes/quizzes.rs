use axum::{extract::State, routing::post, Router};
use serde::{Deserialize, Serialize};

use crate::{
    db::Question,
    server::{app::AppState, deserializers::Stri64, error::ApiError, extractors::JsonBody},
    service::TriviaService,
};

use super::{success, ApiResponse};

// clients also send the category's "type"; only the id matters here
#[derive(Deserialize)]
struct QuizCategory {
    id: Option<Stri64>,
}

#[derive(Deserialize)]
struct QuizBody {
    quiz_category: Option<QuizCategory>,
    previous_questions: Option<Vec<i64>>,
}

#[derive(Serialize)]
struct QuizQuestion {
    question: Option<Question>,
}

async fn next_question(
    State(service): State<TriviaService>,
    JsonBody(body): JsonBody<QuizBody>,
) -> ApiResponse<QuizQuestion> {
    let category = body
        .quiz_category
        .and_then(|c| c.id)
        .ok_or(ApiError::NotFound)?;
    let previous = body.previous_questions.ok_or(ApiError::NotFound)?;

    let question = service.next_quiz_question(category.0, previous).await?;
    success(QuizQuestion { question })
}

pub fn quiz_router(state: AppState) -> Router {
    Router::new()
        .route("/quizzes", post(next_question))
        .with_state(state)
}
