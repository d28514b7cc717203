use axum::{
    extract::State,
    routing::{delete, get, post},
    Router,
};
use serde::{Deserialize, Serialize};

use crate::{
    db::{Category, NewQuestion, Question},
    server::{
        app::AppState,
        deserializers::Stri64,
        error::ApiError,
        extractors::{JsonBody, PageQuery, PathId},
    },
    service::TriviaService,
};

use super::{success, ApiResponse};

#[derive(Deserialize)]
struct NewQuestionBody {
    question: String,
    answer: String,
    category: Stri64,
    difficulty: Stri64,
}

#[derive(Deserialize)]
struct SearchBody {
    #[serde(rename = "searchTerm")]
    search_term: Option<String>,
}

#[derive(Serialize)]
struct QuestionsPage {
    questions: Vec<Question>,
    total_questions: i64,
    categories: Vec<Category>,
    current_category: Option<Category>,
}

#[derive(Serialize)]
struct Created {
    created: i64,
    questions: Vec<Question>,
    total_questions: i64,
}

#[derive(Serialize)]
struct Deleted {
    deleted: i64,
    questions: Vec<Question>,
    total_questions: i64,
}

#[derive(Serialize)]
struct SearchResults {
    questions: Vec<Question>,
    total_questions: i64,
    current_category: Option<Category>,
}

async fn get_questions(
    State(service): State<TriviaService>,
    PageQuery(page): PageQuery,
) -> ApiResponse<QuestionsPage> {
    let list = service.list_questions(page).await?;
    success(QuestionsPage {
        questions: list.questions.items,
        total_questions: list.questions.total,
        categories: list.categories,
        current_category: None,
    })
}

async fn delete_question(
    State(service): State<TriviaService>,
    PathId(id): PathId<i64>,
) -> ApiResponse<Deleted> {
    let changed = service.delete_question(id).await?;
    success(Deleted {
        deleted: changed.id,
        questions: changed.questions.items,
        total_questions: changed.questions.total,
    })
}

async fn create_question(
    State(service): State<TriviaService>,
    JsonBody(body): JsonBody<NewQuestionBody>,
) -> ApiResponse<Created> {
    let changed = service
        .create_question(NewQuestion {
            question: body.question,
            answer: body.answer,
            category: body.category.0,
            difficulty: body.difficulty.0,
        })
        .await?;
    success(Created {
        created: changed.id,
        questions: changed.questions.items,
        total_questions: changed.questions.total,
    })
}

async fn search_questions(
    State(service): State<TriviaService>,
    PageQuery(page): PageQuery,
    JsonBody(body): JsonBody<SearchBody>,
) -> ApiResponse<SearchResults> {
    let term = body.search_term.ok_or(ApiError::NotFound)?;
    let found = service.search_questions(&term, page).await?;
    success(SearchResults {
        questions: found.items,
        total_questions: found.total,
        current_category: None,
    })
}

pub fn questions_router(state: AppState) -> Router {
    Router::new()
        .route("/questions", get(get_questions).post(create_question))
        .route("/questions/{id}", delete(delete_question))
        .route("/searchQuestions", post(search_questions))
        .with_state(state)
}
