use axum::{extract::State, routing::get, Router};
use serde::Serialize;

use crate::{
    db::{Category, Question},
    server::{
        app::AppState,
        extractors::{PageQuery, PathId},
    },
    service::TriviaService,
};

use super::{success, ApiResponse};

#[derive(Serialize)]
struct CategoriesBody {
    categories: Vec<Category>,
}

#[derive(Serialize)]
struct CategoryQuestionsBody {
    questions: Vec<Question>,
    total_questions: i64,
    categories: Vec<Category>,
    current_category: Option<Category>,
}

async fn get_categories(State(service): State<TriviaService>) -> ApiResponse<CategoriesBody> {
    let categories = service.categories().await?;
    success(CategoriesBody { categories })
}

async fn get_category_questions(
    State(service): State<TriviaService>,
    PathId(id): PathId<i64>,
    PageQuery(page): PageQuery,
) -> ApiResponse<CategoryQuestionsBody> {
    let found = service.questions_by_category(id, page).await?;
    success(CategoryQuestionsBody {
        questions: found.questions.items,
        total_questions: found.questions.total,
        categories: found.categories,
        current_category: found.current_category,
    })
}

pub fn category_router(state: AppState) -> Router {
    Router::new()
        .route("/categories", get(get_categories))
        .route("/categories/{id}/questions", get(get_category_questions))
        .with_state(state)
}
