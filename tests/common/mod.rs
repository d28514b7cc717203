use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use sqlx::SqlitePool;
use tower::ServiceExt;
use trivia_api::db::queries::categories::import_categories;
use trivia_api::db::queries::questions::create_question;
use trivia_api::db::{self, Category, NewQuestion};
use trivia_api::server::app::{build_router, AppState};

pub const CATEGORIES: [&str; 6] = [
    "Science",
    "Art",
    "Geography",
    "History",
    "Entertainment",
    "Sports",
];

/// Router over a fresh in-memory database holding the six categories and
/// `questions` questions spread over categories 1..=3.
pub async fn create_test_app(questions: usize) -> (Router, SqlitePool) {
    let pool = db::in_memory().await.expect("failed to create test database");
    let categories = CATEGORIES
        .iter()
        .enumerate()
        .map(|(i, name)| Category {
            id: i as i64 + 1,
            name: name.to_string(),
        })
        .collect();
    import_categories(&pool, categories).await.unwrap();
    for i in 0..questions {
        create_question(
            &pool,
            &NewQuestion {
                question: format!("Question {}", i + 1),
                answer: format!("Answer {}", i + 1),
                category: (i % 3) as i64 + 1,
                difficulty: (i % 5) as i64 + 1,
            },
        )
        .await
        .unwrap();
    }
    (build_router(AppState::new(pool.clone())), pool)
}

pub async fn send(app: &Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.map(|b| Body::from(b.to_owned())).unwrap_or_else(Body::empty))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

pub fn ids(questions: &Value) -> Vec<i64> {
    questions
        .as_array()
        .expect("questions is an array")
        .iter()
        .map(|q| q["id"].as_i64().unwrap())
        .collect()
}
