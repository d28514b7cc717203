//! Trivia operations on top of the storage layer.
//!
//! [`TriviaService`] owns the pool and is built once at startup; HTTP handlers
//! only translate its results. Every operation reports failures through
//! [`ServiceError`] so the status code of each outcome is fixed.

use rand::seq::SliceRandom;
use sqlx::SqlitePool;
use thiserror::Error;

use crate::db::queries::{categories, questions};
use crate::db::{Category, NewQuestion, Page, PageRequest, Question, QuestionFilter};
use crate::telemetry::{QUESTION_CHANGES_CNTR, QUIZ_QUESTIONS_CNTR};

pub const MIN_DIFFICULTY: i64 = 1;
pub const MAX_DIFFICULTY: i64 = 5;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("storage failure: {0}")]
    Storage(#[from] sqlx::Error),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug)]
pub struct QuestionList {
    pub questions: Page<Question>,
    pub categories: Vec<Category>,
}

#[derive(Debug)]
pub struct CategoryQuestions {
    pub questions: Page<Question>,
    pub categories: Vec<Category>,
    pub current_category: Option<Category>,
}

/// Outcome of a create or delete: the affected id and the refreshed first page.
#[derive(Debug)]
pub struct QuestionsChanged {
    pub id: i64,
    pub questions: Page<Question>,
}

#[derive(Clone)]
pub struct TriviaService {
    pool: SqlitePool,
}

impl TriviaService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn categories(&self) -> ServiceResult<Vec<Category>> {
        Ok(categories::get_all_categories(&self.pool).await?)
    }

    /// An empty page is `NotFound`, whether the store is empty or the page is
    /// past the end.
    pub async fn list_questions(&self, page: PageRequest) -> ServiceResult<QuestionList> {
        let questions =
            questions::get_questions_page(&self.pool, &QuestionFilter::All, page).await?;
        if questions.is_empty() {
            return Err(ServiceError::NotFound);
        }
        Ok(QuestionList {
            questions,
            categories: self.categories().await?,
        })
    }

    pub async fn delete_question(&self, id: i64) -> ServiceResult<QuestionsChanged> {
        if !questions::delete_question(&self.pool, id).await? {
            return Err(ServiceError::NotFound);
        }
        QUESTION_CHANGES_CNTR.with_label_values(&["deleted"]).inc();
        tracing::info!(id, "Question deleted");
        self.changed(id).await
    }

    pub async fn create_question(&self, question: NewQuestion) -> ServiceResult<QuestionsChanged> {
        validate(&question)?;
        let id = questions::create_question(&self.pool, &question).await?;
        QUESTION_CHANGES_CNTR.with_label_values(&["created"]).inc();
        tracing::info!(id, category = question.category, "Question created");
        self.changed(id).await
    }

    pub async fn search_questions(
        &self,
        term: &str,
        page: PageRequest,
    ) -> ServiceResult<Page<Question>> {
        let filter = QuestionFilter::Search(term.to_owned());
        let found = questions::get_questions_page(&self.pool, &filter, page).await?;
        if found.is_empty() {
            return Err(ServiceError::NotFound);
        }
        Ok(found)
    }

    /// An unknown category is reported as `current_category: None`; only an
    /// empty page is `NotFound`.
    pub async fn questions_by_category(
        &self,
        category_id: i64,
        page: PageRequest,
    ) -> ServiceResult<CategoryQuestions> {
        let filter = QuestionFilter::Category(category_id);
        let questions = questions::get_questions_page(&self.pool, &filter, page).await?;
        if questions.is_empty() {
            return Err(ServiceError::NotFound);
        }
        Ok(CategoryQuestions {
            questions,
            categories: self.categories().await?,
            current_category: categories::get_category(&self.pool, category_id).await?,
        })
    }

    /// Picks a random question of `category` not in `previous`. `None` means the
    /// quiz ran out of questions.
    pub async fn next_quiz_question(
        &self,
        category: i64,
        previous: Vec<i64>,
    ) -> ServiceResult<Option<Question>> {
        let filter = QuestionFilter::Quiz {
            category,
            exclude: previous,
        };
        let candidates = questions::get_questions(&self.pool, &filter).await?;
        let picked = candidates.choose(&mut rand::thread_rng()).cloned();
        match &picked {
            Some(question) => {
                let label = category.to_string();
                QUIZ_QUESTIONS_CNTR
                    .with_label_values(&[label.as_str()])
                    .inc();
                tracing::debug!(
                    id = question.id,
                    candidates = candidates.len(),
                    "Quiz question picked"
                );
            }
            None => tracing::debug!(category, "Quiz has no questions left"),
        }
        Ok(picked)
    }

    async fn changed(&self, id: i64) -> ServiceResult<QuestionsChanged> {
        let questions =
            questions::get_questions_page(&self.pool, &QuestionFilter::All, PageRequest::first())
                .await?;
        Ok(QuestionsChanged { id, questions })
    }
}

fn validate(question: &NewQuestion) -> ServiceResult<()> {
    if question.question.trim().is_empty() {
        return Err(ServiceError::Validation("question text is empty".to_owned()));
    }
    if question.answer.trim().is_empty() {
        return Err(ServiceError::Validation("answer text is empty".to_owned()));
    }
    if !(MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&question.difficulty) {
        return Err(ServiceError::Validation(format!(
            "difficulty {} is outside {MIN_DIFFICULTY}..={MAX_DIFFICULTY}",
            question.difficulty
        )));
    }
    Ok(())
}
