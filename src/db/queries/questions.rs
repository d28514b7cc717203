use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use sqlx::sqlite::Sqlite;
use sqlx::{FromRow, QueryBuilder, SqlitePool};

use crate::db::pagination::{fetch_page, Filter, Page, PageRequest};

const QUESTION_COLUMNS: &str = "id, question, answer, category, difficulty";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Question {
    pub id: i64,
    pub question: String,
    pub answer: String,
    pub category: i64,
    pub difficulty: i64,
}

#[derive(Debug, Clone)]
pub struct NewQuestion {
    pub question: String,
    pub answer: String,
    pub category: i64,
    pub difficulty: i64,
}

/// Which questions a listing covers. Every variant is ordered by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionFilter {
    All,
    Category(i64),
    /// Literal, ASCII case-insensitive substring of the question text.
    Search(String),
    Quiz { category: i64, exclude: Vec<i64> },
}

impl Filter for QuestionFilter {
    fn push_where(&self, builder: &mut QueryBuilder<'_, Sqlite>) {
        match self {
            QuestionFilter::All => {}
            QuestionFilter::Category(category) => {
                builder.push(" WHERE category = ").push_bind(*category);
            }
            QuestionFilter::Search(term) => {
                builder
                    .push(" WHERE question LIKE ")
                    .push_bind(like_pattern(term))
                    .push(" ESCAPE '\\'");
            }
            QuestionFilter::Quiz { category, exclude } => {
                builder.push(" WHERE category = ").push_bind(*category);
                // one json array bind, so the list is not capped by sqlite's variable limit
                if !exclude.is_empty() {
                    builder
                        .push(" AND id NOT IN (SELECT value FROM json_each(")
                        .push_bind(serde_json::Value::from(exclude.clone()).to_string())
                        .push("))");
                }
            }
        }
    }
}

fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

pub async fn get_questions_page(
    pool: &SqlitePool,
    filter: &QuestionFilter,
    page: PageRequest,
) -> sqlx::Result<Page<Question>> {
    fetch_page(pool, "questions", QUESTION_COLUMNS, filter, page).await
}

pub async fn get_questions(
    pool: &SqlitePool,
    filter: &QuestionFilter,
) -> sqlx::Result<Vec<Question>> {
    let mut builder =
        QueryBuilder::<Sqlite>::new(format!("SELECT {QUESTION_COLUMNS} FROM questions"));
    filter.push_where(&mut builder);
    builder.push(" ORDER BY id");
    builder.build_query_as::<Question>().fetch_all(pool).await
}

pub async fn create_question(pool: &SqlitePool, question: &NewQuestion) -> sqlx::Result<i64> {
    let id = sqlx::query(
        r#"
        INSERT INTO questions (question, answer, category, difficulty) VALUES (?1, ?2, ?3, ?4)
        "#,
    )
    .bind(&question.question)
    .bind(&question.answer)
    .bind(question.category)
    .bind(question.difficulty)
    .execute(pool)
    .await?
    .last_insert_rowid();

    Ok(id)
}

/// Returns `false` when no question had this id.
pub async fn delete_question(pool: &SqlitePool, id: i64) -> sqlx::Result<bool> {
    let deleted = sqlx::query(
        r#"
        DELETE FROM questions WHERE questions.id = ?1
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?
    .rows_affected();

    Ok(deleted > 0)
}

/// Replaces the stored questions with `questions`, keeping their ids.
pub async fn import_questions(pool: &SqlitePool, questions: Vec<Question>) -> sqlx::Result<()> {
    let existing_ids: HashSet<i64> = get_questions(pool, &QuestionFilter::All)
        .await?
        .iter()
        .map(|q| q.id)
        .collect();
    let new_ids: HashSet<i64> = questions.iter().map(|q| q.id).collect();

    let mut tx = pool.begin().await?;
    for id in existing_ids.difference(&new_ids) {
        sqlx::query("DELETE FROM questions WHERE questions.id = ?1")
            .bind(*id)
            .execute(&mut *tx)
            .await?;
    }
    for question in questions {
        sqlx::query(
            r#"
            INSERT INTO questions (id, question, answer, category, difficulty) VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(id) DO UPDATE SET
                question = excluded.question,
                answer = excluded.answer,
                category = excluded.category,
                difficulty = excluded.difficulty
            "#,
        )
        .bind(question.id)
        .bind(question.question)
        .bind(question.answer)
        .bind(question.category)
        .bind(question.difficulty)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{in_memory, QUESTIONS_PER_PAGE};

    fn new_question(text: &str, category: i64) -> NewQuestion {
        NewQuestion {
            question: text.to_owned(),
            answer: "answer".to_owned(),
            category,
            difficulty: 1,
        }
    }

    async fn seeded(n: usize) -> SqlitePool {
        let pool = in_memory().await.unwrap();
        for i in 0..n {
            let category = (i % 3) as i64 + 1;
            create_question(&pool, &new_question(&format!("Question {i}"), category))
                .await
                .unwrap();
        }
        pool
    }

    fn ids(questions: &[Question]) -> Vec<i64> {
        questions.iter().map(|q| q.id).collect()
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("title"), "%title%");
        assert_eq!(like_pattern("100%_"), "%100\\%\\_%");
        assert_eq!(like_pattern(""), "%%");
    }

    #[tokio::test]
    async fn pages_are_contiguous_slices() {
        let pool = seeded(25).await;

        let first = get_questions_page(&pool, &QuestionFilter::All, PageRequest::first())
            .await
            .unwrap();
        assert_eq!(first.total, 25);
        assert_eq!(ids(&first.items), (1..=10).collect::<Vec<_>>());

        let third = PageRequest::new(3, QUESTIONS_PER_PAGE);
        let last = get_questions_page(&pool, &QuestionFilter::All, third)
            .await
            .unwrap();
        assert_eq!(ids(&last.items), (21..=25).collect::<Vec<_>>());

        let far = PageRequest::new(9999, QUESTIONS_PER_PAGE);
        let beyond = get_questions_page(&pool, &QuestionFilter::All, far)
            .await
            .unwrap();
        assert!(beyond.is_empty());
        assert_eq!(beyond.total, 25);
    }

    #[tokio::test]
    async fn category_filter_counts_matches_only() {
        let pool = seeded(12).await;

        let page = get_questions_page(&pool, &QuestionFilter::Category(1), PageRequest::first())
            .await
            .unwrap();
        assert_eq!(page.total, 4);
        assert!(page.items.iter().all(|q| q.category == 1));
    }

    #[tokio::test]
    async fn search_is_case_insensitive_and_literal() {
        let pool = in_memory().await.unwrap();
        create_question(&pool, &new_question("Whose autobiography is entitled?", 4))
            .await
            .unwrap();
        create_question(&pool, &new_question("What boxer's original name is Cassius?", 4))
            .await
            .unwrap();
        create_question(&pool, &new_question("What is 50% of 10?", 1))
            .await
            .unwrap();

        let found = get_questions(&pool, &QuestionFilter::Search("TITLE".to_owned()))
            .await
            .unwrap();
        assert_eq!(ids(&found), vec![1]);

        let percent = get_questions(&pool, &QuestionFilter::Search("%".to_owned()))
            .await
            .unwrap();
        assert_eq!(ids(&percent), vec![3]);

        let everything = get_questions(&pool, &QuestionFilter::Search(String::new()))
            .await
            .unwrap();
        assert_eq!(everything.len(), 3);
    }

    #[tokio::test]
    async fn quiz_filter_excludes_previous_questions() {
        let pool = seeded(9).await;

        let candidates = get_questions(
            &pool,
            &QuestionFilter::Quiz {
                category: 1,
                exclude: vec![1, 7],
            },
        )
        .await
        .unwrap();
        assert_eq!(ids(&candidates), vec![4]);

        let no_exclusions = get_questions(
            &pool,
            &QuestionFilter::Quiz {
                category: 1,
                exclude: vec![],
            },
        )
        .await
        .unwrap();
        assert_eq!(ids(&no_exclusions), vec![1, 4, 7]);
    }

    #[tokio::test]
    async fn quiz_filter_takes_more_exclusions_than_sqlite_variables() {
        let pool = seeded(9).await;
        let mut exclude: Vec<i64> = (1000..41000).collect();
        exclude.push(4);

        let candidates = get_questions(
            &pool,
            &QuestionFilter::Quiz {
                category: 1,
                exclude,
            },
        )
        .await
        .unwrap();
        assert_eq!(ids(&candidates), vec![1, 7]);
    }

    #[tokio::test]
    async fn delete_reports_missing_rows() {
        let pool = seeded(2).await;

        assert!(delete_question(&pool, 1).await.unwrap());
        assert!(!delete_question(&pool, 1).await.unwrap());
        let remaining = get_questions(&pool, &QuestionFilter::All).await.unwrap();
        assert_eq!(ids(&remaining), vec![2]);
    }

    #[tokio::test]
    async fn deleted_ids_are_not_reused() {
        let pool = seeded(2).await;
        delete_question(&pool, 2).await.unwrap();

        let id = create_question(&pool, &new_question("Again", 1)).await.unwrap();
        assert_eq!(id, 3);
    }

    #[tokio::test]
    async fn import_keeps_ids_and_drops_missing() {
        let pool = seeded(3).await;
        let imported = vec![
            Question {
                id: 2,
                question: "Replaced".to_owned(),
                answer: "yes".to_owned(),
                category: 5,
                difficulty: 3,
            },
            Question {
                id: 40,
                question: "New".to_owned(),
                answer: "no".to_owned(),
                category: 1,
                difficulty: 2,
            },
        ];
        import_questions(&pool, imported.clone()).await.unwrap();

        let all = get_questions(&pool, &QuestionFilter::All).await.unwrap();
        assert_eq!(all, imported);
    }
}
