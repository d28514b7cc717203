//! Offset based paging shared by every listing.
//!
//! A page is described by a [`PageRequest`] (1-based number and size) and is
//! fetched with [`fetch_page`], which runs the filtered `COUNT(*)` and the
//! ordered `LIMIT`/`OFFSET` select so callers always get `(items, total)`.

use serde::Serialize;
use sqlx::sqlite::{Sqlite, SqlitePool, SqliteRow};
use sqlx::{FromRow, QueryBuilder};

pub const QUESTIONS_PER_PAGE: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub number: u64,
    pub size: u32,
}

impl PageRequest {
    pub fn new(number: u64, size: u32) -> Self {
        Self { number, size }
    }

    pub fn first() -> Self {
        Self::new(1, QUESTIONS_PER_PAGE)
    }

    /// Saturates at `i64::MAX`, which sqlite treats as past every row.
    pub fn offset(&self) -> i64 {
        let skipped = self
            .number
            .saturating_sub(1)
            .saturating_mul(u64::from(self.size));
        i64::try_from(skipped).unwrap_or(i64::MAX)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }
}

#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
}

impl<T> Page<T> {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Appends a `WHERE` clause (or nothing) to a query over one table.
pub trait Filter {
    fn push_where(&self, builder: &mut QueryBuilder<'_, Sqlite>);
}

pub async fn fetch_page<T, F>(
    pool: &SqlitePool,
    table: &str,
    columns: &str,
    filter: &F,
    page: PageRequest,
) -> sqlx::Result<Page<T>>
where
    T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    F: Filter + ?Sized,
{
    let mut count = QueryBuilder::<Sqlite>::new(format!("SELECT COUNT(*) FROM {table}"));
    filter.push_where(&mut count);
    let total: i64 = count.build_query_scalar::<i64>().fetch_one(pool).await?;

    let mut select = QueryBuilder::<Sqlite>::new(format!("SELECT {columns} FROM {table}"));
    filter.push_where(&mut select);
    select
        .push(" ORDER BY id LIMIT ")
        .push_bind(page.limit())
        .push(" OFFSET ")
        .push_bind(page.offset());
    let items = select.build_query_as::<T>().fetch_all(pool).await?;

    Ok(Page { items, total })
}
