//! Storage adapter
//!
//! Two tables, pure CRUD. Each operation is a single statement; there are
//! no cross-operation transactions, and failures surface to the caller as
//! `BotError::DatabaseError`.

use crate::models::{CategoryTotal, ExpenseRecord};
use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::str::FromStr;
use std::time::Duration;

/// Trait for expense and income persistence
#[async_trait::async_trait]
pub trait ExpenseStore: Send + Sync {
    async fn add_expense(&self, expense: &ExpenseRecord) -> Result<()>;
    /// Upsert by phone; last write wins, never a duplicate row.
    async fn set_income(&self, phone: &str, income: f64) -> Result<()>;
    /// 0.0 when the user has no row yet.
    async fn get_income(&self, phone: &str) -> Result<f64>;
    async fn total_expenses(&self, phone: &str) -> Result<f64>;
    async fn totals_by_category(&self, phone: &str) -> Result<Vec<CategoryTotal>>;
    /// Delete the sender's rows from both tables.
    async fn reset_user(&self, phone: &str) -> Result<()>;
}

/// SQLite-backed store
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating the file if missing) and ensure the schema exists.
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        // Single connection held open: keeps in-memory databases alive and
        // matches the one-user-at-a-time traffic profile.
        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              phone TEXT UNIQUE,
              income REAL DEFAULT 0
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS expenses (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              user_phone TEXT,
              amount REAL,
              category TEXT,
              date TEXT,
              description TEXT
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl ExpenseStore for SqliteStore {
    async fn add_expense(&self, expense: &ExpenseRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO expenses (user_phone, amount, category, date, description)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&expense.user_phone)
        .bind(expense.amount)
        .bind(&expense.category)
        .bind(expense.date.format("%Y-%m-%d").to_string())
        .bind(&expense.description)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn set_income(&self, phone: &str, income: f64) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (phone, income) VALUES (?, ?)
            ON CONFLICT(phone) DO UPDATE SET income = excluded.income
            "#,
        )
        .bind(phone)
        .bind(income)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_income(&self, phone: &str) -> Result<f64> {
        let income: Option<f64> =
            sqlx::query_scalar("SELECT income FROM users WHERE phone = ?")
                .bind(phone)
                .fetch_optional(&self.pool)
                .await?;

        Ok(income.unwrap_or(0.0))
    }

    async fn total_expenses(&self, phone: &str) -> Result<f64> {
        let total: f64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(amount), 0.0) FROM expenses WHERE user_phone = ?",
        )
        .bind(phone)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    async fn totals_by_category(&self, phone: &str) -> Result<Vec<CategoryTotal>> {
        let rows = sqlx::query(
            r#"
            SELECT category, SUM(amount) AS total
            FROM expenses
            WHERE user_phone = ?
            GROUP BY category
            ORDER BY category
            "#,
        )
        .bind(phone)
        .fetch_all(&self.pool)
        .await?;

        let mut totals = Vec::with_capacity(rows.len());
        for row in rows {
            totals.push(CategoryTotal {
                category: row.try_get("category")?,
                total: row.try_get("total")?,
            });
        }

        Ok(totals)
    }

    async fn reset_user(&self, phone: &str) -> Result<()> {
        sqlx::query("DELETE FROM expenses WHERE user_phone = ?")
            .bind(phone)
            .execute(&self.pool)
            .await?;

        sqlx::query("DELETE FROM users WHERE phone = ?")
            .bind(phone)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
