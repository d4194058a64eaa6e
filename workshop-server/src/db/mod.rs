//! Database Module
//!
//! SQLite connection pool, migrations and the store that backs the
//! fulfillment collaborator interfaces.

pub mod repository;

use crate::fulfillment::ports::{OrderStore, PaymentEventLog, ProductLookup, StockStore, UserStore};
use async_trait::async_trait;
use repository::{RepoResult, order, payment_event, product, stock, user};
use shared::error::AppError;
use shared::models::{
    GuestCreate, Order, OrderStatus, PaymentStatus, Product, StockEntry, StockUpsert, User,
};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::str::FromStr;

/// Database service that owns a SQLite connection pool
#[derive(Clone)]
pub struct DbService {
    pub pool: SqlitePool,
}

impl DbService {
    /// Open (creating if needed) the database in WAL mode and apply migrations
    pub async fn new(db_path: &str) -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{db_path}"))
            .map_err(|e| AppError::database(format!("Invalid database path: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .pragma("foreign_keys", "ON")
            .busy_timeout(std::time::Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;

        tracing::info!(path = %db_path, "Database connection established (SQLite WAL)");

        sqlx::migrate!("./migrations")
            .set_ignore_missing(true)
            .run(&pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to apply migrations: {e}")))?;
        tracing::info!("Database migrations applied");

        Ok(Self { pool })
    }

    /// Liveness probe used by the health endpoint
    pub async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(e.to_string()))?;
        Ok(())
    }
}

/// SQLite implementation of every fulfillment collaborator
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(db: &DbService) -> Self {
        Self {
            pool: db.pool.clone(),
        }
    }
}

#[async_trait]
impl ProductLookup for SqliteStore {
    async fn find_product(&self, id: i64) -> RepoResult<Option<Product>> {
        product::find_by_id(&self.pool, id).await
    }
}

#[async_trait]
impl UserStore for SqliteStore {
    async fn find_user(&self, id: i64) -> RepoResult<Option<User>> {
        user::find_by_id(&self.pool, id).await
    }

    async fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        user::find_by_email(&self.pool, email).await
    }

    async fn create_guest(&self, data: &GuestCreate) -> RepoResult<User> {
        user::create_guest(&self.pool, data).await
    }
}

#[async_trait]
impl OrderStore for SqliteStore {
    async fn create_with_items(&self, data: &Order) -> RepoResult<()> {
        order::create_with_items(&self.pool, data).await
    }

    async fn find_order(&self, id: i64) -> RepoResult<Option<Order>> {
        order::find_by_id(&self.pool, id).await
    }

    async fn find_with_items(&self, id: i64) -> RepoResult<Option<Order>> {
        order::find_with_items(&self.pool, id).await
    }

    async fn list_by_user(&self, user_id: i64) -> RepoResult<Vec<Order>> {
        order::list_by_user(&self.pool, user_id).await
    }

    async fn list_all(&self, status: Option<OrderStatus>) -> RepoResult<Vec<Order>> {
        order::list_all(&self.pool, status).await
    }

    async fn update_status(&self, id: i64, status: OrderStatus) -> RepoResult<()> {
        order::update_status(&self.pool, id, status).await
    }

    async fn update_payment_status(&self, id: i64, status: PaymentStatus) -> RepoResult<()> {
        order::update_payment_status(&self.pool, id, status).await
    }

    async fn count_by_status(&self, status: OrderStatus) -> RepoResult<i64> {
        order::count_by_status(&self.pool, status).await
    }
}

#[async_trait]
impl StockStore for SqliteStore {
    async fn adjust_quantity(&self, material: &str, delta: f64) -> RepoResult<()> {
        stock::adjust_quantity(&self.pool, material, delta).await
    }

    async fn list_stock(&self) -> RepoResult<Vec<StockEntry>> {
        stock::list(&self.pool).await
    }

    async fn upsert_stock(&self, data: &StockUpsert) -> RepoResult<StockEntry> {
        stock::upsert(&self.pool, data).await
    }
}

#[async_trait]
impl PaymentEventLog for SqliteStore {
    async fn claim(&self, key: &str, order_id: i64, kind: &str) -> RepoResult<bool> {
        payment_event::claim(&self.pool, key, order_id, kind).await
    }

    async fn release(&self, key: &str) -> RepoResult<()> {
        payment_event::release(&self.pool, key).await
    }
}
