//! Shared fixtures for integration tests
#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use shared::models::Order;
use sqlx::SqlitePool;
use tempfile::TempDir;
use workshop_server::fulfillment::ports::CheckoutGateway;
use workshop_server::notify::{BoxError, Notifier};
use workshop_server::{Config, DbService, ServerState};

pub const WEBHOOK_SECRET: &str = "whsec_test_secret";

/// Notifier that keeps every message in memory
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<SentMessage>>,
    fail: AtomicBool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SentMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<SentMessage> {
        self.sent.lock().clone()
    }

    pub fn with_subject(&self, subject: &str) -> Vec<SentMessage> {
        self.messages()
            .into_iter()
            .filter(|m| m.subject == subject)
            .collect()
    }

    /// Make every send fail from now on (messages are still recorded)
    pub fn fail_sends(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    /// Wait for spawned deliveries to land
    pub async fn wait_for(&self, subject: &str, count: usize) -> Vec<SentMessage> {
        for _ in 0..100 {
            let found = self.with_subject(subject);
            if found.len() >= count {
                return found;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.with_subject(subject)
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), BoxError> {
        self.sent.lock().push(SentMessage {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        if self.fail.load(Ordering::SeqCst) {
            return Err("smtp unavailable".into());
        }
        Ok(())
    }
}

/// Checkout gateway that hands out predictable URLs
#[derive(Default)]
pub struct FakeCheckout {
    sessions: Mutex<Vec<i64>>,
    fail: AtomicBool,
}

impl FakeCheckout {
    pub fn sessions(&self) -> Vec<i64> {
        self.sessions.lock().clone()
    }

    pub fn fail_sessions(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl CheckoutGateway for FakeCheckout {
    async fn create_session(&self, order: &Order) -> Result<String, BoxError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err("gateway unavailable".into());
        }
        self.sessions.lock().push(order.id);
        Ok(format!("https://checkout.test/session/{}", order.id))
    }
}

pub struct TestEnv {
    // Held so the database directory outlives the test
    _dir: TempDir,
    pub state: ServerState,
    pub notifier: Arc<RecordingNotifier>,
    pub checkout: Arc<FakeCheckout>,
}

impl TestEnv {
    pub fn pool(&self) -> &SqlitePool {
        &self.state.db.pool
    }
}

pub async fn setup() -> TestEnv {
    setup_with(|_| {}).await
}

pub async fn setup_with(configure: impl FnOnce(&mut Config)) -> TestEnv {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("workshop.db");
    let mut config = Config::with_overrides(db_path.to_string_lossy(), 0);
    config.stripe_webhook_secret = WEBHOOK_SECRET.into();
    configure(&mut config);

    let db = DbService::new(&config.database_path).await.unwrap();
    let notifier = Arc::new(RecordingNotifier::default());
    let checkout = Arc::new(FakeCheckout::default());
    let state = ServerState::with_parts(config, db, notifier.clone(), checkout.clone());

    TestEnv {
        _dir: dir,
        state,
        notifier,
        checkout,
    }
}

pub async fn seed_product(
    pool: &SqlitePool,
    id: i64,
    base_price: f64,
    base_days: i64,
    material: &str,
) {
    sqlx::query(
        "INSERT INTO products (id, name, base_price, base_production_time_days, material) VALUES (?1, ?2, ?3, ?4, ?5)",
    )
    .bind(id)
    .bind(format!("Product {id}"))
    .bind(base_price)
    .bind(base_days)
    .bind(material)
    .execute(pool)
    .await
    .unwrap();
}

/// Absolute price modifier with a day modifier
pub async fn seed_option(
    pool: &SqlitePool,
    id: i64,
    product_id: i64,
    option_type: &str,
    price_delta: f64,
    days: i64,
) {
    sqlx::query(
        "INSERT INTO product_options (id, product_id, option_type, name, price_modifier_type, price_modifier_value, production_time_modifier_days) \
         VALUES (?1, ?2, ?3, ?4, 'absolute', ?5, ?6)",
    )
    .bind(id)
    .bind(product_id)
    .bind(option_type)
    .bind(format!("Option {id}"))
    .bind(price_delta)
    .bind(days)
    .execute(pool)
    .await
    .unwrap();
}

pub async fn seed_user(pool: &SqlitePool, id: i64, name: &str, email: &str) {
    sqlx::query(
        "INSERT INTO users (id, name, email, address, role, password_hash, created_at) VALUES (?1, ?2, ?3, 'Main St 1', 'client', 'x', 0)",
    )
    .bind(id)
    .bind(name)
    .bind(email)
    .execute(pool)
    .await
    .unwrap();
}

/// Bare orders for `user_id` in the given status
pub async fn seed_orders_with_status(pool: &SqlitePool, user_id: i64, status: &str, count: i64) {
    for n in 0..count {
        sqlx::query(
            "INSERT INTO orders (id, user_id, status, payment_status, payment_method, total_price, estimated_production_time_days, created_at, updated_at) \
             VALUES (?1, ?2, ?3, 'paid', 'card', 1.0, 1, 0, 0)",
        )
        .bind(900_000 + user_id * 100 + n)
        .bind(user_id)
        .bind(status)
        .execute(pool)
        .await
        .unwrap();
    }
}

pub async fn seed_stock(pool: &SqlitePool, material: &str, quantity: f64) {
    sqlx::query(
        "INSERT INTO stock (material_name, quantity_available, unit, updated_at) VALUES (?1, ?2, 'pcs', 0)",
    )
    .bind(material)
    .bind(quantity)
    .execute(pool)
    .await
    .unwrap();
}

pub async fn stock_level(pool: &SqlitePool, material: &str) -> Option<f64> {
    sqlx::query_scalar::<_, f64>("SELECT quantity_available FROM stock WHERE material_name = ?")
        .bind(material)
        .fetch_optional(pool)
        .await
        .unwrap()
}

pub async fn count_rows(pool: &SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .unwrap()
}
