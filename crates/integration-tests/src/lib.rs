//! Integration tests for Clientele.
//!
//! # Running Tests
//!
//! ```bash
//! # Point at a disposable database; every test flushes it
//! export DATABASE_URL=postgres://localhost/clientele_test
//!
//! cargo test -p clientele-integration-tests -- --ignored
//! ```
//!
//! Tests that touch the database hold a process-wide lock for their whole
//! run, so they never observe each other's rows.

#![allow(clippy::expect_used)]

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use rust_decimal::Decimal;
use secrecy::SecretString;
use sqlx::PgPool;
use tokio::sync::{Mutex, MutexGuard};

use clientele_core::{CustomerDraft, CustomerId, ProductDraft};
use clientele_server::config::{PoolConfig, ServerConfig};
use clientele_server::db::maintenance;
use clientele_server::state::{AppState, Service};

static DB_LOCK: Mutex<()> = Mutex::const_new(());

/// A migrated, empty database with the production service wired over it.
pub struct TestContext {
    pub pool: PgPool,
    pub state: AppState,
    _guard: MutexGuard<'static, ()>,
}

impl TestContext {
    /// Connect to `DATABASE_URL`, apply migrations and flush all rows.
    ///
    /// # Panics
    ///
    /// Panics if `DATABASE_URL` is unset or the database is unreachable.
    pub async fn new() -> Self {
        let guard = DB_LOCK.lock().await;

        let url = std::env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set to run integration tests");
        let pool = PgPool::connect(&url)
            .await
            .expect("Failed to connect to test database");

        sqlx::migrate!("../server/migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");
        maintenance::flush_all(&pool)
            .await
            .expect("Failed to flush test database");

        let state = AppState::new(&test_config(url), pool.clone());

        Self {
            pool,
            state,
            _guard: guard,
        }
    }

    #[must_use]
    pub fn service(&self) -> &Service {
        self.state.service()
    }

    /// Serve the full router on an ephemeral port and return its base URL.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn spawn_server(&self) -> String {
        let listener = tokio::net::TcpListener::bind(SocketAddr::new(
            IpAddr::V4(Ipv4Addr::LOCALHOST),
            0,
        ))
        .await
        .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has no address");

        let app = clientele_server::app(self.state.clone());
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                panic!("Test server failed: {e}");
            }
        });

        format!("http://{addr}/api")
    }
}

fn test_config(url: String) -> ServerConfig {
    ServerConfig {
        database_url: SecretString::from(url),
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        pool: PoolConfig::default(),
        cache_capacity: ServerConfig::DEFAULT_CACHE_CAPACITY,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// The customer used throughout the scenarios.
#[must_use]
pub fn jane_doe() -> CustomerDraft {
    CustomerDraft {
        name: "Jane Doe".to_string(),
        age: Some(30),
        address: "123 Main St".to_string(),
        phone_number: Some("555-0100".to_string()),
        aadhar_id: Some("123456789012".to_string()),
        ..CustomerDraft::default()
    }
}

/// A customer with only a passport, distinct from [`jane_doe`].
#[must_use]
pub fn customer_with_passport(name: &str, passport: &str) -> CustomerDraft {
    CustomerDraft {
        name: name.to_string(),
        age: Some(41),
        address: "9 Harbour Rd".to_string(),
        passport_id: Some(passport.to_string()),
        ..CustomerDraft::default()
    }
}

/// One laptop at 1200.00.
#[must_use]
pub fn laptop(customer_id: CustomerId) -> ProductDraft {
    ProductDraft {
        customer_id: Some(customer_id),
        product_name: "Laptop".to_string(),
        quantity: Some(1),
        price: Some(Decimal::new(1200, 0)),
    }
}
