#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request},
    Router,
};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower::ServiceExt;
use uuid::Uuid;

use leadvault::{
    app::build_app,
    auth::seed::ensure_default_users,
    config::{AppConfig, JwtConfig},
    state::AppState,
};

pub struct TestApp {
    pub router: Router,
    pub db: SqlitePool,
    db_filename: String,
}

impl TestApp {
    pub async fn new() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let config = AppConfig {
            host: "127.0.0.1".into(),
            port: 0,
            database_url: format!("sqlite://{}?mode=rwc", db_filename),
            jwt: JwtConfig {
                secret: "test-secret".into(),
                issuer: "leadvault-test".into(),
                ttl_hours: 24,
            },
        };

        let state = AppState::init(config)
            .await
            .expect("failed to init test state");

        sqlx::migrate!("./migrations")
            .run(&state.db)
            .await
            .expect("failed to migrate test db");

        ensure_default_users(&state.db)
            .await
            .expect("failed to seed test users");

        let db = state.db.clone();
        let router = build_app(state);

        Self {
            router,
            db,
            db_filename,
        }
    }

    /// Log in through the real endpoint and hand back the bearer token.
    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/auth/login")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        json!({ "username": username, "password": password }).to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        if !response.status().is_success() {
            panic!("login failed in test helper: status {}", response.status());
        }

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        body["token"]
            .as_str()
            .expect("no token in login response")
            .to_string()
    }

    /// Row count straight from the database, for asserting what actually
    /// got persisted.
    pub async fn lead_count(&self) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM leads")
            .fetch_one(&self.db)
            .await
            .expect("failed to count leads")
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        // WAL mode leaves sidecar files next to the database.
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", self.db_filename, suffix));
        }
    }
}
