pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod leads;
pub mod state;

use anyhow::Context;

pub fn init_logging() {
    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "leadvault=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }
}

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_logging();

    let config = config::AppConfig::from_env()?;
    let host = config.host.clone();
    let port = config.port;

    let state = state::AppState::init(config).await?;

    sqlx::migrate!("./migrations")
        .run(&state.db)
        .await
        .context("run migrations")?;

    auth::seed::ensure_default_users(&state.db).await?;

    let app = app::build_app(state);
    app::serve(app, &host, port).await
}
