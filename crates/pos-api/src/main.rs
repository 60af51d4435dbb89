//! POS 인증 API 서버.
//!
//! Axum 기반 REST API 서버를 시작합니다.
//! `DATABASE_URL`(또는 `POS__DATABASE__URL`)이 없으면 인메모리 저장소로 실행합니다.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{error, info, warn};

use pos_api::auth::{hash_password, SessionLifetimes};
use pos_api::repository::{InMemoryCredentialStore, PgCredentialStore};
use pos_api::{build_router, AppState};
use pos_core::{
    init_logging, AppConfig, CredentialStore, LogConfig, NewCredential, Role, SigningSecret,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load_default().context("failed to load configuration")?;

    init_logging(LogConfig::from_settings(&config.logging))?;

    info!("Starting POS API server v{}", env!("CARGO_PKG_VERSION"));

    // 서명 키가 없으면 시작하지 않는다.
    let secret = SigningSecret::from_env().inspect_err(|e| error!(error = %e, "Refusing to start"))?;

    let database_url = config
        .database
        .url
        .clone()
        .or_else(|| std::env::var("DATABASE_URL").ok());

    let lifetimes = SessionLifetimes::from(&config.auth);
    let state = match database_url {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .acquire_timeout(Duration::from_secs(config.database.connection_timeout_secs))
                .connect(&url)
                .await
                .context("failed to connect to database")?;
            info!("Database connection established");

            AppState::new(&secret, Arc::new(PgCredentialStore::new(pool.clone())), lifetimes)
                .with_db_pool(pool)
        }
        None => {
            warn!("DATABASE_URL not set, using in-memory credential store");
            let store = Arc::new(InMemoryCredentialStore::new());
            seed_owner(store.as_ref()).await?;
            AppState::new(&secret, store, lifetimes)
        }
    };

    info!(
        access_minutes = lifetimes.access.num_minutes(),
        refresh_days = lifetimes.refresh.num_days(),
        "Token lifetimes configured"
    );

    let app = build_router(
        state,
        Duration::from_secs(config.server.request_timeout_secs),
    )
    .layer(cors_layer());

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("invalid server address")?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("API server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// 인메모리 저장소에 초기 owner 계정 등록.
///
/// `POS_SEED_OWNER_EMAIL`, `POS_SEED_OWNER_PASSWORD`가 모두 설정된 경우에만
/// 가맹점 1에 owner를 생성합니다.
async fn seed_owner(store: &InMemoryCredentialStore) -> anyhow::Result<()> {
    let (Ok(email), Ok(password)) = (
        std::env::var("POS_SEED_OWNER_EMAIL"),
        std::env::var("POS_SEED_OWNER_PASSWORD"),
    ) else {
        warn!("No seed owner configured, in-memory store starts empty");
        return Ok(());
    };

    let digest = hash_password(&password)?;
    let record = store
        .insert(NewCredential::new(1, 0, "owner", &email, digest, Role::Owner))
        .await?;
    info!(identity = record.identity, tenant = record.tenant, "Seed owner created");
    Ok(())
}

/// CORS 레이어.
///
/// `CORS_ORIGINS`(쉼표 구분)가 설정되면 해당 origin만 허용하고,
/// 없으면 개발 모드로 모든 origin을 허용합니다.
fn cors_layer() -> CorsLayer {
    let allow_origin = match std::env::var("CORS_ORIGINS") {
        Ok(origins) if !origins.is_empty() => {
            let origins: Vec<_> = origins
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();

            if origins.is_empty() {
                warn!("CORS_ORIGINS is set but contains no valid origins, allowing any");
                AllowOrigin::any()
            } else {
                info!("CORS configured with {} allowed origins", origins.len());
                AllowOrigin::list(origins)
            }
        }
        _ => {
            warn!("CORS_ORIGINS not set, allowing any origin (development mode)");
            AllowOrigin::any()
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::DELETE,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
            axum::http::header::ACCEPT,
        ])
        .max_age(Duration::from_secs(3600))
}

/// Ctrl+C 또는 SIGTERM 대기.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
