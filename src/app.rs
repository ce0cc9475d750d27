/*
 * Responsibility
 * - Config読み込み → 依存生成 → Router 組み立て
 * - Middleware の適用 (bearer / CORS / security headers / http)
 * - axum::serve() で起動
 */
use std::{panic, process};

use anyhow::{Context, Result};
use axum::{Router, routing::get};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::api::v1::handlers::health::health;
use crate::config::{Config, ConfigError};
use crate::error::AppError;
use crate::middleware;
use crate::services::auth::build_jwt_verifier;
use crate::state::AppState;

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,jwt_guard=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // stderr は起動方法によっては見えないので tracing にも必ず流す
        tracing::error!(?info, "panic");

        // development: プロセスごと落として即座に気付けるようにする
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();

    let (config, app) = prepare(Config::from_env())?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

/// Config 検証 → state → Router まで (listener の bind より前の全工程)
///
/// 設定エラー (JWT_SECRET 未設定など) はここで Err になり、`run` は bind せずに終了する。
pub fn prepare(config: Result<Config, ConfigError>) -> Result<(Config, Router)> {
    let config = match config {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "refusing to start");
            return Err(err.into());
        }
    };

    let state = build_state(&config);
    let app = build_router(state, &config);

    Ok((config, app))
}

pub fn build_state(config: &Config) -> AppState {
    // 検証器は起動時に一度だけ組み立て、全リクエストで read-only に共有する
    AppState::new(build_jwt_verifier(config))
}

pub fn build_router(state: AppState, config: &Config) -> Router {
    // nest された /api/v1 にも継承される
    async fn not_found() -> AppError {
        AppError::NotFound
    }

    let router = Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api::v1::routes(state.clone()))
        .fallback(not_found)
        .with_state(state);

    let router = middleware::security_headers::apply(router);
    let router = middleware::cors::apply(router, config);
    middleware::http::apply(router, config)
}
