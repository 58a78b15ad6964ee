use std::sync::Arc;

use anyhow::Context;
use axum::{extract::DefaultBodyLimit, middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::auth::UserDirectory;
use crate::config::{AppConfig, Environment};
use crate::database::{fixtures, CardStore, MemoryCardStore, PgCardStore};
use crate::error::ApiError;
use crate::handlers::{self, cashcards};
use crate::middleware::{basic_auth_middleware, require_card_owner};
use crate::state::AppState;

/// Build the router: public `/health` plus everything under `/cashcards`,
/// which is guarded as a whole.
pub fn app(state: AppState) -> Router {
    let enable_request_logging = state.api.enable_request_logging;
    let body_limit = state.api.max_request_size_bytes;

    let router = Router::new()
        .route("/health", get(handlers::health))
        .nest("/cashcards", cashcard_routes(state.clone()))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state);

    if enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

fn cashcard_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(cashcards::list).post(cashcards::create))
        .route(
            "/:id",
            get(cashcards::get)
                .put(cashcards::put)
                .delete(cashcards::delete),
        )
        .fallback(unmatched_card_path)
        // `layer` rather than `route_layer` so the fallback is guarded too.
        // Layers run bottom-up: authenticate (401) before the role check (403)
        .layer(middleware::from_fn(require_card_owner))
        .layer(middleware::from_fn_with_state(state, basic_auth_middleware))
}

async fn unmatched_card_path() -> ApiError {
    ApiError::NotFound
}

/// Load the user directory: the configured YAML file, or the built-in test
/// users outside production.
pub fn load_users(config: &AppConfig) -> anyhow::Result<UserDirectory> {
    let users = match &config.security.users_file {
        Some(path) => UserDirectory::from_yaml_file(path)
            .with_context(|| format!("failed to load users from {}", path.display()))?,
        None if config.environment == Environment::Production => {
            anyhow::bail!("SECURITY_USERS_FILE must be set in production");
        }
        None => {
            tracing::warn!("No SECURITY_USERS_FILE configured; using built-in test users");
            UserDirectory::test_users(config.security.bcrypt_cost)?
        }
    };
    tracing::info!("Loaded {} users", users.len());
    Ok(users)
}

/// Pick the store backend: PostgreSQL when `DATABASE_URL` is set, in-memory otherwise.
pub async fn build_store(config: &AppConfig) -> anyhow::Result<Arc<dyn CardStore>> {
    let seed = config.database.seed_fixtures;

    if config.database.url.is_some() {
        let store = PgCardStore::connect(&config.database)
            .await
            .context("failed to connect to PostgreSQL")?;
        if seed {
            store.seed(&fixtures::demo_cards()).await?;
        }
        tracing::info!("Using PostgreSQL card store");
        Ok(Arc::new(store))
    } else {
        let store = if seed {
            MemoryCardStore::with_cards(fixtures::demo_cards())
        } else {
            MemoryCardStore::new()
        };
        tracing::info!("Using in-memory card store (seed_fixtures={})", seed);
        Ok(Arc::new(store))
    }
}

pub async fn build_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let store = build_store(config).await?;
    let users = load_users(config)?;
    Ok(AppState::new(store, users, config.api.clone()))
}

/// Bind, serve until Ctrl-C.
pub async fn serve(config: AppConfig) -> anyhow::Result<()> {
    tracing::info!("Starting Cash Card API in {:?} mode", config.environment);

    let state = build_state(&config).await?;
    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Cash Card API listening on http://{}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn production_requires_a_users_file() {
        let mut config = AppConfig::production();
        config.security.bcrypt_cost = 4;

        let err = load_users(&config).unwrap_err();
        assert!(err.to_string().contains("SECURITY_USERS_FILE"));
    }

    #[test]
    fn development_and_staging_fall_back_to_test_users() {
        for mut config in [AppConfig::development(), AppConfig::staging()] {
            config.security.bcrypt_cost = 4;
            assert_eq!(load_users(&config).unwrap().len(), 3);
        }
    }

    #[test]
    fn production_loads_a_configured_users_file() {
        let hash = bcrypt::hash("s3cret", 4).unwrap();
        let yaml = format!(
            "- username: alice\n  password_hash: \"{}\"\n  roles: [card-owner]\n",
            hash
        );
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, yaml.as_bytes()).unwrap();

        let mut config = AppConfig::production();
        config.security.users_file = Some(file.path().to_path_buf());
        assert_eq!(load_users(&config).unwrap().len(), 1);
    }
}
