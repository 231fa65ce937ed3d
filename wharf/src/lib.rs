//! # wharf: file upload and download for the logistics admin dashboard
//!
//! `wharf` is the file subsystem behind the logistics admin dashboard (organizations,
//! agreements, godowns). Dashboard forms post files to it; pages link to it to show or
//! download them again.
//!
//! ## Overview
//!
//! Two routes carry the weight:
//!
//! - `POST /api/upload` takes a multipart form with `user_id`, `folder_id` and one or more
//!   `files` parts, validates it, and stores the first file on disk with a metadata record.
//! - `GET /api/files/{id}` looks the record up, checks the blob is still inside the storage
//!   root, and streams it back with the MIME type recorded at upload.
//!
//! Everything except the download stream answers with a uniform JSON envelope, see
//! [`api::envelope`].
//!
//! ## Architecture
//!
//! The HTTP layer is built on [Axum](https://github.com/tokio-rs/axum). Metadata lives in
//! SQLite, accessed through `sqlx`; file content lives below a configured directory and is
//! reached through the [`db::handlers::file_storage::FileStorage`] trait.
//!
//! ### Core Components
//!
//! The **API layer** ([`api`]) holds the handlers, request/response models and the envelope.
//! The **gate** ([`auth`]) checks a static API token on routes that change state. The
//! **database layer** ([`db`]) uses the repository pattern: [`db::handlers::Users`],
//! [`db::handlers::Folders`] and [`db::handlers::Files`] each wrap a borrowed connection, and
//! `Files` is scoped to an [`types::OwnerScope`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use wharf::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = wharf::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     wharf::telemetry::init_telemetry(&config.log_filter)?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     })
//!     .await
//! }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
mod openapi;
pub mod telemetry;
pub mod types;

#[cfg(test)]
pub mod test_utils;

use crate::{
    auth::middleware::{API_KEY_HEADER, require_api_token},
    db::handlers::file_storage::{FileStorage, create_file_storage},
    openapi::ApiDoc,
};
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderName, HeaderValue, Method};
use axum::{
    Json, Router, http,
    middleware::from_fn_with_state,
    routing::{delete, get, post},
};
use bon::Builder;
pub use config::Config;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use std::str::FromStr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument, warn};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use types::{FileId, FolderId, UserId};

/// Application state shared across all request handlers.
///
/// # Example
///
/// ```ignore
/// let state = AppState::builder()
///     .db(pool)
///     .config(config)
///     .storage(storage)
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Config,
    pub storage: Arc<dyn FileStorage>,
}

/// Get the wharf database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Open the SQLite pool described by the configuration and run migrations.
///
/// The database file is created when it does not exist yet.
async fn setup_database(config: &Config) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&config.database.url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal);

    let pool_settings = &config.database.pool;
    let pool = SqlitePoolOptions::new()
        .max_connections(pool_settings.max_connections)
        .min_connections(pool_settings.min_connections)
        .acquire_timeout(pool_settings.acquire_timeout)
        .connect_with(options)
        .await?;

    migrator().run(&pool).await?;
    info!("Database ready");

    Ok(pool)
}

/// Create CORS layer from configuration. Returns `None` when no origins are configured.
fn create_cors_layer(config: &Config) -> anyhow::Result<Option<CorsLayer>> {
    let allowed = &config.cors.allowed_origins;
    if allowed.is_empty() {
        return Ok(None);
    }

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([
            http::header::AUTHORIZATION,
            http::header::CONTENT_TYPE,
            HeaderName::from_static(API_KEY_HEADER),
        ])
        .expose_headers([http::header::CONTENT_TYPE]);

    if allowed.iter().any(|origin| origin == "*") {
        return Ok(Some(cors.allow_origin(Any)));
    }

    let mut origins = Vec::new();
    for origin in allowed {
        origins.push(origin.parse::<HeaderValue>()?);
    }

    Ok(Some(cors.allow_origin(AllowOrigin::list(origins))))
}

/// Build the application router.
///
/// Routes under `/api` change state only through `POST` and `DELETE`; those method
/// routes carry the token gate, reads do not. The upload route additionally carries
/// the configured body limit.
#[instrument(skip_all)]
pub fn build_router(state: &AppState) -> anyhow::Result<Router> {
    let gate = from_fn_with_state(state.clone(), require_api_token);
    let upload_limit = state.config.files.max_upload_bytes;

    let api_routes = Router::new()
        // Files
        .route(
            "/upload",
            post(api::handlers::files::upload_files)
                .layer(DefaultBodyLimit::max(upload_limit))
                .route_layer(gate.clone()),
        )
        .route("/files", get(api::handlers::files::download_missing_id))
        .route("/files/", get(api::handlers::files::download_missing_id))
        .route(
            "/files/{id}",
            get(api::handlers::files::download_file).merge(delete(api::handlers::files::delete_file).route_layer(gate.clone())),
        )
        .route("/files/{id}/metadata", get(api::handlers::files::get_file_metadata))
        // Folders
        .route(
            "/folders",
            get(api::handlers::folders::list_folders).merge(post(api::handlers::folders::create_folder).route_layer(gate.clone())),
        )
        .route("/folders/{id}", get(api::handlers::folders::get_folder))
        .route("/folders/{id}/files", get(api::handlers::folders::list_folder_files))
        // Users
        .route(
            "/users",
            get(api::handlers::users::list_users).merge(post(api::handlers::users::create_user).route_layer(gate)),
        )
        .route("/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .with_state(state.clone());

    let mut router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .nest("/api", api_routes)
        .merge(Scalar::with_url("/api/docs", ApiDoc::openapi()));

    if let Some(cors) = create_cors_layer(&state.config)? {
        router = router.layer(cors);
    }

    // Add tracing layer
    let router = router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// Main application struct that owns all resources.
///
/// 1. **Create**: [`Application::new`] opens the database, runs migrations, prepares the
///    storage root and builds the router
/// 2. **Serve**: [`Application::serve`] binds to a TCP port and starts handling requests
/// 3. **Shutdown**: When the shutdown signal resolves, in-flight requests finish and the
///    pool is closed
pub struct Application {
    router: Router,
    config: Config,
    pool: SqlitePool,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        Self::new_with_pool(config, None).await
    }

    /// Create an application on an existing pool. Migrations are assumed to have run.
    pub async fn new_with_pool(config: Config, pool: Option<SqlitePool>) -> anyhow::Result<Self> {
        debug!(
            bind_address = %config.bind_address(),
            storage_root = ?config.files.root,
            "Starting wharf"
        );

        let pool = match pool {
            Some(pool) => pool,
            None => setup_database(&config).await?,
        };

        let storage = create_file_storage(&config.files).await?;

        if config.auth.api_tokens.is_empty() {
            warn!("No API tokens configured: write routes are open to any caller");
        }

        let app_state = AppState::builder().db(pool.clone()).config(config.clone()).storage(storage).build();

        let router = build_router(&app_state)?;

        Ok(Self { router, config, pool })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router.into_make_service()).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "wharf listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        // Run the server with graceful shutdown
        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        // Close database connections
        info!("Closing database connections...");
        self.pool.close().await;

        Ok(())
    }
}
