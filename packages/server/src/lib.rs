// ABOUTME: Server bootstrap for the todo backend
// ABOUTME: Wires configuration, storage backends and services into the HTTP router

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use axum::http::{HeaderName, HeaderValue, Method};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use todo_api::{create_router, AppState};
use todo_auth::TokenManager;
use todo_core::{utc_offset_from_minutes, SnowflakeGenerator};
use todo_storage::{init_pool, Cache, MemoryCache, ObjectStorage, RedisCache, S3Config};
use todo_tasks::{TaskService, TaskStorage};
use todo_users::{UserService, UserStorage};

pub mod config;
pub mod middleware;

#[cfg(test)]
mod tests;

use config::{CacheMode, Config, StorageType};

const DEFAULT_LOG_FILTER: &str = "todo_server=info,todo_api=info,tower_http=info";

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    // A subscriber may already be installed when embedded in tests
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init();
}

async fn build_cache(config: &Config) -> anyhow::Result<Arc<dyn Cache>> {
    Ok(match config.cache_mode {
        CacheMode::Memory => Arc::new(MemoryCache::new()),
        CacheMode::Redis => Arc::new(
            RedisCache::connect(&config.redis_url)
                .await
                .context("Failed to connect to Redis")?,
        ),
    })
}

fn build_object_storage(config: &Config) -> anyhow::Result<ObjectStorage> {
    Ok(match config.storage_type {
        StorageType::Memory => ObjectStorage::in_memory(&config.object_base_url),
        StorageType::Local => ObjectStorage::local(&config.storage_path, &config.object_base_url)
            .context("Failed to open local object storage")?,
        StorageType::Minio => {
            let s3 = S3Config {
                endpoint: config.minio_endpoint.clone(),
                access_key: config.minio_access_key.clone(),
                secret_key: config.minio_secret_key.clone(),
                bucket: config.storage_bucket.clone(),
                region: config.storage_region.clone(),
            };
            ObjectStorage::s3(&s3, &config.object_base_url)
                .context("Failed to configure MinIO object storage")?
        }
    })
}

/// Build the fully layered application router from `config`
pub async fn build_app(config: &Config) -> anyhow::Result<Router> {
    let pool = init_pool(&config.database_url, config.database_max_connections)
        .await
        .context("Failed to initialize database")?;
    let cache = build_cache(config).await?;
    let objects = build_object_storage(config)?;

    let ids = Arc::new(SnowflakeGenerator::new(config.node_id)?);
    let offset = utc_offset_from_minutes(config.status_utc_offset_minutes).ok_or_else(|| {
        anyhow!(
            "Invalid STATUS_UTC_OFFSET_MINUTES: {}",
            config.status_utc_offset_minutes
        )
    })?;

    let tasks = TaskService::new(Arc::new(TaskStorage::new(pool.clone())), ids.clone(), offset);
    let users = UserService::new(Arc::new(UserStorage::new(pool)), objects, ids);
    let tokens = TokenManager::new(&config.jwt_secret, &config.jwt_algorithm, cache)?;

    let state = AppState::new(tasks, users, Arc::new(tokens));

    let cors = CorsLayer::new()
        .allow_origin(config.cors_origin.parse::<HeaderValue>()?)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any)
        .expose_headers([
            HeaderName::from_static(todo_api::response::ACCESS_TOKEN_HEADER),
            HeaderName::from_static(todo_api::response::REFRESH_TOKEN_HEADER),
        ]);

    Ok(create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(middleware::create_panic_handler()))
}

pub async fn run_server() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = Config::from_env()?;
    let app = build_app(&config).await?;

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", config.host, config.port))?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
