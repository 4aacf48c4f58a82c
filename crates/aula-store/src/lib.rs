//! Aula-Store: SurrealDB backend for the Aula domain
//!
//! Implements the `aula-core` repository contracts on top of SurrealDB,
//! handling all I/O with the document store.
//!
//! ## Key components
//!
//! - [`StoreConfig`]: env-driven connection configuration
//! - [`connect`] / [`connect_memory`]: connection setup + schema init
//! - `Surreal*Store`: one repository implementation per entity

mod config;
pub mod migrations;
mod repos;
pub mod schema;

pub use config::StoreConfig;
pub use repos::{
    SurrealCourseStore, SurrealEvaluationStore, SurrealGroupStore, SurrealProjectStore,
    SurrealUserStore,
};

use surrealdb::engine::any::Any;
use surrealdb::opt::auth::{Database, Root};
use surrealdb::Surreal;
use tracing::info;

use aula_core::repo::{StoreError, StoreResult};

/// Connect to an in-memory instance for testing.
///
/// Connects to `mem://`, selects `aula/main`, and runs the schema
/// initialization.
pub async fn connect_memory() -> StoreResult<Surreal<Any>> {
    let db = surrealdb::engine::any::connect("mem://")
        .await
        .map_err(|e| StoreError::Connection(e.to_string()))?;

    db.use_ns("aula")
        .use_db("main")
        .await
        .map_err(|e| StoreError::Connection(e.to_string()))?;

    migrations::init_schema(&db).await?;

    info!("Aula store connected (in-memory)");
    Ok(db)
}

/// Connect to a configured SurrealDB endpoint and initialize the schema.
pub async fn connect(config: &StoreConfig) -> StoreResult<Surreal<Any>> {
    let db = surrealdb::engine::any::connect(&config.endpoint)
        .await
        .map_err(|e| StoreError::Connection(e.to_string()))?;

    if config.is_root {
        db.signin(Root {
            username: &config.username,
            password: &config.password,
        })
        .await
        .map_err(|e| StoreError::Connection(format!("root auth failed: {e}")))?;
    } else {
        db.signin(Database {
            namespace: &config.namespace,
            database: &config.database,
            username: &config.username,
            password: &config.password,
        })
        .await
        .map_err(|e| StoreError::Connection(format!("database auth failed: {e}")))?;
    }

    db.use_ns(&config.namespace)
        .use_db(&config.database)
        .await
        .map_err(|e| StoreError::Connection(e.to_string()))?;

    migrations::init_schema(&db).await?;

    info!("Aula store connected ({})", config.endpoint);
    Ok(db)
}

/// Connect using the environment.
///
/// Uses [`StoreConfig::from_env`] when the `AULA_DB_*` variables are set;
/// otherwise honors `AULA_DB_URL`; otherwise falls back to local persistence
/// in `.aula/db`.
pub async fn connect_from_env() -> StoreResult<Surreal<Any>> {
    if let Ok(config) = StoreConfig::from_env() {
        return connect(&config).await;
    }

    if let Ok(url) = std::env::var("AULA_DB_URL") {
        let db = surrealdb::engine::any::connect(&url)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        db.use_ns("aula")
            .use_db("main")
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        migrations::init_schema(&db).await?;
        info!("Aula store connected ({})", url);
        return Ok(db);
    }

    // Default to local persistence in .aula/db
    let path = ".aula/db";
    std::fs::create_dir_all(path).map_err(|e| {
        StoreError::Connection(format!("failed to create database directory {path}: {e}"))
    })?;
    let url = format!("surrealkv://{path}");
    info!(
        "No store config or AULA_DB_URL found, using local persistence: {}",
        url
    );

    let db = surrealdb::engine::any::connect(&url)
        .await
        .map_err(|e| StoreError::Connection(format!("failed to connect to {url}: {e}")))?;

    db.use_ns("aula")
        .use_db("main")
        .await
        .map_err(|e| StoreError::Connection(e.to_string()))?;

    migrations::init_schema(&db).await?;
    Ok(db)
}
