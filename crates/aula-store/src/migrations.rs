//! SurrealDB schema migrations and initialization.
//!
//! Provides initialization functions to set up all tables with the
//! constraints and indexes the repository implementations rely on.

use surrealdb::engine::any::Any;
use surrealdb::Surreal;
use tracing::{debug, info};

use aula_core::repo::{StoreError, StoreResult};

/// Initialize all Aula tables.
///
/// Should be called once on connection. Safe to call multiple times
/// (idempotent).
pub async fn init_schema(db: &Surreal<Any>) -> StoreResult<()> {
    info!("Initializing Aula SurrealDB schema");

    init_users_table(db).await?;
    init_groups_table(db).await?;
    init_courses_table(db).await?;
    init_projects_table(db).await?;
    init_evaluations_table(db).await?;

    info!("Aula schema initialization complete");
    Ok(())
}

async fn run(db: &Surreal<Any>, sql: &str) -> StoreResult<()> {
    db.query(sql)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;
    Ok(())
}

/// Initialize the `users` table.
///
/// Constraints:
/// - `user_id` and `email` are unique.
/// - `matricula` is unique among students (application ensures presence).
async fn init_users_table(db: &Surreal<Any>) -> StoreResult<()> {
    debug!("Initializing users table");

    let sql = r#"
        DEFINE TABLE users
            SCHEMALESS
            PERMISSIONS
                FOR create FULL
                FOR select FULL
                FOR update FULL
                FOR delete NONE;

        -- One row per account
        DEFINE INDEX idx_user_id ON TABLE users COLUMNS user_id UNIQUE;

        -- First-login upsert is keyed on the normalized email
        DEFINE INDEX idx_user_email ON TABLE users COLUMNS email UNIQUE;

        -- Member targets are looked up by matricula
        DEFINE INDEX idx_user_matricula ON TABLE users COLUMNS matricula;

        -- Cohort listings
        DEFINE INDEX idx_user_group ON TABLE users COLUMNS group_id;
    "#;

    run(db, sql).await?;
    info!("users table initialized");
    Ok(())
}

/// Initialize the `groups` table.
async fn init_groups_table(db: &Surreal<Any>) -> StoreResult<()> {
    debug!("Initializing groups table");

    let sql = r#"
        DEFINE TABLE groups
            SCHEMALESS
            PERMISSIONS
                FOR create FULL
                FOR select FULL
                FOR update FULL
                FOR delete NONE;

        DEFINE INDEX idx_group_id ON TABLE groups COLUMNS group_id UNIQUE;
        DEFINE INDEX idx_group_active ON TABLE groups COLUMNS active;
    "#;

    run(db, sql).await?;
    info!("groups table initialized");
    Ok(())
}

/// Initialize the `courses` table.
async fn init_courses_table(db: &Surreal<Any>) -> StoreResult<()> {
    debug!("Initializing courses table");

    let sql = r#"
        DEFINE TABLE courses
            SCHEMALESS
            PERMISSIONS
                FOR create FULL
                FOR select FULL
                FOR update FULL
                FOR delete NONE;

        DEFINE INDEX idx_course_id ON TABLE courses COLUMNS course_id UNIQUE;
        DEFINE INDEX idx_course_career ON TABLE courses COLUMNS career;
    "#;

    run(db, sql).await?;
    info!("courses table initialized");
    Ok(())
}

/// Initialize the `projects` table.
///
/// Constraints:
/// - `project_id` is unique.
/// - Conditional writes are keyed on `(project_id, version)`; the version
///   check itself happens in the UPDATE statement.
async fn init_projects_table(db: &Surreal<Any>) -> StoreResult<()> {
    debug!("Initializing projects table");

    let sql = r#"
        DEFINE TABLE projects
            SCHEMALESS
            PERMISSIONS
                FOR create FULL
                FOR select FULL
                FOR update FULL
                FOR delete FULL;

        DEFINE INDEX idx_project_id ON TABLE projects COLUMNS project_id UNIQUE;

        -- Cohort listings
        DEFINE INDEX idx_project_group ON TABLE projects COLUMNS group_id;

        -- Gallery ordering reads by creation time
        DEFINE INDEX idx_project_created_at ON TABLE projects COLUMNS created_at;
    "#;

    run(db, sql).await?;
    info!("projects table initialized");
    Ok(())
}

/// Initialize the `evaluations` table.
async fn init_evaluations_table(db: &Surreal<Any>) -> StoreResult<()> {
    debug!("Initializing evaluations table");

    let sql = r#"
        DEFINE TABLE evaluations
            SCHEMALESS
            PERMISSIONS
                FOR create FULL
                FOR select FULL
                FOR update FULL
                FOR delete FULL;

        DEFINE INDEX idx_evaluation_id ON TABLE evaluations COLUMNS evaluation_id UNIQUE;

        -- Per-project listings, oldest first
        DEFINE INDEX idx_evaluation_project ON TABLE evaluations COLUMNS project_id, created_at;
    "#;

    run(db, sql).await?;
    info!("evaluations table initialized");
    Ok(())
}
