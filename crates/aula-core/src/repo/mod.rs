//! Repository contracts for Aula entities.
//!
//! One narrow async contract per entity: lookups return the entity or an
//! absence signal (`Option`), and every method can fail with a
//! connectivity/store error that is distinct from domain errors. Store
//! errors are the only class eligible for transient retry by the caller;
//! the core never retries them silently.
//!
//! All traits are async and backend-agnostic. In-memory fakes are provided
//! for testing via the `memory` module.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Course, Evaluation, Group, Project, User};

pub mod memory;

/// Errors produced by a repository backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The row targeted by an update/delete does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A conditional write lost against a concurrent update.
    #[error("version conflict on {entity} {id}: expected {expected}")]
    VersionConflict {
        entity: &'static str,
        id: String,
        expected: u64,
    },

    /// A unique key (user email, matricula) is already taken.
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("store connection failed: {0}")]
    Connection(String),

    #[error("store backend error: {0}")]
    Backend(String),

    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl StoreError {
    /// Shorthand for a missing row.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

/// Result type for repository operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// User persistence contract.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fetch by id, `None` when absent.
    async fn get(&self, id: Uuid) -> StoreResult<Option<User>>;

    /// Fetch by normalized email.
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Fetch by 8-digit matricula.
    async fn find_by_matricula(&self, matricula: &str) -> StoreResult<Option<User>>;

    /// Insert a new user. Fails with `UniqueViolation` when the email is
    /// already registered.
    async fn create(&self, user: &User) -> StoreResult<()>;

    /// Overwrite an existing user row.
    async fn update(&self, user: &User) -> StoreResult<()>;

    /// All users of a cohort.
    async fn list_by_group(&self, group_id: Uuid) -> StoreResult<Vec<User>>;
}

/// Group persistence contract.
#[async_trait]
pub trait GroupStore: Send + Sync {
    async fn get(&self, id: Uuid) -> StoreResult<Option<Group>>;

    async fn create(&self, group: &Group) -> StoreResult<()>;

    async fn update(&self, group: &Group) -> StoreResult<()>;

    /// All groups whose `active` flag is set.
    async fn list_active(&self) -> StoreResult<Vec<Group>>;
}

/// Course persistence contract.
#[async_trait]
pub trait CourseStore: Send + Sync {
    async fn get(&self, id: Uuid) -> StoreResult<Option<Course>>;

    async fn create(&self, course: &Course) -> StoreResult<()>;

    async fn update(&self, course: &Course) -> StoreResult<()>;

    /// Active courses of one career.
    async fn list_by_career(&self, career: &str) -> StoreResult<Vec<Course>>;
}

/// Project persistence contract.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn get(&self, id: Uuid) -> StoreResult<Option<Project>>;

    async fn create(&self, project: &Project) -> StoreResult<()>;

    /// Conditional write: succeeds only when the stored row still carries
    /// `expected_version`, and bumps the version by one. Fails with
    /// `VersionConflict` when a concurrent update won the race.
    async fn update(&self, project: &Project, expected_version: u64) -> StoreResult<()>;

    async fn delete(&self, id: Uuid) -> StoreResult<()>;

    /// Every project (gallery listing).
    async fn list(&self) -> StoreResult<Vec<Project>>;

    /// Projects of one cohort.
    async fn list_by_group(&self, group_id: Uuid) -> StoreResult<Vec<Project>>;
}

/// Evaluation persistence contract.
#[async_trait]
pub trait EvaluationStore: Send + Sync {
    async fn get(&self, id: Uuid) -> StoreResult<Option<Evaluation>>;

    async fn create(&self, evaluation: &Evaluation) -> StoreResult<()>;

    async fn update(&self, evaluation: &Evaluation) -> StoreResult<()>;

    async fn delete(&self, id: Uuid) -> StoreResult<()>;

    /// All evaluations of a project, oldest first.
    async fn list_by_project(&self, project_id: Uuid) -> StoreResult<Vec<Evaluation>>;
}
