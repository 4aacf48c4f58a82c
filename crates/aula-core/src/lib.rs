//! Aula Core Library
//!
//! Domain model for academic project collaboration: users and roles,
//! student cohorts, project teams, canvas documents, teacher evaluations
//! and the public ranking layer. Transport, authentication and storage
//! engines live elsewhere; this crate owns the invariants.

pub mod accounts;
pub mod catalog;
pub mod domain;
pub mod grading;
pub mod identity;
pub mod lifecycle;
pub mod membership;
pub mod obs;
pub mod ranking;
pub mod repo;
pub mod sanitize;
pub mod telemetry;

pub use domain::{
    BlockKind, ContentBlock, Course, DomainError, Evaluation, EvaluationKind, Group, MetaValue,
    Outcome, Project, ProjectState, Result, Role, StarRating, TeacherAssignment, User,
    ValidationError,
};

pub use accounts::AccountsApi;
pub use catalog::CatalogApi;
pub use grading::EvaluationApi;
pub use identity::{resolve, ResolvedIdentity};
pub use lifecycle::{NewProject, ProjectLifecycleApi, ProjectPatch};
pub use membership::MembershipApi;
pub use ranking::{rank_projects, ranking_ord, RankingApi, ScoreScale};
pub use repo::{
    CourseStore, EvaluationStore, GroupStore, ProjectStore, StoreError, StoreResult, UserStore,
};
pub use sanitize::{sanitize_block, sanitize_meta};
pub use telemetry::init_tracing;

/// Maximum attempts for a version-checked conditional write.
pub const MAX_WRITE_ATTEMPTS: usize = 3;

/// Aula version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
