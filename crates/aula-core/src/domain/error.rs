//! Domain-level error taxonomy for Aula.

use uuid::Uuid;

/// Errors produced by input validation.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("email must not be empty")]
    EmptyEmail,

    #[error("project title must not be empty")]
    EmptyTitle,

    #[error("grade {grade} out of range, expected 0-100")]
    GradeOutOfRange { grade: u16 },

    #[error("official evaluation requires a grade")]
    GradeRequired,

    #[error("suggestion evaluation must not carry a grade")]
    GradeNotAllowed,

    #[error("star rating {stars} out of range, expected 1-5")]
    StarsOutOfRange { stars: u8 },

    #[error("invalid project state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("course term index must be >= 1")]
    TermIndexOutOfRange,

    #[error("user {user} does not hold the {expected} role")]
    RoleMismatch { user: Uuid, expected: String },

    #[error("user {user} appears more than once in the member list")]
    DuplicateMember { user: Uuid },

    #[error("leader {leader} is missing from the member list")]
    LeaderNotMember { leader: Uuid },
}

/// Aula domain errors.
///
/// Domain rejections the caller is expected to branch on (exclusivity
/// conflicts, duplicate members, leader-removal rules) are NOT errors;
/// those surface as an unsuccessful [`crate::domain::Outcome`].
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("user not found: {0}")]
    UserNotFound(String),

    #[error("project not found: {0}")]
    ProjectNotFound(Uuid),

    #[error("evaluation not found: {0}")]
    EvaluationNotFound(Uuid),

    #[error("group not found: {0}")]
    GroupNotFound(Uuid),

    #[error("course not found: {0}")]
    CourseNotFound(Uuid),

    #[error("user {user} is not authorized to {action}")]
    Unauthorized { user: Uuid, action: String },

    /// Invariant conflict on a path where the caller does not branch on a
    /// structured outcome (e.g. project creation).
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("store error: {0}")]
    Store(#[from] crate::repo::StoreError),
}

impl DomainError {
    /// Shorthand for an authorization failure.
    pub fn unauthorized(user: Uuid, action: impl Into<String>) -> Self {
        Self::Unauthorized {
            user,
            action: action.into(),
        }
    }
}

/// Result type for Aula domain operations.
pub type Result<T> = std::result::Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_error_display() {
        let id = Uuid::new_v4();
        let err = DomainError::ProjectNotFound(id);
        assert!(err.to_string().contains("project not found"));

        let err = DomainError::unauthorized(id, "delete project");
        let msg = err.to_string();
        assert!(msg.contains("not authorized"));
        assert!(msg.contains("delete project"));
    }

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::GradeOutOfRange { grade: 120 };
        assert!(err.to_string().contains("120"));

        let err = ValidationError::StarsOutOfRange { stars: 9 };
        assert!(err.to_string().contains("expected 1-5"));
    }

    #[test]
    fn test_validation_converts_into_domain_error() {
        let err: DomainError = ValidationError::EmptyEmail.into();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
