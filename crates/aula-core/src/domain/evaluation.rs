//! Teacher evaluations of a project.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationKind {
    /// Graded; feeds the project's authoritative score.
    Official,
    /// Free-form feedback; never graded.
    Suggestion,
}

impl std::fmt::Display for EvaluationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Official => "official",
            Self::Suggestion => "suggestion",
        };
        write!(f, "{s}")
    }
}

/// One evaluation authored by a teacher for a project.
///
/// Project and teacher ids are relation-only links; the evaluation set is
/// owned by the project-as-parent but stored independently. Evaluations are
/// append/update-only and never mutated by other components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub id: Uuid,
    pub project_id: Uuid,
    pub teacher_id: Uuid,
    pub kind: EvaluationKind,
    /// Free-text feedback body.
    pub content: String,
    /// Grade 0-100. Present iff `kind` is `Official`.
    pub grade: Option<u8>,
    /// Point contribution derived from the grade via the configured scale.
    pub points: i64,
    /// Whether the evaluation is visible to non-authors.
    pub public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Evaluation {
    /// Create a new private evaluation.
    pub fn new(
        project_id: Uuid,
        teacher_id: Uuid,
        kind: EvaluationKind,
        content: impl Into<String>,
        grade: Option<u8>,
        points: i64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            project_id,
            teacher_id,
            kind,
            content: content.into(),
            grade,
            points,
            public: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Bump the update timestamp.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}
