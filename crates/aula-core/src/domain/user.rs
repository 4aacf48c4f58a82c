//! User identity, roles and teacher assignments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Role derived from the institutional email address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Teacher,
    Guest,
    Admin,
}

impl Role {
    /// Whether this role may manage groups, courses and other users.
    pub fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Whether this role may author evaluations.
    pub fn can_evaluate(self) -> bool {
        matches!(self, Self::Teacher)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Student => "student",
            Self::Teacher => "teacher",
            Self::Guest => "guest",
            Self::Admin => "admin",
        };
        write!(f, "{s}")
    }
}

/// A teaching assignment: one course taught to a set of groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeacherAssignment {
    /// Career the course belongs to.
    pub career: String,
    /// Course being taught.
    pub course_id: Uuid,
    /// Groups receiving the course.
    pub group_ids: BTreeSet<Uuid>,
}

/// A registered user.
///
/// Created on first login (idempotent upsert keyed on the normalized email)
/// and never hard-deleted; `active` is the soft-delete flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    /// Normalized (trimmed, lower-cased) email. Unique.
    pub email: String,
    pub display_name: String,
    pub role: Role,
    /// 8-digit student identifier extracted from the email local part.
    pub matricula: Option<String>,
    /// Cohort the student belongs to.
    pub group_id: Option<Uuid>,
    /// The one project this student is currently a member of.
    ///
    /// Exclusivity invariant: at most one project at a time, and it must be
    /// mutually consistent with that project's member list.
    pub project_id: Option<Uuid>,
    /// Teaching assignments. Only meaningful for the `Teacher` role.
    pub assignments: Vec<TeacherAssignment>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user record.
    pub fn new(
        email: impl Into<String>,
        display_name: impl Into<String>,
        role: Role,
        matricula: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            display_name: display_name.into(),
            role,
            matricula,
            group_id: None,
            project_id: None,
            assignments: Vec::new(),
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether this user may join a project team right now.
    pub fn is_assignable_student(&self) -> bool {
        self.active && self.role == Role::Student && self.project_id.is_none()
    }

    /// Bump the update timestamp.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}
