//! Courses (materias) within a career.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A course taught in a given term of a career.
///
/// Soft-deleted the same way as [`crate::domain::Group`]: the `active` flag
/// flips, the record stays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: Uuid,
    /// Career the course belongs to.
    pub career: String,
    pub name: String,
    /// Term index within the career plan, 1-based.
    pub term: u8,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Course {
    /// Create a new active course.
    pub fn new(
        career: impl Into<String>,
        name: impl Into<String>,
        term: u8,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            career: career.into(),
            name: name.into(),
            term,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Soft-delete: mark inactive, keep the record.
    pub fn deactivate(&mut self, now: DateTime<Utc>) {
        self.active = false;
        self.updated_at = now;
    }
}
