//! Student cohorts (groups).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// A cohort of students for one career, shift and term.
///
/// Groups are soft-deleted via the `active` flag, never physically removed,
/// so historical projects keep a resolvable group reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: Uuid,
    /// Career the cohort belongs to (e.g. "Sistemas Computacionales").
    pub career: String,
    /// Shift label (e.g. "matutino", "vespertino").
    pub shift: String,
    /// Term label (e.g. "2026-1").
    pub term: String,
    /// Teachers assigned to this cohort.
    pub teacher_ids: BTreeSet<Uuid>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Group {
    /// Create a new active group.
    pub fn new(
        career: impl Into<String>,
        shift: impl Into<String>,
        term: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            career: career.into(),
            shift: shift.into(),
            term: term.into(),
            teacher_ids: BTreeSet::new(),
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
