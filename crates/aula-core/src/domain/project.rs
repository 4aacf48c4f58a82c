//! The project aggregate: team, canvas, visibility and ranking state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::content::ContentBlock;
use super::error::ValidationError;

/// Lifecycle state of a project. Transitions are forward-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectState {
    Draft,
    Active,
    Evaluated,
    Archived,
}

impl ProjectState {
    fn rank(self) -> u8 {
        match self {
            Self::Draft => 0,
            Self::Active => 1,
            Self::Evaluated => 2,
            Self::Archived => 3,
        }
    }

    /// Whether a transition to `next` is allowed. States never move backward.
    pub fn can_transition_to(self, next: ProjectState) -> bool {
        next.rank() > self.rank()
    }
}

impl std::fmt::Display for ProjectState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Evaluated => "evaluated",
            Self::Archived => "archived",
        };
        write!(f, "{s}")
    }
}

/// A star rating cast by a voter, constrained to 1-5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StarRating(u8);

impl StarRating {
    /// Validate and wrap a raw star count.
    pub fn new(stars: u8) -> Result<Self, ValidationError> {
        if !(1..=5).contains(&stars) {
            return Err(ValidationError::StarsOutOfRange { stars });
        }
        Ok(Self(stars))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

/// The central aggregate: a student project with its team, canvas and
/// ranking state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    /// The member with elevated authorization over the team.
    pub leader_id: Uuid,
    /// Ordered member ids, leader included. No duplicates.
    pub members: Vec<Uuid>,
    /// Cohort the project belongs to; members must come from it.
    pub group_id: Uuid,
    /// Teacher assigned to grade this project.
    pub teacher_id: Option<Uuid>,
    pub state: ProjectState,
    /// Ordered canvas blocks.
    pub blocks: Vec<ContentBlock>,
    pub video_url: Option<String>,
    /// Whether the project shows in the public gallery.
    pub public: bool,
    /// Cumulative ranking points (official evaluations + converted votes).
    pub points_total: i64,
    /// Number of distinct voters.
    pub vote_count: u32,
    /// Voter id -> star rating. At most one vote per voter.
    pub votes: BTreeMap<Uuid, StarRating>,
    /// Optimistic-concurrency marker, bumped by every store update.
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Create a fresh draft project with `leader` as the sole member.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        leader: Uuid,
        group_id: Uuid,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: description.into(),
            leader_id: leader,
            members: vec![leader],
            group_id,
            teacher_id: None,
            state: ProjectState::Draft,
            blocks: Vec::new(),
            video_url: None,
            public: false,
            points_total: 0,
            vote_count: 0,
            votes: BTreeMap::new(),
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_leader(&self, user: Uuid) -> bool {
        self.leader_id == user
    }

    pub fn has_member(&self, user: Uuid) -> bool {
        self.members.contains(&user)
    }

    /// Re-check the member-list invariant after a mutation: non-empty, no
    /// duplicates, leader present.
    pub fn validate_members(&self) -> Result<(), ValidationError> {
        if !self.has_member(self.leader_id) {
            return Err(ValidationError::LeaderNotMember {
                leader: self.leader_id,
            });
        }
        for (i, id) in self.members.iter().enumerate() {
            if self.members[..i].contains(id) {
                return Err(ValidationError::DuplicateMember { user: *id });
            }
        }
        Ok(())
    }

    /// Bump the update timestamp.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}
