//! Ranking aggregation: guest votes, point totals and gallery ordering.

use std::cmp::Ordering;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::error::{DomainError, Result};
use crate::domain::{Outcome, Project, StarRating};
use crate::obs;
use crate::repo::{ProjectStore, StoreError, UserStore};
use crate::MAX_WRITE_ATTEMPTS;

/// Point-scale configuration.
///
/// Fixes the mapping from official grades and star votes to ranking points:
/// a grade g in 0-100 maps linearly onto `grade_floor..=grade_ceil`
/// (defaults 10..=100, so every graded evaluation contributes something),
/// and one star is worth `points_per_star` (default 20, so a 5-star vote
/// matches a perfect grade).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreScale {
    /// Points granted for a grade of zero.
    pub grade_floor: i64,
    /// Points granted for a perfect grade of 100.
    pub grade_ceil: i64,
    /// Points granted per star of a gallery vote.
    pub points_per_star: i64,
}

impl Default for ScoreScale {
    fn default() -> Self {
        Self {
            grade_floor: 10,
            grade_ceil: 100,
            points_per_star: 20,
        }
    }
}

impl ScoreScale {
    /// Points contributed by an official grade (0-100).
    pub fn grade_points(&self, grade: u8) -> i64 {
        let span = (self.grade_ceil - self.grade_floor) as f64;
        self.grade_floor + (f64::from(grade) / 100.0 * span).round() as i64
    }

    /// Points contributed by a star vote.
    pub fn vote_points(&self, rating: StarRating) -> i64 {
        self.points_per_star * i64::from(rating.get())
    }
}

/// Deterministic gallery ordering: points descending, then vote count
/// descending, then creation time ascending (oldest first), then id.
pub fn ranking_ord(a: &Project, b: &Project) -> Ordering {
    b.points_total
        .cmp(&a.points_total)
        .then(b.vote_count.cmp(&a.vote_count))
        .then(a.created_at.cmp(&b.created_at))
        .then(a.id.cmp(&b.id))
}

/// Sort a project listing into gallery order.
pub fn rank_projects(mut projects: Vec<Project>) -> Vec<Project> {
    projects.sort_by(ranking_ord);
    projects
}

/// Vote casting and gallery queries.
pub struct RankingApi {
    users: Arc<dyn UserStore>,
    projects: Arc<dyn ProjectStore>,
    scale: ScoreScale,
}

impl RankingApi {
    pub fn new(users: Arc<dyn UserStore>, projects: Arc<dyn ProjectStore>) -> Self {
        Self {
            users,
            projects,
            scale: ScoreScale::default(),
        }
    }

    /// Override the default point scale.
    pub fn with_scale(mut self, scale: ScoreScale) -> Self {
        self.scale = scale;
        self
    }

    /// Cast (or replace) a star vote on a project.
    ///
    /// Re-voting replaces: the previous contribution is subtracted before
    /// the new one is added within a single conditional write, so totals
    /// never double-count and `vote_count` tracks distinct voters.
    ///
    /// # Errors
    ///
    /// - `Validation` when `stars` is outside 1-5.
    /// - `UserNotFound` / `ProjectNotFound` when either id does not resolve.
    pub async fn cast_vote(&self, project_id: Uuid, voter_id: Uuid, stars: u8) -> Result<Outcome> {
        let rating = StarRating::new(stars)?;
        self.users
            .get(voter_id)
            .await?
            .ok_or_else(|| DomainError::UserNotFound(voter_id.to_string()))?;

        let new_points = self.scale.vote_points(rating);
        let mut attempts = 0;
        loop {
            let mut project = self
                .projects
                .get(project_id)
                .await?
                .ok_or(DomainError::ProjectNotFound(project_id))?;
            let expected = project.version;

            let replaced = match project.votes.insert(voter_id, rating) {
                Some(old) => {
                    project.points_total += new_points - self.scale.vote_points(old);
                    true
                }
                None => {
                    project.points_total += new_points;
                    project.vote_count += 1;
                    false
                }
            };
            project.touch(Utc::now());

            match self.projects.update(&project, expected).await {
                Ok(()) => {
                    obs::emit_vote_cast(project_id, voter_id, stars, replaced);
                    let verb = if replaced { "replaced" } else { "recorded" };
                    return Ok(Outcome::ok(format!("vote {verb}: {stars} stars")));
                }
                Err(StoreError::VersionConflict { .. }) if attempts + 1 < MAX_WRITE_ATTEMPTS => {
                    attempts += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Publicly visible projects in gallery order.
    pub async fn gallery(&self) -> Result<Vec<Project>> {
        let projects = self.projects.list().await?;
        Ok(rank_projects(
            projects.into_iter().filter(|p| p.public).collect(),
        ))
    }
}
