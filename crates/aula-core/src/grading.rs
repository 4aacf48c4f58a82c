//! Teacher evaluations: creation, point contribution and visibility rules.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::error::{DomainError, Result, ValidationError};
use crate::domain::{Evaluation, EvaluationKind, ProjectState, User};
use crate::obs;
use crate::ranking::ScoreScale;
use crate::repo::{EvaluationStore, ProjectStore, StoreError, UserStore};
use crate::MAX_WRITE_ATTEMPTS;

/// Evaluation operations.
pub struct EvaluationApi {
    users: Arc<dyn UserStore>,
    projects: Arc<dyn ProjectStore>,
    evaluations: Arc<dyn EvaluationStore>,
    scale: ScoreScale,
}

impl EvaluationApi {
    pub fn new(
        users: Arc<dyn UserStore>,
        projects: Arc<dyn ProjectStore>,
        evaluations: Arc<dyn EvaluationStore>,
    ) -> Self {
        Self {
            users,
            projects,
            evaluations,
            scale: ScoreScale::default(),
        }
    }

    /// Override the default point scale.
    pub fn with_scale(mut self, scale: ScoreScale) -> Self {
        self.scale = scale;
        self
    }

    async fn get_user(&self, id: Uuid) -> Result<User> {
        self.users
            .get(id)
            .await?
            .ok_or_else(|| DomainError::UserNotFound(id.to_string()))
    }

    /// Record an evaluation for a project.
    ///
    /// An `Official` evaluation requires a grade in 0-100 and contributes
    /// scale-derived points to the project's total; a `Suggestion` must not
    /// carry a grade and contributes nothing.
    ///
    /// # Errors
    ///
    /// - `ProjectNotFound` / `UserNotFound` when an id does not resolve.
    /// - `Unauthorized` when the author is not a teacher.
    /// - `Validation` for a missing, surplus or out-of-range grade.
    pub async fn create(
        &self,
        project_id: Uuid,
        teacher_id: Uuid,
        kind: EvaluationKind,
        content: impl Into<String>,
        grade: Option<u8>,
    ) -> Result<Evaluation> {
        self.projects
            .get(project_id)
            .await?
            .ok_or(DomainError::ProjectNotFound(project_id))?;
        let teacher = self.get_user(teacher_id).await?;
        if !teacher.role.can_evaluate() {
            return Err(DomainError::unauthorized(teacher_id, "evaluate projects"));
        }

        let points = match kind {
            EvaluationKind::Official => {
                let grade = grade.ok_or(ValidationError::GradeRequired)?;
                if grade > 100 {
                    return Err(ValidationError::GradeOutOfRange {
                        grade: u16::from(grade),
                    }
                    .into());
                }
                self.scale.grade_points(grade)
            }
            EvaluationKind::Suggestion => {
                if grade.is_some() {
                    return Err(ValidationError::GradeNotAllowed.into());
                }
                0
            }
        };

        let evaluation = Evaluation::new(
            project_id,
            teacher_id,
            kind,
            content,
            grade,
            points,
            Utc::now(),
        );
        self.evaluations.create(&evaluation).await?;

        if kind == EvaluationKind::Official {
            if let Err(e) = self.add_points(project_id, points).await {
                // Compensate: an official evaluation whose points cannot be
                // recorded must not survive.
                if let Err(cleanup) = self.evaluations.delete(evaluation.id).await {
                    obs::emit_cascade_error(project_id, &cleanup);
                }
                return Err(e);
            }
        }

        obs::emit_evaluation_created(evaluation.id, project_id, &kind.to_string());
        Ok(evaluation)
    }

    /// Add an official evaluation's points to the project total under a
    /// conditional write. The first official grade moves a draft project to
    /// the active state.
    async fn add_points(&self, project_id: Uuid, points: i64) -> Result<()> {
        let mut attempts = 0;
        loop {
            let mut project = self
                .projects
                .get(project_id)
                .await?
                .ok_or(DomainError::ProjectNotFound(project_id))?;
            let expected = project.version;

            project.points_total += points;
            if project.state == ProjectState::Draft {
                project.state = ProjectState::Active;
            }
            project.touch(Utc::now());

            match self.projects.update(&project, expected).await {
                Ok(()) => return Ok(()),
                Err(StoreError::VersionConflict { .. }) if attempts + 1 < MAX_WRITE_ATTEMPTS => {
                    attempts += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Toggle an evaluation's visibility.
    ///
    /// Allowed only for the authoring teacher or an admin.
    ///
    /// # Errors
    ///
    /// - `EvaluationNotFound` / `UserNotFound` when an id does not resolve.
    /// - `Unauthorized` for any other requester.
    pub async fn change_visibility(
        &self,
        evaluation_id: Uuid,
        requester_id: Uuid,
        public: bool,
    ) -> Result<Evaluation> {
        let mut evaluation = self
            .evaluations
            .get(evaluation_id)
            .await?
            .ok_or(DomainError::EvaluationNotFound(evaluation_id))?;
        let requester = self.get_user(requester_id).await?;

        let is_author = requester.id == evaluation.teacher_id;
        if !is_author && !requester.role.is_admin() {
            return Err(DomainError::unauthorized(
                requester_id,
                "change evaluation visibility",
            ));
        }

        evaluation.public = public;
        evaluation.touch(Utc::now());
        self.evaluations.update(&evaluation).await?;

        obs::emit_visibility_changed(evaluation_id, public);
        Ok(evaluation)
    }

    /// Evaluations of a project visible to `viewer`: public ones for
    /// everyone, private ones only for their author or an admin.
    pub async fn list_visible(
        &self,
        project_id: Uuid,
        viewer_id: Option<Uuid>,
    ) -> Result<Vec<Evaluation>> {
        let viewer = match viewer_id {
            Some(id) => Some(self.get_user(id).await?),
            None => None,
        };
        let evaluations = self.evaluations.list_by_project(project_id).await?;
        Ok(evaluations
            .into_iter()
            .filter(|ev| {
                ev.public
                    || viewer.as_ref().is_some_and(|v| {
                        v.role.is_admin() || v.id == ev.teacher_id
                    })
            })
            .collect())
    }
}
