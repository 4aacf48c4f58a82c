//! Project lifecycle: creation, patch-based updates and cascading deletion.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::error::{DomainError, Result, ValidationError};
use crate::domain::{ContentBlock, Project, ProjectState, Role, User};
use crate::obs;
use crate::repo::{ProjectStore, StoreError, UserStore};
use crate::sanitize;
use crate::MAX_WRITE_ATTEMPTS;

/// Input for project creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProject {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// Patch applied by a project update. Absent fields are left unchanged.
///
/// Inbound state is validated against the forward-only transition rule and
/// inbound blocks are re-sanitized before the write, so a failed validation
/// never leaves a partially-applied project behind.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub public: Option<bool>,
    #[serde(default)]
    pub state: Option<ProjectState>,
    #[serde(default)]
    pub blocks: Option<Vec<ContentBlock>>,
}

/// Project lifecycle operations.
pub struct ProjectLifecycleApi {
    users: Arc<dyn UserStore>,
    projects: Arc<dyn ProjectStore>,
}

impl ProjectLifecycleApi {
    pub fn new(users: Arc<dyn UserStore>, projects: Arc<dyn ProjectStore>) -> Self {
        Self { users, projects }
    }

    async fn get_project(&self, id: Uuid) -> Result<Project> {
        self.projects
            .get(id)
            .await?
            .ok_or(DomainError::ProjectNotFound(id))
    }

    async fn get_user(&self, id: Uuid) -> Result<User> {
        self.users
            .get(id)
            .await?
            .ok_or_else(|| DomainError::UserNotFound(id.to_string()))
    }

    /// Create a project with the requesting student as leader and sole
    /// member.
    ///
    /// # Errors
    ///
    /// - `Validation` when the title is empty.
    /// - `Unauthorized` when the requester is not an active student.
    /// - `Conflict` when the requester already holds a project or is not
    ///   enrolled in a group.
    pub async fn create(&self, requester_id: Uuid, input: NewProject) -> Result<Project> {
        if input.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle.into());
        }

        let mut leader = self.get_user(requester_id).await?;
        if leader.role != Role::Student || !leader.active {
            return Err(DomainError::unauthorized(requester_id, "create a project"));
        }
        if leader.project_id.is_some() {
            return Err(DomainError::Conflict(
                "requester already holds a project".to_string(),
            ));
        }
        let group_id = leader.group_id.ok_or_else(|| {
            DomainError::Conflict("requester is not enrolled in a group".to_string())
        })?;

        let now = Utc::now();
        let project = Project::new(input.title.trim(), input.description, requester_id, group_id, now);
        self.projects.create(&project).await?;

        leader.project_id = Some(project.id);
        leader.touch(now);
        if let Err(e) = self.users.update(&leader).await {
            // Compensate: a leader row we cannot claim means no project.
            if let Err(cleanup) = self.projects.delete(project.id).await {
                obs::emit_cascade_error(project.id, &cleanup);
            }
            return Err(e.into());
        }

        obs::emit_project_created(project.id, requester_id);
        Ok(project)
    }

    /// Apply a patch to a project. Leader-gated.
    ///
    /// Returns the updated snapshot (with its bumped version).
    pub async fn update(
        &self,
        project_id: Uuid,
        requester_id: Uuid,
        patch: ProjectPatch,
    ) -> Result<Project> {
        let mut attempts = 0;
        loop {
            let mut project = self.get_project(project_id).await?;
            let expected = project.version;

            if !project.is_leader(requester_id) {
                return Err(DomainError::unauthorized(requester_id, "update the project"));
            }
            apply_patch(&mut project, &patch)?;
            project.touch(Utc::now());

            match self.projects.update(&project, expected).await {
                Ok(()) => {
                    project.version = expected + 1;
                    return Ok(project);
                }
                Err(StoreError::VersionConflict { .. }) if attempts + 1 < MAX_WRITE_ATTEMPTS => {
                    attempts += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Assign a grading teacher to the project. Leader- or admin-gated.
    pub async fn assign_teacher(
        &self,
        project_id: Uuid,
        requester_id: Uuid,
        teacher_id: Uuid,
    ) -> Result<()> {
        let requester = self.get_user(requester_id).await?;
        let teacher = self.get_user(teacher_id).await?;
        if teacher.role != Role::Teacher {
            return Err(ValidationError::RoleMismatch {
                user: teacher_id,
                expected: "teacher".to_string(),
            }
            .into());
        }

        let mut attempts = 0;
        loop {
            let mut project = self.get_project(project_id).await?;
            let expected = project.version;

            if !project.is_leader(requester_id) && !requester.role.is_admin() {
                return Err(DomainError::unauthorized(requester_id, "assign a teacher"));
            }
            project.teacher_id = Some(teacher_id);
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

    /// Delete a project, releasing every member back to the unassigned
    /// pool. Leader-only.
    ///
    /// The cascade clears all member rows before the project row is
    /// removed: a member-release failure aborts the whole operation with
    /// the project intact, so no user is ever left referencing a deleted
    /// project.
    pub async fn delete(&self, project_id: Uuid, requester_id: Uuid) -> Result<()> {
        let project = self.get_project(project_id).await?;
        if !project.is_leader(requester_id) {
            return Err(DomainError::unauthorized(requester_id, "delete the project"));
        }

        let now = Utc::now();
        let mut released = 0usize;
        for member_id in &project.members {
            let Some(mut member) = self.users.get(*member_id).await? else {
                continue;
            };
            if member.project_id != Some(project_id) {
                continue;
            }
            member.project_id = None;
            member.touch(now);
            if let Err(e) = self.users.update(&member).await {
                obs::emit_cascade_error(project_id, &e);
                return Err(e.into());
            }
            released += 1;
        }

        self.projects.delete(project_id).await?;
        obs::emit_project_deleted(project_id, released);
        Ok(())
    }
}

/// Apply a validated patch to a project snapshot.
fn apply_patch(project: &mut Project, patch: &ProjectPatch) -> Result<()> {
    if let Some(title) = &patch.title {
        if title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle.into());
        }
        project.title = title.trim().to_string();
    }
    if let Some(description) = &patch.description {
        project.description = description.clone();
    }
    if let Some(video_url) = &patch.video_url {
        project.video_url = Some(video_url.clone());
    }
    if let Some(public) = patch.public {
        project.public = public;
    }
    if let Some(state) = patch.state {
        if !project.state.can_transition_to(state) {
            return Err(ValidationError::InvalidStateTransition {
                from: project.state.to_string(),
                to: state.to_string(),
            }
            .into());
        }
        project.state = state;
    }
    if let Some(blocks) = &patch.blocks {
        let mut blocks = blocks.clone();
        blocks.sort_by_key(|b| b.order);
        for block in &mut blocks {
            sanitize::sanitize_block(block);
        }
        project.blocks = blocks;
    }
    Ok(())
}
