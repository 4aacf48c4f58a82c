//! Team membership: add/remove members under the exclusivity invariant.
//!
//! A student belongs to at most one project at a time, and a project's
//! member list and its members' `project_id` fields stay mutually
//! consistent. Project rows are the authoritative membership record and are
//! written under a version-checked conditional update with bounded retry;
//! user rows are written first on join (so the exclusivity check stays
//! conservative under races) and rolled back if the project write loses.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::error::{DomainError, Result};
use crate::domain::{Outcome, Project, User};
use crate::obs;
use crate::repo::{ProjectStore, StoreError, UserStore};
use crate::MAX_WRITE_ATTEMPTS;

/// Membership operations on a project team.
pub struct MembershipApi {
    users: Arc<dyn UserStore>,
    projects: Arc<dyn ProjectStore>,
}

impl MembershipApi {
    pub fn new(users: Arc<dyn UserStore>, projects: Arc<dyn ProjectStore>) -> Self {
        Self { users, projects }
    }

    async fn get_project(&self, id: Uuid) -> Result<Project> {
        self.projects
            .get(id)
            .await?
            .ok_or(DomainError::ProjectNotFound(id))
    }

    /// Resolve a member target given as an email or an 8-digit matricula.
    async fn resolve_target(&self, target: &str) -> Result<User> {
        let target = target.trim();
        let found = if target.len() == 8 && target.chars().all(|c| c.is_ascii_digit()) {
            self.users.find_by_matricula(target).await?
        } else {
            self.users
                .find_by_email(&target.to_ascii_lowercase())
                .await?
        };
        found.ok_or_else(|| DomainError::UserNotFound(target.to_string()))
    }

    /// Add a student to a project team.
    ///
    /// Only the leader may add members. Exclusivity and cohort rules are
    /// surfaced as rejected outcomes the caller branches on.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` when the requester is not the project leader.
    /// - `ProjectNotFound` / `UserNotFound` when an id does not resolve.
    pub async fn add_member(
        &self,
        project_id: Uuid,
        requester_id: Uuid,
        target: &str,
    ) -> Result<Outcome> {
        let project = self.get_project(project_id).await?;
        if !project.is_leader(requester_id) {
            return Err(DomainError::unauthorized(requester_id, "add members"));
        }

        let mut member = self.resolve_target(target).await?;

        if member.project_id.is_some() {
            return Ok(Outcome::rejected(format!(
                "{} is already a member of a project",
                member.display_name
            )));
        }
        if !member.is_assignable_student() {
            return Ok(Outcome::rejected(format!(
                "{} cannot join a project team",
                member.display_name
            )));
        }
        if member.group_id != Some(project.group_id) {
            return Ok(Outcome::rejected(format!(
                "{} belongs to a different group",
                member.display_name
            )));
        }

        // Claim the user row first: a concurrent add now sees the target as
        // taken and rejects.
        member.project_id = Some(project_id);
        member.touch(Utc::now());
        self.users.update(&member).await?;

        match self.append_member(project_id, member.id).await {
            Ok(()) => {
                obs::emit_member_added(project_id, member.id);
                Ok(Outcome::ok(format!(
                    "{} joined the project",
                    member.display_name
                )))
            }
            Err(e) => {
                // Roll the claim back so the student is not stranded.
                member.project_id = None;
                member.touch(Utc::now());
                if let Err(rollback) = self.users.update(&member).await {
                    obs::emit_cascade_error(project_id, &rollback);
                }
                Err(e)
            }
        }
    }

    /// Append `member_id` to the project's member list under a conditional
    /// write, retrying on version conflicts.
    async fn append_member(&self, project_id: Uuid, member_id: Uuid) -> Result<()> {
        let mut attempts = 0;
        loop {
            let mut project = self.get_project(project_id).await?;
            let expected = project.version;

            if project.has_member(member_id) {
                // A concurrent retry already appended them.
                return Ok(());
            }
            project.members.push(member_id);
            project.validate_members().map_err(DomainError::from)?;
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

    /// Remove a member from a project team.
    ///
    /// The leader may remove any member; a member may remove themself. The
    /// leader is never removable this way (reassign leadership or delete
    /// the project instead).
    ///
    /// # Errors
    ///
    /// - `Unauthorized` when the requester is neither the leader nor the
    ///   member themself.
    /// - `ProjectNotFound` / `UserNotFound` when an id does not resolve.
    pub async fn remove_member(
        &self,
        project_id: Uuid,
        member_id: Uuid,
        requester_id: Uuid,
    ) -> Result<Outcome> {
        let project = self.get_project(project_id).await?;
        if requester_id != member_id && !project.is_leader(requester_id) {
            return Err(DomainError::unauthorized(requester_id, "remove members"));
        }

        if !project.has_member(member_id) {
            return Ok(Outcome::rejected("not a member of this project"));
        }
        if member_id == project.leader_id {
            return Ok(Outcome::rejected(
                "the leader cannot be removed; reassign leadership or delete the project",
            ));
        }

        // Release the user row first; roll back if the project write loses.
        let mut member = self
            .users
            .get(member_id)
            .await?
            .ok_or_else(|| DomainError::UserNotFound(member_id.to_string()))?;
        let previous_assignment = member.project_id;
        member.project_id = None;
        member.touch(Utc::now());
        self.users.update(&member).await?;

        match self.drop_member(project_id, member_id).await {
            Ok(()) => {
                obs::emit_member_removed(project_id, member_id);
                Ok(Outcome::ok(format!(
                    "{} left the project",
                    member.display_name
                )))
            }
            Err(e) => {
                member.project_id = previous_assignment;
                member.touch(Utc::now());
                if let Err(rollback) = self.users.update(&member).await {
                    obs::emit_cascade_error(project_id, &rollback);
                }
                Err(e)
            }
        }
    }

    /// Drop `member_id` from the member list under a conditional write,
    /// retrying on version conflicts.
    async fn drop_member(&self, project_id: Uuid, member_id: Uuid) -> Result<()> {
        let mut attempts = 0;
        loop {
            let mut project = self.get_project(project_id).await?;
            let expected = project.version;

            if !project.has_member(member_id) {
                return Ok(());
            }
            project.members.retain(|id| *id != member_id);
            project.validate_members().map_err(DomainError::from)?;
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
}
