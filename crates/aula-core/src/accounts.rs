//! Account provisioning and administration.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::error::{DomainError, Result, ValidationError};
use crate::domain::{Role, TeacherAssignment, User};
use crate::identity;
use crate::repo::{GroupStore, StoreError, UserStore};

/// User account operations.
pub struct AccountsApi {
    users: Arc<dyn UserStore>,
    groups: Arc<dyn GroupStore>,
}

impl AccountsApi {
    pub fn new(users: Arc<dyn UserStore>, groups: Arc<dyn GroupStore>) -> Self {
        Self { users, groups }
    }

    async fn get_user(&self, id: Uuid) -> Result<User> {
        self.users
            .get(id)
            .await?
            .ok_or_else(|| DomainError::UserNotFound(id.to_string()))
    }

    async fn require_admin(&self, requester_id: Uuid, action: &str) -> Result<User> {
        let requester = self.get_user(requester_id).await?;
        if !requester.role.is_admin() {
            return Err(DomainError::unauthorized(requester_id, action));
        }
        Ok(requester)
    }

    /// Fetch-or-create the user for an authenticated email. Idempotent:
    /// repeated logins return the same record, and a concurrent first login
    /// is resolved by re-reading after a unique-key rejection.
    pub async fn ensure_user(&self, email: &str) -> Result<User> {
        let id = identity::resolve(email).map_err(DomainError::Validation)?;

        if let Some(existing) = self.users.find_by_email(&id.email).await? {
            return Ok(existing);
        }

        let user = User::new(
            id.email.clone(),
            identity::display_name_from_email(&id.email),
            id.role,
            id.matricula,
            Utc::now(),
        );
        match self.users.create(&user).await {
            Ok(()) => Ok(user),
            Err(StoreError::UniqueViolation(_)) => {
                // Lost the first-login race; the winner's row is ours.
                self.users
                    .find_by_email(&id.email)
                    .await?
                    .ok_or_else(|| DomainError::UserNotFound(id.email.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Enroll a student in a cohort. Admin-gated.
    pub async fn assign_group(
        &self,
        requester_id: Uuid,
        user_id: Uuid,
        group_id: Uuid,
    ) -> Result<User> {
        self.require_admin(requester_id, "assign groups").await?;
        self.groups
            .get(group_id)
            .await?
            .ok_or(DomainError::GroupNotFound(group_id))?;

        let mut user = self.get_user(user_id).await?;
        user.group_id = Some(group_id);
        user.touch(Utc::now());
        self.users.update(&user).await?;
        Ok(user)
    }

    /// Replace a teacher's assignments. Admin-gated; the target must hold
    /// the teacher role.
    pub async fn set_teacher_assignments(
        &self,
        requester_id: Uuid,
        teacher_id: Uuid,
        assignments: Vec<TeacherAssignment>,
    ) -> Result<User> {
        self.require_admin(requester_id, "edit teacher assignments")
            .await?;

        let mut teacher = self.get_user(teacher_id).await?;
        if teacher.role != Role::Teacher {
            return Err(ValidationError::RoleMismatch {
                user: teacher_id,
                expected: "teacher".to_string(),
            }
            .into());
        }
        teacher.assignments = assignments;
        teacher.touch(Utc::now());
        self.users.update(&teacher).await?;
        Ok(teacher)
    }

    /// Soft-delete a user account. Admin-gated.
    pub async fn deactivate_user(&self, requester_id: Uuid, user_id: Uuid) -> Result<User> {
        self.require_admin(requester_id, "deactivate users").await?;

        let mut user = self.get_user(user_id).await?;
        user.active = false;
        user.touch(Utc::now());
        self.users.update(&user).await?;
        Ok(user)
    }
}
