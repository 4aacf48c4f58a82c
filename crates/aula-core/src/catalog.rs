//! Academic catalog administration: groups and courses.
//!
//! Both entity kinds are soft-deleted only; deactivation flips the `active`
//! flag and keeps the record so historical projects stay resolvable.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::error::{DomainError, Result, ValidationError};
use crate::domain::{Course, Group, User};
use crate::repo::{CourseStore, GroupStore, UserStore};

/// Catalog administration operations. All mutations are admin-gated.
pub struct CatalogApi {
    users: Arc<dyn UserStore>,
    groups: Arc<dyn GroupStore>,
    courses: Arc<dyn CourseStore>,
}

impl CatalogApi {
    pub fn new(
        users: Arc<dyn UserStore>,
        groups: Arc<dyn GroupStore>,
        courses: Arc<dyn CourseStore>,
    ) -> Self {
        Self {
            users,
            groups,
            courses,
        }
    }

    async fn require_admin(&self, requester_id: Uuid, action: &str) -> Result<User> {
        let requester = self
            .users
            .get(requester_id)
            .await?
            .ok_or_else(|| DomainError::UserNotFound(requester_id.to_string()))?;
        if !requester.role.is_admin() {
            return Err(DomainError::unauthorized(requester_id, action));
        }
        Ok(requester)
    }

    /// Create a cohort.
    pub async fn create_group(
        &self,
        requester_id: Uuid,
        career: &str,
        shift: &str,
        term: &str,
    ) -> Result<Group> {
        self.require_admin(requester_id, "create groups").await?;
        let group = Group::new(career, shift, term, Utc::now());
        self.groups.create(&group).await?;
        Ok(group)
    }

    /// Replace the set of teachers attached to a cohort.
    pub async fn set_group_teachers(
        &self,
        requester_id: Uuid,
        group_id: Uuid,
        teacher_ids: BTreeSet<Uuid>,
    ) -> Result<Group> {
        self.require_admin(requester_id, "edit groups").await?;
        let mut group = self
            .groups
            .get(group_id)
            .await?
            .ok_or(DomainError::GroupNotFound(group_id))?;
        group.teacher_ids = teacher_ids;
        group.updated_at = Utc::now();
        self.groups.update(&group).await?;
        Ok(group)
    }

    /// Soft-delete a cohort.
    pub async fn deactivate_group(&self, requester_id: Uuid, group_id: Uuid) -> Result<Group> {
        self.require_admin(requester_id, "deactivate groups").await?;
        let mut group = self
            .groups
            .get(group_id)
            .await?
            .ok_or(DomainError::GroupNotFound(group_id))?;
        group.deactivate(Utc::now());
        self.groups.update(&group).await?;
        Ok(group)
    }

    /// Create a course within a career plan. The term index is 1-based.
    pub async fn create_course(
        &self,
        requester_id: Uuid,
        career: &str,
        name: &str,
        term: u8,
    ) -> Result<Course> {
        self.require_admin(requester_id, "create courses").await?;
        if term == 0 {
            return Err(ValidationError::TermIndexOutOfRange.into());
        }
        let course = Course::new(career, name, term, Utc::now());
        self.courses.create(&course).await?;
        Ok(course)
    }

    /// Soft-delete a course.
    pub async fn deactivate_course(&self, requester_id: Uuid, course_id: Uuid) -> Result<Course> {
        self.require_admin(requester_id, "deactivate courses")
            .await?;
        let mut course = self
            .courses
            .get(course_id)
            .await?
            .ok_or(DomainError::CourseNotFound(course_id))?;
        course.deactivate(Utc::now());
        self.courses.update(&course).await?;
        Ok(course)
    }

    /// Active groups, for enrollment pickers.
    pub async fn list_groups(&self) -> Result<Vec<Group>> {
        Ok(self.groups.list_active().await?)
    }

    /// Active courses of a career, ordered by term.
    pub async fn list_courses(&self, career: &str) -> Result<Vec<Course>> {
        Ok(self.courses.list_by_career(career).await?)
    }
}
