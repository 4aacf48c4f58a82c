//! In-memory fakes for the repository contracts (testing only)
//!
//! Provides `Mutex<HashMap>`-backed stores that satisfy the trait contracts
//! without any external dependencies, including the conditional-write
//! semantics of the project store.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Course, Evaluation, Group, Project, User};
use crate::repo::*;

// ---------------------------------------------------------------------------
// MemoryUserStore
// ---------------------------------------------------------------------------

/// In-memory user store keyed by id, with unique-email enforcement.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: Mutex<HashMap<Uuid, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn get(&self, id: Uuid) -> StoreResult<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_matricula(&self, matricula: &str) -> StoreResult<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users
            .values()
            .find(|u| u.matricula.as_deref() == Some(matricula))
            .cloned())
    }

    async fn create(&self, user: &User) -> StoreResult<()> {
        let mut users = self.users.lock().unwrap();
        if users.values().any(|u| u.email == user.email) {
            return Err(StoreError::UniqueViolation(format!(
                "email {} already registered",
                user.email
            )));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> StoreResult<()> {
        let mut users = self.users.lock().unwrap();
        if !users.contains_key(&user.id) {
            return Err(StoreError::not_found("user", user.id));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn list_by_group(&self, group_id: Uuid) -> StoreResult<Vec<User>> {
        let users = self.users.lock().unwrap();
        Ok(users
            .values()
            .filter(|u| u.group_id == Some(group_id))
            .cloned()
            .collect())
    }
}

// ---------------------------------------------------------------------------
// MemoryGroupStore
// ---------------------------------------------------------------------------

/// In-memory group store keyed by id.
#[derive(Debug, Default)]
pub struct MemoryGroupStore {
    groups: Mutex<HashMap<Uuid, Group>>,
}

impl MemoryGroupStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GroupStore for MemoryGroupStore {
    async fn get(&self, id: Uuid) -> StoreResult<Option<Group>> {
        let groups = self.groups.lock().unwrap();
        Ok(groups.get(&id).cloned())
    }

    async fn create(&self, group: &Group) -> StoreResult<()> {
        let mut groups = self.groups.lock().unwrap();
        groups.insert(group.id, group.clone());
        Ok(())
    }

    async fn update(&self, group: &Group) -> StoreResult<()> {
        let mut groups = self.groups.lock().unwrap();
        if !groups.contains_key(&group.id) {
            return Err(StoreError::not_found("group", group.id));
        }
        groups.insert(group.id, group.clone());
        Ok(())
    }

    async fn list_active(&self) -> StoreResult<Vec<Group>> {
        let groups = self.groups.lock().unwrap();
        Ok(groups.values().filter(|g| g.active).cloned().collect())
    }
}

// ---------------------------------------------------------------------------
// MemoryCourseStore
// ---------------------------------------------------------------------------

/// In-memory course store keyed by id.
#[derive(Debug, Default)]
pub struct MemoryCourseStore {
    courses: Mutex<HashMap<Uuid, Course>>,
}

impl MemoryCourseStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CourseStore for MemoryCourseStore {
    async fn get(&self, id: Uuid) -> StoreResult<Option<Course>> {
        let courses = self.courses.lock().unwrap();
        Ok(courses.get(&id).cloned())
    }

    async fn create(&self, course: &Course) -> StoreResult<()> {
        let mut courses = self.courses.lock().unwrap();
        courses.insert(course.id, course.clone());
        Ok(())
    }

    async fn update(&self, course: &Course) -> StoreResult<()> {
        let mut courses = self.courses.lock().unwrap();
        if !courses.contains_key(&course.id) {
            return Err(StoreError::not_found("course", course.id));
        }
        courses.insert(course.id, course.clone());
        Ok(())
    }

    async fn list_by_career(&self, career: &str) -> StoreResult<Vec<Course>> {
        let courses = self.courses.lock().unwrap();
        let mut out: Vec<Course> = courses
            .values()
            .filter(|c| c.active && c.career == career)
            .cloned()
            .collect();
        out.sort_by_key(|c| c.term);
        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// MemoryProjectStore
// ---------------------------------------------------------------------------

/// In-memory project store with version-checked conditional writes.
#[derive(Debug, Default)]
pub struct MemoryProjectStore {
    projects: Mutex<HashMap<Uuid, Project>>,
}

impl MemoryProjectStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProjectStore for MemoryProjectStore {
    async fn get(&self, id: Uuid) -> StoreResult<Option<Project>> {
        let projects = self.projects.lock().unwrap();
        Ok(projects.get(&id).cloned())
    }

    async fn create(&self, project: &Project) -> StoreResult<()> {
        let mut projects = self.projects.lock().unwrap();
        projects.insert(project.id, project.clone());
        Ok(())
    }

    async fn update(&self, project: &Project, expected_version: u64) -> StoreResult<()> {
        let mut projects = self.projects.lock().unwrap();
        let stored = projects
            .get_mut(&project.id)
            .ok_or_else(|| StoreError::not_found("project", project.id))?;
        if stored.version != expected_version {
            return Err(StoreError::VersionConflict {
                entity: "project",
                id: project.id.to_string(),
                expected: expected_version,
            });
        }
        let mut next = project.clone();
        next.version = expected_version + 1;
        *stored = next;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> StoreResult<()> {
        let mut projects = self.projects.lock().unwrap();
        projects
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found("project", id))
    }

    async fn list(&self) -> StoreResult<Vec<Project>> {
        let projects = self.projects.lock().unwrap();
        Ok(projects.values().cloned().collect())
    }

    async fn list_by_group(&self, group_id: Uuid) -> StoreResult<Vec<Project>> {
        let projects = self.projects.lock().unwrap();
        Ok(projects
            .values()
            .filter(|p| p.group_id == group_id)
            .cloned()
            .collect())
    }
}

// ---------------------------------------------------------------------------
// MemoryEvaluationStore
// ---------------------------------------------------------------------------

/// In-memory evaluation store keyed by id.
#[derive(Debug, Default)]
pub struct MemoryEvaluationStore {
    evaluations: Mutex<HashMap<Uuid, Evaluation>>,
}

impl MemoryEvaluationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EvaluationStore for MemoryEvaluationStore {
    async fn get(&self, id: Uuid) -> StoreResult<Option<Evaluation>> {
        let evaluations = self.evaluations.lock().unwrap();
        Ok(evaluations.get(&id).cloned())
    }

    async fn create(&self, evaluation: &Evaluation) -> StoreResult<()> {
        let mut evaluations = self.evaluations.lock().unwrap();
        evaluations.insert(evaluation.id, evaluation.clone());
        Ok(())
    }

    async fn update(&self, evaluation: &Evaluation) -> StoreResult<()> {
        let mut evaluations = self.evaluations.lock().unwrap();
        if !evaluations.contains_key(&evaluation.id) {
            return Err(StoreError::not_found("evaluation", evaluation.id));
        }
        evaluations.insert(evaluation.id, evaluation.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> StoreResult<()> {
        let mut evaluations = self.evaluations.lock().unwrap();
        evaluations
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found("evaluation", id))
    }

    async fn list_by_project(&self, project_id: Uuid) -> StoreResult<Vec<Evaluation>> {
        let evaluations = self.evaluations.lock().unwrap();
        let mut out: Vec<Evaluation> = evaluations
            .values()
            .filter(|e| e.project_id == project_id)
            .cloned()
            .collect();
        out.sort_by_key(|e| e.created_at);
        Ok(out)
    }
}
