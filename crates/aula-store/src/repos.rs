//! SurrealDB-backed implementations of the aula-core repository contracts.
//!
//! Rows are converted to/from the domain types at the boundary via the
//! `schema` module. The project store implements the version-checked
//! conditional write the membership and ranking paths rely on.

use async_trait::async_trait;
use surrealdb::engine::any::Any;
use surrealdb::Surreal;
use tracing::debug;
use uuid::Uuid;

use aula_core::domain::{Course, Evaluation, Group, Project, User};
use aula_core::repo::{
    CourseStore, EvaluationStore, GroupStore, ProjectStore, StoreError, StoreResult, UserStore,
};

use crate::schema::{CourseRow, EvaluationRow, GroupRow, ProjectRow, UserRow};

fn backend(e: surrealdb::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

// ---------------------------------------------------------------------------
// SurrealUserStore
// ---------------------------------------------------------------------------

/// SurrealDB-backed implementation of [`UserStore`].
pub struct SurrealUserStore {
    db: Surreal<Any>,
}

impl SurrealUserStore {
    pub fn new(db: Surreal<Any>) -> Self {
        Self { db }
    }

    async fn find_one(&self, sql: &'static str, key: &'static str, value: String) -> StoreResult<Option<User>> {
        let mut res = self
            .db
            .query(sql)
            .bind((key, value))
            .await
            .map_err(backend)?;
        let rows: Vec<UserRow> = res.take(0).map_err(backend)?;
        rows.into_iter().next().map(UserRow::into_user).transpose()
    }
}

#[async_trait]
impl UserStore for SurrealUserStore {
    async fn get(&self, id: Uuid) -> StoreResult<Option<User>> {
        self.find_one(
            "SELECT * FROM users WHERE user_id = $uid",
            "uid",
            id.to_string(),
        )
        .await
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        self.find_one(
            "SELECT * FROM users WHERE email = $email",
            "email",
            email.to_string(),
        )
        .await
    }

    async fn find_by_matricula(&self, matricula: &str) -> StoreResult<Option<User>> {
        self.find_one(
            "SELECT * FROM users WHERE matricula = $matricula",
            "matricula",
            matricula.to_string(),
        )
        .await
    }

    async fn create(&self, user: &User) -> StoreResult<()> {
        let row = UserRow::from_user(user)?;
        debug!(user_id = %user.id, "creating user");

        let _created: Option<UserRow> =
            self.db.create("users").content(row).await.map_err(|e| {
                let msg = e.to_string();
                if msg.contains("idx_user_email") {
                    StoreError::UniqueViolation(format!(
                        "email {} already registered",
                        user.email
                    ))
                } else {
                    StoreError::Backend(msg)
                }
            })?;
        Ok(())
    }

    async fn update(&self, user: &User) -> StoreResult<()> {
        let row = UserRow::from_user(user)?;
        let uid = user.id.to_string();

        let mut res = self
            .db
            .query("UPDATE users CONTENT $row WHERE user_id = $uid")
            .bind(("row", row))
            .bind(("uid", uid))
            .await
            .map_err(backend)?;
        let rows: Vec<UserRow> = res.take(0).map_err(backend)?;
        if rows.is_empty() {
            return Err(StoreError::not_found("user", user.id));
        }
        Ok(())
    }

    async fn list_by_group(&self, group_id: Uuid) -> StoreResult<Vec<User>> {
        let gid = group_id.to_string();
        let mut res = self
            .db
            .query("SELECT * FROM users WHERE group_id = $gid")
            .bind(("gid", gid))
            .await
            .map_err(backend)?;
        let rows: Vec<UserRow> = res.take(0).map_err(backend)?;
        rows.into_iter().map(UserRow::into_user).collect()
    }
}

// ---------------------------------------------------------------------------
// SurrealGroupStore
// ---------------------------------------------------------------------------

/// SurrealDB-backed implementation of [`GroupStore`].
pub struct SurrealGroupStore {
    db: Surreal<Any>,
}

impl SurrealGroupStore {
    pub fn new(db: Surreal<Any>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl GroupStore for SurrealGroupStore {
    async fn get(&self, id: Uuid) -> StoreResult<Option<Group>> {
        let gid = id.to_string();
        let mut res = self
            .db
            .query("SELECT * FROM groups WHERE group_id = $gid")
            .bind(("gid", gid))
            .await
            .map_err(backend)?;
        let rows: Vec<GroupRow> = res.take(0).map_err(backend)?;
        rows.into_iter().next().map(GroupRow::into_group).transpose()
    }

    async fn create(&self, group: &Group) -> StoreResult<()> {
        let row = GroupRow::from_group(group);
        let _created: Option<GroupRow> = self
            .db
            .create("groups")
            .content(row)
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn update(&self, group: &Group) -> StoreResult<()> {
        let row = GroupRow::from_group(group);
        let gid = group.id.to_string();

        let mut res = self
            .db
            .query("UPDATE groups CONTENT $row WHERE group_id = $gid")
            .bind(("row", row))
            .bind(("gid", gid))
            .await
            .map_err(backend)?;
        let rows: Vec<GroupRow> = res.take(0).map_err(backend)?;
        if rows.is_empty() {
            return Err(StoreError::not_found("group", group.id));
        }
        Ok(())
    }

    async fn list_active(&self) -> StoreResult<Vec<Group>> {
        let mut res = self
            .db
            .query("SELECT * FROM groups WHERE active = true")
            .await
            .map_err(backend)?;
        let rows: Vec<GroupRow> = res.take(0).map_err(backend)?;
        rows.into_iter().map(GroupRow::into_group).collect()
    }
}

// ---------------------------------------------------------------------------
// SurrealCourseStore
// ---------------------------------------------------------------------------

/// SurrealDB-backed implementation of [`CourseStore`].
pub struct SurrealCourseStore {
    db: Surreal<Any>,
}

impl SurrealCourseStore {
    pub fn new(db: Surreal<Any>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CourseStore for SurrealCourseStore {
    async fn get(&self, id: Uuid) -> StoreResult<Option<Course>> {
        let cid = id.to_string();
        let mut res = self
            .db
            .query("SELECT * FROM courses WHERE course_id = $cid")
            .bind(("cid", cid))
            .await
            .map_err(backend)?;
        let rows: Vec<CourseRow> = res.take(0).map_err(backend)?;
        rows.into_iter()
            .next()
            .map(CourseRow::into_course)
            .transpose()
    }

    async fn create(&self, course: &Course) -> StoreResult<()> {
        let row = CourseRow::from_course(course);
        let _created: Option<CourseRow> = self
            .db
            .create("courses")
            .content(row)
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn update(&self, course: &Course) -> StoreResult<()> {
        let row = CourseRow::from_course(course);
        let cid = course.id.to_string();

        let mut res = self
            .db
            .query("UPDATE courses CONTENT $row WHERE course_id = $cid")
            .bind(("row", row))
            .bind(("cid", cid))
            .await
            .map_err(backend)?;
        let rows: Vec<CourseRow> = res.take(0).map_err(backend)?;
        if rows.is_empty() {
            return Err(StoreError::not_found("course", course.id));
        }
        Ok(())
    }

    async fn list_by_career(&self, career: &str) -> StoreResult<Vec<Course>> {
        let career = career.to_string();
        let mut res = self
            .db
            .query("SELECT * FROM courses WHERE career = $career AND active = true ORDER BY term ASC")
            .bind(("career", career))
            .await
            .map_err(backend)?;
        let rows: Vec<CourseRow> = res.take(0).map_err(backend)?;
        rows.into_iter().map(CourseRow::into_course).collect()
    }
}

// ---------------------------------------------------------------------------
// SurrealProjectStore
// ---------------------------------------------------------------------------

/// SurrealDB-backed implementation of [`ProjectStore`].
pub struct SurrealProjectStore {
    db: Surreal<Any>,
}

impl SurrealProjectStore {
    pub fn new(db: Surreal<Any>) -> Self {
        Self { db }
    }

    async fn fetch(&self, id: Uuid) -> StoreResult<Option<ProjectRow>> {
        let pid = id.to_string();
        let mut res = self
            .db
            .query("SELECT * FROM projects WHERE project_id = $pid")
            .bind(("pid", pid))
            .await
            .map_err(backend)?;
        let rows: Vec<ProjectRow> = res.take(0).map_err(backend)?;
        Ok(rows.into_iter().next())
    }
}

#[async_trait]
impl ProjectStore for SurrealProjectStore {
    async fn get(&self, id: Uuid) -> StoreResult<Option<Project>> {
        self.fetch(id)
            .await?
            .map(ProjectRow::into_project)
            .transpose()
    }

    async fn create(&self, project: &Project) -> StoreResult<()> {
        let row = ProjectRow::from_project(project)?;
        debug!(project_id = %project.id, "creating project");

        let _created: Option<ProjectRow> = self
            .db
            .create("projects")
            .content(row)
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn update(&self, project: &Project, expected_version: u64) -> StoreResult<()> {
        let mut row = ProjectRow::from_project(project)?;
        row.version = expected_version + 1;
        let pid = project.id.to_string();

        let mut res = self
            .db
            .query("UPDATE projects CONTENT $row WHERE project_id = $pid AND version = $expected")
            .bind(("row", row))
            .bind(("pid", pid))
            .bind(("expected", expected_version))
            .await
            .map_err(backend)?;
        let rows: Vec<ProjectRow> = res.take(0).map_err(backend)?;

        if rows.is_empty() {
            // No row matched: the project is gone, or the version moved on.
            return match self.fetch(project.id).await? {
                None => Err(StoreError::not_found("project", project.id)),
                Some(_) => Err(StoreError::VersionConflict {
                    entity: "project",
                    id: project.id.to_string(),
                    expected: expected_version,
                }),
            };
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> StoreResult<()> {
        if self.fetch(id).await?.is_none() {
            return Err(StoreError::not_found("project", id));
        }
        let pid = id.to_string();
        self.db
            .query("DELETE FROM projects WHERE project_id = $pid")
            .bind(("pid", pid))
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn list(&self) -> StoreResult<Vec<Project>> {
        let mut res = self
            .db
            .query("SELECT * FROM projects ORDER BY created_at ASC")
            .await
            .map_err(backend)?;
        let rows: Vec<ProjectRow> = res.take(0).map_err(backend)?;
        rows.into_iter().map(ProjectRow::into_project).collect()
    }

    async fn list_by_group(&self, group_id: Uuid) -> StoreResult<Vec<Project>> {
        let gid = group_id.to_string();
        let mut res = self
            .db
            .query("SELECT * FROM projects WHERE group_id = $gid ORDER BY created_at ASC")
            .bind(("gid", gid))
            .await
            .map_err(backend)?;
        let rows: Vec<ProjectRow> = res.take(0).map_err(backend)?;
        rows.into_iter().map(ProjectRow::into_project).collect()
    }
}

// ---------------------------------------------------------------------------
// SurrealEvaluationStore
// ---------------------------------------------------------------------------

/// SurrealDB-backed implementation of [`EvaluationStore`].
pub struct SurrealEvaluationStore {
    db: Surreal<Any>,
}

impl SurrealEvaluationStore {
    pub fn new(db: Surreal<Any>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EvaluationStore for SurrealEvaluationStore {
    async fn get(&self, id: Uuid) -> StoreResult<Option<Evaluation>> {
        let eid = id.to_string();
        let mut res = self
            .db
            .query("SELECT * FROM evaluations WHERE evaluation_id = $eid")
            .bind(("eid", eid))
            .await
            .map_err(backend)?;
        let rows: Vec<EvaluationRow> = res.take(0).map_err(backend)?;
        rows.into_iter()
            .next()
            .map(EvaluationRow::into_evaluation)
            .transpose()
    }

    async fn create(&self, evaluation: &Evaluation) -> StoreResult<()> {
        let row = EvaluationRow::from_evaluation(evaluation);
        let _created: Option<EvaluationRow> = self
            .db
            .create("evaluations")
            .content(row)
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn update(&self, evaluation: &Evaluation) -> StoreResult<()> {
        let row = EvaluationRow::from_evaluation(evaluation);
        let eid = evaluation.id.to_string();

        let mut res = self
            .db
            .query("UPDATE evaluations CONTENT $row WHERE evaluation_id = $eid")
            .bind(("row", row))
            .bind(("eid", eid))
            .await
            .map_err(backend)?;
        let rows: Vec<EvaluationRow> = res.take(0).map_err(backend)?;
        if rows.is_empty() {
            return Err(StoreError::not_found("evaluation", evaluation.id));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> StoreResult<()> {
        if self.get(id).await?.is_none() {
            return Err(StoreError::not_found("evaluation", id));
        }
        let eid = id.to_string();
        self.db
            .query("DELETE FROM evaluations WHERE evaluation_id = $eid")
            .bind(("eid", eid))
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn list_by_project(&self, project_id: Uuid) -> StoreResult<Vec<Evaluation>> {
        let pid = project_id.to_string();
        let mut res = self
            .db
            .query("SELECT * FROM evaluations WHERE project_id = $pid ORDER BY created_at ASC")
            .bind(("pid", pid))
            .await
            .map_err(backend)?;
        let rows: Vec<EvaluationRow> = res.take(0).map_err(backend)?;
        rows.into_iter()
            .map(EvaluationRow::into_evaluation)
            .collect()
    }
}
