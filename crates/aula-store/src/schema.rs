//! Row definitions for the Aula SurrealDB tables.
//!
//! Tables:
//! - users: accounts, roles and membership pointers
//! - groups / courses: the academic catalog
//! - projects: team, canvas and ranking state
//! - evaluations: teacher feedback records
//!
//! Rows keep queryable fields (ids, emails, flags) as plain columns and
//! embed the nested aggregates (blocks, votes, assignments) as JSON values.
//! Timestamps are mapped to the native datetime type at the boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use aula_core::domain::{
    Course, Evaluation, EvaluationKind, Group, Project, ProjectState, Role, User,
};
use aula_core::repo::{StoreError, StoreResult};

/// Module for serializing chrono DateTime to the SurrealDB datetime format.
pub(crate) mod surreal_datetime {
    use chrono::{DateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};
    use surrealdb::sql::Datetime as SurrealDatetime;

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let sd = SurrealDatetime::from(*date);
        serde::Serialize::serialize(&sd, serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let sd = SurrealDatetime::deserialize(deserializer)?;
        Ok(DateTime::from(sd))
    }
}

fn parse_id(field: &'static str, raw: &str) -> StoreResult<Uuid> {
    Uuid::parse_str(raw)
        .map_err(|e| StoreError::Serialization(format!("invalid uuid in {field}: {e}")))
}

fn to_json<T: Serialize>(value: &T) -> StoreResult<Value> {
    serde_json::to_value(value).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn from_json<T: for<'de> Deserialize<'de>>(field: &'static str, value: Value) -> StoreResult<T> {
    serde_json::from_value(value)
        .map_err(|e| StoreError::Serialization(format!("invalid {field}: {e}")))
}

fn role_from_str(raw: &str) -> StoreResult<Role> {
    match raw {
        "student" => Ok(Role::Student),
        "teacher" => Ok(Role::Teacher),
        "guest" => Ok(Role::Guest),
        "admin" => Ok(Role::Admin),
        other => Err(StoreError::Backend(format!("unknown role: {other}"))),
    }
}

fn state_from_str(raw: &str) -> StoreResult<ProjectState> {
    match raw {
        "draft" => Ok(ProjectState::Draft),
        "active" => Ok(ProjectState::Active),
        "evaluated" => Ok(ProjectState::Evaluated),
        "archived" => Ok(ProjectState::Archived),
        other => Err(StoreError::Backend(format!("unknown project state: {other}"))),
    }
}

fn kind_from_str(raw: &str) -> StoreResult<EvaluationKind> {
    match raw {
        "official" => Ok(EvaluationKind::Official),
        "suggestion" => Ok(EvaluationKind::Suggestion),
        other => Err(StoreError::Backend(format!(
            "unknown evaluation kind: {other}"
        ))),
    }
}

// ---------------------------------------------------------------------------
// users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRow {
    pub user_id: String,
    pub email: String,
    pub display_name: String,
    pub role: String,
    pub matricula: Option<String>,
    pub group_id: Option<String>,
    pub project_id: Option<String>,
    pub assignments: Value,
    pub active: bool,
    #[serde(with = "surreal_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "surreal_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl UserRow {
    pub fn from_user(user: &User) -> StoreResult<Self> {
        Ok(Self {
            user_id: user.id.to_string(),
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            role: user.role.to_string(),
            matricula: user.matricula.clone(),
            group_id: user.group_id.map(|id| id.to_string()),
            project_id: user.project_id.map(|id| id.to_string()),
            assignments: to_json(&user.assignments)?,
            active: user.active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        })
    }

    pub fn into_user(self) -> StoreResult<User> {
        Ok(User {
            id: parse_id("user_id", &self.user_id)?,
            email: self.email,
            display_name: self.display_name,
            role: role_from_str(&self.role)?,
            matricula: self.matricula,
            group_id: self
                .group_id
                .as_deref()
                .map(|id| parse_id("group_id", id))
                .transpose()?,
            project_id: self
                .project_id
                .as_deref()
                .map(|id| parse_id("project_id", id))
                .transpose()?,
            assignments: from_json("assignments", self.assignments)?,
            active: self.active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

// ---------------------------------------------------------------------------
// groups / courses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupRow {
    pub group_id: String,
    pub career: String,
    pub shift: String,
    pub term: String,
    pub teacher_ids: Vec<String>,
    pub active: bool,
    #[serde(with = "surreal_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "surreal_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl GroupRow {
    pub fn from_group(group: &Group) -> Self {
        Self {
            group_id: group.id.to_string(),
            career: group.career.clone(),
            shift: group.shift.clone(),
            term: group.term.clone(),
            teacher_ids: group.teacher_ids.iter().map(|id| id.to_string()).collect(),
            active: group.active,
            created_at: group.created_at,
            updated_at: group.updated_at,
        }
    }

    pub fn into_group(self) -> StoreResult<Group> {
        Ok(Group {
            id: parse_id("group_id", &self.group_id)?,
            career: self.career,
            shift: self.shift,
            term: self.term,
            teacher_ids: self
                .teacher_ids
                .iter()
                .map(|id| parse_id("teacher_ids", id))
                .collect::<StoreResult<_>>()?,
            active: self.active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseRow {
    pub course_id: String,
    pub career: String,
    pub name: String,
    pub term: u8,
    pub active: bool,
    #[serde(with = "surreal_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "surreal_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl CourseRow {
    pub fn from_course(course: &Course) -> Self {
        Self {
            course_id: course.id.to_string(),
            career: course.career.clone(),
            name: course.name.clone(),
            term: course.term,
            active: course.active,
            created_at: course.created_at,
            updated_at: course.updated_at,
        }
    }

    pub fn into_course(self) -> StoreResult<Course> {
        Ok(Course {
            id: parse_id("course_id", &self.course_id)?,
            career: self.career,
            name: self.name,
            term: self.term,
            active: self.active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

// ---------------------------------------------------------------------------
// projects
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectRow {
    pub project_id: String,
    pub title: String,
    pub description: String,
    pub leader_id: String,
    pub members: Vec<String>,
    pub group_id: String,
    pub teacher_id: Option<String>,
    pub state: String,
    pub blocks: Value,
    pub video_url: Option<String>,
    pub public: bool,
    pub points_total: i64,
    pub vote_count: u32,
    pub votes: Value,
    pub version: u64,
    #[serde(with = "surreal_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "surreal_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl ProjectRow {
    pub fn from_project(project: &Project) -> StoreResult<Self> {
        Ok(Self {
            project_id: project.id.to_string(),
            title: project.title.clone(),
            description: project.description.clone(),
            leader_id: project.leader_id.to_string(),
            members: project.members.iter().map(|id| id.to_string()).collect(),
            group_id: project.group_id.to_string(),
            teacher_id: project.teacher_id.map(|id| id.to_string()),
            state: project.state.to_string(),
            blocks: to_json(&project.blocks)?,
            video_url: project.video_url.clone(),
            public: project.public,
            points_total: project.points_total,
            vote_count: project.vote_count,
            votes: to_json(&project.votes)?,
            version: project.version,
            created_at: project.created_at,
            updated_at: project.updated_at,
        })
    }

    pub fn into_project(self) -> StoreResult<Project> {
        Ok(Project {
            id: parse_id("project_id", &self.project_id)?,
            title: self.title,
            description: self.description,
            leader_id: parse_id("leader_id", &self.leader_id)?,
            members: self
                .members
                .iter()
                .map(|id| parse_id("members", id))
                .collect::<StoreResult<_>>()?,
            group_id: parse_id("group_id", &self.group_id)?,
            teacher_id: self
                .teacher_id
                .as_deref()
                .map(|id| parse_id("teacher_id", id))
                .transpose()?,
            state: state_from_str(&self.state)?,
            blocks: from_json("blocks", self.blocks)?,
            video_url: self.video_url,
            public: self.public,
            points_total: self.points_total,
            vote_count: self.vote_count,
            votes: from_json("votes", self.votes)?,
            version: self.version,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

// ---------------------------------------------------------------------------
// evaluations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationRow {
    pub evaluation_id: String,
    pub project_id: String,
    pub teacher_id: String,
    pub kind: String,
    pub content: String,
    pub grade: Option<u8>,
    pub points: i64,
    pub public: bool,
    #[serde(with = "surreal_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "surreal_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl EvaluationRow {
    pub fn from_evaluation(evaluation: &Evaluation) -> Self {
        Self {
            evaluation_id: evaluation.id.to_string(),
            project_id: evaluation.project_id.to_string(),
            teacher_id: evaluation.teacher_id.to_string(),
            kind: evaluation.kind.to_string(),
            content: evaluation.content.clone(),
            grade: evaluation.grade,
            points: evaluation.points,
            public: evaluation.public,
            created_at: evaluation.created_at,
            updated_at: evaluation.updated_at,
        }
    }

    pub fn into_evaluation(self) -> StoreResult<Evaluation> {
        Ok(Evaluation {
            id: parse_id("evaluation_id", &self.evaluation_id)?,
            project_id: parse_id("project_id", &self.project_id)?,
            teacher_id: parse_id("teacher_id", &self.teacher_id)?,
            kind: kind_from_str(&self.kind)?,
            content: self.content,
            grade: self.grade,
            points: self.points,
            public: self.public,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
