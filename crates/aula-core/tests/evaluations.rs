//! Integration tests for evaluations and visibility rules.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use aula_core::repo::memory::{MemoryEvaluationStore, MemoryProjectStore, MemoryUserStore};
use aula_core::repo::{EvaluationStore, ProjectStore, UserStore};
use aula_core::{
    DomainError, EvaluationApi, EvaluationKind, NewProject, Project, ProjectLifecycleApi,
    ProjectState, Role, User, ValidationError,
};

struct Fixture {
    users: Arc<MemoryUserStore>,
    projects: Arc<MemoryProjectStore>,
    evaluations: Arc<MemoryEvaluationStore>,
    api: EvaluationApi,
    lifecycle: ProjectLifecycleApi,
}

fn fixture() -> Fixture {
    let users = Arc::new(MemoryUserStore::new());
    let projects = Arc::new(MemoryProjectStore::new());
    let evaluations = Arc::new(MemoryEvaluationStore::new());
    let api = EvaluationApi::new(users.clone(), projects.clone(), evaluations.clone());
    let lifecycle = ProjectLifecycleApi::new(users.clone(), projects.clone());
    Fixture {
        users,
        projects,
        evaluations,
        api,
        lifecycle,
    }
}

async fn seed_teacher(users: &MemoryUserStore, email: &str) -> User {
    let user = User::new(email, "Teacher", Role::Teacher, None, Utc::now());
    users.create(&user).await.unwrap();
    user
}

async fn seed_admin(users: &MemoryUserStore) -> User {
    let user = User::new("admin@itsur.edu.mx", "Admin", Role::Admin, None, Utc::now());
    users.create(&user).await.unwrap();
    user
}

async fn seed_project(fx: &Fixture) -> Project {
    let mut student = User::new(
        "22220001@alumnos.itsur.edu.mx",
        "Student",
        Role::Student,
        Some("22220001".into()),
        Utc::now(),
    );
    student.group_id = Some(Uuid::new_v4());
    fx.users.create(&student).await.unwrap();
    fx.lifecycle
        .create(
            student.id,
            NewProject {
                title: "Solar tracker".into(),
                description: String::new(),
            },
        )
        .await
        .unwrap()
}

// ── Create ──

#[tokio::test]
async fn official_evaluation_contributes_scaled_points() {
    let fx = fixture();
    let teacher = seed_teacher(&fx.users, "maria.lopez@itsur.edu.mx").await;
    let project = seed_project(&fx).await;

    let ev = fx
        .api
        .create(
            project.id,
            teacher.id,
            EvaluationKind::Official,
            "good work",
            Some(85),
        )
        .await
        .unwrap();

    // 10 + round(0.9 * 85) = 87 under the default scale.
    assert_eq!(ev.points, 87);
    assert_eq!(ev.grade, Some(85));
    assert!(!ev.public);

    let stored = fx.projects.get(project.id).await.unwrap().unwrap();
    assert_eq!(stored.points_total, 87);
    // First official grade promotes the draft.
    assert_eq!(stored.state, ProjectState::Active);
}

#[tokio::test]
async fn suggestion_contributes_nothing_and_must_not_be_graded() {
    let fx = fixture();
    let teacher = seed_teacher(&fx.users, "maria.lopez@itsur.edu.mx").await;
    let project = seed_project(&fx).await;

    let ev = fx
        .api
        .create(
            project.id,
            teacher.id,
            EvaluationKind::Suggestion,
            "try a different sensor",
            None,
        )
        .await
        .unwrap();
    assert_eq!(ev.points, 0);

    let stored = fx.projects.get(project.id).await.unwrap().unwrap();
    assert_eq!(stored.points_total, 0);
    assert_eq!(stored.state, ProjectState::Draft);

    let err = fx
        .api
        .create(
            project.id,
            teacher.id,
            EvaluationKind::Suggestion,
            "graded suggestion",
            Some(90),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Validation(ValidationError::GradeNotAllowed)
    ));
}

#[tokio::test]
async fn official_evaluation_validates_grade() {
    let fx = fixture();
    let teacher = seed_teacher(&fx.users, "maria.lopez@itsur.edu.mx").await;
    let project = seed_project(&fx).await;

    let err = fx
        .api
        .create(
            project.id,
            teacher.id,
            EvaluationKind::Official,
            "no grade",
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Validation(ValidationError::GradeRequired)
    ));

    let err = fx
        .api
        .create(
            project.id,
            teacher.id,
            EvaluationKind::Official,
            "too high",
            Some(120),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Validation(ValidationError::GradeOutOfRange { .. })
    ));
}

#[tokio::test]
async fn create_requires_existing_project_and_teacher_role() {
    let fx = fixture();
    let teacher = seed_teacher(&fx.users, "maria.lopez@itsur.edu.mx").await;
    let project = seed_project(&fx).await;

    let err = fx
        .api
        .create(
            Uuid::new_v4(),
            teacher.id,
            EvaluationKind::Suggestion,
            "ghost",
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::ProjectNotFound(_)));

    let guest = User::new("visitor@gmail.com", "Visitor", Role::Guest, None, Utc::now());
    fx.users.create(&guest).await.unwrap();
    let err = fx
        .api
        .create(
            project.id,
            guest.id,
            EvaluationKind::Suggestion,
            "not allowed",
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Unauthorized { .. }));
}

// ── Visibility ──

#[tokio::test]
async fn author_can_toggle_visibility() {
    let fx = fixture();
    let teacher = seed_teacher(&fx.users, "maria.lopez@itsur.edu.mx").await;
    let project = seed_project(&fx).await;
    let ev = fx
        .api
        .create(
            project.id,
            teacher.id,
            EvaluationKind::Suggestion,
            "make it public",
            None,
        )
        .await
        .unwrap();

    fx.api
        .change_visibility(ev.id, teacher.id, true)
        .await
        .unwrap();
    let stored = fx.evaluations.get(ev.id).await.unwrap().unwrap();
    assert!(stored.public);
}

#[tokio::test]
async fn admin_can_toggle_visibility_others_cannot() {
    let fx = fixture();
    let author = seed_teacher(&fx.users, "maria.lopez@itsur.edu.mx").await;
    let rival = seed_teacher(&fx.users, "juan.perez@itsur.edu.mx").await;
    let admin = seed_admin(&fx.users).await;
    let project = seed_project(&fx).await;
    let ev = fx
        .api
        .create(
            project.id,
            author.id,
            EvaluationKind::Suggestion,
            "private note",
            None,
        )
        .await
        .unwrap();

    let err = fx
        .api
        .change_visibility(ev.id, rival.id, true)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Unauthorized { .. }));

    fx.api
        .change_visibility(ev.id, admin.id, true)
        .await
        .unwrap();
    assert!(fx.evaluations.get(ev.id).await.unwrap().unwrap().public);
}

#[tokio::test]
async fn change_visibility_requires_existing_ids() {
    let fx = fixture();
    let teacher = seed_teacher(&fx.users, "maria.lopez@itsur.edu.mx").await;
    let project = seed_project(&fx).await;
    let ev = fx
        .api
        .create(
            project.id,
            teacher.id,
            EvaluationKind::Suggestion,
            "note",
            None,
        )
        .await
        .unwrap();

    let err = fx
        .api
        .change_visibility(Uuid::new_v4(), teacher.id, true)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::EvaluationNotFound(_)));

    let err = fx
        .api
        .change_visibility(ev.id, Uuid::new_v4(), true)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::UserNotFound(_)));
}

#[tokio::test]
async fn list_visible_hides_private_evaluations_from_outsiders() {
    let fx = fixture();
    let author = seed_teacher(&fx.users, "maria.lopez@itsur.edu.mx").await;
    let admin = seed_admin(&fx.users).await;
    let project = seed_project(&fx).await;

    let private_ev = fx
        .api
        .create(
            project.id,
            author.id,
            EvaluationKind::Suggestion,
            "private",
            None,
        )
        .await
        .unwrap();
    let public_ev = fx
        .api
        .create(
            project.id,
            author.id,
            EvaluationKind::Official,
            "public",
            Some(90),
        )
        .await
        .unwrap();
    fx.api
        .change_visibility(public_ev.id, author.id, true)
        .await
        .unwrap();

    // Anonymous viewer: public only.
    let seen = fx.api.list_visible(project.id, None).await.unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].id, public_ev.id);

    // Author and admin see everything.
    let seen = fx
        .api
        .list_visible(project.id, Some(author.id))
        .await
        .unwrap();
    assert_eq!(seen.len(), 2);
    let seen = fx
        .api
        .list_visible(project.id, Some(admin.id))
        .await
        .unwrap();
    assert!(seen.iter().any(|e| e.id == private_ev.id));
}
