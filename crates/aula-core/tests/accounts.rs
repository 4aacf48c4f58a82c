//! Integration tests for account provisioning and catalog administration.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use aula_core::repo::memory::{MemoryCourseStore, MemoryGroupStore, MemoryUserStore};
use aula_core::repo::{GroupStore, UserStore};
use aula_core::{AccountsApi, CatalogApi, DomainError, Role, User};

fn accounts() -> (Arc<MemoryUserStore>, Arc<MemoryGroupStore>, AccountsApi) {
    let users = Arc::new(MemoryUserStore::new());
    let groups = Arc::new(MemoryGroupStore::new());
    let api = AccountsApi::new(users.clone(), groups.clone());
    (users, groups, api)
}

async fn seed_admin(users: &MemoryUserStore) -> User {
    let user = User::new("admin@itsur.edu.mx", "Admin", Role::Admin, None, Utc::now());
    users.create(&user).await.unwrap();
    user
}

// ── First login ──

#[tokio::test]
async fn first_login_creates_student_with_matricula() {
    let (_, _, api) = accounts();

    let user = api.ensure_user("22220123@Alumnos.ITSUR.edu.mx").await.unwrap();
    assert_eq!(user.role, Role::Student);
    assert_eq!(user.matricula.as_deref(), Some("22220123"));
    assert_eq!(user.email, "22220123@alumnos.itsur.edu.mx");
    assert!(user.project_id.is_none());
}

#[tokio::test]
async fn repeated_logins_are_idempotent() {
    let (_, _, api) = accounts();

    let first = api.ensure_user("maria.lopez@itsur.edu.mx").await.unwrap();
    let second = api.ensure_user("MARIA.LOPEZ@itsur.edu.mx ").await.unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(second.role, Role::Teacher);
    assert_eq!(second.display_name, "Maria Lopez");
}

#[tokio::test]
async fn empty_email_is_rejected() {
    let (_, _, api) = accounts();
    let err = api.ensure_user("   ").await.unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));
}

// ── Administration ──

#[tokio::test]
async fn admin_assigns_student_to_group() {
    let (users, groups, api) = accounts();
    let admin = seed_admin(&users).await;
    let catalog = CatalogApi::new(
        users.clone(),
        groups.clone(),
        Arc::new(MemoryCourseStore::new()),
    );

    let group = catalog
        .create_group(admin.id, "Sistemas", "matutino", "2026-1")
        .await
        .unwrap();
    let student = api.ensure_user("22220123@alumnos.itsur.edu.mx").await.unwrap();

    let updated = api
        .assign_group(admin.id, student.id, group.id)
        .await
        .unwrap();
    assert_eq!(updated.group_id, Some(group.id));

    // Assignment to an unknown group fails.
    let err = api
        .assign_group(admin.id, student.id, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::GroupNotFound(_)));
}

#[tokio::test]
async fn non_admin_cannot_administer_accounts() {
    let (_users, _, api) = accounts();
    let teacher = api.ensure_user("maria.lopez@itsur.edu.mx").await.unwrap();
    let student = api.ensure_user("22220123@alumnos.itsur.edu.mx").await.unwrap();

    let err = api
        .assign_group(teacher.id, student.id, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Unauthorized { .. }));

    let err = api
        .deactivate_user(student.id, teacher.id)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Unauthorized { .. }));
}

#[tokio::test]
async fn deactivation_is_soft() {
    let (users, _, api) = accounts();
    let admin = seed_admin(&users).await;
    let student = api.ensure_user("22220123@alumnos.itsur.edu.mx").await.unwrap();

    let deactivated = api.deactivate_user(admin.id, student.id).await.unwrap();
    assert!(!deactivated.active);
    // Record still resolvable.
    assert!(users.get(student.id).await.unwrap().is_some());
}

// ── Catalog ──

#[tokio::test]
async fn catalog_is_admin_gated_and_soft_deletes() {
    let users = Arc::new(MemoryUserStore::new());
    let groups = Arc::new(MemoryGroupStore::new());
    let courses = Arc::new(MemoryCourseStore::new());
    let catalog = CatalogApi::new(users.clone(), groups.clone(), courses.clone());
    let accounts = AccountsApi::new(users.clone(), groups.clone());

    let admin = seed_admin(&users).await;
    let teacher = accounts
        .ensure_user("maria.lopez@itsur.edu.mx")
        .await
        .unwrap();

    let err = catalog
        .create_group(teacher.id, "Sistemas", "matutino", "2026-1")
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Unauthorized { .. }));

    let group = catalog
        .create_group(admin.id, "Sistemas", "matutino", "2026-1")
        .await
        .unwrap();
    let course = catalog
        .create_course(admin.id, "Sistemas", "Estructuras de Datos", 3)
        .await
        .unwrap();

    assert_eq!(catalog.list_groups().await.unwrap().len(), 1);
    assert_eq!(catalog.list_courses("Sistemas").await.unwrap().len(), 1);

    catalog.deactivate_group(admin.id, group.id).await.unwrap();
    catalog.deactivate_course(admin.id, course.id).await.unwrap();

    assert!(catalog.list_groups().await.unwrap().is_empty());
    assert!(catalog.list_courses("Sistemas").await.unwrap().is_empty());
    // Soft delete: the rows survive.
    assert!(groups.get(group.id).await.unwrap().is_some());
}

#[tokio::test]
async fn teacher_assignments_require_teacher_role() {
    let (users, _, api) = accounts();
    let admin = seed_admin(&users).await;
    let student = api.ensure_user("22220123@alumnos.itsur.edu.mx").await.unwrap();

    let err = api
        .set_teacher_assignments(admin.id, student.id, Vec::new())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));
}
