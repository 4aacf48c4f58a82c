//! Integration tests for team membership rules.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use aula_core::repo::memory::{MemoryProjectStore, MemoryUserStore};
use aula_core::repo::{ProjectStore, UserStore};
use aula_core::{
    DomainError, MembershipApi, NewProject, Project, ProjectLifecycleApi, Role, User,
};

fn stores() -> (Arc<MemoryUserStore>, Arc<MemoryProjectStore>) {
    (
        Arc::new(MemoryUserStore::new()),
        Arc::new(MemoryProjectStore::new()),
    )
}

fn apis(
    users: &Arc<MemoryUserStore>,
    projects: &Arc<MemoryProjectStore>,
) -> (MembershipApi, ProjectLifecycleApi) {
    (
        MembershipApi::new(users.clone(), projects.clone()),
        ProjectLifecycleApi::new(users.clone(), projects.clone()),
    )
}

async fn seed_student(users: &MemoryUserStore, group_id: Uuid, matricula: &str) -> User {
    let mut user = User::new(
        format!("{matricula}@alumnos.itsur.edu.mx"),
        format!("Student {matricula}"),
        Role::Student,
        Some(matricula.to_string()),
        Utc::now(),
    );
    user.group_id = Some(group_id);
    users.create(&user).await.unwrap();
    user
}

async fn seed_project(
    lifecycle: &ProjectLifecycleApi,
    leader: &User,
) -> Project {
    lifecycle
        .create(
            leader.id,
            NewProject {
                title: "Weather station".into(),
                description: String::new(),
            },
        )
        .await
        .unwrap()
}

/// The bidirectional consistency invariant: a user points at a project iff
/// that project lists them as a member.
async fn assert_consistent(
    users: &MemoryUserStore,
    projects: &MemoryProjectStore,
    group_id: Uuid,
) {
    let all_projects = projects.list().await.unwrap();
    for project in &all_projects {
        for member_id in &project.members {
            let member = users.get(*member_id).await.unwrap().unwrap();
            assert_eq!(
                member.project_id,
                Some(project.id),
                "member {} of {} does not point back",
                member_id,
                project.id
            );
        }
    }
    for user in users.list_by_group(group_id).await.unwrap() {
        if let Some(project_id) = user.project_id {
            let project = projects.get(project_id).await.unwrap().unwrap();
            assert!(project.has_member(user.id));
        }
    }
}

// ── AddMember ──

#[tokio::test]
async fn leader_adds_groupmate_by_matricula() {
    let (users, projects) = stores();
    let (membership, lifecycle) = apis(&users, &projects);
    let group_id = Uuid::new_v4();

    let leader = seed_student(&users, group_id, "22220001").await;
    let mate = seed_student(&users, group_id, "22220002").await;
    let project = seed_project(&lifecycle, &leader).await;

    let outcome = membership
        .add_member(project.id, leader.id, "22220002")
        .await
        .unwrap();
    assert!(outcome.success, "{}", outcome.message);

    let stored = projects.get(project.id).await.unwrap().unwrap();
    assert_eq!(stored.members, vec![leader.id, mate.id]);
    assert_eq!(
        users.get(mate.id).await.unwrap().unwrap().project_id,
        Some(project.id)
    );
    assert_consistent(&users, &projects, group_id).await;
}

#[tokio::test]
async fn leader_adds_groupmate_by_email_case_insensitively() {
    let (users, projects) = stores();
    let (membership, lifecycle) = apis(&users, &projects);
    let group_id = Uuid::new_v4();

    let leader = seed_student(&users, group_id, "22220001").await;
    seed_student(&users, group_id, "22220002").await;
    let project = seed_project(&lifecycle, &leader).await;

    let outcome = membership
        .add_member(project.id, leader.id, "22220002@ALUMNOS.itsur.edu.mx")
        .await
        .unwrap();
    assert!(outcome.success);
}

#[tokio::test]
async fn non_leader_cannot_add_members() {
    let (users, projects) = stores();
    let (membership, lifecycle) = apis(&users, &projects);
    let group_id = Uuid::new_v4();

    let leader = seed_student(&users, group_id, "22220001").await;
    let mate = seed_student(&users, group_id, "22220002").await;
    seed_student(&users, group_id, "22220003").await;
    let project = seed_project(&lifecycle, &leader).await;

    let err = membership
        .add_member(project.id, mate.id, "22220003")
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Unauthorized { .. }));
}

#[tokio::test]
async fn unknown_target_is_not_found() {
    let (users, projects) = stores();
    let (membership, lifecycle) = apis(&users, &projects);
    let group_id = Uuid::new_v4();

    let leader = seed_student(&users, group_id, "22220001").await;
    let project = seed_project(&lifecycle, &leader).await;

    let err = membership
        .add_member(project.id, leader.id, "99999999")
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::UserNotFound(_)));
}

#[tokio::test]
async fn target_already_on_a_project_is_rejected() {
    let (users, projects) = stores();
    let (membership, lifecycle) = apis(&users, &projects);
    let group_id = Uuid::new_v4();

    let leader_a = seed_student(&users, group_id, "22220001").await;
    let leader_b = seed_student(&users, group_id, "22220002").await;
    let project_a = seed_project(&lifecycle, &leader_a).await;
    let _project_b = seed_project(&lifecycle, &leader_b).await;

    // leader_b already leads their own project; exclusivity blocks the add.
    let outcome = membership
        .add_member(project_a.id, leader_a.id, "22220002")
        .await
        .unwrap();
    assert!(!outcome.success);
    assert!(outcome.message.contains("already a member"));
    assert_consistent(&users, &projects, group_id).await;
}

#[tokio::test]
async fn target_from_another_group_is_rejected() {
    let (users, projects) = stores();
    let (membership, lifecycle) = apis(&users, &projects);
    let group_id = Uuid::new_v4();

    let leader = seed_student(&users, group_id, "22220001").await;
    seed_student(&users, Uuid::new_v4(), "22220002").await;
    let project = seed_project(&lifecycle, &leader).await;

    let outcome = membership
        .add_member(project.id, leader.id, "22220002")
        .await
        .unwrap();
    assert!(!outcome.success);
    assert!(outcome.message.contains("different group"));
}

// ── RemoveMember ──

#[tokio::test]
async fn member_can_remove_themself() {
    let (users, projects) = stores();
    let (membership, lifecycle) = apis(&users, &projects);
    let group_id = Uuid::new_v4();

    let leader = seed_student(&users, group_id, "22220001").await;
    let mate = seed_student(&users, group_id, "22220002").await;
    let project = seed_project(&lifecycle, &leader).await;
    membership
        .add_member(project.id, leader.id, "22220002")
        .await
        .unwrap();

    let outcome = membership
        .remove_member(project.id, mate.id, mate.id)
        .await
        .unwrap();
    assert!(outcome.success);
    assert_eq!(users.get(mate.id).await.unwrap().unwrap().project_id, None);
    assert!(!projects
        .get(project.id)
        .await
        .unwrap()
        .unwrap()
        .has_member(mate.id));
    assert_consistent(&users, &projects, group_id).await;
}

#[tokio::test]
async fn leader_can_remove_member_but_stranger_cannot() {
    let (users, projects) = stores();
    let (membership, lifecycle) = apis(&users, &projects);
    let group_id = Uuid::new_v4();

    let leader = seed_student(&users, group_id, "22220001").await;
    let mate = seed_student(&users, group_id, "22220002").await;
    let stranger = seed_student(&users, group_id, "22220003").await;
    let project = seed_project(&lifecycle, &leader).await;
    membership
        .add_member(project.id, leader.id, "22220002")
        .await
        .unwrap();

    let err = membership
        .remove_member(project.id, mate.id, stranger.id)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Unauthorized { .. }));

    let outcome = membership
        .remove_member(project.id, mate.id, leader.id)
        .await
        .unwrap();
    assert!(outcome.success);
    assert_consistent(&users, &projects, group_id).await;
}

#[tokio::test]
async fn leader_cannot_be_removed_while_members_remain() {
    let (users, projects) = stores();
    let (membership, lifecycle) = apis(&users, &projects);
    let group_id = Uuid::new_v4();

    let leader = seed_student(&users, group_id, "22220001").await;
    seed_student(&users, group_id, "22220002").await;
    let project = seed_project(&lifecycle, &leader).await;
    membership
        .add_member(project.id, leader.id, "22220002")
        .await
        .unwrap();

    let outcome = membership
        .remove_member(project.id, leader.id, leader.id)
        .await
        .unwrap();
    assert!(!outcome.success);
    assert!(outcome.message.contains("leader"));
    assert!(projects
        .get(project.id)
        .await
        .unwrap()
        .unwrap()
        .has_member(leader.id));
}

#[tokio::test]
async fn removing_a_non_member_is_rejected() {
    let (users, projects) = stores();
    let (membership, lifecycle) = apis(&users, &projects);
    let group_id = Uuid::new_v4();

    let leader = seed_student(&users, group_id, "22220001").await;
    let outsider = seed_student(&users, group_id, "22220002").await;
    let project = seed_project(&lifecycle, &leader).await;

    let outcome = membership
        .remove_member(project.id, outsider.id, leader.id)
        .await
        .unwrap();
    assert!(!outcome.success);
    assert!(outcome.message.contains("not a member"));
}
