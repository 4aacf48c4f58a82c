//! Structured observability hooks for Aula domain operations.
//!
//! Events are emitted at `info!` level with stable `event = "..."` names so
//! log pipelines can filter on them; cascade failures are emitted at
//! `warn!`. Filtering is configured via `RUST_LOG`.

use tracing::info;
use uuid::Uuid;

/// Emit event: project created by a leader.
pub fn emit_project_created(project_id: Uuid, leader_id: Uuid) {
    info!(event = "project.created", project_id = %project_id, leader_id = %leader_id);
}

/// Emit event: project deleted, members released.
pub fn emit_project_deleted(project_id: Uuid, released_members: usize) {
    info!(event = "project.deleted", project_id = %project_id, released_members = released_members);
}

/// Emit event: member joined a project team.
pub fn emit_member_added(project_id: Uuid, member_id: Uuid) {
    info!(event = "project.member_added", project_id = %project_id, member_id = %member_id);
}

/// Emit event: member left or was removed from a project team.
pub fn emit_member_removed(project_id: Uuid, member_id: Uuid) {
    info!(event = "project.member_removed", project_id = %project_id, member_id = %member_id);
}

/// Emit event: evaluation recorded for a project.
pub fn emit_evaluation_created(evaluation_id: Uuid, project_id: Uuid, kind: &str) {
    info!(
        event = "evaluation.created",
        evaluation_id = %evaluation_id,
        project_id = %project_id,
        kind = %kind,
    );
}

/// Emit event: evaluation visibility toggled.
pub fn emit_visibility_changed(evaluation_id: Uuid, public: bool) {
    info!(event = "evaluation.visibility_changed", evaluation_id = %evaluation_id, public = public);
}

/// Emit event: vote recorded (or replaced) on a project.
pub fn emit_vote_cast(project_id: Uuid, voter_id: Uuid, stars: u8, replaced: bool) {
    info!(
        event = "ranking.vote_cast",
        project_id = %project_id,
        voter_id = %voter_id,
        stars = stars,
        replaced = replaced,
    );
}

/// Emit event: a cascade step failed mid-operation (warning level).
pub fn emit_cascade_error(project_id: Uuid, error: &dyn std::fmt::Display) {
    tracing::warn!(event = "project.cascade_error", project_id = %project_id, error = %error);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emitters_do_not_panic() {
        let id = Uuid::new_v4();
        emit_project_created(id, id);
        emit_vote_cast(id, id, 5, false);
        emit_cascade_error(id, &"boom");
    }
}
