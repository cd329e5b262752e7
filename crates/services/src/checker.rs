//! # Action Checker
//!
//! The permission resolver: maps each requested action flag to the capability
//! it requires and computes the actor's authorized subset. A single
//! unauthorized flag fails the whole batch; partial authorization is a
//! validation failure, never a silent drop.

use domains::actions::{ActionName, ActionRequest, ActorContext};
use domains::permissions::Permission;

/// Capability required for each action. `None` marks the self-service
/// actions: anyone may request them, the board's settings and the post
/// password gate them further down the pipeline.
fn required_permission(action: ActionName) -> Option<Permission> {
    match action {
        ActionName::Delete
        | ActionName::Spoiler
        | ActionName::UnlinkFile
        | ActionName::Report
        | ActionName::GlobalReport => None,
        ActionName::Edit | ActionName::Move => Some(Permission::ManageBoardGeneral),
        ActionName::ReportBan => Some(Permission::ManageBoardBans),
    }
}

/// Output of the permission resolver, produced once per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionResult {
    /// True iff every requested action is authorized.
    pub has_permission: bool,
    /// The authorized subset of requested actions, in declaration order.
    pub valid_actions: Vec<ActionName>,
}

/// Pure function of the actor and the request; no side effects.
pub fn resolve(actor: &ActorContext, request: &ActionRequest) -> PermissionResult {
    let mut has_permission = true;
    let mut valid_actions = Vec::new();
    for action in request.requested() {
        match required_permission(action) {
            None => valid_actions.push(action),
            Some(permission) if actor.permissions.has(permission) => valid_actions.push(action),
            Some(_) => has_permission = false,
        }
    }
    PermissionResult {
        has_permission,
        valid_actions,
    }
}
