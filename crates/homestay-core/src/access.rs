//! Role-based access control.
//!
//! The statement is fixed: every role maps to the set of actions it may
//! perform on each resource. Handlers ask for one or more actions on a
//! single resource and are granted access only if all of them are held.

use serde::{Deserialize, Serialize};

/// Session role attached to every user.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    #[default]
    User,
    SuperUser,
    SuperAdmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::SuperUser => "superUser",
            Role::SuperAdmin => "superAdmin",
        }
    }

    /// Moderators may manage applications, landing content and uploads.
    pub fn is_moderator(&self) -> bool {
        matches!(self, Role::SuperUser | Role::SuperAdmin)
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "superUser" => Ok(Role::SuperUser),
            "superAdmin" => Ok(Role::SuperAdmin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Review,
    Dashboard,
}

impl Resource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Review => "review",
            Resource::Dashboard => "dashboard",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Write,
    View,
    Update,
    Delete,
    Approve,
    Reject,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Write => "write",
            Action::View => "view",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Approve => "approve",
            Action::Reject => "reject",
        }
    }
}

/// Actions a role holds on a resource.
pub fn granted_actions(role: Role, resource: Resource) -> &'static [Action] {
    use Action::*;

    match (role, resource) {
        (_, Resource::Review) => &[Write],
        (Role::User, Resource::Dashboard) => &[],
        (Role::SuperUser, Resource::Dashboard) => &[View, Update],
        (Role::SuperAdmin, Resource::Dashboard) => &[View, Update, Delete, Approve, Reject],
    }
}

/// True iff `role` holds every one of `actions` on `resource`.
pub fn has_permission(role: Role, resource: Resource, actions: &[Action]) -> bool {
    let granted = granted_actions(role, resource);
    actions.iter().all(|a| granted.contains(a))
}
