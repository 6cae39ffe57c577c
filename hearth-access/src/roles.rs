//! Role Model
//!
//! Enumerates the closed, ordered role set and the capability grants each
//! role carries. Roles travel as opaque strings inside tokens; capabilities
//! are named permission requirements attached to operations, so new resource
//! types can declare a required capability without touching the authorizer.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Roles, ordered from least to most privileged
#[derive(
    Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Role {
    /// Internal marker for unauthenticated callers; never minted into tokens
    Anonymous,
    /// Read-only access to owned hubs
    Viewer,
    /// Full control of owned hubs and the owning account
    User,
    /// Unrestricted access across all tenants
    Admin,
}

impl Role {
    /// Capabilities granted by this role
    pub fn grants(&self) -> HashSet<Capability> {
        use Capability::*;

        match self {
            Role::Anonymous => HashSet::new(),
            Role::Viewer => [ViewHub].into_iter().collect(),
            Role::User => [ViewHub, ControlDevices, ConfigureHub, ManageAccount]
                .into_iter()
                .collect(),
            Role::Admin => [
                ViewHub,
                ControlDevices,
                ConfigureHub,
                ManageAccount,
                ManageUsers,
                ManageServer,
            ]
            .into_iter()
            .collect(),
        }
    }

    /// Whether this role alone satisfies the capability
    pub fn satisfies(&self, capability: Capability) -> bool {
        self.grants().contains(&capability)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Anonymous => write!(f, "anonymous"),
            Role::Viewer => write!(f, "viewer"),
            Role::User => write!(f, "user"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "anonymous" => Ok(Role::Anonymous),
            "viewer" => Ok(Role::Viewer),
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

/// Named permission requirements attached to operations
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum Capability {
    /// Read hub state and aggregate views
    ViewHub,
    /// Act on devices and variables
    ControlDevices,
    /// Manage triggers, jobs, and hub configuration
    ConfigureHub,
    /// Manage the owning user account
    ManageAccount,
    /// Administer user accounts across tenants
    ManageUsers,
    /// Server lifecycle operations
    ManageServer,
}

impl Capability {
    /// Whether this capability requires an authenticated identity.
    /// Every current capability does; unauthenticated endpoints never
    /// consult the authorizer at all.
    pub fn requires_identity(&self) -> bool {
        true
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Capability::ViewHub => write!(f, "view_hub"),
            Capability::ControlDevices => write!(f, "control_devices"),
            Capability::ConfigureHub => write!(f, "configure_hub"),
            Capability::ManageAccount => write!(f, "manage_account"),
            Capability::ManageUsers => write!(f, "manage_users"),
            Capability::ManageServer => write!(f, "manage_server"),
        }
    }
}

impl std::str::FromStr for Capability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "view_hub" => Ok(Capability::ViewHub),
            "control_devices" => Ok(Capability::ControlDevices),
            "configure_hub" => Ok(Capability::ConfigureHub),
            "manage_account" => Ok(Capability::ManageAccount),
            "manage_users" => Ok(Capability::ManageUsers),
            "manage_server" => Ok(Capability::ManageServer),
            _ => Err(format!("Unknown capability: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_are_ordered_by_privilege() {
        assert!(Role::Anonymous < Role::Viewer);
        assert!(Role::Viewer < Role::User);
        assert!(Role::User < Role::Admin);
    }

    #[test]
    fn role_round_trips_through_string_form() {
        for role in [Role::Anonymous, Role::Viewer, Role::User, Role::Admin] {
            let parsed: Role = role.to_string().parse().unwrap();
            assert_eq!(parsed, role);
        }
        assert!("operator".parse::<Role>().is_err());
    }

    #[test]
    fn capability_round_trips_through_string_form() {
        for capability in [
            Capability::ViewHub,
            Capability::ControlDevices,
            Capability::ConfigureHub,
            Capability::ManageAccount,
            Capability::ManageUsers,
            Capability::ManageServer,
        ] {
            let parsed: Capability = capability.to_string().parse().unwrap();
            assert_eq!(parsed, capability);
        }
    }

    #[test]
    fn admin_grants_every_capability() {
        let grants = Role::Admin.grants();
        assert!(grants.contains(&Capability::ViewHub));
        assert!(grants.contains(&Capability::ManageUsers));
        assert!(grants.contains(&Capability::ManageServer));
    }

    #[test]
    fn viewer_is_read_only() {
        assert!(Role::Viewer.satisfies(Capability::ViewHub));
        assert!(!Role::Viewer.satisfies(Capability::ControlDevices));
        assert!(!Role::Viewer.satisfies(Capability::ConfigureHub));
    }

    #[test]
    fn anonymous_grants_nothing() {
        assert!(Role::Anonymous.grants().is_empty());
    }
}
