//! Authorizer
//!
//! Turns a resolved address, an optional verified credential, and a
//! required capability into an allow/deny decision. Checks are
//! capability-named rather than resource-specific, so new resource types
//! declare a required capability without changes here.
//!
//! The ownership rule: an admin credential satisfies any capability
//! regardless of address; every other role is address-scoped and may only
//! act on addresses whose user matches the credential subject, with
//! hub-scoped requests additionally requiring the hub to belong to that
//! user (delegated to the hub-configuration collaborator).

use std::sync::Arc;

use tracing::debug;

use crate::address::Address;
use crate::error::{AccessError, AccessResult};
use crate::roles::{Capability, Role};
use crate::token::Credential;

/// Hub-ownership lookup, backed by the hub-configuration subsystem
pub trait HubDirectory: Send + Sync {
    fn hub_belongs_to(&self, user_id: &str, hub_id: &str) -> bool;
}

/// Role- and ownership-based authorization decisions
pub struct Authorizer {
    hubs: Arc<dyn HubDirectory>,
}

impl Authorizer {
    pub fn new(hubs: Arc<dyn HubDirectory>) -> Self {
        Self { hubs }
    }

    /// Decide whether `credential` may exercise `capability` on `address`
    pub fn authorize(
        &self,
        address: &Address,
        credential: Option<&Credential>,
        capability: Capability,
    ) -> AccessResult<()> {
        let Some(credential) = credential else {
            if !capability.requires_identity() || Role::Anonymous.satisfies(capability) {
                return Ok(());
            }
            debug!(capability = %capability, "Anonymous caller denied");
            return Err(AccessError::Unauthenticated);
        };

        // No escalation elsewhere: admin alone crosses tenant boundaries.
        if credential.has_role(Role::Admin) {
            return Ok(());
        }

        if !credential
            .roles
            .iter()
            .any(|role| role.satisfies(capability))
        {
            debug!(
                subject = %credential.subject,
                capability = %capability,
                "Capability not granted by role set"
            );
            return Err(AccessError::Forbidden);
        }

        if let Some(user_id) = &address.user_id {
            if user_id != &credential.subject {
                debug!(
                    subject = %credential.subject,
                    target = %user_id,
                    "Cross-tenant access denied"
                );
                return Err(AccessError::Forbidden);
            }

            if let Some(hub_id) = &address.hub_id {
                if !self.hubs.hub_belongs_to(user_id, hub_id) {
                    debug!(
                        subject = %credential.subject,
                        hub = %hub_id,
                        "Hub does not belong to user"
                    );
                    return Err(AccessError::Forbidden);
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};

    struct StubHubs {
        hubs: HashMap<String, Vec<String>>,
    }

    impl StubHubs {
        fn new(entries: &[(&str, &str)]) -> Arc<Self> {
            let mut hubs: HashMap<String, Vec<String>> = HashMap::new();
            for (user, hub) in entries {
                hubs.entry(user.to_string()).or_default().push(hub.to_string());
            }
            Arc::new(Self { hubs })
        }
    }

    impl HubDirectory for StubHubs {
        fn hub_belongs_to(&self, user_id: &str, hub_id: &str) -> bool {
            self.hubs
                .get(user_id)
                .map(|owned| owned.iter().any(|h| h == hub_id))
                .unwrap_or(false)
        }
    }

    fn credential(subject: &str, roles: &[Role]) -> Credential {
        Credential {
            subject: subject.to_string(),
            roles: roles.iter().copied().collect::<HashSet<_>>(),
            issued_at: 0,
            expires_at: None,
            issuer: "hearth".to_string(),
        }
    }

    fn authorizer() -> Authorizer {
        Authorizer::new(StubHubs::new(&[("u1", "h1"), ("u2", "h2")]))
    }

    #[test]
    fn anonymous_caller_is_unauthenticated() {
        let err = authorizer()
            .authorize(&Address::user("u1"), None, Capability::ViewHub)
            .unwrap_err();
        assert!(matches!(err, AccessError::Unauthenticated));
    }

    #[test]
    fn owner_may_view_own_hub() {
        let cred = credential("u1", &[Role::User]);
        assert!(authorizer()
            .authorize(&Address::hub("u1", "h1"), Some(&cred), Capability::ViewHub)
            .is_ok());
    }

    #[test]
    fn cross_tenant_access_is_forbidden() {
        let cred = credential("u1", &[Role::User]);
        let err = authorizer()
            .authorize(&Address::user("u2"), Some(&cred), Capability::ViewHub)
            .unwrap_err();
        assert!(matches!(err, AccessError::Forbidden));
    }

    #[test]
    fn admin_crosses_tenant_boundaries() {
        let cred = credential("root", &[Role::Admin]);
        let authorizer = authorizer();
        assert!(authorizer
            .authorize(&Address::hub("u1", "h1"), Some(&cred), Capability::ViewHub)
            .is_ok());
        assert!(authorizer
            .authorize(&Address::hub("u2", "h2"), Some(&cred), Capability::ConfigureHub)
            .is_ok());
        assert!(authorizer
            .authorize(&Address::default(), Some(&cred), Capability::ManageServer)
            .is_ok());
    }

    #[test]
    fn missing_capability_is_forbidden() {
        let cred = credential("u1", &[Role::Viewer]);
        let err = authorizer()
            .authorize(
                &Address::hub("u1", "h1"),
                Some(&cred),
                Capability::ControlDevices,
            )
            .unwrap_err();
        assert!(matches!(err, AccessError::Forbidden));
    }

    #[test]
    fn foreign_hub_under_own_user_is_forbidden() {
        // address claims u1 owns h2, which the directory denies
        let cred = credential("u1", &[Role::User]);
        let err = authorizer()
            .authorize(&Address::hub("u1", "h2"), Some(&cred), Capability::ViewHub)
            .unwrap_err();
        assert!(matches!(err, AccessError::Forbidden));
    }

    #[test]
    fn non_admin_passes_capability_check_on_unscoped_address() {
        // no user segment resolved: only the capability dimension applies
        let cred = credential("u1", &[Role::User]);
        assert!(authorizer()
            .authorize(&Address::default(), Some(&cred), Capability::ViewHub)
            .is_ok());
    }

    #[test]
    fn server_management_requires_admin() {
        let cred = credential("u1", &[Role::User]);
        let err = authorizer()
            .authorize(&Address::default(), Some(&cred), Capability::ManageServer)
            .unwrap_err();
        assert!(matches!(err, AccessError::Forbidden));
    }
}
