//! Request Context
//!
//! The immutable per-request value carrying the resolved address and the
//! verified credential, constructed once by the boundary layer and threaded
//! through the call chain by parameter. Nothing here is ever looked up from
//! ambient or global state.

use crate::address::Address;
use crate::token::Credential;

/// Resolved scope and identity of one request
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Tenant/hub scope the request targets
    pub address: Address,
    /// Verified credential; `None` for anonymous callers
    pub credential: Option<Credential>,
}

impl RequestContext {
    pub fn new(address: Address, credential: Option<Credential>) -> Self {
        Self {
            address,
            credential,
        }
    }

    /// Context for an unauthenticated request
    pub fn anonymous(address: Address) -> Self {
        Self {
            address,
            credential: None,
        }
    }

    /// Credential subject, when authenticated
    pub fn subject(&self) -> Option<&str> {
        self.credential.as_ref().map(|c| c.subject.as_str())
    }

    pub fn is_anonymous(&self) -> bool {
        self.credential.is_none()
    }

    pub fn is_admin(&self) -> bool {
        self.credential
            .as_ref()
            .map(|c| c.is_admin())
            .unwrap_or(false)
    }

    /// Short description for logging
    pub fn summary(&self) -> String {
        let who = self.subject().unwrap_or("anonymous");
        match (&self.address.user_id, &self.address.hub_id) {
            (Some(user), Some(hub)) => format!("{} -> users/{}/hubs/{}", who, user, hub),
            (Some(user), None) => format!("{} -> users/{}", who, user),
            _ => format!("{} -> (unscoped)", who),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::Role;
    use std::collections::HashSet;

    #[test]
    fn anonymous_context_has_no_subject() {
        let context = RequestContext::anonymous(Address::user("u1"));
        assert!(context.is_anonymous());
        assert!(!context.is_admin());
        assert_eq!(context.subject(), None);
    }

    #[test]
    fn summary_reflects_scope_and_identity() {
        let credential = Credential {
            subject: "u1".to_string(),
            roles: [Role::Admin].into_iter().collect::<HashSet<_>>(),
            issued_at: 0,
            expires_at: None,
            issuer: "hearth".to_string(),
        };
        let context = RequestContext::new(Address::hub("u1", "h1"), Some(credential));
        assert!(context.is_admin());
        assert_eq!(context.summary(), "u1 -> users/u1/hubs/h1");
    }
}
