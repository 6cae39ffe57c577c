//! Address Resolver
//!
//! Parses REST paths into tenant/hub addresses. Paths follow the grammar
//! `/{apiRoot}/users/{userId}[/hubs/{hubId}[/...]]`; anything after the hub
//! segment identifies a sub-resource and is irrelevant to addressing.
//!
//! Resolution never fails: malformed or partial paths degrade to the most
//! specific address derivable, down to a fully empty address.

use serde::{Deserialize, Serialize};

/// Resolved tenant/hub scope of a request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Tenant owning the targeted resource
    pub user_id: Option<String>,
    /// Present only when the path descends into a specific hub's sub-tree
    pub hub_id: Option<String>,
}

impl Address {
    /// Address scoped to a user-level resource
    pub fn user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            hub_id: None,
        }
    }

    /// Address scoped to a specific hub
    pub fn hub(user_id: impl Into<String>, hub_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            hub_id: Some(hub_id.into()),
        }
    }

    /// True when no recognizable segment was found
    pub fn is_empty(&self) -> bool {
        self.user_id.is_none() && self.hub_id.is_none()
    }
}

/// Resolve a request path into an [`Address`]
///
/// Strips `base_prefix` when the path starts with it, then walks the
/// remaining segments for the `users`/`hubs` literals. A hub segment counts
/// only when it occurs after the user segment.
pub fn resolve(base_prefix: Option<&str>, path: Option<&str>) -> Address {
    let Some(path) = path else {
        return Address::default();
    };

    let remainder = strip_prefix(base_prefix, path);
    let segments: Vec<&str> = remainder.split('/').filter(|s| !s.is_empty()).collect();

    let mut address = Address::default();
    let mut index = 0;
    while index < segments.len() {
        match segments[index] {
            "users" if address.user_id.is_none() => {
                if let Some(id) = segments.get(index + 1).filter(|s| !s.is_empty()) {
                    address.user_id = Some((*id).to_string());
                    index += 2;
                    continue;
                }
            }
            "hubs" if address.user_id.is_some() && address.hub_id.is_none() => {
                if let Some(id) = segments.get(index + 1).filter(|s| !s.is_empty()) {
                    address.hub_id = Some((*id).to_string());
                    index += 2;
                    continue;
                }
            }
            _ => {}
        }
        index += 1;
    }

    address
}

/// Convert a path into a colon-delimited identifier
///
/// Strips `base_prefix` when provided and present, then joins the remaining
/// segments with `:`. Returns `None` only for a null path.
pub fn path_identifier(base_prefix: Option<&str>, path: Option<&str>) -> Option<String> {
    let path = path?;
    let remainder = strip_prefix(base_prefix, path);
    Some(
        remainder
            .split('/')
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(":"),
    )
}

fn strip_prefix<'a>(base_prefix: Option<&str>, path: &'a str) -> &'a str {
    match base_prefix {
        Some(prefix) if !prefix.is_empty() => path.strip_prefix(prefix).unwrap_or(path),
        _ => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_user_and_hub_below_api_root() {
        let address = resolve(Some("/api/v1"), Some("/api/v1/users/u1/hubs/h1/devices"));
        assert_eq!(address, Address::hub("u1", "h1"));
    }

    #[test]
    fn resolves_user_only_address() {
        let address = resolve(None, Some("/users/u1"));
        assert_eq!(address, Address::user("u1"));
    }

    #[test]
    fn null_path_resolves_to_empty_address() {
        let address = resolve(Some("/api/v1"), None);
        assert!(address.is_empty());
    }

    #[test]
    fn hub_without_preceding_user_is_ignored() {
        let address = resolve(None, Some("/hubs/h1/users/u1"));
        assert_eq!(address, Address::user("u1"));
    }

    #[test]
    fn trailing_users_literal_degrades_to_empty() {
        let address = resolve(None, Some("/users"));
        assert!(address.is_empty());
    }

    #[test]
    fn unrelated_path_resolves_to_empty_address() {
        let address = resolve(Some("/api/v1"), Some("/api/v1/health"));
        assert!(address.is_empty());
    }

    #[test]
    fn prefix_is_only_stripped_when_present() {
        let address = resolve(Some("/api/v1"), Some("/users/u2/hubs/h9"));
        assert_eq!(address, Address::hub("u2", "h9"));
    }

    #[test]
    fn sub_resource_segments_do_not_affect_address() {
        let a = resolve(Some("/api/v1"), Some("/api/v1/users/u1/hubs/h1"));
        let b = resolve(
            Some("/api/v1"),
            Some("/api/v1/users/u1/hubs/h1/triggers/t7/history"),
        );
        assert_eq!(a, b);
    }

    #[test]
    fn path_identifier_strips_root() {
        assert_eq!(
            path_identifier(Some("/api/v1"), Some("/api/v1/hubs/local")),
            Some("hubs:local".to_string())
        );
    }

    #[test]
    fn path_identifier_of_null_path_is_absent() {
        assert_eq!(path_identifier(Some("/api/v1"), None), None);
    }

    #[test]
    fn path_identifier_without_root_substitutes_separators() {
        assert_eq!(
            path_identifier(None, Some("/users/u1/hubs/h1")),
            Some("users:u1:hubs:h1".to_string())
        );
    }

    #[test]
    fn path_identifier_collapses_duplicate_separators() {
        assert_eq!(
            path_identifier(None, Some("//hubs//local/")),
            Some("hubs:local".to_string())
        );
    }
}
