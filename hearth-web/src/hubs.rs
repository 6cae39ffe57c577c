//! In-memory hub registry
//!
//! Stands in for the hub-configuration and domain-manager subsystems, which
//! this service consumes only through narrow interfaces: hub ownership
//! lookups for the authorizer, and per-entity modification stamps for the
//! change-fingerprint cache.

use std::collections::HashMap;
use std::sync::RwLock;

use serde::Serialize;
use tracing::debug;

use hearth_access::{FingerprintEntry, HubDirectory};

/// One registered hub and the modification stamps of its entities
#[derive(Debug, Clone, Serialize)]
pub struct HubRecord {
    pub hub_id: String,
    pub owner_id: String,
    pub name: String,
    /// Modification stamps of the hub's devices, variables, triggers, jobs
    pub entities: Vec<FingerprintEntry>,
}

/// Aggregate view of one hub, handed to the status endpoint
#[derive(Debug, Clone, Serialize)]
pub struct HubSnapshot {
    pub hub_id: String,
    pub name: String,
    pub entries: Vec<FingerprintEntry>,
}

/// In-memory registry of hubs keyed by hub id
#[derive(Debug, Default)]
pub struct HubRegistry {
    hubs: RwLock<HashMap<String, HubRecord>>,
}

impl HubRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace a hub
    pub fn register(&self, record: HubRecord) {
        debug!("Registering hub '{}' for user '{}'", record.hub_id, record.owner_id);
        let mut hubs = self.hubs.write().unwrap();
        hubs.insert(record.hub_id.clone(), record);
    }

    /// Update one entity's modification stamp
    pub fn touch_entity(&self, hub_id: &str, entity_id: &str, last_modified: Option<i64>) {
        let mut hubs = self.hubs.write().unwrap();
        if let Some(record) = hubs.get_mut(hub_id) {
            match record
                .entities
                .iter_mut()
                .find(|entry| entry.entity_id == entity_id)
            {
                Some(entry) => entry.last_modified = last_modified,
                None => record
                    .entities
                    .push(FingerprintEntry::new(entity_id, last_modified)),
            }
        }
    }

    /// Aggregate view of a hub, only when it belongs to `user_id`
    pub fn snapshot(&self, user_id: &str, hub_id: &str) -> Option<HubSnapshot> {
        let hubs = self.hubs.read().unwrap();
        hubs.get(hub_id)
            .filter(|record| record.owner_id == user_id)
            .map(|record| HubSnapshot {
                hub_id: record.hub_id.clone(),
                name: record.name.clone(),
                entries: record.entities.clone(),
            })
    }
}

impl HubDirectory for HubRegistry {
    fn hub_belongs_to(&self, user_id: &str, hub_id: &str) -> bool {
        let hubs = self.hubs.read().unwrap();
        hubs.get(hub_id)
            .map(|record| record.owner_id == user_id)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with_hub() -> HubRegistry {
        let registry = HubRegistry::new();
        registry.register(HubRecord {
            hub_id: "h1".to_string(),
            owner_id: "u1".to_string(),
            name: "Living Room".to_string(),
            entities: vec![FingerprintEntry::new("device:lamp", Some(10))],
        });
        registry
    }

    #[test]
    fn ownership_is_checked_against_the_record() {
        let registry = registry_with_hub();
        assert!(registry.hub_belongs_to("u1", "h1"));
        assert!(!registry.hub_belongs_to("u2", "h1"));
        assert!(!registry.hub_belongs_to("u1", "missing"));
    }

    #[test]
    fn snapshot_requires_matching_owner() {
        let registry = registry_with_hub();
        assert!(registry.snapshot("u1", "h1").is_some());
        assert!(registry.snapshot("u2", "h1").is_none());
    }

    #[test]
    fn touch_entity_updates_or_inserts_stamps() {
        let registry = registry_with_hub();

        registry.touch_entity("h1", "device:lamp", Some(20));
        let snapshot = registry.snapshot("u1", "h1").unwrap();
        assert_eq!(snapshot.entries[0].last_modified, Some(20));

        registry.touch_entity("h1", "variable:mode", Some(5));
        let snapshot = registry.snapshot("u1", "h1").unwrap();
        assert_eq!(snapshot.entries.len(), 2);
    }
}
