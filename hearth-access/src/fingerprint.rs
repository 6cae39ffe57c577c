//! Change-Fingerprint Cache
//!
//! Collapses a set of `(entity-id, last-modified)` pairs into one opaque
//! ETag so aggregate, expensive-to-render resources can short-circuit
//! unchanged responses. The fold is a CRC32-C checksum, not a
//! cryptographic hash: collisions are accepted for cache freshness.
//!
//! Entries are folded in lexicographic `entity_id` order, so the result is
//! reproducible regardless of input order.

use serde::{Deserialize, Serialize};

/// Stamp contributed when an entity has no recorded modification time
const ABSENT_SENTINEL: i64 = -1;

/// One entity's contribution to the fingerprint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerprintEntry {
    pub entity_id: String,
    pub last_modified: Option<i64>,
}

impl FingerprintEntry {
    pub fn new(entity_id: impl Into<String>, last_modified: Option<i64>) -> Self {
        Self {
            entity_id: entity_id.into(),
            last_modified,
        }
    }
}

/// Outcome of comparing a caller-presented tag against the fresh one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Freshness {
    /// Presented tag matches: respond without a body
    NotModified,
    /// Tag differs or was absent: rebuild and attach the fresh tag
    Modified(String),
}

/// Compute the opaque ETag over `entries`
pub fn fingerprint(entries: &[FingerprintEntry]) -> String {
    let mut sorted: Vec<&FingerprintEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| a.entity_id.as_bytes().cmp(b.entity_id.as_bytes()));

    let mut checksum = 0u32;
    for entry in sorted {
        checksum = crc32c::crc32c_append(checksum, entry.entity_id.as_bytes());
        let stamp = entry.last_modified.unwrap_or(ABSENT_SENTINEL).to_string();
        checksum = crc32c::crc32c_append(checksum, stamp.as_bytes());
    }

    checksum.to_string()
}

/// Compare a caller-presented tag against the freshly computed one
///
/// Returns [`Freshness::NotModified`] only on an exact match; any mismatch
/// or absence forces a full rebuild with the new tag.
pub fn evaluate(presented: Option<&str>, entries: &[FingerprintEntry]) -> Freshness {
    let fresh = fingerprint(entries);
    match presented {
        Some(tag) if tag == fresh => Freshness::NotModified,
        _ => Freshness::Modified(fresh),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, stamp: Option<i64>) -> FingerprintEntry {
        FingerprintEntry::new(id, stamp)
    }

    #[test]
    fn fingerprint_is_order_independent() {
        let forward = fingerprint(&[entry("A", Some(10)), entry("B", Some(20))]);
        let reversed = fingerprint(&[entry("B", Some(20)), entry("A", Some(10))]);
        assert_eq!(forward, reversed);
    }

    #[test]
    fn fingerprint_changes_when_a_stamp_changes() {
        let before = fingerprint(&[entry("A", Some(10)), entry("B", Some(20))]);
        let after = fingerprint(&[entry("A", Some(11)), entry("B", Some(20))]);
        assert_ne!(before, after);
    }

    #[test]
    fn fingerprint_changes_when_an_entry_is_added_or_removed() {
        let base = fingerprint(&[entry("A", Some(10))]);
        let grown = fingerprint(&[entry("A", Some(10)), entry("B", Some(20))]);
        let empty = fingerprint(&[]);
        assert_ne!(base, grown);
        assert_ne!(base, empty);
    }

    #[test]
    fn absent_stamp_uses_the_sentinel() {
        let with_sentinel = fingerprint(&[entry("A", None)]);
        let explicit = fingerprint(&[entry("A", Some(-1))]);
        assert_eq!(with_sentinel, explicit);
    }

    #[test]
    fn fingerprint_is_a_decimal_string() {
        let tag = fingerprint(&[entry("A", Some(10))]);
        assert!(tag.parse::<u32>().is_ok());
    }

    #[test]
    fn matching_tag_is_not_modified() {
        let entries = vec![entry("A", Some(10)), entry("B", Some(20))];
        let tag = fingerprint(&entries);
        assert_eq!(evaluate(Some(&tag), &entries), Freshness::NotModified);
    }

    #[test]
    fn absent_or_stale_tag_forces_rebuild() {
        let entries = vec![entry("A", Some(10)), entry("B", Some(20))];
        let tag = fingerprint(&entries);

        // absent tag: full rebuild, same tag since nothing changed
        assert_eq!(evaluate(None, &entries), Freshness::Modified(tag.clone()));

        // stale tag: full rebuild with the fresh tag
        assert_eq!(
            evaluate(Some("0"), &entries),
            Freshness::Modified(tag.clone())
        );

        // changed entries: fresh tag differs from the old one
        let changed = vec![entry("A", Some(11)), entry("B", Some(20))];
        match evaluate(Some(&tag), &changed) {
            Freshness::Modified(fresh) => assert_ne!(fresh, tag),
            Freshness::NotModified => panic!("changed entries must force a rebuild"),
        }
    }
}
