//! Fixed exceptions to the generic schema layout.
//!
//! Some members need a wider schema type than their model type suggests, and
//! some types are never exposed as collections. Both tables are built once on
//! first use and shared by every generator.

use ironmodel_core::Name;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

/// Schema type overrides keyed by `(type name, member name)`.
pub type MemberTypeOverrides = BTreeMap<(Name, Name), String>;

const MEMBER_TYPES: &[(&str, &str, &str)] = &[
    ("disk", "actual-size", "xs:long"),
    ("disk", "initial-size", "xs:long"),
    ("disk", "provisioned-size", "xs:long"),
    ("gluster-client", "bytes-read", "xs:long"),
    ("gluster-client", "bytes-written", "xs:long"),
    ("host", "max-scheduling-memory", "xs:long"),
    ("host", "memory", "xs:long"),
    ("host-nic", "speed", "xs:long"),
    ("logical-unit", "discard-max-size", "xs:long"),
    ("logical-unit", "size", "xs:long"),
    ("memory-policy", "guaranteed", "xs:long"),
    ("memory-policy", "max", "xs:long"),
    ("numa-node", "memory", "xs:long"),
    ("quota-cluster-limit", "memory-limit", "xs:double"),
    ("quota-cluster-limit", "memory-usage", "xs:double"),
    ("quota-storage-limit", "limit", "xs:long"),
    ("quota-storage-limit", "usage", "xs:double"),
    ("statistic", "kind", "StatisticKind"),
    ("statistic", "type", "ValueType"),
    ("statistic", "unit", "StatisticUnit"),
    ("storage-domain", "available", "xs:long"),
    ("storage-domain", "committed", "xs:long"),
    ("storage-domain", "used", "xs:long"),
    ("ticket", "expiry", "xs:unsignedInt"),
    ("vm-base", "memory", "xs:long"),
];

const TYPES_WITHOUT_COLLECTION: &[&str] = &["Action"];

static DEFAULT_MEMBER_TYPES: LazyLock<MemberTypeOverrides> = LazyLock::new(|| {
    MEMBER_TYPES
        .iter()
        .map(|&(owner, member, schema_type)| {
            (
                (
                    Name::from_separator(owner, '-'),
                    Name::from_separator(member, '-'),
                ),
                schema_type.to_string(),
            )
        })
        .collect()
});

static DEFAULT_WITHOUT_COLLECTION: LazyLock<BTreeSet<Name>> = LazyLock::new(|| {
    TYPES_WITHOUT_COLLECTION
        .iter()
        .map(|name| Name::from_case(name))
        .collect()
});

/// Returns the built-in member type overrides.
#[must_use]
pub fn default_member_types() -> &'static MemberTypeOverrides {
    &DEFAULT_MEMBER_TYPES
}

/// Returns the built-in set of types that don't get a collection element.
#[must_use]
pub fn default_without_collection() -> &'static BTreeSet<Name> {
    &DEFAULT_WITHOUT_COLLECTION
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(owner: &str, member: &str) -> (Name, Name) {
        (Name::from_case(owner), Name::from_case(member))
    }

    #[test]
    fn test_member_type_lookup() {
        let table = default_member_types();
        assert_eq!(table.len(), MEMBER_TYPES.len());
        assert_eq!(
            table.get(&key("Disk", "provisionedSize")).map(String::as_str),
            Some("xs:long")
        );
        assert_eq!(
            table.get(&key("QuotaClusterLimit", "memoryUsage")).map(String::as_str),
            Some("xs:double")
        );
        assert_eq!(
            table.get(&key("Ticket", "expiry")).map(String::as_str),
            Some("xs:unsignedInt")
        );
        assert!(table.get(&key("Vm", "memory")).is_none());
    }

    #[test]
    fn test_action_has_no_collection() {
        assert!(default_without_collection().contains(&Name::from_case("Action")));
        assert!(!default_without_collection().contains(&Name::from_case("Vm")));
    }
}
