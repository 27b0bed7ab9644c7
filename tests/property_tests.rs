//! Property-based tests for the routing-key and ordering-key algebra.

use proptest::prelude::*;

use relay::handler::identity::{PartitionIdentity, resolve_routing_key};
use relay::handler::stream::{StreamSequencer, ordering_key};

/// Identifier strategy: non-empty, printable, never containing the reserved
/// separator.
fn identifier() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_.:/-]{1,32}"
}

proptest! {
    #[test]
    fn prop_platform_only_key_is_identity(platform in identifier()) {
        prop_assert_eq!(resolve_routing_key(&platform, None), platform.clone());
        prop_assert_eq!(resolve_routing_key(&platform, Some("")), platform);
    }

    #[test]
    fn prop_composite_key_splits_back(platform in identifier(), partition in identifier()) {
        let key = resolve_routing_key(&platform, Some(&partition));
        let (left, right) = key.split_once('#').expect("composite key has separator");
        prop_assert_eq!(left, platform);
        prop_assert_eq!(right, partition);
    }

    #[test]
    fn prop_composite_keys_are_injective(
        a_platform in identifier(),
        a_partition in identifier(),
        b_platform in identifier(),
        b_partition in identifier(),
    ) {
        let a = resolve_routing_key(&a_platform, Some(&a_partition));
        let b = resolve_routing_key(&b_platform, Some(&b_partition));
        if (a_platform.clone(), a_partition.clone()) != (b_platform.clone(), b_partition.clone()) {
            prop_assert_ne!(a, b);
        } else {
            prop_assert_eq!(a, b);
        }
    }

    #[test]
    fn prop_routing_key_is_stable(platform in identifier(), partition in proptest::option::of(identifier())) {
        let identity = PartitionIdentity::new(Some(platform), partition)
            .expect("separator-free identifiers are always valid");
        prop_assert_eq!(identity.routing_key(), identity.routing_key());
    }

    #[test]
    fn prop_separator_in_identifier_always_rejected(
        prefix in "[a-z]{0,8}",
        suffix in "[a-z]{0,8}",
    ) {
        let tainted = format!("{prefix}#{suffix}");
        prop_assert!(PartitionIdentity::new(Some(tainted), None).is_err());
    }

    #[test]
    fn prop_partition_without_platform_always_rejected(partition in identifier()) {
        prop_assert!(PartitionIdentity::new(None, Some(partition.clone())).is_err());
        prop_assert!(PartitionIdentity::new(Some(String::new()), Some(partition)).is_err());
    }

    #[test]
    fn prop_ordering_key_suffix_extends_base(
        connection in identifier(),
        run in identifier(),
        suffix in identifier(),
    ) {
        let base = ordering_key(&connection, &run, None);
        let extended = ordering_key(&connection, &run, Some(&suffix));
        prop_assert_eq!(&base, &format!("{connection}-{run}"));
        prop_assert_eq!(extended, format!("{base}-{suffix}"));
    }

    #[test]
    fn prop_sequencer_indices_are_dense_from_zero(
        connection in identifier(),
        run in identifier(),
        count in 1usize..64,
    ) {
        let mut seq = StreamSequencer::new(&connection, &run);
        for expected in 0..count as u64 {
            prop_assert_eq!(seq.next_index(), expected);
        }
    }
}
