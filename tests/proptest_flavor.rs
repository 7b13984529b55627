//! Property-based tests for flavor matching
//!
//! Drives the best-match selection with randomized catalogs to check
//! that the returned flavor always satisfies the request and is minimal
//! under the (vcpus, ram) ordering.

use proptest::prelude::*;
use serde_json::{json, Value};

use stratoqa::compute::{best_matching, Flavor};

/// Generate an arbitrary flavor catalog entry
fn arb_flavor_doc() -> impl Strategy<Value = Value> {
    (
        "[a-z][a-z0-9-]{0,16}", // id
        1u64..=64,              // vcpus
        prop_oneof![
            Just(512u64),
            Just(1024),
            Just(2048),
            Just(4096),
            Just(8192),
            Just(16384),
            Just(32768)
        ],
    )
        .prop_map(|(id, vcpus, ram)| {
            json!({
                "id": id,
                "name": format!("m1.{}", id),
                "vcpus": vcpus,
                "ram": ram
            })
        })
}

fn arb_catalog() -> impl Strategy<Value = Vec<Flavor>> {
    prop::collection::vec(arb_flavor_doc(), 0..40)
        .prop_map(|docs| docs.iter().map(Flavor::from).collect())
}

proptest! {
    /// Whatever comes back satisfies both minimums
    #[test]
    fn match_satisfies_the_request(
        catalog in arb_catalog(),
        min_cpu in 1u64..=32,
        min_ram in 256u64..=16384,
    ) {
        if let Some(flavor) = best_matching(&catalog, min_cpu, min_ram) {
            prop_assert!(flavor.vcpus >= min_cpu);
            prop_assert!(flavor.ram_mb >= min_ram);
        }
    }

    /// No qualifying flavor beats the winner on (vcpus, ram)
    #[test]
    fn match_is_minimal(
        catalog in arb_catalog(),
        min_cpu in 1u64..=32,
        min_ram in 256u64..=16384,
    ) {
        if let Some(best) = best_matching(&catalog, min_cpu, min_ram) {
            for flavor in &catalog {
                if flavor.vcpus >= min_cpu && flavor.ram_mb >= min_ram {
                    prop_assert!(
                        (best.vcpus, best.ram_mb) <= (flavor.vcpus, flavor.ram_mb)
                    );
                }
            }
        }
    }

    /// None comes back exactly when nothing qualifies
    #[test]
    fn no_match_means_no_qualifier(
        catalog in arb_catalog(),
        min_cpu in 1u64..=32,
        min_ram in 256u64..=16384,
    ) {
        let qualifies = catalog
            .iter()
            .any(|f| f.vcpus >= min_cpu && f.ram_mb >= min_ram);
        prop_assert_eq!(
            best_matching(&catalog, min_cpu, min_ram).is_some(),
            qualifies
        );
    }
}
