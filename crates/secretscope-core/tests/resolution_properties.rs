//! Property tests for precedence resolution

use std::collections::HashSet;

use proptest::prelude::*;
use secretscope_core::{resolve, OrgId, RepoId, ScopeTier, Secret};

const NAMES: [&str; 5] = ["token", "api_key", "cache", "deploy", "npm"];

fn candidate() -> impl Strategy<Value = Secret> {
    (0usize..3, 0usize..NAMES.len(), 0u32..100).prop_map(|(tier, name, value)| {
        let name = NAMES[name];
        let value = format!("v{}", value);
        match tier {
            0 => Secret::repository(RepoId(1), name, value),
            1 => Secret::organization(OrgId(10), name, value),
            _ => Secret::global(name, value),
        }
    })
}

/// Highest-precedence tier declaring `name`
fn best_tier(input: &[Secret], name: &str) -> Option<ScopeTier> {
    input.iter().filter(|s| s.name == name).map(Secret::tier).min()
}

proptest! {
    #[test]
    fn proptest_resolve_is_deterministic(input in prop::collection::vec(candidate(), 0..20)) {
        prop_assert_eq!(resolve(input.clone()), resolve(input));
    }

    #[test]
    fn proptest_names_are_unique(input in prop::collection::vec(candidate(), 0..20)) {
        let output = resolve(input);
        let names: HashSet<_> = output.iter().map(|s| s.name.clone()).collect();
        prop_assert_eq!(names.len(), output.len());
    }

    #[test]
    fn proptest_every_name_survives(input in prop::collection::vec(candidate(), 0..20)) {
        let expected: HashSet<_> = input.iter().map(|s| s.name.clone()).collect();
        let actual: HashSet<_> = resolve(input).into_iter().map(|s| s.name).collect();
        prop_assert_eq!(expected, actual);
    }

    #[test]
    fn proptest_highest_tier_wins(input in prop::collection::vec(candidate(), 0..20)) {
        for secret in resolve(input.clone()) {
            prop_assert_eq!(Some(secret.tier()), best_tier(&input, &secret.name));
            // the winner is one of the supplied records, untouched
            prop_assert!(input.contains(&secret));
        }
    }

    #[test]
    fn proptest_output_is_tier_major(input in prop::collection::vec(candidate(), 0..20)) {
        let tiers: Vec<_> = resolve(input).iter().map(Secret::tier).collect();
        prop_assert!(tiers.windows(2).all(|w| w[0] <= w[1]));
    }
}
