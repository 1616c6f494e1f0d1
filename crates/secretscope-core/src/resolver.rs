//! Precedence resolution of multi-scope candidate sets

use std::collections::HashSet;

use crate::model::{ScopeTier, Secret};

/// Reduce a candidate set to the effective secrets of a build.
///
/// Keeps one secret per name, taken from the highest-precedence tier
/// (`Repository > Organization > Global`) that declares it. Output is
/// tier-major and otherwise keeps the order the candidates were supplied in.
/// When one tier holds the same name twice the first occurrence wins.
pub fn resolve(candidates: Vec<Secret>) -> Vec<Secret> {
    let keep = winners(&candidates);
    let mut slots: Vec<Option<Secret>> = candidates.into_iter().map(Some).collect();
    keep.into_iter()
        .filter_map(|idx| slots[idx].take())
        .collect()
}

/// Borrowing variant of [`resolve`]
pub fn resolve_refs(candidates: &[Secret]) -> Vec<&Secret> {
    winners(candidates)
        .into_iter()
        .map(|idx| &candidates[idx])
        .collect()
}

/// Indices of the retained candidates, in output order
fn winners(candidates: &[Secret]) -> Vec<usize> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(candidates.len());
    let mut keep = Vec::with_capacity(candidates.len());

    for tier in ScopeTier::PRECEDENCE {
        for (idx, secret) in candidates.iter().enumerate() {
            if secret.tier() != tier {
                continue;
            }
            if !seen.insert(secret.name.as_str()) {
                tracing::debug!(
                    name = %secret.name,
                    scope = %secret.scope(),
                    "Dropping shadowed secret"
                );
                continue;
            }
            keep.push(idx);
        }
    }

    keep
}
