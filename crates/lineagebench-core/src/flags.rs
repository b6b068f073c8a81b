//! Quality flags for outcomes and groups of outcomes.

use crate::types::{Flag, FlagSet, QueryOutcome};

/// Derives the quality flags of a single outcome.
///
/// The result is never empty: an outcome on which no rule fires gets `{OK}`.
pub fn compute_flags(outcome: &QueryOutcome) -> FlagSet {
    let mut flags = FlagSet::new();
    let has_upstreams = !outcome.upstreams.is_empty();
    let has_downstreams = !outcome.downstreams.is_empty();

    if outcome.rpc_error.is_some() || outcome.parser_error.is_some() {
        flags.insert(Flag::Err);
    }
    if has_upstreams != has_downstreams {
        flags.insert(Flag::Gap);
    }
    if has_upstreams && has_downstreams && !outcome.self_referential {
        flags.insert(Flag::Lin);
    }
    if outcome.self_referential {
        flags.insert(Flag::SelfRef);
    }
    if !outcome.column_edges.is_empty() || outcome.column_lineage_count() > 0 {
        flags.insert(Flag::Col);
    }
    if flags.is_empty() {
        flags.insert(Flag::Ok);
    }
    flags
}

/// Combines the flags of a group of outcomes.
///
/// `OK` survives only when no member carries any other flag; an empty group
/// reports `{OK}`.
pub fn aggregate_flags<'a, I>(flag_sets: I) -> FlagSet
where
    I: IntoIterator<Item = &'a FlagSet>,
{
    let mut union: FlagSet = flag_sets.into_iter().flat_map(FlagSet::iter).collect();
    if union.iter().any(|flag| flag != Flag::Ok) {
        union.remove(Flag::Ok);
    }
    if union.is_empty() {
        union.insert(Flag::Ok);
    }
    union
}

/// [`aggregate_flags`] over the flags of each outcome.
pub fn aggregate_outcome_flags(outcomes: &[QueryOutcome]) -> FlagSet {
    aggregate_flags(outcomes.iter().map(|outcome| &outcome.flags))
}
