//! Exact-match reaction lookup.
//!
//! A reaction fires only when the workbench holds exactly its input multiset
//! under exactly its condition. Lookups go through a canonical string key:
//! the condition name (or `none`), `::`, then the lexicographically sorted
//! `id:count` pairs joined by `|`. For example water is `none::H:2|O:1`.

use crate::catalog::{Catalog, Condition, ReactionDef};
use crate::id::ElementId;
use crate::unlock::UnlockSet;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Key segment used when no condition is applied.
pub const NO_CONDITION: &str = "none";

// ---------------------------------------------------------------------------
// ElementCounts
// ---------------------------------------------------------------------------

/// A multiset of element ids. Iteration order is lexicographic by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementCounts(BTreeMap<ElementId, u32>);

impl ElementCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one occurrence of `id`.
    pub fn add(&mut self, id: ElementId) {
        *self.0.entry(id).or_insert(0) += 1;
    }

    pub fn get(&self, id: &ElementId) -> u32 {
        self.0.get(id).copied().unwrap_or(0)
    }

    /// Total number of occurrences.
    pub fn total(&self) -> u32 {
        self.0.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ElementId, u32)> {
        self.0.iter().map(|(id, n)| (id, *n))
    }

    pub fn as_map(&self) -> &BTreeMap<ElementId, u32> {
        &self.0
    }
}

impl FromIterator<ElementId> for ElementCounts {
    fn from_iter<I: IntoIterator<Item = ElementId>>(iter: I) -> Self {
        let mut counts = Self::new();
        for id in iter {
            counts.add(id);
        }
        counts
    }
}

impl From<BTreeMap<ElementId, u32>> for ElementCounts {
    fn from(mut map: BTreeMap<ElementId, u32>) -> Self {
        map.retain(|_, n| *n > 0);
        Self(map)
    }
}

// ---------------------------------------------------------------------------
// ReactionKey
// ---------------------------------------------------------------------------

/// Canonical lookup key for a (multiset, condition) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReactionKey(String);

impl ReactionKey {
    /// Build a key from a count map. Zero counts are skipped so that a map
    /// with an explicit `X: 0` keys the same as one without `X`.
    pub fn new(inputs: &BTreeMap<ElementId, u32>, condition: Option<Condition>) -> Self {
        let signature = inputs
            .iter()
            .filter(|(_, n)| **n > 0)
            .map(|(id, n)| format!("{id}:{n}"))
            .collect::<Vec<_>>()
            .join("|");
        let prefix = condition.map_or(NO_CONDITION, Condition::name);
        Self(format!("{prefix}::{signature}"))
    }

    pub fn from_counts(counts: &ElementCounts, condition: Option<Condition>) -> Self {
        Self::new(counts.as_map(), condition)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReactionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// ReactionMatcher
// ---------------------------------------------------------------------------

/// Result of a successful [`ReactionMatcher::react`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionOutcome {
    pub reaction: ReactionDef,
    /// False when the output was already unlocked. The reaction still counts.
    pub newly_unlocked: bool,
}

/// Precomputed key -> reaction table built once from a catalog.
#[derive(Debug, Clone)]
pub struct ReactionMatcher {
    reactions: Vec<ReactionDef>,
    lookup: HashMap<ReactionKey, usize>,
}

impl ReactionMatcher {
    /// Index every reaction in the catalog. The catalog guarantees keys are
    /// unique.
    pub fn new(catalog: &Catalog) -> Self {
        let reactions = catalog.reactions().to_vec();
        let lookup = reactions
            .iter()
            .enumerate()
            .map(|(i, r)| (r.key(), i))
            .collect();
        Self { reactions, lookup }
    }

    /// Find the reaction for exactly this multiset under exactly this
    /// condition. No side effects.
    pub fn find(&self, counts: &ElementCounts, condition: Option<Condition>) -> Option<&ReactionDef> {
        if counts.is_empty() {
            return None;
        }
        let key = ReactionKey::from_counts(counts, condition);
        self.lookup.get(&key).map(|&i| &self.reactions[i])
    }

    /// Find a reaction and, on a match, unlock its output.
    ///
    /// Re-synthesizing a known compound still returns an outcome, with
    /// `newly_unlocked` false. On a miss the unlock set is untouched.
    pub fn react(
        &self,
        counts: &ElementCounts,
        condition: Option<Condition>,
        unlocks: &mut UnlockSet,
    ) -> Option<ReactionOutcome> {
        let Some(reaction) = self.find(counts, condition) else {
            tracing::debug!(
                target: "lab.reaction",
                key = %ReactionKey::from_counts(counts, condition),
                "no reaction matched"
            );
            return None;
        };

        let newly_unlocked = unlocks.unlock(reaction.output.clone());
        tracing::info!(
            target: "lab.reaction",
            reaction = %reaction.id,
            output = %reaction.output,
            newly_unlocked,
            "reaction matched"
        );

        Some(ReactionOutcome {
            reaction: reaction.clone(),
            newly_unlocked,
        })
    }

    pub fn len(&self) -> usize {
        self.reactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reactions.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
