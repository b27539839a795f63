//! Objective fixtures for tests in this crate and downstream crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]`.

use crate::*;

pub fn simple(tier: u8, order: u32, target: &str) -> Objective {
    Objective {
        id: ObjectiveId::for_slot(tier, order),
        tier,
        order,
        title: format!("Make {target}"),
        description: format!("Synthesize {target}."),
        kind: ObjectiveKind::Simple {
            target_compound: ElementId::from(target),
        },
        requires_bonds: false,
        reward: String::new(),
    }
}

pub fn multistep(tier: u8, order: u32, steps: &[&[&str]]) -> Objective {
    let steps = steps
        .iter()
        .enumerate()
        .map(|(i, ids)| ObjectiveStep {
            step_number: i as u32 + 1,
            description: format!("Gather {}", ids.join(", ")),
            required_elements: ids.iter().map(|s| ElementId::from(*s)).collect(),
        })
        .collect();
    Objective {
        id: ObjectiveId::for_slot(tier, order),
        tier,
        order,
        title: format!("Chain {tier}.{order}"),
        description: String::new(),
        kind: ObjectiveKind::Multistep { steps },
        requires_bonds: false,
        reward: String::new(),
    }
}

/// Six full tiers of simple "make water" objectives, `per_tier` each.
pub fn full_tiers(per_tier: u32) -> Vec<Objective> {
    (1..=MAX_TIER)
        .flat_map(|t| (1..=per_tier).map(move |o| simple(t, o, "H2O")))
        .collect()
}

/// A tree over [`full_tiers`] with the given tier size.
pub fn full_tree(per_tier: u32) -> ObjectiveTree {
    ObjectiveTree::new(full_tiers(per_tier), per_tier).unwrap()
}

/// Complete every objective of `tier` in order.
pub fn clear_tier(tree: &mut ObjectiveTree, tier: u8) {
    for order in 1..=tree.per_tier() {
        tree.complete_objective(&ObjectiveId::for_slot(tier, order));
    }
}
