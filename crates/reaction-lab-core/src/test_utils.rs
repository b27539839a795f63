//! Shared test helpers for unit tests, integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]`.

use crate::catalog::*;
use crate::id::*;
use std::collections::BTreeMap;

// ===========================================================================
// Id shorthands
// ===========================================================================

pub fn h() -> ElementId {
    ElementId::from("H")
}
pub fn o() -> ElementId {
    ElementId::from("O")
}
pub fn c() -> ElementId {
    ElementId::from("C")
}
pub fn n() -> ElementId {
    ElementId::from("N")
}

// ===========================================================================
// Definition constructors
// ===========================================================================

/// A base element, unlocked from the start. The id doubles as the symbol.
pub fn base_element(id: &str, name: &str, atomic_number: u32) -> ElementDef {
    ElementDef {
        id: ElementId::from(id),
        name: name.to_string(),
        atomic_number,
        symbol: id.to_string(),
        category: "Nonmetal".to_string(),
        state: PhysicalState::Gas,
        color: "#A8A8A8".to_string(),
        description: String::new(),
        default_unlocked: true,
        structure: None,
    }
}

/// A locked compound with no structure.
pub fn compound(id: &str, name: &str) -> ElementDef {
    ElementDef {
        id: ElementId::from(id),
        name: name.to_string(),
        atomic_number: 0,
        symbol: id.to_string(),
        category: "Compound".to_string(),
        state: PhysicalState::Unknown,
        color: "#aaaaaa".to_string(),
        description: String::new(),
        default_unlocked: false,
        structure: None,
    }
}

pub fn reaction(
    id: &str,
    inputs: &[(&str, u32)],
    output: &str,
    condition: Option<Condition>,
) -> ReactionDef {
    let inputs: BTreeMap<ElementId, u32> = inputs
        .iter()
        .map(|(e, n)| (ElementId::from(*e), *n))
        .collect();
    ReactionDef {
        id: ReactionId::from(id),
        inputs,
        output: ElementId::from(output),
        output_count: 1,
        equation: format!("-> {output}"),
        description: String::new(),
        condition,
    }
}

// ===========================================================================
// Catalog fixtures
// ===========================================================================

/// H, O, C plus water, carbon dioxide and (heated) carbon monoxide.
pub fn small_catalog() -> Catalog {
    let mut b = CatalogBuilder::new();
    b.register_element(base_element("H", "Hydrogen", 1)).unwrap();
    b.register_element(base_element("O", "Oxygen", 8)).unwrap();
    b.register_element(base_element("C", "Carbon", 6)).unwrap();
    b.register_element(compound("H2O", "Water")).unwrap();
    b.register_element(compound("CO2", "Carbon Dioxide")).unwrap();
    b.register_element(compound("CO", "Carbon Monoxide")).unwrap();
    b.register_reaction(reaction("rxn_0", &[("H", 2), ("O", 1)], "H2O", None))
        .unwrap();
    b.register_reaction(reaction("rxn_1", &[("C", 1), ("O", 2)], "CO2", None))
        .unwrap();
    b.register_reaction(reaction(
        "rxn_2",
        &[("C", 1), ("O", 1)],
        "CO",
        Some(Condition::Heat),
    ))
    .unwrap();
    b.build().unwrap()
}

/// A catalog of `n` synthetic alkane-style reactions `C:k, H:2k+2` under heat,
/// used by benchmarks.
pub fn alkane_catalog(n: u32) -> Catalog {
    let mut b = CatalogBuilder::new();
    b.register_element(base_element("H", "Hydrogen", 1)).unwrap();
    b.register_element(base_element("C", "Carbon", 6)).unwrap();
    for k in 1..=n {
        let id = format!("C{k}H{}", 2 * k + 2);
        b.register_element(compound(&id, &id)).unwrap();
        b.register_reaction(reaction(
            &format!("rxn_{k}"),
            &[("C", k), ("H", 2 * k + 2)],
            &id,
            Some(Condition::Heat),
        ))
        .unwrap();
    }
    b.build().unwrap()
}
