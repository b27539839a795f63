//! Integration test: end-to-end play over the built-in content.
//!
//! Drives a [`Lab`] session through reactions, bond editing and objective
//! progression, checking that the matcher, unlock set, workbench and
//! objective tree stay consistent with each other.

use reaction_lab::{Lab, LabConfig, LabError, LabEvent};
use reaction_lab_core::bond::{BondOrder, BondOutcome, BondRejection};
use reaction_lab_core::catalog::Condition;
use reaction_lab_core::id::{AtomId, ElementId};
use reaction_lab_core::workbench::Position;
use reaction_lab_data::{ContentPack, builtin_content};
use reaction_lab_objectives::test_utils::simple;
use reaction_lab_objectives::{MAX_TIER, ObjectiveEvent, ObjectiveId};
use reaction_lab_store::{KeyValueStore, MemoryStore, UNLOCKED_KEY};

fn builtin_lab() -> Lab<MemoryStore> {
    Lab::in_memory(&LabConfig::default()).unwrap()
}

fn place(lab: &mut Lab<MemoryStore>, ids: &[&str]) -> Vec<AtomId> {
    ids.iter()
        .enumerate()
        .map(|(i, id)| {
            lab.add_element(
                &ElementId::from(*id),
                Position::new(60.0 + 30.0 * i as f32, 200.0),
            )
            .unwrap()
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Reactions
// ---------------------------------------------------------------------------

/// A session where every catalog entry, compounds included, is already
/// discovered.
fn fully_unlocked_lab() -> Lab<MemoryStore> {
    let content = builtin_content().unwrap();
    let ids: Vec<&str> = content
        .catalog
        .elements()
        .iter()
        .map(|e| e.id.as_str())
        .collect();
    let mut store = MemoryStore::new();
    store
        .set(UNLOCKED_KEY, serde_json::to_string(&ids).unwrap())
        .unwrap();
    Lab::with_store(content, store, &LabConfig::default()).unwrap()
}

#[test]
fn every_builtin_reaction_fires_only_under_its_condition() {
    let content = builtin_content().unwrap();
    let reactions = content.catalog.reactions().to_vec();
    let compound_inputs = reactions
        .iter()
        .filter(|r| {
            r.inputs
                .keys()
                .any(|id| content.catalog.element(id).is_some_and(|e| e.is_compound()))
        })
        .count();
    assert_eq!(compound_inputs, 3);

    for reaction in reactions {
        let mut lab = fully_unlocked_lab();
        for (id, count) in &reaction.inputs {
            for _ in 0..*count {
                lab.add_element(id, Position::default()).unwrap();
            }
        }

        let report = lab.attempt_reaction(reaction.condition).unwrap();
        assert_eq!(report.reaction.id, reaction.id);
        assert!(lab.unlocks().is_unlocked(&reaction.output));

        for other in Condition::ALL.into_iter().map(Some).chain([None]) {
            if other != reaction.condition {
                assert!(
                    lab.attempt_reaction(other).is_none(),
                    "{} also fired under {other:?}",
                    reaction.id
                );
            }
        }
    }
}

#[test]
fn water_discovery() {
    let mut lab = builtin_lab();
    place(&mut lab, &["O", "H", "H"]);

    let report = lab.attempt_reaction(None).unwrap();
    assert_eq!(report.reaction.id.as_str(), "rxn_0");
    assert_eq!(report.reaction.output.as_str(), "H2O");
    assert!(report.newly_unlocked);
    assert!(report.objective.unwrap().completed_now);
    assert!(lab.unlocks().is_unlocked(&ElementId::from("H2O")));
}

#[test]
fn heat_decides_carbon_monoxide() {
    let mut lab = builtin_lab();
    place(&mut lab, &["C", "O"]);

    assert!(lab.attempt_reaction(None).is_none());
    assert!(lab.attempt_reaction(Some(Condition::Electricity)).is_none());
    let report = lab.attempt_reaction(Some(Condition::Heat)).unwrap();
    assert_eq!(report.reaction.output.as_str(), "CO");
}

#[test]
fn compounds_become_placeable_after_discovery() {
    let mut lab = builtin_lab();
    let water = ElementId::from("H2O");
    let co2 = ElementId::from("CO2");
    assert!(matches!(
        lab.add_element(&water, Position::default()),
        Err(LabError::Locked(_))
    ));

    place(&mut lab, &["H", "H", "O"]);
    lab.attempt_reaction(None).unwrap();
    lab.clear_workbench();
    place(&mut lab, &["C", "O", "O"]);
    lab.attempt_reaction(None).unwrap();
    lab.clear_workbench();

    lab.add_element(&water, Position::default()).unwrap();
    lab.add_element(&co2, Position::default()).unwrap();
    let report = lab.attempt_reaction(None).unwrap();
    assert_eq!(report.reaction.output.as_str(), "H2CO3");
}

// ---------------------------------------------------------------------------
// Bonds
// ---------------------------------------------------------------------------

#[test]
fn hydrogen_bond_stays_single() {
    let mut lab = builtin_lab();
    let atoms = place(&mut lab, &["H", "H"]);
    let BondOutcome::Created(bond) = lab.propose_bond(atoms[0], atoms[1]) else {
        panic!("expected a new bond");
    };
    assert_eq!(
        lab.cycle_bond(bond),
        BondOutcome::Rejected(BondRejection::Valency)
    );
    assert_eq!(
        lab.workbench().graph().bond(bond).unwrap().order,
        BondOrder::Single
    );
}

#[test]
fn carbon_dioxide_skeleton_saturates() {
    let mut lab = builtin_lab();
    let atoms = place(&mut lab, &["O", "C", "O"]);
    for oxygen in [atoms[0], atoms[2]] {
        let BondOutcome::Created(bond) = lab.propose_bond(oxygen, atoms[1]) else {
            panic!("expected a new bond");
        };
        assert!(matches!(
            lab.cycle_bond(bond),
            BondOutcome::Cycled { to: BondOrder::Double, .. }
        ));
    }
    assert!(lab.workbench().has_required_bonds());
    assert!(lab.valency_status().iter().all(|s| s.is_saturated()));

    // A third oxygen has nowhere to attach.
    let extra = place(&mut lab, &["O"])[0];
    assert_eq!(
        lab.propose_bond(extra, atoms[1]),
        BondOutcome::Rejected(BondRejection::Valency)
    );
}

#[test]
fn removing_middle_atom_keeps_identity_of_the_rest() {
    let mut lab = builtin_lab();
    let atoms = place(&mut lab, &["H", "C", "H", "H", "H"]);
    let mut bonds = Vec::new();
    for &hydrogen in &[atoms[0], atoms[2], atoms[3], atoms[4]] {
        let BondOutcome::Created(bond) = lab.propose_bond(hydrogen, atoms[1]) else {
            panic!("expected a new bond");
        };
        bonds.push(bond);
    }

    lab.remove_atom(atoms[2]).unwrap();
    assert_eq!(lab.workbench().bonds().count(), 3);
    for (bond, hydrogen) in [(bonds[0], atoms[0]), (bonds[2], atoms[3]), (bonds[3], atoms[4])] {
        let kept = lab.workbench().graph().bond(bond).unwrap();
        assert!(kept.connects(hydrogen, atoms[1]));
    }
    assert!(lab.workbench().graph().bond(bonds[1]).is_none());
    assert_eq!(lab.workbench().remaining_capacity(atoms[1]), Some(1));
}

// ---------------------------------------------------------------------------
// Objectives
// ---------------------------------------------------------------------------

#[test]
fn first_objectives_follow_the_reaction_chain() {
    let mut lab = builtin_lab();
    let plan: [(&[&str], Option<Condition>); 3] = [
        (&["H", "H", "O"], None),
        (&["C", "O", "O"], None),
        (&["C", "O"], Some(Condition::Heat)),
    ];

    for (step, (ids, condition)) in plan.into_iter().enumerate() {
        lab.clear_workbench();
        place(&mut lab, ids);
        let report = lab.attempt_reaction(condition).unwrap();
        let check = report.objective.unwrap();
        assert_eq!(check.objective, ObjectiveId::for_slot(1, step as u32 + 1));
        assert!(check.completed_now, "{}: {}", check.objective, check.result.message);
    }

    assert_eq!(lab.objectives().progress().tier(1).completed, 3);
    assert_eq!(
        lab.objectives().current_objective().unwrap().id,
        ObjectiveId::for_slot(1, 4)
    );
}

#[test]
fn tiers_advance_on_clearing_and_stop_at_six() {
    // One simple objective per tier, all satisfied by water.
    let content = builtin_content().unwrap();
    let pack = ContentPack {
        catalog: content.catalog,
        objectives: (1..=MAX_TIER).map(|t| simple(t, 1, "H2O")).collect(),
    };
    let config = LabConfig {
        objectives_per_tier: 1,
        ..LabConfig::default()
    };
    let mut lab = Lab::with_store(pack, MemoryStore::new(), &config).unwrap();
    place(&mut lab, &["H", "H", "O"]);

    for tier in 1..=MAX_TIER {
        assert_eq!(lab.objectives().current_tier(), tier);
        let report = lab.attempt_reaction(None).unwrap();
        assert!(report.objective.unwrap().completed_now);
    }
    assert_eq!(lab.objectives().current_tier(), MAX_TIER);
    assert_eq!(lab.completion_percentage(), 100);

    let advances: Vec<(u8, u8)> = lab
        .drain_events()
        .into_iter()
        .filter_map(|e| match e {
            LabEvent::Objective(ObjectiveEvent::TierAdvanced { from, to }) => Some((from, to)),
            _ => None,
        })
        .collect();
    assert_eq!(advances, vec![(1, 2), (2, 3), (3, 4), (4, 5), (5, 6)]);
}

#[test]
fn reset_returns_to_catalog_defaults() {
    let mut lab = builtin_lab();
    place(&mut lab, &["H", "H", "O"]);
    lab.attempt_reaction(None).unwrap();
    assert_eq!(lab.available_elements().len(), 10);

    lab.reset_all();
    assert_eq!(lab.available_elements().len(), 9);
    assert_eq!(lab.objectives().progress().completed_objective_ids.len(), 0);
    assert_eq!(lab.objectives().current_objective().unwrap().id.as_str(), "t1_obj1");
    assert!(lab.workbench().is_empty());
    assert_eq!(lab.completion_percentage(), 0);
}
