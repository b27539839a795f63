//! Headless session: discover water, wire a molecule, and walk the first
//! objectives over the built-in content.
//!
//! Nothing is written to disk; the session uses an in-memory store.
//!
//! Run with: `cargo run -p reaction-lab --example headless_session`

use reaction_lab::{Lab, LabConfig, LabEvent};
use reaction_lab_core::bond::BondOutcome;
use reaction_lab_core::catalog::Condition;
use reaction_lab_core::id::ElementId;
use reaction_lab_core::workbench::Position;
use reaction_lab_store::MemoryStore;

fn place(lab: &mut Lab<MemoryStore>, ids: &[&str]) {
    for (i, id) in ids.iter().enumerate() {
        let position = Position::new(120.0 + 60.0 * i as f32, 200.0);
        lab.add_element(&ElementId::from(*id), position)
            .expect("base elements start unlocked");
    }
}

fn main() {
    let mut lab = Lab::in_memory(&LabConfig::default()).expect("built-in content is valid");

    println!("Available elements:");
    for element in lab.available_elements() {
        println!("  {:<3} {}", element.symbol, element.name);
    }

    // --- Water ---

    println!("\n=== Synthesis: H + H + O ===\n");
    place(&mut lab, &["H", "H", "O"]);
    let report = lab.attempt_reaction(None).expect("water reacts unconditionally");
    println!("{}  ({})", report.reaction.equation, report.reaction.description);
    if let Some(check) = &report.objective {
        println!("Objective {}: {}", check.objective, check.result.message);
    }
    lab.clear_workbench();

    // --- Condition matters ---

    println!("\n=== Synthesis: C + O ===\n");
    place(&mut lab, &["C", "O"]);
    match lab.attempt_reaction(None) {
        Some(report) => println!("Unexpected: {}", report.reaction.equation),
        None => println!("No reaction without a condition."),
    }
    if let Some(report) = lab.attempt_reaction(Some(Condition::Heat)) {
        println!("With heat: {}", report.reaction.equation);
    }
    lab.clear_workbench();

    // --- Bonds ---

    println!("\n=== Bonding: O=C=O ===\n");
    place(&mut lab, &["O", "C", "O"]);
    let atoms: Vec<_> = lab.workbench().atoms().map(|(id, _)| id).collect();
    for oxygen in [atoms[0], atoms[2]] {
        if let BondOutcome::Created(bond) = lab.propose_bond(oxygen, atoms[1]) {
            let outcome = lab.cycle_bond(bond);
            println!("Bond cycled: {outcome:?}");
        }
    }
    for status in lab.valency_status() {
        println!("  {:<2} {}/{} bonds", status.symbol, status.used, status.max);
    }
    lab.attempt_reaction(None);

    // --- Summary ---

    println!("\n=== Progress ===\n");
    for tier in lab.objective_board() {
        println!("Tier {}: {}/{}", tier.tier, tier.completed, tier.total);
        for objective in tier.objectives.iter().take(3) {
            println!("  [{:?}] {} - {}", objective.status, objective.id, objective.title);
        }
    }
    println!("Completion: {}%", lab.completion_percentage());

    let completed = lab
        .drain_events()
        .into_iter()
        .filter(|e| matches!(e, LabEvent::Objective(_)))
        .count();
    println!("{completed} objective events this session.");
}
