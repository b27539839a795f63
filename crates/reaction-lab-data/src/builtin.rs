//! Built-in content: the embedded element and reaction tables and the
//! generated six-tier objective list.

use crate::loader::{ContentPack, DataLoadError, Format, RawContent, parse_list, resolve_content};
use reaction_lab_core::id::ElementId;
use reaction_lab_objectives::{
    MAX_TIER, OBJECTIVES_PER_TIER, Objective, ObjectiveId, ObjectiveKind, ObjectiveStep,
};
use std::path::PathBuf;

const ELEMENTS_RON: &str = include_str!("../data/elements.ron");
const REACTIONS_RON: &str = include_str!("../data/reactions.ron");

/// Resolve the embedded content: 9 base elements, 19 compounds, 19
/// reactions and [`default_objectives`].
pub fn builtin_content() -> Result<ContentPack, DataLoadError> {
    let elements_origin = PathBuf::from("builtin/elements.ron");
    let reactions_origin = PathBuf::from("builtin/reactions.ron");
    let elements = parse_list(ELEMENTS_RON, Format::Ron, &elements_origin, "elements")?;
    let reactions = parse_list(REACTIONS_RON, Format::Ron, &reactions_origin, "reactions")?;

    resolve_content(RawContent {
        elements,
        elements_origin,
        reactions,
        reactions_origin,
        objectives: None,
    })
}

// ===========================================================================
// Objective generation
// ===========================================================================

/// What a template asks for.
enum Goal {
    /// Produce this compound.
    Make(&'static str),
    /// Reach the listed stages. The last stage is the inputs of a reaction,
    /// so reacting them completes the objective.
    Steps(&'static [(&'static str, &'static [&'static str])]),
}

struct Template {
    title: &'static str,
    description: &'static str,
    goal: Goal,
}

struct TierPlan {
    name: &'static str,
    requires_bonds: bool,
    templates: &'static [Template],
}

const fn make(title: &'static str, description: &'static str, target: &'static str) -> Template {
    Template {
        title,
        description,
        goal: Goal::Make(target),
    }
}

const fn steps(
    title: &'static str,
    description: &'static str,
    stages: &'static [(&'static str, &'static [&'static str])],
) -> Template {
    Template {
        title,
        description,
        goal: Goal::Steps(stages),
    }
}

const TIERS: [TierPlan; MAX_TIER as usize] = [
    TierPlan {
        name: "Basic Synthesis",
        requires_bonds: false,
        templates: &[
            make("First Drop", "Combine hydrogen and oxygen into water.", "H2O"),
            make("Exhale", "Oxidize carbon fully into carbon dioxide.", "CO2"),
            make("Smoulder", "Burn carbon with too little oxygen.", "CO"),
            make("Salt of the Earth", "Fuse sodium and chlorine with a spark.", "NaCl"),
            make("Swamp Gas", "Build the simplest alkane.", "CH4"),
            make("Sharp Scent", "Combine nitrogen and hydrogen into ammonia.", "NH3"),
            make("Torch Fuel", "Heat carbon and hydrogen into acetylene.", "C2H2"),
        ],
    },
    TierPlan {
        name: "Bond Mastery",
        requires_bonds: true,
        templates: &[
            steps(
                "Wire Water",
                "Bond two hydrogens to one oxygen.",
                &[("Connect every H to the O with single bonds", &["H", "O"])],
            ),
            steps(
                "Carbon Skeleton",
                "Surround a carbon with single-bonded hydrogens.",
                &[("Bond hydrogens to carbon", &["C", "H"])],
            ),
            steps(
                "Pyramid",
                "Bond three hydrogens to a nitrogen.",
                &[("Bond hydrogens to nitrogen", &["N", "H"])],
            ),
            steps(
                "Salt Bridge",
                "Link a sodium to a chlorine.",
                &[("Bond sodium to chlorine", &["Na", "Cl"])],
            ),
        ],
    },
    TierPlan {
        name: "Double & Triple Bonds",
        requires_bonds: true,
        templates: &[
            steps(
                "Double Up",
                "Hold two oxygens on a carbon with double bonds.",
                &[("Double-bond oxygen to carbon", &["C", "O"])],
            ),
            steps(
                "Triple Threat",
                "Join two carbons with a triple bond and cap them with hydrogen.",
                &[("Triple-bond carbon to carbon", &["C", "H"])],
            ),
            steps(
                "Inert Pair",
                "Tie two nitrogens together with a triple bond.",
                &[("Triple-bond nitrogen to nitrogen", &["N"])],
            ),
            steps(
                "Oxygen Pair",
                "Bind two oxygens with a double bond.",
                &[("Double-bond oxygen to oxygen", &["O"])],
            ),
        ],
    },
    TierPlan {
        name: "Advanced Structures",
        requires_bonds: true,
        templates: &[
            make("Two Carbons", "Chain two carbons into ethane.", "C2H6"),
            make("Bottled Gas", "Chain three carbons into propane.", "C3H8"),
            make("Lighter Fluid", "Chain four carbons into butane.", "C4H10"),
            make("Fizz", "Dissolve carbon dioxide in water.", "H2CO3"),
            steps(
                "Full Valence",
                "Fill every bond slot around a carbon with oxygen and hydrogen.",
                &[("Bond carbon, oxygen and hydrogen", &["C", "O", "H"])],
            ),
        ],
    },
    TierPlan {
        name: "Multi-Step Synthesis",
        requires_bonds: false,
        templates: &[
            steps(
                "Carbonation",
                "Make water and carbon dioxide, then combine them.",
                &[
                    ("Bring hydrogen and oxygen together", &["H", "O"]),
                    ("Bring carbon and oxygen together", &["C", "O"]),
                    ("Combine water with carbon dioxide", &["H2O", "CO2"]),
                ],
            ),
            steps(
                "Brine Works",
                "Make salt and water, then electrolyze them together.",
                &[
                    ("Bring sodium and chlorine together", &["Na", "Cl"]),
                    ("Bring hydrogen and oxygen together", &["H", "O"]),
                    ("Combine salt with water", &["NaCl", "H2O"]),
                ],
            ),
            steps(
                "Combustion",
                "Build methane, then burn it in oxygen.",
                &[
                    ("Bring carbon and hydrogen together", &["C", "H"]),
                    ("Burn methane in oxygen", &["CH4", "O"]),
                ],
            ),
            make("Pentane", "Chain five carbons under heat.", "C5H12"),
            make("Hexane", "Chain six carbons under heat.", "C6H14"),
        ],
    },
    TierPlan {
        name: "Master Challenges",
        requires_bonds: false,
        templates: &[
            steps(
                "Sea Spray",
                "Produce brine from scratch.",
                &[
                    ("Gather sodium and chlorine", &["Na", "Cl"]),
                    ("Gather hydrogen and oxygen", &["H", "O"]),
                    ("Electrolyze salt with water", &["NaCl", "H2O"]),
                ],
            ),
            steps(
                "Engine Cycle",
                "Build methane and burn it.",
                &[
                    ("Gather carbon and hydrogen", &["C", "H"]),
                    ("Burn methane in oxygen", &["CH4", "O"]),
                ],
            ),
            make("Heptane", "Chain seven carbons under heat.", "C7H16"),
            make("Octane", "Chain eight carbons under heat.", "C8H18"),
            make("Nonane", "Chain nine carbons under heat.", "C9H20"),
            make("Decane", "Chain ten carbons under heat.", "C10H22"),
        ],
    },
];

/// The built-in objective list: [`OBJECTIVES_PER_TIER`] objectives in each
/// of the six tiers.
///
/// Each tier cycles through its templates; repeats carry a round suffix in
/// the title.
pub fn default_objectives() -> Vec<Objective> {
    let mut objectives = Vec::with_capacity(MAX_TIER as usize * OBJECTIVES_PER_TIER as usize);

    for (tier, plan) in (1..=MAX_TIER).zip(TIERS.iter()) {
        let reward = format!("{} points", u32::from(tier) * 10);
        for order in 1..=OBJECTIVES_PER_TIER {
            let index = (order - 1) as usize;
            let template = &plan.templates[index % plan.templates.len()];
            let round = index / plan.templates.len() + 1;
            let title = if round == 1 {
                template.title.to_string()
            } else {
                format!("{} ({round})", template.title)
            };

            let kind = match template.goal {
                Goal::Make(target) => ObjectiveKind::Simple {
                    target_compound: ElementId::from(target),
                },
                Goal::Steps(stages) => ObjectiveKind::Multistep {
                    steps: stages
                        .iter()
                        .zip(1..)
                        .map(|((description, required), step_number)| ObjectiveStep {
                            step_number,
                            description: (*description).to_string(),
                            required_elements: required.iter().map(|s| ElementId::from(*s)).collect(),
                        })
                        .collect(),
                },
            };

            objectives.push(Objective {
                id: ObjectiveId::for_slot(tier, order),
                tier,
                order,
                title,
                description: format!("{}: {}", plan.name, template.description),
                kind,
                requires_bonds: plan.requires_bonds,
                reward: reward.clone(),
            });
        }
    }

    objectives
}
