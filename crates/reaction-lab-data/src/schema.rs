//! Serde data file structs for sandbox content.
//!
//! These structs define the on-disk format for elements, reactions and
//! objectives. They are deserialized from RON, JSON, or TOML data files and
//! then resolved into engine types by the loader. Cross-references are by id
//! string.

use reaction_lab_core::bond::BondOrder;
use reaction_lab_core::catalog::{Condition, PhysicalState};
use serde::Deserialize;
use std::collections::BTreeMap;

fn default_true() -> bool {
    true
}

fn default_one() -> u32 {
    1
}

fn default_state() -> PhysicalState {
    PhysicalState::Unknown
}

fn default_category() -> String {
    "Compound".to_string()
}

fn default_color() -> String {
    "#aaaaaa".to_string()
}

// ===========================================================================
// Elements
// ===========================================================================

/// An element or compound definition in a data file.
#[derive(Debug, Clone, Deserialize)]
pub struct ElementData {
    pub id: String,
    pub name: String,
    /// Omitted (zero) for compounds.
    #[serde(default)]
    pub atomic_number: u32,
    /// Display symbol. Empty means "same as id".
    #[serde(default)]
    pub symbol: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default = "default_state")]
    pub state: PhysicalState,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default)]
    pub description: String,
    /// Available before any reaction.
    #[serde(default)]
    pub unlocked: bool,
    #[serde(default)]
    pub structure: Option<StructureData>,
}

/// Display structure of a compound.
#[derive(Debug, Clone, Deserialize)]
pub struct StructureData {
    pub atoms: Vec<AtomData>,
    #[serde(default = "default_true")]
    pub show_hydrogens: bool,
}

/// One atom of a display structure.
#[derive(Debug, Clone, Deserialize)]
pub struct AtomData {
    pub element: String,
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub bonds: Vec<StructureBondData>,
}

/// A drawn bond. `to` indexes the owning structure's atom list.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct StructureBondData {
    pub to: usize,
    pub order: BondOrder,
}

// ===========================================================================
// Reactions
// ===========================================================================

/// A reaction definition in a data file.
#[derive(Debug, Clone, Deserialize)]
pub struct ReactionData {
    pub id: String,
    /// Input id -> count.
    pub inputs: BTreeMap<String, u32>,
    pub output: String,
    #[serde(default = "default_one")]
    pub output_count: u32,
    #[serde(default)]
    pub equation: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub condition: Option<Condition>,
}

// ===========================================================================
// Objectives
// ===========================================================================

/// An objective definition in a data file.
///
/// Exactly one of `target_compound` (a simple objective) or a non-empty
/// `steps` list (a multistep objective) must be given.
#[derive(Debug, Clone, Deserialize)]
pub struct ObjectiveData {
    /// Defaults to `t{tier}_obj{order}`.
    #[serde(default)]
    pub id: Option<String>,
    pub tier: u8,
    pub order: u32,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub target_compound: Option<String>,
    #[serde(default)]
    pub steps: Vec<StepData>,
    #[serde(default)]
    pub requires_bonds: bool,
    #[serde(default)]
    pub reward: String,
}

/// One step of a multistep objective. `step_number` defaults to the
/// step's 1-based position.
#[derive(Debug, Clone, Deserialize)]
pub struct StepData {
    #[serde(default)]
    pub step_number: Option<u32>,
    #[serde(default)]
    pub description: String,
    pub required_elements: Vec<String>,
}

// ===========================================================================
// Tests
// ===========================================================================
