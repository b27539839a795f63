//! Immutable content tables: elements, compounds and reactions.
//!
//! Content is registered through [`CatalogBuilder`] and frozen with
//! [`CatalogBuilder::build`], which validates every cross-reference and the
//! uniqueness of reaction keys. The resulting [`Catalog`] never changes for
//! the lifetime of a session; which entries the player may use is tracked
//! separately in [`crate::unlock::UnlockSet`].

use crate::bond::BondOrder;
use crate::id::{ElementId, ReactionId};
use crate::matcher::ReactionKey;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur while building a catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("duplicate element id: {0}")]
    DuplicateElement(ElementId),
    #[error("duplicate reaction id: {0}")]
    DuplicateReaction(ReactionId),
    #[error("reaction {0} has no inputs")]
    EmptyInputs(ReactionId),
    #[error("reaction {reaction} requires zero of {element}")]
    ZeroCount {
        reaction: ReactionId,
        element: ElementId,
    },
    #[error("reaction {reaction} consumes unknown element {element}")]
    UnknownInput {
        reaction: ReactionId,
        element: ElementId,
    },
    #[error("reaction {reaction} produces unknown element {element}")]
    UnknownOutput {
        reaction: ReactionId,
        element: ElementId,
    },
    #[error("reactions {first} and {second} share the key {key}")]
    DuplicateKey {
        first: ReactionId,
        second: ReactionId,
        key: String,
    },
}

// ---------------------------------------------------------------------------
// Element definitions
// ---------------------------------------------------------------------------

/// Physical state shown on an element card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhysicalState {
    Solid,
    Liquid,
    Gas,
    Unknown,
    Compound,
}

/// One atom of a compound's display structure. Coordinates are relative
/// units; `bonds[i].to` indexes into the owning structure's atom list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureAtom {
    pub element: String,
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub bonds: Vec<StructureBond>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureBond {
    pub to: usize,
    pub order: BondOrder,
}

/// Rendering-only molecular structure of a compound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MolecularStructure {
    pub atoms: Vec<StructureAtom>,
    #[serde(default = "default_true")]
    pub show_hydrogens: bool,
}

fn default_true() -> bool {
    true
}

/// An element or compound definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementDef {
    pub id: ElementId,
    pub name: String,
    /// Zero for compounds.
    pub atomic_number: u32,
    pub symbol: String,
    pub category: String,
    pub state: PhysicalState,
    pub color: String,
    pub description: String,
    /// Whether the entry is available before any reaction has been run.
    pub default_unlocked: bool,
    pub structure: Option<MolecularStructure>,
}

impl ElementDef {
    /// Compounds carry atomic number zero.
    pub fn is_compound(&self) -> bool {
        self.atomic_number == 0
    }
}

// ---------------------------------------------------------------------------
// Reaction definitions
// ---------------------------------------------------------------------------

/// An environmental condition a reaction may require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Condition {
    Heat,
    Electricity,
    #[serde(rename = "UV")]
    Uv,
}

impl Condition {
    pub const ALL: [Condition; 3] = [Condition::Heat, Condition::Electricity, Condition::Uv];

    /// Name used in reaction keys and data files.
    pub fn name(self) -> &'static str {
        match self {
            Condition::Heat => "Heat",
            Condition::Electricity => "Electricity",
            Condition::Uv => "UV",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A reaction: an exact multiset of inputs under an exact condition yields
/// one output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionDef {
    pub id: ReactionId,
    pub inputs: BTreeMap<ElementId, u32>,
    pub output: ElementId,
    #[serde(default = "default_output_count")]
    pub output_count: u32,
    pub equation: String,
    pub description: String,
    pub condition: Option<Condition>,
}

fn default_output_count() -> u32 {
    1
}

impl ReactionDef {
    /// Canonical lookup key for this reaction.
    pub fn key(&self) -> ReactionKey {
        ReactionKey::new(&self.inputs, self.condition)
    }
}

// ---------------------------------------------------------------------------
// CatalogBuilder
// ---------------------------------------------------------------------------

/// Builder for an immutable [`Catalog`].
/// Two-phase lifecycle: registration -> validation on `build()`.
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    elements: Vec<ElementDef>,
    element_index: HashMap<ElementId, usize>,
    reactions: Vec<ReactionDef>,
    reaction_index: HashMap<ReactionId, usize>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an element or compound. Ids must be unique.
    pub fn register_element(&mut self, def: ElementDef) -> Result<(), CatalogError> {
        if self.element_index.contains_key(&def.id) {
            return Err(CatalogError::DuplicateElement(def.id));
        }
        self.element_index.insert(def.id.clone(), self.elements.len());
        self.elements.push(def);
        Ok(())
    }

    /// Register a reaction. Ids must be unique; references are checked in
    /// [`CatalogBuilder::build`] so reactions may be registered before the
    /// compounds they produce.
    pub fn register_reaction(&mut self, def: ReactionDef) -> Result<(), CatalogError> {
        if self.reaction_index.contains_key(&def.id) {
            return Err(CatalogError::DuplicateReaction(def.id));
        }
        self.reaction_index
            .insert(def.id.clone(), self.reactions.len());
        self.reactions.push(def);
        Ok(())
    }

    /// Validate and freeze the catalog.
    pub fn build(self) -> Result<Catalog, CatalogError> {
        let mut keys: HashMap<ReactionKey, &ReactionId> = HashMap::new();

        for reaction in &self.reactions {
            if reaction.inputs.is_empty() {
                return Err(CatalogError::EmptyInputs(reaction.id.clone()));
            }
            for (element, count) in &reaction.inputs {
                if *count == 0 {
                    return Err(CatalogError::ZeroCount {
                        reaction: reaction.id.clone(),
                        element: element.clone(),
                    });
                }
                if !self.element_index.contains_key(element) {
                    return Err(CatalogError::UnknownInput {
                        reaction: reaction.id.clone(),
                        element: element.clone(),
                    });
                }
            }
            if !self.element_index.contains_key(&reaction.output) {
                return Err(CatalogError::UnknownOutput {
                    reaction: reaction.id.clone(),
                    element: reaction.output.clone(),
                });
            }

            let key = reaction.key();
            if let Some(first) = keys.get(&key) {
                return Err(CatalogError::DuplicateKey {
                    first: (*first).clone(),
                    second: reaction.id.clone(),
                    key: key.to_string(),
                });
            }
            keys.insert(key, &reaction.id);
        }

        Ok(Catalog {
            elements: self.elements,
            element_index: self.element_index,
            reactions: self.reactions,
            reaction_index: self.reaction_index,
        })
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Immutable content tables. Frozen after `build()`.
#[derive(Debug, Clone)]
pub struct Catalog {
    elements: Vec<ElementDef>,
    element_index: HashMap<ElementId, usize>,
    reactions: Vec<ReactionDef>,
    reaction_index: HashMap<ReactionId, usize>,
}

impl Catalog {
    pub fn element(&self, id: &ElementId) -> Option<&ElementDef> {
        self.element_index.get(id).map(|&i| &self.elements[i])
    }

    pub fn reaction(&self, id: &ReactionId) -> Option<&ReactionDef> {
        self.reaction_index.get(id).map(|&i| &self.reactions[i])
    }

    /// All elements and compounds in registration order.
    pub fn elements(&self) -> &[ElementDef] {
        &self.elements
    }

    /// All reactions in registration order.
    pub fn reactions(&self) -> &[ReactionDef] {
        &self.reactions
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    pub fn reaction_count(&self) -> usize {
        self.reactions.len()
    }

    /// Ids of the entries available before any reaction.
    pub fn default_unlocked(&self) -> impl Iterator<Item = &ElementId> {
        self.elements
            .iter()
            .filter(|e| e.default_unlocked)
            .map(|e| &e.id)
    }

    /// Reactions that produce the given element.
    pub fn reactions_producing<'a>(
        &'a self,
        output: &'a ElementId,
    ) -> impl Iterator<Item = &'a ReactionDef> + 'a {
        self.reactions.iter().filter(move |r| &r.output == output)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
