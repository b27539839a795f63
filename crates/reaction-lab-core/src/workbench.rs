//! The workbench: placed atoms, the two-click bond selection protocol, and
//! the bond graph between them.
//!
//! Atoms are stored in a `SlotMap`, so an [`AtomId`] stays valid (and keeps
//! pointing at the same atom) no matter which other atoms are removed.
//! Placement order is tracked separately for display and for the ordered id
//! list handed to objective validation.

use crate::bond::{Bond, BondGraph, BondOutcome};
use crate::catalog::ElementDef;
use crate::id::{AtomId, BondId, ElementId};
use crate::matcher::ElementCounts;
use crate::valency::valency;
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

/// Selections needed to fire a bond proposal.
const BOND_SELECTION: usize = 2;

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// Screen position of an atom. Rendering only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Square drawing area atoms are kept inside.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorkbenchBounds {
    pub size: f32,
    pub margin: f32,
}

impl Default for WorkbenchBounds {
    fn default() -> Self {
        Self {
            size: 400.0,
            margin: 40.0,
        }
    }
}

impl WorkbenchBounds {
    /// Clamp a position into `[margin, size - margin]` on both axes.
    pub fn clamp(&self, p: Position) -> Position {
        let lo = self.margin;
        let hi = (self.size - self.margin).max(lo);
        Position {
            x: p.x.clamp(lo, hi),
            y: p.y.clamp(lo, hi),
        }
    }
}

/// An element instance on the workbench.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedAtom {
    pub element: ElementId,
    pub symbol: String,
    pub position: Position,
}

/// Bond usage of one atom, for bond-edit affordances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValencyStatus {
    pub atom: AtomId,
    pub element: ElementId,
    pub symbol: String,
    pub used: u8,
    pub max: u8,
}

impl ValencyStatus {
    pub fn is_saturated(&self) -> bool {
        self.used >= self.max
    }

    pub fn remaining(&self) -> u8 {
        self.max.saturating_sub(self.used)
    }
}

/// Result of clicking an atom in bond-edit mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    /// The atom joined the selection.
    Selected,
    /// The atom was already selected and has been deselected.
    Deselected,
    /// A second atom was picked; a bond was proposed and the selection cleared.
    Bonded(BondOutcome),
    /// The atom is not on the workbench.
    UnknownAtom,
}

// ---------------------------------------------------------------------------
// Workbench
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct Workbench {
    atoms: SlotMap<AtomId, PlacedAtom>,
    order: Vec<AtomId>,
    graph: BondGraph,
    selection: Vec<AtomId>,
    bounds: WorkbenchBounds,
}

impl Workbench {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bounds(bounds: WorkbenchBounds) -> Self {
        Self {
            bounds,
            ..Self::default()
        }
    }

    pub fn bounds(&self) -> WorkbenchBounds {
        self.bounds
    }

    // -- Placement --

    /// Place an instance of `def`. The position is clamped into bounds.
    pub fn place(&mut self, def: &ElementDef, position: Position) -> AtomId {
        let id = self.atoms.insert(PlacedAtom {
            element: def.id.clone(),
            symbol: def.symbol.clone(),
            position: self.bounds.clamp(position),
        });
        self.graph.add_atom(id, valency(&def.symbol));
        self.order.push(id);
        id
    }

    /// Remove one atom and every bond touching it.
    pub fn remove_atom(&mut self, atom: AtomId) -> Option<PlacedAtom> {
        let placed = self.atoms.remove(atom)?;
        self.order.retain(|&a| a != atom);
        self.selection.retain(|&a| a != atom);
        self.graph.remove_atom(atom);
        Some(placed)
    }

    /// Remove every atom, bond and selection.
    pub fn clear(&mut self) {
        self.atoms.clear();
        self.order.clear();
        self.graph.clear();
        self.selection.clear();
    }

    /// Drag an atom. Returns false for an unknown atom.
    pub fn move_atom(&mut self, atom: AtomId, position: Position) -> bool {
        let clamped = self.bounds.clamp(position);
        match self.atoms.get_mut(atom) {
            Some(placed) => {
                placed.position = clamped;
                true
            }
            None => false,
        }
    }

    // -- Queries --

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn atom(&self, atom: AtomId) -> Option<&PlacedAtom> {
        self.atoms.get(atom)
    }

    /// Atoms in placement order.
    pub fn atoms(&self) -> impl Iterator<Item = (AtomId, &PlacedAtom)> {
        self.order.iter().map(|&id| (id, &self.atoms[id]))
    }

    /// Element ids in placement order.
    pub fn element_ids(&self) -> Vec<ElementId> {
        self.atoms().map(|(_, a)| a.element.clone()).collect()
    }

    /// Multiset of element ids, the reaction matcher's input.
    pub fn counts(&self) -> ElementCounts {
        self.atoms().map(|(_, a)| a.element.clone()).collect()
    }

    // -- Bonds --

    pub fn graph(&self) -> &BondGraph {
        &self.graph
    }

    pub fn bonds(&self) -> impl Iterator<Item = (BondId, &Bond)> {
        self.graph.bonds()
    }

    pub fn remaining_capacity(&self, atom: AtomId) -> Option<u8> {
        self.graph.remaining_capacity(atom)
    }

    pub fn propose_bond(&mut self, x: AtomId, y: AtomId) -> BondOutcome {
        self.graph.propose_bond(x, y)
    }

    pub fn cycle_bond(&mut self, bond: BondId) -> BondOutcome {
        self.graph.cycle_bond(bond)
    }

    pub fn remove_bond(&mut self, bond: BondId) -> Option<Bond> {
        self.graph.remove_bond(bond)
    }

    /// Per-atom bond usage in placement order.
    pub fn valency_status(&self) -> Vec<ValencyStatus> {
        self.atoms()
            .map(|(id, placed)| ValencyStatus {
                atom: id,
                element: placed.element.clone(),
                symbol: placed.symbol.clone(),
                used: self.graph.used_capacity(id),
                max: self.graph.valency(id).unwrap_or(0),
            })
            .collect()
    }

    /// At least one bond exists and no placed atom is left unbonded.
    pub fn has_required_bonds(&self) -> bool {
        self.graph.bond_count() > 0
            && self
                .order
                .iter()
                .all(|&id| !self.graph.bonds_of(id).is_empty())
    }

    // -- Selection protocol --

    /// Toggle an atom's selection. Picking a second distinct atom proposes
    /// a bond between the two and clears the selection.
    pub fn select(&mut self, atom: AtomId) -> SelectOutcome {
        if !self.atoms.contains_key(atom) {
            return SelectOutcome::UnknownAtom;
        }
        if let Some(pos) = self.selection.iter().position(|&a| a == atom) {
            self.selection.remove(pos);
            return SelectOutcome::Deselected;
        }

        self.selection.push(atom);
        if self.selection.len() < BOND_SELECTION {
            return SelectOutcome::Selected;
        }

        let (x, y) = (self.selection[0], self.selection[1]);
        self.selection.clear();
        SelectOutcome::Bonded(self.graph.propose_bond(x, y))
    }

    pub fn selection(&self) -> &[AtomId] {
        &self.selection
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
