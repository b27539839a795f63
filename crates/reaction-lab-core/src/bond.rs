use crate::id::{AtomId, BondId};
use serde::{Deserialize, Serialize};
use slotmap::{SecondaryMap, SlotMap};

// ---------------------------------------------------------------------------
// Bond types
// ---------------------------------------------------------------------------

/// Bond multiplicity. Cycles single -> double -> triple -> single.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BondOrder {
    Single,
    Double,
    Triple,
}

impl BondOrder {
    /// Numeric bond order (1, 2 or 3).
    pub fn value(self) -> u8 {
        match self {
            BondOrder::Single => 1,
            BondOrder::Double => 2,
            BondOrder::Triple => 3,
        }
    }

    /// The next order in the edit cycle.
    pub fn next(self) -> Self {
        match self {
            BondOrder::Single => BondOrder::Double,
            BondOrder::Double => BondOrder::Triple,
            BondOrder::Triple => BondOrder::Single,
        }
    }
}

/// A bond between two atoms, referenced by identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bond {
    pub a: AtomId,
    pub b: AtomId,
    pub order: BondOrder,
}

impl Bond {
    pub fn touches(&self, atom: AtomId) -> bool {
        self.a == atom || self.b == atom
    }

    /// Whether this bond joins `x` and `y`, in either direction.
    pub fn connects(&self, x: AtomId, y: AtomId) -> bool {
        (self.a == x && self.b == y) || (self.a == y && self.b == x)
    }
}

/// What a bond edit did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BondOutcome {
    /// A new single bond was created.
    Created(BondId),
    /// An existing bond changed order.
    Cycled {
        bond: BondId,
        from: BondOrder,
        to: BondOrder,
    },
    /// Nothing changed.
    Rejected(BondRejection),
}

impl BondOutcome {
    pub fn is_applied(&self) -> bool {
        !matches!(self, BondOutcome::Rejected(_))
    }
}

/// Why a bond edit was refused. State is unchanged in every case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BondRejection {
    /// Both endpoints are the same atom.
    SameAtom,
    /// An endpoint is not in the graph.
    UnknownAtom(AtomId),
    /// The bond id does not exist.
    UnknownBond(BondId),
    /// An endpoint lacks the capacity for the requested order.
    Valency,
}

// ---------------------------------------------------------------------------
// BondGraph
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
struct AtomSlot {
    valency: u8,
    bonds: Vec<BondId>,
}

/// Undirected multigraph-free bond set with per-atom valency limits.
///
/// Atom keys are issued by the owning workbench's `SlotMap`; the graph keeps
/// adjacency in a `SecondaryMap` keyed the same way. Every mutation keeps
/// `sum(order of incident bonds) <= valency` for every atom, and at most one
/// bond exists per atom pair.
#[derive(Debug, Clone, Default)]
pub struct BondGraph {
    atoms: SecondaryMap<AtomId, AtomSlot>,
    bonds: SlotMap<BondId, Bond>,
}

impl BondGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track an atom with the given bonding capacity.
    pub fn add_atom(&mut self, atom: AtomId, valency: u8) {
        self.atoms.insert(
            atom,
            AtomSlot {
                valency,
                bonds: Vec::new(),
            },
        );
    }

    /// Forget an atom and delete every bond touching it. Returns the removed
    /// bond ids. Bonds between other atoms are unaffected.
    pub fn remove_atom(&mut self, atom: AtomId) -> Vec<BondId> {
        let Some(slot) = self.atoms.remove(atom) else {
            return Vec::new();
        };
        for &bond_id in &slot.bonds {
            if let Some(bond) = self.bonds.remove(bond_id) {
                let other = if bond.a == atom { bond.b } else { bond.a };
                if let Some(other_slot) = self.atoms.get_mut(other) {
                    other_slot.bonds.retain(|&b| b != bond_id);
                }
            }
        }
        slot.bonds
    }

    /// Remove every atom and bond.
    pub fn clear(&mut self) {
        self.atoms.clear();
        self.bonds.clear();
    }

    pub fn contains_atom(&self, atom: AtomId) -> bool {
        self.atoms.contains_key(atom)
    }

    pub fn valency(&self, atom: AtomId) -> Option<u8> {
        self.atoms.get(atom).map(|s| s.valency)
    }

    /// Sum of bond orders touching `atom`.
    pub fn used_capacity(&self, atom: AtomId) -> u8 {
        self.atoms.get(atom).map_or(0, |slot| {
            slot.bonds
                .iter()
                .filter_map(|&b| self.bonds.get(b))
                .map(|b| b.order.value())
                .sum()
        })
    }

    /// `valency - used`, or `None` for an unknown atom.
    pub fn remaining_capacity(&self, atom: AtomId) -> Option<u8> {
        let valency = self.valency(atom)?;
        Some(valency.saturating_sub(self.used_capacity(atom)))
    }

    pub fn bond(&self, id: BondId) -> Option<&Bond> {
        self.bonds.get(id)
    }

    pub fn bonds(&self) -> impl Iterator<Item = (BondId, &Bond)> {
        self.bonds.iter()
    }

    pub fn bond_count(&self) -> usize {
        self.bonds.len()
    }

    /// Bond ids touching `atom`.
    pub fn bonds_of(&self, atom: AtomId) -> &[BondId] {
        self.atoms.get(atom).map_or(&[], |s| s.bonds.as_slice())
    }

    /// The bond joining `x` and `y`, if any.
    pub fn bond_between(&self, x: AtomId, y: AtomId) -> Option<BondId> {
        self.atoms
            .get(x)?
            .bonds
            .iter()
            .copied()
            .find(|&b| self.bonds.get(b).is_some_and(|bond| bond.connects(x, y)))
    }

    /// Bond two atoms, or cycle the order of their existing bond.
    ///
    /// A new bond starts single and needs one free unit of capacity on both
    /// atoms. An existing bond is cycled under the same rules as
    /// [`BondGraph::cycle_bond`].
    pub fn propose_bond(&mut self, x: AtomId, y: AtomId) -> BondOutcome {
        if x == y {
            return BondOutcome::Rejected(BondRejection::SameAtom);
        }
        for atom in [x, y] {
            if !self.atoms.contains_key(atom) {
                return BondOutcome::Rejected(BondRejection::UnknownAtom(atom));
            }
        }

        if let Some(existing) = self.bond_between(x, y) {
            return self.cycle_bond(existing);
        }

        let free_x = self.remaining_capacity(x).unwrap_or(0);
        let free_y = self.remaining_capacity(y).unwrap_or(0);
        if free_x < 1 || free_y < 1 {
            tracing::debug!(target: "lab.bond", free_x, free_y, "bond rejected: valency");
            return BondOutcome::Rejected(BondRejection::Valency);
        }

        let id = self.bonds.insert(Bond {
            a: x,
            b: y,
            order: BondOrder::Single,
        });
        for atom in [x, y] {
            if let Some(slot) = self.atoms.get_mut(atom) {
                slot.bonds.push(id);
            }
        }
        BondOutcome::Created(id)
    }

    /// Advance a bond to its next order if both endpoints can absorb it.
    ///
    /// The check discounts the bond's current order: for each endpoint,
    /// `remaining + current - next >= 0`.
    pub fn cycle_bond(&mut self, id: BondId) -> BondOutcome {
        let Some(bond) = self.bonds.get(id).copied() else {
            return BondOutcome::Rejected(BondRejection::UnknownBond(id));
        };
        let from = bond.order;
        let to = from.next();

        for atom in [bond.a, bond.b] {
            let remaining = i16::from(self.remaining_capacity(atom).unwrap_or(0));
            if remaining + i16::from(from.value()) - i16::from(to.value()) < 0 {
                tracing::debug!(target: "lab.bond", ?from, ?to, "bond cycle rejected: valency");
                return BondOutcome::Rejected(BondRejection::Valency);
            }
        }

        if let Some(b) = self.bonds.get_mut(id) {
            b.order = to;
        }
        BondOutcome::Cycled { bond: id, from, to }
    }

    /// Delete a single bond.
    pub fn remove_bond(&mut self, id: BondId) -> Option<Bond> {
        let bond = self.bonds.remove(id)?;
        for atom in [bond.a, bond.b] {
            if let Some(slot) = self.atoms.get_mut(atom) {
                slot.bonds.retain(|&b| b != id);
            }
        }
        Some(bond)
    }

    /// Whether every atom is within its valency. Holds after every public
    /// mutation; exposed for tests and debug assertions.
    pub fn valency_respected(&self) -> bool {
        self.atoms
            .iter()
            .all(|(atom, slot)| self.used_capacity(atom) <= slot.valency)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
