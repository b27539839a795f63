//! Reaction Lab Core -- the reaction and bonding engine for the chemistry sandbox.
//!
//! This crate holds everything the sandbox needs to decide whether a set of
//! placed elements reacts, and to keep a hand-built molecule chemically
//! plausible while the player wires bonds between atoms.
//!
//! # Flow
//!
//! 1. **Catalog** -- Elements, compounds and reactions are registered through
//!    [`catalog::CatalogBuilder`] and frozen into an immutable
//!    [`catalog::Catalog`].
//! 2. **Workbench** -- The player places atoms on a [`workbench::Workbench`].
//!    Each atom gets a stable [`id::AtomId`]; bonds reference those ids.
//! 3. **Match** -- The workbench multiset and an optional
//!    [`catalog::Condition`] are looked up in the [`matcher::ReactionMatcher`].
//! 4. **Unlock** -- A match adds the reaction output to the
//!    [`unlock::UnlockSet`].
//!
//! ```rust,ignore
//! let matcher = ReactionMatcher::new(&catalog);
//! let mut unlocks = UnlockSet::from_catalog(&catalog);
//! if let Some(outcome) = matcher.react(&bench.counts(), None, &mut unlocks) {
//!     println!("made {}", outcome.reaction.output);
//! }
//! ```
//!
//! # Key Types
//!
//! - [`catalog::Catalog`] -- Immutable element and reaction tables.
//! - [`matcher::ReactionMatcher`] -- Canonical-key lookup of reactions.
//! - [`bond::BondGraph`] -- Bonds between atoms with valency enforcement.
//! - [`workbench::Workbench`] -- Placed atoms, selection protocol and bonds.
//! - [`unlock::UnlockSet`] -- Which catalog entries the player has access to.

pub mod bond;
pub mod catalog;
pub mod id;
pub mod matcher;
pub mod unlock;
pub mod valency;
pub mod workbench;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
