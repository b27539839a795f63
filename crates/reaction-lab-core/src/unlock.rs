//! Which catalog entries the player may place on the workbench.
//!
//! Kept apart from the immutable [`Catalog`] so that content records are never
//! mutated in place. Ids only ever get added; a reset rebuilds the set from
//! the catalog defaults.

use crate::catalog::Catalog;
use crate::id::ElementId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnlockSet {
    ids: BTreeSet<ElementId>,
}

impl UnlockSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The ids the catalog marks as available from the start.
    pub fn from_catalog(catalog: &Catalog) -> Self {
        Self {
            ids: catalog.default_unlocked().cloned().collect(),
        }
    }

    /// Catalog defaults plus previously persisted ids. Ids the catalog does
    /// not know are dropped.
    pub fn restore<I>(catalog: &Catalog, persisted: I) -> Self
    where
        I: IntoIterator<Item = ElementId>,
    {
        let mut set = Self::from_catalog(catalog);
        for id in persisted {
            if catalog.element(&id).is_some() {
                set.ids.insert(id);
            } else {
                tracing::debug!(target: "lab.unlock", id = %id, "ignoring unknown persisted id");
            }
        }
        set
    }

    /// Mark an id as unlocked. Returns true if it was not unlocked before.
    pub fn unlock(&mut self, id: ElementId) -> bool {
        self.ids.insert(id)
    }

    pub fn is_unlocked(&self, id: &ElementId) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Unlocked ids in lexicographic order.
    pub fn iter(&self) -> impl Iterator<Item = &ElementId> {
        self.ids.iter()
    }

    pub fn to_vec(&self) -> Vec<ElementId> {
        self.ids.iter().cloned().collect()
    }
}
