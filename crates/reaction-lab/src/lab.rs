//! The session facade: one workbench, one unlock set, one objective tree,
//! wired to persistence.

use crate::config::LabConfig;
use crate::error::LabError;
use crate::event::LabEvent;
use crate::view::{ObjectiveCheck, ObjectiveView, ReactionReport, TierView};
use reaction_lab_core::bond::{Bond, BondOutcome};
use reaction_lab_core::catalog::{Catalog, Condition, ElementDef, ReactionDef};
use reaction_lab_core::id::{AtomId, BondId, ElementId};
use reaction_lab_core::matcher::ReactionMatcher;
use reaction_lab_core::unlock::UnlockSet;
use reaction_lab_core::workbench::{
    PlacedAtom, Position, SelectOutcome, ValencyStatus, Workbench,
};
use reaction_lab_data::{ContentPack, builtin_content, load_content};
use reaction_lab_objectives::{ObjectiveId, ObjectiveTree, ProgressStats, validate_objective};
use reaction_lab_store::{FileStore, KeyValueStore, MemoryStore, ProgressStore};

/// A play session.
///
/// Every mutation that changes unlocks or objective progress is persisted
/// before the call returns.
#[derive(Debug)]
pub struct Lab<S: KeyValueStore> {
    catalog: Catalog,
    matcher: ReactionMatcher,
    unlocks: UnlockSet,
    workbench: Workbench,
    objectives: ObjectiveTree,
    store: ProgressStore<S>,
    last_discovery: Option<ReactionDef>,
    events: Vec<LabEvent>,
}

impl Lab<FileStore> {
    /// Open a session from configuration: content from `content_dir` (or the
    /// built-in tables), state from `storage_dir`.
    pub fn open(config: &LabConfig) -> Result<Self, LabError> {
        let content = match &config.content_dir {
            Some(dir) => load_content(dir)?,
            None => builtin_content()?,
        };
        Self::with_store(content, FileStore::new(&config.storage_dir), config)
    }
}

impl Lab<MemoryStore> {
    /// A session over the built-in content that persists nothing to disk.
    pub fn in_memory(config: &LabConfig) -> Result<Self, LabError> {
        Self::with_store(builtin_content()?, MemoryStore::new(), config)
    }
}

impl<S: KeyValueStore> Lab<S> {
    /// Build a session over `content`, restoring whatever `store` holds.
    pub fn with_store(content: ContentPack, store: S, config: &LabConfig) -> Result<Self, LabError> {
        config.validate()?;
        let ContentPack {
            catalog,
            objectives,
        } = content;
        let mut objectives = ObjectiveTree::new(objectives, config.objectives_per_tier)?;
        let store = ProgressStore::with_per_tier(store, config.objectives_per_tier);

        let unlocks = store.load_unlocked(&catalog);
        objectives.restore(store.load());

        tracing::info!(
            target: "lab.session",
            elements = catalog.element_count(),
            reactions = catalog.reaction_count(),
            unlocked = unlocks.len(),
            tier = objectives.current_tier(),
            completed = objectives.progress().completed_objective_ids.len(),
            "session opened"
        );

        Ok(Self {
            matcher: ReactionMatcher::new(&catalog),
            catalog,
            unlocks,
            workbench: Workbench::with_bounds(config.bounds()),
            objectives,
            store,
            last_discovery: None,
            events: Vec::new(),
        })
    }

    // -- Workbench --

    /// Place an unlocked element. The position is clamped to the workbench.
    pub fn add_element(&mut self, id: &ElementId, position: Position) -> Result<AtomId, LabError> {
        let def = self
            .catalog
            .element(id)
            .ok_or_else(|| LabError::UnknownElement(id.clone()))?;
        if !self.unlocks.is_unlocked(id) {
            return Err(LabError::Locked(id.clone()));
        }
        Ok(self.workbench.place(def, position))
    }

    /// Remove an atom and every bond attached to it.
    pub fn remove_atom(&mut self, atom: AtomId) -> Option<PlacedAtom> {
        self.workbench.remove_atom(atom)
    }

    pub fn move_atom(&mut self, atom: AtomId, position: Position) -> bool {
        self.workbench.move_atom(atom, position)
    }

    /// Empty the workbench and forget the last discovery.
    pub fn clear_workbench(&mut self) {
        self.workbench.clear();
        self.last_discovery = None;
    }

    // -- Bonds --

    pub fn select_atom(&mut self, atom: AtomId) -> SelectOutcome {
        self.workbench.select(atom)
    }

    pub fn clear_selection(&mut self) {
        self.workbench.clear_selection();
    }

    pub fn propose_bond(&mut self, x: AtomId, y: AtomId) -> BondOutcome {
        self.workbench.propose_bond(x, y)
    }

    pub fn cycle_bond(&mut self, bond: BondId) -> BondOutcome {
        self.workbench.cycle_bond(bond)
    }

    pub fn remove_bond(&mut self, bond: BondId) -> Option<Bond> {
        self.workbench.remove_bond(bond)
    }

    // -- Reactions --

    /// Run the workbench contents through the reaction table.
    ///
    /// On a match the output is unlocked and saved, and the current
    /// objective is checked against the workbench plus the new output. The
    /// workbench itself is left as is.
    pub fn attempt_reaction(&mut self, condition: Option<Condition>) -> Option<ReactionReport> {
        let counts = self.workbench.counts();
        let Some(outcome) = self.matcher.react(&counts, condition, &mut self.unlocks) else {
            self.events.push(LabEvent::ReactionFailed { condition });
            return None;
        };

        self.store.save_unlocked(&self.unlocks);
        self.events.push(LabEvent::ReactionSucceeded {
            reaction: outcome.reaction.id.clone(),
            output: outcome.reaction.output.clone(),
            newly_unlocked: outcome.newly_unlocked,
        });
        self.last_discovery = Some(outcome.reaction.clone());

        let objective = self.check_current(Some(&outcome.reaction.output));
        Some(ReactionReport {
            reaction: outcome.reaction,
            newly_unlocked: outcome.newly_unlocked,
            objective,
        })
    }

    // -- Objectives --

    pub fn select_objective(&mut self, id: &ObjectiveId) -> bool {
        let selected = self.objectives.select_objective(id);
        if selected {
            self.store.save(self.objectives.progress());
        }
        self.absorb_objective_events();
        selected
    }

    /// Check the current objective against the workbench as it stands,
    /// completing it if satisfied. `None` when no objective is selected.
    pub fn check_objective(&mut self) -> Option<ObjectiveCheck> {
        self.check_current(None)
    }

    /// Discard all unlocks and progress, persisted state included.
    pub fn reset_all(&mut self) {
        self.unlocks = self.store.reset_unlocked(&self.catalog);
        self.store.reset();
        self.objectives.reset();
        self.workbench.clear();
        self.last_discovery = None;
        self.events.clear();
        self.events.push(LabEvent::ProgressReset);
        tracing::info!(target: "lab.session", "progress reset");
    }

    // -- Queries --

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn workbench(&self) -> &Workbench {
        &self.workbench
    }

    pub fn unlocks(&self) -> &UnlockSet {
        &self.unlocks
    }

    pub fn objectives(&self) -> &ObjectiveTree {
        &self.objectives
    }

    pub fn store(&self) -> &ProgressStore<S> {
        &self.store
    }

    /// The reaction most recently matched since the workbench was last
    /// cleared.
    pub fn last_discovery(&self) -> Option<&ReactionDef> {
        self.last_discovery.as_ref()
    }

    pub fn valency_status(&self) -> Vec<ValencyStatus> {
        self.workbench.valency_status()
    }

    /// Unlocked entries in catalog order.
    pub fn available_elements(&self) -> Vec<&ElementDef> {
        self.catalog
            .elements()
            .iter()
            .filter(|e| self.unlocks.is_unlocked(&e.id))
            .collect()
    }

    /// Every reached tier with its objectives and their status.
    pub fn objective_board(&self) -> Vec<TierView> {
        let current = self.objectives.current_objective().map(|o| &o.id);
        let progress = self.objectives.progress();
        self.objectives
            .objectives_by_tier()
            .into_iter()
            .map(|(tier, list)| {
                let counter = progress.tier(tier);
                TierView {
                    tier,
                    completed: counter.completed,
                    total: counter.total,
                    objectives: list
                        .into_iter()
                        .map(|o| {
                            ObjectiveView::new(o, self.objectives.status(o), current == Some(&o.id))
                        })
                        .collect(),
                }
            })
            .collect()
    }

    pub fn stats(&self) -> ProgressStats {
        self.objectives.stats()
    }

    pub fn completion_percentage(&self) -> u32 {
        self.objectives.stats().percentage
    }

    pub fn drain_events(&mut self) -> Vec<LabEvent> {
        self.absorb_objective_events();
        std::mem::take(&mut self.events)
    }

    // -- Internal helpers --

    fn check_current(&mut self, produced: Option<&ElementId>) -> Option<ObjectiveCheck> {
        let objective = self.objectives.current_objective()?.clone();
        let mut ids = self.workbench.element_ids();
        ids.extend(produced.cloned());

        let result = validate_objective(&objective, &ids, self.workbench.has_required_bonds());
        let completed_now = result.completed && self.objectives.complete_objective(&objective.id);
        if completed_now {
            self.store.save(self.objectives.progress());
        }
        tracing::debug!(
            target: "lab.session",
            objective = %objective.id,
            success = result.success,
            completed_now,
            "objective checked"
        );
        self.absorb_objective_events();

        Some(ObjectiveCheck {
            objective: objective.id,
            title: objective.title,
            reward: objective.reward,
            result,
            completed_now,
        })
    }

    fn absorb_objective_events(&mut self) {
        self.events.extend(
            self.objectives
                .drain_events()
                .into_iter()
                .map(LabEvent::Objective),
        );
    }
}

// ===========================================================================
// Tests
// ===========================================================================
