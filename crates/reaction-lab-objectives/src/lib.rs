//! Objective progression for the chemistry sandbox.
//!
//! Objectives are grouped into six tiers. Within a tier they form a chain by
//! `order`: an objective becomes available once its predecessor is complete.
//! Completing every objective of a tier opens the next one.
//!
//! # Overview
//!
//! The [`ObjectiveTree`] owns the immutable objective list and the mutable
//! [`Progress`] record. Game code drives it through
//! [`ObjectiveTree::select_objective`] and [`ObjectiveTree::complete_objective`],
//! and decides when to complete by calling the pure [`validate_objective`]
//! against a workbench snapshot. State changes are reported as
//! [`ObjectiveEvent`]s, drained with [`ObjectiveTree::drain_events`].
//!
//! [`Progress`] is the persisted form. It serializes with the camelCase field
//! names the save format has always used, and [`ObjectiveTree::restore`]
//! reconciles a loaded record against the objectives actually defined.

use reaction_lab_core::id::ElementId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

/// Highest tier. Completing it has no successor.
pub const MAX_TIER: u8 = 6;

/// Default number of objectives that must be completed to clear a tier.
pub const OBJECTIVES_PER_TIER: u32 = 50;

/// The objective that is unlocked from the very start.
pub const FIRST_OBJECTIVE: &str = "t1_obj1";

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Identifies an objective, e.g. `t3_obj12`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectiveId(pub String);

impl ObjectiveId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The conventional id for the objective at `order` within `tier`.
    pub fn for_slot(tier: u8, order: u32) -> Self {
        Self(format!("t{tier}_obj{order}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_first(&self) -> bool {
        self.0 == FIRST_OBJECTIVE
    }
}

impl From<&str> for ObjectiveId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for ObjectiveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Objective definition
// ---------------------------------------------------------------------------

/// One stage of a multistep objective.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectiveStep {
    /// 1-based position within the objective.
    pub step_number: u32,
    pub description: String,
    /// Every id here must be on the workbench for the step to count.
    pub required_elements: Vec<ElementId>,
}

/// What an objective asks the player to produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ObjectiveKind {
    /// Have a specific compound on the workbench.
    Simple { target_compound: ElementId },
    /// Work through a sequence of steps.
    Multistep { steps: Vec<ObjectiveStep> },
}

/// An objective. Defined at startup; immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Objective {
    pub id: ObjectiveId,
    /// 1..=[`MAX_TIER`].
    pub tier: u8,
    /// Position within the tier, contiguous from 1.
    pub order: u32,
    pub title: String,
    pub description: String,
    pub kind: ObjectiveKind,
    /// Whether the workbench must carry a complete bond network.
    #[serde(default)]
    pub requires_bonds: bool,
    #[serde(default)]
    pub reward: String,
}

impl Objective {
    /// Number of steps for multistep objectives, 1 for simple ones.
    pub fn step_count(&self) -> usize {
        match &self.kind {
            ObjectiveKind::Simple { .. } => 1,
            ObjectiveKind::Multistep { steps } => steps.len().max(1),
        }
    }
}

// ---------------------------------------------------------------------------
// Progress (persisted)
// ---------------------------------------------------------------------------

/// Completion counter for one tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierProgress {
    pub completed: u32,
    pub total: u32,
}

/// The player's objective progress. This is the save format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub current_tier: u8,
    /// Completed ids in completion order.
    pub completed_objective_ids: Vec<ObjectiveId>,
    pub current_objective_id: Option<ObjectiveId>,
    /// Keyed by tier, 1..=[`MAX_TIER`]. Serializes with string keys `"1"`..`"6"`.
    pub tier_progress: BTreeMap<u8, TierProgress>,
}

impl Progress {
    /// Fresh progress: tier 1, nothing completed, first objective selected.
    pub fn initial(per_tier: u32) -> Self {
        Self {
            current_tier: 1,
            completed_objective_ids: Vec::new(),
            current_objective_id: Some(ObjectiveId::from(FIRST_OBJECTIVE)),
            tier_progress: (1..=MAX_TIER)
                .map(|t| {
                    (
                        t,
                        TierProgress {
                            completed: 0,
                            total: per_tier,
                        },
                    )
                })
                .collect(),
        }
    }

    pub fn tier(&self, tier: u8) -> TierProgress {
        self.tier_progress.get(&tier).copied().unwrap_or(TierProgress {
            completed: 0,
            total: 0,
        })
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::initial(OBJECTIVES_PER_TIER)
    }
}

// ---------------------------------------------------------------------------
// Status, validation and stats
// ---------------------------------------------------------------------------

/// Where an objective stands relative to the current progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectiveStatus {
    Locked,
    Unlocked,
    Completed,
}

/// Outcome of checking a workbench snapshot against an objective.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub success: bool,
    pub message: String,
    /// Whether the objective as a whole is satisfied, not just one step.
    pub completed: bool,
}

impl ValidationResult {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            completed: false,
        }
    }
}

/// Aggregate progress figures for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressStats {
    pub total_completed: usize,
    /// Objectives in tiers up to and including the current one.
    pub total_available: usize,
    /// `total_completed / total_available`, as a rounded percentage.
    pub percentage: u32,
    pub current_tier: u8,
    pub current_objective: Option<ObjectiveId>,
}

/// Check whether a workbench satisfies an objective. Pure.
///
/// `workbench_ids` are the element ids present (including any freshly
/// produced compound). `has_required_bonds` is the workbench bond check.
pub fn validate_objective(
    objective: &Objective,
    workbench_ids: &[ElementId],
    has_required_bonds: bool,
) -> ValidationResult {
    if let ObjectiveKind::Simple { target_compound } = &objective.kind {
        let target = target_compound.as_str();
        if workbench_ids
            .iter()
            .any(|id| id.as_str().eq_ignore_ascii_case(target))
        {
            return ValidationResult {
                success: true,
                message: format!("Objective complete! Created {target}"),
                completed: true,
            };
        }
    }

    if objective.requires_bonds && !has_required_bonds {
        return ValidationResult::failure(
            "This objective requires specific bonds. Connect every atom before reacting.",
        );
    }

    if let ObjectiveKind::Multistep { steps } = &objective.kind {
        let reached = steps.iter().find(|step| {
            step.required_elements
                .iter()
                .all(|req| workbench_ids.contains(req))
        });
        if let Some(step) = reached {
            return ValidationResult {
                success: true,
                message: format!("Step {} complete: {}", step.step_number, step.description),
                completed: step.step_number as usize == steps.len().max(1),
            };
        }
    }

    ValidationResult::failure("Objective requirements not met. Check the description and try again.")
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Events emitted by the objective tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectiveEvent {
    /// The player picked a new current objective.
    ObjectiveSelected { id: ObjectiveId },

    /// An objective was completed for the first time.
    ObjectiveCompleted { id: ObjectiveId, tier: u8 },

    /// A tier was cleared and the next one opened.
    TierAdvanced { from: u8, to: u8 },

    /// The completed objective had no successor in its tier and the tier is
    /// not yet cleared. The current objective was left on the completed one.
    TierExhausted { tier: u8, last: ObjectiveId },
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised while assembling an objective tree.
#[derive(Debug, thiserror::Error)]
pub enum ObjectiveError {
    #[error("duplicate objective id: {0}")]
    DuplicateId(ObjectiveId),

    #[error("objective {id} has tier {tier}, expected 1 to 6")]
    InvalidTier { id: ObjectiveId, tier: u8 },

    #[error("objectives {first} and {second} share tier {tier} order {order}")]
    DuplicateOrder {
        first: ObjectiveId,
        second: ObjectiveId,
        tier: u8,
        order: u32,
    },

    #[error("tier {tier} orders are not contiguous: missing order {missing}")]
    OrderGap { tier: u8, missing: u32 },

    #[error("tier {tier} defines {count} objectives, more than the {per_tier} per tier")]
    TierOverflow { tier: u8, count: u32, per_tier: u32 },

    #[error("objectives per tier must be at least 1")]
    ZeroPerTier,
}

// ---------------------------------------------------------------------------
// ObjectiveTree
// ---------------------------------------------------------------------------

/// The objective state machine: definitions plus the player's progress.
#[derive(Debug, Clone)]
pub struct ObjectiveTree {
    /// Sorted by `(tier, order)`.
    objectives: Vec<Objective>,
    by_id: HashMap<ObjectiveId, usize>,
    by_slot: HashMap<(u8, u32), usize>,
    per_tier: u32,
    progress: Progress,
    completed: HashSet<ObjectiveId>,
    events: Vec<ObjectiveEvent>,
}

impl ObjectiveTree {
    /// Build a tree with fresh progress.
    ///
    /// Rejects duplicate ids, tiers outside 1..=6, repeated or missing orders
    /// within a tier, and tiers holding more than `per_tier` objectives.
    pub fn new(mut objectives: Vec<Objective>, per_tier: u32) -> Result<Self, ObjectiveError> {
        if per_tier == 0 {
            return Err(ObjectiveError::ZeroPerTier);
        }
        objectives.sort_by_key(|o| (o.tier, o.order));

        let mut by_id = HashMap::with_capacity(objectives.len());
        let mut by_slot: HashMap<(u8, u32), usize> = HashMap::with_capacity(objectives.len());
        for (i, obj) in objectives.iter().enumerate() {
            if !(1..=MAX_TIER).contains(&obj.tier) {
                return Err(ObjectiveError::InvalidTier {
                    id: obj.id.clone(),
                    tier: obj.tier,
                });
            }
            if by_id.insert(obj.id.clone(), i).is_some() {
                return Err(ObjectiveError::DuplicateId(obj.id.clone()));
            }
            if let Some(&prev) = by_slot.get(&(obj.tier, obj.order)) {
                return Err(ObjectiveError::DuplicateOrder {
                    first: objectives[prev].id.clone(),
                    second: obj.id.clone(),
                    tier: obj.tier,
                    order: obj.order,
                });
            }
            by_slot.insert((obj.tier, obj.order), i);
        }

        for tier in 1..=MAX_TIER {
            let count = objectives.iter().filter(|o| o.tier == tier).count() as u32;
            if count > per_tier {
                return Err(ObjectiveError::TierOverflow {
                    tier,
                    count,
                    per_tier,
                });
            }
            if let Some(missing) = (1..=count).find(|o| !by_slot.contains_key(&(tier, *o))) {
                return Err(ObjectiveError::OrderGap { tier, missing });
            }
        }

        Ok(Self {
            objectives,
            by_id,
            by_slot,
            per_tier,
            progress: Progress::initial(per_tier),
            completed: HashSet::new(),
            events: Vec::new(),
        })
    }

    // -- Query API --

    pub fn objective(&self, id: &ObjectiveId) -> Option<&Objective> {
        self.by_id.get(id).map(|&i| &self.objectives[i])
    }

    /// All objectives, sorted by tier then order.
    pub fn objectives(&self) -> &[Objective] {
        &self.objectives
    }

    pub fn objective_count(&self) -> usize {
        self.objectives.len()
    }

    pub fn per_tier(&self) -> u32 {
        self.per_tier
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    pub fn current_tier(&self) -> u8 {
        self.progress.current_tier
    }

    pub fn is_completed(&self, id: &ObjectiveId) -> bool {
        self.completed.contains(id)
    }

    /// Whether the player may attempt `objective` right now.
    ///
    /// The first objective is always open. In the current tier an objective
    /// opens once its predecessor is done; earlier tiers are fully open and
    /// later tiers fully closed.
    pub fn is_unlocked(&self, objective: &Objective) -> bool {
        if objective.id.is_first() {
            return true;
        }
        let current = self.progress.current_tier;
        if objective.tier == current {
            return match self.slot(objective.tier, objective.order.wrapping_sub(1)) {
                Some(prev) => self.completed.contains(&prev.id),
                None => true,
            };
        }
        objective.tier < current
    }

    pub fn status(&self, objective: &Objective) -> ObjectiveStatus {
        if self.completed.contains(&objective.id) {
            ObjectiveStatus::Completed
        } else if self.is_unlocked(objective) {
            ObjectiveStatus::Unlocked
        } else {
            ObjectiveStatus::Locked
        }
    }

    /// The selected objective, if it is defined.
    pub fn current_objective(&self) -> Option<&Objective> {
        self.progress
            .current_objective_id
            .as_ref()
            .and_then(|id| self.objective(id))
    }

    /// Objectives in tiers up to and including the current one.
    pub fn available_objectives(&self) -> impl Iterator<Item = &Objective> {
        let current = self.progress.current_tier;
        self.objectives.iter().filter(move |o| o.tier <= current)
    }

    /// Available objectives grouped by tier. Every tier up to the current
    /// one has an entry, even if it defines no objectives.
    pub fn objectives_by_tier(&self) -> BTreeMap<u8, Vec<&Objective>> {
        let mut grouped: BTreeMap<u8, Vec<&Objective>> =
            (1..=self.progress.current_tier).map(|t| (t, Vec::new())).collect();
        for obj in self.available_objectives() {
            grouped.entry(obj.tier).or_default().push(obj);
        }
        grouped
    }

    pub fn stats(&self) -> ProgressStats {
        let total_completed = self.progress.completed_objective_ids.len();
        let total_available = self.available_objectives().count();
        let percentage = if total_available > 0 {
            (total_completed as f64 / total_available as f64 * 100.0).round() as u32
        } else {
            0
        };
        ProgressStats {
            total_completed,
            total_available,
            percentage,
            current_tier: self.progress.current_tier,
            current_objective: self.current_objective().map(|o| o.id.clone()),
        }
    }

    // -- Progress actions --

    /// Make `id` the current objective. Returns false, changing nothing, if
    /// the objective is unknown or still locked.
    pub fn select_objective(&mut self, id: &ObjectiveId) -> bool {
        let Some(obj) = self.objective(id) else {
            return false;
        };
        if !self.is_unlocked(obj) {
            tracing::debug!(target: "lab.objective", objective = %id, "select refused: locked");
            return false;
        }
        self.progress.current_objective_id = Some(id.clone());
        self.events
            .push(ObjectiveEvent::ObjectiveSelected { id: id.clone() });
        true
    }

    /// Record `id` as completed and move the current objective forward.
    ///
    /// Returns false for unknown or already-completed objectives. Clearing a
    /// tier below [`MAX_TIER`] opens the next tier and selects its first
    /// objective; otherwise the next objective in the same tier is selected
    /// when one exists.
    pub fn complete_objective(&mut self, id: &ObjectiveId) -> bool {
        let Some(obj) = self.objective(id) else {
            return false;
        };
        if self.completed.contains(id) {
            return false;
        }
        let (tier, order) = (obj.tier, obj.order);

        self.completed.insert(id.clone());
        self.progress.completed_objective_ids.push(id.clone());
        let per_tier = self.per_tier;
        let counter = self
            .progress
            .tier_progress
            .entry(tier)
            .or_insert(TierProgress {
                completed: 0,
                total: per_tier,
            });
        counter.completed += 1;
        let cleared = counter.completed >= counter.total;

        self.events.push(ObjectiveEvent::ObjectiveCompleted {
            id: id.clone(),
            tier,
        });
        tracing::info!(target: "lab.objective", objective = %id, tier, order, "objective completed");

        let from = self.progress.current_tier;
        if cleared && tier < MAX_TIER && tier + 1 > from {
            let to = tier + 1;
            self.progress.current_tier = to;
            let first = self
                .slot(to, 1)
                .map(|o| o.id.clone())
                .unwrap_or_else(|| ObjectiveId::for_slot(to, 1));
            self.progress.current_objective_id = Some(first);
            self.events.push(ObjectiveEvent::TierAdvanced { from, to });
            tracing::info!(target: "lab.objective", from, to, "tier advanced");
        } else if let Some(next) = self.slot(tier, order + 1) {
            self.progress.current_objective_id = Some(next.id.clone());
        } else if !cleared {
            self.events.push(ObjectiveEvent::TierExhausted {
                tier,
                last: id.clone(),
            });
            tracing::warn!(
                target: "lab.objective",
                tier,
                objective = %id,
                "no further objective defined in tier"
            );
        }

        true
    }

    /// Discard all progress.
    pub fn reset(&mut self) {
        self.progress = Progress::initial(self.per_tier);
        self.completed.clear();
        self.events.clear();
    }

    /// Adopt a loaded progress record, repairing it against the defined
    /// objectives.
    ///
    /// Unknown and repeated completed ids are dropped, tier counters are
    /// recounted from the surviving ids, the tier is clamped to 1..=6 and a
    /// current objective that no longer exists or is still locked is cleared.
    pub fn restore(&mut self, progress: Progress) {
        let loaded = progress.completed_objective_ids.len();
        let mut completed = HashSet::new();
        let mut ids = Vec::with_capacity(progress.completed_objective_ids.len());
        for id in progress.completed_objective_ids {
            if self.by_id.contains_key(&id) && completed.insert(id.clone()) {
                ids.push(id);
            }
        }

        let mut repaired = Progress::initial(self.per_tier);
        for id in &ids {
            if let Some(obj) = self.objective(id)
                && let Some(counter) = repaired.tier_progress.get_mut(&obj.tier)
            {
                counter.completed += 1;
            }
        }
        repaired.current_tier = progress.current_tier.clamp(1, MAX_TIER);
        let loaded_current = progress.current_objective_id;

        let dropped = loaded - ids.len();
        if repaired.current_tier != progress.current_tier || dropped > 0 {
            tracing::warn!(
                target: "lab.objective",
                loaded_tier = progress.current_tier,
                tier = repaired.current_tier,
                dropped,
                "progress record repaired on load"
            );
        }

        repaired.completed_objective_ids = ids;
        repaired.current_objective_id = None;
        self.progress = repaired;
        self.completed = completed;
        self.events.clear();

        // Locks depend on the repaired record, so the current objective is
        // checked last.
        self.progress.current_objective_id = loaded_current
            .filter(|id| self.objective(id).is_some_and(|obj| self.is_unlocked(obj)));
    }

    // -- Event API --

    /// Drain all pending events.
    pub fn drain_events(&mut self) -> Vec<ObjectiveEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn pending_events(&self) -> &[ObjectiveEvent] {
        &self.events
    }

    // -- Internal helpers --

    fn slot(&self, tier: u8, order: u32) -> Option<&Objective> {
        self.by_slot
            .get(&(tier, order))
            .map(|&i| &self.objectives[i])
    }
}

// ===========================================================================
// Tests
// ===========================================================================
