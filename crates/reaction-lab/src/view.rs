//! Read-only snapshots for presentation layers.

use reaction_lab_core::catalog::ReactionDef;
use reaction_lab_core::id::ReactionId;
use reaction_lab_objectives::{Objective, ObjectiveId, ObjectiveStatus, ValidationResult};
use serde::Serialize;

/// One objective with its status relative to current progress.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectiveView {
    pub id: ObjectiveId,
    pub tier: u8,
    pub order: u32,
    pub title: String,
    pub description: String,
    pub reward: String,
    pub requires_bonds: bool,
    pub step_count: usize,
    pub status: ObjectiveStatus,
    pub is_current: bool,
}

impl ObjectiveView {
    pub(crate) fn new(objective: &Objective, status: ObjectiveStatus, is_current: bool) -> Self {
        Self {
            id: objective.id.clone(),
            tier: objective.tier,
            order: objective.order,
            title: objective.title.clone(),
            description: objective.description.clone(),
            reward: objective.reward.clone(),
            requires_bonds: objective.requires_bonds,
            step_count: objective.step_count(),
            status,
            is_current,
        }
    }
}

/// A reached tier and its objectives.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierView {
    pub tier: u8,
    pub completed: u32,
    pub total: u32,
    pub objectives: Vec<ObjectiveView>,
}

/// The outcome of checking the current objective against the workbench.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectiveCheck {
    pub objective: ObjectiveId,
    pub title: String,
    pub reward: String,
    pub result: ValidationResult,
    /// The check completed the objective during this call.
    pub completed_now: bool,
}

/// What a successful [`crate::Lab::attempt_reaction`] did.
#[derive(Debug, Clone, PartialEq)]
pub struct ReactionReport {
    pub reaction: ReactionDef,
    pub newly_unlocked: bool,
    /// `None` when no objective is selected.
    pub objective: Option<ObjectiveCheck>,
}

impl ReactionReport {
    pub fn reaction_id(&self) -> &ReactionId {
        &self.reaction.id
    }
}
