use reaction_lab_core::catalog::Condition;
use reaction_lab_core::id::{ElementId, ReactionId};
use reaction_lab_objectives::ObjectiveEvent;

/// Events emitted by a [`crate::Lab`], drained with
/// [`crate::Lab::drain_events`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabEvent {
    /// The workbench matched a reaction.
    ReactionSucceeded {
        reaction: ReactionId,
        output: ElementId,
        newly_unlocked: bool,
    },

    /// The workbench did not match any reaction under `condition`.
    ReactionFailed { condition: Option<Condition> },

    /// Forwarded from the objective tree.
    Objective(ObjectiveEvent),

    /// Unlocks, progress and the workbench were wiped.
    ProgressReset,
}
