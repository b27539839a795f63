use crate::config::ConfigError;
use reaction_lab_core::id::ElementId;
use reaction_lab_data::DataLoadError;
use reaction_lab_objectives::ObjectiveError;

/// Errors raised by a [`crate::Lab`].
#[derive(Debug, thiserror::Error)]
pub enum LabError {
    /// The element exists but has not been discovered yet.
    #[error("element {0} is still locked")]
    Locked(ElementId),

    #[error("unknown element: {0}")]
    UnknownElement(ElementId),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Content(#[from] DataLoadError),

    #[error(transparent)]
    Objectives(#[from] ObjectiveError),
}
