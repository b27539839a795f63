//! Reaction Lab -- a headless chemistry sandbox session.
//!
//! [`Lab`] ties the pieces together: content from `reaction-lab-data`, the
//! workbench and reaction matcher from `reaction-lab-core`, objective
//! progression from `reaction-lab-objectives` and persistence from
//! `reaction-lab-store`.
//!
//! ```rust,ignore
//! let mut lab = Lab::open(&LabConfig::load(Path::new("lab.toml"))?)?;
//! for id in ["H", "H", "O"] {
//!     lab.add_element(&ElementId::from(id), Position::new(200.0, 200.0))?;
//! }
//! if let Some(report) = lab.attempt_reaction(None) {
//!     println!("{}", report.reaction.equation);
//! }
//! ```
//!
//! Libraries in this workspace log through `tracing` under `lab.*` targets
//! and never install a subscriber.

pub mod config;
pub mod error;
pub mod event;
pub mod lab;
pub mod view;

pub use config::{ConfigError, LabConfig};
pub use error::LabError;
pub use event::LabEvent;
pub use lab::Lab;
pub use view::{ObjectiveCheck, ObjectiveView, ReactionReport, TierView};
