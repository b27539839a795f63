pub mod builtin;
pub mod loader;
pub mod schema;

pub use builtin::{builtin_content, default_objectives};
pub use loader::{ContentPack, DataLoadError, load_content};
