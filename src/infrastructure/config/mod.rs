//! Infrastructure configuration modules.

pub mod containers;
pub mod github;
pub mod harbor;
pub mod logging;
pub mod profile;
pub mod settings;
pub mod watcher;
