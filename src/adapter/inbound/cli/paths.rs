//! Path utilities for modelplane.
//!
//! Operator files live under `~/.modelplane/`:
//! - `~/.modelplane/config.toml` - main configuration

use std::path::PathBuf;

/// Returns the modelplane home directory (`~/.modelplane/`).
pub fn home_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".modelplane")
}

/// Returns the default config file path (`~/.modelplane/config.toml`).
pub fn default_config() -> PathBuf {
    home_dir().join("config.toml")
}
