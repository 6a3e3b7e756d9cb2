//! Inbound operator accessor for CLI handlers.

use std::path::Path;
use std::sync::OnceLock;

use super::paths;
use crate::error::{ConfigError, Result};
use crate::port::inbound::operator::port::OperatorPort;

static OPERATOR: OnceLock<Box<dyn OperatorPort>> = OnceLock::new();

/// Installs the operator implementation used by CLI handlers.
pub fn install(operator: Box<dyn OperatorPort>) -> std::result::Result<(), Box<dyn OperatorPort>> {
    OPERATOR.set(operator)
}

/// Returns the configured operator capability surface for CLI handlers.
pub fn operator() -> Result<&'static dyn OperatorPort> {
    OPERATOR.get().map(|operator| &**operator).ok_or_else(|| {
        ConfigError::Other("CLI operator not installed; call cli::operator::install".into()).into()
    })
}

/// Load config TOML for operator-facing use-cases.
///
/// An explicit path must exist. Without one, `~/.modelplane/config.toml` is
/// used when present and built-in defaults otherwise.
pub fn read_config_toml(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => Ok(std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?),
        None => {
            let default = paths::default_config();
            if default.is_file() {
                Ok(std::fs::read_to_string(default).map_err(ConfigError::ReadFile)?)
            } else {
                Ok(String::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_missing_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(read_config_toml(Some(&missing)).is_err());
    }

    #[test]
    fn explicit_path_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("modelplane.toml");
        std::fs::write(&path, "models_dir = \"/srv\"\n").unwrap();
        assert_eq!(
            read_config_toml(Some(&path)).unwrap(),
            "models_dir = \"/srv\"\n"
        );
    }
}
