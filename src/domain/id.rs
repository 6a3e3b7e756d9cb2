//! Domain identifier types with proper encapsulation.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Model name - the unique key of a model across every source.
///
/// The inner String is private to ensure all construction goes through
/// the defined constructors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelName(String);

impl ModelName {
    /// Create a new `ModelName` from a string.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the model name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Borrow<str> for ModelName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ModelName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for ModelName {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for ModelName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn model_name_looks_up_by_str() {
        let mut map = HashMap::new();
        map.insert(ModelName::new("fire"), 1);
        assert_eq!(map.get("fire"), Some(&1));
    }

    #[test]
    fn model_name_serializes_as_plain_string() {
        let json = serde_json::to_string(&ModelName::new("fire")).unwrap();
        assert_eq!(json, "\"fire\"");
    }
}
