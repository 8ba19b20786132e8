//! Engine configuration
//!
//! Controls the shape of serialized payloads. Loadable from TOML:
//!
//! ```toml
//! cycle_policy = "identity_only"
//! nested_suffix = "_attributes"
//! include_id = true
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{DaylightError, Result};

/// What `serialize` emits when it reaches a resource already on the
/// current traversal path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CyclePolicy {
    /// Own attributes, no association expansion
    #[default]
    AttributesOnly,
    /// Only `{"id": ...}` (empty object while unpersisted)
    IdentityOnly,
    /// Drop the re-entered resource from its parent's nested key
    ///
    /// A singular slot reassigned to a resource already on the current path
    /// loses its nested key entirely, so that reassignment is not sent even
    /// though the owner reports `is_changed`.
    Omit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub cycle_policy: CyclePolicy,
    /// Suffix appended to association names for nested payload keys
    pub nested_suffix: String,
    /// Emit `id` for persisted resources
    pub include_id: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cycle_policy: CyclePolicy::default(),
            nested_suffix: "_attributes".to_string(),
            include_id: true,
        }
    }
}

impl EngineConfig {
    /// Parse from TOML; missing keys take their defaults
    ///
    /// # Errors
    ///
    /// `InvalidConfig` on malformed TOML, unknown enum values, or an empty
    /// `nested_suffix` (nested keys would collide with attribute names).
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// `InvalidConfig` if `nested_suffix` is empty.
    pub fn validate(&self) -> Result<()> {
        if self.nested_suffix.is_empty() {
            return Err(DaylightError::InvalidConfig {
                message: "nested_suffix must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Payload key for a nested association
    pub fn nested_key(&self, association: &str) -> String {
        format!("{}{}", association, self.nested_suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.cycle_policy, CyclePolicy::AttributesOnly);
        assert_eq!(config.nested_key("children"), "children_attributes");
        assert!(config.include_id);
    }

    #[test]
    fn test_from_toml_partial() {
        let config = EngineConfig::from_toml_str("cycle_policy = \"omit\"").unwrap();
        assert_eq!(config.cycle_policy, CyclePolicy::Omit);
        assert_eq!(config.nested_suffix, "_attributes");
    }

    #[test]
    fn test_from_toml_full() {
        let config = EngineConfig::from_toml_str(
            "cycle_policy = \"identity_only\"\nnested_suffix = \"_nested\"\ninclude_id = false\n",
        )
        .unwrap();
        assert_eq!(config.cycle_policy, CyclePolicy::IdentityOnly);
        assert_eq!(config.nested_key("tags"), "tags_nested");
        assert!(!config.include_id);
    }

    #[test]
    fn test_from_toml_rejects_bad_input() {
        assert!(matches!(
            EngineConfig::from_toml_str("cycle_policy = \"explode\""),
            Err(DaylightError::InvalidConfig { .. })
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("nested_suffix = \"\""),
            Err(DaylightError::InvalidConfig { .. })
        ));
    }
}
