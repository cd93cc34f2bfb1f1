use crate::error::ConfigError;
use crate::Entity;
use serde::Deserialize;

/// What happens to an entity slot whose version counter reached [`Entity::MAX_VERSION`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionOverflow {
    /// The slot is never reused again. Stale handles can never alias a new entity.
    #[default]
    Retire,
    /// The version wraps to zero. After 256 reuses of one slot an old handle
    /// compares equal to the new occupant.
    Wrap,
}

/// Tuning knobs of an [`Ecs`](crate::Ecs).
///
/// # Examples
/// ```
/// use sparse_ecs::{EcsConfig, VersionOverflow};
///
/// let config = EcsConfig::from_toml_str(r#"
///     initial_entity_capacity = 4096
///     version_overflow = "wrap"
/// "#).unwrap();
///
/// assert_eq!(config.initial_entity_capacity, 4096);
/// assert_eq!(config.initial_component_capacity, 0);
/// assert_eq!(config.version_overflow, VersionOverflow::Wrap);
/// ```
#[derive(Debug, Clone, Eq, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EcsConfig {
    /// Number of entity slots reserved up front.
    pub initial_entity_capacity: usize,
    /// Number of components reserved in every newly created storage.
    pub initial_component_capacity: usize,
    pub version_overflow: VersionOverflow,
}

impl Default for EcsConfig {
    fn default() -> Self {
        EcsConfig {
            initial_entity_capacity: 0,
            initial_component_capacity: 0,
            version_overflow: VersionOverflow::Retire,
        }
    }
}

impl EcsConfig {
    /// Parses a config from TOML text. Missing keys take their default values.
    pub fn from_toml_str(text: &str) -> Result<EcsConfig, ConfigError> {
        let config: EcsConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the capacities fit into the entity index space.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let limit = Entity::MAX_INDEX as usize + 1;

        if self.initial_entity_capacity > limit {
            return Err(ConfigError::InvalidCapacity {
                field: "initial_entity_capacity",
                value: self.initial_entity_capacity,
            });
        }
        if self.initial_component_capacity > limit {
            return Err(ConfigError::InvalidCapacity {
                field: "initial_component_capacity",
                value: self.initial_component_capacity,
            });
        }
        Ok(())
    }
}
