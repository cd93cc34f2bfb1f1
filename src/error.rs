//! Error types for the `try_*` family of operations and configuration loading.
//!
//! The plain operations (`emplace_component`, `destroy_entity`, ...) report failure
//! with `bool`/`Option` returns. These types exist for callers who want to know *why*.

use crate::Entity;
use thiserror::Error;

/// Errors returned by the fallible entity and component operations.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EcsError {
    /// The entity is not alive (never created, destroyed, or a stale handle to a reused slot).
    #[error("entity {0} is not alive")]
    DeadEntity(Entity),

    /// The entity already has a component of this type.
    #[error("entity {entity} already has component {component}")]
    DuplicateComponent {
        /// The entity the component was emplaced on.
        entity: Entity,
        /// Type name of the component.
        component: &'static str,
    },

    /// The entity has no component of this type.
    #[error("entity {entity} has no component {component}")]
    MissingComponent {
        /// The queried entity.
        entity: Entity,
        /// Type name of the component.
        component: &'static str,
    },

    /// Every index of the entity handle is in use or retired.
    #[error("entity index space exhausted ({capacity} slots)")]
    OutOfEntities {
        /// Number of slots the index space provides.
        capacity: usize,
    },
}

/// Errors produced while loading an [`EcsConfig`](crate::EcsConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid {field}: {value} exceeds the entity index space")]
    InvalidCapacity {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: usize,
    },
}
