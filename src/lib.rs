//! Sparse-set storage for entity component data.
//!
//! An entity is an opaque generational handle for an object.
//! Each entity can have at most one component of every type associated with it.
//! Components of the same type are stored contiguously in a [`SparseSet`], which maps
//! entity indices to dense positions, so insertion, removal and lookup are O(1)
//! and iterating over all components of a type touches a single packed array.
//!
//! Entity slots are recycled in LIFO order with an incremented version,
//! so a handle to a destroyed entity never compares equal to the slot's new occupant.
//!
//! # Examples
//!
//! ```
//! use sparse_ecs::Ecs;
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Position {
//!     x: f32,
//!     y: f32,
//!     z: f32,
//! }
//!
//! struct Name(String);
//!
//! fn main() {
//!     let mut ecs = Ecs::new();
//!
//!     let player = ecs.create_entity();
//!     let camera = ecs.create_entity();
//!
//!     ecs.emplace_component(player, Position { x: 1.0, y: 0.0, z: 0.0 });
//!     ecs.emplace_component(player, Name("player".to_string()));
//!     ecs.emplace_component(camera, Position { x: 0.0, y: 5.0, z: -10.0 });
//!
//!     // The second component of the same type is rejected.
//!     assert!(!ecs.emplace_component(player, Position { x: 9.0, y: 9.0, z: 9.0 }));
//!
//!     ecs.get_component_mut::<Position>(camera).y += 1.0;
//!
//!     let positions = ecs.get_storage::<Position>().unwrap();
//!     for (entity, position) in positions {
//!         println!("{} is at {:?}", entity, position);
//!     }
//!
//!     ecs.destroy_entity(player);
//!     assert!(!ecs.has_component::<Name>(player));
//!     assert_eq!(ecs.get_storage::<Position>().unwrap().len(), 1);
//!
//!     // The slot of `player` is reused with a new version.
//!     let enemy = ecs.create_entity();
//!     assert_eq!(enemy.index(), player.index());
//!     assert_ne!(enemy, player);
//! }
//! ```


mod config;
mod ecs;
mod entities;
mod entity;
mod error;
mod registry;
mod sparse_set;

pub use config::EcsConfig;
pub use config::VersionOverflow;
pub use ecs::store::ComponentStore;
pub use ecs::ComponentIds;
pub use ecs::Ecs;
pub use ecs::EcsBuilder;
pub use ecs::StorageMut;
pub use entities::EntityAllocator;
pub use entity::Entity;
pub use entity::EntityIndex;
pub use entity::EntityVersion;
pub use error::ConfigError;
pub use error::EcsError;
pub use registry::ComponentId;
pub use registry::TypeRegistry;
pub use sparse_set::Component;
pub use sparse_set::SparseSet;

pub(crate) type HashMap<K, V> = std::collections::HashMap<K, V, ahash::RandomState>;
