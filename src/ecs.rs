pub mod store;

use crate::config::EcsConfig;
use crate::entities::{self, EntityAllocator};
use crate::error::EcsError;
use crate::registry::{ComponentId, TypeRegistry};
use crate::sparse_set::{self, Component, SparseSet};
use crate::{Entity, HashMap};
use log::debug;
use smallvec::SmallVec;
use std::any;
use std::ops::Deref;
use store::ComponentStore;

/// Component ids attached to one entity. Most entities carry only a handful of components.
pub type ComponentIds = SmallVec<[ComponentId; 8]>;

/// A container of entities and their components.
///
/// Each component type lives in its own [`SparseSet`], created on first use.
pub struct Ecs {
    entities: EntityAllocator,
    registry: TypeRegistry,
    stores: HashMap<ComponentId, Box<dyn ComponentStore>>,
    component_capacity: usize,
}

impl Ecs {
    /// Creates an empty `Ecs` with the default configuration.
    pub fn new() -> Ecs {
        Ecs::with_config(EcsConfig::default())
    }

    /// Creates an empty `Ecs` with the given configuration.
    pub fn with_config(config: EcsConfig) -> Ecs {
        Ecs::with_registry(config, TypeRegistry::new())
    }

    /// Creates an `Ecs` using an already populated type registry.
    pub fn with_registry(config: EcsConfig, registry: TypeRegistry) -> Ecs {
        debug!(
            "creating ecs: {} entity slots, {} component slots, {} registered types",
            config.initial_entity_capacity,
            config.initial_component_capacity,
            registry.len()
        );
        Ecs {
            entities: EntityAllocator::with_capacity(
                config.initial_entity_capacity,
                config.version_overflow,
            ),
            registry,
            stores: Default::default(),
            component_capacity: config
                .initial_component_capacity
                .min(EntityAllocator::MAX_ENTITIES),
        }
    }

    /// Returns a builder for registering component types up front.
    pub fn builder() -> EcsBuilder {
        EcsBuilder::default()
    }

    /// Creates a new entity and returns its identifier.
    /// Panics if all [`EntityAllocator::MAX_ENTITIES`] indices are in use.
    pub fn create_entity(&mut self) -> Entity {
        self.entities.create()
    }

    /// Creates a new entity, or returns [`EcsError::OutOfEntities`] if no index is left.
    pub fn try_create_entity(&mut self) -> Result<Entity, EcsError> {
        self.entities.try_create()
    }

    /// Destroys an entity together with all its components.
    /// Returns `true` if the entity was alive.
    pub fn destroy_entity(&mut self, entity: Entity) -> bool {
        if !self.entities.contains(entity) {
            return false;
        }
        for store in self.stores.values_mut() {
            store.remove_entity(entity);
        }
        self.entities.destroy(entity)
    }

    /// Returns `true` if the entity is alive.
    pub fn is_entity_created(&self, entity: Entity) -> bool {
        self.entities.contains(entity)
    }

    /// Returns the number of alive entities.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Returns an iterator over all alive entities.
    pub fn entities(&self) -> entities::Iter<'_> {
        self.entities.iter()
    }

    /// Registers `T` ahead of its first use and returns its id.
    pub fn register<T: Component>(&mut self) -> ComponentId {
        self.registry.register::<T>()
    }

    /// Returns the registry of component types known to this `Ecs`.
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    fn store<T: Component>(&self) -> Option<&SparseSet<T>> {
        let id = self.registry.get::<T>()?;
        let boxed = self.stores.get(&id)?;
        Some(store::downcast_ref(&**boxed))
    }

    fn store_mut<T: Component>(&mut self) -> Option<&mut SparseSet<T>> {
        let id = self.registry.get::<T>()?;
        let boxed = self.stores.get_mut(&id)?;
        Some(store::downcast_mut(&mut **boxed))
    }

    fn get_or_create_store<T: Component>(&mut self) -> &mut SparseSet<T> {
        let id = self.registry.register::<T>();
        let capacity = self.component_capacity;

        let boxed = self.stores.entry(id).or_insert_with(|| {
            debug!("created storage {} for {}", id, any::type_name::<T>());
            let set: Box<dyn ComponentStore> = Box::new(SparseSet::<T>::with_capacity(capacity));
            set
        });
        store::downcast_mut(&mut **boxed)
    }

    /// Adds `component` to `entity`.
    ///
    /// Returns `false` without changing anything if the entity is not alive
    /// or already has a component of type `T`.
    pub fn emplace_component<T: Component>(&mut self, entity: Entity, component: T) -> bool {
        self.emplace_component_with(entity, || component)
    }

    /// Same as [`emplace_component`](Self::emplace_component), but the component is only
    /// constructed when it is actually added.
    pub fn emplace_component_with<T: Component>(
        &mut self,
        entity: Entity,
        f: impl FnOnce() -> T,
    ) -> bool {
        if !self.entities.contains(entity) {
            return false;
        }
        self.get_or_create_store::<T>().insert_with(entity, f)
    }

    /// Adds `component` to `entity`, reporting why it could not be added.
    pub fn try_emplace_component<T: Component>(
        &mut self,
        entity: Entity,
        component: T,
    ) -> Result<(), EcsError> {
        if !self.entities.contains(entity) {
            return Err(EcsError::DeadEntity(entity));
        }
        if self.get_or_create_store::<T>().insert(entity, component) {
            Ok(())
        } else {
            Err(EcsError::DuplicateComponent {
                entity,
                component: any::type_name::<T>(),
            })
        }
    }

    /// Returns `true` if the entity is alive and has a component of type `T`.
    pub fn has_component<T: Component>(&self, entity: Entity) -> bool {
        self.entities.contains(entity)
            && self.store::<T>().map_or(false, |set| set.contains(entity))
    }

    /// Returns a reference to the component `T` of the specified entity.
    ///
    /// Only the storage is consulted, not the allocator: a stale handle is still
    /// rejected by the storage's own version check.
    pub fn try_get_component<T: Component>(&self, entity: Entity) -> Option<&T> {
        self.store::<T>()?.get(entity)
    }

    /// Returns a mutable reference to the component `T` of the specified entity.
    pub fn try_get_component_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        self.store_mut::<T>()?.get_mut(entity)
    }

    /// Returns a reference to the component `T` of an alive entity, reporting why
    /// the component is unavailable otherwise.
    pub fn component<T: Component>(&self, entity: Entity) -> Result<&T, EcsError> {
        if !self.entities.contains(entity) {
            return Err(EcsError::DeadEntity(entity));
        }
        self.try_get_component(entity)
            .ok_or(EcsError::MissingComponent {
                entity,
                component: any::type_name::<T>(),
            })
    }

    /// Returns a reference to the component `T` of the specified entity.
    /// Panics if the entity does not have it.
    pub fn get_component<T: Component>(&self, entity: Entity) -> &T {
        match self.try_get_component(entity) {
            Some(component) => component,
            None => missing_component::<T>(entity),
        }
    }

    /// Returns a mutable reference to the component `T` of the specified entity.
    /// Panics if the entity does not have it.
    pub fn get_component_mut<T: Component>(&mut self, entity: Entity) -> &mut T {
        match self.try_get_component_mut(entity) {
            Some(component) => component,
            None => missing_component::<T>(entity),
        }
    }

    /// Removes the component `T` from the entity and returns it.
    pub fn remove_component<T: Component>(&mut self, entity: Entity) -> Option<T> {
        self.store_mut::<T>()?.remove(entity)
    }

    /// Returns the storage of `T` for bulk access.
    /// `None` if no component of type `T` was ever added.
    pub fn get_storage<T: Component>(&self) -> Option<&SparseSet<T>> {
        self.store::<T>()
    }

    /// Returns the storage of `T` for bulk modification of components.
    /// Components cannot be added or removed through it.
    pub fn get_storage_mut<T: Component>(&mut self) -> Option<StorageMut<'_, T>> {
        self.store_mut::<T>().map(|set| StorageMut { set })
    }

    /// Returns the ids of all components attached to the entity, in ascending order.
    pub fn component_ids(&self, entity: Entity) -> ComponentIds {
        let mut ids: ComponentIds = self
            .stores
            .iter()
            .filter(|(_, store)| store.contains_entity(entity))
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Returns the type name of a registered component id.
    pub fn component_name(&self, id: ComponentId) -> Option<&'static str> {
        self.registry.name(id)
    }

    /// Returns the number of component storages created so far.
    pub fn storage_count(&self) -> usize {
        self.stores.len()
    }

    /// Destroys all entities and their components.
    pub fn clear(&mut self) {
        for store in self.stores.values_mut() {
            store.clear();
        }
        self.entities.clear();
    }
}

impl Default for Ecs {
    fn default() -> Self {
        Ecs::new()
    }
}

#[cold]
#[inline(never)]
fn missing_component<T>(entity: Entity) -> ! {
    panic!(
        "entity {:?} has no component {}",
        entity,
        any::type_name::<T>()
    );
}

/// Mutable access to the components of one storage.
///
/// Derefs to the [`SparseSet`] for read access. Entity membership cannot change
/// while this guard is held.
pub struct StorageMut<'a, T> {
    set: &'a mut SparseSet<T>,
}

impl<'a, T> StorageMut<'a, T> {
    /// Returns a mutable reference to the component of `entity`.
    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        self.set.get_mut(entity)
    }

    /// Returns all components for in-place modification.
    pub fn components_mut(&mut self) -> &mut [T] {
        self.set.components_mut()
    }

    /// Returns an iterator that allows modifying each component.
    pub fn iter_mut(&mut self) -> sparse_set::IterMut<'_, T> {
        self.set.iter_mut()
    }
}

impl<T> Deref for StorageMut<'_, T> {
    type Target = SparseSet<T>;

    fn deref(&self) -> &Self::Target {
        &*self.set
    }
}

impl<'a, T> IntoIterator for StorageMut<'a, T> {
    type Item = (Entity, &'a mut T);
    type IntoIter = sparse_set::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        let set = self.set;
        set.iter_mut()
    }
}

/// Builds an [`Ecs`] with component types registered up front.
///
/// # Examples
/// ```
/// use sparse_ecs::{Ecs, EcsConfig};
///
/// struct Transform;
/// struct Camera;
///
/// let ecs = Ecs::builder()
///     .config(EcsConfig { initial_entity_capacity: 1024, ..Default::default() })
///     .with::<Transform>()
///     .with::<Camera>()
///     .build();
///
/// assert_eq!(ecs.registry().len(), 2);
/// assert!(ecs.get_storage::<Transform>().is_none());
/// ```
#[derive(Default)]
pub struct EcsBuilder {
    config: EcsConfig,
    registry: TypeRegistry,
}

impl EcsBuilder {
    /// Sets the configuration of the built `Ecs`.
    pub fn config(mut self, config: EcsConfig) -> Self {
        self.config = config;
        self
    }

    /// Registers the component type `T`.
    pub fn with<T: Component>(mut self) -> Self {
        self.registry.register::<T>();
        self
    }

    /// Creates the `Ecs` with every registered type.
    pub fn build(self) -> Ecs {
        Ecs::with_registry(self.config, self.registry)
    }
}
