use crate::sparse_set::{Component, SparseSet};
use crate::Entity;
use std::any::{self, Any};

/// Type-erased view of a component storage.
///
/// [`Ecs`](crate::Ecs) keeps one boxed store per component type and only needs these operations
/// to manage entity lifetimes. Typed access goes through [`as_any`](Self::as_any) downcasts.
pub trait ComponentStore: Any {
    /// Name of the stored component type.
    fn type_name(&self) -> &'static str;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn contains_entity(&self, entity: Entity) -> bool;

    /// Drops the component of `entity`. Returns `true` if there was one.
    fn remove_entity(&mut self, entity: Entity) -> bool;

    fn clear(&mut self);

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component> ComponentStore for SparseSet<T> {
    fn type_name(&self) -> &'static str {
        any::type_name::<T>()
    }

    fn len(&self) -> usize {
        SparseSet::len(self)
    }

    fn contains_entity(&self, entity: Entity) -> bool {
        self.contains(entity)
    }

    fn remove_entity(&mut self, entity: Entity) -> bool {
        self.remove(entity).is_some()
    }

    fn clear(&mut self) {
        SparseSet::clear(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Downcasts a store to the concrete set of `T`.
/// Panics if the store holds another type: ids are bound to exactly one type.
pub(crate) fn downcast_ref<T: Component>(store: &dyn ComponentStore) -> &SparseSet<T> {
    match store.as_any().downcast_ref::<SparseSet<T>>() {
        Some(set) => set,
        None => type_mismatch::<T>(store.type_name()),
    }
}

pub(crate) fn downcast_mut<T: Component>(store: &mut dyn ComponentStore) -> &mut SparseSet<T> {
    let stored = store.type_name();
    match store.as_any_mut().downcast_mut::<SparseSet<T>>() {
        Some(set) => set,
        None => type_mismatch::<T>(stored),
    }
}

#[cold]
#[inline(never)]
fn type_mismatch<T>(stored: &str) -> ! {
    panic!(
        "component store type mismatch: requested {}, store holds {}",
        any::type_name::<T>(),
        stored
    );
}
