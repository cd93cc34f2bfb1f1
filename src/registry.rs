use crate::HashMap;
use log::debug;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::any::{self, TypeId};
use std::collections::hash_map;
use std::fmt;
use std::num::NonZeroU32;

/// A small integer identifying a component type.
///
/// Identifiers start at 1 and increase monotonically in registration order.
/// They are only meaningful inside the running process and must never be persisted.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ComponentId(NonZeroU32);

impl ComponentId {
    /// Returns the raw id.
    #[inline]
    pub const fn get(self) -> u32 {
        self.0.get()
    }
}

impl fmt::Debug for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentId({})", self.0)
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

static GLOBAL: Lazy<Mutex<TypeRegistry>> = Lazy::new(|| Mutex::new(TypeRegistry::new()));

/// Assigns a [`ComponentId`] to every distinct component type.
///
/// A registry is a plain value, so it can be filled eagerly at startup and handed to an
/// [`Ecs`](crate::Ecs). Types that were not registered up front are assigned an id on first use.
#[derive(Default)]
pub struct TypeRegistry {
    ids: HashMap<TypeId, ComponentId>,
    names: Vec<&'static str>,
}

impl TypeRegistry {
    /// Creates an empty `TypeRegistry`.
    pub fn new() -> TypeRegistry {
        TypeRegistry::default()
    }

    /// Returns the id of `T`, assigning the next free one if `T` has not been seen before.
    pub fn register<T: 'static>(&mut self) -> ComponentId {
        match self.ids.entry(TypeId::of::<T>()) {
            hash_map::Entry::Occupied(e) => *e.get(),
            hash_map::Entry::Vacant(e) => {
                // `names.len() + 1` never reaches zero, ids start at 1.
                let raw = u32::try_from(self.names.len() + 1)
                    .ok()
                    .and_then(NonZeroU32::new)
                    .unwrap_or_else(|| out_of_ids());
                let id = ComponentId(raw);

                self.names.push(any::type_name::<T>());
                debug!("registered component {} as {}", any::type_name::<T>(), id);

                *e.insert(id)
            }
        }
    }

    /// Returns the id of `T` if it is registered.
    pub fn get<T: 'static>(&self) -> Option<ComponentId> {
        self.id_of(TypeId::of::<T>())
    }

    /// Returns the id registered for the type with the given `TypeId`.
    pub fn id_of(&self, ty: TypeId) -> Option<ComponentId> {
        self.ids.get(&ty).copied()
    }

    /// Returns the type name the id was registered with.
    pub fn name(&self, id: ComponentId) -> Option<&'static str> {
        self.names.get(id.get() as usize - 1).copied()
    }

    /// Returns the number of registered types.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Returns an iterator over all registered types in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (ComponentId, &'static str)> + '_ {
        self.names.iter().enumerate().filter_map(|(i, name)| {
            let raw = NonZeroU32::new(u32::try_from(i + 1).ok()?)?;
            Some((ComponentId(raw), *name))
        })
    }

    /// Returns the process-wide id of `T`.
    ///
    /// The first call for a given type assigns it; every later call returns the same id
    /// for the lifetime of the process. Safe to call from any thread.
    pub fn global_id<T: 'static>() -> ComponentId {
        GLOBAL.lock().register::<T>()
    }
}

#[cold]
#[inline(never)]
fn out_of_ids() -> ! {
    panic!("Out of component ids. A maximum number of types ({}) is reached.", u32::MAX);
}

#[cfg(test)]
mod tests {
    use super::*;

    struct A;
    struct B;

    #[test]
    fn ids_are_stable_and_increasing() {
        let mut registry = TypeRegistry::new();
        assert!(registry.get::<A>().is_none());

        let a = registry.register::<A>();
        let b = registry.register::<B>();
        assert_eq!(a.get(), 1);
        assert_eq!(b.get(), 2);
        assert_eq!(registry.register::<A>(), a);
        assert_eq!(registry.get::<B>(), Some(b));
        assert_eq!(registry.len(), 2);
        assert!(registry.name(a).unwrap().ends_with("A"));
        assert_eq!(registry.iter().map(|(id, _)| id).collect::<Vec<_>>(), vec![a, b]);
    }

    #[test]
    fn global_ids_are_shared_across_threads() {
        struct OnlyHere;

        let here = TypeRegistry::global_id::<OnlyHere>();
        let there = std::thread::spawn(TypeRegistry::global_id::<OnlyHere>)
            .join()
            .unwrap();
        assert_eq!(here, there);
        assert_ne!(TypeRegistry::global_id::<u64>(), here);
    }
}
