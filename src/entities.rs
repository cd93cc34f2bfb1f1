use crate::config::VersionOverflow;
use crate::entity::{Entity, EntityIndex};
use crate::error::EcsError;
use log::{trace, warn};
use std::{iter, mem, slice};

const DEAD: u32 = u32::MAX;

/// Iterator over alive entities.
pub type Iter<'a> = iter::Copied<slice::Iter<'a, Entity>>;

#[derive(Copy, Clone)]
struct Slot {
    /// Version of the current (or last) occupant.
    version: u8,
    /// Position of the occupant in `reserved`, or `DEAD`.
    position: u32,
}

/// Issues and recycles [`Entity`] handles.
///
/// Destroyed entities are reused in LIFO order, each reuse bumping the slot version.
/// Liveness checks are O(1) through a per-index slot table.
pub struct EntityAllocator {
    reserved: Vec<Entity>,
    free: Vec<Entity>,
    slots: Vec<Slot>,
    overflow: VersionOverflow,
    retired: usize,
    limit: usize,
}

impl EntityAllocator {
    /// Total number of indices an entity handle can address.
    pub const MAX_ENTITIES: usize = Entity::MAX_INDEX as usize + 1;

    /// Creates an empty allocator with the given version overflow policy.
    pub fn new(overflow: VersionOverflow) -> Self {
        Self::with_capacity(0, overflow)
    }

    /// Creates an empty allocator with room for `capacity` entities.
    pub fn with_capacity(capacity: usize, overflow: VersionOverflow) -> Self {
        let capacity = capacity.min(Self::MAX_ENTITIES);
        EntityAllocator {
            reserved: Vec::with_capacity(capacity),
            free: Vec::new(),
            slots: Vec::with_capacity(capacity),
            overflow,
            retired: 0,
            limit: Self::MAX_ENTITIES,
        }
    }

    #[cfg(test)]
    fn with_limit(limit: usize, overflow: VersionOverflow) -> Self {
        EntityAllocator {
            limit,
            ..Self::new(overflow)
        }
    }

    /// Creates a new entity. Panics if the index space is exhausted.
    pub fn create(&mut self) -> Entity {
        #[cold]
        #[inline(never)]
        fn assert_failed(limit: usize) -> ! {
            panic!(
                "Out of slots. A maximum number of entities ({}) is reached.",
                limit
            );
        }

        match self.try_create() {
            Ok(entity) => entity,
            Err(_) => assert_failed(self.limit),
        }
    }

    /// Creates a new entity, reusing the most recently destroyed slot if there is one.
    pub fn try_create(&mut self) -> Result<Entity, EcsError> {
        let entity = if let Some(freed) = self.free.pop() {
            Entity::new(freed.index(), freed.version().wrapping_add(1))
        } else {
            let index = self.slots.len();
            if index >= self.limit {
                return Err(EcsError::OutOfEntities {
                    capacity: self.limit,
                });
            }
            self.slots.push(Slot {
                version: 0,
                position: DEAD,
            });
            Entity::new(index as EntityIndex, 0)
        };

        let slot = &mut self.slots[entity.index() as usize];
        slot.version = entity.version();
        slot.position = self.reserved.len() as u32;
        self.reserved.push(entity);

        trace!("created entity {:?}", entity);
        Ok(entity)
    }

    /// Destroys the entity. Returns `true` if the entity was alive.
    pub fn destroy(&mut self, entity: Entity) -> bool {
        if !self.contains(entity) {
            return false;
        }

        let slot = &mut self.slots[entity.index() as usize];
        let position = mem::replace(&mut slot.position, DEAD) as usize;

        self.reserved.swap_remove(position);
        if let Some(moved) = self.reserved.get(position) {
            self.slots[moved.index() as usize].position = position as u32;
        }

        self.release(entity);
        trace!("destroyed entity {:?}", entity);
        true
    }

    fn release(&mut self, entity: Entity) {
        if entity.version() == Entity::MAX_VERSION && self.overflow == VersionOverflow::Retire {
            warn!(
                "entity slot {} reached version {} and is retired",
                entity.index(),
                Entity::MAX_VERSION
            );
            self.retired += 1;
        } else {
            self.free.push(entity);
        }
    }

    /// Returns `true` if the entity is alive.
    #[inline]
    pub fn contains(&self, entity: Entity) -> bool {
        if entity.is_null() {
            return false;
        }
        self.slots
            .get(entity.index() as usize)
            .map_or(false, |slot| {
                slot.position != DEAD && slot.version == entity.version()
            })
    }

    /// Destroys every entity. Versions are kept, so old handles stay stale.
    pub fn clear(&mut self) {
        for entity in mem::take(&mut self.reserved) {
            self.slots[entity.index() as usize].position = DEAD;
            self.release(entity);
        }
    }

    /// Returns an iterator over all alive entities.
    pub fn iter(&self) -> Iter<'_> {
        self.reserved.iter().copied()
    }

    /// Returns the number of alive entities.
    pub fn len(&self) -> usize {
        self.reserved.len()
    }

    /// Returns `true` if no entity is alive.
    pub fn is_empty(&self) -> bool {
        self.reserved.is_empty()
    }

    /// Returns the number of slots that will never be reused.
    pub fn retired_count(&self) -> usize {
        self.retired
    }
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new(VersionOverflow::default())
    }
}
