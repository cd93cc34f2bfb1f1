use crate::entity::Entity;
use std::iter::{Copied, Zip};
use std::slice;

/// Marks a type that can be stored as a component.
pub trait Component: 'static {}

impl<T> Component for T where T: 'static {}

const INVALID: usize = usize::MAX;

/// Storage for all components of a single type `T`.
///
/// Components are kept densely packed for iteration. A sparse table indexed by
/// [`Entity::index`] maps entities to their position in the dense arrays.
/// Insertion, removal and lookup are O(1).
///
/// Invariant: `dense[sparse[e.index()]] == e` iff `e` has a component in this set,
/// and `components[i]` belongs to `dense[i]`.
pub struct SparseSet<T> {
    sparse: Vec<usize>,
    dense: Vec<Entity>,
    components: Vec<T>,
}

impl<T> SparseSet<T> {
    /// Creates an empty `SparseSet`.
    pub fn new() -> Self {
        SparseSet {
            sparse: Vec::new(),
            dense: Vec::new(),
            components: Vec::new(),
        }
    }

    /// Creates an empty `SparseSet` with room for `capacity` components.
    pub fn with_capacity(capacity: usize) -> Self {
        SparseSet {
            sparse: Vec::new(),
            dense: Vec::with_capacity(capacity),
            components: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    fn dense_index(&self, entity: Entity) -> Option<usize> {
        let i = *self.sparse.get(entity.index() as usize)?;
        (i != INVALID && self.dense.get(i) == Some(&entity)).then_some(i)
    }

    /// Returns `true` if `entity` has a component in this set.
    ///
    /// The stored handle must match exactly, so a stale handle to a reused index is rejected.
    #[inline]
    pub fn contains(&self, entity: Entity) -> bool {
        self.dense_index(entity).is_some()
    }

    /// Adds `component` to `entity`.
    /// Returns `false` and drops `component` if the entity already has one.
    pub fn insert(&mut self, entity: Entity, component: T) -> bool {
        self.insert_with(entity, || component)
    }

    /// Adds a component constructed by `f` to `entity`. `f` is only called if the entity
    /// does not have a component yet. Returns `true` if the component was added.
    ///
    /// An index holds at most one component, so inserting fails as well while another
    /// version of the same index is still present.
    pub fn insert_with(&mut self, entity: Entity, f: impl FnOnce() -> T) -> bool {
        debug_assert!(!entity.is_null(), "null entity inserted into a sparse set");

        let index = entity.index() as usize;
        match self.sparse.get(index) {
            Some(&i) if i != INVALID => return false,
            Some(_) => {}
            None => self.sparse.resize((index + 1) * 2, INVALID),
        }

        // Construct before touching the tables so a panicking `f` leaves the set intact.
        let component = f();
        self.sparse[index] = self.dense.len();
        self.dense.push(entity);
        self.components.push(component);
        true
    }

    /// Removes the component of `entity` and returns it.
    pub fn remove(&mut self, entity: Entity) -> Option<T> {
        let i = self.dense_index(entity)?;

        self.dense.swap_remove(i);
        let component = self.components.swap_remove(i);

        // The former last element now lives at `i`.
        if let Some(moved) = self.dense.get(i) {
            self.sparse[moved.index() as usize] = i;
        }
        self.sparse[entity.index() as usize] = INVALID;

        Some(component)
    }

    /// Returns a reference to the component of `entity`.
    #[inline]
    pub fn get(&self, entity: Entity) -> Option<&T> {
        let i = self.dense_index(entity)?;
        self.components.get(i)
    }

    /// Returns a mutable reference to the component of `entity`.
    #[inline]
    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        let i = self.dense_index(entity)?;
        self.components.get_mut(i)
    }

    /// Returns the number of components in the set.
    pub fn len(&self) -> usize {
        self.dense.len()
    }

    /// Returns `true` if the set holds no components.
    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    /// Owners of the components, in the same order as [`components`](Self::components).
    pub fn entities(&self) -> &[Entity] {
        &self.dense
    }

    /// Components in dense order, matching [`entities`](Self::entities).
    pub fn components(&self) -> &[T] {
        &self.components
    }

    /// Returns all components for in-place modification. Ownership cannot change through
    /// this slice, so the set stays consistent.
    pub fn components_mut(&mut self) -> &mut [T] {
        &mut self.components
    }

    /// Returns an iterator over `(entity, component)` pairs in dense order.
    pub fn iter(&self) -> Iter<'_, T> {
        self.dense.iter().copied().zip(self.components.iter())
    }

    /// Returns an iterator that allows modifying each component.
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        self.dense.iter().copied().zip(self.components.iter_mut())
    }

    /// Removes every component.
    pub fn clear(&mut self) {
        self.sparse.clear();
        self.dense.clear();
        self.components.clear();
    }
}

/// Iterator over `(entity, component)` pairs of a [`SparseSet`].
pub type Iter<'a, T> = Zip<Copied<slice::Iter<'a, Entity>>, slice::Iter<'a, T>>;
/// Mutable iterator over `(entity, component)` pairs of a [`SparseSet`].
pub type IterMut<'a, T> = Zip<Copied<slice::Iter<'a, Entity>>, slice::IterMut<'a, T>>;

impl<T> Default for SparseSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T> IntoIterator for &'a SparseSet<T> {
    type Item = (Entity, &'a T);
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut SparseSet<T> {
    type Item = (Entity, &'a mut T);
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

#[cfg(feature = "rayon")]
mod parallel {
    use super::SparseSet;
    use crate::Entity;
    use rayon::prelude::*;

    impl<T: Sync> SparseSet<T> {
        /// Returns a parallel iterator over `(entity, component)` pairs.
        pub fn par_iter(&self) -> impl IndexedParallelIterator<Item = (Entity, &T)> + '_ {
            self.dense.par_iter().copied().zip(self.components.par_iter())
        }
    }

    impl<T: Send> SparseSet<T> {
        /// Returns a parallel iterator that allows modifying each component.
        pub fn par_iter_mut(
            &mut self,
        ) -> impl IndexedParallelIterator<Item = (Entity, &mut T)> + '_ {
            self.dense
                .par_iter()
                .copied()
                .zip(self.components.par_iter_mut())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sparse_table_grows_by_doubling() {
        let mut set = SparseSet::new();
        assert!(set.insert(Entity::new(9, 0), 'x'));
        assert_eq!(set.sparse.len(), 20);
        assert!(set.insert(Entity::new(3, 0), 'y'));
        assert_eq!(set.sparse.len(), 20);
    }

    #[test]
    fn remove_patches_moved_entity() {
        let mut set = SparseSet::new();
        let a = Entity::new(0, 0);
        let b = Entity::new(1, 0);
        let c = Entity::new(2, 0);
        set.insert(a, "a");
        set.insert(b, "b");
        set.insert(c, "c");

        assert_eq!(set.remove(a), Some("a"));
        assert_eq!(set.entities(), &[c, b]);
        assert_eq!(set.get(c), Some(&"c"));
        assert_eq!(set.get(b), Some(&"b"));
        assert_eq!(set.remove(a), None);

        assert_eq!(set.remove(b), Some("b"));
        assert_eq!(set.remove(c), Some("c"));
        assert!(set.is_empty());
    }

    #[test]
    fn stale_handle_is_rejected() {
        let mut set = SparseSet::new();
        let old = Entity::new(4, 0);
        let new = Entity::new(4, 1);

        set.insert(new, 10);
        assert!(!set.contains(old));
        assert!(set.get(old).is_none());
        assert!(set.remove(old).is_none());
        assert!(!set.insert(old, 20));
        assert_eq!(set.get(new), Some(&10));
    }

    #[test]
    fn panicking_constructor_leaves_set_consistent() {
        use std::panic::{self, AssertUnwindSafe};

        let mut set = SparseSet::new();
        let a = Entity::new(0, 0);
        let b = Entity::new(1, 0);

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            set.insert_with(a, || -> i32 { panic!("constructor failed") })
        }));
        assert!(result.is_err());

        assert!(!set.contains(a));
        assert_eq!(set.len(), 0);
        assert_eq!(set.components().len(), 0);
        assert!(set.get(a).is_none());

        assert!(set.insert(b, 7));
        assert!(!set.contains(a));
        assert_eq!(set.get(b), Some(&7));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![(b, &7)]);

        assert!(set.insert(a, 3));
        assert_eq!(set.get(a), Some(&3));
    }

    #[cfg(feature = "rayon")]
    #[test]
    fn parallel_iteration_matches_sequential() {
        use rayon::prelude::*;

        let mut set = SparseSet::new();
        for i in 0..1000u32 {
            set.insert(Entity::new(i * 3, 0), i);
        }
        set.remove(Entity::new(0, 0));
        set.remove(Entity::new(300, 0));

        let sequential: Vec<_> = set.iter().collect();
        let parallel: Vec<_> = set.par_iter().collect();
        assert_eq!(parallel, sequential);

        set.par_iter_mut().for_each(|(e, v)| *v = e.index());
        assert!(set.iter().all(|(e, v)| *v == e.index()));
        assert_eq!(set.len(), 998);
    }

    #[test]
    fn insert_with_is_lazy() {
        let mut set = SparseSet::new();
        let e = Entity::new(0, 0);

        assert!(set.insert_with(e, || 1));
        assert!(!set.insert_with(e, || unreachable!()));
        assert_eq!(set.get(e), Some(&1));
    }
}
