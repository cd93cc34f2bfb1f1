use std::fmt;

/// Position of an entity in the allocator's slot table.
pub type EntityIndex = u32;
/// Generation counter of an entity slot.
pub type EntityVersion = u8;

const INDEX_BITS: u32 = 24;
const INDEX_MASK: u32 = (1 << INDEX_BITS) - 1;

/// An entity identifier.
///
/// Packed into 32 bits: the upper 8 bits hold the version, the lower 24 bits hold the index.
/// Two identifiers are equal only if both the index and the version match,
/// so a stale handle never aliases a newer entity occupying the same slot.
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Entity(u32);

impl Entity {
    pub const NULL: Self = Entity(u32::MAX);

    /// The largest index the allocator may issue. The all-ones index is reserved for [`Entity::NULL`].
    pub const MAX_INDEX: EntityIndex = INDEX_MASK - 1;
    pub const MAX_VERSION: EntityVersion = EntityVersion::MAX;

    /// Constructs a new entity identifier.
    #[inline]
    pub const fn new(index: EntityIndex, version: EntityVersion) -> Entity {
        debug_assert!(index <= INDEX_MASK);
        Entity(((version as u32) << INDEX_BITS) | (index & INDEX_MASK))
    }

    #[inline]
    pub const fn index(self) -> EntityIndex {
        self.0 & INDEX_MASK
    }

    #[inline]
    pub const fn version(self) -> EntityVersion {
        (self.0 >> INDEX_BITS) as EntityVersion
    }

    /// Returns the packed representation.
    #[inline]
    pub const fn to_bits(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn from_bits(bits: u32) -> Entity {
        Entity(bits)
    }

    #[inline]
    pub const fn is_null(self) -> bool {
        self.0 == u32::MAX
    }
}

impl Default for Entity {
    fn default() -> Self {
        Entity::NULL
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            f.write_str("Entity(NULL)")
        } else {
            write!(f, "Entity({} v{})", self.index(), self.version())
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.index(), self.version())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_index_and_version() {
        let e = Entity::new(0x12_3456, 0xAB);
        assert_eq!(e.index(), 0x12_3456);
        assert_eq!(e.version(), 0xAB);
        assert_eq!(e.to_bits(), 0xAB12_3456);
        assert_eq!(Entity::from_bits(e.to_bits()), e);
    }

    #[test]
    fn version_distinguishes_same_index() {
        let old = Entity::new(7, 0);
        let new = Entity::new(7, 1);
        assert_ne!(old, new);
        assert_eq!(old.index(), new.index());
    }

    #[test]
    fn null_is_default_and_never_a_valid_index() {
        assert!(Entity::default().is_null());
        assert!(Entity::MAX_INDEX < Entity::NULL.index());
        assert!(!Entity::new(Entity::MAX_INDEX, Entity::MAX_VERSION).is_null());
    }
}
