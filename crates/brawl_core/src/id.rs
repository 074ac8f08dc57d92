//! Entity identifiers with generation counters for safe slot reuse

use core::fmt;

/// A stable entity identifier.
///
/// Lower 32 bits hold the arena slot, upper 32 bits the generation. A slot
/// that is freed and reused gets a new generation, so an old id never
/// resolves to the new occupant.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId {
    bits: u64,
}

impl EntityId {
    /// Create an id from slot index and generation
    #[inline]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self {
            bits: (generation as u64) << 32 | index as u64,
        }
    }

    /// Slot index
    #[inline]
    pub const fn index(&self) -> u32 {
        self.bits as u32
    }

    /// Generation of the slot when this id was issued
    #[inline]
    pub const fn generation(&self) -> u32 {
        (self.bits >> 32) as u32
    }

    /// Raw bits, used when packing into physics user data
    #[inline]
    pub const fn to_bits(&self) -> u64 {
        self.bits
    }

    /// Rebuild from raw bits
    #[inline]
    pub const fn from_bits(bits: u64) -> Self {
        Self { bits }
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({}v{})", self.index(), self.generation())
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index(), self.generation())
    }
}

/// Which registry an entity lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// A character: the local player or an NPC
    Actor,
    /// An interactable prop (bottle, glass, chair)
    Prop,
    /// Static arena geometry
    Static,
}

impl EntityKind {
    const fn code(self) -> u64 {
        match self {
            Self::Actor => 1,
            Self::Prop => 2,
            Self::Static => 3,
        }
    }

    const fn from_code(code: u64) -> Option<Self> {
        match code {
            1 => Some(Self::Actor),
            2 => Some(Self::Prop),
            3 => Some(Self::Static),
            _ => None,
        }
    }
}

/// A kind-qualified entity reference.
///
/// Actor and prop arenas hand out ids independently, so an id alone is
/// ambiguous across registries. Physics tags and timer owners use this
/// instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: EntityId,
}

impl EntityRef {
    /// Reference an actor
    pub const fn actor(id: EntityId) -> Self {
        Self {
            kind: EntityKind::Actor,
            id,
        }
    }

    /// Reference a prop
    pub const fn prop(id: EntityId) -> Self {
        Self {
            kind: EntityKind::Prop,
            id,
        }
    }

    /// Reference a piece of static geometry
    pub const fn fixed(id: EntityId) -> Self {
        Self {
            kind: EntityKind::Static,
            id,
        }
    }

    /// Pack into a `u128` (kind in the high word, id bits in the low word).
    /// Zero is never produced, so zeroed user data reads as "untagged".
    pub const fn to_bits(&self) -> u128 {
        ((self.kind.code() as u128) << 64) | self.id.to_bits() as u128
    }

    /// Unpack from [`EntityRef::to_bits`]; `None` for untagged data
    pub const fn from_bits(bits: u128) -> Option<Self> {
        match EntityKind::from_code((bits >> 64) as u64) {
            Some(kind) => Some(Self {
                kind,
                id: EntityId::from_bits(bits as u64),
            }),
            None => None,
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}#{}", self.kind, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_parts() {
        let id = EntityId::new(42, 7);
        assert_eq!(id.index(), 42);
        assert_eq!(id.generation(), 7);
        assert_eq!(EntityId::from_bits(id.to_bits()), id);
    }

    #[test]
    fn test_ref_packing() {
        let r = EntityRef::prop(EntityId::new(3, 9));
        assert_eq!(EntityRef::from_bits(r.to_bits()), Some(r));
        assert_eq!(EntityRef::from_bits(0), None);
    }

    #[test]
    fn test_refs_differ_by_kind() {
        let id = EntityId::new(0, 0);
        assert_ne!(EntityRef::actor(id), EntityRef::prop(id));
        assert_ne!(EntityRef::actor(id).to_bits(), EntityRef::prop(id).to_bits());
    }
}
