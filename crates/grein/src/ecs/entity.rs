//! # Entity: Generational Handles
//!
//! An [`Entity`] owns nothing. It is a slot index plus a generation counter,
//! and the [`Registry`](super::registry::Registry) maps it to whatever
//! components are attached to that slot.
//!
//! ## Why Generations?
//!
//! Slots are recycled. Without a generation, a handle kept around after its
//! entity was destroyed would silently start pointing at whatever new entity
//! reused the slot:
//!
//! ```text
//! 1. create()        -> Entity { index: 3, generation: 0 }
//! 2. destroy(3v0)       generation[3] = 1, free_list = [3]
//! 3. create()        -> Entity { index: 3, generation: 1 }
//! 4. valid(3v0)      -> false   (generation[3] is 1)
//! ```
//!
//! ## Memory Layout
//!
//! ```text
//! generations: [0, 1, 0, 2, 0]   <- one counter per slot ever handed out
//! free_list:   [1, 3]            <- slots waiting to be reused (LIFO)
//! ```
//!
//! ## The Null Handle
//!
//! `index == u32::MAX` is reserved. [`Entity::NULL`] uses it (with generation
//! 0) and is what the hierarchy stores for "no parent", "no sibling", etc. The
//! allocator never hands out that index, so `NULL` is never valid.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Reserved slot index marking the null handle.
pub(crate) const INVALID_INDEX: u32 = u32::MAX;

/// A lightweight handle to an entity in a [`Registry`](super::registry::Registry).
///
/// Two entities are equal only if both the index and the generation match.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entity {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl Entity {
    /// The null handle. Never valid in any registry.
    pub const NULL: Self = Self {
        index: INVALID_INDEX,
        generation: 0,
    };

    /// Build a handle from raw parts. Mostly useful for tests and tooling;
    /// a hand-made handle is only valid if the registry agrees.
    pub const fn from_raw_parts(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Returns the slot index.
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Returns the generation.
    pub const fn generation(self) -> u32 {
        self.generation
    }

    /// `true` for [`Entity::NULL`] (any handle with the reserved index).
    pub const fn is_null(self) -> bool {
        self.index == INVALID_INDEX
    }

    /// Pack into 64 bits: generation in the high half, index in the low half.
    pub const fn to_bits(self) -> u64 {
        ((self.generation as u64) << 32) | self.index as u64
    }

    /// Inverse of [`Entity::to_bits`].
    pub const fn from_bits(bits: u64) -> Self {
        Self {
            index: bits as u32,
            generation: (bits >> 32) as u32,
        }
    }
}

impl Default for Entity {
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "Entity(null)")
        } else {
            write!(f, "Entity({}v{})", self.index, self.generation)
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "null")
        } else {
            write!(f, "{}v{}", self.index, self.generation)
        }
    }
}

/// Hands out entity slots and recycles them.
///
/// Creating pops the most recently freed slot if there is one, otherwise a
/// new slot with generation 0 is appended. Destroying bumps the slot's
/// generation and pushes it on the free list. The generation is already
/// current by the time a slot is reused, so `allocate` never touches it.
#[derive(Default)]
pub(crate) struct EntityAllocator {
    /// Generation counter per slot. Grows monotonically, never shrinks.
    generations: Vec<u32>,
    /// Indices of destroyed entities, available for reuse.
    free_list: Vec<u32>,
}

impl EntityAllocator {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            generations: Vec::with_capacity(capacity),
            free_list: Vec::new(),
        }
    }

    /// Allocate a new [`Entity`], reusing a freed slot if one is available.
    ///
    /// # Panics
    ///
    /// Panics if every index below the reserved null index is in use.
    pub fn allocate(&mut self) -> Entity {
        if let Some(index) = self.free_list.pop() {
            let generation = self.generations[index as usize];
            return Entity { index, generation };
        }

        let index = u32::try_from(self.generations.len())
            .ok()
            .filter(|&index| index != INVALID_INDEX)
            .unwrap_or_else(|| panic!("entity index space exhausted"));
        self.generations.push(0);
        Entity {
            index,
            generation: 0,
        }
    }

    /// Invalidate `entity` and free its slot.
    ///
    /// Returns `false` (and does nothing) if the handle was already stale.
    pub fn deallocate(&mut self, entity: Entity) -> bool {
        if !self.is_alive(entity) {
            return false;
        }
        let slot = &mut self.generations[entity.index as usize];
        *slot = slot.wrapping_add(1);
        self.free_list.push(entity.index);
        true
    }

    /// Check whether a handle still refers to a live entity.
    pub fn is_alive(&self, entity: Entity) -> bool {
        !entity.is_null()
            && self
                .generations
                .get(entity.index as usize)
                .is_some_and(|&generation| generation == entity.generation)
    }

    /// Every live handle, in slot order.
    pub fn alive_entities(&self) -> Vec<Entity> {
        let mut free = vec![false; self.generations.len()];
        for &index in &self.free_list {
            free[index as usize] = true;
        }
        self.generations
            .iter()
            .zip(free)
            .enumerate()
            .filter(|(_, (_, is_free))| !is_free)
            .map(|(index, (&generation, _))| Entity {
                index: index as u32,
                generation,
            })
            .collect()
    }

    pub fn alive_count(&self) -> usize {
        self.generations.len() - self.free_list.len()
    }

    #[cfg_attr(not(feature = "diagnostics"), allow(dead_code))]
    pub fn free_count(&self) -> usize {
        self.free_list.len()
    }

    #[cfg_attr(not(feature = "diagnostics"), allow(dead_code))]
    pub fn total_slots(&self) -> usize {
        self.generations.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_slots_start_at_generation_zero() {
        let mut allocator = EntityAllocator::default();
        let handles: Vec<Entity> = (0..3).map(|_| allocator.allocate()).collect();
        assert_eq!(
            handles,
            vec![
                Entity::from_raw_parts(0, 0),
                Entity::from_raw_parts(1, 0),
                Entity::from_raw_parts(2, 0),
            ]
        );
    }

    #[test]
    fn reused_slot_carries_next_generation() {
        let mut allocator = EntityAllocator::default();
        let first = allocator.allocate();
        allocator.deallocate(first);
        let second = allocator.allocate();
        assert_eq!((second.index(), second.generation()), (0, 1));
        assert_ne!(second, first);
    }

    #[test]
    fn generations_strictly_increase_across_recycles() {
        let mut allocator = EntityAllocator::default();
        let mut previous = allocator.allocate();
        for _ in 0..16 {
            allocator.deallocate(previous);
            let next = allocator.allocate();
            assert_eq!(next.index(), previous.index());
            assert!(next.generation() > previous.generation());
            previous = next;
        }
    }

    #[test]
    fn stale_handle_stays_invalid_after_recycle() {
        let mut allocator = EntityAllocator::default();
        let old = allocator.allocate();
        allocator.deallocate(old);
        let new = allocator.allocate();
        assert!(allocator.is_alive(new));
        assert!(!allocator.is_alive(old));
    }

    #[test]
    fn destroying_twice_frees_the_slot_once() {
        let mut allocator = EntityAllocator::default();
        let victim = allocator.allocate();
        assert!(allocator.deallocate(victim));
        assert!(!allocator.deallocate(victim));
        assert_eq!(allocator.free_count(), 1);
        assert_eq!(allocator.allocate().generation(), 1);
    }

    #[test]
    fn null_is_never_alive() {
        let mut allocator = EntityAllocator::default();
        allocator.allocate();
        assert!(!allocator.is_alive(Entity::NULL));
        assert!(!allocator.deallocate(Entity::NULL));
        assert!(Entity::default().is_null());
    }

    #[test]
    fn free_list_is_lifo() {
        let mut allocator = EntityAllocator::default();
        let a = allocator.allocate();
        let b = allocator.allocate();
        allocator.deallocate(a);
        allocator.deallocate(b);
        assert_eq!(allocator.allocate().index(), b.index());
        assert_eq!(allocator.allocate().index(), a.index());
    }

    #[test]
    fn alive_entities_skip_freed_slots() {
        let mut allocator = EntityAllocator::with_capacity(4);
        let slots: Vec<Entity> = (0..4).map(|_| allocator.allocate()).collect();
        allocator.deallocate(slots[1]);
        allocator.deallocate(slots[3]);

        assert_eq!(allocator.alive_entities(), vec![slots[0], slots[2]]);
        assert_eq!(
            (allocator.alive_count(), allocator.free_count(), allocator.total_slots()),
            (2, 2, 4)
        );
    }

    #[test]
    fn bits_round_trip_keeps_generation_high() {
        let e = Entity::from_raw_parts(7, 3);
        assert_eq!(e.to_bits(), (3u64 << 32) | 7);
        assert_eq!(Entity::from_bits(e.to_bits()), e);
    }

    #[test]
    fn display_formats() {
        let e = Entity::from_raw_parts(4, 2);
        assert_eq!(format!("{e}"), "4v2");
        assert_eq!(format!("{e:?}"), "Entity(4v2)");
        assert_eq!(format!("{:?}", Entity::NULL), "Entity(null)");
    }
}
