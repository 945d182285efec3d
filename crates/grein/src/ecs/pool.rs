//! # Component Pool: Sparse-Set Storage
//!
//! Every component type gets its own [`ComponentPool`]. A pool is a sparse
//! set: three parallel arrays that give O(1) insert, remove and lookup while
//! keeping the component values tightly packed for iteration.
//!
//! ## Memory Layout
//!
//! ```text
//! entity_to_dense: [ 1, -, 0, -, 2 ]     <- indexed by Entity::index
//!                    |     |     |
//! dense:           [ c2,  c0,  c4 ]      <- component values, no gaps
//! dense_to_entity: [ 2v0, 0v0, 4v1 ]     <- owner of dense[i]
//! ```
//!
//! `contains(e)` holds when `entity_to_dense[e.index]` is set *and* the
//! dense slot it points at is owned by exactly `e` (same generation). A stale
//! handle to a recycled slot therefore never matches.
//!
//! ## Swap-and-Pop Removal
//!
//! Removing moves the last dense element into the hole and rewrites that
//! element's sparse entry. Cost is O(1) regardless of pool size, but dense
//! order changes. **Iteration order is unspecified after any removal**; do
//! not rely on insertion order.
//!
//! ## Type Erasure
//!
//! The registry stores pools of unrelated types side by side behind
//! [`ErasedPool`], which only knows how to drop an entity and answer
//! membership. Typed access goes back through `Any` downcasting.
//!
//! ## Comparison
//!
//! - **EnTT**: same sparse-set shape, with paged sparse arrays.
//! - **Archetype ECSs (hecs, bevy tables)**: faster multi-component scans,
//!   slower add/remove. Pools make attaching and detaching single components
//!   cheap, which suits an editor that mutates entities constantly.

use std::any::Any;
use std::ops::{Index, IndexMut};

use super::entity::Entity;
use super::error::short_type_name;

/// Anything `'static + Send + Sync` can be a component.
pub trait Component: 'static + Send + Sync {}

impl<T: 'static + Send + Sync> Component for T {}

const ABSENT: usize = usize::MAX;

/// The object-safe face of a pool, used where the component type is unknown.
pub(crate) trait ErasedPool: Send + Sync {
    /// Remove the entity's component if present. Returns whether it was.
    fn remove_entity(&mut self, entity: Entity) -> bool;

    fn contains(&self, entity: Entity) -> bool;

    #[cfg_attr(not(feature = "diagnostics"), allow(dead_code))]
    fn len(&self) -> usize;

    fn component_name(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Sparse-set storage for one component type.
pub struct ComponentPool<T> {
    dense: Vec<T>,
    dense_to_entity: Vec<Entity>,
    entity_to_dense: Vec<usize>,
}

impl<T> Default for ComponentPool<T> {
    fn default() -> Self {
        Self {
            dense: Vec::new(),
            dense_to_entity: Vec::new(),
            entity_to_dense: Vec::new(),
        }
    }
}

impl<T> ComponentPool<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve room for `capacity` components and entity indices below it.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            dense: Vec::with_capacity(capacity),
            dense_to_entity: Vec::with_capacity(capacity),
            entity_to_dense: Vec::with_capacity(capacity),
        }
    }

    /// Attach `value` to `entity` and return it for in-place initialisation.
    ///
    /// # Panics
    ///
    /// Panics if the entity's slot already holds a component in this pool.
    /// Attaching twice is a logic error, not something to recover from.
    pub fn emplace(&mut self, entity: Entity, value: T) -> &mut T {
        let slot = entity.index as usize;
        if slot >= self.entity_to_dense.len() {
            self.entity_to_dense.resize(slot + 1, ABSENT);
        }

        let existing = self.entity_to_dense[slot];
        if existing != ABSENT {
            panic!(
                "entity {entity} already has a `{}` component (slot held by {})",
                short_type_name(std::any::type_name::<T>()),
                self.dense_to_entity[existing]
            );
        }

        let dense_index = self.dense.len();
        self.dense.push(value);
        self.dense_to_entity.push(entity);
        self.entity_to_dense[slot] = dense_index;
        &mut self.dense[dense_index]
    }

    /// Detach and return the entity's component. `None` if it had none.
    pub fn remove(&mut self, entity: Entity) -> Option<T> {
        let dense_index = self.dense_index(entity)?;

        let value = self.dense.swap_remove(dense_index);
        self.dense_to_entity.swap_remove(dense_index);

        // If something was swapped into the hole, point its sparse entry at it.
        if let Some(&moved) = self.dense_to_entity.get(dense_index) {
            self.entity_to_dense[moved.index as usize] = dense_index;
        }
        self.entity_to_dense[entity.index as usize] = ABSENT;
        Some(value)
    }

    /// Dense slot of the entity's component, if it has one.
    pub fn dense_index(&self, entity: Entity) -> Option<usize> {
        let dense_index = *self.entity_to_dense.get(entity.index as usize)?;
        (dense_index != ABSENT && self.dense_to_entity[dense_index] == entity)
            .then_some(dense_index)
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.dense_index(entity).is_some()
    }

    pub fn get(&self, entity: Entity) -> Option<&T> {
        self.dense_index(entity).map(|i| &self.dense[i])
    }

    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        self.dense_index(entity).map(|i| &mut self.dense[i])
    }

    pub fn len(&self) -> usize {
        self.dense.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    /// Owner of the component at `dense_index`.
    ///
    /// # Panics
    ///
    /// Panics if `dense_index >= self.len()`.
    pub fn entity_at(&self, dense_index: usize) -> Entity {
        self.dense_to_entity[dense_index]
    }

    /// Owners in dense order, parallel to [`ComponentPool::as_slice`].
    pub fn entities(&self) -> &[Entity] {
        &self.dense_to_entity
    }

    /// The packed component values.
    pub fn as_slice(&self) -> &[T] {
        &self.dense
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.dense
    }

    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.dense_to_entity.iter().copied().zip(self.dense.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Entity, &mut T)> {
        let (entities, values) = self.parts_mut();
        entities.iter().copied().zip(values.iter_mut())
    }

    /// Owners and values borrowed together, the owners shared and the values
    /// mutable.
    pub fn parts_mut(&mut self) -> (&[Entity], &mut [T]) {
        (&self.dense_to_entity, &mut self.dense)
    }

    pub fn clear(&mut self) {
        self.dense.clear();
        self.dense_to_entity.clear();
        self.entity_to_dense.clear();
    }
}

impl<T> Index<Entity> for ComponentPool<T> {
    type Output = T;

    fn index(&self, entity: Entity) -> &T {
        self.get(entity).unwrap_or_else(|| missing::<T>(entity))
    }
}

impl<T> IndexMut<Entity> for ComponentPool<T> {
    fn index_mut(&mut self, entity: Entity) -> &mut T {
        match self.dense_index(entity) {
            Some(i) => &mut self.dense[i],
            None => missing::<T>(entity),
        }
    }
}

fn missing<T>(entity: Entity) -> ! {
    panic!(
        "entity {entity} has no `{}` component",
        short_type_name(std::any::type_name::<T>())
    )
}

impl<T: Component> ErasedPool for ComponentPool<T> {
    fn remove_entity(&mut self, entity: Entity) -> bool {
        self.remove(entity).is_some()
    }

    fn contains(&self, entity: Entity) -> bool {
        ComponentPool::contains(self, entity)
    }

    fn len(&self) -> usize {
        ComponentPool::len(self)
    }

    fn component_name(&self) -> &'static str {
        short_type_name(std::any::type_name::<T>())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
