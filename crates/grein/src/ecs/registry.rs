//! # Registry: Entities and Their Pools
//!
//! The [`Registry`] is the ECS container. It hands out [`Entity`] handles and
//! keeps one [`ComponentPool`] per component type, created lazily the first
//! time a type is attached.
//!
//! ```text
//! Registry
//! ├── allocator            generations + free list
//! └── pools: TypeId -> Box<dyn ErasedPool>
//!       ├── TransformComponent    ComponentPool<TransformComponent>
//!       ├── TagComponent          ComponentPool<TagComponent>
//!       └── ...
//! ```
//!
//! ## Contract Violations vs. Recoverable Misses
//!
//! `emplace`, `get` and `get_mut` panic when used on a dead entity, when the
//! component is already present (emplace) or when it is missing (get). Those
//! are programming errors. The `try_*` variants return [`EcsError`] instead,
//! and `pool`/`has`/`remove` simply report absence.
//!
//! ## Destruction
//!
//! [`Registry::destroy`] removes the entity from every pool, then bumps the
//! slot generation. Pool iteration order changes (swap-and-pop), and any
//! handle to the destroyed entity is rejected from then on.
//!
//! ## Borrowing Several Pools Mutably
//!
//! Pools live in one map, so handing out `&mut` to two of them at once needs
//! help. [`Registry::each_mut`] and [`Registry::with_detached_pool`] take the
//! pools out of the map, run the caller's code, and put them back.

use std::any::{TypeId, type_name};
use std::collections::HashMap;

use super::entity::{Entity, EntityAllocator};
use super::error::{EcsError, short_type_name};
use super::pool::{Component, ComponentPool, ErasedPool};
use super::view::{MultiQuery, MultiQueryMut, MultiView, View, ViewMut};

/// Owns every entity and component pool.
pub struct Registry {
    allocator: EntityAllocator,
    /// One pool per component type, keyed by `TypeId`.
    pub(crate) pools: HashMap<TypeId, Box<dyn ErasedPool>>,
    /// Initial capacity for newly created pools.
    pool_capacity: usize,
    /// Entities created since the last [`Registry::take_frame_counters`].
    #[cfg(feature = "diagnostics")]
    pub(crate) created_this_frame: u32,
    /// Entities destroyed since the last [`Registry::take_frame_counters`].
    #[cfg(feature = "diagnostics")]
    pub(crate) destroyed_this_frame: u32,
}

impl Registry {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Pre-size the entity table and every pool created later.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            allocator: EntityAllocator::with_capacity(capacity),
            pools: HashMap::new(),
            pool_capacity: capacity,
            #[cfg(feature = "diagnostics")]
            created_this_frame: 0,
            #[cfg(feature = "diagnostics")]
            destroyed_this_frame: 0,
        }
    }

    // ── Entities ─────────────────────────────────────────────────────

    /// Create an entity with no components.
    pub fn create(&mut self) -> Entity {
        let entity = self.allocator.allocate();
        #[cfg(feature = "diagnostics")]
        {
            self.created_this_frame += 1;
        }
        log::trace!("created entity {entity}");
        entity
    }

    /// Destroy an entity and drop all of its components.
    ///
    /// Returns `false` (and does nothing) for a stale or null handle.
    pub fn destroy(&mut self, entity: Entity) -> bool {
        if !self.allocator.is_alive(entity) {
            return false;
        }
        for pool in self.pools.values_mut() {
            pool.remove_entity(entity);
        }
        self.allocator.deallocate(entity);
        #[cfg(feature = "diagnostics")]
        {
            self.destroyed_this_frame += 1;
        }
        log::trace!("destroyed entity {entity}");
        true
    }

    /// Whether the handle refers to a live entity.
    pub fn valid(&self, entity: Entity) -> bool {
        self.allocator.is_alive(entity)
    }

    pub fn alive_count(&self) -> usize {
        self.allocator.alive_count()
    }

    /// Every live entity, in slot order.
    pub fn entities(&self) -> Vec<Entity> {
        self.allocator.alive_entities()
    }

    /// Destroy every live entity. Pools stay registered but empty.
    pub fn clear(&mut self) {
        let alive = self.allocator.alive_entities();
        log::debug!("clearing registry ({} entities)", alive.len());
        for entity in alive {
            self.destroy(entity);
        }
    }

    // ── Components ───────────────────────────────────────────────────

    /// Attach a component and return it for in-place initialisation.
    ///
    /// # Panics
    ///
    /// Panics if the entity is dead or already has a `T`.
    pub fn emplace<T: Component>(&mut self, entity: Entity, value: T) -> &mut T {
        if !self.valid(entity) {
            panic!(
                "cannot attach `{}` to dead entity {entity}",
                short_type_name(type_name::<T>())
            );
        }
        self.pool_or_create::<T>().emplace(entity, value)
    }

    /// Checked [`Registry::emplace`].
    pub fn try_emplace<T: Component>(&mut self, entity: Entity, value: T) -> Result<&mut T, EcsError> {
        if !self.valid(entity) {
            return Err(EcsError::DeadEntity(entity));
        }
        if self.has::<T>(entity) {
            return Err(EcsError::DuplicateComponent {
                entity,
                component: short_type_name(type_name::<T>()),
            });
        }
        Ok(self.pool_or_create::<T>().emplace(entity, value))
    }

    /// Attach `value`, overwriting any existing `T` on the entity.
    ///
    /// # Panics
    ///
    /// Panics if the entity is dead.
    pub fn emplace_or_replace<T: Component>(&mut self, entity: Entity, value: T) -> &mut T {
        if !self.has::<T>(entity) {
            return self.emplace(entity, value);
        }
        let existing = &mut self.pool_or_create::<T>()[entity];
        *existing = value;
        existing
    }

    /// Detach and return the entity's `T`, if any.
    pub fn remove<T: Component>(&mut self, entity: Entity) -> Option<T> {
        self.pool_mut::<T>()?.remove(entity)
    }

    pub fn has<T: Component>(&self, entity: Entity) -> bool {
        self.pool::<T>().is_some_and(|pool| pool.contains(entity))
    }

    /// Whether the entity has every type in the tuple `S`.
    pub fn all_of<S: ComponentSet>(&self, entity: Entity) -> bool {
        S::all_in(self, entity)
    }

    /// Whether the entity has at least one type in the tuple `S`.
    pub fn any_of<S: ComponentSet>(&self, entity: Entity) -> bool {
        S::any_in(self, entity)
    }

    /// # Panics
    ///
    /// Panics if the entity is dead or has no `T`.
    pub fn get<T: Component>(&self, entity: Entity) -> &T {
        match self.try_get(entity) {
            Ok(component) => component,
            Err(err) => panic!("{err}"),
        }
    }

    /// # Panics
    ///
    /// Panics if the entity is dead or has no `T`.
    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> &mut T {
        match self.try_get_mut(entity) {
            Ok(component) => component,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn try_get<T: Component>(&self, entity: Entity) -> Result<&T, EcsError> {
        if !self.valid(entity) {
            return Err(EcsError::DeadEntity(entity));
        }
        self.pool::<T>()
            .and_then(|pool| pool.get(entity))
            .ok_or_else(|| missing::<T>(entity))
    }

    pub fn try_get_mut<T: Component>(&mut self, entity: Entity) -> Result<&mut T, EcsError> {
        if !self.valid(entity) {
            return Err(EcsError::DeadEntity(entity));
        }
        self.pool_mut::<T>()
            .and_then(|pool| pool.get_mut(entity))
            .ok_or_else(|| missing::<T>(entity))
    }

    /// Short type names of every component the entity holds, sorted. Empty
    /// for a dead entity.
    pub fn component_names(&self, entity: Entity) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self
            .pools
            .values()
            .filter(|pool| pool.contains(entity))
            .map(|pool| pool.component_name())
            .collect();
        names.sort_unstable();
        names
    }

    // ── Pools ────────────────────────────────────────────────────────

    /// The pool for `T`, if any entity ever had a `T`.
    pub fn pool<T: Component>(&self) -> Option<&ComponentPool<T>> {
        self.pools
            .get(&TypeId::of::<T>())?
            .as_any()
            .downcast_ref::<ComponentPool<T>>()
    }

    pub fn pool_mut<T: Component>(&mut self) -> Option<&mut ComponentPool<T>> {
        self.pools
            .get_mut(&TypeId::of::<T>())?
            .as_any_mut()
            .downcast_mut::<ComponentPool<T>>()
    }

    fn pool_or_create<T: Component>(&mut self) -> &mut ComponentPool<T> {
        let capacity = self.pool_capacity;
        let pool = self.pools.entry(TypeId::of::<T>()).or_insert_with(|| {
            log::debug!("created pool for `{}`", short_type_name(type_name::<T>()));
            Box::new(ComponentPool::<T>::with_capacity(capacity))
        });
        match pool.as_any_mut().downcast_mut::<ComponentPool<T>>() {
            Some(pool) => pool,
            None => unreachable!("pool keyed by TypeId holds another type"),
        }
    }

    /// Run `f` with the `T` pool taken out of the registry, so the rest of
    /// the registry can be read while the pool is mutated.
    ///
    /// Returns `None` (without calling `f`) if there is no `T` pool. Inside
    /// `f`, the registry appears to have no `T` pool.
    pub fn with_detached_pool<T: Component, R>(
        &mut self,
        f: impl FnOnce(&mut ComponentPool<T>, &Registry) -> R,
    ) -> Option<R> {
        let type_id = TypeId::of::<T>();
        let mut detached = self.pools.remove(&type_id)?;
        let result = detached
            .as_any_mut()
            .downcast_mut::<ComponentPool<T>>()
            .map(|pool| f(pool, self));
        self.pools.insert(type_id, detached);
        result
    }

    // ── Views ────────────────────────────────────────────────────────

    /// Read-only iteration over every `T`.
    pub fn view<T: Component>(&self) -> View<'_, T> {
        View::new(self.pool::<T>())
    }

    /// Mutable iteration over every `T`.
    pub fn view_mut<T: Component>(&mut self) -> ViewMut<'_, T> {
        ViewMut::new(self.pool_mut::<T>())
    }

    /// Read-only iteration over entities holding every type in `Q`.
    ///
    /// ```ignore
    /// for (entity, (transform, mesh)) in registry.multi_view::<(TransformComponent, MeshRendererComponent)>() {
    ///     // ...
    /// }
    /// ```
    pub fn multi_view<Q: MultiQuery>(&self) -> MultiView<'_, Q> {
        MultiView::new(self)
    }

    /// Visit entities holding every type in `Q` with mutable access to all
    /// of them. Returns the number of entities visited.
    ///
    /// A tuple naming the same type twice visits nothing.
    pub fn each_mut<Q: MultiQueryMut>(&mut self, f: impl FnMut(Entity, Q::ItemMut<'_>)) -> usize {
        Q::each_mut(self, f)
    }

    // ── Diagnostics ──────────────────────────────────────────────────

    /// Entities created and destroyed since the previous call. Resets both.
    #[cfg(feature = "diagnostics")]
    pub fn take_frame_counters(&mut self) -> (u32, u32) {
        let counters = (self.created_this_frame, self.destroyed_this_frame);
        self.created_this_frame = 0;
        self.destroyed_this_frame = 0;
        counters
    }

    #[cfg(feature = "diagnostics")]
    pub(crate) fn free_count(&self) -> usize {
        self.allocator.free_count()
    }

    #[cfg(feature = "diagnostics")]
    pub(crate) fn total_slots(&self) -> usize {
        self.allocator.total_slots()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

fn missing<T>(entity: Entity) -> EcsError {
    EcsError::MissingComponent {
        entity,
        component: short_type_name(type_name::<T>()),
    }
}

/// A tuple of component types, for [`Registry::all_of`] and
/// [`Registry::any_of`].
pub trait ComponentSet {
    fn all_in(registry: &Registry, entity: Entity) -> bool;
    fn any_in(registry: &Registry, entity: Entity) -> bool;
}

macro_rules! impl_component_set {
    ($($T:ident),+) => {
        impl<$($T: Component),+> ComponentSet for ($($T,)+) {
            fn all_in(registry: &Registry, entity: Entity) -> bool {
                $(registry.has::<$T>(entity))&&+
            }

            fn any_in(registry: &Registry, entity: Entity) -> bool {
                $(registry.has::<$T>(entity))||+
            }
        }
    };
}

impl_component_set!(A);
impl_component_set!(A, B);
impl_component_set!(A, B, C);
impl_component_set!(A, B, C, D);
impl_component_set!(A, B, C, D, E);
impl_component_set!(A, B, C, D, E, F);
