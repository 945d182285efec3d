//! # Views: Iterating Pools
//!
//! A [`View`] walks one pool's dense arrays directly. A [`MultiView`] walks
//! the entities that have *every* requested component.
//!
//! ## Driver Selection
//!
//! ```text
//! registry.multi_view::<(Transform, MeshRenderer)>()
//!
//! Transform pool:    10_000 entities
//! MeshRenderer pool:    300 entities   <- driver (smallest)
//!
//! for e in mesh_renderer.entities():      300 steps
//!     if transform.contains(e):           O(1) probe
//!         yield (e, (&transform[e], &mesh_renderer[e]))
//! ```
//!
//! Cost is bounded by the smallest pool times the number of requested types,
//! never by the product of pool sizes. The visited set is the exact
//! intersection no matter which pool ends up driving; only the order changes.
//! A missing pool makes the whole view empty.
//!
//! ## Shared vs. Mutable
//!
//! Shared views are ordinary lazy iterators. Mutable access to several pools
//! at once is closure-based ([`Registry::each_mut`]): the pools are taken out
//! of the registry for the duration of the walk, so the borrow checker sees
//! them as independent values, and put back afterwards. Yielding `&mut` items
//! from several pools through `Iterator` would need a lending iterator.
//!
//! Multi-views are implemented for tuples of two to four component types.

use std::any::TypeId;
use std::iter::{Copied, Zip};
use std::slice;

use super::entity::Entity;
use super::pool::{Component, ComponentPool};
use super::registry::Registry;

pub type ViewIter<'r, T> = Zip<Copied<slice::Iter<'r, Entity>>, slice::Iter<'r, T>>;
pub type ViewIterMut<'r, T> = Zip<Copied<slice::Iter<'r, Entity>>, slice::IterMut<'r, T>>;

// ── Single-pool views ──────────────────────────────────────────────────

/// Read-only view over one component pool. Empty if the pool was never
/// created.
pub struct View<'r, T> {
    pool: Option<&'r ComponentPool<T>>,
}

impl<T> Clone for View<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for View<'_, T> {}

impl<'r, T> View<'r, T> {
    pub(crate) fn new(pool: Option<&'r ComponentPool<T>>) -> Self {
        Self { pool }
    }

    pub fn len(&self) -> usize {
        self.pool.map_or(0, ComponentPool::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.pool.is_some_and(|pool| pool.contains(entity))
    }

    pub fn get(&self, entity: Entity) -> Option<&'r T> {
        self.pool?.get(entity)
    }

    /// Packed component values, for direct dense iteration.
    pub fn components(&self) -> &'r [T] {
        self.pool.map(ComponentPool::as_slice).unwrap_or(&[])
    }

    /// Owners of [`View::components`], index for index.
    pub fn entities(&self) -> &'r [Entity] {
        self.pool.map(ComponentPool::entities).unwrap_or(&[])
    }

    pub fn iter(&self) -> ViewIter<'r, T> {
        self.entities().iter().copied().zip(self.components().iter())
    }

    pub fn each(&self, mut f: impl FnMut(Entity, &'r T)) {
        for (entity, component) in self.iter() {
            f(entity, component);
        }
    }
}

impl<'r, T> IntoIterator for View<'r, T> {
    type Item = (Entity, &'r T);
    type IntoIter = ViewIter<'r, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Mutable view over one component pool.
pub struct ViewMut<'r, T> {
    pool: Option<&'r mut ComponentPool<T>>,
}

impl<'r, T> ViewMut<'r, T> {
    pub(crate) fn new(pool: Option<&'r mut ComponentPool<T>>) -> Self {
        Self { pool }
    }

    pub fn len(&self) -> usize {
        self.pool.as_deref().map_or(0, ComponentPool::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        self.pool.as_deref_mut()?.get_mut(entity)
    }

    pub fn components_mut(&mut self) -> &mut [T] {
        match self.pool.as_deref_mut() {
            Some(pool) => pool.as_mut_slice(),
            None => Default::default(),
        }
    }

    pub fn iter_mut(&mut self) -> ViewIterMut<'_, T> {
        zip_parts(self.pool.as_deref_mut())
    }

    pub fn each(self, mut f: impl FnMut(Entity, &mut T)) {
        for (entity, component) in self {
            f(entity, component);
        }
    }
}

impl<'r, T> IntoIterator for ViewMut<'r, T> {
    type Item = (Entity, &'r mut T);
    type IntoIter = ViewIterMut<'r, T>;

    fn into_iter(self) -> Self::IntoIter {
        zip_parts(self.pool)
    }
}

fn zip_parts<T>(pool: Option<&mut ComponentPool<T>>) -> ViewIterMut<'_, T> {
    let (entities, values): (&[Entity], &mut [T]) = match pool {
        Some(pool) => pool.parts_mut(),
        None => (&[], Default::default()),
    };
    entities.iter().copied().zip(values.iter_mut())
}

// ── Multi-pool views ───────────────────────────────────────────────────

/// A set of component types that can be viewed together (read-only).
pub trait MultiQuery {
    /// One shared pool reference per component type.
    type Pools<'r>: Copy;
    /// One shared component reference per component type.
    type Item<'r>;

    /// `None` if any of the pools does not exist.
    fn fetch(registry: &Registry) -> Option<Self::Pools<'_>>;

    /// Dense entity list of the smallest pool. Ties go to the first type.
    fn driver<'r>(pools: Self::Pools<'r>) -> &'r [Entity];

    /// The entity's components, if it has all of them.
    fn fetch_item<'r>(pools: Self::Pools<'r>, entity: Entity) -> Option<Self::Item<'r>>;
}

/// A set of component types that can be visited together mutably.
pub trait MultiQueryMut {
    type ItemMut<'p>;

    /// Visit every entity holding all the types. Returns how many were visited.
    fn each_mut<F>(registry: &mut Registry, f: F) -> usize
    where
        F: FnMut(Entity, Self::ItemMut<'_>);
}

/// Read-only view over the intersection of several pools.
pub struct MultiView<'r, Q: MultiQuery> {
    pools: Option<Q::Pools<'r>>,
}

impl<'r, Q: MultiQuery> MultiView<'r, Q> {
    pub(crate) fn new(registry: &'r Registry) -> Self {
        Self {
            pools: Q::fetch(registry),
        }
    }

    /// Size of the pool that drives iteration, an upper bound on the number
    /// of visited entities.
    pub fn driver_len(&self) -> usize {
        self.pools.map_or(0, |pools| Q::driver(pools).len())
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.get(entity).is_some()
    }

    pub fn get(&self, entity: Entity) -> Option<Q::Item<'r>> {
        Q::fetch_item(self.pools?, entity)
    }

    pub fn iter(&self) -> MultiViewIter<'r, Q> {
        MultiViewIter {
            pools: self.pools,
            candidates: self.pools.map(Q::driver).unwrap_or(&[]).iter(),
        }
    }

    pub fn each(&self, mut f: impl FnMut(Entity, Q::Item<'r>)) {
        for (entity, item) in self.iter() {
            f(entity, item);
        }
    }
}

impl<'r, Q: MultiQuery> IntoIterator for MultiView<'r, Q> {
    type Item = (Entity, Q::Item<'r>);
    type IntoIter = MultiViewIter<'r, Q>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct MultiViewIter<'r, Q: MultiQuery> {
    pools: Option<Q::Pools<'r>>,
    candidates: slice::Iter<'r, Entity>,
}

impl<'r, Q: MultiQuery> Iterator for MultiViewIter<'r, Q> {
    type Item = (Entity, Q::Item<'r>);

    fn next(&mut self) -> Option<Self::Item> {
        let pools = self.pools?;
        self.candidates
            .by_ref()
            .find_map(|&entity| Q::fetch_item(pools, entity).map(|item| (entity, item)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.candidates.len()))
    }
}

macro_rules! impl_multi_query {
    ($(($idx:tt, $T:ident, $p:ident)),+) => {
        impl<$($T: Component),+> MultiQuery for ($($T,)+) {
            type Pools<'r> = ($(&'r ComponentPool<$T>,)+);
            type Item<'r> = ($(&'r $T,)+);

            fn fetch(registry: &Registry) -> Option<Self::Pools<'_>> {
                Some(($(registry.pool::<$T>()?,)+))
            }

            fn driver<'r>(pools: Self::Pools<'r>) -> &'r [Entity] {
                let ($($p,)+) = pools;
                [$($p.entities()),+]
                    .into_iter()
                    .min_by_key(|entities| entities.len())
                    .unwrap_or(&[])
            }

            fn fetch_item<'r>(pools: Self::Pools<'r>, entity: Entity) -> Option<Self::Item<'r>> {
                let ($($p,)+) = pools;
                Some(($($p.get(entity)?,)+))
            }
        }

        impl<$($T: Component),+> MultiQueryMut for ($($T,)+) {
            type ItemMut<'p> = ($(&'p mut $T,)+);

            fn each_mut<F>(registry: &mut Registry, mut f: F) -> usize
            where
                F: FnMut(Entity, Self::ItemMut<'_>),
            {
                let taken = ($(registry.pools.remove(&TypeId::of::<$T>()),)+);
                match taken {
                    ($(Some(mut $p),)+) => {
                        let mut visited = 0;
                        if let ($(Some($p),)+) =
                            ($($p.as_any_mut().downcast_mut::<ComponentPool<$T>>(),)+)
                        {
                            let lens = [$($p.len()),+];
                            let (driver, &driver_len) = lens
                                .iter()
                                .enumerate()
                                .min_by_key(|&(_, len)| *len)
                                .unwrap_or((0, &0));
                            for dense in 0..driver_len {
                                let entity = match driver {
                                    $($idx => $p.entity_at(dense),)+
                                    _ => unreachable!("driver index out of range"),
                                };
                                let ($(Some($p),)+) = ($($p.get_mut(entity),)+) else {
                                    continue;
                                };
                                f(entity, ($($p,)+));
                                visited += 1;
                            }
                        }
                        $(registry.pools.insert(TypeId::of::<$T>(), $p);)+
                        visited
                    }
                    ($($p,)+) => {
                        // Some pool is missing: nothing to visit, put back what we took.
                        $(
                            if let Some(pool) = $p {
                                registry.pools.insert(TypeId::of::<$T>(), pool);
                            }
                        )+
                        0
                    }
                }
            }
        }
    };
}

impl_multi_query!((0, A, a), (1, B, b));
impl_multi_query!((0, A, a), (1, B, b), (2, C, c));
impl_multi_query!((0, A, a), (1, B, b), (2, C, c), (3, D, d));
