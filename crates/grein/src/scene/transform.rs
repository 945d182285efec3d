//! # Transform Propagation
//!
//! World matrices are recomputed top-down from every root:
//!
//! ```text
//! dirty(e) = e.is_dirty || dirty(parent)
//! if dirty(e): e.world = parent.world * e.local; e.is_dirty = false
//! ```
//!
//! A clean child under a dirty ancestor is recomputed anyway: its own local
//! data did not change, but its effective world matrix did. Clean subtrees
//! under clean roots are walked but not recomputed.
//!
//! Roots are found by scanning the relationship pool once per update. The
//! walk keeps its own worklist, so hierarchy depth is bounded by memory and
//! not by the call stack. An entity with a relationship but no transform
//! stops the walk for its subtree.

use crate::ecs::Entity;
use crate::math::Mat4;

use super::components::TransformComponent;
use super::graph::SceneGraph;

impl SceneGraph {
    /// Recompute world matrices for everything dirty, directly or through an
    /// ancestor. Returns how many matrices were recomputed.
    pub fn update_transforms(&mut self) -> usize {
        let mut pending: Vec<(Entity, Mat4, bool)> = self
            .roots()
            .into_iter()
            .map(|root| (root, Mat4::IDENTITY, false))
            .collect();

        let mut updated = 0;
        while let Some((entity, parent_world, parent_dirty)) = pending.pop() {
            let Some(transform) = self
                .registry
                .pool_mut::<TransformComponent>()
                .and_then(|pool| pool.get_mut(entity))
            else {
                continue;
            };

            let dirty = transform.is_dirty || parent_dirty;
            if dirty {
                transform.world_matrix = parent_world * transform.local_matrix();
                transform.is_dirty = false;
                updated += 1;
            }
            let world = transform.world_matrix;

            let mut child = self
                .relationship(entity)
                .map_or(Entity::NULL, |rel| rel.first_child);
            while let Some(rel) = self.relationship(child) {
                pending.push((child, world, dirty));
                child = rel.next_sibling;
            }
        }
        updated
    }
}
