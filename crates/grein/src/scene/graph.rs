//! # Scene Graph: Hierarchy on Top of the Registry
//!
//! [`SceneGraph`] owns a [`Registry`] and gives every entity it creates the
//! four core components. Parent/child links live in
//! [`RelationshipComponent`] as an intrusive list:
//!
//! ```text
//! parent.first_child ──► c3 ⇄ c2 ⇄ c1        (newest child first)
//!                        │    │    │
//!                        └────┴────┴── .parent = parent
//! ```
//!
//! Linking prepends, so children are listed newest first. Unlinking patches
//! the neighbours (or the parent's `first_child`) in O(1).
//!
//! ## Permissive Operations
//!
//! Hierarchy operations never panic on bad input. Dead handles, missing
//! components and no-op requests all return `false`. Two requests are
//! refused loudly (logged at `warn`): parenting an entity to itself, and
//! parenting it to one of its own descendants. Either would close a loop in
//! the forest, and the hierarchy walks (destroy, transform update) would
//! then never terminate.

use crate::config::SceneConfig;
use crate::ecs::{Entity, Registry};

use super::components::{
    CameraComponent, IdentityComponent, RelationshipComponent, TagComponent, TransformComponent,
};

/// A registry plus the hierarchy and transform bookkeeping for its entities.
pub struct SceneGraph {
    pub(super) registry: Registry,
    pub(super) config: SceneConfig,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::with_config(SceneConfig::default())
    }

    pub fn with_config(config: SceneConfig) -> Self {
        Self {
            registry: Registry::with_capacity(config.entity_capacity),
            config,
        }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Direct registry access for attaching and editing components.
    ///
    /// Editing a [`RelationshipComponent`] by hand can break the hierarchy;
    /// use [`SceneGraph::set_parent`] instead.
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Create an unparented entity with identity, tag, transform and
    /// relationship components. Its transform starts dirty.
    pub fn create_entity(&mut self, name: impl Into<String>) -> Entity {
        let entity = self.registry.create();
        self.registry.emplace(entity, IdentityComponent::new());
        let tag = self.registry.emplace(entity, TagComponent::new(name));
        log::trace!("scene entity {entity} '{}'", tag.name);
        self.registry.emplace(entity, TransformComponent::default());
        self.registry.emplace(entity, RelationshipComponent::default());
        entity
    }

    /// Destroy `entity` and its whole subtree, children before parents.
    ///
    /// Returns `false` if the handle was already dead.
    pub fn destroy_entity(&mut self, entity: Entity) -> bool {
        if !self.registry.valid(entity) {
            return false;
        }
        self.unlink_from_parent(entity);

        // Breadth-first, so every child lands after its parent.
        let mut subtree = vec![entity];
        let mut next = 0;
        while next < subtree.len() {
            let mut child = self
                .relationship(subtree[next])
                .map_or(Entity::NULL, |rel| rel.first_child);
            while let Some(rel) = self.relationship(child) {
                subtree.push(child);
                child = rel.next_sibling;
            }
            next += 1;
        }

        // Links inside the subtree die with it; only the root needed unlinking.
        for &doomed in subtree.iter().rev() {
            self.registry.destroy(doomed);
        }
        log::debug!("destroyed subtree of {entity} ({} entities)", subtree.len());
        true
    }

    // ── Hierarchy ────────────────────────────────────────────────────

    /// Move `child` under `new_parent`, or detach it with [`Entity::NULL`].
    ///
    /// The child becomes the first entry of the new parent's child list and
    /// its transform is marked dirty. Returns whether the hierarchy changed.
    pub fn set_parent(&mut self, child: Entity, new_parent: Entity) -> bool {
        let Some(current) = self.relationship(child) else {
            return false;
        };

        if child == new_parent {
            log::warn!("refused to parent {child} to itself");
            return false;
        }

        if !new_parent.is_null() {
            if self.relationship(new_parent).is_none() {
                log::warn!("refused to parent {child} to {new_parent}: parent is dead or outside the hierarchy");
                return false;
            }
            if self.is_descendant(new_parent, child) {
                log::warn!("refused to parent {child} to its descendant {new_parent}");
                return false;
            }
        }

        if current.parent == new_parent {
            return false;
        }

        self.unlink_from_parent(child);
        if !new_parent.is_null() {
            self.link_to_parent(child, new_parent);
        }
        self.mark_transform_dirty(child);
        true
    }

    fn unlink_from_parent(&mut self, child: Entity) {
        let Some(rel) = self.relationship(child) else {
            return;
        };
        if rel.parent.is_null() {
            return;
        }

        if rel.prev_sibling.is_null() {
            if let Some(parent) = self.relationship_mut(rel.parent) {
                parent.first_child = rel.next_sibling;
            }
        } else if let Some(prev) = self.relationship_mut(rel.prev_sibling) {
            prev.next_sibling = rel.next_sibling;
        }

        if let Some(next) = self.relationship_mut(rel.next_sibling) {
            next.prev_sibling = rel.prev_sibling;
        }

        if let Some(parent) = self.relationship_mut(rel.parent) {
            parent.children_count = parent.children_count.saturating_sub(1);
        }

        if let Some(rel) = self.relationship_mut(child) {
            rel.parent = Entity::NULL;
            rel.prev_sibling = Entity::NULL;
            rel.next_sibling = Entity::NULL;
        }
    }

    fn link_to_parent(&mut self, child: Entity, parent: Entity) {
        let Some(old_head) = self.relationship(parent).map(|rel| rel.first_child) else {
            return;
        };

        if let Some(rel) = self.relationship_mut(child) {
            rel.parent = parent;
            rel.prev_sibling = Entity::NULL;
            rel.next_sibling = old_head;
        }
        if let Some(head) = self.relationship_mut(old_head) {
            head.prev_sibling = child;
        }
        if let Some(rel) = self.relationship_mut(parent) {
            rel.first_child = child;
            rel.children_count += 1;
        }
    }

    /// Parent of `entity`, if it is alive and has one.
    pub fn parent_of(&self, entity: Entity) -> Option<Entity> {
        self.relationship(entity)
            .map(|rel| rel.parent)
            .filter(|parent| !parent.is_null())
    }

    /// Direct children in sibling-list order (most recently attached first).
    pub fn children_of(&self, entity: Entity) -> Vec<Entity> {
        let mut children = Vec::new();
        let mut child = self.relationship(entity).map_or(Entity::NULL, |rel| rel.first_child);
        while let Some(rel) = self.relationship(child) {
            children.push(child);
            child = rel.next_sibling;
        }
        children
    }

    /// Whether `ancestor` appears on the parent chain of `maybe_descendant`.
    /// An entity counts as its own descendant.
    pub fn is_descendant(&self, maybe_descendant: Entity, ancestor: Entity) -> bool {
        if maybe_descendant.is_null() || ancestor.is_null() {
            return false;
        }
        let mut current = maybe_descendant;
        while !current.is_null() {
            if current == ancestor {
                return true;
            }
            match self.relationship(current) {
                Some(rel) => current = rel.parent,
                None => break,
            }
        }
        false
    }

    /// Entities without a parent, in relationship-pool order.
    pub fn roots(&self) -> Vec<Entity> {
        self.registry
            .view::<RelationshipComponent>()
            .iter()
            .filter(|(_, rel)| rel.parent.is_null())
            .map(|(entity, _)| entity)
            .collect()
    }

    // ── Components ───────────────────────────────────────────────────

    /// Flag the entity's transform for recomputation on the next update.
    pub fn mark_transform_dirty(&mut self, entity: Entity) -> bool {
        match self.registry.pool_mut::<TransformComponent>().and_then(|pool| pool.get_mut(entity)) {
            Some(transform) => {
                transform.is_dirty = true;
                true
            }
            None => false,
        }
    }

    pub fn name_of(&self, entity: Entity) -> Option<&str> {
        self.registry
            .pool::<TagComponent>()?
            .get(entity)
            .map(|tag| tag.name.as_str())
    }

    /// Attach (or replace) a camera, sized to the configured default viewport.
    pub fn add_camera(&mut self, entity: Entity, mut camera: CameraComponent) -> bool {
        if !self.registry.valid(entity) {
            return false;
        }
        let (width, height) = self.config.default_viewport;
        camera.viewport_width = width;
        camera.viewport_height = height;
        camera.is_dirty = true;
        self.registry.emplace_or_replace(entity, camera);
        true
    }

    /// Per-frame runtime update. Returns the number of recomputed transforms.
    pub fn on_update(&mut self, _dt: f32) -> usize {
        self.update_transforms()
    }

    // ── Helpers ──────────────────────────────────────────────────────

    pub(super) fn relationship(&self, entity: Entity) -> Option<RelationshipComponent> {
        self.registry
            .pool::<RelationshipComponent>()?
            .get(entity)
            .copied()
    }

    fn relationship_mut(&mut self, entity: Entity) -> Option<&mut RelationshipComponent> {
        self.registry
            .pool_mut::<RelationshipComponent>()?
            .get_mut(entity)
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(scene: &mut SceneGraph, parent: Entity, child: Entity) {
        assert!(scene.set_parent(child, parent));
    }

    #[test]
    fn create_entity_attaches_core_components() {
        let mut scene = SceneGraph::new();
        let e = scene.create_entity("Player");
        let registry = scene.registry();
        assert!(registry.all_of::<(
            IdentityComponent,
            TagComponent,
            TransformComponent,
            RelationshipComponent,
        )>(e));
        assert_eq!(scene.name_of(e), Some("Player"));
        assert!(registry.get::<TransformComponent>(e).is_dirty);
        assert_eq!(scene.parent_of(e), None);
    }

    #[test]
    fn set_parent_links_child_and_counts() {
        let mut scene = SceneGraph::new();
        let parent = scene.create_entity("parent");
        let child = scene.create_entity("child");

        assert!(scene.set_parent(child, parent));

        let rel = scene.relationship(parent).unwrap();
        assert_eq!(rel.children_count, 1);
        assert_eq!(rel.first_child, child);
        assert_eq!(scene.parent_of(child), Some(parent));
        assert_eq!(scene.children_of(parent), vec![child]);
    }

    #[test]
    fn new_children_are_prepended() {
        let mut scene = SceneGraph::new();
        let parent = scene.create_entity("parent");
        let a = scene.create_entity("a");
        let b = scene.create_entity("b");
        let c = scene.create_entity("c");
        for child in [a, b, c] {
            chain(&mut scene, parent, child);
        }
        assert_eq!(scene.children_of(parent), vec![c, b, a]);
        assert_eq!(scene.relationship(b).unwrap().prev_sibling, c);
        assert_eq!(scene.relationship(b).unwrap().next_sibling, a);
    }

    #[test]
    fn reparent_moves_child_between_parents() {
        let mut scene = SceneGraph::new();
        let first = scene.create_entity("first");
        let second = scene.create_entity("second");
        let stay = scene.create_entity("stay");
        let mover = scene.create_entity("mover");
        chain(&mut scene, first, stay);
        chain(&mut scene, first, mover);

        assert!(scene.set_parent(mover, second));

        assert_eq!(scene.relationship(first).unwrap().children_count, 1);
        assert_eq!(scene.children_of(first), vec![stay]);
        assert_eq!(scene.relationship(second).unwrap().children_count, 1);
        assert_eq!(scene.children_of(second), vec![mover]);
        let stay_rel = scene.relationship(stay).unwrap();
        assert!(stay_rel.prev_sibling.is_null());
        assert!(stay_rel.next_sibling.is_null());
    }

    #[test]
    fn unparent_with_null() {
        let mut scene = SceneGraph::new();
        let parent = scene.create_entity("parent");
        let a = scene.create_entity("a");
        let b = scene.create_entity("b");
        let c = scene.create_entity("c");
        for child in [a, b, c] {
            chain(&mut scene, parent, child);
        }

        // Middle of the list.
        assert!(scene.set_parent(b, Entity::NULL));
        assert_eq!(scene.children_of(parent), vec![c, a]);
        assert_eq!(scene.relationship(parent).unwrap().children_count, 2);
        assert_eq!(scene.parent_of(b), None);
        assert!(scene.roots().contains(&b));

        // Head of the list.
        assert!(scene.set_parent(c, Entity::NULL));
        assert_eq!(scene.relationship(parent).unwrap().first_child, a);
        assert!(scene.relationship(a).unwrap().prev_sibling.is_null());
    }

    #[test]
    fn same_parent_is_a_no_op() {
        let mut scene = SceneGraph::new();
        let parent = scene.create_entity("parent");
        let child = scene.create_entity("child");
        chain(&mut scene, parent, child);
        scene.registry_mut().get_mut::<TransformComponent>(child).is_dirty = false;

        assert!(!scene.set_parent(child, parent));
        assert_eq!(scene.relationship(parent).unwrap().children_count, 1);
        assert!(!scene.registry().get::<TransformComponent>(child).is_dirty);
        assert!(!scene.set_parent(parent, Entity::NULL));
    }

    #[test]
    fn reparent_marks_child_dirty() {
        let mut scene = SceneGraph::new();
        let parent = scene.create_entity("parent");
        let child = scene.create_entity("child");
        scene.update_transforms();
        assert!(!scene.registry().get::<TransformComponent>(child).is_dirty);

        chain(&mut scene, parent, child);
        assert!(scene.registry().get::<TransformComponent>(child).is_dirty);
    }

    #[test]
    fn cycles_are_refused() {
        let mut scene = SceneGraph::new();
        let root = scene.create_entity("root");
        let mid = scene.create_entity("mid");
        let leaf = scene.create_entity("leaf");
        chain(&mut scene, root, mid);
        chain(&mut scene, mid, leaf);

        assert!(!scene.set_parent(root, root));
        assert!(!scene.set_parent(root, leaf));
        assert!(!scene.set_parent(mid, leaf));

        assert_eq!(scene.parent_of(root), None);
        assert_eq!(scene.parent_of(leaf), Some(mid));
        assert!(scene.is_descendant(leaf, root));
        assert!(!scene.is_descendant(root, leaf));
    }

    #[test]
    fn dead_entities_are_ignored() {
        let mut scene = SceneGraph::new();
        let alive = scene.create_entity("alive");
        let dead = scene.create_entity("dead");
        scene.destroy_entity(dead);

        assert!(!scene.set_parent(dead, alive));
        assert!(!scene.set_parent(alive, dead));
        assert!(!scene.destroy_entity(dead));
        assert!(!scene.mark_transform_dirty(dead));
        assert!(scene.children_of(dead).is_empty());
        assert_eq!(scene.parent_of(alive), None);
    }

    #[test]
    fn plain_registry_entity_cannot_join_the_hierarchy() {
        let mut scene = SceneGraph::new();
        let scene_entity = scene.create_entity("scene");
        let bare = scene.registry_mut().create();
        assert!(!scene.set_parent(bare, scene_entity));
        assert!(!scene.set_parent(scene_entity, bare));
    }

    #[test]
    fn destroy_removes_whole_subtree_without_residue() {
        let mut scene = SceneGraph::new();
        let root = scene.create_entity("root");
        let mut all = vec![root];
        // Three levels below the root: 2 children, 2 grandchildren each,
        // 1 great-grandchild per grandchild.
        for i in 0..2 {
            let child = scene.create_entity(format!("child{i}"));
            chain(&mut scene, root, child);
            all.push(child);
            for j in 0..2 {
                let grandchild = scene.create_entity(format!("grandchild{i}{j}"));
                chain(&mut scene, child, grandchild);
                all.push(grandchild);
                let leaf = scene.create_entity(format!("leaf{i}{j}"));
                chain(&mut scene, grandchild, leaf);
                all.push(leaf);
            }
        }
        assert_eq!(all.len(), 11);

        assert!(scene.destroy_entity(root));

        let registry = scene.registry();
        assert!(all.iter().all(|&e| !registry.valid(e)));
        assert_eq!(registry.alive_count(), 0);
        assert_eq!(registry.view::<IdentityComponent>().len(), 0);
        assert_eq!(registry.view::<TagComponent>().len(), 0);
        assert_eq!(registry.view::<TransformComponent>().len(), 0);
        assert_eq!(registry.view::<RelationshipComponent>().len(), 0);
    }

    #[test]
    fn destroying_a_child_unlinks_it_from_its_parent() {
        let mut scene = SceneGraph::new();
        let parent = scene.create_entity("parent");
        let a = scene.create_entity("a");
        let b = scene.create_entity("b");
        let b_child = scene.create_entity("b_child");
        chain(&mut scene, parent, a);
        chain(&mut scene, parent, b);
        chain(&mut scene, b, b_child);

        assert!(scene.destroy_entity(b));

        assert!(scene.registry().valid(parent));
        assert!(scene.registry().valid(a));
        assert!(!scene.registry().valid(b_child));
        assert_eq!(scene.children_of(parent), vec![a]);
        assert_eq!(scene.relationship(parent).unwrap().children_count, 1);
    }

    #[test]
    fn roots_lists_unparented_entities() {
        let mut scene = SceneGraph::new();
        let a = scene.create_entity("a");
        let b = scene.create_entity("b");
        let c = scene.create_entity("c");
        chain(&mut scene, a, c);

        let mut roots = scene.roots();
        roots.sort_by_key(|e| e.index());
        assert_eq!(roots, vec![a, b]);
    }

    #[test]
    fn add_camera_uses_configured_viewport() {
        let config = SceneConfig {
            default_viewport: (640, 480),
            ..SceneConfig::default()
        };
        let mut scene = SceneGraph::with_config(config);
        let e = scene.create_entity("cam");
        assert!(scene.add_camera(e, CameraComponent::default()));

        let camera = scene.registry().get::<CameraComponent>(e);
        assert_eq!((camera.viewport_width, camera.viewport_height), (640, 480));
        assert!(camera.is_dirty);
    }

    #[test]
    fn deep_chain_destroys_without_recursion() {
        const DEPTH: usize = 50_000;
        let mut scene = SceneGraph::new();
        let keeper = scene.create_entity("keeper");
        let links: Vec<Entity> = (0..DEPTH).map(|i| scene.create_entity(format!("link{i}"))).collect();
        for pair in links.windows(2).rev() {
            chain(&mut scene, pair[0], pair[1]);
        }
        chain(&mut scene, keeper, links[0]);

        assert!(scene.destroy_entity(links[0]));

        let registry = scene.registry();
        assert_eq!(registry.alive_count(), 1);
        assert!(!registry.valid(links[DEPTH - 1]));
        assert_eq!(registry.view::<RelationshipComponent>().len(), 1);
        assert!(scene.children_of(keeper).is_empty());
        assert_eq!(scene.relationship(keeper).unwrap().children_count, 0);
    }

    #[test]
    fn wide_fan_out_keeps_count_and_list_in_step() {
        let mut scene = SceneGraph::new();
        let hub = scene.create_entity("hub");
        let spokes: Vec<Entity> = (0..10_000)
            .map(|i| {
                let spoke = scene.create_entity(format!("spoke{i}"));
                chain(&mut scene, hub, spoke);
                spoke
            })
            .collect();

        assert_eq!(scene.relationship(hub).unwrap().children_count, 10_000);
        assert_eq!(scene.children_of(hub).len(), 10_000);

        assert!(scene.destroy_entity(spokes[5_000]));
        assert_eq!(scene.relationship(hub).unwrap().children_count, 9_999);
        assert_eq!(scene.children_of(hub).len(), 9_999);

        assert!(scene.destroy_entity(hub));
        assert_eq!(scene.registry().alive_count(), 0);
    }
}
