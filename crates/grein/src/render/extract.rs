//! Frame extraction: read the registry, fill a [`FrameSnapshot`].
//!
//! Extraction only reads. It copies the active camera's matrices and every
//! drawable mesh (enabled, with a real mesh id) together with its world
//! transform. Transforms and cameras should be updated first, otherwise the
//! snapshot carries last frame's matrices.

use std::collections::HashMap;

use crate::ecs::Registry;
use crate::math::{Vec3, translation_of};
use crate::scene::{CameraComponent, MeshRendererComponent, TransformComponent, find_active_camera};

use super::snapshot::{Aabb, FrameSnapshot, INVALID_RENDER_ID, MeshInstance, RenderId};

/// Lookup of local-space mesh bounds, usually backed by the renderer's
/// resource registry.
pub trait MeshBounds {
    fn mesh_bounds(&self, mesh_id: RenderId) -> Option<Aabb>;
}

impl MeshBounds for HashMap<RenderId, Aabb> {
    fn mesh_bounds(&self, mesh_id: RenderId) -> Option<Aabb> {
        self.get(&mesh_id).copied()
    }
}

/// Rebuild `snapshot` from the current registry state.
///
/// The snapshot is reset first. Meshes go to `dynamic_meshes`; world bounds
/// are left zeroed for meshes whose bounds `resources` does not know.
pub fn extract_frame_snapshot(
    registry: &Registry,
    resources: &impl MeshBounds,
    main_camera_tag: &str,
    snapshot: &mut FrameSnapshot,
) {
    snapshot.reset();

    if let Some(camera_entity) = find_active_camera(registry, main_camera_tag) {
        if let Ok(camera) = registry.try_get::<CameraComponent>(camera_entity) {
            let view = &mut snapshot.main_view;
            view.view_matrix = camera.view_matrix;
            view.projection_matrix = camera.projection_matrix;
            view.camera_position = registry
                .try_get::<TransformComponent>(camera_entity)
                .map_or(Vec3::ZERO, |transform| translation_of(&transform.world_matrix));
            view.has_camera = true;
        }
    }

    registry
        .multi_view::<(TransformComponent, MeshRendererComponent)>()
        .each(|_, (transform, mesh)| {
            if !mesh.enabled || mesh.mesh_id == INVALID_RENDER_ID {
                return;
            }
            let world_bounds = resources
                .mesh_bounds(mesh.mesh_id)
                .map(|local| local.transformed(&transform.world_matrix))
                .unwrap_or_default();
            snapshot.dynamic_meshes.push(MeshInstance {
                world_transform: transform.world_matrix,
                mesh_id: mesh.mesh_id,
                material_id: mesh.material_id,
                world_bounds,
            });
        });

    log::trace!(
        "extracted {} meshes (camera: {})",
        snapshot.dynamic_meshes.len(),
        snapshot.main_view.has_camera
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::Entity;
    use crate::math::Mat4;
    use crate::scene::SceneGraph;

    fn no_bounds() -> HashMap<RenderId, Aabb> {
        HashMap::new()
    }

    fn mesh_entity(scene: &mut SceneGraph, name: &str, position: Vec3, mesh: MeshRendererComponent) -> Entity {
        let e = scene.create_entity(name);
        let registry = scene.registry_mut();
        registry.get_mut::<TransformComponent>(e).local_position = position;
        registry.emplace(e, mesh);
        e
    }

    #[test]
    fn drawable_meshes_are_extracted_with_world_bounds() {
        let mut scene = SceneGraph::new();
        mesh_entity(&mut scene, "cube", Vec3::new(3.0, 0.0, 0.0), MeshRendererComponent::new(1, 2));
        scene.update_transforms();

        let bounds: HashMap<RenderId, Aabb> = HashMap::from([(1, Aabb::new(Vec3::splat(-0.5), Vec3::splat(0.5)))]);
        let mut snapshot = FrameSnapshot::default();
        extract_frame_snapshot(scene.registry(), &bounds, "MainCamera", &mut snapshot);

        assert_eq!(snapshot.dynamic_meshes.len(), 1);
        let instance = &snapshot.dynamic_meshes[0];
        assert_eq!((instance.mesh_id, instance.material_id), (1, 2));
        assert!(instance.world_bounds.min.abs_diff_eq(Vec3::new(2.5, -0.5, -0.5), 1e-5));
        assert!(instance.world_bounds.max.abs_diff_eq(Vec3::new(3.5, 0.5, 0.5), 1e-5));
        assert!(!snapshot.main_view.has_camera);
    }

    #[test]
    fn disabled_and_unloaded_meshes_are_skipped() {
        let mut scene = SceneGraph::new();
        let disabled = MeshRendererComponent {
            enabled: false,
            ..MeshRendererComponent::new(4, 1)
        };
        mesh_entity(&mut scene, "hidden", Vec3::ZERO, disabled);
        mesh_entity(&mut scene, "unloaded", Vec3::ZERO, MeshRendererComponent::default());
        mesh_entity(&mut scene, "shown", Vec3::ZERO, MeshRendererComponent::new(5, 1));
        scene.update_transforms();

        let mut snapshot = FrameSnapshot::default();
        extract_frame_snapshot(scene.registry(), &no_bounds(), "MainCamera", &mut snapshot);

        assert_eq!(snapshot.dynamic_meshes.len(), 1);
        assert_eq!(snapshot.dynamic_meshes[0].mesh_id, 5);
        assert_eq!(snapshot.dynamic_meshes[0].world_bounds, Aabb::default());
    }

    #[test]
    fn active_camera_fills_main_view() {
        let mut scene = SceneGraph::new();
        let cam = scene.create_entity("MainCamera");
        scene.registry_mut().get_mut::<TransformComponent>(cam).local_position = Vec3::new(0.0, 2.0, 8.0);
        scene.add_camera(cam, CameraComponent::default());
        scene.update_transforms();
        scene.update_cameras(1280, 720);

        let mut snapshot = FrameSnapshot::default();
        extract_frame_snapshot(scene.registry(), &no_bounds(), "MainCamera", &mut snapshot);

        let camera = scene.registry().get::<CameraComponent>(cam);
        assert!(snapshot.main_view.has_camera);
        assert_eq!(snapshot.main_view.view_matrix, camera.view_matrix);
        assert_eq!(snapshot.main_view.projection_matrix, camera.projection_matrix);
        assert!(snapshot.main_view.camera_position.abs_diff_eq(Vec3::new(0.0, 2.0, 8.0), 1e-5));
        assert_ne!(snapshot.main_view.projection_matrix, Mat4::IDENTITY);
    }

    #[test]
    fn extraction_replaces_previous_contents() {
        let mut scene = SceneGraph::new();
        let e = mesh_entity(&mut scene, "a", Vec3::ZERO, MeshRendererComponent::new(1, 1));
        scene.update_transforms();

        let mut snapshot = FrameSnapshot::default();
        extract_frame_snapshot(scene.registry(), &no_bounds(), "MainCamera", &mut snapshot);
        assert_eq!(snapshot.mesh_count(), 1);

        scene.destroy_entity(e);
        extract_frame_snapshot(scene.registry(), &no_bounds(), "MainCamera", &mut snapshot);
        assert_eq!(snapshot.mesh_count(), 0);
    }
}
