//! Camera matrices and active-camera lookup.

use crate::ecs::{Entity, Registry};
use crate::math::Mat4;

use super::components::{CameraComponent, TagComponent, TransformComponent};
use super::graph::SceneGraph;

impl SceneGraph {
    /// Refresh every camera for the given viewport.
    ///
    /// The view matrix is always rebuilt from the entity's world transform
    /// (identity if it has none). The projection is rebuilt only for cameras
    /// that are dirty or whose viewport size changed. Returns the number of
    /// cameras updated; a zero-sized viewport updates nothing.
    pub fn update_cameras(&mut self, viewport_width: u32, viewport_height: u32) -> usize {
        if viewport_width == 0 || viewport_height == 0 {
            log::debug!("skipping camera update for empty viewport {viewport_width}x{viewport_height}");
            return 0;
        }

        let updated = self
            .registry
            .with_detached_pool::<CameraComponent, _>(|cameras, registry| {
                let transforms = registry.pool::<TransformComponent>();
                for (entity, camera) in cameras.iter_mut() {
                    if camera.viewport_width != viewport_width || camera.viewport_height != viewport_height {
                        camera.viewport_width = viewport_width;
                        camera.viewport_height = viewport_height;
                        camera.is_dirty = true;
                    }

                    camera.view_matrix = transforms
                        .and_then(|pool| pool.get(entity))
                        .map_or(Mat4::IDENTITY, |transform| transform.world_matrix.inverse());

                    if camera.is_dirty {
                        camera.projection_matrix = camera.compute_projection();
                        camera.is_dirty = false;
                    }
                    camera.view_projection_matrix = camera.projection_matrix * camera.view_matrix;
                }
                cameras.len()
            });

        updated.unwrap_or_else(|| {
            log::debug!("no cameras in scene");
            0
        })
    }

    /// The camera tagged with the configured main-camera name, else the first
    /// camera in pool order, else `None`.
    pub fn active_camera(&self) -> Option<Entity> {
        find_active_camera(&self.registry, &self.config.main_camera_tag)
    }
}

pub(crate) fn find_active_camera(registry: &Registry, main_tag: &str) -> Option<Entity> {
    let cameras = registry.pool::<CameraComponent>()?;
    let tagged = registry.pool::<TagComponent>().and_then(|tags| {
        tags.iter()
            .find(|(entity, tag)| tag.name == main_tag && cameras.contains(*entity))
            .map(|(entity, _)| entity)
    });
    tagged.or_else(|| cameras.entities().first().copied())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SceneConfig;
    use crate::math::Vec3;

    fn camera_scene() -> (SceneGraph, Entity) {
        let mut scene = SceneGraph::new();
        let cam = scene.create_entity("MainCamera");
        scene.add_camera(cam, CameraComponent::default());
        (scene, cam)
    }

    #[test]
    fn view_is_inverse_of_world() {
        let (mut scene, cam) = camera_scene();
        scene
            .registry_mut()
            .get_mut::<TransformComponent>(cam)
            .local_position = Vec3::new(0.0, 0.0, 10.0);
        scene.update_transforms();

        assert_eq!(scene.update_cameras(800, 600), 1);

        let camera = scene.registry().get::<CameraComponent>(cam);
        let origin_in_view = camera.view_matrix.transform_point3(Vec3::ZERO);
        assert!(origin_in_view.abs_diff_eq(Vec3::new(0.0, 0.0, -10.0), 1e-5));
        assert!(!camera.is_dirty);
        assert!(
            camera
                .view_projection_matrix
                .abs_diff_eq(camera.projection_matrix * camera.view_matrix, 1e-6)
        );
    }

    #[test]
    fn viewport_change_rebuilds_projection() {
        let (mut scene, cam) = camera_scene();
        scene.update_cameras(800, 800);
        let square = scene.registry().get::<CameraComponent>(cam).projection_matrix;

        scene.update_cameras(1600, 800);
        let camera = scene.registry().get::<CameraComponent>(cam);
        assert_eq!((camera.viewport_width, camera.viewport_height), (1600, 800));
        assert_ne!(camera.projection_matrix, square);
        let expected = Mat4::perspective_rh(camera.fov, 2.0, camera.near_clip, camera.far_clip);
        assert!(camera.projection_matrix.abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn clean_camera_keeps_projection() {
        let (mut scene, cam) = camera_scene();
        scene.update_cameras(800, 600);
        // Edit a parameter without marking the camera dirty.
        scene.registry_mut().get_mut::<CameraComponent>(cam).fov = 1.0;
        let before = scene.registry().get::<CameraComponent>(cam).projection_matrix;

        scene.update_cameras(800, 600);
        assert_eq!(scene.registry().get::<CameraComponent>(cam).projection_matrix, before);

        scene.registry_mut().get_mut::<CameraComponent>(cam).is_dirty = true;
        scene.update_cameras(800, 600);
        assert_ne!(scene.registry().get::<CameraComponent>(cam).projection_matrix, before);
    }

    #[test]
    fn zero_viewport_is_ignored() {
        let (mut scene, cam) = camera_scene();
        assert_eq!(scene.update_cameras(0, 600), 0);
        assert!(scene.registry().get::<CameraComponent>(cam).is_dirty);
    }

    #[test]
    fn no_camera_pool_updates_nothing() {
        let mut scene = SceneGraph::new();
        scene.create_entity("lonely");
        assert_eq!(scene.update_cameras(800, 600), 0);
        assert_eq!(scene.active_camera(), None);
    }

    #[test]
    fn active_camera_prefers_main_tag() {
        let mut scene = SceneGraph::new();
        let first = scene.create_entity("Secondary");
        scene.add_camera(first, CameraComponent::default());
        let main = scene.create_entity("MainCamera");
        scene.add_camera(main, CameraComponent::default());

        assert_eq!(scene.active_camera(), Some(main));

        scene.destroy_entity(main);
        assert_eq!(scene.active_camera(), Some(first));
    }

    #[test]
    fn main_tag_without_camera_falls_back() {
        let mut scene = SceneGraph::new();
        scene.create_entity("MainCamera");
        let cam = scene.create_entity("Other");
        scene.add_camera(cam, CameraComponent::default());
        assert_eq!(scene.active_camera(), Some(cam));
    }

    #[test]
    fn main_tag_is_configurable() {
        let config = SceneConfig {
            main_camera_tag: "Director".into(),
            ..SceneConfig::default()
        };
        let mut scene = SceneGraph::with_config(config);
        let other = scene.create_entity("MainCamera");
        scene.add_camera(other, CameraComponent::default());
        let director = scene.create_entity("Director");
        scene.add_camera(director, CameraComponent::default());
        assert_eq!(scene.active_camera(), Some(director));
    }
}
