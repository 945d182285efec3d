//! Core scene components.
//!
//! Every entity made by [`SceneGraph::create_entity`](super::SceneGraph::create_entity)
//! carries an [`IdentityComponent`], a [`TagComponent`], a
//! [`TransformComponent`] and a [`RelationshipComponent`]. Meshes and cameras
//! are attached selectively.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ecs::Entity;
use crate::math::{Mat4, Vec3, compose_trs};
use crate::render::{INVALID_RENDER_ID, RenderId};

/// Stable external identity. Never changes after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentityComponent {
    pub id: Uuid,
}

impl IdentityComponent {
    pub fn new() -> Self {
        Self { id: Uuid::new_v4() }
    }
}

impl Default for IdentityComponent {
    fn default() -> Self {
        Self::new()
    }
}

/// User-facing label. Not unique.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagComponent {
    pub name: String,
}

impl TagComponent {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Local transform relative to the parent, plus the cached world matrix.
///
/// Set `is_dirty` (or call
/// [`SceneGraph::mark_transform_dirty`](super::SceneGraph::mark_transform_dirty))
/// after editing the local fields; the next transform update recomputes
/// `world_matrix` for this entity and its whole subtree.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformComponent {
    pub local_position: Vec3,
    /// Euler angles in radians, applied X, Y, Z.
    pub local_rotation: Vec3,
    pub local_scale: Vec3,
    pub world_matrix: Mat4,
    pub is_dirty: bool,
}

impl TransformComponent {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            local_position: position,
            ..Self::default()
        }
    }

    pub fn local_matrix(&self) -> Mat4 {
        compose_trs(self.local_position, self.local_rotation, self.local_scale)
    }

    /// World-space position, as of the last transform update.
    pub fn world_position(&self) -> Vec3 {
        self.world_matrix.w_axis.truncate()
    }
}

impl Default for TransformComponent {
    fn default() -> Self {
        Self {
            local_position: Vec3::ZERO,
            local_rotation: Vec3::ZERO,
            local_scale: Vec3::ONE,
            world_matrix: Mat4::IDENTITY,
            is_dirty: true,
        }
    }
}

/// Hierarchy links. Siblings form an intrusive doubly-linked list headed by
/// the parent's `first_child`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipComponent {
    pub parent: Entity,
    pub first_child: Entity,
    pub prev_sibling: Entity,
    pub next_sibling: Entity,
    pub children_count: usize,
}

impl Default for RelationshipComponent {
    fn default() -> Self {
        Self {
            parent: Entity::NULL,
            first_child: Entity::NULL,
            prev_sibling: Entity::NULL,
            next_sibling: Entity::NULL,
            children_count: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshRendererComponent {
    /// Source asset the mesh id was loaded from.
    pub mesh_asset_path: String,
    pub mesh_id: RenderId,
    pub material_id: RenderId,
    pub cast_shadows: bool,
    pub receive_shadows: bool,
    /// Disabled meshes are skipped by frame extraction.
    pub enabled: bool,
}

impl MeshRendererComponent {
    pub fn new(mesh_id: RenderId, material_id: RenderId) -> Self {
        Self {
            mesh_id,
            material_id,
            ..Self::default()
        }
    }
}

impl Default for MeshRendererComponent {
    fn default() -> Self {
        Self {
            mesh_asset_path: String::new(),
            mesh_id: INVALID_RENDER_ID,
            material_id: INVALID_RENDER_ID,
            cast_shadows: true,
            receive_shadows: true,
            enabled: true,
        }
    }
}

/// Projection parameters and the matrices derived from them.
///
/// The view matrix follows the entity's world transform every camera update.
/// The projection is only rebuilt when `is_dirty` is set or the viewport
/// size changes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraComponent {
    pub is_perspective: bool,
    /// Vertical field of view in radians.
    pub fov: f32,
    /// Full height of the orthographic view volume.
    pub ortho_size: f32,
    pub near_clip: f32,
    pub far_clip: f32,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub view_matrix: Mat4,
    pub projection_matrix: Mat4,
    pub view_projection_matrix: Mat4,
    pub is_dirty: bool,
}

impl CameraComponent {
    pub fn perspective(fov: f32, near_clip: f32, far_clip: f32) -> Self {
        Self {
            is_perspective: true,
            fov,
            near_clip,
            far_clip,
            ..Self::default()
        }
    }

    pub fn orthographic(ortho_size: f32, near_clip: f32, far_clip: f32) -> Self {
        Self {
            is_perspective: false,
            ortho_size,
            near_clip,
            far_clip,
            ..Self::default()
        }
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.viewport_width as f32 / self.viewport_height as f32
    }

    /// Projection for the current parameters and viewport (right-handed,
    /// depth 0..1).
    pub fn compute_projection(&self) -> Mat4 {
        let aspect = self.aspect_ratio();
        if self.is_perspective {
            Mat4::perspective_rh(self.fov, aspect, self.near_clip, self.far_clip)
        } else {
            let half_width = self.ortho_size * aspect * 0.5;
            let half_height = self.ortho_size * 0.5;
            Mat4::orthographic_rh(
                -half_width,
                half_width,
                -half_height,
                half_height,
                self.near_clip,
                self.far_clip,
            )
        }
    }
}

impl Default for CameraComponent {
    fn default() -> Self {
        Self {
            is_perspective: true,
            fov: 45.0_f32.to_radians(),
            ortho_size: 10.0,
            near_clip: 0.1,
            far_clip: 1000.0,
            viewport_width: 1920,
            viewport_height: 1080,
            view_matrix: Mat4::IDENTITY,
            projection_matrix: Mat4::IDENTITY,
            view_projection_matrix: Mat4::IDENTITY,
            is_dirty: true,
        }
    }
}
