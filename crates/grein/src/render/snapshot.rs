//! Frame snapshot types.
//!
//! A [`FrameSnapshot`] is a plain copy of everything a renderer needs for one
//! frame. Once filled it has no ties to the registry, so the render side can
//! read it while the scene moves on.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::math::{Mat4, Vec3};

/// Handle to a GPU-side resource (mesh, material) owned by the renderer.
pub type RenderId = u32;

/// The "no resource" handle. Meshes with this id are never drawn.
pub const INVALID_RENDER_ID: RenderId = 0;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn corners(&self) -> [Vec3; 8] {
        let (lo, hi) = (self.min, self.max);
        [
            Vec3::new(lo.x, lo.y, lo.z),
            Vec3::new(hi.x, lo.y, lo.z),
            Vec3::new(lo.x, hi.y, lo.z),
            Vec3::new(hi.x, hi.y, lo.z),
            Vec3::new(lo.x, lo.y, hi.z),
            Vec3::new(hi.x, lo.y, hi.z),
            Vec3::new(lo.x, hi.y, hi.z),
            Vec3::new(hi.x, hi.y, hi.z),
        ]
    }

    /// Smallest box containing this box after `matrix` is applied to it.
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        self.corners().into_iter().fold(
            Self::new(Vec3::splat(f32::MAX), Vec3::splat(f32::MIN)),
            |bounds, corner| {
                let world = matrix.transform_point3(corner);
                Self::new(bounds.min.min(world), bounds.max.max(world))
            },
        )
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeshInstance {
    pub world_transform: Mat4,
    pub mesh_id: RenderId,
    pub material_id: RenderId,
    /// Zero-sized at the origin when the mesh bounds are unknown.
    pub world_bounds: Aabb,
}

impl Default for MeshInstance {
    fn default() -> Self {
        Self {
            world_transform: Mat4::IDENTITY,
            mesh_id: INVALID_RENDER_ID,
            material_id: INVALID_RENDER_ID,
            world_bounds: Aabb::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightInstance {
    pub position: Vec3,
    pub color: Vec3,
    pub radius: f32,
    pub intensity: f32,
}

impl Default for LightInstance {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            color: Vec3::ONE,
            radius: 1.0,
            intensity: 1.0,
        }
    }
}

/// The camera a frame is rendered from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewSnapshot {
    pub view_matrix: Mat4,
    pub projection_matrix: Mat4,
    pub camera_position: Vec3,
    /// `false` when the scene had no camera; the matrices are identity then.
    pub has_camera: bool,
}

impl Default for ViewSnapshot {
    fn default() -> Self {
        Self {
            view_matrix: Mat4::IDENTITY,
            projection_matrix: Mat4::IDENTITY,
            camera_position: Vec3::ZERO,
            has_camera: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub main_view: ViewSnapshot,
    pub static_meshes: Vec<MeshInstance>,
    pub dynamic_meshes: Vec<MeshInstance>,
    pub lights: Vec<LightInstance>,
}

impl FrameSnapshot {
    /// Clear for reuse. Keeps the vectors' allocations.
    pub fn reset(&mut self) {
        self.main_view = ViewSnapshot::default();
        self.static_meshes.clear();
        self.dynamic_meshes.clear();
        self.lights.clear();
    }

    pub fn mesh_count(&self) -> usize {
        self.static_meshes.len() + self.dynamic_meshes.len()
    }

    /// Every mesh instance (static first) in upload-ready form.
    pub fn gpu_instances(&self) -> Vec<GpuMeshInstance> {
        self.static_meshes
            .iter()
            .chain(&self.dynamic_meshes)
            .map(GpuMeshInstance::from)
            .collect()
    }
}

/// Per-instance data as laid out in a GPU instance buffer.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GpuMeshInstance {
    /// Column-major model matrix.
    pub model: [[f32; 4]; 4],
    pub mesh_id: u32,
    pub material_id: u32,
    pub _pad: [u32; 2],
}

impl From<&MeshInstance> for GpuMeshInstance {
    fn from(instance: &MeshInstance) -> Self {
        Self {
            model: instance.world_transform.to_cols_array_2d(),
            mesh_id: instance.mesh_id,
            material_id: instance.material_id,
            _pad: [0; 2],
        }
    }
}
