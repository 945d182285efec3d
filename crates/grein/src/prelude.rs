//! Convenience re-exports: `use grein::prelude::*` for the common items.

pub use crate::config::{ConfigError, SceneConfig};
pub use crate::ecs::{Component, ComponentPool, EcsError, Entity, Registry};
pub use crate::math::{Mat4, Quat, Vec3, Vec4};
pub use crate::render::{
    Aabb, FrameSnapshot, FrameSnapshotBuffer, MeshBounds, RenderId, extract_frame_snapshot,
};
pub use crate::scene::{
    CameraComponent, IdentityComponent, MeshRendererComponent, RelationshipComponent, SceneGraph,
    TagComponent, TransformComponent,
};
#[cfg(feature = "diagnostics")]
pub use crate::diag::{PoolStats, RegistryStats};
