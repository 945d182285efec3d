//! # Render Extraction
//!
//! The bridge between the live scene and a renderer. Nothing here draws:
//! [`extract_frame_snapshot`] copies what a frame needs out of the registry
//! into a [`FrameSnapshot`], and [`FrameSnapshotBuffer`] hands finished
//! snapshots to the render side.
//!
//! - [`snapshot`]: Snapshot data types and the GPU instance layout
//! - [`extract`]: Registry to snapshot
//! - [`buffer`]: Double buffering

pub mod buffer;
pub mod extract;
pub mod snapshot;

pub use buffer::FrameSnapshotBuffer;
pub use extract::{MeshBounds, extract_frame_snapshot};
pub use snapshot::{
    Aabb, FrameSnapshot, GpuMeshInstance, INVALID_RENDER_ID, LightInstance, MeshInstance, RenderId,
    ViewSnapshot,
};
