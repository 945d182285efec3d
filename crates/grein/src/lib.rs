//! # Grein: Scene Core
//!
//! A sparse-set ECS with a scene hierarchy on top: generational entity
//! handles, one packed pool per component type, views that iterate the
//! intersection of pools from the smallest one, parent/child links with
//! dirty-flag transform propagation, and extraction of render-ready frame
//! snapshots.
//!
//! Start with `use grein::prelude::*` and a [`SceneGraph`](scene::SceneGraph).
//!
//! Everything here is single-threaded. Hand a [`FrameSnapshot`](render::FrameSnapshot)
//! to other threads instead of the registry.

pub mod config;
pub mod ecs;
pub mod math;
pub mod prelude;
pub mod render;
pub mod scene;

#[cfg(feature = "diagnostics")]
pub mod diag;
