//! # Scene Layer
//!
//! - [`components`]: Core and optional scene components
//! - [`graph`]: [`SceneGraph`]: creation, destruction, parenting
//! - [`transform`]: World-matrix propagation
//! - [`camera`]: Camera matrices and active-camera lookup
//!
//! ## Usage
//!
//! ```ignore
//! let mut scene = SceneGraph::new();
//! let ship = scene.create_entity("Ship");
//! let turret = scene.create_entity("Turret");
//! scene.set_parent(turret, ship);
//!
//! scene.registry_mut().get_mut::<TransformComponent>(ship).local_position = Vec3::X;
//! scene.mark_transform_dirty(ship);
//! scene.update_transforms(); // turret follows the ship
//! ```

pub mod camera;
pub mod components;
pub mod graph;
pub mod transform;

pub(crate) use camera::find_active_camera;
pub use components::{
    CameraComponent, IdentityComponent, MeshRendererComponent, RelationshipComponent, TagComponent,
    TransformComponent,
};
pub use graph::SceneGraph;
