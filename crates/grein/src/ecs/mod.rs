//! # Sparse-Set ECS
//!
//! Entities are generational handles, components live in one packed pool per
//! type, and systems are plain functions that walk views over those pools.
//! The layout follows [EnTT](https://github.com/skypjack/entt): cheap
//! attach/detach, cache-friendly single-type iteration, and multi-type
//! iteration driven by the smallest pool.
//!
//! ## Module Overview
//!
//! - [`entity`]: Generational entity handles and the slot allocator
//! - [`pool`]: Sparse-set storage for one component type
//! - [`registry`]: Central container (entities + pools)
//! - [`view`]: Single- and multi-pool iteration
//! - [`error`]: Errors for the checked registry API

pub mod entity;
pub mod error;
pub mod pool;
pub mod registry;
pub mod view;

pub use entity::Entity;
pub use error::EcsError;
pub use pool::{Component, ComponentPool};
pub use registry::{ComponentSet, Registry};
pub use view::{MultiQuery, MultiQueryMut, MultiView, View, ViewMut};
