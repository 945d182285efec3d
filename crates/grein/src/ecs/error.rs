//! Typed errors for the checked (`try_*`) registry API.
//!
//! The unchecked calls (`emplace`, `get`, `get_mut`) panic on the same
//! conditions. Use the checked variants at boundaries where the input comes
//! from outside the program's own bookkeeping, e.g. an editor panel holding a
//! handle that may have been destroyed in the meantime.

use thiserror::Error;

use super::entity::Entity;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EcsError {
    #[error("entity {0} is not alive")]
    DeadEntity(Entity),

    #[error("entity {entity} has no `{component}` component")]
    MissingComponent {
        entity: Entity,
        component: &'static str,
    },

    #[error("entity {entity} already has a `{component}` component")]
    DuplicateComponent {
        entity: Entity,
        component: &'static str,
    },
}

/// Last path segment of a type name, e.g. `TransformComponent`.
pub(crate) fn short_type_name(full: &'static str) -> &'static str {
    full.rsplit("::").next().unwrap_or(full)
}
