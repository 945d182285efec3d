//! Math types and glam re-exports.
//!
//! We re-export [glam](https://docs.rs/glam) types so users don't need to
//! depend on it directly. Rotations on scene transforms are Euler angles in
//! radians, applied X then Y then Z in the local frame.

pub use glam::{Mat4, Quat, Vec3, Vec4};

/// Local model matrix: `translate(position) * Rx * Ry * Rz * scale(scale)`.
pub fn compose_trs(position: Vec3, rotation_euler: Vec3, scale: Vec3) -> Mat4 {
    Mat4::from_translation(position)
        * Mat4::from_rotation_x(rotation_euler.x)
        * Mat4::from_rotation_y(rotation_euler.y)
        * Mat4::from_rotation_z(rotation_euler.z)
        * Mat4::from_scale(scale)
}

/// Translation part of an affine matrix.
pub fn translation_of(matrix: &Mat4) -> Vec3 {
    matrix.w_axis.truncate()
}
