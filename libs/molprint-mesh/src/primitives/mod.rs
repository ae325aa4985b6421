//! # Primitives
//!
//! Mesh generation for atoms, bonds, pins and helper solids.

pub mod cube;
pub mod cylinder;
pub mod sphere;

pub use cube::create_cube;
pub use cylinder::{axis_rotation, create_cylinder, create_cylinder_between};
pub use sphere::create_sphere;
