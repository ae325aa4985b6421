//! # Mesh Operations
//!
//! Booleans, hulls and intersection tests.

pub mod boolean;
pub mod hull;
pub mod intersect;
