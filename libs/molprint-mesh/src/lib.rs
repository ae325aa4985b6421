//! # MolPrint Mesh
//!
//! Geometry kernel for printable molecular models: triangle meshes,
//! primitives, booleans, hulls and intersection tests.
//!
//! ## Algorithms
//!
//! All algorithms are pure Rust:
//! - **Boolean Operations**: BSP trees (csg.js algorithm)
//! - **Hull**: QuickHull with coplanar facet merging
//! - **Intersection**: Spatial hash broadphase, exact orientation predicates
//! - **Primitives**: Custom mesh generation
//!
//! ## Usage
//!
//! ```rust
//! use molprint_mesh::{difference, Mesh};
//! use molprint_mesh::primitives::{create_cylinder_between, create_sphere};
//! use glam::DVec3;
//!
//! let atom = create_sphere(0.6, 16).unwrap();
//! let bond = create_cylinder_between(DVec3::ZERO, DVec3::X * 1.5, 0.2, 16).unwrap();
//! let socket = difference(&bond, &atom).unwrap();
//! assert!(socket.volume() < bond.volume());
//! ```

pub mod error;
pub mod mesh;
pub mod ops;
pub mod primitives;

pub use error::{MeshError, MeshResult};
pub use mesh::Mesh;
pub use ops::boolean::{boolean, difference, intersection, union, BooleanOp};
pub use ops::hull::{convex_hull, hull, hull_facets, HullFacet};
pub use ops::intersect::{meshes_intersect, overlapping_triangles};
