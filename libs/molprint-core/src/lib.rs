//! # MolPrint Core
//!
//! Turns a ball-and-stick molecular model into printable parts that snap
//! together.
//!
//! ## Pipeline
//!
//! ```text
//! import → clean → interactions → select/group → pin join → floor → export
//! ```
//!
//! - **Interactions**: every touching atom/bond pair
//! - **Grouping**: connected components of the contact graph, cut wherever
//!   two selected primitives touch
//! - **Pin join**: connectors at every cut contact, then one solid per group
//! - **Orientation**: rest each part on its largest flat side
//! - **Selectors**: hydrogen bonds, phosphates, glycosidic bonds, amides
//!
//! All state lives in a [`Session`]; geometry goes through a
//! [`GeometryKernel`], by default the in-tree [`MeshKernel`].
//!
//! ## Usage
//!
//! ```rust
//! use molprint_core::{PipelineStage, Session};
//! use glam::DVec3;
//!
//! let mut session = Session::default();
//! let atom = session.import_sphere(None, DVec3::ZERO, 0.6).unwrap();
//! let bond = session
//!     .import_cylinder(None, DVec3::ZERO, DVec3::X * 1.5, 0.3)
//!     .unwrap();
//! session.clean().unwrap();
//! assert_eq!(session.interactions().len(), 1);
//!
//! // Cut the bond off the atom
//! session.on_selection_changed([atom, bond]).unwrap();
//! assert_eq!(session.groups().len(), 2);
//! assert_eq!(session.stage(), PipelineStage::Grouped);
//! ```

pub mod classify;
pub mod clean;
pub mod cpk;
pub mod edit;
pub mod error;
pub mod export;
pub mod grouping;
pub mod interaction;
pub mod kernel;
pub mod orient;
pub mod pinjoin;
pub mod primitive;
pub mod scene;
pub mod session;
pub mod settings;

pub use clean::CleanReport;
pub use cpk::CpkReport;
pub use error::{Diagnostic, MolPrintError, MolPrintResult};
pub use export::ExportedPart;
pub use grouping::Group;
pub use interaction::{ContactGraph, Interaction};
pub use kernel::{GeometryKernel, MeshKernel};
pub use orient::{FloorPreview, FloorReport};
pub use pinjoin::JoinReport;
pub use primitive::{Material, Primitive, PrimitiveId, PrimitiveKind, Registry};
pub use scene::{AtomSpec, BondSpec, SceneSpec};
pub use session::{PipelineStage, Session, StageFlags};
pub use settings::{PinShape, Settings};
