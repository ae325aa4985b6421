//! # Config Crate
//!
//! Centralized configuration constants for the MolPrint pipeline.
//! All magic numbers and tunable defaults are defined here so the mesh kernel
//! and the core agree on cutoffs, radii and tolerances.
//!
//! ## Usage
//!
//! ```rust
//! use config::constants::{INTERACTION_CUTOFF, MAX_HBOND_RADIUS};
//!
//! // Skip the expensive mesh test for far-apart primitives
//! let distance = 3.0;
//! assert!(distance >= INTERACTION_CUTOFF);
//!
//! // Thin bonds are hydrogen bonds
//! let radius = 0.2;
//! assert!(radius < MAX_HBOND_RADIUS);
//! ```
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All constants defined once, used everywhere
//! - **No Dependencies**: Plain constants and pure helpers only
//! - **Add-on Compatible**: Defaults match the upstream modelling add-on

pub mod constants;
