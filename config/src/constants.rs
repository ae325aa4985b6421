//! # Configuration Constants
//!
//! Centralized constants for the MolPrint pipeline. Contact cutoffs, default
//! element radii, pin geometry ratios and tolerances are defined here.
//!
//! ## Categories
//!
//! - **Precision**: Floating-point comparison tolerances
//! - **Tessellation**: Segment counts for generated primitives
//! - **Contacts**: Distance cutoffs for interaction and clean-up passes
//! - **Radii**: Default element and bond radii
//! - **Pins**: Connector geometry
//! - **Motifs**: Heuristic thresholds used by the pattern selectors
//! - **Palette**: Group color cycles

// =============================================================================
// PRECISION CONSTANTS
// =============================================================================

/// Epsilon for floating-point comparisons.
///
/// # Example
///
/// ```rust
/// use config::constants::EPSILON;
///
/// fn approximately_equal(a: f64, b: f64) -> bool {
///     (a - b).abs() < EPSILON
/// }
///
/// assert!(approximately_equal(1.0, 1.0 + 1e-11));
/// ```
pub const EPSILON: f64 = 1e-10;

/// Tolerance used when classifying points against BSP splitting planes.
///
/// Larger than [`EPSILON`] because boolean results accumulate error with every
/// split.
pub const PLANE_EPSILON: f64 = 1e-5;

/// Minimum triangle area considered non-degenerate.
pub const VERTEX_MERGE_EPSILON: f64 = 1e-8;

/// Scaling factor for converting f64 coordinates to i64 keys.
///
/// Used to weld vertices produced by boolean operations: positions are
/// quantized by this factor before hashing.
///
/// # Example
///
/// ```rust
/// use config::constants::COORDINATE_SCALE;
///
/// fn weld_key(value: f64) -> i64 {
///     (value * COORDINATE_SCALE).round() as i64
/// }
///
/// assert_eq!(weld_key(0.5), weld_key(0.5 + 1e-9));
/// ```
pub const COORDINATE_SCALE: f64 = 1e6;

// =============================================================================
// TESSELLATION CONSTANTS
// =============================================================================

/// Default number of circle divisions for generated atoms, bonds and struts.
///
/// Large numbers slow every boolean pass down.
pub const DEFAULT_PRIM_DETAIL: u32 = 16;

/// Minimum segment count for any circular primitive.
pub const MIN_SEGMENTS: u32 = 3;

/// Maximum segment count accepted for pin cylinders.
pub const MAX_PIN_SEGMENTS: u32 = 32;

// =============================================================================
// CONTACT CUTOFFS
// =============================================================================

/// Centroid distance at or beyond which two primitives cannot touch.
///
/// Atoms and bonds have bounded sizes, so the precise mesh test is skipped
/// for pairs this far apart.
///
/// # Example
///
/// ```rust
/// use config::constants::INTERACTION_CUTOFF;
///
/// let distance = 2.5;
/// let needs_mesh_test = distance < INTERACTION_CUTOFF;
/// assert!(!needs_mesh_test);
/// ```
pub const INTERACTION_CUTOFF: f64 = 2.0;

/// Sphere pairs closer than this are checked for containment during clean-up.
pub const INSIDE_SPHERE_CUTOFF: f64 = 0.3;

/// Cylinder pairs closer than this are duplicates.
pub const DUPLICATE_CYLINDER_CUTOFF: f64 = 1e-4;

/// Cylinder pairs closer than this are checked for split half-bonds.
pub const SPLIT_CYLINDER_CUTOFF: f64 = 1.0;

/// Maximum distance between two axis endpoints for them to count as shared.
pub const SPLIT_ENDPOINT_TOLERANCE: f64 = 0.01;

/// Maximum sine of the angle between two half-bonds that are merged.
pub const COLLINEAR_TOLERANCE: f64 = 1e-3;

// =============================================================================
// RADII
// =============================================================================

/// Hydrogen atom radius.
pub const PROTON_RADIUS: f64 = 0.360;

/// Nitrogen atom radius.
pub const NITROGEN_RADIUS: f64 = 0.540;

/// Carbon atom radius.
pub const CARBON_RADIUS: f64 = 0.600;

/// Oxygen atom radius.
pub const OXYGEN_RADIUS: f64 = 0.534;

/// Phosphorus atom radius.
pub const PHOSPHORUS_RADIUS: f64 = 0.540;

/// Sulfur atom radius.
pub const SULFUR_RADIUS: f64 = 0.0001;

/// Radius of manually added struts.
pub const STRUT_RADIUS: f64 = 0.175;

/// Cylinders thinner than this are hydrogen bonds.
///
/// # Example
///
/// ```rust
/// use config::constants::MAX_HBOND_RADIUS;
///
/// let bond_radius = 0.2;
/// assert!(bond_radius < MAX_HBOND_RADIUS);
/// ```
pub const MAX_HBOND_RADIUS: f64 = 0.250;

/// Default radial scale applied by the bond scaling pass.
pub const DEFAULT_BOND_SCALE: f64 = 1.0;

/// Default atom scale.
pub const DEFAULT_ATOM_SCALE: f64 = 1.0;

// =============================================================================
// PIN CONSTANTS
// =============================================================================

/// Pin radius as a fraction of the covalent bond radius it sits in.
pub const PIN_TO_BOND_RATIO: f64 = 0.666;

/// Pin radius as a fraction of the hydrogen-bond radius it sits in.
pub const H_PIN_TO_BOND_RATIO: f64 = 0.90;

/// Sides of a covalent pin cylinder.
pub const PIN_SIDES: u32 = 16;

/// Sides of a hydrogen-bond pin cylinder.
pub const H_PIN_SIDES: u32 = 16;

/// Scale applied to pins before they are carved out of atoms, so printed
/// parts fit together.
pub const PIN_CLEARANCE_SCALE: f64 = 1.05;

/// Woodruff key dimensions relative to the pin they are fused to.
pub const WOODRUFF_KEY_FRACTION: f64 = 0.5;

// =============================================================================
// JOIN CONSTANTS
// =============================================================================

/// Edge length of the cube intersected with a fused group to force a single
/// clean manifold.
pub const BULK_UNION_CUBE_SIZE: f64 = 60.0;

// =============================================================================
// ORIENTATION CONSTANTS
// =============================================================================

/// Angle (radians) below which adjacent hull faces are merged into one facet.
pub const FLOOR_ANGLE_TOLERANCE: f64 = 0.09;

/// Direction the chosen resting face must point: straight down onto the bed.
pub const FLOOR_NORMAL: [f64; 3] = [0.0, 0.0, -1.0];

// =============================================================================
// MOTIF CONSTANTS
// =============================================================================

/// Absolute tolerance for matching a sphere radius against an element radius.
pub const RADIUS_MATCH_TOLERANCE: f64 = 1e-4;

/// Decimal places radii are rounded to before triple comparisons.
pub const RADIUS_ROUND_DECIMALS: i32 = 3;

/// Cylinder contacts of a phosphorus in a phosphate group.
pub const PHOSPHATE_CONTACTS: usize = 4;

/// The sphere two hops out from a phosphate needs more contacts than this.
pub const PHOSPHATE_MIN_THIRD_CONTACTS: usize = 2;

/// Cylinder contacts of the carbon at a glycosidic or amide center.
pub const TRIGONAL_CONTACTS: usize = 3;

/// Mean pairwise distance of the three neighbors of a glycosidic carbon must
/// exceed this.
pub const GLYCOSIDIC_MIN_MEAN_DISTANCE: f64 = 5.56;

/// Carbon radius the amide selector matches against.
///
/// These three amide radii are independent of the configurable element radii;
/// they match an older radius table.
pub const AMIDE_CARBON_RADIUS: f64 = 0.510;

/// Nitrogen radius the amide selector matches against.
pub const AMIDE_NITROGEN_RADIUS: f64 = 0.465;

/// Oxygen radius the amide selector matches against.
pub const AMIDE_OXYGEN_RADIUS: f64 = 0.456;

// =============================================================================
// PALETTE CONSTANTS
// =============================================================================

/// Red channel cycle for group colors.
pub const PALETTE_RED: [f32; 5] = [0.0, 0.25, 0.5, 0.75, 1.0];

/// Green channel cycle for group colors.
pub const PALETTE_GREEN: [f32; 4] = [1.0, 0.66, 0.33, 0.0];

/// Blue channel cycle for group colors.
pub const PALETTE_BLUE: [f32; 7] = [1.0, 0.33, 0.25, 0.66, 0.05, 0.75, 0.0];

/// Default RGBA color for meshes without a material.
pub const DEFAULT_COLOR: [f32; 4] = [0.8, 0.8, 0.8, 1.0];

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Returns the color of the `index`-th group.
///
/// The three channel cycles have coprime lengths, so the sequence only
/// repeats every 140 groups.
///
/// # Example
///
/// ```rust
/// use config::constants::palette_color;
///
/// assert_eq!(palette_color(0), [0.0, 1.0, 1.0]);
/// assert_eq!(palette_color(1), [0.25, 0.66, 0.33]);
/// assert_eq!(palette_color(140), palette_color(0));
/// ```
pub fn palette_color(index: usize) -> [f32; 3] {
    [
        PALETTE_RED[index % PALETTE_RED.len()],
        PALETTE_GREEN[index % PALETTE_GREEN.len()],
        PALETTE_BLUE[index % PALETTE_BLUE.len()],
    ]
}

/// Rounds a value to a number of decimal places.
///
/// # Example
///
/// ```rust
/// use config::constants::round_to;
///
/// assert_eq!(round_to(0.53449, 3), 0.534);
/// ```
#[inline]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
