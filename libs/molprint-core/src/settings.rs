//! # Session Settings
//!
//! Runtime settings for the pipeline. Defaults come from
//! [`config::constants`]; hosts may override any subset from JSON.
//!
//! ## Example
//!
//! ```rust
//! use molprint_core::Settings;
//!
//! let settings = Settings::from_json(r#"{ "max_hbond": 0.3, "pin_shape": "cuboid" }"#).unwrap();
//! assert_eq!(settings.max_hbond, 0.3);
//! assert_eq!(settings.prim_detail, 16);
//! ```

use crate::error::{MolPrintError, MolPrintResult};
use config::constants::{
    CARBON_RADIUS, DEFAULT_ATOM_SCALE, DEFAULT_BOND_SCALE, DEFAULT_PRIM_DETAIL,
    H_PIN_SIDES, H_PIN_TO_BOND_RATIO, MAX_HBOND_RADIUS, MAX_PIN_SEGMENTS, MIN_SEGMENTS,
    NITROGEN_RADIUS, OXYGEN_RADIUS, PHOSPHORUS_RADIUS, PIN_CLEARANCE_SCALE, PIN_SIDES,
    PIN_TO_BOND_RATIO, PROTON_RADIUS, STRUT_RADIUS, SULFUR_RADIUS,
};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Cross-section of generated pins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinShape {
    /// Round pins; parts can rotate about the bond
    #[default]
    Cylinder,
    /// Square pins for covalent bonds; hydrogen-bond pins stay round
    Cuboid,
}

/// Settings for one editing session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Circle divisions for generated atoms, bonds and struts
    pub prim_detail: u32,
    /// Radius of added struts
    pub strut_radius: f64,
    pub proton_radius: f64,
    pub carbon_radius: f64,
    pub nitrogen_radius: f64,
    pub oxygen_radius: f64,
    pub phosphorus_radius: f64,
    pub sulfur_radius: f64,
    /// Radial scale applied to covalent bonds by `scale_bonds`
    pub bond_scale: f64,
    /// Cylinders thinner than this are hydrogen bonds
    pub max_hbond: f64,
    pub atom_scale: f64,
    /// Regroup automatically when the selection changes
    pub autogroup: bool,
    /// Keep group colors on exported parts
    pub multicolor: bool,
    /// Sides of covalent pins
    pub pin_sides: u32,
    /// Sides of hydrogen-bond pins
    pub h_pin_sides: u32,
    /// Pin radius as a fraction of the covalent bond radius
    pub pin_to_bond: f64,
    /// Pin radius as a fraction of the hydrogen-bond radius
    pub h_pin_to_bond: f64,
    /// Hole size over pin size
    pub pin_scale: f64,
    pub pin_shape: PinShape,
    /// Add an anti-rotation key to each pin
    pub woodruff: bool,
    /// Seed for choosing the keyed pin face; `None` draws from entropy
    pub woodruff_seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            prim_detail: DEFAULT_PRIM_DETAIL,
            strut_radius: STRUT_RADIUS,
            proton_radius: PROTON_RADIUS,
            carbon_radius: CARBON_RADIUS,
            nitrogen_radius: NITROGEN_RADIUS,
            oxygen_radius: OXYGEN_RADIUS,
            phosphorus_radius: PHOSPHORUS_RADIUS,
            sulfur_radius: SULFUR_RADIUS,
            bond_scale: DEFAULT_BOND_SCALE,
            max_hbond: MAX_HBOND_RADIUS,
            atom_scale: DEFAULT_ATOM_SCALE,
            autogroup: true,
            multicolor: false,
            pin_sides: PIN_SIDES,
            h_pin_sides: H_PIN_SIDES,
            pin_to_bond: PIN_TO_BOND_RATIO,
            h_pin_to_bond: H_PIN_TO_BOND_RATIO,
            pin_scale: PIN_CLEARANCE_SCALE,
            pin_shape: PinShape::Cylinder,
            woodruff: false,
            woodruff_seed: None,
        }
    }
}

impl Settings {
    /// Parses settings from JSON and validates them.
    ///
    /// Missing fields take their defaults.
    pub fn from_json(json: &str) -> MolPrintResult<Self> {
        let settings: Settings = serde_json::from_str(json)
            .map_err(|e| MolPrintError::invalid_settings(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Serializes the settings to pretty-printed JSON.
    pub fn to_json(&self) -> MolPrintResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| MolPrintError::invalid_settings(e.to_string()))
    }

    /// Checks every field against its accepted range.
    pub fn validate(&self) -> MolPrintResult<()> {
        check_count("prim_detail", self.prim_detail, MIN_SEGMENTS..=u32::MAX)?;
        check_range("strut_radius", self.strut_radius, 0.1..=0.3)?;
        for (name, value) in [
            ("proton_radius", self.proton_radius),
            ("carbon_radius", self.carbon_radius),
            ("nitrogen_radius", self.nitrogen_radius),
            ("oxygen_radius", self.oxygen_radius),
            ("phosphorus_radius", self.phosphorus_radius),
        ] {
            check_range(name, value, 0.0..=4.0)?;
        }
        check_range("sulfur_radius", self.sulfur_radius, 0.0..=0.2)?;
        check_range("bond_scale", self.bond_scale, 0.1..=1.5)?;
        check_range("max_hbond", self.max_hbond, 0.1..=0.5)?;
        check_range("atom_scale", self.atom_scale, 0.1..=1.5)?;
        check_count("pin_sides", self.pin_sides, MIN_SEGMENTS..=MAX_PIN_SEGMENTS)?;
        check_count("h_pin_sides", self.h_pin_sides, MIN_SEGMENTS..=MAX_PIN_SEGMENTS)?;
        check_range("pin_to_bond", self.pin_to_bond, 0.1..=1.0)?;
        check_range("h_pin_to_bond", self.h_pin_to_bond, 0.1..=0.98)?;
        check_range("pin_scale", self.pin_scale, 1.0..=1.5)?;
        Ok(())
    }

    /// Returns true if a cylinder of this radius is a hydrogen bond.
    pub fn is_hbond_radius(&self, radius: f64) -> bool {
        radius < self.max_hbond
    }
}

fn check_range(name: &str, value: f64, range: RangeInclusive<f64>) -> MolPrintResult<()> {
    if value.is_finite() && range.contains(&value) {
        Ok(())
    } else {
        Err(MolPrintError::invalid_settings(format!(
            "{} = {} is outside {}..={}",
            name,
            value,
            range.start(),
            range.end()
        )))
    }
}

fn check_count(name: &str, value: u32, range: RangeInclusive<u32>) -> MolPrintResult<()> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(MolPrintError::invalid_settings(format!(
            "{} = {} is outside {}..={}",
            name,
            value,
            range.start(),
            range.end()
        )))
    }
}
