//! Pipeline configuration
//!
//! All run parameters live in explicit structs passed into the pipeline
//! entry point; there is no process-wide state. Defaults reproduce the
//! parameter set the pipeline was calibrated with (US customary units:
//! feet, seconds, lb/ft³).

use sedra_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Feet to millimeters, for the flow-competence output
pub const FT_TO_MM: f64 = 304.8;

/// Millimeters to feet, for the grain-diameter input
pub const MM_TO_FT: f64 = 0.003_280_84;

/// Physical constants of the transport formula chain.
///
/// All values must be strictly positive; `sediment_specific_gravity`
/// must additionally exceed 1 so the submerged sediment weight stays
/// positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicalConstants {
    /// Manning's roughness coefficient n
    pub manning_n: f64,
    /// Water density ρ_w in lb/ft³ (62.32 at 65 °F)
    pub water_density: f64,
    /// Gravitational acceleration g in ft/s²
    pub gravity: f64,
    /// Specific gravity of the bed sediment
    pub sediment_specific_gravity: f64,
    /// Representative grain diameter of the bed mixture, in feet
    pub grain_diameter: f64,
    /// Critical Shields stress τ*_c for incipient motion
    pub critical_shields: f64,
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self {
            manning_n: 0.04,
            water_density: 62.32,
            gravity: 32.2,
            sediment_specific_gravity: 2.65,
            // 60 mm representative grain size
            grain_diameter: 60.0 * MM_TO_FT,
            critical_shields: 0.045,
        }
    }
}

impl PhysicalConstants {
    /// Sediment density ρ_s = sg_s · ρ_w
    pub fn sediment_density(&self) -> f64 {
        self.sediment_specific_gravity * self.water_density
    }

    /// Submerged unit weight factor (ρ_s − ρ_w) · g, shared by the
    /// Shields-stress and flow-competence denominators
    pub fn submerged_weight(&self) -> f64 {
        (self.sediment_density() - self.water_density) * self.gravity
    }

    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("manning_n", self.manning_n),
            ("water_density", self.water_density),
            ("gravity", self.gravity),
            ("sediment_specific_gravity", self.sediment_specific_gravity),
            ("grain_diameter", self.grain_diameter),
            ("critical_shields", self.critical_shields),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                return Err(Error::InvalidParameter {
                    name,
                    value: value.to_string(),
                    reason: "must be strictly positive".into(),
                });
            }
        }
        if self.sediment_specific_gravity <= 1.0 {
            return Err(Error::InvalidParameter {
                name: "sediment_specific_gravity",
                value: self.sediment_specific_gravity.to_string(),
                reason: "must exceed 1.0 so the submerged weight is positive".into(),
            });
        }
        Ok(())
    }
}

/// Column names of the sample table.
///
/// Defaults match the hydraulic model export this pipeline was written
/// for: `X`, `Y` coordinates with `D` (depth) and `V` (velocity).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldNames {
    pub x: String,
    pub y: String,
    pub depth: String,
    pub velocity: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            x: "X".into(),
            y: "Y".into(),
            depth: "D".into(),
            velocity: "V".into(),
        }
    }
}

/// Full configuration of one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Output cell size in the boundary's spatial units
    pub cell_size: f64,
    /// Sample table column names
    pub fields: FieldNames,
    /// Physical constants of the formula chain
    pub constants: PhysicalConstants,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            cell_size: 3.0,
            fields: FieldNames::default(),
            constants: PhysicalConstants::default(),
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.cell_size > 0.0) {
            return Err(Error::InvalidParameter {
                name: "cell_size",
                value: self.cell_size.to_string(),
                reason: "must be strictly positive".into(),
            });
        }
        self.constants.validate()
    }
}
