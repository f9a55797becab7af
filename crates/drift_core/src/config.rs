//! Settings, model selectors and physical constants.

use serde::{Deserialize, Serialize};

use crate::error::{DriftError, Result};

/// Sentinel used for unused model inputs and open field lines.
pub const MISSING: f64 = -9999.0;

/// Trace length the engine reports for an open field line.
pub const OPEN_LINE_LENGTH: i32 = -9999;

/// Fill value the engine writes into outputs it could not compute.
pub const ENGINE_FILL: f64 = -9.999_999_999_999_999_6e30;

/// Point capacity of a single field-line trace buffer.
pub const TRACE_CAPACITY: usize = 3000;

/// Point capacity of each drift-shell field-line buffer.
pub const DRIFT_SHELL_LINE_CAPACITY: usize = 1000;

/// Number of field lines in a drift-shell buffer.
pub const DRIFT_SHELL_LINES: usize = 48;

/// Point count above which batched engine calls become unreliable.
pub const LARGE_BATCH_WARNING: usize = 50_000;

/// External magnetic field model, identified by the engine's `kext` code.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ExternalField {
    None,
    MeadFairfield,
    Tsyganenko87Short,
    Tsyganenko87Long,
    Tsyganenko89,
    OlsonPfitzerQuiet,
    OlsonPfitzerDynamic,
    Tsyganenko96,
    Ostapenko97,
    Tsyganenko01,
    Tsyganenko01Storm,
    Tsyganenko04,
    Alexeev2000,
    Tsyganenko07,
    Mead,
}

impl ExternalField {
    pub fn code(self) -> i32 {
        match self {
            ExternalField::None => 0,
            ExternalField::MeadFairfield => 1,
            ExternalField::Tsyganenko87Short => 2,
            ExternalField::Tsyganenko87Long => 3,
            ExternalField::Tsyganenko89 => 4,
            ExternalField::OlsonPfitzerQuiet => 5,
            ExternalField::OlsonPfitzerDynamic => 6,
            ExternalField::Tsyganenko96 => 7,
            ExternalField::Ostapenko97 => 8,
            ExternalField::Tsyganenko01 => 9,
            ExternalField::Tsyganenko01Storm => 10,
            ExternalField::Tsyganenko04 => 11,
            ExternalField::Alexeev2000 => 12,
            ExternalField::Tsyganenko07 => 13,
            ExternalField::Mead => 14,
        }
    }
}

/// Coordinate system of the input position, identified by the engine's `sysaxes` code.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CoordinateSystem {
    /// Geodetic: altitude (km), latitude, longitude (deg).
    Gdz,
    /// Geocentric geographic cartesian (Re).
    Geo,
    Gsm,
    Gse,
    Sm,
    Gei,
    Mag,
    /// Spherical GEO: radius (Re), latitude, longitude (deg).
    Sph,
    /// Spherical with radius, latitude and longitude in the RLL convention.
    Rll,
}

impl CoordinateSystem {
    pub fn code(self) -> i32 {
        match self {
            CoordinateSystem::Gdz => 0,
            CoordinateSystem::Geo => 1,
            CoordinateSystem::Gsm => 2,
            CoordinateSystem::Gse => 3,
            CoordinateSystem::Sm => 4,
            CoordinateSystem::Gei => 5,
            CoordinateSystem::Mag => 6,
            CoordinateSystem::Sph => 7,
            CoordinateSystem::Rll => 8,
        }
    }
}

/// Field-model selection passed verbatim to every engine call.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelOptions {
    pub external_field: ExternalField,
    pub coordinates: CoordinateSystem,
    pub options: [i32; 5],
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            external_field: ExternalField::Tsyganenko89,
            coordinates: CoordinateSystem::Gdz,
            options: [0; 5],
        }
    }
}

/// Tolerances for the bracketing root finder.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RootSettings {
    pub xtol: f64,
    pub rtol: f64,
    pub max_iter: usize,
}

impl Default for RootSettings {
    fn default() -> Self {
        Self {
            xtol: 2e-12,
            rtol: 4.0 * f64::EPSILON,
            max_iter: 100,
        }
    }
}

impl RootSettings {
    pub fn validate(&self) -> Result<()> {
        if !(self.xtol > 0.0) {
            return Err(DriftError::InvalidSettings("xtol must be positive.".into()));
        }
        if !(self.rtol >= 4.0 * f64::EPSILON) {
            return Err(DriftError::InvalidSettings(format!(
                "rtol must be at least {}.",
                4.0 * f64::EPSILON
            )));
        }
        if self.max_iter == 0 {
            return Err(DriftError::InvalidSettings(
                "max_iter must be greater than zero.".into(),
            ));
        }
        Ok(())
    }
}

/// Constants used to turn arc-index geometry into physical quantities.
///
/// The speed of light defaults to the rounded `3.0e8 m/s`; set it to
/// `299_792_458.0` for the exact value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PhysicalConstants {
    pub speed_of_light: f64,
    pub earth_radius_m: f64,
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self {
            speed_of_light: 3.0e8,
            earth_radius_m: 6.371e6,
        }
    }
}

impl PhysicalConstants {
    pub fn earth_radius_km(&self) -> f64 {
        self.earth_radius_m / 1000.0
    }
}

/// Settings shared by every computation that traces and brackets a field line.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TraceSettings {
    /// Radius (Re) of the surface the trace stops at.
    pub reference_radius: f64,
    pub root: RootSettings,
    pub constants: PhysicalConstants,
}

impl Default for TraceSettings {
    fn default() -> Self {
        Self {
            reference_radius: 1.0,
            root: RootSettings::default(),
            constants: PhysicalConstants::default(),
        }
    }
}

impl TraceSettings {
    pub fn validate(&self) -> Result<()> {
        if !(self.reference_radius > 0.0) {
            return Err(DriftError::InvalidSettings(
                "reference_radius must be positive.".into(),
            ));
        }
        if !(self.constants.speed_of_light > 0.0) || !(self.constants.earth_radius_m > 0.0) {
            return Err(DriftError::InvalidSettings(
                "physical constants must be positive.".into(),
            ));
        }
        self.root.validate()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BounceSettings {
    pub trace: TraceSettings,
    /// Rest energy of the bouncing particle in keV (electron by default).
    pub rest_energy_kev: f64,
    /// Number of uniform samples between the two mirror points.
    pub samples: usize,
}

impl Default for BounceSettings {
    fn default() -> Self {
        Self {
            trace: TraceSettings::default(),
            rest_energy_kev: 511.0,
            samples: 100_000,
        }
    }
}

impl BounceSettings {
    pub fn validate(&self) -> Result<()> {
        if !(self.rest_energy_kev > 0.0) {
            return Err(DriftError::InvalidSettings(
                "rest_energy_kev must be positive.".into(),
            ));
        }
        if self.samples < 3 {
            return Err(DriftError::InvalidSettings(
                "samples must be at least 3 to leave interior points.".into(),
            ));
        }
        self.trace.validate()
    }
}
