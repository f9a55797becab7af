//! The `drift_core` crate turns field lines traced by an external magnetic-field
//! engine into particle drift-orbit geometry.
//!
//! Key components:
//! - **Traits**: `FieldEngine`, the seam to the tracing and L-shell engine.
//! - **Inputs**: normalization of times, positions and model parameters into engine arrays.
//! - **Field lines**: cubic interpolation of a trace over its arc index.
//! - **Solvers**: Brent root finding and the conjugate mirror-point bracket.
//! - **Bounce**: bounce-period integration and mirror-point altitude.

pub mod bounce;
pub mod config;
pub mod engine;
pub mod error;
pub mod field_line;
pub mod inputs;
pub mod kinematics;
pub mod model;
pub mod solvers;
pub mod spline;
pub mod traits;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{BounceSettings, ModelOptions, PhysicalConstants, RootSettings, TraceSettings};
pub use error::{DriftError, InputFormatError, Result};
pub use field_line::InterpolatedFieldLine;
pub use inputs::{Ephemeris, MagInputs, MagParam, OneOrMany, SpacetimePoint};
pub use model::DriftModel;
pub use solvers::MirrorBracket;
pub use traits::FieldEngine;
