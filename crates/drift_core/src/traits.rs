use anyhow::{bail, Result};

use crate::config::ModelOptions;
use crate::engine::{
    FieldLineTrace, LstarColumns, RawDriftShell, RawFootPoint, RawMagEquator, RawMirrorPoint,
};
use crate::inputs::{EngineLocation, ModelParams, NormalizedEphemeris};

/// The external field-tracing and L-shell engine.
///
/// Implementations are thin bindings: they receive normalized inputs and
/// return the engine's raw outputs, fill values and sentinels included.
/// Checking those outputs is the caller's job (see [`crate::model::DriftModel`]).
pub trait FieldEngine {
    /// Computes L, L*, local and minimum field for every row of `points`.
    /// `params` holds one parameter vector per row.
    fn make_lstar(
        &self,
        options: &ModelOptions,
        points: &NormalizedEphemeris,
        params: &[ModelParams],
    ) -> Result<LstarColumns>;

    /// Traces the field line through `location` down to `reference_radius` (Re)
    /// in both directions.
    fn trace_field_line(
        &self,
        options: &ModelOptions,
        location: &EngineLocation,
        params: &ModelParams,
        reference_radius: f64,
    ) -> Result<FieldLineTrace>;

    fn drift_shell(
        &self,
        _options: &ModelOptions,
        _location: &EngineLocation,
        _params: &ModelParams,
    ) -> Result<RawDriftShell> {
        bail!("drift shell tracing is not supported by this engine.")
    }

    /// `alpha` is the local pitch angle in degrees.
    fn find_mirror_point(
        &self,
        _options: &ModelOptions,
        _location: &EngineLocation,
        _params: &ModelParams,
        _alpha: f64,
    ) -> Result<RawMirrorPoint> {
        bail!("mirror point search is not supported by this engine.")
    }

    /// `stop_altitude` is in km; `hemisphere_flag` uses the engine's codes.
    fn find_foot_point(
        &self,
        _options: &ModelOptions,
        _location: &EngineLocation,
        _params: &ModelParams,
        _stop_altitude: f64,
        _hemisphere_flag: i32,
    ) -> Result<RawFootPoint> {
        bail!("foot point search is not supported by this engine.")
    }

    fn find_magequator(
        &self,
        _options: &ModelOptions,
        _location: &EngineLocation,
        _params: &ModelParams,
    ) -> Result<RawMagEquator> {
        bail!("magnetic equator search is not supported by this engine.")
    }
}

impl<E: FieldEngine + ?Sized> FieldEngine for &E {
    fn make_lstar(
        &self,
        options: &ModelOptions,
        points: &NormalizedEphemeris,
        params: &[ModelParams],
    ) -> Result<LstarColumns> {
        (**self).make_lstar(options, points, params)
    }

    fn trace_field_line(
        &self,
        options: &ModelOptions,
        location: &EngineLocation,
        params: &ModelParams,
        reference_radius: f64,
    ) -> Result<FieldLineTrace> {
        (**self).trace_field_line(options, location, params, reference_radius)
    }

    fn drift_shell(
        &self,
        options: &ModelOptions,
        location: &EngineLocation,
        params: &ModelParams,
    ) -> Result<RawDriftShell> {
        (**self).drift_shell(options, location, params)
    }

    fn find_mirror_point(
        &self,
        options: &ModelOptions,
        location: &EngineLocation,
        params: &ModelParams,
        alpha: f64,
    ) -> Result<RawMirrorPoint> {
        (**self).find_mirror_point(options, location, params, alpha)
    }

    fn find_foot_point(
        &self,
        options: &ModelOptions,
        location: &EngineLocation,
        params: &ModelParams,
        stop_altitude: f64,
        hemisphere_flag: i32,
    ) -> Result<RawFootPoint> {
        (**self).find_foot_point(options, location, params, stop_altitude, hemisphere_flag)
    }

    fn find_magequator(
        &self,
        options: &ModelOptions,
        location: &EngineLocation,
        params: &ModelParams,
    ) -> Result<RawMagEquator> {
        (**self).find_magequator(options, location, params)
    }
}
