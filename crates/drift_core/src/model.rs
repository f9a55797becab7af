//! Public pipeline entry points.

use tracing::debug;

use crate::bounce;
use crate::config::{BounceSettings, ModelOptions, TraceSettings};
use crate::engine::{
    DriftShell, FieldLineTrace, FootPoint, Hemisphere, LstarOutput, MagEquator, MirrorPoint,
};
use crate::error::{DriftError, Result};
use crate::field_line::InterpolatedFieldLine;
use crate::inputs::{EngineLocation, Ephemeris, MagInputs, ModelParams, OneOrMany, SpacetimePoint};
use crate::solvers::{find_mirror_bracket, MirrorBracket};
use crate::traits::FieldEngine;

/// A field engine bound to a model selection.
///
/// Every method is a pure function of its arguments: nothing is cached
/// between calls, so repeated inputs are recomputed.
#[derive(Debug, Clone)]
pub struct DriftModel<E> {
    engine: E,
    options: ModelOptions,
}

impl<E: FieldEngine> DriftModel<E> {
    pub fn new(engine: E) -> Self {
        Self::with_options(engine, ModelOptions::default())
    }

    pub fn with_options(engine: E, options: ModelOptions) -> Self {
        Self { engine, options }
    }

    pub fn options(&self) -> &ModelOptions {
        &self.options
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    fn prepare_point(
        &self,
        point: &SpacetimePoint,
        inputs: &MagInputs,
    ) -> Result<(EngineLocation, ModelParams)> {
        let location = point.to_location()?;
        let params = inputs.normalize(1)?[0];
        Ok((location, params))
    }

    /// L, L*, local and minimum field at every point of `ephemeris`.
    pub fn make_lstar(&self, ephemeris: &Ephemeris, inputs: &MagInputs) -> Result<Vec<LstarOutput>> {
        let points = ephemeris.normalize()?;
        let params = inputs.normalize(points.len())?;
        debug!(points = points.len(), "calling engine make_lstar");
        let columns = self.engine.make_lstar(&self.options, &points, &params)?;
        columns.into_rows(points.len())
    }

    /// Traces the field line through `point` down to `reference_radius` (Re).
    ///
    /// An open line comes back with the sentinel length; it is rejected
    /// later by [`InterpolatedFieldLine::new`].
    pub fn trace_field_line(
        &self,
        point: &SpacetimePoint,
        inputs: &MagInputs,
        reference_radius: f64,
    ) -> Result<FieldLineTrace> {
        let (location, params) = self.prepare_point(point, inputs)?;
        debug!(reference_radius, "calling engine trace_field_line");
        let trace =
            self.engine
                .trace_field_line(&self.options, &location, &params, reference_radius)?;
        trace.check()?;
        debug!(
            points = ?trace.len(),
            lm = ?trace.lm(),
            bmin = ?trace.bmin(),
            xj = ?trace.xj(),
            "field line traced"
        );
        Ok(trace)
    }

    /// Full drift shell of particles mirroring at `point`.
    pub fn drift_shell(&self, point: &SpacetimePoint, inputs: &MagInputs) -> Result<DriftShell> {
        let (location, params) = self.prepare_point(point, inputs)?;
        debug!("calling engine drift_shell");
        self.engine
            .drift_shell(&self.options, &location, &params)?
            .checked()
    }

    /// Mirror point of a particle with local pitch angle `alpha` (degrees).
    pub fn find_mirror_point(
        &self,
        point: &SpacetimePoint,
        inputs: &MagInputs,
        alpha: f64,
    ) -> Result<MirrorPoint> {
        let (location, params) = self.prepare_point(point, inputs)?;
        debug!(alpha, "calling engine find_mirror_point");
        Ok(self
            .engine
            .find_mirror_point(&self.options, &location, &params, alpha)?
            .into())
    }

    /// Where the field line through `point` crosses `stop_altitude` (km).
    pub fn find_foot_point(
        &self,
        point: &SpacetimePoint,
        inputs: &MagInputs,
        stop_altitude: f64,
        hemisphere: Hemisphere,
    ) -> Result<FootPoint> {
        let (location, params) = self.prepare_point(point, inputs)?;
        debug!(stop_altitude, ?hemisphere, "calling engine find_foot_point");
        Ok(self
            .engine
            .find_foot_point(
                &self.options,
                &location,
                &params,
                stop_altitude,
                hemisphere.flag(),
            )?
            .into())
    }

    pub fn find_magequator(&self, point: &SpacetimePoint, inputs: &MagInputs) -> Result<MagEquator> {
        let (location, params) = self.prepare_point(point, inputs)?;
        debug!("calling engine find_magequator");
        Ok(self
            .engine
            .find_magequator(&self.options, &location, &params)?
            .into())
    }

    /// Traces the line through `point` and interpolates it relative to the
    /// local field at `point`.
    pub fn interpolate_field_line(
        &self,
        point: &SpacetimePoint,
        inputs: &MagInputs,
        settings: &TraceSettings,
    ) -> Result<InterpolatedFieldLine> {
        settings.validate()?;
        let local = self.make_lstar(&Ephemeris::from(point), inputs)?;
        let reference_field = local
            .first()
            .and_then(|row| row.blocal)
            .ok_or(DriftError::Undefined("blocal"))?;
        let trace = self.trace_field_line(point, inputs, settings.reference_radius)?;
        InterpolatedFieldLine::new(&trace, reference_field)
    }

    /// Interpolated line plus the arc indices of its two mirror points.
    pub fn mirror_bracket(
        &self,
        point: &SpacetimePoint,
        inputs: &MagInputs,
        settings: &TraceSettings,
    ) -> Result<(InterpolatedFieldLine, MirrorBracket)> {
        let line = self.interpolate_field_line(point, inputs, settings)?;
        let bracket = find_mirror_bracket(&line, &settings.root)?;
        Ok((line, bracket))
    }

    /// Bounce period (s) of a particle mirroring at `point`, one per energy (keV).
    pub fn bounce_period(
        &self,
        point: &SpacetimePoint,
        inputs: &MagInputs,
        energies: &OneOrMany<f64>,
        settings: &BounceSettings,
    ) -> Result<OneOrMany<f64>> {
        settings.validate()?;
        let (line, bracket) = self.mirror_bracket(point, inputs, &settings.trace)?;
        bounce::bounce_period(&line, &bracket, energies, settings)
    }

    /// Altitude (km above the reference radius) of the conjugate mirror point
    /// of a particle mirroring at `point`.
    pub fn mirror_point_altitude(
        &self,
        point: &SpacetimePoint,
        inputs: &MagInputs,
        settings: &TraceSettings,
    ) -> Result<f64> {
        let (line, bracket) = self.mirror_bracket(point, inputs, settings)?;
        Ok(bounce::mirror_point_altitude(
            &line,
            &bracket,
            settings.reference_radius,
            &settings.constants,
        ))
    }
}
