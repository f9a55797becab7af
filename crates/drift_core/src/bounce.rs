//! Bounce-period integration and mirror-point altitude.

use tracing::{debug, warn};

use crate::config::{BounceSettings, PhysicalConstants};
use crate::error::{DriftError, Result};
use crate::field_line::InterpolatedFieldLine;
use crate::inputs::OneOrMany;
use crate::kinematics::parallel_velocity;
use crate::solvers::MirrorBracket;

/// Field-line geometry resampled between two mirror points.
///
/// Index `k` holds the path length (m) from sample `k - 1` to sample `k`
/// and the local field at sample `k`. Only interior samples are kept: the
/// parallel velocity vanishes at both mirror points.
struct ResampledPath {
    ds: Vec<f64>,
    field: Vec<f64>,
}

impl ResampledPath {
    fn new(
        line: &InterpolatedFieldLine,
        bracket: &MirrorBracket,
        samples: usize,
        constants: &PhysicalConstants,
    ) -> Self {
        let step = (bracket.high - bracket.low) / (samples - 1) as f64;
        let arc = |k: usize| {
            if k == samples - 1 {
                bracket.high
            } else {
                bracket.low + k as f64 * step
            }
        };

        let mut ds = Vec::with_capacity(samples - 2);
        let mut field = Vec::with_capacity(samples - 2);
        let mut previous = line.position(arc(0));
        for k in 1..samples - 1 {
            let s = arc(k);
            let position = line.position(s);
            ds.push(constants.earth_radius_m * (position - previous).norm());
            field.push(line.field(s));
            previous = position;
        }
        Self { ds, field }
    }

    /// `Σ ds / v(B)` over the interior samples.
    fn travel_time(&self, velocity: impl Fn(f64) -> f64) -> f64 {
        self.ds
            .iter()
            .zip(&self.field)
            .map(|(ds, b)| ds / velocity(*b))
            .sum()
    }
}

/// Bounce periods (s) for each kinetic energy (keV), in input order.
///
/// The path between the mirror points is resampled once at
/// `settings.samples` points and shared by all energies.
pub fn bounce_periods(
    line: &InterpolatedFieldLine,
    bracket: &MirrorBracket,
    energies: &[f64],
    settings: &BounceSettings,
) -> Result<Vec<f64>> {
    settings.validate()?;
    if let Some(bad) = energies.iter().find(|e| !(e.is_finite() && **e > 0.0)) {
        return Err(DriftError::InvalidSettings(format!(
            "kinetic energies must be positive and finite, got {}",
            bad
        )));
    }
    if !(bracket.low < bracket.high) {
        return Err(DriftError::InvalidSettings(format!(
            "mirror bracket is empty: [{}, {}]",
            bracket.low, bracket.high
        )));
    }
    if settings.samples > line.len() {
        warn!(
            trace_points = line.len(),
            samples = settings.samples,
            "resample count exceeds the traced points; interpolation invents resolution the engine did not provide"
        );
    } else if settings.samples < line.len() {
        warn!(
            trace_points = line.len(),
            samples = settings.samples,
            "resampling with fewer points than the engine traced; the bounce period may be inaccurate"
        );
    }

    let constants = &settings.trace.constants;
    let path = ResampledPath::new(line, bracket, settings.samples, constants);
    let mirror_field = line.reference_field();
    debug!(
        low = bracket.low,
        high = bracket.high,
        energies = energies.len(),
        "integrating bounce period"
    );

    energies
        .iter()
        .map(|&energy| {
            let period = 2.0
                * path.travel_time(|b| {
                    parallel_velocity(
                        energy,
                        mirror_field,
                        b,
                        settings.rest_energy_kev,
                        constants.speed_of_light,
                    )
                });
            if period.is_finite() {
                Ok(period)
            } else {
                Err(DriftError::NonFinitePeriod { energy })
            }
        })
        .collect()
}

/// [`bounce_periods`] shaped like the energy input.
pub fn bounce_period(
    line: &InterpolatedFieldLine,
    bracket: &MirrorBracket,
    energies: &OneOrMany<f64>,
    settings: &BounceSettings,
) -> Result<OneOrMany<f64>> {
    let periods = bounce_periods(line, bracket, energies.as_slice(), settings)?;
    Ok(match energies {
        OneOrMany::One(_) => OneOrMany::One(periods[0]),
        OneOrMany::Many(_) => OneOrMany::Many(periods),
    })
}

/// Altitude (km above `reference_radius`) of the mirror point in the
/// hemisphere opposite the start of the trace.
///
/// Traces start in the northern hemisphere when `z` at the low root is
/// positive, in which case the conjugate point is the high root.
pub fn mirror_point_altitude(
    line: &InterpolatedFieldLine,
    bracket: &MirrorBracket,
    reference_radius: f64,
    constants: &PhysicalConstants,
) -> f64 {
    let conjugate = if line.position(bracket.low).z > 0.0 {
        bracket.high
    } else {
        bracket.low
    };
    constants.earth_radius_km() * (line.position(conjugate).norm() - reference_radius)
}
