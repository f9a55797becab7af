//! Continuous representation of a traced field line.

use nalgebra::Vector3;

use crate::engine::FieldLineTrace;
use crate::error::{DriftError, Result};
use crate::spline::CubicSpline;

/// Cubic interpolants of a field line over its arc index `s ∈ [0, N-1]`.
///
/// The arc index is dimensionless; physical lengths come from differences
/// of [`position`](Self::position), which is in Earth radii.
#[derive(Debug, Clone, PartialEq)]
pub struct InterpolatedFieldLine {
    deficit: CubicSpline,
    x: CubicSpline,
    y: CubicSpline,
    z: CubicSpline,
    reference_field: f64,
}

impl InterpolatedFieldLine {
    /// Builds the interpolants. `reference_field` is the local field magnitude
    /// at the starting point, which is also the mirror field of a particle
    /// mirroring there.
    pub fn new(trace: &FieldLineTrace, reference_field: f64) -> Result<Self> {
        if trace.is_open() {
            return Err(DriftError::OpenFieldLine);
        }
        let samples = &trace.samples;
        let deficit = CubicSpline::new(
            samples
                .iter()
                .map(|sample| sample.b_local - reference_field)
                .collect(),
        )?;
        let axis = |k: usize| CubicSpline::new(samples.iter().map(|s| s.position[k]).collect());
        Ok(Self {
            deficit,
            x: axis(0)?,
            y: axis(1)?,
            z: axis(2)?,
            reference_field,
        })
    }

    /// Number of trace samples `N`.
    pub fn len(&self) -> usize {
        self.deficit.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deficit.is_empty()
    }

    /// Largest valid arc index, `N - 1`.
    pub fn max_arc(&self) -> f64 {
        (self.len() - 1) as f64
    }

    /// Arc index `N / 2` assumed to separate the two hemispheres.
    pub fn midpoint(&self) -> f64 {
        self.len() as f64 / 2.0
    }

    pub fn reference_field(&self) -> f64 {
        self.reference_field
    }

    /// `B(s) - B_ref`.
    pub fn field_deficit(&self, s: f64) -> f64 {
        self.deficit.eval(s)
    }

    pub fn field(&self, s: f64) -> f64 {
        self.deficit.eval(s) + self.reference_field
    }

    pub fn position(&self, s: f64) -> Vector3<f64> {
        Vector3::new(self.x.eval(s), self.y.eval(s), self.z.eval(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::FieldLineSample;

    fn parabola_trace(n: usize) -> FieldLineTrace {
        FieldLineTrace::from_samples(
            (0..n)
                .map(|i| {
                    let s = i as f64;
                    FieldLineSample {
                        position: [s, 2.0 * s, 0.5 * s * s],
                        b_local: 1000.0 + (s - 3.0).powi(2),
                    }
                })
                .collect(),
        )
    }

    #[test]
    fn open_line_is_rejected() {
        let err = InterpolatedFieldLine::new(&FieldLineTrace::open(), 100.0).expect_err("open");
        assert!(matches!(err, DriftError::OpenFieldLine));
    }

    #[test]
    fn short_line_is_rejected() {
        let err = InterpolatedFieldLine::new(&parabola_trace(3), 100.0).expect_err("short");
        assert!(matches!(err, DriftError::InsufficientSamples { found: 3, .. }));
    }

    #[test]
    fn deficit_is_relative_to_reference_field() {
        let line = InterpolatedFieldLine::new(&parabola_trace(8), 1004.0).expect("line");
        assert_eq!(line.len(), 8);
        assert_eq!(line.max_arc(), 7.0);
        assert_eq!(line.midpoint(), 4.0);
        assert!((line.field_deficit(1.0)).abs() < 1e-9);
        assert!((line.field_deficit(3.5) - (0.25 - 4.0)).abs() < 1e-9);
        assert!((line.field(3.5) - 1000.25).abs() < 1e-9);
    }

    #[test]
    fn position_interpolates_each_axis() {
        let line = InterpolatedFieldLine::new(&parabola_trace(8), 1004.0).expect("line");
        let p = line.position(2.5);
        assert!((p - Vector3::new(2.5, 5.0, 3.125)).norm() < 1e-9);
    }

    #[test]
    fn rebuilding_gives_identical_interpolants() {
        let trace = parabola_trace(10);
        let a = InterpolatedFieldLine::new(&trace, 1002.0).expect("line");
        let b = InterpolatedFieldLine::new(&trace, 1002.0).expect("line");
        assert_eq!(a, b);
    }
}
