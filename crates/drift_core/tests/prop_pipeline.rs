//! Property-based tests for the field-line pipeline using proptest.
//!
//! Covers: mirror bracketing, interpolator determinism, kinematics limits,
//! per-energy independence of bounce periods, open-line handling.

use drift_core::bounce::bounce_periods;
use drift_core::config::{BounceSettings, ModelOptions, RootSettings, OPEN_LINE_LENGTH};
use drift_core::engine::{FieldLineSample, FieldLineTrace, LstarColumns};
use drift_core::inputs::{EngineLocation, ModelParams, NormalizedEphemeris};
use drift_core::kinematics::{parallel_velocity, relativistic_beta};
use drift_core::solvers::find_mirror_bracket;
use drift_core::{
    DriftError, DriftModel, FieldEngine, InterpolatedFieldLine, MagInputs, OneOrMany,
    SpacetimePoint,
};
use proptest::prelude::*;

fn straight_trace(field: impl Fn(f64) -> f64, n: usize) -> FieldLineTrace {
    FieldLineTrace::from_samples(
        (0..n)
            .map(|i| {
                let s = i as f64;
                FieldLineSample {
                    position: [s * 0.05, 0.0, 1.0 - s * 0.02],
                    b_local: field(s),
                }
            })
            .collect(),
    )
}

fn synthetic_line() -> InterpolatedFieldLine {
    let trace = straight_trace(|s| 2000.0 + (s - 25.0).powi(2) - 625.0, 51);
    InterpolatedFieldLine::new(&trace, 2000.0).expect("line")
}

// ── Mirror Bracket Properties ────────────────────────────────────────

proptest! {
    /// A field well roughly centred on the line gives one crossing per half,
    /// with the low root before N/2 and the high root at or after it.
    #[test]
    fn bracket_straddles_midpoint(
        n in 20usize..200,
        offset in -2.0f64..2.0,
        width in 0.0f64..1.0,
        floor in 10.0f64..50_000.0,
        curvature in 0.01f64..100.0,
    ) {
        let centre = n as f64 / 2.0 + offset;
        let half_width = 3.0 + width * (n as f64 / 2.0 - 6.0);
        let trace = straight_trace(|s| floor + curvature * (s - centre).powi(2), n);
        let mirror = floor + curvature * half_width * half_width;
        let line = InterpolatedFieldLine::new(&trace, mirror).expect("line");

        let bracket = find_mirror_bracket(&line, &RootSettings::default()).expect("bracket");
        prop_assert!(bracket.low < line.midpoint(), "low = {}", bracket.low);
        prop_assert!(line.midpoint() <= bracket.high, "high = {}", bracket.high);
        prop_assert!((bracket.low - (centre - half_width)).abs() < 1e-6);
        prop_assert!((bracket.high - (centre + half_width)).abs() < 1e-6);
    }
}

// ── Interpolator Properties ──────────────────────────────────────────

proptest! {
    /// Rebuilding from the same trace gives identical interpolants.
    #[test]
    fn interpolation_is_deterministic(
        fields in prop::collection::vec(100.0f64..60_000.0, 4..80),
        reference in 100.0f64..60_000.0,
        at in 0.0f64..1.0,
    ) {
        let n = fields.len();
        let trace = straight_trace(|s| fields[s as usize], n);
        let a = InterpolatedFieldLine::new(&trace, reference).expect("line");
        let b = InterpolatedFieldLine::new(&trace, reference).expect("line");
        prop_assert_eq!(&a, &b);

        let s = at * a.max_arc();
        prop_assert_eq!(a.field(s).to_bits(), b.field(s).to_bits());
        prop_assert_eq!(a.position(s), b.position(s));
    }

    /// The interpolant passes through every sample.
    #[test]
    fn interpolation_hits_the_knots(
        fields in prop::collection::vec(100.0f64..60_000.0, 4..80),
    ) {
        let trace = straight_trace(|s| fields[s as usize], fields.len());
        let line = InterpolatedFieldLine::new(&trace, 0.0).expect("line");
        for (i, b) in fields.iter().enumerate() {
            prop_assert!((line.field(i as f64) - b).abs() < 1e-6 * b.abs());
        }
    }
}

// ── Kinematics Properties ────────────────────────────────────────────

proptest! {
    #[test]
    fn particle_at_rest_has_zero_speed(rest in 1.0f64..1e7) {
        prop_assert_eq!(relativistic_beta(0.0, rest), 0.0);
    }

    #[test]
    fn beta_stays_below_one(energy in 1e-3f64..1e9, rest in 1.0f64..1e7) {
        let beta = relativistic_beta(energy, rest);
        prop_assert!(beta > 0.0 && beta < 1.0, "beta = {}", beta);
    }

    #[test]
    fn parallel_velocity_vanishes_at_mirror_field(
        energy in 1e-3f64..1e6,
        mirror in 1.0f64..1e5,
    ) {
        prop_assert_eq!(parallel_velocity(energy, mirror, mirror, 511.0, 3.0e8), 0.0);
    }
}

// ── Bounce Period Properties ─────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// A batch of energies gives the same periods as one call per energy.
    #[test]
    fn energies_do_not_interact(energies in prop::collection::vec(1.0f64..10_000.0, 1..6)) {
        let line = synthetic_line();
        let bracket = find_mirror_bracket(&line, &RootSettings::default()).expect("bracket");
        let settings = BounceSettings { samples: 500, ..BounceSettings::default() };

        let batch = bounce_periods(&line, &bracket, &energies, &settings).expect("batch");
        prop_assert_eq!(batch.len(), energies.len());
        for (energy, period) in energies.iter().zip(&batch) {
            let single = bounce_periods(&line, &bracket, &[*energy], &settings).expect("single");
            prop_assert_eq!(single[0].to_bits(), period.to_bits());
        }
    }
}

// ── Open Field Lines ─────────────────────────────────────────────────

/// Engine whose every trace comes back open.
struct OpenEngine;

impl FieldEngine for OpenEngine {
    fn make_lstar(
        &self,
        _options: &ModelOptions,
        points: &NormalizedEphemeris,
        _params: &[ModelParams],
    ) -> anyhow::Result<LstarColumns> {
        let n = points.len();
        Ok(LstarColumns {
            lm: vec![6.0; n],
            lstar: vec![5.5; n],
            blocal: vec![140.0; n],
            bmin: vec![120.0; n],
            xj: vec![0.4; n],
            mlt: vec![12.0; n],
        })
    }

    fn trace_field_line(
        &self,
        _options: &ModelOptions,
        _location: &EngineLocation,
        _params: &ModelParams,
        _reference_radius: f64,
    ) -> anyhow::Result<FieldLineTrace> {
        Ok(FieldLineTrace::open())
    }
}

proptest! {
    /// The open-line length sentinel wins over whatever samples came with it.
    #[test]
    fn sentinel_length_is_open_line(
        fields in prop::collection::vec(1.0f64..1e5, 0..40),
        reference in 1.0f64..1e5,
    ) {
        let mut trace = straight_trace(|s| fields[s as usize], fields.len());
        trace.traced_length = OPEN_LINE_LENGTH;
        prop_assert!(matches!(
            InterpolatedFieldLine::new(&trace, reference),
            Err(DriftError::OpenFieldLine)
        ));
    }

    #[test]
    fn open_trace_fails_bounce_period(
        x in 5.0f64..10.0,
        energy in 1.0f64..5_000.0,
    ) {
        let model = DriftModel::new(OpenEngine);
        let point = SpacetimePoint::new("2015-02-02T06:12:43", x, 0.0, 0.0);
        let result = model.bounce_period(
            &point,
            &MagInputs::new(),
            &OneOrMany::One(energy),
            &BounceSettings::default(),
        );
        prop_assert!(matches!(result, Err(DriftError::OpenFieldLine)));
    }
}

// ── Reference Scenario ───────────────────────────────────────────────

#[test]
fn symmetric_synthetic_trace() {
    let line = synthetic_line();
    let bracket = find_mirror_bracket(&line, &RootSettings::default()).expect("bracket");
    assert!(bracket.low.abs() < 1e-8, "low = {}", bracket.low);
    assert!((bracket.high - 50.0).abs() < 1e-8, "high = {}", bracket.high);

    let settings = BounceSettings {
        samples: 10_000,
        ..BounceSettings::default()
    };
    let period = bounce_periods(&line, &bracket, &[100.0], &settings).expect("period")[0];
    assert!(period.is_finite() && period > 0.0, "period = {period}");
}
