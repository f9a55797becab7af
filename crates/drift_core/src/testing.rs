//! Centred-dipole engine for tests.
//!
//! Positions are GEO cartesian in Earth radii regardless of the model
//! options. Field lines follow `r = L cos²λ` with
//! `B = B0 / r³ · sqrt(1 + 3 sin²λ)`.

use std::io;
use std::sync::{Arc, Mutex};

use anyhow::Result;

use crate::config::{ModelOptions, ENGINE_FILL};
use crate::engine::{FieldLineSample, FieldLineTrace, LstarColumns};
use crate::inputs::{EngineLocation, ModelParams, NormalizedEphemeris};
use crate::traits::FieldEngine;

#[derive(Debug, Clone, Copy)]
pub(crate) struct DipoleEngine {
    /// Equatorial surface field (nT).
    pub b0: f64,
    /// Samples per traced line.
    pub points: usize,
    /// Report every line as open.
    pub open: bool,
}

impl Default for DipoleEngine {
    fn default() -> Self {
        Self {
            b0: 30_000.0,
            points: 401,
            open: false,
        }
    }
}

impl DipoleEngine {
    /// `(L, λ, φ)` of a cartesian position.
    fn shell(position: [f64; 3]) -> (f64, f64, f64) {
        let [x, y, z] = position;
        let r = (x * x + y * y + z * z).sqrt();
        let lat = (z / r).asin();
        (r / lat.cos().powi(2), lat, y.atan2(x))
    }

    fn field(&self, l: f64, lat: f64) -> f64 {
        let r = l * lat.cos().powi(2);
        self.b0 / r.powi(3) * (1.0 + 3.0 * lat.sin().powi(2)).sqrt()
    }
}

impl FieldEngine for DipoleEngine {
    fn make_lstar(
        &self,
        _options: &ModelOptions,
        points: &NormalizedEphemeris,
        _params: &[ModelParams],
    ) -> Result<LstarColumns> {
        let mut columns = LstarColumns::default();
        for i in 0..points.len() {
            let (l, lat, _) = Self::shell(points.location(i).position);
            columns.lm.push(l);
            columns.lstar.push(l);
            columns.blocal.push(self.field(l, lat));
            columns.bmin.push(self.b0 / l.powi(3));
            columns.xj.push(ENGINE_FILL);
            columns.mlt.push(ENGINE_FILL);
        }
        Ok(columns)
    }

    /// Traces from the northern foot at `reference_radius` to the southern one.
    fn trace_field_line(
        &self,
        _options: &ModelOptions,
        location: &EngineLocation,
        _params: &ModelParams,
        reference_radius: f64,
    ) -> Result<FieldLineTrace> {
        let (l, _, lon) = Self::shell(location.position);
        if self.open || reference_radius > l {
            return Ok(FieldLineTrace::open());
        }
        let foot = (reference_radius / l).sqrt().acos();
        let last = (self.points - 1) as f64;
        let samples = (0..self.points)
            .map(|k| {
                let lat = foot - 2.0 * foot * k as f64 / last;
                let r = l * lat.cos().powi(2);
                FieldLineSample {
                    position: [
                        r * lat.cos() * lon.cos(),
                        r * lat.cos() * lon.sin(),
                        r * lat.sin(),
                    ],
                    b_local: self.field(l, lat),
                }
            })
            .collect();
        let mut trace = FieldLineTrace::from_samples(samples);
        trace.lm = l;
        trace.bmin = self.b0 / l.powi(3);
        Ok(trace)
    }
}

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log buffer poisoned"))?
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Runs `f` under a thread-local subscriber and returns what it logged at
/// `WARN` and above.
pub(crate) fn capture_warnings<T>(f: impl FnOnce() -> T) -> (T, String) {
    let buffer = SharedBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_max_level(tracing::Level::WARN)
        .with_ansi(false)
        .finish();
    let value = tracing::subscriber::with_default(subscriber, f);
    let bytes = buffer.0.lock().map(|b| b.clone()).unwrap_or_default();
    (value, String::from_utf8_lossy(&bytes).into_owned())
}
