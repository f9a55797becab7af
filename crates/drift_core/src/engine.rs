//! Records exchanged with the field engine.
//!
//! `Raw*` types and [`FieldLineTrace`] carry the engine's own conventions
//! (fill values, the open-line length sentinel, fixed buffer capacities).
//! The checked types returned to callers carry `Option`s instead of fill
//! values, and buffer overflows become [`DriftError::Truncation`].

use anyhow::anyhow;
use serde::{Deserialize, Serialize};

use crate::config::{
    DRIFT_SHELL_LINES, DRIFT_SHELL_LINE_CAPACITY, MISSING, OPEN_LINE_LENGTH, TRACE_CAPACITY,
};
use crate::error::{DriftError, Result};

/// Maps engine fill values (and the input sentinel) to `None`.
pub fn engine_value(value: f64) -> Option<f64> {
    if !value.is_finite() || value <= -1e30 || value == MISSING {
        None
    } else {
        Some(value)
    }
}

fn engine_triple(values: [f64; 3]) -> Option<[f64; 3]> {
    match values.map(engine_value) {
        [Some(x), Some(y), Some(z)] => Some([x, y, z]),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FieldLineSample {
    /// GEO position in Earth radii.
    pub position: [f64; 3],
    /// Local field magnitude (nT).
    pub b_local: f64,
}

/// A traced field line as returned by the engine.
///
/// `traced_length` is [`OPEN_LINE_LENGTH`] when the line never came back
/// to the reference surface; `samples` is then meaningless.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldLineTrace {
    pub traced_length: i32,
    pub samples: Vec<FieldLineSample>,
    pub lm: f64,
    pub bmin: f64,
    pub xj: f64,
}

impl FieldLineTrace {
    /// A closed trace with no scalar diagnostics.
    pub fn from_samples(samples: Vec<FieldLineSample>) -> Self {
        Self {
            traced_length: samples.len() as i32,
            samples,
            lm: MISSING,
            bmin: MISSING,
            xj: MISSING,
        }
    }

    pub fn open() -> Self {
        Self {
            traced_length: OPEN_LINE_LENGTH,
            samples: Vec::new(),
            lm: MISSING,
            bmin: MISSING,
            xj: MISSING,
        }
    }

    pub fn is_open(&self) -> bool {
        self.traced_length == OPEN_LINE_LENGTH
    }

    /// Number of samples, or `None` for an open line.
    pub fn len(&self) -> Option<usize> {
        if self.is_open() {
            None
        } else {
            Some(self.samples.len())
        }
    }

    pub fn lm(&self) -> Option<f64> {
        engine_value(self.lm)
    }

    pub fn bmin(&self) -> Option<f64> {
        engine_value(self.bmin)
    }

    pub fn xj(&self) -> Option<f64> {
        engine_value(self.xj)
    }

    /// Rejects traces that filled the engine buffer or disagree with their
    /// own length. Open lines pass through untouched.
    pub(crate) fn check(&self) -> Result<()> {
        if self.is_open() {
            return Ok(());
        }
        let found = self.traced_length.max(0) as usize;
        if found >= TRACE_CAPACITY || self.samples.len() >= TRACE_CAPACITY {
            return Err(DriftError::Truncation {
                what: "field-line trace",
                capacity: TRACE_CAPACITY,
                found: found.max(self.samples.len()),
            });
        }
        if self.traced_length < 0 || found != self.samples.len() {
            return Err(DriftError::Engine(anyhow!(
                "trace reports {} points but holds {} samples",
                self.traced_length,
                self.samples.len()
            )));
        }
        Ok(())
    }
}

/// Column-major `make_lstar` output, one entry per input point.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LstarColumns {
    pub lm: Vec<f64>,
    pub lstar: Vec<f64>,
    pub blocal: Vec<f64>,
    pub bmin: Vec<f64>,
    pub xj: Vec<f64>,
    pub mlt: Vec<f64>,
}

impl LstarColumns {
    pub(crate) fn into_rows(self, expected: usize) -> Result<Vec<LstarOutput>> {
        let lengths = [
            self.lm.len(),
            self.lstar.len(),
            self.blocal.len(),
            self.bmin.len(),
            self.xj.len(),
            self.mlt.len(),
        ];
        if lengths.iter().any(|&len| len != expected) {
            return Err(DriftError::Engine(anyhow!(
                "make_lstar returned columns of lengths {:?} for {} points",
                lengths,
                expected
            )));
        }
        Ok((0..expected)
            .map(|i| LstarOutput {
                lm: engine_value(self.lm[i]),
                lstar: engine_value(self.lstar[i]),
                blocal: engine_value(self.blocal[i]),
                bmin: engine_value(self.bmin[i]),
                xj: engine_value(self.xj[i]),
                mlt: engine_value(self.mlt[i]),
            })
            .collect())
    }
}

/// L-shell diagnostics at one point. `None` marks values the engine could not compute.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LstarOutput {
    pub lm: Option<f64>,
    pub lstar: Option<f64>,
    pub blocal: Option<f64>,
    pub bmin: Option<f64>,
    pub xj: Option<f64>,
    pub mlt: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawDriftShell {
    pub lm: f64,
    pub lstar: f64,
    pub bmin: f64,
    pub xj: f64,
    /// One trace per field line around the drift shell.
    pub lines: Vec<Vec<FieldLineSample>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DriftShell {
    pub lm: Option<f64>,
    pub lstar: Option<f64>,
    pub bmin: Option<f64>,
    pub xj: Option<f64>,
    pub lines: Vec<Vec<FieldLineSample>>,
}

impl RawDriftShell {
    pub(crate) fn checked(self) -> Result<DriftShell> {
        if self.lines.len() > DRIFT_SHELL_LINES {
            return Err(DriftError::Truncation {
                what: "drift shell",
                capacity: DRIFT_SHELL_LINES,
                found: self.lines.len(),
            });
        }
        if let Some(line) = self
            .lines
            .iter()
            .find(|line| line.len() >= DRIFT_SHELL_LINE_CAPACITY)
        {
            return Err(DriftError::Truncation {
                what: "drift-shell field line",
                capacity: DRIFT_SHELL_LINE_CAPACITY,
                found: line.len(),
            });
        }
        Ok(DriftShell {
            lm: engine_value(self.lm),
            lstar: engine_value(self.lstar),
            bmin: engine_value(self.bmin),
            xj: engine_value(self.xj),
            lines: self.lines.into_iter().filter(|line| !line.is_empty()).collect(),
        })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RawMirrorPoint {
    pub blocal: f64,
    pub bmin: f64,
    pub position: [f64; 3],
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MirrorPoint {
    pub blocal: Option<f64>,
    pub bmin: Option<f64>,
    /// GEO position of the mirror point.
    pub position: Option<[f64; 3]>,
}

impl From<RawMirrorPoint> for MirrorPoint {
    fn from(raw: RawMirrorPoint) -> Self {
        Self {
            blocal: engine_value(raw.blocal),
            bmin: engine_value(raw.bmin),
            position: engine_triple(raw.position),
        }
    }
}

/// Where to look for a foot point.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Hemisphere {
    Same,
    North,
    South,
    Opposite,
}

impl Hemisphere {
    pub fn flag(self) -> i32 {
        match self {
            Hemisphere::Same => 0,
            Hemisphere::North => 1,
            Hemisphere::South => -1,
            Hemisphere::Opposite => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RawFootPoint {
    pub position: [f64; 3],
    pub field: [f64; 3],
    pub field_magnitude: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FootPoint {
    /// GDZ position of the foot point.
    pub position: Option<[f64; 3]>,
    /// GEO field vector at the foot point (nT).
    pub field: Option<[f64; 3]>,
    pub field_magnitude: Option<f64>,
}

impl From<RawFootPoint> for FootPoint {
    fn from(raw: RawFootPoint) -> Self {
        Self {
            position: engine_triple(raw.position),
            field: engine_triple(raw.field),
            field_magnitude: engine_value(raw.field_magnitude),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RawMagEquator {
    pub bmin: f64,
    pub position: [f64; 3],
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MagEquator {
    pub bmin: Option<f64>,
    /// GEO position of the equatorial crossing.
    pub position: Option<[f64; 3]>,
}

impl From<RawMagEquator> for MagEquator {
    fn from(raw: RawMagEquator) -> Self {
        Self {
            bmin: engine_value(raw.bmin),
            position: engine_triple(raw.position),
        }
    }
}
