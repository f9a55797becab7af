//! Input normalization.
//!
//! Turns caller-facing points, times and model inputs into the fixed-shape
//! arrays the field engine consumes. Everything here is deterministic: the
//! same inputs always produce bit-identical arrays, in input order.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::{LARGE_BATCH_WARNING, MISSING};
use crate::error::{InputFormatError, Result};

/// A single value or an ordered sequence of values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn len(&self) -> usize {
        match self {
            OneOrMany::One(_) => 1,
            OneOrMany::Many(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_slice(&self) -> &[T] {
        match self {
            OneOrMany::One(value) => std::slice::from_ref(value),
            OneOrMany::Many(values) => values,
        }
    }
}

impl<T> From<T> for OneOrMany<T> {
    fn from(value: T) -> Self {
        OneOrMany::One(value)
    }
}

impl<T> From<Vec<T>> for OneOrMany<T> {
    fn from(values: Vec<T>) -> Self {
        OneOrMany::Many(values)
    }
}

/// A timestamp as supplied by the caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum TimeInput {
    Instant(NaiveDateTime),
    Text(String),
}

impl From<NaiveDateTime> for TimeInput {
    fn from(value: NaiveDateTime) -> Self {
        TimeInput::Instant(value)
    }
}

impl From<&str> for TimeInput {
    fn from(value: &str) -> Self {
        TimeInput::Text(value.to_string())
    }
}

impl TimeInput {
    pub fn resolve(&self) -> Result<NaiveDateTime> {
        match self {
            TimeInput::Instant(t) => Ok(*t),
            TimeInput::Text(text) => parse_timestamp(text),
        }
    }
}

const DATETIME_FORMATS: [&str; 8] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y%m%dT%H%M%S",
];

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d"];

/// Parses a text timestamp in any of the common formats, assuming UTC.
pub fn parse_timestamp(text: &str) -> Result<NaiveDateTime> {
    let text = text.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(text) {
        return Ok(t.naive_utc());
    }
    for format in DATETIME_FORMATS {
        if let Ok(t) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(t);
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            if let Some(t) = date.and_hms_opt(0, 0, 0) {
                return Ok(t);
            }
        }
    }
    Err(InputFormatError::Timestamp(text.to_string()).into())
}

/// Time split the way the engine expects it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct EngineTime {
    pub year: i32,
    pub doy: i32,
    /// Seconds of day, whole seconds only.
    pub ut: f64,
}

impl From<NaiveDateTime> for EngineTime {
    fn from(t: NaiveDateTime) -> Self {
        Self {
            year: t.year(),
            doy: t.ordinal() as i32,
            ut: (3600 * t.hour() + 60 * t.minute() + t.second()) as f64,
        }
    }
}

/// A position at a moment in time, in the model's input coordinate system.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpacetimePoint {
    pub time: TimeInput,
    pub x1: f64,
    pub x2: f64,
    pub x3: f64,
}

impl SpacetimePoint {
    pub fn new(time: impl Into<TimeInput>, x1: f64, x2: f64, x3: f64) -> Self {
        Self {
            time: time.into(),
            x1,
            x2,
            x3,
        }
    }

    pub fn to_location(&self) -> Result<EngineLocation> {
        Ok(EngineLocation {
            time: EngineTime::from(self.time.resolve()?),
            position: [self.x1, self.x2, self.x3],
        })
    }
}

/// One or many points as parallel columns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ephemeris {
    pub time: OneOrMany<TimeInput>,
    pub x1: OneOrMany<f64>,
    pub x2: OneOrMany<f64>,
    pub x3: OneOrMany<f64>,
}

impl From<&SpacetimePoint> for Ephemeris {
    fn from(point: &SpacetimePoint) -> Self {
        Self {
            time: OneOrMany::One(point.time.clone()),
            x1: OneOrMany::One(point.x1),
            x2: OneOrMany::One(point.x2),
            x3: OneOrMany::One(point.x3),
        }
    }
}

impl FromIterator<SpacetimePoint> for Ephemeris {
    fn from_iter<I: IntoIterator<Item = SpacetimePoint>>(iter: I) -> Self {
        let mut time = Vec::new();
        let (mut x1, mut x2, mut x3) = (Vec::new(), Vec::new(), Vec::new());
        for point in iter {
            time.push(point.time);
            x1.push(point.x1);
            x2.push(point.x2);
            x3.push(point.x3);
        }
        Self {
            time: OneOrMany::Many(time),
            x1: OneOrMany::Many(x1),
            x2: OneOrMany::Many(x2),
            x3: OneOrMany::Many(x3),
        }
    }
}

impl Ephemeris {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn normalize(&self) -> Result<NormalizedEphemeris> {
        let count = self.time.len();
        for (field, column) in [("x1", &self.x1), ("x2", &self.x2), ("x3", &self.x3)] {
            if column.len() != count {
                return Err(InputFormatError::LengthMismatch {
                    field,
                    expected: count,
                    found: column.len(),
                }
                .into());
            }
        }
        if count > LARGE_BATCH_WARNING {
            warn!(
                points = count,
                "more than {} points in one batch; the field engine may fail without warning",
                LARGE_BATCH_WARNING
            );
        }

        let mut out = NormalizedEphemeris::with_capacity(count);
        for (i, time) in self.time.as_slice().iter().enumerate() {
            let t = EngineTime::from(time.resolve()?);
            out.year.push(t.year);
            out.doy.push(t.doy);
            out.ut.push(t.ut);
            out.x1.push(self.x1.as_slice()[i]);
            out.x2.push(self.x2.as_slice()[i]);
            out.x3.push(self.x3.as_slice()[i]);
        }
        Ok(out)
    }
}

/// One row of a normalized ephemeris.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct EngineLocation {
    pub time: EngineTime,
    pub position: [f64; 3],
}

/// Parallel engine arrays, one entry per input point.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NormalizedEphemeris {
    pub year: Vec<i32>,
    pub doy: Vec<i32>,
    pub ut: Vec<f64>,
    pub x1: Vec<f64>,
    pub x2: Vec<f64>,
    pub x3: Vec<f64>,
}

impl NormalizedEphemeris {
    fn with_capacity(n: usize) -> Self {
        Self {
            year: Vec::with_capacity(n),
            doy: Vec::with_capacity(n),
            ut: Vec::with_capacity(n),
            x1: Vec::with_capacity(n),
            x2: Vec::with_capacity(n),
            x3: Vec::with_capacity(n),
        }
    }

    pub fn len(&self) -> usize {
        self.year.len()
    }

    pub fn is_empty(&self) -> bool {
        self.year.is_empty()
    }

    pub fn location(&self, i: usize) -> EngineLocation {
        EngineLocation {
            time: EngineTime {
                year: self.year[i],
                doy: self.doy[i],
                ut: self.ut[i],
            },
            position: [self.x1[i], self.x2[i], self.x3[i]],
        }
    }
}

/// External-field model parameters, in the order the engine stores them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MagParam {
    Kp,
    Dst,
    #[serde(rename = "dens")]
    Dens,
    #[serde(rename = "velo")]
    Velo,
    Pdyn,
    #[serde(rename = "ByIMF")]
    ByImf,
    #[serde(rename = "BzIMF")]
    BzImf,
    G1,
    G2,
    G3,
    W1,
    W2,
    W3,
    W4,
    W5,
    W6,
    #[serde(rename = "AL")]
    Al,
}

/// Number of model parameter slots.
pub const MAG_PARAM_COUNT: usize = 17;

impl MagParam {
    pub const ALL: [MagParam; MAG_PARAM_COUNT] = [
        MagParam::Kp,
        MagParam::Dst,
        MagParam::Dens,
        MagParam::Velo,
        MagParam::Pdyn,
        MagParam::ByImf,
        MagParam::BzImf,
        MagParam::G1,
        MagParam::G2,
        MagParam::G3,
        MagParam::W1,
        MagParam::W2,
        MagParam::W3,
        MagParam::W4,
        MagParam::W5,
        MagParam::W6,
        MagParam::Al,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            MagParam::Kp => "Kp",
            MagParam::Dst => "Dst",
            MagParam::Dens => "dens",
            MagParam::Velo => "velo",
            MagParam::Pdyn => "Pdyn",
            MagParam::ByImf => "ByIMF",
            MagParam::BzImf => "BzIMF",
            MagParam::G1 => "G1",
            MagParam::G2 => "G2",
            MagParam::G3 => "G3",
            MagParam::W1 => "W1",
            MagParam::W2 => "W2",
            MagParam::W3 => "W3",
            MagParam::W4 => "W4",
            MagParam::W5 => "W5",
            MagParam::W6 => "W6",
            MagParam::Al => "AL",
        }
    }
}

impl fmt::Display for MagParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MagParam {
    type Err = InputFormatError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        MagParam::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| InputFormatError::UnknownParameter(s.to_string()))
    }
}

/// Flattened parameter vector for one point; unused slots hold [`MISSING`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ModelParams(pub [f64; MAG_PARAM_COUNT]);

impl Default for ModelParams {
    fn default() -> Self {
        Self([MISSING; MAG_PARAM_COUNT])
    }
}

impl ModelParams {
    pub fn get(&self, param: MagParam) -> f64 {
        self.0[param.index()]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

/// Caller-facing model inputs keyed by parameter name.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct MagInputs {
    values: BTreeMap<MagParam, OneOrMany<f64>>,
}

impl MagInputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, param: MagParam, value: impl Into<OneOrMany<f64>>) -> Self {
        self.values.insert(param, value.into());
        self
    }

    pub fn insert(&mut self, param: MagParam, value: impl Into<OneOrMany<f64>>) {
        self.values.insert(param, value.into());
    }

    /// Inserts a value by its engine name ("Kp", "ByIMF", ...).
    pub fn insert_named(&mut self, name: &str, value: impl Into<OneOrMany<f64>>) -> Result<()> {
        let param = name.parse::<MagParam>()?;
        self.insert(param, value);
        Ok(())
    }

    pub fn get(&self, param: MagParam) -> Option<&OneOrMany<f64>> {
        self.values.get(&param)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Builds one parameter vector per point.
    ///
    /// Scalar inputs apply to every point; sequence inputs must supply one
    /// entry per point. Mixing the two is rejected.
    pub fn normalize(&self, points: usize) -> Result<Vec<ModelParams>> {
        let scalar = self
            .values
            .values()
            .all(|v| matches!(v, OneOrMany::One(_)));
        let sequence = self
            .values
            .values()
            .all(|v| matches!(v, OneOrMany::Many(_)));
        if !scalar && !sequence {
            return Err(InputFormatError::MixedModelInputs.into());
        }

        if scalar {
            let mut params = ModelParams::default();
            for (param, value) in &self.values {
                params.0[param.index()] = value.as_slice()[0];
            }
            return Ok(vec![params; points]);
        }

        for (param, value) in &self.values {
            if value.len() != points {
                return Err(InputFormatError::LengthMismatch {
                    field: param.name(),
                    expected: points,
                    found: value.len(),
                }
                .into());
            }
        }
        let mut rows = vec![ModelParams::default(); points];
        for (param, value) in &self.values {
            for (row, v) in rows.iter_mut().zip(value.as_slice()) {
                row.0[param.index()] = *v;
            }
        }
        Ok(rows)
    }
}
