use std::fmt;

use thiserror::Error;

/// Problems with caller-provided inputs, raised before any engine call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputFormatError {
    #[error("cannot parse timestamp \"{0}\"")]
    Timestamp(String),

    #[error("length mismatch: {field} has {found} entries, expected {expected}")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        found: usize,
    },

    #[error(
        "model inputs are in an unrecognizable format: values must be all scalars or all sequences"
    )]
    MixedModelInputs,

    #[error("unknown model input \"{0}\"")]
    UnknownParameter(String),
}

/// Which half of the arc-index domain a mirror-point search ran in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineHalf {
    Leading,
    Trailing,
}

impl fmt::Display for LineHalf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineHalf::Leading => write!(f, "leading"),
            LineHalf::Trailing => write!(f, "trailing"),
        }
    }
}

#[derive(Error, Debug)]
pub enum DriftError {
    #[error("invalid input: {0}")]
    InputFormat(#[from] InputFormatError),

    #[error("open field line: the trace never returned to the reference surface")]
    OpenFieldLine,

    #[error(
        "mirror point below the reference surface in the {half} half of the field line; \
         retry with a larger reference radius"
    )]
    MirrorBelowGround { half: LineHalf },

    #[error("field line has {found} samples, cubic interpolation needs at least {required}")]
    InsufficientSamples { found: usize, required: usize },

    #[error("{what} reached the engine buffer capacity ({found} >= {capacity}); output may be truncated")]
    Truncation {
        what: &'static str,
        capacity: usize,
        found: usize,
    },

    #[error("root finder failed to converge in {iterations} iterations")]
    RootNotConverged { iterations: usize },

    #[error(
        "mirror bracket [{low}, {high}] is degenerate: both roots fall on the hemisphere split"
    )]
    DegenerateBracket { low: f64, high: f64 },

    #[error(
        "bounce period for {energy} keV is not finite: the parallel velocity vanishes inside the bracket"
    )]
    NonFinitePeriod { energy: f64 },

    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    #[error("engine returned no value for {0}")]
    Undefined(&'static str),

    #[error("field engine error: {0}")]
    Engine(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, DriftError>;
