use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::RootSettings;
use crate::error::{DriftError, LineHalf, Result};
use crate::field_line::InterpolatedFieldLine;

#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum BracketError {
    #[error("f(a) and f(b) must have different signs (f({a}) = {fa}, f({b}) = {fb})")]
    NoSignChange { a: f64, b: f64, fa: f64, fb: f64 },

    #[error("no convergence after {0} iterations")]
    NotConverged(usize),
}

/// Brent's method on `[a, b]`.
///
/// `f(a)` and `f(b)` must differ in sign; an endpoint where `f` is exactly
/// zero is returned as the root. Converges when the bracket half-width
/// falls below `(xtol + rtol·|x|) / 2`.
pub fn brent<F>(
    f: F,
    a: f64,
    b: f64,
    settings: &RootSettings,
) -> std::result::Result<f64, BracketError>
where
    F: Fn(f64) -> f64,
{
    let mut xpre = a;
    let mut xcur = b;
    let mut fpre = f(xpre);
    let mut fcur = f(xcur);

    if fpre * fcur > 0.0 || fpre.is_nan() || fcur.is_nan() {
        return Err(BracketError::NoSignChange {
            a,
            b,
            fa: fpre,
            fb: fcur,
        });
    }
    if fpre == 0.0 {
        return Ok(xpre);
    }
    if fcur == 0.0 {
        return Ok(xcur);
    }

    let mut xblk = 0.0;
    let mut fblk = 0.0;
    let mut spre = 0.0;
    let mut scur = 0.0;

    for _ in 0..settings.max_iter {
        if fpre != 0.0 && fcur != 0.0 && fpre.signum() != fcur.signum() {
            xblk = xpre;
            fblk = fpre;
            spre = xcur - xpre;
            scur = spre;
        }
        // Keep the best estimate in xcur.
        if fblk.abs() < fcur.abs() {
            xpre = xcur;
            xcur = xblk;
            xblk = xpre;
            fpre = fcur;
            fcur = fblk;
            fblk = fpre;
        }

        let delta = (settings.xtol + settings.rtol * xcur.abs()) / 2.0;
        let sbis = (xblk - xcur) / 2.0;
        if fcur == 0.0 || sbis.abs() < delta {
            return Ok(xcur);
        }

        if spre.abs() > delta && fcur.abs() < fpre.abs() {
            let stry = if xpre == xblk {
                // secant
                -fcur * (xcur - xpre) / (fcur - fpre)
            } else {
                // inverse quadratic
                let dpre = (fpre - fcur) / (xpre - xcur);
                let dblk = (fblk - fcur) / (xblk - xcur);
                -fcur * (fblk * dblk - fpre * dpre) / (dblk * dpre * (fblk - fpre))
            };
            if 2.0 * stry.abs() < spre.abs().min(3.0 * sbis.abs() - delta) {
                spre = scur;
                scur = stry;
            } else {
                spre = sbis;
                scur = sbis;
            }
        } else {
            spre = sbis;
            scur = sbis;
        }

        xpre = xcur;
        fpre = fcur;
        if scur.abs() > delta {
            xcur += scur;
        } else {
            xcur += if sbis > 0.0 { delta } else { -delta };
        }
        fcur = f(xcur);
    }

    Err(BracketError::NotConverged(settings.max_iter))
}

/// Arc indices of the two conjugate mirror points on a field line.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MirrorBracket {
    pub low: f64,
    pub high: f64,
}

/// Finds where the field returns to the reference field on each side of
/// the line's midpoint.
///
/// Splitting at `N / 2` assumes the trace is roughly symmetric about the
/// magnetic equator; strongly asymmetric lines may put both crossings in
/// one half, which shows up as `MirrorBelowGround`. A crossing exactly at
/// `N / 2` leaves both roots there and is reported as `DegenerateBracket`.
pub fn find_mirror_bracket(
    line: &InterpolatedFieldLine,
    settings: &RootSettings,
) -> Result<MirrorBracket> {
    settings.validate()?;
    let mid = line.midpoint();
    let deficit = |s: f64| line.field_deficit(s);
    let solve = |a: f64, b: f64, half: LineHalf| {
        brent(deficit, a, b, settings).map_err(|err| match err {
            BracketError::NoSignChange { .. } => DriftError::MirrorBelowGround { half },
            BracketError::NotConverged(iterations) => DriftError::RootNotConverged { iterations },
        })
    };
    let low = solve(0.0, mid, LineHalf::Leading)?;
    let high = solve(mid, line.max_arc(), LineHalf::Trailing)?;
    if !(low < mid && low < high) {
        return Err(DriftError::DegenerateBracket { low, high });
    }
    Ok(MirrorBracket { low, high })
}
