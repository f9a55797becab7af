//! Field-line geometry for traces computed outside the browser.

use anyhow::{bail, Result};
use drift_core::bounce::{bounce_periods, mirror_point_altitude};
use drift_core::config::BounceSettings;
use drift_core::engine::{FieldLineSample, FieldLineTrace};
use drift_core::field_line::InterpolatedFieldLine;
use drift_core::solvers::{find_mirror_bracket, MirrorBracket};
use js_sys::Float64Array;
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

/// Packs flat `[x0, y0, z0, x1, ...]` positions and field magnitudes into a trace.
pub(crate) fn trace_from_flat(positions: &[f64], b_local: &[f64]) -> Result<FieldLineTrace> {
    if positions.len() % 3 != 0 {
        bail!(
            "Positions must hold x, y, z triples (got {} values).",
            positions.len()
        );
    }
    if positions.len() / 3 != b_local.len() {
        bail!(
            "Position count {} does not match field count {}.",
            positions.len() / 3,
            b_local.len()
        );
    }
    Ok(FieldLineTrace::from_samples(
        positions
            .chunks_exact(3)
            .zip(b_local)
            .map(|(p, &b)| FieldLineSample {
                position: [p[0], p[1], p[2]],
                b_local: b,
            })
            .collect(),
    ))
}

/// Interpolated line with the settings used for every computation on it.
pub(crate) struct FieldLineState {
    line: InterpolatedFieldLine,
    settings: BounceSettings,
}

impl FieldLineState {
    pub(crate) fn new(positions: &[f64], b_local: &[f64], reference_field: f64) -> Result<Self> {
        let trace = trace_from_flat(positions, b_local)?;
        Ok(Self {
            line: InterpolatedFieldLine::new(&trace, reference_field)?,
            settings: BounceSettings::default(),
        })
    }

    pub(crate) fn set_settings(&mut self, settings: BounceSettings) -> Result<()> {
        settings.validate()?;
        self.settings = settings;
        Ok(())
    }

    pub(crate) fn bracket(&self) -> Result<MirrorBracket> {
        Ok(find_mirror_bracket(&self.line, &self.settings.trace.root)?)
    }

    pub(crate) fn bounce_periods(&self, energies: &[f64]) -> Result<Vec<f64>> {
        let bracket = self.bracket()?;
        Ok(bounce_periods(&self.line, &bracket, energies, &self.settings)?)
    }

    pub(crate) fn mirror_altitude(&self) -> Result<f64> {
        let bracket = self.bracket()?;
        let trace = &self.settings.trace;
        Ok(mirror_point_altitude(
            &self.line,
            &bracket,
            trace.reference_radius,
            &trace.constants,
        ))
    }

    /// `count` evenly spaced `[s, x, y, z, B]` rows over the whole line.
    pub(crate) fn sample(&self, count: usize) -> Vec<f64> {
        if count == 0 {
            return Vec::new();
        }
        let step = if count > 1 {
            self.line.max_arc() / (count - 1) as f64
        } else {
            0.0
        };
        let mut out = Vec::with_capacity(count * 5);
        for k in 0..count {
            let s = k as f64 * step;
            let p = self.line.position(s);
            out.extend_from_slice(&[s, p.x, p.y, p.z, self.line.field(s)]);
        }
        out
    }
}

#[wasm_bindgen]
pub struct WasmFieldLine {
    state: FieldLineState,
}

#[wasm_bindgen]
impl WasmFieldLine {
    /// `positions` are GEO triples in Earth radii, `b_local` the field (nT)
    /// at each, `reference_field` the local field at the particle.
    #[wasm_bindgen(constructor)]
    pub fn new(
        positions: Vec<f64>,
        b_local: Vec<f64>,
        reference_field: f64,
    ) -> Result<WasmFieldLine, JsValue> {
        console_error_panic_hook::set_once();

        let state = FieldLineState::new(&positions, &b_local, reference_field)
            .map_err(|e| JsValue::from_str(&format!("Invalid field line: {}", e)))?;
        Ok(WasmFieldLine { state })
    }

    pub fn set_settings(&mut self, settings_val: JsValue) -> Result<(), JsValue> {
        let settings: BounceSettings = from_value(settings_val)
            .map_err(|e| JsValue::from_str(&format!("Invalid bounce settings: {}", e)))?;
        self.state
            .set_settings(settings)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn mirror_bracket(&self) -> Result<JsValue, JsValue> {
        let bracket = self
            .state
            .bracket()
            .map_err(|e| JsValue::from_str(&format!("Mirror search failed: {}", e)))?;
        to_value(&bracket).map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    pub fn bounce_periods(&self, energies: Vec<f64>) -> Result<Vec<f64>, JsValue> {
        self.state
            .bounce_periods(&energies)
            .map_err(|e| JsValue::from_str(&format!("Bounce period failed: {}", e)))
    }

    pub fn mirror_altitude(&self) -> Result<f64, JsValue> {
        self.state
            .mirror_altitude()
            .map_err(|e| JsValue::from_str(&format!("Mirror search failed: {}", e)))
    }

    /// Flat `[s, x, y, z, B]` rows for plotting.
    pub fn sample(&self, count: u32) -> Float64Array {
        Float64Array::from(self.state.sample(count as usize).as_slice())
    }
}
