use anyhow::Result;
use drift_core::inputs::{Ephemeris, MagInputs, ModelParams, NormalizedEphemeris};
use drift_core::kinematics;
use serde::Serialize;
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

pub mod field_line;

pub use field_line::WasmFieldLine;

/// Engine-ready arrays for a batch of points.
#[derive(Debug, Serialize)]
struct NormalizedInputs {
    ephemeris: NormalizedEphemeris,
    params: Vec<ModelParams>,
}

fn normalize(ephemeris: &Ephemeris, inputs: &MagInputs) -> Result<NormalizedInputs> {
    let ephemeris = ephemeris.normalize()?;
    let params = inputs.normalize(ephemeris.len())?;
    Ok(NormalizedInputs { ephemeris, params })
}

/// Normalizes `{time, x1, x2, x3}` columns and a model-input map into the
/// arrays a field engine consumes.
#[wasm_bindgen]
pub fn normalize_inputs(ephemeris_val: JsValue, maginput_val: JsValue) -> Result<JsValue, JsValue> {
    let ephemeris: Ephemeris = from_value(ephemeris_val)
        .map_err(|e| JsValue::from_str(&format!("Invalid ephemeris: {}", e)))?;
    let inputs: MagInputs = if maginput_val.is_undefined() || maginput_val.is_null() {
        MagInputs::new()
    } else {
        from_value(maginput_val)
            .map_err(|e| JsValue::from_str(&format!("Invalid model inputs: {}", e)))?
    };
    let normalized =
        normalize(&ephemeris, &inputs).map_err(|e| JsValue::from_str(&e.to_string()))?;
    to_value(&normalized).map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

#[wasm_bindgen]
pub fn relativistic_beta(kinetic_energy: f64, rest_energy: f64) -> f64 {
    kinematics::relativistic_beta(kinetic_energy, rest_energy)
}

#[wasm_bindgen]
pub fn parallel_velocity(
    kinetic_energy: f64,
    mirror_field: f64,
    local_field: f64,
    rest_energy: f64,
    speed_of_light: f64,
) -> f64 {
    kinematics::parallel_velocity(
        kinetic_energy,
        mirror_field,
        local_field,
        rest_energy,
        speed_of_light,
    )
}
