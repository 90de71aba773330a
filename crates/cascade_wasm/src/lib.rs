//! Browser bindings for the cascade sweep engine.

mod presets;
mod runner;

pub use presets::{list_presets, preset_config, preset_names, preset_sweep_config};
pub use runner::{parse_formula, RunnerProgress, WasmSweepResult, WasmSweepRunner};

use cascade_core::map::MapFormula;
use cascade_core::orbit::trace_orbit;
use js_sys::Float64Array;
use wasm_bindgen::prelude::*;

/// Trajectory `x[0..=steps]` of a single coefficient pair.
#[wasm_bindgen]
pub fn compute_orbit(formula: &str, r: f64, b: f64, x0: f64, steps: u32) -> Result<Float64Array, JsValue> {
    let formula: MapFormula =
        parse_formula(formula).map_err(|e| JsValue::from_str(&format!("{}", e)))?;
    let orbit = trace_orbit(formula, r, b, x0, steps as usize);
    Ok(Float64Array::from(orbit.as_slice()))
}

/// `(label, expression)` of every formula, for legends.
#[wasm_bindgen]
pub fn formula_expressions() -> Result<JsValue, JsValue> {
    let formulas: Vec<(&str, &str)> = MapFormula::ALL
        .iter()
        .map(|formula| (formula.label(), formula.expression()))
        .collect();
    serde_wasm_bindgen::to_value(&formulas)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::{compute_orbit, WasmSweepRunner};
    use wasm_bindgen::JsValue;
    use wasm_bindgen_test::wasm_bindgen_test;

    #[wasm_bindgen_test]
    fn orbit_rejects_unknown_formula() {
        let message = compute_orbit("f9", 1.0, 0.0, 0.0, 3)
            .err()
            .and_then(|err| err.as_string())
            .unwrap_or_default();
        assert!(message.contains("Unknown formula"));
    }

    #[wasm_bindgen_test]
    fn runner_accepts_missing_config() {
        let mut runner = WasmSweepRunner::new(JsValue::UNDEFINED).expect("runner");
        runner.run_steps(5).expect("steps");
        assert!(!runner.is_done());
        runner.cancel();
        runner.run_steps(1).expect("steps");
        assert!(runner.is_done());
        let result = runner.finish().expect("result");
        assert!(result.is_cancelled());
        assert_eq!(result.next("f1").expect("frame").length(), 0);
    }
}
