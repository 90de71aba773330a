//! Built-in configurations for the page's preset picker.

use anyhow::Result;
use cascade_core::config::{ChartMode, SweepConfig};
use cascade_core::presets::{find_preset, presets};
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

/// Every preset, in menu order.
#[wasm_bindgen]
pub fn list_presets() -> Result<JsValue, JsValue> {
    to_value(presets()).map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

pub fn preset_names() -> Vec<&'static str> {
    presets().iter().map(|preset| preset.name).collect()
}

pub fn preset_sweep_config(name: &str, chart_mode: ChartMode) -> Result<SweepConfig> {
    Ok(find_preset(name)?.config(chart_mode))
}

/// Serialized `SweepConfig` for the named preset, ready for `WasmSweepRunner`.
#[wasm_bindgen]
pub fn preset_config(name: &str, chart_mode: JsValue) -> Result<JsValue, JsValue> {
    let chart_mode: ChartMode = if chart_mode.is_undefined() || chart_mode.is_null() {
        ChartMode::default()
    } else {
        from_value(chart_mode)
            .map_err(|e| JsValue::from_str(&format!("Invalid chart mode: {}", e)))?
    };
    let config =
        preset_sweep_config(name, chart_mode).map_err(|e| JsValue::from_str(&format!("{}", e)))?;
    to_value(&config).map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::{list_presets, preset_config};
    use cascade_core::config::SweepConfig;
    use serde_wasm_bindgen::from_value;
    use wasm_bindgen::JsValue;
    use wasm_bindgen_test::wasm_bindgen_test;

    #[wasm_bindgen_test]
    fn preset_config_round_trips_through_js() {
        let value = preset_config("r = 1.4; b = 0.3", JsValue::UNDEFINED).expect("config");
        let config: SweepConfig = from_value(value).expect("decode");
        assert_eq!(config.n_iter, 800);
        assert!(list_presets().expect("presets").is_object());
    }
}
