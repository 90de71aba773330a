//! Stepped sweep runner for hosts without threads.
//!
//! The page calls `run_steps` from its animation loop, then `finish` once
//! `is_done` reports true (or after `cancel`).

use anyhow::{anyhow, bail, Result};
use cascade_core::config::SweepConfig;
use cascade_core::divergence::ErrorLog;
use cascade_core::map::MapFormula;
use cascade_core::progress::{CancelToken, ProgressEvent, ProgressSink, SweepPhase};
use cascade_core::sweep::{SweepEngine, SweepState};
use cascade_core::view::SweepResult;
use js_sys::Float64Array;
use serde::Serialize;
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunnerProgress {
    pub done: bool,
    pub phase: Option<SweepPhase>,
    pub status: &'static str,
    pub current_step: usize,
    pub max_steps: usize,
    pub has_drawable_points: bool,
}

impl RunnerProgress {
    fn new(done: bool, event: Option<ProgressEvent>, has_drawable_points: bool) -> Self {
        Self {
            done,
            phase: event.map(|event| event.phase),
            status: event.map_or("", |event| event.status()),
            current_step: event.map_or(0, |event| event.current),
            max_steps: event.map_or(0, |event| event.max),
            has_drawable_points,
        }
    }
}

/// Keeps only the most recent event.
#[derive(Default)]
struct LatestEvent(Option<ProgressEvent>);

impl ProgressSink for LatestEvent {
    fn publish(&mut self, event: ProgressEvent) {
        self.0 = Some(event);
    }
}

struct RunnerState {
    engine: SweepEngine,
    cancel: CancelToken,
    latest: LatestEvent,
}

#[wasm_bindgen]
pub struct WasmSweepRunner {
    state: Option<RunnerState>,
}

#[wasm_bindgen]
impl WasmSweepRunner {
    /// `config` is a serialized `SweepConfig`; missing fields take their defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<WasmSweepRunner, JsValue> {
        #[cfg(target_arch = "wasm32")]
        console_error_panic_hook::set_once();

        let config: SweepConfig = if config.is_undefined() || config.is_null() {
            SweepConfig::default()
        } else {
            from_value(config)
                .map_err(|e| JsValue::from_str(&format!("Invalid sweep config: {}", e)))?
        };
        Self::from_config(config).map_err(|e| JsValue::from_str(&format!("{}", e)))
    }

    pub fn is_done(&self) -> bool {
        self.state
            .as_ref()
            .map_or(true, |state| state.engine.state().is_terminal())
    }

    pub fn run_steps(&mut self, batch_size: u32) -> Result<JsValue, JsValue> {
        let progress = self
            .advance(batch_size as usize)
            .map_err(|e| JsValue::from_str(&format!("{}", e)))?;
        to_value(&progress).map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    pub fn get_progress(&self) -> Result<JsValue, JsValue> {
        let progress = self
            .progress()
            .map_err(|e| JsValue::from_str(&format!("{}", e)))?;
        to_value(&progress).map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    /// Stops the sweep before its next iteration.
    pub fn cancel(&self) {
        if let Some(state) = self.state.as_ref() {
            state.cancel.cancel();
        }
    }

    /// Hands the recorded trajectories over. The runner is spent afterwards.
    pub fn finish(&mut self) -> Result<WasmSweepResult, JsValue> {
        self.take_result()
            .map_err(|e| JsValue::from_str(&format!("{}", e)))
    }
}

impl WasmSweepRunner {
    pub fn from_config(config: SweepConfig) -> Result<Self> {
        let engine = SweepEngine::new(config)?;
        Ok(Self {
            state: Some(RunnerState {
                engine,
                cancel: CancelToken::new(),
                latest: LatestEvent::default(),
            }),
        })
    }

    pub fn advance(&mut self, batch_size: usize) -> Result<RunnerProgress> {
        let state = self
            .state
            .as_mut()
            .ok_or_else(|| anyhow!("Runner already finished"))?;
        state
            .engine
            .run_steps(batch_size, &state.cancel, &mut state.latest);
        self.progress()
    }

    pub fn progress(&self) -> Result<RunnerProgress> {
        let state = self
            .state
            .as_ref()
            .ok_or_else(|| anyhow!("Runner already finished"))?;
        let engine = &state.engine;
        let done = engine.state().is_terminal();
        let event = engine.progress().or(state.latest.0);
        Ok(RunnerProgress::new(done, event, engine.has_drawable_points()))
    }

    pub fn take_result(&mut self) -> Result<WasmSweepResult> {
        let state = self
            .state
            .take()
            .ok_or_else(|| anyhow!("Runner already finished"))?;
        if state.engine.state() == SweepState::Idle {
            bail!("Sweep has not started; call run_steps first");
        }
        let mut errors: Option<ErrorLog> = None;
        let result = state.engine.finish(&mut errors);
        Ok(WasmSweepResult {
            result,
            errors: errors.unwrap_or_default(),
        })
    }
}

/// A finished sweep, consumed one frame at a time by the page.
#[wasm_bindgen]
pub struct WasmSweepResult {
    result: SweepResult,
    errors: ErrorLog,
}

#[wasm_bindgen]
impl WasmSweepResult {
    pub fn grid_len(&self) -> usize {
        self.result.grid_len()
    }

    pub fn generations(&self) -> usize {
        self.result.generations()
    }

    pub fn is_cancelled(&self) -> bool {
        self.result.is_cancelled()
    }

    pub fn has_drawable_points(&self) -> bool {
        self.result.has_drawable_points()
    }

    pub fn frames_remaining(&self) -> usize {
        self.result.frames_remaining()
    }

    pub fn advance_window(&mut self) -> Result<(), JsValue> {
        self.result
            .advance_window()
            .map_err(|e| JsValue::from_str(&format!("{}", e)))
    }

    pub fn rewind(&mut self) {
        self.result.rewind();
    }

    pub fn n(&self) -> Option<Float64Array> {
        self.result.n().map(Float64Array::from)
    }

    pub fn coefficient_r(&self) -> Option<Float64Array> {
        self.result.coefficient_r().map(Float64Array::from)
    }

    pub fn last_coefficient_r(&self) -> Option<Float64Array> {
        self.result.last_coefficient_r().map(Float64Array::from)
    }

    /// `x[n]` history of `formula` (`"f1"` or `"f2"`) up to the current frame.
    pub fn current(&self, formula: &str) -> Result<Float64Array, JsValue> {
        let (current, _) = self.frame(formula, false)?;
        Ok(Float64Array::from(current))
    }

    /// `x[n+1]` history matching [`current`](Self::current).
    pub fn next(&self, formula: &str) -> Result<Float64Array, JsValue> {
        let (_, next) = self.frame(formula, false)?;
        Ok(Float64Array::from(next))
    }

    pub fn last_current(&self, formula: &str) -> Result<Float64Array, JsValue> {
        let (current, _) = self.frame(formula, true)?;
        Ok(Float64Array::from(current))
    }

    pub fn last_next(&self, formula: &str) -> Result<Float64Array, JsValue> {
        let (_, next) = self.frame(formula, true)?;
        Ok(Float64Array::from(next))
    }

    pub fn limits(&self) -> Result<JsValue, JsValue> {
        to_value(&self.result.limits())
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    pub fn outcome(&self) -> Result<JsValue, JsValue> {
        to_value(&self.result.outcome())
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Divergence report, one line per logged grid point.
    pub fn error_log_text(&self) -> String {
        self.errors.to_text()
    }
}

impl WasmSweepResult {
    pub fn result(&self) -> &SweepResult {
        &self.result
    }

    pub fn errors(&self) -> &ErrorLog {
        &self.errors
    }

    fn frame(&self, label: &str, last_only: bool) -> Result<(&[f64], &[f64]), JsValue> {
        let formula = parse_formula(label).map_err(|e| JsValue::from_str(&format!("{}", e)))?;
        let frame = if last_only {
            self.result.last_pair(formula)
        } else {
            self.result.current_and_next(formula)
        };
        frame.ok_or_else(|| JsValue::from_str(&format!("Formula {} was not swept", label)))
    }
}

pub fn parse_formula(label: &str) -> Result<MapFormula> {
    MapFormula::from_label(label).ok_or_else(|| anyhow!("Unknown formula: {}", label))
}

#[cfg(test)]
mod tests {
    use super::{parse_formula, WasmSweepRunner};
    use cascade_core::config::SweepConfig;
    use cascade_core::grid::Range;
    use cascade_core::map::MapFormula;
    use cascade_core::progress::SweepPhase;

    fn config() -> SweepConfig {
        SweepConfig {
            r: Range::new(1.0, 1.4, 0.2),
            b: Range::new(0.3, 0.3, 0.1),
            n_iter: 3,
            draw_steps: 5,
            ..SweepConfig::default()
        }
    }

    #[test]
    fn runner_reaches_done_in_batches() {
        let mut runner = WasmSweepRunner::from_config(config()).expect("runner");
        let progress = runner.advance(2).expect("advance");
        assert!(!progress.done);
        assert_eq!(progress.phase, Some(SweepPhase::Stabilizing));
        assert_eq!(progress.status, "Reaching steady state (1/3)");

        let mut batches = 0;
        while !runner.advance(3).expect("advance").done {
            batches += 1;
            assert!(batches < 10, "runner should finish");
        }
        let finished = runner.progress().expect("progress");
        assert_eq!(finished.phase, Some(SweepPhase::Recording));
        assert_eq!(finished.current_step, 5);
        assert!(finished.has_drawable_points);

        let result = runner.take_result().expect("result");
        assert_eq!(result.result().generations(), 5);
        assert!(result.errors().is_empty());
        assert!(runner.advance(1).is_err());
    }

    #[test]
    fn cancelled_runner_keeps_written_generations() {
        let mut runner = WasmSweepRunner::from_config(config()).expect("runner");
        // Idle transition, four stabilization steps, two recorded generations.
        runner.advance(1 + 4 + 2).expect("advance");
        runner.cancel();
        assert!(runner.advance(1).expect("advance").done);

        let result = runner.take_result().expect("result");
        assert!(result.result().is_cancelled());
        assert_eq!(result.result().generations(), 2);
    }

    #[test]
    fn unstarted_runner_has_no_result() {
        let mut runner = WasmSweepRunner::from_config(config()).expect("runner");
        assert!(runner.take_result().is_err());
    }

    #[test]
    fn invalid_config_is_reported() {
        let config = SweepConfig {
            x0: f64::NAN,
            ..config()
        };
        let message = WasmSweepRunner::from_config(config)
            .err()
            .map(|err| err.to_string())
            .unwrap_or_default();
        assert!(message.contains("x0 must be finite"));
    }

    #[test]
    fn formula_labels_are_parsed() {
        assert_eq!(parse_formula("f2").expect("formula"), MapFormula::Henon);
        assert!(parse_formula("x").is_err());
    }
}
