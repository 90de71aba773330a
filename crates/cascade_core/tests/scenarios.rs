use cascade_core::config::{ChartMode, SweepConfig};
use cascade_core::divergence::ErrorLog;
use cascade_core::grid::Range;
use cascade_core::map::{FormulaSelection, MapFormula};
use cascade_core::presets::find_preset;
use cascade_core::progress::{CancelToken, ProgressEvent, SweepPhase};
use cascade_core::sweep::SweepEngine;
use cascade_core::view::SweepOutcome;
use cascade_core::worker::spawn_sweep;

fn delayed_logistic(r: Range, b: Range, x0: f64, n_iter: usize, draw_steps: usize) -> SweepConfig {
    SweepConfig {
        r,
        b,
        x0,
        n_iter,
        draw_steps,
        formulas: FormulaSelection::only(MapFormula::DelayedLogistic),
        chart_mode: ChartMode::All,
    }
}

#[test]
fn single_point_sweep_stays_bounded() {
    let config = delayed_logistic(
        Range::new(1.4, 1.4, 0.1),
        Range::new(0.3, 0.3, 0.1),
        0.0,
        800,
        600,
    );
    let mut events: Vec<ProgressEvent> = Vec::new();
    let mut errors: Option<ErrorLog> = None;
    let result = SweepEngine::new(config)
        .expect("engine")
        .run(&CancelToken::new(), &mut events, &mut errors);

    assert_eq!(result.outcome(), SweepOutcome::Completed);
    assert_eq!(result.grid_len(), 1);
    assert_eq!(result.steps_taken(), 801 + 600);

    let stabilizing = events
        .iter()
        .filter(|event| event.phase == SweepPhase::Stabilizing)
        .map(|event| event.current)
        .max();
    let recording = events
        .iter()
        .filter(|event| event.phase == SweepPhase::Recording)
        .map(|event| event.current)
        .max();
    assert_eq!(stabilizing, Some(801));
    assert_eq!(recording, Some(600));

    let [lo, hi] = result.limits().x;
    assert!(lo.is_finite() && hi.is_finite());
    assert!(lo <= hi);
    assert_eq!(result.limits().n, [801.0, 1400.0]);
    assert_eq!(result.limits().r, [1.4, 1.4]);
    assert!(errors.expect("log").is_empty());
}

#[test]
fn wide_sweep_reports_divergence_and_stays_finite() {
    let config = delayed_logistic(
        Range::new(0.0, 4.0, 0.05),
        Range::new(0.4, 0.4, 0.1),
        0.4,
        800,
        300,
    );
    let mut errors: Option<ErrorLog> = None;
    let result = SweepEngine::new(config)
        .expect("engine")
        .run(&CancelToken::new(), &mut (), &mut errors);

    assert_eq!(result.grid_len(), 81);
    let log = errors.expect("log");
    assert!(!log.is_empty());
    // Every divergent step logs the whole grid.
    assert_eq!(log.len(), log.divergent_steps() * result.grid_len());

    let history = result
        .history(MapFormula::DelayedLogistic)
        .expect("history");
    assert_eq!(history.written_len(), 302 * 81);
    assert!(history.written().iter().all(|value| value.is_finite()));
    let [lo, hi] = result.limits().x;
    assert!(lo.is_finite() && hi.is_finite());
}

#[test]
fn renderer_consumes_every_frame() {
    let config = delayed_logistic(
        Range::new(2.8, 3.2, 0.2),
        Range::new(0.0, 0.1, 0.1),
        0.5,
        20,
        10,
    );
    let mut result = SweepEngine::new(config)
        .expect("engine")
        .run(&CancelToken::new(), &mut (), &mut ());

    let mut frames = 0;
    while result.frames_remaining() > 0 {
        let (_, last_next) = result
            .last_pair(MapFormula::DelayedLogistic)
            .expect("formula");
        assert_eq!(last_next.len(), result.grid_len());
        frames += 1;
        result.advance_window().expect("frame");
    }
    assert!(result.advance_window().is_err());
    assert_eq!(frames, 10);
}

#[test]
fn preset_runs_on_worker_thread() {
    let preset = find_preset("r = 1.4; b = 0.3").expect("preset");
    let config = SweepConfig {
        n_iter: 50,
        draw_steps: 40,
        ..preset.config(ChartMode::PhaseAndTrend)
    };
    let handle = spawn_sweep(config).expect("spawn");
    let completion = handle.wait().expect("completion");

    assert_eq!(completion.result.generations(), 40);
    assert_eq!(completion.result.formulas().count(), 2);
    assert!(completion.result.coefficient_r().is_none());
    assert!(completion.errors.is_empty());
}
