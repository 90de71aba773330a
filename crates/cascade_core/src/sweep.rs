//! Two-phase sweep over the coefficient grid.
//!
//! The engine first iterates every active formula `n_iter + 1` times without
//! storing anything (stabilization), then records `draw_steps` generations
//! into a per-formula [`HistoryBuffer`] through a sliding [`Window`].
//! Cancellation is polled before every iteration, so a generation is always
//! written for all active formulas or for none.
//!
//! The engine can be driven in three ways: [`SweepEngine::run`] blocks until
//! the sweep ends, [`SweepEngine::run_steps`] advances a bounded batch for
//! single-threaded hosts, and [`crate::worker::spawn_sweep`] moves the whole
//! run onto a worker thread.

use crate::config::{SweepConfig, SweepPlan};
use crate::divergence::{ErrorLog, ErrorSink};
use crate::error::SweepError;
use crate::grid::Grid;
use crate::history::HistoryBuffer;
use crate::map::{evaluate, MapFormula};
use crate::progress::{CancelToken, ProgressEvent, ProgressSink, SweepPhase};
use crate::view::{AxisLimits, FormulaHistory, SweepOutcome, SweepResult, X_LIMIT_CLAMP};
use crate::window::Window;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepState {
    /// Buffers allocated, nothing iterated yet.
    Idle,
    Stabilizing,
    Recording,
    /// All iterations done; [`SweepEngine::finish`] produces the result.
    Finalizing,
    Cancelled { phase: SweepPhase },
}

impl SweepState {
    pub fn is_terminal(self) -> bool {
        matches!(self, SweepState::Finalizing | SweepState::Cancelled { .. })
    }
}

/// Rolling state of one formula.
struct FormulaTrack {
    formula: MapFormula,
    x_prev: Vec<f64>,
    x_cur: Vec<f64>,
    history: HistoryBuffer,
}

pub struct SweepEngine {
    config: SweepConfig,
    plan: SweepPlan,
    grid: Grid,
    tracks: Vec<FormulaTrack>,
    window: Window,
    state: SweepState,
    /// Iterations completed in the current phase.
    iteration: usize,
    /// Global step counter used to tag divergence records.
    step: usize,
    log: ErrorLog,
    step_axis: Option<Vec<f64>>,
    coefficient_history: Option<Vec<f64>>,
    has_drawable_points: bool,
}

impl SweepEngine {
    /// Validates `config` and allocates every buffer the run needs.
    ///
    /// All configuration errors surface here, before any iteration.
    pub fn new(config: SweepConfig) -> Result<Self, SweepError> {
        let plan = config.plan()?;
        let grid = Grid::build(&config.r, &config.b)?;

        let mut tracks = Vec::new();
        for formula in config.formulas.active() {
            tracks.push(FormulaTrack {
                formula,
                x_prev: filled(plan.grid_len, config.x0)?,
                x_cur: filled(plan.grid_len, config.x0)?,
                history: HistoryBuffer::new(plan.grid_len, plan.buffer_len)?,
            });
        }

        let step_axis = config.chart_mode.needs_step_axis().then(Vec::new);
        let coefficient_history = config
            .chart_mode
            .needs_coefficient_history()
            .then(Vec::new);

        Ok(Self {
            window: Window::new(plan.grid_len),
            config,
            plan,
            grid,
            tracks,
            state: SweepState::Idle,
            iteration: 0,
            step: 0,
            log: ErrorLog::new(),
            step_axis,
            coefficient_history,
            has_drawable_points: false,
        })
    }

    pub fn state(&self) -> SweepState {
        self.state
    }

    pub fn plan(&self) -> &SweepPlan {
        &self.plan
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn error_log(&self) -> &ErrorLog {
        &self.log
    }

    pub fn has_drawable_points(&self) -> bool {
        self.has_drawable_points
    }

    /// Global step counter.
    pub fn steps_taken(&self) -> usize {
        self.step
    }

    /// Progress of the current phase.
    pub fn progress(&self) -> Option<ProgressEvent> {
        let (phase, max) = match self.state {
            SweepState::Stabilizing => (SweepPhase::Stabilizing, self.plan.stabilization_steps),
            SweepState::Recording => (SweepPhase::Recording, self.config.draw_steps),
            _ => return None,
        };
        Some(self.event(phase, max))
    }

    /// Performs one iteration or one phase transition.
    pub fn advance(&mut self, cancel: &CancelToken, progress: &mut impl ProgressSink) -> SweepState {
        match self.state {
            SweepState::Idle => {
                if self.tracks.is_empty() {
                    self.state = SweepState::Finalizing;
                } else {
                    self.enter_phase(SweepState::Stabilizing, progress);
                }
            }
            SweepState::Stabilizing => {
                if cancel.is_cancelled() {
                    self.state = SweepState::Cancelled {
                        phase: SweepPhase::Stabilizing,
                    };
                } else {
                    self.stabilize_once();
                    progress.publish(self.event(SweepPhase::Stabilizing, self.plan.stabilization_steps));
                    if self.iteration == self.plan.stabilization_steps {
                        self.seed_history();
                        self.enter_phase(SweepState::Recording, progress);
                    }
                }
            }
            SweepState::Recording => {
                if self.iteration == self.config.draw_steps {
                    self.state = SweepState::Finalizing;
                } else if cancel.is_cancelled() {
                    self.state = SweepState::Cancelled {
                        phase: SweepPhase::Recording,
                    };
                } else {
                    self.record_once();
                    progress.publish(self.event(SweepPhase::Recording, self.config.draw_steps));
                    self.window.advance();
                    if self.iteration == self.config.draw_steps {
                        self.state = SweepState::Finalizing;
                    }
                }
            }
            SweepState::Finalizing | SweepState::Cancelled { .. } => {}
        }
        self.state
    }

    /// Advances at most `batch_size` times, stopping early at a terminal state.
    pub fn run_steps(
        &mut self,
        batch_size: usize,
        cancel: &CancelToken,
        progress: &mut impl ProgressSink,
    ) -> SweepState {
        for _ in 0..batch_size {
            if self.advance(cancel, progress).is_terminal() {
                break;
            }
        }
        self.state
    }

    /// Runs the sweep to completion or cancellation and finalizes it.
    pub fn run(
        mut self,
        cancel: &CancelToken,
        progress: &mut impl ProgressSink,
        errors: &mut impl ErrorSink,
    ) -> SweepResult {
        while !self.advance(cancel, progress).is_terminal() {}
        self.finish(errors)
    }

    /// Resets the window, derives axis limits and hands the log to `errors`.
    ///
    /// Finishing an engine that has not reached a terminal state treats the
    /// run as cancelled in its current phase.
    pub fn finish(mut self, errors: &mut impl ErrorSink) -> SweepResult {
        let outcome = match self.state {
            SweepState::Finalizing => SweepOutcome::Completed,
            SweepState::Cancelled { phase } => SweepOutcome::Cancelled { phase },
            SweepState::Idle | SweepState::Stabilizing => SweepOutcome::Cancelled {
                phase: SweepPhase::Stabilizing,
            },
            SweepState::Recording => SweepOutcome::Cancelled {
                phase: SweepPhase::Recording,
            },
        };
        self.window.reset();

        let limits = AxisLimits {
            x: self.x_limits(),
            n: self.n_limits(),
            r: self.grid.r_bounds(),
        };
        let generations = self
            .tracks
            .first()
            .map_or(0, |track| track.history.recorded_generations());

        errors.accept(std::mem::take(&mut self.log));

        SweepResult {
            histories: self
                .tracks
                .into_iter()
                .map(|track| FormulaHistory {
                    formula: track.formula,
                    buffer: track.history,
                })
                .collect(),
            config: self.config,
            grid: self.grid,
            step_axis: self.step_axis,
            coefficient_history: self.coefficient_history,
            window: self.window,
            generations,
            limits,
            outcome,
            has_drawable_points: self.has_drawable_points,
            steps_taken: self.step,
        }
    }

    fn event(&self, phase: SweepPhase, max: usize) -> ProgressEvent {
        ProgressEvent {
            phase,
            current: self.iteration,
            max,
            has_drawable_points: self.has_drawable_points,
        }
    }

    fn enter_phase(&mut self, state: SweepState, progress: &mut impl ProgressSink) {
        self.state = state;
        self.iteration = 0;
        if let Some(event) = self.progress() {
            progress.publish(event);
        }
        if state == SweepState::Recording && self.config.draw_steps == 0 {
            self.state = SweepState::Finalizing;
        }
    }

    fn stabilize_once(&mut self) {
        for track in &mut self.tracks {
            let next = evaluate(
                track.formula,
                &track.x_prev,
                &track.x_cur,
                self.grid.r(),
                self.grid.b(),
                self.step,
                &mut self.log,
            );
            track.x_prev = std::mem::replace(&mut track.x_cur, next);
        }
        self.step += 1;
        self.iteration += 1;
    }

    fn seed_history(&mut self) {
        self.window.reset();
        for track in &mut self.tracks {
            track.history.seed(&track.x_prev, &track.x_cur);
        }
    }

    fn record_once(&mut self) {
        for track in &mut self.tracks {
            let (x_prev, x_cur) = track.history.pair(&self.window);
            let next = evaluate(
                track.formula,
                x_prev,
                x_cur,
                self.grid.r(),
                self.grid.b(),
                self.step,
                &mut self.log,
            );
            track.history.write_next(&self.window, &next);
        }
        self.step += 1;
        self.iteration += 1;

        if let Some(axis) = self.step_axis.as_mut() {
            let n = (self.config.n_iter + self.iteration) as f64;
            axis.extend(std::iter::repeat(n).take(self.grid.len()));
        }
        if let Some(rn) = self.coefficient_history.as_mut() {
            rn.extend_from_slice(self.grid.r());
        }
        self.has_drawable_points = true;
    }

    fn x_limits(&self) -> [f64; 2] {
        let bounds = self
            .tracks
            .iter()
            .filter_map(|track| track.history.bounds())
            .reduce(|[lo_a, hi_a], [lo_b, hi_b]| [lo_a.min(lo_b), hi_a.max(hi_b)]);
        match bounds {
            Some([lo, hi]) => [lo.max(-X_LIMIT_CLAMP), hi.min(X_LIMIT_CLAMP)],
            None => [1.0, 1.0],
        }
    }

    /// Spans the configured recording range `n_iter + 1 ..= n_iter + draw_steps`.
    fn n_limits(&self) -> [f64; 2] {
        let first = self.config.n_iter as f64 + 1.0;
        let last = self.config.n_iter as f64 + self.config.draw_steps.max(1) as f64;
        [first, last]
    }
}

fn filled(len: usize, value: f64) -> Result<Vec<f64>, SweepError> {
    let mut values = Vec::new();
    values
        .try_reserve_exact(len)
        .map_err(|_| SweepError::Allocation {
            what: "state vector",
            len,
        })?;
    values.resize(len, value);
    Ok(values)
}
