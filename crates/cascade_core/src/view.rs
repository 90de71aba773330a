//! Read-only access to a finished sweep, frame by frame.
//!
//! A renderer draws one frame per recorded generation: it reads the slices
//! below, then calls [`SweepResult::advance_window`]. The buffers themselves
//! are never mutated after the sweep hands them over.

use serde::Serialize;

use crate::config::SweepConfig;
use crate::error::SweepError;
use crate::grid::Grid;
use crate::history::HistoryBuffer;
use crate::map::MapFormula;
use crate::progress::SweepPhase;
use crate::window::Window;

/// Largest magnitude reported for the `x` axis.
pub const X_LIMIT_CLAMP: f64 = 1.5e300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SweepOutcome {
    Completed,
    /// Stopped early; every generation written before the stop is valid.
    Cancelled { phase: SweepPhase },
}

/// Axis bounds as `[min, max]` pairs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AxisLimits {
    pub x: [f64; 2],
    pub n: [f64; 2],
    pub r: [f64; 2],
}

#[derive(Debug, Clone)]
pub(crate) struct FormulaHistory {
    pub(crate) formula: MapFormula,
    pub(crate) buffer: HistoryBuffer,
}

/// Everything a sweep produced. Owned by the caller after completion.
#[derive(Debug, Clone)]
pub struct SweepResult {
    pub(crate) config: SweepConfig,
    pub(crate) grid: Grid,
    pub(crate) histories: Vec<FormulaHistory>,
    /// `n[]`: recorded step numbers, one grid-length block per generation.
    pub(crate) step_axis: Option<Vec<f64>>,
    /// `rn[]`: `R[]` once per recorded generation, for bifurcation plots.
    pub(crate) coefficient_history: Option<Vec<f64>>,
    pub(crate) window: Window,
    pub(crate) generations: usize,
    pub(crate) limits: AxisLimits,
    pub(crate) outcome: SweepOutcome,
    pub(crate) has_drawable_points: bool,
    pub(crate) steps_taken: usize,
}

impl SweepResult {
    pub fn outcome(&self) -> SweepOutcome {
        self.outcome
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.outcome, SweepOutcome::Cancelled { .. })
    }

    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// `Nbr`
    pub fn grid_len(&self) -> usize {
        self.grid.len()
    }

    /// Generations written by the recording phase.
    pub fn generations(&self) -> usize {
        self.generations
    }

    pub fn has_drawable_points(&self) -> bool {
        self.has_drawable_points
    }

    /// Value of the global step counter when the sweep stopped.
    pub fn steps_taken(&self) -> usize {
        self.steps_taken
    }

    pub fn limits(&self) -> AxisLimits {
        self.limits
    }

    pub fn window(&self) -> Window {
        self.window
    }

    pub fn formulas(&self) -> impl Iterator<Item = MapFormula> + '_ {
        self.histories.iter().map(|history| history.formula)
    }

    pub fn history(&self, formula: MapFormula) -> Option<&HistoryBuffer> {
        self.histories
            .iter()
            .find(|history| history.formula == formula)
            .map(|history| &history.buffer)
    }

    /// `n[0, N1)`: step numbers for the trend plot.
    pub fn n(&self) -> Option<&[f64]> {
        self.step_axis
            .as_deref()
            .map(|n| clip(n, 0, self.window.n1()))
    }

    /// `rn[0, N1)`, or `None` when the chart mode did not ask for it.
    pub fn coefficient_r(&self) -> Option<&[f64]> {
        self.coefficient_history
            .as_deref()
            .map(|rn| clip(rn, 0, self.window.n1()))
    }

    /// `rn[N0, N1)`: coefficients of the newest points.
    pub fn last_coefficient_r(&self) -> Option<&[f64]> {
        self.coefficient_history
            .as_deref()
            .map(|rn| clip(rn, self.window.n0(), self.window.n1()))
    }

    /// `x[0, N1)` and `x[Nbr, N2)`: the accumulated `(x[n], x[n+1])` history.
    pub fn current_and_next(&self, formula: MapFormula) -> Option<(&[f64], &[f64])> {
        let buffer = self.history(formula)?;
        Some((
            buffer.slice(0, self.window.n1()),
            buffer.slice(self.grid.len(), self.window.n2()),
        ))
    }

    /// `x[N0, N1)` and `x[N1, N2)`: only the newest generation pair.
    pub fn last_pair(&self, formula: MapFormula) -> Option<(&[f64], &[f64])> {
        let buffer = self.history(formula)?;
        Some((
            buffer.slice(self.window.n0(), self.window.n1()),
            buffer.slice(self.window.n1(), self.window.n2()),
        ))
    }

    /// Frames already consumed through [`advance_window`](Self::advance_window).
    pub fn frames_consumed(&self) -> usize {
        self.window.generation()
    }

    pub fn frames_remaining(&self) -> usize {
        self.generations.saturating_sub(self.frames_consumed())
    }

    /// Moves the window one generation forward after a frame was drawn.
    pub fn advance_window(&mut self) -> Result<(), SweepError> {
        if self.frames_remaining() == 0 {
            return Err(SweepError::WindowExhausted {
                recorded: self.generations,
            });
        }
        self.window.advance();
        Ok(())
    }

    /// Rewinds to the first frame, e.g. to replay the animation.
    pub fn rewind(&mut self) {
        self.window.reset();
    }
}

fn clip(values: &[f64], start: usize, end: usize) -> &[f64] {
    let end = end.min(values.len());
    &values[start.min(end)..end]
}

#[cfg(test)]
mod tests {
    use crate::config::{ChartMode, SweepConfig};
    use crate::error::SweepError;
    use crate::grid::Range;
    use crate::map::{FormulaSelection, MapFormula};
    use crate::progress::CancelToken;
    use crate::sweep::SweepEngine;

    fn finished(draw_steps: usize) -> super::SweepResult {
        let config = SweepConfig {
            r: Range::new(0.5, 1.0, 0.5),
            b: Range::new(0.1, 0.1, 0.1),
            x0: 0.2,
            n_iter: 3,
            draw_steps,
            formulas: FormulaSelection::only(MapFormula::DelayedLogistic),
            chart_mode: ChartMode::All,
        };
        SweepEngine::new(config)
            .expect("engine")
            .run(&CancelToken::new(), &mut (), &mut ())
    }

    #[test]
    fn first_frame_shows_seed_pair_and_first_generation() {
        let result = finished(3);
        let buffer = result
            .history(MapFormula::DelayedLogistic)
            .expect("history")
            .written();
        let (current, next) = result
            .current_and_next(MapFormula::DelayedLogistic)
            .expect("formula");
        assert_eq!(current, &buffer[0..2]);
        assert_eq!(next, &buffer[2..4]);

        let (last_current, last_next) = result
            .last_pair(MapFormula::DelayedLogistic)
            .expect("formula");
        assert_eq!(last_current, &buffer[0..2]);
        assert_eq!(last_next, &buffer[2..4]);

        assert_eq!(result.n(), Some(&[4.0, 4.0][..]));
        assert_eq!(result.coefficient_r(), Some(&[0.5, 1.0][..]));
        assert_eq!(result.limits().n, [4.0, 6.0]);
        assert_eq!(result.limits().r, [0.5, 1.0]);
    }

    #[test]
    fn frames_advance_until_every_generation_was_shown() {
        let mut result = finished(3);
        assert_eq!(result.frames_remaining(), 3);

        for _ in 0..3 {
            result.advance_window().expect("frame");
        }
        assert_eq!(result.frames_consumed(), 3);
        assert_eq!(result.frames_remaining(), 0);
        assert!(matches!(
            result.advance_window(),
            Err(SweepError::WindowExhausted { recorded: 3 })
        ));

        // n[] holds three generations; the window reaches past them.
        assert_eq!(result.n(), Some(&[4.0, 4.0, 5.0, 5.0, 6.0, 6.0][..]));
        assert_eq!(result.last_coefficient_r(), Some(&[][..]));

        result.rewind();
        assert_eq!(result.frames_consumed(), 0);
    }

    #[test]
    fn inactive_formula_has_no_frames() {
        let result = finished(2);
        assert!(result.current_and_next(MapFormula::Henon).is_none());
        assert_eq!(
            result.formulas().collect::<Vec<_>>(),
            vec![MapFormula::DelayedLogistic]
        );
    }
}
