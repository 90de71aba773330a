//! Sweep configuration and pre-flight sizing.

use serde::{Deserialize, Serialize};

use crate::error::SweepError;
use crate::grid::{Grid, Range};
use crate::map::FormulaSelection;
use crate::presets::PRESETS;

/// Plot combination requested by the caller. The engine only uses it to
/// decide whether the per-generation coefficient history is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartMode {
    /// Bifurcation diagram, phase portrait and trend together.
    #[default]
    All,
    PhaseAndTrend,
    Bifurcation,
    Phase,
    Trend,
}

impl ChartMode {
    pub fn needs_coefficient_history(self) -> bool {
        matches!(self, ChartMode::All | ChartMode::Bifurcation)
    }

    /// Trend charts plot `x[n]` against the step axis `n[]`.
    pub fn needs_step_axis(self) -> bool {
        matches!(self, ChartMode::All | ChartMode::PhaseAndTrend | ChartMode::Trend)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    pub r: Range,
    pub b: Range,
    pub x0: f64,
    /// Stabilization iterations; the phase runs `n_iter + 1` steps.
    pub n_iter: usize,
    /// Recorded generations.
    pub draw_steps: usize,
    pub formulas: FormulaSelection,
    pub chart_mode: ChartMode,
}

impl Default for SweepConfig {
    fn default() -> Self {
        PRESETS[0].config(ChartMode::default())
    }
}

/// Buffer sizes derived from a configuration before anything is allocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepPlan {
    pub r_points: usize,
    pub b_points: usize,
    /// `Nbr`
    pub grid_len: usize,
    /// `Nbrn = (draw_steps + 2) * Nbr`
    pub buffer_len: usize,
    pub stabilization_steps: usize,
    pub total_steps: usize,
}

impl SweepConfig {
    /// Checks the configuration and sizes every buffer without allocating.
    pub fn plan(&self) -> Result<SweepPlan, SweepError> {
        if !self.x0.is_finite() {
            return Err(SweepError::NonFiniteInitialValue(self.x0));
        }
        let r_points = self.r.point_count("r")?;
        let b_points = self.b.point_count("b")?;
        let grid_len = Grid::checked_len(r_points, b_points)?;

        let overflow = SweepError::BufferOverflow {
            generations: self.draw_steps,
            grid_len,
        };
        let buffer_len = self
            .draw_steps
            .checked_add(2)
            .and_then(|generations| generations.checked_mul(grid_len))
            .ok_or_else(|| overflow.clone())?;
        // Buffers hold f64 values; stay within what an allocation may address.
        if buffer_len > isize::MAX as usize / std::mem::size_of::<f64>() {
            return Err(overflow);
        }

        let step_overflow = || SweepError::StepCountOverflow {
            n_iter: self.n_iter,
            draw_steps: self.draw_steps,
        };
        let stabilization_steps = self.n_iter.checked_add(1).ok_or_else(step_overflow)?;
        let total_steps = stabilization_steps
            .checked_add(self.draw_steps)
            .ok_or_else(step_overflow)?;

        Ok(SweepPlan {
            r_points,
            b_points,
            grid_len,
            buffer_len,
            stabilization_steps,
            total_steps,
        })
    }
}
