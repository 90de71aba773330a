//! Built-in named configurations.

use serde::Serialize;

use crate::config::{ChartMode, SweepConfig};
use crate::error::SweepError;
use crate::grid::Range;
use crate::map::{FormulaSelection, MapFormula};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Preset {
    pub name: &'static str,
    pub formulas: FormulaSelection,
    pub r: Range,
    pub b: Range,
    pub x0: f64,
    pub n_iter: usize,
    pub draw_steps: usize,
}

impl Preset {
    pub fn config(&self, chart_mode: ChartMode) -> SweepConfig {
        SweepConfig {
            r: self.r,
            b: self.b,
            x0: self.x0,
            n_iter: self.n_iter,
            draw_steps: self.draw_steps,
            formulas: self.formulas,
            chart_mode,
        }
    }
}

const F1: FormulaSelection = FormulaSelection::only(MapFormula::DelayedLogistic);
const BOTH: FormulaSelection = FormulaSelection::both();

pub static PRESETS: [Preset; 10] = [
    Preset {
        name: "r = 1.4; b = 0.3",
        formulas: BOTH,
        r: Range::new(1.4, 1.4, 0.1),
        b: Range::new(0.3, 0.3, 0.1),
        x0: 0.0,
        n_iter: 800,
        draw_steps: 600,
    },
    Preset {
        name: "r = 0..1.4; b = 0.3",
        formulas: BOTH,
        r: Range::new(0.0, 1.4, 0.01),
        b: Range::new(0.3, 0.3, 0.1),
        x0: 0.0,
        n_iter: 800,
        draw_steps: 300,
    },
    Preset {
        name: "r = 0..1.4; b = 0..0.4",
        formulas: BOTH,
        r: Range::new(0.0, 1.4, 0.01),
        b: Range::new(0.0, 0.4, 0.1),
        x0: 0.0,
        n_iter: 800,
        draw_steps: 300,
    },
    Preset {
        name: "x[0] = 0.4; r = 3 (diverges)",
        formulas: F1,
        r: Range::new(3.0, 3.0, 0.01),
        b: Range::new(0.1, 0.1, 0.1),
        x0: 0.4,
        n_iter: 0,
        draw_steps: 300,
    },
    Preset {
        name: "x[0] = 0.4; r = 4",
        formulas: F1,
        r: Range::new(4.0, 4.0, 0.01),
        b: Range::new(0.1, 0.1, 0.1),
        x0: 0.4,
        n_iter: 800,
        draw_steps: 300,
    },
    Preset {
        name: "x[0] = 0.4; r = 0..4; b = 0",
        formulas: F1,
        r: Range::new(0.0, 4.0, 0.05),
        b: Range::new(0.0, 0.0, 0.1),
        x0: 0.4,
        n_iter: 800,
        draw_steps: 300,
    },
    Preset {
        name: "x[0] = 0.4; r = 0..4; b = 0.1",
        formulas: F1,
        r: Range::new(0.0, 4.0, 0.05),
        b: Range::new(0.1, 0.1, 0.1),
        x0: 0.4,
        n_iter: 800,
        draw_steps: 300,
    },
    Preset {
        name: "x[0] = 0.4; r = 0..4; b = 0.2",
        formulas: F1,
        r: Range::new(0.0, 4.0, 0.05),
        b: Range::new(0.2, 0.2, 0.1),
        x0: 0.4,
        n_iter: 800,
        draw_steps: 300,
    },
    Preset {
        name: "x[0] = 0.4; r = 0..4; b = 0.3",
        formulas: F1,
        r: Range::new(0.0, 4.0, 0.05),
        b: Range::new(0.3, 0.3, 0.1),
        x0: 0.4,
        n_iter: 800,
        draw_steps: 300,
    },
    Preset {
        name: "x[0] = 0.4; r = 0..4; b = 0.4 (slow, diverges)",
        formulas: F1,
        r: Range::new(0.0, 4.0, 0.05),
        b: Range::new(0.4, 0.4, 0.1),
        x0: 0.4,
        n_iter: 800,
        draw_steps: 300,
    },
];

pub fn presets() -> &'static [Preset] {
    &PRESETS
}

pub fn find_preset(name: &str) -> Result<&'static Preset, SweepError> {
    PRESETS
        .iter()
        .find(|preset| preset.name == name)
        .ok_or_else(|| SweepError::UnknownPreset(name.to_string()))
}
