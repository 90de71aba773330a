//! The two recurrences and their vectorized, divergence-clamping evaluation.

use serde::{Deserialize, Serialize};

use crate::divergence::ErrorLog;
use crate::traits::{Recurrence, Scalar};

/// Selectable two-term recurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MapFormula {
    /// `x[n+1] = r*x[n]*(1 - x[n]) - b*x[n-1]`
    DelayedLogistic,
    /// `x[n+1] = 1 - r*x[n]^2 + b*x[n-1]`
    Henon,
}

impl MapFormula {
    pub const ALL: [MapFormula; 2] = [MapFormula::DelayedLogistic, MapFormula::Henon];

    /// Tag used in divergence reports and legends.
    pub fn label(self) -> &'static str {
        match self {
            MapFormula::DelayedLogistic => "f1",
            MapFormula::Henon => "f2",
        }
    }

    pub fn expression(self) -> &'static str {
        match self {
            MapFormula::DelayedLogistic => "x[n+1] = r*x[n]*(1 - x[n]) - b*x[n-1]",
            MapFormula::Henon => "x[n+1] = 1 - r*x[n]^2 + b*x[n-1]",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "f1" => Some(MapFormula::DelayedLogistic),
            "f2" => Some(MapFormula::Henon),
            _ => None,
        }
    }
}

impl<T: Scalar> Recurrence<T> for MapFormula {
    fn next(&self, prev: T, current: T, r: T, b: T) -> T {
        match self {
            MapFormula::DelayedLogistic => r * current * (T::one() - current) - b * prev,
            MapFormula::Henon => T::one() - r * (current * current) + b * prev,
        }
    }
}

/// Which formulas a sweep iterates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormulaSelection {
    #[serde(rename = "f1")]
    pub delayed_logistic: bool,
    #[serde(rename = "f2")]
    pub henon: bool,
}

impl FormulaSelection {
    pub const fn both() -> Self {
        Self {
            delayed_logistic: true,
            henon: true,
        }
    }

    pub const fn only(formula: MapFormula) -> Self {
        match formula {
            MapFormula::DelayedLogistic => Self {
                delayed_logistic: true,
                henon: false,
            },
            MapFormula::Henon => Self {
                delayed_logistic: false,
                henon: true,
            },
        }
    }

    pub fn contains(&self, formula: MapFormula) -> bool {
        match formula {
            MapFormula::DelayedLogistic => self.delayed_logistic,
            MapFormula::Henon => self.henon,
        }
    }

    /// Active formulas in evaluation order (`f1` before `f2`).
    pub fn active(&self) -> impl Iterator<Item = MapFormula> + '_ {
        MapFormula::ALL
            .into_iter()
            .filter(move |formula| self.contains(*formula))
    }

    pub fn is_empty(&self) -> bool {
        !self.delayed_logistic && !self.henon
    }
}

impl Default for FormulaSelection {
    fn default() -> Self {
        Self::both()
    }
}

/// Evaluates one step of `formula` over the whole grid.
///
/// Non-finite results are zeroed after the whole grid has been logged under
/// `step`, so the returned vector is always finite for finite inputs.
pub fn evaluate(
    formula: MapFormula,
    x_prev: &[f64],
    x_cur: &[f64],
    r: &[f64],
    b: &[f64],
    step: usize,
    log: &mut ErrorLog,
) -> Vec<f64> {
    debug_assert!(
        x_prev.len() == x_cur.len() && x_cur.len() == r.len() && r.len() == b.len(),
        "evaluate expects grid-length slices"
    );

    let mut next: Vec<f64> = x_prev
        .iter()
        .zip(x_cur)
        .zip(r.iter().zip(b))
        .map(|((&prev, &current), (&r, &b))| formula.next(prev, current, r, b))
        .collect();

    if next.iter().any(|value| !value.is_finite()) {
        log.record_grid(formula, step, x_prev, x_cur, r, b);
        for value in next.iter_mut().filter(|value| !value.is_finite()) {
            *value = 0.0;
        }
    }

    next
}
