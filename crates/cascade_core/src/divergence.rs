//! Divergence records collected during a sweep.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::map::MapFormula;

/// State of one grid point at the step where a divergence was detected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DivergenceRecord {
    pub formula: MapFormula,
    /// Global step counter (stabilization and recording share one count).
    pub step: usize,
    pub x_prev: f64,
    pub x_cur: f64,
    pub r: f64,
    pub b: f64,
}

impl fmt::Display for DivergenceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: i = {}\tx0 = {}\t\tx1 = {}\tr = {:.4}\t\tb = {:.4}",
            self.formula.label(),
            self.step,
            Scientific(self.x_prev),
            Scientific(self.x_cur),
            self.r,
            self.b
        )
    }
}

/// `%.4e` layout: signed exponent with at least two digits (`2.0000e+00`).
struct Scientific(f64);

impl fmt::Display for Scientific {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let raw = format!("{:.4e}", self.0);
        match raw.split_once('e') {
            Some((mantissa, exponent)) => {
                let (sign, digits) = match exponent.strip_prefix('-') {
                    Some(digits) => ('-', digits),
                    None => ('+', exponent),
                };
                write!(f, "{mantissa}e{sign}{digits:0>2}")
            }
            None => f.write_str(&raw),
        }
    }
}

/// Append-only log owned by a single sweep run.
///
/// When any entry of a step diverges, every grid point of that step is
/// logged, not only the diverging ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorLog {
    records: Vec<DivergenceRecord>,
    divergent_steps: usize,
}

impl ErrorLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Logs the whole grid for one divergent evaluation.
    pub fn record_grid(
        &mut self,
        formula: MapFormula,
        step: usize,
        x_prev: &[f64],
        x_cur: &[f64],
        r: &[f64],
        b: &[f64],
    ) {
        self.divergent_steps += 1;
        self.records.reserve(x_prev.len());
        for (((&x_prev, &x_cur), &r), &b) in x_prev.iter().zip(x_cur).zip(r).zip(b) {
            self.records.push(DivergenceRecord {
                formula,
                step,
                x_prev,
                x_cur,
                r,
                b,
            });
        }
    }

    pub fn records(&self) -> &[DivergenceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of (formula, step) evaluations that produced a divergence.
    pub fn divergent_steps(&self) -> usize {
        self.divergent_steps
    }

    /// Renders the log as text, one record per line.
    pub fn to_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ErrorLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for record in &self.records {
            writeln!(f, "{record}")?;
        }
        Ok(())
    }
}

/// Receives the finished log of a run; the engine itself does no I/O.
pub trait ErrorSink {
    fn accept(&mut self, log: ErrorLog);
}

impl ErrorSink for Option<ErrorLog> {
    fn accept(&mut self, log: ErrorLog) {
        *self = Some(log);
    }
}

impl ErrorSink for Vec<ErrorLog> {
    fn accept(&mut self, log: ErrorLog) {
        self.push(log);
    }
}

impl ErrorSink for () {
    fn accept(&mut self, _log: ErrorLog) {}
}
