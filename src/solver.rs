//! Solution engine for the system `x + y = total`, `x - y = diff`.

use crate::domain::Solution;

/// Add the equations to get `2x = total + diff`, then back-substitute.
pub fn solve(total: f64, diff: f64) -> Solution {
  Solution {
    x: (total + diff) / 2.0,
    y: (total - diff) / 2.0,
  }
}

/// Both equations rewritten as functions of x, for graphing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineEquations {
  pub total: f64,
  pub diff: f64,
}

impl LineEquations {
  /// `x + y = total`
  pub fn y1(&self, x: f64) -> f64 { self.total - x }

  /// `x - y = diff`
  pub fn y2(&self, x: f64) -> f64 { x - self.diff }
}

pub fn line_equations(total: f64, diff: f64) -> LineEquations {
  LineEquations { total, diff }
}
