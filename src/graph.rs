//! Graph projection: a fixed-stride sample of both lines over a bounded
//! display domain, plus solution and live-guess markers.

use serde::Serialize;

use crate::domain::{Level, Solution};
use crate::evaluator::parse_guess;
use crate::session::SessionPhase;
use crate::solver::line_equations;
use crate::util::round1;

/// Number of samples across the display domain (100 strides).
pub const SAMPLE_COUNT: usize = 101;

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct GraphPoint {
  pub x: f64,
  /// `x + y = total`; `None` where the line leaves the chart.
  pub y1: Option<f64>,
  /// `x - y = diff`; `None` where the line leaves the chart.
  pub y2: Option<f64>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct GraphSample {
  pub min: f64,
  pub max: f64,
  pub points: Vec<GraphPoint>,
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq)]
pub struct Marker {
  pub x: f64,
  pub y: f64,
}

/// Display domain `(min, max)`: twice the larger solution component on the
/// top end, and room for negative components on the bottom end.
pub fn bounds(solution: &Solution) -> (f64, f64) {
  let max = solution.x.max(solution.y) * 2.0;
  let min = 0f64.min(solution.x * -0.5).min(solution.y * -0.5);
  (min, max)
}

pub fn project(level: &Level) -> GraphSample {
  let (min, max) = bounds(&level.solution);
  // Both components negative puts max below min; sample the same span upwards.
  let (lo, hi) = if max < min { (max, min) } else { (min, max) };
  let step = (hi - lo) / (SAMPLE_COUNT - 1) as f64;
  let lines = line_equations(level.total, level.diff);
  let on_chart = |v: f64| if v < lo || v > hi { None } else { Some(v) };

  let points = (0..SAMPLE_COUNT)
    .map(|i| {
      let x = lo + step * i as f64;
      GraphPoint {
        x: round1(x),
        y1: on_chart(lines.y1(x)),
        y2: on_chart(lines.y2(x)),
      }
    })
    .collect();

  GraphSample { min: lo, max: hi, points }
}

pub fn solution_marker(level: &Level) -> Marker {
  Marker { x: level.solution.x, y: level.solution.y }
}

/// Live guess marker; only while the player can still submit guesses.
pub fn guess_marker(x_text: &str, y_text: &str, phase: SessionPhase) -> Option<Marker> {
  if phase != SessionPhase::Active {
    return None;
  }
  Some(Marker { x: parse_guess(x_text)?, y: parse_guess(y_text)? })
}
