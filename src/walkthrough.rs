//! Hint text and the step-by-step elimination walkthrough shown on reveal.

use serde::Serialize;

use crate::domain::Level;
use crate::util::fmt_num;

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Step {
  pub title: String,
  pub lines: Vec<String>,
}

pub fn hint_text(level: &Level) -> String {
  format!(
    "Strategy: Add both equations together! The y terms will cancel out, giving you 2x = {}.",
    fmt_num(level.total + level.diff)
  )
}

pub fn solution_steps(level: &Level) -> Vec<Step> {
  let (x, y) = (fmt_num(level.solution.x), fmt_num(level.solution.y));
  let (total, diff) = (fmt_num(level.total), fmt_num(level.diff));
  let sum = fmt_num(level.total + level.diff);

  vec![
    Step {
      title: "Step 1: Write equations".into(),
      lines: vec![level.eq1.clone(), level.eq2.clone()],
    },
    Step {
      title: "Step 2: Add equations".into(),
      lines: vec![format!("2x = {}", sum), "The y terms cancel!".into()],
    },
    Step {
      title: "Step 3: Solve for x".into(),
      lines: vec![format!("x = {} / 2", sum), format!("x = {}", x)],
    },
    Step {
      title: "Step 4: Find y".into(),
      lines: vec![format!("{} + y = {}", x, total), format!("y = {}", y)],
    },
    Step {
      title: "Verify".into(),
      lines: vec![
        format!("{} + {} = {}", x, y, total),
        format!("{} - {} = {}", x, y, diff),
      ],
    },
  ]
}
