//! Level generation: procedural levels from built-in themes, and creator-mode
//! levels built from user-authored input.

use std::fmt;

use rand::Rng;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::{CustomLevelPayload, Level};
use crate::solver::solve;
use crate::templates::{color_for, Template};
use crate::util::{fill_template, fmt_num};

/// Creator name shown on built-in levels.
pub const BUILTIN_CREATOR: &str = "Linear Quest";

/// Why a creator-mode level was refused at save time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LevelError {
  EmptyTitle,
  EmptyStory,
  NonFinite,
}

impl fmt::Display for LevelError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      LevelError::EmptyTitle => write!(f, "level title must not be empty"),
      LevelError::EmptyStory => write!(f, "level story must not be empty"),
      LevelError::NonFinite => write!(f, "total and difference must be finite numbers"),
    }
  }
}

impl std::error::Error for LevelError {}

pub fn eq1_string(total: f64) -> String {
  format!("x + y = {}", fmt_num(total))
}

pub fn eq2_string(diff: f64) -> String {
  format!("x - y = {}", fmt_num(diff))
}

/// Draw a fresh level from a theme. `total` and `diff` are uniform over the
/// theme's inclusive ranges.
pub fn generate<R: Rng>(template: &Template, rng: &mut R) -> Level {
  let total = rng.gen_range(template.total_range.clone()) as f64;
  let diff = rng.gen_range(template.diff_range.clone()) as f64;

  let story = fill_template(
    template.story_tpl,
    &[("total", &fmt_num(total)), ("diff", &fmt_num(diff))],
  );

  let level = Level {
    id: Uuid::new_v4().to_string(),
    title: template.title.to_string(),
    creator: BUILTIN_CREATOR.to_string(),
    scenario_type: template.kind,
    story,
    eq1: eq1_string(total),
    eq2: eq2_string(diff),
    eq1_text: template.eq1_text.to_string(),
    eq2_text: template.eq2_text.to_string(),
    x_label: template.x_label.to_string(),
    y_label: template.y_label.to_string(),
    total,
    diff,
    solution: solve(total, diff),
    color: template.color.to_string(),
  };
  debug!(target: "game", kind = template.kind.as_str(), total, diff, "Generated built-in level");
  level
}

/// Build a level from creator-mode input. No randomness: the solution is
/// always derived from `total` and `diff`.
pub fn generate_custom(payload: &CustomLevelPayload) -> Result<Level, LevelError> {
  let title = payload.title.trim();
  if title.is_empty() {
    return Err(LevelError::EmptyTitle);
  }
  let story = payload.story.trim();
  if story.is_empty() {
    return Err(LevelError::EmptyStory);
  }
  if !payload.total.is_finite() || !payload.diff.is_finite() {
    return Err(LevelError::NonFinite);
  }

  let (total, diff) = (payload.total, payload.diff);
  let solution = solve(total, diff);
  if let Some(given) = payload.solution {
    if given != solution {
      debug!(target: "game", given_x = given.x, given_y = given.y, "Ignoring authored solution that disagrees with total/diff");
    }
  }
  if diff > total {
    warn!(target: "game", total, diff, "Custom level has diff > total; solution y is negative");
  }

  let creator = match payload.creator.trim() {
    "" => "Anonymous".to_string(),
    name => name.to_string(),
  };

  Ok(Level {
    id: Uuid::new_v4().to_string(),
    title: title.to_string(),
    creator,
    scenario_type: payload.scenario_type,
    story: story.to_string(),
    eq1: payload.eq1.clone().unwrap_or_else(|| eq1_string(total)),
    eq2: payload.eq2.clone().unwrap_or_else(|| eq2_string(diff)),
    eq1_text: payload.eq1_text.clone().unwrap_or_else(|| "Equation 1".into()),
    eq2_text: payload.eq2_text.clone().unwrap_or_else(|| "Equation 2".into()),
    x_label: payload.x_label.clone(),
    y_label: payload.y_label.clone(),
    total,
    diff,
    solution,
    color: color_for(payload.scenario_type).to_string(),
  })
}
