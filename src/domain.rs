//! Domain models used by the game: template kinds, levels, solutions, badges,
//! feedback tiers and the per-guess result.

use serde::{Deserialize, Serialize};

/// Which built-in theme a level is framed with.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum TemplateType {
  KillsDeaths,
  HealthShield,
  TimeChallenge,
  Sports,
}
impl Default for TemplateType {
  fn default() -> Self { TemplateType::KillsDeaths }
}
impl TemplateType {
  pub fn as_str(&self) -> &'static str {
    match self {
      TemplateType::KillsDeaths => "kills-deaths",
      TemplateType::HealthShield => "health-shield",
      TemplateType::TimeChallenge => "time-challenge",
      TemplateType::Sports => "sports",
    }
  }
}

/// The unique intersection of `x + y = total` and `x - y = diff`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct Solution {
  pub x: f64,
  pub y: f64,
}

/// One concrete puzzle presented to the player.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Level {
  pub id: String,
  pub title: String,
  pub creator: String,
  pub scenario_type: TemplateType,
  pub story: String,
  pub eq1: String,
  pub eq2: String,
  pub eq1_text: String,
  pub eq2_text: String,
  pub x_label: String,
  pub y_label: String,
  pub total: f64,
  pub diff: f64,
  pub solution: Solution,
  pub color: String,
}

/// Level as authored by the level editor (creator mode).
/// Equation strings and the solution are derived when missing.
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CustomLevelPayload {
  pub title: String,
  #[serde(default)] pub creator: String,
  #[serde(default)] pub scenario_type: TemplateType,
  pub story: String,
  #[serde(default)] pub eq1: Option<String>,
  #[serde(default)] pub eq2: Option<String>,
  #[serde(default)] pub eq1_text: Option<String>,
  #[serde(default)] pub eq2_text: Option<String>,
  pub x_label: String,
  pub y_label: String,
  #[serde(default)] pub solution: Option<Solution>,
  pub total: f64,
  pub diff: f64,
}

/// One-time achievement flags unlocked by solve performance.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum Badge {
  FirstTry,
  QuickSolver,
}
impl Badge {
  pub fn id(&self) -> &'static str {
    match self {
      Badge::FirstTry => "first-try",
      Badge::QuickSolver => "quick-solver",
    }
  }
}

/// Badges held by a player, in unlock order, without duplicates.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(transparent)]
pub struct BadgeSet(Vec<Badge>);

impl BadgeSet {
  pub fn contains(&self, badge: Badge) -> bool {
    self.0.contains(&badge)
  }

  /// Award a badge. Returns true if it was not held before.
  pub fn award(&mut self, badge: Badge) -> bool {
    if self.contains(badge) {
      return false;
    }
    self.0.push(badge);
    true
  }

  pub fn len(&self) -> usize { self.0.len() }
}

/// The single feedback message class chosen for a guess (or a reveal).
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackTier {
  InvalidInput,
  SoClose,
  GettingWarmer,
  KeepTrying,
  FirstTry,
  QuickSolver,
  Mastered,
  Revealed,
}

/// Outcome of evaluating a single guess. Never stored.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GuessResult {
  pub is_correct: bool,
  pub earned_points: u32,
  pub feedback_tier: FeedbackTier,
  pub feedback: String,
  pub badge_unlocked: Option<Badge>,
}
