//! Guess evaluation: tolerance check, scoring, badge eligibility and
//! near-miss feedback. Every input maps to a feedback tier; nothing here fails.

use crate::domain::{Badge, BadgeSet, FeedbackTier, GuessResult, Level, Solution};

/// Per-axis absolute margin within which a guess counts as correct.
pub const TOLERANCE: f64 = 0.5;

const MAX_POINTS: u32 = 100;
const ATTEMPT_PENALTY: u32 = 10;
const MIN_POINTS: u32 = 50;

const SO_CLOSE_ERROR: f64 = 5.0;
const WARMER_ERROR: f64 = 10.0;

/// Parse a raw guess field. Blank and NaN input is not a number.
pub fn parse_guess(text: &str) -> Option<f64> {
  text.trim().parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// Both axes independently within `TOLERANCE` of the solution.
pub fn is_within_tolerance(x: f64, y: f64, solution: &Solution) -> bool {
  (x - solution.x).abs() < TOLERANCE && (y - solution.y).abs() < TOLERANCE
}

/// Points for a solve after `attempts_so_far` earlier submissions.
pub fn points_for(attempts_so_far: u32) -> u32 {
  MAX_POINTS
    .saturating_sub(attempts_so_far.saturating_mul(ATTEMPT_PENALTY))
    .max(MIN_POINTS)
}

/// Badge a solve unlocks, given what the player already holds.
pub fn badge_for(attempts_so_far: u32, held: &BadgeSet) -> Option<Badge> {
  if attempts_so_far == 0 && !held.contains(Badge::FirstTry) {
    Some(Badge::FirstTry)
  } else if attempts_so_far <= 2 && !held.contains(Badge::QuickSolver) {
    Some(Badge::QuickSolver)
  } else {
    None
  }
}

/// How close a wrong guess is, measured against each equation separately.
pub fn near_miss_tier(x: f64, y: f64, level: &Level) -> FeedbackTier {
  let eq1_error = (x + y - level.total).abs();
  let eq2_error = (x - y - level.diff).abs();

  if eq1_error < SO_CLOSE_ERROR && eq2_error < SO_CLOSE_ERROR {
    FeedbackTier::SoClose
  } else if eq1_error < WARMER_ERROR || eq2_error < WARMER_ERROR {
    FeedbackTier::GettingWarmer
  } else {
    FeedbackTier::KeepTrying
  }
}

/// Player-facing text for a tier. `attempt_number` is 1-based.
pub fn feedback_message(tier: FeedbackTier, attempt_number: u32, points: u32) -> String {
  match tier {
    FeedbackTier::InvalidInput => "Please enter numbers for both values!".into(),
    FeedbackTier::SoClose => "SO CLOSE! Almost at the intersection!".into(),
    FeedbackTier::GettingWarmer => "Getting warmer! One equation is nearly right.".into(),
    FeedbackTier::KeepTrying => "Keep trying! Both equations must be satisfied.".into(),
    FeedbackTier::FirstTry => format!("WIZARD PRODIGY! Perfect on first try! +{} magic points!", points),
    FeedbackTier::QuickSolver => {
      format!("LIGHTNING WIZARD! Solved in {} tries! +{} magic points!", attempt_number, points)
    }
    FeedbackTier::Mastered => {
      format!("SPELL MASTERED! Solved in {} attempts! +{} magic points!", attempt_number, points)
    }
    FeedbackTier::Revealed => "Learning mode - No points, but master the strategy!".into(),
  }
}

/// Evaluate raw guess text against a level.
///
/// `attempts_so_far` counts submissions before this one. The caller owns the
/// attempt counter and the badge set; this function only reports.
pub fn evaluate(x_text: &str, y_text: &str, level: &Level, attempts_so_far: u32, held: &BadgeSet) -> GuessResult {
  let attempt_number = attempts_so_far.saturating_add(1);

  let (x, y) = match (parse_guess(x_text), parse_guess(y_text)) {
    (Some(x), Some(y)) => (x, y),
    _ => return miss(FeedbackTier::InvalidInput, attempt_number),
  };

  if !is_within_tolerance(x, y, &level.solution) {
    return miss(near_miss_tier(x, y, level), attempt_number);
  }

  let earned_points = points_for(attempts_so_far);
  let badge_unlocked = badge_for(attempts_so_far, held);
  let feedback_tier = match badge_unlocked {
    Some(Badge::FirstTry) => FeedbackTier::FirstTry,
    Some(Badge::QuickSolver) => FeedbackTier::QuickSolver,
    None => FeedbackTier::Mastered,
  };

  GuessResult {
    is_correct: true,
    earned_points,
    feedback_tier,
    feedback: feedback_message(feedback_tier, attempt_number, earned_points),
    badge_unlocked,
  }
}

fn miss(tier: FeedbackTier, attempt_number: u32) -> GuessResult {
  GuessResult {
    is_correct: false,
    earned_points: 0,
    feedback_tier: tier,
    feedback: feedback_message(tier, attempt_number, 0),
    badge_unlocked: None,
  }
}
