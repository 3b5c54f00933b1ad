//! Session controller: one play-through of one level.
//!
//! Phases: `Loading -> Active -> Solved | SolutionRevealed`. Loading a level
//! (first load, retry, next level) resets the whole `SessionState` and
//! restarts the clock. Hint visibility is a toggle inside `Active`, not a phase.
//!
//! Completion notices go out through a `ProgressSink` and are never awaited:
//! local state is the truth for the current attempt.

use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info};

use crate::domain::{Badge, BadgeSet, FeedbackTier, GuessResult, Level};
use crate::evaluator::{evaluate, feedback_message};
use crate::walkthrough::{hint_text, solution_steps, Step};

/// Attempts required before the hint may be shown.
pub const HINT_AFTER_ATTEMPTS: u32 = 2;

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
  Loading,
  Active,
  Solved,
  SolutionRevealed,
}

/// Where the level came from; decides what retry and next do.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LevelOrigin {
  BuiltIn {
    index: usize,
  },
  Custom {
    index: usize,
    #[serde(rename = "levelId")]
    level_id: String,
  },
}

impl LevelOrigin {
  pub fn level_index(&self) -> usize {
    match self {
      LevelOrigin::BuiltIn { index } | LevelOrigin::Custom { index, .. } => *index,
    }
  }
}

#[derive(Clone, Debug)]
pub struct SessionState {
  pub attempts: u32,
  pub solved: bool,
  pub start_time: Instant,
  pub hint_revealed: bool,
  pub solution_revealed: bool,
  pub points_this_level: u32,
}

impl SessionState {
  fn fresh(now: Instant) -> Self {
    Self {
      attempts: 0,
      solved: false,
      start_time: now,
      hint_revealed: false,
      solution_revealed: false,
      points_this_level: 0,
    }
  }
}

/// Notices emitted to the progress-tracking collaborator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
  LevelComplete { level_index: usize, solve_time_secs: u64 },
  PointsEarned(u32),
  BadgeUnlocked(Badge),
}

/// Receiver of session events. `emit` must not wait on persistence.
pub trait ProgressSink: Send + Sync {
  fn emit(&self, player: &str, event: SessionEvent);
}

#[derive(Clone, Debug, PartialEq)]
pub enum SubmitOutcome {
  Evaluated(GuessResult),
  /// Guesses are disabled in this phase.
  Closed(SessionPhase),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HintOutcome {
  Shown(String),
  Hidden,
  Unavailable,
}

#[derive(Clone, Debug)]
pub struct Session {
  pub id: String,
  pub player: String,
  pub level: Level,
  pub origin: LevelOrigin,
  phase: SessionPhase,
  state: SessionState,
}

impl Session {
  pub fn load(id: String, player: String, level: Level, origin: LevelOrigin, now: Instant) -> Self {
    let mut session = Self {
      id,
      player,
      level: level.clone(),
      origin: origin.clone(),
      phase: SessionPhase::Loading,
      state: SessionState::fresh(now),
    };
    session.enter_level(level, origin, now);
    session
  }

  /// Re-enter `Loading` with a (possibly new) level and start over.
  pub fn enter_level(&mut self, level: Level, origin: LevelOrigin, now: Instant) {
    self.phase = SessionPhase::Loading;
    self.level = level;
    self.origin = origin;
    self.state = SessionState::fresh(now);
    self.phase = SessionPhase::Active;
    debug!(target: "game", session = %self.id, level = %self.level.id, index = self.origin.level_index(), "Level loaded");
  }

  pub fn phase(&self) -> SessionPhase { self.phase }

  pub fn state(&self) -> &SessionState { &self.state }

  pub fn hint_available(&self) -> bool {
    self.phase == SessionPhase::Active && self.state.attempts > HINT_AFTER_ATTEMPTS
  }

  /// Evaluate a guess. Every accepted submission counts as an attempt, even
  /// unparseable ones. A correct guess closes the session and emits the
  /// completion, points and (if any) badge notices.
  pub fn submit_guess(
    &mut self,
    x_text: &str,
    y_text: &str,
    badges: &mut BadgeSet,
    sink: &dyn ProgressSink,
    now: Instant,
  ) -> SubmitOutcome {
    if self.phase != SessionPhase::Active {
      return SubmitOutcome::Closed(self.phase);
    }

    let attempts_so_far = self.state.attempts;
    let result = evaluate(x_text, y_text, &self.level, attempts_so_far, badges);
    self.state.attempts = attempts_so_far.saturating_add(1);

    if result.is_correct {
      self.phase = SessionPhase::Solved;
      self.state.solved = true;
      self.state.points_this_level = result.earned_points;

      let solve_time_secs = now.saturating_duration_since(self.state.start_time).as_secs();
      let level_index = self.origin.level_index();
      info!(target: "game", session = %self.id, player = %self.player, level_index, solve_time_secs, points = result.earned_points, attempts = self.state.attempts, "Level solved");

      sink.emit(&self.player, SessionEvent::LevelComplete { level_index, solve_time_secs });
      sink.emit(&self.player, SessionEvent::PointsEarned(result.earned_points));
      if let Some(badge) = result.badge_unlocked {
        if badges.award(badge) {
          sink.emit(&self.player, SessionEvent::BadgeUnlocked(badge));
        }
      }
    } else {
      debug!(target: "game", session = %self.id, tier = ?result.feedback_tier, attempts = self.state.attempts, "Guess missed");
    }

    SubmitOutcome::Evaluated(result)
  }

  /// Give up and show the worked solution. Awards nothing.
  /// Returns `None` when the session is not `Active`.
  pub fn reveal_solution(&mut self) -> Option<Vec<Step>> {
    if self.phase != SessionPhase::Active {
      return None;
    }
    self.phase = SessionPhase::SolutionRevealed;
    self.state.solution_revealed = true;
    self.state.points_this_level = 0;
    info!(target: "game", session = %self.id, attempts = self.state.attempts, "Solution revealed");
    Some(solution_steps(&self.level))
  }

  pub fn reveal_feedback(&self) -> String {
    feedback_message(FeedbackTier::Revealed, self.state.attempts, 0)
  }

  pub fn toggle_hint(&mut self) -> HintOutcome {
    if !self.hint_available() {
      return HintOutcome::Unavailable;
    }
    self.state.hint_revealed = !self.state.hint_revealed;
    if self.state.hint_revealed {
      HintOutcome::Shown(hint_text(&self.level))
    } else {
      HintOutcome::Hidden
    }
  }

  pub fn hint(&self) -> Option<String> {
    self.state.hint_revealed.then(|| hint_text(&self.level))
  }

  pub fn steps(&self) -> Option<Vec<Step>> {
    self.state.solution_revealed.then(|| solution_steps(&self.level))
  }
}
