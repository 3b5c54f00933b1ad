//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Starting sessions (built-in theme or custom level)
//!   - Evaluating guesses
//!   - Hint toggle, solution reveal, retry and next level
//!   - Ending a session
//!   - Graph projection for the current level and live guess

use tracing::{debug, info, instrument};

use crate::graph::{guess_marker, project, solution_marker};
use crate::protocol::*;
use crate::session::HintOutcome;
use crate::state::{AppState, GameError, SessionStart};

/// Default when a start request names neither a theme nor a custom level.
const FIRST_TEMPLATE: usize = 0;

pub fn list_templates(state: &AppState) -> TemplatesOut {
  TemplatesOut {
    templates: state.templates.iter().enumerate().map(|(i, t)| template_out(i, t)).collect(),
    presets: crate::templates::creator_presets(),
  }
}

#[instrument(level = "info", skip(state))]
pub async fn start_session(
  state: &AppState,
  player: &str,
  template_index: Option<usize>,
  custom_level_id: Option<String>,
) -> Result<SessionOut, GameError> {
  let start = match custom_level_id {
    Some(id) => SessionStart::Custom(id),
    None => SessionStart::BuiltIn(template_index.unwrap_or(FIRST_TEMPLATE)),
  };
  let session = state.start_session(player, start).await?;
  Ok(to_out(&session))
}

#[instrument(level = "info", skip(state, x, y), fields(%session_id, x_len = x.len(), y_len = y.len()))]
pub async fn submit_guess(state: &AppState, session_id: &str, x: &str, y: &str) -> Result<GuessOut, GameError> {
  let (result, session) = state.submit_guess(session_id, x, y).await?;
  info!(
    target: "game",
    %session_id,
    correct = result.is_correct,
    tier = ?result.feedback_tier,
    points = result.earned_points,
    badge = result.badge_unlocked.map(|b| b.id()).unwrap_or("none"),
    "Guess evaluated"
  );
  Ok(GuessOut {
    result,
    attempts: session.state().attempts,
    phase: session.phase(),
    hint_available: session.hint_available(),
  })
}

#[instrument(level = "info", skip(state))]
pub async fn toggle_hint(state: &AppState, session_id: &str) -> Result<HintOut, GameError> {
  let (outcome, session) = state.toggle_hint(session_id).await?;
  let out = match outcome {
    HintOutcome::Shown(text) => HintOut { available: true, visible: true, text: Some(text) },
    HintOutcome::Hidden => HintOut { available: true, visible: false, text: None },
    HintOutcome::Unavailable => HintOut { available: false, visible: session.hint().is_some(), text: session.hint() },
  };
  debug!(target: "game", %session_id, available = out.available, visible = out.visible, "Hint toggled");
  Ok(out)
}

#[instrument(level = "info", skip(state))]
pub async fn reveal_solution(state: &AppState, session_id: &str) -> Result<RevealOut, GameError> {
  let (steps, session) = state.reveal_solution(session_id).await?;
  let revealed = steps.is_some();
  Ok(RevealOut {
    revealed,
    feedback: if revealed { session.reveal_feedback() } else { "Solution is only revealed for a level in play.".into() },
    solution: session.level.solution,
    steps: steps.or_else(|| session.steps()).unwrap_or_default(),
  })
}

#[instrument(level = "info", skip(state))]
pub async fn retry(state: &AppState, session_id: &str) -> Result<SessionOut, GameError> {
  Ok(to_out(&state.retry(session_id).await?))
}

#[instrument(level = "info", skip(state))]
pub async fn next_level(state: &AppState, session_id: &str) -> Result<SessionOut, GameError> {
  Ok(to_out(&state.next_level(session_id).await?))
}

#[instrument(level = "debug", skip(state))]
pub async fn get_session(state: &AppState, session_id: &str) -> Result<SessionOut, GameError> {
  Ok(to_out(&state.get_session(session_id).await?))
}

#[instrument(level = "info", skip(state))]
pub async fn end_session(state: &AppState, session_id: &str) -> Result<EndedOut, GameError> {
  state.end_session(session_id).await?;
  Ok(EndedOut { ended: true })
}

/// Graph for the session's level. The guess marker appears only while the
/// level is in play and both fields parse.
#[instrument(level = "debug", skip(state, x, y), fields(%session_id))]
pub async fn graph(state: &AppState, session_id: &str, x: &str, y: &str) -> Result<GraphOut, GameError> {
  let session = state.get_session(session_id).await?;
  Ok(GraphOut {
    sample: project(&session.level),
    solution_marker: solution_marker(&session.level),
    guess_marker: guess_marker(x, y, session.phase()),
  })
}
