//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and log include parameters and basic result info.

use std::sync::Arc;
use axum::{extract::{Path, Query, State}, http::StatusCode, response::{IntoResponse, Response}, Json};
use tracing::{info, instrument, warn};

use crate::domain::CustomLevelPayload;
use crate::logic;
use crate::protocol::*;
use crate::state::{AppState, GameError};

impl IntoResponse for GameError {
  fn into_response(self) -> Response {
    let status = match &self {
      GameError::UnknownSession(_) | GameError::UnknownLevel(_) | GameError::UnknownTemplate(_) => StatusCode::NOT_FOUND,
      GameError::InvalidLevel(_) => StatusCode::UNPROCESSABLE_ENTITY,
      GameError::SessionClosed(_) | GameError::NotBuiltIn | GameError::NotFinished => StatusCode::CONFLICT,
    };
    warn!(target: "linear_quest", %status, error = %self, "Request rejected");
    (status, Json(ErrorOut { error: self.to_string() })).into_response()
  }
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state))]
pub async fn http_get_templates(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(logic::list_templates(&state))
}

#[instrument(level = "info", skip(state, body), fields(player = %body.player))]
pub async fn http_post_session(
  State(state): State<Arc<AppState>>,
  Json(body): Json<StartSessionIn>,
) -> Result<Json<SessionOut>, GameError> {
  let out = logic::start_session(&state, &body.player, body.template_index, body.custom_level_id).await?;
  info!(target: "game", id = %out.id, level = %out.level.id, "HTTP session started");
  Ok(Json(out))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_session(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<SessionOut>, GameError> {
  Ok(Json(logic::get_session(&state, &id).await?))
}

#[instrument(level = "info", skip(state))]
pub async fn http_delete_session(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<EndedOut>, GameError> {
  Ok(Json(logic::end_session(&state, &id).await?))
}

#[instrument(level = "info", skip(state, body), fields(%id))]
pub async fn http_post_guess(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Json(body): Json<GuessIn>,
) -> Result<Json<GuessOut>, GameError> {
  let out = logic::submit_guess(&state, &id, &body.x, &body.y).await?;
  info!(target: "game", %id, correct = out.result.is_correct, attempts = out.attempts, "HTTP guess evaluated");
  Ok(Json(out))
}

#[instrument(level = "info", skip(state))]
pub async fn http_post_hint(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<HintOut>, GameError> {
  Ok(Json(logic::toggle_hint(&state, &id).await?))
}

#[instrument(level = "info", skip(state))]
pub async fn http_post_reveal(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<RevealOut>, GameError> {
  Ok(Json(logic::reveal_solution(&state, &id).await?))
}

#[instrument(level = "info", skip(state))]
pub async fn http_post_retry(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<SessionOut>, GameError> {
  Ok(Json(logic::retry(&state, &id).await?))
}

#[instrument(level = "info", skip(state))]
pub async fn http_post_next(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<SessionOut>, GameError> {
  Ok(Json(logic::next_level(&state, &id).await?))
}

#[instrument(level = "debug", skip(state, q), fields(%id))]
pub async fn http_get_graph(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Query(q): Query<GraphQuery>,
) -> Result<Json<GraphOut>, GameError> {
  Ok(Json(logic::graph(&state, &id, &q.x, &q.y).await?))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_levels(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(LevelsOut { levels: state.list_custom_levels().await })
}

#[instrument(level = "info", skip(state, body), fields(title = %body.title, story_len = body.story.len()))]
pub async fn http_post_level(
  State(state): State<Arc<AppState>>,
  Json(body): Json<CustomLevelPayload>,
) -> Result<(StatusCode, Json<crate::domain::Level>), GameError> {
  let level = state.save_custom_level(&body).await?;
  Ok((StatusCode::CREATED, Json(level)))
}

#[instrument(level = "info", skip(state))]
pub async fn http_delete_level(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<DeletedOut>, GameError> {
  state.delete_custom_level(&id).await?;
  Ok(Json(DeletedOut { deleted: true }))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_progress(
  State(state): State<Arc<AppState>>,
  Path(player): Path<String>,
) -> impl IntoResponse {
  let progress = state.progress(&player).await;
  Json(ProgressOut { player, badge_count: progress.badges.len(), progress })
}
