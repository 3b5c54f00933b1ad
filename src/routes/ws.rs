//! WebSocket upgrade + message loop. Each client message is parsed as JSON and
//! forwarded to core logic. We reply with a single JSON message per request.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{info, error, instrument, debug};

use crate::logic;
use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::state::{AppState, GameError};

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "linear_quest", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "linear_quest", "WebSocket connected");
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        // Parse, dispatch, serialize response.
        let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => {
            debug!(target: "linear_quest", "WS received: {:?}", &incoming);
            handle_client_ws(incoming, &state).await
          }
          Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
        };

        let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
          serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
        });

        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "linear_quest", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "linear_quest", "WebSocket disconnected");
}

fn or_error<T>(res: Result<T, GameError>, ok: impl FnOnce(T) -> ServerWsMessage) -> ServerWsMessage {
  match res {
    Ok(v) => ok(v),
    Err(e) => ServerWsMessage::Error { message: e.to_string() },
  }
}

#[instrument(level = "info", skip(state))]
pub async fn handle_client_ws(msg: ClientWsMessage, state: &AppState) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::StartSession { player, template_index, custom_level_id } => {
      let res = logic::start_session(state, &player, template_index, custom_level_id).await;
      if let Ok(s) = &res {
        tracing::info!(target: "game", %player, id = %s.id, "WS session started");
      }
      or_error(res, |session| ServerWsMessage::Session { session })
    }

    ClientWsMessage::SubmitGuess { session_id, x, y } => {
      let res = logic::submit_guess(state, &session_id, &x, &y).await;
      or_error(res, |guess| ServerWsMessage::GuessResult { guess })
    }

    ClientWsMessage::ToggleHint { session_id } => {
      or_error(logic::toggle_hint(state, &session_id).await, |hint| ServerWsMessage::Hint { hint })
    }

    ClientWsMessage::RevealSolution { session_id } => {
      or_error(logic::reveal_solution(state, &session_id).await, |reveal| ServerWsMessage::Reveal { reveal })
    }

    ClientWsMessage::Retry { session_id } => {
      or_error(logic::retry(state, &session_id).await, |session| ServerWsMessage::Session { session })
    }

    ClientWsMessage::NextLevel { session_id } => {
      or_error(logic::next_level(state, &session_id).await, |session| ServerWsMessage::Session { session })
    }

    ClientWsMessage::Graph { session_id, x, y } => {
      or_error(logic::graph(state, &session_id, &x, &y).await, |graph| ServerWsMessage::Graph { graph })
    }

    ClientWsMessage::EndSession { session_id } => {
      let res = logic::end_session(state, &session_id).await;
      or_error(res, |_| ServerWsMessage::SessionEnded { session_id })
    }
  }
}
