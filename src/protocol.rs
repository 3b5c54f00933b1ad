//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::{GuessResult, Level, Solution, TemplateType};
use crate::graph::{GraphSample, Marker};
use crate::progress::PlayerProgress;
use crate::session::{LevelOrigin, Session, SessionPhase};
use crate::templates::{CreatorPreset, Template};
use crate::walkthrough::Step;

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    StartSession {
        player: String,
        #[serde(default, rename = "templateIndex")]
        template_index: Option<usize>,
        #[serde(default, rename = "customLevelId")]
        custom_level_id: Option<String>,
    },
    SubmitGuess {
        #[serde(rename = "sessionId")]
        session_id: String,
        #[serde(default, deserialize_with = "guess_text")]
        x: String,
        #[serde(default, deserialize_with = "guess_text")]
        y: String,
    },
    ToggleHint {
        #[serde(rename = "sessionId")]
        session_id: String,
    },
    RevealSolution {
        #[serde(rename = "sessionId")]
        session_id: String,
    },
    Retry {
        #[serde(rename = "sessionId")]
        session_id: String,
    },
    NextLevel {
        #[serde(rename = "sessionId")]
        session_id: String,
    },
    Graph {
        #[serde(rename = "sessionId")]
        session_id: String,
        #[serde(default, deserialize_with = "guess_text")]
        x: String,
        #[serde(default, deserialize_with = "guess_text")]
        y: String,
    },
    EndSession {
        #[serde(rename = "sessionId")]
        session_id: String,
    },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Session {
        session: SessionOut,
    },
    GuessResult {
        guess: GuessOut,
    },
    Hint {
        hint: HintOut,
    },
    Reveal {
        reveal: RevealOut,
    },
    Graph {
        graph: GraphOut,
    },
    SessionEnded {
        #[serde(rename = "sessionId")]
        session_id: String,
    },
    Error {
        message: String,
    },
}

/// DTO used by both WS and HTTP for session delivery.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionOut {
    pub id: String,
    pub player: String,
    pub level: Level,
    pub origin: LevelOrigin,
    pub phase: SessionPhase,
    pub solved: bool,
    pub attempts: u32,
    pub points_this_level: u32,
    pub elapsed_secs: u64,
    pub hint_available: bool,
    pub hint: Option<String>,
    pub steps: Option<Vec<Step>>,
}

/// Convert a live `Session` to the public DTO.
pub fn to_out(s: &Session) -> SessionOut {
    SessionOut {
        id: s.id.clone(),
        player: s.player.clone(),
        level: s.level.clone(),
        origin: s.origin.clone(),
        phase: s.phase(),
        solved: s.state().solved,
        attempts: s.state().attempts,
        points_this_level: s.state().points_this_level,
        elapsed_secs: s.state().start_time.elapsed().as_secs(),
        hint_available: s.hint_available(),
        hint: s.hint(),
        steps: s.steps(),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateOut {
    pub index: usize,
    #[serde(rename = "type")]
    pub kind: TemplateType,
    pub title: &'static str,
    pub color: &'static str,
}

pub fn template_out(index: usize, t: &Template) -> TemplateOut {
    TemplateOut { index, kind: t.kind, title: t.title, color: t.color }
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Serialize)]
pub struct TemplatesOut {
    pub templates: Vec<TemplateOut>,
    pub presets: Vec<CreatorPreset>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionIn {
    pub player: String,
    #[serde(default)]
    pub template_index: Option<usize>,
    #[serde(default)]
    pub custom_level_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GuessIn {
    #[serde(default, deserialize_with = "guess_text")]
    pub x: String,
    #[serde(default, deserialize_with = "guess_text")]
    pub y: String,
}

/// Guess fields arrive as typed text, but JSON numbers and nulls are accepted
/// too. Anything else is kept as its JSON text and fails to parse later, so
/// the attempt is still counted.
fn guess_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuessOut {
    #[serde(flatten)]
    pub result: GuessResult,
    pub attempts: u32,
    pub phase: SessionPhase,
    pub hint_available: bool,
}

#[derive(Debug, Serialize)]
pub struct HintOut {
    pub available: bool,
    pub visible: bool,
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RevealOut {
    pub revealed: bool,
    pub feedback: String,
    pub solution: Solution,
    pub steps: Vec<Step>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GraphQuery {
    #[serde(default)]
    pub x: String,
    #[serde(default)]
    pub y: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphOut {
    pub sample: GraphSample,
    pub solution_marker: Marker,
    pub guess_marker: Option<Marker>,
}

#[derive(Debug, Serialize)]
pub struct LevelsOut {
    pub levels: Vec<Level>,
}

#[derive(Debug, Serialize)]
pub struct EndedOut {
    pub ended: bool,
}

#[derive(Debug, Serialize)]
pub struct DeletedOut {
    pub deleted: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressOut {
    pub player: String,
    pub badge_count: usize,
    #[serde(flatten)]
    pub progress: PlayerProgress,
}

#[derive(Debug, Serialize)]
pub struct ErrorOut {
    pub error: String,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}
