//! Application state: templates, custom-level bank, live sessions, progress.
//!
//! This module owns:
//!   - the immutable built-in template set
//!   - the custom-level bank (ordered; position is the level index)
//!   - live sessions by id
//!   - the local badge mirror per player (the source of truth for badge
//!     eligibility during play)
//!   - the progress store and the fire-and-forget sink feeding it

use std::time::{Duration, Instant};
use std::{collections::HashMap, fmt, sync::Arc};

use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::config::{load_game_config_from_env, GameConfig};
use crate::domain::{BadgeSet, CustomLevelPayload, GuessResult, Level};
use crate::generator::{generate_custom, LevelError};
use crate::progress::{spawn_worker, ChannelSink, PlayerProgress, ProgressStore};
use crate::session::{HintOutcome, LevelOrigin, ProgressSink, Session, SessionPhase, SubmitOutcome};
use crate::templates::{builtin_templates, Template};
use crate::walkthrough::Step;

#[derive(Debug, Clone, PartialEq)]
pub enum GameError {
    UnknownSession(String),
    UnknownLevel(String),
    UnknownTemplate(usize),
    InvalidLevel(LevelError),
    /// Guesses are disabled in this phase.
    SessionClosed(SessionPhase),
    /// Next level is only offered for built-in levels.
    NotBuiltIn,
    /// Next level needs a solved or revealed level.
    NotFinished,
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::UnknownSession(id) => write!(f, "Unknown sessionId: {}", id),
            GameError::UnknownLevel(id) => write!(f, "Unknown levelId: {}", id),
            GameError::UnknownTemplate(i) => write!(f, "Unknown templateIndex: {}", i),
            GameError::InvalidLevel(e) => write!(f, "Invalid level: {}", e),
            GameError::SessionClosed(phase) => write!(f, "Session no longer accepts guesses ({:?})", phase),
            GameError::NotBuiltIn => write!(f, "Next level is only available for built-in levels"),
            GameError::NotFinished => write!(f, "Finish or reveal the current level first"),
        }
    }
}

impl std::error::Error for GameError {}

impl From<LevelError> for GameError {
    fn from(e: LevelError) -> Self {
        GameError::InvalidLevel(e)
    }
}

/// Sessions whose current level started longer ago than this are evicted.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(6 * 60 * 60);

/// What a new session should play.
#[derive(Debug, Clone)]
pub enum SessionStart {
    BuiltIn(usize),
    Custom(String),
}

#[derive(Clone)]
pub struct AppState {
    pub templates: Arc<Vec<Template>>,
    pub custom_levels: Arc<RwLock<Vec<Level>>>,
    pub sessions: Arc<RwLock<HashMap<String, Session>>>,
    pub badges: Arc<RwLock<HashMap<String, BadgeSet>>>,
    pub progress: Arc<ProgressStore>,
    pub sink: Arc<dyn ProgressSink>,
    pub session_ttl: Duration,
}

impl AppState {
    /// Build state from env: load config, preload the level bank, start the
    /// progress worker. Must run inside a tokio runtime.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        Self::with_config(load_game_config_from_env())
    }

    pub fn with_config(cfg: Option<GameConfig>) -> Self {
        let session_ttl = cfg
            .as_ref()
            .and_then(|c| c.session_ttl_secs)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_SESSION_TTL);
        let mut bank = Vec::new();
        if let Some(cfg) = &cfg {
            for payload in &cfg.levels {
                match generate_custom(payload) {
                    Ok(level) => bank.push(level),
                    Err(e) => {
                        error!(target: "linear_quest", title = %payload.title, error = %e, "Skipping bank level");
                    }
                }
            }
        }

        let templates = builtin_templates();
        info!(target: "linear_quest", templates = templates.len(), custom_levels = bank.len(), "Startup level inventory");

        let progress = Arc::new(ProgressStore::default());
        let (sink, rx) = ChannelSink::new();
        spawn_worker(progress.clone(), rx);

        Self {
            templates: Arc::new(templates),
            custom_levels: Arc::new(RwLock::new(bank)),
            sessions: Arc::new(RwLock::new(HashMap::new())),
            badges: Arc::new(RwLock::new(HashMap::new())),
            progress,
            sink: Arc::new(sink),
            session_ttl,
        }
    }

    fn template(&self, index: usize) -> Result<&Template, GameError> {
        self.templates.get(index).ok_or(GameError::UnknownTemplate(index))
    }

    /// Fresh random level from a built-in template.
    fn builtin_level(&self, index: usize) -> Result<Level, GameError> {
        Ok(self.template(index)?.generate(&mut rand::thread_rng()))
    }

    async fn custom_level(&self, level_id: &str) -> Result<(usize, Level), GameError> {
        let bank = self.custom_levels.read().await;
        bank.iter()
            .position(|l| l.id == level_id)
            .map(|i| (i, bank[i].clone()))
            .ok_or_else(|| GameError::UnknownLevel(level_id.to_string()))
    }

    /// Start a play-through. The player's badge mirror is seeded from their
    /// stored progress the first time they are seen.
    #[instrument(level = "info", skip(self))]
    pub async fn start_session(&self, player: &str, start: SessionStart) -> Result<Session, GameError> {
        let (level, origin) = match start {
            SessionStart::BuiltIn(index) => (self.builtin_level(index)?, LevelOrigin::BuiltIn { index }),
            SessionStart::Custom(level_id) => {
                let (index, level) = self.custom_level(&level_id).await?;
                (level, LevelOrigin::Custom { index, level_id })
            }
        };

        let known = { self.badges.read().await.contains_key(player) };
        if !known {
            let stored = self.progress.snapshot(player).await.badges;
            self.badges.write().await.entry(player.to_string()).or_insert(stored);
        }

        let now = Instant::now();
        let session = Session::load(Uuid::new_v4().to_string(), player.to_string(), level, origin, now);
        {
            let mut sessions = self.sessions.write().await;
            let before = sessions.len();
            sessions.retain(|_, s| now.saturating_duration_since(s.state().start_time) <= self.session_ttl);
            if sessions.len() < before {
                debug!(target: "linear_quest", evicted = before - sessions.len(), "Evicted stale sessions");
            }
            sessions.insert(session.id.clone(), session.clone());
        }
        info!(target: "game", session = %session.id, %player, level = %session.level.id, "Session started");
        Ok(session)
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn get_session(&self, id: &str) -> Result<Session, GameError> {
        self.sessions.read().await.get(id).cloned().ok_or_else(|| GameError::UnknownSession(id.to_string()))
    }

    /// Drop a session and its level. Unknown ids are an error.
    #[instrument(level = "info", skip(self))]
    pub async fn end_session(&self, id: &str) -> Result<(), GameError> {
        match self.sessions.write().await.remove(id) {
            Some(s) => {
                info!(target: "game", session = %id, player = %s.player, phase = ?s.phase(), "Session ended");
                Ok(())
            }
            None => Err(GameError::UnknownSession(id.to_string())),
        }
    }

    /// Run `f` against a live session under the write lock.
    async fn with_session<T>(&self, id: &str, f: impl FnOnce(&mut Session) -> T) -> Result<T, GameError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(id).ok_or_else(|| GameError::UnknownSession(id.to_string()))?;
        Ok(f(session))
    }

    #[instrument(level = "info", skip(self, x, y))]
    pub async fn submit_guess(&self, id: &str, x: &str, y: &str) -> Result<(GuessResult, Session), GameError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(id).ok_or_else(|| GameError::UnknownSession(id.to_string()))?;

        let mut mirror = self.badges.write().await;
        let badges = mirror.entry(session.player.clone()).or_default();

        match session.submit_guess(x, y, badges, self.sink.as_ref(), Instant::now()) {
            SubmitOutcome::Evaluated(result) => Ok((result, session.clone())),
            SubmitOutcome::Closed(phase) => Err(GameError::SessionClosed(phase)),
        }
    }

    #[instrument(level = "info", skip(self))]
    pub async fn toggle_hint(&self, id: &str) -> Result<(HintOutcome, Session), GameError> {
        self.with_session(id, |s| (s.toggle_hint(), s.clone())).await
    }

    /// Reveal the worked solution. `None` steps mean the session was not active.
    #[instrument(level = "info", skip(self))]
    pub async fn reveal_solution(&self, id: &str) -> Result<(Option<Vec<Step>>, Session), GameError> {
        self.with_session(id, |s| (s.reveal_solution(), s.clone())).await
    }

    /// Custom levels replay as-is; built-in levels redraw from the same theme.
    #[instrument(level = "info", skip(self))]
    pub async fn retry(&self, id: &str) -> Result<Session, GameError> {
        let origin = self.get_session(id).await?.origin;
        let fresh = match &origin {
            LevelOrigin::BuiltIn { index } => Some(self.builtin_level(*index)?),
            LevelOrigin::Custom { .. } => None,
        };
        self.with_session(id, |s| {
            let level = fresh.unwrap_or_else(|| s.level.clone());
            s.enter_level(level, origin, Instant::now());
            s.clone()
        })
        .await
    }

    /// Advance to the next built-in theme, wrapping around after the last.
    #[instrument(level = "info", skip(self))]
    pub async fn next_level(&self, id: &str) -> Result<Session, GameError> {
        let current = self.get_session(id).await?;
        let index = match current.origin {
            LevelOrigin::BuiltIn { index } => index,
            LevelOrigin::Custom { .. } => return Err(GameError::NotBuiltIn),
        };
        if current.phase() == SessionPhase::Active {
            return Err(GameError::NotFinished);
        }
        let next = (index + 1) % self.templates.len();
        let level = self.builtin_level(next)?;
        self.with_session(id, |s| {
            s.enter_level(level, LevelOrigin::BuiltIn { index: next }, Instant::now());
            s.clone()
        })
        .await
    }

    #[instrument(level = "info", skip(self, payload), fields(title = %payload.title))]
    pub async fn save_custom_level(&self, payload: &CustomLevelPayload) -> Result<Level, GameError> {
        let level = generate_custom(payload)?;
        // Newest first, like the level browser shows them.
        self.custom_levels.write().await.insert(0, level.clone());
        info!(target: "game", id = %level.id, creator = %level.creator, "Custom level saved");
        Ok(level)
    }

    pub async fn list_custom_levels(&self) -> Vec<Level> {
        self.custom_levels.read().await.clone()
    }

    #[instrument(level = "info", skip(self))]
    pub async fn delete_custom_level(&self, id: &str) -> Result<(), GameError> {
        let mut bank = self.custom_levels.write().await;
        let before = bank.len();
        bank.retain(|l| l.id != id);
        if bank.len() == before {
            warn!(target: "game", %id, "Delete requested for unknown level");
            return Err(GameError::UnknownLevel(id.to_string()));
        }
        Ok(())
    }

    pub async fn progress(&self, player: &str) -> PlayerProgress {
        self.progress.snapshot(player).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Badge, TemplateType};

    fn payload(title: &str) -> CustomLevelPayload {
        CustomLevelPayload {
            title: title.into(),
            creator: "Ms. Rivera".into(),
            scenario_type: TemplateType::HealthShield,
            story: "Your character has 100 protection points with health 20 higher than shield.".into(),
            x_label: "Health".into(),
            y_label: "Shield".into(),
            total: 100.0,
            diff: 20.0,
            ..Default::default()
        }
    }

    async fn wait_for_points(state: &AppState, player: &str, points: u64) -> PlayerProgress {
        for _ in 0..100 {
            let p = state.progress(player).await;
            if p.total_points >= points {
                return p;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        state.progress(player).await
    }

    #[tokio::test]
    async fn builtin_session_plays_to_completion() {
        let state = AppState::with_config(None);
        let session = state.start_session("ada", SessionStart::BuiltIn(0)).await.unwrap();
        let sol = session.level.solution;

        let (result, after) = state
            .submit_guess(&session.id, &sol.x.to_string(), &sol.y.to_string())
            .await
            .unwrap();
        assert!(result.is_correct);
        assert_eq!(result.earned_points, 100);
        assert_eq!(result.badge_unlocked, Some(Badge::FirstTry));
        assert_eq!(after.phase(), SessionPhase::Solved);

        let err = state.submit_guess(&session.id, "1", "1").await.unwrap_err();
        assert_eq!(err, GameError::SessionClosed(SessionPhase::Solved));

        let progress = wait_for_points(&state, "ada", 100).await;
        assert_eq!(progress.total_points, 100);
        assert!(progress.badges.contains(Badge::FirstTry));
        assert_eq!(progress.levels_completed, 1);
    }

    #[tokio::test]
    async fn badge_mirror_blocks_repeat_unlocks() {
        let state = AppState::with_config(None);
        for expected in [Some(Badge::FirstTry), Some(Badge::QuickSolver), None] {
            let s = state.start_session("ada", SessionStart::BuiltIn(1)).await.unwrap();
            let sol = s.level.solution;
            let (r, _) = state.submit_guess(&s.id, &sol.x.to_string(), &sol.y.to_string()).await.unwrap();
            assert_eq!(r.badge_unlocked, expected);
        }
    }

    #[tokio::test]
    async fn next_level_wraps_and_requires_a_finished_level() {
        let state = AppState::with_config(None);
        let s = state.start_session("ada", SessionStart::BuiltIn(3)).await.unwrap();
        assert_eq!(state.next_level(&s.id).await.unwrap_err(), GameError::NotFinished);

        let (steps, _) = state.reveal_solution(&s.id).await.unwrap();
        assert!(steps.is_some());
        let next = state.next_level(&s.id).await.unwrap();
        assert_eq!(next.origin, LevelOrigin::BuiltIn { index: 0 });
        assert_eq!(next.level.scenario_type, TemplateType::KillsDeaths);
        assert_eq!(next.phase(), SessionPhase::Active);
    }

    #[tokio::test]
    async fn custom_levels_retry_the_same_level() {
        let state = AppState::with_config(None);
        let level = state.save_custom_level(&payload("Shield Challenge")).await.unwrap();
        let s = state.start_session("ada", SessionStart::Custom(level.id.clone())).await.unwrap();
        state.submit_guess(&s.id, "0", "0").await.unwrap();

        let retried = state.retry(&s.id).await.unwrap();
        assert_eq!(retried.level, level);
        assert_eq!(retried.state().attempts, 0);
        assert_eq!(state.next_level(&s.id).await.unwrap_err(), GameError::NotBuiltIn);
    }

    #[tokio::test]
    async fn builtin_retry_keeps_the_theme() {
        let state = AppState::with_config(None);
        let s = state.start_session("ada", SessionStart::BuiltIn(2)).await.unwrap();
        let retried = state.retry(&s.id).await.unwrap();
        assert_eq!(retried.level.scenario_type, TemplateType::TimeChallenge);
        assert_ne!(retried.level.id, s.level.id);
    }

    #[tokio::test]
    async fn level_bank_crud() {
        let cfg = GameConfig { levels: vec![payload("Preloaded"), payload("")], session_ttl_secs: None };
        let state = AppState::with_config(Some(cfg));
        assert_eq!(state.list_custom_levels().await.len(), 1);

        let saved = state.save_custom_level(&payload("Newest")).await.unwrap();
        let levels = state.list_custom_levels().await;
        assert_eq!(levels[0].id, saved.id);
        assert_eq!(levels.len(), 2);

        let mut blank = payload("x");
        blank.story = " ".into();
        assert!(matches!(state.save_custom_level(&blank).await, Err(GameError::InvalidLevel(LevelError::EmptyStory))));

        state.delete_custom_level(&saved.id).await.unwrap();
        assert_eq!(state.delete_custom_level(&saved.id).await, Err(GameError::UnknownLevel(saved.id.clone())));
        assert_eq!(state.list_custom_levels().await.len(), 1);
    }

    #[tokio::test]
    async fn ended_sessions_are_gone() {
        let state = AppState::with_config(None);
        let s = state.start_session("ada", SessionStart::BuiltIn(0)).await.unwrap();
        state.end_session(&s.id).await.unwrap();

        assert_eq!(state.get_session(&s.id).await.unwrap_err(), GameError::UnknownSession(s.id.clone()));
        assert_eq!(state.end_session(&s.id).await, Err(GameError::UnknownSession(s.id.clone())));
        assert!(state.sessions.read().await.is_empty());
    }

    #[tokio::test]
    async fn stale_sessions_are_evicted_on_start() {
        let cfg = GameConfig { levels: vec![], session_ttl_secs: Some(0) };
        let state = AppState::with_config(Some(cfg));
        let old = state.start_session("ada", SessionStart::BuiltIn(0)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        let fresh = state.start_session("bo", SessionStart::BuiltIn(1)).await.unwrap();
        assert!(matches!(state.get_session(&old.id).await, Err(GameError::UnknownSession(_))));
        assert!(state.get_session(&fresh.id).await.is_ok());
        assert_eq!(state.sessions.read().await.len(), 1);
    }

    #[tokio::test]
    async fn unknown_ids_are_errors() {
        let state = AppState::with_config(None);
        assert!(matches!(state.start_session("ada", SessionStart::BuiltIn(9)).await, Err(GameError::UnknownTemplate(9))));
        assert!(matches!(
            state.start_session("ada", SessionStart::Custom("nope".into())).await,
            Err(GameError::UnknownLevel(_))
        ));
        assert!(matches!(state.toggle_hint("nope").await, Err(GameError::UnknownSession(_))));
    }
}
