//! Progress tracking collaborator: per-player points, badges, fastest times.
//!
//! Sessions emit events through `ChannelSink`, which only enqueues. A worker
//! task drains the queue into the in-memory `ProgressStore`. Nothing here can
//! roll back a session.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::domain::BadgeSet;
use crate::session::{ProgressSink, SessionEvent};

#[derive(Clone, Debug, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlayerProgress {
  pub total_points: u64,
  pub weekly_points: u64,
  pub badges: BadgeSet,
  pub fastest_times: BTreeMap<String, u64>,
  pub levels_completed: u64,
}

/// Key under which a level's fastest time is stored (`level_1`, `level_2`, ...).
pub fn level_key(level_index: usize) -> String {
  format!("level_{}", level_index + 1)
}

impl PlayerProgress {
  pub fn apply(&mut self, event: &SessionEvent) {
    match event {
      SessionEvent::LevelComplete { level_index, solve_time_secs } => {
        // Sub-second solves carry no usable time.
        if *solve_time_secs > 0 {
          let key = level_key(*level_index);
          let faster = self.fastest_times.get(&key).map_or(true, |best| solve_time_secs < best);
          if faster {
            self.fastest_times.insert(key, *solve_time_secs);
          }
        }
        self.levels_completed += 1;
      }
      SessionEvent::PointsEarned(points) => {
        self.total_points += u64::from(*points);
        self.weekly_points += u64::from(*points);
      }
      SessionEvent::BadgeUnlocked(badge) => {
        self.badges.award(*badge);
      }
    }
  }
}

#[derive(Debug, Default)]
pub struct ProgressStore {
  players: RwLock<HashMap<String, PlayerProgress>>,
}

impl ProgressStore {
  #[instrument(level = "debug", skip(self))]
  pub async fn apply(&self, player: &str, event: &SessionEvent) {
    let mut players = self.players.write().await;
    players.entry(player.to_string()).or_default().apply(event);
  }

  /// Progress for a player; unknown players have default progress.
  pub async fn snapshot(&self, player: &str) -> PlayerProgress {
    self.players.read().await.get(player).cloned().unwrap_or_default()
  }
}

/// One queued event.
#[derive(Clone, Debug)]
pub struct ProgressEnvelope {
  pub player: String,
  pub event: SessionEvent,
}

/// Fire-and-forget sink backed by an unbounded channel.
#[derive(Clone, Debug)]
pub struct ChannelSink {
  tx: mpsc::UnboundedSender<ProgressEnvelope>,
}

impl ChannelSink {
  pub fn new() -> (Self, mpsc::UnboundedReceiver<ProgressEnvelope>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Self { tx }, rx)
  }
}

impl ProgressSink for ChannelSink {
  fn emit(&self, player: &str, event: SessionEvent) {
    let envelope = ProgressEnvelope { player: player.to_string(), event };
    if let Err(e) = self.tx.send(envelope) {
      warn!(target: "linear_quest", player, event = ?e.0.event, "Progress worker gone; dropping event");
    }
  }
}

/// Drain the event queue into the store until every sender is dropped.
pub fn spawn_worker(store: Arc<ProgressStore>, mut rx: mpsc::UnboundedReceiver<ProgressEnvelope>) -> JoinHandle<()> {
  tokio::spawn(async move {
    info!(target: "linear_quest", "Progress worker started");
    while let Some(ProgressEnvelope { player, event }) = rx.recv().await {
      debug!(target: "linear_quest", %player, ?event, "Applying progress event");
      store.apply(&player, &event).await;
    }
    info!(target: "linear_quest", "Progress worker stopped");
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::Badge;

  #[test]
  fn fastest_time_only_improves() {
    let mut p = PlayerProgress::default();
    p.apply(&SessionEvent::LevelComplete { level_index: 0, solve_time_secs: 30 });
    p.apply(&SessionEvent::LevelComplete { level_index: 0, solve_time_secs: 45 });
    p.apply(&SessionEvent::LevelComplete { level_index: 0, solve_time_secs: 30 });
    assert_eq!(p.fastest_times.get("level_1"), Some(&30));
    p.apply(&SessionEvent::LevelComplete { level_index: 0, solve_time_secs: 12 });
    assert_eq!(p.fastest_times.get("level_1"), Some(&12));
    assert_eq!(p.levels_completed, 4);
  }

  #[test]
  fn zero_second_solves_count_but_set_no_time() {
    let mut p = PlayerProgress::default();
    p.apply(&SessionEvent::LevelComplete { level_index: 2, solve_time_secs: 0 });
    assert!(p.fastest_times.is_empty());
    assert_eq!(p.levels_completed, 1);
  }

  #[test]
  fn points_and_badges_accumulate() {
    let mut p = PlayerProgress::default();
    p.apply(&SessionEvent::PointsEarned(90));
    p.apply(&SessionEvent::PointsEarned(50));
    p.apply(&SessionEvent::BadgeUnlocked(Badge::FirstTry));
    p.apply(&SessionEvent::BadgeUnlocked(Badge::FirstTry));
    assert_eq!(p.total_points, 140);
    assert_eq!(p.weekly_points, 140);
    assert_eq!(p.badges.len(), 1);
  }

  #[tokio::test]
  async fn worker_drains_channel_into_store() {
    let store = Arc::new(ProgressStore::default());
    let (sink, rx) = ChannelSink::new();
    let handle = spawn_worker(store.clone(), rx);

    sink.emit("ada", SessionEvent::PointsEarned(100));
    sink.emit("ada", SessionEvent::BadgeUnlocked(Badge::FirstTry));
    sink.emit("bob", SessionEvent::PointsEarned(50));
    drop(sink);
    handle.await.unwrap();

    let ada = store.snapshot("ada").await;
    assert_eq!(ada.total_points, 100);
    assert!(ada.badges.contains(Badge::FirstTry));
    assert_eq!(store.snapshot("bob").await.total_points, 50);
    assert_eq!(store.snapshot("nobody").await, PlayerProgress::default());
  }

  #[test]
  fn emitting_without_a_worker_is_harmless() {
    let (sink, rx) = ChannelSink::new();
    drop(rx);
    sink.emit("ada", SessionEvent::PointsEarned(100));
  }
}
