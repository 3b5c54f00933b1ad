//! Loading game configuration (a preloaded custom-level bank) from TOML.
//!
//! Example:
//!
//! ```toml
//! [[levels]]
//! title = "Epic Battle Stats"
//! creator = "Ms. Rivera"
//! scenarioType = "kills-deaths"
//! story = "A player finished 100 rounds with 20 more kills than deaths."
//! xLabel = "Kills"
//! yLabel = "Deaths"
//! total = 100
//! diff = 20
//! ```
//!
//! `session_ttl_secs` (top level, optional) bounds how long an untouched
//! session is kept before it is evicted.

use serde::Deserialize;
use tracing::{error, info};

use crate::domain::CustomLevelPayload;

#[derive(Clone, Debug, Deserialize, Default)]
pub struct GameConfig {
  #[serde(default)]
  pub levels: Vec<CustomLevelPayload>,
  #[serde(default)]
  pub session_ttl_secs: Option<u64>,
}

pub fn parse_game_config(s: &str) -> Result<GameConfig, toml::de::Error> {
  toml::from_str::<GameConfig>(s)
}

/// Attempt to load `GameConfig` from GAME_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_game_config_from_env() -> Option<GameConfig> {
  let path = std::env::var("GAME_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_game_config(&s) {
      Ok(cfg) => {
        info!(target: "linear_quest", %path, levels = cfg.levels.len(), "Loaded game config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "linear_quest", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "linear_quest", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::TemplateType;

  #[test]
  fn parses_level_bank() {
    let cfg = parse_game_config(
      r#"
        [[levels]]
        title = "Epic Battle Stats"
        creator = "Ms. Rivera"
        scenarioType = "kills-deaths"
        story = "A player finished 100 rounds with 20 more kills than deaths."
        xLabel = "Kills"
        yLabel = "Deaths"
        total = 100
        diff = 20

        [[levels]]
        title = "Hoops"
        scenarioType = "sports"
        story = "You took 61 shots with 11 more makes than misses."
        xLabel = "Made"
        yLabel = "Missed"
        total = 61.0
        diff = 11.0
      "#,
    )
    .unwrap();
    assert_eq!(cfg.levels.len(), 2);
    assert_eq!(cfg.levels[0].scenario_type, TemplateType::KillsDeaths);
    assert_eq!(cfg.levels[0].total, 100.0);
    assert_eq!(cfg.levels[1].creator, "");
  }

  #[test]
  fn empty_config_is_valid() {
    let cfg = parse_game_config("").unwrap();
    assert!(cfg.levels.is_empty());
    assert_eq!(cfg.session_ttl_secs, None);
  }

  #[test]
  fn session_ttl_is_read() {
    assert_eq!(parse_game_config("session_ttl_secs = 600").unwrap().session_ttl_secs, Some(600));
  }

  #[test]
  fn malformed_config_is_an_error() {
    assert!(parse_game_config("[[levels]]\ntitle = 3").is_err());
  }
}
