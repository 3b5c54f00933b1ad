//! Built-in themes and creator-mode presets.
//!
//! The built-in set is fixed and ordered: the level index of a built-in
//! play-through is the position of its template in `builtin_templates()`.

use std::ops::RangeInclusive;

use rand::Rng;
use serde::Serialize;

use crate::domain::{Level, TemplateType};

/// A theme descriptor: story framing plus the integer ranges `total` and
/// `diff` are drawn from.
#[derive(Clone, Debug)]
pub struct Template {
  pub kind: TemplateType,
  pub title: &'static str,
  pub color: &'static str,
  pub total_range: RangeInclusive<i64>,
  pub diff_range: RangeInclusive<i64>,
  /// Story with `{total}` and `{diff}` placeholders.
  pub story_tpl: &'static str,
  pub eq1_text: &'static str,
  pub eq2_text: &'static str,
  pub x_label: &'static str,
  pub y_label: &'static str,
}

impl Template {
  pub fn generate<R: Rng>(&self, rng: &mut R) -> Level {
    crate::generator::generate(self, rng)
  }
}

/// The four themes every player walks through, in play order.
pub fn builtin_templates() -> Vec<Template> {
  vec![
    Template {
      kind: TemplateType::KillsDeaths,
      title: "Kill/Death Ratio",
      color: "purple",
      total_range: 80..=120,
      diff_range: 10..=40,
      story_tpl: "A player finished {total} total rounds (kills + deaths). They had {diff} more kills than deaths.",
      eq1_text: "Total rounds",
      eq2_text: "Kill advantage",
      x_label: "Kills",
      y_label: "Deaths",
    },
    Template {
      kind: TemplateType::HealthShield,
      title: "Health + Shield Combo",
      color: "green",
      total_range: 150..=200,
      diff_range: 20..=50,
      story_tpl: "Your character has {total} total protection points (health + shield). Health is {diff} points higher than shield.",
      eq1_text: "Total protection",
      eq2_text: "Health advantage",
      x_label: "Health",
      y_label: "Shield",
    },
    Template {
      kind: TemplateType::TimeChallenge,
      title: "Speed Run Timer",
      color: "blue",
      total_range: 100..=200,
      diff_range: 20..=60,
      story_tpl: "Two speed runners completed levels in {total} seconds combined. The faster runner beat the slower one by {diff} seconds.",
      eq1_text: "Combined time",
      eq2_text: "Time difference",
      x_label: "Slower Time (sec)",
      y_label: "Faster Time (sec)",
    },
    Template {
      kind: TemplateType::Sports,
      title: "Sports Stats",
      color: "orange",
      total_range: 60..=100,
      diff_range: 10..=30,
      story_tpl: "A player took {total} total shots. They made {diff} more shots than they missed.",
      eq1_text: "Total shots",
      eq2_text: "Made advantage",
      x_label: "Shots Made",
      y_label: "Shots Missed",
    },
  ]
}

/// Colour tag for a theme; custom levels borrow it from their scenario type.
pub fn color_for(kind: TemplateType) -> &'static str {
  match kind {
    TemplateType::KillsDeaths => "purple",
    TemplateType::HealthShield => "green",
    TemplateType::TimeChallenge => "blue",
    TemplateType::Sports => "orange",
  }
}

/// Example values used to prefill the level editor for a theme.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatorPreset {
  pub scenario_type: TemplateType,
  pub name: &'static str,
  pub color: &'static str,
  pub title: &'static str,
  pub x_label: &'static str,
  pub y_label: &'static str,
  pub story: &'static str,
}

pub fn creator_presets() -> Vec<CreatorPreset> {
  vec![
    CreatorPreset {
      scenario_type: TemplateType::KillsDeaths,
      name: "Game Stats",
      color: color_for(TemplateType::KillsDeaths),
      title: "Epic Battle Stats",
      x_label: "Kills",
      y_label: "Deaths",
      story: "A player finished 100 rounds with 20 more kills than deaths.",
    },
    CreatorPreset {
      scenario_type: TemplateType::HealthShield,
      name: "Health & Shields",
      color: color_for(TemplateType::HealthShield),
      title: "Shield Challenge",
      x_label: "Health",
      y_label: "Shield",
      story: "Your character has 100 protection points with health 20 higher than shield.",
    },
    CreatorPreset {
      scenario_type: TemplateType::Sports,
      name: "Sports Stats",
      color: color_for(TemplateType::Sports),
      title: "Basketball Challenge",
      x_label: "Shots Made",
      y_label: "Shots Missed",
      story: "You took 100 total shots with 20 more makes than misses.",
    },
    CreatorPreset {
      scenario_type: TemplateType::TimeChallenge,
      name: "Time Challenge",
      color: color_for(TemplateType::TimeChallenge),
      title: "Speed Run",
      x_label: "Fast Time",
      y_label: "Slow Time",
      story: "Two players finished in 100 seconds combined with a 20 second difference.",
    },
  ]
}
