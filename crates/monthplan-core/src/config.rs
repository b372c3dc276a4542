use anyhow::Context;
use chrono::{
  NaiveDate,
  Weekday
};
use serde::Deserialize;

const PLANNER_CONFIG_TOML: &str =
  include_str!("../config/monthplan.toml");

fn default_storage_key() -> String {
  "tasks".to_string()
}

fn default_week_start() -> String {
  "sunday".to_string()
}

fn default_week_row_height() -> f64 {
  120.0
}

fn default_header_height() -> f64 {
  60.0
}

fn default_task_row_height() -> f64 {
  25.0
}

fn default_bar_height() -> f64 {
  20.0
}

fn default_z_base() -> i32 {
  10
}

fn default_weekday_header_height() -> f64
{
  36.0
}

#[derive(
  Debug, Clone, PartialEq, Deserialize,
)]
pub struct PlannerConfig {
  #[serde(default)]
  pub version:       u32,
  #[serde(default = "default_storage_key")]
  pub storage_key:   String,
  #[serde(default = "default_week_start")]
  pub week_start:    String,
  #[serde(default)]
  pub initial_month: Option<String>,
  #[serde(default)]
  pub layout:        LayoutMetrics,
  #[serde(default)]
  pub grid:          GridMetrics
}

/// Pixel metrics for task bars. Every
/// week row is `week_row_height` tall
/// and bars start `header_height` below
/// the top of the grid.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Deserialize,
)]
pub struct LayoutMetrics {
  #[serde(
    default = "default_week_row_height"
  )]
  pub week_row_height: f64,
  #[serde(default = "default_header_height")]
  pub header_height:   f64,
  #[serde(
    default = "default_task_row_height"
  )]
  pub task_row_height: f64,
  #[serde(default = "default_bar_height")]
  pub bar_height:      f64,
  #[serde(default = "default_z_base")]
  pub z_base:          i32
}

/// Metrics for pointer hit testing.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Deserialize,
)]
pub struct GridMetrics {
  #[serde(
    default = "default_weekday_header_height"
  )]
  pub weekday_header_height: f64
}

impl Default for LayoutMetrics {
  fn default() -> Self {
    Self {
      week_row_height:
        default_week_row_height(),
      header_height:
        default_header_height(),
      task_row_height:
        default_task_row_height(),
      bar_height: default_bar_height(),
      z_base: default_z_base()
    }
  }
}

impl Default for GridMetrics {
  fn default() -> Self {
    Self {
      weekday_header_height:
        default_weekday_header_height()
    }
  }
}

impl Default for PlannerConfig {
  fn default() -> Self {
    Self {
      version:       1,
      storage_key:   default_storage_key(),
      week_start:    default_week_start(),
      initial_month: None,
      layout:        LayoutMetrics::default(),
      grid:          GridMetrics::default()
    }
  }
}

impl PlannerConfig {
  /// Parses the configuration compiled
  /// into the crate, falling back to
  /// defaults when it does not parse.
  #[must_use]
  pub fn load_embedded() -> Self {
    match Self::from_toml_str(
      PLANNER_CONFIG_TOML
    ) {
      | Ok(config) => {
        tracing::info!(
          version = config.version,
          storage_key = %config.storage_key,
          week_start = %config.week_start,
          "loaded planner config"
        );
        config
      }
      | Err(error) => {
        tracing::error!(%error, "failed parsing planner config; using defaults");
        Self::default()
      }
    }
  }

  pub fn from_toml_str(
    raw: &str
  ) -> anyhow::Result<Self> {
    let mut config =
      toml::from_str::<PlannerConfig>(raw)
        .context(
          "failed to parse planner \
           config"
        )?;
    sanitize_planner_config(&mut config);
    Ok(config)
  }

  #[must_use]
  pub fn week_start_day(&self) -> Weekday {
    parse_week_start(&self.week_start)
  }

  /// First day of the configured
  /// initial month, if one is set.
  #[must_use]
  pub fn initial_focus(
    &self
  ) -> Option<NaiveDate> {
    self
      .initial_month
      .as_deref()
      .and_then(parse_month)
  }
}

/// `monday` selects Monday; everything
/// else is Sunday.
#[must_use]
pub fn parse_week_start(
  raw: &str
) -> Weekday {
  if raw
    .trim()
    .eq_ignore_ascii_case("monday")
  {
    Weekday::Mon
  } else {
    Weekday::Sun
  }
}

/// Parses `YYYY-MM` into the first day
/// of that month.
#[must_use]
pub fn parse_month(
  raw: &str
) -> Option<NaiveDate> {
  let (year, month) =
    raw.trim().split_once('-')?;
  let year = year.parse::<i32>().ok()?;
  let month = month.parse::<u32>().ok()?;
  NaiveDate::from_ymd_opt(year, month, 1)
}

fn sanitize_planner_config(
  config: &mut PlannerConfig
) {
  if config.storage_key.trim().is_empty() {
    config.storage_key =
      default_storage_key();
  }

  let week_start =
    config.week_start.trim().to_ascii_lowercase();
  if week_start != "sunday"
    && week_start != "monday"
  {
    tracing::warn!(
      week_start = %config.week_start,
      "unknown week start; using sunday"
    );
    config.week_start =
      default_week_start();
  }

  if let Some(raw) =
    config.initial_month.as_deref()
    && parse_month(raw).is_none()
  {
    tracing::warn!(
      initial_month = raw,
      "ignoring invalid initial month"
    );
    config.initial_month = None;
  }

  let layout = &mut config.layout;
  if layout.week_row_height <= 0.0 {
    layout.week_row_height =
      default_week_row_height();
  }
  if layout.header_height < 0.0 {
    layout.header_height =
      default_header_height();
  }
  if layout.task_row_height <= 0.0 {
    layout.task_row_height =
      default_task_row_height();
  }
  if layout.bar_height <= 0.0 {
    layout.bar_height =
      default_bar_height();
  }
  if layout.bar_height
    > layout.task_row_height
  {
    layout.bar_height =
      layout.task_row_height;
  }

  if config.grid.weekday_header_height
    < 0.0
  {
    config.grid.weekday_header_height =
      default_weekday_header_height();
  }
}
