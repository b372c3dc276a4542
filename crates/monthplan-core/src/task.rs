use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use chrono::NaiveDate;
use serde::{
  Deserialize,
  Serialize
};

/// Color used for any category label
/// outside the known set.
pub const FALLBACK_COLOR: &str =
  "#6B7280";

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
)]
pub enum Category {
  #[serde(rename = "To Do")]
  ToDo,
  #[serde(rename = "In Progress")]
  InProgress,
  Review,
  Completed
}

impl Category {
  pub const ALL: [Category; 4] = [
    Category::ToDo,
    Category::InProgress,
    Category::Review,
    Category::Completed
  ];

  #[must_use]
  pub fn label(self) -> &'static str {
    match self {
      | Category::ToDo => "To Do",
      | Category::InProgress => {
        "In Progress"
      }
      | Category::Review => "Review",
      | Category::Completed => {
        "Completed"
      }
    }
  }

  #[must_use]
  pub fn color(self) -> &'static str {
    match self {
      | Category::ToDo => "#3B82F6",
      | Category::InProgress => {
        "#F59E0B"
      }
      | Category::Review => "#8B5CF6",
      | Category::Completed => {
        "#10B981"
      }
    }
  }

  /// Lenient parse used by form and
  /// command-line input: case and
  /// separators are ignored, so
  /// `to-do`, `To Do` and `todo` all
  /// resolve to [`Category::ToDo`].
  #[must_use]
  pub fn from_label(
    raw: &str
  ) -> Option<Self> {
    let key: String = raw
      .chars()
      .filter(|ch| {
        ch.is_ascii_alphanumeric()
      })
      .map(|ch| ch.to_ascii_lowercase())
      .collect();

    match key.as_str() {
      | "todo" => Some(Category::ToDo),
      | "inprogress" => {
        Some(Category::InProgress)
      }
      | "review" => {
        Some(Category::Review)
      }
      | "completed" => {
        Some(Category::Completed)
      }
      | _ => None
    }
  }
}

impl fmt::Display for Category {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(self.label())
  }
}

impl FromStr for Category {
  type Err = anyhow::Error;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    Category::from_label(s).ok_or_else(
      || {
        anyhow!(
          "unknown category: {s} \
           (expected one of To Do, \
           In Progress, Review, \
           Completed)"
        )
      }
    )
  }
}

/// Category as stored on a task. Saved
/// data may carry a label outside the
/// known set; it is kept verbatim so a
/// rewrite does not lose it, and it is
/// drawn in [`FALLBACK_COLOR`].
#[derive(
  Debug,
  Clone,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
)]
#[serde(untagged)]
pub enum TaskCategory {
  Known(Category),
  Unrecognized(String)
}

impl TaskCategory {
  #[must_use]
  pub fn known(&self) -> Option<Category> {
    match self {
      | TaskCategory::Known(category) => {
        Some(*category)
      }
      | TaskCategory::Unrecognized(_) => None
    }
  }

  #[must_use]
  pub fn label(&self) -> &str {
    match self {
      | TaskCategory::Known(category) => {
        category.label()
      }
      | TaskCategory::Unrecognized(raw) => raw
    }
  }

  #[must_use]
  pub fn color(&self) -> &'static str {
    self
      .known()
      .map_or(FALLBACK_COLOR, Category::color)
  }
}

impl From<Category> for TaskCategory {
  fn from(category: Category) -> Self {
    TaskCategory::Known(category)
  }
}

impl fmt::Display for TaskCategory {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(self.label())
  }
}

/// Inclusive range of calendar days.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub struct DateRange {
  pub start: NaiveDate,
  pub end:   NaiveDate
}

impl DateRange {
  /// Builds a range from two days in
  /// any order.
  #[must_use]
  pub fn new(
    a: NaiveDate,
    b: NaiveDate
  ) -> Self {
    if a <= b {
      Self { start: a, end: b }
    } else {
      Self { start: b, end: a }
    }
  }

  #[must_use]
  pub fn contains(
    &self,
    day: NaiveDate
  ) -> bool {
    self.start <= day && day <= self.end
  }

  #[must_use]
  pub fn day_count(&self) -> i64 {
    (self.end - self.start).num_days() + 1
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
  pub id:       String,
  pub name:     String,
  pub category: TaskCategory,
  pub start:    NaiveDate,
  pub end:      NaiveDate
}

impl Task {
  #[must_use]
  pub fn color(&self) -> &'static str {
    self.category.color()
  }

  #[must_use]
  pub fn range(&self) -> DateRange {
    DateRange {
      start: self.start,
      end:   self.end
    }
  }

  /// Inclusive number of days covered.
  #[must_use]
  pub fn duration_days(&self) -> i64 {
    self.range().day_count()
  }
}

/// Form input for a new task. The
/// category is optional so a missing
/// selection can be reported instead of
/// silently defaulted.
#[derive(
  Debug, Clone, Default, PartialEq, Eq,
)]
pub struct TaskDraft {
  pub name:     String,
  pub category: Option<Category>
}

impl TaskDraft {
  #[must_use]
  pub fn new(
    name: impl Into<String>,
    category: Category
  ) -> Self {
    Self {
      name:     name.into(),
      category: Some(category)
    }
  }
}

#[derive(
  Debug, Clone, Default, PartialEq, Eq,
)]
pub struct TaskPatch {
  pub name:     Option<String>,
  pub category: Option<Category>
}

/// On-disk shape of a task.
#[derive(
  Debug, Clone, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
  pub id:         String,
  pub name:       String,
  pub category:   TaskCategory,
  #[serde(with = "iso_date_serde")]
  pub start_date: NaiveDate,
  #[serde(with = "iso_date_serde")]
  pub end_date:   NaiveDate,
  #[serde(default)]
  pub color:      String
}

impl From<&Task> for TaskRecord {
  fn from(task: &Task) -> Self {
    Self {
      id:         task.id.clone(),
      name:       task.name.clone(),
      category:   task.category.clone(),
      start_date: task.start,
      end_date:   task.end,
      color:      task.color().to_string()
    }
  }
}

impl From<TaskRecord> for Task {
  fn from(record: TaskRecord) -> Self {
    Self {
      id:       record.id,
      name:     record.name,
      category: record.category,
      start:    record.start_date,
      end:      record.end_date
    }
  }
}

/// Dates are written as `YYYY-MM-DD`.
/// Reading also accepts RFC 3339
/// timestamps, which older saved data
/// used; those are read in local time.
pub mod iso_date_serde {
  use chrono::{
    DateTime,
    Local,
    NaiveDate
  };
  use serde::{
    Deserialize,
    Deserializer,
    Serializer
  };

  pub const FORMAT: &str = "%Y-%m-%d";

  pub fn serialize<S>(
    day: &NaiveDate,
    serializer: S
  ) -> Result<S::Ok, S::Error>
  where
    S: Serializer
  {
    serializer.serialize_str(
      &day.format(FORMAT).to_string()
    )
  }

  pub fn deserialize<'de, D>(
    deserializer: D
  ) -> Result<NaiveDate, D::Error>
  where
    D: Deserializer<'de>
  {
    let raw =
      String::deserialize(deserializer)?;
    parse(&raw)
      .map_err(serde::de::Error::custom)
  }

  pub fn parse(
    raw: &str
  ) -> Result<NaiveDate, String> {
    let trimmed = raw.trim();
    if let Ok(day) =
      NaiveDate::parse_from_str(
        trimmed, FORMAT
      )
    {
      return Ok(day);
    }

    DateTime::parse_from_rfc3339(trimmed)
      .map(|dt| {
        dt.with_timezone(&Local)
          .date_naive()
      })
      .map_err(|error| {
        format!(
          "invalid date {trimmed:?}: \
           {error}"
        )
      })
  }
}

#[cfg(test)]
mod tests {
  use chrono::DateTime;

  use super::*;

  fn day(
    year: i32,
    month: u32,
    d: u32
  ) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, d)
      .expect("valid date")
  }

  #[test]
  fn category_colors_and_fallback() {
    assert_eq!(
      Category::ToDo.color(),
      "#3B82F6"
    );
    assert_eq!(
      TaskCategory::from(Category::InProgress)
        .color(),
      "#F59E0B"
    );
    assert_eq!(
      TaskCategory::Unrecognized(
        "Blocked".to_string()
      )
      .color(),
      FALLBACK_COLOR
    );
  }

  #[test]
  fn stored_labels_match_exactly() {
    let parsed: Vec<TaskCategory> =
      serde_json::from_str(
        r#"["In Progress", "to do", "Blocked"]"#
      )
      .expect("parse");

    assert_eq!(
      parsed[0],
      TaskCategory::Known(Category::InProgress)
    );
    assert_eq!(
      parsed[1],
      TaskCategory::Unrecognized(
        "to do".to_string()
      )
    );
    assert_eq!(parsed[2].label(), "Blocked");
    assert_eq!(parsed[2].known(), None);
    assert_eq!(
      serde_json::to_string(&parsed[2])
        .expect("serialize"),
      r#""Blocked""#
    );
  }

  #[test]
  fn lenient_category_parsing() {
    assert_eq!(
      Category::from_label("To-Do"),
      Some(Category::ToDo)
    );
    assert_eq!(
      "in_progress"
        .parse::<Category>()
        .expect("parse"),
      Category::InProgress
    );
    assert!(
      "someday".parse::<Category>().is_err()
    );
  }

  #[test]
  fn record_uses_labels_and_iso_dates() {
    let task = Task {
      id:       "task5".to_string(),
      name:     "TASK 5".to_string(),
      category: Category::ToDo.into(),
      start:    day(2024, 8, 7),
      end:      day(2024, 8, 8)
    };

    let json = serde_json::to_value(
      TaskRecord::from(&task)
    )
    .expect("serialize");

    assert_eq!(json["category"], "To Do");
    assert_eq!(
      json["startDate"],
      "2024-08-07"
    );
    assert_eq!(json["endDate"], "2024-08-08");
    assert_eq!(json["color"], "#3B82F6");
  }

  #[test]
  fn timestamp_dates_are_accepted() {
    let parsed = iso_date_serde::parse(
      "2024-08-07T12:00:00.000Z"
    )
    .expect("timestamp");
    let expected = DateTime::parse_from_rfc3339(
      "2024-08-07T12:00:00.000Z"
    )
    .expect("rfc3339")
    .with_timezone(&chrono::Local)
    .date_naive();
    assert_eq!(parsed, expected);
    assert!(
      iso_date_serde::parse("next week")
        .is_err()
    );
  }

  #[test]
  fn range_normalizes_and_counts_days() {
    let range = DateRange::new(
      day(2024, 8, 15),
      day(2024, 8, 12)
    );
    assert_eq!(range.start, day(2024, 8, 12));
    assert_eq!(range.day_count(), 4);
    assert!(range.contains(day(2024, 8, 14)));
    assert!(!range.contains(day(2024, 8, 16)));
  }
}
