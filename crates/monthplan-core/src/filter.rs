use std::collections::BTreeSet;

use chrono::NaiveDate;
use tracing::trace;

use crate::grid::add_days;
use crate::task::{
  Category,
  Task
};

/// Relative window starting today.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
)]
pub enum TimeWindow {
  OneWeek,
  TwoWeeks,
  ThreeWeeks
}

impl TimeWindow {
  pub const ALL: [TimeWindow; 3] = [
    TimeWindow::OneWeek,
    TimeWindow::TwoWeeks,
    TimeWindow::ThreeWeeks
  ];

  #[must_use]
  pub fn weeks(self) -> i64 {
    match self {
      | TimeWindow::OneWeek => 1,
      | TimeWindow::TwoWeeks => 2,
      | TimeWindow::ThreeWeeks => 3
    }
  }

  #[must_use]
  pub fn from_weeks(
    weeks: i64
  ) -> Option<Self> {
    Self::ALL
      .into_iter()
      .find(|window| window.weeks() == weeks)
  }

  #[must_use]
  pub fn key(self) -> &'static str {
    match self {
      | TimeWindow::OneWeek => "1week",
      | TimeWindow::TwoWeeks => "2weeks",
      | TimeWindow::ThreeWeeks => "3weeks"
    }
  }

  #[must_use]
  pub fn from_key(
    raw: &str
  ) -> Option<Self> {
    Self::ALL
      .into_iter()
      .find(|window| window.key() == raw)
  }

  #[must_use]
  pub fn label(self) -> &'static str {
    match self {
      | TimeWindow::OneWeek => {
        "Tasks within 1 week"
      }
      | TimeWindow::TwoWeeks => {
        "Tasks within 2 weeks"
      }
      | TimeWindow::ThreeWeeks => {
        "Tasks within 3 weeks"
      }
    }
  }

  /// Last day covered when the window
  /// opens on `today`.
  #[must_use]
  pub fn last_day(
    self,
    today: NaiveDate
  ) -> NaiveDate {
    add_days(today, self.weeks() * 7)
  }
}

/// Everything the filter panel can set.
/// Empty values mean "no constraint".
#[derive(
  Debug, Clone, Default, PartialEq, Eq,
)]
pub struct FilterCriteria {
  pub categories:  BTreeSet<Category>,
  pub time_window: Option<TimeWindow>,
  pub search_term: String
}

impl FilterCriteria {
  #[must_use]
  pub fn is_active(&self) -> bool {
    !self.categories.is_empty()
      || self.time_window.is_some()
      || !self.search_term.is_empty()
  }

  pub fn clear(&mut self) {
    *self = Self::default();
  }

  pub fn toggle_category(
    &mut self,
    category: Category,
    checked: bool
  ) {
    if checked {
      self.categories.insert(category);
    } else {
      self.categories.remove(&category);
    }
  }

  #[must_use]
  pub fn matches(
    &self,
    task: &Task,
    today: NaiveDate
  ) -> bool {
    // Unrecognized labels never match a
    // selected category.
    if !self.categories.is_empty()
      && !task.category.known().is_some_and(
        |category| {
          self.categories.contains(&category)
        }
      )
    {
      return false;
    }

    if let Some(window) = self.time_window {
      let last = window.last_day(today);
      let within = |day: NaiveDate| {
        today <= day && day <= last
      };
      // A task covering the whole window
      // with both ends outside it does
      // not match.
      if !within(task.start)
        && !within(task.end)
      {
        return false;
      }
    }

    if !self.search_term.is_empty() {
      let needle =
        self.search_term.to_lowercase();
      if !task
        .name
        .to_lowercase()
        .contains(&needle)
      {
        return false;
      }
    }

    true
  }
}

/// Tasks passing every criterion, in
/// their original order.
#[must_use]
pub fn visible_tasks(
  tasks: &[Task],
  criteria: &FilterCriteria,
  today: NaiveDate
) -> Vec<Task> {
  let visible: Vec<Task> = tasks
    .iter()
    .filter(|task| criteria.matches(task, today))
    .cloned()
    .collect();
  trace!(
    total = tasks.len(),
    visible = visible.len(),
    "filtered tasks"
  );
  visible
}
