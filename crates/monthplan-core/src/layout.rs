//! Turns the visible task list into bar
//! rectangles on the month grid.
//!
//! Each task yields one placement per
//! week row it touches. Within a week,
//! bars whose days overlap are stacked
//! into slots first-fit in task-list
//! order, so an earlier task always wins
//! the lower slot. The packing is greedy
//! and can use more slots than strictly
//! necessary.

use chrono::NaiveDate;

use crate::config::LayoutMetrics;
use crate::grid::{
  DAYS_PER_WEEK,
  GRID_DAYS,
  GRID_WEEKS
};
use crate::task::Task;

#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
  pub task_id:     String,
  /// Position of the task in the input.
  pub task_index:  usize,
  pub week:        usize,
  /// First and last column covered in
  /// this week, both inclusive.
  pub start_col:   usize,
  pub end_col:     usize,
  pub slot:        usize,
  pub left_pct:    f64,
  pub width_pct:   f64,
  pub top_px:      f64,
  pub z_index:     i32,
  /// The task's real start falls in this
  /// week (not clipped by a row edge).
  pub starts_here: bool,
  /// The task's real end falls in this
  /// week.
  pub ends_here:   bool
}

impl Placement {
  #[must_use]
  pub fn day_count(&self) -> usize {
    self.end_col - self.start_col + 1
  }

  fn overlaps(
    &self,
    start_col: usize,
    end_col: usize
  ) -> bool {
    self.start_col <= end_col
      && start_col <= self.end_col
  }
}

/// Inclusive day offsets of `task`
/// relative to `grid_start`, clipped to
/// the grid. `None` when the task lies
/// entirely outside it.
#[must_use]
pub fn grid_offsets(
  task: &Task,
  grid_start: NaiveDate
) -> Option<(usize, usize)> {
  let last = GRID_DAYS as i64 - 1;
  let start =
    (task.start - grid_start).num_days();
  let end = (task.end - grid_start).num_days();
  if end < 0 || start > last || start > end {
    return None;
  }
  Some((
    start.max(0) as usize,
    end.min(last) as usize
  ))
}

#[must_use]
pub fn layout_tasks(
  tasks: &[Task],
  grid_start: NaiveDate,
  metrics: &LayoutMetrics
) -> Vec<Placement> {
  let mut placements: Vec<Placement> =
    Vec::new();
  let mut by_week: Vec<Vec<usize>> =
    vec![Vec::new(); GRID_WEEKS];

  for (task_index, task) in
    tasks.iter().enumerate()
  {
    let Some((first, last)) =
      grid_offsets(task, grid_start)
    else {
      continue;
    };
    let task_start =
      (task.start - grid_start).num_days();
    let task_end =
      (task.end - grid_start).num_days();

    for week in
      first / DAYS_PER_WEEK..=last / DAYS_PER_WEEK
    {
      let week_first = week * DAYS_PER_WEEK;
      let week_last =
        week_first + DAYS_PER_WEEK - 1;
      let clipped_start = first.max(week_first);
      let clipped_end = last.min(week_last);
      let start_col = clipped_start - week_first;
      let end_col = clipped_end - week_first;

      let slot = first_free_slot(
        by_week[week]
          .iter()
          .map(|&idx| &placements[idx]),
        start_col,
        end_col
      );
      let days = (end_col - start_col + 1) as f64;

      by_week[week].push(placements.len());
      placements.push(Placement {
        task_id: task.id.clone(),
        task_index,
        week,
        start_col,
        end_col,
        slot,
        left_pct: start_col as f64
          / DAYS_PER_WEEK as f64
          * 100.0,
        width_pct: days / DAYS_PER_WEEK as f64
          * 100.0,
        top_px: metrics.week_row_height
          * week as f64
          + metrics.header_height
          + slot as f64
            * metrics.task_row_height,
        z_index: metrics.z_base
          + slot as i32,
        starts_here: task_start
          == clipped_start as i64,
        ends_here: task_end
          == clipped_end as i64
      });
    }
  }

  placements
}

fn first_free_slot<'a>(
  taken: impl Iterator<Item = &'a Placement>,
  start_col: usize,
  end_col: usize
) -> usize {
  let mut used: Vec<usize> = taken
    .filter(|other| {
      other.overlaps(start_col, end_col)
    })
    .map(|other| other.slot)
    .collect();
  used.sort_unstable();
  used.dedup();

  let mut slot = 0;
  for taken_slot in used {
    if taken_slot != slot {
      break;
    }
    slot += 1;
  }
  slot
}

#[cfg(test)]
mod tests {
  use chrono::Weekday;

  use super::*;
  use crate::grid::grid_start;
  use crate::store::seed_tasks;
  use crate::task::Category;

  fn day(
    month: u32,
    d: u32
  ) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, month, d)
      .expect("valid date")
  }

  fn task(
    id: &str,
    start: NaiveDate,
    end: NaiveDate
  ) -> Task {
    Task {
      id: id.to_string(),
      name: id.to_uppercase(),
      category: Category::ToDo.into(),
      start,
      end
    }
  }

  fn august_start() -> NaiveDate {
    grid_start(day(8, 1), Weekday::Sun)
  }

  fn slot_of(
    placements: &[Placement],
    id: &str,
    week: usize
  ) -> usize {
    placements
      .iter()
      .find(|p| p.task_id == id && p.week == week)
      .map(|p| p.slot)
      .expect("placement present")
  }

  #[test]
  fn seed_set_stacks_overlapping_tasks() {
    let placements = layout_tasks(
      &seed_tasks(),
      august_start(),
      &LayoutMetrics::default()
    );

    // Aug 11 to Aug 17 is week 2.
    assert_eq!(slot_of(&placements, "task1", 2), 0);
    assert_eq!(slot_of(&placements, "task4", 2), 1);
    assert_eq!(slot_of(&placements, "task3", 2), 2);
    assert_eq!(slot_of(&placements, "task5", 1), 0);
    assert_eq!(slot_of(&placements, "task2", 3), 0);
    assert_eq!(slot_of(&placements, "task6", 4), 0);

    let task4 = placements
      .iter()
      .find(|p| p.task_id == "task4")
      .expect("task4");
    assert_eq!(task4.start_col, 2);
    assert_eq!(task4.day_count(), 3);
    assert!((task4.left_pct - 200.0 / 7.0).abs() < 1e-9);
    assert!((task4.width_pct - 300.0 / 7.0).abs() < 1e-9);
    assert_eq!(task4.top_px, 120.0 * 2.0 + 60.0 + 25.0);
    assert_eq!(task4.z_index, 11);
  }

  #[test]
  fn non_overlapping_tasks_reuse_slot_zero() {
    let tasks = vec![
      task("a", day(8, 4), day(8, 5)),
      task("b", day(8, 6), day(8, 7)),
      task("c", day(8, 8), day(8, 10))
    ];
    let placements = layout_tasks(
      &tasks,
      august_start(),
      &LayoutMetrics::default()
    );
    assert!(placements.iter().all(|p| p.slot == 0));
  }

  #[test]
  fn stacking_is_first_fit_by_list_order() {
    // a and c do not overlap, b overlaps
    // both and d overlaps all three.
    let tasks = vec![
      task("a", day(8, 4), day(8, 5)),
      task("b", day(8, 5), day(8, 8)),
      task("c", day(8, 7), day(8, 9)),
      task("d", day(8, 5), day(8, 7))
    ];
    let placements = layout_tasks(
      &tasks,
      august_start(),
      &LayoutMetrics::default()
    );
    assert_eq!(slot_of(&placements, "a", 1), 0);
    assert_eq!(slot_of(&placements, "b", 1), 1);
    assert_eq!(slot_of(&placements, "c", 1), 0);
    assert_eq!(slot_of(&placements, "d", 1), 2);
  }

  #[test]
  fn overlapping_pairs_never_share_a_slot() {
    let tasks = vec![
      task("a", day(8, 1), day(8, 20)),
      task("b", day(8, 3), day(8, 4)),
      task("c", day(8, 4), day(8, 12)),
      task("d", day(8, 10), day(8, 10)),
      task("e", day(8, 12), day(8, 14))
    ];
    let placements = layout_tasks(
      &tasks,
      august_start(),
      &LayoutMetrics::default()
    );
    for (i, left) in placements.iter().enumerate() {
      for right in &placements[i + 1..] {
        if left.week == right.week
          && left.overlaps(
            right.start_col,
            right.end_col
          )
        {
          assert_ne!(left.slot, right.slot);
        }
      }
    }
  }

  #[test]
  fn multi_week_task_splits_per_row() {
    let tasks =
      vec![task("long", day(8, 8), day(8, 20))];
    let placements = layout_tasks(
      &tasks,
      august_start(),
      &LayoutMetrics::default()
    );

    let weeks: Vec<_> = placements
      .iter()
      .map(|p| (p.week, p.start_col, p.end_col))
      .collect();
    assert_eq!(
      weeks,
      vec![(1, 4, 6), (2, 0, 6), (3, 0, 2)]
    );
    assert!(placements[0].starts_here);
    assert!(!placements[0].ends_here);
    assert!(!placements[1].starts_here);
    assert!(!placements[1].ends_here);
    assert!(placements[2].ends_here);
    assert!((placements[1].width_pct - 100.0).abs() < 1e-9);
  }

  #[test]
  fn tasks_outside_grid_are_clipped_or_dropped() {
    let tasks = vec![
      task("before", day(6, 1), day(6, 30)),
      task("edge", day(7, 20), day(7, 29)),
      task("after", day(9, 5), day(9, 20))
    ];
    let placements = layout_tasks(
      &tasks,
      august_start(),
      &LayoutMetrics::default()
    );

    assert!(
      !placements.iter().any(|p| p.task_id == "before")
    );
    let edge: Vec<_> = placements
      .iter()
      .filter(|p| p.task_id == "edge")
      .collect();
    assert_eq!(edge.len(), 1);
    assert_eq!((edge[0].start_col, edge[0].end_col), (0, 1));
    assert!(!edge[0].starts_here);
    assert!(edge[0].ends_here);

    let after: Vec<_> = placements
      .iter()
      .filter(|p| p.task_id == "after")
      .collect();
    assert_eq!(after.len(), 1);
    assert_eq!(after[0].week, 5);
    assert_eq!((after[0].start_col, after[0].end_col), (4, 6));
    assert!(!after[0].ends_here);
  }
}
