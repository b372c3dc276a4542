//! Pointer gesture state machine for the
//! month grid.
//!
//! One gesture is active at a time. Every
//! gesture ends in a [`GestureOutcome`];
//! releasing the button and leaving the
//! grid both commit whatever candidate was
//! current at that moment. Only
//! [`InteractionController::cancel`]
//! discards a gesture.

use chrono::NaiveDate;
use tracing::debug;

use crate::config::GridMetrics;
use crate::grid::{
  DAYS_PER_WEEK,
  GRID_WEEKS
};
use crate::task::{
  DateRange,
  Task
};

/// `MouseEvent.button` value of the
/// primary button.
pub const PRIMARY_BUTTON: i16 = 0;

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum ResizeEdge {
  Left,
  Right
}

/// Pointer position relative to the
/// grid's top-left corner, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerPosition {
  pub x: f64,
  pub y: f64
}

/// Size of the grid element, weekday
/// header included.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridBounds {
  pub width:  f64,
  pub height: f64
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gesture {
  Idle,
  Selecting {
    anchor:  NaiveDate,
    current: NaiveDate
  },
  Moving {
    task_id:   String,
    original:  DateRange,
    candidate: Option<DateRange>
  },
  Resizing {
    task_id: String,
    edge:    ResizeEdge,
    range:   DateRange
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GestureOutcome {
  /// Nothing to act on.
  None,
  /// Open the create form over `range`.
  SelectionComplete(DateRange),
  Moved {
    task_id:   String,
    new_start: NaiveDate
  },
  MoveAbandoned {
    task_id: String
  },
  Resized {
    task_id: String,
    range:   DateRange
  },
  Cancelled
}

/// Maps a pointer position to a cell
/// index in `0..42`. Positions outside
/// the grid clamp to the nearest cell.
#[must_use]
pub fn cell_index_at(
  pos: PointerPosition,
  bounds: GridBounds,
  metrics: &GridMetrics
) -> Option<usize> {
  let body_height = bounds.height
    - metrics.weekday_header_height;
  if bounds.width <= 0.0 || body_height <= 0.0
  {
    return None;
  }

  let cell_width =
    bounds.width / DAYS_PER_WEEK as f64;
  let cell_height =
    body_height / GRID_WEEKS as f64;
  let col = (pos.x / cell_width).floor();
  let row = ((pos.y
    - metrics.weekday_header_height)
    / cell_height)
    .floor();

  let col = col
    .clamp(0.0, (DAYS_PER_WEEK - 1) as f64)
    as usize;
  let row = row
    .clamp(0.0, (GRID_WEEKS - 1) as f64)
    as usize;
  Some(row * DAYS_PER_WEEK + col)
}

#[derive(Debug, Clone, PartialEq)]
pub struct InteractionController {
  days:    Vec<NaiveDate>,
  metrics: GridMetrics,
  gesture: Gesture
}

impl InteractionController {
  #[must_use]
  pub fn new(
    days: Vec<NaiveDate>,
    metrics: GridMetrics
  ) -> Self {
    Self {
      days,
      metrics,
      gesture: Gesture::Idle
    }
  }

  /// Swaps in the dates of a newly shown
  /// month. Any gesture in progress is
  /// dropped.
  pub fn set_days(
    &mut self,
    days: Vec<NaiveDate>
  ) {
    self.days = days;
    self.gesture = Gesture::Idle;
  }

  #[must_use]
  pub fn gesture(&self) -> &Gesture {
    &self.gesture
  }

  #[must_use]
  pub fn is_idle(&self) -> bool {
    self.gesture == Gesture::Idle
  }

  /// Live selection, normalized.
  #[must_use]
  pub fn selection(
    &self
  ) -> Option<DateRange> {
    match &self.gesture {
      | Gesture::Selecting {
        anchor,
        current
      } => {
        Some(DateRange::new(*anchor, *current))
      }
      | _ => None
    }
  }

  /// Candidate range of the task being
  /// dragged or resized, for feedback.
  #[must_use]
  pub fn preview(
    &self
  ) -> Option<(&str, DateRange)> {
    match &self.gesture {
      | Gesture::Moving {
        task_id,
        candidate: Some(range),
        ..
      } => Some((task_id.as_str(), *range)),
      | Gesture::Resizing {
        task_id,
        range,
        ..
      } => Some((task_id.as_str(), *range)),
      | _ => None
    }
  }

  #[must_use]
  pub fn date_at(
    &self,
    pos: PointerPosition,
    bounds: GridBounds
  ) -> Option<NaiveDate> {
    cell_index_at(pos, bounds, &self.metrics)
      .and_then(|idx| self.days.get(idx).copied())
  }

  /// Button press on an empty cell.
  /// Starts a selection when idle and the
  /// primary button was used.
  pub fn press_cell(
    &mut self,
    button: i16,
    date: NaiveDate
  ) -> bool {
    if button != PRIMARY_BUTTON
      || !self.is_idle()
    {
      return false;
    }
    debug!(%date, "selection started");
    self.gesture = Gesture::Selecting {
      anchor:  date,
      current: date
    };
    true
  }

  /// Pointer motion over the grid.
  /// Returns `true` when the visible
  /// state changed.
  pub fn pointer_move(
    &mut self,
    pos: PointerPosition,
    bounds: GridBounds
  ) -> bool {
    let Some(date) = self.date_at(pos, bounds)
    else {
      return false;
    };

    match &mut self.gesture {
      | Gesture::Selecting {
        current, ..
      } => {
        if *current == date {
          return false;
        }
        *current = date;
        true
      }
      | Gesture::Resizing {
        edge,
        range,
        ..
      } => {
        let next = match edge {
          | ResizeEdge::Left
            if date < range.end =>
          {
            DateRange {
              start: date,
              end:   range.end
            }
          }
          | ResizeEdge::Right
            if date > range.start =>
          {
            DateRange {
              start: range.start,
              end:   date
            }
          }
          | _ => return false
        };
        if next == *range {
          return false;
        }
        *range = next;
        true
      }
      | Gesture::Idle
      | Gesture::Moving { .. } => false
    }
  }

  pub fn begin_move(
    &mut self,
    task: &Task
  ) -> bool {
    if !self.is_idle() {
      return false;
    }
    debug!(task_id = %task.id, "move started");
    self.gesture = Gesture::Moving {
      task_id:   task.id.clone(),
      original:  task.range(),
      candidate: None
    };
    true
  }

  /// Drag hovering over `date`, or over
  /// no cell at all.
  pub fn drag_over(
    &mut self,
    date: Option<NaiveDate>
  ) -> bool {
    let Gesture::Moving {
      original,
      candidate,
      ..
    } = &mut self.gesture
    else {
      return false;
    };

    let next = date.map(|start| {
      DateRange {
        start,
        end: crate::grid::add_days(
          start,
          original.day_count() - 1
        )
      }
    });
    if next == *candidate {
      return false;
    }
    *candidate = next;
    true
  }

  /// Ends a move. Dropping on a cell
  /// commits; dropping anywhere else, or
  /// a drag that ends without a drop,
  /// abandons it.
  pub fn drop_on(
    &mut self,
    date: Option<NaiveDate>
  ) -> GestureOutcome {
    let Gesture::Moving { task_id, .. } =
      std::mem::replace(
        &mut self.gesture,
        Gesture::Idle
      )
    else {
      return GestureOutcome::None;
    };

    match date {
      | Some(new_start) => {
        debug!(%task_id, %new_start, "move dropped");
        GestureOutcome::Moved {
          task_id,
          new_start
        }
      }
      | None => {
        debug!(%task_id, "move abandoned");
        GestureOutcome::MoveAbandoned {
          task_id
        }
      }
    }
  }

  pub fn begin_resize(
    &mut self,
    task: &Task,
    edge: ResizeEdge
  ) -> bool {
    if !self.is_idle() {
      return false;
    }
    debug!(task_id = %task.id, ?edge, "resize started");
    self.gesture = Gesture::Resizing {
      task_id: task.id.clone(),
      edge,
      range: task.range()
    };
    true
  }

  /// Button release over the grid.
  /// Selections and resizes commit their
  /// last candidate. A move is left alone;
  /// it is resolved by [`Self::drop_on`].
  pub fn end_gesture(
    &mut self
  ) -> GestureOutcome {
    if matches!(
      self.gesture,
      Gesture::Moving { .. }
    ) {
      return GestureOutcome::None;
    }

    match std::mem::replace(
      &mut self.gesture,
      Gesture::Idle
    ) {
      | Gesture::Selecting {
        anchor,
        current
      } => {
        GestureOutcome::SelectionComplete(
          DateRange::new(anchor, current)
        )
      }
      | Gesture::Resizing {
        task_id,
        range,
        ..
      } => {
        GestureOutcome::Resized {
          task_id,
          range
        }
      }
      | Gesture::Idle
      | Gesture::Moving { .. } => {
        GestureOutcome::None
      }
    }
  }

  /// Pointer left the grid. Treated
  /// exactly like a release.
  pub fn pointer_leave(
    &mut self
  ) -> GestureOutcome {
    self.end_gesture()
  }

  /// Drops the current gesture without
  /// committing anything.
  pub fn cancel(&mut self) -> GestureOutcome {
    if self.is_idle() {
      return GestureOutcome::None;
    }
    debug!(gesture = ?self.gesture, "gesture cancelled");
    self.gesture = Gesture::Idle;
    GestureOutcome::Cancelled
  }
}

#[cfg(test)]
mod tests {
  use chrono::Weekday;

  use super::*;
  use crate::grid::calendar_days;
  use crate::task::Category;

  const BOUNDS: GridBounds = GridBounds {
    width:  700.0,
    height: 756.0
  };

  fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 8, d)
      .expect("valid date")
  }

  fn controller() -> InteractionController {
    InteractionController::new(
      calendar_days(day(1), Weekday::Sun),
      GridMetrics::default()
    )
  }

  /// Center of the cell at `row`, `col`.
  fn at(
    row: usize,
    col: usize
  ) -> PointerPosition {
    PointerPosition {
      x: col as f64 * 100.0 + 50.0,
      y: 36.0 + row as f64 * 120.0 + 60.0
    }
  }

  fn task(
    start: NaiveDate,
    end: NaiveDate
  ) -> Task {
    Task {
      id: "t".to_string(),
      name: "T".to_string(),
      category: Category::Review.into(),
      start,
      end
    }
  }

  #[test]
  fn hit_test_maps_and_clamps() {
    let metrics = GridMetrics::default();
    assert_eq!(
      cell_index_at(at(0, 0), BOUNDS, &metrics),
      Some(0)
    );
    assert_eq!(
      cell_index_at(at(2, 3), BOUNDS, &metrics),
      Some(17)
    );
    assert_eq!(
      cell_index_at(
        PointerPosition { x: -40.0, y: 5.0 },
        BOUNDS,
        &metrics
      ),
      Some(0)
    );
    assert_eq!(
      cell_index_at(
        PointerPosition {
          x: 9_000.0,
          y: 9_000.0
        },
        BOUNDS,
        &metrics
      ),
      Some(41)
    );
    assert_eq!(
      cell_index_at(
        at(0, 0),
        GridBounds {
          width:  0.0,
          height: 0.0
        },
        &metrics
      ),
      None
    );
  }

  #[test]
  fn selection_creates_normalized_range() {
    let mut controller = controller();
    assert!(controller.press_cell(PRIMARY_BUTTON, day(7)));
    // Aug 8 is row 1, col 4.
    assert!(controller.pointer_move(at(1, 4), BOUNDS));
    assert_eq!(
      controller.selection(),
      Some(DateRange::new(day(7), day(8)))
    );
    assert_eq!(
      controller.end_gesture(),
      GestureOutcome::SelectionComplete(
        DateRange::new(day(7), day(8))
      )
    );
    assert!(controller.is_idle());
  }

  #[test]
  fn backwards_drag_is_normalized() {
    let mut controller = controller();
    controller.press_cell(PRIMARY_BUTTON, day(14));
    // Aug 5 is row 1, col 1.
    controller.pointer_move(at(1, 1), BOUNDS);
    assert_eq!(
      controller.pointer_leave(),
      GestureOutcome::SelectionComplete(
        DateRange::new(day(5), day(14))
      )
    );
  }

  #[test]
  fn secondary_button_does_not_select() {
    let mut controller = controller();
    assert!(!controller.press_cell(2, day(7)));
    assert!(controller.is_idle());
    assert_eq!(
      controller.end_gesture(),
      GestureOutcome::None
    );
  }

  #[test]
  fn move_commits_on_cell_drop() {
    let mut controller = controller();
    let original = task(day(12), day(15));
    assert!(controller.begin_move(&original));
    assert!(controller.drag_over(Some(day(20))));
    assert_eq!(
      controller.preview(),
      Some(("t", DateRange::new(day(20), day(23))))
    );
    // Release events during a drag do not
    // end it.
    assert_eq!(
      controller.end_gesture(),
      GestureOutcome::None
    );
    assert_eq!(
      controller.drop_on(Some(day(20))),
      GestureOutcome::Moved {
        task_id:   "t".to_string(),
        new_start: day(20)
      }
    );
    assert!(controller.is_idle());
  }

  #[test]
  fn move_dropped_outside_is_abandoned() {
    let mut controller = controller();
    controller.begin_move(&task(day(12), day(15)));
    controller.drag_over(Some(day(20)));
    controller.drag_over(None);
    assert_eq!(controller.preview(), None);
    assert_eq!(
      controller.drop_on(None),
      GestureOutcome::MoveAbandoned {
        task_id: "t".to_string()
      }
    );
    assert_eq!(
      controller.drop_on(None),
      GestureOutcome::None
    );
  }

  #[test]
  fn left_resize_stops_before_end() {
    let mut controller = controller();
    controller.begin_resize(
      &task(day(12), day(15)),
      ResizeEdge::Left
    );
    // Aug 10 is row 1, col 6.
    assert!(controller.pointer_move(at(1, 6), BOUNDS));
    // Aug 15 (row 2, col 4) equals the end.
    assert!(!controller.pointer_move(at(2, 4), BOUNDS));
    // Aug 17 is past the end.
    assert!(!controller.pointer_move(at(2, 6), BOUNDS));
    assert_eq!(
      controller.end_gesture(),
      GestureOutcome::Resized {
        task_id: "t".to_string(),
        range:   DateRange::new(day(10), day(15))
      }
    );
  }

  #[test]
  fn right_resize_stops_after_start() {
    let mut controller = controller();
    controller.begin_resize(
      &task(day(12), day(15)),
      ResizeEdge::Right
    );
    // Aug 21 is row 3, col 3.
    controller.pointer_move(at(3, 3), BOUNDS);
    // Aug 12 equals the start; Aug 4 is
    // before it.
    controller.pointer_move(at(2, 1), BOUNDS);
    controller.pointer_move(at(1, 0), BOUNDS);
    assert_eq!(
      controller.pointer_leave(),
      GestureOutcome::Resized {
        task_id: "t".to_string(),
        range:   DateRange::new(day(12), day(21))
      }
    );
  }

  #[test]
  fn resize_never_yields_inverted_range() {
    for edge in [ResizeEdge::Left, ResizeEdge::Right] {
      for row in 0..GRID_WEEKS {
        for col in 0..DAYS_PER_WEEK {
          let mut controller = controller();
          controller
            .begin_resize(&task(day(12), day(12)), edge);
          controller.pointer_move(at(row, col), BOUNDS);
          controller.pointer_move(at(5 - row, 6 - col), BOUNDS);
          match controller.end_gesture() {
            | GestureOutcome::Resized { range, .. } => {
              assert!(range.start <= range.end);
            }
            | other => {
              panic!("unexpected outcome {other:?}")
            }
          }
        }
      }
    }
  }

  #[test]
  fn cancel_discards_without_commit() {
    let mut controller = controller();
    controller.press_cell(PRIMARY_BUTTON, day(3));
    assert_eq!(
      controller.cancel(),
      GestureOutcome::Cancelled
    );
    assert_eq!(
      controller.end_gesture(),
      GestureOutcome::None
    );
    assert_eq!(controller.cancel(), GestureOutcome::None);
  }

  #[test]
  fn only_one_gesture_at_a_time() {
    let mut controller = controller();
    let bar = task(day(12), day(15));
    controller.press_cell(PRIMARY_BUTTON, day(3));
    assert!(!controller.begin_move(&bar));
    assert!(
      !controller.begin_resize(&bar, ResizeEdge::Left)
    );
    assert!(!controller.press_cell(PRIMARY_BUTTON, day(9)));
    assert_eq!(
      controller.selection(),
      Some(DateRange::new(day(3), day(3)))
    );
  }
}
