//! Month grid: the 42 days shown for a
//! reference month, starting on the
//! configured first day of the week.

use chrono::{
  Datelike,
  Duration,
  NaiveDate,
  Weekday
};

use crate::task::DateRange;

pub const DAYS_PER_WEEK: usize = 7;
pub const GRID_WEEKS: usize = 6;
pub const GRID_DAYS: usize =
  DAYS_PER_WEEK * GRID_WEEKS;

/// One rendered day of the month grid.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub struct CalendarCell {
  pub date:         NaiveDate,
  pub in_month:     bool,
  pub is_today:     bool,
  pub in_selection: bool
}

#[must_use]
pub fn first_day_of_month(
  year: i32,
  month: u32
) -> NaiveDate {
  NaiveDate::from_ymd_opt(year, month, 1)
    .unwrap_or(NaiveDate::MIN)
}

#[must_use]
pub fn last_day_of_month(
  year: i32,
  month: u32
) -> NaiveDate {
  let (next_year, next_month) =
    if month >= 12 {
      (year.saturating_add(1), 1_u32)
    } else {
      (year, month + 1)
    };
  add_days(
    first_day_of_month(
      next_year, next_month
    ),
    -1
  )
}

#[must_use]
pub fn days_in_month(
  year: i32,
  month: u32
) -> u32 {
  last_day_of_month(year, month).day()
}

#[must_use]
pub fn add_days(
  date: NaiveDate,
  days: i64
) -> NaiveDate {
  date
    .checked_add_signed(Duration::days(
      days
    ))
    .unwrap_or(date)
}

#[must_use]
pub fn start_of_week(
  day: NaiveDate,
  week_start: Weekday
) -> NaiveDate {
  let day_idx = day
    .weekday()
    .num_days_from_monday()
    as i64;
  let start_idx = week_start
    .num_days_from_monday()
    as i64;
  let diff =
    (7 + day_idx - start_idx) % 7;
  add_days(day, -diff)
}

/// Moves `date` by whole months, clamping
/// the day to the target month's length.
#[must_use]
pub fn shift_months(
  date: NaiveDate,
  months: i32
) -> NaiveDate {
  let mut year = date.year();
  let mut month =
    date.month() as i32 + months;

  while month < 1 {
    month += 12;
    year = year.saturating_sub(1);
  }
  while month > 12 {
    month -= 12;
    year = year.saturating_add(1);
  }

  let month = month as u32;
  let day = date
    .day()
    .min(days_in_month(year, month));
  NaiveDate::from_ymd_opt(year, month, day)
    .unwrap_or(date)
}

/// First date shown in the grid for the
/// month containing `reference`.
#[must_use]
pub fn grid_start(
  reference: NaiveDate,
  week_start: Weekday
) -> NaiveDate {
  start_of_week(
    first_day_of_month(
      reference.year(),
      reference.month()
    ),
    week_start
  )
}

#[must_use]
pub fn calendar_days(
  reference: NaiveDate,
  week_start: Weekday
) -> Vec<NaiveDate> {
  let start =
    grid_start(reference, week_start);
  (0..GRID_DAYS as i64)
    .map(|offset| add_days(start, offset))
    .collect()
}

#[must_use]
pub fn build_cells(
  reference: NaiveDate,
  week_start: Weekday,
  today: NaiveDate,
  selection: Option<DateRange>
) -> Vec<CalendarCell> {
  calendar_days(reference, week_start)
    .into_iter()
    .map(|date| {
      CalendarCell {
        date,
        in_month: is_same_month(
          date, reference
        ),
        is_today: is_today(date, today),
        in_selection: selection
          .is_some_and(|range| {
            range.contains(date)
          })
      }
    })
    .collect()
}

#[must_use]
pub fn weekday_labels(
  week_start: Weekday
) -> [&'static str; DAYS_PER_WEEK] {
  match week_start {
    | Weekday::Mon => {
      [
        "MON", "TUE", "WED", "THU",
        "FRI", "SAT", "SUN",
      ]
    }
    | _ => {
      [
        "SUN", "MON", "TUE", "WED",
        "THU", "FRI", "SAT",
      ]
    }
  }
}

#[must_use]
pub fn format_month_year(
  date: NaiveDate
) -> String {
  date.format("%B %Y").to_string()
}

#[must_use]
pub fn format_day_number(
  date: NaiveDate
) -> String {
  date.day().to_string()
}

#[must_use]
pub fn format_iso_date(
  date: NaiveDate
) -> String {
  date.format("%Y-%m-%d").to_string()
}

#[must_use]
pub fn is_same_month(
  date: NaiveDate,
  reference: NaiveDate
) -> bool {
  date.year() == reference.year()
    && date.month() == reference.month()
}

#[must_use]
pub fn is_today(
  date: NaiveDate,
  today: NaiveDate
) -> bool {
  date == today
}
