use chrono::NaiveDate;
use monthplan_core::grid::{
  CalendarCell,
  format_day_number
};
use web_sys::MouseEvent;
use yew::{
  Callback,
  Html,
  Properties,
  classes,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct CalendarDayProps {
  pub cell:     CalendarCell,
  /// `(button, date)` of a press.
  pub on_press: Callback<(i16, NaiveDate)>
}

#[function_component(CalendarDay)]
pub fn calendar_day(
  props: &CalendarDayProps
) -> Html {
  let cell = props.cell;
  let onmousedown = {
    let on_press = props.on_press.clone();
    Callback::from(
      move |event: MouseEvent| {
        // No text selection while
        // dragging out a range.
        event.prevent_default();
        on_press
          .emit((event.button(), cell.date));
      }
    )
  };

  html! {
      <div
          class={classes!(
              "calendar-day-cell",
              (!cell.in_month).then_some("outside"),
              cell.is_today.then_some("today"),
              cell.in_selection.then_some("selected")
          )}
          {onmousedown}
      >
          <div class="calendar-day-label">{ format_day_number(cell.date) }</div>
      </div>
  }
}
