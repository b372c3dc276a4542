use chrono::NaiveDate;
use monthplan_core::grid::CalendarCell;
use monthplan_core::interaction::{
  GridBounds,
  PointerPosition,
  ResizeEdge
};
use monthplan_core::layout::Placement;
use monthplan_core::task::Task;
use web_sys::{
  DragEvent,
  Element,
  MouseEvent
};
use yew::{
  Callback,
  Html,
  NodeRef,
  Properties,
  function_component,
  html,
  use_node_ref
};

use super::{
  CalendarDay,
  TaskBar
};

/// Pointer position and grid size
/// measured against the grid element.
pub type GridPointer =
  (PointerPosition, GridBounds);

fn measure(
  grid: &NodeRef,
  event: &MouseEvent
) -> Option<GridPointer> {
  let element = grid.cast::<Element>()?;
  let rect =
    element.get_bounding_client_rect();
  Some((
    PointerPosition {
      x: f64::from(event.client_x())
        - rect.left(),
      y: f64::from(event.client_y())
        - rect.top()
    },
    GridBounds {
      width:  rect.width(),
      height: rect.height()
    }
  ))
}

#[derive(Properties, PartialEq)]
pub struct CalendarGridProps {
  pub month_label:      String,
  pub weekday_labels:   Vec<&'static str>,
  pub cells:            Vec<CalendarCell>,
  pub bars:             Vec<(Placement, Task)>,
  pub bar_height:       f64,
  pub dragging_task:    Option<String>,
  pub on_prev:          Callback<()>,
  pub on_today:         Callback<()>,
  pub on_next:          Callback<()>,
  pub on_cell_press:
    Callback<(i16, NaiveDate)>,
  pub on_pointer_move:  Callback<GridPointer>,
  pub on_release:       Callback<()>,
  pub on_leave:         Callback<()>,
  pub on_drag_over:     Callback<GridPointer>,
  pub on_drop:          Callback<GridPointer>,
  pub on_drag_start:    Callback<String>,
  pub on_drag_end:      Callback<()>,
  pub on_resize_start:
    Callback<(String, ResizeEdge)>,
  pub on_bar_click:     Callback<String>,
  pub on_bar_delete:    Callback<String>
}

#[function_component(CalendarGrid)]
pub fn calendar_grid(
  props: &CalendarGridProps
) -> Html {
  let grid_ref = use_node_ref();

  let onmousemove = {
    let grid_ref = grid_ref.clone();
    let on_pointer_move =
      props.on_pointer_move.clone();
    Callback::from(
      move |event: MouseEvent| {
        if let Some(pointer) =
          measure(&grid_ref, &event)
        {
          on_pointer_move.emit(pointer);
        }
      }
    )
  };

  let onmouseup = {
    let on_release = props.on_release.clone();
    Callback::from(move |_: MouseEvent| {
      on_release.emit(());
    })
  };

  let onmouseleave = {
    let on_leave = props.on_leave.clone();
    Callback::from(move |_: MouseEvent| {
      on_leave.emit(());
    })
  };

  let ondragover = {
    let grid_ref = grid_ref.clone();
    let on_drag_over =
      props.on_drag_over.clone();
    Callback::from(
      move |event: DragEvent| {
        event.prevent_default();
        if let Some(pointer) =
          measure(&grid_ref, &event)
        {
          on_drag_over.emit(pointer);
        }
      }
    )
  };

  let ondrop = {
    let grid_ref = grid_ref.clone();
    let on_drop = props.on_drop.clone();
    Callback::from(
      move |event: DragEvent| {
        event.prevent_default();
        if let Some(pointer) =
          measure(&grid_ref, &event)
        {
          on_drop.emit(pointer);
        }
      }
    )
  };

  let nav = |callback: &Callback<()>| {
    let callback = callback.clone();
    Callback::from(move |_: MouseEvent| {
      callback.emit(());
    })
  };

  html! {
      <div class="panel calendar-panel">
          <div class="calendar-header">
              <div class="calendar-title">{ &props.month_label }</div>
              <div class="actions calendar-nav-actions">
                  <button class="btn" onclick={nav(&props.on_prev)}>{ "Prev" }</button>
                  <button class="btn" onclick={nav(&props.on_today)}>{ "Today" }</button>
                  <button class="btn" onclick={nav(&props.on_next)}>{ "Next" }</button>
              </div>
          </div>
          <div
              class="calendar-grid"
              ref={grid_ref}
              {onmousemove}
              {onmouseup}
              {onmouseleave}
              {ondragover}
              {ondrop}
          >
              <div class="calendar-weekday-row">
                  {
                      for props.weekday_labels.iter().map(|label| html! {
                          <div class="calendar-weekday">{ *label }</div>
                      })
                  }
              </div>
              <div class="calendar-month-grid">
                  {
                      for props.cells.iter().map(|cell| html! {
                          <CalendarDay
                              key={cell.date.to_string()}
                              cell={*cell}
                              on_press={props.on_cell_press.clone()}
                          />
                      })
                  }
              </div>
              {
                  for props.bars.iter().map(|(placement, task)| html! {
                      <TaskBar
                          key={format!("{}-{}", placement.task_id, placement.week)}
                          placement={placement.clone()}
                          task={task.clone()}
                          bar_height={props.bar_height}
                          is_dragging={props.dragging_task.as_deref() == Some(task.id.as_str())}
                          on_drag_start={props.on_drag_start.clone()}
                          on_drag_end={props.on_drag_end.clone()}
                          on_resize_start={props.on_resize_start.clone()}
                          on_click={props.on_bar_click.clone()}
                          on_delete={props.on_bar_delete.clone()}
                      />
                  })
              }
          </div>
      </div>
  }
}
