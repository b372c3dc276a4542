use std::cell::RefCell;
use std::rc::Rc;

use chrono::{
  Datelike,
  Local,
  NaiveDate
};
use gloo::console::log;
use gloo::events::EventListener;
use monthplan_core::config::PlannerConfig;
use monthplan_core::filter::{
  FilterCriteria,
  visible_tasks
};
use monthplan_core::grid::{
  build_cells,
  calendar_days,
  first_day_of_month,
  format_month_year,
  grid_start,
  shift_months,
  weekday_labels
};
use monthplan_core::interaction::{
  Gesture,
  GestureOutcome,
  InteractionController,
  ResizeEdge
};
use monthplan_core::layout::layout_tasks;
use monthplan_core::store::TaskStore;
use monthplan_core::task::{
  Category,
  Task
};
use wasm_bindgen::JsCast;
use web_sys::KeyboardEvent;
use yew::{
  Callback,
  Html,
  function_component,
  html,
  use_effect_with,
  use_force_update,
  use_mut_ref,
  use_state
};

use crate::components::{
  CalendarGrid,
  FilterPanel,
  GridPointer,
  ModalMode,
  ModalState,
  TaskModal
};
use crate::storage::LocalStorageBackend;

type Store = TaskStore<LocalStorageBackend>;
type SharedStore =
  Rc<RefCell<Result<Store, String>>>;
type SharedController =
  Rc<RefCell<InteractionController>>;

fn open_store(
  config: &PlannerConfig
) -> Result<Store, String> {
  TaskStore::load(
    LocalStorageBackend,
    &config.storage_key
  )
  .map_err(|err| {
    tracing::error!(error = %format!("{err:#}"), "failed loading saved tasks");
    format!("{err:#}")
  })
}

fn today() -> NaiveDate {
  Local::now().date_naive()
}

fn month_of(day: NaiveDate) -> NaiveDate {
  first_day_of_month(day.year(), day.month())
}

/// Runs `f` against the store when it
/// loaded. Errors are logged.
fn with_store<T>(
  store: &SharedStore,
  f: impl FnOnce(
    &mut Store
  ) -> anyhow::Result<T>
) -> Option<T> {
  let mut guard = store.borrow_mut();
  let Ok(store) = guard.as_mut() else {
    return None;
  };
  match f(store) {
    | Ok(value) => Some(value),
    | Err(err) => {
      tracing::error!(error = %format!("{err:#}"), "task store update failed");
      None
    }
  }
}

#[function_component(App)]
pub fn app() -> Html {
  let config = use_state(
    PlannerConfig::load_embedded
  );
  let week_start = config.week_start_day();
  let today = *use_state(today);
  let focus = {
    let initial = config
      .initial_focus()
      .unwrap_or_else(|| month_of(today));
    use_state(move || initial)
  };
  let criteria =
    use_state(FilterCriteria::default);
  let modal =
    use_state(|| None::<ModalState>);

  let store: SharedStore = {
    let config = (*config).clone();
    use_mut_ref(move || open_store(&config))
  };
  let controller: SharedController = {
    let days =
      calendar_days(*focus, week_start);
    let grid = config.grid;
    use_mut_ref(move || {
      InteractionController::new(days, grid)
    })
  };
  let force_update = use_force_update();
  let redraw = {
    let force_update = force_update.clone();
    Callback::from(move |()| {
      force_update.force_update();
    })
  };

  {
    let controller = controller.clone();
    use_effect_with(*focus, move |focus| {
      controller.borrow_mut().set_days(
        calendar_days(*focus, week_start)
      );
      || ()
    });
  }

  let handle_outcome = {
    let store = store.clone();
    let modal = modal.clone();
    let redraw = redraw.clone();
    Callback::from(
      move |outcome: GestureOutcome| {
        match outcome {
          | GestureOutcome::None => return,
          | GestureOutcome::SelectionComplete(range) => {
            log!(format!("selected {} to {}", range.start, range.end));
            modal.set(Some(ModalState::create(range)));
          }
          | GestureOutcome::Moved {
            task_id,
            new_start
          } => {
            with_store(&store, |store| {
              store.move_task(&task_id, new_start)
            });
          }
          | GestureOutcome::MoveAbandoned {
            task_id
          } => {
            tracing::debug!(%task_id, "move abandoned");
          }
          | GestureOutcome::Resized {
            task_id,
            range
          } => {
            with_store(&store, |store| {
              store.resize(
                &task_id,
                range.start,
                range.end
              )
            });
          }
          | GestureOutcome::Cancelled => {
            tracing::debug!("gesture cancelled");
          }
        }
        redraw.emit(());
      }
    )
  };

  {
    let controller = controller.clone();
    let handle_outcome = handle_outcome.clone();
    let modal = modal.clone();
    use_effect_with((), move |_| {
      let listener =
        web_sys::window()
          .and_then(|window| window.document())
          .map(|document| {
            EventListener::new(
              &document,
              "keydown",
              move |event| {
                let is_escape = event
                  .dyn_ref::<KeyboardEvent>()
                  .is_some_and(|event| {
                    event.key() == "Escape"
                  });
                if !is_escape {
                  return;
                }
                let outcome =
                  controller.borrow_mut().cancel();
                if outcome == GestureOutcome::None {
                  modal.set(None);
                } else {
                  handle_outcome.emit(outcome);
                }
              }
            )
          });
      move || drop(listener)
    });
  }

  let store_guard = store.borrow();
  let tasks = match &*store_guard {
    | Ok(store) => store.tasks().to_vec(),
    | Err(message) => {
      return html! {
          <div class="fatal">
              <div class="header">{ "Could not load saved tasks" }</div>
              <p>{ "The saved task list is unreadable and has been left untouched." }</p>
              <pre>{ message.clone() }</pre>
          </div>
      };
    }
  };
  drop(store_guard);

  let controller_view = controller.borrow();
  let mut visible =
    visible_tasks(&tasks, &criteria, today);
  if let Some((id, range)) =
    controller_view.preview()
    && let Some(task) = visible
      .iter_mut()
      .find(|task| task.id == id)
  {
    task.start = range.start;
    task.end = range.end;
  }
  let pending_selection =
    match (*modal).as_ref().map(|m| &m.mode) {
      | Some(ModalMode::Create { range }) => {
        Some(*range)
      }
      | _ => None
    };
  let selection = controller_view
    .selection()
    .or(pending_selection);
  let dragging_task =
    match controller_view.gesture() {
      | Gesture::Moving {
        task_id,
        ..
      } => Some(task_id.clone()),
      | _ => None
    };
  drop(controller_view);

  let cells = build_cells(
    *focus,
    week_start,
    today,
    selection
  );
  let bars: Vec<(_, Task)> = layout_tasks(
    &visible,
    grid_start(*focus, week_start),
    &config.layout
  )
  .into_iter()
  .map(|placement| {
    let task =
      visible[placement.task_index].clone();
    (placement, task)
  })
  .collect();

  let on_prev = {
    let focus = focus.clone();
    Callback::from(move |()| {
      focus.set(shift_months(*focus, -1));
    })
  };
  let on_next = {
    let focus = focus.clone();
    Callback::from(move |()| {
      focus.set(shift_months(*focus, 1));
    })
  };
  let on_today = {
    let focus = focus.clone();
    Callback::from(move |()| {
      focus.set(month_of(today));
    })
  };

  let on_cell_press = {
    let controller = controller.clone();
    let redraw = redraw.clone();
    Callback::from(
      move |(button, date): (i16, NaiveDate)| {
        if controller
          .borrow_mut()
          .press_cell(button, date)
        {
          redraw.emit(());
        }
      }
    )
  };

  let on_pointer_move = {
    let controller = controller.clone();
    let redraw = redraw.clone();
    Callback::from(
      move |(pos, bounds): GridPointer| {
        if controller
          .borrow_mut()
          .pointer_move(pos, bounds)
        {
          redraw.emit(());
        }
      }
    )
  };

  let on_release = {
    let controller = controller.clone();
    let handle_outcome = handle_outcome.clone();
    Callback::from(move |()| {
      let outcome =
        controller.borrow_mut().end_gesture();
      handle_outcome.emit(outcome);
    })
  };

  let on_leave = {
    let controller = controller.clone();
    let handle_outcome = handle_outcome.clone();
    Callback::from(move |()| {
      let outcome =
        controller.borrow_mut().pointer_leave();
      handle_outcome.emit(outcome);
    })
  };

  let on_drag_over = {
    let controller = controller.clone();
    let redraw = redraw.clone();
    Callback::from(
      move |(pos, bounds): GridPointer| {
        let mut controller =
          controller.borrow_mut();
        let date = controller.date_at(pos, bounds);
        if controller.drag_over(date) {
          drop(controller);
          redraw.emit(());
        }
      }
    )
  };

  let on_drop = {
    let controller = controller.clone();
    let handle_outcome = handle_outcome.clone();
    Callback::from(
      move |(pos, bounds): GridPointer| {
        let outcome = {
          let mut controller =
            controller.borrow_mut();
          let date =
            controller.date_at(pos, bounds);
          controller.drop_on(date)
        };
        handle_outcome.emit(outcome);
      }
    )
  };

  let find_task = {
    let store = store.clone();
    move |id: &str| -> Option<Task> {
      store
        .borrow()
        .as_ref()
        .ok()
        .and_then(|store| store.get(id).cloned())
    }
  };

  let on_drag_start = {
    let controller = controller.clone();
    let find_task = find_task.clone();
    let redraw = redraw.clone();
    Callback::from(move |id: String| {
      let Some(task) = find_task(&id) else {
        return;
      };
      if controller.borrow_mut().begin_move(&task)
      {
        redraw.emit(());
      }
    })
  };

  // Fires after `drop`; only a drag that
  // never landed on the grid is still
  // active here.
  let on_drag_end = {
    let controller = controller.clone();
    let handle_outcome = handle_outcome.clone();
    Callback::from(move |()| {
      let outcome =
        controller.borrow_mut().drop_on(None);
      handle_outcome.emit(outcome);
    })
  };

  let on_resize_start = {
    let controller = controller.clone();
    let find_task = find_task.clone();
    let redraw = redraw.clone();
    Callback::from(
      move |(id, edge): (String, ResizeEdge)| {
        let Some(task) = find_task(&id) else {
          return;
        };
        if controller
          .borrow_mut()
          .begin_resize(&task, edge)
        {
          redraw.emit(());
        }
      }
    )
  };

  let on_bar_click = {
    let modal = modal.clone();
    let find_task = find_task.clone();
    Callback::from(move |id: String| {
      if let Some(task) = find_task(&id) {
        modal.set(Some(ModalState::edit(task)));
      }
    })
  };

  let on_delete = {
    let store = store.clone();
    let modal = modal.clone();
    let redraw = redraw.clone();
    Callback::from(move |id: String| {
      with_store(&store, |store| {
        store.delete(&id)
      });
      if let Some(state) = (*modal).as_ref()
        && matches!(&state.mode, ModalMode::Edit { task } if task.id == id)
      {
        modal.set(None);
      }
      redraw.emit(());
    })
  };

  let on_criteria_change = {
    let criteria = criteria.clone();
    Callback::from(
      move |next: FilterCriteria| {
        criteria.set(next);
      }
    )
  };

  let modal_view = (*modal).as_ref().map(|state| {
    let on_name_input = {
      let modal = modal.clone();
      Callback::from(move |name: String| {
        if let Some(state) = (*modal).as_ref() {
          let mut next = state.clone();
          next.draft_name = name;
          modal.set(Some(next));
        }
      })
    };
    let on_category_change = {
      let modal = modal.clone();
      Callback::from(
        move |category: Option<Category>| {
          if let Some(state) = (*modal).as_ref() {
            let mut next = state.clone();
            next.draft_category = category;
            modal.set(Some(next));
          }
        }
      )
    };
    let on_submit = {
      let modal = modal.clone();
      let store = store.clone();
      let redraw = redraw.clone();
      Callback::from(move |()| {
        let Some(state) = (*modal).as_ref() else {
          return;
        };
        let result = submit_modal(&store, state);
        match result {
          | Ok(()) => modal.set(None),
          | Err(message) => {
            let mut next = state.clone();
            next.error = Some(message);
            modal.set(Some(next));
          }
        }
        redraw.emit(());
      })
    };
    let on_close = {
      let modal = modal.clone();
      Callback::from(move |()| {
        modal.set(None);
      })
    };

    html! {
        <TaskModal
            state={state.clone()}
            {on_name_input}
            {on_category_change}
            {on_submit}
            on_delete={on_delete.clone()}
            {on_close}
        />
    }
  });

  html! {
      <div class="app">
          <FilterPanel
              criteria={(*criteria).clone()}
              on_change={on_criteria_change}
          />
          <CalendarGrid
              month_label={format_month_year(*focus)}
              weekday_labels={weekday_labels(week_start).to_vec()}
              cells={cells}
              bars={bars}
              bar_height={config.layout.bar_height}
              dragging_task={dragging_task}
              {on_prev}
              {on_today}
              {on_next}
              {on_cell_press}
              {on_pointer_move}
              {on_release}
              {on_leave}
              {on_drag_over}
              {on_drop}
              {on_drag_start}
              {on_drag_end}
              {on_resize_start}
              {on_bar_click}
              on_bar_delete={on_delete}
          />
          { modal_view.unwrap_or_default() }
      </div>
  }
}

/// Applies the modal form to the store.
/// `Err` carries the message shown inline.
fn submit_modal(
  store: &SharedStore,
  state: &ModalState
) -> Result<(), String> {
  let mut guard = store.borrow_mut();
  let store = guard
    .as_mut()
    .map_err(|message| message.clone())?;

  match &state.mode {
    | ModalMode::Create { range } => store
      .create(&state.draft(), Some(*range))
      .map(|_| ())
      .map_err(|err| err.to_string()),
    | ModalMode::Edit { task } => {
      let patch = state
        .patch()
        .map_err(|err| err.to_string())?;
      store
        .update(&task.id, &patch)
        .map(|_| ())
        .map_err(|err| err.to_string())
    }
  }
}
