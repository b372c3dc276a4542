use monthplan_core::grid::format_iso_date;
use monthplan_core::store::StoreError;
use monthplan_core::task::{
  Category,
  DateRange,
  Task,
  TaskDraft,
  TaskPatch
};
use web_sys::{
  Event,
  HtmlInputElement,
  HtmlSelectElement,
  InputEvent,
  MouseEvent
};
use yew::{
  Callback,
  Html,
  Properties,
  TargetCast,
  function_component,
  html
};

#[derive(Clone, Debug, PartialEq)]
pub enum ModalMode {
  Create { range: DateRange },
  Edit { task: Task }
}

/// Form contents of the open modal.
#[derive(Clone, Debug, PartialEq)]
pub struct ModalState {
  pub mode:           ModalMode,
  pub draft_name:     String,
  pub draft_category: Option<Category>,
  pub error:          Option<String>
}

impl ModalState {
  #[must_use]
  pub fn create(range: DateRange) -> Self {
    Self {
      mode:           ModalMode::Create {
        range
      },
      draft_name:     String::new(),
      draft_category: None,
      error:          None
    }
  }

  #[must_use]
  pub fn edit(task: Task) -> Self {
    Self {
      draft_name:     task.name.clone(),
      draft_category: task.category.known(),
      mode:           ModalMode::Edit {
        task
      },
      error:          None
    }
  }

  #[must_use]
  pub fn draft(&self) -> TaskDraft {
    TaskDraft {
      name:     self.draft_name.clone(),
      category: self.draft_category
    }
  }

  /// Edits replace both fields, so an
  /// unset category blocks the save
  /// instead of keeping the old one.
  pub fn patch(
    &self
  ) -> Result<TaskPatch, StoreError> {
    let category = self
      .draft_category
      .ok_or(StoreError::MissingCategory)?;
    Ok(TaskPatch {
      name:     Some(self.draft_name.clone()),
      category: Some(category)
    })
  }
}

#[derive(Properties, PartialEq)]
pub struct TaskModalProps {
  pub state:              ModalState,
  pub on_name_input:      Callback<String>,
  pub on_category_change:
    Callback<Option<Category>>,
  pub on_submit:          Callback<()>,
  pub on_delete:          Callback<String>,
  pub on_close:           Callback<()>
}

#[function_component(TaskModal)]
pub fn task_modal(
  props: &TaskModalProps
) -> Html {
  let state = &props.state;

  let on_name_input = {
    let on_name_input =
      props.on_name_input.clone();
    Callback::from(move |e: InputEvent| {
      let input: HtmlInputElement =
        e.target_unchecked_into();
      on_name_input.emit(input.value());
    })
  };

  let on_category_change = {
    let on_category_change =
      props.on_category_change.clone();
    Callback::from(move |e: Event| {
      if let Some(select) = e
        .target_dyn_into::<HtmlSelectElement>(
        )
      {
        on_category_change.emit(
          Category::from_label(&select.value())
        );
      } else {
        tracing::warn!(
          "category select event had \
           non-select target"
        );
      }
    })
  };

  let on_submit = {
    let on_submit = props.on_submit.clone();
    Callback::from(move |_: MouseEvent| {
      on_submit.emit(());
    })
  };

  let on_close = {
    let on_close = props.on_close.clone();
    Callback::from(move |_: MouseEvent| {
      on_close.emit(());
    })
  };

  let (title, submit_label, details) =
    match &state.mode {
      | ModalMode::Create { range } => {
        (
          "New task",
          "Create",
          html! {
              <div class="modal-dates">
                  { format!("{} to {}", format_iso_date(range.start), format_iso_date(range.end)) }
              </div>
          }
        )
      }
      | ModalMode::Edit { task } => {
        let on_delete = {
          let on_delete =
            props.on_delete.clone();
          let task_id = task.id.clone();
          Callback::from(
            move |_: MouseEvent| {
              on_delete.emit(task_id.clone());
            }
          )
        };
        (
          "Edit task",
          "Save",
          html! {
              <>
                  <dl class="modal-dates">
                      <dt>{ "Start" }</dt>
                      <dd>{ format_iso_date(task.start) }</dd>
                      <dt>{ "End" }</dt>
                      <dd>{ format_iso_date(task.end) }</dd>
                      <dt>{ "Duration" }</dt>
                      <dd>{ format!("{} days", task.duration_days()) }</dd>
                  </dl>
                  <button type="button" class="btn danger" onclick={on_delete}>{ "Delete" }</button>
              </>
          }
        )
      }
    };

  let selected_label = state
    .draft_category
    .map(Category::label)
    .unwrap_or_default();

  html! {
      <div class="modal-backdrop" onclick={on_close.clone()}>
          <div class="modal" onclick={Callback::from(|e: MouseEvent| e.stop_propagation())}>
              <div class="header">{ title }</div>
              <label class="modal-field">
                  <span>{ "Name" }</span>
                  <input
                      type="text"
                      value={state.draft_name.clone()}
                      oninput={on_name_input}
                  />
              </label>
              <label class="modal-field">
                  <span>{ "Category" }</span>
                  <select onchange={on_category_change}>
                      <option value="" selected={selected_label.is_empty()}>{ "Choose a category" }</option>
                      {
                          for Category::ALL.into_iter().map(|category| html! {
                              <option value={category.label()} selected={selected_label == category.label()}>
                                  { category.label() }
                              </option>
                          })
                      }
                  </select>
              </label>
              { details }
              {
                  if let Some(error) = &state.error {
                      html! { <div class="modal-error">{ error }</div> }
                  } else {
                      html! {}
                  }
              }
              <div class="actions">
                  <button type="button" class="btn" onclick={on_close}>{ "Cancel" }</button>
                  <button type="button" class="btn primary" onclick={on_submit}>{ submit_label }</button>
              </div>
          </div>
      </div>
  }
}
