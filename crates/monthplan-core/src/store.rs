use std::collections::BTreeMap;

use anyhow::Context;
use chrono::NaiveDate;
use tracing::{
  debug,
  info,
  warn
};
use uuid::Uuid;

use crate::grid::add_days;
use crate::task::{
  Category,
  DateRange,
  Task,
  TaskDraft,
  TaskPatch,
  TaskRecord
};

/// A string key-value store that holds
/// the serialized task list.
pub trait KeyValueStore {
  fn get(
    &self,
    key: &str
  ) -> anyhow::Result<Option<String>>;

  fn set(
    &mut self,
    key: &str,
    value: &str
  ) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
  entries: BTreeMap<String, String>
}

impl MemoryStore {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  #[must_use]
  pub fn with_entry(
    key: &str,
    value: &str
  ) -> Self {
    let mut entries = BTreeMap::new();
    entries
      .insert(key.to_string(), value.to_string());
    Self { entries }
  }
}

impl KeyValueStore for MemoryStore {
  fn get(
    &self,
    key: &str
  ) -> anyhow::Result<Option<String>> {
    Ok(self.entries.get(key).cloned())
  }

  fn set(
    &mut self,
    key: &str,
    value: &str
  ) -> anyhow::Result<()> {
    self
      .entries
      .insert(key.to_string(), value.to_string());
    Ok(())
  }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
  #[error("Please enter a task name")]
  MissingName,
  #[error("Please choose a category")]
  MissingCategory,
  #[error(
    "Select a date range on the calendar \
     first"
  )]
  MissingSelection,
  #[error(transparent)]
  Persist(#[from] anyhow::Error)
}

/// Owns the task list and rewrites it to
/// the backend after every mutation.
#[derive(Debug, Clone)]
pub struct TaskStore<S> {
  backend: S,
  key:     String,
  tasks:   Vec<Task>
}

impl<S: KeyValueStore> TaskStore<S> {
  /// Reads the list stored under `key`.
  /// A missing entry seeds the
  /// demonstration tasks and persists
  /// them; a malformed entry is an error
  /// and is left untouched.
  #[tracing::instrument(skip(backend))]
  pub fn load(
    backend: S,
    key: &str
  ) -> anyhow::Result<Self> {
    let raw =
      backend.get(key).with_context(|| {
        format!(
          "failed to read stored tasks \
           under {key:?}"
        )
      })?;

    let mut store = Self {
      backend,
      key: key.to_string(),
      tasks: Vec::new()
    };

    match raw {
      | Some(raw) => {
        store.tasks = decode_tasks(&raw)
          .with_context(|| {
            format!(
              "failed to parse stored \
               tasks under {key:?}"
            )
          })?;
        info!(
          count = store.tasks.len(),
          "loaded stored tasks"
        );
      }
      | None => {
        store.tasks = seed_tasks();
        info!(
          count = store.tasks.len(),
          "no stored tasks; seeding \
           demonstration set"
        );
        store.persist()?;
      }
    }

    Ok(store)
  }

  #[must_use]
  pub fn tasks(&self) -> &[Task] {
    &self.tasks
  }

  #[must_use]
  pub fn get(
    &self,
    id: &str
  ) -> Option<&Task> {
    self.tasks.iter().find(|task| task.id == id)
  }

  #[must_use]
  pub fn backend(&self) -> &S {
    &self.backend
  }

  /// Creates a task over the pending
  /// selection. Nothing changes when the
  /// draft or selection is incomplete.
  #[tracing::instrument(skip(self))]
  pub fn create(
    &mut self,
    draft: &TaskDraft,
    selection: Option<DateRange>
  ) -> Result<Task, StoreError> {
    let name = validate_name(&draft.name)?;
    let category = draft
      .category
      .ok_or(StoreError::MissingCategory)?;
    let range = selection
      .ok_or(StoreError::MissingSelection)?;

    let task = Task {
      id: Uuid::new_v4().to_string(),
      name,
      category: category.into(),
      start: range.start,
      end: range.end
    };

    let previous = self.tasks.clone();
    self.tasks.push(task.clone());
    self.commit(previous)?;
    info!(id = %task.id, "created task");
    Ok(task)
  }

  /// Applies `patch` to the task with
  /// `id`. Returns `false` when no such
  /// task exists.
  #[tracing::instrument(skip(self))]
  pub fn update(
    &mut self,
    id: &str,
    patch: &TaskPatch
  ) -> Result<bool, StoreError> {
    let previous = self.tasks.clone();
    let Some(task) = self
      .tasks
      .iter_mut()
      .find(|task| task.id == id)
    else {
      debug!("update for unknown task");
      return Ok(false);
    };

    let name = patch
      .name
      .as_deref()
      .map(validate_name)
      .transpose()?;
    if let Some(name) = name {
      task.name = name;
    }
    if let Some(category) = patch.category {
      task.category = category.into();
    }

    self.commit(previous)?;
    Ok(true)
  }

  #[tracing::instrument(skip(self))]
  pub fn delete(
    &mut self,
    id: &str
  ) -> anyhow::Result<bool> {
    let previous = self.tasks.clone();
    self.tasks.retain(|task| task.id != id);
    if self.tasks.len() == previous.len() {
      debug!("delete for unknown task");
      return Ok(false);
    }

    self.commit(previous)?;
    info!("deleted task");
    Ok(true)
  }

  /// Moves a task so it starts on
  /// `new_start`, keeping its length.
  #[tracing::instrument(skip(self))]
  pub fn move_task(
    &mut self,
    id: &str,
    new_start: NaiveDate
  ) -> anyhow::Result<bool> {
    let previous = self.tasks.clone();
    let Some(task) = self
      .tasks
      .iter_mut()
      .find(|task| task.id == id)
    else {
      debug!("move for unknown task");
      return Ok(false);
    };

    let span = (task.end - task.start).num_days();
    task.start = new_start;
    task.end = add_days(new_start, span);

    self.commit(previous)?;
    Ok(true)
  }

  /// Replaces both bounds. Callers are
  /// expected to pass `new_start <=
  /// new_end`.
  #[tracing::instrument(skip(self))]
  pub fn resize(
    &mut self,
    id: &str,
    new_start: NaiveDate,
    new_end: NaiveDate
  ) -> anyhow::Result<bool> {
    if new_start > new_end {
      warn!(
        %new_start,
        %new_end,
        "resize called with an inverted \
         range"
      );
    }

    let previous = self.tasks.clone();
    let Some(task) = self
      .tasks
      .iter_mut()
      .find(|task| task.id == id)
    else {
      debug!("resize for unknown task");
      return Ok(false);
    };

    task.start = new_start;
    task.end = new_end;

    self.commit(previous)?;
    Ok(true)
  }

  /// Persists the current list. On a
  /// failed write `previous` is restored.
  fn commit(
    &mut self,
    previous: Vec<Task>
  ) -> anyhow::Result<()> {
    if let Err(error) = self.persist() {
      self.tasks = previous;
      return Err(error);
    }
    Ok(())
  }

  #[tracing::instrument(skip(self), fields(key = %self.key, count = self.tasks.len()))]
  fn persist(&mut self) -> anyhow::Result<()> {
    let raw = encode_tasks(&self.tasks)?;
    self
      .backend
      .set(&self.key, &raw)
      .with_context(|| {
        format!(
          "failed to write tasks under \
           {:?}",
          self.key
        )
      })?;
    debug!("persisted tasks");
    Ok(())
  }
}

fn validate_name(
  raw: &str
) -> Result<String, StoreError> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    return Err(StoreError::MissingName);
  }
  Ok(trimmed.to_string())
}

pub fn encode_tasks(
  tasks: &[Task]
) -> anyhow::Result<String> {
  let records: Vec<TaskRecord> =
    tasks.iter().map(TaskRecord::from).collect();
  serde_json::to_string(&records)
    .context("failed to serialize tasks")
}

pub fn decode_tasks(
  raw: &str
) -> anyhow::Result<Vec<Task>> {
  let records: Vec<TaskRecord> =
    serde_json::from_str(raw)?;
  Ok(records.into_iter().map(Task::from).collect())
}

/// The six tasks shown on first launch.
#[must_use]
pub fn seed_tasks() -> Vec<Task> {
  let august = |day: u32| {
    NaiveDate::from_ymd_opt(2024, 8, day)
      .unwrap_or(NaiveDate::MIN)
  };
  let seed = |id: &str,
              name: &str,
              category: Category,
              start: u32,
              end: u32| {
    Task {
      id: id.to_string(),
      name: name.to_string(),
      category: category.into(),
      start: august(start),
      end: august(end)
    }
  };

  vec![
    seed("task5", "TASK 5", Category::ToDo, 7, 8),
    seed(
      "task1",
      "Task 1",
      Category::InProgress,
      12,
      15
    ),
    seed("task4", "TASK 4", Category::Review, 13, 15),
    seed(
      "task3",
      "TASK 3",
      Category::Completed,
      14,
      15
    ),
    seed("task2", "TASK 2", Category::ToDo, 18, 20),
    seed(
      "task6",
      "TASK 6",
      Category::InProgress,
      28,
      29
    ),
  ]
}
