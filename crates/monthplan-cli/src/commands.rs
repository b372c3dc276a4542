use std::io::Write;

use anyhow::{anyhow, bail};
use chrono::{Datelike, NaiveDate};
use monthplan_core::config::{PlannerConfig, parse_month};
use monthplan_core::filter::{FilterCriteria, TimeWindow, visible_tasks};
use monthplan_core::grid::first_day_of_month;
use monthplan_core::store::{KeyValueStore, TaskStore};
use monthplan_core::task::{DateRange, TaskDraft, TaskPatch, TaskRecord};
use tracing::{debug, info};

use crate::cli::Command;
use crate::render::Renderer;

#[tracing::instrument(skip(store, cfg, renderer, out))]
pub fn dispatch<S: KeyValueStore, W: Write>(
    store: &mut TaskStore<S>,
    cfg: &PlannerConfig,
    renderer: &Renderer,
    command: Command,
    today: NaiveDate,
    out: &mut W,
) -> anyhow::Result<()> {
    match command {
        Command::List {
            categories,
            within,
            search,
            json,
        } => {
            let criteria = FilterCriteria {
                categories: categories.into_iter().collect(),
                time_window: within.and_then(TimeWindow::from_weeks),
                search_term: search.unwrap_or_default(),
            };
            debug!(?criteria, "listing tasks");
            let visible = visible_tasks(store.tasks(), &criteria, today);

            if json {
                let records: Vec<TaskRecord> = visible.iter().map(TaskRecord::from).collect();
                writeln!(out, "{}", serde_json::to_string_pretty(&records)?)?;
            } else {
                renderer.print_task_table(out, &visible)?;
            }
        }
        Command::Add {
            name,
            category,
            start,
            end,
        } => {
            let range = DateRange::new(start, end);
            let task = store.create(&TaskDraft::new(name, category), Some(range))?;
            info!(id = %task.id, "added task");
            writeln!(out, "Created task {}.", task.id)?;
        }
        Command::Edit { id, name, category } => {
            if name.is_none() && category.is_none() {
                bail!("nothing to change; pass --name or --category");
            }
            let patch = TaskPatch { name, category };
            if !store.update(&id, &patch)? {
                return Err(unknown_task(&id));
            }
            print_updated(store, renderer, &id, out)?;
        }
        Command::Move { id, start } => {
            if !store.move_task(&id, start)? {
                return Err(unknown_task(&id));
            }
            print_updated(store, renderer, &id, out)?;
        }
        Command::Resize { id, start, end } => {
            if start > end {
                bail!("start {start} is after end {end}");
            }
            if !store.resize(&id, start, end)? {
                return Err(unknown_task(&id));
            }
            print_updated(store, renderer, &id, out)?;
        }
        Command::Delete { id } => {
            if !store.delete(&id)? {
                return Err(unknown_task(&id));
            }
            writeln!(out, "Deleted task {id}.")?;
        }
        Command::Month { month } => {
            let focus = match month {
                Some(raw) => parse_month(&raw)
                    .ok_or_else(|| anyhow!("invalid month {raw:?}; expected YYYY-MM"))?,
                None => first_day_of_month(today.year(), today.month()),
            };
            renderer.print_month(
                out,
                focus,
                cfg.week_start_day(),
                today,
                store.tasks(),
                &cfg.layout,
            )?;
        }
    }

    Ok(())
}

fn print_updated<S: KeyValueStore, W: Write>(
    store: &TaskStore<S>,
    renderer: &Renderer,
    id: &str,
    out: &mut W,
) -> anyhow::Result<()> {
    let task = store.get(id).ok_or_else(|| unknown_task(id))?;
    renderer.print_task_info(out, task)
}

fn unknown_task(id: &str) -> anyhow::Error {
    anyhow!("no task with id {id:?}")
}

#[cfg(test)]
mod tests {
    use monthplan_core::store::MemoryStore;
    use monthplan_core::task::Category;

    use super::*;

    fn august(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 8, day).expect("valid date")
    }

    fn seeded() -> TaskStore<MemoryStore> {
        TaskStore::load(MemoryStore::new(), "tasks").expect("load")
    }

    fn run(store: &mut TaskStore<MemoryStore>, command: Command) -> anyhow::Result<String> {
        let mut out = Vec::new();
        dispatch(
            store,
            &PlannerConfig::default(),
            &Renderer::plain(),
            command,
            august(13),
            &mut out,
        )?;
        Ok(String::from_utf8(out).expect("utf8"))
    }

    #[test]
    fn inverted_resize_is_rejected_before_the_store() {
        let mut store = seeded();
        let err = run(
            &mut store,
            Command::Resize {
                id: "task1".to_string(),
                start: august(20),
                end: august(14),
            },
        )
        .expect_err("inverted resize");
        assert!(err.to_string().contains("is after end"));

        let task = store.get("task1").expect("task1");
        assert_eq!((task.start, task.end), (august(12), august(15)));
    }

    #[test]
    fn edit_requires_a_change_and_a_known_id() {
        let mut store = seeded();
        assert!(
            run(
                &mut store,
                Command::Edit {
                    id: "task1".to_string(),
                    name: None,
                    category: None,
                },
            )
            .is_err()
        );

        let err = run(
            &mut store,
            Command::Edit {
                id: "nope".to_string(),
                name: None,
                category: Some(Category::Review),
            },
        )
        .expect_err("unknown id");
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn blank_name_surfaces_store_error() {
        let mut store = seeded();
        let err = run(
            &mut store,
            Command::Add {
                name: "   ".to_string(),
                category: Category::ToDo,
                start: august(1),
                end: august(2),
            },
        )
        .expect_err("blank name");
        assert_eq!(err.to_string(), "Please enter a task name");
        assert_eq!(store.tasks().len(), 6);
    }

    #[test]
    fn list_json_uses_stored_shape() {
        let mut store = seeded();
        let text = run(
            &mut store,
            Command::List {
                categories: vec![Category::Completed],
                within: None,
                search: None,
                json: true,
            },
        )
        .expect("list");
        let records: Vec<serde_json::Value> = serde_json::from_str(&text).expect("json");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["name"], "TASK 3");
        assert_eq!(records[0]["startDate"], "2024-08-14");
        assert_eq!(records[0]["color"], "#10B981");
    }
}
