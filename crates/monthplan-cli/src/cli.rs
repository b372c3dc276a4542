use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::anyhow;
use chrono::NaiveDate;
use clap::{ArgAction, Parser, Subcommand};
use monthplan_core::task::{Category, iso_date_serde};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "monthplan",
    version,
    about = "Monthplan: month-view task planner",
    disable_help_subcommand = true
)]
pub struct GlobalCli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count, global = true)]
    pub quiet: u8,

    /// Directory holding the task file.
    #[arg(long = "data", global = true)]
    pub data: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List tasks, optionally filtered.
    List {
        #[arg(long = "category", value_parser = parse_category, action = ArgAction::Append)]
        categories: Vec<Category>,

        /// Only tasks starting or ending within N weeks of today.
        #[arg(long = "within", value_parser = clap::value_parser!(i64).range(1..=3))]
        within: Option<i64>,

        #[arg(long = "search")]
        search: Option<String>,

        /// Print the stored records as JSON.
        #[arg(long = "json")]
        json: bool,
    },
    /// Create a task over a date range.
    Add {
        #[arg(long = "name")]
        name: String,

        #[arg(long = "category", value_parser = parse_category)]
        category: Category,

        #[arg(long = "start", value_parser = parse_date)]
        start: NaiveDate,

        #[arg(long = "end", value_parser = parse_date)]
        end: NaiveDate,
    },
    /// Change a task's name or category.
    Edit {
        id: String,

        #[arg(long = "name")]
        name: Option<String>,

        #[arg(long = "category", value_parser = parse_category)]
        category: Option<Category>,
    },
    /// Move a task to a new start date, keeping its length.
    Move {
        id: String,

        #[arg(value_parser = parse_date)]
        start: NaiveDate,
    },
    /// Replace both ends of a task.
    Resize {
        id: String,

        #[arg(value_parser = parse_date)]
        start: NaiveDate,

        #[arg(value_parser = parse_date)]
        end: NaiveDate,
    },
    Delete {
        id: String,
    },
    /// Print the month grid and bar placements.
    Month {
        /// Month as YYYY-MM.
        month: Option<String>,
    },
}

fn parse_category(raw: &str) -> Result<Category, String> {
    Category::from_label(raw).ok_or_else(|| {
        let known = Category::ALL
            .iter()
            .map(|category| category.label())
            .collect::<Vec<_>>()
            .join(", ");
        format!("unknown category {raw:?} (expected one of: {known})")
    })
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    iso_date_serde::parse(raw)
}

pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let default_level = if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_list_filters() {
        let cli = GlobalCli::try_parse_from([
            "monthplan",
            "-vv",
            "list",
            "--category",
            "in progress",
            "--category",
            "Review",
            "--within",
            "2",
        ])
        .expect("parse");

        assert_eq!(cli.verbose, 2);
        let Command::List {
            categories, within, ..
        } = cli.command
        else {
            panic!("expected list");
        };
        assert_eq!(categories, vec![Category::InProgress, Category::Review]);
        assert_eq!(within, Some(2));
    }

    #[test]
    fn rejects_out_of_range_window_and_bad_dates() {
        assert!(GlobalCli::try_parse_from(["monthplan", "list", "--within", "4"]).is_err());
        assert!(GlobalCli::try_parse_from(["monthplan", "move", "task1", "2024-13-01"]).is_err());
        assert!(
            GlobalCli::try_parse_from(["monthplan", "edit", "task1", "--category", "Someday"])
                .is_err()
        );
    }

    #[test]
    fn global_data_flag_after_subcommand() {
        let cli = GlobalCli::try_parse_from(["monthplan", "month", "2024-08", "--data", "/tmp/x"])
            .expect("parse");
        assert_eq!(cli.data, Some(PathBuf::from("/tmp/x")));
    }
}
