use std::ffi::OsString;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use monthplan_cli::render::Renderer;
use monthplan_cli::run_with;
use tempfile::tempdir;

fn august(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 8, day).expect("valid date")
}

fn run(data: &Path, args: &[&str]) -> anyhow::Result<String> {
    let mut argv: Vec<OsString> = vec!["monthplan".into(), "--data".into(), data.into()];
    argv.extend(args.iter().map(OsString::from));

    let mut out = Vec::new();
    run_with(argv, august(13), &Renderer::plain(), &mut out)?;
    Ok(String::from_utf8(out).expect("utf8"))
}

#[test]
fn first_run_seeds_and_persists() {
    let temp = tempdir().expect("tempdir");
    let listed = run(temp.path(), &["list"]).expect("list");

    for name in ["TASK 5", "Task 1", "TASK 4", "TASK 3", "TASK 2", "TASK 6"] {
        assert!(listed.contains(name), "missing {name}");
    }
    let raw = fs::read_to_string(temp.path().join("tasks.json")).expect("stored file");
    assert!(raw.contains("\"startDate\":\"2024-08-07\""));
}

#[test]
fn add_move_resize_delete_round_trip() {
    let temp = tempdir().expect("tempdir");
    let created = run(
        temp.path(),
        &[
            "add",
            "--name",
            "Launch",
            "--category",
            "to do",
            "--start",
            "2024-08-22",
            "--end",
            "2024-08-21",
        ],
    )
    .expect("add");
    let id = created
        .trim()
        .strip_prefix("Created task ")
        .and_then(|rest| rest.strip_suffix('.'))
        .expect("created id")
        .to_string();

    let moved = run(temp.path(), &["move", &id, "2024-08-26"]).expect("move");
    assert!(moved.contains("start     2024-08-26"));
    assert!(moved.contains("end       2024-08-27"));

    let resized = run(temp.path(), &["resize", &id, "2024-08-25", "2024-08-30"]).expect("resize");
    assert!(resized.contains("days      6"));

    assert!(run(temp.path(), &["resize", &id, "2024-08-30", "2024-08-25"]).is_err());

    let json = run(temp.path(), &["list", "--search", "launch", "--json"]).expect("list json");
    let records: Vec<serde_json::Value> = serde_json::from_str(&json).expect("json");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["endDate"], "2024-08-30");
    assert_eq!(records[0]["category"], "To Do");

    run(temp.path(), &["delete", &id]).expect("delete");
    assert!(run(temp.path(), &["delete", &id]).is_err());
}

#[test]
fn time_window_uses_today() {
    let temp = tempdir().expect("tempdir");
    let listed = run(temp.path(), &["list", "--within", "1"]).expect("list");
    assert!(listed.contains("Task 1"));
    assert!(listed.contains("TASK 2"));
    assert!(!listed.contains("TASK 5"));
    assert!(!listed.contains("TASK 6"));
}

#[test]
fn month_defaults_to_current_month() {
    let temp = tempdir().expect("tempdir");
    let month = run(temp.path(), &["month"]).expect("month");
    assert!(month.starts_with("August 2024\n"));

    let september = run(temp.path(), &["month", "2024-09"]).expect("month");
    assert!(september.starts_with("September 2024\n"));
    assert!(run(temp.path(), &["month", "2024-13"]).is_err());
}

#[test]
fn malformed_store_fails_and_is_left_alone() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("tasks.json");
    fs::write(&path, "{not json").expect("write");

    let err = run(temp.path(), &["list"]).expect_err("malformed store");
    assert!(format!("{err:#}").contains("failed to parse stored tasks"));
    assert_eq!(fs::read_to_string(&path).expect("read"), "{not json");
}
