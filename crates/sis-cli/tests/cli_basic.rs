//! Basic CLI E2E tests.
//!
//! Tests invoke the `sis` binary against a throwaway data directory and
//! verify its JSON output.

use std::process::Command;

use serde_json::Value;
use tempfile::TempDir;

/// A data directory shared by the commands of one test.
struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("Failed to create temp dir"),
        }
    }

    /// Run a CLI command and return (stdout, stderr, exit code).
    fn run(&self, args: &[&str]) -> (String, String, i32) {
        let output = Command::new(env!("CARGO_BIN_EXE_sis"))
            .args(args)
            .env("SIS_DATA_DIR", self.dir.path())
            .env_remove("RUST_LOG")
            .output()
            .expect("Failed to execute CLI command");

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let code = output.status.code().unwrap_or(-1);

        (stdout, stderr, code)
    }

    fn success(&self, args: &[&str]) -> String {
        let (stdout, stderr, code) = self.run(args);
        assert_eq!(code, 0, "CLI command failed: {args:?}\n{stderr}");
        stdout
    }

    fn json(&self, args: &[&str]) -> Value {
        let stdout = self.success(args);
        serde_json::from_str(&stdout).expect("Failed to parse JSON output")
    }

    fn failure(&self, args: &[&str]) -> String {
        let (_, stderr, code) = self.run(args);
        assert_ne!(code, 0, "CLI command unexpectedly succeeded: {args:?}");
        stderr
    }

    /// One version, class 1a, two educators and a Monday maths lesson at order 3.
    fn seeded() -> Self {
        let sandbox = Self::new();
        sandbox.success(&["version", "add", "2024/25"]);
        sandbox.success(&["group", "add", "1a"]);
        sandbox.success(&["educator", "add", "Anna", "Smith", "--title", "mgr"]);
        sandbox.success(&["educator", "add", "Piotr", "Jones"]);
        sandbox.success(&["lesson", "add", "1a", "maths", "smith", "mon", "3", "12"]);
        sandbox
    }
}

#[test]
fn test_group_day_is_padded() {
    let sandbox = Sandbox::seeded();
    let day = sandbox.json(&["schedule", "group", "1a", "--day", "mon"]);
    let slots = day.as_array().unwrap();
    assert_eq!(slots.len(), 3);
    assert_eq!(slots[0], "empty");
    assert_eq!(slots[1], "empty");
    assert_eq!(slots[2]["single"]["room"], 12);
}

#[test]
fn test_group_week_has_every_day() {
    let sandbox = Sandbox::seeded();
    let week = sandbox.json(&["schedule", "group", "1a"]);
    let days = week.as_object().unwrap();
    assert_eq!(days.len(), 5);
    assert_eq!(days["monday"].as_array().unwrap().len(), 3);
    assert!(days["friday"].as_array().unwrap().is_empty());
}

#[test]
fn test_split_lessons_share_a_slot() {
    let sandbox = Sandbox::seeded();
    sandbox.success(&[
        "lesson", "add", "1a", "english", "jones", "tue", "1", "20", "--part", "2",
    ]);
    let day = sandbox.json(&["schedule", "group", "1a", "--day", "tue"]);
    let pair = day[0]["pair"].as_array().unwrap();
    assert!(pair[0].is_null());
    assert_eq!(pair[1]["part"], "second");
}

#[test]
fn test_substitution_table() {
    let sandbox = Sandbox::seeded();
    // 2024-09-02 is a Monday
    sandbox.success(&[
        "subs", "add", "1a", "3", "--date", "2024-09-02", "--part", "1", "--teacher", "jones",
    ]);

    let table = sandbox.json(&["subs", "table", "--date", "2024-09-02"]);
    assert_eq!(table["date"], "2024-09-02");
    assert_eq!(table["before"]["1"]["3"][0]["part"], "whole");
    assert_eq!(table["after"]["1"]["3"][0]["part"], "second");
    assert_eq!(table["after"]["2"]["3"][0]["part"], "first");
    assert_eq!(table["names"]["1"], "mgr Anna Smith");
    assert!(table["released"].as_object().unwrap().is_empty());
}

#[test]
fn test_release_and_delete() {
    let sandbox = Sandbox::seeded();
    let sub = sandbox.json(&["subs", "add", "1a", "3", "--date", "2024-09-02"]);
    assert!(sub["teacher"].is_null());

    let table = sandbox.json(&["subs", "table", "--date", "2024-09-02"]);
    assert_eq!(table["released"]["3"][0]["group"], 1);
    assert!(table["after"].as_object().unwrap().is_empty());

    let id = sub["id"].as_i64().unwrap().to_string();
    sandbox.success(&["subs", "delete", &id]);
    let listed = sandbox.json(&["subs", "list"]);
    assert!(listed.as_array().unwrap().is_empty());
    sandbox.failure(&["subs", "delete", &id]);
}

#[test]
fn test_weekend_substitution_is_rejected() {
    let sandbox = Sandbox::seeded();
    let stderr = sandbox.failure(&["subs", "add", "1a", "3", "--date", "2024-09-07"]);
    assert!(stderr.contains("not a school day"), "stderr: {stderr}");
}

#[test]
fn test_ambiguous_teacher_fails() {
    let sandbox = Sandbox::seeded();
    sandbox.success(&["educator", "add", "Adam", "Smithson"]);
    let stderr = sandbox.failure(&["schedule", "teacher", "smith%"]);
    assert!(stderr.contains("please be more specific"), "stderr: {stderr}");

    let week = sandbox.json(&["schedule", "teacher", "smith"]);
    assert_eq!(week["monday"].as_array().unwrap().len(), 3);
}

#[test]
fn test_teacher_slot_lists_every_group() {
    let sandbox = Sandbox::seeded();
    sandbox.success(&["group", "add", "1b"]);
    sandbox.success(&["group", "add", "1c"]);
    sandbox.success(&["lesson", "add", "1b", "maths", "smith", "mon", "3", "12"]);
    sandbox.success(&[
        "lesson", "add", "1c", "maths", "smith", "mon", "3", "12", "--part", "1",
    ]);
    let day = sandbox.json(&["schedule", "teacher", "smith", "--day", "mon"]);
    let slots = day.as_array().unwrap();
    assert_eq!(slots.len(), 3);
    assert!(slots[0].as_array().unwrap().is_empty());
    let held = slots[2].as_array().unwrap();
    assert_eq!(held.len(), 3);
    assert_eq!(held[2]["part"], "first");
}

#[test]
fn test_unknown_group_fails() {
    let sandbox = Sandbox::seeded();
    let stderr = sandbox.failure(&["schedule", "group", "9z"]);
    assert!(stderr.contains("error:"), "stderr: {stderr}");
}

#[test]
fn test_now_uses_bell_schedule() {
    let sandbox = Sandbox::seeded();
    let now = sandbox.json(&["now", "smith", "--day", "mon", "--at", "10:05"]);
    assert_eq!(now["result"], "found");
    assert_eq!(now["person"]["kind"], "educator");
    assert_eq!(now["order"], 3);
    assert_eq!(now["lessons"].as_array().unwrap().len(), 1);

    let before_school = sandbox.json(&["now", "smith", "--day", "mon", "--at", "06:00"]);
    assert!(before_school["order"].is_null());
}

#[test]
fn test_now_finds_students() {
    let sandbox = Sandbox::seeded();
    sandbox.success(&[
        "lesson", "add", "1a", "english", "jones", "mon", "2", "20", "--part", "2",
    ]);
    let ola = sandbox.json(&["student", "add", "Ola", "Nowak"]);
    let id = ola["id"].as_i64().unwrap().to_string();
    sandbox.success(&["student", "join", &id, "1a", "--part", "1", "--since", "2024-09-01"]);

    // 2024-09-02 is a Monday; order 2 is held for the other half only
    let args = ["now", "nowak", "--date", "2024-09-02", "--at", "09:05"];
    let now = sandbox.json(&args);
    assert_eq!(now["person"]["kind"], "student");
    assert_eq!(now["order"], 2);
    assert!(now["lessons"].as_array().unwrap().is_empty());

    let now = sandbox.json(&["now", "nowak", "--date", "2024-09-02", "--at", "10:05"]);
    assert_eq!(now["lessons"][0]["room"], 12);

    sandbox.success(&["student", "add", "Jan", "Smith"]);
    let both = sandbox.json(&["now", "smith", "--date", "2024-09-02"]);
    assert_eq!(both["result"], "matches");
    assert_eq!(both["people"].as_array().unwrap().len(), 2);

    let nobody = sandbox.json(&["now", "zielinski"]);
    assert!(nobody["people"].as_array().unwrap().is_empty());
}

#[test]
fn test_room_conflicts() {
    let sandbox = Sandbox::seeded();
    sandbox.success(&["group", "add", "1b"]);
    sandbox.success(&["lesson", "add", "1b", "physics", "jones", "mon", "3", "12"]);
    let conflicts = sandbox.json(&["schedule", "rooms"]);
    let conflicts = conflicts.as_array().unwrap();
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0]["room"], 12);
}

#[test]
fn test_lucky_numbers() {
    let sandbox = Sandbox::seeded();
    // no members yet: the configured fallback bounds the numbers
    assert_eq!(sandbox.json(&["lucky", "left"]).as_array().unwrap().len(), 36);

    for name in ["Nowak", "Lis", "Wrona"] {
        let student = sandbox.json(&["student", "add", "Ola", name]);
        let id = student["id"].as_i64().unwrap().to_string();
        sandbox.success(&["student", "join", &id, "1a", "--part", "1", "--since", "2024-09-01"]);
    }
    sandbox.success(&["lucky", "add", "2", "--date", "2024-09-02"]);
    let left = sandbox.json(&["lucky", "left"]);
    assert_eq!(left, serde_json::json!([1, 3]));

    sandbox.failure(&["lucky", "add", "4", "--date", "2024-09-03"]);
    let drawn = sandbox.json(&["lucky", "draw", "--date", "2024-09-03"]);
    assert_ne!(drawn["number"], 2);
}

#[test]
fn test_config_get_set() {
    let sandbox = Sandbox::new();
    assert_eq!(
        sandbox.success(&["config", "get", "bells.lesson_minutes"]).trim(),
        "45"
    );
    sandbox.success(&["config", "set", "rooms.shared", "[100, 101]"]);
    assert_eq!(
        sandbox.success(&["config", "get", "rooms.shared"]).trim(),
        "[100,101]"
    );
    sandbox.failure(&["config", "get", "bells.unknown"]);
    sandbox.failure(&["config", "set", "lucky.change_hour", "late"]);
}

#[test]
fn test_config_show_set_and_path() {
    let sandbox = Sandbox::new();
    let set = sandbox.json(&["config", "set", "lucky.change_hour", "14"]);
    assert_eq!(set["key"], "lucky.change_hour");
    assert_eq!(set["value"], "14");

    let lucky = sandbox.json(&["config", "show", "lucky"]);
    assert_eq!(lucky["change_hour"], 14);
    assert!(sandbox.json(&["config", "show"])["bells"].is_object());
    sandbox.failure(&["config", "show", "holidays"]);

    let stderr = sandbox.failure(&["config", "set", "bells.starts", "[\"25:99\"]"]);
    assert!(stderr.contains("bells.starts"), "stderr: {stderr}");
    assert_eq!(sandbox.json(&["config", "show", "bells"])["starts"][0], "07:55");

    let path = sandbox.success(&["config", "path"]);
    assert!(path.trim().ends_with("config.toml"));
    let reset = sandbox.json(&["config", "reset"]);
    assert_eq!(reset["lucky"]["change_hour"], 15);
}
