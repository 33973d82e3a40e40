//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn exgrade() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("exgrade").unwrap()
}

const EXERCISE_TOML: &str = r#"
[exercise]
id = "ch01"
name = "Chapter 1"

[[widgets]]
id = "free"
kind = "text_input"
answers = ["42"]
feedback = "Think deeper."

[[sections]]
id = "sec1"
name = "Check your answers"

[[sections.widgets]]
id = "capital"
kind = "text_input"
answers = ["Paris", "paris"]
ignore_case = true
feedback = "It is the capital of France."

[[sections.widgets]]
id = "pick"
kind = "single_select"
options = [
    { value = "blank" },
    { value = "answer", feedback = "Right!" },
    { value = "distractor", feedback = "Not quite." },
]

[[sections.widgets]]
id = "radio"
kind = "radio_group"
options = [
    { value = "answer", feedback = "Yes." },
    { value = "distractor", feedback = "No." },
]

[[solutions]]
id = "sol1"
"#;

const EVENTS_JSON: &str = r#"[
    { "type": "value_changed", "id": "capital", "value": "PARIS" },
    { "type": "value_changed", "id": "pick", "value": "answer" },
    { "type": "value_changed", "id": "radio", "value": "distractor" },
    { "type": "section_toggled", "id": "sec1" },
    { "type": "solution_toggled", "id": "sol1" }
]"#;

fn write_fixtures(dir: &TempDir) -> (std::path::PathBuf, std::path::PathBuf) {
    let exercise = dir.path().join("exercise.toml");
    let events = dir.path().join("events.json");
    std::fs::write(&exercise, EXERCISE_TOML).unwrap();
    std::fs::write(&events, EVENTS_JSON).unwrap();
    (exercise, events)
}

#[test]
fn validate_valid_exercise() {
    let dir = TempDir::new().unwrap();
    let (exercise, _) = write_fixtures(&dir);

    exgrade()
        .arg("validate")
        .arg("--exercise")
        .arg(&exercise)
        .assert()
        .success()
        .stdout(predicate::str::contains("4 widgets"))
        .stdout(predicate::str::contains("All exercises valid"));
}

#[test]
fn validate_directory() {
    let dir = TempDir::new().unwrap();
    write_fixtures(&dir);

    exgrade()
        .arg("validate")
        .arg("--exercise")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Chapter 1"));
}

#[test]
fn validate_warns_on_missing_answer_option() {
    let dir = TempDir::new().unwrap();
    let exercise = dir.path().join("bad.toml");
    std::fs::write(
        &exercise,
        r#"
[exercise]
id = "bad"

[[widgets]]
id = "pick"
kind = "single_select"
options = [{ value = "blank" }, { value = "distractor" }]
"#,
    )
    .unwrap();

    exgrade()
        .arg("validate")
        .arg("--exercise")
        .arg(&exercise)
        .assert()
        .success()
        .stdout(predicate::str::contains("WARNING"))
        .stdout(predicate::str::contains("1 warning(s) found"));
}

#[test]
fn validate_nonexistent_file() {
    exgrade()
        .arg("validate")
        .arg("--exercise")
        .arg("nonexistent.toml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn replay_prints_summary() {
    let dir = TempDir::new().unwrap();
    let (exercise, events) = write_fixtures(&dir);

    exgrade()
        .arg("replay")
        .arg("--exercise")
        .arg(&exercise)
        .arg("--events")
        .arg(&events)
        .assert()
        .success()
        .stdout(predicate::str::contains("2 of 3 correct"))
        .stdout(predicate::str::contains("Hide Answers"))
        .stdout(predicate::str::contains("incorrect"))
        .stdout(predicate::str::contains("solution sol1: open"));
}

#[test]
fn replay_json_output() {
    let dir = TempDir::new().unwrap();
    let (exercise, events) = write_fixtures(&dir);

    exgrade()
        .arg("replay")
        .arg("--exercise")
        .arg(&exercise)
        .arg("--events")
        .arg(&events)
        .arg("--format")
        .arg("json")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"verdict\": \"correct\""))
        .stdout(predicate::str::contains("\"label\": \"Hide Answers\""))
        .stdout(predicate::str::contains("\"open\": true"));
}

#[test]
fn replay_unknown_widget_fails() {
    let dir = TempDir::new().unwrap();
    let (exercise, _) = write_fixtures(&dir);
    let events = dir.path().join("bad_events.json");
    std::fs::write(
        &events,
        r#"[{ "type": "value_changed", "id": "ghost", "value": "x" }]"#,
    )
    .unwrap();

    exgrade()
        .arg("replay")
        .arg("--exercise")
        .arg(&exercise)
        .arg("--events")
        .arg(&events)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown widget id"));
}

#[test]
fn replay_malformed_events_fails() {
    let dir = TempDir::new().unwrap();
    let (exercise, _) = write_fixtures(&dir);
    let events = dir.path().join("garbage.json");
    std::fs::write(&events, "not json").unwrap();

    exgrade()
        .arg("replay")
        .arg("--exercise")
        .arg(&exercise)
        .arg("--events")
        .arg(&events)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse event script"));
}

#[test]
fn help_output() {
    exgrade()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Interactive exercise grading engine"));
}

#[test]
fn version_output() {
    exgrade()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("exgrade"));
}
