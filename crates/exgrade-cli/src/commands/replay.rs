//! The `exgrade replay` command.
//!
//! Feeds a recorded event script through the engine and prints the final
//! widget verdicts and section summaries, standing in for a browser host.

use std::path::PathBuf;

use anyhow::{Context, Result};

use exgrade_core::engine::{EngineSnapshot, Event, GradingEngine};

pub fn execute(exercise_path: PathBuf, events_path: PathBuf, format: String) -> Result<()> {
    let exercise = exgrade_core::parser::parse_exercise(&exercise_path)?;

    let content = std::fs::read_to_string(&events_path)
        .with_context(|| format!("failed to read event script: {}", events_path.display()))?;
    let events: Vec<Event> = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse event script: {}", events_path.display()))?;

    let mut engine = GradingEngine::from_exercise(&exercise);
    for issue in engine.config_issues() {
        eprintln!("WARNING: {issue}");
    }

    for (i, event) in events.iter().enumerate() {
        engine
            .dispatch(event)
            .with_context(|| format!("event {i} failed"))?;
    }

    let snapshot = engine.snapshot();
    match format.as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        _ => {
            print_snapshot(&snapshot);
        }
    }

    Ok(())
}

fn print_snapshot(snapshot: &EngineSnapshot) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["Widget", "Section", "Value", "Verdict", "Feedback"]);

    for w in &snapshot.widgets {
        let feedback = match &w.feedback {
            Some(f) if f.visible => f.text.trim().to_string(),
            Some(_) => "(hidden)".to_string(),
            None => String::new(),
        };
        table.add_row(vec![
            Cell::new(&w.id),
            Cell::new(w.section.as_deref().unwrap_or("-")),
            Cell::new(&w.value),
            Cell::new(w.verdict),
            Cell::new(feedback),
        ]);
    }

    println!("{table}");

    for s in &snapshot.sections {
        println!("{}: {} [{}]", s.id, s.summary, s.label);
    }

    for s in &snapshot.solutions {
        let state = if s.open { "open" } else { "closed" };
        println!("solution {}: {state}", s.id);
    }
}
