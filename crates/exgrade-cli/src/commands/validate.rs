//! The `exgrade validate` command.

use std::path::PathBuf;

use anyhow::Result;

pub fn execute(exercise_path: PathBuf) -> Result<()> {
    let exercises = if exercise_path.is_dir() {
        exgrade_core::parser::load_exercise_directory(&exercise_path)?
    } else {
        vec![exgrade_core::parser::parse_exercise(&exercise_path)?]
    };

    let mut total_warnings = 0;

    for exercise in &exercises {
        println!(
            "Exercise: {} ({} widgets)",
            exercise.name,
            exercise.widget_count()
        );

        let warnings = exgrade_core::parser::validate_exercise(exercise);
        for w in &warnings {
            let prefix = w
                .widget_id
                .as_ref()
                .map(|id| format!("  [{id}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All exercises valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
