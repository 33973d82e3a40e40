//! TOML exercise parser.
//!
//! Loads exercises from TOML files and directories, and validates them.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::matcher::CompiledMatcher;
use crate::model::{
    ChoiceOption, Exercise, MatchMode, SectionSpec, SolutionSpec, WidgetKind, WidgetSpec,
    ANSWER_SENTINEL,
};

/// Intermediate TOML structure for parsing exercise files.
#[derive(Debug, Deserialize)]
struct TomlExerciseFile {
    exercise: TomlExerciseHeader,
    #[serde(default)]
    sections: Vec<TomlSection>,
    #[serde(default)]
    widgets: Vec<TomlWidget>,
    #[serde(default)]
    solutions: Vec<TomlSolution>,
}

#[derive(Debug, Deserialize)]
struct TomlExerciseHeader {
    id: String,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct TomlSection {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    widgets: Vec<TomlWidget>,
}

#[derive(Debug, Deserialize)]
struct TomlWidget {
    id: String,
    kind: String,
    #[serde(default)]
    answers: Vec<String>,
    #[serde(default)]
    feedback: Option<String>,
    #[serde(default)]
    ignore_case: bool,
    #[serde(default)]
    ignore_spaces: bool,
    #[serde(default)]
    tolerance: Option<f64>,
    #[serde(default)]
    regex: bool,
    #[serde(default)]
    options: Vec<TomlOption>,
}

#[derive(Debug, Deserialize)]
struct TomlOption {
    value: String,
    #[serde(default)]
    feedback: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TomlSolution {
    id: String,
}

/// Parse a single TOML file into an [`Exercise`].
pub fn parse_exercise(path: &Path) -> Result<Exercise> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read exercise file: {}", path.display()))?;

    parse_exercise_str(&content, path)
}

/// Parse a TOML string into an [`Exercise`] (useful for testing).
pub fn parse_exercise_str(content: &str, source_path: &Path) -> Result<Exercise> {
    let parsed: TomlExerciseFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let widgets = parsed
        .widgets
        .into_iter()
        .map(convert_widget)
        .collect::<Result<Vec<_>>>()?;

    let sections = parsed
        .sections
        .into_iter()
        .map(|s| {
            let widgets = s
                .widgets
                .into_iter()
                .map(convert_widget)
                .collect::<Result<Vec<_>>>()?;
            Ok(SectionSpec {
                id: s.id,
                name: s.name,
                widgets,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let solutions = parsed
        .solutions
        .into_iter()
        .map(|s| SolutionSpec { id: s.id })
        .collect();

    Ok(Exercise {
        id: parsed.exercise.id,
        name: parsed.exercise.name,
        sections,
        widgets,
        solutions,
    })
}

fn convert_widget(w: TomlWidget) -> Result<WidgetSpec> {
    let options = |opts: Vec<TomlOption>| {
        opts.into_iter()
            .map(|o| ChoiceOption {
                value: o.value,
                feedback: o.feedback,
            })
            .collect()
    };

    // Fields that belong to the other widget family are rejected outright;
    // dropping them would leave authors with a widget that grades
    // differently than its file says.
    let kind = match w.kind.as_str() {
        "text_input" => {
            if !w.options.is_empty() {
                anyhow::bail!(
                    "widget '{}': kind 'text_input' does not take field: options",
                    w.id
                );
            }
            WidgetKind::TextInput {
                answers: w.answers,
                feedback: w.feedback,
                mode: MatchMode {
                    ignore_case: w.ignore_case,
                    ignore_spaces: w.ignore_spaces,
                    tolerance: w.tolerance,
                    regex: w.regex,
                },
            }
        }
        "single_select" | "radio_group" => {
            let stray = text_only_fields(&w);
            if !stray.is_empty() {
                anyhow::bail!(
                    "widget '{}': kind '{}' does not take fields: {}",
                    w.id,
                    w.kind,
                    stray.join(", ")
                );
            }
            if w.kind == "single_select" {
                WidgetKind::SingleSelect {
                    options: options(w.options),
                }
            } else {
                WidgetKind::RadioGroup {
                    options: options(w.options),
                }
            }
        }
        other => anyhow::bail!("widget '{}': unknown kind '{other}'", w.id),
    };

    Ok(WidgetSpec { id: w.id, kind })
}

/// Names of set fields that only apply to `text_input` widgets.
fn text_only_fields(w: &TomlWidget) -> Vec<&'static str> {
    let mut stray = Vec::new();
    if !w.answers.is_empty() {
        stray.push("answers");
    }
    if w.feedback.is_some() {
        stray.push("feedback");
    }
    if w.ignore_case {
        stray.push("ignore_case");
    }
    if w.ignore_spaces {
        stray.push("ignore_spaces");
    }
    if w.tolerance.is_some() {
        stray.push("tolerance");
    }
    if w.regex {
        stray.push("regex");
    }
    stray
}

/// Recursively load all `.toml` exercise files from a directory.
pub fn load_exercise_directory(dir: &Path) -> Result<Vec<Exercise>> {
    let mut exercises = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            exercises.extend(load_exercise_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_exercise(&path) {
                Ok(exercise) => exercises.push(exercise),
                Err(e) => {
                    tracing::warn!("skipping {}: {}", path.display(), e);
                }
            }
        }
    }

    Ok(exercises)
}

/// A warning from exercise validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The widget ID (if applicable).
    pub widget_id: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Validate an exercise for common issues.
pub fn validate_exercise(exercise: &Exercise) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    // Duplicate section ids
    let mut seen_sections = std::collections::HashSet::new();
    for section in &exercise.sections {
        if !seen_sections.insert(&section.id) {
            warnings.push(ValidationWarning {
                widget_id: None,
                message: format!("duplicate section ID: {}", section.id),
            });
        }
    }

    // Duplicate solution block ids
    let mut seen_solutions = std::collections::HashSet::new();
    for solution in &exercise.solutions {
        if !seen_solutions.insert(&solution.id) {
            warnings.push(ValidationWarning {
                widget_id: None,
                message: format!("duplicate solution ID: {}", solution.id),
            });
        }
    }

    // Duplicate widget ids, across sections and ungated widgets
    let mut seen_widgets = std::collections::HashSet::new();
    for widget in exercise.all_widgets() {
        if !seen_widgets.insert(&widget.id) {
            warnings.push(ValidationWarning {
                widget_id: Some(widget.id.clone()),
                message: format!("duplicate widget ID: {}", widget.id),
            });
        }
    }

    for widget in exercise.all_widgets() {
        match &widget.kind {
            WidgetKind::TextInput { answers, mode, .. } => {
                if answers.is_empty() {
                    warnings.push(ValidationWarning {
                        widget_id: Some(widget.id.clone()),
                        message: "text input has no accepted answers".into(),
                    });
                }
                // Surface matcher build problems before the engine
                // silently disables the widget at init.
                if let Err(problem) = CompiledMatcher::build(answers, mode) {
                    warnings.push(ValidationWarning {
                        widget_id: Some(widget.id.clone()),
                        message: problem.to_string(),
                    });
                }
            }
            WidgetKind::SingleSelect { options } | WidgetKind::RadioGroup { options } => {
                if options.is_empty() {
                    warnings.push(ValidationWarning {
                        widget_id: Some(widget.id.clone()),
                        message: "choice widget has no options".into(),
                    });
                } else if !options.iter().any(|o| o.value == ANSWER_SENTINEL) {
                    warnings.push(ValidationWarning {
                        widget_id: Some(widget.id.clone()),
                        message: format!("no option with value \"{ANSWER_SENTINEL}\""),
                    });
                }
            }
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const VALID_TOML: &str = r#"
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

[[solutions]]
id = "sol1"
"#;

    #[test]
    fn parse_valid_toml() {
        let exercise = parse_exercise_str(VALID_TOML, &PathBuf::from("test.toml")).unwrap();
        assert_eq!(exercise.id, "ch01");
        assert_eq!(exercise.name, "Chapter 1");
        assert_eq!(exercise.widgets.len(), 1);
        assert_eq!(exercise.sections.len(), 1);
        assert_eq!(exercise.sections[0].widgets.len(), 2);
        assert_eq!(exercise.widget_count(), 3);
        assert_eq!(exercise.solutions.len(), 1);
        assert_eq!(exercise.solutions[0].id, "sol1");

        let WidgetKind::TextInput { mode, .. } = &exercise.sections[0].widgets[0].kind else {
            panic!("expected text input");
        };
        assert!(mode.ignore_case);
    }

    #[test]
    fn parse_missing_optional_fields() {
        let toml = r#"
[exercise]
id = "minimal"

[[widgets]]
id = "q1"
kind = "text_input"
answers = ["a"]
"#;
        let exercise = parse_exercise_str(toml, &PathBuf::from("test.toml")).unwrap();
        assert_eq!(exercise.name, "");
        assert!(exercise.sections.is_empty());
        let WidgetKind::TextInput { feedback, mode, .. } = &exercise.widgets[0].kind else {
            panic!("expected text input");
        };
        assert!(feedback.is_none());
        assert_eq!(*mode, MatchMode::default());
    }

    #[test]
    fn parse_unknown_kind() {
        let toml = r#"
[exercise]
id = "bad"

[[widgets]]
id = "q1"
kind = "checkbox"
"#;
        let err = parse_exercise_str(toml, &PathBuf::from("test.toml")).unwrap_err();
        assert!(err.to_string().contains("unknown kind"));
    }

    #[test]
    fn parse_text_input_with_options_fails() {
        let toml = r#"
[exercise]
id = "mixed"

[[widgets]]
id = "q1"
kind = "text_input"
answers = ["a"]
options = [{ value = "answer" }]
"#;
        let err = parse_exercise_str(toml, &PathBuf::from("test.toml")).unwrap_err();
        assert!(err.to_string().contains("does not take field: options"));
    }

    #[test]
    fn parse_choice_with_text_fields_fails() {
        let toml = r#"
[exercise]
id = "mixed"

[[widgets]]
id = "pick"
kind = "single_select"
answers = ["Paris"]
ignore_case = true
options = [{ value = "answer" }]
"#;
        let err = parse_exercise_str(toml, &PathBuf::from("test.toml")).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("does not take fields"));
        assert!(msg.contains("answers"));
        assert!(msg.contains("ignore_case"));
    }

    #[test]
    fn parse_radio_group_with_tolerance_fails() {
        let toml = r#"
[exercise]
id = "mixed"

[[sections]]
id = "sec1"

[[sections.widgets]]
id = "radio"
kind = "radio_group"
tolerance = 0.1
options = [{ value = "answer" }]
"#;
        let err = parse_exercise_str(toml, &PathBuf::from("test.toml")).unwrap_err();
        assert!(err.to_string().contains("tolerance"));
    }

    #[test]
    fn parse_malformed_toml() {
        let bad = "this is not [valid toml }{";
        let result = parse_exercise_str(bad, &PathBuf::from("bad.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn validate_clean_exercise() {
        let exercise = parse_exercise_str(VALID_TOML, &PathBuf::from("test.toml")).unwrap();
        assert!(validate_exercise(&exercise).is_empty());
    }

    #[test]
    fn validate_duplicate_widget_ids() {
        let toml = r#"
[exercise]
id = "dupes"

[[widgets]]
id = "same"
kind = "text_input"
answers = ["a"]

[[sections]]
id = "sec1"

[[sections.widgets]]
id = "same"
kind = "text_input"
answers = ["b"]
"#;
        let exercise = parse_exercise_str(toml, &PathBuf::from("test.toml")).unwrap();
        let warnings = validate_exercise(&exercise);
        assert!(warnings.iter().any(|w| w.message.contains("duplicate widget ID")));
    }

    #[test]
    fn validate_duplicate_solution_ids() {
        let toml = r#"
[exercise]
id = "dupes"

[[solutions]]
id = "sol"

[[solutions]]
id = "sol"
"#;
        let exercise = parse_exercise_str(toml, &PathBuf::from("test.toml")).unwrap();
        let warnings = validate_exercise(&exercise);
        assert!(warnings.iter().any(|w| w.message.contains("duplicate solution ID")));
    }

    #[test]
    fn validate_choice_without_answer_option() {
        let toml = r#"
[exercise]
id = "no-answer"

[[widgets]]
id = "pick"
kind = "single_select"
options = [{ value = "blank" }, { value = "distractor" }]
"#;
        let exercise = parse_exercise_str(toml, &PathBuf::from("test.toml")).unwrap();
        let warnings = validate_exercise(&exercise);
        assert!(warnings.iter().any(|w| w.message.contains("\"answer\"")));
    }

    #[test]
    fn validate_bad_matcher_config() {
        let toml = r#"
[exercise]
id = "bad-regex"

[[widgets]]
id = "q1"
kind = "text_input"
answers = ["(unclosed"]
regex = true

[[widgets]]
id = "q2"
kind = "text_input"
answers = ["pi"]
tolerance = 0.1
"#;
        let exercise = parse_exercise_str(toml, &PathBuf::from("test.toml")).unwrap();
        let warnings = validate_exercise(&exercise);
        assert!(warnings.iter().any(|w| w.message.contains("invalid answer pattern")));
        assert!(warnings
            .iter()
            .any(|w| w.message.contains("no accepted answer parses as a number")));
    }

    #[test]
    fn validate_empty_answer_set() {
        let toml = r#"
[exercise]
id = "empty"

[[widgets]]
id = "q1"
kind = "text_input"
"#;
        let exercise = parse_exercise_str(toml, &PathBuf::from("test.toml")).unwrap();
        let warnings = validate_exercise(&exercise);
        assert!(warnings.iter().any(|w| w.message.contains("no accepted answers")));
    }

    #[test]
    fn load_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("test.toml");
        std::fs::write(&file_path, VALID_TOML).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let exercises = load_exercise_directory(dir.path()).unwrap();
        assert_eq!(exercises.len(), 1);
        assert_eq!(exercises[0].id, "ch01");
    }
}
