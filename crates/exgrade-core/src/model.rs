//! Core data model types for exgrade.
//!
//! These are the fundamental types the grading engine uses to represent
//! exercises, widgets, and check-sections. Everything here is static
//! configuration; mutable grading state lives in [`crate::state`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Option value that marks the correct choice in selects and radio groups.
pub const ANSWER_SENTINEL: &str = "answer";

/// Option value for a placeholder choice that grades as neutral.
pub const BLANK_SENTINEL: &str = "blank";

/// Tri-state grading outcome for one widget's current value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// Untouched or placeholder input; carries no mark either way.
    #[default]
    Neutral,
    Correct,
    Incorrect,
}

impl Verdict {
    pub fn is_correct(self) -> bool {
        matches!(self, Verdict::Correct)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Neutral => write!(f, "neutral"),
            Verdict::Correct => write!(f, "correct"),
            Verdict::Incorrect => write!(f, "incorrect"),
        }
    }
}

/// Matching flags for a text input's accepted-answer set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchMode {
    /// Lowercase both sides before comparing.
    pub ignore_case: bool,
    /// Strip all spaces from the submitted value before comparing.
    pub ignore_spaces: bool,
    /// Accept numeric values within `|accepted - submitted| < tolerance`.
    pub tolerance: Option<f64>,
    /// Treat the accepted answers as regex alternatives.
    pub regex: bool,
}

/// One selectable choice in a select or radio group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    /// Option value token; [`ANSWER_SENTINEL`] and [`BLANK_SENTINEL`]
    /// determine the verdict, any other value grades incorrect.
    pub value: String,
    /// Feedback attached to this option, surfaced when it is chosen.
    #[serde(default)]
    pub feedback: Option<String>,
}

/// Kind-specific widget configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WidgetKind {
    /// Free-text fill-in-the-blank input.
    TextInput {
        /// Accepted answers, matched per `mode`.
        answers: Vec<String>,
        /// Feedback shown when the submitted value is incorrect.
        #[serde(default)]
        feedback: Option<String>,
        #[serde(default)]
        mode: MatchMode,
    },
    /// Dropdown select graded by option sentinels.
    SingleSelect { options: Vec<ChoiceOption> },
    /// Radio-button group graded by option sentinels.
    RadioGroup { options: Vec<ChoiceOption> },
}

/// A gradable widget as configured in the exercise file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetSpec {
    /// Unique identifier within the exercise.
    pub id: String,
    #[serde(flatten)]
    pub kind: WidgetKind,
}

/// A named "check answers" scope with its own reveal toggle and score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionSpec {
    /// Unique identifier within the exercise.
    pub id: String,
    /// Human-readable name.
    #[serde(default)]
    pub name: String,
    /// Widgets gated behind this section's toggle.
    #[serde(default)]
    pub widgets: Vec<WidgetSpec>,
}

/// A standalone solution block, revealed and hidden by its own button.
///
/// Solution blocks are not gradable and belong to no check-section; they
/// never appear in a score summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolutionSpec {
    /// Unique identifier within the exercise.
    pub id: String,
}

/// A full exercise document: check-sections, ungated widgets, and
/// standalone solution blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    /// Unique identifier for this exercise.
    pub id: String,
    /// Human-readable name.
    #[serde(default)]
    pub name: String,
    /// Check-sections and the widgets they gate.
    #[serde(default)]
    pub sections: Vec<SectionSpec>,
    /// Widgets outside any check-section; their feedback is never gated.
    #[serde(default)]
    pub widgets: Vec<WidgetSpec>,
    /// Solution blocks with their own reveal buttons.
    #[serde(default)]
    pub solutions: Vec<SolutionSpec>,
}

impl Exercise {
    /// Total number of widgets, gated and ungated.
    pub fn widget_count(&self) -> usize {
        self.widgets.len() + self.sections.iter().map(|s| s.widgets.len()).sum::<usize>()
    }

    /// All widgets in document order, ungated first.
    pub fn all_widgets(&self) -> impl Iterator<Item = &WidgetSpec> {
        self.widgets
            .iter()
            .chain(self.sections.iter().flat_map(|s| s.widgets.iter()))
    }
}

/// Visibility state of a check-section.
///
/// Binary by invariant; it only changes via an explicit toggle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionState {
    #[default]
    Hidden,
    Revealed,
}

/// Visibility state of a solution block.
///
/// Independent of check-sections and of grading; flipped only by the
/// block's own toggle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolutionState {
    #[default]
    Closed,
    Open,
}

impl SolutionState {
    pub fn toggled(self) -> Self {
        match self {
            SolutionState::Closed => SolutionState::Open,
            SolutionState::Open => SolutionState::Closed,
        }
    }

    pub fn is_open(self) -> bool {
        matches!(self, SolutionState::Open)
    }
}

impl SectionState {
    /// Label for the section's toggle control in this state.
    pub fn label(self) -> &'static str {
        match self {
            SectionState::Hidden => "Show Answers",
            SectionState::Revealed => "Hide Answers",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            SectionState::Hidden => SectionState::Revealed,
            SectionState::Revealed => SectionState::Hidden,
        }
    }

    pub fn is_revealed(self) -> bool {
        matches!(self, SectionState::Revealed)
    }
}
