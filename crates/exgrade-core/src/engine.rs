//! Central grading engine: widget registry, event dispatch, and the
//! check-section toggle controller.
//!
//! One [`GradingEngine`] instance owns all per-widget and per-section
//! state for a rendered document. The host view layer forwards typed
//! events into [`GradingEngine::dispatch`] and renders whatever comes
//! back; correctness styling, feedback placement, and the toggle label
//! are all derived from the returned [`EventOutcome`] or from the
//! read-only accessors.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigIssue, EngineError};
use crate::matcher::CompiledMatcher;
use crate::model::{
    ChoiceOption, Exercise, SectionState, SolutionState, Verdict, WidgetKind, WidgetSpec,
    ANSWER_SENTINEL, BLANK_SENTINEL,
};
use crate::score::ScoreSummary;
use crate::state::{feedback_visible, FeedbackEntry, WidgetState};

/// Separator appended to non-empty radio-group feedback before any
/// second-stage text the host concatenates.
const FEEDBACK_SEPARATOR: &str = "\n\n";

/// A typed user event forwarded by the host view layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A text input changed, or an option was selected/checked.
    ValueChanged { id: String, value: String },
    /// A check-section's toggle control was clicked.
    SectionToggled { id: String },
    /// A solution block's reveal button was clicked.
    SolutionToggled { id: String },
}

/// Everything the host needs to render after one event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventOutcome {
    /// Verdict of the acted-upon widget; `None` for section toggles.
    pub verdict: Option<Verdict>,
    /// The widget's live feedback entry after the event, if any.
    pub feedback: Option<FeedbackEntry>,
    /// New toggle label, when a section changed state.
    pub section_label: Option<&'static str>,
    /// Summary of the enclosing scope, when the event touched one.
    pub summary: Option<ScoreSummary>,
    /// Whether a solution block is now open, when one toggled.
    pub solution_open: Option<bool>,
}

/// How a widget grades its value.
enum Grader {
    /// Free-text input with a compiled answer matcher.
    Text {
        matcher: CompiledMatcher,
        feedback: Option<String>,
    },
    /// Sentinel-graded choices: selects and radio groups.
    Choice {
        options: Vec<ChoiceOption>,
        radio: bool,
    },
    /// Configuration was malformed; the widget stays neutral forever.
    Disabled,
}

struct WidgetEntry {
    grader: Grader,
    /// Enclosing check-section, if the widget is gated.
    section: Option<String>,
    state: WidgetState,
}

struct SectionEntry {
    state: SectionState,
    widgets: Vec<String>,
}

/// The grading engine for one rendered document.
///
/// Replaces the original reliance on document-wide id lookups with an
/// explicit registry owned by a single instance: create it from a parsed
/// [`Exercise`] at load time, drop it when the document goes away.
pub struct GradingEngine {
    widgets: IndexMap<String, WidgetEntry>,
    sections: IndexMap<String, SectionEntry>,
    solutions: IndexMap<String, SolutionState>,
    issues: Vec<ConfigIssue>,
}

impl GradingEngine {
    /// Build an engine from an exercise configuration.
    ///
    /// Malformed widget configurations are collected (and logged) rather
    /// than failing the build; the offending widgets grade always-neutral
    /// so a bad regex in one blank cannot break the rest of the page.
    pub fn from_exercise(exercise: &Exercise) -> Self {
        let mut engine = Self {
            widgets: IndexMap::new(),
            sections: IndexMap::new(),
            solutions: IndexMap::new(),
            issues: Vec::new(),
        };

        for widget in &exercise.widgets {
            engine.insert_widget(widget, None);
        }
        for section in &exercise.sections {
            let mut ids = Vec::with_capacity(section.widgets.len());
            for widget in &section.widgets {
                engine.insert_widget(widget, Some(section.id.clone()));
                ids.push(widget.id.clone());
            }
            engine.sections.insert(
                section.id.clone(),
                SectionEntry {
                    state: SectionState::Hidden,
                    widgets: ids,
                },
            );
        }
        for solution in &exercise.solutions {
            engine
                .solutions
                .insert(solution.id.clone(), SolutionState::Closed);
        }
        engine
    }

    fn insert_widget(&mut self, spec: &WidgetSpec, section: Option<String>) {
        let grader = match &spec.kind {
            WidgetKind::TextInput {
                answers,
                feedback,
                mode,
            } => match CompiledMatcher::build(answers, mode) {
                Ok(matcher) => Grader::Text {
                    matcher,
                    feedback: feedback.clone(),
                },
                Err(problem) => {
                    let issue = ConfigIssue {
                        widget_id: spec.id.clone(),
                        problem,
                    };
                    tracing::warn!("disabling widget: {issue}");
                    self.issues.push(issue);
                    Grader::Disabled
                }
            },
            WidgetKind::SingleSelect { options } => Grader::Choice {
                options: options.clone(),
                radio: false,
            },
            WidgetKind::RadioGroup { options } => Grader::Choice {
                options: options.clone(),
                radio: true,
            },
        };
        self.widgets.insert(
            spec.id.clone(),
            WidgetEntry {
                grader,
                section,
                state: WidgetState::default(),
            },
        );
    }

    /// Single entry point for host events.
    ///
    /// Synchronous: the event is graded to completion before this
    /// returns. Per-widget ordering is the caller's event order.
    pub fn dispatch(&mut self, event: &Event) -> Result<EventOutcome, EngineError> {
        match event {
            Event::ValueChanged { id, value } => self.value_changed(id, value),
            Event::SectionToggled { id } => self.section_toggled(id),
            Event::SolutionToggled { id } => self.solution_toggled(id),
        }
    }

    fn value_changed(&mut self, id: &str, value: &str) -> Result<EventOutcome, EngineError> {
        let (verdict, text, section_id) = {
            let entry = self
                .widgets
                .get(id)
                .ok_or_else(|| EngineError::WidgetNotFound(id.to_string()))?;
            let (verdict, text) = grade(&entry.grader, value);
            (verdict, text, entry.section.clone())
        };

        let section_state = section_id
            .as_deref()
            .and_then(|sid| self.sections.get(sid))
            .map(|s| s.state);
        let visible = feedback_visible(section_state);

        let feedback = text.map(|text| FeedbackEntry { text, visible });
        if let Some(entry) = self.widgets.get_mut(id) {
            entry.state.value = value.to_string();
            entry.state.verdict = verdict;
            entry.state.feedback = feedback.clone();
        }
        tracing::debug!(widget = id, %verdict, "graded value change");

        let summary = section_id
            .as_deref()
            .and_then(|sid| self.sections.get(sid))
            .map(|s| self.summarize_ids(&s.widgets));

        Ok(EventOutcome {
            verdict: Some(verdict),
            feedback,
            section_label: None,
            summary,
            solution_open: None,
        })
    }

    fn section_toggled(&mut self, id: &str) -> Result<EventOutcome, EngineError> {
        let section = self
            .sections
            .get_mut(id)
            .ok_or_else(|| EngineError::SectionNotFound(id.to_string()))?;
        section.state = section.state.toggled();
        let state = section.state;
        let widget_ids = section.widgets.clone();

        // Visibility sync only; correctness is never re-evaluated here.
        for wid in &widget_ids {
            if let Some(entry) = self.widgets.get_mut(wid) {
                entry.state.sync_feedback_visibility(Some(state));
            }
        }
        tracing::debug!(section = id, label = state.label(), "toggled section");

        Ok(EventOutcome {
            verdict: None,
            feedback: None,
            section_label: Some(state.label()),
            summary: Some(self.summarize_ids(&widget_ids)),
            solution_open: None,
        })
    }

    fn solution_toggled(&mut self, id: &str) -> Result<EventOutcome, EngineError> {
        let state = self
            .solutions
            .get_mut(id)
            .ok_or_else(|| EngineError::SolutionNotFound(id.to_string()))?;
        *state = state.toggled();
        let open = state.is_open();
        tracing::debug!(solution = id, open, "toggled solution block");

        // Solution blocks do not grade; nothing else changes.
        Ok(EventOutcome {
            verdict: None,
            feedback: None,
            section_label: None,
            summary: None,
            solution_open: Some(open),
        })
    }

    /// Current verdict for a widget.
    pub fn verdict(&self, id: &str) -> Result<Verdict, EngineError> {
        self.widget(id).map(|w| w.state.verdict)
    }

    /// Live feedback entry for a widget, if the last evaluation produced one.
    pub fn feedback(&self, id: &str) -> Result<Option<&FeedbackEntry>, EngineError> {
        self.widget(id).map(|w| w.state.feedback.as_ref())
    }

    /// Per-option marks for a choice widget: the chosen option carries the
    /// widget's verdict, every other option is unmarked. Empty for text
    /// inputs.
    pub fn option_marks(&self, id: &str) -> Result<Vec<(String, Option<Verdict>)>, EngineError> {
        let entry = self.widget(id)?;
        let Grader::Choice { options, .. } = &entry.grader else {
            return Ok(Vec::new());
        };
        Ok(options
            .iter()
            .map(|o| {
                let mark = (o.value == entry.state.value).then_some(entry.state.verdict);
                (o.value.clone(), mark)
            })
            .collect())
    }

    /// Current "X of Y correct" summary for a section.
    pub fn summarize_section(&self, id: &str) -> Result<ScoreSummary, EngineError> {
        self.section(id).map(|s| self.summarize_ids(&s.widgets))
    }

    /// Current visibility state of a section.
    pub fn section_state(&self, id: &str) -> Result<SectionState, EngineError> {
        self.section(id).map(|s| s.state)
    }

    /// Current toggle label for a section.
    pub fn section_label(&self, id: &str) -> Result<&'static str, EngineError> {
        self.section(id).map(|s| s.state.label())
    }

    /// Current visibility state of a solution block.
    pub fn solution_state(&self, id: &str) -> Result<SolutionState, EngineError> {
        self.solutions
            .get(id)
            .copied()
            .ok_or_else(|| EngineError::SolutionNotFound(id.to_string()))
    }

    /// Configuration issues collected while building the engine.
    pub fn config_issues(&self) -> &[ConfigIssue] {
        &self.issues
    }

    /// Serializable snapshot of every widget and section, in registry
    /// order. This is the whole boundary a headless host needs.
    pub fn snapshot(&self) -> EngineSnapshot {
        let widgets = self
            .widgets
            .iter()
            .map(|(id, w)| WidgetSnapshot {
                id: id.clone(),
                section: w.section.clone(),
                value: w.state.value.clone(),
                verdict: w.state.verdict,
                feedback: w.state.feedback.clone(),
            })
            .collect();
        let sections = self
            .sections
            .iter()
            .map(|(id, s)| SectionSnapshot {
                id: id.clone(),
                state: s.state,
                label: s.state.label(),
                summary: self.summarize_ids(&s.widgets),
            })
            .collect();
        let solutions = self
            .solutions
            .iter()
            .map(|(id, state)| SolutionSnapshot {
                id: id.clone(),
                open: state.is_open(),
            })
            .collect();
        EngineSnapshot {
            widgets,
            sections,
            solutions,
        }
    }

    fn widget(&self, id: &str) -> Result<&WidgetEntry, EngineError> {
        self.widgets
            .get(id)
            .ok_or_else(|| EngineError::WidgetNotFound(id.to_string()))
    }

    fn section(&self, id: &str) -> Result<&SectionEntry, EngineError> {
        self.sections
            .get(id)
            .ok_or_else(|| EngineError::SectionNotFound(id.to_string()))
    }

    fn summarize_ids(&self, ids: &[String]) -> ScoreSummary {
        ScoreSummary::tally(
            ids.iter()
                .filter_map(|wid| self.widgets.get(wid))
                .map(|w| w.state.verdict),
        )
    }
}

/// Kind-specific grading: the verdict plus the feedback text to attach.
fn grade(grader: &Grader, value: &str) -> (Verdict, Option<String>) {
    match grader {
        Grader::Text { matcher, feedback } => {
            let verdict = matcher.evaluate(value);
            // Text inputs only surface feedback on an incorrect mark.
            let text = (verdict == Verdict::Incorrect)
                .then(|| feedback.clone().unwrap_or_default());
            (verdict, text)
        }
        Grader::Choice { options, radio } => {
            let verdict = match value {
                ANSWER_SENTINEL => Verdict::Correct,
                BLANK_SENTINEL => Verdict::Neutral,
                _ => Verdict::Incorrect,
            };
            if verdict == Verdict::Neutral {
                return (verdict, None);
            }
            // The chosen option's feedback is attached even when correct,
            // so positive-reinforcement text gets through.
            let mut text = options
                .iter()
                .find(|o| o.value == value)
                .and_then(|o| o.feedback.clone())
                .unwrap_or_default();
            if *radio && !text.trim().is_empty() {
                text.push_str(FEEDBACK_SEPARATOR);
            }
            (verdict, Some(text))
        }
        Grader::Disabled => (Verdict::Neutral, None),
    }
}

/// Serializable snapshot of the whole engine, for headless hosts.
#[derive(Debug, Clone, Serialize)]
pub struct EngineSnapshot {
    pub widgets: Vec<WidgetSnapshot>,
    pub sections: Vec<SectionSnapshot>,
    pub solutions: Vec<SolutionSnapshot>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WidgetSnapshot {
    pub id: String,
    pub section: Option<String>,
    pub value: String,
    pub verdict: Verdict,
    pub feedback: Option<FeedbackEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionSnapshot {
    pub id: String,
    pub state: SectionState,
    pub label: &'static str,
    pub summary: ScoreSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct SolutionSnapshot {
    pub id: String,
    pub open: bool,
}
