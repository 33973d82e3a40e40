//! Per-widget mutable state and the feedback visibility policy.

use serde::{Deserialize, Serialize};

use crate::model::{SectionState, Verdict};

/// Feedback attached to a widget after an evaluation.
///
/// Each widget has at most one live entry, keyed by widget id; toggling a
/// section mutates `visible` in place rather than creating a new entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackEntry {
    /// Feedback text; may be empty, which renders as empty content.
    pub text: String,
    /// Whether the host should currently render this entry.
    pub visible: bool,
}

/// Mutable grading state for one widget.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WidgetState {
    /// Last value the host reported for this widget.
    pub value: String,
    /// Verdict for that value.
    pub verdict: Verdict,
    /// Live feedback entry, if the last evaluation produced one.
    pub feedback: Option<FeedbackEntry>,
}

impl WidgetState {
    /// Re-apply the visibility policy without touching correctness.
    pub fn sync_feedback_visibility(&mut self, section: Option<SectionState>) {
        if let Some(entry) = &mut self.feedback {
            entry.visible = feedback_visible(section);
        }
    }
}

/// Whether a widget's feedback should be rendered.
///
/// Visible iff the enclosing section is revealed, or the widget is not
/// inside any check-section. Widgets in a hidden section still grade, so
/// the score summary stays accurate; their entries are stored invisible.
pub fn feedback_visible(section: Option<SectionState>) -> bool {
    section.map_or(true, SectionState::is_revealed)
}
