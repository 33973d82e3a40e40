//! Aggregate score summaries for check-sections.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::Verdict;

/// Correct/total counts for one scope, rendered as "2 of 3 correct".
///
/// Derived, never stored: a summary is recomputed from scratch after every
/// evaluation and toggle so it cannot drift from the widget states.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSummary {
    /// Widgets currently marked correct.
    pub correct: usize,
    /// All gradable widgets in the scope, whatever their verdict.
    pub total: usize,
}

impl ScoreSummary {
    /// Tally the verdicts currently in scope.
    ///
    /// Neutral widgets count toward the total but never toward correct.
    pub fn tally<I>(verdicts: I) -> Self
    where
        I: IntoIterator<Item = Verdict>,
    {
        let mut summary = Self::default();
        for verdict in verdicts {
            summary.total += 1;
            if verdict.is_correct() {
                summary.correct += 1;
            }
        }
        summary
    }
}

impl fmt::Display for ScoreSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {} correct", self.correct, self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_scope_is_zero_of_zero() {
        let summary = ScoreSummary::tally([]);
        assert_eq!(summary.correct, 0);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.to_string(), "0 of 0 correct");
    }

    #[test]
    fn two_of_three() {
        let summary = ScoreSummary::tally([
            Verdict::Correct,
            Verdict::Incorrect,
            Verdict::Correct,
        ]);
        assert_eq!(summary.to_string(), "2 of 3 correct");
    }

    #[test]
    fn neutral_counts_toward_total_only() {
        let summary = ScoreSummary::tally([Verdict::Neutral, Verdict::Correct]);
        assert_eq!(summary.correct, 1);
        assert_eq!(summary.total, 2);
    }
}
