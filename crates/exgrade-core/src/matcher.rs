//! Answer matching for text inputs.
//!
//! A [`CompiledMatcher`] is built once per text input at engine init and
//! evaluated on every value change. Accepted answers are normalized and
//! the regex alternation compiled at build time, so evaluation is a pure
//! string comparison with no allocation beyond the normalized submission.

use regex::Regex;

use crate::error::ConfigProblem;
use crate::model::{MatchMode, Verdict};

/// Pre-compiled comparison state for one text input's accepted-answer set.
#[derive(Debug, Clone)]
pub struct CompiledMatcher {
    /// Accepted answers, already normalized per the mode flags.
    accepted: Vec<String>,
    /// Numeric accepted answers, populated only under tolerance mode.
    numeric: Vec<f64>,
    tolerance: Option<f64>,
    pattern: Option<Regex>,
    ignore_case: bool,
    ignore_spaces: bool,
}

impl CompiledMatcher {
    /// Build a matcher from an accepted-answer set and its mode flags.
    ///
    /// Normalization of the accepted side happens here, once;
    /// [`evaluate`](Self::evaluate) only normalizes the submitted side.
    pub fn build(answers: &[String], mode: &MatchMode) -> Result<Self, ConfigProblem> {
        let accepted: Vec<String> = answers
            .iter()
            .map(|a| normalize(a, mode.ignore_case, mode.ignore_spaces))
            .collect();

        let tolerance = match mode.tolerance {
            Some(t) if t > 0.0 => Some(t),
            Some(t) => return Err(ConfigProblem::UnusableTolerance { tolerance: t }),
            None => None,
        };

        let numeric = if tolerance.is_some() {
            let parsed: Vec<f64> = accepted.iter().filter_map(|a| a.parse().ok()).collect();
            if parsed.is_empty() {
                return Err(ConfigProblem::NoNumericAnswers);
            }
            parsed
        } else {
            Vec::new()
        };

        let pattern = if mode.regex {
            // The alternation must see the same side `evaluate` compares
            // against, so it is joined from the normalized answers.
            let joined = accepted.join("|");
            match Regex::new(&joined) {
                Ok(re) => Some(re),
                Err(e) => {
                    return Err(ConfigProblem::InvalidRegex {
                        pattern: joined,
                        message: e.to_string(),
                    });
                }
            }
        } else {
            None
        };

        Ok(Self {
            accepted,
            numeric,
            tolerance,
            pattern,
            ignore_case: mode.ignore_case,
            ignore_spaces: mode.ignore_spaces,
        })
    }

    /// Grade one submitted value.
    ///
    /// Precedence: empty input is neutral and wins over every mode; exact
    /// set membership decides correct/incorrect; tolerance and regex are
    /// additive checks that can upgrade to correct but never downgrade.
    pub fn evaluate(&self, submitted: &str) -> Verdict {
        let normalized = normalize(submitted, self.ignore_case, self.ignore_spaces);
        if normalized.is_empty() {
            return Verdict::Neutral;
        }

        let mut verdict = if self.accepted.iter().any(|a| *a == normalized) {
            Verdict::Correct
        } else {
            Verdict::Incorrect
        };

        if verdict != Verdict::Correct {
            if let (Some(tol), Ok(value)) = (self.tolerance, normalized.parse::<f64>()) {
                if self.numeric.iter().any(|a| (a - value).abs() < tol) {
                    verdict = Verdict::Correct;
                }
            }
        }

        if verdict != Verdict::Correct {
            if let Some(pattern) = &self.pattern {
                if pattern.is_match(&normalized) {
                    verdict = Verdict::Correct;
                }
            }
        }

        verdict
    }
}

fn normalize(raw: &str, ignore_case: bool, ignore_spaces: bool) -> String {
    let mut value = raw.to_string();
    if ignore_case {
        value = value.to_lowercase();
    }
    if ignore_spaces {
        value.retain(|c| c != ' ');
    }
    value
}
