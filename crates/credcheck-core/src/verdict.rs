//! Deterministic mapping from (ranked candidates, flags) to a verdict.
//!
//! The policy is an explicit ordered decision list: each rule pairs a
//! guard with an outcome, the first guard that holds wins, and the final
//! guard is unconditional, so [`decide`] is total. Persisting the result
//! is the caller's job, not the policy's.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{FlagSet, MatchCandidate};

/// Final classification of one verification attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Valid,
    Invalid,
    Suspicious,
    /// Extraction or pipeline failure; no decision logic ran to completion.
    Error,
}

impl Verdict {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Valid => "VALID",
            Self::Invalid => "INVALID",
            Self::Suspicious => "SUSPICIOUS",
            Self::Error => "ERROR",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "VALID" => Some(Self::Valid),
            "INVALID" => Some(Self::Invalid),
            "SUSPICIOUS" => Some(Self::Suspicious),
            "ERROR" => Some(Self::Error),
            _ => None,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A verdict plus its confidence score in 0..=100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub verdict: Verdict,
    pub confidence: u8,
}

/// Flags that invalidate an attempt on their own, whichever family they
/// came from.
pub const CRITICAL_FLAGS: &[&str] = &[
    "FUTURE_DATE",
    "INACTIVE_INSTITUTION",
    "CERT_NUMBER_NAME_MISMATCH",
];

/// One row of the decision list.
struct PolicyRule {
    name: &'static str,
    applies: fn(Option<u32>, &FlagSet) -> bool,
    outcome: Decision,
}

const RULES: &[PolicyRule] = &[
    PolicyRule {
        name: "critical-flag",
        applies: |_, flags| flags.iter().any(|f| CRITICAL_FLAGS.contains(&f)),
        outcome: Decision {
            verdict: Verdict::Invalid,
            confidence: 10,
        },
    },
    PolicyRule {
        name: "unmatched-many-flags",
        applies: |best, flags| best.is_none() && flags.len() > 2,
        outcome: Decision {
            verdict: Verdict::Invalid,
            confidence: 20,
        },
    },
    PolicyRule {
        name: "unmatched",
        applies: |best, _| best.is_none(),
        outcome: Decision {
            verdict: Verdict::Suspicious,
            confidence: 30,
        },
    },
    PolicyRule {
        name: "strong-match-clean",
        applies: |best, flags| matches!(best, Some(s) if s >= 80) && flags.is_empty(),
        outcome: Decision {
            verdict: Verdict::Valid,
            confidence: 95,
        },
    },
    PolicyRule {
        name: "good-match-one-flag",
        applies: |best, flags| matches!(best, Some(s) if s >= 70) && flags.len() <= 1,
        outcome: Decision {
            verdict: Verdict::Valid,
            confidence: 85,
        },
    },
    PolicyRule {
        name: "fair-match-few-flags",
        applies: |best, flags| matches!(best, Some(s) if s >= 60) && flags.len() <= 2,
        outcome: Decision {
            verdict: Verdict::Suspicious,
            confidence: 70,
        },
    },
    PolicyRule {
        name: "weak-match",
        applies: |_, _| true,
        outcome: Decision {
            verdict: Verdict::Invalid,
            confidence: 40,
        },
    },
];

/// Reduce ranked candidates and the combined flag set to a decision.
///
/// Only the top-ranked candidate's score participates; `candidates` is
/// expected sorted as produced by candidate search.
pub fn decide(candidates: &[MatchCandidate], flags: &FlagSet) -> Decision {
    let best = candidates.first().map(|c| c.score);
    for rule in RULES {
        if (rule.applies)(best, flags) {
            debug!(
                rule = rule.name,
                verdict = rule.outcome.verdict.as_str(),
                confidence = rule.outcome.confidence,
                "decision rule fired"
            );
            return rule.outcome;
        }
    }
    // The final rule's guard is unconditional.
    Decision {
        verdict: Verdict::Invalid,
        confidence: 40,
    }
}
