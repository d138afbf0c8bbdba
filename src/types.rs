// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The building blocks of an audit: candidates, assertions, outcomes, errors.
//!
//! Everything downstream (the evaluator, the search engine, the trimmers)
//! operates on the types in this module and nothing else. Candidate names,
//! ballot data, and the several third-party JSON dialects that describe
//! assertions are the concern of whatever feeds us — by the time data gets
//! here it is indices and tagged enums.
//!
//! # Invariants (the stuff that breaks if you ignore it)
//!
//! - **Assertion endpoints**: `winner != loser`, both in `[0, num_candidates)`.
//! - **NEN continuing set**: non-empty, duplicate-free, contains both
//!   `winner` and `loser`, every member in range.
//! - **Elimination-order suffix**: duplicate-free, read earliest-eliminated
//!   first; the *last* element is the hypothesized final survivor.
//!
//! Rather than trusting yourself to remember these, run
//! [`validate_assertions`] before any search. Violations come back as
//! [`AuditError`] values, never panics — a malformed problem file from the
//! web page must not take the page down.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

// =============================================================================
// NEWTYPES: Type-safe indices
// =============================================================================

/// A candidate, referred to by position on the ballot paper, 0 being first.
///
/// Names are a display-only concern that lives with the caller's metadata;
/// the core never sees them. The wrapper exists so a candidate index cannot
/// be confused with an assertion index — both are small integers and both
/// are everywhere in the search code.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct CandidateIndex(pub u32);

impl CandidateIndex {
    /// Create a new CandidateIndex, validating it's within bounds.
    #[inline]
    pub fn new(index: u32, num_candidates: u32) -> Option<Self> {
        if index < num_candidates {
            Some(CandidateIndex(index))
        } else {
            None
        }
    }

    /// Get the underlying value.
    #[inline]
    pub fn get(self) -> u32 {
        self.0
    }

    /// Convert to usize for array indexing.
    #[inline]
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for CandidateIndex {
    fn from(index: u32) -> Self {
        CandidateIndex(index)
    }
}

// Effectively a type alias; long Display/Debug forms make elimination
// orders unreadable, so print the bare number.
impl fmt::Display for CandidateIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for CandidateIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CandidateIndex {
    type Err = <u32 as FromStr>::Err;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(CandidateIndex(s.parse()?))
    }
}

/// A full elimination order: a permutation of all candidates, read
/// earliest-eliminated to last-remaining. The final element is that
/// order's local winner.
pub type EliminationOrder = Vec<CandidateIndex>;

/// The tail of an elimination order: the most recent eliminations up to and
/// including a hypothesized final survivor, with the earlier portion left
/// unspecified. Suffixes are the unit of search — a length-1 suffix `[c]`
/// hypothesizes that `c` survives to the end, and prepending a candidate
/// refines the hypothesis one step further into the past.
pub type EliminationOrderSuffix = Vec<CandidateIndex>;

// =============================================================================
// ASSERTIONS
// =============================================================================

/// Assert that `winner` is eliminated strictly after `loser` in *every*
/// possible elimination order — the winner is never the first of the pair
/// removed.
///
/// Known as "winner only" in the auditing literature. These are the blunt
/// instrument of the assertion family: cheap to check against a suffix and
/// they prune enormous subtrees, because they apply at every round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotEliminatedBefore {
    pub winner: CandidateIndex,
    pub loser: CandidateIndex,
}

/// Assert that at the specific round where exactly the candidates in
/// `continuing` remain, `winner` is not the one eliminated — its tally
/// exceeds `loser`'s at that round.
///
/// Unlike [`NotEliminatedBefore`], an NEN assertion speaks about a single
/// round, identified by the exact set of candidates still standing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotEliminatedNext {
    pub winner: CandidateIndex,
    pub loser: CandidateIndex,
    /// The candidates assumed still in contention at the round this
    /// assertion describes. Must include both `winner` and `loser`.
    /// Member order is irrelevant; membership tests are a linear scan
    /// since the set is at most `num_candidates` long.
    pub continuing: Vec<CandidateIndex>,
}

impl NotEliminatedNext {
    /// Is `candidate` a member of the continuing set?
    #[inline]
    pub(crate) fn is_continuing(&self, candidate: CandidateIndex) -> bool {
        self.continuing.contains(&candidate)
    }
}

/// One pairwise claim about the elimination process.
///
/// A closed sum type, matched exhaustively in the evaluator: no new
/// assertion kinds appear at runtime, and exhaustiveness is a correctness
/// property, not a style choice. The serde tag makes the explainer page's
/// JSON self-describing:
///
/// ```json
/// { "type": "NEB", "winner": 2, "loser": 1 }
/// { "type": "NEN", "winner": 0, "loser": 3, "continuing": [0, 2, 3] }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Assertion {
    #[serde(rename = "NEB")]
    Neb(NotEliminatedBefore),
    #[serde(rename = "NEN")]
    Nen(NotEliminatedNext),
}

impl Assertion {
    /// True for the NEB variant. The trimmer's continuation policy treats
    /// NEB prunes specially (see `ContinuationPolicy::StopOnNeb`).
    #[inline]
    pub fn is_neb(&self) -> bool {
        matches!(self, Assertion::Neb(_))
    }

    /// The candidate this assertion says survives the comparison.
    pub fn winner(&self) -> CandidateIndex {
        match self {
            Assertion::Neb(neb) => neb.winner,
            Assertion::Nen(nen) => nen.winner,
        }
    }

    /// The candidate this assertion says loses the comparison.
    pub fn loser(&self) -> CandidateIndex {
        match self {
            Assertion::Neb(neb) => neb.loser,
            Assertion::Nen(nen) => nen.loser,
        }
    }
}

impl fmt::Display for Assertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Assertion::Neb(neb) => write!(f, "NEB: {} beats {}", neb.winner, neb.loser),
            Assertion::Nen(nen) => {
                write!(f, "NEN: {} beats {} given {:?}", nen.winner, nen.loser, nen.continuing)
            }
        }
    }
}

// =============================================================================
// EVALUATION OUTCOMES
// =============================================================================

/// What one assertion says about one elimination-order suffix.
///
/// Both `Contradiction` and `Satisfied` are *final*: they hold for every
/// full elimination order extending the suffix, no matter how the
/// unspecified earlier portion is filled in. Only `Undetermined` requires
/// growing the suffix further into the past.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssertionOutcome {
    /// The suffix, and every extension of it, is impossible under the
    /// assertion.
    Contradiction,
    /// The suffix, and every extension of it, is compatible with the
    /// assertion.
    Satisfied,
    /// Compatibility depends on candidates not yet placed in the suffix.
    Undetermined,
}

impl AssertionOutcome {
    /// A final verdict — nothing more to learn by growing the suffix.
    #[inline]
    pub fn is_definitive(self) -> bool {
        self != AssertionOutcome::Undetermined
    }
}

// =============================================================================
// ERRORS
// =============================================================================

/// Everything that can go wrong in the core, as plain values.
///
/// Three families, deliberately kept in one enum so callers match once:
/// malformed input (detected eagerly, before any search), the trimming
/// precondition failure (`InsufficientAssertions`), and resource
/// exhaustion (`BudgetExceeded`). Note that an assertion set failing to
/// rule out a losing candidate is *not* an error during verification — it
/// is the verdict the caller asked for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditError {
    /// A contest needs at least one candidate.
    InvalidNumberOfCandidates { num_candidates: u32 },
    /// A candidate index is out of range. `assertion` is the offending
    /// assertion's position in the input list, or `None` when the winner
    /// field of the problem itself is bad.
    InvalidCandidateIndex {
        assertion: Option<usize>,
        candidate: CandidateIndex,
        num_candidates: u32,
    },
    /// An assertion compares a candidate with itself.
    DuplicateAssertionEndpoints {
        assertion: usize,
        candidate: CandidateIndex,
    },
    /// An NEN assertion with no continuing candidates describes no round.
    EmptyContinuingSet { assertion: usize },
    /// An NEN continuing set lists the same candidate twice.
    DuplicateContinuingCandidate {
        assertion: usize,
        candidate: CandidateIndex,
    },
    /// An NEN continuing set must contain its own winner and loser.
    ContinuingSetMissingEndpoint {
        assertion: usize,
        candidate: CandidateIndex,
    },
    /// The node or time budget ran out before the search finished. The
    /// result is indeterminate — raise the budget or, for trimming, accept
    /// the unoptimized result.
    BudgetExceeded { nodes_visited: u64 },
    /// Trimming requires a sufficient input set, but this candidate cannot
    /// be ruled out by the supplied assertions.
    InsufficientAssertions { candidate: CandidateIndex },
}

impl fmt::Display for AuditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditError::InvalidNumberOfCandidates { num_candidates } => {
                write!(f, "invalid number of candidates: {}", num_candidates)
            }
            AuditError::InvalidCandidateIndex {
                assertion,
                candidate,
                num_candidates,
            } => match assertion {
                Some(index) => write!(
                    f,
                    "assertion {}: candidate {} >= num_candidates {}",
                    index, candidate, num_candidates
                ),
                None => write!(
                    f,
                    "winner {} >= num_candidates {}",
                    candidate, num_candidates
                ),
            },
            AuditError::DuplicateAssertionEndpoints {
                assertion,
                candidate,
            } => write!(
                f,
                "assertion {}: winner and loser are both candidate {}",
                assertion, candidate
            ),
            AuditError::EmptyContinuingSet { assertion } => {
                write!(f, "assertion {}: continuing set is empty", assertion)
            }
            AuditError::DuplicateContinuingCandidate {
                assertion,
                candidate,
            } => write!(
                f,
                "assertion {}: candidate {} appears twice in the continuing set",
                assertion, candidate
            ),
            AuditError::ContinuingSetMissingEndpoint {
                assertion,
                candidate,
            } => write!(
                f,
                "assertion {}: candidate {} is compared but not in the continuing set",
                assertion, candidate
            ),
            AuditError::BudgetExceeded { nodes_visited } => {
                write!(f, "search budget exceeded after {} nodes", nodes_visited)
            }
            AuditError::InsufficientAssertions { candidate } => write!(
                f,
                "assertions do not rule out candidate {}; nothing to trim",
                candidate
            ),
        }
    }
}

impl std::error::Error for AuditError {}

// =============================================================================
// VALIDATION
// =============================================================================

/// Check every assertion against the invariants listed above.
///
/// Runs in O(total assertion size); call it once per analysis, before any
/// search. The first violation found is returned, identified by the
/// assertion's position in the input list so the web page can highlight it.
pub fn validate_assertions(
    num_candidates: u32,
    assertions: &[Assertion],
) -> Result<(), AuditError> {
    if num_candidates == 0 {
        return Err(AuditError::InvalidNumberOfCandidates { num_candidates });
    }
    let in_range = |index: usize, candidate: CandidateIndex| {
        if candidate.0 < num_candidates {
            Ok(())
        } else {
            Err(AuditError::InvalidCandidateIndex {
                assertion: Some(index),
                candidate,
                num_candidates,
            })
        }
    };
    for (index, assertion) in assertions.iter().enumerate() {
        let (winner, loser) = (assertion.winner(), assertion.loser());
        in_range(index, winner)?;
        in_range(index, loser)?;
        if winner == loser {
            return Err(AuditError::DuplicateAssertionEndpoints {
                assertion: index,
                candidate: winner,
            });
        }
        if let Assertion::Nen(nen) = assertion {
            if nen.continuing.is_empty() {
                return Err(AuditError::EmptyContinuingSet { assertion: index });
            }
            for (position, &member) in nen.continuing.iter().enumerate() {
                in_range(index, member)?;
                if nen.continuing[..position].contains(&member) {
                    return Err(AuditError::DuplicateContinuingCandidate {
                        assertion: index,
                        candidate: member,
                    });
                }
            }
            for endpoint in [winner, loser] {
                if !nen.is_continuing(endpoint) {
                    return Err(AuditError::ContinuingSetMissingEndpoint {
                        assertion: index,
                        candidate: endpoint,
                    });
                }
            }
        }
    }
    Ok(())
}

// =============================================================================
// PROBLEM SURFACE
// =============================================================================

/// An audit problem as it arrives from a collaborator: the CLI, the
/// explainer web page, or a test.
///
/// The format-conversion layers that translate third-party assertion
/// dialects into this shape live outside the core; this is the one wire
/// format the core speaks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditProblem {
    /// Free-form caller data (candidate names, contest title). Carried
    /// through untouched so reports can echo it back.
    #[serde(default)]
    pub metadata: serde_json::Value,
    pub num_candidates: u32,
    /// The declared winner the assertion set claims to prove.
    pub winner: CandidateIndex,
    pub assertions: Vec<Assertion>,
    /// Maximum search-tree nodes to allocate before giving up.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_budget: Option<u64>,
    /// Wall-clock limit in seconds. Ignored on wasm targets, which have
    /// no monotonic clock; use `node_budget` there.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_budget_seconds: Option<f64>,
}

impl AuditProblem {
    /// Parse a problem from its JSON representation.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Read a problem from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw).map_err(std::io::Error::other)
    }

    /// Eagerly validate the winner index and every assertion.
    pub fn validate(&self) -> Result<(), AuditError> {
        if self.num_candidates == 0 {
            return Err(AuditError::InvalidNumberOfCandidates {
                num_candidates: self.num_candidates,
            });
        }
        if self.winner.0 >= self.num_candidates {
            return Err(AuditError::InvalidCandidateIndex {
                assertion: None,
                candidate: self.winner,
                num_candidates: self.num_candidates,
            });
        }
        validate_assertions(self.num_candidates, &self.assertions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn neb(winner: u32, loser: u32) -> Assertion {
        Assertion::Neb(NotEliminatedBefore {
            winner: CandidateIndex(winner),
            loser: CandidateIndex(loser),
        })
    }

    fn nen(winner: u32, loser: u32, continuing: &[u32]) -> Assertion {
        Assertion::Nen(NotEliminatedNext {
            winner: CandidateIndex(winner),
            loser: CandidateIndex(loser),
            continuing: continuing.iter().map(|&c| CandidateIndex(c)).collect(),
        })
    }

    #[test]
    fn valid_assertions_pass() {
        let assertions = vec![neb(2, 1), nen(0, 3, &[0, 2, 3])];
        assert_eq!(Ok(()), validate_assertions(4, &assertions));
    }

    #[test]
    fn zero_candidates_rejected() {
        assert_eq!(
            Err(AuditError::InvalidNumberOfCandidates { num_candidates: 0 }),
            validate_assertions(0, &[])
        );
    }

    #[test]
    fn out_of_range_candidate_rejected() {
        let err = validate_assertions(3, &[neb(0, 3)]).unwrap_err();
        assert_eq!(
            AuditError::InvalidCandidateIndex {
                assertion: Some(0),
                candidate: CandidateIndex(3),
                num_candidates: 3,
            },
            err
        );
    }

    #[test]
    fn self_comparison_rejected() {
        let err = validate_assertions(3, &[neb(1, 1)]).unwrap_err();
        assert_eq!(
            AuditError::DuplicateAssertionEndpoints {
                assertion: 0,
                candidate: CandidateIndex(1),
            },
            err
        );
    }

    #[test]
    fn empty_continuing_set_rejected() {
        let err = validate_assertions(3, &[nen(0, 1, &[])]).unwrap_err();
        assert_eq!(AuditError::EmptyContinuingSet { assertion: 0 }, err);
    }

    #[test]
    fn continuing_set_must_contain_endpoints() {
        let err = validate_assertions(4, &[nen(0, 1, &[0, 2, 3])]).unwrap_err();
        assert_eq!(
            AuditError::ContinuingSetMissingEndpoint {
                assertion: 0,
                candidate: CandidateIndex(1),
            },
            err
        );
    }

    #[test]
    fn duplicate_continuing_member_rejected() {
        let err = validate_assertions(4, &[nen(0, 1, &[0, 1, 1])]).unwrap_err();
        assert_eq!(
            AuditError::DuplicateContinuingCandidate {
                assertion: 0,
                candidate: CandidateIndex(1),
            },
            err
        );
    }

    #[test]
    fn assertion_json_round_trip() {
        let assertion = nen(0, 3, &[0, 2, 3]);
        let encoded = serde_json::to_string(&assertion).unwrap();
        assert!(encoded.contains("\"type\":\"NEN\""));
        let decoded: Assertion = serde_json::from_str(&encoded).unwrap();
        assert_eq!(assertion, decoded);
    }

    #[test]
    fn problem_json_defaults() {
        let problem = AuditProblem::from_json(
            r#"{"numCandidates": 3, "winner": 2, "assertions": [{"type": "NEB", "winner": 2, "loser": 0}]}"#,
        )
        .unwrap();
        assert_eq!(3, problem.num_candidates);
        assert_eq!(CandidateIndex(2), problem.winner);
        assert_eq!(None, problem.node_budget);
        assert_eq!(Ok(()), problem.validate());
    }
}
