//! Test utilities shared across unit and integration tests.
//!
//! This module is always compiled but hidden from documentation.
//! It provides canonical fixtures so the guide scenario is written down
//! exactly once.

#![doc(hidden)]

use crate::types::{
    Assertion, CandidateIndex, EliminationOrderSuffix, NotEliminatedBefore, NotEliminatedNext,
};

/// Shorthand NEB constructor.
pub fn neb(winner: u32, loser: u32) -> Assertion {
    Assertion::Neb(NotEliminatedBefore {
        winner: CandidateIndex(winner),
        loser: CandidateIndex(loser),
    })
}

/// Shorthand NEN constructor.
pub fn nen(winner: u32, loser: u32, continuing: &[u32]) -> Assertion {
    Assertion::Nen(NotEliminatedNext {
        winner: CandidateIndex(winner),
        loser: CandidateIndex(loser),
        continuing: continuing.iter().map(|&c| CandidateIndex(c)).collect(),
    })
}

/// Build a suffix from bare candidate numbers.
pub fn suffix(candidates: &[u32]) -> EliminationOrderSuffix {
    candidates.iter().map(|&c| CandidateIndex(c)).collect()
}

/// Number of candidates in the guide scenario.
pub const GUIDE_CANDIDATES: u32 = 4;

/// Declared winner of the guide scenario.
pub const GUIDE_WINNER: CandidateIndex = CandidateIndex(2);

/// The worked four-candidate scenario used throughout the documentation:
/// six assertions that jointly rule out candidates 0, 1 and 3, leaving
/// candidate 2 as the only possible final survivor.
pub fn guide_assertions() -> Vec<Assertion> {
    vec![
        nen(0, 1, &[0, 1, 2, 3]),
        nen(0, 3, &[0, 2, 3]),
        nen(2, 0, &[0, 2]),
        nen(2, 3, &[0, 2, 3]),
        neb(2, 1),
        nen(0, 3, &[0, 3]),
    ]
}

/// Number of candidates in the adversarial trimming scenario.
pub const ADVERSARIAL_CANDIDATES: u32 = 3;

/// Declared winner of the adversarial trimming scenario.
pub const ADVERSARIAL_WINNER: CandidateIndex = CandidateIndex(2);

/// A three-candidate set built to make the greedy two-pass selection pick
/// more assertions than necessary.
///
/// Candidate 0's root is contradicted by both assertions 0 and 1;
/// candidate 1's branch `[0, 1]` is contradicted by both 1 and 2, and its
/// branch `[2, 1]` only by 3. The optimal sufficient subset is `{1, 3}`,
/// but the second selection pass reaches candidate 0's root first, keeps
/// assertion 0, and later keeps assertion 1 anyway for `[0, 1]` — three
/// assertions where two suffice.
pub fn adversarial_assertions() -> Vec<Assertion> {
    vec![
        neb(1, 0),
        neb(2, 0),
        nen(0, 1, &[0, 1]),
        nen(2, 1, &[1, 2]),
    ]
}
