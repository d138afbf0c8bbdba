// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The assertion evaluator: classify one assertion against one suffix.
//!
//! This is the primitive everything else is built from. The suffix expander
//! calls it to decide where more detail is needed, the verification engine
//! calls it at every tree node, and the trimmers inherit it through the
//! engine. It is pure: one assertion, one suffix, no cross-assertion state,
//! no allocation.
//!
//! Suffixes are read earliest-eliminated first, so classification scans
//! *backward* from the final-survivor end — that end is fully specified,
//! while everything before `suffix[0]` is unknown.

use crate::types::{
    Assertion, AssertionOutcome, CandidateIndex, NotEliminatedBefore, NotEliminatedNext,
};

impl NotEliminatedBefore {
    /// Scan from the final-survivor end toward the unspecified boundary.
    ///
    /// Whichever endpoint appears first (scanning backward) settles the
    /// branch: the winner appearing first means the winner outlasted the
    /// loser here no matter how the prefix is filled in; the loser first
    /// means this branch hypothesizes the loser outlasting the winner,
    /// which the assertion forbids. Neither appearing leaves the relative
    /// order to the unspecified portion.
    pub fn evaluate(&self, suffix: &[CandidateIndex]) -> AssertionOutcome {
        for &candidate in suffix.iter().rev() {
            if candidate == self.winner {
                return AssertionOutcome::Satisfied;
            }
            if candidate == self.loser {
                return AssertionOutcome::Contradiction;
            }
        }
        AssertionOutcome::Undetermined
    }
}

impl NotEliminatedNext {
    /// Inspect the trailing window of length `min(|continuing|, |suffix|)`.
    ///
    /// The assertion describes the single round at which exactly the
    /// continuing candidates remain. If the window holds any outsider, that
    /// round never happens on this branch and the assertion is vacuously
    /// satisfied. If the window is the full continuing set, its earliest
    /// entry is the candidate this branch eliminates at that round — the
    /// assertion forbids that being the winner. A shorter all-member window
    /// is satisfied once the winner is known to survive past the round, and
    /// undetermined otherwise.
    pub fn evaluate(&self, suffix: &[CandidateIndex]) -> AssertionOutcome {
        let round = self.continuing.len();
        let window = if suffix.len() > round {
            &suffix[suffix.len() - round..]
        } else {
            suffix
        };
        for &candidate in window {
            if !self.is_continuing(candidate) {
                return AssertionOutcome::Satisfied;
            }
        }
        if window.len() == round {
            // One candidate per slot: the window *is* the continuing set,
            // and window[0] is the one eliminated at the described round.
            if window[0] == self.winner {
                AssertionOutcome::Contradiction
            } else {
                AssertionOutcome::Satisfied
            }
        } else if window.contains(&self.winner) {
            AssertionOutcome::Satisfied
        } else {
            AssertionOutcome::Undetermined
        }
    }
}

impl Assertion {
    /// Classify this assertion against a tail-anchored partial elimination
    /// order.
    ///
    /// `Satisfied` and `Contradiction` are monotone: once reached, every
    /// longer suffix extending this one classifies the same way. The
    /// verification engine leans on that to retire satisfied assertions
    /// permanently along a branch.
    pub fn evaluate(&self, suffix: &[CandidateIndex]) -> AssertionOutcome {
        match self {
            Assertion::Neb(neb) => neb.evaluate(suffix),
            Assertion::Nen(nen) => nen.evaluate(suffix),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::{neb, nen, suffix};
    use crate::types::AssertionOutcome::{Contradiction, Satisfied, Undetermined};

    #[test]
    fn neb_settled_by_whichever_endpoint_is_later() {
        let assertion = neb(0, 1); // A = 0 outlasts B = 1
        assert_eq!(Satisfied, assertion.evaluate(&suffix(&[1, 0])));
        assert_eq!(Contradiction, assertion.evaluate(&suffix(&[0, 1])));
    }

    #[test]
    fn neb_ignores_unrelated_candidates() {
        let assertion = neb(0, 1);
        assert_eq!(Satisfied, assertion.evaluate(&suffix(&[1, 3, 0, 2])));
        assert_eq!(Contradiction, assertion.evaluate(&suffix(&[0, 3, 1, 2])));
        assert_eq!(Undetermined, assertion.evaluate(&suffix(&[2, 3])));
    }

    #[test]
    fn neb_empty_suffix_is_undetermined() {
        assert_eq!(Undetermined, neb(0, 1).evaluate(&[]));
    }

    #[test]
    fn nen_exact_window_checks_first_eliminated() {
        let assertion = nen(0, 1, &[0, 1, 2]); // X=0, Y=1, Z=2
        assert_eq!(Contradiction, assertion.evaluate(&suffix(&[0, 1, 2])));
        assert_eq!(Satisfied, assertion.evaluate(&suffix(&[1, 0, 2])));
    }

    #[test]
    fn nen_outsider_in_window_is_vacuously_satisfied() {
        let assertion = nen(0, 1, &[0, 1]);
        // Window of length 2 is [2, 0]; candidate 2 is not continuing.
        assert_eq!(Satisfied, assertion.evaluate(&suffix(&[1, 2, 0])));
    }

    #[test]
    fn nen_only_trailing_window_matters() {
        let assertion = nen(0, 1, &[0, 1]);
        // Suffix longer than the continuing set: [3, 0, 1] has window [0, 1],
        // whose earliest entry 0 is the winner.
        assert_eq!(Contradiction, assertion.evaluate(&suffix(&[3, 0, 1])));
    }

    #[test]
    fn nen_short_window_with_surviving_winner_is_satisfied() {
        let assertion = nen(0, 1, &[0, 1, 2]);
        // Only two of three continuing candidates placed, winner among them:
        // the winner survives past the described round on this branch.
        assert_eq!(Satisfied, assertion.evaluate(&suffix(&[1, 0])));
    }

    #[test]
    fn nen_short_window_without_winner_is_undetermined() {
        let assertion = nen(0, 1, &[0, 1, 2]);
        assert_eq!(Undetermined, assertion.evaluate(&suffix(&[1, 2])));
        assert_eq!(Undetermined, assertion.evaluate(&suffix(&[2])));
    }

    #[test]
    fn assertion_mentioning_no_suffix_member_is_vacuous() {
        // The round described involves candidates 0 and 1 only; a branch
        // ending in [3, 4] never reaches it.
        let assertion = nen(0, 1, &[0, 1]);
        assert_eq!(Satisfied, assertion.evaluate(&suffix(&[3, 4])));
    }

    #[test]
    fn monotone_once_satisfied() {
        let assertion = neb(2, 1);
        let base = suffix(&[1, 2]);
        assert_eq!(Satisfied, assertion.evaluate(&base));
        for extra in [0u32, 3] {
            let mut longer = suffix(&[extra]);
            longer.extend_from_slice(&base);
            assert_eq!(Satisfied, assertion.evaluate(&longer));
        }
    }

    #[test]
    fn monotone_once_contradicted() {
        let assertion = neb(2, 1);
        let base = suffix(&[2, 1]);
        assert_eq!(Contradiction, assertion.evaluate(&base));
        for extra in [0u32, 3] {
            let mut longer = suffix(&[extra]);
            longer.extend_from_slice(&base);
            assert_eq!(Contradiction, assertion.evaluate(&longer));
        }
    }
}
