// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Trimming: shrink a sufficient assertion set without weakening it.
//!
//! Assertion generators routinely emit redundancy — an assertion added to
//! kill one branch often turns out to also kill branches other assertions
//! were added for. Trimming rebuilds the verification trees, records every
//! assertion that could have pruned each dead branch, and then selects a
//! subset that still prunes everything.
//!
//! Two objectives are supported, and they genuinely conflict. In the
//! guide scenario's published variant, the round assertion `A1` prunes
//! `[..., Alice, Diego]` directly, but deeper assertions `A6` and `A4`
//! already kill every completion of that branch — so `A1` is unnecessary
//! if you only count assertions, yet dropping it makes the tree a human
//! has to walk strictly bigger. [`TrimAlgorithm::MinimizeTree`] keeps
//! `A1`; [`TrimAlgorithm::MinimizeAssertions`] drops it.
//!
//! Selection is a two-pass greedy heuristic over a set-cover-like
//! problem: first take every assertion that is the *only* way to kill
//! some branch, then sweep again and patch any branch nothing chosen
//! kills yet. Not proven optimal in general — see
//! `testing::adversarial_assertions` for a case where it overshoots —
//! but it has matched optimal results on realistic inputs.

use crate::budget::Budget;
use crate::types::{validate_assertions, Assertion, AuditError, CandidateIndex};
use crate::verify::{build_pruning_tree, ContinuationPolicy, VerificationTree};
use serde::{Deserialize, Serialize};

/// Which redundancy-removal objective to apply after verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrimAlgorithm {
    /// Don't trim at all.
    None,
    /// Keep the verification tree exactly as small as the full set makes
    /// it, even if that keeps a few extra assertions.
    MinimizeTree,
    /// Keep as few assertions as possible, even where that makes the tree
    /// a human walks larger and the search here slower.
    MinimizeAssertions,
}

impl TrimAlgorithm {
    fn continuation(self) -> Option<ContinuationPolicy> {
        match self {
            TrimAlgorithm::None => None,
            TrimAlgorithm::MinimizeTree => Some(ContinuationPolicy::StopImmediately),
            // NEB prunes are kept as-is rather than searched past: they are
            // almost never redundant and their descendant trees are huge.
            TrimAlgorithm::MinimizeAssertions => Some(ContinuationPolicy::StopOnNeb),
        }
    }
}

/// Diagnostics for one trimming run.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrimStatistics {
    /// Work units spent growing trees and sweeping them for selection.
    pub work_done: u64,
    /// Deepest suffix any tree had to reach.
    pub max_depth: usize,
}

/// The outcome of a trimming run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrimResult {
    /// Indices into the input list of the assertions to keep, in input
    /// order. Always itself sufficient.
    pub kept: Vec<usize>,
    /// False when the budget ran out and `kept` is the untrimmed input
    /// set — still valid, just not minimal.
    pub optimized: bool,
    pub statistics: TrimStatistics,
}

/// Choose a smaller subset of `assertions` that still rules out every
/// candidate other than `winner`.
///
/// The input must be sufficient: a candidate the full set cannot rule out
/// is reported as [`AuditError::InsufficientAssertions`]. Budget
/// exhaustion is *not* an error here — the input set is returned
/// unshrunk, flagged `optimized: false`, because an untrimmed sufficient
/// set is still a usable answer.
pub fn trim_assertions(
    winner: CandidateIndex,
    assertions: &[Assertion],
    num_candidates: u32,
    algorithm: TrimAlgorithm,
    budget: &mut Budget,
) -> Result<TrimResult, AuditError> {
    validate_assertions(num_candidates, assertions)?;
    if winner.0 >= num_candidates {
        return Err(AuditError::InvalidCandidateIndex {
            assertion: None,
            candidate: winner,
            num_candidates,
        });
    }
    let everything: Vec<usize> = (0..assertions.len()).collect();
    let Some(policy) = algorithm.continuation() else {
        return Ok(TrimResult {
            kept: everything,
            optimized: true,
            statistics: TrimStatistics::default(),
        });
    };
    let before = budget.work_done();
    let unoptimized = |budget: &Budget, max_depth: usize| TrimResult {
        kept: (0..assertions.len()).collect(),
        optimized: false,
        statistics: TrimStatistics {
            work_done: budget.work_done() - before,
            max_depth,
        },
    };

    // Grow one tree per losing candidate, recording every assertion that
    // individually contradicts each pruned node.
    let mut trees: Vec<VerificationTree> = Vec::new();
    let mut max_depth = 0;
    for candidate in 0..num_candidates {
        let candidate = CandidateIndex(candidate);
        if candidate == winner {
            continue;
        }
        match build_pruning_tree(candidate, assertions, num_candidates, policy, budget) {
            Ok(tree) => {
                if tree.root().valid {
                    return Err(AuditError::InsufficientAssertions { candidate });
                }
                max_depth = max_depth.max(tree.max_depth());
                trees.push(tree);
            }
            Err(AuditError::BudgetExceeded { nodes_visited }) => {
                log::warn!(
                    "trimming budget exceeded after {} nodes; returning the input set untrimmed",
                    nodes_visited
                );
                return Ok(unoptimized(budget, max_depth));
            }
            Err(other) => return Err(other),
        }
    }

    let mut selection = AssertionSelection::new(assertions.len());
    for tree in &trees {
        selection.select_forced(tree, VerificationTree::ROOT);
    }
    for tree in &trees {
        if let Err(AuditError::BudgetExceeded { nodes_visited }) =
            selection.select_remaining(tree, VerificationTree::ROOT, budget)
        {
            log::warn!(
                "trimming budget exceeded during selection after {} nodes; \
                 returning the input set untrimmed",
                nodes_visited
            );
            return Ok(unoptimized(budget, max_depth));
        }
    }

    let kept: Vec<usize> = everything
        .into_iter()
        .filter(|&index| selection.used[index])
        .collect();
    log::debug!(
        "trimmed {} assertions down to {}",
        assertions.len(),
        kept.len()
    );
    Ok(TrimResult {
        kept,
        optimized: true,
        statistics: TrimStatistics {
            work_done: budget.work_done() - before,
            max_depth,
        },
    })
}

/// The two-pass greedy selection.
///
/// The trees encode, per pruned node, a disjunction (any one recorded
/// assertion kills the node) and, where search continued past a prune, a
/// conjunctive alternative (every child independently blocked further
/// down). Pass one takes the forced choices; pass two patches whatever
/// the forced choices did not already cover, always preferring a single
/// direct assertion over a conjunctive alternative and choosing the first
/// in assertion order among equals.
struct AssertionSelection {
    used: Vec<bool>,
}

impl AssertionSelection {
    fn new(len: usize) -> Self {
        AssertionSelection {
            used: vec![false; len],
        }
    }

    /// Pass one: a pruned leaf with exactly one recorded assertion leaves
    /// no choice at all.
    fn select_forced(&mut self, tree: &VerificationTree, index: usize) {
        let node = tree.node(index);
        if node.pruning_assertions.is_empty() {
            for &child in &node.children {
                self.select_forced(tree, child);
            }
        } else if node.children.is_empty() && node.pruning_assertions.len() == 1 {
            self.used[node.pruning_assertions[0]] = true;
        }
        // A pruned node with children (or several options) waits for pass
        // two: a prior choice may cover it for free.
    }

    /// Is this node already killed by the selections so far — directly, or
    /// because every child is?
    fn already_blocked(&self, tree: &VerificationTree, index: usize) -> bool {
        let node = tree.node(index);
        node.pruning_assertions
            .iter()
            .any(|&assertion| self.used[assertion])
            || (!node.children.is_empty()
                && node
                    .children
                    .iter()
                    .all(|&child| self.already_blocked(tree, child)))
    }

    /// Pass two: cover every pruned node the forced pass left open.
    fn select_remaining(
        &mut self,
        tree: &VerificationTree,
        index: usize,
        budget: &mut Budget,
    ) -> Result<(), AuditError> {
        budget.consume()?;
        let node = tree.node(index);
        if node.pruning_assertions.is_empty() {
            for &child in &node.children {
                self.select_remaining(tree, child, budget)?;
            }
        } else if !self.already_blocked(tree, index) {
            // Nothing chosen covers this node; simplistically take its
            // first direct option.
            self.used[node.pruning_assertions[0]] = true;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        adversarial_assertions, guide_assertions, ADVERSARIAL_CANDIDATES, ADVERSARIAL_WINNER,
        GUIDE_CANDIDATES, GUIDE_WINNER,
    };
    use crate::verify::verify_all;

    fn trim_guide(algorithm: TrimAlgorithm) -> TrimResult {
        let mut budget = Budget::unlimited();
        trim_assertions(
            GUIDE_WINNER,
            &guide_assertions(),
            GUIDE_CANDIDATES,
            algorithm,
            &mut budget,
        )
        .unwrap()
    }

    fn is_sufficient(kept: &[usize], assertions: &[Assertion], winner: CandidateIndex, n: u32) -> bool {
        let subset: Vec<Assertion> = kept.iter().map(|&i| assertions[i].clone()).collect();
        let mut budget = Budget::unlimited();
        verify_all(winner, &subset, n, &mut budget)
            .unwrap()
            .proves_winner
    }

    #[test]
    fn none_keeps_everything() {
        let result = trim_guide(TrimAlgorithm::None);
        assert_eq!(vec![0, 1, 2, 3, 4, 5], result.kept);
        assert!(result.optimized);
    }

    #[test]
    fn guide_set_has_no_redundancy_under_minimize_tree() {
        // Every assertion in the guide set prunes some branch no other
        // assertion reaches, so trimming keeps all six.
        let result = trim_guide(TrimAlgorithm::MinimizeTree);
        assert_eq!(vec![0, 1, 2, 3, 4, 5], result.kept);
        assert!(result.optimized);
        assert!(result.statistics.max_depth >= 3);
    }

    #[test]
    fn trimmed_subsets_stay_sufficient() {
        let assertions = guide_assertions();
        for algorithm in [TrimAlgorithm::MinimizeTree, TrimAlgorithm::MinimizeAssertions] {
            let result = trim_guide(algorithm);
            assert!(is_sufficient(
                &result.kept,
                &assertions,
                GUIDE_WINNER,
                GUIDE_CANDIDATES
            ));
        }
    }

    #[test]
    fn redundant_assertion_is_dropped() {
        // Append a second copy of the NEB; the duplicate at index 6 can
        // never be forced, and pass two always finds index 4 first.
        let mut assertions = guide_assertions();
        assertions.push(assertions[4].clone());
        let mut budget = Budget::unlimited();
        let result = trim_assertions(
            GUIDE_WINNER,
            &assertions,
            GUIDE_CANDIDATES,
            TrimAlgorithm::MinimizeTree,
            &mut budget,
        )
        .unwrap();
        assert_eq!(vec![0, 1, 2, 3, 4, 5], result.kept);
    }

    #[test]
    fn greedy_selection_can_overshoot() {
        // The adversarial fixture's optimal sufficient subset is {1, 3};
        // the two-pass heuristic reaches candidate 0's tree first, keeps
        // assertion 0, and still needs 1 and 3 later. Characterize that:
        // three kept, versus a verified-sufficient two-assertion subset.
        let assertions = adversarial_assertions();
        let mut budget = Budget::unlimited();
        let result = trim_assertions(
            ADVERSARIAL_WINNER,
            &assertions,
            ADVERSARIAL_CANDIDATES,
            TrimAlgorithm::MinimizeTree,
            &mut budget,
        )
        .unwrap();
        assert_eq!(vec![0, 1, 3], result.kept);
        assert!(is_sufficient(
            &result.kept,
            &assertions,
            ADVERSARIAL_WINNER,
            ADVERSARIAL_CANDIDATES
        ));
        // The smaller subset the heuristic missed.
        assert!(is_sufficient(
            &[1, 3],
            &assertions,
            ADVERSARIAL_WINNER,
            ADVERSARIAL_CANDIDATES
        ));
    }

    #[test]
    fn insufficient_input_is_rejected() {
        // Only the guide's last assertion: candidate 1 cannot be ruled out.
        let assertions = vec![guide_assertions()[5].clone()];
        let mut budget = Budget::unlimited();
        let err = trim_assertions(
            GUIDE_WINNER,
            &assertions,
            GUIDE_CANDIDATES,
            TrimAlgorithm::MinimizeTree,
            &mut budget,
        )
        .unwrap_err();
        assert_eq!(
            AuditError::InsufficientAssertions {
                candidate: CandidateIndex(0)
            },
            err
        );
    }

    #[test]
    fn budget_exhaustion_returns_the_input_unoptimized() {
        let mut budget = Budget::from_limits(Some(2), None);
        let result = trim_guide_with(&mut budget);
        assert!(!result.optimized);
        assert_eq!(vec![0, 1, 2, 3, 4, 5], result.kept);
    }

    fn trim_guide_with(budget: &mut Budget) -> TrimResult {
        trim_assertions(
            GUIDE_WINNER,
            &guide_assertions(),
            GUIDE_CANDIDATES,
            TrimAlgorithm::MinimizeTree,
            budget,
        )
        .unwrap()
    }
}
