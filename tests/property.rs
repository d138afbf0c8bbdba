//! Property tests for the guarantees the engine is built on: classification
//! dichotomy on full orders, monotonicity, expansion idempotence,
//! engine agreement between recording modes, and trim sufficiency on
//! synthetic sufficient sets.

use auditree::{
    all_elimination_orders, expand_all, trim_assertions, unit_suffixes, verify_all,
    verify_candidate, Assertion, AssertionOutcome, Budget, CandidateIndex, EliminationOrder,
    EliminationOrderSuffix, NotEliminatedBefore, NotEliminatedNext, TrimAlgorithm,
};
use proptest::prelude::*;

const N: u32 = 4;

fn arb_candidate() -> impl Strategy<Value = u32> {
    0..N
}

fn arb_assertion() -> impl Strategy<Value = Assertion> {
    let neb = (arb_candidate(), arb_candidate())
        .prop_filter("endpoints must differ", |(winner, loser)| winner != loser)
        .prop_map(|(winner, loser)| {
            Assertion::Neb(NotEliminatedBefore {
                winner: CandidateIndex(winner),
                loser: CandidateIndex(loser),
            })
        });
    let nen = (
        arb_candidate(),
        arb_candidate(),
        proptest::collection::vec(proptest::bool::ANY, N as usize),
    )
        .prop_filter("endpoints must differ", |(winner, loser, _)| winner != loser)
        .prop_map(|(winner, loser, membership)| {
            let mut continuing: Vec<CandidateIndex> = membership
                .iter()
                .enumerate()
                .filter(|&(_, &member)| member)
                .map(|(candidate, _)| CandidateIndex(candidate as u32))
                .collect();
            for endpoint in [CandidateIndex(winner), CandidateIndex(loser)] {
                if !continuing.contains(&endpoint) {
                    continuing.push(endpoint);
                }
            }
            continuing.sort_unstable();
            Assertion::Nen(NotEliminatedNext {
                winner: CandidateIndex(winner),
                loser: CandidateIndex(loser),
                continuing,
            })
        });
    prop_oneof![neb, nen]
}

fn arb_assertions() -> impl Strategy<Value = Vec<Assertion>> {
    proptest::collection::vec(arb_assertion(), 1..8)
}

fn arb_full_order() -> impl Strategy<Value = EliminationOrder> {
    Just((0..N).map(CandidateIndex).collect::<Vec<_>>()).prop_shuffle()
}

/// A duplicate-free partial suffix of length 1..=N.
fn arb_suffix() -> impl Strategy<Value = EliminationOrderSuffix> {
    (arb_full_order(), 1..=N as usize)
        .prop_map(|(order, length)| order[order.len() - length..].to_vec())
}

/// NEB(winner, c) for every other candidate c: trivially sufficient,
/// since every non-winner root is contradicted outright.
fn neb_fortress(winner: u32) -> Vec<Assertion> {
    (0..N)
        .filter(|&loser| loser != winner)
        .map(|loser| {
            Assertion::Neb(NotEliminatedBefore {
                winner: CandidateIndex(winner),
                loser: CandidateIndex(loser),
            })
        })
        .collect()
}

proptest! {
    /// §dichotomy: a full order leaves nothing undetermined.
    #[test]
    fn full_orders_never_evaluate_undetermined(
        assertions in arb_assertions(),
        order in arb_full_order(),
    ) {
        for assertion in &assertions {
            prop_assert!(assertion.evaluate(&order).is_definitive());
        }
    }

    /// An order every assertion satisfies is exactly an order the
    /// expansion pipeline lets through.
    #[test]
    fn satisfied_orders_survive_pruning_expansion(
        assertions in arb_assertions(),
        order in arb_full_order(),
    ) {
        let all_satisfied = assertions
            .iter()
            .all(|a| a.evaluate(&order) == AssertionOutcome::Satisfied);
        let mut frontier = vec![order.clone()];
        for assertion in &assertions {
            frontier = expand_all(assertion, frontier, N, false);
        }
        prop_assert_eq!(all_satisfied, !frontier.is_empty());
    }

    /// Satisfied and Contradiction both survive arbitrary prepending.
    #[test]
    fn definitive_outcomes_are_monotone(
        assertion in arb_assertion(),
        partial in arb_suffix(),
    ) {
        let outcome = assertion.evaluate(&partial);
        prop_assume!(outcome.is_definitive());
        let missing: Vec<CandidateIndex> = (0..N)
            .map(CandidateIndex)
            .filter(|candidate| !partial.contains(candidate))
            .collect();
        for &candidate in &missing {
            let mut longer = vec![candidate];
            longer.extend_from_slice(&partial);
            prop_assert_eq!(outcome, assertion.evaluate(&longer));
        }
    }

    /// Expanding an already-definitive frontier changes nothing.
    #[test]
    fn expansion_is_idempotent(
        assertion in arb_assertion(),
        keep in proptest::bool::ANY,
    ) {
        let once = expand_all(&assertion, unit_suffixes(N), N, keep);
        let twice = expand_all(&assertion, once.clone(), N, keep);
        prop_assert_eq!(once, twice);
    }

    /// The engine's verdict must agree with brute force over all n!
    /// orders: a candidate is ruled out exactly when no full order ending
    /// in it satisfies every assertion.
    #[test]
    fn engine_agrees_with_brute_force(
        assertions in arb_assertions(),
        candidate in arb_candidate(),
    ) {
        let candidate = CandidateIndex(candidate);
        let mut budget = Budget::unlimited();
        let verdict =
            verify_candidate(candidate, &assertions, N, &mut budget).unwrap();
        let survivable = all_elimination_orders(N).into_iter().any(|order| {
            *order.last().unwrap() == candidate
                && assertions
                    .iter()
                    .all(|a| a.evaluate(&order) == AssertionOutcome::Satisfied)
        });
        prop_assert_eq!(survivable, !verdict.ruled_out);
    }

    /// A counterexample, when reported, is never contradicted and really
    /// ends in the candidate under test.
    #[test]
    fn counterexamples_check_out(
        assertions in arb_assertions(),
        candidate in arb_candidate(),
    ) {
        let candidate = CandidateIndex(candidate);
        let mut budget = Budget::unlimited();
        let verdict =
            verify_candidate(candidate, &assertions, N, &mut budget).unwrap();
        if let Some(counterexample) = &verdict.counterexample {
            prop_assert!(!verdict.ruled_out);
            prop_assert_eq!(Some(&candidate), counterexample.last());
            for assertion in &assertions {
                prop_assert_ne!(
                    AssertionOutcome::Contradiction,
                    assertion.evaluate(counterexample)
                );
            }
        }
    }

    /// Trimming a sufficient set (a NEB fortress plus arbitrary noise)
    /// must yield a subset that is still sufficient, under either
    /// objective.
    #[test]
    fn trimmed_subsets_remain_sufficient(
        winner in arb_candidate(),
        noise in proptest::collection::vec(arb_assertion(), 0..6),
        minimize_assertions in proptest::bool::ANY,
    ) {
        let winner = CandidateIndex(winner);
        let mut assertions = neb_fortress(winner.get());
        assertions.extend(noise);
        // The noise can accidentally rule the winner out; sufficiency for
        // the losers is unaffected either way.
        let algorithm = if minimize_assertions {
            TrimAlgorithm::MinimizeAssertions
        } else {
            TrimAlgorithm::MinimizeTree
        };
        let mut budget = Budget::unlimited();
        let result =
            trim_assertions(winner, &assertions, N, algorithm, &mut budget).unwrap();
        prop_assert!(result.optimized);
        let subset: Vec<Assertion> = result
            .kept
            .iter()
            .map(|&index| assertions[index].clone())
            .collect();
        let mut budget = Budget::unlimited();
        let verification = verify_all(winner, &subset, N, &mut budget).unwrap();
        prop_assert!(verification.proves_winner);
        prop_assert!(result.kept.len() <= assertions.len());
    }

    /// Suffix reconstruction from the arena matches the path the search
    /// took: every reachable node's suffix is duplicate-free and ends in
    /// the root candidate.
    #[test]
    fn arena_suffixes_are_well_formed(
        assertions in arb_assertions(),
        candidate in arb_candidate(),
    ) {
        let candidate = CandidateIndex(candidate);
        let mut budget = Budget::unlimited();
        let verdict =
            verify_candidate(candidate, &assertions, N, &mut budget).unwrap();
        let tree = &verdict.tree;
        let mut pending = vec![auditree::VerificationTree::ROOT];
        while let Some(index) = pending.pop() {
            let suffix = tree.suffix_of(index);
            prop_assert_eq!(Some(&candidate), suffix.last());
            prop_assert_eq!(suffix.len(), tree.node(index).depth);
            for (position, placed) in suffix.iter().enumerate() {
                prop_assert!(!suffix[..position].contains(placed));
            }
            pending.extend_from_slice(&tree.node(index).children);
        }
    }
}

#[test]
fn expansion_never_loses_a_satisfied_order() {
    // Deterministic companion to the proptest above: expanding the unit
    // frontier under one assertion covers exactly the full orders that
    // assertion allows.
    let assertion = Assertion::Nen(NotEliminatedNext {
        winner: CandidateIndex(0),
        loser: CandidateIndex(2),
        continuing: vec![CandidateIndex(0), CandidateIndex(1), CandidateIndex(2)],
    });
    let expanded = expand_all(&assertion, unit_suffixes(N), N, false);
    for order in all_elimination_orders(N) {
        let allowed = assertion.evaluate(&order) == AssertionOutcome::Satisfied;
        let covered = expanded.iter().any(|branch| order.ends_with(branch));
        assert_eq!(allowed, covered, "order {:?}", order);
    }
}
