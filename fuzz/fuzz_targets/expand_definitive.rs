// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Fuzz target for the suffix expander.
//!
//! Expansion must terminate, classify every branch it returns, and be a
//! fixed point on its own output. Candidate counts stay small here —
//! expansion is deliberately factorial in the worst case, and the fuzzer
//! should spend its time on logic, not on enumerating permutations.

#![no_main]

use arbitrary::Arbitrary;
use auditree::{
    expand_all, expand_suffix, unit_suffixes, Assertion, CandidateIndex, NotEliminatedBefore,
    NotEliminatedNext,
};
use libfuzzer_sys::fuzz_target;

const MAX_CANDIDATES: u32 = 5;

#[derive(Arbitrary, Debug)]
struct Input {
    neb: bool,
    winner: u32,
    loser: u32,
    continuing: Vec<u32>,
    keep_contradictions: bool,
}

fn candidate(raw: u32) -> CandidateIndex {
    CandidateIndex(raw % MAX_CANDIDATES)
}

fuzz_target!(|input: Input| {
    let winner = candidate(input.winner);
    let loser = candidate(input.loser);
    if winner == loser {
        return;
    }
    let assertion = if input.neb {
        Assertion::Neb(NotEliminatedBefore { winner, loser })
    } else {
        let mut continuing = vec![winner, loser];
        for &member in &input.continuing {
            let member = candidate(member);
            if !continuing.contains(&member) {
                continuing.push(member);
            }
        }
        Assertion::Nen(NotEliminatedNext {
            winner,
            loser,
            continuing,
        })
    };

    let frontier = unit_suffixes(MAX_CANDIDATES);
    let expanded = expand_all(
        &assertion,
        frontier,
        MAX_CANDIDATES,
        input.keep_contradictions,
    );

    // Property 1: every branch is definitive (checked again here in
    // release mode, where the library's debug contracts are compiled out).
    for branch in &expanded {
        assert!(
            assertion.evaluate(branch).is_definitive(),
            "expansion left {:?} undetermined for {}",
            branch,
            assertion
        );
    }

    // Property 2: idempotence — re-expanding changes nothing.
    let again = expand_all(
        &assertion,
        expanded.clone(),
        MAX_CANDIDATES,
        input.keep_contradictions,
    );
    assert_eq!(expanded, again);

    // Property 3: single-suffix expansion agrees with the pointwise union.
    let direct: Vec<_> = (0..MAX_CANDIDATES)
        .flat_map(|c| {
            expand_suffix(
                &assertion,
                vec![CandidateIndex(c)],
                MAX_CANDIDATES,
                input.keep_contradictions,
            )
        })
        .collect();
    assert_eq!(expanded, direct);
});
