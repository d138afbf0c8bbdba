// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Fuzz target for the assertion evaluator.
//!
//! The evaluator is the primitive everything rests on. It must never
//! panic, whatever suffix it is shown, and its definitive outcomes must
//! be monotone under prepending — the engine retires satisfied
//! assertions on that basis.

#![no_main]

use arbitrary::Arbitrary;
use auditree::{
    Assertion, AssertionOutcome, CandidateIndex, NotEliminatedBefore, NotEliminatedNext,
};
use libfuzzer_sys::fuzz_target;

const MAX_CANDIDATES: u32 = 6;

#[derive(Arbitrary, Debug)]
struct RawAssertion {
    neb: bool,
    winner: u32,
    loser: u32,
    continuing: Vec<u32>,
}

#[derive(Arbitrary, Debug)]
struct Input {
    assertion: RawAssertion,
    suffix: Vec<u32>,
    prepend: u32,
}

fn candidate(raw: u32) -> CandidateIndex {
    CandidateIndex(raw % MAX_CANDIDATES)
}

fn build_assertion(raw: &RawAssertion) -> Option<Assertion> {
    let winner = candidate(raw.winner);
    let loser = candidate(raw.loser);
    if winner == loser {
        return None;
    }
    if raw.neb {
        return Some(Assertion::Neb(NotEliminatedBefore { winner, loser }));
    }
    let mut continuing: Vec<CandidateIndex> = vec![winner, loser];
    for &member in &raw.continuing {
        let member = candidate(member);
        if !continuing.contains(&member) {
            continuing.push(member);
        }
    }
    Some(Assertion::Nen(NotEliminatedNext {
        winner,
        loser,
        continuing,
    }))
}

/// Dedup the raw suffix into a valid duplicate-free partial order.
fn build_suffix(raw: &[u32]) -> Vec<CandidateIndex> {
    let mut suffix = Vec::new();
    for &entry in raw {
        let entry = candidate(entry);
        if !suffix.contains(&entry) {
            suffix.push(entry);
        }
    }
    suffix
}

fuzz_target!(|input: Input| {
    let Some(assertion) = build_assertion(&input.assertion) else {
        return;
    };
    let suffix = build_suffix(&input.suffix);

    // Property 1: total — never panics, always classifies.
    let outcome = assertion.evaluate(&suffix);

    // Property 2: full orders are always definitive.
    if suffix.len() == MAX_CANDIDATES as usize {
        assert!(
            outcome.is_definitive(),
            "full order {:?} left {} undetermined",
            suffix,
            assertion
        );
    }

    // Property 3: definitive outcomes are monotone under prepending.
    let extra = candidate(input.prepend);
    if outcome != AssertionOutcome::Undetermined && !suffix.contains(&extra) {
        let mut longer = vec![extra];
        longer.extend_from_slice(&suffix);
        assert_eq!(
            outcome,
            assertion.evaluate(&longer),
            "outcome changed when prepending {} to {:?}",
            extra,
            suffix
        );
    }
});
