// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The suffix expander and the elimination-order space.
//!
//! An `Undetermined` classification means the suffix is too short for the
//! assertion to speak; the fix is to grow it one candidate further into
//! the past, once per candidate not already placed. Repeating until every
//! branch is definitive turns one ambiguous suffix into the complete set
//! of definitive refinements — this is how the explainer page shows *why*
//! an assertion carves up the space of elimination orders.
//!
//! Each recursive step strictly grows the suffix and candidates are
//! finite, so depth is bounded by `num_candidates`; the worst case is the
//! full `num_candidates!` fan-out, but most assertions resolve after
//! inspecting only a few trailing candidates. That is why the canonical
//! starting frontier is the n length-1 suffixes from [`unit_suffixes`],
//! not the factorial enumeration from [`all_elimination_orders`] (which
//! exists for display, where a fully expanded starting point is wanted).

use crate::contracts;
use crate::types::{Assertion, AssertionOutcome, CandidateIndex, EliminationOrder, EliminationOrderSuffix};

/// Refine one suffix until this assertion classifies every branch.
///
/// `Satisfied` suffixes come back unchanged; `Contradiction` suffixes are
/// kept only when `keep_contradictions` is set. Diagnostic passes keep them
/// (the page must show the branches an assertion kills); pruning passes
/// drop them.
pub fn expand_suffix(
    assertion: &Assertion,
    suffix: EliminationOrderSuffix,
    num_candidates: u32,
    keep_contradictions: bool,
) -> Vec<EliminationOrderSuffix> {
    contracts::check_suffix_duplicate_free(&suffix);
    match assertion.evaluate(&suffix) {
        AssertionOutcome::Satisfied => vec![suffix],
        AssertionOutcome::Contradiction => {
            if keep_contradictions {
                vec![suffix]
            } else {
                Vec::new()
            }
        }
        AssertionOutcome::Undetermined => {
            let mut refined = Vec::new();
            for candidate in 0..num_candidates {
                let candidate = CandidateIndex(candidate);
                if suffix.contains(&candidate) {
                    continue;
                }
                let mut longer = Vec::with_capacity(suffix.len() + 1);
                longer.push(candidate);
                longer.extend_from_slice(&suffix);
                refined.append(&mut expand_suffix(
                    assertion,
                    longer,
                    num_candidates,
                    keep_contradictions,
                ));
            }
            refined
        }
    }
}

/// Pointwise union of [`expand_suffix`] over a whole frontier.
pub fn expand_all(
    assertion: &Assertion,
    suffixes: Vec<EliminationOrderSuffix>,
    num_candidates: u32,
    keep_contradictions: bool,
) -> Vec<EliminationOrderSuffix> {
    let mut refined = Vec::new();
    for suffix in suffixes {
        refined.append(&mut expand_suffix(
            assertion,
            suffix,
            num_candidates,
            keep_contradictions,
        ));
    }
    contracts::check_expansion_definitive(assertion, &refined);
    refined
}

/// The minimal canonical starting frontier: one length-1 suffix per
/// candidate, each hypothesizing that candidate as the final survivor.
pub fn unit_suffixes(num_candidates: u32) -> Vec<EliminationOrderSuffix> {
    (0..num_candidates).map(|c| vec![CandidateIndex(c)]).collect()
}

/// All `num_candidates!` full elimination orders.
///
/// Factorial; display use only. The search paths never need this — they
/// grow suffixes on demand from [`unit_suffixes`].
pub fn all_elimination_orders(num_candidates: u32) -> Vec<EliminationOrder> {
    if num_candidates == 0 {
        return vec![Vec::new()];
    }
    let newest = CandidateIndex(num_candidates - 1);
    let mut orders = Vec::new();
    for shorter in all_elimination_orders(num_candidates - 1) {
        // Place the newest candidate in every possible position.
        for position in 0..=shorter.len() {
            let mut order = shorter.clone();
            order.insert(position, newest);
            orders.push(order);
        }
    }
    orders
}
