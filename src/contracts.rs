//! Runtime contracts for the properties the search depends on.
//!
//! Debug-mode assertions, zero-cost in release builds. The search engine
//! and expander call these at their boundaries; if one fires during
//! development, an invariant the algorithms rely on has been broken
//! upstream, not merely an odd input received.

use crate::types::{Assertion, AssertionOutcome, CandidateIndex};
use crate::verify::VerificationTree;

/// A suffix must never place the same candidate twice.
#[inline]
pub fn check_suffix_duplicate_free(suffix: &[CandidateIndex]) {
    debug_assert!(
        suffix
            .iter()
            .enumerate()
            .all(|(position, candidate)| !suffix[..position].contains(candidate)),
        "Contract violation: suffix {:?} places a candidate twice",
        suffix
    );
}

/// Every suffix returned by a full expansion must be definitive — an
/// `Undetermined` survivor means the expander stopped early.
#[inline]
pub fn check_expansion_definitive(assertion: &Assertion, refined: &[Vec<CandidateIndex>]) {
    #[cfg(debug_assertions)]
    for suffix in refined {
        debug_assert!(
            assertion.evaluate(suffix).is_definitive(),
            "Contract violation: expansion left {:?} undetermined for {}",
            suffix,
            assertion
        );
    }
    #[cfg(not(debug_assertions))]
    {
        let _ = (assertion, refined);
    }
}

/// Structural sanity of a finished search tree, checked from the root so
/// nodes detached by the continuation policy are ignored:
/// - a pruned node is never valid;
/// - a valid node with children has a valid child;
/// - children are one step deeper than their parent.
#[inline]
pub fn check_tree_consistent(tree: &VerificationTree) {
    #[cfg(debug_assertions)]
    {
        let mut pending = vec![VerificationTree::ROOT];
        while let Some(index) = pending.pop() {
            let node = tree.node(index);
            if !node.pruning_assertions.is_empty() {
                debug_assert!(
                    !node.valid,
                    "Contract violation: node {} is pruned yet valid",
                    index
                );
            }
            if node.valid && !node.children.is_empty() {
                debug_assert!(
                    node.children.iter().any(|&child| tree.node(child).valid),
                    "Contract violation: node {} is valid but no child is",
                    index
                );
            }
            for &child in &node.children {
                debug_assert_eq!(
                    node.depth + 1,
                    tree.node(child).depth,
                    "Contract violation: child {} of node {} skips a depth",
                    child,
                    index
                );
                pending.push(child);
            }
        }
    }
    #[cfg(not(debug_assertions))]
    {
        let _ = tree;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{neb, suffix};

    #[test]
    fn duplicate_free_suffix_passes() {
        check_suffix_duplicate_free(&suffix(&[2, 0, 1]));
    }

    #[test]
    #[should_panic(expected = "Contract violation")]
    #[cfg(debug_assertions)]
    fn duplicated_candidate_fires() {
        check_suffix_duplicate_free(&suffix(&[2, 0, 2]));
    }

    #[test]
    fn definitive_expansion_passes() {
        let assertion = neb(0, 1);
        check_expansion_definitive(&assertion, &[suffix(&[1, 0]), suffix(&[0, 1])]);
    }

    #[test]
    #[should_panic(expected = "Contract violation")]
    #[cfg(debug_assertions)]
    fn undetermined_expansion_fires() {
        let assertion = neb(0, 1);
        check_expansion_definitive(&assertion, &[suffix(&[2])]);
    }
}
