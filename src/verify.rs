// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The verification engine: prove that no candidate except the declared
//! winner can survive to the end.
//!
//! For one hypothesized survivor, the engine explores the tree of
//! reverse-elimination-order refinements. Each node carries only the
//! assertions still undetermined for its suffix: satisfied assertions are
//! retired permanently along a branch (monotonicity makes that sound), and
//! the first contradiction prunes the branch on the spot. A node with no
//! carried assertions left and no contradiction is an uncontradicted
//! completion — a counterexample showing the assertion set is
//! *insufficient*. That is a reported finding, never silently corrected.
//!
//! The recursion here is the exponential one (worst case
//! `num_candidates!`), so it does not use the call stack: nodes live in an
//! arena indexed by position, the walk runs over an explicit frame stack,
//! and the budget is charged at every node allocation. The trimmers reuse
//! the same machinery with a different recording mode and continuation
//! policy.

use crate::budget::Budget;
use crate::contracts;
use crate::types::{
    Assertion, AssertionOutcome, AuditError, CandidateIndex, EliminationOrderSuffix,
    validate_assertions,
};
use serde::{Deserialize, Serialize};

// =============================================================================
// THE SEARCH TREE
// =============================================================================

/// One candidate placed at one depth of the search.
///
/// `depth` equals the suffix length at this node; `pruning_assertions`
/// holds input-list indices of assertions that contradict the node's
/// suffix (just the first found, or all of them, depending on the
/// recording mode the tree was built with).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    pub candidate: CandidateIndex,
    pub parent: Option<usize>,
    pub depth: usize,
    pub pruning_assertions: Vec<usize>,
    pub children: Vec<usize>,
    /// True when this node or a descendant is an uncontradicted completion.
    pub valid: bool,
}

/// An arena-allocated search tree; index 0 is the root.
///
/// Traverse via `children` starting from [`VerificationTree::ROOT`]: the
/// continuation policies can detach an explored subtree (see
/// `absorb_child`), and detached nodes stay in the arena but are
/// unreachable from the root.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationTree {
    nodes: Vec<TreeNode>,
}

impl VerificationTree {
    /// Arena index of the root node.
    pub const ROOT: usize = 0;

    pub fn root(&self) -> &TreeNode {
        &self.nodes[Self::ROOT]
    }

    pub fn node(&self, index: usize) -> &TreeNode {
        &self.nodes[index]
    }

    /// Total nodes allocated, including any detached by the continuation
    /// policy.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Reconstruct the elimination-order suffix a node stands for by
    /// walking its parent chain; the root candidate comes out last, as the
    /// hypothesized final survivor.
    pub fn suffix_of(&self, index: usize) -> EliminationOrderSuffix {
        let mut suffix = Vec::with_capacity(self.nodes[index].depth);
        let mut cursor = Some(index);
        while let Some(current) = cursor {
            suffix.push(self.nodes[current].candidate);
            cursor = self.nodes[current].parent;
        }
        suffix
    }

    /// Deepest node reachable from the root.
    pub fn max_depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending = vec![Self::ROOT];
        while let Some(index) = pending.pop() {
            let node = &self.nodes[index];
            deepest = deepest.max(node.depth);
            pending.extend_from_slice(&node.children);
        }
        deepest
    }

    /// The first uncontradicted completion in search order, if any.
    ///
    /// Children are explored in ascending candidate order, so this is the
    /// counterexample the engine found first.
    pub fn first_valid_leaf(&self) -> Option<usize> {
        let mut pending = vec![Self::ROOT];
        while let Some(index) = pending.pop() {
            let node = &self.nodes[index];
            if !node.valid {
                continue;
            }
            if node.children.is_empty() && node.pruning_assertions.is_empty() {
                return Some(index);
            }
            // Reverse so the lowest-candidate child pops first.
            pending.extend(node.children.iter().rev());
        }
        None
    }
}

// =============================================================================
// EXPANSION CONTROL
// =============================================================================

/// How far to keep searching below a node that an assertion already
/// prunes.
///
/// Plain verification never needs to look past a pruned node. The
/// Minimize-Assertions trimmer does: a frontier of deeper assertions can
/// make the pruning assertion here redundant, so the search continues to
/// find those substitution opportunities, at the cost of walking nodes
/// verification never visits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContinuationPolicy {
    /// Stop at a pruned node. Minimizes the size of the pruning tree.
    StopImmediately,
    /// Search one level of substitution below a pruned node, but once a
    /// frontier of descendants blocks it, don't second-guess them too.
    ContinueOnce,
    /// Keep searching below pruned nodes until no assertions are left.
    Forever,
    /// Like `Forever`, but stop where an NEB prunes. In practice NEB
    /// assertions are almost never redundant, while their descendant
    /// trees are enormous.
    StopOnNeb,
}

impl ContinuationPolicy {
    fn continues_past_prune(self, pruned_by_neb: bool) -> bool {
        match self {
            ContinuationPolicy::StopImmediately => false,
            ContinuationPolicy::StopOnNeb => !pruned_by_neb,
            ContinuationPolicy::ContinueOnce | ContinuationPolicy::Forever => true,
        }
    }

    fn next_level(self) -> Self {
        match self {
            ContinuationPolicy::ContinueOnce => ContinuationPolicy::StopImmediately,
            other => other,
        }
    }
}

/// Which contradictions to write into `pruning_assertions`.
///
/// Verification short-circuits on the first contradiction found in
/// assertion order; the trimmers need every assertion that could have
/// pruned the node, because the selection passes choose among them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PruneRecording {
    FirstOnly,
    All,
}

// =============================================================================
// THE TREE BUILDER
// =============================================================================

/// One entry of the explicit DFS stack: an open node whose children are
/// still being produced.
struct Frame {
    node: usize,
    suffix: EliminationOrderSuffix,
    /// Assertions still undetermined at this node; the only ones children
    /// ever see.
    carried: Vec<usize>,
    next_candidate: u32,
    child_policy: ContinuationPolicy,
    /// The node has pruning assertions of its own (search continued past
    /// it under a permissive policy).
    pruned: bool,
    /// A valid descendant surfaced under a pruned node; expansion below is
    /// pointless and has been abandoned.
    halted: bool,
}

enum Step {
    Descend(Frame),
    Retreat,
}

pub(crate) struct TreeBuilder<'a> {
    assertions: &'a [Assertion],
    num_candidates: u32,
    recording: PruneRecording,
    nodes: Vec<TreeNode>,
}

impl<'a> TreeBuilder<'a> {
    pub(crate) fn new(
        assertions: &'a [Assertion],
        num_candidates: u32,
        recording: PruneRecording,
    ) -> Self {
        TreeBuilder {
            assertions,
            num_candidates,
            recording,
            nodes: Vec::new(),
        }
    }

    /// Run the search from a length-1 suffix and hand back the arena.
    pub(crate) fn grow(
        mut self,
        candidate: CandidateIndex,
        policy: ContinuationPolicy,
        budget: &mut Budget,
    ) -> Result<VerificationTree, AuditError> {
        let everything: Vec<usize> = (0..self.assertions.len()).collect();
        let mut stack: Vec<Frame> = Vec::new();
        let (_, frame) = self.open_node(None, vec![candidate], &everything, policy, budget)?;
        if let Some(frame) = frame {
            stack.push(frame);
        }
        loop {
            let step = match stack.last_mut() {
                Some(top) => self.advance(top, budget)?,
                None => break,
            };
            match step {
                Step::Descend(frame) => stack.push(frame),
                Step::Retreat => {
                    if let Some(finished) = stack.pop() {
                        if let Some(parent) = stack.last_mut() {
                            self.absorb_child(parent, finished.node);
                        }
                    }
                }
            }
        }
        let tree = VerificationTree { nodes: self.nodes };
        contracts::check_tree_consistent(&tree);
        Ok(tree)
    }

    /// Produce at most one child for the frame on top of the stack.
    fn advance(&mut self, frame: &mut Frame, budget: &mut Budget) -> Result<Step, AuditError> {
        while !frame.halted && frame.next_candidate < self.num_candidates {
            let candidate = CandidateIndex(frame.next_candidate);
            frame.next_candidate += 1;
            if frame.suffix.contains(&candidate) {
                continue;
            }
            let mut suffix = Vec::with_capacity(frame.suffix.len() + 1);
            suffix.push(candidate);
            suffix.extend_from_slice(&frame.suffix);
            let (child, child_frame) = self.open_node(
                Some(frame.node),
                suffix,
                &frame.carried,
                frame.child_policy,
                budget,
            )?;
            self.nodes[frame.node].children.push(child);
            match child_frame {
                Some(child_frame) => return Ok(Step::Descend(child_frame)),
                None => self.absorb_child(frame, child),
            }
        }
        Ok(Step::Retreat)
    }

    /// Classify a suffix, allocate its node, and decide whether it opens.
    fn open_node(
        &mut self,
        parent: Option<usize>,
        suffix: EliminationOrderSuffix,
        relevant: &[usize],
        policy: ContinuationPolicy,
        budget: &mut Budget,
    ) -> Result<(usize, Option<Frame>), AuditError> {
        budget.consume()?;
        let mut pruning = Vec::new();
        let mut carried = Vec::new();
        for &index in relevant {
            match self.assertions[index].evaluate(&suffix) {
                AssertionOutcome::Contradiction => {
                    pruning.push(index);
                    if self.recording == PruneRecording::FirstOnly {
                        break;
                    }
                }
                AssertionOutcome::Satisfied => {}
                AssertionOutcome::Undetermined => carried.push(index),
            }
        }
        let pruned = !pruning.is_empty();
        let pruned_by_neb = pruning.iter().any(|&index| self.assertions[index].is_neb());
        let node = self.nodes.len();
        self.nodes.push(TreeNode {
            candidate: suffix[0],
            parent,
            depth: suffix.len(),
            pruning_assertions: pruning,
            children: Vec::new(),
            valid: !pruned && carried.is_empty(),
        });
        let opens =
            (!pruned || policy.continues_past_prune(pruned_by_neb)) && !carried.is_empty();
        let frame = if opens {
            let child_policy = if pruned { policy.next_level() } else { policy };
            Some(Frame {
                node,
                suffix,
                carried,
                next_candidate: 0,
                child_policy,
                pruned,
                halted: false,
            })
        } else {
            None
        };
        Ok((node, frame))
    }

    /// Fold a completed child's validity into its parent.
    fn absorb_child(&mut self, frame: &mut Frame, child: usize) {
        if !self.nodes[child].valid {
            return;
        }
        if frame.pruned {
            // Searching below a pruned node: a reachable completion means
            // no frontier of descendants can substitute for the direct
            // pruning assertions, so the subtree is useless. Detach it.
            self.nodes[frame.node].children.clear();
            frame.halted = true;
        } else {
            self.nodes[frame.node].valid = true;
        }
    }
}

// =============================================================================
// VERDICTS
// =============================================================================

/// The engine's answer for one hypothesized final survivor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateVerdict {
    pub candidate: CandidateIndex,
    /// True when every elimination order ending in `candidate` is
    /// contradicted by some assertion.
    pub ruled_out: bool,
    /// When not ruled out: the first uncontradicted completion found, as
    /// an elimination-order suffix (any prefix completes it).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counterexample: Option<EliminationOrderSuffix>,
    /// Search-tree nodes allocated for this candidate.
    pub nodes_visited: u64,
    /// Deepest suffix length the search had to reach.
    pub max_depth: usize,
    /// The pruned search tree, for rendering why each branch died.
    pub tree: VerificationTree,
}

/// Verdicts for every candidate other than the declared winner.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditVerification {
    pub winner: CandidateIndex,
    pub num_candidates: u32,
    /// Conjunction of the per-candidate verdicts: the assertion set proves
    /// the declared winner exactly when every other candidate is ruled out.
    pub proves_winner: bool,
    pub nodes_visited: u64,
    pub verdicts: Vec<CandidateVerdict>,
}

/// Build the pruning tree for one candidate, recording *every* assertion
/// that contradicts each pruned node, under an explicit continuation
/// policy.
///
/// This is the diagnostic face of the engine: the explainer page uses it
/// to show all the ways a branch dies, and the trimmers grow their trees
/// through this same path. For a plain verdict use [`verify_candidate`],
/// which short-circuits on the first contradiction instead.
pub fn build_pruning_tree(
    candidate: CandidateIndex,
    assertions: &[Assertion],
    num_candidates: u32,
    policy: ContinuationPolicy,
    budget: &mut Budget,
) -> Result<VerificationTree, AuditError> {
    validate_assertions(num_candidates, assertions)?;
    if candidate.0 >= num_candidates {
        return Err(AuditError::InvalidCandidateIndex {
            assertion: None,
            candidate,
            num_candidates,
        });
    }
    TreeBuilder::new(assertions, num_candidates, PruneRecording::All).grow(
        candidate,
        policy,
        budget,
    )
}

/// Can `candidate` survive to the end of some elimination order no
/// assertion rules out?
///
/// `ruled_out: false` in the verdict means the assertion set is
/// insufficient for any claim that excludes this candidate — the verdict
/// carries the counterexample to show to the caller.
pub fn verify_candidate(
    candidate: CandidateIndex,
    assertions: &[Assertion],
    num_candidates: u32,
    budget: &mut Budget,
) -> Result<CandidateVerdict, AuditError> {
    validate_assertions(num_candidates, assertions)?;
    if candidate.0 >= num_candidates {
        return Err(AuditError::InvalidCandidateIndex {
            assertion: None,
            candidate,
            num_candidates,
        });
    }
    let before = budget.work_done();
    let builder = TreeBuilder::new(assertions, num_candidates, PruneRecording::FirstOnly);
    let tree = builder.grow(candidate, ContinuationPolicy::StopImmediately, budget)?;
    let ruled_out = !tree.root().valid;
    let counterexample = if ruled_out {
        None
    } else {
        tree.first_valid_leaf().map(|leaf| tree.suffix_of(leaf))
    };
    log::trace!(
        "candidate {}: ruled_out={} after {} nodes",
        candidate,
        ruled_out,
        budget.work_done() - before
    );
    Ok(CandidateVerdict {
        candidate,
        ruled_out,
        counterexample,
        nodes_visited: budget.work_done() - before,
        max_depth: tree.max_depth(),
        tree,
    })
}

/// Run [`verify_candidate`] for every candidate except the declared
/// winner, sharing one budget across the whole pass.
///
/// Whether the winner's own tree should also be checked (it must *not* be
/// ruled out) is the caller's policy; it is often far more expensive than
/// everything else combined, so it is not done here.
pub fn verify_all(
    winner: CandidateIndex,
    assertions: &[Assertion],
    num_candidates: u32,
    budget: &mut Budget,
) -> Result<AuditVerification, AuditError> {
    validate_assertions(num_candidates, assertions)?;
    if winner.0 >= num_candidates {
        return Err(AuditError::InvalidCandidateIndex {
            assertion: None,
            candidate: winner,
            num_candidates,
        });
    }
    let mut verdicts = Vec::with_capacity(num_candidates.saturating_sub(1) as usize);
    for candidate in 0..num_candidates {
        let candidate = CandidateIndex(candidate);
        if candidate == winner {
            continue;
        }
        let verdict = verify_candidate(candidate, assertions, num_candidates, budget)?;
        if !verdict.ruled_out {
            log::debug!(
                "assertions are insufficient: candidate {} survives via {:?}",
                candidate,
                verdict.counterexample
            );
        }
        verdicts.push(verdict);
    }
    Ok(AuditVerification {
        winner,
        num_candidates,
        proves_winner: verdicts.iter().all(|verdict| verdict.ruled_out),
        nodes_visited: verdicts.iter().map(|verdict| verdict.nodes_visited).sum(),
        verdicts,
    })
}

/// [`verify_all`], fanned out across cores.
///
/// Per-candidate searches are independent and read the shared assertion
/// list only, so each gets its own budget built from the supplied limits.
#[cfg(feature = "parallel")]
pub fn verify_all_parallel(
    winner: CandidateIndex,
    assertions: &[Assertion],
    num_candidates: u32,
    node_budget: Option<u64>,
    time_budget_seconds: Option<f64>,
) -> Result<AuditVerification, AuditError> {
    use rayon::prelude::*;

    validate_assertions(num_candidates, assertions)?;
    if winner.0 >= num_candidates {
        return Err(AuditError::InvalidCandidateIndex {
            assertion: None,
            candidate: winner,
            num_candidates,
        });
    }
    let losers: Vec<CandidateIndex> = (0..num_candidates)
        .map(CandidateIndex)
        .filter(|&candidate| candidate != winner)
        .collect();
    let verdicts: Result<Vec<CandidateVerdict>, AuditError> = losers
        .into_par_iter()
        .map(|candidate| {
            let mut budget = Budget::from_limits(node_budget, time_budget_seconds);
            verify_candidate(candidate, assertions, num_candidates, &mut budget)
        })
        .collect();
    let verdicts = verdicts?;
    Ok(AuditVerification {
        winner,
        num_candidates,
        proves_winner: verdicts.iter().all(|verdict| verdict.ruled_out),
        nodes_visited: verdicts.iter().map(|verdict| verdict.nodes_visited).sum(),
        verdicts,
    })
}
