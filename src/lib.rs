//! Sufficiency verification and trimming for IRV audit assertion sets.
//!
//! Given a candidate count, a declared winner, and a list of pairwise
//! assertions about an instant-runoff elimination process, this crate
//! certifies that the assertions jointly rule out every elimination order
//! except ones ending in the declared winner — and can shrink a redundant
//! assertion set without weakening that guarantee. It is the algorithmic
//! core of an assertion-explainer web page; the page's file loading,
//! dialect parsing, and SVG rendering live elsewhere and speak to this
//! crate through [`AuditProblem`] and the verdict/tree structures.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌──────────────┐
//! │  types.rs   │────▶│ evaluate.rs  │────▶│  expand.rs   │
//! │ (Assertion, │     │ (classify vs │     │ (grow suffix │
//! │  outcomes)  │     │   suffix)    │     │  frontiers)  │
//! └─────────────┘     └──────┬───────┘     └──────────────┘
//!                            │
//!                     ┌──────▼───────┐     ┌──────────────┐
//!                     │  verify.rs   │────▶│   trim.rs    │
//!                     │ (arena DFS,  │     │ (two-pass    │
//!                     │  verdicts)   │     │  selection)  │
//!                     └──────────────┘     └──────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use auditree::{verify_all, Budget, CandidateIndex};
//!
//! let assertions = auditree::testing::guide_assertions();
//! let mut budget = Budget::unlimited();
//! let verification =
//!     verify_all(CandidateIndex(2), &assertions, 4, &mut budget).unwrap();
//! assert!(verification.proves_winner);
//! ```
//!
//! What "proves" means here is purely logical: the assertions exclude
//! every other outcome. Whether each assertion is *true* is a question
//! for the statistical audit that samples actual ballots — this crate
//! never sees a ballot.

// Module declarations
mod budget;
mod evaluate;
mod expand;
mod trim;
mod types;
mod verify;

pub mod contracts;
pub mod testing;

#[cfg(feature = "wasm")]
mod wasm;

// Re-exports for public API
pub use budget::Budget;
pub use expand::{all_elimination_orders, expand_all, expand_suffix, unit_suffixes};
pub use trim::{trim_assertions, TrimAlgorithm, TrimResult, TrimStatistics};
pub use types::{
    validate_assertions, Assertion, AssertionOutcome, AuditError, AuditProblem, CandidateIndex,
    EliminationOrder, EliminationOrderSuffix, NotEliminatedBefore, NotEliminatedNext,
};
pub use verify::{
    build_pruning_tree, verify_all, verify_candidate, AuditVerification, CandidateVerdict,
    ContinuationPolicy, TreeNode, VerificationTree,
};

#[cfg(feature = "parallel")]
pub use verify::verify_all_parallel;
