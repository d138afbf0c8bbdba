//! WebAssembly bindings for the assertion-explainer page.
//!
//! The page loads a problem once and then asks questions interactively:
//! verify everything, re-verify one candidate while the reader steps
//! through its tree, trim with one objective or the other. `AuditSession`
//! holds the validated problem across those calls so each click doesn't
//! re-parse and re-validate.
//!
//! Wall-clock budgets are ignored here (no monotonic clock on
//! wasm32-unknown-unknown); the page passes node budgets instead.

use crate::budget::Budget;
use crate::trim::{trim_assertions, TrimAlgorithm};
use crate::types::AuditProblem;
use crate::verify::{verify_all, verify_candidate};
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

/// A validated audit problem, ready to be queried from JavaScript.
#[wasm_bindgen]
pub struct AuditSession {
    problem: AuditProblem,
}

#[wasm_bindgen]
impl AuditSession {
    /// Build a session from a problem object (same shape as the CLI's
    /// JSON input). Fails with a message string when the problem is
    /// malformed, so the page can show it next to the offending field.
    #[wasm_bindgen(constructor)]
    pub fn new(problem: JsValue) -> Result<AuditSession, JsValue> {
        let problem: AuditProblem =
            from_value(problem).map_err(|e| JsValue::from_str(&e.to_string()))?;
        problem
            .validate()
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(AuditSession { problem })
    }

    #[wasm_bindgen(getter)]
    pub fn num_candidates(&self) -> u32 {
        self.problem.num_candidates
    }

    #[wasm_bindgen(getter)]
    pub fn winner(&self) -> u32 {
        self.problem.winner.get()
    }

    /// Verdicts for every candidate other than the declared winner, plus
    /// the per-candidate trees the page renders.
    pub fn verify(&self) -> Result<JsValue, JsValue> {
        let mut budget = Budget::from_limits(self.problem.node_budget, None);
        let verification = verify_all(
            self.problem.winner,
            &self.problem.assertions,
            self.problem.num_candidates,
            &mut budget,
        )
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
        to_value(&verification).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// One candidate's verdict and pruned tree.
    pub fn verify_candidate(&self, candidate: u32) -> Result<JsValue, JsValue> {
        let mut budget = Budget::from_limits(self.problem.node_budget, None);
        let verdict = verify_candidate(
            crate::types::CandidateIndex(candidate),
            &self.problem.assertions,
            self.problem.num_candidates,
            &mut budget,
        )
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
        to_value(&verdict).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Trim the assertion set. `objective` is `"minimize-tree"`,
    /// `"minimize-assertions"`, or `"none"`.
    pub fn trim(&self, objective: &str) -> Result<JsValue, JsValue> {
        let algorithm = match objective {
            "minimize-tree" => TrimAlgorithm::MinimizeTree,
            "minimize-assertions" => TrimAlgorithm::MinimizeAssertions,
            "none" => TrimAlgorithm::None,
            other => {
                return Err(JsValue::from_str(&format!(
                    "unknown trim objective: {}",
                    other
                )))
            }
        };
        let mut budget = Budget::from_limits(self.problem.node_budget, None);
        let result = trim_assertions(
            self.problem.winner,
            &self.problem.assertions,
            self.problem.num_candidates,
            algorithm,
            &mut budget,
        )
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
        to_value(&result).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}
