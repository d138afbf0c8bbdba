// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Search budgets: the search is worst-case factorial, so every embedding
//! must be able to pull the plug.
//!
//! A [`Budget`] counts work units (one per search-tree node, one per
//! trimming-pass node visit) and optionally enforces a wall-clock
//! deadline. The engine charges it at every node allocation, so overrun
//! is detected within one node of the limit. Exhaustion surfaces as
//! [`AuditError::BudgetExceeded`] — a distinguished "indeterminate"
//! outcome, never a guess.

use crate::types::AuditError;
#[cfg(not(target_arch = "wasm32"))]
use std::time::{Duration, Instant};

/// A cap on how much searching one top-level call may do.
///
/// Budgets are deliberately not `Clone`: one budget, one pot of work. The
/// parallel driver builds a fresh budget per candidate instead of sharing
/// one across threads.
#[derive(Debug)]
pub struct Budget {
    work_done: u64,
    work_limit: Option<u64>,
    #[cfg(not(target_arch = "wasm32"))]
    deadline: Option<Instant>,
}

impl Budget {
    /// A budget capped by node count and/or wall-clock duration.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn new(work_limit: Option<u64>, time_limit: Option<Duration>) -> Self {
        Budget {
            work_done: 0,
            work_limit,
            deadline: time_limit.map(|limit| Instant::now() + limit),
        }
    }

    #[cfg(target_arch = "wasm32")]
    pub fn new(work_limit: Option<u64>) -> Self {
        Budget {
            work_done: 0,
            work_limit,
        }
    }

    /// A budget that never runs out.
    pub fn unlimited() -> Self {
        #[cfg(not(target_arch = "wasm32"))]
        {
            Self::new(None, None)
        }
        #[cfg(target_arch = "wasm32")]
        {
            Self::new(None)
        }
    }

    /// Build a budget from the limits of a problem file. Non-positive or
    /// non-finite time limits are treated as absent; on wasm targets the
    /// time limit is ignored entirely (no monotonic clock there).
    pub fn from_limits(work_limit: Option<u64>, time_limit_seconds: Option<f64>) -> Self {
        #[cfg(not(target_arch = "wasm32"))]
        {
            let time_limit = time_limit_seconds
                .filter(|&seconds| seconds.is_finite() && seconds > 0.0)
                .map(Duration::from_secs_f64);
            Self::new(work_limit, time_limit)
        }
        #[cfg(target_arch = "wasm32")]
        {
            let _ = time_limit_seconds;
            Self::new(work_limit)
        }
    }

    /// Work units charged so far.
    pub fn work_done(&self) -> u64 {
        self.work_done
    }

    /// Charge one unit of work, failing when a limit is exceeded.
    pub fn consume(&mut self) -> Result<(), AuditError> {
        self.work_done += 1;
        if let Some(limit) = self.work_limit {
            if self.work_done > limit {
                return Err(AuditError::BudgetExceeded {
                    nodes_visited: self.work_done,
                });
            }
        }
        #[cfg(not(target_arch = "wasm32"))]
        if let Some(deadline) = self.deadline {
            if Instant::now() > deadline {
                return Err(AuditError::BudgetExceeded {
                    nodes_visited: self.work_done,
                });
            }
        }
        Ok(())
    }
}
