// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! CLI definitions for the auditree command-line interface.
//!
//! Three subcommands: `verify` to check that an assertion set proves its
//! declared winner, `trim` to shrink a sufficient set, and `tree` to
//! render the pruned search tree for one candidate. All three read the
//! same JSON problem format, from a file argument or stdin.

pub mod display;

use clap::{Parser, Subcommand, ValueEnum};

use auditree::TrimAlgorithm;

#[derive(Parser)]
#[command(
    name = "auditree",
    about = "Prove and trim IRV audit assertion sets",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check that the assertions rule out every candidate except the winner
    Verify {
        /// Path to an audit problem JSON file (reads stdin when omitted)
        input: Option<String>,

        /// Emit the full verification report as JSON instead of text
        #[arg(long)]
        json: bool,

        /// Maximum search-tree nodes before giving up
        #[arg(long)]
        node_budget: Option<u64>,

        /// Wall-clock limit in seconds
        #[arg(long)]
        time_budget: Option<f64>,
    },

    /// Remove redundant assertions without weakening the guarantee
    Trim {
        /// Path to an audit problem JSON file (reads stdin when omitted)
        input: Option<String>,

        /// What to optimize for
        #[arg(long, value_enum, default_value = "minimize-tree")]
        objective: TrimObjective,

        /// Emit the trim result as JSON instead of text
        #[arg(long)]
        json: bool,

        /// Maximum work units before falling back to the untrimmed set
        #[arg(long)]
        node_budget: Option<u64>,

        /// Wall-clock limit in seconds
        #[arg(long)]
        time_budget: Option<f64>,
    },

    /// Render the pruned search tree for one candidate
    Tree {
        /// Path to an audit problem JSON file (reads stdin when omitted)
        input: Option<String>,

        /// The candidate whose elimination tree to show
        #[arg(short, long)]
        candidate: u32,

        /// Maximum search-tree nodes before giving up
        #[arg(long)]
        node_budget: Option<u64>,
    },
}

/// CLI-facing spelling of [`TrimAlgorithm`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum TrimObjective {
    /// Keep the verification tree as small as the full set makes it
    MinimizeTree,
    /// Keep as few assertions as possible
    MinimizeAssertions,
    /// Don't trim; just validate and echo the set
    None,
}

impl From<TrimObjective> for TrimAlgorithm {
    fn from(objective: TrimObjective) -> Self {
        match objective {
            TrimObjective::MinimizeTree => TrimAlgorithm::MinimizeTree,
            TrimObjective::MinimizeAssertions => TrimAlgorithm::MinimizeAssertions,
            TrimObjective::None => TrimAlgorithm::None,
        }
    }
}
