use clap::Parser;
use std::io::Read;
use std::process::ExitCode;

use auditree::{trim_assertions, AuditProblem, Budget, TrimAlgorithm};

mod cli;
use cli::display;
use cli::{Cli, Commands};

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    let outcome = match cli.command {
        Commands::Verify {
            input,
            json,
            node_budget,
            time_budget,
        } => run_verify(input.as_deref(), json, node_budget, time_budget),
        Commands::Trim {
            input,
            objective,
            json,
            node_budget,
            time_budget,
        } => run_trim(input.as_deref(), objective.into(), json, node_budget, time_budget),
        Commands::Tree {
            input,
            candidate,
            node_budget,
        } => run_tree(input.as_deref(), candidate, node_budget),
    };
    match outcome {
        Ok(proved) => {
            if proved {
                ExitCode::SUCCESS
            } else {
                // Distinguish "ran fine, claim not proven" from crashes.
                ExitCode::from(1)
            }
        }
        Err(message) => {
            eprintln!("error: {}", message);
            ExitCode::from(2)
        }
    }
}

/// Read the problem from a file path, or stdin when none was given.
fn read_problem(input: Option<&str>) -> Result<AuditProblem, String> {
    let problem = match input {
        Some(path) => AuditProblem::from_json_file(path)
            .map_err(|e| format!("{}: {}", path, e))?,
        None => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .map_err(|e| format!("reading stdin: {}", e))?;
            AuditProblem::from_json(&raw).map_err(|e| format!("invalid problem: {}", e))?
        }
    };
    problem.validate().map_err(|e| e.to_string())?;
    Ok(problem)
}

fn effective_budget(
    problem: &AuditProblem,
    node_budget: Option<u64>,
    time_budget: Option<f64>,
) -> Budget {
    // Command-line limits override whatever the problem file carries.
    Budget::from_limits(
        node_budget.or(problem.node_budget),
        time_budget.or(problem.time_budget_seconds),
    )
}

fn run_verify(
    input: Option<&str>,
    json: bool,
    node_budget: Option<u64>,
    time_budget: Option<f64>,
) -> Result<bool, String> {
    let problem = read_problem(input)?;
    let verification = {
        #[cfg(feature = "parallel")]
        {
            let spinner = indicatif::ProgressBar::new_spinner()
                .with_message("verifying candidates");
            spinner.enable_steady_tick(std::time::Duration::from_millis(100));
            let verification = auditree::verify_all_parallel(
                problem.winner,
                &problem.assertions,
                problem.num_candidates,
                node_budget.or(problem.node_budget),
                time_budget.or(problem.time_budget_seconds),
            )
            .map_err(|e| e.to_string())?;
            spinner.finish_and_clear();
            verification
        }
        #[cfg(not(feature = "parallel"))]
        {
            let mut budget = effective_budget(&problem, node_budget, time_budget);
            auditree::verify_all(
                problem.winner,
                &problem.assertions,
                problem.num_candidates,
                &mut budget,
            )
            .map_err(|e| e.to_string())?
        }
    };
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&verification).map_err(|e| e.to_string())?
        );
        return Ok(verification.proves_winner);
    }
    let winner = display::candidate_label(&problem.metadata, problem.winner.get());
    println!(
        "{} assertions, {} candidates, declared winner {}",
        problem.assertions.len(),
        problem.num_candidates,
        winner
    );
    for verdict in &verification.verdicts {
        println!("{}", display::verdict_line(&problem.metadata, verdict));
    }
    println!(
        "{}",
        display::dim(&format!("{} nodes explored", verification.nodes_visited))
    );
    if verification.proves_winner {
        println!("assertions PROVE {} wins", winner);
    } else {
        println!("assertions DO NOT prove the declared winner");
    }
    Ok(verification.proves_winner)
}

fn run_trim(
    input: Option<&str>,
    algorithm: TrimAlgorithm,
    json: bool,
    node_budget: Option<u64>,
    time_budget: Option<f64>,
) -> Result<bool, String> {
    let problem = read_problem(input)?;
    let mut budget = effective_budget(&problem, node_budget, time_budget);
    let result = trim_assertions(
        problem.winner,
        &problem.assertions,
        problem.num_candidates,
        algorithm,
        &mut budget,
    )
    .map_err(|e| e.to_string())?;
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&result).map_err(|e| e.to_string())?
        );
        return Ok(true);
    }
    println!(
        "kept {} of {} assertions{}",
        result.kept.len(),
        problem.assertions.len(),
        if result.optimized {
            ""
        } else {
            " (budget exceeded; returned untrimmed)"
        }
    );
    for &index in &result.kept {
        println!("  #{} {}", index, problem.assertions[index]);
    }
    println!(
        "{}",
        display::dim(&format!(
            "{} work units, max depth {}",
            result.statistics.work_done, result.statistics.max_depth
        ))
    );
    Ok(true)
}

fn run_tree(
    input: Option<&str>,
    candidate: u32,
    node_budget: Option<u64>,
) -> Result<bool, String> {
    let problem = read_problem(input)?;
    let mut budget = Budget::from_limits(node_budget.or(problem.node_budget), None);
    let verdict = auditree::verify_candidate(
        auditree::CandidateIndex(candidate),
        &problem.assertions,
        problem.num_candidates,
        &mut budget,
    )
    .map_err(|e| e.to_string())?;
    println!(
        "{}",
        display::render_tree(&verdict.tree, &problem.assertions, &problem.metadata)
    );
    if verdict.ruled_out {
        println!(
            "candidate {} is ruled out",
            display::candidate_label(&problem.metadata, candidate)
        );
    } else {
        println!(
            "candidate {} is NOT ruled out",
            display::candidate_label(&problem.metadata, candidate)
        );
    }
    Ok(verdict.ruled_out)
}
