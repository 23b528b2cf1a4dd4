//! Brieflow CLI - drive the generation pipeline from captured payloads

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

use brieflow::artifact::GeneratedArtifact;
use brieflow::envelope::Severity;
use brieflow::error::{BrieflowError, FixSuggestion, Result};
use brieflow::llm::LlmCallResult;
use brieflow::pipeline::{self, PipelineOutcome};
use brieflow::rules::{evaluate_rules, RuleId};

#[derive(Parser)]
#[command(name = "brieflow")]
#[command(about = "Brieflow - intake-to-workflow generation pipeline")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline over a captured request and its LLM responses
    Run {
        /// Path to the raw inbound payload JSON
        input: PathBuf,

        /// Architect call result JSON
        #[arg(long)]
        architect: Option<PathBuf>,

        /// Workflow builder call result JSON
        #[arg(long)]
        synthesis: Option<PathBuf>,

        /// Validator call result JSON
        #[arg(long)]
        review: Option<PathBuf>,

        /// Pretty-print the outcome
        #[arg(short, long)]
        pretty: bool,
    },

    /// Check a workflow artifact file against the structural rule set
    Check {
        /// Path to the workflow JSON file
        file: PathBuf,
    },

    /// List the structural rule set
    Rules,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            input,
            architect,
            synthesis,
            review,
            pretty,
        } => run_pipeline(&input, architect.as_deref(), synthesis.as_deref(), review.as_deref(), pretty),
        Commands::Check { file } => check_artifact(&file),
        Commands::Rules => list_rules(),
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            if let Some(suggestion) = e.fix_suggestion() {
                eprintln!("  {} {}", "Fix:".yellow(), suggestion);
            }
            std::process::exit(2);
        }
    }
}

fn read_json(path: &Path) -> Result<serde_json::Value> {
    let text = fs::read_to_string(path).map_err(|e| BrieflowError::PayloadRead {
        path: path.display().to_string(),
        details: e.to_string(),
    })?;
    serde_json::from_str(&text).map_err(|e| BrieflowError::PayloadParse {
        path: path.display().to_string(),
        details: e.to_string(),
    })
}

fn read_llm_result(path: Option<&Path>) -> Result<Option<LlmCallResult>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let value = read_json(path)?;
    let result = serde_json::from_value(value).map_err(|e| BrieflowError::PayloadParse {
        path: path.display().to_string(),
        details: e.to_string(),
    })?;
    Ok(Some(result))
}

fn run_pipeline(
    input: &Path,
    architect: Option<&Path>,
    synthesis: Option<&Path>,
    review: Option<&Path>,
    pretty: bool,
) -> Result<i32> {
    let raw = read_json(input)?;
    let architect_llm = read_llm_result(architect)?;
    let synthesis_llm = read_llm_result(synthesis)?;
    let review_llm = read_llm_result(review)?;

    let outcome = pipeline::run(
        Some(&raw),
        architect_llm.as_ref(),
        synthesis_llm.as_ref(),
        review_llm.as_ref(),
    );

    let serialized = if pretty {
        serde_json::to_string_pretty(&outcome)
    } else {
        serde_json::to_string(&outcome)
    }
    .map_err(|e| BrieflowError::OutputSerialize {
        details: e.to_string(),
    })?;
    println!("{serialized}");

    match outcome {
        PipelineOutcome::Delivered(_) => {
            eprintln!("{} workflow generated and validated", "✓".green());
            Ok(0)
        }
        PipelineOutcome::Failed(report) => {
            eprintln!(
                "{} pipeline failed; error report addressed to {}",
                "✗".red(),
                report.client_email
            );
            Ok(1)
        }
    }
}

fn check_artifact(file: &Path) -> Result<i32> {
    let value = read_json(file)?;
    let artifact =
        GeneratedArtifact::from_value(&value).map_err(|defect| BrieflowError::ArtifactInvalid {
            path: file.display().to_string(),
            details: defect.to_string(),
        })?;

    println!(
        "Checking '{}' ({} nodes, {} connection groups)\n",
        file.display(),
        artifact.node_count(),
        artifact.connection_count()
    );

    let outcomes = evaluate_rules(&artifact);
    let mut failures = 0;
    for outcome in &outcomes {
        let marker = if outcome.passed {
            "✓".green()
        } else {
            failures += 1;
            "✗".red()
        };
        println!(
            "{} {:<26} [{}] {}",
            marker,
            outcome.rule.as_str(),
            severity_label(outcome.rule.severity()),
            outcome.rule.description()
        );
    }

    if failures == 0 {
        println!("\n{} all rules passed", "✓".green());
        Ok(0)
    } else {
        println!("\n{} {} rule(s) failed", "✗".red(), failures);
        Ok(1)
    }
}

fn list_rules() -> Result<i32> {
    println!("{:<26} {:<10} DESCRIPTION", "RULE", "SEVERITY");
    println!("{}", "-".repeat(72));
    for rule in RuleId::ALL {
        println!(
            "{:<26} {:<10} {}",
            rule.as_str(),
            severity_label(rule.severity()),
            rule.description()
        );
    }
    Ok(0)
}

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "critical",
        Severity::High => "high",
        Severity::Medium => "medium",
    }
}
