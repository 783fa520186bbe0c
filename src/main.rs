//! FAQ Strategy Benchmark CLI
//!
//! Runs answer-producing strategies over a golden question set, then scores
//! and compares them against a weighted rubric.
//!
//! ## Quick Start
//!
//! ```bash
//! # Run the benchmark and save a timestamped artifact under results/
//! ./faq-bench run \
//!     --golden-set data/golden_set.json \
//!     --faq-base data/faq_base.json
//!
//! # Score a saved run and write the CSV + JSON reports
//! ./faq-bench evaluate \
//!     --results results/benchmark_20250115_143022.json \
//!     --golden-set data/golden_set.json
//!
//! # Check the golden set before a run
//! ./faq-bench validate-golden --golden-set data/golden_set.json
//! ```
//!
//! Strategies, retrieval depth, the per-call timeout, and the scoring
//! weights are configured in `bench.toml`. Every field has a default, so a
//! missing file is not an error.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::PathBuf;

use faq_bench::config::BenchConfig;
use faq_bench::golden::{FaqBase, GoldenSet, QuestionType};
use faq_bench::report::{aggregate, export, recommend};
use faq_bench::runner::{BenchmarkRunner, RunArtifact, RunSummary};
use faq_bench::scoring::ScoringEngine;
use faq_bench::strategies::build_registry;

#[derive(Parser)]
#[command(name = "faq-bench")]
#[command(about = "Benchmark and score FAQ answering strategies against a golden set")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every configured strategy over the golden set
    ///
    /// Produces one record per (question, strategy) pair and saves a
    /// timestamped JSON artifact for later evaluation.
    Run {
        /// Path to the golden set JSON file
        #[arg(short, long)]
        golden_set: PathBuf,

        /// Path to the FAQ base JSON file
        #[arg(short, long)]
        faq_base: PathBuf,

        /// Output directory for the benchmark artifact
        #[arg(short, long, default_value = "results")]
        output_dir: PathBuf,

        /// Path to the config file (TOML)
        #[arg(short, long, default_value = "bench.toml")]
        config: PathBuf,
    },

    /// Score a saved benchmark run and produce the evaluation reports
    Evaluate {
        /// Path to a benchmark artifact produced by `run`
        #[arg(short, long)]
        results: PathBuf,

        /// Path to the golden set JSON file
        #[arg(short, long)]
        golden_set: PathBuf,

        /// Output directory for the CSV and JSON reports
        #[arg(short, long, default_value = "results")]
        output_dir: PathBuf,

        /// Path to the config file (TOML)
        #[arg(short, long, default_value = "bench.toml")]
        config: PathBuf,
    },

    /// Validate a golden set file
    ValidateGolden {
        /// Path to the golden set JSON file
        #[arg(short, long)]
        golden_set: PathBuf,
    },

    /// List available strategies
    ListStrategies,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            golden_set,
            faq_base,
            output_dir,
            config,
        } => {
            run_benchmark(&golden_set, &faq_base, &output_dir, &config).await?;
        }

        Commands::Evaluate {
            results,
            golden_set,
            output_dir,
            config,
        } => {
            evaluate_results(&results, &golden_set, &output_dir, &config)?;
        }

        Commands::ValidateGolden { golden_set } => {
            validate_golden(&golden_set)?;
        }

        Commands::ListStrategies => {
            list_strategies();
        }
    }

    Ok(())
}

/// Run the benchmark with all configured strategies
async fn run_benchmark(
    golden_set_path: &PathBuf,
    faq_base_path: &PathBuf,
    output_dir: &PathBuf,
    config_path: &PathBuf,
) -> Result<()> {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║              FAQ STRATEGY BENCHMARK                          ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let config = BenchConfig::load_or_default(config_path)?;

    println!("Loading golden set from {:?}...", golden_set_path);
    let golden = GoldenSet::load(golden_set_path)?;
    println!("  {} questions", golden.len());

    println!("Loading FAQ base from {:?}...", faq_base_path);
    let faq = FaqBase::load(faq_base_path)?;
    println!("  {} entries", faq.len());

    let registry = build_registry(&faq, &config);
    println!(
        "\nStrategies: {} configured, {} available",
        config.strategies.len(),
        registry.len()
    );
    for name in &config.strategies {
        match registry.get(name.as_str()) {
            Some(adapter) => println!("  ✓ {} - {}", name, adapter.description()),
            None => println!("  ✗ {} - unavailable, will be recorded as errors", name),
        }
    }

    let runner = BenchmarkRunner::new(&golden, &registry, &config);
    let artifact = runner.run().await;

    print_run_summary(&RunSummary::from_records(&artifact.results));

    let path = artifact.save(output_dir)?;
    println!("\nResults saved to {:?}", path);

    Ok(())
}

/// Print per-strategy run statistics
fn print_run_summary(summary: &RunSummary) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║              RUN SUMMARY                                     ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!(
        "{:15} {:>10} {:>10} {:>12} {:>12} {:>12}",
        "Strategy", "Questions", "Errors", "Lat min", "Lat mean", "Lat max"
    );
    println!("{}", "─".repeat(75));
    for (name, stats) in &summary.by_strategy {
        println!(
            "{:15} {:>10} {:>9.1}% {:>10.0}ms {:>10.0}ms {:>10.0}ms",
            name,
            stats.question_count,
            stats.error_rate,
            stats.latency_min_ms,
            stats.latency_mean_ms,
            stats.latency_max_ms,
        );
    }
    println!("\n  {} records total", summary.record_count);
}

/// Score a saved run, aggregate per strategy, and export the reports
fn evaluate_results(
    results_path: &PathBuf,
    golden_set_path: &PathBuf,
    output_dir: &PathBuf,
    config_path: &PathBuf,
) -> Result<()> {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║              EVALUATION                                      ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let config = BenchConfig::load_or_default(config_path)?;

    println!("Loading benchmark results from {:?}...", results_path);
    let artifact = RunArtifact::load(results_path)?;
    println!(
        "  {} records from run {} ({} strategies)",
        artifact.results.len(),
        artifact.timestamp,
        artifact.strategies.len()
    );

    println!("Loading golden set from {:?}...", golden_set_path);
    let golden = GoldenSet::load(golden_set_path)?;
    println!("  {} questions", golden.len());

    let engine = ScoringEngine::new(&golden, config.weights)?;
    let evaluations = engine.evaluate_all(&artifact.results)?;

    let aggregates = aggregate(&evaluations);
    let recommendation = recommend(&aggregates);

    // Per-strategy score table
    println!("\n╔═══════════════════════════════════════════════════════════════════════════════╗");
    println!("║              SCORES BY STRATEGY                                               ║");
    println!("╚═══════════════════════════════════════════════════════════════════════════════╝\n");
    println!(
        "{:15} {:>8} {:>10} {:>10} {:>12} {:>8} {:>10} {:>8}",
        "Strategy", "Overall", "Correct", "Relevant", "Non-halluc", "Latency", "Ignorance", "Errors"
    );
    println!("{}", "─".repeat(88));
    for (name, agg) in &aggregates {
        println!(
            "{:15} {:>8.3} {:>10.3} {:>10.3} {:>12.3} {:>8.3} {:>10.3} {:>5}/{}",
            name,
            agg.mean_overall_score,
            agg.mean_correctness,
            agg.mean_relevance,
            agg.mean_non_hallucination,
            agg.mean_latency_score,
            agg.mean_ignorance_admission,
            agg.error_count,
            agg.question_count,
        );
    }

    if let Some(rec) = &recommendation {
        println!("\n▶ Recommended strategy: {}", rec.recommended_strategy);
        println!("  {}", rec.justification);
        for profile in &rec.ranking {
            println!(
                "  {} (overall {:.3}) - strengths: [{}], weaknesses: [{}]",
                profile.strategy_name,
                profile.mean_overall_score,
                profile.strengths.join(", "),
                profile.weaknesses.join(", "),
            );
        }
    } else {
        println!("\nNo evaluations to rank.");
    }

    // Export reports
    let csv_path = export::export_csv(&evaluations, output_dir, "evaluation_results.csv")?;

    let report = export::EvaluationReport {
        metadata: export::ReportMetadata {
            generated_at: chrono::Utc::now().to_rfc3339(),
            benchmark_file: results_path.to_string_lossy().to_string(),
            question_count: artifact.question_count,
            evaluation_count: evaluations.len(),
        },
        scores_by_strategy: aggregates,
        recommendation,
        evaluations,
    };
    let report_path = report.save(output_dir, "evaluation_report.json")?;

    println!("\nReports saved:");
    println!("  CSV:  {:?}", csv_path);
    println!("  JSON: {:?}", report_path);

    Ok(())
}

/// Validate a golden set file and print per-type counts
fn validate_golden(path: &PathBuf) -> Result<()> {
    println!("Validating {:?}...", path);

    let golden = GoldenSet::load(path)?;

    println!("✓ Valid golden set");
    println!("  Questions: {}", golden.len());

    let mut by_type: BTreeMap<&str, usize> = BTreeMap::new();
    for q in &golden.questions {
        *by_type.entry(q.question_type.name()).or_default() += 1;
    }

    println!("  Type distribution:");
    for (name, count) in &by_type {
        println!("    {}: {}", name, count);
    }

    let with_keywords = golden
        .questions
        .iter()
        .filter(|q| !q.expected_keywords.is_empty())
        .count();
    println!("  With expected keywords: {}", with_keywords);

    if by_type.contains_key(QuestionType::Unknown.name()) {
        println!("  ⚠ Unknown question types present, treated as non-off-topic");
    }

    Ok(())
}

fn list_strategies() {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║              AVAILABLE STRATEGIES                            ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    // Built over an empty corpus just to surface names and descriptions
    let empty = FaqBase { entries: vec![] };
    let registry = build_registry(&empty, &BenchConfig::default());
    for (name, adapter) in &registry {
        println!("  {:15} {}", name, adapter.description());
    }

    println!("\nCONFIGURATION:");
    println!("─────────────────────────────────────────────────────────────────");
    println!("  Strategies are selected in bench.toml. Example:");
    println!();
    println!("  strategies = [\"retrieval\", \"extractive\"]");
    println!("  top_k = 3");
    println!("  confidence_threshold = 0.5");
    println!("  timeout_ms = 30000");
}
