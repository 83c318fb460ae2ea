use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use screener::config::Config;
use screener::db::create_pool;
use screener::llm_client::LlmClient;
use screener::loader;
use screener::models::evaluation::FitLevel;
use screener::report;
use screener::report::export::to_csv_string;
use screener::screening::pipeline::EvaluationPipeline;
use screener::screening::scoring::RubricWeights;

/// Batch résumé screening against one job description.
///
/// Each candidate file goes through two model passes — extraction, then
/// scoring — and produces exactly one evaluation record, even on failure.
#[derive(Debug, Parser)]
#[command(name = "screener", version)]
struct Args {
    /// Job description file (.pdf or .txt)
    #[arg(long)]
    jd: PathBuf,

    /// Candidate CV files (.pdf or .txt)
    #[arg(required = true)]
    cvs: Vec<PathBuf>,

    /// Job title recorded on each evaluation; defaults to the JD file stem
    #[arg(long)]
    job_title: Option<String>,

    /// Rubric weight for matched skills, in percent
    #[arg(long, default_value_t = 50)]
    matched_weight: u8,

    /// Rubric weight for experience relevance, in percent
    #[arg(long, default_value_t = 20)]
    experience_weight: u8,

    /// Rubric weight for qualifications & achievements, in percent
    #[arg(long, default_value_t = 15)]
    qualifications_weight: u8,

    /// Rubric weight for depth & seniority, in percent
    #[arg(long, default_value_t = 10)]
    seniority_weight: u8,

    /// Rubric weight for CV clarity, in percent
    #[arg(long, default_value_t = 5)]
    clarity_weight: u8,

    /// Comma-separated skills whose absence caps the score
    #[arg(long, value_delimiter = ',')]
    critical_skills: Vec<String>,

    /// Write the CSV report here instead of stdout
    #[arg(long)]
    out: Option<PathBuf>,

    /// Skip persisting records to the database
    #[arg(long)]
    no_db: bool,

    /// Add a strengths/weaknesses analysis per candidate
    #[arg(long)]
    analysis: bool,

    /// Rescue scoreless candidates with the deterministic scorer
    #[arg(long)]
    heuristic_fallback: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting screener v{}", env!("CARGO_PKG_VERSION"));

    let jd_text = loader::load_document(&args.jd)
        .with_context(|| format!("Could not read the job description {}", args.jd.display()))?;

    let job_title = args.job_title.clone().unwrap_or_else(|| {
        args.jd
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("untitled")
            .to_string()
    });

    let rubric = RubricWeights {
        matched_skills_w: args.matched_weight,
        experience_relevance_w: args.experience_weight,
        qualifications_w: args.qualifications_weight,
        seniority_w: args.seniority_weight,
        cv_clarity_w: args.clarity_weight,
        critical_skills: args
            .critical_skills
            .iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
    };
    let weight_sum = args.matched_weight as u32
        + args.experience_weight as u32
        + args.qualifications_weight as u32
        + args.seniority_weight as u32
        + args.clarity_weight as u32;
    if weight_sum != 100 {
        warn!("Rubric weights sum to {weight_sum}%, not 100%");
    }

    let llm = LlmClient::new(config.anthropic_api_key.clone());
    let mut pipeline = EvaluationPipeline::new(llm, job_title.clone(), rubric);
    if args.heuristic_fallback {
        pipeline = pipeline.with_heuristic_fallback();
    }
    if args.analysis {
        pipeline = pipeline.with_analysis();
    }

    info!(
        "Evaluating {} candidates against '{}'",
        args.cvs.len(),
        job_title
    );
    let outcomes = pipeline.run_batch(&jd_text, &args.cvs).await;

    let mut evaluations: Vec<_> = outcomes.iter().map(|o| o.evaluation.clone()).collect();
    evaluations.sort_by(|a, b| b.score.total_cmp(&a.score));

    println!("\nEvaluation report — {job_title}");
    println!("{:-<72}", "");
    for evaluation in &evaluations {
        println!(
            "{:<28} {:>5.1}  {:<6}  {}",
            evaluation.candidate_name, evaluation.score, evaluation.fit_level, evaluation.rationale
        );
    }
    for outcome in outcomes.iter().filter(|o| o.analysis.is_some()) {
        println!(
            "\nStrengths & weaknesses — {}\n{}",
            outcome.evaluation.candidate_name,
            outcome.analysis.as_deref().unwrap_or_default()
        );
    }

    let high = evaluations
        .iter()
        .filter(|e| e.fit_level == FitLevel::High)
        .count();
    let medium = evaluations
        .iter()
        .filter(|e| e.fit_level == FitLevel::Medium)
        .count();
    let low = evaluations
        .iter()
        .filter(|e| e.fit_level == FitLevel::Low)
        .count();
    println!("{:-<72}", "");
    println!("High fit: {high}   Medium fit: {medium}   Low fit: {low}");

    if !args.no_db {
        match &config.database_url {
            Some(database_url) => {
                let pool = create_pool(database_url).await?;
                report::insert_batch(&pool, &evaluations).await?;
                let stored = report::evaluations_by_job(&pool, &job_title).await?;
                info!(
                    "{} evaluations now stored for '{}' (including earlier runs)",
                    stored.len(),
                    job_title
                );
            }
            None => warn!("DATABASE_URL not set; skipping persistence (use --no-db to silence)"),
        }
    }

    let csv = to_csv_string(&evaluations)?;
    match &args.out {
        Some(path) => {
            std::fs::write(path, &csv)
                .with_context(|| format!("Failed to write CSV report to {}", path.display()))?;
            info!("CSV report written to {}", path.display());
        }
        None => {
            println!("\n{csv}");
        }
    }

    Ok(())
}
