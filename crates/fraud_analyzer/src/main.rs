// Rust guideline compliant 2026-10-16

//! Fraud-risk analyzer entry point.
//!
//! Reads a transaction CSV, sends the normalized rows to the prediction
//! service and prints the risk classification. The run always completes:
//! when the service is unavailable the report carries fallback data and a
//! diagnostic instead.
//!
//! # Usage
//!
//! ```text
//! RUST_LOG=info cargo run -- transactions.csv
//! RUST_LOG=info cargo run -- transactions.csv --api-url https://fraud.example.com --json
//! cargo run -- transactions.csv --offline --seed 7
//! ```

mod adapters;
mod analysis;
mod cli;
mod render;

use adapters::log_report::LogReport;
use adapters::offline_predictor::OfflinePredictor;
use analysis::{AnalysisReport, Analyzer};
use anyhow::Context as _;
use clap::Parser as _;
use cli::{AppConfig, Cli};
use domain::Predictor;
use ingest::CsvParser;
use prediction_client::HttpPredictor;
use preprocess::Preprocessor;
use reconciler::Reconciler;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize the tracing subscriber before any async work.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = Cli::parse().into_config()?;
    let analyzer = Analyzer::new(
        CsvParser::new(config.ingest.clone()),
        Preprocessor::new(config.preprocessor.clone()),
        Reconciler::new(config.reconciler.clone()),
    );

    let report = if config.offline {
        tracing::info!("main.offline: prediction service disabled");
        run(&analyzer, &config, &OfflinePredictor::default()).await
    } else {
        let predictor =
            HttpPredictor::new(config.predictor.clone()).context("failed to build HTTP client")?;
        tracing::info!(endpoint = %config.predictor.endpoint(), "main.online");
        run(&analyzer, &config, &predictor).await
    };
    let Some(report) = report else {
        return Ok(());
    };

    LogReport::new(config.top).emit(&report);
    if config.json {
        println!("{}", render::render_json(&report).context("failed to serialize report")?);
    } else {
        print!("{}", render::render_text(&report, config.top));
    }
    Ok(())
}

/// Race the analysis against CTRL+C. `None` when interrupted.
async fn run<P: Predictor>(
    analyzer: &Analyzer,
    config: &AppConfig,
    predictor: &P,
) -> Option<AnalysisReport> {
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("main.shutdown: ctrl_c received, abandoning analysis");
            None
        }
        report = analyzer.analyze(&config.csv, predictor) => Some(report),
    }
}
