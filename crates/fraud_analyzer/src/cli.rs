// Rust guideline compliant 2026-10-16

//! Command-line arguments and their resolution into component configs.

use anyhow::Context as _;
use clap::Parser;
use ingest::IngestConfig;
use prediction_client::PredictorConfig;
use preprocess::PreprocessorConfig;
use reconciler::ReconcilerConfig;
use std::path::PathBuf;
use std::time::Duration;

/// Classify the transactions of a CSV file by fraud risk.
#[derive(Debug, Parser)]
#[command(name = "fraud_analyzer", version)]
pub struct Cli {
    /// CSV file to analyze.
    pub csv: PathBuf,

    /// Base URL of the prediction service.
    #[arg(long, env = "FRAUD_API_URL", default_value = "http://127.0.0.1:8000")]
    pub api_url: String,

    /// Seconds to wait for the prediction service.
    #[arg(long, env = "FRAUD_API_TIMEOUT_SECS", default_value_t = 120)]
    pub timeout_secs: u64,

    /// Seed for synthesized ids and fallback classification.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Print the full report as JSON instead of text.
    #[arg(long)]
    pub json: bool,

    /// Skip the prediction service and simulate its answer locally.
    #[arg(long)]
    pub offline: bool,

    /// Number of High-risk transactions listed in the text report.
    #[arg(long, default_value_t = 5)]
    pub top: usize,
}

/// Fully validated configuration for one run.
#[derive(Debug)]
pub struct AppConfig {
    pub csv: PathBuf,
    pub ingest: IngestConfig,
    pub preprocessor: PreprocessorConfig,
    pub predictor: PredictorConfig,
    pub reconciler: ReconcilerConfig,
    pub json: bool,
    pub offline: bool,
    pub top: usize,
}

impl Cli {
    /// Validate the arguments and build every component config.
    ///
    /// # Errors
    ///
    /// Returns an error naming the offending setting when a builder rejects it.
    pub fn into_config(self) -> anyhow::Result<AppConfig> {
        let ingest = IngestConfig::builder()
            .build()
            .context("failed to build ingest config")?;

        let mut preprocessor = PreprocessorConfig::builder();
        let mut reconciler = ReconcilerConfig::builder();
        if let Some(seed) = self.seed {
            preprocessor = preprocessor.seed(seed);
            // Distinct stream so ids and fallback draws do not correlate.
            reconciler = reconciler.seed(seed.wrapping_add(1));
        }
        let preprocessor = preprocessor
            .build()
            .context("failed to build preprocessor config")?;
        let reconciler = reconciler
            .build()
            .context("failed to build reconciler config")?;

        let predictor = PredictorConfig::builder(self.api_url)
            .timeout(Duration::from_secs(self.timeout_secs))
            .build()
            .context("failed to build predictor config")?;

        Ok(AppConfig {
            csv: self.csv,
            ingest,
            preprocessor,
            predictor,
            reconciler,
            json: self.json,
            offline: self.offline,
            top: self.top,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::Cli;
    use clap::Parser as _;
    use std::time::Duration;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["fraud_analyzer", "tx.csv"]).unwrap();
        assert!(!cli.json && !cli.offline);
        assert_eq!(cli.top, 5);
        assert!(cli.seed.is_none());

        let config = cli.into_config().unwrap();
        assert_eq!(config.csv.to_str(), Some("tx.csv"));
        assert_eq!(config.ingest.max_rows, 100_000);
        assert_eq!(config.preprocessor.batch_size, 10_000);
    }

    #[test]
    fn explicit_flags() {
        let cli = Cli::try_parse_from([
            "fraud_analyzer",
            "tx.csv",
            "--api-url",
            "https://fraud.example.com",
            "--timeout-secs",
            "30",
            "--seed",
            "7",
            "--json",
            "--offline",
            "--top",
            "3",
        ])
        .unwrap();
        let config = cli.into_config().unwrap();
        assert_eq!(config.predictor.endpoint(), "https://fraud.example.com/predict");
        assert_eq!(config.predictor.timeout, Duration::from_secs(30));
        assert_eq!(config.preprocessor.seed, Some(7));
        assert_eq!(config.reconciler.seed, Some(8));
        assert!(config.json && config.offline);
        assert_eq!(config.top, 3);
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let cli = Cli::try_parse_from(["fraud_analyzer", "tx.csv", "--api-url", "localhost"])
            .unwrap();
        let err = cli.into_config().unwrap_err();
        assert!(format!("{err:#}").contains("predictor config"), "{err:#}");

        let cli = Cli::try_parse_from(["fraud_analyzer", "tx.csv", "--timeout-secs", "0"])
            .unwrap();
        cli.into_config().unwrap_err();
    }

    #[test]
    fn csv_path_is_required() {
        Cli::try_parse_from(["fraud_analyzer"]).unwrap_err();
    }
}
