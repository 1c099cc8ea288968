// Rust guideline compliant 2026-10-16

//! Orchestrator: ingest, normalize, predict and reconcile one upload.
//!
//! [`Analyzer::analyze`] never fails. Every error is caught here and turned
//! into renderable fallback data plus a [`Diagnostic`] carrying HTTP-style
//! status semantics (400 for unreadable input, 500 for prediction failures).

use domain::{PredictionError, Predictor, ProcessedTransaction, RiskLevel};
use ingest::{CsvParser, IngestError};
use preprocess::Preprocessor;
use reconciler::{
    Reconciler, RiskCounts, RiskSummary, TrendPoint, probability_trend,
    top_transactions_by_risk_level,
};
use serde::Serialize;
use std::path::Path;
use tracing::Instrument as _;
use uuid::Uuid;

/// Demo transactions shown when the upload cannot be read.
const DEMO_TRANSACTIONS: usize = 50;

// ---------------------------------------------------------------------------
// AnalysisError + Diagnostic
// ---------------------------------------------------------------------------

/// Failure of one pipeline stage.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// The upload could not be read as CSV.
    #[error("error parsing CSV: {source}")]
    Ingest {
        /// The underlying ingest error.
        #[from]
        source: IngestError,
    },
    /// The prediction service gave no usable answer.
    #[error("error processing data: {source}")]
    Prediction {
        /// The underlying prediction error.
        #[from]
        source: PredictionError,
    },
}

impl AnalysisError {
    /// HTTP-style status: 400 for input errors, 500 for service errors.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Ingest { .. } => 400,
            Self::Prediction { .. } => 500,
        }
    }

    /// Message shown next to the fallback data.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Prediction {
                source: PredictionError::Timeout { timeout },
            } => format!(
                "the prediction service did not answer within {timeout:?}; \
                 it may still be starting up from a cold start, try again in a minute"
            ),
            Self::Prediction {
                source: PredictionError::InvalidResponse { reason },
            } => format!("invalid response format from the prediction service: {reason}"),
            other => other.to_string(),
        }
    }
}

/// Status and message attached to a report whose primary path failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub status: u16,
    pub message: String,
}

impl From<&AnalysisError> for Diagnostic {
    fn from(err: &AnalysisError) -> Self {
        Self {
            status: err.status_code(),
            message: err.user_message(),
        }
    }
}

// ---------------------------------------------------------------------------
// AnalysisReport
// ---------------------------------------------------------------------------

/// Everything produced by one run, ready for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub run_id: Uuid,
    /// Grouped High, Medium, Low.
    pub transactions: Vec<ProcessedTransaction>,
    pub risk_counts: RiskCounts,
    pub trend: Vec<TrendPoint>,
    pub summary: RiskSummary,
    /// `true` when rows beyond the ingest cap were ignored.
    pub truncated: bool,
    /// `true` when the transactions are simulated, random or demo data.
    pub fallback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<Diagnostic>,
}

impl AnalysisReport {
    pub(crate) fn new(
        run_id: Uuid,
        transactions: Vec<ProcessedTransaction>,
        truncated: bool,
        fallback: bool,
        diagnostic: Option<Diagnostic>,
    ) -> Self {
        Self {
            run_id,
            risk_counts: RiskCounts::from_transactions(&transactions),
            trend: probability_trend(&transactions),
            summary: RiskSummary::from_transactions(&transactions),
            transactions,
            truncated,
            fallback,
            diagnostic,
        }
    }

    /// Most probable High-risk transactions, at most `limit`.
    #[must_use]
    pub fn top_high_risk(&self, limit: usize) -> Vec<&ProcessedTransaction> {
        top_transactions_by_risk_level(&self.transactions, RiskLevel::High, limit)
    }
}

// ---------------------------------------------------------------------------
// Analyzer
// ---------------------------------------------------------------------------

/// Runs the upload/predict/reconcile cycle over injected components.
#[derive(Debug)]
pub struct Analyzer {
    parser: CsvParser,
    preprocessor: Preprocessor,
    reconciler: Reconciler,
}

impl Analyzer {
    #[must_use]
    pub fn new(parser: CsvParser, preprocessor: Preprocessor, reconciler: Reconciler) -> Self {
        Self {
            parser,
            preprocessor,
            reconciler,
        }
    }

    /// Analyze the CSV at `path` using `predictor`.
    ///
    /// Always returns a report; failures are described by its `diagnostic`.
    pub async fn analyze<P: Predictor>(&self, path: &Path, predictor: &P) -> AnalysisReport {
        let run_id = Uuid::new_v4();
        self.run(run_id, path, predictor)
            .instrument(tracing::info_span!("analysis", run_id = %run_id))
            .await
    }

    async fn run<P: Predictor>(&self, run_id: Uuid, path: &Path, predictor: &P) -> AnalysisReport {
        tracing::info!(path = %path.display(), "analysis.start");

        let parsed = match self.parser.read_all(path) {
            Ok(parsed) => parsed,
            Err(e) => {
                let err = AnalysisError::from(e);
                tracing::error!(status = err.status_code(), error = %err, "analysis.ingest_failed");
                let demo = self.reconciler.demo_transactions(DEMO_TRANSACTIONS);
                return AnalysisReport::new(run_id, demo, false, true, Some(Diagnostic::from(&err)));
            }
        };
        if parsed.rows.is_empty() {
            tracing::info!("analysis.empty_upload");
            return AnalysisReport::new(run_id, Vec::new(), parsed.truncated, false, None);
        }

        let rows = self.preprocessor.preprocess(parsed.rows);
        let report = match predictor.predict(&rows).await {
            Ok(response) => {
                let simulated = response.has_no_transactions();
                let transactions = self.reconciler.reconcile(&rows, &response);
                AnalysisReport::new(run_id, transactions, parsed.truncated, simulated, None)
            }
            Err(e) => {
                let err = AnalysisError::from(e);
                tracing::error!(status = err.status_code(), error = %err, "analysis.prediction_failed");
                let transactions = self.reconciler.random_classification(&rows);
                AnalysisReport::new(
                    run_id,
                    transactions,
                    parsed.truncated,
                    true,
                    Some(Diagnostic::from(&err)),
                )
            }
        };

        tracing::info!(
            transactions = report.transactions.len(),
            high = report.risk_counts.high,
            medium = report.risk_counts.medium,
            low = report.risk_counts.low,
            fallback = report.fallback,
            "analysis.done"
        );
        report
    }
}
