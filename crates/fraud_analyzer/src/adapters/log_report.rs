// Rust guideline compliant 2026-10-16

//! Log sink for finished analysis reports.
//!
//! Emits the headline figures at `info` and one `warn` per top High-risk
//! transaction, so a run leaves an audit trail even when stdout is discarded.

use crate::analysis::AnalysisReport;

/// Writes a report summary to the tracing log.
#[derive(Debug)]
pub struct LogReport {
    top: usize,
}

impl LogReport {
    /// Create a sink that flags at most `top` High-risk transactions.
    #[must_use]
    pub fn new(top: usize) -> Self {
        Self { top }
    }

    /// Log `report`. Returns the number of transactions flagged.
    pub fn emit(&self, report: &AnalysisReport) -> usize {
        let summary = &report.summary;
        tracing::info!(
            transactions = summary.total_transactions,
            high = summary.counts.high,
            medium = summary.counts.medium,
            low = summary.counts.low,
            total_amount = summary.total_amount,
            fallback = report.fallback,
            truncated = report.truncated,
            "log_report.summary"
        );
        if let Some(diagnostic) = &report.diagnostic {
            tracing::warn!(
                status = diagnostic.status,
                message = %diagnostic.message,
                "log_report.degraded"
            );
        }
        let flagged = report.top_high_risk(self.top);
        for tx in &flagged {
            tracing::warn!(
                transaction_id = %tx.id,
                merchant = %tx.merchant,
                amount = tx.amount,
                fraud_probability = tx.fraud_probability,
                "log_report.high_risk"
            );
        }
        flagged.len()
    }
}
