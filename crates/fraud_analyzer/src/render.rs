// Rust guideline compliant 2026-10-16

//! Text and JSON rendering of an [`AnalysisReport`].

use crate::analysis::AnalysisReport;
use domain::RiskLevel;
use std::fmt::{self, Write};

/// Pretty-printed JSON view model.
///
/// # Errors
///
/// Returns an error when the report cannot be serialized.
pub fn render_json(report: &AnalysisReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

/// Plain-text report: summary, distribution and the top High-risk rows.
#[must_use]
pub fn render_text(report: &AnalysisReport, top: usize) -> String {
    let mut out = String::new();
    if write_text(&mut out, report, top).is_err() {
        tracing::error!("render.text_failed");
    }
    out
}

fn write_text(out: &mut impl Write, report: &AnalysisReport, top: usize) -> fmt::Result {
    let summary = &report.summary;

    writeln!(out, "Fraud risk analysis {}", report.run_id)?;
    if let Some(diagnostic) = &report.diagnostic {
        writeln!(out, "!! [{}] {}", diagnostic.status, diagnostic.message)?;
    }
    if report.fallback {
        writeln!(out, "!! showing fallback data, not model predictions")?;
    }
    if report.truncated {
        writeln!(out, "!! upload truncated at the row limit")?;
    }
    writeln!(out)?;
    writeln!(out, "Transactions:        {}", summary.total_transactions)?;
    writeln!(out, "Total amount:        {:.2}", summary.total_amount)?;
    writeln!(out, "High-risk amount:    {:.2}", summary.high_risk_amount)?;
    writeln!(out, "Mean probability:    {:.3}", summary.mean_fraud_probability)?;
    writeln!(out)?;
    writeln!(out, "Risk distribution:")?;
    for level in RiskLevel::ALL {
        writeln!(out, "  {:<8}{:>8}", level.as_str(), report.risk_counts.get(level))?;
    }

    let flagged = report.top_high_risk(top);
    if !flagged.is_empty() {
        writeln!(out)?;
        writeln!(out, "Top high-risk transactions:")?;
        for tx in flagged {
            writeln!(
                out,
                "  {:<16} {:<24} {:>10.2}  {}  p={:.3}",
                tx.id, tx.merchant, tx.amount, tx.date, tx.fraud_probability
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{render_json, render_text};
    use crate::analysis::{AnalysisReport, Diagnostic};
    use domain::{ProcessedTransaction, RiskLevel};

    fn report(diagnostic: Option<Diagnostic>) -> AnalysisReport {
        let tx = ProcessedTransaction {
            id: "T-9".to_owned(),
            merchant: "Jewelry Palace".to_owned(),
            amount: 1500.0,
            date: "2019-01-01".to_owned(),
            risk_level: RiskLevel::High,
            fraud_probability: 0.93,
            fields: serde_json::Map::new(),
        };
        let fallback = diagnostic.is_some();
        AnalysisReport::new(uuid::Uuid::nil(), vec![tx], false, fallback, diagnostic)
    }

    #[test]
    fn text_lists_summary_and_top_rows() {
        let text = render_text(&report(None), 5);
        assert!(text.contains("Transactions:        1"));
        assert!(text.contains("High-risk amount:    1500.00"));
        assert!(text.contains("  High           1"));
        assert!(text.contains("T-9"));
        assert!(text.contains("p=0.930"));
        assert!(!text.contains("!!"));
    }

    #[test]
    fn text_flags_degraded_runs() {
        let diagnostic = Diagnostic {
            status: 500,
            message: "service unavailable".to_owned(),
        };
        let text = render_text(&report(Some(diagnostic)), 0);
        assert!(text.contains("!! [500] service unavailable"));
        assert!(text.contains("fallback data"));
        assert!(!text.contains("Top high-risk"));
    }

    #[test]
    fn text_flags_truncated_uploads() {
        let mut capped = report(None);
        capped.truncated = true;
        let text = render_text(&capped, 5);
        assert!(text.starts_with("Fraud risk analysis 00000000-0000-0000-0000-000000000000\n"));
        assert!(text.contains("!! upload truncated at the row limit"));
        assert!(text.ends_with("p=0.930\n"), "{text}");
    }

    #[test]
    fn json_is_the_view_model() {
        let json = render_json(&report(None)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["transactions"][0]["merchant"], "Jewelry Palace");
        assert_eq!(value["summary"]["total_transactions"], 1);
    }
}
