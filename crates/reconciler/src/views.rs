// Rust guideline compliant 2026-10-15

//! Aggregate views over a reconciled transaction list.

use domain::{ProcessedTransaction, RiskLevel};
use serde::Serialize;

/// Number of transactions per risk level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RiskCounts {
    #[serde(rename = "High")]
    pub high: usize,
    #[serde(rename = "Medium")]
    pub medium: usize,
    #[serde(rename = "Low")]
    pub low: usize,
}

impl RiskCounts {
    /// Count `txs` per level.
    #[must_use]
    pub fn from_transactions(txs: &[ProcessedTransaction]) -> Self {
        let mut counts = Self::default();
        for tx in txs {
            *counts.slot(tx.risk_level) += 1;
        }
        counts
    }

    /// Count for `level`.
    #[must_use]
    pub fn get(&self, level: RiskLevel) -> usize {
        match level {
            RiskLevel::High => self.high,
            RiskLevel::Medium => self.medium,
            RiskLevel::Low => self.low,
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.high + self.medium + self.low
    }

    fn slot(&mut self, level: RiskLevel) -> &mut usize {
        match level {
            RiskLevel::High => &mut self.high,
            RiskLevel::Medium => &mut self.medium,
            RiskLevel::Low => &mut self.low,
        }
    }
}

/// One point of the probability chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendPoint {
    /// 1-based position in the transaction list.
    pub index: usize,
    pub fraud_probability: f64,
}

/// Fraud probability of every transaction, in list order.
#[must_use]
pub fn probability_trend(txs: &[ProcessedTransaction]) -> Vec<TrendPoint> {
    txs.iter()
        .enumerate()
        .map(|(i, tx)| TrendPoint {
            index: i + 1,
            fraud_probability: tx.fraud_probability,
        })
        .collect()
}

/// Up to `limit` transactions at `level`, most probable first.
///
/// Ties keep their list order.
#[must_use]
pub fn top_transactions_by_risk_level(
    txs: &[ProcessedTransaction],
    level: RiskLevel,
    limit: usize,
) -> Vec<&ProcessedTransaction> {
    let mut matching: Vec<&ProcessedTransaction> =
        txs.iter().filter(|tx| tx.risk_level == level).collect();
    matching.sort_by(|a, b| b.fraud_probability.total_cmp(&a.fraud_probability));
    matching.truncate(limit);
    matching
}

/// Headline figures for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RiskSummary {
    pub total_transactions: usize,
    pub counts: RiskCounts,
    pub total_amount: f64,
    /// Sum of amounts classified High.
    pub high_risk_amount: f64,
    /// Mean fraud probability; 0 for an empty list.
    pub mean_fraud_probability: f64,
}

impl RiskSummary {
    #[must_use]
    #[expect(
        clippy::cast_precision_loss,
        reason = "transaction counts are capped far below 2^52"
    )]
    pub fn from_transactions(txs: &[ProcessedTransaction]) -> Self {
        let total_amount = txs.iter().map(|tx| tx.amount).sum();
        let high_risk_amount = txs
            .iter()
            .filter(|tx| tx.risk_level == RiskLevel::High)
            .map(|tx| tx.amount)
            .sum();
        let mean_fraud_probability = if txs.is_empty() {
            0.0
        } else {
            txs.iter().map(|tx| tx.fraud_probability).sum::<f64>() / txs.len() as f64
        };
        Self {
            total_transactions: txs.len(),
            counts: RiskCounts::from_transactions(txs),
            total_amount,
            high_risk_amount,
            mean_fraud_probability,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(id: &str, level: RiskLevel, probability: f64, amount: f64) -> ProcessedTransaction {
        ProcessedTransaction {
            id: id.to_owned(),
            merchant: "Acme".to_owned(),
            amount,
            date: "2019-01-01".to_owned(),
            risk_level: level,
            fraud_probability: probability,
            fields: serde_json::Map::new(),
        }
    }

    fn sample() -> Vec<ProcessedTransaction> {
        vec![
            tx("h1", RiskLevel::High, 0.75, 100.0),
            tx("h2", RiskLevel::High, 0.95, 50.0),
            tx("h3", RiskLevel::High, 0.75, 10.0),
            tx("m1", RiskLevel::Medium, 0.5, 20.0),
            tx("l1", RiskLevel::Low, 0.1, 5.0),
        ]
    }

    #[test]
    fn counts_sum_to_total() {
        let counts = RiskCounts::from_transactions(&sample());
        assert_eq!((counts.high, counts.medium, counts.low), (3, 1, 1));
        assert_eq!(counts.total(), 5);
        assert_eq!(counts.get(RiskLevel::Medium), 1);
        let json = serde_json::to_value(counts).unwrap();
        assert_eq!(json, serde_json::json!({"High": 3, "Medium": 1, "Low": 1}));
    }

    #[test]
    fn trend_follows_list_order() {
        let trend = probability_trend(&sample());
        assert_eq!(trend.len(), 5);
        assert_eq!(trend[0].index, 1);
        assert!((trend[1].fraud_probability - 0.95).abs() < f64::EPSILON);
        assert_eq!(trend[4].index, 5);
    }

    #[test]
    fn top_is_sorted_filtered_and_limited() {
        let txs = sample();
        let top = top_transactions_by_risk_level(&txs, RiskLevel::High, 2);
        let ids: Vec<&str> = top.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["h2", "h1"]);

        // Stable on ties: h1 precedes h3.
        let all = top_transactions_by_risk_level(&txs, RiskLevel::High, 10);
        let ids: Vec<&str> = all.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["h2", "h1", "h3"]);

        assert!(top_transactions_by_risk_level(&txs, RiskLevel::Low, 0).is_empty());
        assert!(top_transactions_by_risk_level(&[], RiskLevel::Low, 5).is_empty());
    }

    #[test]
    fn summary_figures() {
        let summary = RiskSummary::from_transactions(&sample());
        assert_eq!(summary.total_transactions, 5);
        assert!((summary.total_amount - 185.0).abs() < 1e-9);
        assert!((summary.high_risk_amount - 160.0).abs() < 1e-9);
        assert!((summary.mean_fraud_probability - 0.61).abs() < 1e-9);
    }

    #[test]
    fn empty_summary_is_zero() {
        assert_eq!(RiskSummary::from_transactions(&[]), RiskSummary::default());
    }
}
