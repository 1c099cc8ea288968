// Rust guideline compliant 2026-10-15

//! Synthetic transactions shown when an upload could not be read at all.

use crate::Reconciler;
use chrono::{Days, Utc};
use domain::{ProcessedTransaction, RiskLevel};
use rand::Rng;
use serde_json::{Map, Value};

const DEMO_MERCHANTS: &[&str] = &[
    "Amazon",
    "Walmart",
    "Target",
    "Best Buy",
    "Shell Gas Station",
    "Starbucks",
    "Uber",
    "Netflix",
    "Home Depot",
    "CVS Pharmacy",
];

const DEMO_CATEGORIES: &[&str] = &[
    "shopping_net",
    "grocery_pos",
    "shopping_pos",
    "electronics",
    "gas_transport",
    "food_dining",
    "travel",
    "entertainment",
    "home",
    "health_fitness",
];

/// Roughly one in ten demo transactions is High, two in ten Medium.
const DEMO_HIGH_SHARE: f64 = 0.1;
const DEMO_MEDIUM_SHARE: f64 = 0.2;

impl Reconciler {
    /// Generate `count` demo transactions, grouped High, Medium, Low.
    ///
    /// Amounts lie in `[1.00, 2000.00]` and dates within the last 30 days.
    #[must_use]
    pub fn demo_transactions(&self, count: usize) -> Vec<ProcessedTransaction> {
        let today = Utc::now().date_naive();
        let mut rng = self.rng.borrow_mut();
        let mut out: Vec<ProcessedTransaction> = (0..count)
            .map(|_| {
                let u: f64 = rng.random();
                let risk_level = if u < DEMO_HIGH_SHARE {
                    RiskLevel::High
                } else if u < DEMO_HIGH_SHARE + DEMO_MEDIUM_SHARE {
                    RiskLevel::Medium
                } else {
                    RiskLevel::Low
                };
                // Integer cents keep amounts at two decimals.
                let amount = f64::from(rng.random_range(100_u32..=200_000)) / 100.0;
                let date = today
                    .checked_sub_days(Days::new(rng.random_range(0..30)))
                    .unwrap_or(today);
                let mut fields = Map::new();
                fields.insert(
                    "category".to_owned(),
                    Value::from(DEMO_CATEGORIES[rng.random_range(0..DEMO_CATEGORIES.len())]),
                );
                ProcessedTransaction {
                    id: domain::synthesize_transaction_id(&mut *rng),
                    merchant: DEMO_MERCHANTS[rng.random_range(0..DEMO_MERCHANTS.len())]
                        .to_owned(),
                    amount,
                    date: date.format("%Y-%m-%d").to_string(),
                    risk_level,
                    fraud_probability: rng.random_range(risk_level.probability_range()),
                    fields,
                }
            })
            .collect();
        out.sort_by_key(|tx| tx.risk_level);
        log::info!("reconciler.demo: transactions={}", out.len());
        out
    }
}

#[cfg(test)]
mod tests {
    use crate::{Reconciler, ReconcilerConfig, RiskCounts};
    use domain::RiskLevel;

    fn reconciler(seed: u64) -> Reconciler {
        Reconciler::new(ReconcilerConfig::builder().seed(seed).build().unwrap())
    }

    #[test]
    fn demo_transactions_are_well_formed() {
        let txs = reconciler(21).demo_transactions(500);
        assert_eq!(txs.len(), 500);
        for tx in &txs {
            assert!((1.0..=2000.0).contains(&tx.amount), "{}", tx.amount);
            assert!(tx.risk_level.probability_range().contains(&tx.fraud_probability));
            assert!(tx.id.starts_with("TX-"));
            assert_eq!(tx.date.len(), 10);
            assert!(tx.fields.contains_key("category"));
        }
        assert!(txs.windows(2).all(|w| w[0].risk_level <= w[1].risk_level));
    }

    #[test]
    fn demo_mix_is_mostly_low() {
        let counts = RiskCounts::from_transactions(&reconciler(4).demo_transactions(1000));
        assert!(counts.get(RiskLevel::Low) > counts.get(RiskLevel::Medium));
        assert!(counts.get(RiskLevel::Medium) > counts.get(RiskLevel::High));
        assert!(counts.get(RiskLevel::High) > 0);
    }

    #[test]
    fn zero_count_is_empty() {
        assert!(reconciler(1).demo_transactions(0).is_empty());
    }
}
