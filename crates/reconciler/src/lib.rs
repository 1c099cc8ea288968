// Rust guideline compliant 2026-10-15

//! Result reconciler -- merges prediction buckets back onto the uploaded rows.
//!
//! [`Reconciler::reconcile`] turns a [`PredictionResponse`] into the final
//! [`ProcessedTransaction`] list. When the service classified nothing, the
//! reconciler simulates a classification from the reported risk distribution
//! and, as a last resort, assigns random levels. All randomness comes from a
//! seedable RNG so fallback output is reproducible in tests.
//!
//! Output is always grouped High, then Medium, then Low; order within a
//! group follows the service (or input) order.
//!
//! Configuration via [`ReconcilerConfig::builder`].

mod demo;
mod views;

pub use views::{
    RiskCounts, RiskSummary, TrendPoint, probability_trend, top_transactions_by_risk_level,
};

use domain::{
    ApiRecord, NormalizedRow, PredictionResponse, ProcessedTransaction, RiskDistribution,
    RiskLevel,
};
use rand::{Rng, SeedableRng, rngs::StdRng};
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// ReconcilerError
// ---------------------------------------------------------------------------

/// Errors that can occur while configuring the reconciler.
#[derive(Debug, thiserror::Error)]
pub enum ReconcilerError {
    /// The supplied configuration is invalid.
    #[error("invalid reconciler configuration: {reason}")]
    InvalidConfig {
        /// Human-readable description of the problem.
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// ReconcilerConfig + builder
// ---------------------------------------------------------------------------

/// Runtime configuration for a [`Reconciler`].
///
/// Construct via [`ReconcilerConfig::builder`].
#[derive(Debug, Clone)]
pub struct ReconcilerConfig {
    /// Optional RNG seed for reproducible fallback output. `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Merchant name used when neither the upload nor the service provides one.
    pub default_merchant: String,
}

/// Builder for [`ReconcilerConfig`].
///
/// Obtain via [`ReconcilerConfig::builder`]; finalize with [`build`](Self::build).
#[derive(Debug)]
pub struct ReconcilerConfigBuilder {
    seed: Option<u64>,
    default_merchant: String,
}

impl ReconcilerConfig {
    /// Create a builder.
    ///
    /// Default values: `seed = None`, `default_merchant = "Unknown Merchant"`.
    #[must_use]
    pub fn builder() -> ReconcilerConfigBuilder {
        ReconcilerConfigBuilder {
            seed: None,
            default_merchant: "Unknown Merchant".to_owned(),
        }
    }
}

impl ReconcilerConfigBuilder {
    /// Fix the RNG seed for deterministic output (useful in tests).
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Override the fallback merchant name.
    #[must_use]
    pub fn default_merchant(mut self, merchant: impl Into<String>) -> Self {
        self.default_merchant = merchant.into();
        self
    }

    /// Validate and build the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcilerError::InvalidConfig`] when `default_merchant` is blank.
    #[must_use = "the Result must be checked; use ? or unwrap"]
    pub fn build(self) -> Result<ReconcilerConfig, ReconcilerError> {
        if self.default_merchant.trim().is_empty() {
            return Err(ReconcilerError::InvalidConfig {
                reason: "default_merchant must not be blank".to_owned(),
            });
        }
        Ok(ReconcilerConfig {
            seed: self.seed,
            default_merchant: self.default_merchant,
        })
    }
}

// ---------------------------------------------------------------------------
// Reconciler
// ---------------------------------------------------------------------------

/// Merges service predictions with normalized rows and produces fallbacks.
#[derive(Debug)]
pub struct Reconciler {
    config: ReconcilerConfig,
    /// Interior mutability required because all public methods take `&self`.
    rng: RefCell<StdRng>,
}

impl Reconciler {
    /// Create a new reconciler from `config`.
    ///
    /// Seeds the RNG from `config.seed` if set, otherwise from the OS.
    #[must_use]
    pub fn new(config: ReconcilerConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            config,
            rng: RefCell::new(rng),
        }
    }

    /// Build the final transaction list from `rows` and the service `response`.
    ///
    /// Every record of every bucket yields one transaction: the matching
    /// normalized row (looked up by id) overlaid with the record's fields.
    /// When all buckets are empty the classification is simulated from
    /// `riskDistribution`; see [`simulate`](Self::simulate).
    #[must_use]
    pub fn reconcile(
        &self,
        rows: &[NormalizedRow],
        response: &PredictionResponse,
    ) -> Vec<ProcessedTransaction> {
        let index: HashMap<&str, &NormalizedRow> =
            rows.iter().map(|row| (row.id.as_str(), row)).collect();

        let mut out = Vec::new();
        let mut unmatched = 0_usize;
        for level in RiskLevel::ALL {
            for record in response.bucket(level) {
                let id = self.resolve_id(record);
                let mut merged = if let Some(row) = index.get(id.as_str()) {
                    row.to_fields().to_json()
                } else {
                    unmatched += 1;
                    Map::new()
                };
                merged.extend(record.iter().map(|(k, v)| (k.clone(), v.clone())));
                // Only the service decides the probability; an uploaded column never does.
                let probability = record
                    .get("fraud_probability")
                    .and_then(number_value)
                    .map_or(level.default_probability(), |p| p.clamp(0.0, 1.0));
                out.push(self.finish(id, merged, level, probability));
            }
        }

        if response.has_no_transactions() {
            log::info!(
                "reconciler.simulated: rows={} distribution={:?}",
                rows.len(),
                response.risk_distribution
            );
            out = self.simulate(rows, response.risk_distribution.unwrap_or_default());
        }
        if out.is_empty() && !rows.is_empty() {
            log::warn!("reconciler.random_fallback: rows={}", rows.len());
            out = self.random_classification(rows);
        }

        log::info!(
            "reconciler.reconciled: transactions={} unmatched={unmatched}",
            out.len()
        );
        out
    }

    /// Classify `rows` by drawing against cumulative distribution thresholds.
    ///
    /// Each row draws `u` in `[0, 1)`: `u < p_high` is High,
    /// `u < p_high + p_medium` is Medium, anything else Low. A zero (or
    /// negative) total sends every row to Low. Probabilities are drawn from
    /// the level's [`RiskLevel::probability_range`].
    #[must_use]
    pub fn simulate(
        &self,
        rows: &[NormalizedRow],
        distribution: RiskDistribution,
    ) -> Vec<ProcessedTransaction> {
        let high = distribution.high.max(0.0);
        let medium = distribution.medium.max(0.0);
        let total = high + medium + distribution.low.max(0.0);
        let (p_high, p_medium) = if total > 0.0 && total.is_finite() {
            (high / total, medium / total)
        } else {
            (0.0, 0.0)
        };

        let mut rng = self.rng.borrow_mut();
        let mut out: Vec<ProcessedTransaction> = rows
            .iter()
            .map(|row| {
                let u: f64 = rng.random();
                let level = if u < p_high {
                    RiskLevel::High
                } else if u < p_high + p_medium {
                    RiskLevel::Medium
                } else {
                    RiskLevel::Low
                };
                let probability = rng.random_range(level.probability_range());
                self.finish(row.id.clone(), row.to_fields().to_json(), level, probability)
            })
            .collect();
        out.sort_by_key(|tx| tx.risk_level);
        out
    }

    /// Assign every row a uniformly random level and an in-range probability.
    ///
    /// Used when the service could not be reached at all.
    #[must_use]
    pub fn random_classification(&self, rows: &[NormalizedRow]) -> Vec<ProcessedTransaction> {
        let mut rng = self.rng.borrow_mut();
        let mut out: Vec<ProcessedTransaction> = rows
            .iter()
            .map(|row| {
                let level = RiskLevel::ALL[rng.random_range(0..RiskLevel::ALL.len())];
                let probability = rng.random_range(level.probability_range());
                self.finish(row.id.clone(), row.to_fields().to_json(), level, probability)
            })
            .collect();
        out.sort_by_key(|tx| tx.risk_level);
        out
    }

    /// Id of a service record: `id`, then `trans_num`, then `cc_num`, else synthesized.
    fn resolve_id(&self, record: &ApiRecord) -> String {
        ["id", "trans_num", "cc_num"]
            .iter()
            .find_map(|key| record.get(*key).and_then(text_value))
            .unwrap_or_else(|| domain::synthesize_transaction_id(&mut *self.rng.borrow_mut()))
    }

    /// Fill the typed fields from `merged` and drop them from the field map.
    fn finish(
        &self,
        id: String,
        mut merged: Map<String, Value>,
        risk_level: RiskLevel,
        fraud_probability: f64,
    ) -> ProcessedTransaction {
        let merchant = merged
            .get("merchant")
            .and_then(text_value)
            .unwrap_or_else(|| self.config.default_merchant.clone());
        let amount = ["amount", "amt"]
            .iter()
            .find_map(|key| merged.get(*key).and_then(number_value))
            .unwrap_or(0.0);
        let date = merged.get("date").and_then(text_value).unwrap_or_else(today);
        for key in ProcessedTransaction::TYPED_KEYS {
            merged.remove(key);
        }
        ProcessedTransaction {
            id,
            merchant,
            amount,
            date,
            risk_level,
            fraud_probability,
            fields: merged,
        }
    }
}

/// Non-blank string or number rendered as text.
fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_owned()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Finite number, accepting numeric strings.
fn number_value(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn today() -> String {
    chrono::Utc::now().date_naive().format("%Y-%m-%d").to_string()
}
