// Rust guideline compliant 2026-10-16

//! Offline adapter for the `Predictor` port.
//!
//! Answers every request with empty buckets and a fixed risk distribution,
//! so the reconciler simulates the classification locally.

use domain::{NormalizedRow, PredictionError, PredictionResponse, Predictor, RiskDistribution};

/// `Predictor` adapter that never leaves the process.
#[derive(Debug, Clone, Copy)]
pub struct OfflinePredictor {
    distribution: RiskDistribution,
}

impl OfflinePredictor {
    /// Create an adapter reporting `distribution`.
    #[must_use]
    pub fn new(distribution: RiskDistribution) -> Self {
        Self { distribution }
    }
}

impl Default for OfflinePredictor {
    /// 10 % High, 20 % Medium, 70 % Low.
    fn default() -> Self {
        Self::new(RiskDistribution {
            high: 10.0,
            medium: 20.0,
            low: 70.0,
        })
    }
}

impl Predictor for OfflinePredictor {
    /// Always `Ok`: no buckets, only the configured distribution.
    async fn predict(&self, rows: &[NormalizedRow]) -> Result<PredictionResponse, PredictionError> {
        tracing::debug!(rows = rows.len(), "offline_predictor.predict");
        Ok(PredictionResponse {
            risk_distribution: Some(self.distribution),
            ..PredictionResponse::default()
        })
    }
}
