// Rust guideline compliant 2026-10-13

//! Preprocessor component -- reshapes uploaded rows into the model's feature
//! schema.
//!
//! Rows are normalized independently and in order; batching only bounds the
//! amount of work logged per step and never changes the result.
//!
//! Entry points: [`Preprocessor::preprocess`], [`Preprocessor::normalize`].
//! Configuration via [`PreprocessorConfig::builder`].

mod normalize;

pub use normalize::{DEFAULT_AGE, normalize_row};

use domain::{NormalizedRow, RawRow};
use rand::{SeedableRng, rngs::StdRng};
use std::cell::RefCell;

// ---------------------------------------------------------------------------
// PreprocessError
// ---------------------------------------------------------------------------

/// Errors that can occur while configuring the preprocessor.
///
/// Normalization itself is total and never fails.
#[derive(Debug, thiserror::Error)]
pub enum PreprocessError {
    /// The supplied configuration is invalid.
    #[error("invalid preprocessor configuration: {reason}")]
    InvalidConfig {
        /// Human-readable description of the problem.
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// PreprocessorConfig + builder
// ---------------------------------------------------------------------------

/// Runtime configuration for a [`Preprocessor`].
///
/// Construct via [`PreprocessorConfig::builder`].
#[derive(Debug, Clone)]
pub struct PreprocessorConfig {
    /// Rows normalized per step.
    pub batch_size: usize,
    /// Optional RNG seed for reproducible synthesized ids. `None` seeds from the OS.
    pub seed: Option<u64>,
}

/// Builder for [`PreprocessorConfig`].
///
/// Obtain via [`PreprocessorConfig::builder`]; finalize with [`build`](Self::build).
#[derive(Debug)]
pub struct PreprocessorConfigBuilder {
    batch_size: usize,
    seed: Option<u64>,
}

impl PreprocessorConfig {
    /// Create a builder.
    ///
    /// Default values: `batch_size = 10_000`, `seed = None`.
    #[must_use]
    pub fn builder() -> PreprocessorConfigBuilder {
        PreprocessorConfigBuilder {
            batch_size: 10_000,
            seed: None,
        }
    }
}

impl PreprocessorConfigBuilder {
    /// Override the number of rows normalized per step.
    #[must_use]
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Fix the RNG seed for deterministic output (useful in tests).
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validate and build the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PreprocessError::InvalidConfig`] when `batch_size` is zero.
    #[must_use = "the Result must be checked; use ? or unwrap"]
    pub fn build(self) -> Result<PreprocessorConfig, PreprocessError> {
        if self.batch_size == 0 {
            return Err(PreprocessError::InvalidConfig {
                reason: "batch_size must be >= 1".to_owned(),
            });
        }
        Ok(PreprocessorConfig {
            batch_size: self.batch_size,
            seed: self.seed,
        })
    }
}

// ---------------------------------------------------------------------------
// Preprocessor
// ---------------------------------------------------------------------------

/// Normalizes uploaded rows, one output row per input row, order preserved.
#[derive(Debug)]
pub struct Preprocessor {
    config: PreprocessorConfig,
    /// Interior mutability required because all public methods take `&self`.
    rng: RefCell<StdRng>,
}

impl Preprocessor {
    /// Create a new preprocessor from `config`.
    ///
    /// Seeds the RNG from `config.seed` if set, otherwise from the OS.
    #[must_use]
    pub fn new(config: PreprocessorConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            config,
            rng: RefCell::new(rng),
        }
    }

    /// Normalize a single row.
    #[must_use]
    pub fn normalize(&self, raw: RawRow) -> NormalizedRow {
        normalize_row(raw, &mut *self.rng.borrow_mut())
    }

    /// Normalize every row of an upload in batches of `config.batch_size`.
    #[must_use]
    pub fn preprocess(&self, rows: Vec<RawRow>) -> Vec<NormalizedRow> {
        let total = rows.len();
        let mut out = Vec::with_capacity(total);
        let mut rows = rows.into_iter();
        let mut rng = self.rng.borrow_mut();
        loop {
            let before = out.len();
            out.extend(
                rows.by_ref()
                    .take(self.config.batch_size)
                    .map(|raw| normalize_row(raw, &mut *rng)),
            );
            let normalized = out.len() - before;
            if normalized == 0 {
                break;
            }
            log::debug!(
                "preprocess.batch.normalized: rows={normalized} progress={}/{total}",
                out.len()
            );
        }
        log::info!("preprocess.done: rows={}", out.len());
        out
    }
}
