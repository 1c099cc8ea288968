// Rust guideline compliant 2026-10-16

//! Adapters for the fraud-analyzer binary.
//!
//! `OfflinePredictor` implements the `domain::Predictor` port without a
//! network; `LogReport` forwards a finished report to the tracing log.

pub mod log_report;
pub mod offline_predictor;
