// Rust guideline compliant 2026-10-12

//! Shared domain types for the fraud-risk analysis pipeline.
//!
//! Defines the row model (`RawRow`, `NormalizedRow`), the prediction payloads
//! (`PredictionResponse`, `ProcessedTransaction`), `RiskLevel`, and the
//! hexagonal `Predictor` port. All pipeline crates depend on this crate.

mod schema;

pub use schema::{CATEGORY_COUNT, Category, US_STATE_CODES, UsState};

use serde::ser::SerializeMap as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use rand::Rng;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::ops::Range;
use std::time::Duration;

/// A partial transaction record as returned by the prediction service.
pub type ApiRecord = serde_json::Map<String, serde_json::Value>;

/// Generate a placeholder transaction id of the form `TX-1234567`.
pub fn synthesize_transaction_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("TX-{}", rng.random_range(1_000_000_u32..10_000_000))
}

// ---------------------------------------------------------------------------
// FieldValue + Fields
// ---------------------------------------------------------------------------

/// A single cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Numeric cell.
    Number(f64),
    /// Text cell, kept verbatim.
    Text(String),
}

impl FieldValue {
    /// Text form of the value. Integral numbers are rendered without a fraction.
    #[must_use]
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Self::Text(s) => Cow::Borrowed(s),
            Self::Number(n) => Cow::Owned(format_number(*n)),
        }
    }

    /// Numeric value, parsing text cells. Non-finite results are rejected.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        let n = match self {
            Self::Number(n) => *n,
            Self::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        n.is_finite().then_some(n)
    }

    /// `true` for blank text cells.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Text(s) if s.trim().is_empty())
    }

    /// Convert to a JSON value. Non-finite numbers become `null`.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Text(s) => serde_json::Value::String(s.clone()),
            Self::Number(n) => serde_json::Number::from_f64(*n)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
        }
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "only integral values within i64 range reach the cast"
)]
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<u8> for FieldValue {
    fn from(value: u8) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<i64> for FieldValue {
    #[expect(
        clippy::cast_precision_loss,
        reason = "unix timestamps are far below 2^53"
    )]
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

/// Ordered column-name → value mapping.
///
/// Keeps the first-seen position of every key; inserting an existing key
/// replaces its value in place. Lookups go through a key → position index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields {
    entries: Vec<(String, FieldValue)>,
    /// Key → position in `entries`.
    index: HashMap<String, usize>,
}

/// One uploaded CSV row, shaped entirely by the file's header.
pub type RawRow = Fields;

impl Fields {
    /// Create an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty mapping with room for `capacity` columns.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    /// Insert or replace `key`. Returns the previous value, if any.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<FieldValue>,
    ) -> Option<FieldValue> {
        let key = key.into();
        let value = value.into();
        if let Some(&pos) = self.index.get(&key) {
            return self
                .entries
                .get_mut(pos)
                .map(|(_, slot)| std::mem::replace(slot, value));
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, value));
        None
    }

    /// Value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        let pos = *self.index.get(key)?;
        self.entries.get(pos).map(|(_, v)| v)
    }

    /// Position of `key` in column order.
    #[must_use]
    pub fn position(&self, key: &str) -> Option<usize> {
        self.index.get(key).copied()
    }

    /// Value stored under `key`, unless it is a blank text cell.
    #[must_use]
    pub fn get_present(&self, key: &str) -> Option<&FieldValue> {
        self.get(key).filter(|v| !v.is_blank())
    }

    /// `true` when `key` is present (even if blank).
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Remove `key`, preserving the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<FieldValue> {
        let pos = self.index.remove(key)?;
        let (_, value) = self.entries.remove(pos);
        self.reindex();
        Some(value)
    }

    /// Keep only the entries for which `keep` returns `true`.
    pub fn retain(&mut self, mut keep: impl FnMut(&str, &FieldValue) -> bool) {
        let before = self.entries.len();
        self.entries.retain(|(k, v)| keep(k, v));
        if self.entries.len() != before {
            self.reindex();
        }
    }

    fn reindex(&mut self) {
        self.index.clear();
        self.index
            .extend(self.entries.iter().enumerate().map(|(i, (k, _))| (k.clone(), i)));
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when no columns are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(key, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate column names in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Convert to a JSON object, preserving values.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Map<String, serde_json::Value> {
        self.entries
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect()
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for Fields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut fields = Self::with_capacity(iter.size_hint().0);
        for (k, v) in iter {
            fields.insert(k, v);
        }
        fields
    }
}

impl IntoIterator for Fields {
    type Item = (String, FieldValue);
    type IntoIter = std::vec::IntoIter<(String, FieldValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for Fields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

// ---------------------------------------------------------------------------
// NormalizedRow
// ---------------------------------------------------------------------------

/// Date/time fields derived from `trans_date_trans_time`.
///
/// A field is `None` when it could not be derived or when the uploaded row
/// already carried a column of the same name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DerivedTime {
    pub transaction_hour: Option<u32>,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
    pub hour: Option<u32>,
    pub unix_time: Option<i64>,
}

impl DerivedTime {
    /// Column names of the derived fields, in output order.
    pub const COLUMNS: [&'static str; 6] =
        ["transaction_hour", "year", "month", "day", "hour", "unix_time"];

    /// The derived fields that are set, as `(column, value)` pairs.
    #[must_use]
    pub fn entries(&self) -> Vec<(&'static str, FieldValue)> {
        let values: [Option<FieldValue>; 6] = [
            self.transaction_hour.map(FieldValue::from),
            self.year.map(FieldValue::from),
            self.month.map(FieldValue::from),
            self.day.map(FieldValue::from),
            self.hour.map(FieldValue::from),
            self.unix_time.map(FieldValue::from),
        ];
        Self::COLUMNS
            .into_iter()
            .zip(values)
            .filter_map(|(k, v)| v.map(|v| (k, v)))
            .collect()
    }
}

/// A transaction reshaped to the feature schema expected by the model.
///
/// Holds exactly one [`Category`] and exactly one [`UsState`], so the one-hot
/// invariant holds by construction. Created once per uploaded row and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRow {
    /// Transaction id, emitted as both `id` and `trans_num`.
    pub id: String,
    /// Card number reduced to its digits, when the upload had one.
    pub cc_num: Option<String>,
    /// Non-negative amount, emitted as both `amt` and `amount`.
    pub amount: f64,
    /// ISO date (`YYYY-MM-DD`) when the source row carried one.
    pub date: Option<String>,
    pub time: DerivedTime,
    pub category: Category,
    /// `gender_M` flag.
    pub gender_m: bool,
    pub state: UsState,
    pub age: f64,
    /// Preserved input columns not replaced by a derived field.
    pub extra: Fields,
}

impl NormalizedRow {
    /// Flatten into the model's column layout.
    ///
    /// Preserved input columns come first, followed by the derived fields,
    /// the thirteen category flags, `gender_M`, the fifty state flags and `age`.
    #[must_use]
    pub fn to_fields(&self) -> Fields {
        let mut fields = self.extra.clone();
        fields.insert("id", self.id.as_str());
        fields.insert("trans_num", self.id.as_str());
        if let Some(cc) = &self.cc_num {
            fields.insert("cc_num", cc.as_str());
        }
        fields.insert("amt", self.amount);
        fields.insert("amount", self.amount);
        if let Some(date) = &self.date {
            fields.insert("date", date.as_str());
        }
        for (key, value) in self.time.entries() {
            fields.insert(key, value);
        }
        for category in Category::all() {
            fields.insert(category.column(), u8::from(category == self.category));
        }
        fields.insert("gender_M", u8::from(self.gender_m));
        for state in UsState::all() {
            fields.insert(state.column(), u8::from(state == self.state));
        }
        fields.insert("age", self.age);
        fields
    }
}

// ---------------------------------------------------------------------------
// Risk levels + prediction payloads
// ---------------------------------------------------------------------------

/// Coarse fraud classification attached to a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

impl RiskLevel {
    /// All levels in output order.
    pub const ALL: [Self; 3] = [Self::High, Self::Medium, Self::Low];

    /// Probability assigned when the service omits `fraud_probability`.
    #[must_use]
    pub fn default_probability(self) -> f64 {
        match self {
            Self::High => 0.8,
            Self::Medium => 0.5,
            Self::Low => 0.2,
        }
    }

    /// Range pseudo-probabilities are drawn from on the fallback paths.
    #[must_use]
    pub fn probability_range(self) -> Range<f64> {
        match self {
            Self::High => 0.7..1.0,
            Self::Medium => 0.4..0.7,
            Self::Low => 0.0..0.4,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `riskDistribution` counts reported by the prediction service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskDistribution {
    #[serde(rename = "High", default)]
    pub high: f64,
    #[serde(rename = "Medium", default)]
    pub medium: f64,
    #[serde(rename = "Low", default)]
    pub low: f64,
}

impl RiskDistribution {
    /// Sum of the three counts.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.high + self.medium + self.low
    }
}

/// Body returned by `POST /predict`.
///
/// Missing or `null` bucket lists deserialize as empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub high_risk_transactions: Vec<ApiRecord>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub medium_risk_transactions: Vec<ApiRecord>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub low_risk_transactions: Vec<ApiRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_distribution: Option<RiskDistribution>,
}

impl PredictionResponse {
    /// Records returned for `level`.
    #[must_use]
    pub fn bucket(&self, level: RiskLevel) -> &[ApiRecord] {
        match level {
            RiskLevel::High => &self.high_risk_transactions,
            RiskLevel::Medium => &self.medium_risk_transactions,
            RiskLevel::Low => &self.low_risk_transactions,
        }
    }

    /// `true` when all three buckets are empty.
    #[must_use]
    pub fn has_no_transactions(&self) -> bool {
        RiskLevel::ALL.iter().all(|&level| self.bucket(level).is_empty())
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Final per-transaction view model.
///
/// `fields` carries the remaining union of normalized and service-provided
/// columns; it never repeats the typed keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedTransaction {
    pub id: String,
    pub merchant: String,
    pub amount: f64,
    pub date: String,
    pub risk_level: RiskLevel,
    /// Model-estimated fraud likelihood in `[0, 1]`.
    pub fraud_probability: f64,
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl ProcessedTransaction {
    /// Keys stored in the typed fields rather than in `fields`.
    pub const TYPED_KEYS: [&'static str; 6] =
        ["id", "merchant", "amount", "date", "risk_level", "fraud_probability"];
}

// ---------------------------------------------------------------------------
// Predictor port
// ---------------------------------------------------------------------------

/// Errors from the `Predictor` hexagonal port.
#[derive(Debug, thiserror::Error)]
pub enum PredictionError {
    /// No response arrived within the client timeout; the request was cancelled.
    #[error("prediction request timed out after {timeout:?}")]
    Timeout {
        /// Configured client timeout.
        timeout: Duration,
    },
    /// The request could not be sent or the response could not be read.
    #[error("prediction request failed: {reason}")]
    Network {
        /// Human-readable description.
        reason: String,
    },
    /// The service answered with a non-2xx status.
    #[error("prediction service returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body text, possibly empty.
        body: String,
    },
    /// The service answered 2xx but the body is not a `PredictionResponse`.
    #[error("invalid response format: {reason}")]
    InvalidResponse {
        /// Human-readable description.
        reason: String,
    },
    /// The normalized rows could not be serialized.
    #[error("failed to encode rows as CSV: {reason}")]
    Encode {
        /// Human-readable description.
        reason: String,
    },
}

/// Hexagonal port: remote fraud-risk prediction.
///
/// The orchestrator depends exclusively on this trait; the HTTP client and
/// the offline adapter implement it.
#[expect(
    async_fn_in_trait,
    reason = "no dyn dispatch needed; internal workspace only"
)]
pub trait Predictor {
    /// Classify `rows` into risk buckets.
    ///
    /// # Errors
    ///
    /// Returns a [`PredictionError`] describing why no usable response was
    /// obtained.
    async fn predict(&self, rows: &[NormalizedRow]) -> Result<PredictionResponse, PredictionError>;
}
