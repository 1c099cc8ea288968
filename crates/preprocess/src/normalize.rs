// Rust guideline compliant 2026-10-13

//! Row normalizer: reshapes one uploaded row into the model's feature schema.
//!
//! [`normalize_row`] is total: every input shape yields a [`NormalizedRow`],
//! with defaults standing in for anything missing or unparsable.

use chrono::{DateTime, Datelike as _, NaiveDate, NaiveDateTime, Timelike as _};
use domain::{Category, DerivedTime, FieldValue, NormalizedRow, RawRow, UsState};
use rand::Rng;

/// Age assumed when the upload has none.
pub const DEFAULT_AGE: f64 = 30.0;

/// Keyword groups mapped to category indices. First match wins.
const CATEGORY_KEYWORDS: [(&[&str], u8); 12] = [
    (&["grocery"], 1),
    (&["gas", "transport"], 2),
    (&["entertain"], 3),
    (&["misc"], 4),
    (&["health"], 5),
    (&["food", "dining"], 6),
    (&["shop"], 7),
    (&["personal"], 8),
    (&["home"], 9),
    (&["kids"], 10),
    (&["travel"], 11),
    (&["service"], 12),
];

/// Datetime layouts accepted for `trans_date_trans_time`. `%.f` also matches
/// values without a fractional part.
const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

/// Columns written by [`NormalizedRow::to_fields`] from typed fields.
const SCALAR_COLUMNS: [&str; 8] =
    ["id", "trans_num", "cc_num", "amt", "amount", "date", "gender_M", "age"];

/// Normalize one uploaded row.
///
/// `rng` is only drawn from when the row has neither `trans_num` nor `id`.
pub fn normalize_row<R: Rng + ?Sized>(raw: RawRow, rng: &mut R) -> NormalizedRow {
    let mut extra = raw;
    extra.retain(|name, _| !is_export_artifact(name));

    let id = ["trans_num", "id"]
        .iter()
        .find_map(|key| extra.get_present(key))
        .map(|v| v.as_text().trim().to_owned())
        .unwrap_or_else(|| domain::synthesize_transaction_id(rng));

    let cc_num = extra
        .get_present("cc_num")
        .map(|v| v.as_text().chars().filter(char::is_ascii_digit).collect());

    let amount = ["amt", "amount"]
        .iter()
        .find_map(|key| extra.get_present(key))
        .map_or(0.0, parse_amount);

    let (date, time) = derive_date_time(&extra);

    let category = extra
        .get_present("category")
        .map_or(Category::DEFAULT, |v| match_category(&v.as_text()));

    let gender_m = extra
        .get("gender")
        .is_some_and(|v| v.as_text().trim().eq_ignore_ascii_case("m"));

    let state = extra
        .get_present("state")
        .and_then(|v| UsState::from_code(&v.as_text()))
        .unwrap_or_default();

    let age = extra
        .get("age")
        .and_then(FieldValue::as_f64)
        .filter(|a| *a != 0.0)
        .unwrap_or(DEFAULT_AGE);

    extra.retain(|name, _| !is_replaced_column(name));

    NormalizedRow {
        id,
        cc_num,
        amount,
        date,
        time,
        category,
        gender_m,
        state,
        age,
        extra,
    }
}

/// Columns left behind by spreadsheet or dataframe exports.
fn is_export_artifact(name: &str) -> bool {
    let name = name.trim();
    name.is_empty()
        || name.chars().all(|c| c.is_ascii_digit())
        || name.to_ascii_lowercase().starts_with("unnamed")
}

/// Input columns that the normalized row rewrites from its typed fields.
fn is_replaced_column(name: &str) -> bool {
    if SCALAR_COLUMNS.contains(&name) {
        return true;
    }
    if let Some(index) = name.strip_prefix("category_") {
        return index
            .parse::<u8>()
            .ok()
            .and_then(Category::new)
            .is_some_and(|c| c.column() == name);
    }
    if let Some(code) = name.strip_prefix("state_") {
        return UsState::from_code(code).is_some_and(|s| s.column() == name);
    }
    false
}

/// Strip everything but digits and dots, then read the leading decimal.
fn parse_amount(value: &FieldValue) -> f64 {
    let cleaned: String = value
        .as_text()
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    leading_decimal(&cleaned).unwrap_or(0.0)
}

/// Longest prefix of `s` made of digits and at most one dot, as a float.
fn leading_decimal(s: &str) -> Option<f64> {
    let mut seen_dot = false;
    let end = s
        .find(|c: char| {
            if c == '.' {
                if seen_dot {
                    return true;
                }
                seen_dot = true;
                return false;
            }
            !c.is_ascii_digit()
        })
        .unwrap_or(s.len());
    s[..end].parse::<f64>().ok().filter(|n| n.is_finite())
}

fn match_category(label: &str) -> Category {
    let label = label.to_lowercase();
    CATEGORY_KEYWORDS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| label.contains(k)))
        .and_then(|(_, index)| Category::new(*index))
        .unwrap_or_default()
}

fn derive_date_time(row: &RawRow) -> (Option<String>, DerivedTime) {
    let Some(raw) = row.get_present("trans_date_trans_time") else {
        let date = row.get_present("date").map(|v| v.as_text().into_owned());
        return (date, DerivedTime::default());
    };
    let text = raw.as_text();
    let text = text.trim();
    let date = text.split_once(' ').map_or(text, |(d, _)| d).to_owned();

    let Some(parsed) = parse_datetime(text) else {
        log::debug!("preprocess.datetime.unparsable: value={text:?}");
        return (Some(date), DerivedTime::default());
    };

    // Columns already present in the upload win over derived values.
    let absent = |key: &str| !row.contains_key(key);
    let time = DerivedTime {
        transaction_hour: absent("transaction_hour").then_some(parsed.hour()),
        year: absent("year").then_some(parsed.year()),
        month: absent("month").then_some(parsed.month()),
        day: absent("day").then_some(parsed.day()),
        hour: absent("hour").then_some(parsed.hour()),
        unix_time: absent("unix_time").then_some(parsed.and_utc().timestamp()),
    };
    (Some(date), time)
}

/// Parse a transaction timestamp, interpreting zone-less values as UTC.
fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(text, f).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|f| NaiveDate::parse_from_str(text, f).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
