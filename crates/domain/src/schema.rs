// Rust guideline compliant 2026-10-12

//! Fixed one-hot feature tables expected by the prediction model.
//!
//! The model was trained on thirteen `category_N` columns and fifty
//! `state_<CODE>` columns. [`Category`] and [`UsState`] each hold exactly one
//! selected entry, so a row can never carry zero or several set flags.

/// Number of `category_N` columns (`category_1` ..= `category_13`).
pub const CATEGORY_COUNT: u8 = 13;

/// The 50 US state codes recognized by the model, in column order.
pub const US_STATE_CODES: [&str; 50] = [
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "FL", "GA", "HI", "ID", "IL", "IN", "IA",
    "KS", "KY", "LA", "ME", "MD", "MA", "MI", "MN", "MS", "MO", "MT", "NE", "NV", "NH", "NJ",
    "NM", "NY", "NC", "ND", "OH", "OK", "OR", "PA", "RI", "SC", "SD", "TN", "TX", "UT", "VT",
    "VA", "WA", "WV", "WI", "WY",
];

/// One of the thirteen merchant categories, stored as its 1-based column index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Category(u8);

impl Category {
    /// `category_1`, used when no keyword group matches.
    pub const DEFAULT: Self = Self(1);

    /// Build a category from its 1-based index; `None` outside `1..=13`.
    #[must_use]
    pub fn new(index: u8) -> Option<Self> {
        (1..=CATEGORY_COUNT).contains(&index).then_some(Self(index))
    }

    /// 1-based column index.
    #[must_use]
    pub fn index(self) -> u8 {
        self.0
    }

    /// Column name, e.g. `"category_6"`.
    #[must_use]
    pub fn column(self) -> String {
        format!("category_{}", self.0)
    }

    /// Every category in column order.
    pub fn all() -> impl Iterator<Item = Self> {
        (1..=CATEGORY_COUNT).map(Self)
    }
}

impl Default for Category {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// One of the fifty US states, stored as its index into [`US_STATE_CODES`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UsState(usize);

impl UsState {
    /// `state_CA`, used when the input carries no valid state code.
    pub const DEFAULT: Self = Self(4);

    /// Look up a state by code, ignoring case and surrounding whitespace.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        let upper = code.trim().to_ascii_uppercase();
        US_STATE_CODES.iter().position(|c| *c == upper).map(Self)
    }

    /// Two-letter code, e.g. `"CA"`.
    #[must_use]
    pub fn code(self) -> &'static str {
        US_STATE_CODES[self.0]
    }

    /// Column name, e.g. `"state_CA"`.
    #[must_use]
    pub fn column(self) -> String {
        format!("state_{}", self.code())
    }

    /// Every state in column order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..US_STATE_CODES.len()).map(Self)
    }
}

impl Default for UsState {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_california() {
        assert_eq!(UsState::DEFAULT.code(), "CA");
        assert_eq!(UsState::DEFAULT.column(), "state_CA");
    }

    #[test]
    fn state_lookup_ignores_case_and_whitespace() {
        assert_eq!(UsState::from_code(" ny ").map(UsState::code), Some("NY"));
        assert!(UsState::from_code("zz").is_none());
        assert!(UsState::from_code("").is_none());
        // DC is not one of the fifty states.
        assert!(UsState::from_code("DC").is_none());
    }

    #[test]
    fn state_codes_are_unique() {
        let mut codes = US_STATE_CODES.to_vec();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), 50);
    }

    #[test]
    fn category_bounds() {
        assert!(Category::new(0).is_none());
        assert!(Category::new(14).is_none());
        assert_eq!(Category::new(13).map(Category::column).as_deref(), Some("category_13"));
        assert_eq!(Category::all().count(), 13);
        assert_eq!(Category::default(), Category::DEFAULT);
    }
}
