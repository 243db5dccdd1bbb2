//! bcrypt cost factor handling.
//! Raw values usually come from environment variables or config files, so
//! normalization never fails: bad input degrades to the default or is clamped
//! into the range the primitive accepts.

use std::fmt;
use std::num::IntErrorKind;

/// Lowest log-rounds value bcrypt accepts.
pub const MIN_COST: u32 = 4;
/// Highest log-rounds value bcrypt accepts.
pub const MAX_COST: u32 = 31;
/// Used when no cost is configured or the configured value is not a number.
pub const DEFAULT_COST: u32 = 12;

/// A bcrypt cost factor that is guaranteed to lie in `[MIN_COST, MAX_COST]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CostFactor(u32);

impl CostFactor {
    pub const MIN: CostFactor = CostFactor(MIN_COST);
    pub const MAX: CostFactor = CostFactor(MAX_COST);
    pub const DEFAULT: CostFactor = CostFactor(DEFAULT_COST);

    /// Clamps any integer into the accepted range.
    pub fn clamp(value: i64) -> Self {
        let clamped = value.clamp(i64::from(MIN_COST), i64::from(MAX_COST));
        // The clamp above keeps the value inside u32.
        CostFactor(clamped as u32)
    }

    /// Normalizes a raw textual cost factor.
    ///
    /// Absent, blank, or non-numeric input yields [`CostFactor::DEFAULT`].
    /// Numbers are clamped, including ones too large to fit an `i64`.
    pub fn normalize(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
            return Self::DEFAULT;
        };

        match raw.parse::<i64>() {
            Ok(value) => Self::clamp(value),
            Err(err) => match err.kind() {
                IntErrorKind::PosOverflow => Self::MAX,
                IntErrorKind::NegOverflow => Self::MIN,
                _ => {
                    tracing::warn!(
                        raw_cost = raw,
                        fallback = DEFAULT_COST,
                        "cost factor is not a number; using default"
                    );
                    Self::DEFAULT
                }
            },
        }
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for CostFactor {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<CostFactor> for u32 {
    fn from(cost: CostFactor) -> Self {
        cost.0
    }
}

impl fmt::Display for CostFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
