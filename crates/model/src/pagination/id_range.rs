use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Half-open key range `[lower, upper)`, used in predicates of the form
/// `key >= lower AND key < upper`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdRange {
    pub lower: BigDecimal,
    pub upper: BigDecimal,
}

impl IdRange {
    pub fn new(lower: BigDecimal, upper: BigDecimal) -> Self {
        Self { lower, upper }
    }

    pub fn contains(&self, key: &BigDecimal) -> bool {
        key >= &self.lower && key < &self.upper
    }

    pub fn width(&self) -> BigDecimal {
        &self.upper - &self.lower
    }
}

impl From<(BigDecimal, BigDecimal)> for IdRange {
    fn from((lower, upper): (BigDecimal, BigDecimal)) -> Self {
        Self { lower, upper }
    }
}

impl fmt::Display for IdRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {})",
            self.lower.to_plain_string(),
            self.upper.to_plain_string()
        )
    }
}
