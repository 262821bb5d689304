use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// A single row key value as supplied by an offload predicate or key list.
///
/// Keys are opaque to the splitters: they are neither deduplicated nor sorted,
/// only distributed and rendered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RowKey {
    Int(i64),
    Decimal(BigDecimal),
    String(String),
}

impl RowKey {
    /// Classifies a raw token: integers first, then decimals, everything else is text.
    ///
    /// A token is only read as a number when rendering that number gives back
    /// the same text, so keys such as `007` or `1E3` stay strings.
    pub fn parse_token(token: &str) -> Self {
        let token = token.trim();
        if let Ok(v) = token.parse::<i64>() {
            if v.to_string() == token {
                return RowKey::Int(v);
            }
        }
        if let Ok(v) = BigDecimal::from_str(token) {
            if v.to_plain_string() == token {
                return RowKey::Decimal(v);
            }
        }
        RowKey::String(token.to_string())
    }

    pub fn as_decimal(&self) -> Option<BigDecimal> {
        match self {
            RowKey::Int(v) => Some(BigDecimal::from(*v)),
            RowKey::Decimal(v) => Some(v.clone()),
            RowKey::String(v) => BigDecimal::from_str(v.trim()).ok(),
        }
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, RowKey::String(_))
    }
}

impl From<i64> for RowKey {
    fn from(v: i64) -> Self {
        RowKey::Int(v)
    }
}

impl From<BigDecimal> for RowKey {
    fn from(v: BigDecimal) -> Self {
        RowKey::Decimal(v)
    }
}

impl From<&str> for RowKey {
    fn from(v: &str) -> Self {
        RowKey::String(v.to_string())
    }
}

impl From<String> for RowKey {
    fn from(v: String) -> Self {
        RowKey::String(v)
    }
}

/// Renders the raw value: strings are emitted as-is, without quoting.
impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowKey::Int(v) => write!(f, "{v}"),
            RowKey::Decimal(v) => write!(f, "{}", v.to_plain_string()),
            RowKey::String(v) => write!(f, "{v}"),
        }
    }
}
