use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::{borrow::Cow, collections::HashMap, fmt};

/// Logical column type shared by source, staging and backend column definitions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DataType {
    Boolean,
    Short,
    Int,
    Long,
    Decimal,
    Float,
    Double,
    Char,
    VarChar,
    String,
    Date,
    Time,
    Timestamp,
    Binary,
    Blob,
    Json,
    Custom(String),
}

lazy_static! {
    static ref TYPE_MAP: HashMap<&'static str, DataType> = build_type_map();
}

impl DataType {
    pub fn name(&self) -> Cow<'_, str> {
        match self {
            DataType::Boolean => Cow::Borrowed("BOOLEAN"),
            DataType::Short => Cow::Borrowed("SMALLINT"),
            DataType::Int => Cow::Borrowed("INTEGER"),
            DataType::Long => Cow::Borrowed("BIGINT"),
            DataType::Decimal => Cow::Borrowed("DECIMAL"),
            DataType::Float => Cow::Borrowed("FLOAT"),
            DataType::Double => Cow::Borrowed("DOUBLE"),
            DataType::Char => Cow::Borrowed("CHAR"),
            DataType::VarChar => Cow::Borrowed("VARCHAR"),
            DataType::String => Cow::Borrowed("STRING"),
            DataType::Date => Cow::Borrowed("DATE"),
            DataType::Time => Cow::Borrowed("TIME"),
            DataType::Timestamp => Cow::Borrowed("TIMESTAMP"),
            DataType::Binary => Cow::Borrowed("BINARY"),
            DataType::Blob => Cow::Borrowed("BLOB"),
            DataType::Json => Cow::Borrowed("JSON"),
            DataType::Custom(name) => Cow::Borrowed(name),
        }
    }

    /// Resolves a source, staging or backend type name. Unknown names become `Custom`.
    pub fn from_name(type_name: &str) -> Self {
        let normalized = Self::normalize_type_name(type_name);
        TYPE_MAP
            .get(normalized.as_str())
            .cloned()
            .unwrap_or(DataType::Custom(normalized))
    }

    /// Whether staged values of this type can be loaded into a column of `target`
    /// without losing information.
    pub fn can_convert_to(&self, target: &DataType) -> bool {
        use DataType::*;

        if self == target {
            return true;
        }

        match (self, target) {
            (Short, Int | Long | Decimal | Double) => true,
            (Int, Long | Decimal | Double) => true,
            (Long, Decimal) => true,
            (Float, Double) => true,
            (Boolean, Short | Int | Long) => true,
            (Char, VarChar | String) | (VarChar, String) => true,
            (Json, String) => true,
            (Date, Timestamp) => true,
            (Binary, Blob) => true,
            // Staging formats carry numbers and dates as text for lossless transport.
            (String, Decimal | Date | Timestamp | Time) => true,
            (Custom(a), Custom(b)) => a.eq_ignore_ascii_case(b),
            _ => false,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            DataType::Short
                | DataType::Int
                | DataType::Long
                | DataType::Decimal
                | DataType::Float
                | DataType::Double
        )
    }

    fn normalize_type_name(type_name: &str) -> String {
        let trimmed = type_name.trim();
        // Drop length/precision suffixes such as VARCHAR2(30) or NUMBER(38,0)
        let base = match trimmed.find('(') {
            Some(idx) => &trimmed[..idx],
            None => trimmed,
        };
        base.trim().to_uppercase()
    }
}

impl From<&str> for DataType {
    fn from(s: &str) -> Self {
        DataType::from_name(s)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

fn build_type_map() -> HashMap<&'static str, DataType> {
    use DataType::*;

    let entries = [
        ("BOOLEAN", Boolean),
        ("BOOL", Boolean),
        ("BIT", Boolean),
        ("TINYINT", Short),
        ("SMALLINT", Short),
        ("INT", Int),
        ("INTEGER", Int),
        ("INT4", Int),
        ("BIGINT", Long),
        ("INT8", Long),
        ("LONG", Long),
        ("NUMBER", Decimal),
        ("NUMERIC", Decimal),
        ("DECIMAL", Decimal),
        ("MONEY", Decimal),
        ("FLOAT", Float),
        ("REAL", Float),
        ("BINARY_FLOAT", Float),
        ("DOUBLE", Double),
        ("DOUBLE PRECISION", Double),
        ("BINARY_DOUBLE", Double),
        ("CHAR", Char),
        ("NCHAR", Char),
        ("VARCHAR", VarChar),
        ("VARCHAR2", VarChar),
        ("NVARCHAR", VarChar),
        ("NVARCHAR2", VarChar),
        ("STRING", String),
        ("TEXT", String),
        ("CLOB", String),
        ("NCLOB", String),
        ("DATE", Date),
        ("TIME", Time),
        ("TIMESTAMP", Timestamp),
        ("DATETIME", Timestamp),
        ("DATETIME2", Timestamp),
        ("BINARY", Binary),
        ("VARBINARY", Binary),
        ("RAW", Binary),
        ("BYTES", Binary),
        ("BLOB", Blob),
        ("JSON", Json),
    ];

    let mut map = HashMap::new();
    for (name, data_type) in entries {
        map.insert(name, data_type);
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_names_with_precision_suffix() {
        assert_eq!(DataType::from_name("number(38,0)"), DataType::Decimal);
        assert_eq!(DataType::from_name(" VARCHAR2(30) "), DataType::VarChar);
        assert_eq!(
            DataType::from_name("sdo_geometry"),
            DataType::Custom("SDO_GEOMETRY".to_string())
        );
    }

    #[test]
    fn widening_conversions_are_allowed() {
        assert!(DataType::Int.can_convert_to(&DataType::Long));
        assert!(DataType::Long.can_convert_to(&DataType::Decimal));
        assert!(DataType::String.can_convert_to(&DataType::Decimal));
        assert!(DataType::Date.can_convert_to(&DataType::Timestamp));
    }

    #[test]
    fn narrowing_conversions_are_rejected() {
        assert!(!DataType::Long.can_convert_to(&DataType::Int));
        assert!(!DataType::Timestamp.can_convert_to(&DataType::Date));
        assert!(!DataType::Double.can_convert_to(&DataType::Decimal));
        assert!(!DataType::Blob.can_convert_to(&DataType::String));
    }
}
