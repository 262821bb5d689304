use crate::core::column::Column;
use serde::{Deserialize, Serialize};

/// Intermediate storage rows land in before being loaded into the final table.
///
/// `columns` reflects the schema the transport actually produced and is
/// populated once rows have been staged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagingArea {
    pub name: String,
    pub location: Option<String>,
    pub columns: Vec<Column>,
}

impl StagingArea {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: None,
            columns: Vec::new(),
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_columns(mut self, columns: Vec<Column>) -> Self {
        self.columns = columns;
        self
    }
}
