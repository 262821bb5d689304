//! Checks a [`TargetTable`](crate::connectors::target::TargetTable) runs against
//! staged data before loading it.

use model::core::{
    column::{Column, find_column},
    data_type::DataType,
};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Staged row count {staged} does not match expected row count {expected}")]
    RowCountMismatch { expected: u64, staged: u64 },

    #[error("Source column '{0}' is missing from staged data")]
    MissingColumn(String),

    #[error("Partition column '{0}' is missing from staged data")]
    MissingPartitionColumn(String),

    #[error("Staged column '{0}' has no backend counterpart")]
    UnmappedColumn(String),

    #[error("Staged column '{column}' of type {from} cannot be converted to backend type {to}")]
    TypeConversion {
        column: String,
        from: DataType,
        to: DataType,
    },
}

/// Every source and partition column must have been staged.
pub fn check_staged_columns(
    partition_columns: &[Column],
    source_columns: &[Column],
    staging_columns: &[Column],
) -> Result<(), ValidationError> {
    if let Some(missing) = source_columns
        .iter()
        .find(|c| find_column(staging_columns, &c.name).is_none())
    {
        return Err(ValidationError::MissingColumn(missing.name.clone()));
    }

    if let Some(missing) = partition_columns
        .iter()
        .find(|c| find_column(staging_columns, &c.name).is_none())
    {
        return Err(ValidationError::MissingPartitionColumn(missing.name.clone()));
    }

    Ok(())
}

pub fn check_staged_row_count(expected: u64, staged: u64) -> Result<(), ValidationError> {
    if expected != staged {
        return Err(ValidationError::RowCountMismatch { expected, staged });
    }
    Ok(())
}

/// Each staged column must map onto a backend column whose type it converts to.
pub fn check_type_conversions(
    staging_columns: &[Column],
    backend_columns: &[Column],
) -> Result<(), ValidationError> {
    for staged in staging_columns {
        let backend = find_column(backend_columns, &staged.name)
            .ok_or_else(|| ValidationError::UnmappedColumn(staged.name.clone()))?;

        if !staged.data_type.can_convert_to(&backend.data_type) {
            return Err(ValidationError::TypeConversion {
                column: staged.name.clone(),
                from: staged.data_type.clone(),
                to: backend.data_type.clone(),
            });
        }
    }
    Ok(())
}
