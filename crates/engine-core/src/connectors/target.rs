use crate::error::BoxError;
use async_trait::async_trait;
use model::{core::column::Column, execution::staging::StagingArea};

/// The backend table rows are loaded into, together with its staging area.
#[async_trait]
pub trait TargetTable: Send + Sync {
    fn db_name(&self) -> &str;

    fn table_name(&self) -> &str;

    /// Removes rows left in the staging area by a previous chunk.
    async fn empty_staging_area(&self, staging: &StagingArea) -> Result<(), BoxError>;

    /// Checks staged rows against the source definition and the number of rows
    /// the transport claims to have staged.
    async fn validate_staged_data(
        &self,
        partition_columns: &[Column],
        source_columns: &[Column],
        rows_staged: u64,
        staging_columns: &[Column],
    ) -> Result<(), BoxError>;

    /// Checks every staged column can be converted to its backend type.
    async fn validate_type_conversions(&self, staging_columns: &[Column]) -> Result<(), BoxError>;

    /// Current backend storage size, `None` when the backend cannot report it.
    /// `no_cache` forces a fresh measurement.
    async fn table_size(&self, no_cache: bool) -> Result<Option<u64>, BoxError>;

    /// Moves staged rows into the final table.
    async fn load_final_table(&self, sync: bool) -> Result<(), BoxError>;
}
