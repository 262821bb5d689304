use crate::error::BoxError;
use async_trait::async_trait;
use model::core::column::Column;

/// The relational table rows are offloaded from.
#[async_trait]
pub trait SourceTable: Send + Sync {
    fn owner(&self) -> &str;

    fn table_name(&self) -> &str;

    fn columns(&self) -> &[Column];

    fn partition_columns(&self) -> &[Column];

    /// Partition level offloaded by this run (1 for partitions, 2 for subpartitions).
    fn partition_level(&self) -> Option<u32>;

    /// Size of the whole table as reported by the source dictionary.
    async fn size_in_bytes(&self) -> Result<u64, BoxError>;
}
