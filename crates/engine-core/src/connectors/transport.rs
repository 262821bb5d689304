use crate::error::BoxError;
use async_trait::async_trait;
use model::execution::{partition::PartitionChunk, staging::StagingArea};

/// Moves rows from the source table into the staging area.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Transports the given partitions, or the whole selection when `None`,
    /// returning the number of rows staged.
    async fn transport(&self, partition_chunk: Option<&PartitionChunk>) -> Result<u64, BoxError>;

    /// Bytes moved over the wire by the last call to [`Transport::transport`].
    fn transport_bytes(&self) -> Option<u64>;

    /// The staging area this transport writes to, with the schema it produced.
    async fn staging_area(&self) -> Result<StagingArea, BoxError>;
}
