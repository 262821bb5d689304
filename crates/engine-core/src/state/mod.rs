use crate::error::RepositoryError;
use async_trait::async_trait;
use model::{
    core::identifiers::{ChunkId, ExecutionId},
    execution::chunk::{ChunkOutcome, ChunkRecord, ChunkStart},
};

pub mod sled_store;

/// Durable home of chunk records.
///
/// Both writes must be persisted before they return. Every `start_chunk` call
/// creates a new record; `end_chunk` moves a started record to its terminal
/// status exactly once.
#[async_trait]
pub trait ChunkRepository: Send + Sync {
    async fn start_chunk(&self, start: &ChunkStart) -> Result<ChunkId, RepositoryError>;

    async fn end_chunk(
        &self,
        chunk_id: ChunkId,
        outcome: ChunkOutcome,
    ) -> Result<(), RepositoryError>;

    async fn load_chunk(&self, chunk_id: ChunkId) -> Result<Option<ChunkRecord>, RepositoryError>;

    /// All chunks of a run, ordered by chunk number.
    async fn list_chunks(
        &self,
        execution_id: &ExecutionId,
    ) -> Result<Vec<ChunkRecord>, RepositoryError>;
}
