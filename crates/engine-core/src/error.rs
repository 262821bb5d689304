use model::{
    core::identifiers::{ChunkId, ChunkNumber},
    execution::errors::ChunkStateError,
};
use thiserror::Error;

/// Error type returned by collaborator implementations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Chunk {0} not found")]
    UnknownChunk(ChunkId),

    #[error("Invalid chunk transition: {0}")]
    Transition(#[from] ChunkStateError),

    #[error("Chunk store error: {0}")]
    Storage(#[from] sled::Error),

    #[error("Failed to (de)serialize chunk record: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("Repository error: {0}")]
    Other(String),
}

/// Failure of a single transport chunk.
///
/// Each variant names the step that failed and carries the collaborator's
/// original error as its source.
#[derive(Error, Debug)]
pub enum ChunkError {
    #[error("Failed to start chunk {chunk_number} of {table}: {source}")]
    Start {
        chunk_number: ChunkNumber,
        table: String,
        #[source]
        source: RepositoryError,
    },

    #[error("Failed to empty staging area before chunk {chunk_number}: {source}")]
    EmptyStaging {
        chunk_number: ChunkNumber,
        #[source]
        source: BoxError,
    },

    #[error("Transport failed for chunk {chunk_number}: {source}")]
    Transport {
        chunk_number: ChunkNumber,
        #[source]
        source: BoxError,
    },

    #[error("Staged data validation failed for chunk {chunk_number}: {source}")]
    StagedData {
        chunk_number: ChunkNumber,
        #[source]
        source: BoxError,
    },

    #[error("Type conversion validation failed for chunk {chunk_number}: {source}")]
    TypeConversion {
        chunk_number: ChunkNumber,
        #[source]
        source: BoxError,
    },

    #[error("Failed to size backend table for chunk {chunk_number}: {source}")]
    BackendSize {
        chunk_number: ChunkNumber,
        #[source]
        source: BoxError,
    },

    #[error("Failed to load final table for chunk {chunk_number}: {source}")]
    Load {
        chunk_number: ChunkNumber,
        #[source]
        source: BoxError,
    },

    #[error("Failed to record outcome of chunk {chunk_id}: {source}")]
    Finalize {
        chunk_id: ChunkId,
        #[source]
        source: RepositoryError,
    },

    #[error("Chunk {chunk_number} was cancelled")]
    Cancelled { chunk_number: ChunkNumber },
}

impl ChunkError {
    /// True for staged data and type conversion mismatches.
    pub fn is_validation_failure(&self) -> bool {
        matches!(
            self,
            ChunkError::StagedData { .. } | ChunkError::TypeConversion { .. }
        )
    }

    /// Whether a chunk record exists for the failed attempt.
    pub fn chunk_started(&self) -> bool {
        !matches!(self, ChunkError::Start { .. })
    }
}
