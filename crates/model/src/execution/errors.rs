use crate::{core::identifiers::ChunkId, execution::chunk::ChunkStatus};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChunkStateError {
    #[error("chunk {chunk_id} already finished with status {status}")]
    AlreadyTerminal { chunk_id: ChunkId, status: ChunkStatus },
}

#[derive(Debug, Error)]
pub enum PartitionError {
    #[error("size of partition '{0}' is unknown")]
    UnknownSize(String),

    #[error("partition chunk is empty")]
    Empty,
}
