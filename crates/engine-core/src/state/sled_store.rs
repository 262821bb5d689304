use crate::{error::RepositoryError, state::ChunkRepository};
use async_trait::async_trait;
use model::{
    core::identifiers::{ChunkId, ChunkNumber, ExecutionId},
    execution::chunk::{ChunkOutcome, ChunkRecord, ChunkStart},
};
use sled::{
    Transactional,
    transaction::{ConflictableTransactionError, ConflictableTransactionResult, TransactionError},
};
use std::path::Path;
use tracing::debug;

const CHUNKS_TREE: &str = "chunks";
const EXECUTION_INDEX_TREE: &str = "chunks_by_execution";

/// Chunk repository backed by an embedded sled database.
///
/// Records live in one tree keyed by chunk id; a second tree indexes them by
/// execution and chunk number.
pub struct SledChunkRepository {
    db: sled::Db,
    chunks: sled::Tree,
    by_execution: sled::Tree,
}

impl SledChunkRepository {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, sled::Error> {
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    /// A store deleted when dropped, for dry runs.
    pub fn temporary() -> Result<Self, sled::Error> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db)
    }

    fn from_db(db: sled::Db) -> Result<Self, sled::Error> {
        let chunks = db.open_tree(CHUNKS_TREE)?;
        let by_execution = db.open_tree(EXECUTION_INDEX_TREE)?;
        Ok(Self {
            db,
            chunks,
            by_execution,
        })
    }

    #[inline]
    fn chunk_key(chunk_id: ChunkId) -> [u8; 8] {
        chunk_id.get().to_be_bytes()
    }

    /// execution uuid | chunk number | chunk id, so a prefix scan yields a run
    /// in chunk order.
    fn index_key(
        execution_id: &ExecutionId,
        chunk_number: ChunkNumber,
        chunk_id: ChunkId,
    ) -> Vec<u8> {
        let mut key = Vec::with_capacity(28);
        key.extend_from_slice(execution_id.as_uuid().as_bytes());
        key.extend_from_slice(&chunk_number.get().to_be_bytes());
        key.extend_from_slice(&Self::chunk_key(chunk_id));
        key
    }

    fn decode(bytes: &[u8]) -> Result<ChunkRecord, RepositoryError> {
        Ok(bincode::deserialize(bytes)?)
    }
}

#[async_trait]
impl ChunkRepository for SledChunkRepository {
    async fn start_chunk(&self, start: &ChunkStart) -> Result<ChunkId, RepositoryError> {
        let chunk_id = ChunkId::new(self.db.generate_id()?);
        let record = ChunkRecord::started(chunk_id, start.clone());
        let bytes = bincode::serialize(&record)?;

        let key = Self::chunk_key(chunk_id);
        let index_key = Self::index_key(&start.execution_id, start.chunk_number, chunk_id);

        (&self.chunks, &self.by_execution)
            .transaction(
                |(chunks, index)| -> ConflictableTransactionResult<(), RepositoryError> {
                    chunks.insert(&key[..], bytes.as_slice())?;
                    index.insert(index_key.as_slice(), &key[..])?;
                    Ok(())
                },
            )
            .map_err(|err| match err {
                TransactionError::Abort(e) => e,
                TransactionError::Storage(e) => RepositoryError::Storage(e),
            })?;

        self.db.flush_async().await?;

        debug!(
            chunk_id = %chunk_id,
            chunk_number = %start.chunk_number,
            execution_id = %start.execution_id,
            "Chunk record started"
        );
        Ok(chunk_id)
    }

    async fn end_chunk(
        &self,
        chunk_id: ChunkId,
        outcome: ChunkOutcome,
    ) -> Result<(), RepositoryError> {
        let key = Self::chunk_key(chunk_id);

        // Check-then-set in one transaction so a record can only turn terminal once.
        self.chunks
            .transaction(|tx| -> ConflictableTransactionResult<(), RepositoryError> {
                let existing = tx.get(&key[..])?.ok_or(ConflictableTransactionError::Abort(
                    RepositoryError::UnknownChunk(chunk_id),
                ))?;

                let mut record =
                    Self::decode(&existing).map_err(ConflictableTransactionError::Abort)?;
                record
                    .finish(outcome)
                    .map_err(|e| ConflictableTransactionError::Abort(e.into()))?;

                let bytes = bincode::serialize(&record)
                    .map_err(|e| ConflictableTransactionError::Abort(e.into()))?;
                tx.insert(&key[..], bytes)?;
                Ok(())
            })
            .map_err(|err| match err {
                TransactionError::Abort(e) => e,
                TransactionError::Storage(e) => RepositoryError::Storage(e),
            })?;

        self.db.flush_async().await?;

        debug!(chunk_id = %chunk_id, status = %outcome.status(), "Chunk record finished");
        Ok(())
    }

    async fn load_chunk(&self, chunk_id: ChunkId) -> Result<Option<ChunkRecord>, RepositoryError> {
        match self.chunks.get(Self::chunk_key(chunk_id))? {
            Some(bytes) => Ok(Some(Self::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn list_chunks(
        &self,
        execution_id: &ExecutionId,
    ) -> Result<Vec<ChunkRecord>, RepositoryError> {
        let mut records = Vec::new();

        for item in self.by_execution.scan_prefix(execution_id.as_uuid().as_bytes()) {
            let (_key, chunk_key) = item?;
            match self.chunks.get(&chunk_key)? {
                Some(bytes) => records.push(Self::decode(&bytes)?),
                None => {
                    return Err(RepositoryError::Other(format!(
                        "index entry for execution {execution_id} points at a missing chunk"
                    )));
                }
            }
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::execution::chunk::{ChunkMetrics, ChunkStatus};
    use tempfile::tempdir;

    fn mk_start(execution_id: ExecutionId, index: u32) -> ChunkStart {
        ChunkStart {
            execution_id,
            source_owner: "SH".into(),
            source_table: "SALES".into(),
            target_db: "sh_load".into(),
            target_table: "sales".into(),
            chunk_number: ChunkNumber::from_index(index),
            partitions: Some(vec![format!("P{index}")]),
            partition_level: Some(1),
        }
    }

    #[tokio::test]
    async fn each_start_creates_a_new_record() {
        let dir = tempdir().unwrap();
        let repo = SledChunkRepository::open(dir.path()).unwrap();
        let execution_id = ExecutionId::new();

        let first = repo.start_chunk(&mk_start(execution_id, 0)).await.unwrap();
        let second = repo.start_chunk(&mk_start(execution_id, 0)).await.unwrap();
        assert_ne!(first, second);

        let record = repo.load_chunk(first).await.unwrap().unwrap();
        assert_eq!(record.status, ChunkStatus::Started);
        assert!(record.metrics.is_none());
        assert_eq!(repo.list_chunks(&execution_id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn success_persists_metrics() {
        let dir = tempdir().unwrap();
        let execution_id = ExecutionId::new();
        let metrics = ChunkMetrics {
            row_count: 42,
            frontend_bytes: Some(4096),
            transport_bytes: Some(2048),
            backend_bytes: None,
        };

        let chunk_id = {
            let repo = SledChunkRepository::open(dir.path()).unwrap();
            let chunk_id = repo.start_chunk(&mk_start(execution_id, 0)).await.unwrap();
            repo.end_chunk(chunk_id, ChunkOutcome::Success(metrics))
                .await
                .unwrap();
            chunk_id
        };

        // Reopen to read what reached disk.
        let repo = SledChunkRepository::open(dir.path()).unwrap();
        let record = repo.load_chunk(chunk_id).await.unwrap().unwrap();
        assert_eq!(record.status, ChunkStatus::Success);
        assert_eq!(record.metrics, Some(metrics));
        assert_eq!(record.start.partitions, Some(vec!["P0".to_string()]));
    }

    #[tokio::test]
    async fn refuses_second_terminal_transition() {
        let repo = SledChunkRepository::temporary().unwrap();
        let chunk_id = repo
            .start_chunk(&mk_start(ExecutionId::new(), 0))
            .await
            .unwrap();

        repo.end_chunk(chunk_id, ChunkOutcome::Error).await.unwrap();
        let err = repo
            .end_chunk(chunk_id, ChunkOutcome::Success(ChunkMetrics::default()))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Transition(_)));

        let record = repo.load_chunk(chunk_id).await.unwrap().unwrap();
        assert_eq!(record.status, ChunkStatus::Error);
        assert!(record.metrics.is_none());
    }

    #[tokio::test]
    async fn ending_an_unknown_chunk_fails() {
        let repo = SledChunkRepository::temporary().unwrap();
        let err = repo
            .end_chunk(ChunkId::new(999), ChunkOutcome::Error)
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::UnknownChunk(id) if id == ChunkId::new(999)));
    }

    #[tokio::test]
    async fn lists_only_the_requested_run_in_chunk_order() {
        let repo = SledChunkRepository::temporary().unwrap();
        let run_a = ExecutionId::new();
        let run_b = ExecutionId::new();

        repo.start_chunk(&mk_start(run_a, 2)).await.unwrap();
        repo.start_chunk(&mk_start(run_b, 0)).await.unwrap();
        repo.start_chunk(&mk_start(run_a, 0)).await.unwrap();
        repo.start_chunk(&mk_start(run_a, 1)).await.unwrap();

        let numbers: Vec<u32> = repo
            .list_chunks(&run_a)
            .await
            .unwrap()
            .iter()
            .map(|r| r.chunk_number().get())
            .collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(repo.list_chunks(&run_b).await.unwrap().len(), 1);
    }
}
