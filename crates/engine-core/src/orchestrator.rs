use crate::{
    bytes::backend_byte_delta,
    connectors::{source::SourceTable, target::TargetTable, transport::Transport},
    error::{BoxError, ChunkError},
    metrics::Metrics,
    state::ChunkRepository,
};
use model::{
    core::identifiers::{ChunkId, ChunkNumber, ExecutionId},
    execution::{
        chunk::{ChunkMetrics, ChunkOutcome, ChunkStart},
        partition::{PartitionChunk, Predicate},
    },
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// One unit of work handed to [`ChunkOrchestrator::run_chunk`].
#[derive(Debug, Clone)]
pub struct ChunkRequest {
    pub execution_id: ExecutionId,
    pub partition_chunk: Option<PartitionChunk>,
    /// Zero-based position of the chunk within its run.
    pub chunk_index: u32,
    pub sync: bool,
    pub predicate: Option<Predicate>,
    pub dry_run: bool,
}

impl ChunkRequest {
    pub fn new(execution_id: ExecutionId, chunk_index: u32) -> Self {
        Self {
            execution_id,
            partition_chunk: None,
            chunk_index,
            sync: true,
            predicate: None,
            dry_run: false,
        }
    }

    pub fn with_partition_chunk(mut self, partition_chunk: PartitionChunk) -> Self {
        self.partition_chunk = Some(partition_chunk);
        self
    }

    pub fn with_predicate(mut self, predicate: Predicate) -> Self {
        self.predicate = Some(predicate);
        self
    }

    pub fn with_sync(mut self, sync: bool) -> Self {
        self.sync = sync;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn chunk_number(&self) -> ChunkNumber {
        ChunkNumber::from_index(self.chunk_index)
    }

    /// Staging storage is reused across chunks, so every chunk after the first
    /// starts by clearing it.
    pub fn reuses_staging(&self) -> bool {
        self.chunk_index > 0
    }

    /// The partition subset to transport. An empty subset means the whole table.
    pub fn partitions(&self) -> Option<&PartitionChunk> {
        self.partition_chunk.as_ref().filter(|chunk| !chunk.is_empty())
    }
}

/// Drives a single chunk from start record to terminal record.
///
/// Every chunk that was started reaches a terminal record before `run_chunk`
/// returns, whether it succeeds or fails. Errors are passed back unchanged and
/// never retried here.
#[derive(Clone)]
pub struct ChunkOrchestrator {
    source: Arc<dyn SourceTable>,
    target: Arc<dyn TargetTable>,
    transport: Arc<dyn Transport>,
    repo: Arc<dyn ChunkRepository>,
    metrics: Option<Metrics>,
}

impl ChunkOrchestrator {
    pub fn new(
        source: Arc<dyn SourceTable>,
        target: Arc<dyn TargetTable>,
        transport: Arc<dyn Transport>,
        repo: Arc<dyn ChunkRepository>,
    ) -> Self {
        Self {
            source,
            target,
            transport,
            repo,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Runs the chunk to completion and returns the number of rows transported.
    pub async fn run_chunk(&self, request: &ChunkRequest) -> Result<u64, ChunkError> {
        self.run(request, None).await
    }

    /// Like [`ChunkOrchestrator::run_chunk`], abandoning the chunk when `cancel`
    /// fires. A cancelled chunk is finalised as an error.
    pub async fn run_chunk_cancellable(
        &self,
        request: &ChunkRequest,
        cancel: &CancellationToken,
    ) -> Result<u64, ChunkError> {
        self.run(request, Some(cancel)).await
    }

    async fn run(
        &self,
        request: &ChunkRequest,
        cancel: Option<&CancellationToken>,
    ) -> Result<u64, ChunkError> {
        let chunk_number = request.chunk_number();
        let frontend_bytes = self.frontend_bytes(request).await;

        let start = self.chunk_start(request);
        let chunk_id = match self.repo.start_chunk(&start).await {
            Ok(chunk_id) => chunk_id,
            Err(source) => {
                if let Some(m) = &self.metrics {
                    m.record_failure();
                }
                return Err(ChunkError::Start {
                    chunk_number,
                    table: format!("{}.{}", start.source_owner, start.source_table),
                    source,
                });
            }
        };

        info!(
            chunk_id = %chunk_id,
            chunk_number = %chunk_number,
            execution_id = %request.execution_id,
            "Chunk started"
        );

        let result = match cancel {
            Some(token) => tokio::select! {
                result = self.transport_and_load(request, frontend_bytes) => result,
                _ = token.cancelled() => Err(ChunkError::Cancelled { chunk_number }),
            },
            None => self.transport_and_load(request, frontend_bytes).await,
        };

        match result {
            Ok(metrics) => self.finish_success(chunk_id, chunk_number, metrics).await,
            Err(err) => {
                error!(
                    chunk_id = %chunk_id,
                    chunk_number = %chunk_number,
                    error = %err,
                    "Chunk failed"
                );
                self.finish_error(chunk_id).await;
                Err(err)
            }
        }
    }

    fn chunk_start(&self, request: &ChunkRequest) -> ChunkStart {
        let partitions = request.partitions().map(PartitionChunk::partition_names);

        ChunkStart {
            execution_id: request.execution_id,
            source_owner: self.source.owner().to_string(),
            source_table: self.source.table_name().to_string(),
            target_db: self.target.db_name().to_string(),
            target_table: self.target.table_name().to_string(),
            chunk_number: request.chunk_number(),
            partition_level: self.source.partition_level(),
            partitions,
        }
    }

    /// Best-effort source volume. Never fails the chunk.
    async fn frontend_bytes(&self, request: &ChunkRequest) -> Option<u64> {
        if let Some(predicate) = &request.predicate {
            debug!(predicate = %predicate, "Frontend bytes unknown for predicate transfer");
            return None;
        }

        let size: Result<u64, BoxError> = match request.partitions() {
            Some(chunk) => chunk.size_in_bytes().map_err(Into::into),
            None => self.source.size_in_bytes().await,
        };

        match size {
            Ok(bytes) => Some(bytes),
            Err(err) => {
                warn!(
                    chunk_number = %request.chunk_number(),
                    error = %err,
                    "Unable to compute frontend bytes"
                );
                None
            }
        }
    }

    async fn transport_and_load(
        &self,
        request: &ChunkRequest,
        frontend_bytes: Option<u64>,
    ) -> Result<ChunkMetrics, ChunkError> {
        let chunk_number = request.chunk_number();

        if request.reuses_staging() {
            let staging = self
                .transport
                .staging_area()
                .await
                .map_err(|source| ChunkError::EmptyStaging {
                    chunk_number,
                    source,
                })?;
            self.target
                .empty_staging_area(&staging)
                .await
                .map_err(|source| ChunkError::EmptyStaging {
                    chunk_number,
                    source,
                })?;
            debug!(staging = %staging.name, "Staging area emptied");
        }

        let row_count = self
            .transport
            .transport(request.partitions())
            .await
            .map_err(|source| ChunkError::Transport {
                chunk_number,
                source,
            })?;
        let transport_bytes = self.transport.transport_bytes();
        let staging = self
            .transport
            .staging_area()
            .await
            .map_err(|source| ChunkError::Transport {
                chunk_number,
                source,
            })?;

        self.target
            .validate_staged_data(
                self.source.partition_columns(),
                self.source.columns(),
                row_count,
                &staging.columns,
            )
            .await
            .map_err(|source| ChunkError::StagedData {
                chunk_number,
                source,
            })?;
        self.target
            .validate_type_conversions(&staging.columns)
            .await
            .map_err(|source| ChunkError::TypeConversion {
                chunk_number,
                source,
            })?;

        let before = self.backend_size(request, false).await?;
        self.target
            .load_final_table(request.sync)
            .await
            .map_err(|source| ChunkError::Load {
                chunk_number,
                source,
            })?;
        let after = self.backend_size(request, true).await?;

        let backend_bytes = backend_byte_delta(before, after);
        if backend_bytes.is_none() {
            debug!(
                before = ?before,
                after = ?after,
                dry_run = request.dry_run,
                "Backend bytes unknown"
            );
        }

        Ok(ChunkMetrics {
            row_count,
            frontend_bytes,
            transport_bytes,
            backend_bytes,
        })
    }

    /// Backend size snapshot, skipped on dry runs.
    async fn backend_size(
        &self,
        request: &ChunkRequest,
        no_cache: bool,
    ) -> Result<Option<u64>, ChunkError> {
        if request.dry_run {
            return Ok(None);
        }
        self.target
            .table_size(no_cache)
            .await
            .map_err(|source| ChunkError::BackendSize {
                chunk_number: request.chunk_number(),
                source,
            })
    }

    async fn finish_success(
        &self,
        chunk_id: ChunkId,
        chunk_number: ChunkNumber,
        metrics: ChunkMetrics,
    ) -> Result<u64, ChunkError> {
        if let Err(source) = self
            .repo
            .end_chunk(chunk_id, ChunkOutcome::Success(metrics))
            .await
        {
            error!(
                chunk_id = %chunk_id,
                error = %source,
                "Failed to record chunk success"
            );
            self.finish_error(chunk_id).await;
            return Err(ChunkError::Finalize { chunk_id, source });
        }

        if let Some(m) = &self.metrics {
            m.record_success(metrics.row_count, metrics.transport_bytes);
        }

        info!(
            chunk_id = %chunk_id,
            chunk_number = %chunk_number,
            rows = metrics.row_count,
            frontend_bytes = ?metrics.frontend_bytes,
            transport_bytes = ?metrics.transport_bytes,
            backend_bytes = ?metrics.backend_bytes,
            "Chunk succeeded"
        );
        Ok(metrics.row_count)
    }

    /// Marks the chunk as failed. A failure here is logged and otherwise ignored
    /// so the caller still sees the error that ended the chunk.
    async fn finish_error(&self, chunk_id: ChunkId) {
        if let Err(err) = self.repo.end_chunk(chunk_id, ChunkOutcome::Error).await {
            error!(
                chunk_id = %chunk_id,
                error = %err,
                "Failed to record chunk error"
            );
        }
        if let Some(m) = &self.metrics {
            m.record_failure();
        }
    }
}
