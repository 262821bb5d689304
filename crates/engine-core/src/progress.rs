use crate::{error::RepositoryError, state::ChunkRepository};
use model::{
    core::identifiers::ExecutionId,
    execution::chunk::{ChunkRecord, ChunkStatus},
};
use serde::Serialize;
use std::{fmt, sync::Arc};

#[derive(Clone)]
pub struct ProgressService {
    pub repo: Arc<dyn ChunkRepository>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProgressStage {
    Idle,
    Running,
    Done,
    Failed,
}

impl ProgressStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProgressStage::Idle => "Idle",
            ProgressStage::Running => "Running",
            ProgressStage::Done => "Done",
            ProgressStage::Failed => "Failed",
        }
    }
}

impl fmt::Display for ProgressStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Totals over every chunk record of one run.
///
/// Byte totals only include known values; the `*_unknown` counters say how
/// many successful chunks could not report them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExecutionSummary {
    pub chunks_started: u64,
    pub chunks_succeeded: u64,
    pub chunks_failed: u64,
    pub rows: u64,
    pub frontend_bytes: u64,
    pub frontend_bytes_unknown: u64,
    pub transport_bytes: u64,
    pub backend_bytes: i64,
    pub backend_bytes_unknown: u64,
}

impl ExecutionSummary {
    pub fn from_records(records: &[ChunkRecord]) -> Self {
        let mut summary = ExecutionSummary::default();

        for record in records {
            match record.status {
                ChunkStatus::Started => summary.chunks_started += 1,
                ChunkStatus::Error => summary.chunks_failed += 1,
                ChunkStatus::Success => summary.chunks_succeeded += 1,
            }

            let Some(metrics) = &record.metrics else {
                continue;
            };

            summary.rows = summary.rows.saturating_add(metrics.row_count);
            match metrics.frontend_bytes {
                Some(bytes) => {
                    summary.frontend_bytes = summary.frontend_bytes.saturating_add(bytes)
                }
                None => summary.frontend_bytes_unknown += 1,
            }
            if let Some(bytes) = metrics.transport_bytes {
                summary.transport_bytes = summary.transport_bytes.saturating_add(bytes);
            }
            match metrics.backend_bytes {
                Some(bytes) => {
                    summary.backend_bytes = summary.backend_bytes.saturating_add(bytes)
                }
                None => summary.backend_bytes_unknown += 1,
            }
        }

        summary
    }

    pub fn total_chunks(&self) -> u64 {
        self.chunks_started + self.chunks_succeeded + self.chunks_failed
    }

    pub fn stage(&self) -> ProgressStage {
        if self.total_chunks() == 0 {
            ProgressStage::Idle
        } else if self.chunks_started > 0 {
            ProgressStage::Running
        } else if self.chunks_failed > 0 {
            ProgressStage::Failed
        } else {
            ProgressStage::Done
        }
    }
}

impl ProgressService {
    pub fn new(repo: Arc<dyn ChunkRepository>) -> Self {
        ProgressService { repo }
    }

    pub async fn execution_summary(
        &self,
        execution_id: &ExecutionId,
    ) -> Result<ExecutionSummary, RepositoryError> {
        let records = self.repo.list_chunks(execution_id).await?;
        Ok(ExecutionSummary::from_records(&records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::sled_store::SledChunkRepository;
    use model::{
        core::identifiers::ChunkNumber,
        execution::chunk::{ChunkMetrics, ChunkOutcome, ChunkStart},
    };

    fn mk_start(execution_id: ExecutionId, index: u32) -> ChunkStart {
        ChunkStart {
            execution_id,
            source_owner: "SH".into(),
            source_table: "SALES".into(),
            target_db: "sh_load".into(),
            target_table: "sales".into(),
            chunk_number: ChunkNumber::from_index(index),
            partitions: None,
            partition_level: None,
        }
    }

    #[tokio::test]
    async fn summarises_a_run() {
        let repo = Arc::new(SledChunkRepository::temporary().unwrap());
        let service = ProgressService::new(repo.clone());
        let run = ExecutionId::new();

        assert_eq!(
            service.execution_summary(&run).await.unwrap().stage(),
            ProgressStage::Idle
        );

        let first = repo.start_chunk(&mk_start(run, 0)).await.unwrap();
        repo.end_chunk(
            first,
            ChunkOutcome::Success(ChunkMetrics {
                row_count: 10,
                frontend_bytes: Some(1000),
                transport_bytes: Some(400),
                backend_bytes: Some(300),
            }),
        )
        .await
        .unwrap();

        let second = repo.start_chunk(&mk_start(run, 1)).await.unwrap();
        repo.end_chunk(
            second,
            ChunkOutcome::Success(ChunkMetrics {
                row_count: 5,
                frontend_bytes: None,
                transport_bytes: Some(100),
                backend_bytes: None,
            }),
        )
        .await
        .unwrap();

        let summary = service.execution_summary(&run).await.unwrap();
        assert_eq!(summary.stage(), ProgressStage::Done);
        assert_eq!(summary.rows, 15);
        assert_eq!(summary.frontend_bytes, 1000);
        assert_eq!(summary.frontend_bytes_unknown, 1);
        assert_eq!(summary.transport_bytes, 500);
        assert_eq!(summary.backend_bytes, 300);
        assert_eq!(summary.backend_bytes_unknown, 1);

        let third = repo.start_chunk(&mk_start(run, 2)).await.unwrap();
        assert_eq!(
            service.execution_summary(&run).await.unwrap().stage(),
            ProgressStage::Running
        );

        repo.end_chunk(third, ChunkOutcome::Error).await.unwrap();
        let summary = service.execution_summary(&run).await.unwrap();
        assert_eq!(summary.stage(), ProgressStage::Failed);
        assert_eq!(summary.total_chunks(), 3);
        assert_eq!(summary.rows, 15);
    }
}
