use crate::{
    core::identifiers::{ChunkId, ChunkNumber, ExecutionId},
    execution::errors::ChunkStateError,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChunkStatus {
    Started,
    Success,
    Error,
}

impl ChunkStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChunkStatus::Started => "STARTED",
            ChunkStatus::Success => "SUCCESS",
            ChunkStatus::Error => "ERROR",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, ChunkStatus::Started)
    }
}

impl fmt::Display for ChunkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity and linkage written when a chunk is started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkStart {
    pub execution_id: ExecutionId,
    pub source_owner: String,
    pub source_table: String,
    pub target_db: String,
    pub target_table: String,
    pub chunk_number: ChunkNumber,
    pub partitions: Option<Vec<String>>,
    pub partition_level: Option<u32>,
}

/// Volume metrics attached to a successful chunk.
///
/// `frontend_bytes` is unknown for predicate based transfers and `backend_bytes`
/// is unknown whenever either table size snapshot was skipped or unavailable.
/// `backend_bytes` is signed: a load can shrink storage after compaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChunkMetrics {
    pub row_count: u64,
    pub frontend_bytes: Option<u64>,
    pub transport_bytes: Option<u64>,
    pub backend_bytes: Option<i64>,
}

/// Terminal outcome of a chunk. Metrics can only accompany success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChunkOutcome {
    Success(ChunkMetrics),
    Error,
}

impl ChunkOutcome {
    pub fn status(&self) -> ChunkStatus {
        match self {
            ChunkOutcome::Success(_) => ChunkStatus::Success,
            ChunkOutcome::Error => ChunkStatus::Error,
        }
    }
}

/// Durable record of one chunk as held by the chunk repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub chunk_id: ChunkId,
    pub start: ChunkStart,
    pub status: ChunkStatus,
    pub metrics: Option<ChunkMetrics>,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl ChunkRecord {
    pub fn started(chunk_id: ChunkId, start: ChunkStart) -> Self {
        Self {
            chunk_id,
            start,
            status: ChunkStatus::Started,
            metrics: None,
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    /// Moves the record to its terminal state. A record can be finished once.
    pub fn finish(&mut self, outcome: ChunkOutcome) -> Result<(), ChunkStateError> {
        if self.status.is_terminal() {
            return Err(ChunkStateError::AlreadyTerminal {
                chunk_id: self.chunk_id,
                status: self.status,
            });
        }

        self.status = outcome.status();
        self.metrics = match outcome {
            ChunkOutcome::Success(metrics) => Some(metrics),
            ChunkOutcome::Error => None,
        };
        self.ended_at = Some(Utc::now());
        Ok(())
    }

    pub fn chunk_number(&self) -> ChunkNumber {
        self.start.chunk_number
    }

    pub fn execution_id(&self) -> &ExecutionId {
        &self.start.execution_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start() -> ChunkStart {
        ChunkStart {
            execution_id: ExecutionId::new(),
            source_owner: "SH".into(),
            source_table: "SALES".into(),
            target_db: "sh".into(),
            target_table: "sales".into(),
            chunk_number: ChunkNumber::from_index(0),
            partitions: Some(vec!["P2020".into()]),
            partition_level: Some(1),
        }
    }

    #[test]
    fn success_attaches_metrics() {
        let mut record = ChunkRecord::started(ChunkId::new(1), start());
        assert!(record.metrics.is_none());

        let metrics = ChunkMetrics {
            row_count: 10,
            frontend_bytes: None,
            transport_bytes: Some(512),
            backend_bytes: Some(300),
        };
        record.finish(ChunkOutcome::Success(metrics)).unwrap();

        assert_eq!(record.status, ChunkStatus::Success);
        assert_eq!(record.metrics, Some(metrics));
        assert!(record.ended_at.is_some());
    }

    #[test]
    fn second_terminal_transition_is_rejected() {
        let mut record = ChunkRecord::started(ChunkId::new(7), start());
        record.finish(ChunkOutcome::Error).unwrap();

        let err = record
            .finish(ChunkOutcome::Success(ChunkMetrics::default()))
            .unwrap_err();
        assert!(matches!(
            err,
            ChunkStateError::AlreadyTerminal {
                status: ChunkStatus::Error,
                ..
            }
        ));
        assert_eq!(record.status, ChunkStatus::Error);
        assert!(record.metrics.is_none());
    }
}
