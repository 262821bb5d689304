#![allow(dead_code)]

use async_trait::async_trait;
use engine_core::{
    connectors::{source::SourceTable, target::TargetTable, transport::Transport},
    error::{BoxError, RepositoryError},
    orchestrator::ChunkOrchestrator,
    state::{ChunkRepository, sled_store::SledChunkRepository},
    validation,
};
use model::{
    core::{
        column::Column,
        data_type::DataType,
        identifiers::{ChunkId, ExecutionId},
    },
    execution::{
        chunk::{ChunkOutcome, ChunkRecord, ChunkStart, ChunkStatus},
        partition::PartitionChunk,
        staging::StagingArea,
    },
};
use std::{
    sync::{Arc, Mutex},
    time::Duration,
};
use thiserror::Error;

/// A collaborator call that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    EmptyStaging,
    Transport,
    StagingArea,
    ValidateStagedData,
    ValidateTypes,
    TableSize,
    Load,
}

#[derive(Debug, Error)]
#[error("injected failure at {0:?}")]
pub struct InjectedFailure(pub Step);

fn fail(step: Step) -> BoxError {
    Box::new(InjectedFailure(step))
}

/// Ordered log of collaborator calls shared by every fake of one test.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, call: impl Into<String>) {
        self.0.lock().unwrap().push(call.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn contains(&self, call: &str) -> bool {
        self.0.lock().unwrap().iter().any(|c| c == call)
    }
}

pub fn source_columns() -> Vec<Column> {
    vec![
        Column::new("ID", DataType::Decimal).not_null(),
        Column::new("NAME", DataType::VarChar),
        Column::new("SALE_DATE", DataType::Date),
    ]
}

pub fn staged_columns() -> Vec<Column> {
    vec![
        Column::new("id", DataType::Long),
        Column::new("name", DataType::String),
        Column::new("sale_date", DataType::Date),
    ]
}

pub fn backend_columns() -> Vec<Column> {
    vec![
        Column::new("ID", DataType::Decimal),
        Column::new("NAME", DataType::String),
        Column::new("SALE_DATE", DataType::Timestamp),
    ]
}

pub struct FakeSource {
    pub columns: Vec<Column>,
    pub partition_columns: Vec<Column>,
    /// `None` makes sizing fail.
    pub size: Option<u64>,
    pub log: CallLog,
}

impl FakeSource {
    pub fn new(log: CallLog) -> Self {
        Self {
            columns: source_columns(),
            partition_columns: vec![Column::new("SALE_DATE", DataType::Date)],
            size: Some(8192),
            log,
        }
    }
}

#[async_trait]
impl SourceTable for FakeSource {
    fn owner(&self) -> &str {
        "SH"
    }

    fn table_name(&self) -> &str {
        "SALES"
    }

    fn columns(&self) -> &[Column] {
        &self.columns
    }

    fn partition_columns(&self) -> &[Column] {
        &self.partition_columns
    }

    fn partition_level(&self) -> Option<u32> {
        Some(1)
    }

    async fn size_in_bytes(&self) -> Result<u64, BoxError> {
        self.log.push("source_size");
        self.size.ok_or_else(|| "dictionary unavailable".into())
    }
}

pub struct FakeTarget {
    pub fail: Option<Step>,
    /// Rows actually found in staging. `None` matches whatever transport reported.
    pub staged_rows: Option<u64>,
    pub before: Option<u64>,
    pub after: Option<u64>,
    pub log: CallLog,
}

impl FakeTarget {
    pub fn new(log: CallLog) -> Self {
        Self {
            fail: None,
            staged_rows: None,
            before: Some(1000),
            after: Some(1500),
            log,
        }
    }

    fn check(&self, step: Step) -> Result<(), BoxError> {
        if self.fail == Some(step) {
            return Err(fail(step));
        }
        Ok(())
    }
}

#[async_trait]
impl TargetTable for FakeTarget {
    fn db_name(&self) -> &str {
        "sh_load"
    }

    fn table_name(&self) -> &str {
        "sales"
    }

    async fn empty_staging_area(&self, staging: &StagingArea) -> Result<(), BoxError> {
        self.log.push(format!("empty_staging:{}", staging.name));
        self.check(Step::EmptyStaging)
    }

    async fn validate_staged_data(
        &self,
        partition_columns: &[Column],
        source_columns: &[Column],
        rows_staged: u64,
        staging_columns: &[Column],
    ) -> Result<(), BoxError> {
        self.log.push("validate_staged_data");
        self.check(Step::ValidateStagedData)?;
        validation::check_staged_columns(partition_columns, source_columns, staging_columns)?;
        validation::check_staged_row_count(rows_staged, self.staged_rows.unwrap_or(rows_staged))?;
        Ok(())
    }

    async fn validate_type_conversions(&self, staging_columns: &[Column]) -> Result<(), BoxError> {
        self.log.push("validate_type_conversions");
        self.check(Step::ValidateTypes)?;
        validation::check_type_conversions(staging_columns, &backend_columns())?;
        Ok(())
    }

    async fn table_size(&self, no_cache: bool) -> Result<Option<u64>, BoxError> {
        self.log.push(format!("table_size:{no_cache}"));
        self.check(Step::TableSize)?;
        Ok(if no_cache { self.after } else { self.before })
    }

    async fn load_final_table(&self, sync: bool) -> Result<(), BoxError> {
        self.log.push(format!("load:{sync}"));
        self.check(Step::Load)
    }
}

pub struct FakeTransport {
    pub fail: Option<Step>,
    pub rows: u64,
    pub bytes: Option<u64>,
    pub staging_columns: Vec<Column>,
    /// Makes `transport` wait far longer than any test runs.
    pub hang: bool,
    pub log: CallLog,
}

impl FakeTransport {
    pub fn new(log: CallLog) -> Self {
        Self {
            fail: None,
            rows: 10,
            bytes: Some(4096),
            staging_columns: staged_columns(),
            hang: false,
            log,
        }
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn transport(&self, partition_chunk: Option<&PartitionChunk>) -> Result<u64, BoxError> {
        let scope = partition_chunk
            .map(|chunk| chunk.partition_names().join("+"))
            .unwrap_or_else(|| "all".to_string());
        self.log.push(format!("transport:{scope}"));

        if self.hang {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        if self.fail == Some(Step::Transport) {
            return Err(fail(Step::Transport));
        }
        Ok(self.rows)
    }

    fn transport_bytes(&self) -> Option<u64> {
        self.bytes
    }

    async fn staging_area(&self) -> Result<StagingArea, BoxError> {
        self.log.push("staging_area");
        if self.fail == Some(Step::StagingArea) {
            return Err(fail(Step::StagingArea));
        }
        Ok(StagingArea::new("sales_stg")
            .with_location("/staging/sh/sales")
            .with_columns(self.staging_columns.clone()))
    }
}

/// Sled repository that records terminal calls and can refuse writes.
pub struct RecordingRepository {
    pub inner: SledChunkRepository,
    pub fail_start: bool,
    pub fail_success: bool,
    pub fail_error: bool,
    ends: Mutex<Vec<(ChunkId, ChunkStatus)>>,
}

impl RecordingRepository {
    pub fn new(inner: SledChunkRepository) -> Self {
        Self {
            inner,
            fail_start: false,
            fail_success: false,
            fail_error: false,
            ends: Mutex::new(Vec::new()),
        }
    }

    pub fn end_calls(&self) -> Vec<(ChunkId, ChunkStatus)> {
        self.ends.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChunkRepository for RecordingRepository {
    async fn start_chunk(&self, start: &ChunkStart) -> Result<ChunkId, RepositoryError> {
        if self.fail_start {
            return Err(RepositoryError::Other("repository offline".into()));
        }
        self.inner.start_chunk(start).await
    }

    async fn end_chunk(
        &self,
        chunk_id: ChunkId,
        outcome: ChunkOutcome,
    ) -> Result<(), RepositoryError> {
        self.ends.lock().unwrap().push((chunk_id, outcome.status()));

        let refuse = match outcome {
            ChunkOutcome::Success(_) => self.fail_success,
            ChunkOutcome::Error => self.fail_error,
        };
        if refuse {
            return Err(RepositoryError::Other("write refused".into()));
        }
        self.inner.end_chunk(chunk_id, outcome).await
    }

    async fn load_chunk(&self, chunk_id: ChunkId) -> Result<Option<ChunkRecord>, RepositoryError> {
        self.inner.load_chunk(chunk_id).await
    }

    async fn list_chunks(
        &self,
        execution_id: &ExecutionId,
    ) -> Result<Vec<ChunkRecord>, RepositoryError> {
        self.inner.list_chunks(execution_id).await
    }
}

/// Every collaborator of one orchestrator, kept so tests can inspect them.
pub struct Harness {
    pub log: CallLog,
    pub source: Arc<FakeSource>,
    pub target: Arc<FakeTarget>,
    pub transport: Arc<FakeTransport>,
    pub repo: Arc<RecordingRepository>,
    _dir: tempfile::TempDir,
}

pub struct HarnessBuilder {
    pub log: CallLog,
    pub source: FakeSource,
    pub target: FakeTarget,
    pub transport: FakeTransport,
    pub fail_start: bool,
    pub fail_success: bool,
    pub fail_error: bool,
}

impl HarnessBuilder {
    pub fn new() -> Self {
        let log = CallLog::default();
        Self {
            source: FakeSource::new(log.clone()),
            target: FakeTarget::new(log.clone()),
            transport: FakeTransport::new(log.clone()),
            log,
            fail_start: false,
            fail_success: false,
            fail_error: false,
        }
    }

    /// Routes a failure to whichever fake owns `step`.
    pub fn failing_at(mut self, step: Step) -> Self {
        match step {
            Step::Transport | Step::StagingArea => self.transport.fail = Some(step),
            _ => self.target.fail = Some(step),
        }
        self
    }

    pub fn build(self) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let mut repo = RecordingRepository::new(SledChunkRepository::open(dir.path()).unwrap());
        repo.fail_start = self.fail_start;
        repo.fail_success = self.fail_success;
        repo.fail_error = self.fail_error;

        Harness {
            log: self.log,
            source: Arc::new(self.source),
            target: Arc::new(self.target),
            transport: Arc::new(self.transport),
            repo: Arc::new(repo),
            _dir: dir,
        }
    }
}

impl Default for HarnessBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Harness {
    pub fn orchestrator(&self) -> ChunkOrchestrator {
        ChunkOrchestrator::new(
            self.source.clone(),
            self.target.clone(),
            self.transport.clone(),
            self.repo.clone(),
        )
    }

    pub async fn records(&self, execution_id: &ExecutionId) -> Vec<ChunkRecord> {
        self.repo.list_chunks(execution_id).await.unwrap()
    }
}
