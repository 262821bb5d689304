use crate::execution::errors::PartitionError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One source partition selected for offload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcePartition {
    pub name: String,
    pub high_values: Vec<String>,
    pub size_bytes: Option<u64>,
}

impl SourcePartition {
    pub fn new(name: impl Into<String>, size_bytes: Option<u64>) -> Self {
        Self {
            name: name.into(),
            high_values: Vec::new(),
            size_bytes,
        }
    }

    pub fn with_high_values(mut self, high_values: Vec<String>) -> Self {
        self.high_values = high_values;
        self
    }
}

/// The subset of source partitions transported together as a single chunk.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PartitionChunk {
    partitions: Vec<SourcePartition>,
}

impl PartitionChunk {
    pub fn new(partitions: Vec<SourcePartition>) -> Self {
        Self { partitions }
    }

    pub fn push(&mut self, partition: SourcePartition) {
        self.partitions.push(partition);
    }

    pub fn partitions(&self) -> &[SourcePartition] {
        &self.partitions
    }

    pub fn partition_names(&self) -> Vec<String> {
        self.partitions.iter().map(|p| p.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.partitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }

    /// Total precomputed size of the partitions. Fails if any size is unknown.
    pub fn size_in_bytes(&self) -> Result<u64, PartitionError> {
        if self.partitions.is_empty() {
            return Err(PartitionError::Empty);
        }

        self.partitions.iter().try_fold(0u64, |acc, p| {
            p.size_bytes
                .map(|size| acc.saturating_add(size))
                .ok_or_else(|| PartitionError::UnknownSize(p.name.clone()))
        })
    }
}

/// Filter expression selecting the rows of a predicate based transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Predicate(String);

impl Predicate {
    pub fn new(dsl: impl Into<String>) -> Self {
        Self(dsl.into())
    }

    pub fn dsl(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_sums_known_partitions() {
        let chunk = PartitionChunk::new(vec![
            SourcePartition::new("P1", Some(100)),
            SourcePartition::new("P2", Some(250)),
        ]);
        assert_eq!(chunk.size_in_bytes().unwrap(), 350);
        assert_eq!(chunk.partition_names(), vec!["P1", "P2"]);
    }

    #[test]
    fn size_fails_on_unknown_partition() {
        let chunk = PartitionChunk::new(vec![
            SourcePartition::new("P1", Some(100)),
            SourcePartition::new("P2", None),
        ]);
        let err = chunk.size_in_bytes().unwrap_err();
        assert!(matches!(err, PartitionError::UnknownSize(name) if name == "P2"));
    }

    #[test]
    fn empty_chunk_has_no_size() {
        assert!(matches!(
            PartitionChunk::default().size_in_bytes(),
            Err(PartitionError::Empty)
        ));
    }
}
