use planner::split::{
    RangeSplitter, SplitMode, error::SplitError, range::DEFAULT_PRECISION, split_list,
    split_list_delimited,
};
use std::path::PathBuf;

const DEFAULT_PARALLELISM: usize = 1;
const STATE_DIR: &str = ".chunkflow/state";

/// Immutable, validated configuration for transport runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportSettings {
    /// Number of workers a run is split across
    pub parallelism: usize,
    /// Significant digits kept when splitting id ranges
    pub max_precision: u64,
    /// How explicit row key lists are distributed
    pub split_mode: SplitMode,
    /// Whether the final load waits for completion
    pub sync: bool,
    /// Whether this is a dry run (backend sizes are not measured)
    pub dry_run: bool,
    /// Location of the chunk repository
    pub state_path: PathBuf,
}

impl TransportSettings {
    pub fn default(dry_run: bool) -> Self {
        Self::from_builder(TransportSettingsBuilder::new(dry_run))
    }

    pub fn from_builder(builder: TransportSettingsBuilder) -> Self {
        Self {
            parallelism: builder.parallelism.unwrap_or(DEFAULT_PARALLELISM),
            max_precision: builder.max_precision.unwrap_or(DEFAULT_PRECISION),
            split_mode: builder.split_mode.unwrap_or_default(),
            sync: builder.sync.unwrap_or(true),
            dry_run: builder.dry_run,
            state_path: builder.state_path.unwrap_or_else(default_state_path),
        }
    }

    pub fn parallelism(&self) -> usize {
        self.parallelism
    }

    pub fn max_precision(&self) -> u64 {
        self.max_precision
    }

    pub fn split_mode(&self) -> SplitMode {
        self.split_mode
    }

    pub fn is_sync(&self) -> bool {
        self.sync
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn state_path(&self) -> &PathBuf {
        &self.state_path
    }

    pub fn range_splitter(&self) -> Result<RangeSplitter, SplitError> {
        RangeSplitter::with_precision(self.max_precision)
    }

    /// Splits `items` across the configured parallelism and mode.
    pub fn split_list<T: Clone>(&self, items: &[T]) -> Vec<Vec<T>> {
        split_list(items, self.parallelism, self.split_mode)
    }

    pub fn split_list_delimited<T: Clone + std::fmt::Display>(
        &self,
        items: &[T],
    ) -> Vec<Option<String>> {
        split_list_delimited(items, self.parallelism, self.split_mode)
    }
}

/// `~/.chunkflow/state`, or a relative `.chunkflow/state` without a home directory.
pub fn default_state_path() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(STATE_DIR))
        .unwrap_or_else(|| PathBuf::from(STATE_DIR))
}

#[derive(Debug, Default)]
pub struct TransportSettingsBuilder {
    pub parallelism: Option<usize>,
    pub max_precision: Option<u64>,
    pub split_mode: Option<SplitMode>,
    pub sync: Option<bool>,
    pub state_path: Option<PathBuf>,
    pub dry_run: bool,
}

impl TransportSettingsBuilder {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Default::default()
        }
    }

    pub fn parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = Some(parallelism);
        self
    }

    pub fn max_precision(mut self, max_precision: u64) -> Self {
        self.max_precision = Some(max_precision);
        self
    }

    pub fn split_mode(mut self, split_mode: SplitMode) -> Self {
        self.split_mode = Some(split_mode);
        self
    }

    pub fn sync(mut self, sync: bool) -> Self {
        self.sync = Some(sync);
        self
    }

    pub fn state_path(mut self, state_path: impl Into<PathBuf>) -> Self {
        self.state_path = Some(state_path.into());
        self
    }

    pub fn build(self) -> TransportSettings {
        TransportSettings::from_builder(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = TransportSettings::default(false);
        assert_eq!(settings.parallelism(), 1);
        assert_eq!(settings.max_precision(), 38);
        assert_eq!(settings.split_mode(), SplitMode::RoundRobin);
        assert!(settings.is_sync());
        assert!(!settings.is_dry_run());
        assert!(settings.state_path().ends_with(".chunkflow/state"));
    }

    #[test]
    fn test_builder() {
        let settings = TransportSettingsBuilder::new(true)
            .parallelism(3)
            .max_precision(50)
            .split_mode(SplitMode::Contiguous)
            .sync(false)
            .state_path("/tmp/chunks")
            .build();

        assert_eq!(settings.parallelism(), 3);
        assert!(settings.is_dry_run());
        assert!(!settings.is_sync());
        assert_eq!(settings.state_path(), &PathBuf::from("/tmp/chunks"));
        assert_eq!(settings.range_splitter().unwrap().precision(), 50);
        assert_eq!(
            settings.split_list(&[1, 2, 3, 4, 5]),
            vec![vec![1, 2], vec![3, 4], vec![5]]
        );
        assert_eq!(
            settings.split_list_delimited(&[1, 2]),
            vec![Some("1".to_string()), Some("2".to_string()), None]
        );
    }
}
