use crate::settings::error::SettingsError;
use planner::split::SplitMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Raw settings as written by the user. Every field is optional; missing
/// fields fall back to defaults during validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsFile {
    pub parallelism: Option<usize>,
    pub max_precision: Option<u64>,
    pub split_mode: Option<SplitMode>,
    pub sync: Option<bool>,
    pub dry_run: Option<bool>,
    pub state_path: Option<PathBuf>,
}

impl SettingsFile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let file = Self::from_json(&raw).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(path = %path.display(), "Loaded settings file");
        Ok(file)
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_partial_file() {
        let file = SettingsFile::from_json(r#"{ "parallelism": 8, "split_mode": "contiguous" }"#)
            .unwrap();
        assert_eq!(file.parallelism, Some(8));
        assert_eq!(file.split_mode, Some(SplitMode::Contiguous));
        assert_eq!(file.max_precision, None);
    }

    #[test]
    fn rejects_unknown_fields() {
        assert!(SettingsFile::from_json(r#"{ "batch_size": 10 }"#).is_err());
    }

    #[test]
    fn load_reports_path_on_failure() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        write!(tmp, "{{ not json").unwrap();

        let err = SettingsFile::load(tmp.path()).unwrap_err();
        assert!(matches!(err, SettingsError::Parse { ref path, .. } if path == tmp.path()));

        let err = SettingsFile::load("/definitely/missing/settings.json").unwrap_err();
        assert!(matches!(err, SettingsError::Read { .. }));
    }
}
