use crate::settings::{
    error::SettingsError,
    file::SettingsFile,
    validated::{TransportSettings, TransportSettingsBuilder},
};
use planner::split::range::MAX_PRECISION;
use tracing::{info, warn};

const LARGE_PARALLELISM: usize = 256;

/// Validates raw settings before a run uses them.
pub struct SettingsValidator {
    dry_run: bool,
}

impl SettingsValidator {
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }

    pub fn validate(&self, file: &SettingsFile) -> Result<TransportSettings, SettingsError> {
        info!("Validating settings: {file:?}");

        let dry_run = self.dry_run || file.dry_run.unwrap_or(false);
        let mut builder = TransportSettingsBuilder::new(dry_run);
        let mut errors: Vec<String> = Vec::new();

        self.validate_parallelism(file, &mut builder, &mut errors);
        self.validate_precision(file, &mut builder, &mut errors);
        self.validate_state_path(file, &mut builder, &mut errors);

        if let Some(mode) = file.split_mode {
            builder.split_mode = Some(mode);
        }
        if let Some(sync) = file.sync {
            builder.sync = Some(sync);
        }

        if !errors.is_empty() {
            return Err(SettingsError::ValidationFailed(errors));
        }

        let validated = builder.build();
        info!("Settings validation completed successfully");
        self.log_validated_settings(&validated);

        Ok(validated)
    }

    fn validate_parallelism(
        &self,
        file: &SettingsFile,
        builder: &mut TransportSettingsBuilder,
        errors: &mut Vec<String>,
    ) {
        let Some(parallelism) = file.parallelism else {
            return;
        };

        if parallelism == 0 {
            errors.push("parallelism must be a positive integer".to_string());
            return;
        }
        if parallelism > LARGE_PARALLELISM {
            warn!(
                "Parallelism {} is very large, each worker holds its own staging session",
                parallelism
            );
        }
        builder.parallelism = Some(parallelism);
    }

    fn validate_precision(
        &self,
        file: &SettingsFile,
        builder: &mut TransportSettingsBuilder,
        errors: &mut Vec<String>,
    ) {
        let Some(precision) = file.max_precision else {
            return;
        };

        if precision == 0 || precision > MAX_PRECISION {
            errors.push(format!(
                "max_precision must be between 1 and {MAX_PRECISION}, got {precision}"
            ));
            return;
        }
        if precision < 16 {
            warn!(
                "max_precision {} is below double precision, range bounds will be rounded",
                precision
            );
        }
        builder.max_precision = Some(precision);
    }

    fn validate_state_path(
        &self,
        file: &SettingsFile,
        builder: &mut TransportSettingsBuilder,
        errors: &mut Vec<String>,
    ) {
        let Some(path) = &file.state_path else {
            return;
        };

        if path.as_os_str().is_empty() {
            errors.push("state_path must not be empty".to_string());
            return;
        }
        if path.is_file() {
            errors.push(format!(
                "state_path {} points at a file, expected a directory",
                path.display()
            ));
            return;
        }
        builder.state_path = Some(path.clone());
    }

    fn log_validated_settings(&self, settings: &TransportSettings) {
        info!("=== Validated Settings ===");
        info!("  Parallelism: {}", settings.parallelism());
        info!("  Max Precision: {}", settings.max_precision());
        info!("  Split Mode: {:?}", settings.split_mode());
        info!("  Sync: {}", settings.is_sync());
        info!("  Dry Run: {}", settings.is_dry_run());
        info!("  State Path: {}", settings.state_path().display());
        info!("=========================");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use planner::split::SplitMode;

    #[test]
    fn empty_file_yields_defaults() {
        let settings = SettingsValidator::new(false)
            .validate(&SettingsFile::default())
            .unwrap();
        assert_eq!(settings, TransportSettings::default(false));
    }

    #[test]
    fn applies_file_values() {
        let file = SettingsFile {
            parallelism: Some(4),
            max_precision: Some(60),
            split_mode: Some(SplitMode::Contiguous),
            sync: Some(false),
            dry_run: Some(true),
            state_path: Some("/var/lib/chunkflow".into()),
        };

        let settings = SettingsValidator::new(false).validate(&file).unwrap();
        assert_eq!(settings.parallelism(), 4);
        assert_eq!(settings.max_precision(), 60);
        assert_eq!(settings.split_mode(), SplitMode::Contiguous);
        assert!(!settings.is_sync());
        assert!(settings.is_dry_run());
    }

    #[test]
    fn command_line_dry_run_wins() {
        let file = SettingsFile {
            dry_run: Some(false),
            ..Default::default()
        };
        assert!(SettingsValidator::new(true).validate(&file).unwrap().is_dry_run());
    }

    #[test]
    fn collects_every_rejected_setting() {
        let file = SettingsFile {
            parallelism: Some(0),
            max_precision: Some(MAX_PRECISION + 1),
            state_path: Some("".into()),
            ..Default::default()
        };

        match SettingsValidator::new(false).validate(&file) {
            Err(SettingsError::ValidationFailed(errors)) => {
                assert_eq!(errors.len(), 3);
                assert!(errors[0].contains("parallelism"));
                assert!(errors[1].contains("max_precision"));
                assert!(errors[2].contains("state_path"));
            }
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[test]
    fn state_path_must_not_be_a_file() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let file = SettingsFile {
            state_path: Some(tmp.path().to_path_buf()),
            ..Default::default()
        };
        assert!(matches!(
            SettingsValidator::new(false).validate(&file),
            Err(SettingsError::ValidationFailed(_))
        ));
    }
}
