use crate::{
    error::CliError,
    output::{
        ChunksReport, print_chunks_table, print_delimited_table, print_json, print_lists_table,
        print_ranges_table,
    },
};
use clap::Parser;
use commands::{Commands, ListMode};
use engine_config::settings::{SettingsFile, SettingsValidator, TransportSettings};
use engine_core::{
    progress::ProgressService,
    state::{ChunkRepository, sled_store::SledChunkRepository},
};
use model::core::{identifiers::ExecutionId, value::RowKey};
use planner::split::range::parse_bound;
use std::{path::PathBuf, str::FromStr, sync::Arc};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod commands;
mod error;
mod output;

#[derive(Parser)]
#[command(
    name = "chunkflow",
    version = "0.1.0",
    about = "Chunked transport planning and inspection"
)]
struct Cli {
    #[arg(long, global = true, help = "Settings file path (JSON)")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    // Logs go to stderr so JSON output stays clean
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut file = match &cli.config {
        Some(path) => SettingsFile::load(path)?,
        None => SettingsFile::default(),
    };

    match cli.command {
        Commands::SplitRange {
            min,
            max,
            parallelism,
            precision,
            json,
        } => {
            file.parallelism = parallelism.or(file.parallelism);
            file.max_precision = precision.or(file.max_precision);
            let settings = validate(&file)?;

            let id_min = parse_bound(&min)?;
            let id_max = parse_bound(&max)?;
            if id_min > id_max {
                return Err(CliError::InvalidArgument(format!(
                    "--min {min} is greater than --max {max}"
                )));
            }

            let ranges = settings
                .range_splitter()?
                .split(&id_min, &id_max, settings.parallelism());

            if json {
                print_json(&ranges)?;
            } else {
                print_ranges_table(&ranges);
            }
        }
        Commands::SplitList {
            items,
            parallelism,
            mode,
            delimited,
            json,
        } => {
            apply_list_overrides(&mut file, parallelism, mode);
            let settings = validate(&file)?;

            let keys: Vec<RowKey> = items
                .iter()
                .filter(|token| !token.trim().is_empty())
                .map(|token| RowKey::parse_token(token))
                .collect();
            info!(
                keys = keys.len(),
                parallelism = settings.parallelism(),
                mode = ?settings.split_mode(),
                "Splitting row keys"
            );

            if delimited {
                let rendered = settings.split_list_delimited(&keys);
                if json {
                    print_json(&rendered)?;
                } else {
                    print_delimited_table(&rendered);
                }
            } else {
                let lists = settings.split_list(&keys);
                if json {
                    print_json(&lists)?;
                } else {
                    print_lists_table(&lists);
                }
            }
        }
        Commands::Chunks { execution, json } => {
            let settings = validate(&file)?;
            show_chunks(&settings, &execution, json).await?;
        }
    }

    Ok(())
}

/// Command-line values win over the settings file.
fn apply_list_overrides(
    file: &mut SettingsFile,
    parallelism: Option<usize>,
    mode: Option<ListMode>,
) {
    file.parallelism = parallelism.or(file.parallelism);
    if let Some(mode) = mode {
        file.split_mode = Some(mode.into());
    }
}

fn validate(file: &SettingsFile) -> Result<TransportSettings, CliError> {
    Ok(SettingsValidator::new(false).validate(file)?)
}

fn open_chunk_repository(
    settings: &TransportSettings,
) -> Result<Arc<dyn ChunkRepository>, CliError> {
    let path = settings.state_path();
    let repo = SledChunkRepository::open(path).map_err(|err| CliError::StateStore {
        path: path.display().to_string(),
        reason: err.to_string(),
    })?;
    Ok(Arc::new(repo))
}

async fn show_chunks(
    settings: &TransportSettings,
    execution: &str,
    as_json: bool,
) -> Result<(), CliError> {
    let execution_id =
        ExecutionId::from_str(execution).map_err(|err| CliError::InvalidExecutionId {
            value: execution.to_string(),
            reason: err.to_string(),
        })?;

    let repo = open_chunk_repository(settings)?;
    let summary = ProgressService::new(repo.clone())
        .execution_summary(&execution_id)
        .await?;
    let chunks = repo.list_chunks(&execution_id).await?;
    let report = ChunksReport {
        execution_id,
        stage: summary.stage(),
        summary,
        chunks,
    };

    if as_json {
        print_json(&report)
    } else {
        print_chunks_table(&report);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use planner::split::SplitMode;

    #[test]
    fn mode_flag_overrides_a_contiguous_settings_file() {
        let cli = Cli::try_parse_from([
            "chunkflow",
            "split-list",
            "--items",
            "8,4,1,3",
            "--mode",
            "round-robin",
        ])
        .unwrap();
        let Commands::SplitList {
            parallelism, mode, ..
        } = cli.command
        else {
            panic!("expected split-list");
        };
        assert_eq!(mode, Some(ListMode::RoundRobin));

        let mut file =
            SettingsFile::from_json(r#"{ "parallelism": 2, "split_mode": "contiguous" }"#).unwrap();
        apply_list_overrides(&mut file, parallelism, mode);
        let settings = validate(&file).unwrap();
        assert_eq!(settings.split_mode(), SplitMode::RoundRobin);
        assert_eq!(settings.parallelism(), 2);
    }

    #[test]
    fn settings_file_mode_applies_without_a_flag() {
        let mut file = SettingsFile::from_json(r#"{ "split_mode": "contiguous" }"#).unwrap();
        apply_list_overrides(&mut file, Some(3), None);
        let settings = validate(&file).unwrap();
        assert_eq!(settings.split_mode(), SplitMode::Contiguous);
        assert_eq!(settings.parallelism(), 3);

        let parsed = Cli::try_parse_from([
            "chunkflow",
            "split-list",
            "--items",
            "a",
            "--mode",
            "contiguous",
        ])
        .unwrap();
        assert!(matches!(
            parsed.command,
            Commands::SplitList {
                mode: Some(ListMode::Contiguous),
                ..
            }
        ));
    }
}
