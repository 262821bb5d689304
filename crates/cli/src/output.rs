use crate::error::CliError;
use engine_core::progress::{ExecutionSummary, ProgressStage};
use model::{
    core::{identifiers::ExecutionId, value::RowKey},
    execution::chunk::ChunkRecord,
    pagination::id_range::IdRange,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ChunksReport {
    pub execution_id: ExecutionId,
    pub stage: ProgressStage,
    pub summary: ExecutionSummary,
    pub chunks: Vec<ChunkRecord>,
}

pub fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}

pub fn print_ranges_table(ranges: &[IdRange]) {
    println!("{:<8} {:<42} {}", "Worker", "Lower (>=)", "Upper (<)");
    println!("{}", "-".repeat(92));
    for (k, range) in ranges.iter().enumerate() {
        println!(
            "{:<8} {:<42} {}",
            k,
            range.lower.to_plain_string(),
            range.upper.to_plain_string()
        );
    }
}

pub fn print_lists_table(lists: &[Vec<RowKey>]) {
    for (k, list) in lists.iter().enumerate() {
        let rendered: Vec<String> = list.iter().map(ToString::to_string).collect();
        println!("{:<8} [{}]", k, rendered.join(", "));
    }
}

pub fn print_delimited_table(rendered: &[Option<String>]) {
    for (k, tokens) in rendered.iter().enumerate() {
        println!("{:<8} {}", k, tokens.as_deref().unwrap_or("(none)"));
    }
}

pub fn print_chunks_table(report: &ChunksReport) {
    println!("Chunks for execution '{}':", report.execution_id);
    println!("-----------------------------");
    println!(
        "{:<6} {:<8} {:>12} {:>14} {:>14} {:>14}",
        "#", "Status", "Rows", "Frontend", "Transport", "Backend"
    );
    for record in &report.chunks {
        let metrics = record.metrics.as_ref();
        println!(
            "{:<6} {:<8} {:>12} {:>14} {:>14} {:>14}",
            record.chunk_number().to_string(),
            record.status.as_str(),
            or_na(metrics.map(|m| m.row_count)),
            or_na(metrics.and_then(|m| m.frontend_bytes)),
            or_na(metrics.and_then(|m| m.transport_bytes)),
            or_na(metrics.and_then(|m| m.backend_bytes)),
        );
    }

    let summary = &report.summary;
    println!("-----------------------------");
    println!("{:<16} {}", "Stage", report.stage);
    println!(
        "{:<16} {} succeeded, {} failed, {} running",
        "Chunks", summary.chunks_succeeded, summary.chunks_failed, summary.chunks_started
    );
    println!("{:<16} {}", "Rows", summary.rows);
    println!(
        "{:<16} {} ({} unknown)",
        "Frontend bytes", summary.frontend_bytes, summary.frontend_bytes_unknown
    );
    println!("{:<16} {}", "Transport bytes", summary.transport_bytes);
    println!(
        "{:<16} {} ({} unknown)",
        "Backend bytes", summary.backend_bytes, summary.backend_bytes_unknown
    );
}

fn or_na<T: ToString>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "n/a".to_string())
}
