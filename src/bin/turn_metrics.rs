use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use turn_metrics_rs::{MetricsBatch, MetricsConfig, MetricsPipeline, RunSummary, SegmentTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PipelineChoice {
    Articulation,
    Pitch,
}

impl PipelineChoice {
    fn pipeline(self) -> MetricsPipeline {
        match self {
            Self::Articulation => MetricsPipeline::Articulation,
            Self::Pitch => MetricsPipeline::Pitch,
        }
    }

    fn output_suffix(self) -> &'static str {
        match self {
            Self::Articulation => "_articulation",
            Self::Pitch => "_f0",
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "turn_metrics")]
#[command(about = "Compute per-segment articulation and F0 metrics over a turn-taking table")]
struct Args {
    /// Segment table CSV (one row per conversational turn).
    #[arg(long, env = "TURN_METRICS_TABLE", default_value = "data/TurnTakingData.csv")]
    table: PathBuf,
    /// Directory holding <Participant>_Visit_<Visit>.TextGrid files.
    #[arg(long, env = "TURN_METRICS_TIMELINE_DIR", default_value = "data/textgrid")]
    timeline_dir: PathBuf,
    /// Directory holding <Participant>_Visit_<Visit>_f0.txt files.
    #[arg(long, env = "TURN_METRICS_SERIES_DIR", default_value = "data/f0_extracted")]
    series_dir: PathBuf,
    #[arg(long, env = "TURN_METRICS_PIPELINE", value_enum)]
    pipeline: PipelineChoice,
    /// Output CSV; defaults to the table name with a pipeline suffix under outputs/.
    #[arg(long, env = "TURN_METRICS_OUT")]
    out: Option<PathBuf>,
    /// Optional JSON run-summary artifact (rows processed/skipped, skip reasons).
    #[arg(long, env = "TURN_METRICS_SUMMARY_OUT")]
    summary_out: Option<PathBuf>,
    #[arg(long, env = "TURN_METRICS_LIMIT")]
    limit: Option<usize>,
    #[arg(long, env = "TURN_METRICS_OFFSET", default_value_t = 0)]
    offset: usize,
}

fn main() {
    if run().is_err() {
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    env_logger::init();
    let args = Args::parse();

    let config = MetricsConfig::new(args.timeline_dir.clone(), args.series_dir.clone());
    let out_path = args
        .out
        .clone()
        .unwrap_or_else(|| default_out_path(&args.table, args.pipeline.output_suffix()));

    let mut table = SegmentTable::read(&args.table)
        .map_err(|err| report(format!("Failed to read segment table: {err}")))?;
    if table.is_empty() {
        return Err(report(format!(
            "Segment table '{}' has no rows.",
            args.table.display()
        )));
    }

    let last_row = match args.limit {
        Some(limit) => table.len().min(args.offset.saturating_add(limit)),
        None => table.len(),
    };
    let selected = last_row.saturating_sub(args.offset);
    if selected == 0 {
        return Err(report(
            "No rows selected after applying --offset/--limit.".to_string(),
        ));
    }

    let progress = ProgressBar::new(selected as u64);
    progress.set_style(
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta}) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-"),
    );
    progress.set_message("starting...");

    let mut batch = MetricsBatch::new(&config, args.pipeline.pipeline(), table.len());
    for index in args.offset..last_row {
        let segment = table
            .segment(index, &config.columns)
            .map_err(|err| report(format!("Failed to read segment row {index}: {err}")))?;
        progress.set_message(format!(
            "{} visit {}",
            segment.participant, segment.session
        ));
        batch.process_row(&segment);
        progress.inc(1);
    }
    progress.finish_with_message("done");

    let summary = batch
        .finish(&mut table)
        .map_err(|err| report(format!("Failed to merge metric columns: {err}")))?;

    if let Some(parent) = out_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|err| {
                report(format!(
                    "Failed to create output directory '{}': {err}",
                    parent.display()
                ))
            })?;
        }
    }
    table
        .write(&out_path)
        .map_err(|err| report(format!("Failed to write output table: {err}")))?;

    if let Some(summary_path) = args.summary_out.as_ref() {
        write_summary(summary_path, &summary)?;
    }

    println!(
        "Wrote '{}': {} rows, {} processed, {} skipped.",
        out_path.display(),
        summary.rows_total,
        summary.rows_processed,
        summary.rows_skipped
    );
    for skip in &summary.skips {
        println!(
            "  skipped row {} ({} visit {}): {}",
            skip.row, skip.participant, skip.session, skip.reason
        );
    }
    Ok(())
}

fn write_summary(path: &Path, summary: &RunSummary) -> Result<(), String> {
    let json = serde_json::to_string_pretty(summary)
        .map_err(|err| report(format!("Failed to serialize run summary: {err}")))?;
    fs::write(path, json).map_err(|err| {
        report(format!(
            "Failed to write run summary '{}': {err}",
            path.display()
        ))
    })
}

fn default_out_path(table: &Path, suffix: &str) -> PathBuf {
    let stem = table
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("metrics");
    Path::new("outputs").join(format!("{stem}{suffix}.csv"))
}

fn report(message: String) -> String {
    eprintln!("{message}");
    message
}
