//! Batch driver: walks the segment table row by row, resolves each row's
//! annotation source, runs the aggregator, and merges the results into new
//! table columns only once the whole batch is done. Row-scoped failures are
//! recorded and skipped; they never abort the batch.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;

use crate::aggregate::{
    count_points_in_interval, count_spans_in_interval, sum_span_durations, summarize_series,
};
use crate::config::MetricsConfig;
use crate::error::MetricsError;
use crate::loader::{load_series, load_timeline};
use crate::table::{SegmentRef, SegmentTable};
use crate::types::{NumericSeries, SeriesSummary, Timeline};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricsPipeline {
    Articulation,
    Pitch,
}

impl MetricsPipeline {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Articulation => "articulation",
            Self::Pitch => "pitch",
        }
    }

    /// The columns this pipeline appends, in output order.
    pub fn output_columns(self) -> &'static [&'static str] {
        match self {
            Self::Articulation => &["SyllableCount", "PauseCount", "PauseDuration"],
            Self::Pitch => &["median_f0", "min_f0", "max_f0", "q1_f0", "q3_f0", "iqr_f0"],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ArticulationMetrics {
    pub syllable_count: usize,
    pub pause_count: usize,
    pub pause_duration_sec: f64,
}

#[derive(Debug, Clone, PartialEq)]
enum RowMetrics {
    Articulation(ArticulationMetrics),
    Pitch(SeriesSummary),
}

/// One skipped row: identity plus the reason, for the per-row diagnostic
/// and the machine-readable run summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowSkip {
    pub row: usize,
    pub participant: String,
    pub session: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub generated_at: String,
    pub pipeline: String,
    pub rows_total: usize,
    pub rows_processed: usize,
    pub rows_skipped: usize,
    pub skips: Vec<RowSkip>,
}

/// Accumulates per-row results over one run. Sources are cached by path so
/// the rows of one session load their file once; the table itself is only
/// touched in [`MetricsBatch::finish`].
pub struct MetricsBatch<'a> {
    config: &'a MetricsConfig,
    pipeline: MetricsPipeline,
    timelines: HashMap<PathBuf, Timeline>,
    series: HashMap<PathBuf, NumericSeries>,
    results: Vec<Option<RowMetrics>>,
    skips: Vec<RowSkip>,
}

impl<'a> MetricsBatch<'a> {
    pub fn new(config: &'a MetricsConfig, pipeline: MetricsPipeline, row_count: usize) -> Self {
        Self {
            config,
            pipeline,
            timelines: HashMap::new(),
            series: HashMap::new(),
            results: vec![None; row_count],
            skips: Vec::new(),
        }
    }

    pub fn pipeline(&self) -> MetricsPipeline {
        self.pipeline
    }

    pub fn process_row(&mut self, segment: &SegmentRef<'_>) {
        match self.evaluate_row(segment) {
            Ok(metrics) => {
                self.results[segment.index] = Some(metrics);
            }
            Err(reason) => {
                log::warn!(
                    "row {} ({} visit {}) skipped: {reason}",
                    segment.index,
                    segment.participant,
                    segment.session
                );
                self.skips.push(RowSkip {
                    row: segment.index,
                    participant: segment.participant.to_string(),
                    session: segment.session.to_string(),
                    reason,
                });
            }
        }
    }

    fn evaluate_row(&mut self, segment: &SegmentRef<'_>) -> Result<RowMetrics, String> {
        let (Some(start), Some(end)) = (segment.start, segment.end) else {
            return Err("missing or invalid start/end time".to_string());
        };

        match self.pipeline {
            MetricsPipeline::Articulation => {
                let path = self
                    .config
                    .timeline_path(segment.participant, segment.session);
                let timeline = load_cached(&mut self.timelines, &path, load_timeline)?;
                let syllable_count = count_points_in_interval(
                    timeline,
                    &self.config.syllable_layer,
                    start,
                    end,
                )
                .map_err(|err| err.to_string())?;
                let pause_count = count_spans_in_interval(
                    timeline,
                    &self.config.silence_layer,
                    &self.config.silence_label,
                    start,
                    end,
                )
                .map_err(|err| err.to_string())?;
                let pause_duration_sec = sum_span_durations(
                    timeline,
                    &self.config.silence_layer,
                    &self.config.silence_label,
                    start,
                    end,
                )
                .map_err(|err| err.to_string())?;
                Ok(RowMetrics::Articulation(ArticulationMetrics {
                    syllable_count,
                    pause_count,
                    pause_duration_sec,
                }))
            }
            MetricsPipeline::Pitch => {
                let path = self
                    .config
                    .series_path(segment.participant, segment.session);
                let series = load_cached(&mut self.series, &path, load_series)?;
                let summary =
                    summarize_series(series, start, end).map_err(|err| err.to_string())?;
                Ok(RowMetrics::Pitch(summary))
            }
        }
    }

    /// Merges the accumulated results into the table as new columns and
    /// returns the run summary. Skipped rows keep their original cells and
    /// get empty metric cells, never zeros.
    pub fn finish(self, table: &mut SegmentTable) -> Result<RunSummary, MetricsError> {
        let rows_processed = self.results.iter().filter(|result| result.is_some()).count();

        match self.pipeline {
            MetricsPipeline::Articulation => {
                let mut syllables = Vec::with_capacity(self.results.len());
                let mut pauses = Vec::with_capacity(self.results.len());
                let mut durations = Vec::with_capacity(self.results.len());
                for result in &self.results {
                    let metrics = match result {
                        Some(RowMetrics::Articulation(metrics)) => Some(metrics),
                        _ => None,
                    };
                    syllables.push(metrics.map(|m| m.syllable_count.to_string()));
                    pauses.push(metrics.map(|m| m.pause_count.to_string()));
                    durations.push(metrics.map(|m| m.pause_duration_sec.to_string()));
                }
                table.append_column("SyllableCount", syllables)?;
                table.append_column("PauseCount", pauses)?;
                table.append_column("PauseDuration", durations)?;
            }
            MetricsPipeline::Pitch => {
                let summaries: Vec<Option<&SeriesSummary>> = self
                    .results
                    .iter()
                    .map(|result| match result {
                        Some(RowMetrics::Pitch(summary)) => Some(summary),
                        _ => None,
                    })
                    .collect();
                let fields: [(&str, fn(&SeriesSummary) -> Option<f64>); 6] = [
                    ("median_f0", |s| s.median),
                    ("min_f0", |s| s.min),
                    ("max_f0", |s| s.max),
                    ("q1_f0", |s| s.q1),
                    ("q3_f0", |s| s.q3),
                    ("iqr_f0", |s| s.iqr),
                ];
                for (name, field) in fields {
                    let column = summaries
                        .iter()
                        .map(|summary| {
                            summary
                                .and_then(field)
                                .map(|value| value.to_string())
                        })
                        .collect();
                    table.append_column(name, column)?;
                }
            }
        }

        log::info!(
            "{} batch finished: {rows_processed} processed, {} skipped",
            self.pipeline.as_str(),
            self.skips.len()
        );
        Ok(RunSummary {
            generated_at: Utc::now().to_rfc3339(),
            pipeline: self.pipeline.as_str().to_string(),
            rows_total: self.results.len(),
            rows_processed,
            rows_skipped: self.skips.len(),
            skips: self.skips,
        })
    }
}

fn load_cached<'a, T>(
    cache: &'a mut HashMap<PathBuf, T>,
    path: &Path,
    load: impl FnOnce(&Path) -> Result<T, MetricsError>,
) -> Result<&'a T, String> {
    if !cache.contains_key(path) {
        let loaded = load(path).map_err(|err| err.to_string())?;
        cache.insert(path.to_path_buf(), loaded);
    }
    Ok(&cache[path])
}
