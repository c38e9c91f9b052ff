use std::fs;
use std::path::Path;

use tempfile::TempDir;
use turn_metrics_rs::{MetricsBatch, MetricsConfig, MetricsPipeline, SegmentTable};

const TEXTGRID: &str = r#"File type = "ooTextFile"
Object class = "TextGrid"

xmin = 0
xmax = 5
tiers? <exists>
size = 2
item []:
    item [1]:
        class = "IntervalTier"
        name = "silences"
        xmin = 0
        xmax = 5
        intervals: size = 3
        intervals [1]:
            xmin = 0
            xmax = 2
            text = "silent"
        intervals [2]:
            xmin = 2
            xmax = 3
            text = "sounding"
        intervals [3]:
            xmin = 3
            xmax = 5
            text = "silent"
    item [2]:
        class = "TextTier"
        name = "syllables"
        xmin = 0
        xmax = 5
        points: size = 4
        points [1]:
            number = 0.5
            mark = ""
        points [2]:
            number = 1.5
            mark = ""
        points [3]:
            number = 2.5
            mark = ""
        points [4]:
            number = 3.5
            mark = ""
"#;

const PITCH_TRACK: &str = "time\tf0\n0.0\t10\n1.0\t20\n1.5\t--undefined--\n2.0\t30\n3.0\t40\n";

fn write_fixtures(dir: &Path, table_csv: &str) -> MetricsConfig {
    let timeline_dir = dir.join("textgrid");
    let series_dir = dir.join("f0");
    fs::create_dir_all(&timeline_dir).unwrap();
    fs::create_dir_all(&series_dir).unwrap();
    fs::write(timeline_dir.join("CHI01_Visit_1.TextGrid"), TEXTGRID).unwrap();
    fs::write(series_dir.join("CHI01_Visit_1_f0.txt"), PITCH_TRACK).unwrap();
    fs::write(dir.join("segments.csv"), table_csv).unwrap();
    MetricsConfig::new(timeline_dir, series_dir)
}

fn run_batch(
    dir: &Path,
    config: &MetricsConfig,
    pipeline: MetricsPipeline,
) -> (SegmentTable, turn_metrics_rs::RunSummary) {
    let mut table = SegmentTable::read(&dir.join("segments.csv")).unwrap();
    let mut batch = MetricsBatch::new(config, pipeline, table.len());
    for index in 0..table.len() {
        let segment = table.segment(index, &config.columns).unwrap();
        batch.process_row(&segment);
    }
    let summary = batch.finish(&mut table).unwrap();
    (table, summary)
}

fn cell<'a>(table: &'a SegmentTable, row: usize, column: &str) -> &'a str {
    let index = table
        .column_index(column)
        .unwrap_or_else(|| panic!("missing column {column}"));
    table.cell(row, index).unwrap()
}

#[test]
fn articulation_batch_appends_counts_and_skips_bad_rows() {
    let dir = TempDir::new().unwrap();
    let config = write_fixtures(
        dir.path(),
        "Participant,Visit,StartTimeSec,EndTimeSec\n\
CHI01,1,0.0,5.0\n\
CHI01,1,1.0,5.0\n\
CHI01,1,,5.0\n\
CHI02,2,0.0,5.0\n",
    );

    let (table, summary) = run_batch(dir.path(), &config, MetricsPipeline::Articulation);

    assert_eq!(summary.rows_total, 4);
    assert_eq!(summary.rows_processed, 2);
    assert_eq!(summary.rows_skipped, 2);

    for column in MetricsPipeline::Articulation.output_columns() {
        assert!(table.column_index(column).is_some(), "missing {column}");
    }

    assert_eq!(cell(&table, 0, "SyllableCount"), "4");
    assert_eq!(cell(&table, 0, "PauseCount"), "2");
    assert_eq!(cell(&table, 0, "PauseDuration"), "4");

    // [1, 5] drops the syllable at 0.5 and the silent span starting at 0.
    assert_eq!(cell(&table, 1, "SyllableCount"), "3");
    assert_eq!(cell(&table, 1, "PauseCount"), "1");
    assert_eq!(cell(&table, 1, "PauseDuration"), "2");

    // Skipped rows keep original cells and carry no metric values.
    assert_eq!(cell(&table, 2, "SyllableCount"), "");
    assert_eq!(cell(&table, 2, "EndTimeSec"), "5.0");
    assert_eq!(cell(&table, 3, "PauseDuration"), "");

    assert_eq!(summary.skips[0].row, 2);
    assert!(summary.skips[0].reason.contains("start/end"));
    assert_eq!(summary.skips[1].row, 3);
    assert_eq!(summary.skips[1].participant, "CHI02");
    assert!(summary.skips[1].reason.contains("not found"));
}

#[test]
fn pitch_batch_summarizes_and_marks_no_data_rows_empty() {
    let dir = TempDir::new().unwrap();
    let config = write_fixtures(
        dir.path(),
        "Participant,Visit,StartTimeSec,EndTimeSec\n\
CHI01,1,1.0,3.0\n\
CHI01,1,6.0,7.0\n",
    );

    let (table, summary) = run_batch(dir.path(), &config, MetricsPipeline::Pitch);

    assert_eq!(summary.rows_processed, 2);
    assert_eq!(summary.rows_skipped, 0);

    // Window [1, 3] sees {20, 30, 40}; the undefined frame at 1.5 is excluded.
    assert_eq!(cell(&table, 0, "median_f0"), "30");
    assert_eq!(cell(&table, 0, "min_f0"), "20");
    assert_eq!(cell(&table, 0, "max_f0"), "40");
    assert_eq!(cell(&table, 0, "q1_f0"), "25");
    assert_eq!(cell(&table, 0, "q3_f0"), "35");
    assert_eq!(cell(&table, 0, "iqr_f0"), "10");

    // No samples in [6, 7]: processed, but every statistic is an empty cell.
    for column in ["median_f0", "min_f0", "max_f0", "q1_f0", "q3_f0", "iqr_f0"] {
        assert_eq!(cell(&table, 1, column), "");
    }
}

#[test]
fn reversed_segment_bounds_skip_the_row_without_aborting() {
    let dir = TempDir::new().unwrap();
    let config = write_fixtures(
        dir.path(),
        "Participant,Visit,StartTimeSec,EndTimeSec\n\
CHI01,1,5.0,1.0\n\
CHI01,1,0.0,5.0\n",
    );

    let (table, summary) = run_batch(dir.path(), &config, MetricsPipeline::Articulation);

    assert_eq!(summary.rows_processed, 1);
    assert_eq!(summary.rows_skipped, 1);
    assert!(summary.skips[0].reason.contains("invalid query interval"));
    assert_eq!(cell(&table, 0, "SyllableCount"), "");
    assert_eq!(cell(&table, 1, "SyllableCount"), "4");
}

#[test]
fn augmented_table_round_trips_through_csv() {
    let dir = TempDir::new().unwrap();
    let config = write_fixtures(
        dir.path(),
        "Participant,Visit,StartTimeSec,EndTimeSec\nCHI01,1,0.0,5.0\n",
    );

    let (table, _) = run_batch(dir.path(), &config, MetricsPipeline::Articulation);
    let out_path = dir.path().join("out.csv");
    table.write(&out_path).unwrap();

    let reread = SegmentTable::read(&out_path).unwrap();
    assert_eq!(reread.len(), 1);
    assert_eq!(cell(&reread, 0, "Participant"), "CHI01");
    assert_eq!(cell(&reread, 0, "SyllableCount"), "4");
    assert_eq!(cell(&reread, 0, "PauseDuration"), "4");
}

#[test]
fn run_summary_serializes_for_the_sidecar_artifact() {
    let dir = TempDir::new().unwrap();
    let config = write_fixtures(
        dir.path(),
        "Participant,Visit,StartTimeSec,EndTimeSec\nCHI01,1,,\n",
    );

    let (_, summary) = run_batch(dir.path(), &config, MetricsPipeline::Pitch);
    let json = serde_json::to_string(&summary).unwrap();
    assert!(json.contains("\"rows_skipped\":1"));
    assert!(json.contains("\"pipeline\":\"pitch\""));
}
