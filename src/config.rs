use std::path::{Path, PathBuf};

/// Names of the segment-table columns the driver reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableColumns {
    pub participant: String,
    pub session: String,
    pub start: String,
    pub end: String,
}

impl Default for TableColumns {
    fn default() -> Self {
        Self {
            participant: "Participant".to_string(),
            session: "Visit".to_string(),
            start: "StartTimeSec".to_string(),
            end: "EndTimeSec".to_string(),
        }
    }
}

/// Batch configuration: where annotation sources live and which layers
/// carry the articulation annotations.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsConfig {
    pub timeline_dir: PathBuf,
    pub series_dir: PathBuf,
    pub syllable_layer: String,
    pub silence_layer: String,
    pub silence_label: String,
    pub columns: TableColumns,
}

impl MetricsConfig {
    pub const DEFAULT_SYLLABLE_LAYER: &'static str = "syllables";
    pub const DEFAULT_SILENCE_LAYER: &'static str = "silences";
    pub const DEFAULT_SILENCE_LABEL: &'static str = "silent";

    pub fn new(timeline_dir: impl Into<PathBuf>, series_dir: impl Into<PathBuf>) -> Self {
        Self {
            timeline_dir: timeline_dir.into(),
            series_dir: series_dir.into(),
            ..Self::default()
        }
    }

    /// `<timeline_dir>/<participant>_Visit_<session>.TextGrid`, the layout
    /// the annotation export produces.
    pub fn timeline_path(&self, participant: &str, session: &str) -> PathBuf {
        self.timeline_dir
            .join(format!("{participant}_Visit_{session}.TextGrid"))
    }

    /// `<series_dir>/<participant>_Visit_<session>_f0.txt`.
    pub fn series_path(&self, participant: &str, session: &str) -> PathBuf {
        self.series_dir
            .join(format!("{participant}_Visit_{session}_f0.txt"))
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            timeline_dir: Path::new("data/textgrid").to_path_buf(),
            series_dir: Path::new("data/f0_extracted").to_path_buf(),
            syllable_layer: Self::DEFAULT_SYLLABLE_LAYER.to_string(),
            silence_layer: Self::DEFAULT_SILENCE_LAYER.to_string(),
            silence_label: Self::DEFAULT_SILENCE_LABEL.to_string(),
            columns: TableColumns::default(),
        }
    }
}
