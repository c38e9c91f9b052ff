pub mod aggregate;
pub mod config;
pub mod driver;
pub mod error;
pub mod loader;
pub mod table;
pub mod types;

pub use aggregate::{
    count_points_in_interval, count_spans_in_interval, sum_span_durations, summarize_series,
};
pub use config::{MetricsConfig, TableColumns};
pub use driver::{ArticulationMetrics, MetricsBatch, MetricsPipeline, RowSkip, RunSummary};
pub use error::MetricsError;
pub use loader::{load_series, load_timeline};
pub use table::{SegmentRef, SegmentTable};
pub use types::{
    LabeledSpan, Layer, LayerKind, NumericSeries, PointLayer, PointMark, QueryInterval, Sample,
    SeriesSummary, SpanLayer, Timeline,
};
