use std::collections::HashMap;

use serde::Serialize;

use crate::error::MetricsError;

/// A single annotation event on the time axis. The label may be empty;
/// syllable nuclei produced by the upstream annotation tool usually are.
#[derive(Debug, Clone, PartialEq)]
pub struct PointMark {
    pub time: f64,
    pub label: String,
}

/// A labeled stretch of time with `min_time <= max_time`. Spans within one
/// layer are assumed non-overlapping, as produced by the annotation tool.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledSpan {
    pub min_time: f64,
    pub max_time: f64,
    pub label: String,
}

impl LabeledSpan {
    pub fn duration(&self) -> f64 {
        self.max_time - self.min_time
    }
}

/// Ordered point events. Sortedness is checked once at construction and
/// cached; lookups may only early-terminate when the check passed.
#[derive(Debug, Clone, PartialEq)]
pub struct PointLayer {
    marks: Vec<PointMark>,
    sorted: bool,
}

impl PointLayer {
    pub fn new(marks: Vec<PointMark>) -> Self {
        let sorted = marks.windows(2).all(|pair| pair[0].time <= pair[1].time);
        Self { marks, sorted }
    }

    pub fn marks(&self) -> &[PointMark] {
        &self.marks
    }

    pub fn is_sorted(&self) -> bool {
        self.sorted
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpanLayer {
    spans: Vec<LabeledSpan>,
}

impl SpanLayer {
    pub fn new(spans: Vec<LabeledSpan>) -> Self {
        Self { spans }
    }

    pub fn spans(&self) -> &[LabeledSpan] {
        &self.spans
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LayerKind {
    Points(PointLayer),
    Spans(SpanLayer),
}

impl LayerKind {
    pub(crate) fn describe(&self) -> &'static str {
        match self {
            Self::Points(_) => "points",
            Self::Spans(_) => "labeled spans",
        }
    }
}

/// One named annotation stream within a [`Timeline`].
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub name: String,
    pub kind: LayerKind,
}

impl Layer {
    pub fn points(name: impl Into<String>, marks: Vec<PointMark>) -> Self {
        Self {
            name: name.into(),
            kind: LayerKind::Points(PointLayer::new(marks)),
        }
    }

    pub fn spans(name: impl Into<String>, spans: Vec<LabeledSpan>) -> Self {
        Self {
            name: name.into(),
            kind: LayerKind::Spans(SpanLayer::new(spans)),
        }
    }
}

/// Immutable container of named annotation layers on a shared time axis.
///
/// Layers keep their file order; lookup by name resolves to the first layer
/// carrying that name, matching how the annotation files are addressed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Timeline {
    layers: Vec<Layer>,
    by_name: HashMap<String, usize>,
}

impl Timeline {
    pub fn new(layers: Vec<Layer>) -> Self {
        let mut by_name = HashMap::with_capacity(layers.len());
        for (index, layer) in layers.iter().enumerate() {
            by_name.entry(layer.name.clone()).or_insert(index);
        }
        Self { layers, by_name }
    }

    pub fn layer(&self, name: &str) -> Option<&Layer> {
        self.by_name.get(name).map(|&index| &self.layers[index])
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }
}

/// One sample of a numeric series. `value: None` marks an undefined sample
/// (an unvoiced pitch frame); undefined samples are excluded from statistics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub time: f64,
    pub value: Option<f64>,
}

/// A sampled numeric series with non-decreasing (but not necessarily
/// strictly increasing or evenly spaced) timestamps.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NumericSeries {
    samples: Vec<Sample>,
}

impl NumericSeries {
    pub fn new(samples: Vec<Sample>) -> Self {
        Self { samples }
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// The closed `[start, end]` segment over which metrics are aggregated.
///
/// Construction rejects reversed or non-finite bounds; bounds are never
/// silently swapped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryInterval {
    start: f64,
    end: f64,
}

impl QueryInterval {
    pub fn new(start: f64, end: f64) -> Result<Self, MetricsError> {
        if !start.is_finite() || !end.is_finite() || start > end {
            return Err(MetricsError::invalid_interval(start, end));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    /// Closed-bound membership: `start <= time <= end`.
    pub fn contains(&self, time: f64) -> bool {
        self.start <= time && time <= self.end
    }

    /// Full containment: `[min_time, max_time]` lies entirely within the
    /// interval. A span that merely overlaps a boundary is not enclosed.
    pub fn encloses(&self, min_time: f64, max_time: f64) -> bool {
        min_time >= self.start && max_time <= self.end
    }
}

/// Distributional summary of a numeric series restricted to an interval.
///
/// All six fields `None` is the distinguished no-data result for an empty
/// filtered set; it is persisted as empty cells, never as zeros.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SeriesSummary {
    pub median: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub q1: Option<f64>,
    pub q3: Option<f64>,
    pub iqr: Option<f64>,
}

impl SeriesSummary {
    pub fn no_data() -> Self {
        Self::default()
    }

    pub fn has_data(&self) -> bool {
        self.median.is_some()
    }
}
