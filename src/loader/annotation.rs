use std::fs;
use std::path::Path;

use textgrid::{TextGrid, TierType};

use crate::error::MetricsError;
use crate::types::{LabeledSpan, Layer, PointMark, Timeline};

/// Loads a Praat TextGrid into a [`Timeline`]. Interval tiers become span
/// layers, point tiers become point layers; labels are trimmed but empty
/// labels are kept (silence tiers rely on them).
///
/// Parses with the textgrid crate first and falls back to a long-format
/// line parser for files the crate rejects; both failing reports both
/// messages.
pub fn load_timeline(path: &Path) -> Result<Timeline, MetricsError> {
    if !path.is_file() {
        return Err(MetricsError::source_not_found(path));
    }

    match parse_with_textgrid_crate(path) {
        Ok(timeline) => Ok(timeline),
        Err(crate_err) => {
            let contents = fs::read_to_string(path)
                .map_err(|err| MetricsError::io("reading TextGrid", err))?;
            parse_long_format(&contents).map_err(|fallback_err| {
                MetricsError::parse(
                    path,
                    format!("textgrid crate: {crate_err}; fallback parser: {fallback_err}"),
                )
            })
        }
    }
}

fn parse_with_textgrid_crate(path: &Path) -> Result<Timeline, String> {
    let grid = TextGrid::from_file(path).map_err(|err| err.to_string())?;

    let layers = grid
        .tiers
        .iter()
        .map(|tier| match tier.tier_type {
            TierType::IntervalTier => Layer::spans(
                tier.name.clone(),
                tier.intervals
                    .iter()
                    .map(|interval| LabeledSpan {
                        min_time: interval.xmin,
                        max_time: interval.xmax,
                        label: interval.text.trim().to_string(),
                    })
                    .collect(),
            ),
            TierType::PointTier => Layer::points(
                tier.name.clone(),
                tier.points
                    .iter()
                    .map(|point| PointMark {
                        time: point.time,
                        label: point.mark.trim().to_string(),
                    })
                    .collect(),
            ),
        })
        .collect();
    Ok(Timeline::new(layers))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TierClass {
    Interval,
    Point,
}

#[derive(Default)]
struct TierBuilder {
    name: Option<String>,
    class: Option<TierClass>,
    spans: Vec<LabeledSpan>,
    marks: Vec<PointMark>,
    cur_xmin: Option<f64>,
    cur_xmax: Option<f64>,
    cur_number: Option<f64>,
}

impl TierBuilder {
    fn finish(self) -> Result<Option<Layer>, String> {
        match (self.name, self.class) {
            (None, None) => Ok(None),
            (Some(name), Some(TierClass::Interval)) => Ok(Some(Layer::spans(name, self.spans))),
            (Some(name), Some(TierClass::Point)) => Ok(Some(Layer::points(name, self.marks))),
            (Some(name), None) => Err(format!("tier '{name}' has no class")),
            (None, Some(_)) => Err("tier has a class but no name".to_string()),
        }
    }
}

/// Line parser for the Praat long TextGrid format, covering both
/// IntervalTier and TextTier (point) items. The tier-header xmin/xmax lines
/// are harmless here: each interval re-sets both before its `text` line, so
/// pairing the most recent values at `text` time is exact.
pub(crate) fn parse_long_format(contents: &str) -> Result<Timeline, String> {
    let mut layers = Vec::new();
    let mut current: Option<TierBuilder> = None;

    for raw_line in contents.lines() {
        let line = raw_line.trim();

        if line.starts_with("item [") {
            if let Some(builder) = current.take() {
                if let Some(layer) = builder.finish()? {
                    layers.push(layer);
                }
            }
            current = Some(TierBuilder::default());
            continue;
        }

        let Some(builder) = current.as_mut() else {
            continue;
        };

        if let Some(value) = assignment_value(line, "class") {
            let class = strip_quotes(value);
            builder.class = if class.eq_ignore_ascii_case("IntervalTier") {
                Some(TierClass::Interval)
            } else if class.eq_ignore_ascii_case("TextTier")
                || class.eq_ignore_ascii_case("PointTier")
            {
                Some(TierClass::Point)
            } else {
                return Err(format!("unsupported tier class {class:?}"));
            };
            continue;
        }

        if let Some(value) = assignment_value(line, "name") {
            builder.name = Some(strip_quotes(value).to_string());
            continue;
        }

        match builder.class {
            Some(TierClass::Interval) => {
                if let Some(value) = assignment_value(line, "xmin") {
                    builder.cur_xmin = Some(parse_time(value)?);
                } else if let Some(value) = assignment_value(line, "xmax") {
                    builder.cur_xmax = Some(parse_time(value)?);
                } else if let Some(value) = assignment_value(line, "text") {
                    let min_time = builder.cur_xmin.ok_or("text line without xmin")?;
                    let max_time = builder.cur_xmax.ok_or("text line without xmax")?;
                    builder.spans.push(LabeledSpan {
                        min_time,
                        max_time,
                        label: strip_quotes(value).trim().to_string(),
                    });
                    builder.cur_xmin = None;
                    builder.cur_xmax = None;
                }
            }
            Some(TierClass::Point) => {
                if let Some(value) = assignment_value(line, "number") {
                    builder.cur_number = Some(parse_time(value)?);
                } else if let Some(value) = assignment_value(line, "mark") {
                    let time = builder.cur_number.take().ok_or("mark line without number")?;
                    builder.marks.push(PointMark {
                        time,
                        label: strip_quotes(value).trim().to_string(),
                    });
                }
            }
            None => {}
        }
    }

    if let Some(builder) = current.take() {
        if let Some(layer) = builder.finish()? {
            layers.push(layer);
        }
    }

    if layers.is_empty() {
        return Err("no tiers found (not a long-format TextGrid?)".to_string());
    }
    Ok(Timeline::new(layers))
}

fn assignment_value<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let (lhs, rhs) = line.split_once('=')?;
    if lhs.trim() == key {
        Some(rhs.trim())
    } else {
        None
    }
}

fn strip_quotes(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(value)
}

fn parse_time(value: &str) -> Result<f64, String> {
    let time: f64 = value
        .parse()
        .map_err(|_| format!("invalid timestamp {value:?}"))?;
    if !time.is_finite() {
        return Err(format!("non-finite timestamp {value:?}"));
    }
    Ok(time)
}
