use std::fs;
use std::path::Path;

use crate::error::MetricsError;
use crate::types::{NumericSeries, Sample};

/// Loads a pitch listing (optional header line, then whitespace- or
/// tab-separated `time value` rows) into a [`NumericSeries`].
///
/// Malformed-row policy: a value field that does not parse as a finite
/// number is kept as an undefined sample (Praat writes `--undefined--` for
/// unvoiced frames), while a data row whose time field does not parse fails
/// the whole file.
pub fn load_series(path: &Path) -> Result<NumericSeries, MetricsError> {
    if !path.is_file() {
        return Err(MetricsError::source_not_found(path));
    }
    let contents =
        fs::read_to_string(path).map_err(|err| MetricsError::io("reading pitch track", err))?;
    parse_series(&contents).map_err(|message| MetricsError::parse(path, message))
}

pub(crate) fn parse_series(contents: &str) -> Result<NumericSeries, String> {
    let mut samples = Vec::new();
    let mut saw_data = false;

    for (line_index, raw_line) in contents.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        let mut fields = line.split_whitespace();
        let time_field = fields.next().unwrap_or_default();
        let value_field = fields
            .next()
            .ok_or_else(|| format!("line {}: expected two columns", line_index + 1))?;

        let time: f64 = match time_field.parse() {
            Ok(time) => time,
            // The first line may be a "time f0" header.
            Err(_) if !saw_data && line_index == 0 => continue,
            Err(_) => {
                return Err(format!(
                    "line {}: invalid time {time_field:?}",
                    line_index + 1
                ))
            }
        };
        if !time.is_finite() {
            return Err(format!(
                "line {}: non-finite time {time_field:?}",
                line_index + 1
            ));
        }

        let value = value_field
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite());
        samples.push(Sample { time, value });
        saw_data = true;
    }

    Ok(NumericSeries::new(samples))
}

#[cfg(test)]
mod tests {
    use super::{load_series, parse_series};
    use crate::error::MetricsError;
    use std::path::Path;

    #[test]
    fn parses_header_and_tab_separated_rows() {
        let series = parse_series("time\tf0\n0.01\t210.5\n0.02\t212.0\n").unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.samples()[0].value, Some(210.5));
        assert!((series.samples()[1].time - 0.02).abs() < 1e-12);
    }

    #[test]
    fn undefined_values_become_undefined_samples() {
        let series = parse_series("time f0\n0.01 210.5\n0.02 --undefined--\n0.03 215.0\n").unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.samples()[1].value, None);
        assert_eq!(series.samples()[2].value, Some(215.0));
    }

    #[test]
    fn headerless_input_is_accepted() {
        let series = parse_series("0.01 210.5\n0.02 211.0\n").unwrap();
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn invalid_time_fails_the_file() {
        assert!(parse_series("0.01 210.5\nbogus 211.0\n").is_err());
    }

    #[test]
    fn single_column_row_fails_the_file() {
        assert!(parse_series("0.01 210.5\n0.02\n").is_err());
    }

    #[test]
    fn blank_lines_are_skipped() {
        let series = parse_series("time f0\n\n0.01 210.5\n\n").unwrap();
        assert_eq!(series.len(), 1);
    }

    #[test]
    fn missing_file_is_source_not_found() {
        let err = load_series(Path::new("does/not/exist_f0.txt")).unwrap_err();
        assert!(matches!(err, MetricsError::SourceNotFound { .. }));
    }
}
