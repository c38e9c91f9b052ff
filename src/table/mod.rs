//! The segment table: one row per conversational turn, read from CSV,
//! augmented with metric columns, written back once at the end of a batch.
//! Original columns pass through untouched, whatever they contain.

use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};

use crate::config::TableColumns;
use crate::error::MetricsError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// Borrowed view of one row's segment fields. A missing or unparsable
/// bound is `None`; the driver skips such rows entirely.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentRef<'a> {
    pub index: usize,
    pub participant: &'a str,
    pub session: &'a str,
    pub start: Option<f64>,
    pub end: Option<f64>,
}

impl SegmentTable {
    pub fn read(path: &Path) -> Result<Self, MetricsError> {
        if !path.is_file() {
            return Err(MetricsError::source_not_found(path));
        }
        let mut reader = ReaderBuilder::new()
            .from_path(path)
            .map_err(|err| MetricsError::csv("opening segment table", err))?;
        let headers = reader
            .headers()
            .map_err(|err| MetricsError::csv("reading segment table header", err))?
            .iter()
            .map(str::to_string)
            .collect();
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|err| MetricsError::csv("reading segment row", err))?;
            rows.push(record.iter().map(str::to_string).collect());
        }
        Ok(Self { headers, rows })
    }

    pub fn write(&self, path: &Path) -> Result<(), MetricsError> {
        let mut writer = WriterBuilder::new()
            .from_path(path)
            .map_err(|err| MetricsError::csv("creating output table", err))?;
        writer
            .write_record(&self.headers)
            .map_err(|err| MetricsError::csv("writing output header", err))?;
        for row in &self.rows {
            writer
                .write_record(row)
                .map_err(|err| MetricsError::csv("writing output row", err))?;
        }
        writer
            .flush()
            .map_err(|err| MetricsError::io("flushing output table", err))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows.get(row)?.get(column).map(String::as_str)
    }

    /// Appends one column; `None` cells stay empty. Colliding with an
    /// existing column is an error.
    pub fn append_column(
        &mut self,
        name: &str,
        values: Vec<Option<String>>,
    ) -> Result<(), MetricsError> {
        if self.column_index(name).is_some() {
            return Err(MetricsError::table(
                "appending metric column",
                format!("column '{name}' already exists"),
            ));
        }
        if values.len() != self.rows.len() {
            return Err(MetricsError::table(
                "appending metric column",
                format!(
                    "column '{name}' has {} values for {} rows",
                    values.len(),
                    self.rows.len()
                ),
            ));
        }
        self.headers.push(name.to_string());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value.unwrap_or_default());
        }
        Ok(())
    }

    /// Extracts the segment fields of one row. A configured column missing
    /// from the header is fatal; a blank or unparsable bound cell is not,
    /// it yields `None` and the row gets skipped downstream.
    pub fn segment(
        &self,
        index: usize,
        columns: &TableColumns,
    ) -> Result<SegmentRef<'_>, MetricsError> {
        let participant_col = self.require_column(&columns.participant)?;
        let session_col = self.require_column(&columns.session)?;
        let start_col = self.require_column(&columns.start)?;
        let end_col = self.require_column(&columns.end)?;

        if index >= self.rows.len() {
            return Err(MetricsError::table(
                "reading segment row",
                format!("row {index} out of range ({} rows)", self.rows.len()),
            ));
        }

        Ok(SegmentRef {
            index,
            participant: self.cell(index, participant_col).unwrap_or_default(),
            session: self.cell(index, session_col).unwrap_or_default(),
            start: self.cell(index, start_col).and_then(parse_bound),
            end: self.cell(index, end_col).and_then(parse_bound),
        })
    }

    fn require_column(&self, name: &str) -> Result<usize, MetricsError> {
        self.column_index(name).ok_or_else(|| {
            MetricsError::table(
                "resolving segment columns",
                format!("table has no column '{name}'"),
            )
        })
    }
}

fn parse_bound(cell: &str) -> Option<f64> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|value| value.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write csv");
        file
    }

    const TABLE: &str = "Participant,Visit,StartTimeSec,EndTimeSec,Speaker\n\
CHI01,1,0.5,4.5,child\n\
CHI01,1,,6.0,adult\n\
CHI02,2,oops,3.0,child\n";

    #[test]
    fn reads_headers_and_rows() {
        let file = write_csv(TABLE);
        let table = SegmentTable::read(file.path()).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.headers().len(), 5);
        assert_eq!(table.cell(0, 0), Some("CHI01"));
        assert_eq!(table.cell(2, 4), Some("child"));
    }

    #[test]
    fn segment_parses_bounds_and_flags_missing_ones() {
        let file = write_csv(TABLE);
        let table = SegmentTable::read(file.path()).unwrap();
        let columns = TableColumns::default();

        let first = table.segment(0, &columns).unwrap();
        assert_eq!(first.participant, "CHI01");
        assert_eq!(first.start, Some(0.5));
        assert_eq!(first.end, Some(4.5));

        // Blank and non-numeric bounds both read as missing.
        assert_eq!(table.segment(1, &columns).unwrap().start, None);
        assert_eq!(table.segment(2, &columns).unwrap().start, None);
    }

    #[test]
    fn missing_configured_column_is_fatal() {
        let file = write_csv("Participant,Visit\nCHI01,1\n");
        let table = SegmentTable::read(file.path()).unwrap();
        let err = table.segment(0, &TableColumns::default()).unwrap_err();
        assert!(matches!(err, MetricsError::Table { .. }));
    }

    #[test]
    fn append_column_round_trips_with_empty_cells() {
        let file = write_csv(TABLE);
        let mut table = SegmentTable::read(file.path()).unwrap();
        table
            .append_column(
                "SyllableCount",
                vec![Some("12".to_string()), None, Some("3".to_string())],
            )
            .unwrap();

        let out = NamedTempFile::new().expect("temp file");
        table.write(out.path()).unwrap();

        let reread = SegmentTable::read(out.path()).unwrap();
        let column = reread.column_index("SyllableCount").unwrap();
        assert_eq!(reread.cell(0, column), Some("12"));
        assert_eq!(reread.cell(1, column), Some(""));
        assert_eq!(reread.cell(2, column), Some("3"));
        // Original columns survive untouched.
        assert_eq!(reread.cell(1, 3), Some("6.0"));
    }

    #[test]
    fn append_rejects_existing_column_name() {
        let file = write_csv(TABLE);
        let mut table = SegmentTable::read(file.path()).unwrap();
        let err = table
            .append_column("Speaker", vec![None, None, None])
            .unwrap_err();
        assert!(matches!(err, MetricsError::Table { .. }));
    }

    #[test]
    fn append_rejects_length_mismatch() {
        let file = write_csv(TABLE);
        let mut table = SegmentTable::read(file.path()).unwrap();
        let err = table.append_column("PauseCount", vec![None]).unwrap_err();
        assert!(matches!(err, MetricsError::Table { .. }));
    }

    #[test]
    fn missing_table_is_source_not_found() {
        let err = SegmentTable::read(Path::new("no/such/table.csv")).unwrap_err();
        assert!(matches!(err, MetricsError::SourceNotFound { .. }));
    }
}
