use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("I/O error while {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("source file not found: {path}")]
    SourceNotFound { path: PathBuf },
    #[error("failed to parse '{path}': {message}")]
    Parse { path: PathBuf, message: String },
    #[error("CSV error while {context}: {source}")]
    Csv {
        context: &'static str,
        #[source]
        source: csv::Error,
    },
    #[error("table error while {context}: {message}")]
    Table {
        context: &'static str,
        message: String,
    },
    #[error("invalid query interval [{start}, {end}]")]
    InvalidInterval { start: f64, end: f64 },
    #[error("layer '{layer}' holds {actual}, operation requires {expected}")]
    LayerTypeMismatch {
        layer: String,
        expected: &'static str,
        actual: &'static str,
    },
}

impl MetricsError {
    pub(crate) fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }

    pub(crate) fn source_not_found(path: &Path) -> Self {
        Self::SourceNotFound {
            path: path.to_path_buf(),
        }
    }

    pub(crate) fn parse(path: &Path, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    pub(crate) fn csv(context: &'static str, source: csv::Error) -> Self {
        Self::Csv { context, source }
    }

    pub(crate) fn table(context: &'static str, message: impl Into<String>) -> Self {
        Self::Table {
            context,
            message: message.into(),
        }
    }

    pub(crate) fn invalid_interval(start: f64, end: f64) -> Self {
        Self::InvalidInterval { start, end }
    }

    pub(crate) fn layer_type_mismatch(
        layer: impl Into<String>,
        expected: &'static str,
        actual: &'static str,
    ) -> Self {
        Self::LayerTypeMismatch {
            layer: layer.into(),
            expected,
            actual,
        }
    }
}
