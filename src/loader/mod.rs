//! Timeline and series loaders: file formats in, in-memory annotation
//! structures out. All parsing lives here; the aggregator never touches I/O.

pub mod annotation;
pub mod pitch_track;

pub use annotation::load_timeline;
pub use pitch_track::load_series;
