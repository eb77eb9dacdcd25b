pub mod aggregate;
pub mod chart;
pub mod error;
pub mod report;
pub mod run_log;
pub mod series;
pub mod source;

pub use aggregate::{aggregate, aggregate_dir, AggregateConfig};
pub use chart::render_chart;
pub use error::{Error, Result};
pub use series::{AggregatePoint, SatClass, Series, SeriesBuilder};
pub use source::{DirectoryLayout, Manifest, RunEntry, RunSource};
