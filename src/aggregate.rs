use crate::error::{Error, Result};
use crate::run_log::average_duration;
use crate::series::{AggregatePoint, Series, SeriesBuilder};
use crate::source::{DirectoryLayout, RunEntry, RunSource};
use std::path::Path;
use tracing::{debug, info};

/// Size labels containing this are NFS silly-rename leftovers, not runs.
pub const NFS_ARTIFACT: &str = ".nfs";

/// Largest instance size kept by default
pub const DEFAULT_MAX_SIZE: u32 = 150;

/// Configuration for an aggregation pass
#[derive(Debug, Clone)]
pub struct AggregateConfig {
    /// Runs with a larger variable count are left out
    pub max_size: u32,
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
        }
    }
}

/// Variable count encoded in a size label such as `120-run3`.
///
/// Everything before the first `-` must be an unsigned integer; a label
/// without `-` is parsed whole.
pub fn parse_size_label(label: &str, path: &Path) -> Result<u32> {
    let prefix = label.split('-').next().unwrap_or(label);
    prefix.parse().map_err(|_| Error::MalformedSizeLabel {
        path: path.to_path_buf(),
        label: label.to_string(),
    })
}

fn is_artifact(entry: &RunEntry) -> bool {
    entry.size_label.contains(NFS_ARTIFACT)
}

/// Average every run log listed by `source` into a [`Series`].
///
/// A heuristic is registered for a class as soon as one of its entries is
/// seen there, even if every entry is later dropped by the size filter. Any
/// error aborts the whole pass.
pub fn aggregate<S: RunSource + ?Sized>(source: &S, config: &AggregateConfig) -> Result<Series> {
    info!("Aggregating runs from {}", source.describe());

    let mut builder = SeriesBuilder::new();
    let mut skipped_artifacts = 0usize;
    let mut skipped_large = 0usize;

    for entry in source.entries()? {
        if is_artifact(&entry) {
            debug!("skipping filesystem artifact {}", entry.path.display());
            skipped_artifacts += 1;
            continue;
        }

        builder.register(entry.class, &entry.heuristic);

        let size = parse_size_label(&entry.size_label, &entry.path)?;
        if size > config.max_size {
            debug!(size, max = config.max_size, "skipping {}", entry.path.display());
            skipped_large += 1;
            continue;
        }

        let average = average_duration(&entry.path)?;
        builder.add_point(entry.class, &entry.heuristic, AggregatePoint::new(size, average));
    }

    let series = builder.finish();
    info!(
        points = series.point_count(),
        skipped_artifacts, skipped_large, "Aggregation complete"
    );
    Ok(series)
}

/// Aggregate a `root/<heuristic>/<class>/<size label>` tree.
pub fn aggregate_dir(root: &Path, config: &AggregateConfig) -> Result<Series> {
    aggregate(&DirectoryLayout::new(root), config)
}
