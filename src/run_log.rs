use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info};

/// Substring that identifies a timing line in a solver log.
pub const PROFILING_MARKER: &str = "Profiling results";

/// Every raw sample is divided by this before it is accumulated.
///
/// Raw samples are nanoseconds, so the result is milliseconds even though the
/// chart labels the axis in seconds. The constant is kept as-is so charts stay
/// comparable with ones produced earlier.
pub const SAMPLE_SCALE: f64 = 1_000_000.0;

/// Number of trailing characters (the unit suffix) dropped from each sample.
const UNIT_SUFFIX_CHARS: usize = 2;

/// Running totals for one run log.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunLogStats {
    /// Sum of scaled samples
    pub sum: f64,
    /// Number of timing lines seen
    pub count: usize,
}

impl RunLogStats {
    pub fn push(&mut self, raw: f64) {
        self.sum += raw / SAMPLE_SCALE;
        self.count += 1;
    }

    /// Arithmetic mean of the scaled samples, `None` when nothing was seen.
    pub fn mean(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.sum / self.count as f64)
        }
    }
}

/// Return the duration token of a timing line, or `None` for any other line.
pub fn sample_token(line: &str) -> Option<&str> {
    if !line.contains(PROFILING_MARKER) {
        return None;
    }
    line.split_whitespace().last()
}

/// Strip the unit suffix from a duration token and parse the number.
///
/// The suffix is counted in characters, so multi-byte units such as `µs`
/// are removed whole.
pub fn parse_sample(token: &str) -> Option<f64> {
    let cut = token
        .char_indices()
        .rev()
        .nth(UNIT_SUFFIX_CHARS - 1)
        .map(|(idx, _)| idx)?;
    token[..cut].parse().ok()
}

/// Accumulate every timing line in `reader`. `path` is only used for errors.
pub fn scan<R: BufRead>(reader: R, path: &Path) -> Result<RunLogStats> {
    let mut stats = RunLogStats::default();

    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| Error::io(path, e))?;
        let Some(token) = sample_token(&line) else {
            continue;
        };
        let raw = parse_sample(token).ok_or_else(|| Error::MalformedSample {
            path: path.to_path_buf(),
            line: idx + 1,
            token: token.to_string(),
        })?;
        stats.push(raw);
    }

    Ok(stats)
}

/// Average scaled duration of all timing lines in the run log at `path`.
pub fn average_duration(path: &Path) -> Result<f64> {
    info!("Extracting from {}", path.display());

    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let stats = scan(BufReader::new(file), path)?;
    debug!(samples = stats.count, "scanned {}", path.display());

    stats.mean().ok_or_else(|| Error::NoSamplesFound {
        path: path.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::{Cursor, Write};
    use tempfile::NamedTempFile;

    fn scan_str(text: &str) -> Result<RunLogStats> {
        scan(Cursor::new(text), Path::new("test.log"))
    }

    #[test]
    fn test_sample_token_requires_marker() {
        assert_eq!(sample_token("solution is Sat"), None);
        assert_eq!(
            sample_token("[INFO profiler] Profiling results: duration 1500ns"),
            Some("1500ns")
        );
    }

    #[test]
    fn test_parse_sample_strips_two_chars() {
        assert_eq!(parse_sample("1500ns"), Some(1500.0));
        assert_eq!(parse_sample("2.5µs"), Some(2.5));
        assert_eq!(parse_sample("1e3ns"), Some(1000.0));
        assert_eq!(parse_sample("ns"), None);
        assert_eq!(parse_sample("s"), None);
        assert_eq!(parse_sample("abcns"), None);
    }

    #[test]
    fn test_scan_averages_marked_lines() {
        let log = "\
starting solver
Profiling results: 2000000ns
some noise 99ns
Profiling results: 4000000ns
";
        let stats = scan_str(log).unwrap();
        assert_eq!(stats.count, 2);
        assert_eq!(stats.mean(), Some(3.0));
    }

    #[test]
    fn test_scan_reports_bad_sample_line() {
        let log = "Profiling results: 10ns\nProfiling results: oops\n";
        match scan_str(log) {
            Err(Error::MalformedSample { line, token, .. }) => {
                assert_eq!(line, 2);
                assert_eq!(token, "oops");
            }
            other => panic!("expected MalformedSample, got {:?}", other),
        }
    }

    #[test]
    fn test_average_duration_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Profiling results: 1000000ns").unwrap();
        writeln!(file, "Profiling results: 3000000ns").unwrap();
        file.flush().unwrap();

        let avg = average_duration(file.path()).unwrap();
        assert!((avg - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_average_duration_without_samples() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "solution is Unsat").unwrap();
        file.flush().unwrap();

        assert!(matches!(
            average_duration(file.path()),
            Err(Error::NoSamplesFound { .. })
        ));
    }

    #[test]
    fn test_average_duration_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            average_duration(&missing),
            Err(Error::Io { .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_mean_matches_formula(raw in prop::collection::vec(0u64..10_000_000_000, 1..40)) {
            let log: String = raw
                .iter()
                .map(|v| format!("Profiling results: {}ns\n", v))
                .collect();
            let stats = scan_str(&log).unwrap();

            let expected = raw.iter().map(|&v| v as f64).sum::<f64>() / SAMPLE_SCALE / raw.len() as f64;
            let mean = stats.mean().unwrap();
            prop_assert_eq!(stats.count, raw.len());
            prop_assert!((mean - expected).abs() <= 1e-9 * expected.max(1.0));
        }

        #[test]
        fn prop_mean_ignores_line_order(mut raw in prop::collection::vec(0u64..1_000_000_000, 1..30)) {
            let render = |vals: &[u64]| -> String {
                vals.iter().map(|v| format!("x Profiling results {}ns\nnoise\n", v)).collect()
            };
            let forward = scan_str(&render(&raw)).unwrap().mean().unwrap();
            raw.reverse();
            let backward = scan_str(&render(&raw)).unwrap().mean().unwrap();
            prop_assert!((forward - backward).abs() <= 1e-9 * forward.max(1.0));
        }
    }
}
