use crate::error::{Error, Result};
use crate::series::{SatClass, Series};
use std::fs;
use std::path::Path;

/// Render the aggregated series as a plain-text table
pub fn format_summary(series: &Series) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:=<60}\n", ""));
    out.push_str("Aggregated Runtimes\n");
    out.push_str(&format!("{:=<60}\n", ""));

    for &class in SatClass::all() {
        let heuristics = series.class(class);
        out.push_str(&format!("\nClass: {}\n", class));
        out.push_str(&format!("{:-<60}\n", ""));

        if heuristics.is_empty() {
            out.push_str("  (no runs)\n");
            continue;
        }

        for h in heuristics {
            out.push_str(&format!("  Heuristic: {}\n", h.heuristic));
            out.push_str(&format!("    {:>10} {:>16}\n", "Variables", "Average"));
            for point in h.sorted_points() {
                out.push_str(&format!("    {:>10} {:>16.6}\n", point.size, point.average));
            }
        }
    }

    out
}

/// Print the aggregated series to stdout
pub fn print_summary(series: &Series) {
    println!();
    print!("{}", format_summary(series));
}

/// Write the series as pretty JSON, with every heuristic's points sorted by
/// size.
pub fn write_json(series: &Series, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(&series.sorted()).map_err(|source| {
        Error::Json {
            path: path.to_path_buf(),
            source,
        }
    })?;
    fs::write(path, json).map_err(|e| Error::io(path, e))
}
