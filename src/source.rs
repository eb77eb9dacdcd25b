use crate::error::{Error, Result};
use crate::series::SatClass;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// One run log to aggregate, keyed by heuristic, class and size label.
#[derive(Debug, Clone, PartialEq)]
pub struct RunEntry {
    pub heuristic: String,
    pub class: SatClass,
    pub size_label: String,
    /// Location of the run log
    pub path: PathBuf,
}

/// Anything that can enumerate the run logs of a benchmark.
pub trait RunSource {
    /// List every run entry. Filtering (`.nfs` artifacts, size threshold) is
    /// left to the aggregator.
    fn entries(&self) -> Result<Vec<RunEntry>>;

    /// Short description for log output.
    fn describe(&self) -> String;
}

/// Benchmark output laid out as `root/<heuristic>/<class>/<size label>`.
#[derive(Debug, Clone)]
pub struct DirectoryLayout {
    root: PathBuf,
}

impl DirectoryLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Names of the entries in `dir`, sorted so repeated walks agree.
fn sorted_names(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| Error::io(dir, e))? {
        let entry = entry.map_err(|e| Error::io(dir, e))?;
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    Ok(names)
}

impl RunSource for DirectoryLayout {
    fn entries(&self) -> Result<Vec<RunEntry>> {
        let mut entries = Vec::new();

        for heuristic in sorted_names(&self.root)? {
            let heuristic_dir = self.root.join(&heuristic);

            for class_name in sorted_names(&heuristic_dir)? {
                let class_dir = heuristic_dir.join(&class_name);
                let class =
                    SatClass::from_name(&class_name).ok_or_else(|| Error::UnknownClass {
                        path: class_dir.clone(),
                        name: class_name.clone(),
                    })?;

                for size_label in sorted_names(&class_dir)? {
                    entries.push(RunEntry {
                        heuristic: heuristic.clone(),
                        class,
                        path: class_dir.join(&size_label),
                        size_label,
                    });
                }
            }
        }

        Ok(entries)
    }

    fn describe(&self) -> String {
        format!("directory {}", self.root.display())
    }
}

#[derive(Debug, Deserialize)]
struct ManifestFile {
    runs: Vec<ManifestRun>,
}

#[derive(Debug, Deserialize)]
struct ManifestRun {
    heuristic: String,
    class: SatClass,
    size_label: String,
    path: PathBuf,
}

/// JSON manifest listing run logs explicitly:
///
/// ```json
/// { "runs": [ { "heuristic": "vsids", "class": "satisfiable",
///               "size_label": "50-run1", "path": "logs/vsids-50-1.log" } ] }
/// ```
///
/// Relative paths are resolved against the manifest's directory. Entries are
/// returned in file order.
#[derive(Debug, Clone)]
pub struct Manifest {
    path: PathBuf,
}

impl Manifest {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RunSource for Manifest {
    fn entries(&self) -> Result<Vec<RunEntry>> {
        let text = fs::read_to_string(&self.path).map_err(|e| Error::io(&self.path, e))?;
        let manifest: ManifestFile =
            serde_json::from_str(&text).map_err(|source| Error::Json {
                path: self.path.clone(),
                source,
            })?;

        let base = self.path.parent().unwrap_or_else(|| Path::new(""));
        Ok(manifest
            .runs
            .into_iter()
            .map(|run| RunEntry {
                path: if run.path.is_absolute() {
                    run.path
                } else {
                    base.join(run.path)
                },
                heuristic: run.heuristic,
                class: run.class,
                size_label: run.size_label,
            })
            .collect())
    }

    fn describe(&self) -> String {
        format!("manifest {}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn test_directory_layout_walks_three_levels() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "vsids/satisfiable/50-run1");
        touch(dir.path(), "vsids/unsatisfiable/20-run1");
        touch(dir.path(), "ascending/satisfiable/10-run2");

        let entries = DirectoryLayout::new(dir.path()).entries().unwrap();
        let keys: Vec<(&str, SatClass, &str)> = entries
            .iter()
            .map(|e| (e.heuristic.as_str(), e.class, e.size_label.as_str()))
            .collect();

        assert_eq!(
            keys,
            vec![
                ("ascending", SatClass::Satisfiable, "10-run2"),
                ("vsids", SatClass::Satisfiable, "50-run1"),
                ("vsids", SatClass::Unsatisfiable, "20-run1"),
            ]
        );
        assert_eq!(
            entries[1].path,
            dir.path().join("vsids").join("satisfiable").join("50-run1")
        );
    }

    #[test]
    fn test_directory_layout_rejects_unknown_class() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "vsids/maybe/50-run1");

        match DirectoryLayout::new(dir.path()).entries() {
            Err(Error::UnknownClass { name, .. }) => assert_eq!(name, "maybe"),
            other => panic!("expected UnknownClass, got {:?}", other),
        }
    }

    #[test]
    fn test_directory_layout_missing_root() {
        let dir = TempDir::new().unwrap();
        let result = DirectoryLayout::new(dir.path().join("output")).entries();
        assert!(matches!(result, Err(Error::Io { .. })));
    }

    #[test]
    fn test_manifest_resolves_relative_paths() {
        let dir = TempDir::new().unwrap();
        let manifest_path = dir.path().join("runs.json");
        fs::write(
            &manifest_path,
            r#"{ "runs": [
                { "heuristic": "vsids", "class": "unsatisfiable", "size_label": "75-a", "path": "logs/a.log" },
                { "heuristic": "dlis", "class": "satisfiable", "size_label": "20-b", "path": "/abs/b.log" }
            ] }"#,
        )
        .unwrap();

        let entries = Manifest::new(&manifest_path).entries().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].class, SatClass::Unsatisfiable);
        assert_eq!(entries[0].path, dir.path().join("logs/a.log"));
        assert_eq!(entries[1].heuristic, "dlis");
        assert_eq!(entries[1].path, PathBuf::from("/abs/b.log"));
    }

    #[test]
    fn test_manifest_rejects_unknown_class() {
        let dir = TempDir::new().unwrap();
        let manifest_path = dir.path().join("runs.json");
        fs::write(
            &manifest_path,
            r#"{ "runs": [ { "heuristic": "h", "class": "sat", "size_label": "1-a", "path": "a" } ] }"#,
        )
        .unwrap();

        assert!(matches!(
            Manifest::new(&manifest_path).entries(),
            Err(Error::Json { .. })
        ));
    }
}
