use serde::{Deserialize, Serialize};
use std::fmt;

/// One averaged run: instance size and mean scaled duration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregatePoint {
    pub size: u32,
    pub average: f64,
}

impl AggregatePoint {
    pub fn new(size: u32, average: f64) -> Self {
        Self { size, average }
    }
}

/// Satisfiability class of a benchmark instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SatClass {
    Satisfiable,
    Unsatisfiable,
}

impl SatClass {
    pub fn all() -> &'static [SatClass] {
        &[SatClass::Satisfiable, SatClass::Unsatisfiable]
    }

    /// Directory name used by the benchmark harness
    pub fn name(&self) -> &'static str {
        match self {
            SatClass::Satisfiable => "satisfiable",
            SatClass::Unsatisfiable => "unsatisfiable",
        }
    }

    pub fn from_name(name: &str) -> Option<SatClass> {
        SatClass::all().iter().copied().find(|c| c.name() == name)
    }
}

impl fmt::Display for SatClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// All points recorded for one heuristic within one class
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeuristicSeries {
    pub heuristic: String,
    /// Points in the order they were added
    pub points: Vec<AggregatePoint>,
}

impl HeuristicSeries {
    pub fn new(heuristic: impl Into<String>) -> Self {
        Self {
            heuristic: heuristic.into(),
            points: Vec::new(),
        }
    }

    /// Points ordered by size. The sort is stable and looks at the size only,
    /// so runs sharing a size keep the order they were added in.
    pub fn sorted_points(&self) -> Vec<AggregatePoint> {
        let mut points = self.points.clone();
        points.sort_by_key(|p| p.size);
        points
    }
}

/// Aggregated points grouped by class, then by heuristic.
///
/// Heuristics keep insertion order within a class. Built with
/// [`SeriesBuilder`] and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Series {
    satisfiable: Vec<HeuristicSeries>,
    unsatisfiable: Vec<HeuristicSeries>,
}

impl Series {
    pub fn class(&self, class: SatClass) -> &[HeuristicSeries] {
        match class {
            SatClass::Satisfiable => &self.satisfiable,
            SatClass::Unsatisfiable => &self.unsatisfiable,
        }
    }

    pub fn heuristic(&self, class: SatClass, heuristic: &str) -> Option<&HeuristicSeries> {
        self.class(class).iter().find(|h| h.heuristic == heuristic)
    }

    /// Total number of points across every class and heuristic
    pub fn point_count(&self) -> usize {
        SatClass::all()
            .iter()
            .flat_map(|c| self.class(*c))
            .map(|h| h.points.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.satisfiable.is_empty() && self.unsatisfiable.is_empty()
    }

    /// Copy with every heuristic's points ordered by size
    pub fn sorted(&self) -> Series {
        let sort_all = |list: &[HeuristicSeries]| -> Vec<HeuristicSeries> {
            list.iter()
                .map(|h| HeuristicSeries {
                    heuristic: h.heuristic.clone(),
                    points: h.sorted_points(),
                })
                .collect()
        };
        Series {
            satisfiable: sort_all(&self.satisfiable),
            unsatisfiable: sort_all(&self.unsatisfiable),
        }
    }
}

/// Incremental builder for a [`Series`].
#[derive(Debug, Default)]
pub struct SeriesBuilder {
    series: Series,
}

impl SeriesBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn class_mut(&mut self, class: SatClass) -> &mut Vec<HeuristicSeries> {
        match class {
            SatClass::Satisfiable => &mut self.series.satisfiable,
            SatClass::Unsatisfiable => &mut self.series.unsatisfiable,
        }
    }

    /// Make sure `heuristic` exists under `class`, appending it if absent.
    pub fn register(&mut self, class: SatClass, heuristic: &str) -> &mut HeuristicSeries {
        let list = self.class_mut(class);
        let idx = match list.iter().position(|h| h.heuristic == heuristic) {
            Some(idx) => idx,
            None => {
                list.push(HeuristicSeries::new(heuristic));
                list.len() - 1
            }
        };
        &mut list[idx]
    }

    pub fn add_point(&mut self, class: SatClass, heuristic: &str, point: AggregatePoint) {
        self.register(class, heuristic).points.push(point);
    }

    pub fn finish(self) -> Series {
        self.series
    }
}
