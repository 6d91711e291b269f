use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Serialize, Serializer};

use crate::types::UnitId;
use crate::units::{SchemaUnit, TestUnit};

/// A percentage whose denominator may be zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ratio {
    Defined(f64),
    Undefined,
}

impl Ratio {
    pub fn percent(numerator: usize, denominator: usize) -> Self {
        if denominator == 0 {
            return Ratio::Undefined;
        }
        Ratio::Defined(numerator as f64 * 100.0 / denominator as f64)
    }

    pub fn value(self) -> Option<f64> {
        match self {
            Ratio::Defined(v) => Some(v),
            Ratio::Undefined => None,
        }
    }

    pub fn is_defined(self) -> bool {
        matches!(self, Ratio::Defined(_))
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ratio::Defined(v) => write!(f, "{v:.2}%"),
            Ratio::Undefined => f.write_str("n/a"),
        }
    }
}

impl Serialize for Ratio {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Ratio::Defined(v) => serializer.serialize_f64((v * 100.0).round() / 100.0),
            Ratio::Undefined => serializer.serialize_none(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoverageRow {
    pub id: UnitId,
    pub declared_count: usize,
    pub tested_count: usize,
}

impl CoverageRow {
    pub fn percent(&self) -> Ratio {
        Ratio::percent(self.tested_count, self.declared_count)
    }
}

/// Operation-count coverage: declared query/mutation fields vs. resolver test functions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CoverageReport {
    pub rows: Vec<CoverageRow>,
    pub total_declared: usize,
    pub total_tested: usize,
    /// Test unit ids with no schema unit of the same id, first occurrence order.
    pub orphan_tests: Vec<UnitId>,
}

impl CoverageReport {
    pub fn percent(&self) -> Ratio {
        Ratio::percent(self.total_tested, self.total_declared)
    }
}

/// Joins schema and test units on id.
///
/// Every schema unit produces one row, in input order. When several test units share an
/// id their counts are summed into each schema row with that id. `total_tested` counts
/// each test unit exactly once, whether or not it joined.
pub fn compute_coverage(schema_units: &[SchemaUnit], test_units: &[TestUnit]) -> CoverageReport {
    let mut tested_by_id: HashMap<&UnitId, usize> = HashMap::new();
    for t in test_units {
        *tested_by_id.entry(&t.id).or_default() += t.tested_count();
    }

    let rows = schema_units
        .iter()
        .map(|s| CoverageRow {
            id: s.id.clone(),
            declared_count: s.declared_count(),
            tested_count: tested_by_id.get(&s.id).copied().unwrap_or(0),
        })
        .collect::<Vec<_>>();

    let schema_ids = schema_units.iter().map(|s| &s.id).collect::<HashSet<_>>();
    let mut seen = HashSet::new();
    let orphan_tests = test_units
        .iter()
        .map(|t| &t.id)
        .filter(|id| !schema_ids.contains(id) && seen.insert(*id))
        .cloned()
        .collect::<Vec<_>>();
    if !orphan_tests.is_empty() {
        tracing::info!(count = orphan_tests.len(), "test units without a schema unit");
    }

    CoverageReport {
        total_declared: rows.iter().map(|r| r.declared_count).sum(),
        total_tested: test_units.iter().map(TestUnit::tested_count).sum(),
        rows,
        orphan_tests,
    }
}

/// Whole-file coverage: number of test files relative to number of schema files.
///
/// This is a different metric from [`CoverageReport::percent`] and is never mixed with it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FileCoverage {
    pub schema_files: usize,
    pub test_files: usize,
}

impl FileCoverage {
    pub fn percent(&self) -> Ratio {
        Ratio::percent(self.test_files, self.schema_files)
    }
}

pub fn file_coverage(schema_ids: &[UnitId], test_ids: &[UnitId]) -> FileCoverage {
    FileCoverage {
        schema_files: schema_ids.len(),
        test_files: test_ids.len(),
    }
}
