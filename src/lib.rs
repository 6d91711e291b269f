pub mod cli;
pub mod config;
pub mod coverage;
pub mod schema;
pub mod source;
pub mod test_names;
pub mod types;
pub mod units;

pub use coverage::{CoverageReport, CoverageRow, FileCoverage, Ratio, compute_coverage, file_coverage};
pub use schema::{BlockScan, OperationExtractor, Operations, extract_operations};
pub use test_names::{TestNameConvention, TestNameExtractor, TestedOperations, extract_test_names};
pub use types::UnitId;
pub use units::{SchemaUnit, SourceItem, TestUnit, aggregate_schema_units, aggregate_test_units};
