use graphql_coverage::source::{DirSource, Source};
use graphql_coverage::{
    BlockScan, OperationExtractor, Ratio, TestNameConvention, TestNameExtractor,
    aggregate_schema_units, aggregate_test_units, compute_coverage,
};

const ROOT: &str = "tests/fixtures/customer-os";

#[test]
fn fixture_repository_end_to_end() {
    let src = DirSource::new(ROOT, vec![".git".to_string()]);
    let schemas = src.items(".graphqls").unwrap();
    let tests = src.items(".resolvers_it_test.go").unwrap();

    let schema_units =
        aggregate_schema_units(&schemas, ".graphqls", &OperationExtractor::default());
    let extractor = TestNameExtractor::new(&TestNameConvention::default()).unwrap();
    let test_units = aggregate_test_units(&tests, ".resolvers_it_test.go", &extractor);

    assert_eq!(schema_units[0].queries, ["contact", "contacts"]);
    assert_eq!(schema_units[0].mutations, ["contact_Create", "contact_Archive"]);
    assert_eq!(
        test_units[0].tested_queries,
        ["TestQueryResolver_Contact", "TestQueryResolver_Contacts_SortByFirstName"]
    );

    let report = compute_coverage(&schema_units, &test_units);
    let ids = report.rows.iter().map(|r| r.id.as_str()).collect::<Vec<_>>();
    assert_eq!(ids, ["contact", "meeting", "organization"]);
    assert_eq!(report.total_declared, 6);
    assert_eq!(report.total_tested, 4);
    assert_eq!(report.rows[2].percent(), Ratio::Undefined);
    assert!(report.percent().is_defined());
}

#[test]
fn brace_depth_agrees_on_flat_schemas() {
    let src = DirSource::new(ROOT, Vec::new());
    let schemas = src.items(".graphqls").unwrap();
    let first = aggregate_schema_units(&schemas, ".graphqls", &OperationExtractor::default());
    let depth = aggregate_schema_units(
        &schemas,
        ".graphqls",
        &OperationExtractor::new(BlockScan::BraceDepth),
    );
    assert_eq!(first, depth);
}
