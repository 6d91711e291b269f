use std::fs;

use graphql_coverage::config::{Config, load_config, write_percent};
use graphql_coverage::coverage::Ratio;
use graphql_coverage::schema::BlockScan;

#[test]
fn defaults_match_resolver_conventions() {
    let c = Config::default();
    assert_eq!(c.schema_suffix, ".graphqls");
    assert_eq!(c.test_suffix, ".resolvers_it_test.go");
    assert_eq!(c.query_prefix, "TestQueryResolver_");
    assert_eq!(c.mutation_prefix, "TestMutationResolver_");
    assert_eq!(c.block_scan, BlockScan::FirstClose);
    assert!(c.ignore.iter().any(|i| i == ".git"));
}

#[test]
fn partial_config_keeps_other_defaults() {
    let tmp = tempfile::tempdir().unwrap();
    let p = tmp.path().join("c.toml");
    fs::write(&p, "block_scan = \"brace-depth\"\nignore = [\"vendor\"]\n").unwrap();
    let c = load_config(&p).unwrap();
    assert_eq!(c.block_scan, BlockScan::BraceDepth);
    assert_eq!(c.ignore, vec!["vendor".to_string()]);
    assert_eq!(c.schema_suffix, ".graphqls");
}

#[test]
fn empty_suffix_is_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let p = tmp.path().join("c.toml");
    fs::write(&p, "schema_suffix = \"\"\n").unwrap();
    assert!(load_config(&p).is_err());
}

#[test]
fn write_percent_formats_two_decimals() {
    let tmp = tempfile::tempdir().unwrap();
    let p = tmp.path().join("out").join("coverage.txt");
    write_percent(&p, Ratio::percent(2, 3)).unwrap();
    assert_eq!(fs::read_to_string(&p).unwrap(), "66.67");

    write_percent(&p, Ratio::Undefined).unwrap();
    assert_eq!(fs::read_to_string(&p).unwrap(), "n/a");
}
