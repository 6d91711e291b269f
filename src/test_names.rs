use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

pub const QUERY_RESOLVER_PREFIX: &str = "TestQueryResolver_";
pub const MUTATION_RESOLVER_PREFIX: &str = "TestMutationResolver_";

static DEFAULT_EXTRACTOR: LazyLock<TestNameExtractor> = LazyLock::new(|| {
    TestNameExtractor::new(&TestNameConvention::default()).expect("default test name patterns")
});

/// Function name prefixes that mark a resolver integration test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestNameConvention {
    pub query_prefix: String,
    pub mutation_prefix: String,
}

impl Default for TestNameConvention {
    fn default() -> Self {
        Self {
            query_prefix: QUERY_RESOLVER_PREFIX.to_string(),
            mutation_prefix: MUTATION_RESOLVER_PREFIX.to_string(),
        }
    }
}

/// Test function names found in one test file, prefix included.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TestedOperations {
    pub tested_queries: Vec<String>,
    pub tested_mutations: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct TestNameExtractor {
    query: Regex,
    mutation: Regex,
}

impl TestNameExtractor {
    pub fn new(convention: &TestNameConvention) -> anyhow::Result<Self> {
        if convention.query_prefix.is_empty() || convention.mutation_prefix.is_empty() {
            anyhow::bail!("test name prefixes must not be empty");
        }
        Ok(Self {
            query: signature_pattern(&convention.query_prefix)?,
            mutation: signature_pattern(&convention.mutation_prefix)?,
        })
    }

    pub fn extract(&self, source: &str) -> TestedOperations {
        TestedOperations {
            tested_queries: matches(&self.query, source),
            tested_mutations: matches(&self.mutation, source),
        }
    }
}

/// Extracts test names using the `TestQueryResolver_` / `TestMutationResolver_` convention.
pub fn extract_test_names(source: &str) -> TestedOperations {
    DEFAULT_EXTRACTOR.extract(source)
}

fn signature_pattern(prefix: &str) -> anyhow::Result<Regex> {
    let pattern = format!(r"\bfunc\s+({}\w+)\s*\(", regex::escape(prefix));
    Ok(Regex::new(&pattern)?)
}

fn matches(re: &Regex, source: &str) -> Vec<String> {
    re.captures_iter(source).map(|c| c[1].to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTACT_TESTS: &str = r#"
package resolver

func TestQueryResolver_GetContact(t *testing.T) {}

func TestMutationResolver_CreateContact(t *testing.T) {}

func helperCreateContact(t *testing.T) string { return "" }

func TestQueryResolver_Contacts_WithPagination(t *testing.T) {
    // TestQueryResolver_NotASignature(t)
}
"#;

    #[test]
    fn extracts_prefixed_names() {
        let tested = extract_test_names(CONTACT_TESTS);
        assert_eq!(
            tested.tested_queries,
            ["TestQueryResolver_GetContact", "TestQueryResolver_Contacts_WithPagination"]
        );
        assert_eq!(tested.tested_mutations, ["TestMutationResolver_CreateContact"]);
    }

    #[test]
    fn no_matching_functions_is_empty() {
        let tested = extract_test_names("package resolver\n\nfunc TestSomethingElse(t *testing.T) {}\n");
        assert_eq!(tested, TestedOperations::default());
    }

    #[test]
    fn duplicates_are_kept() {
        let src = "func TestMutationResolver_A(t *testing.T) {}\nfunc TestMutationResolver_A(t *testing.T) {}";
        assert_eq!(extract_test_names(src).tested_mutations.len(), 2);
    }

    #[test]
    fn custom_prefixes() {
        let convention = TestNameConvention {
            query_prefix: "test_query_".to_string(),
            mutation_prefix: "test_mutation_".to_string(),
        };
        let extractor = TestNameExtractor::new(&convention).unwrap();
        let tested = extractor.extract("func test_query_user() {}\nfunc test_mutation_save(x) {}");
        assert_eq!(tested.tested_queries, ["test_query_user"]);
        assert_eq!(tested.tested_mutations, ["test_mutation_save"]);
    }

    #[test]
    fn empty_prefix_is_rejected() {
        let convention = TestNameConvention {
            query_prefix: String::new(),
            mutation_prefix: "x".to_string(),
        };
        assert!(TestNameExtractor::new(&convention).is_err());
    }
}
