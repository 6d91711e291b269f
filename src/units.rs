use serde::Serialize;

use crate::schema::OperationExtractor;
use crate::test_names::TestNameExtractor;
use crate::types::UnitId;

pub const SCHEMA_SUFFIX: &str = ".graphqls";
pub const RESOLVER_TEST_SUFFIX: &str = ".resolvers_it_test.go";

/// One file as handed over by a schema or test source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceItem {
    pub name: String,
    pub content: Vec<u8>,
}

impl SourceItem {
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    pub fn text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.content)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaUnit {
    pub id: UnitId,
    pub queries: Vec<String>,
    pub mutations: Vec<String>,
}

impl SchemaUnit {
    pub fn declared_count(&self) -> usize {
        self.queries.len() + self.mutations.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestUnit {
    pub id: UnitId,
    pub tested_queries: Vec<String>,
    pub tested_mutations: Vec<String>,
}

impl TestUnit {
    pub fn tested_count(&self) -> usize {
        self.tested_queries.len() + self.tested_mutations.len()
    }
}

/// Base name of `name` (last `/` or `\` component) with `suffix` removed.
///
/// Returns `None` when the name does not end in `suffix` or nothing is left after
/// stripping it.
pub fn unit_id(name: &str, suffix: &str) -> Option<UnitId> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let stem = base.strip_suffix(suffix)?;
    if stem.is_empty() {
        return None;
    }
    Some(UnitId::new(stem))
}

pub fn aggregate_schema_units(
    items: &[SourceItem],
    suffix: &str,
    extractor: &OperationExtractor,
) -> Vec<SchemaUnit> {
    items
        .iter()
        .filter_map(|item| {
            let Some(id) = unit_id(&item.name, suffix) else {
                tracing::debug!(name = %item.name, suffix, "skipping schema item without suffix");
                return None;
            };
            let ops = extractor.extract(&item.text());
            tracing::debug!(
                id = %id,
                queries = ops.queries.len(),
                mutations = ops.mutations.len(),
                "extracted schema operations"
            );
            Some(SchemaUnit {
                id,
                queries: ops.queries,
                mutations: ops.mutations,
            })
        })
        .collect()
}

pub fn aggregate_test_units(
    items: &[SourceItem],
    suffix: &str,
    extractor: &TestNameExtractor,
) -> Vec<TestUnit> {
    items
        .iter()
        .filter_map(|item| {
            let Some(id) = unit_id(&item.name, suffix) else {
                tracing::debug!(name = %item.name, suffix, "skipping test item without suffix");
                return None;
            };
            let tested = extractor.extract(&item.text());
            tracing::debug!(
                id = %id,
                queries = tested.tested_queries.len(),
                mutations = tested.tested_mutations.len(),
                "extracted resolver tests"
            );
            Some(TestUnit {
                id,
                tested_queries: tested.tested_queries,
                tested_mutations: tested.tested_mutations,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_names::TestNameConvention;

    #[test]
    fn unit_id_strips_directory_and_suffix() {
        assert_eq!(
            unit_id("graph/schemas/contact.graphqls", SCHEMA_SUFFIX),
            Some(UnitId::from("contact"))
        );
        assert_eq!(
            unit_id("contact.resolvers_it_test.go", RESOLVER_TEST_SUFFIX),
            Some(UnitId::from("contact"))
        );
        assert_eq!(
            unit_id(r"schemas\meeting.graphqls", SCHEMA_SUFFIX),
            Some(UnitId::from("meeting"))
        );
    }

    #[test]
    fn unit_id_rejects_other_suffixes() {
        assert_eq!(unit_id("contact.graphql", SCHEMA_SUFFIX), None);
        assert_eq!(unit_id(".graphqls", SCHEMA_SUFFIX), None);
        assert_eq!(unit_id("contact_test.go", RESOLVER_TEST_SUFFIX), None);
    }

    #[test]
    fn schema_units_keep_input_order_and_duplicates() {
        let items = vec![
            SourceItem::new("b.graphqls", "extend type Query { b(x: Int): Int }"),
            SourceItem::new("README.md", "extend type Query { nope(x: Int): Int }"),
            SourceItem::new("a.graphqls", "type A { id: ID }"),
            SourceItem::new("other/b.graphqls", "extend type Mutation { c(x: Int): Int }"),
        ];
        let units = aggregate_schema_units(&items, SCHEMA_SUFFIX, &OperationExtractor::default());
        let ids = units.iter().map(|u| u.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, ["b", "a", "b"]);
        assert_eq!(units[0].queries, ["b"]);
        assert_eq!(units[1].declared_count(), 0);
        assert_eq!(units[2].mutations, ["c"]);
    }

    #[test]
    fn test_units_decode_lossily() {
        let mut content = b"func TestQueryResolver_Get(t *testing.T) {}\n".to_vec();
        content.push(0xff);
        let items = vec![SourceItem::new("contact.resolvers_it_test.go", content)];
        let extractor = TestNameExtractor::new(&TestNameConvention::default()).unwrap();
        let units = aggregate_test_units(&items, RESOLVER_TEST_SUFFIX, &extractor);
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].tested_queries, ["TestQueryResolver_Get"]);
        assert_eq!(units[0].tested_count(), 1);
    }
}
