//! Expansion of a test group's schema specification into the variants to run.

use serde_json::Value;

use crate::suite::{GroupSchema, TestGroup};

static NO_SCHEMA: Value = Value::Null;

/// One schema to run a group's test cases against.
#[derive(Clone, Debug, PartialEq)]
pub struct SchemaVariant<'a> {
    /// The schema.
    pub schema: &'a Value,
    /// Label of the variant; `None` when the group has a single schema.
    pub label: Option<String>,
}

/// Yields the schema variants of `group`.
pub fn expand(group: &TestGroup) -> Vec<SchemaVariant<'_>> {
    match &group.schema {
        GroupSchema::Multiple(schemas) if !schemas.is_empty() => schemas
            .iter()
            .enumerate()
            .map(|(index, schema)| SchemaVariant {
                schema,
                label: Some(schema_label(schema, index)),
            })
            .collect(),
        GroupSchema::Multiple(_) => vec![SchemaVariant {
            schema: &NO_SCHEMA,
            label: None,
        }],
        GroupSchema::Single(schema) => vec![SchemaVariant {
            schema,
            label: None,
        }],
    }
}

fn schema_label(schema: &Value, index: usize) -> String {
    ["description", "id", "$id", "$ref"]
        .iter()
        .find_map(|key| {
            schema
                .get(key)
                .and_then(Value::as_str)
                .filter(|label| !label.is_empty())
        })
        .map_or_else(|| format!("#{index}"), str::to_owned)
}
