use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use crate::error::SourceError;
use crate::model::Batch;

/// Parses a batch document: either `{"nodes": [...], "edges": [...]}` or a
/// bare array of edge entries. Entries that fail to deserialize are skipped
/// individually.
pub fn parse_batch(raw: &str) -> Result<Batch, SourceError> {
    let parsed: Value = serde_json::from_str(raw)?;

    match parsed {
        Value::Array(edges) => Ok(Batch::from_edges(entries(edges, "edge"))),
        Value::Object(mut object) => Ok(Batch {
            nodes: entries(take_array(&mut object, "nodes")?, "node"),
            edges: entries(take_array(&mut object, "edges")?, "edge"),
        }),
        other => Err(SourceError::Shape(format!(
            "expected an object or array, found {}",
            kind_of(&other)
        ))),
    }
}

pub(super) fn take_array(
    object: &mut serde_json::Map<String, Value>,
    key: &str,
) -> Result<Vec<Value>, SourceError> {
    match object.remove(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(values)) => Ok(values),
        Some(other) => Err(SourceError::Shape(format!(
            "`{key}` should be an array, found {}",
            kind_of(&other)
        ))),
    }
}

pub(super) fn entries<T: DeserializeOwned>(values: Vec<Value>, what: &str) -> Vec<T> {
    let total = values.len();
    let parsed = values
        .into_iter()
        .filter_map(|value| match serde_json::from_value(value) {
            Ok(entry) => Some(entry),
            Err(error) => {
                warn!(%error, "skipping malformed {what} entry");
                None
            }
        })
        .collect::<Vec<T>>();

    if parsed.len() < total {
        warn!(
            skipped = total - parsed.len(),
            total, "dropped malformed {what} entries"
        );
    }
    parsed
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EdgeEntry;

    #[test]
    fn parses_object_batches() {
        let batch = parse_batch(
            r#"{
                "nodes": [{"identity": "a", "primaryLabel": "Alice", "typeLike": true}],
                "edges": [{
                    "source": "a", "label": "knows", "destination": "b",
                    "destHints": {"primaryLabel": "Bob"}
                }]
            }"#,
        )
        .expect("batch parses");

        assert_eq!(batch.nodes.len(), 1);
        assert_eq!(batch.nodes[0].attributes.primary_label.as_deref(), Some("Alice"));
        assert!(batch.nodes[0].type_like);
        assert_eq!(
            batch.edges[0]
                .destination_hints
                .as_ref()
                .and_then(|hints| hints.primary_label.as_deref()),
            Some("Bob")
        );
    }

    #[test]
    fn bare_array_is_edges() {
        let batch = parse_batch(r#"[{"source": "a", "label": "knows", "destination": "b"}]"#)
            .expect("batch parses");
        assert!(batch.nodes.is_empty());
        assert_eq!(batch.edges, vec![EdgeEntry::new("a", "knows", "b")]);
    }

    #[test]
    fn malformed_entries_are_skipped() {
        let batch = parse_batch(
            r#"{"edges": [
                {"source": 7, "label": "knows", "destination": "b"},
                {"source": "a", "label": "knows", "destination": "b"},
                "nonsense"
            ]}"#,
        )
        .expect("batch parses");
        assert_eq!(batch.edges.len(), 1);
    }

    #[test]
    fn missing_identity_survives_parsing() {
        let batch = parse_batch(r#"{"nodes": [{"primaryLabel": "orphan"}]}"#).expect("parses");
        assert_eq!(batch.nodes.len(), 1);
        assert!(batch.nodes[0].identity.is_none());
    }

    #[test]
    fn wrong_shapes_are_errors() {
        assert!(matches!(parse_batch("42"), Err(SourceError::Shape(_))));
        assert!(matches!(
            parse_batch(r#"{"edges": {"source": "a"}}"#),
            Err(SourceError::Shape(_))
        ));
        assert!(matches!(parse_batch("{"), Err(SourceError::Json(_))));
    }
}
