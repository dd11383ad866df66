//! Tagged field values extracted from analysis results.
//!
//! The analysis service describes every extracted field with a type tag
//! (`{"type": "string", "valueString": "..."}` and friends). Classification
//! happens exactly once, at the boundary where the raw JSON tree enters the
//! client; after that the rest of the code works with `TaggedValue` and never
//! inspects raw shapes again.

use serde_json::Value;

/// A single extracted field value, recursively composed.
#[derive(Debug, Clone, PartialEq)]
pub enum TaggedValue {
    /// Textual value (string, date, time). `None` when the payload carried
    /// the tag but no value.
    Scalar(Option<String>),

    /// Numeric value (number or integer tags).
    Number(f64),

    /// Ordered sequence of nested values.
    Array(Vec<TaggedValue>),

    /// Named nested values, insertion order preserved.
    Object(Vec<(String, TaggedValue)>),

    /// A node that did not match any known tag. Carries the original
    /// fragment so it can be inspected or re-serialized.
    Malformed(Value),
}

impl TaggedValue {
    /// Classify one raw result node into a `TaggedValue`.
    ///
    /// Unknown type tags, missing type tags, and container tags without
    /// their value payload all become `Malformed` rather than panicking or
    /// erroring; rendering turns those into visible sentinels.
    pub fn classify(raw: &Value) -> TaggedValue {
        let Some(node) = raw.as_object() else {
            return TaggedValue::Malformed(raw.clone());
        };

        let Some(kind) = node.get("type").and_then(Value::as_str) else {
            return TaggedValue::Malformed(raw.clone());
        };

        match kind {
            "string" => TaggedValue::Scalar(text_payload(node, "valueString")),
            "date" => TaggedValue::Scalar(text_payload(node, "valueDate")),
            "time" => TaggedValue::Scalar(text_payload(node, "valueTime")),
            "number" => match node.get("valueNumber").and_then(Value::as_f64) {
                Some(n) => TaggedValue::Number(n),
                None => TaggedValue::Malformed(raw.clone()),
            },
            "integer" => match node.get("valueInteger").and_then(Value::as_f64) {
                Some(n) => TaggedValue::Number(n),
                None => TaggedValue::Malformed(raw.clone()),
            },
            "array" => match node.get("valueArray").and_then(Value::as_array) {
                Some(items) => {
                    TaggedValue::Array(items.iter().map(TaggedValue::classify).collect())
                }
                None => TaggedValue::Malformed(raw.clone()),
            },
            "object" => match node.get("valueObject").and_then(Value::as_object) {
                Some(members) => TaggedValue::Object(
                    members
                        .iter()
                        .map(|(name, value)| (name.clone(), TaggedValue::classify(value)))
                        .collect(),
                ),
                None => TaggedValue::Malformed(raw.clone()),
            },
            _ => TaggedValue::Malformed(raw.clone()),
        }
    }

    /// Classify a named-fields collection (an object mapping field names to
    /// tagged nodes). Returns `None` when the node is not an object.
    pub fn classify_fields(fields_node: &Value) -> Option<Vec<(String, TaggedValue)>> {
        let members = fields_node.as_object()?;
        Some(
            members
                .iter()
                .map(|(name, value)| (name.clone(), TaggedValue::classify(value)))
                .collect(),
        )
    }

    /// True for nodes that failed classification.
    pub fn is_malformed(&self) -> bool {
        matches!(self, TaggedValue::Malformed(_))
    }
}

fn text_payload(node: &serde_json::Map<String, Value>, key: &str) -> Option<String> {
    node.get(key).and_then(Value::as_str).map(String::from)
}
