//! Display rendering for tagged field values.
//!
//! Every function here is total: malformed input degrades to a fixed
//! sentinel string instead of erroring, so rendering can never take down a
//! batch item. The three sentinels stay distinguishable so callers (and
//! tests) can tell where in the tree a node failed classification.

use crate::domain::TaggedValue;

/// Rendered for a scalar whose payload was absent.
pub const MISSING: &str = "N/A";

/// Rendered for an empty array.
pub const EMPTY_ARRAY: &str = "Empty Array";

/// Rendered for an empty object.
pub const EMPTY_OBJECT: &str = "Empty Object";

/// Rendered for a malformed node encountered standalone.
pub const PARSE_ERROR: &str = "Parse Error";

/// Rendered for a malformed node encountered as an array element.
pub const ARRAY_PARSE_ERROR: &str = "Array Parse Error";

/// Rendered for a malformed node encountered as an object field value.
pub const OBJECT_PARSE_ERROR: &str = "Object Parse Error";

/// Render one value as a display string.
pub fn render(value: &TaggedValue) -> String {
    match value {
        TaggedValue::Scalar(Some(text)) => text.clone(),
        TaggedValue::Scalar(None) => MISSING.to_string(),
        TaggedValue::Number(n) => format!("{:.2}", n),
        TaggedValue::Array(items) => render_array(items),
        TaggedValue::Object(members) => render_object(members),
        TaggedValue::Malformed(_) => PARSE_ERROR.to_string(),
    }
}

/// Render a value reached as an array element.
pub fn render_array_item(value: &TaggedValue) -> String {
    if value.is_malformed() {
        ARRAY_PARSE_ERROR.to_string()
    } else {
        render(value)
    }
}

/// Render a value reached as an object field value.
pub fn render_object_value(value: &TaggedValue) -> String {
    if value.is_malformed() {
        OBJECT_PARSE_ERROR.to_string()
    } else {
        render(value)
    }
}

fn render_array(items: &[TaggedValue]) -> String {
    if items.is_empty() {
        return EMPTY_ARRAY.to_string();
    }

    items
        .iter()
        .map(render_array_item)
        .collect::<Vec<_>>()
        .join("; ")
}

fn render_object(members: &[(String, TaggedValue)]) -> String {
    if members.is_empty() {
        return EMPTY_OBJECT.to_string();
    }

    let body = members
        .iter()
        .map(|(name, value)| format!("{}: {}", name, render_object_value(value)))
        .collect::<Vec<_>>()
        .join(", ");

    format!("[{}]", body)
}
