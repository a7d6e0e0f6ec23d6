// crates/proto-mcp-core/src/enum_labels.rs
// ============================================================================
// Module: Enum Label Normalization
// Description: Argument preprocessor mapping loose enum labels to declared names.
// Purpose: Accept human-written enum labels before the strict decoder runs.
// Dependencies: prost-reflect, serde_json
// ============================================================================

//! ## Overview
//! Callers (and language models in particular) often write `"red"` or
//! `"Red"` where the schema lists `"COLOR_RED"`. [`EnumLabelNormalizer`]
//! walks the arguments alongside the target descriptor and rewrites enum
//! string values to their declared name when the match is unambiguous:
//! case-insensitive, with `-` or spaces read as `_`, and with the enum's
//! `UPPER_SNAKE` type prefix optional.
//!
//! Labels that match nothing are left as-is so the strict decoder reports
//! them.

use prost_reflect::EnumDescriptor;
use prost_reflect::FieldDescriptor;
use prost_reflect::Kind;
use prost_reflect::MessageDescriptor;
use serde_json::Map;
use serde_json::Value;

use crate::transcode::ArgPreprocessor;
use crate::well_known::WellKnownType;

/// Preprocessor rewriting enum labels to their declared value names.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnumLabelNormalizer;

impl ArgPreprocessor for EnumLabelNormalizer {
    fn preprocess(
        &self,
        target: &MessageDescriptor,
        args: Map<String, Value>,
    ) -> Map<String, Value> {
        normalize_object(target, args)
    }
}

/// Rewrites enum labels within one message-shaped JSON object.
fn normalize_object(
    descriptor: &MessageDescriptor,
    mut args: Map<String, Value>,
) -> Map<String, Value> {
    for (key, value) in &mut args {
        let field = descriptor
            .get_field_by_json_name(key)
            .or_else(|| descriptor.get_field_by_name(key));
        if let Some(field) = field {
            normalize_field(&field, value);
        }
    }
    args
}

/// Rewrites a field value, descending into lists and map values.
fn normalize_field(field: &FieldDescriptor, value: &mut Value) {
    if field.is_map() {
        let Kind::Message(entry) = field.kind() else {
            return;
        };
        let value_kind = entry.map_entry_value_field().kind();
        if let Value::Object(entries) = value {
            for entry_value in entries.values_mut() {
                normalize_single(&value_kind, entry_value);
            }
        }
        return;
    }
    let kind = field.kind();
    if field.is_list() {
        if let Value::Array(items) = value {
            for item in items {
                normalize_single(&kind, item);
            }
        }
        return;
    }
    normalize_single(&kind, value);
}

/// Rewrites a single enum label or nested message object.
fn normalize_single(kind: &Kind, value: &mut Value) {
    match (kind, value) {
        (Kind::Enum(descriptor), Value::String(label)) => {
            if let Some(name) = resolve_label(descriptor, label) {
                *label = name;
            }
        }
        (Kind::Message(descriptor), Value::Object(object)) => {
            if WellKnownType::from_full_name(descriptor.full_name()).is_some() {
                return;
            }
            let taken = std::mem::take(object);
            *object = normalize_object(descriptor, taken);
        }
        _ => {}
    }
}

/// Resolves a loose label to a declared enum value name.
#[must_use]
pub fn resolve_label(descriptor: &EnumDescriptor, label: &str) -> Option<String> {
    let wanted = label.trim().replace(['-', ' '], "_");
    let prefix = format!("{}_", upper_snake(descriptor.name()));
    descriptor
        .values()
        .find(|value| {
            let name = value.name();
            name.eq_ignore_ascii_case(&wanted)
                || name.strip_prefix(&prefix).is_some_and(|rest| rest.eq_ignore_ascii_case(&wanted))
        })
        .map(|value| value.name().to_string())
}

/// Converts a `PascalCase` type name to `UPPER_SNAKE`.
fn upper_snake(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut previous_lower = false;
    for ch in name.chars() {
        if ch.is_ascii_uppercase() && previous_lower {
            out.push('_');
        }
        previous_lower = ch.is_ascii_lowercase() || ch.is_ascii_digit();
        out.push(ch.to_ascii_uppercase());
    }
    out
}
