// crates/proto-mcp-core/src/schema.rs
// ============================================================================
// Module: Schema Builder
// Description: Message descriptor to JSON Schema translation.
// Purpose: Produce strict tool input/output schemas from protobuf messages.
// Dependencies: prost-reflect, serde_json, tracing
// ============================================================================

//! ## Overview
//! The builder walks a message descriptor field by field and produces a JSON
//! Schema object describing the message's canonical JSON mapping. Field
//! annotations decide inclusion and required-ness; well-known types map to
//! their JSON representation; enums become string enumerations.
//!
//! Recursive message graphs are handled with a [`VisitedSet`] scoped to one
//! top-level build. A message already being expanded on the current path
//! collapses to a permissive object schema. Entries are removed by a guard on
//! every exit path, so sibling branches re-expand the same type independently.
//!
//! Nothing here fails: unknown shapes become the unconstrained schema `{}`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use prost_reflect::EnumDescriptor;
use prost_reflect::FieldDescriptor;
use prost_reflect::Kind;
use prost_reflect::MessageDescriptor;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;
use tracing::debug;

use crate::annotations::FieldAnnotations;
use crate::docs::field_comment;
use crate::well_known::WellKnownType;

// ============================================================================
// SECTION: Scalar Schemas
// ============================================================================

/// JSON schema shapes for protobuf scalar kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarSchema {
    /// `bool`.
    Boolean,
    /// `string`.
    String,
    /// `bytes`, transported as base64 text.
    Bytes,
    /// All 32-bit integer kinds.
    Int32,
    /// All 64-bit integer kinds.
    Int64,
    /// `float`.
    Float,
    /// `double`.
    Double,
}

impl ScalarSchema {
    /// Classifies a field kind, returning `None` for enums and messages.
    #[must_use]
    pub fn from_kind(kind: &Kind) -> Option<Self> {
        match kind {
            Kind::Bool => Some(Self::Boolean),
            Kind::String => Some(Self::String),
            Kind::Bytes => Some(Self::Bytes),
            Kind::Int32 | Kind::Sint32 | Kind::Sfixed32 | Kind::Uint32 | Kind::Fixed32 => {
                Some(Self::Int32)
            }
            Kind::Int64 | Kind::Sint64 | Kind::Sfixed64 | Kind::Uint64 | Kind::Fixed64 => {
                Some(Self::Int64)
            }
            Kind::Float => Some(Self::Float),
            Kind::Double => Some(Self::Double),
            Kind::Enum(_) | Kind::Message(_) => None,
        }
    }

    /// Returns the JSON schema for this scalar.
    #[must_use]
    pub fn schema(self) -> Value {
        match self {
            Self::Boolean => json!({"type": "boolean"}),
            Self::String => json!({"type": "string"}),
            Self::Bytes => json!({"type": "string", "format": "byte"}),
            Self::Int32 => json!({"type": "integer", "format": "int32"}),
            Self::Int64 => json!({"type": "integer", "format": "int64"}),
            Self::Float => json!({"type": "number", "format": "float"}),
            Self::Double => json!({"type": "number", "format": "double"}),
        }
    }

    /// Returns the schema for values travelling in `direction`.
    ///
    /// The encoder writes 64-bit integers as decimal strings, so result
    /// schemas type them as strings. Arguments accept either form.
    #[must_use]
    pub fn schema_for(self, direction: SchemaDirection) -> Value {
        match (self, direction) {
            (Self::Int64, SchemaDirection::Output) => json!({"type": "string", "format": "int64"}),
            _ => self.schema(),
        }
    }
}

// ============================================================================
// SECTION: Visited Set
// ============================================================================

/// Fully-qualified message names currently being expanded on one build path.
///
/// # Invariants
/// - A name is present only while its [`VisitGuard`] is alive.
#[derive(Debug, Clone, Default)]
pub struct VisitedSet {
    /// Names on the current expansion path.
    names: BTreeSet<String>,
}

impl VisitedSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when `full_name` is being expanded on the current path.
    #[must_use]
    pub fn contains(&self, full_name: &str) -> bool {
        self.names.contains(full_name)
    }

    /// Returns true when no expansion is in progress.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Marks `full_name` as being expanded until the returned guard drops.
    ///
    /// Returns `None` when the name is already on the current path.
    pub fn enter(&mut self, full_name: &str) -> Option<VisitGuard<'_>> {
        if !self.names.insert(full_name.to_string()) {
            return None;
        }
        Some(VisitGuard {
            set: self,
            name: full_name.to_string(),
        })
    }
}

/// Scope guard removing a visited name when dropped.
#[derive(Debug)]
pub struct VisitGuard<'a> {
    /// Set the name was inserted into.
    set: &'a mut VisitedSet,
    /// Name removed on drop.
    name: String,
}

impl VisitGuard<'_> {
    /// Returns the set for nested expansion while this name stays marked.
    pub fn visited(&mut self) -> &mut VisitedSet {
        &mut *self.set
    }
}

impl Drop for VisitGuard<'_> {
    fn drop(&mut self) {
        self.set.names.remove(&self.name);
    }
}

// ============================================================================
// SECTION: Schema Builder
// ============================================================================

/// Which side of a call a schema describes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SchemaDirection {
    /// Tool arguments: output-only fields are dropped, required fields listed.
    #[default]
    Input,
    /// Tool results: input-only fields are dropped, no required list.
    Output,
}

/// Translates message descriptors into JSON Schema documents.
///
/// # Invariants
/// - Input schemas never contain a property for an output-only field.
/// - A `required` list, when present, is non-empty and names only emitted properties.
/// - Building always terminates, including on self-referential descriptors.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaBuilder {
    /// Call side the produced schemas describe.
    direction: SchemaDirection,
}

impl SchemaBuilder {
    /// Creates a builder for the given direction.
    #[must_use]
    pub const fn new(direction: SchemaDirection) -> Self {
        Self {
            direction,
        }
    }

    /// Returns the direction this builder targets.
    #[must_use]
    pub const fn direction(&self) -> SchemaDirection {
        self.direction
    }

    /// Builds the schema for a top-level message with a fresh visited set.
    ///
    /// The root itself is not marked, so a self-referential message expands
    /// once before the back-edge collapses. Well-known roots keep their
    /// canonical schema only when that schema is an object; other well-known
    /// roots are expanded field by field.
    #[must_use]
    pub fn message_schema(&self, descriptor: &MessageDescriptor) -> Value {
        match WellKnownType::from_full_name(descriptor.full_name()) {
            Some(well_known) if well_known.is_object() => well_known.schema_for(self.direction),
            _ => self.build_message_schema(descriptor, &mut VisitedSet::new()),
        }
    }

    /// Builds the object schema for `descriptor` within an ongoing expansion.
    #[must_use]
    pub fn build_message_schema(
        &self,
        descriptor: &MessageDescriptor,
        visited: &mut VisitedSet,
    ) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for field in descriptor.fields() {
            let annotations = FieldAnnotations::from_field(&field);
            let skip = match self.direction {
                SchemaDirection::Input => annotations.is_output_only(),
                SchemaDirection::Output => annotations.is_input_only(),
            };
            if skip {
                continue;
            }

            let mut schema = self.build_field_schema(&field, visited);
            if let (Some(description), Value::Object(map)) = (field_comment(&field), &mut schema) {
                map.insert("description".to_string(), Value::String(description));
            }

            let name = field.json_name().to_string();
            if self.direction == SchemaDirection::Input && annotations.is_required() {
                required.push(Value::String(name.clone()));
            }
            properties.insert(name, schema);
        }

        let mut result = Map::new();
        result.insert("type".to_string(), json!("object"));
        result.insert("properties".to_string(), Value::Object(properties));
        result.insert("additionalProperties".to_string(), Value::Bool(false));
        if !required.is_empty() {
            result.insert("required".to_string(), Value::Array(required));
        }
        Value::Object(result)
    }

    /// Builds the schema for one field, including map and list wrapping.
    #[must_use]
    pub fn build_field_schema(&self, field: &FieldDescriptor, visited: &mut VisitedSet) -> Value {
        if field.is_map() {
            let value_schema = match field.kind() {
                Kind::Message(entry) => {
                    self.element_schema(&entry.map_entry_value_field().kind(), visited)
                }
                _ => json!({}),
            };
            return json!({"type": "object", "additionalProperties": value_schema});
        }
        if field.is_list() {
            let items = self.element_schema(&field.kind(), visited);
            return json!({"type": "array", "items": items});
        }
        self.element_schema(&field.kind(), visited)
    }

    /// Dispatches on a single-value kind: scalar, enum, or message.
    fn element_schema(&self, kind: &Kind, visited: &mut VisitedSet) -> Value {
        if let Some(scalar) = ScalarSchema::from_kind(kind) {
            return scalar.schema_for(self.direction);
        }
        match kind {
            Kind::Enum(descriptor) => enum_schema(descriptor),
            Kind::Message(descriptor) => self.nested_message_schema(descriptor, visited),
            _ => json!({}),
        }
    }

    /// Builds a nested message schema, resolving well-known types and cycles.
    fn nested_message_schema(
        &self,
        descriptor: &MessageDescriptor,
        visited: &mut VisitedSet,
    ) -> Value {
        let full_name = descriptor.full_name();
        if let Some(well_known) = WellKnownType::from_full_name(full_name) {
            return well_known.schema_for(self.direction);
        }
        let Some(mut guard) = visited.enter(full_name) else {
            debug!(message_type = full_name, "recursive message reference collapsed");
            return permissive_object();
        };
        self.build_message_schema(descriptor, guard.visited())
    }
}

/// Builds the string enumeration schema for an enum.
///
/// The zero value conventionally means "unspecified" and is omitted, unless
/// it is the only value declared.
#[must_use]
pub fn enum_schema(descriptor: &EnumDescriptor) -> Value {
    let mut names: Vec<Value> = descriptor
        .values()
        .filter(|value| value.number() != 0)
        .map(|value| Value::String(value.name().to_string()))
        .collect();
    if names.is_empty() {
        names = descriptor.values().map(|value| Value::String(value.name().to_string())).collect();
    }
    json!({"type": "string", "enum": names})
}

/// Schema accepting any object; used for recursive back-edges.
fn permissive_object() -> Value {
    json!({"type": "object", "additionalProperties": true})
}
