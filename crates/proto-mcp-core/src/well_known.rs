// crates/proto-mcp-core/src/well_known.rs
// ============================================================================
// Module: Well-Known Types
// Description: Closed table of protobuf well-known types and their JSON schemas.
// Purpose: Describe wrappers/containers by their JSON mapping, not their fields.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! Well-known types have a canonical JSON representation that differs from
//! their declared structure (a `Timestamp` is an RFC 3339 string, not an
//! object with `seconds`/`nanos`). The schema builder consults this table by
//! fully-qualified name before it would otherwise recurse into a message.
//!
//! The set is fixed by the protobuf ecosystem, so it is modeled as a closed
//! enum rather than a registry.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use serde_json::json;

use crate::schema::ScalarSchema;
use crate::schema::SchemaDirection;

// ============================================================================
// SECTION: Well-Known Table
// ============================================================================

/// Well-known message types with a specialized JSON schema.
///
/// # Invariants
/// - [`WellKnownType::full_name`] and [`WellKnownType::from_full_name`] are inverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WellKnownType {
    /// `google.protobuf.Timestamp`.
    Timestamp,
    /// `google.protobuf.Duration`.
    Duration,
    /// `google.protobuf.Struct`.
    Struct,
    /// `google.protobuf.Value`.
    Value,
    /// `google.protobuf.ListValue`.
    ListValue,
    /// `google.protobuf.Empty`.
    Empty,
    /// `google.protobuf.StringValue`.
    StringValue,
    /// `google.protobuf.BoolValue`.
    BoolValue,
    /// `google.protobuf.Int32Value`.
    Int32Value,
    /// `google.protobuf.Int64Value`.
    Int64Value,
    /// `google.protobuf.UInt32Value`.
    UInt32Value,
    /// `google.protobuf.UInt64Value`.
    UInt64Value,
    /// `google.protobuf.FloatValue`.
    FloatValue,
    /// `google.protobuf.DoubleValue`.
    DoubleValue,
    /// `google.protobuf.BytesValue`.
    BytesValue,
}

impl WellKnownType {
    /// Every well-known type, in table order.
    pub const ALL: [Self; 15] = [
        Self::Timestamp,
        Self::Duration,
        Self::Struct,
        Self::Value,
        Self::ListValue,
        Self::Empty,
        Self::StringValue,
        Self::BoolValue,
        Self::Int32Value,
        Self::Int64Value,
        Self::UInt32Value,
        Self::UInt64Value,
        Self::FloatValue,
        Self::DoubleValue,
        Self::BytesValue,
    ];

    /// Looks up a well-known type by fully-qualified message name.
    #[must_use]
    pub fn from_full_name(full_name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|candidate| candidate.full_name() == full_name)
    }

    /// Returns the fully-qualified message name.
    #[must_use]
    pub const fn full_name(self) -> &'static str {
        match self {
            Self::Timestamp => "google.protobuf.Timestamp",
            Self::Duration => "google.protobuf.Duration",
            Self::Struct => "google.protobuf.Struct",
            Self::Value => "google.protobuf.Value",
            Self::ListValue => "google.protobuf.ListValue",
            Self::Empty => "google.protobuf.Empty",
            Self::StringValue => "google.protobuf.StringValue",
            Self::BoolValue => "google.protobuf.BoolValue",
            Self::Int32Value => "google.protobuf.Int32Value",
            Self::Int64Value => "google.protobuf.Int64Value",
            Self::UInt32Value => "google.protobuf.UInt32Value",
            Self::UInt64Value => "google.protobuf.UInt64Value",
            Self::FloatValue => "google.protobuf.FloatValue",
            Self::DoubleValue => "google.protobuf.DoubleValue",
            Self::BytesValue => "google.protobuf.BytesValue",
        }
    }

    /// Returns the JSON schema for the type's canonical JSON mapping.
    #[must_use]
    pub fn schema(self) -> Value {
        match self {
            Self::Timestamp => json!({"type": "string", "format": "date-time"}),
            Self::Duration => json!({"type": "string"}),
            Self::Struct => json!({"type": "object", "additionalProperties": true}),
            Self::Value => json!({}),
            Self::ListValue => json!({"type": "array"}),
            Self::Empty => json!({"type": "object", "properties": {}, "additionalProperties": false}),
            Self::StringValue => ScalarSchema::String.schema(),
            Self::BoolValue => ScalarSchema::Boolean.schema(),
            Self::Int32Value | Self::UInt32Value => ScalarSchema::Int32.schema(),
            Self::Int64Value | Self::UInt64Value => ScalarSchema::Int64.schema(),
            Self::FloatValue => ScalarSchema::Float.schema(),
            Self::DoubleValue => ScalarSchema::Double.schema(),
            Self::BytesValue => ScalarSchema::Bytes.schema(),
        }
    }

    /// Returns the schema for values travelling in `direction`.
    #[must_use]
    pub fn schema_for(self, direction: SchemaDirection) -> Value {
        match self {
            Self::Int64Value | Self::UInt64Value => ScalarSchema::Int64.schema_for(direction),
            _ => self.schema(),
        }
    }

    /// Returns true when the canonical JSON form is always an object.
    #[must_use]
    pub const fn is_object(self) -> bool {
        matches!(self, Self::Struct | Self::Empty)
    }
}
