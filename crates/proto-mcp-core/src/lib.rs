// crates/proto-mcp-core/src/lib.rs
// ============================================================================
// Module: Proto MCP Core Library
// Description: Translation core between protobuf RPC methods and JSON tools.
// Purpose: Build tool JSON schemas and convert call payloads at runtime.
// Dependencies: prost, prost-reflect, serde, serde_json, thiserror, tracing
// ============================================================================

//! ## Overview
//! This crate translates protobuf service definitions into tool contracts a
//! tool-calling gateway can list, and converts call payloads in both
//! directions when those tools are invoked.
//!
//! - [`annotations`] recovers field-behavior annotations from raw option bytes.
//! - [`schema`] maps message descriptors to JSON Schema, consulting the
//!   annotations and the [`well_known`] table and breaking recursive cycles.
//! - [`transcode`] decodes JSON arguments into messages and encodes results.
//! - [`tooling`] turns each service method into a [`ToolContract`].
//!
//! The schema a tool advertises and the JSON the transcoder accepts follow the
//! same canonical protobuf JSON mapping, so anything valid against the schema
//! decodes.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod annotations;
pub mod docs;
pub mod enum_labels;
pub mod schema;
pub mod tooling;
pub mod transcode;
pub mod types;
pub mod well_known;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use annotations::FieldAnnotations;
pub use enum_labels::EnumLabelNormalizer;
pub use prost_reflect;
pub use schema::SchemaBuilder;
pub use schema::SchemaDirection;
pub use schema::VisitedSet;
pub use tooling::ToolBinding;
pub use tooling::ToolingError;
pub use tooling::decode_descriptor_set;
pub use tooling::tool_bindings;
pub use tooling::tool_contracts;
pub use transcode::ArgPreprocessor;
pub use transcode::TranscodeError;
pub use transcode::Transcoder;
pub use transcode::TranscoderConfig;
pub use types::ToolContract;
pub use types::ToolDefinition;
pub use types::ToolingOptions;
pub use well_known::WellKnownType;
