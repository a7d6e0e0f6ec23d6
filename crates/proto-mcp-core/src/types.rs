// crates/proto-mcp-core/src/types.rs
// ============================================================================
// Module: Contract Types
// Description: Shared data models for generated tool contracts.
// Purpose: Provide canonical shapes for tool listings and emitted artifacts.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Tool contracts pair a tool name with the JSON schemas derived from an RPC
//! method's request and response messages. They are the unit the emitter
//! serializes and the shape a tool-calling gateway lists to its clients.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

// ============================================================================
// SECTION: Tooling Contracts
// ============================================================================

/// Options controlling which methods become tools and what is emitted.
///
/// # Invariants
/// - An empty `services` list selects every service in the pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolingOptions {
    /// Fully-qualified service names to expose.
    pub services: Vec<String>,
    /// Expose client- or server-streaming methods as tools.
    pub include_streaming: bool,
    /// Attach response schemas to contracts.
    pub emit_output_schemas: bool,
}

impl Default for ToolingOptions {
    fn default() -> Self {
        Self {
            services: Vec::new(),
            include_streaming: false,
            emit_output_schemas: true,
        }
    }
}

/// Tool definition used by tool listings.
///
/// # Invariants
/// - `input_schema` is an object schema with `additionalProperties: false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name.
    pub name: String,
    /// Tool description for clients.
    pub description: String,
    /// JSON schema for tool input.
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Tool contract with request and response schemas for one RPC method.
///
/// # Invariants
/// - `name` is unique within one generated contract set.
/// - `input_type` and `output_type` are fully-qualified message names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolContract {
    /// Tool name (`service.method` in `snake_case`).
    pub name: String,
    /// Tool description.
    pub description: String,
    /// Fully-qualified service name.
    pub service: String,
    /// Fully-qualified method name.
    pub method: String,
    /// Fully-qualified request message name.
    pub input_type: String,
    /// Fully-qualified response message name.
    pub output_type: String,
    /// JSON schema for tool input payload.
    pub input_schema: Value,
    /// JSON schema for tool response payload, when emitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_schema: Option<Value>,
}

impl ToolContract {
    /// Returns the listing view of this contract.
    #[must_use]
    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name.clone(),
            description: self.description.clone(),
            input_schema: self.input_schema.clone(),
        }
    }
}
