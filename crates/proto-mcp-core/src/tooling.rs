// crates/proto-mcp-core/src/tooling.rs
// ============================================================================
// Module: Tool Contracts
// Description: RPC service methods exposed as schema-described tools.
// Purpose: Derive tool names, descriptions, and schemas from a descriptor pool.
// Dependencies: prost-reflect, serde_json, thiserror, tracing
// ============================================================================

//! ## Overview
//! Every selected service method becomes one tool. The tool name is the
//! service and method names in `snake_case` joined by a dot
//! (`Greeter.SayHello` becomes `greeter.say_hello`). Input schemas come from
//! the request message; output schemas from the response message.
//!
//! A [`ToolBinding`] keeps the descriptors next to the contract so call-time
//! conversion goes through the same message types the schemas describe.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use prost_reflect::DescriptorPool;
use prost_reflect::DynamicMessage;
use prost_reflect::MessageDescriptor;
use prost_reflect::MethodDescriptor;
use prost_reflect::ReflectMessage;
use prost_reflect::ServiceDescriptor;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::docs::method_comment;
use crate::schema::SchemaBuilder;
use crate::schema::SchemaDirection;
use crate::transcode::TranscodeError;
use crate::transcode::Transcoder;
use crate::types::ToolContract;
use crate::types::ToolingOptions;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while deriving tool contracts.
#[derive(Debug, Error)]
pub enum ToolingError {
    /// Descriptor set could not be decoded or lacks a requested service.
    #[error("descriptor error: {0}")]
    Descriptor(String),
    /// Two methods map to the same tool name.
    #[error("duplicate tool name: {0}")]
    DuplicateTool(String),
}

// ============================================================================
// SECTION: Descriptor Input
// ============================================================================

/// Decodes a serialized `FileDescriptorSet` into a descriptor pool.
///
/// # Errors
/// Returns [`ToolingError::Descriptor`] when the bytes are not a valid,
/// self-contained descriptor set.
pub fn decode_descriptor_set(bytes: &[u8]) -> Result<DescriptorPool, ToolingError> {
    DescriptorPool::decode(bytes).map_err(|err| ToolingError::Descriptor(err.to_string()))
}

// ============================================================================
// SECTION: Tool Bindings
// ============================================================================

/// A tool contract together with the message types it converts.
#[derive(Debug, Clone)]
pub struct ToolBinding {
    /// Generated contract.
    contract: ToolContract,
    /// Request message type.
    input: MessageDescriptor,
    /// Response message type.
    output: MessageDescriptor,
}

impl ToolBinding {
    /// Builds the binding for one method.
    #[must_use]
    pub fn for_method(method: &MethodDescriptor, options: &ToolingOptions) -> Self {
        let input = method.input();
        let output = method.output();
        let description = method_comment(method)
            .unwrap_or_else(|| format!("Calls {}.", method.full_name()));
        let output_schema = options
            .emit_output_schemas
            .then(|| SchemaBuilder::new(SchemaDirection::Output).message_schema(&output));
        let contract = ToolContract {
            name: tool_name(&method.parent_service(), method),
            description,
            service: method.parent_service().full_name().to_string(),
            method: method.full_name().to_string(),
            input_type: input.full_name().to_string(),
            output_type: output.full_name().to_string(),
            input_schema: SchemaBuilder::new(SchemaDirection::Input).message_schema(&input),
            output_schema,
        };
        Self {
            contract,
            input,
            output,
        }
    }

    /// Returns the tool contract.
    #[must_use]
    pub const fn contract(&self) -> &ToolContract {
        &self.contract
    }

    /// Returns the request message type.
    #[must_use]
    pub const fn input(&self) -> &MessageDescriptor {
        &self.input
    }

    /// Returns the response message type.
    #[must_use]
    pub const fn output(&self) -> &MessageDescriptor {
        &self.output
    }

    /// Decodes call arguments into the request message.
    ///
    /// # Errors
    /// Returns [`TranscodeError::Decode`] when the arguments do not match.
    pub fn decode_arguments(
        &self,
        transcoder: &Transcoder,
        args: Option<Map<String, Value>>,
    ) -> Result<DynamicMessage, TranscodeError> {
        transcoder.decode_message(args, &self.input)
    }

    /// Encodes a response message into the call result object.
    ///
    /// # Errors
    /// Returns [`TranscodeError::Encode`] when the message is not of the
    /// response type or cannot be serialized.
    pub fn encode_result(
        &self,
        transcoder: &Transcoder,
        response: &DynamicMessage,
    ) -> Result<Map<String, Value>, TranscodeError> {
        let actual = response.descriptor();
        if actual != self.output {
            return Err(TranscodeError::Encode(format!(
                "expected {}, got {}",
                self.output.full_name(),
                actual.full_name()
            )));
        }
        transcoder.encode(Some(response))
    }
}

/// Builds tool bindings for every selected method in the pool.
///
/// Services are visited in pool order and methods in declaration order.
///
/// # Errors
/// Returns [`ToolingError`] when an allow-listed service is missing or two
/// methods produce the same tool name.
pub fn tool_bindings(
    pool: &DescriptorPool,
    options: &ToolingOptions,
) -> Result<Vec<ToolBinding>, ToolingError> {
    for wanted in &options.services {
        if pool.get_service_by_name(wanted).is_none() {
            return Err(ToolingError::Descriptor(format!("unknown service: {wanted}")));
        }
    }

    let mut names = BTreeSet::new();
    let mut bindings = Vec::new();
    for service in pool.services() {
        if !options.services.is_empty()
            && !options.services.iter().any(|name| name == service.full_name())
        {
            continue;
        }
        for method in service.methods() {
            let streaming = method.is_client_streaming() || method.is_server_streaming();
            if streaming && !options.include_streaming {
                debug!(method = method.full_name(), "skipping streaming method");
                continue;
            }
            let binding = ToolBinding::for_method(&method, options);
            if !names.insert(binding.contract.name.clone()) {
                return Err(ToolingError::DuplicateTool(binding.contract.name));
            }
            debug!(
                tool = %binding.contract.name,
                method = method.full_name(),
                "tool contract built"
            );
            bindings.push(binding);
        }
    }
    Ok(bindings)
}

/// Builds tool contracts for every selected method in the pool.
///
/// # Errors
/// Returns [`ToolingError`] under the same conditions as [`tool_bindings`].
pub fn tool_contracts(
    pool: &DescriptorPool,
    options: &ToolingOptions,
) -> Result<Vec<ToolContract>, ToolingError> {
    Ok(tool_bindings(pool, options)?.into_iter().map(|binding| binding.contract).collect())
}

// ============================================================================
// SECTION: Naming
// ============================================================================

/// Returns the tool name for a service method.
#[must_use]
pub fn tool_name(service: &ServiceDescriptor, method: &MethodDescriptor) -> String {
    format!("{}.{}", snake_case(service.name()), snake_case(method.name()))
}

/// Converts a `PascalCase` identifier into `snake_case`.
///
/// Acronym runs stay together: `HTTPGet` becomes `http_get`.
#[must_use]
pub fn snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (index, ch) in chars.iter().enumerate() {
        if ch.is_ascii_uppercase() && index > 0 {
            let previous = chars[index - 1];
            let next_lower = chars.get(index + 1).is_some_and(char::is_ascii_lowercase);
            let boundary = previous.is_ascii_lowercase()
                || previous.is_ascii_digit()
                || (previous.is_ascii_uppercase() && next_lower);
            if boundary && !out.ends_with('_') {
                out.push('_');
            }
        }
        out.push(ch.to_ascii_lowercase());
    }
    out
}
