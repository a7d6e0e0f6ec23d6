// crates/proto-mcp-core/src/transcode.rs
// ============================================================================
// Module: Value Transcoder
// Description: JSON argument/result conversion for protobuf messages.
// Purpose: Decode tool-call arguments into requests and encode responses.
// Dependencies: prost-reflect, serde_json, thiserror, tracing
// ============================================================================

//! ## Overview
//! Tool calls carry untyped JSON objects. The [`Transcoder`] decodes those
//! objects into [`DynamicMessage`] values using the canonical protobuf JSON
//! mapping and encodes response messages back into JSON objects keyed by the
//! JSON-facing field names.
//!
//! Decoding is strict: a value whose shape does not match the declared field
//! kind fails the call. Unknown keys are rejected as well unless the
//! configuration relaxes it. An optional [`ArgPreprocessor`] runs before the
//! strict decode to normalize caller-supplied representations.
//!
//! The transcoder holds only immutable configuration; one instance can serve
//! concurrent calls. Configuration is fixed at construction.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use prost_reflect::DeserializeOptions;
use prost_reflect::DynamicMessage;
use prost_reflect::MessageDescriptor;
use prost_reflect::ReflectMessage;
use prost_reflect::SerializeOptions;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while converting a single call's arguments or result.
///
/// # Invariants
/// - Errors are local to one call; the transcoder stays usable afterwards.
#[derive(Debug, Error)]
pub enum TranscodeError {
    /// Arguments do not match the target message shape.
    #[error("decode error: {0}")]
    Decode(String),
    /// Response message could not be serialized.
    #[error("encode error: {0}")]
    Encode(String),
    /// Response serialized to a JSON value that is not an object.
    #[error("encoded result is not a JSON object: {0}")]
    NotAnObject(String),
}

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Rewrites call arguments before the strict structural decode.
pub trait ArgPreprocessor: Send + Sync {
    /// Returns the arguments to decode into `target`.
    fn preprocess(&self, target: &MessageDescriptor, args: Map<String, Value>)
    -> Map<String, Value>;
}

impl<F> ArgPreprocessor for F
where
    F: Fn(&MessageDescriptor, Map<String, Value>) -> Map<String, Value> + Send + Sync,
{
    fn preprocess(
        &self,
        target: &MessageDescriptor,
        args: Map<String, Value>,
    ) -> Map<String, Value> {
        self(target, args)
    }
}

/// Transcoder configuration, fixed once the [`Transcoder`] is built.
#[derive(Clone)]
pub struct TranscoderConfig {
    /// Optional argument preprocessing hook.
    pub preprocessor: Option<Arc<dyn ArgPreprocessor>>,
    /// Reject argument keys that name no field of the target message.
    pub deny_unknown_fields: bool,
}

impl TranscoderConfig {
    /// Returns the default configuration: no hook, unknown keys rejected.
    #[must_use]
    pub fn new() -> Self {
        Self {
            preprocessor: None,
            deny_unknown_fields: true,
        }
    }

    /// Installs an argument preprocessing hook.
    #[must_use]
    pub fn with_preprocessor(mut self, preprocessor: impl ArgPreprocessor + 'static) -> Self {
        self.preprocessor = Some(Arc::new(preprocessor));
        self
    }

    /// Sets whether unknown argument keys are rejected.
    #[must_use]
    pub fn with_deny_unknown_fields(mut self, deny: bool) -> Self {
        self.deny_unknown_fields = deny;
        self
    }
}

impl Default for TranscoderConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TranscoderConfig {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("TranscoderConfig")
            .field("preprocessor", &self.preprocessor.is_some())
            .field("deny_unknown_fields", &self.deny_unknown_fields)
            .finish()
    }
}

// ============================================================================
// SECTION: Transcoder
// ============================================================================

/// Converts between JSON objects and protobuf messages.
#[derive(Debug, Clone, Default)]
pub struct Transcoder {
    /// Immutable configuration.
    config: TranscoderConfig,
}

impl Transcoder {
    /// Creates a transcoder with the given configuration.
    #[must_use]
    pub fn new(config: TranscoderConfig) -> Self {
        Self {
            config,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &TranscoderConfig {
        &self.config
    }

    /// Decodes call arguments into `target`.
    ///
    /// An absent target (a method without input) decodes to `None`. Absent
    /// arguments are treated as an empty object.
    ///
    /// # Errors
    /// Returns [`TranscodeError::Decode`] when the arguments do not match the
    /// target message shape.
    pub fn decode(
        &self,
        args: Option<Map<String, Value>>,
        target: Option<&MessageDescriptor>,
    ) -> Result<Option<DynamicMessage>, TranscodeError> {
        let Some(target) = target else {
            return Ok(None);
        };
        self.decode_message(args, target).map(Some)
    }

    /// Decodes call arguments into a message of type `target`.
    ///
    /// # Errors
    /// Returns [`TranscodeError::Decode`] when the arguments do not match the
    /// target message shape.
    pub fn decode_message(
        &self,
        args: Option<Map<String, Value>>,
        target: &MessageDescriptor,
    ) -> Result<DynamicMessage, TranscodeError> {
        let mut args = args.unwrap_or_default();
        if let Some(preprocessor) = &self.config.preprocessor {
            args = preprocessor.preprocess(target, args);
        }
        let options =
            DeserializeOptions::new().deny_unknown_fields(self.config.deny_unknown_fields);
        DynamicMessage::deserialize_with_options(target.clone(), Value::Object(args), &options)
            .map_err(|err| {
                debug!(message_type = target.full_name(), error = %err, "argument decode failed");
                TranscodeError::Decode(err.to_string())
            })
    }

    /// Decodes call arguments into a generated message type.
    ///
    /// # Errors
    /// Returns [`TranscodeError::Decode`] when the arguments do not match the
    /// message shape.
    pub fn decode_into<T>(&self, args: Option<Map<String, Value>>) -> Result<T, TranscodeError>
    where
        T: ReflectMessage + Default,
    {
        let descriptor = T::default().descriptor();
        let message = self.decode_message(args, &descriptor)?;
        message.transcode_to::<T>().map_err(|err| TranscodeError::Decode(err.to_string()))
    }

    /// Encodes a response message into a JSON object.
    ///
    /// An absent message encodes to an empty object. Unpopulated fields are
    /// omitted and keys use the JSON-facing field names.
    ///
    /// # Errors
    /// Returns [`TranscodeError`] when serialization fails or does not yield
    /// an object.
    pub fn encode(
        &self,
        message: Option<&DynamicMessage>,
    ) -> Result<Map<String, Value>, TranscodeError> {
        let Some(message) = message else {
            return Ok(Map::new());
        };
        let options = SerializeOptions::new().use_proto_field_name(false).skip_default_fields(true);
        let value = message
            .serialize_with_options(serde_json::value::Serializer, &options)
            .map_err(|err| TranscodeError::Encode(err.to_string()))?;
        match value {
            Value::Object(map) => Ok(map),
            Value::Null => Ok(Map::new()),
            other => Err(TranscodeError::NotAnObject(json_kind(&other).to_string())),
        }
    }

    /// Encodes a generated message type into a JSON object.
    ///
    /// # Errors
    /// Returns [`TranscodeError`] when serialization fails or does not yield
    /// an object.
    pub fn encode_from<T>(&self, message: &T) -> Result<Map<String, Value>, TranscodeError>
    where
        T: ReflectMessage,
    {
        let dynamic = message.transcode_to_dynamic();
        self.encode(Some(&dynamic))
    }
}

/// Returns a stable label for a JSON value's kind.
const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
