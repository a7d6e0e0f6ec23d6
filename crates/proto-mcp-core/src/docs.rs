// crates/proto-mcp-core/src/docs.rs
// ============================================================================
// Module: Descriptor Documentation
// Description: Leading-comment lookup for fields and methods.
// Purpose: Feed schema descriptions and tool descriptions from source comments.
// Dependencies: prost-reflect
// ============================================================================

//! ## Overview
//! Comments live in the file's `SourceCodeInfo`, keyed by the descriptor's
//! path within its `FileDescriptorProto`. Descriptor sets produced without
//! `--include_source_info` simply yield no documentation.

use prost_reflect::FieldDescriptor;
use prost_reflect::FileDescriptor;
use prost_reflect::MethodDescriptor;

/// Returns the normalized leading comment at `path`, if any.
#[must_use]
pub fn leading_comment(file: &FileDescriptor, path: &[i32]) -> Option<String> {
    let info = file.file_descriptor_proto().source_code_info.as_ref()?;
    let location = info.location.iter().find(|location| location.path.as_slice() == path)?;
    let normalized = normalize_comment(location.leading_comments.as_deref()?);
    (!normalized.is_empty()).then_some(normalized)
}

/// Returns the normalized leading comment of a field.
#[must_use]
pub fn field_comment(field: &FieldDescriptor) -> Option<String> {
    leading_comment(&field.parent_message().parent_file(), field.path())
}

/// Returns the normalized leading comment of a method.
#[must_use]
pub fn method_comment(method: &MethodDescriptor) -> Option<String> {
    leading_comment(&method.parent_service().parent_file(), method.path())
}

/// Collapses comment whitespace into single spaces and trims the result.
#[must_use]
pub fn normalize_comment(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
