// crates/proto-mcp-gen/src/lib.rs
// ============================================================================
// Module: Tool Contract Generator Library
// Description: Deterministic generator for tool contract artifacts.
// Purpose: Render tools.json and a Rust schema module from descriptor sets.
// Dependencies: proto-mcp-core, proto-mcp-config, serde_jcs, serde_json
// ============================================================================

//! ## Overview
//! This crate turns a serialized `FileDescriptorSet` into the artifacts a
//! tool-calling gateway is built from:
//!
//! - `tools.json`: every generated [`ToolContract`], canonical JSON.
//! - `<module>.rs`: a Rust module exposing `TOOL_NAMES` and one schema
//!   function per tool, each returning a `serde_json::json!` literal.
//!
//! ### Design Notes
//! - Output is deterministic: object keys are sorted and tool order follows
//!   service and method declaration order.
//! - Descriptor input is bounded by [`MAX_DESCRIPTOR_BYTES`].
//!
//! ## Index
//! - Public API: [`ArtifactGenerator`], [`GenError`], [`Artifact`]
//! - Emitters: [`emit_json`], [`emit_rust_literal`]
//! - Output helpers: [`write_artifacts`], [`check_artifacts`]

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod emit;
pub mod output;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io::Read;
use std::path::Path;
use std::path::PathBuf;

pub use emit::emit_json;
pub use emit::emit_rust_literal;
pub use output::check_artifacts;
pub use output::write_artifacts;
use proto_mcp_config::ProtoMcpConfig;
use proto_mcp_core::ToolContract;
use proto_mcp_core::ToolingOptions;
use proto_mcp_core::decode_descriptor_set;
use proto_mcp_core::prost_reflect::DescriptorPool;
use proto_mcp_core::tool_contracts;
use thiserror::Error;
use tracing::debug;

// ============================================================================
// CONSTANTS: Input limits and artifact names
// ============================================================================

/// Maximum descriptor set size accepted by the generator.
pub const MAX_DESCRIPTOR_BYTES: u64 = 16 * 1024 * 1024;

/// File name of the JSON contract artifact.
pub const TOOLS_JSON_NAME: &str = "tools.json";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised by the generator.
///
/// # Invariants
/// - Variant meanings are stable for automation and tests.
#[derive(Debug, Error)]
pub enum GenError {
    /// IO error while reading or writing files.
    #[error("io error: {0}")]
    Io(String),
    /// JSON serialization error.
    #[error("json error: {0}")]
    Json(String),
    /// Descriptor set could not be loaded or turned into tools.
    #[error("descriptor error: {0}")]
    Descriptor(String),
    /// Configuration could not be loaded or is invalid.
    #[error("config error: {0}")]
    Config(String),
    /// On-disk artifacts differ from regenerated output.
    #[error("drift detected: {0}")]
    Drift(String),
}

// ============================================================================
// SECTION: Artifacts
// ============================================================================

/// One generated file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Path relative to the output directory.
    pub path: PathBuf,
    /// Full file contents.
    pub contents: String,
}

/// Generator loaded with tool contracts.
///
/// # Invariants
/// - Tool order matches service and method declaration order.
/// - Rendering is deterministic for a fixed descriptor set and options.
#[derive(Debug, Clone)]
pub struct ArtifactGenerator {
    /// Tool contracts to render.
    contracts: Vec<ToolContract>,
    /// Emitted Rust module name.
    module_name: String,
}

impl ArtifactGenerator {
    /// Builds a generator from an already loaded descriptor pool.
    ///
    /// # Errors
    /// Returns [`GenError::Descriptor`] when tool contracts cannot be derived.
    pub fn from_pool(
        pool: &DescriptorPool,
        options: &ToolingOptions,
        module_name: impl Into<String>,
    ) -> Result<Self, GenError> {
        let contracts =
            tool_contracts(pool, options).map_err(|err| GenError::Descriptor(err.to_string()))?;
        Ok(Self {
            contracts,
            module_name: module_name.into(),
        })
    }

    /// Loads a descriptor set from disk and builds the generator.
    ///
    /// # Errors
    /// Returns [`GenError`] when the file cannot be read, exceeds
    /// [`MAX_DESCRIPTOR_BYTES`], or does not decode.
    pub fn load(
        descriptor_set: impl AsRef<Path>,
        options: &ToolingOptions,
        module_name: impl Into<String>,
    ) -> Result<Self, GenError> {
        let path = descriptor_set.as_ref();
        let bytes = read_descriptor_bytes(path)?;
        let pool =
            decode_descriptor_set(&bytes).map_err(|err| GenError::Descriptor(err.to_string()))?;
        debug!(path = %path.display(), files = pool.files().count(), "descriptor set loaded");
        Self::from_pool(&pool, options, module_name)
    }

    /// Builds the generator described by a validated configuration.
    ///
    /// # Errors
    /// Returns [`GenError`] under the same conditions as [`Self::load`].
    pub fn from_config(config: &ProtoMcpConfig) -> Result<Self, GenError> {
        Self::load(
            &config.generator.descriptor_set,
            &config.tooling_options(),
            config.generator.module_name.clone(),
        )
    }

    /// Returns the loaded tool contracts.
    #[must_use]
    pub fn contracts(&self) -> &[ToolContract] {
        &self.contracts
    }

    /// Returns the emitted module name.
    #[must_use]
    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    /// Renders `tools.json`.
    ///
    /// # Errors
    /// Returns [`GenError::Json`] when serialization fails.
    pub fn render_tools_json(&self) -> Result<String, GenError> {
        let value =
            serde_json::to_value(&self.contracts).map_err(|err| GenError::Json(err.to_string()))?;
        emit_json(&value)
    }

    /// Renders the Rust schema module.
    #[must_use]
    pub fn render_rust_module(&self) -> String {
        let mut out = String::new();
        out.push_str("// @generated by proto-mcp-gen. Do not edit.\n\n");
        out.push_str("//! Tool schemas generated from protobuf service descriptors.\n\n");
        out.push_str("/// Tool names in declaration order.\n");
        if self.contracts.is_empty() {
            out.push_str("pub const TOOL_NAMES: &[&str] = &[];\n");
        } else {
            out.push_str("pub const TOOL_NAMES: &[&str] = &[\n");
            for contract in &self.contracts {
                out.push_str(&format!("    {},\n", emit::rust_string(&contract.name)));
            }
            out.push_str("];\n");
        }
        for contract in &self.contracts {
            let ident = schema_fn_prefix(&contract.name);
            out.push('\n');
            push_schema_fn(
                &mut out,
                &format!("Input schema for `{}` (`{}`).", contract.name, contract.method),
                &format!("{ident}_input_schema"),
                &contract.input_schema,
            );
            if let Some(output_schema) = &contract.output_schema {
                out.push('\n');
                push_schema_fn(
                    &mut out,
                    &format!("Output schema for `{}` (`{}`).", contract.name, contract.method),
                    &format!("{ident}_output_schema"),
                    output_schema,
                );
            }
        }
        out
    }

    /// Renders every artifact with paths relative to the output directory.
    ///
    /// # Errors
    /// Returns [`GenError::Json`] when serialization fails.
    pub fn artifacts(&self) -> Result<Vec<Artifact>, GenError> {
        Ok(vec![
            Artifact {
                path: PathBuf::from(TOOLS_JSON_NAME),
                contents: self.render_tools_json()?,
            },
            Artifact {
                path: PathBuf::from(format!("{}.rs", self.module_name)),
                contents: self.render_rust_module(),
            },
        ])
    }
}

// ============================================================================
// SECTION: Rendering Helpers
// ============================================================================

/// Returns the function name prefix for a tool (`greeter.say_hello` becomes
/// `greeter_say_hello`).
fn schema_fn_prefix(tool_name: &str) -> String {
    tool_name.replace('.', "_")
}

/// Appends one schema-returning function.
fn push_schema_fn(out: &mut String, doc: &str, name: &str, schema: &serde_json::Value) {
    out.push_str(&format!("/// {doc}\n"));
    out.push_str("#[must_use]\n");
    out.push_str(&format!("pub fn {name}() -> serde_json::Value {{\n"));
    for line in emit_rust_literal(schema).lines() {
        out.push_str("    ");
        out.push_str(line);
        out.push('\n');
    }
    out.push_str("}\n");
}

// ============================================================================
// SECTION: Descriptor Input
// ============================================================================

/// Reads the descriptor set with size limits to avoid memory exhaustion.
fn read_descriptor_bytes(path: &Path) -> Result<Vec<u8>, GenError> {
    let file = fs::File::open(path).map_err(|err| GenError::Io(err.to_string()))?;
    let metadata = file.metadata().map_err(|err| GenError::Io(err.to_string()))?;
    if metadata.len() > MAX_DESCRIPTOR_BYTES {
        return Err(GenError::Descriptor(format!(
            "descriptor set exceeds {MAX_DESCRIPTOR_BYTES} bytes"
        )));
    }
    let mut bytes = Vec::new();
    let mut limited = file.take(MAX_DESCRIPTOR_BYTES + 1);
    limited.read_to_end(&mut bytes).map_err(|err| GenError::Io(err.to_string()))?;
    let size = u64::try_from(bytes.len()).map_err(|_| {
        GenError::Descriptor("descriptor set size exceeds addressable memory".to_string())
    })?;
    if size > MAX_DESCRIPTOR_BYTES {
        return Err(GenError::Descriptor(format!(
            "descriptor set exceeds {MAX_DESCRIPTOR_BYTES} bytes"
        )));
    }
    Ok(bytes)
}
