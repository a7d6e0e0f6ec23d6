// crates/proto-mcp-config/src/config.rs
// ============================================================================
// Module: Proto MCP Configuration
// Description: Configuration loading and validation for generator and runtime.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: proto-mcp-core, serde, toml, tracing
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Unknown keys are rejected and every section is validated before use.
//!
//! ```toml
//! [generator]
//! descriptor_set = "descriptors.binpb"
//! services = ["demo.v1.Greeter"]
//! output_dir = "generated"
//! module_name = "mcp_tools"
//!
//! [transcode]
//! normalize_enum_labels = true
//! ```

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use proto_mcp_core::EnumLabelNormalizer;
use proto_mcp_core::ToolingOptions;
use proto_mcp_core::TranscoderConfig;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "proto-mcp.toml";
/// Environment variable overriding the config path.
pub const CONFIG_ENV_VAR: &str = "PROTO_MCP_CONFIG";
/// Maximum config file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum number of allow-listed services.
pub(crate) const MAX_SERVICES: usize = 256;
/// Maximum length of one fully-qualified service name.
pub(crate) const MAX_SERVICE_NAME_LENGTH: usize = 512;

/// Rust keywords that cannot name the emitted module.
const RUST_KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum", "extern",
    "false", "fn", "for", "gen", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut",
    "pub", "ref", "return", "self", "Self", "static", "struct", "super", "trait", "true", "type",
    "unsafe", "use", "where", "while",
];

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProtoMcpConfig {
    /// Artifact generation settings.
    pub generator: GeneratorConfig,
    /// Schema generation settings.
    #[serde(default)]
    pub schema: SchemaConfig,
    /// Runtime transcoding settings.
    #[serde(default)]
    pub transcode: TranscodeConfig,
}

impl ProtoMcpConfig {
    /// Builds a default configuration around a descriptor set path.
    #[must_use]
    pub fn with_descriptor_set(descriptor_set: PathBuf) -> Self {
        Self {
            generator: GeneratorConfig::with_descriptor_set(descriptor_set),
            schema: SchemaConfig::default(),
            transcode: TranscodeConfig::default(),
        }
    }

    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        Self::load_from(&resolved)
    }

    /// Loads configuration from an explicit path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        check_path_limits("config path", path)?;
        let bytes = fs::read(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        debug!(path = %path.display(), services = config.generator.services.len(), "config loaded");
        Ok(config)
    }

    /// Returns the config file to load, if one is configured or present.
    ///
    /// An explicit path or the environment override is always returned; the
    /// default filename only when it exists in the working directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the resolved path breaks length limits.
    pub fn locate(path: Option<&Path>) -> Result<Option<PathBuf>, ConfigError> {
        let resolved = resolve_path(path)?;
        let explicit = path.is_some() || env::var_os(CONFIG_ENV_VAR).is_some();
        Ok((explicit || resolved.is_file()).then_some(resolved))
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.generator.validate()
    }

    /// Returns the tool selection options for the core crate.
    #[must_use]
    pub fn tooling_options(&self) -> ToolingOptions {
        ToolingOptions {
            services: self.generator.services.clone(),
            include_streaming: self.generator.include_streaming,
            emit_output_schemas: self.schema.emit_output_schemas,
        }
    }

    /// Returns the transcoder configuration for the core crate.
    #[must_use]
    pub fn transcoder_config(&self) -> TranscoderConfig {
        let config =
            TranscoderConfig::new().with_deny_unknown_fields(self.transcode.deny_unknown_fields);
        if self.transcode.normalize_enum_labels {
            config.with_preprocessor(EnumLabelNormalizer)
        } else {
            config
        }
    }
}

/// Artifact generation configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Serialized `FileDescriptorSet` to read.
    pub descriptor_set: PathBuf,
    /// Fully-qualified services to expose; empty selects all.
    #[serde(default)]
    pub services: Vec<String>,
    /// Directory receiving generated artifacts.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Rust module name for the emitted source file.
    #[serde(default = "default_module_name")]
    pub module_name: String,
    /// Expose streaming methods as tools.
    #[serde(default)]
    pub include_streaming: bool,
}

impl GeneratorConfig {
    /// Builds defaults around a descriptor set path.
    #[must_use]
    pub fn with_descriptor_set(descriptor_set: PathBuf) -> Self {
        Self {
            descriptor_set,
            services: Vec::new(),
            output_dir: default_output_dir(),
            module_name: default_module_name(),
            include_streaming: false,
        }
    }

    /// Validates generator settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a setting is out of bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_path_limits("generator.descriptor_set", &self.descriptor_set)?;
        check_path_limits("generator.output_dir", &self.output_dir)?;
        if self.output_dir.components().any(|component| component == Component::ParentDir) {
            return Err(ConfigError::Invalid(
                "generator.output_dir must not contain '..'".to_string(),
            ));
        }
        if !is_rust_identifier(&self.module_name) {
            return Err(ConfigError::Invalid(format!(
                "generator.module_name is not a valid rust identifier: {}",
                self.module_name
            )));
        }
        if self.services.len() > MAX_SERVICES {
            return Err(ConfigError::Invalid("generator.services exceeds max entries".to_string()));
        }
        let mut seen = BTreeSet::new();
        for service in &self.services {
            if !is_dotted_identifier(service) {
                return Err(ConfigError::Invalid(format!(
                    "generator.services entry is not a qualified name: {service}"
                )));
            }
            if !seen.insert(service.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "generator.services entry is duplicated: {service}"
                )));
            }
        }
        Ok(())
    }
}

/// Schema generation configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaConfig {
    /// Attach response schemas to tool contracts.
    #[serde(default = "default_true")]
    pub emit_output_schemas: bool,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            emit_output_schemas: true,
        }
    }
}

/// Runtime transcoding configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TranscodeConfig {
    /// Reject argument keys that name no field.
    #[serde(default = "default_true")]
    pub deny_unknown_fields: bool,
    /// Rewrite loose enum labels before decoding.
    #[serde(default)]
    pub normalize_enum_labels: bool,
}

impl Default for TranscodeConfig {
    fn default() -> Self {
        Self {
            deny_unknown_fields: true,
            normalize_enum_labels: false,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Picks the explicit path, then `PROTO_MCP_CONFIG`, then the default name.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    let resolved = match (path, env::var_os(CONFIG_ENV_VAR)) {
        (Some(path), _) => path.to_path_buf(),
        (None, Some(env_path)) => PathBuf::from(env_path),
        (None, None) => PathBuf::from(DEFAULT_CONFIG_NAME),
    };
    check_path_limits("config path", &resolved)?;
    Ok(resolved)
}

/// Rejects empty paths and paths beyond the total or per-component limits.
fn check_path_limits(label: &str, path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.trim().is_empty() {
        return Err(ConfigError::Invalid(format!("{label} is empty")));
    }
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!(
            "{label} is longer than {MAX_TOTAL_PATH_LENGTH} bytes"
        )));
    }
    let oversized = path
        .components()
        .any(|component| component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH);
    if oversized {
        return Err(ConfigError::Invalid(format!(
            "{label} has a component longer than {MAX_PATH_COMPONENT_LENGTH} bytes"
        )));
    }
    Ok(())
}

/// Returns true for `[A-Za-z_][A-Za-z0-9_]*` that is not a keyword or `_`.
fn is_rust_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
        && value != "_"
        && !RUST_KEYWORDS.contains(&value)
}

/// Returns true for dot-separated protobuf identifiers.
fn is_dotted_identifier(value: &str) -> bool {
    value.len() <= MAX_SERVICE_NAME_LENGTH
        && value.split('.').all(|segment| {
            let mut chars = segment.chars();
            chars.next().is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
                && chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
        })
}

/// Default output directory.
fn default_output_dir() -> PathBuf {
    PathBuf::from("generated")
}

/// Default emitted module name.
fn default_module_name() -> String {
    "mcp_tools".to_string()
}

/// Serde default for flags that are on unless disabled.
const fn default_true() -> bool {
    true
}

// ============================================================================
// SECTION: Tests
// ============================================================================
