// crates/proto-mcp-gen/src/main.rs
// ============================================================================
// Module: Tool Contract Generator CLI
// Description: CLI entrypoint for artifact generation and drift checks.
// Purpose: Produce deterministic tool artifacts from protobuf descriptors.
// Dependencies: clap, proto-mcp-config, proto-mcp-gen, tracing-subscriber
// ============================================================================

//! ## Overview
//! `proto-mcp-gen generate` renders `tools.json` and the Rust schema module
//! into the output directory. `proto-mcp-gen check` regenerates in memory and
//! fails when the on-disk artifacts differ.
//!
//! Settings come from `proto-mcp.toml` (or `PROTO_MCP_CONFIG`); command-line
//! flags override the file. Without a config file, `--descriptor-set` is
//! required. Log verbosity follows `PROTO_MCP_LOG` (default `warn`).

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use proto_mcp_config::ProtoMcpConfig;
use proto_mcp_gen::ArtifactGenerator;
use proto_mcp_gen::GenError;
use proto_mcp_gen::check_artifacts;
use proto_mcp_gen::write_artifacts;
use tracing_subscriber::EnvFilter;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Environment variable selecting the log filter.
const LOG_ENV_VAR: &str = "PROTO_MCP_LOG";

/// CLI arguments for artifact generation.
#[derive(Debug, Parser)]
#[command(name = "proto-mcp-gen", about = "Generate tool contracts from protobuf descriptors.")]
struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Supported CLI subcommands.
#[derive(Debug, Subcommand)]
enum Command {
    /// Generate artifacts.
    Generate(GenArgs),
    /// Verify artifacts match the generated output.
    Check(GenArgs),
}

/// Inputs shared by both subcommands.
#[derive(Debug, Args)]
struct GenArgs {
    /// Config file path.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Serialized `FileDescriptorSet` input.
    #[arg(long, value_name = "FILE")]
    descriptor_set: Option<PathBuf>,
    /// Output directory for artifacts.
    #[arg(long, value_name = "DIR")]
    out_dir: Option<PathBuf>,
}

// ============================================================================
// SECTION: Command Dispatch
// ============================================================================

/// CLI entrypoint.
fn main() -> ExitCode {
    init_tracing();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report_error(&err),
    }
}

/// Dispatches the CLI command.
fn run() -> Result<(), GenError> {
    let cli = Cli::parse();
    match cli.command {
        Command::Generate(args) => {
            let config = resolve_config(args)?;
            let generator = ArtifactGenerator::from_config(&config)?;
            write_artifacts(&config.generator.output_dir, &generator.artifacts()?)
        }
        Command::Check(args) => {
            let config = resolve_config(args)?;
            let generator = ArtifactGenerator::from_config(&config)?;
            check_artifacts(&config.generator.output_dir, &generator.artifacts()?)
        }
    }
}

/// Loads the config file, if any, and applies command-line overrides.
fn resolve_config(args: GenArgs) -> Result<ProtoMcpConfig, GenError> {
    let located = ProtoMcpConfig::locate(args.config.as_deref())
        .map_err(|err| GenError::Config(err.to_string()))?;
    let mut config = match (located, args.descriptor_set.clone()) {
        (Some(path), _) => {
            ProtoMcpConfig::load_from(&path).map_err(|err| GenError::Config(err.to_string()))?
        }
        (None, Some(descriptor_set)) => ProtoMcpConfig::with_descriptor_set(descriptor_set),
        (None, None) => {
            return Err(GenError::Config(
                "no proto-mcp.toml found; pass --config or --descriptor-set".to_string(),
            ));
        }
    };
    if let Some(descriptor_set) = args.descriptor_set {
        config.generator.descriptor_set = descriptor_set;
    }
    if let Some(out_dir) = args.out_dir {
        config.generator.output_dir = out_dir;
    }
    config.validate().map_err(|err| GenError::Config(err.to_string()))?;
    Ok(config)
}

/// Installs the stderr log subscriber.
fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
}

/// Reports a CLI error to stderr.
fn report_error(err: &GenError) -> ExitCode {
    let mut stderr = std::io::stderr();
    let _ = writeln!(stderr, "{err}");
    ExitCode::FAILURE
}
