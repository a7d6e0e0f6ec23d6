// crates/proto-mcp-config/src/lib.rs
// ============================================================================
// Module: Proto MCP Config Library
// Description: Canonical config model and validation.
// Purpose: Single source of truth for proto-mcp.toml semantics.
// Dependencies: proto-mcp-core, serde, toml
// ============================================================================

//! ## Overview
//! `proto-mcp-config` defines the configuration model shared by the artifact
//! generator and by gateways embedding the transcoder. Loading is strict and
//! fail-closed; a validated config maps onto the core option structs.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
