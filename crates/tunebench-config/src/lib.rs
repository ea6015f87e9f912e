// crates/tunebench-config/src/lib.rs
// ============================================================================
// Module: tunebench Config Library
// Description: Canonical config model, loading, and validation.
// Purpose: Single source of truth for tunebench.toml semantics.
// Dependencies: serde, toml
// ============================================================================

//! ## Overview
//! `tunebench-config` defines the configuration model shared by the lifecycle
//! runner: container images and names, resource limits, host directories,
//! knob definition paths, and the timeouts that bound every polling loop.
//! Configuration is loaded once and passed by reference; nothing here is
//! global.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod examples;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use examples::config_toml_example;
