//! VectorForge Core - SVG Optimization Pipeline Compiler
//!
//! # The Five Rules (Non-Negotiable)
//! 1. Order Is Data
//! 2. The Catalog Is Read-Only
//! 3. Compiled Output Owns Every Byte
//! 4. Grouping Never Reorders
//! 5. Inactive Passes Stay In The Plan

pub mod catalog;
pub mod config;
pub mod fingerprint;
pub mod grouping;
pub mod pipeline;

mod build;

pub use catalog::{
    builtin_catalog, CatalogEntry, DocumentNode, PassKind, PluginDefinition, PluginParams,
    PluginRegistry, TransformFn, DEFAULT_PIPELINE,
};
pub use config::{
    CompiledConfig, CustomPlugin, DataUriFormat, OverrideAction, PluginBatch, PluginSpec,
    RawConfig, RawPluginEntry,
};
pub use fingerprint::{canonical_json, pipeline_fingerprint, sha256_hex};
pub use grouping::group_passes;
pub use pipeline::{Compiler, ConfigError};

pub const COMPILER_VERSION: &str = env!("CARGO_PKG_VERSION");
