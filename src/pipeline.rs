//! Config Compilation - Single Entry Point
//!
//! CRITICAL: compile validates, layers, adjusts precision, and groups in one
//! pure pass-through. No retries, no partial output.

use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

use crate::build::{build_plugin_array, extend_pipeline, propagate_float_precision};
use crate::catalog::{PluginRegistry, DEFAULT_PIPELINE};
use crate::config::{CompiledConfig, RawConfig, RawPluginEntry};
use crate::grouping::group_passes;

#[cfg(feature = "test-hooks")]
use std::sync::atomic::{AtomicU32, Ordering};

#[cfg(feature = "test-hooks")]
static COMPILE_CALL_COUNT: AtomicU32 = AtomicU32::new(0);

#[cfg(feature = "test-hooks")]
pub fn get_compile_call_count() -> u32 {
    COMPILE_CALL_COUNT.load(Ordering::SeqCst)
}

#[cfg(feature = "test-hooks")]
pub fn reset_compile_call_count() {
    COMPILE_CALL_COUNT.store(0, Ordering::SeqCst);
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid plugins list: 'plugins' in config must be an array")]
    PluginsNotSequence,

    #[error("unknown plugin: {0}")]
    UnknownPlugin(String),

    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The config compiler - turns a raw user config into the batched pass plan
/// the traversal engine executes.
pub struct Compiler<'r> {
    registry: &'r PluginRegistry,
}

impl<'r> Compiler<'r> {
    pub fn new(registry: &'r PluginRegistry) -> Self {
        Self { registry }
    }

    /// Compile one config. Pure: the same registry and config always yield
    /// the same plan, and no state survives between calls, so compiling A,
    /// then B, then A again gives identical A-results.
    pub fn compile(&self, config: &RawConfig) -> Result<CompiledConfig, ConfigError> {
        #[cfg(feature = "test-hooks")]
        COMPILE_CALL_COUNT.fetch_add(1, Ordering::SeqCst);

        let mut pipeline = if config.full {
            // Full-replacement mode: the user's list is the whole pipeline.
            match &config.plugins {
                Some(entries) => build_plugin_array(entries, self.registry)?,
                None => Vec::new(),
            }
        } else {
            let defaults: Vec<RawPluginEntry> = DEFAULT_PIPELINE
                .iter()
                .map(|name| RawPluginEntry::Name((*name).to_string()))
                .collect();
            let mut pipeline = build_plugin_array(&defaults, self.registry)?;
            extend_pipeline(&mut pipeline, config, self.registry)?;
            pipeline
        };

        if let Some(precision) = config.float_precision {
            propagate_float_precision(&mut pipeline, precision);
        }

        let batches = group_passes(pipeline);
        debug!(batches = batches.len(), "config compiled");

        Ok(CompiledConfig {
            plugins: batches,
            multipass: config.multipass.unwrap_or(false),
            datauri: config.datauri,
            svg2js: config.svg2js.clone(),
            js2svg: config.js2svg.clone(),
        })
    }
}
