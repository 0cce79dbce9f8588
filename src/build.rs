//! Pipeline Construction - Entry Resolution and Config Layering

use tracing::{debug, warn};

use crate::catalog::PluginRegistry;
use crate::config::{CustomPlugin, OverrideAction, PluginSpec, RawConfig, RawPluginEntry};
use crate::pipeline::ConfigError;

pub(crate) const FLOAT_PRECISION_KEY: &str = "floatPrecision";

/// Resolve an ordered list of raw entries into concrete pass specs.
/// Output order and length match the input 1:1. Never mutates the registry.
pub(crate) fn build_plugin_array(
    entries: &[RawPluginEntry],
    registry: &PluginRegistry,
) -> Result<Vec<PluginSpec>, ConfigError> {
    entries.iter().map(|entry| build_entry(entry, registry)).collect()
}

fn build_entry(
    entry: &RawPluginEntry,
    registry: &PluginRegistry,
) -> Result<PluginSpec, ConfigError> {
    match entry {
        RawPluginEntry::Name(name) => lookup(registry, name),
        RawPluginEntry::Override { name, action } => {
            let mut spec = lookup(registry, name)?;
            apply_override(&mut spec, action);
            Ok(spec)
        }
        RawPluginEntry::Custom(custom) => build_custom(custom, registry),
    }
}

fn build_custom(
    custom: &CustomPlugin,
    registry: &PluginRegistry,
) -> Result<PluginSpec, ConfigError> {
    match custom.transform {
        Some(transform) => Ok(PluginSpec {
            name: custom.name.clone(),
            kind: custom.kind,
            active: true,
            params: custom.params.clone().unwrap_or_default(),
            transform,
        }),
        // Legacy shape: a custom-looking entry with no entry point resolves
        // through the catalog under the same name.
        None => {
            let mut spec = lookup(registry, &custom.name)?;
            if let Some(params) = &custom.params {
                apply_override(&mut spec, &OverrideAction::Params(params.clone()));
            }
            Ok(spec)
        }
    }
}

fn lookup(registry: &PluginRegistry, name: &str) -> Result<PluginSpec, ConfigError> {
    registry
        .get(name)
        .map(|definition| definition.to_spec())
        .ok_or_else(|| ConfigError::UnknownPlugin(name.to_string()))
}

fn apply_override(spec: &mut PluginSpec, action: &OverrideAction) {
    match action {
        OverrideAction::Enable => spec.active = true,
        OverrideAction::Disable => spec.active = false,
        OverrideAction::Params(params) => {
            for (key, value) in params {
                spec.params.insert(key.clone(), value.clone());
            }
            spec.active = true;
        }
    }
}

/// Layer a user config onto an already-built default pipeline. Named
/// overrides mutate every matching spec in place; custom passes append at
/// the end; nothing is reordered.
pub(crate) fn extend_pipeline(
    pipeline: &mut Vec<PluginSpec>,
    user: &RawConfig,
    registry: &PluginRegistry,
) -> Result<(), ConfigError> {
    let Some(entries) = &user.plugins else {
        return Ok(());
    };

    for entry in entries {
        match entry {
            RawPluginEntry::Custom(custom) if custom.transform.is_some() => {
                pipeline.push(build_entry(entry, registry)?);
            }
            // Legacy merge shape: no entry point, so the entry acts as a
            // parameter override on whatever catalog passes share the name.
            RawPluginEntry::Custom(custom) => {
                let action = OverrideAction::Params(custom.params.clone().unwrap_or_default());
                apply_named_override(pipeline, &custom.name, &action);
            }
            RawPluginEntry::Override { name, action } => {
                apply_named_override(pipeline, name, action);
            }
            RawPluginEntry::Name(name) => {
                debug!(
                    pass = %name,
                    "bare name has no effect when layering onto the default pipeline"
                );
            }
        }
    }

    Ok(())
}

fn apply_named_override(pipeline: &mut [PluginSpec], name: &str, action: &OverrideAction) {
    let mut matched = false;
    for spec in pipeline.iter_mut().filter(|spec| spec.name == name) {
        apply_override(spec, action);
        matched = true;
    }
    if !matched {
        warn!(pass = %name, "override matches no pass in the pipeline; ignored");
    }
}

/// Overwrite the `floatPrecision` parameter on every pass that already
/// exposes it. Runs after all per-pass merges, so the global value wins over
/// any per-pass setting.
pub(crate) fn propagate_float_precision(pipeline: &mut [PluginSpec], precision: u8) {
    for spec in pipeline.iter_mut() {
        if spec.params.contains_key(FLOAT_PRECISION_KEY) {
            spec.params.insert(FLOAT_PRECISION_KEY.to_string(), precision.into());
        }
    }
}
