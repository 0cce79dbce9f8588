//! Configuration Model - Raw Input and Compiled Output

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

use crate::catalog::{PassKind, PluginParams, TransformFn};
use crate::pipeline::ConfigError;

/// Caller-supplied configuration, as accepted by [`crate::Compiler`].
///
/// The JSON wire shape is camelCase. Custom passes carry function pointers
/// and are therefore constructible only through the programmatic API, never
/// from JSON.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawConfig {
    #[serde(default)]
    pub plugins: Option<Vec<RawPluginEntry>>,
    /// Full-replacement mode: the supplied `plugins` list is the whole
    /// pipeline and the stock defaults are not consulted.
    #[serde(default)]
    pub full: bool,
    #[serde(default)]
    pub multipass: Option<bool>,
    /// Global numeric precision, pushed into every pass that exposes a
    /// `floatPrecision` parameter.
    #[serde(default)]
    pub float_precision: Option<u8>,
    #[serde(default)]
    pub datauri: Option<DataUriFormat>,
    /// Parser layer options, copied through untouched.
    #[serde(default)]
    pub svg2js: Option<Map<String, Value>>,
    /// Serializer layer options, copied through untouched.
    #[serde(default)]
    pub js2svg: Option<Map<String, Value>>,
}

impl RawConfig {
    /// Decode a config from raw JSON. The shape contract is enforced before
    /// typed deserialization: a `plugins` key that is not an array is a
    /// configuration error, not a decode error.
    pub fn from_json_value(value: Value) -> Result<Self, ConfigError> {
        if let Some(plugins) = value.get("plugins") {
            if !plugins.is_array() {
                return Err(ConfigError::PluginsNotSequence);
            }
        }
        Ok(serde_json::from_value(value)?)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        Self::from_json_value(serde_json::from_str(raw)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }
}

/// One entry of a raw `plugins` list.
#[derive(Debug, Clone)]
pub enum RawPluginEntry {
    /// Bare pass name; catalog defaults apply.
    Name(String),
    /// Toggle or parameter override for a catalog pass.
    Override { name: String, action: OverrideAction },
    /// Caller-supplied pass, built directly rather than looked up.
    Custom(CustomPlugin),
}

impl RawPluginEntry {
    /// The pass name this entry refers to.
    pub fn name(&self) -> &str {
        match self {
            RawPluginEntry::Name(name) => name,
            RawPluginEntry::Override { name, .. } => name,
            RawPluginEntry::Custom(custom) => &custom.name,
        }
    }

    pub fn custom(name: impl Into<String>, kind: PassKind, transform: TransformFn) -> Self {
        RawPluginEntry::Custom(CustomPlugin {
            name: name.into(),
            kind,
            transform: Some(transform),
            params: None,
        })
    }

    pub fn custom_with_params(
        name: impl Into<String>,
        kind: PassKind,
        transform: TransformFn,
        params: PluginParams,
    ) -> Self {
        RawPluginEntry::Custom(CustomPlugin {
            name: name.into(),
            kind,
            transform: Some(transform),
            params: Some(params),
        })
    }
}

/// The three things an override may do to a named pass.
#[derive(Debug, Clone)]
pub enum OverrideAction {
    /// `name: true` - activate, params untouched.
    Enable,
    /// `name: false` - deactivate, params untouched.
    Disable,
    /// `name: {..}` - shallow-merge params (entry value wins) and activate.
    Params(PluginParams),
}

/// A pass supplied by the caller instead of the catalog.
#[derive(Debug, Clone)]
pub struct CustomPlugin {
    pub name: String,
    pub kind: PassKind,
    /// Entry point for the pass. `None` models the legacy config shape that
    /// looks like a custom pass but carries no callable; the builder then
    /// resolves the name through the registry instead.
    pub transform: Option<TransformFn>,
    pub params: Option<PluginParams>,
}

impl<'de> Deserialize<'de> for RawPluginEntry {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        match value {
            Value::String(name) => Ok(RawPluginEntry::Name(name)),
            Value::Object(map) => {
                let mut fields = map.into_iter();
                let (name, action) = fields
                    .next()
                    .ok_or_else(|| de::Error::custom("plugin entry object is empty"))?;
                if fields.next().is_some() {
                    return Err(de::Error::custom(
                        "plugin entry object must hold exactly one pass name",
                    ));
                }
                let action = match action {
                    Value::Bool(true) => OverrideAction::Enable,
                    Value::Bool(false) => OverrideAction::Disable,
                    Value::Object(params) => OverrideAction::Params(params),
                    other => {
                        return Err(de::Error::custom(format!(
                            "override for pass `{name}` must be a boolean or an object, got {other}"
                        )))
                    }
                };
                Ok(RawPluginEntry::Override { name, action })
            }
            other => Err(de::Error::custom(format!(
                "plugin entry must be a string or an object, got {other}"
            ))),
        }
    }
}

/// Output encoding the engine's serializer wraps the result in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataUriFormat {
    Base64,
    Enc,
    Unenc,
}

/// One concrete pass in a compiled pipeline. Always a fresh value; never
/// aliases a registry definition.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: PassKind,
    pub active: bool,
    pub params: PluginParams,
    #[serde(skip)]
    pub transform: TransformFn,
}

/// A contiguous run of passes sharing one traversal kind. The engine runs
/// each batch as a single document traversal.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct PluginBatch {
    passes: Vec<PluginSpec>,
}

impl PluginBatch {
    pub(crate) fn new(first: PluginSpec) -> Self {
        Self { passes: vec![first] }
    }

    pub(crate) fn push(&mut self, spec: PluginSpec) {
        debug_assert_eq!(self.kind(), spec.kind);
        self.passes.push(spec);
    }

    /// Traversal kind shared by every member. Batches are non-empty by
    /// construction.
    pub fn kind(&self) -> PassKind {
        self.passes[0].kind
    }

    pub fn passes(&self) -> &[PluginSpec] {
        &self.passes
    }
}

/// The compiled pass plan plus top-level engine options. Immutable once
/// returned; callers typically cache it and reuse it across documents.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledConfig {
    pub plugins: Vec<PluginBatch>,
    pub multipass: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datauri: Option<DataUriFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub svg2js: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub js2svg: Option<Map<String, Value>>,
}

impl CompiledConfig {
    /// Pass specs in pipeline order, batch structure flattened away.
    pub fn flattened(&self) -> impl Iterator<Item = &PluginSpec> {
        self.plugins.iter().flat_map(|batch| batch.passes().iter())
    }

    /// Find a pass by name anywhere in the plan.
    pub fn find(&self, name: &str) -> Option<&PluginSpec> {
        self.flattened().find(|spec| spec.name == name)
    }
}
