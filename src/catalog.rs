//! Pass Catalog - Read-Only Plugin Registry

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::config::PluginSpec;

/// Parameter mapping attached to a pass. Compiled output always owns a
/// fresh copy of this map.
pub type PluginParams = serde_json::Map<String, Value>;

/// AST node as produced by the svg2js parser layer.
pub type DocumentNode = Value;

/// Pass entry point. Receives one document node (or the document root for
/// [`PassKind::Document`] passes) plus the pass parameters. The compiler
/// moves these handles around but never invokes them.
pub type TransformFn = fn(&mut DocumentNode, &PluginParams) -> bool;

/// Traversal classification. Passes sharing a kind can run in the same
/// document traversal, which is what batching exploits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PassKind {
    /// Visits every node, root first.
    TopDown,
    /// Visits every node, leaves first.
    BottomUp,
    /// Receives the whole document once.
    Document,
}

/// One catalog entry with its engine entry point bound.
#[derive(Debug, Clone)]
pub struct PluginDefinition {
    pub name: String,
    pub kind: PassKind,
    pub transform: TransformFn,
    pub default_params: PluginParams,
    pub default_active: bool,
}

impl PluginDefinition {
    /// Snapshot this definition into a compiled spec. The spec owns its
    /// params map; nothing aliases back into the registry.
    pub(crate) fn to_spec(&self) -> PluginSpec {
        PluginSpec {
            name: self.name.clone(),
            kind: self.kind,
            active: self.default_active,
            params: self.default_params.clone(),
            transform: self.transform,
        }
    }
}

/// Pass registry - name lookup over immutable definitions.
///
/// Populated once at process start (the engine binds its entry points to the
/// builtin catalog, then registers any extensions) and never mutated after.
pub struct PluginRegistry {
    plugins: HashMap<String, PluginDefinition>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self { plugins: HashMap::new() }
    }

    /// Bind the stock catalog to engine entry points. `resolve` maps a pass
    /// name to its implementation; names it does not know are left out of
    /// the registry, so a default-pipeline compile against an incompletely
    /// bound registry fails loudly at lookup rather than producing a broken
    /// entry.
    pub fn builtin<F>(mut resolve: F) -> Self
    where
        F: FnMut(&str) -> Option<TransformFn>,
    {
        let mut registry = Self::new();
        for entry in builtin_catalog() {
            match resolve(entry.name) {
                Some(transform) => registry.register(PluginDefinition {
                    name: entry.name.to_string(),
                    kind: entry.kind,
                    transform,
                    default_params: entry.default_params,
                    default_active: entry.default_active,
                }),
                None => {
                    tracing::warn!(pass = entry.name, "no entry point bound for builtin pass");
                }
            }
        }
        registry
    }

    pub fn register(&mut self, definition: PluginDefinition) {
        self.plugins.insert(definition.name.clone(), definition);
    }

    pub fn get(&self, name: &str) -> Option<&PluginDefinition> {
        self.plugins.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.plugins.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Builtin catalog metadata, before an engine entry point is bound.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub name: &'static str,
    pub kind: PassKind,
    pub default_active: bool,
    pub default_params: PluginParams,
}

/// The stock pipeline, in execution order. Order encodes data dependencies
/// between passes (normalization before conversion, conversion before
/// merging) and must never be shuffled.
pub const DEFAULT_PIPELINE: [&str; 43] = [
    "removeDoctype",
    "removeXMLProcInst",
    "removeComments",
    "removeMetadata",
    "removeXMLNS",
    "removeEditorsNSData",
    "cleanupAttrs",
    "minifyStyles",
    "convertStyleToAttrs",
    "cleanupIDs",
    "removeRasterImages",
    "removeUselessDefs",
    "cleanupNumericValues",
    "cleanupListOfValues",
    "convertColors",
    "removeUnknownsAndDefaults",
    "removeNonInheritableGroupAttrs",
    "removeUselessStrokeAndFill",
    "removeViewBox",
    "cleanupEnableBackground",
    "removeHiddenElems",
    "removeEmptyText",
    "convertShapeToPath",
    "moveElemsAttrsToGroup",
    "moveGroupAttrsToElems",
    "collapseGroups",
    "convertPathData",
    "convertTransform",
    "removeEmptyAttrs",
    "removeEmptyContainers",
    "mergePaths",
    "removeUnusedNS",
    "transformsWithOnePath",
    "sortAttrs",
    "removeTitle",
    "removeDesc",
    "removeDimensions",
    "removeAttrs",
    "removeElementsByAttr",
    "addClassesToSVGElement",
    "removeStyleElement",
    "removeScriptElement",
    "addAttributesToSVGElement",
];

fn entry(name: &'static str, kind: PassKind, active: bool, params: Value) -> CatalogEntry {
    CatalogEntry {
        name,
        kind,
        default_active: active,
        default_params: match params {
            Value::Object(map) => map,
            _ => PluginParams::new(),
        },
    }
}

/// Metadata for every pass the engine ships. Listed alphabetically; see
/// [`DEFAULT_PIPELINE`] for execution order.
pub fn builtin_catalog() -> Vec<CatalogEntry> {
    use PassKind::{BottomUp, Document, TopDown};

    vec![
        entry("addAttributesToSVGElement", TopDown, false, json!({})),
        entry("addClassesToSVGElement", TopDown, false, json!({})),
        entry(
            "cleanupAttrs",
            TopDown,
            true,
            json!({ "newlines": true, "trim": true, "spaces": true }),
        ),
        entry("cleanupEnableBackground", Document, true, json!({})),
        entry(
            "cleanupIDs",
            Document,
            true,
            json!({ "remove": true, "minify": true, "prefix": "", "force": false }),
        ),
        entry(
            "cleanupListOfValues",
            TopDown,
            false,
            json!({
                "floatPrecision": 3,
                "leadingZero": true,
                "defaultPx": true,
                "convertToPx": true
            }),
        ),
        entry(
            "cleanupNumericValues",
            TopDown,
            true,
            json!({
                "floatPrecision": 3,
                "leadingZero": true,
                "defaultPx": true,
                "convertToPx": true
            }),
        ),
        entry("collapseGroups", BottomUp, true, json!({})),
        entry(
            "convertColors",
            TopDown,
            true,
            json!({
                "currentColor": false,
                "names2hex": true,
                "rgb2hex": true,
                "shorthex": true,
                "shortname": true
            }),
        ),
        entry(
            "convertPathData",
            TopDown,
            true,
            json!({
                "applyTransforms": true,
                "applyTransformsStroked": true,
                "straightCurves": true,
                "lineShorthands": true,
                "curveSmoothShorthands": true,
                "floatPrecision": 3,
                "transformPrecision": 5,
                "removeUseless": true,
                "collapseRepeated": true,
                "utilizeAbsolute": true,
                "leadingZero": true,
                "negativeExtraSpace": true
            }),
        ),
        entry("convertShapeToPath", TopDown, true, json!({ "convertArcs": false })),
        entry("convertStyleToAttrs", TopDown, true, json!({ "keepImportant": false })),
        entry(
            "convertTransform",
            TopDown,
            true,
            json!({
                "convertToShorts": true,
                "floatPrecision": 3,
                "transformPrecision": 5,
                "matrixToTransform": true,
                "shortTranslate": true,
                "shortScale": true,
                "shortRotate": true,
                "removeUseless": true,
                "collapseIntoOne": true,
                "leadingZero": true,
                "negativeExtraSpace": false
            }),
        ),
        entry(
            "mergePaths",
            TopDown,
            true,
            json!({
                "collapseRepeated": true,
                "force": false,
                "leadingZero": true,
                "negativeExtraSpace": true
            }),
        ),
        entry("minifyStyles", Document, true, json!({})),
        entry("moveElemsAttrsToGroup", BottomUp, true, json!({})),
        entry("moveGroupAttrsToElems", TopDown, true, json!({})),
        entry(
            "removeAttrs",
            TopDown,
            false,
            json!({ "elemSeparator": ":", "attrs": [] }),
        ),
        entry("removeComments", TopDown, true, json!({})),
        entry("removeDesc", TopDown, true, json!({ "removeAny": true })),
        entry("removeDimensions", TopDown, false, json!({})),
        entry("removeDoctype", TopDown, true, json!({})),
        entry(
            "removeEditorsNSData",
            TopDown,
            true,
            json!({ "additionalNamespaces": [] }),
        ),
        entry(
            "removeElementsByAttr",
            TopDown,
            false,
            json!({ "id": [], "class": [] }),
        ),
        entry("removeEmptyAttrs", TopDown, true, json!({})),
        entry("removeEmptyContainers", BottomUp, true, json!({})),
        entry(
            "removeEmptyText",
            TopDown,
            true,
            json!({ "text": true, "tspan": true, "tref": true }),
        ),
        entry(
            "removeHiddenElems",
            TopDown,
            true,
            json!({ "isHidden": true, "displayNone": true, "opacity0": true }),
        ),
        entry("removeMetadata", TopDown, true, json!({})),
        entry("removeNonInheritableGroupAttrs", TopDown, true, json!({})),
        entry("removeRasterImages", TopDown, false, json!({})),
        entry("removeScriptElement", TopDown, false, json!({})),
        entry("removeStyleElement", TopDown, false, json!({})),
        entry("removeTitle", TopDown, true, json!({})),
        entry(
            "removeUnknownsAndDefaults",
            TopDown,
            true,
            json!({
                "unknownContent": true,
                "unknownAttrs": true,
                "defaultAttrs": true,
                "uselessOverrides": true,
                "keepDataAttrs": true,
                "keepAriaAttrs": true
            }),
        ),
        entry("removeUnusedNS", Document, true, json!({})),
        entry("removeUselessDefs", TopDown, true, json!({})),
        entry(
            "removeUselessStrokeAndFill",
            TopDown,
            true,
            json!({ "stroke": true, "fill": true, "removeNone": false }),
        ),
        entry("removeViewBox", TopDown, true, json!({})),
        entry("removeXMLNS", TopDown, false, json!({})),
        entry("removeXMLProcInst", TopDown, true, json!({})),
        entry(
            "sortAttrs",
            TopDown,
            false,
            json!({
                "order": [
                    "id", "width", "height", "x", "x1", "x2", "y", "y1", "y2",
                    "cx", "cy", "r", "fill", "stroke", "marker", "d", "points"
                ]
            }),
        ),
        entry(
            "transformsWithOnePath",
            Document,
            false,
            json!({ "hcrop": false, "vcrop": false }),
        ),
    ]
}
