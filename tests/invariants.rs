//! Contract Invariant Tests
//!
//! These tests verify the compiled pipeline's non-negotiable guarantees.

use serde_json::json;

use vectorforge_core::{
    canonical_json, group_passes, pipeline_fingerprint, Compiler, ConfigError, DataUriFormat,
    DocumentNode, PassKind, PluginParams, PluginRegistry, PluginSpec, RawConfig, RawPluginEntry,
    TransformFn, DEFAULT_PIPELINE,
};

fn noop(_: &mut DocumentNode, _: &PluginParams) -> bool {
    true
}

fn create_registry() -> PluginRegistry {
    PluginRegistry::builtin(|_| Some(noop as TransformFn))
}

fn config(value: serde_json::Value) -> RawConfig {
    RawConfig::from_json_value(value).unwrap()
}

fn params(value: serde_json::Value) -> PluginParams {
    match value {
        serde_json::Value::Object(map) => map,
        _ => PluginParams::new(),
    }
}

#[test]
fn invariant_default_order_preserved() {
    let registry = create_registry();
    let plan = Compiler::new(&registry).compile(&config(json!({}))).unwrap();

    let names: Vec<_> = plan.flattened().map(|spec| spec.name.as_str()).collect();
    assert_eq!(names, DEFAULT_PIPELINE);
}

#[test]
fn invariant_overrides_keep_order_and_length() {
    let registry = create_registry();
    let plan = Compiler::new(&registry)
        .compile(&config(json!({
            "plugins": [
                { "removeTitle": false },
                { "cleanupNumericValues": { "floatPrecision": 1 } },
                { "sortAttrs": true },
            ]
        })))
        .unwrap();

    let names: Vec<_> = plan.flattened().map(|spec| spec.name.as_str()).collect();
    assert_eq!(names, DEFAULT_PIPELINE);
}

#[test]
fn invariant_batches_are_contiguous_and_homogeneous() {
    let registry = create_registry();
    let plan = Compiler::new(&registry).compile(&config(json!({}))).unwrap();

    assert!(!plan.plugins.is_empty());
    for batch in &plan.plugins {
        assert!(!batch.passes().is_empty());
        assert!(batch.passes().iter().all(|spec| spec.kind == batch.kind()));
    }
    for pair in plan.plugins.windows(2) {
        assert_ne!(pair[0].kind(), pair[1].kind(), "adjacent batches must differ in kind");
    }
}

#[test]
fn invariant_grouping_idempotent_on_compiled_plan() {
    let registry = create_registry();
    let plan = Compiler::new(&registry).compile(&config(json!({}))).unwrap();

    let flattened: Vec<PluginSpec> = plan.flattened().cloned().collect();
    let regrouped = group_passes(flattened);

    assert_eq!(plan.plugins.len(), regrouped.len());
    for (a, b) in plan.plugins.iter().zip(regrouped.iter()) {
        assert_eq!(a.kind(), b.kind());
        assert_eq!(a.passes().len(), b.passes().len());
    }
}

#[test]
fn invariant_no_cross_call_leakage() {
    let registry = create_registry();
    let compiler = Compiler::new(&registry);

    let config_a = config(json!({
        "floatPrecision": 2,
        "plugins": [{ "removeTitle": false }]
    }));
    let config_b = config(json!({
        "floatPrecision": 7,
        "plugins": [{ "cleanupNumericValues": { "leadingZero": false } }]
    }));

    let first = compiler.compile(&config_a).unwrap();
    let _ = compiler.compile(&config_b).unwrap();
    let second = compiler.compile(&config_a).unwrap();

    assert_eq!(
        canonical_json(&first).unwrap(),
        canonical_json(&second).unwrap(),
        "an interleaved compile must not bleed into later ones"
    );
}

#[test]
fn invariant_precision_propagates_globally() {
    let registry = create_registry();
    let plan = Compiler::new(&registry)
        .compile(&config(json!({
            "floatPrecision": 2,
            "plugins": [{ "cleanupNumericValues": { "floatPrecision": 4 } }]
        })))
        .unwrap();

    // The global override wins over the per-pass merge.
    let numeric = plan.find("cleanupNumericValues").unwrap();
    assert_eq!(numeric.params["floatPrecision"], 2);

    let path_data = plan.find("convertPathData").unwrap();
    assert_eq!(path_data.params["floatPrecision"], 2);

    // Passes without the parameter are untouched.
    let title = plan.find("removeTitle").unwrap();
    assert!(!title.params.contains_key("floatPrecision"));
}

#[test]
fn invariant_deactivated_pass_stays_in_plan() {
    let registry = create_registry();
    let plan = Compiler::new(&registry)
        .compile(&config(json!({ "plugins": [{ "removeTitle": false }] })))
        .unwrap();

    let title = plan.find("removeTitle").unwrap();
    assert!(!title.active);

    // Still correctly grouped: it sits in a batch of its own kind.
    let batch = plan
        .plugins
        .iter()
        .find(|batch| batch.passes().iter().any(|spec| spec.name == "removeTitle"))
        .unwrap();
    assert_eq!(batch.kind(), title.kind);
}

#[test]
fn invariant_custom_pass_appends_last() {
    let registry = create_registry();
    let raw = RawConfig {
        plugins: Some(vec![RawPluginEntry::custom_with_params(
            "myPlugin",
            PassKind::TopDown,
            noop,
            params(json!({ "x": 1 })),
        )]),
        ..Default::default()
    };

    let plan = Compiler::new(&registry).compile(&raw).unwrap();
    let last = plan.flattened().last().unwrap();

    assert_eq!(last.name, "myPlugin");
    assert!(last.active);
    assert_eq!(last.params["x"], 1);
    assert_eq!(plan.flattened().count(), DEFAULT_PIPELINE.len() + 1);
}

#[test]
fn invariant_full_mode_ignores_defaults() {
    let registry = create_registry();
    let plan = Compiler::new(&registry)
        .compile(&config(json!({
            "full": true,
            "plugins": ["removeTitle", { "removeDesc": false }]
        })))
        .unwrap();

    let names: Vec<_> = plan.flattened().map(|spec| spec.name.as_str()).collect();
    assert_eq!(names, ["removeTitle", "removeDesc"]);
    assert!(!plan.find("removeDesc").unwrap().active);
}

#[test]
fn invariant_unknown_plugin_fails_compile() {
    let registry = create_registry();
    let err = Compiler::new(&registry)
        .compile(&config(json!({ "full": true, "plugins": ["notAPlugin"] })))
        .unwrap_err();

    assert!(matches!(err, ConfigError::UnknownPlugin(ref name) if name == "notAPlugin"));
    assert!(err.to_string().contains("notAPlugin"));
}

#[test]
fn invariant_plugins_shape_rejected() {
    let err = RawConfig::from_json_value(json!({ "plugins": { "removeTitle": false } })).unwrap_err();
    assert!(matches!(err, ConfigError::PluginsNotSequence));
}

#[test]
fn invariant_unmatched_override_is_a_noop() {
    let registry = create_registry();
    let plan = Compiler::new(&registry)
        .compile(&config(json!({ "plugins": [{ "notAPlugin": { "x": 1 } }] })))
        .unwrap();

    // No error, no append, nothing renamed.
    assert_eq!(plan.flattened().count(), DEFAULT_PIPELINE.len());
    assert!(plan.find("notAPlugin").is_none());
}

#[test]
fn invariant_custom_without_transform_falls_back_to_catalog() {
    use vectorforge_core::CustomPlugin;

    let registry = create_registry();
    let raw = RawConfig {
        full: true,
        plugins: Some(vec![RawPluginEntry::Custom(CustomPlugin {
            name: "cleanupNumericValues".to_string(),
            kind: PassKind::Document,
            transform: None,
            params: Some(params(json!({ "floatPrecision": 1 }))),
        })]),
        ..Default::default()
    };

    let plan = Compiler::new(&registry).compile(&raw).unwrap();
    let spec = plan.find("cleanupNumericValues").unwrap();

    // Catalog wins on kind; the entry's params still merge in.
    assert_eq!(spec.kind, PassKind::TopDown);
    assert_eq!(spec.params["floatPrecision"], 1);
    assert!(spec.active);
}

#[test]
fn invariant_top_level_fields_pass_through() {
    let registry = create_registry();
    let plan = Compiler::new(&registry)
        .compile(&config(json!({
            "multipass": true,
            "datauri": "base64",
            "js2svg": { "pretty": true },
            "svg2js": { "strict": false },
        })))
        .unwrap();

    assert!(plan.multipass);
    assert_eq!(plan.datauri, Some(DataUriFormat::Base64));
    assert_eq!(plan.js2svg.as_ref().unwrap()["pretty"], true);
    assert_eq!(plan.svg2js.as_ref().unwrap()["strict"], false);

    let bare = Compiler::new(&registry).compile(&config(json!({}))).unwrap();
    assert!(!bare.multipass);
    assert!(bare.datauri.is_none());
    assert!(bare.js2svg.is_none());
}

#[test]
fn invariant_fingerprint_tracks_plan_content() {
    let registry = create_registry();
    let compiler = Compiler::new(&registry);

    let a1 = compiler.compile(&config(json!({ "floatPrecision": 2 }))).unwrap();
    let a2 = compiler.compile(&config(json!({ "floatPrecision": 2 }))).unwrap();
    let b = compiler.compile(&config(json!({ "floatPrecision": 3 }))).unwrap();

    assert_eq!(
        pipeline_fingerprint(&a1).unwrap(),
        pipeline_fingerprint(&a2).unwrap()
    );
    assert_ne!(
        pipeline_fingerprint(&a1).unwrap(),
        pipeline_fingerprint(&b).unwrap()
    );
}

#[test]
fn invariant_config_loads_from_file() {
    use std::io::Write;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{ "floatPrecision": 2, "plugins": [{{ "removeTitle": false }}] }}"#
    )
    .unwrap();

    let raw = RawConfig::from_path(file.path()).unwrap();
    assert_eq!(raw.float_precision, Some(2));

    let registry = create_registry();
    let plan = Compiler::new(&registry).compile(&raw).unwrap();
    assert!(!plan.find("removeTitle").unwrap().active);
}

#[test]
fn invariant_missing_config_file_reports_path() {
    let err = RawConfig::from_path(std::path::Path::new("/no/such/config.json")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
    assert!(err.to_string().contains("/no/such/config.json"));
}
