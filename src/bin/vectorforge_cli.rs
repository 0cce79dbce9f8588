//! VectorForge CLI - Pipeline Inspection Bridge
//!
//! Commands: plugins, compile
//! Outputs JSON to stdout, diagnostics to stderr
//! Returns non-zero on compile failure

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use vectorforge_core::{
    builtin_catalog, pipeline_fingerprint, Compiler, DocumentNode, PluginParams, PluginRegistry,
    RawConfig, TransformFn,
};

#[derive(Parser)]
#[command(name = "vectorforge-cli")]
#[command(about = "VectorForge CLI - SVG Optimization Pipeline Compiler")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the builtin pass catalog
    Plugins,

    /// Compile a config file and print the batch plan
    Compile {
        /// Path to a JSON config
        #[arg(short, long)]
        config: PathBuf,

        /// Print only the plan fingerprint
        #[arg(long)]
        fingerprint: bool,
    },
}

/// Inspection-only stand-in; the real entry points live in the engine.
fn inert(_: &mut DocumentNode, _: &PluginParams) -> bool {
    true
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Plugins => {
            let catalog: Vec<_> = builtin_catalog()
                .iter()
                .map(|entry| {
                    serde_json::json!({
                        "name": entry.name,
                        "type": entry.kind,
                        "active": entry.default_active,
                        "params": entry.default_params,
                    })
                })
                .collect();

            println!("{}", serde_json::to_string_pretty(&catalog).unwrap());
            ExitCode::SUCCESS
        }

        Commands::Compile { config, fingerprint } => {
            let raw = match RawConfig::from_path(&config) {
                Ok(raw) => raw,
                Err(e) => {
                    eprintln!(r#"{{"error": "Failed to load config: {}"}}"#, e);
                    return ExitCode::FAILURE;
                }
            };

            let registry = PluginRegistry::builtin(|_| Some(inert as TransformFn));
            let compiler = Compiler::new(&registry);

            match compiler.compile(&raw) {
                Ok(plan) => {
                    let output = if fingerprint {
                        match pipeline_fingerprint(&plan) {
                            Ok(digest) => serde_json::json!({
                                "success": true,
                                "fingerprint": digest,
                            }),
                            Err(e) => {
                                eprintln!(r#"{{"error": "{}"}}"#, e);
                                return ExitCode::FAILURE;
                            }
                        }
                    } else {
                        serde_json::json!({
                            "success": true,
                            "pipeline": plan,
                        })
                    };
                    println!("{}", serde_json::to_string_pretty(&output).unwrap());
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    let output = serde_json::json!({
                        "success": false,
                        "error": e.to_string(),
                    });
                    println!("{}", serde_json::to_string(&output).unwrap());
                    ExitCode::from(2) // Compile failure
                }
            }
        }
    }
}
