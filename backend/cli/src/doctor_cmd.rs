//! CLI Doctor Command
//!
//! Loads the config the same way `serve` does but reports every problem
//! instead of stopping at the first.

use std::path::Path;

use anyhow::Result;
use stylescout_config::{
    CliOverrides, config_dir, config_file_path, evaluate, load_config, process_env, redact,
};

/// Prints the redacted effective config and the validation report.
/// Returns whether the config would start a server.
pub async fn run(path: Option<&Path>) -> Result<bool> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => config_file_path(&config_dir()),
    };
    println!("\nChecking StyleScout config at {}\n", path.display());

    let raw = load_config(&path).await?;
    let (config, report) = match evaluate(raw, &process_env(), &CliOverrides::default()) {
        Ok(evaluated) => evaluated,
        Err(e) => {
            println!("  error: {e:#}");
            return Ok(false);
        }
    };

    let snapshot = redact(&serde_json::to_value(&config)?);
    println!("{}\n", serde_json::to_string_pretty(&snapshot)?);

    for warning in &report.warnings {
        println!("  warning: {warning}");
    }
    for error in &report.errors {
        println!("  error: {error}");
    }

    if report.is_valid() {
        println!("All checks passed.");
    } else {
        println!("{} problem(s) must be fixed before `stylescout serve`.", report.errors.len());
    }
    Ok(report.is_valid())
}
