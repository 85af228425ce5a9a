//! Config Command
//!
//! Manage EchoMind configuration.
//!
//! Usage:
//!   echomind config show [-f json]
//!   echomind config path
//!   echomind config init [-g] [--force]

use std::path::Path;

use crate::cli::util::load_config;
use crate::config::ConfigLoader;
use crate::types::Result;

/// Show the effective configuration (defaults, files, and environment merged)
pub fn show(config_path: Option<&Path>, format: &str) -> Result<()> {
    let config = load_config(config_path)?;
    println!("{}", ConfigLoader::render(&config, format == "json")?);
    Ok(())
}

/// Show configuration paths
pub fn path() -> Result<()> {
    println!("Configuration paths (lowest to highest priority):");
    match ConfigLoader::global_config_path() {
        Some(global) => println!("  Global:  {} {}", global.display(), marker(&global)),
        None => println!("  Global:  (no home directory)"),
    }
    let project = ConfigLoader::project_config_path();
    println!("  Project: {} {}", project.display(), marker(&project));
    println!("  Env:     ECHOMIND_* (nested keys split on '__')");
    Ok(())
}

fn marker(path: &Path) -> &'static str {
    if path.exists() { "✓" } else { "✗" }
}

/// Initialize global or project configuration
pub fn init(global: bool, force: bool) -> Result<()> {
    let path = if global {
        ConfigLoader::init_global(force)?
    } else {
        ConfigLoader::init_project(force)?
    };
    let scope = if global { "global" } else { "project" };
    println!("✓ Initialized {} configuration", scope);
    println!("  Config: {}", path.display());
    Ok(())
}
