//! Configuration commands.

use anyhow::{bail, Result};
use console::style;
use jpmatch_core::Config;
use std::path::Path;

/// Print the effective configuration as TOML.
pub fn show(config: &Config) -> Result<()> {
    print!("{}", config.to_toml_string()?);
    Ok(())
}

/// Write a configuration file with default values.
pub fn init(path: &Path) -> Result<()> {
    if path.exists() {
        bail!("{} already exists", path.display());
    }
    Config::default().save(path)?;
    println!(
        "{} Wrote default configuration to {}",
        style("✓").green(),
        path.display()
    );
    Ok(())
}
