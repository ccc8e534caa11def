//! Patch the server's local Spring config for the forked environment.

use crate::config_patch::{patch_file, APPLICATION_LOCAL};
use crate::Result;
use colored::Colorize;
use std::path::{Path, PathBuf};

pub async fn run(file: Option<&Path>) -> Result<()> {
    let path: PathBuf = file
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(APPLICATION_LOCAL));

    println!("{}", "━".repeat(38));
    println!("{}", "🚀 Patching application-local.yaml".cyan());
    println!("{}", "━".repeat(38));

    patch_file(&path)?;

    println!("{}", "━".repeat(38));
    println!("{}", "🎉 Config patch complete!".green());
    println!("{}", "━".repeat(38));
    Ok(())
}
