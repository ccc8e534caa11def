//! Split discovered business modules into api/biz pairs.

use crate::split::{discover_base_modules, split_module, update_downstream_consumers, SKIP_MODULES};
use crate::Result;
use colored::Colorize;
use std::path::Path;

pub async fn run(dir: &Path) -> Result<()> {
    if !dir.join("pom.xml").exists() {
        anyhow::bail!("Run this at the repo root (pom.xml not found in {})", dir.display());
    }

    println!("{} Modules kept whole:", "⏭".cyan());
    let mut skip: Vec<&str> = SKIP_MODULES.to_vec();
    skip.sort_unstable();
    for name in skip {
        println!("   • {name}");
    }

    let base_modules = discover_base_modules(dir)?;
    println!("\n{} Found {} modules to split:", "🔍", base_modules.len());
    for module in &base_modules {
        println!("   • {}", module.display());
    }

    if base_modules.is_empty() {
        println!("{} No modules need splitting, exiting", "⚠".yellow());
        return Ok(());
    }

    // First round: directory splits.
    let mut split_map: Vec<(String, String)> = Vec::new();
    for base_dir in &base_modules {
        if let Some(pair) = split_module(base_dir)? {
            split_map.push(pair);
        }
    }

    // Second round: every downstream consumer (future-server and friends)
    // switches to the biz artifact.
    println!("\n{}", "🔄 Updating downstream consumers...".cyan());
    for (old_aid, biz_aid) in &split_map {
        update_downstream_consumers(dir, old_aid, biz_aid)?;
    }

    println!("\n{}", "🎉 Split complete!".green());
    Ok(())
}
