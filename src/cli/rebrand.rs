//! Rebrand a checked-out tree: contents, file names, directory names.

use crate::rebrand::{default_rules, process_directory, rename_root_directory, RebrandStats};
use crate::Result;
use colored::Colorize;
use std::path::Path;

/// Parse `OLD=NEW` rule arguments. An empty list falls back to the
/// built-in fork table.
pub fn parse_rules(raw: &[String]) -> Result<Vec<(String, String)>> {
    if raw.is_empty() {
        return Ok(default_rules());
    }
    let mut rules = Vec::with_capacity(raw.len());
    for arg in raw {
        let Some((old, new)) = arg.split_once('=') else {
            anyhow::bail!("Invalid rule '{}': expected OLD=NEW", arg);
        };
        if old.is_empty() {
            anyhow::bail!("Invalid rule '{}': OLD must not be empty", arg);
        }
        rules.push((old.to_string(), new.to_string()));
    }
    Ok(rules)
}

pub async fn run(dir: &Path, raw_rules: &[String]) -> Result<()> {
    if !dir.exists() {
        anyhow::bail!("Directory not found: {}", dir.display());
    }
    let rules = parse_rules(raw_rules)?;

    println!("{}", "🚀 Rewriting file contents and names...".cyan());
    println!("{} Replacement rules:", "📋");
    for (old, new) in &rules {
        println!("   {old} -> {new}");
    }

    let mut stats = RebrandStats::default();
    process_directory(dir, &rules, &mut stats);

    // The tree is done; now the checkout directory itself (local name
    // only, the remote repo name is a separate concern).
    let new_root = rename_root_directory(dir)?;

    println!(
        "\n{}",
        format!(
            "🎉 Done! {} files rewritten, {} renamed, {} binary skipped, {} rename conflicts",
            stats.files_rewritten, stats.renamed, stats.files_skipped_binary, stats.rename_conflicts
        )
        .green()
    );
    if let Some(root) = new_root {
        println!("   Tree now lives at {}", root.display());
    }
    Ok(())
}
