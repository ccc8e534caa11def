//! Repo-wide POM cleanup after a split run.

use crate::split::fix;
use crate::Result;
use colored::Colorize;
use std::path::Path;

pub async fn run(dir: &Path) -> Result<()> {
    let changed = fix::run(dir)?;
    println!(
        "{}",
        format!("🎉 Post-split fix done. Changed {changed} POM files").green()
    );
    Ok(())
}
