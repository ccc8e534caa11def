//! API/implementation split of Maven business modules.
//!
//! Each leaf `future-module-*` jar is split into a `-api` module (contract
//! types, consumed by other modules) and a `-biz` module (the original
//! implementation, depending on its own api). The split is directory- and
//! text-level: the base POM is cloned and rewritten for the api side, the
//! base directory is renamed for the biz side, and aggregators plus
//! downstream consumers are patched afterwards.

pub mod fix;

use anyhow::{Context, Result};
use colored::Colorize;
use regex::{NoExpand, Regex};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::pom::{
    self, find_poms, parent::fix_parent_relative_path, MODULE_PREFIX, ROOT_GROUP_ID, SPLIT_SUFFIXES,
};

/// Modules kept whole: platform-level system/infra stay unsplit.
pub const SKIP_MODULES: [&str; 2] = ["future-module-system", "future-module-infra"];

/// Whether `**/api/` package directories migrate into the api module.
const MOVE_API_PACKAGES: bool = true;

/// Find the module directories eligible for splitting.
///
/// A candidate must carry a `future-module-*` artifactId, not be in the
/// skip set, not already end in `-api`/`-biz`, not be an aggregator
/// (`packaging=pom`), and actually contain `src/main/java`.
pub fn discover_base_modules(repo_root: &Path) -> Result<Vec<PathBuf>> {
    let root_pom = repo_root.join("pom.xml");
    let mut targets = Vec::new();
    for pom_path in find_poms(repo_root) {
        if pom_path == root_pom {
            continue;
        }
        let xml = std::fs::read_to_string(&pom_path)
            .with_context(|| format!("Failed to read {}", pom_path.display()))?;
        let Some(aid) = pom::project_artifact_id(&xml)? else {
            continue;
        };
        if !aid.starts_with(MODULE_PREFIX) {
            continue;
        }
        if SKIP_MODULES.contains(&aid.as_str()) {
            continue;
        }
        if SPLIT_SUFFIXES.iter().any(|s| aid.ends_with(s)) {
            continue;
        }
        if pom::is_pom_packaging(&xml)? {
            continue;
        }
        let dir = pom_path.parent().unwrap().to_path_buf();
        if !dir.join("src/main/java").exists() {
            continue;
        }
        targets.push(dir);
    }
    targets.sort();
    targets.dedup();
    Ok(targets)
}

/// Write the api module POM, derived from the base module's POM.
///
/// The api POM keeps the base's parent and dependency set, minus any
/// dependency on itself, deduplicated.
pub fn create_api_module(base_xml: &str, api_dir: &Path, api_aid: &str) -> Result<()> {
    std::fs::create_dir_all(api_dir)
        .with_context(|| format!("Failed to create {}", api_dir.display()))?;
    let mut api_xml = pom::set_project_artifact_id(base_xml, api_aid)?;

    // A base module already depending on its future api artifact would
    // turn into a self-dependency after the rename.
    api_xml = pom::map_dependency_blocks(&api_xml, |dep| {
        let key = pom::dep_key(dep).ok()?;
        if key.group_id == ROOT_GROUP_ID && key.artifact_id == api_aid {
            Some(String::new())
        } else {
            None
        }
    })?;
    api_xml = pom::remove_self_and_duplicate_deps(&api_xml)?;

    let api_pom = api_dir.join("pom.xml");
    std::fs::write(&api_pom, api_xml)
        .with_context(|| format!("Failed to write {}", api_pom.display()))?;
    fix_parent_relative_path(&api_pom)?;
    println!("  {} Created api module: {}", "✓".green(), api_dir.display());
    Ok(())
}

/// Move every `api` package directory from the base source tree into the
/// api module, preserving the package path. Returns how many moved.
pub fn move_api_packages(base_dir: &Path, api_dir: &Path) -> Result<usize> {
    let base_java = base_dir.join("src/main/java");
    if !base_java.exists() {
        return Ok(0);
    }
    let api_dirs: Vec<PathBuf> = WalkDir::new(&base_java)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_dir() && e.file_name() == "api")
        .map(|e| e.into_path())
        .collect();

    let mut moved = 0;
    for src in api_dirs {
        // A parent `api` directory moved earlier takes its children along.
        if !src.exists() {
            continue;
        }
        let rel = src.strip_prefix(&base_java).expect("api dir under src/main/java");
        let dst = api_dir.join("src/main/java").join(rel);
        if dst.exists() {
            continue;
        }
        if let Some(parent) = dst.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::rename(&src, &dst)
            .with_context(|| format!("Failed to move {} -> {}", src.display(), dst.display()))?;
        moved += 1;
    }
    Ok(moved)
}

/// Rename the base module directory to `-biz` and rewrite its POM:
/// new artifactId, a dependency on the api artifact, no self/duplicate deps.
pub fn rename_base_to_biz(
    base_dir: &Path,
    biz_dir: &Path,
    biz_aid: &str,
    api_aid: Option<&str>,
) -> Result<()> {
    if biz_dir.exists() {
        println!("  {} biz module already exists, skipping: {}", "→".bright_black(), biz_dir.display());
        return Ok(());
    }
    std::fs::rename(base_dir, biz_dir)
        .with_context(|| format!("Failed to move {} -> {}", base_dir.display(), biz_dir.display()))?;

    let biz_pom = biz_dir.join("pom.xml");
    let mut biz_xml = std::fs::read_to_string(&biz_pom)
        .with_context(|| format!("Failed to read {}", biz_pom.display()))?;
    biz_xml = pom::set_project_artifact_id(&biz_xml, biz_aid)?;
    if let Some(api_aid) = api_aid {
        biz_xml = pom::add_dependency_if_missing(&biz_xml, ROOT_GROUP_ID, api_aid, "${revision}")?;
    }
    biz_xml = pom::remove_self_and_duplicate_deps(&biz_xml)?;
    std::fs::write(&biz_pom, biz_xml)
        .with_context(|| format!("Failed to write {}", biz_pom.display()))?;
    fix_parent_relative_path(&biz_pom)?;
    println!("  {} Created biz module: {}", "✓".green(), biz_dir.display());
    Ok(())
}

/// Replace the old `<module>` entry in the parent aggregator with the
/// api + biz pair, then dedupe.
pub fn update_parent_aggregator(
    parent_dir: &Path,
    old_name: &str,
    api_name: &str,
    biz_name: &str,
) -> Result<()> {
    let pom_path = parent_dir.join("pom.xml");
    if !pom_path.exists() {
        return Ok(());
    }
    let xml = std::fs::read_to_string(&pom_path)
        .with_context(|| format!("Failed to read {}", pom_path.display()))?;
    let re = Regex::new(&format!(
        r"(\s*)<module>\s*{}\s*</module>",
        regex::escape(old_name)
    ))
    .context("Failed to compile module replacement regex")?;
    let Some(caps) = re.captures(&xml) else {
        return Ok(());
    };
    let indent = caps.get(1).unwrap().as_str();
    let new_lines = format!(
        "{indent}<module>{api_name}</module>{indent}<module>{biz_name}</module>"
    );
    let replaced = re.replacen(&xml, 1, NoExpand(&new_lines)).into_owned();
    let deduped = pom::dedupe_modules(&replaced)?;
    std::fs::write(&pom_path, deduped)
        .with_context(|| format!("Failed to write {}", pom_path.display()))?;
    println!("  {} Updated aggregator: {}", "✓".green(), pom_path.display());
    Ok(())
}

/// Split one module directory. Returns `(old_artifact_id, biz_artifact_id)`
/// or `None` when the POM carries no readable artifactId.
pub fn split_module(base_dir: &Path) -> Result<Option<(String, String)>> {
    let base_pom = base_dir.join("pom.xml");
    let base_xml = std::fs::read_to_string(&base_pom)
        .with_context(|| format!("Failed to read {}", base_pom.display()))?;
    let Some(base_aid) = pom::project_artifact_id(&base_xml)? else {
        println!("{} Cannot read artifactId, skipping: {}", "⚠".yellow(), base_dir.display());
        return Ok(None);
    };

    let api_aid = format!("{base_aid}-api");
    let biz_aid = format!("{base_aid}-biz");
    let base_name = base_dir
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();
    let parent_dir = base_dir.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();
    let api_dir = parent_dir.join(format!("{base_name}-api"));
    let biz_dir = parent_dir.join(format!("{base_name}-biz"));

    println!("\n{} Splitting: {}", "✂".cyan(), base_aid.cyan());
    println!("   ├── {api_aid}");
    println!("   └── {biz_aid}");

    // Create the api module first: the base directory must still be in
    // place so its sources and POM can be lifted.
    if !api_dir.exists() {
        create_api_module(&base_xml, &api_dir, &api_aid)?;
        if MOVE_API_PACKAGES {
            let moved = move_api_packages(base_dir, &api_dir)?;
            if moved > 0 {
                println!("  {} Migrated api/** packages: {} directories", "📦", moved);
            }
        }
    }

    rename_base_to_biz(base_dir, &biz_dir, &biz_aid, Some(&api_aid))?;
    update_parent_aggregator(
        &parent_dir,
        &base_name,
        &format!("{base_name}-api"),
        &format!("{base_name}-biz"),
    )?;

    Ok(Some((base_aid, biz_aid)))
}

/// Rewrite every downstream consumer's dependency on `old_aid` to `biz_aid`.
///
/// The split modules themselves (old, api, biz) are left alone.
pub fn update_downstream_consumers(repo_root: &Path, old_aid: &str, biz_aid: &str) -> Result<()> {
    let artifact_re = Regex::new(r"<artifactId>\s*([^<]+?)\s*</artifactId>")
        .context("Failed to compile artifactId regex")?;
    for pom_path in find_poms(repo_root) {
        let xml = std::fs::read_to_string(&pom_path)
            .with_context(|| format!("Failed to read {}", pom_path.display()))?;
        let current = pom::project_artifact_id(&xml)?.unwrap_or_default();
        if current == old_aid || current == biz_aid || current == format!("{old_aid}-api") {
            continue;
        }

        let mut modified = false;
        let rewritten = pom::map_dependency_blocks(&xml, |dep| {
            let key = pom::dep_key(dep).ok()?;
            if key.group_id == ROOT_GROUP_ID && key.artifact_id == old_aid {
                modified = true;
                Some(
                    artifact_re
                        .replacen(dep, 1, NoExpand(&format!("<artifactId>{biz_aid}</artifactId>")))
                        .into_owned(),
                )
            } else {
                None
            }
        })?;

        if modified {
            std::fs::write(&pom_path, rewritten)
                .with_context(|| format!("Failed to write {}", pom_path.display()))?;
            println!(
                "  {} Updated consumer: {}  ({} → {})",
                "✓".green(),
                pom_path.display(),
                old_aid,
                biz_aid
            );
        }
    }
    Ok(())
}
