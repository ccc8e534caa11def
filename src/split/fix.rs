//! Repo-wide POM cleanup after an api/biz split.
//!
//! A split leaves aggregators and consumers that still name the old base
//! modules, plus occasionally duplicated `<module>` lines. This pass only
//! rewrites entries whose api/biz counterparts verifiably exist in the
//! repository, so a partial split stays untouched.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::Path;

use crate::pom::{self, find_poms, MODULE_PREFIX, ROOT_GROUP_ID, SPLIT_SUFFIXES};

/// Project artifactIds of every POM in the repository.
pub fn collect_existing_artifact_ids(repo_root: &Path) -> Result<HashSet<String>> {
    let mut ids = HashSet::new();
    for pom_path in find_poms(repo_root) {
        let xml = std::fs::read_to_string(&pom_path)
            .with_context(|| format!("Failed to read {}", pom_path.display()))?;
        if let Some(aid) = pom::project_artifact_id(&xml)? {
            ids.insert(aid);
        }
    }
    Ok(ids)
}

/// Rewrite `<module>` entries naming a base module directory to the
/// api + biz pair, when both artifacts exist in the repo.
pub fn rewrite_modules_to_api_biz(xml: &str, existing: &HashSet<String>) -> Result<String> {
    let mut out = String::with_capacity(xml.len());
    for line in xml.split_inclusive('\n') {
        let Some((indent, module_path)) = pom::parse_module_line(line)? else {
            out.push_str(line);
            continue;
        };

        let last = module_path.rsplit('/').next().unwrap_or(&module_path);
        if !last.starts_with(MODULE_PREFIX) || SPLIT_SUFFIXES.iter().any(|s| last.ends_with(s)) {
            out.push_str(line);
            continue;
        }
        let api_aid = format!("{last}-api");
        let biz_aid = format!("{last}-biz");
        if !existing.contains(&api_aid) || !existing.contains(&biz_aid) {
            out.push_str(line);
            continue;
        }

        let prefix = match module_path.rfind('/') {
            Some(pos) => &module_path[..pos + 1],
            None => "",
        };
        out.push_str(&format!("{indent}<module>{prefix}{last}-api</module>\n"));
        out.push_str(&format!("{indent}<module>{prefix}{last}-biz</module>\n"));
    }
    Ok(out)
}

/// Rewrite dependencies on base module artifactIds to `-biz`, when the
/// `-biz` artifact exists in the repo.
pub fn rewrite_deps_to_biz(xml: &str, existing: &HashSet<String>) -> Result<String> {
    let artifact_re = regex::Regex::new(r"<artifactId>\s*([^<]+?)\s*</artifactId>")
        .context("Failed to compile artifactId regex")?;
    pom::map_dependency_blocks(xml, |dep| {
        let key = pom::dep_key(dep).ok()?;
        if key.group_id != ROOT_GROUP_ID {
            return None;
        }
        if !key.artifact_id.starts_with(MODULE_PREFIX) {
            return None;
        }
        if SPLIT_SUFFIXES.iter().any(|s| key.artifact_id.ends_with(s)) {
            return None;
        }
        let biz_aid = format!("{}-biz", key.artifact_id);
        if !existing.contains(&biz_aid) {
            return None;
        }
        Some(
            artifact_re
                .replacen(dep, 1, regex::NoExpand(&format!("<artifactId>{biz_aid}</artifactId>")))
                .into_owned(),
        )
    })
}

/// Run the full cleanup over every POM. Returns how many files changed.
pub fn run(repo_root: &Path) -> Result<usize> {
    let existing = collect_existing_artifact_ids(repo_root)?;
    let mut changed = 0;
    for pom_path in find_poms(repo_root) {
        let xml = std::fs::read_to_string(&pom_path)
            .with_context(|| format!("Failed to read {}", pom_path.display()))?;

        let mut new_xml = pom::dedupe_modules(&xml)?;
        new_xml = rewrite_modules_to_api_biz(&new_xml, &existing)?;
        new_xml = rewrite_deps_to_biz(&new_xml, &existing)?;
        // The rewrite itself can mint duplicates when api/biz lines were
        // already present alongside the base entry.
        new_xml = pom::dedupe_modules(&new_xml)?;

        if new_xml != xml {
            std::fs::write(&pom_path, new_xml)
                .with_context(|| format!("Failed to write {}", pom_path.display()))?;
            changed += 1;
        }
    }
    Ok(changed)
}
