//! `<parent>` block maintenance: computing and patching `<relativePath>`.
//!
//! Maven resolves a parent POM through `<relativePath>` (default `../pom.xml`),
//! so every directory move has to refresh it. Two flavors exist here:
//! the restructure pass patches only modules whose parent is the root POM,
//! while the split pass re-resolves the parent by walking ancestor
//! directories for a matching artifactId.

use anyhow::{Context, Result};
use regex::{NoExpand, Regex};
use std::path::{Component, Path, PathBuf};

use super::{parent_ga, project_artifact_id, ROOT_ARTIFACT_ID, ROOT_GROUP_ID};

fn lexical_absolute(path: &Path) -> Result<PathBuf> {
    let abs = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .context("Failed to resolve current directory")?
            .join(path)
    };
    let mut out = PathBuf::new();
    for comp in abs.components() {
        match comp {
            Component::ParentDir => {
                out.pop();
            }
            Component::CurDir => {}
            other => out.push(other),
        }
    }
    Ok(out)
}

/// Relative path from `base_dir` to `target`, always with forward slashes.
pub fn relative_path(target: &Path, base_dir: &Path) -> Result<String> {
    let target = lexical_absolute(target)?;
    let base = lexical_absolute(base_dir)?;
    let t: Vec<Component> = target.components().collect();
    let b: Vec<Component> = base.components().collect();
    let common = t.iter().zip(b.iter()).take_while(|(a, c)| a == c).count();
    let mut parts: Vec<String> = Vec::new();
    for _ in common..b.len() {
        parts.push("..".to_string());
    }
    for comp in &t[common..] {
        parts.push(comp.as_os_str().to_string_lossy().into_owned());
    }
    if parts.is_empty() {
        return Ok(".".to_string());
    }
    Ok(parts.join("/"))
}

fn parent_block(xml: &str) -> Result<Option<(usize, usize, String)>> {
    let re = Regex::new(r"(?s)<parent>\s*.*?</parent>").context("Failed to compile parent block regex")?;
    Ok(re
        .find(xml)
        .map(|m| (m.start(), m.end(), m.as_str().to_string())))
}

fn artifact_indent(block: &str) -> String {
    let re = Regex::new(r"\n(\s*)<artifactId>").unwrap();
    re.captures(block)
        .map(|c| c.get(1).unwrap().as_str().to_string())
        .unwrap_or_else(|| "        ".to_string())
}

/// Insert `<relativePath>` pointing at the repo root POM, but only into
/// modules whose declared parent is the root `cn.iocoder.boot:future`
/// and that do not carry one yet. Returns true when the file changed.
pub fn patch_root_parent_relative_path(pom_path: &Path, root_pom: &Path) -> Result<bool> {
    let xml = std::fs::read_to_string(pom_path)
        .with_context(|| format!("Failed to read {}", pom_path.display()))?;

    let Some((start, end, block)) = parent_block(&xml)? else {
        return Ok(false);
    };
    if !block.contains(&format!("<groupId>{ROOT_GROUP_ID}</groupId>")) {
        return Ok(false);
    }
    if !block.contains(&format!("<artifactId>{ROOT_ARTIFACT_ID}</artifactId>")) {
        return Ok(false);
    }
    if block.contains("<relativePath>") {
        return Ok(false);
    }

    let indent = artifact_indent(&block);
    let base_dir = pom_path.parent().unwrap_or_else(|| Path::new("."));
    let rel = relative_path(root_pom, base_dir)?;
    let new_block = block.replace(
        "</parent>",
        &format!("\n{indent}<relativePath>{rel}</relativePath>\n{indent}</parent>"),
    );

    let mut out = String::with_capacity(xml.len() + new_block.len());
    out.push_str(&xml[..start]);
    out.push_str(&new_block);
    out.push_str(&xml[end..]);
    std::fs::write(pom_path, out)
        .with_context(|| format!("Failed to write {}", pom_path.display()))?;
    Ok(true)
}

/// Walk up from `start_dir` looking for the pom.xml whose project
/// artifactId matches `parent_artifact_id`.
pub fn find_parent_pom(start_dir: &Path, parent_artifact_id: &str) -> Result<Option<PathBuf>> {
    let mut cur = lexical_absolute(start_dir)?;
    loop {
        let candidate = cur.join("pom.xml");
        if candidate.exists() {
            if let Ok(xml) = std::fs::read_to_string(&candidate) {
                if project_artifact_id(&xml)?.as_deref() == Some(parent_artifact_id) {
                    return Ok(Some(candidate));
                }
            }
        }
        if !cur.pop() {
            return Ok(None);
        }
    }
}

/// Re-resolve and rewrite `<relativePath>` after a module moved.
///
/// Finds the declared parent by artifactId among ancestor directories and
/// replaces (or inserts) the relativePath accordingly. Silently does
/// nothing when the POM has no parent or the parent cannot be located.
pub fn fix_parent_relative_path(pom_path: &Path) -> Result<()> {
    let xml = std::fs::read_to_string(pom_path)
        .with_context(|| format!("Failed to read {}", pom_path.display()))?;
    let Some((start, end, block)) = parent_block(&xml)? else {
        return Ok(());
    };
    let (_, Some(parent_aid)) = parent_ga(&xml)? else {
        return Ok(());
    };
    let base_dir = pom_path.parent().unwrap_or_else(|| Path::new("."));
    let Some(parent_pom) = find_parent_pom(base_dir, &parent_aid)? else {
        return Ok(());
    };
    let rel = relative_path(&parent_pom, base_dir)?;

    let relative_re =
        Regex::new(r"<relativePath>\s*([^<]*?)\s*</relativePath>").context("Failed to compile relativePath regex")?;
    let new_block = if relative_re.is_match(&block) {
        relative_re
            .replacen(&block, 1, NoExpand(&format!("<relativePath>{rel}</relativePath>")))
            .into_owned()
    } else {
        let indent = artifact_indent(&block);
        block.replace(
            "</parent>",
            &format!("\n{indent}<relativePath>{rel}</relativePath>\n{indent}</parent>"),
        )
    };

    if new_block != block {
        let mut out = String::with_capacity(xml.len() + new_block.len());
        out.push_str(&xml[..start]);
        out.push_str(&new_block);
        out.push_str(&xml[end..]);
        std::fs::write(pom_path, out)
            .with_context(|| format!("Failed to write {}", pom_path.display()))?;
    }
    Ok(())
}
