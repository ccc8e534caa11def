//! Text-level POM surgery.
//!
//! All rewrites operate on the raw `pom.xml` text with regular expressions
//! so that formatting, comments and element order survive untouched. The
//! helpers here only ever replace exact text spans; nothing re-serializes
//! the document.

use anyhow::{Context, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub mod aggregator;
pub mod parent;

/// groupId of the forked build's root POM.
pub const ROOT_GROUP_ID: &str = "cn.iocoder.boot";
/// artifactId of the forked build's root POM.
pub const ROOT_ARTIFACT_ID: &str = "future";
/// Prefix shared by all business modules.
pub const MODULE_PREFIX: &str = "future-module-";
/// Suffixes marking an already-split module.
pub const SPLIT_SUFFIXES: [&str; 2] = ["-api", "-biz"];

fn parent_block_re() -> Result<Regex> {
    Regex::new(r"(?s)<parent>\s*.*?</parent>").context("Failed to compile parent block regex")
}

fn artifact_id_re() -> Result<Regex> {
    Regex::new(r"<artifactId>\s*([^<]+?)\s*</artifactId>").context("Failed to compile artifactId regex")
}

fn group_id_re() -> Result<Regex> {
    Regex::new(r"<groupId>\s*([^<]+?)\s*</groupId>").context("Failed to compile groupId regex")
}

fn dependency_block_re() -> Result<Regex> {
    Regex::new(r"(?s)<dependency>\s*.*?</dependency>").context("Failed to compile dependency regex")
}

fn module_line_re() -> Result<Regex> {
    Regex::new(r"^(\s*)<module>\s*([^<]+?)\s*</module>\s*$").context("Failed to compile module line regex")
}

/// Byte span of the `<parent>...</parent>` block, if the POM has one.
pub fn parent_block_span(xml: &str) -> Result<Option<(usize, usize)>> {
    Ok(parent_block_re()?.find(xml).map(|m| (m.start(), m.end())))
}

fn within(span: Option<(usize, usize)>, pos: usize) -> bool {
    span.map_or(false, |(s, e)| s <= pos && pos <= e)
}

/// The project's own artifactId: first `<artifactId>` outside the parent block.
pub fn project_artifact_id(xml: &str) -> Result<Option<String>> {
    let span = parent_block_span(xml)?;
    for m in artifact_id_re()?.captures_iter(xml) {
        if within(span, m.get(0).unwrap().start()) {
            continue;
        }
        return Ok(Some(m.get(1).unwrap().as_str().to_string()));
    }
    Ok(None)
}

/// The project's own groupId: first `<groupId>` outside the parent block.
pub fn project_group_id(xml: &str) -> Result<Option<String>> {
    let span = parent_block_span(xml)?;
    for m in group_id_re()?.captures_iter(xml) {
        if within(span, m.get(0).unwrap().start()) {
            continue;
        }
        return Ok(Some(m.get(1).unwrap().as_str().to_string()));
    }
    Ok(None)
}

/// (groupId, artifactId) declared in the `<parent>` block.
pub fn parent_ga(xml: &str) -> Result<(Option<String>, Option<String>)> {
    let Some(m) = parent_block_re()?.find(xml) else {
        return Ok((None, None));
    };
    let block = m.as_str();
    let gid = group_id_re()?
        .captures(block)
        .map(|c| c.get(1).unwrap().as_str().to_string());
    let aid = artifact_id_re()?
        .captures(block)
        .map(|c| c.get(1).unwrap().as_str().to_string());
    Ok((gid, aid))
}

/// Rewrite the project artifactId (the parent block's is left alone).
pub fn set_project_artifact_id(xml: &str, new_aid: &str) -> Result<String> {
    let span = parent_block_span(xml)?;
    for m in artifact_id_re()?.captures_iter(xml) {
        if within(span, m.get(0).unwrap().start()) {
            continue;
        }
        let inner = m.get(1).unwrap();
        let mut out = String::with_capacity(xml.len());
        out.push_str(&xml[..inner.start()]);
        out.push_str(new_aid);
        out.push_str(&xml[inner.end()..]);
        return Ok(out);
    }
    anyhow::bail!("No project <artifactId> found to replace")
}

/// True when the POM declares `<packaging>pom</packaging>`.
pub fn is_pom_packaging(xml: &str) -> Result<bool> {
    let re = Regex::new(r"<packaging>\s*([^<]+?)\s*</packaging>")
        .context("Failed to compile packaging regex")?;
    Ok(re
        .captures(xml)
        .map_or(false, |c| c.get(1).unwrap().as_str() == "pom"))
}

/// Identity of one `<dependency>` entry, matching Maven's dedup rules.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DepKey {
    pub group_id: String,
    pub artifact_id: String,
    pub dep_type: String,
    pub classifier: String,
}

/// Extract the identity key of a single `<dependency>` block.
pub fn dep_key(dep_xml: &str) -> Result<DepKey> {
    let first = |re: Regex| -> Option<String> {
        re.captures(dep_xml)
            .map(|c| c.get(1).unwrap().as_str().to_string())
    };
    let type_re = Regex::new(r"<type>\s*([^<]+?)\s*</type>").context("Failed to compile type regex")?;
    let classifier_re = Regex::new(r"<classifier>\s*([^<]+?)\s*</classifier>")
        .context("Failed to compile classifier regex")?;
    Ok(DepKey {
        group_id: first(group_id_re()?).unwrap_or_default(),
        artifact_id: first(artifact_id_re()?).unwrap_or_default(),
        dep_type: first(type_re).unwrap_or_else(|| "jar".to_string()),
        classifier: first(classifier_re).unwrap_or_default(),
    })
}

/// Apply `f` to every `<dependency>` block. Returning `None` keeps the
/// block as-is; returning a string (possibly empty) replaces it.
pub fn map_dependency_blocks<F>(xml: &str, mut f: F) -> Result<String>
where
    F: FnMut(&str) -> Option<String>,
{
    let re = dependency_block_re()?;
    let mut out = String::with_capacity(xml.len());
    let mut last = 0;
    for m in re.find_iter(xml) {
        out.push_str(&xml[last..m.start()]);
        match f(m.as_str()) {
            Some(replacement) => out.push_str(&replacement),
            None => out.push_str(m.as_str()),
        }
        last = m.end();
    }
    out.push_str(&xml[last..]);
    Ok(out)
}

/// Drop any dependency the project declares on itself, and collapse
/// duplicate dependency entries (first occurrence wins).
pub fn remove_self_and_duplicate_deps(xml: &str) -> Result<String> {
    let gid_proj = project_group_id(xml)?.unwrap_or_else(|| ROOT_GROUP_ID.to_string());
    let Some(aid_proj) = project_artifact_id(xml)? else {
        return Ok(xml.to_string());
    };
    let mut seen = std::collections::HashSet::new();
    map_dependency_blocks(xml, |dep| {
        let key = match dep_key(dep) {
            Ok(k) => k,
            Err(_) => return None,
        };
        if key.group_id == gid_proj && key.artifact_id == aid_proj {
            return Some(String::new());
        }
        if !seen.insert(key) {
            return Some(String::new());
        }
        None
    })
}

/// True when the POM already declares a dependency on `gid:aid`.
pub fn has_dependency(xml: &str, gid: &str, aid: &str) -> Result<bool> {
    for m in dependency_block_re()?.find_iter(xml) {
        let key = dep_key(m.as_str())?;
        if key.group_id == gid && key.artifact_id == aid {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Append a dependency on `gid:aid` unless one is already present.
///
/// Prefers an existing `<dependencies>` section; otherwise opens a new one
/// after the first anchor element found, falling back to the end of file.
pub fn add_dependency_if_missing(xml: &str, gid: &str, aid: &str, version: &str) -> Result<String> {
    if has_dependency(xml, gid, aid)? {
        return Ok(xml.to_string());
    }
    let dep_xml = format!(
        "        <dependency>\n            <groupId>{gid}</groupId>\n            <artifactId>{aid}</artifactId>\n            <version>{version}</version>\n        </dependency>\n"
    );
    if xml.contains("<dependencies>") && xml.contains("</dependencies>") {
        return Ok(xml.replacen("</dependencies>", &format!("{dep_xml}    </dependencies>"), 1));
    }
    for anchor in ["</description>", "</url>", "</name>", "</packaging>"] {
        if xml.contains(anchor) {
            return Ok(xml.replacen(
                anchor,
                &format!("{anchor}\n\n    <dependencies>\n{dep_xml}    </dependencies>"),
                1,
            ));
        }
    }
    Ok(format!("{xml}\n    <dependencies>\n{dep_xml}    </dependencies>\n"))
}

/// Drop repeated `<module>` lines, keeping the first occurrence of each path.
pub fn dedupe_modules(xml: &str) -> Result<String> {
    let re = module_line_re()?;
    let mut seen = std::collections::HashSet::new();
    let mut out = String::with_capacity(xml.len());
    for line in xml.split_inclusive('\n') {
        match re.captures(line.trim_end_matches('\n')) {
            Some(c) => {
                let module = c.get(2).unwrap().as_str().to_string();
                if seen.insert(module) {
                    out.push_str(line);
                }
            }
            None => out.push_str(line),
        }
    }
    Ok(out)
}

/// All pom.xml files under `root`, in deterministic order.
pub fn find_poms(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && e.file_name() == "pom.xml")
        .map(|e| e.into_path())
        .collect()
}

/// Parse a `<module>` line into (indent, module path), if it is one.
pub fn parse_module_line(line: &str) -> Result<Option<(String, String)>> {
    Ok(module_line_re()?
        .captures(line.trim_end_matches('\n'))
        .map(|c| {
            (
                c.get(1).unwrap().as_str().to_string(),
                c.get(2).unwrap().as_str().to_string(),
            )
        }))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<project>
    <parent>
        <groupId>cn.iocoder.boot</groupId>
        <artifactId>future</artifactId>
        <version>${revision}</version>
    </parent>
    <artifactId>future-module-crm</artifactId>
    <dependencies>
        <dependency>
            <groupId>cn.iocoder.boot</groupId>
            <artifactId>future-common</artifactId>
        </dependency>
        <dependency>
            <groupId>cn.iocoder.boot</groupId>
            <artifactId>future-common</artifactId>
        </dependency>
        <dependency>
            <groupId>cn.iocoder.boot</groupId>
            <artifactId>future-module-crm</artifactId>
        </dependency>
    </dependencies>
</project>
"#;

    #[test]
    fn test_project_artifact_id_skips_parent() {
        let aid = project_artifact_id(SAMPLE).unwrap();
        assert_eq!(aid.as_deref(), Some("future-module-crm"));
    }

    #[test]
    fn test_parent_ga() {
        let (gid, aid) = parent_ga(SAMPLE).unwrap();
        assert_eq!(gid.as_deref(), Some("cn.iocoder.boot"));
        assert_eq!(aid.as_deref(), Some("future"));
    }

    #[test]
    fn test_set_project_artifact_id_leaves_parent_alone() {
        let out = set_project_artifact_id(SAMPLE, "future-module-crm-biz").unwrap();
        assert!(out.contains("<artifactId>future-module-crm-biz</artifactId>"));
        // Parent artifactId must be untouched
        let (_, parent_aid) = parent_ga(&out).unwrap();
        assert_eq!(parent_aid.as_deref(), Some("future"));
    }

    #[test]
    fn test_remove_self_and_duplicate_deps() {
        let out = remove_self_and_duplicate_deps(SAMPLE).unwrap();
        // Self dependency gone
        assert!(!out.contains("<artifactId>future-module-crm</artifactId>\n        </dependency>"));
        // Duplicate collapsed to one
        assert_eq!(out.matches("future-common").count(), 1);
    }

    #[test]
    fn test_add_dependency_if_missing_is_idempotent() {
        let once = add_dependency_if_missing(SAMPLE, "cn.iocoder.boot", "future-module-crm-api", "${revision}").unwrap();
        assert!(once.contains("future-module-crm-api"));
        let twice = add_dependency_if_missing(&once, "cn.iocoder.boot", "future-module-crm-api", "${revision}").unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_add_dependency_opens_section_when_absent() {
        let xml = "<project>\n    <packaging>jar</packaging>\n</project>\n";
        let out = add_dependency_if_missing(xml, "g", "a", "1.0").unwrap();
        assert!(out.contains("<dependencies>"));
        assert!(out.contains("<artifactId>a</artifactId>"));
        assert!(out.contains("</dependencies>"));
    }

    #[test]
    fn test_dedupe_modules_keeps_first() {
        let xml = "<modules>\n    <module>a</module>\n    <module>b</module>\n    <module>a</module>\n</modules>\n";
        let out = dedupe_modules(xml).unwrap();
        assert_eq!(out.matches("<module>a</module>").count(), 1);
        assert_eq!(out.matches("<module>b</module>").count(), 1);
    }

    #[test]
    fn test_dep_key_defaults() {
        let key = dep_key("<dependency>\n<groupId>g</groupId>\n<artifactId>a</artifactId>\n</dependency>").unwrap();
        assert_eq!(key.dep_type, "jar");
        assert_eq!(key.classifier, "");
    }

    #[test]
    fn test_is_pom_packaging() {
        assert!(is_pom_packaging("<packaging>pom</packaging>").unwrap());
        assert!(!is_pom_packaging("<packaging>jar</packaging>").unwrap());
        assert!(!is_pom_packaging("<project/>").unwrap());
    }
}
