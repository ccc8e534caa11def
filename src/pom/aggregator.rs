//! Rendering of aggregator POMs.
//!
//! An aggregator module carries no code; its POM only lists child modules
//! under `<packaging>pom</packaging>` so the restructured directory tree
//! still forms one reactor build.

use anyhow::{Context, Result};
use std::path::Path;

use super::parent::relative_path;
use super::{ROOT_ARTIFACT_ID, ROOT_GROUP_ID};

/// Write an aggregator POM listing `modules`, parented on the root POM.
pub fn write_aggregator_pom(pom_path: &Path, artifact_id: &str, modules: &[&str], root_pom: &Path) -> Result<()> {
    let dir = pom_path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    let rel = relative_path(root_pom, dir)?;
    let modules_xml = modules
        .iter()
        .map(|m| format!("        <module>{m}</module>"))
        .collect::<Vec<_>>()
        .join("\n");

    let content = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0"
         xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
         xsi:schemaLocation="http://maven.apache.org/POM/4.0.0 http://maven.apache.org/xsd/maven-4.0.0.xsd">
    <modelVersion>4.0.0</modelVersion>

    <parent>
        <groupId>{ROOT_GROUP_ID}</groupId>
        <artifactId>{ROOT_ARTIFACT_ID}</artifactId>
        <version>${{revision}}</version>
        <relativePath>{rel}</relativePath>
    </parent>

    <artifactId>{artifact_id}</artifactId>
    <packaging>pom</packaging>

    <modules>
{modules_xml}
    </modules>
</project>
"#
    );
    std::fs::write(pom_path, content)
        .with_context(|| format!("Failed to write {}", pom_path.display()))?;
    Ok(())
}
