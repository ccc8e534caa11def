//! Integration tests for the layout restructure: module moves, aggregator
//! POM generation and parent relativePath patching.

use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_module_with_root_parent(root: &Path, name: &str) {
    let dir = root.join(name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("pom.xml"),
        format!(
            "<project>\n    <parent>\n        <groupId>cn.iocoder.boot</groupId>\n        <artifactId>future</artifactId>\n        <version>${{revision}}</version>\n    </parent>\n    <artifactId>{name}</artifactId>\n</project>\n"
        ),
    )
    .unwrap();
}

fn create_flat_repo(root: &Path) {
    fs::write(
        root.join("pom.xml"),
        "<project>\n    <groupId>cn.iocoder.boot</groupId>\n    <artifactId>future</artifactId>\n    <packaging>pom</packaging>\n</project>\n",
    )
    .unwrap();
    write_module_with_root_parent(root, "future-framework");
    write_module_with_root_parent(root, "future-server");
    write_module_with_root_parent(root, "future-module-crm");
    write_module_with_root_parent(root, "future-module-system");
}

#[tokio::test]
async fn test_restructure_moves_modules_into_layout() {
    let temp = TempDir::new().unwrap();
    create_flat_repo(temp.path());

    forklift::cli::restructure::run(temp.path()).await.unwrap();

    assert!(temp.path().join("platform/future-framework/pom.xml").exists());
    assert!(temp.path().join("apps/future-server/pom.xml").exists());
    assert!(temp.path().join("modules/biz/crm/future-module-crm/pom.xml").exists());
    assert!(temp.path().join("modules/core/system/future-module-system/pom.xml").exists());
    assert!(!temp.path().join("future-framework").exists());
}

#[tokio::test]
async fn test_restructure_writes_aggregator_poms() {
    let temp = TempDir::new().unwrap();
    create_flat_repo(temp.path());

    forklift::cli::restructure::run(temp.path()).await.unwrap();

    let modules_xml = fs::read_to_string(temp.path().join("modules/pom.xml")).unwrap();
    assert!(modules_xml.contains("<artifactId>future-modules</artifactId>"));
    assert!(modules_xml.contains("<packaging>pom</packaging>"));
    assert!(modules_xml.contains("<module>core</module>"));
    assert!(modules_xml.contains("<module>biz</module>"));
    assert!(modules_xml.contains("<module>extend</module>"));
    assert!(modules_xml.contains("<relativePath>../pom.xml</relativePath>"));

    let crm_xml = fs::read_to_string(temp.path().join("modules/biz/crm/pom.xml")).unwrap();
    assert!(crm_xml.contains("<artifactId>future-biz-crm</artifactId>"));
    assert!(crm_xml.contains("<module>future-module-crm</module>"));
    assert!(crm_xml.contains("<relativePath>../../../pom.xml</relativePath>"));
}

#[tokio::test]
async fn test_restructure_patches_moved_module_parents() {
    let temp = TempDir::new().unwrap();
    create_flat_repo(temp.path());

    forklift::cli::restructure::run(temp.path()).await.unwrap();

    let crm_xml = fs::read_to_string(temp.path().join("modules/biz/crm/future-module-crm/pom.xml")).unwrap();
    assert!(crm_xml.contains("<relativePath>../../../../pom.xml</relativePath>"));

    let framework_xml = fs::read_to_string(temp.path().join("platform/future-framework/pom.xml")).unwrap();
    assert!(framework_xml.contains("<relativePath>../../pom.xml</relativePath>"));
}

#[tokio::test]
async fn test_restructure_moves_iot_without_aggregator_listing() {
    let temp = TempDir::new().unwrap();
    create_flat_repo(temp.path());
    write_module_with_root_parent(temp.path(), "future-module-iot");

    forklift::cli::restructure::run(temp.path()).await.unwrap();

    assert!(temp.path().join("modules/extend/iot/future-module-iot/pom.xml").exists());
    assert!(!temp.path().join("future-module-iot").exists());

    // Relocated like the rest, but left out of the default build.
    let extend_xml = fs::read_to_string(temp.path().join("modules/extend/pom.xml")).unwrap();
    assert!(!extend_xml.contains("iot"));

    let iot_xml =
        fs::read_to_string(temp.path().join("modules/extend/iot/future-module-iot/pom.xml")).unwrap();
    assert!(iot_xml.contains("<relativePath>../../../../pom.xml</relativePath>"));
}

#[tokio::test]
async fn test_restructure_requires_root_pom() {
    let temp = TempDir::new().unwrap();
    let err = forklift::cli::restructure::run(temp.path()).await.unwrap_err();
    assert!(err.to_string().contains("pom.xml not found"));
}

#[tokio::test]
async fn test_restructure_refuses_existing_destination() {
    let temp = TempDir::new().unwrap();
    create_flat_repo(temp.path());
    fs::create_dir_all(temp.path().join("platform/future-framework")).unwrap();

    let err = forklift::cli::restructure::run(temp.path()).await.unwrap_err();
    assert!(err.to_string().contains("Destination exists"));
}
