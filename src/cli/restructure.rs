//! Move top-level Maven modules into the platform/apps/modules layout and
//! regenerate the aggregator POMs that stitch the new tree together.

use crate::pom::aggregator::write_aggregator_pom;
use crate::pom::parent::patch_root_parent_relative_path;
use crate::pom::find_poms;
use crate::Result;
use anyhow::Context;
use colored::Colorize;
use std::path::Path;

/// Top-level module moves. Only whole module directories relocate; the
/// internal layout of each module is left for the split pass.
pub const MOVE_PLAN: [(&str, &str); 15] = [
    ("future-dependencies", "platform/future-dependencies"),
    ("future-framework", "platform/future-framework"),
    ("future-server", "apps/future-server"),
    ("future-module-system", "modules/core/system/future-module-system"),
    ("future-module-infra", "modules/core/infra/future-module-infra"),
    ("future-module-crm", "modules/biz/crm/future-module-crm"),
    ("future-module-erp", "modules/biz/erp/future-module-erp"),
    ("future-module-mall", "modules/biz/mall/future-module-mall"),
    ("future-module-member", "modules/extend/member/future-module-member"),
    ("future-module-bpm", "modules/extend/bpm/future-module-bpm"),
    ("future-module-report", "modules/extend/report/future-module-report"),
    ("future-module-mp", "modules/extend/mp/future-module-mp"),
    ("future-module-pay", "modules/extend/pay/future-module-pay"),
    ("future-module-ai", "modules/extend/ai/future-module-ai"),
    // Moved into place but not listed in the extend aggregator; the iot
    // module is not part of the default build.
    ("future-module-iot", "modules/extend/iot/future-module-iot"),
];

fn move_dir(src: &Path, dst: &Path) -> Result<()> {
    if !src.exists() {
        return Ok(());
    }
    if dst.exists() {
        anyhow::bail!("Destination exists: {}", dst.display());
    }
    if let Some(parent) = dst.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::rename(src, dst)
        .with_context(|| format!("Failed to move {} -> {}", src.display(), dst.display()))?;
    Ok(())
}

pub async fn run(dir: &Path) -> Result<()> {
    let root_pom = dir.join("pom.xml");
    if !root_pom.exists() {
        anyhow::bail!("Run this at the repo root (pom.xml not found in {})", dir.display());
    }

    println!("{}", "🚚 Moving top-level modules...".cyan());
    for (src, dst) in MOVE_PLAN {
        move_dir(&dir.join(src), &dir.join(dst))?;
    }

    // Grouping aggregators, one POM per planning level.
    println!("{}", "🧩 Writing aggregator POMs...".cyan());
    let core_modules = ["core/system", "core/infra"];
    let biz_modules = ["biz/crm", "biz/erp", "biz/mall"];
    let extend_modules = [
        "extend/member",
        "extend/bpm",
        "extend/report",
        "extend/mp",
        "extend/pay",
        "extend/ai",
    ];

    write_aggregator_pom(&dir.join("modules/pom.xml"), "future-modules", &["core", "biz", "extend"], &root_pom)?;
    write_aggregator_pom(&dir.join("modules/core/pom.xml"), "future-modules-core", &core_modules, &root_pom)?;
    write_aggregator_pom(&dir.join("modules/biz/pom.xml"), "future-modules-biz", &biz_modules, &root_pom)?;
    write_aggregator_pom(&dir.join("modules/extend/pom.xml"), "future-modules-extend", &extend_modules, &root_pom)?;

    // Domain-level aggregators so every directory in the drawn layout
    // carries its own pom.xml.
    let domain_aggregators: [(&str, &str, &str); 11] = [
        ("modules/core/system/pom.xml", "future-core-system", "future-module-system"),
        ("modules/core/infra/pom.xml", "future-core-infra", "future-module-infra"),
        ("modules/biz/crm/pom.xml", "future-biz-crm", "future-module-crm"),
        ("modules/biz/erp/pom.xml", "future-biz-erp", "future-module-erp"),
        ("modules/biz/mall/pom.xml", "future-biz-mall", "future-module-mall"),
        ("modules/extend/member/pom.xml", "future-ext-member", "future-module-member"),
        ("modules/extend/bpm/pom.xml", "future-ext-bpm", "future-module-bpm"),
        ("modules/extend/report/pom.xml", "future-ext-report", "future-module-report"),
        ("modules/extend/mp/pom.xml", "future-ext-mp", "future-module-mp"),
        ("modules/extend/pay/pom.xml", "future-ext-pay", "future-module-pay"),
        ("modules/extend/ai/pom.xml", "future-ext-ai", "future-module-ai"),
    ];
    for (pom, aid, module) in domain_aggregators {
        write_aggregator_pom(&dir.join(pom), aid, &[module], &root_pom)?;
    }

    // Moved modules that inherit from the root POM need a relativePath
    // pointing back at it.
    let mut patched = 0;
    for pom_path in find_poms(dir) {
        if pom_path == root_pom {
            continue;
        }
        if patch_root_parent_relative_path(&pom_path, &root_pom)? {
            patched += 1;
        }
    }

    println!(
        "{}",
        format!("✓ Done. Patched parent relativePath in {patched} POMs").green()
    );
    println!(
        "{} Next: point the root pom.xml <modules> at platform/apps/modules",
        "ℹ".cyan()
    );
    Ok(())
}
