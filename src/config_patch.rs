//! Fixed substitution sequence for the server's `application-local.yaml`.
//!
//! The upstream config file is patched as text, never parsed: comments,
//! ordering and indentation carry meaning for the operator and must
//! survive. Every rule is a literal match against the known upstream
//! template, so an already-patched file simply matches nothing.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

/// Default location of the config file after the layout restructure.
pub const APPLICATION_LOCAL: &str = "apps/future-server/src/main/resources/application-local.yaml";

/// Ordered (label, from, to) substitutions. Literal matches only.
pub const SUBSTITUTIONS: &[(&str, &str, &str)] = &[
    (
        "Remove Druid auto-configure exclusion",
        "      - com.alibaba.druid.spring.boot.autoconfigure.DruidDataSourceAutoConfigure # 排除 Druid 的自动配置，使用 dynamic-datasource-spring-boot-starter 配置多数据源\n",
        "",
    ),
    (
        "Parameterize primary datasource URL",
        "          url: jdbc:mysql://127.0.0.1:3306/future-vue-pro?useSSL=false&serverTimezone=Asia/Shanghai&allowPublicKeyRetrieval=true&nullCatalogMeansCurrent=true&rewriteBatchedStatements=true # MySQL Connector/J 8.X 连接的示例",
        "          url: jdbc:mysql://${DB_HOST}:3306/future-vue-pro?useSSL=false&serverTimezone=Asia/Shanghai&allowPublicKeyRetrieval=true&nullCatalogMeansCurrent=true&rewriteBatchedStatements=true # MySQL Connector/J 8.X 连接的示例",
    ),
    (
        "Parameterize datasource credentials",
        "          username: root\n          password: 123456\n          #          username: sa",
        "          username: ${DB_USERNAME}\n          password: ${DB_PASSWORD}\n          #          username: sa",
    ),
    (
        "Move redis under spring.data",
        "  # Redis 配置。Redisson 默认的配置足够使用，一般不需要进行调优\n  redis:",
        "  # Redis 配置。Redisson 默认的配置足够使用，一般不需要进行调优\n  data:\n    redis:",
    ),
    (
        "Parameterize redis host",
        "    host: 127.0.0.1 # 地址",
        "      host: ${REDIS_HOST} # 地址",
    ),
    (
        "Re-indent redis port",
        "    port: 6379 # 端口",
        "      port: 6379 # 端口",
    ),
    (
        "Re-indent redis database",
        "    database: 0 # 数据库索引",
        "      database: 0 # 数据库索引",
    ),
    (
        "Enable and parameterize redis password",
        "#      password: dev # 密码，建议生产环境开启",
        "        password: ${REDIS_PASSWORD} # 密码，建议生产环境开启",
    ),
    ("Rename config prefix", "yudao:", "future:"),
    ("Rename config banner", "芋道相关配置", "Future相关配置"),
    (
        "Rewrite logger package names",
        "cn.iocoder.yudao.module.",
        "cn.iocoder.future.module.",
    ),
    ("Update sample password", "Yudao@2024", "Future@2024"),
];

/// Apply all substitutions in order.
pub fn apply(content: &str) -> String {
    let mut out = content.to_string();
    for (_, from, to) in SUBSTITUTIONS {
        out = out.replace(from, to);
    }
    out
}

/// Patch the config file in place, announcing each step.
///
/// Missing file or an unchanged result only warns; neither is an error
/// because the operator may have patched by hand already.
pub fn patch_file(path: &Path) -> Result<()> {
    if !path.exists() {
        println!("{} Config file not found: {}", "⚠".yellow(), path.display());
        return Ok(());
    }

    println!("{} Reading config file: {}", "📖", path.display());
    let original = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let mut content = original.clone();
    for (label, from, to) in SUBSTITUTIONS {
        println!("  {} {}...", "➜".cyan(), label);
        content = content.replace(from, to);
    }

    if content == original {
        println!(
            "{} File content unchanged; the upstream template may have moved on",
            "⚠".yellow()
        );
        return Ok(());
    }

    let changed = original
        .bytes()
        .zip(content.bytes())
        .filter(|(a, b)| a != b)
        .count();
    println!("{} File patched ({} bytes changed)", "✓".green(), changed);

    std::fs::write(path, content)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("{} Config file written: {}", "✓".green(), path.display());
    Ok(())
}
