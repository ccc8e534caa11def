//! Re-enable commented-out modules and business-module dependencies.
//!
//! Forked POMs ship with optional modules commented out. Only two shapes
//! get uncommented: single-line `<module>` entries, and `<dependency>`
//! blocks naming a `future-module-*` artifact. Prose comments never
//! match either pattern.

use crate::pom::find_poms;
use crate::Result;
use anyhow::Context;
use colored::Colorize;
use regex::Regex;
use std::path::Path;

/// Uncomment eligible entries in one POM's text. Returns the rewritten
/// text when anything changed.
pub fn uncomment_pom(xml: &str) -> Result<Option<String>> {
    let module_re = Regex::new(r"<!--\s*(<module>[^<]+</module>)\s*-->")
        .context("Failed to compile module comment regex")?;
    let dep_re = Regex::new(
        r"(?s)<!--\s*(<dependency>\s*.*?<artifactId>\s*future-module-[^<]+\s*</artifactId>.*?</dependency>)\s*-->",
    )
    .context("Failed to compile dependency comment regex")?;

    let pass1 = module_re.replace_all(xml, "$1");
    let pass2 = dep_re.replace_all(&pass1, "$1");

    if pass2 == xml {
        Ok(None)
    } else {
        Ok(Some(pass2.into_owned()))
    }
}

pub async fn run(dir: &Path) -> Result<()> {
    let mut changed = 0;
    for pom_path in find_poms(dir) {
        let xml = match std::fs::read_to_string(&pom_path) {
            Ok(xml) => xml,
            Err(e) => {
                eprintln!("{} Failed: {} -> {}", "❌".red(), pom_path.display(), e);
                continue;
            }
        };
        match uncomment_pom(&xml)? {
            Some(new_xml) => {
                std::fs::write(&pom_path, new_xml)
                    .with_context(|| format!("Failed to write {}", pom_path.display()))?;
                changed += 1;
                println!("{} Uncommented: {}", "✓".green(), pom_path.display());
            }
            None => {}
        }
    }
    println!(
        "{}",
        format!("🎉 Done. Changed {changed} POM files").green()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uncomment_single_line_module() {
        let xml = "    <modules>\n        <!-- <module>future-module-iot</module> -->\n    </modules>\n";
        let out = uncomment_pom(xml).unwrap().unwrap();
        assert!(out.contains("        <module>future-module-iot</module>\n"));
        assert!(!out.contains("<!--"));
    }

    #[test]
    fn test_uncomment_business_dependency_block() {
        let xml = "<!--\n        <dependency>\n            <groupId>cn.iocoder.boot</groupId>\n            <artifactId>future-module-pay</artifactId>\n        </dependency>\n        -->\n";
        let out = uncomment_pom(xml).unwrap().unwrap();
        assert!(out.contains("<artifactId>future-module-pay</artifactId>"));
        assert!(!out.contains("<!--"));
    }

    #[test]
    fn test_prose_and_foreign_comments_survive() {
        let xml = "<!-- 说明：按需开启下面的模块 -->\n<!--\n        <dependency>\n            <groupId>org.example</groupId>\n            <artifactId>some-lib</artifactId>\n        </dependency>\n        -->\n";
        assert!(uncomment_pom(xml).unwrap().is_none());
    }

    #[test]
    fn test_uncomment_is_idempotent() {
        let xml = "<!-- <module>future-module-ai</module> -->\n";
        let once = uncomment_pom(xml).unwrap().unwrap();
        assert!(uncomment_pom(&once).unwrap().is_none());
    }
}
