//! Directory-wide token replacement and renaming.
//!
//! Applies an ordered substitution table to file contents and to file and
//! directory names across a whole tree. Children are always processed
//! before their parent directory gets renamed, so no rename ever
//! invalidates a path that is still queued for processing.

use anyhow::{Context, Result};
use colored::Colorize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Default fork rules: upstream project tokens to the fork's name.
pub const DEFAULT_RULES: [(&str, &str); 5] = [
    ("yudao", "future"),
    ("Yudao", "Future"),
    ("ruoyi", "future"),
    ("Ruoyi", "Future"),
    ("RuoYi", "Future"),
];

/// Rules applied to the repository root directory name only.
const ROOT_RULES: [(&str, &str); 3] = [
    ("ruoyi-vue-pro", "future-vue-pro"),
    ("ruoyi", "future"),
    ("RuoYi", "Future"),
];

/// Counters reported at the end of a rebrand run.
#[derive(Debug, Default, Clone, Copy)]
pub struct RebrandStats {
    pub files_rewritten: usize,
    pub files_skipped_binary: usize,
    pub renamed: usize,
    pub rename_conflicts: usize,
}

/// Apply every rule in order to `input`.
pub fn apply_rules(input: &str, rules: &[(String, String)]) -> String {
    let mut out = input.to_string();
    for (old, new) in rules {
        out = out.replace(old.as_str(), new.as_str());
    }
    out
}

/// Owned copy of the default rule table.
pub fn default_rules() -> Vec<(String, String)> {
    DEFAULT_RULES
        .iter()
        .map(|(a, b)| (a.to_string(), b.to_string()))
        .collect()
}

/// Rewrite one file's contents in place. Non-UTF-8 files are skipped.
pub fn replace_in_file(path: &Path, rules: &[(String, String)], stats: &mut RebrandStats) {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == ErrorKind::InvalidData => {
            println!("   {} Skipping binary file: {}", "⚠".yellow(), path.display());
            stats.files_skipped_binary += 1;
            return;
        }
        Err(e) => {
            eprintln!("   {} Failed to read {}: {}", "❌".red(), path.display(), e);
            return;
        }
    };
    let replaced = apply_rules(&content, rules);
    if replaced == content {
        return;
    }
    match std::fs::write(path, replaced) {
        Ok(()) => stats.files_rewritten += 1,
        Err(e) => eprintln!("   {} Failed to write {}: {}", "❌".red(), path.display(), e),
    }
}

/// Rename the final path component according to the rules.
///
/// Returns the (possibly unchanged) path. An already existing target is
/// left alone and counted as a conflict.
pub fn rename_path(path: &Path, rules: &[(String, String)], stats: &mut RebrandStats) -> PathBuf {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return path.to_path_buf();
    };
    let new_name = apply_rules(name, rules);
    if new_name == name {
        return path.to_path_buf();
    }
    let new_path = path.with_file_name(&new_name);
    if new_path.exists() {
        println!(
            "   {} Rename target exists, keeping: {}",
            "⚠".yellow(),
            path.display()
        );
        stats.rename_conflicts += 1;
        return path.to_path_buf();
    }
    match std::fs::rename(path, &new_path) {
        Ok(()) => {
            println!("   {} Renamed: {} -> {}", "✓".green(), path.display(), new_path.display());
            stats.renamed += 1;
            new_path
        }
        Err(e) => {
            eprintln!("   {} Failed to rename {}: {}", "❌".red(), path.display(), e);
            path.to_path_buf()
        }
    }
}

/// Recursively process a directory: rewrite file contents, then rename
/// entries. Directories are descended into before being renamed.
///
/// An unreadable directory is logged and skipped, like every other
/// per-item failure; one bad subtree must not abort the run.
pub fn process_directory(dir: &Path, rules: &[(String, String)], stats: &mut RebrandStats) {
    let entries: Vec<PathBuf> = match std::fs::read_dir(dir) {
        Ok(iter) => iter.filter_map(|e| e.ok().map(|e| e.path())).collect(),
        Err(e) => {
            eprintln!("   {} Failed to list {}: {}", "❌".red(), dir.display(), e);
            return;
        }
    };

    for path in entries {
        if path.is_dir() {
            process_directory(&path, rules, stats);
            rename_path(&path, rules, stats);
        } else {
            replace_in_file(&path, rules, stats);
            rename_path(&path, rules, stats);
        }
    }
}

/// Rename the repository root directory itself (local name only; the
/// remote repository name is untouched). Returns the new path when a
/// rename happened.
pub fn rename_root_directory(root: &Path) -> Result<Option<PathBuf>> {
    let root = root
        .canonicalize()
        .with_context(|| format!("Failed to resolve {}", root.display()))?;
    let Some(base) = root.file_name().and_then(|n| n.to_str()) else {
        return Ok(None);
    };
    let mut new_base = base.to_string();
    for (old, new) in ROOT_RULES {
        new_base = new_base.replace(old, new);
    }
    if new_base == base {
        return Ok(None);
    }
    let new_root = root.with_file_name(&new_base);
    if new_root.exists() {
        println!("   {} Root rename target exists: {}", "⚠".yellow(), new_root.display());
        return Ok(None);
    }
    std::fs::rename(&root, &new_root)
        .with_context(|| format!("Failed to rename {}", root.display()))?;
    println!(
        "   {} Root renamed: {} -> {}",
        "✓".green(),
        root.display(),
        new_root.display()
    );
    Ok(Some(new_root))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn rules() -> Vec<(String, String)> {
        default_rules()
    }

    #[test]
    fn test_apply_rules_is_deterministic() {
        let input = "yudao module for RuoYi based on Yudao and ruoyi";
        let out = apply_rules(input, &rules());
        assert_eq!(out, "future module for Future based on Future and future");
        // Applying again changes nothing
        assert_eq!(apply_rules(&out, &rules()), out);
    }

    #[test]
    fn test_process_directory_renames_deepest_first() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("yudao-module/yudao-sub");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join("YudaoService.java"), "package yudao;").unwrap();

        let mut stats = RebrandStats::default();
        process_directory(temp.path(), &rules(), &mut stats);

        let renamed = temp.path().join("future-module/future-sub/FutureService.java");
        assert!(renamed.exists());
        assert_eq!(std::fs::read_to_string(&renamed).unwrap(), "package future;");
        assert_eq!(stats.renamed, 3);
    }

    #[test]
    fn test_second_run_is_noop() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("yudao-dir")).unwrap();
        std::fs::write(temp.path().join("ruoyi.txt"), "RuoYi").unwrap();

        let mut stats = RebrandStats::default();
        process_directory(temp.path(), &rules(), &mut stats);
        assert!(stats.renamed > 0 || stats.files_rewritten > 0);

        let mut again = RebrandStats::default();
        process_directory(temp.path(), &rules(), &mut again);
        assert_eq!(again.renamed, 0);
        assert_eq!(again.files_rewritten, 0);
        assert_eq!(again.rename_conflicts, 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_directory_is_skipped() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("yudao.txt"), "yudao").unwrap();
        let locked = temp.path().join("locked");
        std::fs::create_dir(&locked).unwrap();
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();

        let mut stats = RebrandStats::default();
        process_directory(temp.path(), &rules(), &mut stats);

        // The unreadable subtree is skipped; its siblings still get rewritten.
        assert_eq!(stats.files_rewritten, 1);
        assert_eq!(
            std::fs::read_to_string(temp.path().join("future.txt")).unwrap(),
            "future"
        );

        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[test]
    fn test_rename_skips_existing_target() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("yudao.txt"), "a").unwrap();
        std::fs::write(temp.path().join("future.txt"), "b").unwrap();

        let mut stats = RebrandStats::default();
        let kept = rename_path(&temp.path().join("yudao.txt"), &rules(), &mut stats);
        assert_eq!(kept, temp.path().join("yudao.txt"));
        assert_eq!(stats.rename_conflicts, 1);
        // Both files still present with original contents
        assert_eq!(std::fs::read_to_string(temp.path().join("future.txt")).unwrap(), "b");
    }

    #[test]
    fn test_binary_file_is_skipped() {
        let temp = TempDir::new().unwrap();
        let bin = temp.path().join("logo.png");
        std::fs::write(&bin, [0xffu8, 0xfe, 0x00, 0x9f, 0x92]).unwrap();

        let mut stats = RebrandStats::default();
        replace_in_file(&bin, &rules(), &mut stats);
        assert_eq!(stats.files_skipped_binary, 1);
        assert_eq!(std::fs::read(&bin).unwrap(), vec![0xffu8, 0xfe, 0x00, 0x9f, 0x92]);
    }
}
