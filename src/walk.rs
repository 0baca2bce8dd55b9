//! Directory walker (ambient): feeds file paths to the CLI commands,
//! honoring [`crate::config::Config`]'s ignore patterns. `walkdir`-backed,
//! the same crate the teacher uses for its own directory traversal
//! (`collect_annotations` in `lib.rs`).

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::{Config, SymlinkBehavior};

/// Walks `root`, applying `config`'s hidden/ignored-pattern rules and a
/// parsed `.gitignore` (when `config.respect_gitignore`). Filesystem
/// errors on individual entries are logged and skipped (§7 "Filesystem
/// — safe") rather than aborting the whole walk.
pub fn walk_files(root: &Path, config: &Config) -> Vec<PathBuf> {
    let gitignore_lines = if config.respect_gitignore {
        read_gitignore(root)
    } else {
        Vec::new()
    };

    let mut out = Vec::new();
    let mut walker = WalkDir::new(root).follow_links(config.symlink_behavior == SymlinkBehavior::Follow).into_iter();

    loop {
        let entry = match walker.next() {
            Some(Ok(entry)) => entry,
            Some(Err(err)) => {
                tracing::warn!(error = %err, "skipping directory entry");
                continue;
            }
            None => break,
        };

        let path = entry.path();
        if config.is_ignored(path, &gitignore_lines) {
            if entry.file_type().is_dir() {
                walker.skip_current_dir();
            }
            continue;
        }

        if entry.file_type().is_symlink() && config.symlink_behavior == SymlinkBehavior::Report {
            tracing::debug!(path = %path.display(), "symlink reported, not followed");
            continue;
        }

        if entry.file_type().is_file() {
            out.push(path.to_path_buf());
        }
    }
    out
}

fn read_gitignore(root: &Path) -> Vec<String> {
    let path = root.join(".gitignore");
    match fs::read_to_string(&path) {
        Ok(contents) => contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect(),
        Err(_) => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walk_lists_files_and_skips_hidden() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.json"), "{}").unwrap();
        fs::write(dir.path().join(".DS_Store"), "").unwrap();
        let config = Config::default();
        let files = walk_files(dir.path(), &config);
        assert!(files.iter().any(|p| p.file_name().unwrap() == "a.json"));
        assert!(!files.iter().any(|p| p.file_name().unwrap() == ".DS_Store"));
    }

    #[test]
    fn walk_prunes_ignored_directories() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("target")).unwrap();
        fs::write(dir.path().join("target").join("build.rs"), "").unwrap();
        fs::write(dir.path().join("keep.rs"), "").unwrap();
        let config = Config::default();
        let files = walk_files(dir.path(), &config);
        assert!(files.iter().any(|p| p.file_name().unwrap() == "keep.rs"));
        assert!(!files.iter().any(|p| p.file_name().unwrap() == "build.rs"));
    }

    #[test]
    fn walk_respects_gitignore_lines() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".gitignore"), "*.log\n").unwrap();
        fs::write(dir.path().join("debug.log"), "").unwrap();
        fs::write(dir.path().join("keep.txt"), "").unwrap();
        let config = Config::default();
        let files = walk_files(dir.path(), &config);
        assert!(files.iter().any(|p| p.file_name().unwrap() == "keep.txt"));
        assert!(!files.iter().any(|p| p.file_name().unwrap() == "debug.log"));
    }
}
