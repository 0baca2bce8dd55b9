//! # zz-tree — standalone directory-tree visualizer
//!
//! Mirrors the teacher's `txxt-treeviz` split: a small renderer
//! (`render`) that turns a directory listing into box-drawing tree
//! notation, and a thin `main` that wires `clap`'s builder API (not the
//! derive macro — this binary's surface is small enough that the
//! builder form reads more directly, same choice the teacher made for
//! its own treeviz binary) around it. No AST involved; this walks
//! `zz::walk` directly rather than parsing file contents.

use std::path::{Path, PathBuf};

use clap::{Arg, ArgAction, Command};

use zz::config::Config;
use zz::walk::walk_files;

struct TreeChars {
    branch: &'static str,
    last: &'static str,
    vertical: &'static str,
    blank: &'static str,
}

impl TreeChars {
    const UNICODE: TreeChars = TreeChars { branch: "├── ", last: "└── ", vertical: "│   ", blank: "    " };
    const ASCII: TreeChars = TreeChars { branch: "|-- ", last: "`-- ", vertical: "|   ", blank: "    " };
}

fn main() {
    zz::logging::init();
    let matches = Command::new("zz-tree")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Directory-tree visualizer")
        .arg(Arg::new("path").help("Directory to render").index(1).default_value("."))
        .arg(Arg::new("ascii").long("ascii").help("Use ASCII box-drawing characters").action(ArgAction::SetTrue))
        .arg(Arg::new("hidden").long("hidden").help("Include hidden files").action(ArgAction::SetTrue))
        .arg(Arg::new("demo").long("demo").help("Render a small built-in example (for testing)").action(ArgAction::SetTrue))
        .get_matches();

    let chars = if matches.get_flag("ascii") { &TreeChars::ASCII } else { &TreeChars::UNICODE };

    if matches.get_flag("demo") {
        println!("{}", render(&demo_paths(), Path::new(""), chars));
        return;
    }

    let root = PathBuf::from(matches.get_one::<String>("path").unwrap());
    if !root.exists() {
        eprintln!("ERROR: path does not exist  at {}", root.display());
        std::process::exit(1);
    }

    let mut config = Config::load(&root);
    if matches.get_flag("hidden") {
        config.hidden_files.clear();
    }
    let mut files = walk_files(&root, &config);
    files.sort();

    println!("{}", root.display());
    println!("{}", render(&files, &root, chars));
}

/// One node per path component actually present, grouped by shared
/// prefix so sibling entries under the same directory line up under
/// one `├──`/`└──` run.
enum Entry {
    File(String),
    Dir(String, Vec<Entry>),
}

fn build_tree(files: &[PathBuf], root: &Path) -> Vec<Entry> {
    let mut roots: Vec<Entry> = Vec::new();
    for file in files {
        let rel = file.strip_prefix(root).unwrap_or(file);
        insert(&mut roots, rel.components().map(|c| c.as_os_str().to_string_lossy().to_string()).collect::<Vec<_>>().as_slice());
    }
    roots
}

fn insert(level: &mut Vec<Entry>, segments: &[String]) {
    let Some((head, rest)) = segments.split_first() else { return };
    if rest.is_empty() {
        level.push(Entry::File(head.clone()));
        return;
    }
    for entry in level.iter_mut() {
        if let Entry::Dir(name, children) = entry {
            if name == head {
                insert(children, rest);
                return;
            }
        }
    }
    let mut children = Vec::new();
    insert(&mut children, rest);
    level.push(Entry::Dir(head.clone(), children));
}

/// Renders `files` (already collected and sorted by the walker) as
/// indented box-drawing tree notation, directories before files at
/// each level, alphabetically within each group.
fn render(files: &[PathBuf], root: &Path, chars: &TreeChars) -> String {
    let mut tree = build_tree(files, root);
    sort_entries(&mut tree);
    let mut out = String::new();
    render_level(&tree, "", &mut out, chars);
    out.trim_end().to_string()
}

fn sort_entries(entries: &mut [Entry]) {
    entries.sort_by(|a, b| match (a, b) {
        (Entry::Dir(x, _), Entry::Dir(y, _)) => x.cmp(y),
        (Entry::File(x), Entry::File(y)) => x.cmp(y),
        (Entry::Dir(..), Entry::File(..)) => std::cmp::Ordering::Less,
        (Entry::File(..), Entry::Dir(..)) => std::cmp::Ordering::Greater,
    });
    for entry in entries {
        if let Entry::Dir(_, children) = entry {
            sort_entries(children);
        }
    }
}

fn render_level(entries: &[Entry], prefix: &str, out: &mut String, chars: &TreeChars) {
    for (i, entry) in entries.iter().enumerate() {
        let is_last = i == entries.len() - 1;
        let connector = if is_last { chars.last } else { chars.branch };
        let child_prefix = format!("{prefix}{}", if is_last { chars.blank } else { chars.vertical });
        match entry {
            Entry::File(name) => {
                out.push_str(&format!("{prefix}{connector}{name}\n"));
            }
            Entry::Dir(name, children) => {
                out.push_str(&format!("{prefix}{connector}{name}/\n"));
                render_level(children, &child_prefix, out, chars);
            }
        }
    }
}

fn demo_paths() -> Vec<PathBuf> {
    vec![
        PathBuf::from("src/lib.rs"),
        PathBuf::from("src/lexer/core.rs"),
        PathBuf::from("src/lexer/json.rs"),
        PathBuf::from("Cargo.toml"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_nested_directories_before_files() {
        let files = vec![PathBuf::from("src/lib.rs"), PathBuf::from("Cargo.toml")];
        let out = render(&files, Path::new(""), &TreeChars::UNICODE);
        let lines: Vec<_> = out.lines().collect();
        assert!(lines[0].contains("src/"));
        assert!(lines.last().unwrap().contains("Cargo.toml"));
    }

    #[test]
    fn ascii_mode_avoids_unicode_box_characters() {
        let files = vec![PathBuf::from("a.txt")];
        let out = render(&files, Path::new(""), &TreeChars::ASCII);
        assert!(!out.contains('├'));
        assert!(!out.contains('└'));
    }
}
