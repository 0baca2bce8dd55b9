//! Configuration (ambient, spec.md §6): `zz.zon` loading and
//! gitignore-style pattern matching for the directory walker.
//!
//! The loader dogfoods the crate's own ZON lexer/parser (C2/C7) rather
//! than pulling in a generic deserialization path — `zz.zon` is the
//! first real consumer of the core this crate defines.

use std::fs;
use std::path::{Path, PathBuf};

use ego_tree::NodeRef;

use crate::ast::{Leaf, Node};
use crate::parser::zon;
use crate::registry::zon as rules;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymlinkBehavior {
    Skip,
    Follow,
    Report,
}

impl Default for SymlinkBehavior {
    fn default() -> Self {
        SymlinkBehavior::Skip
    }
}

/// Resolved `zz.zon` settings (spec.md §6's config table), always
/// complete — [`Config::load`] never returns a partially-populated
/// value, it falls back to [`Config::default`] wholesale on any
/// problem per §7's "Config — missing/malformed" policy.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// `true` for `base_patterns = "extend"` (merge with the built-in
    /// defaults below); `false` for `base_patterns = .{...}`, which
    /// replaces them with `base_patterns_custom`.
    pub base_patterns_extend: bool,
    pub base_patterns_custom: Vec<String>,
    pub ignored_patterns: Vec<String>,
    pub hidden_files: Vec<String>,
    pub respect_gitignore: bool,
    pub symlink_behavior: SymlinkBehavior,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            base_patterns_extend: true,
            base_patterns_custom: Vec::new(),
            ignored_patterns: vec!["target/**".to_string(), "node_modules/**".to_string(), ".git/**".to_string()],
            hidden_files: vec![".DS_Store".to_string()],
            respect_gitignore: true,
            symlink_behavior: SymlinkBehavior::default(),
        }
    }
}

impl Config {
    /// Searches `dir` and its ancestors for `zz.zon`. Missing file or a
    /// parse/shape mismatch both fall back to [`Config::default`],
    /// logging a warning in the latter case only (a missing file is the
    /// expected common case, not worth warning about).
    pub fn load(dir: &Path) -> Config {
        let Some(path) = find_upward(dir, "zz.zon") else {
            return Config::default();
        };
        let source = match fs::read_to_string(&path) {
            Ok(s) => s,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "failed to read zz.zon, using defaults");
                return Config::default();
            }
        };
        match parse_config(&source) {
            Some(config) => config,
            None => {
                tracing::warn!(path = %path.display(), "zz.zon did not match the expected shape, using defaults");
                Config::default()
            }
        }
    }

    /// Combines `hidden_files`, `ignored_patterns` and (when
    /// `respect_gitignore`) a parsed `.gitignore` at `gitignore_lines`
    /// into a single skip/keep decision for the walker.
    pub fn is_ignored(&self, path: &Path, gitignore_lines: &[String]) -> bool {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        if self.hidden_files.iter().any(|hidden| hidden == name) {
            return true;
        }
        let path_str = path.to_string_lossy();
        if self.ignored_patterns.iter().any(|pattern| glob_match(pattern, &path_str)) {
            return true;
        }
        self.respect_gitignore && gitignore_lines.iter().any(|pattern| glob_match(pattern, &path_str) || glob_match(pattern, name))
    }
}

fn find_upward(start: &Path, filename: &str) -> Option<PathBuf> {
    let mut dir = Some(start);
    while let Some(d) = dir {
        let candidate = d.join(filename);
        if candidate.is_file() {
            return Some(candidate);
        }
        dir = d.parent();
    }
    None
}

fn parse_config(source: &str) -> Option<Config> {
    let ast = zon::parse(source);
    if !ast.diagnostics.is_empty() {
        return None;
    }
    let root = ast.root().first_child()?;
    if root.value().rule_id != rules::STRUCT_LITERAL {
        return None;
    }

    let mut config = Config::default();
    for field in root.children() {
        if field.value().rule_id != rules::FIELD_ASSIGNMENT {
            continue;
        }
        let Some(name) = field_name(field) else { continue };
        let Some(value) = field.children().nth(1) else { continue };
        match name.as_str() {
            "base_patterns" => apply_base_patterns(&mut config, value),
            "ignored_patterns" => config.ignored_patterns = string_list(value),
            "hidden_files" => config.hidden_files = string_list(value),
            "respect_gitignore" => {
                if let Leaf::Bool(b) = value.value().payload {
                    config.respect_gitignore = b;
                }
            }
            "symlink_behavior" => {
                if let Some(behavior) = symlink_behavior(value) {
                    config.symlink_behavior = behavior;
                }
            }
            _ => {}
        }
    }
    Some(config)
}

fn field_name(field: NodeRef<'_, Node>) -> Option<String> {
    let name_node = field.first_child()?;
    match &name_node.value().payload {
        Leaf::Text(s) => Some(s.clone()),
        _ => None,
    }
}

fn apply_base_patterns(config: &mut Config, value: NodeRef<'_, Node>) {
    match &value.value().payload {
        Leaf::Text(s) if s == "extend" => config.base_patterns_extend = true,
        _ => {
            config.base_patterns_extend = false;
            config.base_patterns_custom = string_list(value);
        }
    }
}

fn string_list(container: NodeRef<'_, Node>) -> Vec<String> {
    container
        .children()
        .filter_map(|child| match &child.value().payload {
            Leaf::Text(s) => Some(s.clone()),
            _ => None,
        })
        .collect()
}

fn symlink_behavior(value: NodeRef<'_, Node>) -> Option<SymlinkBehavior> {
    let text = match &value.value().payload {
        Leaf::Text(s) => s.as_str(),
        _ => return None,
    };
    match text {
        "skip" => Some(SymlinkBehavior::Skip),
        "follow" => Some(SymlinkBehavior::Follow),
        "report" => Some(SymlinkBehavior::Report),
        _ => None,
    }
}

/// Hand-rolled glob matcher supporting `*` (any run within a path
/// segment), `**` (any run including `/`) and `?` (single character) —
/// narrow enough that pulling in a globbing crate for it isn't
/// warranted, matching this crate's preference for small hand-rolled
/// matchers over a dependency for a single narrow need.
fn glob_match(pattern: &str, text: &str) -> bool {
    return match_from(pattern.as_bytes(), text.as_bytes());

    fn match_from(pattern: &[u8], text: &[u8]) -> bool {
        match pattern.first() {
            None => text.is_empty(),
            Some(b'*') => {
                if pattern.get(1) == Some(&b'*') {
                    let rest = &pattern[2..];
                    (0..=text.len()).any(|i| match_from(rest, &text[i..]))
                } else {
                    let rest = &pattern[1..];
                    (0..=text.len())
                        .take_while(|&i| i == 0 || text[i - 1] != b'/')
                        .any(|i| match_from(rest, &text[i..]))
                }
            }
            Some(b'?') => !text.is_empty() && text[0] != b'/' && match_from(&pattern[1..], &text[1..]),
            Some(&b) => !text.is_empty() && text[0] == b && match_from(&pattern[1..], &text[1..]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn malformed_zz_zon_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("zz.zon"), "not valid zon {{{").unwrap();
        let config = Config::load(dir.path());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn parses_recognized_keys() {
        let source = r#".{
            .ignored_patterns = .{"target/**", "*.log"},
            .hidden_files = .{".DS_Store", ".env"},
            .respect_gitignore = false,
            .symlink_behavior = .follow,
        }"#;
        let config = parse_config(source).unwrap();
        assert_eq!(config.ignored_patterns, vec!["target/**", "*.log"]);
        assert_eq!(config.hidden_files, vec![".DS_Store", ".env"]);
        assert!(!config.respect_gitignore);
        assert_eq!(config.symlink_behavior, SymlinkBehavior::Follow);
    }

    #[test]
    fn base_patterns_extend_keyword_is_recognized() {
        let source = r#".{ .base_patterns = "extend" }"#;
        let config = parse_config(source).unwrap();
        assert!(config.base_patterns_extend);
    }

    #[test]
    fn base_patterns_custom_list_replaces_defaults() {
        let source = r#".{ .base_patterns = .{"*.rs", "*.toml"} }"#;
        let config = parse_config(source).unwrap();
        assert!(!config.base_patterns_extend);
        assert_eq!(config.base_patterns_custom, vec!["*.rs", "*.toml"]);
    }

    #[test]
    fn glob_star_matches_within_a_segment() {
        assert!(glob_match("*.log", "debug.log"));
        assert!(!glob_match("*.log", "nested/debug.log"));
    }

    #[test]
    fn glob_double_star_matches_across_segments() {
        assert!(glob_match("target/**", "target/debug/build.rs"));
        assert!(glob_match("**/*.rs", "src/lib/a.rs"));
    }

    #[test]
    fn is_ignored_checks_hidden_files_and_patterns() {
        let config = Config::default();
        assert!(config.is_ignored(Path::new("/repo/.git/config"), &[]));
        assert!(config.is_ignored(Path::new("/repo/.DS_Store"), &[]));
        assert!(!config.is_ignored(Path::new("/repo/src/main.rs"), &[]));
    }
}
