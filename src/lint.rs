//! Linter (C12): rule-driven diagnostics over an already-built AST.
//!
//! Each rule is a plain function run over the tree via the traversal
//! API in [`crate::query`]; there is no side-channel into the fact
//! store, so every finding has to be derivable from `rule_id`/`span`/
//! `payload`/`is_error` alone. The linter never mutates the AST and
//! never panics on malformed input — it just emits [`Diagnostic`]s.

use std::collections::{HashMap, HashSet};

use ego_tree::NodeRef;

use crate::ast::{Ast, Leaf, Node};
use crate::diagnostics::{Diagnostic, Severity};
use crate::registry::{self, Language, RuleCategory};

/// A lint rule's stable 16-bit ID. Namespaced separately from
/// [`crate::span::RuleId`] — a lint finding classifies a *defect*, not
/// a grammar production.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LintRuleId(pub u16);

pub struct LintRule {
    pub id: LintRuleId,
    pub name: &'static str,
    pub default_severity: Severity,
    pub default_enabled: bool,
    /// `None` means the rule applies to every language the AST could be.
    pub language: Option<Language>,
    check: fn(&Ast<'_>, Severity) -> Vec<Diagnostic>,
}

/// The rule catalog (spec.md §4.9's common subset, one entry per named
/// rule). IDs are assigned in catalog order and are stable across
/// releases once published — never renumber an existing entry.
pub static RULES: &[LintRule] = &[
    LintRule {
        id: LintRuleId(1),
        name: "duplicate-object-key",
        default_severity: Severity::Warning,
        default_enabled: true,
        language: None,
        check: check_duplicate_key,
    },
    LintRule {
        id: LintRuleId(2),
        name: "missing-field-value",
        default_severity: Severity::Error,
        default_enabled: true,
        language: None,
        check: check_missing_field_value,
    },
    LintRule {
        id: LintRuleId(3),
        name: "mismatched-bracket",
        default_severity: Severity::Error,
        default_enabled: true,
        language: None,
        check: check_mismatched_bracket,
    },
    LintRule {
        id: LintRuleId(4),
        name: "invalid-utf8-escape",
        default_severity: Severity::Warning,
        default_enabled: true,
        language: None,
        check: check_invalid_escape,
    },
    LintRule {
        id: LintRuleId(5),
        name: "trailing-comma-where-disallowed",
        default_severity: Severity::Warning,
        default_enabled: true,
        language: Some(Language::Json),
        check: check_trailing_comma,
    },
    LintRule {
        id: LintRuleId(6),
        name: "invalid-at-rule",
        default_severity: Severity::Warning,
        default_enabled: true,
        language: Some(Language::Css),
        check: check_invalid_at_rule,
    },
    LintRule {
        id: LintRuleId(7),
        name: "unknown-tag",
        default_severity: Severity::Info,
        default_enabled: true,
        language: Some(Language::Html),
        check: check_unknown_tag,
    },
];

pub fn all_rules() -> &'static [LintRule] {
    RULES
}

/// The default enabled set: every rule whose `default_enabled` is true.
pub fn default_enabled() -> HashSet<LintRuleId> {
    RULES.iter().filter(|r| r.default_enabled).map(|r| r.id).collect()
}

/// Runs every enabled rule applicable to `ast.language` and returns the
/// combined diagnostics in source order (spec.md §4.9: "order-
/// deterministic on output"; §8 property 9: running twice returns equal
/// lists — every rule here is a pure function of `ast`, so that holds
/// by construction).
pub fn lint(ast: &Ast<'_>, enabled: &HashSet<LintRuleId>) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    for rule in RULES {
        if !enabled.contains(&rule.id) {
            continue;
        }
        if let Some(lang) = rule.language {
            if lang != ast.language {
                continue;
            }
        }
        out.extend((rule.check)(ast, rule.default_severity));
    }
    out.sort_by_key(|d| d.span.raw());
    out
}

fn walk_all<'a>(ast: &'a Ast<'a>, mut visit: impl FnMut(NodeRef<'a, Node>)) {
    crate::query::walk_pre_order(ast, |n| {
        visit(n);
        crate::query::Continuation::Descend
    });
}

fn key_text<'src>(ast: &Ast<'src>, field: NodeRef<'_, Node>) -> Option<String> {
    let key = field.first_child()?;
    match &key.value().payload {
        Leaf::Text(s) => Some(s.clone()),
        _ => Some(ast.text(key).to_string()),
    }
}

/// `duplicate-object-key` (JSON/ZON): two fields of the same container
/// sharing a decoded key.
fn check_duplicate_key(ast: &Ast<'_>, severity: Severity) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    walk_all(ast, |node| {
        let Some(info) = registry::lookup(node.value().rule_id) else { return };
        if info.category != RuleCategory::Container {
            return;
        }
        let mut seen: HashMap<String, ()> = HashMap::new();
        for child in node.children() {
            let Some(child_info) = registry::lookup(child.value().rule_id) else { continue };
            if child_info.category != RuleCategory::Field {
                continue;
            }
            let Some(key) = key_text(ast, child) else { continue };
            if seen.insert(key.clone(), ()).is_some() {
                out.push(Diagnostic::new(
                    child.value().rule_id,
                    severity,
                    format!("duplicate key `{key}`"),
                    child.value().span,
                ));
            }
        }
    });
    out
}

/// `missing-field-value` (JSON/ZON/CSS): a field whose value position
/// recovered into an `error` node.
fn check_missing_field_value(ast: &Ast<'_>, severity: Severity) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    walk_all(ast, |node| {
        let Some(info) = registry::lookup(node.value().rule_id) else { return };
        if info.category != RuleCategory::Field {
            return;
        }
        if let Some(value) = node.children().nth(1) {
            if value.value().is_error {
                out.push(Diagnostic::new(
                    node.value().rule_id,
                    severity,
                    "field has no value",
                    node.value().span,
                ));
            }
        }
    });
    out
}

/// `mismatched-bracket`: any recovered `error` node whose text contains
/// a bracket character, distinguishing a bracket-shaped recovery from
/// other syntax errors (spec.md §4.9 lists these as separate rules).
fn check_mismatched_bracket(ast: &Ast<'_>, severity: Severity) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    walk_all(ast, |node| {
        if !node.value().is_error {
            return;
        }
        let text = ast.text(node);
        if text.chars().any(|c| matches!(c, '{' | '}' | '[' | ']' | '(' | ')')) {
            out.push(Diagnostic::new(
                node.value().rule_id,
                severity,
                "mismatched bracket",
                node.value().span,
            ));
        }
    });
    out
}

/// `invalid-utf8-escape`: a string literal containing a `\` not
/// followed by one of the escape characters spec.md §4.1 treats as
/// valid inside string contexts.
fn check_invalid_escape(ast: &Ast<'_>, severity: Severity) -> Vec<Diagnostic> {
    const VALID: &[char] = &['"', '\'', '\\', '/', 'b', 'f', 'n', 'r', 't', 'u'];
    let mut out = Vec::new();
    walk_all(ast, |node| {
        let Some(info) = registry::lookup(node.value().rule_id) else { return };
        if info.category != RuleCategory::Literal || !matches!(&node.value().payload, Leaf::Text(_)) {
            return;
        }
        let text = ast.text(node);
        let mut chars = text.char_indices().peekable();
        while let Some((i, c)) = chars.next() {
            if c != '\\' {
                continue;
            }
            match chars.peek() {
                Some((_, next)) if VALID.contains(next) => {
                    chars.next();
                }
                _ => {
                    let start = node.value().span.start + i as u32;
                    out.push(Diagnostic::new(
                        node.value().rule_id,
                        severity,
                        "invalid escape sequence",
                        crate::span::Span::new(start, start + 1),
                    ));
                }
            }
        }
    });
    out
}

/// `trailing-comma-where-disallowed`: scoped to strict-JSON ASTs (the
/// [`crate::registry::Language::Json`] filter on this rule's catalog
/// entry). An [`Ast`] doesn't retain which [`crate::lexer::json::Dialect`]
/// produced it, so this conservatively flags every JSON trailing comma;
/// callers formatting JSON5 input should disable rule 5.
fn check_trailing_comma(ast: &Ast<'_>, severity: Severity) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    walk_all(ast, |node| {
        let Some(info) = registry::lookup(node.value().rule_id) else { return };
        if info.category != RuleCategory::Container {
            return;
        }
        let children: Vec<_> = node.children().filter(|c| registry::lookup(c.value().rule_id).is_some_and(|i| i.category != RuleCategory::Comment)).collect();
        let Some(last) = children.last() else { return };
        let tail = ast.source[last.value().span.end as usize..node.value().span.end as usize].trim_start();
        if tail.starts_with(',') {
            out.push(Diagnostic::new(
                node.value().rule_id,
                severity,
                "trailing comma",
                node.value().span,
            ));
        }
    });
    out
}

const KNOWN_AT_RULES: &[&str] = &[
    "@import", "@media", "@keyframes", "@charset", "@font-face", "@supports", "@page", "@namespace", "@document",
];

/// `invalid-at-rule` (CSS): an `@`-rule keyword outside the known set.
fn check_invalid_at_rule(ast: &Ast<'_>, severity: Severity) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    walk_all(ast, |node| {
        if node.value().rule_id != registry::css::AT_RULE {
            return;
        }
        let text = ast.text(node);
        let keyword = text.split(|c: char| c.is_whitespace() || c == '{' || c == ';').next().unwrap_or(text);
        if !KNOWN_AT_RULES.iter().any(|k| k.eq_ignore_ascii_case(keyword)) {
            out.push(Diagnostic::new(
                registry::css::AT_RULE,
                severity,
                format!("unknown at-rule `{keyword}`"),
                node.value().span,
            ));
        }
    });
    out
}

const KNOWN_HTML_TAGS: &[&str] = &[
    "html", "head", "body", "title", "meta", "link", "style", "script", "div", "span", "p", "a", "ul", "ol", "li",
    "table", "tr", "td", "th", "thead", "tbody", "tfoot", "form", "input", "button", "label", "select", "option",
    "textarea", "img", "br", "hr", "h1", "h2", "h3", "h4", "h5", "h6", "header", "footer", "main", "nav", "section",
    "article", "aside", "figure", "figcaption", "pre", "code", "em", "strong", "b", "i", "u", "small", "svg", "path",
    "canvas", "video", "audio", "source", "iframe", "template", "slot", "area", "base", "col", "embed", "param",
    "track", "wbr", "noscript", "picture", "details", "summary", "dialog", "fieldset", "legend", "datalist",
    "output", "progress", "meter", "time", "mark", "ruby", "rt", "rp", "bdi", "bdo", "wbr", "address",
];

/// An [`html::ELEMENT`](registry::html::ELEMENT) node's span covers the
/// whole element (tag through matching close tag, spec.md §4.5's DOM
/// tree), not just its name — so the tag name has to be re-read from
/// the leading `<name` text rather than taken as the node's full text.
fn html_tag_name<'src>(ast: &Ast<'src>, node: NodeRef<'_, Node>) -> &'src str {
    let bytes = ast.source.as_bytes();
    let mut i = node.value().span.start as usize;
    if bytes.get(i) == Some(&b'<') {
        i += 1;
    }
    let name_start = i;
    while i < bytes.len() && !matches!(bytes[i], b' ' | b'\t' | b'\n' | b'\r' | b'>' | b'/') {
        i += 1;
    }
    &ast.source[name_start..i]
}

/// `unknown-tag` (HTML): an element name that isn't a known HTML5 tag.
fn check_unknown_tag(ast: &Ast<'_>, severity: Severity) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    walk_all(ast, |node| {
        if node.value().rule_id != registry::html::ELEMENT {
            return;
        }
        let name = html_tag_name(ast, node);
        if !KNOWN_HTML_TAGS.iter().any(|t| t.eq_ignore_ascii_case(name)) && !name.contains('-') {
            out.push(Diagnostic::new(
                registry::html::ELEMENT,
                severity,
                format!("unknown tag `{name}`"),
                node.value().span,
            ));
        }
    });
    out
}

/// `empty-script/style section` (Svelte): a present `<script>` or
/// `<style>` section with no children at all. Operates on a
/// [`crate::parser::svelte::SvelteDocument`] rather than a single
/// [`Ast`], since Svelte's sections are separate per-language trees
/// (spec.md §4.5).
pub fn lint_svelte_sections(doc: &crate::parser::svelte::SvelteDocument<'_>) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    if let Some(script) = &doc.script {
        if script.root().children().count() == 0 {
            out.push(Diagnostic::new(
                registry::svelte::SCRIPT_SECTION,
                Severity::Info,
                "empty script section",
                script.root().value().span,
            ));
        }
    }
    if let Some(style) = &doc.style {
        if style.root().children().count() == 0 {
            out.push(Diagnostic::new(
                registry::svelte::STYLE_SECTION,
                Severity::Info,
                "empty style section",
                style.root().value().span,
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::json::Dialect;

    #[test]
    fn flags_duplicate_object_key() {
        let ast = crate::parser::json::parse(r#"{"a":1,"a":2}"#, Dialect::Strict);
        let diags = lint(&ast, &default_enabled());
        assert!(diags.iter().any(|d| d.message.contains("duplicate key")));
    }

    #[test]
    fn no_duplicate_when_keys_differ() {
        let ast = crate::parser::json::parse(r#"{"a":1,"b":2}"#, Dialect::Strict);
        let diags = lint(&ast, &default_enabled());
        assert!(!diags.iter().any(|d| d.message.contains("duplicate key")));
    }

    #[test]
    fn flags_missing_field_value() {
        let ast = crate::parser::json::parse(r#"{"a": }"#, Dialect::Strict);
        let diags = lint(&ast, &default_enabled());
        assert!(diags.iter().any(|d| d.message.contains("no value")));
    }

    #[test]
    fn flags_trailing_comma_in_json() {
        let ast = crate::parser::json::parse(r#"{"a":1,}"#, Dialect::Strict);
        let diags = lint(&ast, &default_enabled());
        assert!(diags.iter().any(|d| d.message == "trailing comma"));
    }

    #[test]
    fn flags_unknown_at_rule() {
        let ast = crate::parser::css::parse("@frobnicate screen { a { color: red; } }");
        let diags = lint(&ast, &default_enabled());
        assert!(diags.iter().any(|d| d.message.contains("unknown at-rule")));
    }

    #[test]
    fn accepts_known_at_rule() {
        let ast = crate::parser::css::parse("@media screen { a { color: red; } }");
        let diags = lint(&ast, &default_enabled());
        assert!(!diags.iter().any(|d| d.message.contains("unknown at-rule")));
    }

    #[test]
    fn flags_unknown_html_tag() {
        let ast = crate::parser::html::parse("<fooble>hi</fooble>");
        let diags = lint(&ast, &default_enabled());
        assert!(diags.iter().any(|d| d.message.contains("unknown tag")));
    }

    #[test]
    fn custom_element_with_hyphen_is_not_flagged() {
        let ast = crate::parser::html::parse("<my-widget>hi</my-widget>");
        let diags = lint(&ast, &default_enabled());
        assert!(!diags.iter().any(|d| d.message.contains("unknown tag")));
    }

    #[test]
    fn disabling_a_rule_suppresses_its_findings() {
        let ast = crate::parser::json::parse(r#"{"a":1,"a":2}"#, Dialect::Strict);
        let mut enabled = default_enabled();
        enabled.remove(&LintRuleId(1));
        let diags = lint(&ast, &enabled);
        assert!(!diags.iter().any(|d| d.message.contains("duplicate key")));
    }

    #[test]
    fn lint_is_deterministic_across_runs() {
        let ast = crate::parser::json::parse(r#"{"a":1,"a":2,"b": }"#, Dialect::Strict);
        let enabled = default_enabled();
        let first = lint(&ast, &enabled);
        let second = lint(&ast, &enabled);
        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.message, b.message);
            assert_eq!(a.span, b.span);
        }
    }

    #[test]
    fn svelte_empty_script_section_is_flagged() {
        let doc = crate::parser::svelte::parse("<script></script><div>hi</div>");
        let diags = lint_svelte_sections(&doc);
        assert!(diags.iter().any(|d| d.message.contains("empty script")));
    }
}
