//! Property 9 (spec.md §8): running the linter twice over the same AST
//! returns equal diagnostic lists, and every rule in the catalog has a
//! stable, non-zero-duplicated ID.

use std::collections::HashSet;

use zz::lexer::json::Dialect;
use zz::lint::{self, LintRuleId};

#[test]
fn rule_catalog_ids_are_unique() {
    let rules = lint::all_rules();
    assert!(!rules.is_empty());
    let mut ids: Vec<LintRuleId> = rules.iter().map(|r| r.id).collect();
    let before = ids.len();
    ids.sort_by_key(|id| id.0);
    ids.dedup();
    assert_eq!(ids.len(), before, "lint rule catalog has a duplicate ID");
}

#[test]
fn duplicate_object_key_is_found_twice_identically() {
    let ast = zz::parser::json::parse(r#"{"a":1,"a":2,"b":3}"#, Dialect::Strict);
    let enabled = lint::default_enabled();
    let first = lint::lint(&ast, &enabled);
    let second = lint::lint(&ast, &enabled);
    assert_eq!(first, second);
    assert!(!first.is_empty(), "duplicate key should raise a diagnostic");
}

#[test]
fn css_diagnostics_are_order_deterministic() {
    let ast = zz::parser::css::parse("@bogus-at-rule foo { a { color: red } }");
    let enabled = lint::default_enabled();
    let a = lint::lint(&ast, &enabled);
    let b = lint::lint(&ast, &enabled);
    assert_eq!(a, b);
}

#[test]
fn disabling_all_rules_yields_no_diagnostics() {
    let ast = zz::parser::json::parse(r#"{"a":1,"a":2,}"#, Dialect::Strict);
    let none: HashSet<LintRuleId> = HashSet::new();
    assert!(lint::lint(&ast, &none).is_empty());
}
