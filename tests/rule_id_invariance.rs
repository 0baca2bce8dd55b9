//! Property 3 (spec.md §8): every AST node's `rule_id` is a key present
//! in the registry, and `registry[rule_id].language` matches the AST's
//! language (except for the language-neutral `common` range, which any
//! language's tree may use for whitespace/comments/identifiers/errors).

use zz::ast::Ast;
use zz::lexer::json::Dialect;
use zz::registry::{self, Language};

fn assert_rule_ids_known(ast: &Ast<'_>, language: Language) {
    fn check(node: ego_tree::NodeRef<'_, zz::ast::Node>, language: Language) {
        let id = node.value().rule_id;
        let info = registry::lookup(id).unwrap_or_else(|| panic!("rule id {:?} has no registry entry", id));
        assert!(
            info.language == language || info.language == Language::Common,
            "rule {:?} belongs to {:?}, not {:?} or common",
            id,
            info.language,
            language
        );
        for child in node.children() {
            check(child, language);
        }
    }
    check(ast.root(), language);
}

#[test]
fn json_rule_ids_are_registered() {
    let ast = zz::parser::json::parse(r#"{"a": 1, "b": [2, 3]}"#, Dialect::Strict);
    assert_rule_ids_known(&ast, Language::Json);
}

#[test]
fn zon_rule_ids_are_registered() {
    let ast = zz::parser::zon::parse(r#".{ .a = 1, .b = .{ .c = 2 } }"#);
    assert_rule_ids_known(&ast, Language::Zon);
}

#[test]
fn css_rule_ids_are_registered() {
    let ast = zz::parser::css::parse("a{color:red}@media(min-width:1px){b{color:blue}}");
    assert_rule_ids_known(&ast, Language::Css);
}

#[test]
fn html_rule_ids_are_registered() {
    let ast = zz::parser::html::parse("<div><p>hi</p></div>");
    assert_rule_ids_known(&ast, Language::Html);
}

#[test]
fn malformed_json_still_has_registered_rule_ids() {
    // Error recovery (spec.md §4.5) still has to produce a well-formed
    // tree: an `error` node is a registered rule, not an escape hatch.
    let ast = zz::parser::json::parse(r#"{"a": }"#, Dialect::Strict);
    assert_rule_ids_known(&ast, Language::Json);
    assert!(!ast.diagnostics.is_empty());
}
