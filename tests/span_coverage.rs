//! Property 2 (spec.md §8): for every AST node, `node.span` is a superset
//! of the union of its children's spans, and the root span covers the
//! whole source. Checked across every language's declarations-level
//! parser, mirroring the teacher's `tests/parser/ast_construction/`
//! per-construct-then-cross-check layout.

use zz::ast::Ast;
use zz::lexer::json::Dialect;

fn assert_span_coverage(ast: &Ast<'_>) {
    fn check(node: ego_tree::NodeRef<'_, zz::ast::Node>) {
        let parent_span = node.value().span;
        for child in node.children() {
            let child_span = child.value().span;
            assert!(
                child_span.start >= parent_span.start && child_span.end <= parent_span.end,
                "child span {:?} escapes parent span {:?}",
                child_span,
                parent_span
            );
            check(child);
        }
    }
    check(ast.root());
}

#[test]
fn json_span_coverage() {
    let src = r#"{"a": 1, "b": [2, 3, {"c": true}]}"#;
    let ast = zz::parser::json::parse(src, Dialect::Strict);
    assert_eq!(ast.root().value().span.start, 0);
    assert_eq!(ast.root().value().span.end as usize, src.len());
    assert_span_coverage(&ast);
}

#[test]
fn zon_span_coverage() {
    let src = r#".{ .name = "x", .version = "1.0", .deps = .{} }"#;
    let ast = zz::parser::zon::parse(src);
    assert_eq!(ast.root().value().span.end as usize, src.len());
    assert_span_coverage(&ast);
}

#[test]
fn css_span_coverage() {
    let src = "a { color: red; padding: 1rem } @media (min-width: 1px) { b { color: blue } }";
    let ast = zz::parser::css::parse(src);
    assert_eq!(ast.root().value().span.end as usize, src.len());
    assert_span_coverage(&ast);
}

#[test]
fn html_span_coverage() {
    let src = "<div class=\"a\"><p>hi</p><br></div>";
    let ast = zz::parser::html::parse(src);
    assert_eq!(ast.root().value().span.end as usize, src.len());
    assert_span_coverage(&ast);
}

#[test]
fn typescript_span_coverage() {
    let src = "import x from \"./y\";\nexport function f(a: number): void { return; }\n";
    let ast = zz::parser::typescript::parse(src);
    assert_eq!(ast.root().value().span.end as usize, src.len());
    assert_span_coverage(&ast);
}

#[test]
fn zig_span_coverage() {
    let src = "const std = @import(\"std\");\nfn add(a: i32, b: i32) i32 { return a + b; }\n";
    let ast = zz::parser::zig::parse(src);
    assert_eq!(ast.root().value().span.end as usize, src.len());
    assert_span_coverage(&ast);
}
