//! Declarations-level parser for Zig (spec.md §4.5, §9): recognizes
//! top-level `fn` and `test` declarations and `@import` calls; a plain
//! value binding with neither gets no dedicated node, matching the
//! "declarations + @import calls" scope this layer commits to. Function
//! and test bodies, and struct/enum/union container bodies, are each
//! captured as a single opaque span.

use ego_tree::NodeId;

use crate::ast::{Ast, Leaf, Node};
use crate::lexer::core::Payload;
use crate::lexer::zig::{tokenize, Kind};
use crate::lexer::Token;
use crate::parser::TokenCursor;
use crate::registry::{zig, Language};
use crate::span::Span;

pub fn parse(source: &str) -> Ast<'_> {
    let tokens = tokenize(source);
    let mut cursor = TokenCursor::new(tokens);
    let root = Node::new(zig::DOCUMENT, Span::new(0, source.len() as u32));
    let mut ast = Ast::new(root, source, Language::Zig);
    let root_id = ast.root_id();
    while !cursor.is_at_end() {
        skip_comments(&mut cursor, &mut ast, root_id);
        if cursor.is_at_end() {
            break;
        }
        parse_top_level_item(&mut cursor, &mut ast, root_id);
    }
    ast
}

fn skip_comments(cursor: &mut TokenCursor<'_, Kind>, ast: &mut Ast<'_>, parent: NodeId) {
    loop {
        let rule = match cursor.peek_kind() {
            Kind::CommentLine => zig::COMMENT,
            Kind::DocComment => zig::DOC_COMMENT,
            _ => break,
        };
        let tok = cursor.advance();
        ast.append_child(parent, Node::new(rule, tok.span));
    }
}

fn keyword_text<'a>(cursor: &TokenCursor<'a, Kind>) -> Option<&'a str> {
    if cursor.check(Kind::Keyword) {
        match cursor.peek().payload {
            Payload::Text(s) => Some(s),
            _ => None,
        }
    } else {
        None
    }
}

/// `pub` is a visibility modifier, not its own declaration; its span
/// folds into whatever follows.
fn parse_top_level_item(cursor: &mut TokenCursor<'_, Kind>, ast: &mut Ast<'_>, parent: NodeId) {
    let pub_start = if keyword_text(cursor) == Some("pub") { Some(cursor.advance().span) } else { None };
    match keyword_text(cursor) {
        Some("fn") => {
            parse_fn_decl(cursor, ast, parent, pub_start);
        }
        Some("test") => {
            parse_test_decl(cursor, ast, parent, pub_start);
        }
        Some("const") | Some("var") => {
            parse_binding(cursor, ast, parent, pub_start);
        }
        _ => skip_to_top_level_boundary(cursor),
    }
}

/// Advances past one unrecognized top-level statement: a `{...}` block
/// (consumed as a balanced unit) or a run of tokens to the next `;` at
/// depth 0. Never leaves the cursor in place, so the caller's loop
/// always makes progress.
fn skip_to_top_level_boundary(cursor: &mut TokenCursor<'_, Kind>) {
    let mut depth = 0u32;
    loop {
        match cursor.peek_kind() {
            Kind::Eof => break,
            Kind::LBrace => {
                cursor.advance();
                depth += 1;
            }
            Kind::RBrace => {
                cursor.advance();
                if depth > 0 {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
            }
            Kind::Semicolon if depth == 0 => {
                cursor.advance();
                break;
            }
            _ => {
                cursor.advance();
            }
        }
    }
}

fn skip_balanced_braces(cursor: &mut TokenCursor<'_, Kind>) {
    cursor.advance(); // the opening brace
    let mut depth = 1u32;
    while depth > 0 && !cursor.is_at_end() {
        match cursor.advance().kind {
            Kind::LBrace => depth += 1,
            Kind::RBrace => depth -= 1,
            _ => {}
        }
    }
}

fn parse_opaque_body(cursor: &mut TokenCursor<'_, Kind>, ast: &mut Ast<'_>, parent: NodeId) -> Span {
    let open = cursor.advance();
    let mut depth = 1u32;
    let mut last = open.span;
    while depth > 0 && !cursor.is_at_end() {
        let tok = cursor.advance();
        last = tok.span;
        match tok.kind {
            Kind::LBrace => depth += 1,
            Kind::RBrace => depth -= 1,
            _ => {}
        }
    }
    let span = open.span.union(last);
    ast.append_child(parent, Node::new(zig::OPAQUE_BODY, span));
    span
}

/// Shared tail for `fn`/`test`/container declarations: consume the
/// header (params, return type, backing-int clause, …) opaquely up to
/// the body, then either capture an opaque `{...}` body or a bare `;`
/// (extern/ambient declarations have none).
fn skip_header_then_body_or_semicolon(cursor: &mut TokenCursor<'_, Kind>, ast: &mut Ast<'_>, parent: NodeId, start: Span) -> Span {
    let mut last = start;
    while !matches!(cursor.peek_kind(), Kind::LBrace | Kind::Semicolon | Kind::Eof) {
        last = cursor.advance().span;
    }
    if cursor.check(Kind::LBrace) {
        last = parse_opaque_body(cursor, ast, parent);
    } else if cursor.check(Kind::Semicolon) {
        last = cursor.advance().span;
    }
    last
}

fn attach_named_child(ast: &mut Ast<'_>, parent: NodeId, rule: crate::span::RuleId, tok: Token<'_, Kind>) {
    let payload = match tok.payload {
        Payload::Text(s) => Leaf::Text(s.to_string()),
        _ => Leaf::None,
    };
    ast.append_child(parent, Node::new(rule, tok.span).with_payload(payload));
}

fn parse_fn_decl(cursor: &mut TokenCursor<'_, Kind>, ast: &mut Ast<'_>, parent: NodeId, pub_start: Option<Span>) -> NodeId {
    let fn_tok = cursor.advance();
    let start = pub_start.unwrap_or(fn_tok.span);
    let fn_id = ast.append_child(parent, Node::new(zig::FN_DECL, start));
    if cursor.check(Kind::Identifier) {
        let name_tok = cursor.advance();
        attach_named_child(ast, fn_id, zig::IDENTIFIER, name_tok);
    }
    let last = skip_header_then_body_or_semicolon(cursor, ast, fn_id, fn_tok.span);
    ast.update_span(fn_id, start.union(last));
    fn_id
}

fn parse_test_decl(cursor: &mut TokenCursor<'_, Kind>, ast: &mut Ast<'_>, parent: NodeId, pub_start: Option<Span>) -> NodeId {
    let test_tok = cursor.advance();
    let start = pub_start.unwrap_or(test_tok.span);
    let test_id = ast.append_child(parent, Node::new(zig::TEST_DECL, start));
    if matches!(cursor.peek_kind(), Kind::String | Kind::Identifier) {
        let name_tok = cursor.advance();
        let rule = if name_tok.kind == Kind::String { zig::STRING } else { zig::IDENTIFIER };
        attach_named_child(ast, test_id, rule, name_tok);
    }
    let last = skip_header_then_body_or_semicolon(cursor, ast, test_id, test_tok.span);
    ast.update_span(test_id, start.union(last));
    test_id
}

fn is_container_keyword(payload: Payload<'_>) -> bool {
    matches!(payload, Payload::Text("struct") | Payload::Text("enum") | Payload::Text("union"))
}

/// `const`/`var` bindings are only distinguished into their own node
/// when the initializer is an `@import(...)` call or a `struct` /
/// `enum` / `union` container literal; any other value binding is
/// skipped without a node (non-goal: full expression grammar).
fn parse_binding(cursor: &mut TokenCursor<'_, Kind>, ast: &mut Ast<'_>, parent: NodeId, pub_start: Option<Span>) {
    let kw_tok = cursor.advance();
    let start = pub_start.unwrap_or(kw_tok.span);
    let name_tok = if cursor.check(Kind::Identifier) { Some(cursor.advance()) } else { None };

    loop {
        match cursor.peek_kind() {
            Kind::BuiltinCall if matches!(cursor.peek().payload, Payload::Text("import")) => {
                parse_import_call(cursor, ast, parent, start, name_tok);
                return;
            }
            Kind::Keyword if is_container_keyword(cursor.peek().payload) => {
                parse_container_decl(cursor, ast, parent, start, name_tok);
                return;
            }
            Kind::Semicolon => {
                cursor.advance();
                return;
            }
            Kind::Eof => return,
            Kind::LBrace => skip_balanced_braces(cursor),
            _ => {
                cursor.advance();
            }
        }
    }
}

fn parse_import_call(
    cursor: &mut TokenCursor<'_, Kind>,
    ast: &mut Ast<'_>,
    parent: NodeId,
    start: Span,
    name_tok: Option<Token<'_, Kind>>,
) {
    let call_tok = cursor.advance(); // the @import token itself
    let import_id = ast.append_child(parent, Node::new(zig::IMPORT_CALL, start));
    if let Some(name) = name_tok {
        attach_named_child(ast, import_id, zig::IDENTIFIER, name);
    }
    cursor.eat(Kind::LParen);
    let mut last = call_tok.span;
    if cursor.check(Kind::String) {
        let str_tok = cursor.advance();
        last = str_tok.span;
        attach_named_child(ast, import_id, zig::STRING, str_tok);
    }
    if cursor.check(Kind::RParen) {
        last = cursor.advance().span;
    }
    if cursor.check(Kind::Semicolon) {
        last = cursor.advance().span;
    }
    ast.update_span(import_id, start.union(last));
}

fn parse_container_decl(
    cursor: &mut TokenCursor<'_, Kind>,
    ast: &mut Ast<'_>,
    parent: NodeId,
    start: Span,
    name_tok: Option<Token<'_, Kind>>,
) {
    let kw_tok = cursor.advance(); // struct / enum / union
    let decl_id = ast.append_child(parent, Node::new(zig::CONTAINER_DECL, start));
    if let Some(name) = name_tok {
        attach_named_child(ast, decl_id, zig::IDENTIFIER, name);
    }
    let mut last = kw_tok.span;
    // Skips an enum's backing-type clause, e.g. `enum(u8)`.
    while !matches!(cursor.peek_kind(), Kind::LBrace | Kind::Semicolon | Kind::Eof) {
        last = cursor.advance().span;
    }
    if cursor.check(Kind::LBrace) {
        last = parse_opaque_body(cursor, ast, decl_id);
    } else if cursor.check(Kind::Semicolon) {
        last = cursor.advance().span;
    }
    ast.update_span(decl_id, start.union(last));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn import_binding_captures_name_and_path() {
        let ast = parse("const std = @import(\"std\");");
        assert!(ast.check_span_coverage());
        assert!(ast.check_rule_id_invariance());
        let import = ast.root().first_child().unwrap();
        assert_eq!(import.value().rule_id, zig::IMPORT_CALL);
        let name = import.children().find(|c| c.value().rule_id == zig::IDENTIFIER).unwrap();
        assert_eq!(name.value().payload, Leaf::Text("std".to_string()));
        let path = import.children().find(|c| c.value().rule_id == zig::STRING).unwrap();
        assert_eq!(path.value().payload, Leaf::Text("std".to_string()));
    }

    #[test]
    fn fn_decl_has_opaque_body() {
        let ast = parse("fn add(a: i32, b: i32) i32 { return a + b; }");
        let fn_decl = ast.root().first_child().unwrap();
        assert_eq!(fn_decl.value().rule_id, zig::FN_DECL);
        let name = fn_decl.children().find(|c| c.value().rule_id == zig::IDENTIFIER).unwrap();
        assert_eq!(name.value().payload, Leaf::Text("add".to_string()));
        assert!(fn_decl.children().any(|c| c.value().rule_id == zig::OPAQUE_BODY));
    }

    #[test]
    fn pub_fn_decl_span_includes_pub_keyword() {
        let src = "pub fn main() void {}";
        let ast = parse(src);
        let fn_decl = ast.root().first_child().unwrap();
        assert_eq!(fn_decl.value().span, Span::new(0, src.len() as u32));
    }

    #[test]
    fn test_decl_with_string_name() {
        let ast = parse("test \"add works\" { }");
        let test_decl = ast.root().first_child().unwrap();
        assert_eq!(test_decl.value().rule_id, zig::TEST_DECL);
        let name = test_decl.children().find(|c| c.value().rule_id == zig::STRING).unwrap();
        assert_eq!(name.value().payload, Leaf::Text("add works".to_string()));
    }

    #[test]
    fn struct_container_decl_has_opaque_body() {
        let ast = parse("const Point = struct { x: f64, y: f64 };");
        let decl = ast.root().first_child().unwrap();
        assert_eq!(decl.value().rule_id, zig::CONTAINER_DECL);
        assert!(decl.children().any(|c| c.value().rule_id == zig::OPAQUE_BODY));
    }

    #[test]
    fn plain_value_binding_yields_no_node() {
        let ast = parse("const x = 1 + 2;");
        assert_eq!(ast.root().children().count(), 0);
    }

    #[test]
    fn doc_comment_attaches_before_declaration() {
        let ast = parse("/// adds two numbers\nfn add(a: i32, b: i32) i32 { return a + b; }");
        let mut children = ast.root().children();
        let doc = children.next().unwrap();
        assert_eq!(doc.value().rule_id, zig::DOC_COMMENT);
        let fn_decl = children.next().unwrap();
        assert_eq!(fn_decl.value().rule_id, zig::FN_DECL);
    }
}
