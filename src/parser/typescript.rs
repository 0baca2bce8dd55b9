//! Declaration-level parser for TypeScript (spec.md §4.5): recognizes
//! imports, exports, and function/class/interface/enum/type-alias
//! declarations at the top level; everything inside a matching `{...}`
//! body is captured as one opaque span rather than re-parsed as
//! expressions/statements (Non-goal: no full JS/TS expression grammar).

use ego_tree::NodeId;

use crate::ast::{Ast, Leaf, Node};
use crate::lexer::core::Payload;
use crate::lexer::typescript::{tokenize, Kind};
use crate::parser::TokenCursor;
use crate::registry::{common, typescript, Language};
use crate::span::Span;

pub fn parse(source: &str) -> Ast<'_> {
    let tokens = tokenize(source);
    let mut cursor = TokenCursor::new(tokens);
    let root = Node::new(typescript::DOCUMENT, Span::new(0, source.len() as u32));
    let mut ast = Ast::new(root, source, Language::TypeScript);
    let root_id = ast.root_id();
    loop {
        skip_comments(&mut cursor, &mut ast, root_id);
        if cursor.is_at_end() {
            break;
        }
        parse_statement(&mut cursor, &mut ast, root_id);
    }
    ast
}

fn skip_comments(cursor: &mut TokenCursor<'_, Kind>, ast: &mut Ast<'_>, parent: NodeId) {
    loop {
        let rule = match cursor.peek_kind() {
            Kind::CommentLine | Kind::CommentBlock => typescript::COMMENT,
            Kind::DocComment => typescript::DOC_COMMENT,
            _ => break,
        };
        let tok = cursor.advance();
        ast.append_child(parent, Node::new(rule, tok.span));
    }
}

fn keyword_text(cursor: &TokenCursor<'_, Kind>) -> Option<&str> {
    if cursor.check(Kind::Keyword) {
        match cursor.peek().payload {
            Payload::Text(s) => Some(s),
            _ => None,
        }
    } else {
        None
    }
}

fn parse_statement(cursor: &mut TokenCursor<'_, Kind>, ast: &mut Ast<'_>, parent: NodeId) -> NodeId {
    match keyword_text(cursor) {
        Some("import") => parse_import(cursor, ast, parent),
        Some("export") => parse_export(cursor, ast, parent),
        Some("function") => parse_fn_decl(cursor, ast, parent),
        Some("class") => parse_tagged_decl(cursor, ast, parent, typescript::CLASS_DECL),
        Some("interface") => parse_tagged_decl(cursor, ast, parent, typescript::INTERFACE_DECL),
        Some("enum") => parse_tagged_decl(cursor, ast, parent, typescript::ENUM_DECL),
        Some("type") => parse_type_alias(cursor, ast, parent),
        _ => parse_generic_statement(cursor, ast, parent),
    }
}

/// Consumes a `{...}` body as a single opaque node, tracking nesting
/// depth itself rather than relying on the lexer's `depth` field (kept
/// local and self-contained). Appends one `typescript.opaque_body` node
/// spanning both braces and returns its span.
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
    ast.append_child(parent, Node::new(typescript::OPAQUE_BODY, span));
    span
}

fn parse_import(cursor: &mut TokenCursor<'_, Kind>, ast: &mut Ast<'_>, parent: NodeId) -> NodeId {
    let start = cursor.advance().span;
    let import_id = ast.append_child(parent, Node::new(typescript::IMPORT, start));
    let mut last = start;
    let mut last_string: Option<(&str, Span)> = None;
    while !matches!(cursor.peek_kind(), Kind::Semicolon | Kind::Eof) {
        let tok = cursor.advance();
        last = tok.span;
        if tok.kind == Kind::String {
            if let Payload::Text(s) = tok.payload {
                last_string = Some((s, tok.span));
            }
        }
    }
    if let Some((text, span)) = last_string {
        ast.append_child(import_id, Node::new(typescript::STRING, span).with_payload(Leaf::Text(text.to_string())));
    }
    if cursor.check(Kind::Semicolon) {
        last = cursor.advance().span;
    }
    ast.update_span(import_id, start.union(last));
    import_id
}

fn parse_export(cursor: &mut TokenCursor<'_, Kind>, ast: &mut Ast<'_>, parent: NodeId) -> NodeId {
    let start = cursor.advance().span;
    let export_id = ast.append_child(parent, Node::new(typescript::EXPORT, start));
    let inner_span = if cursor.is_at_end() || cursor.check(Kind::Semicolon) {
        start
    } else {
        let inner_id = parse_statement(cursor, ast, export_id);
        ast.get(inner_id).expect("just appended").value().span
    };
    if cursor.check(Kind::Semicolon) {
        let semi = cursor.advance();
        ast.update_span(export_id, start.union(inner_span).union(semi.span));
    } else {
        ast.update_span(export_id, start.union(inner_span));
    }
    export_id
}

fn parse_fn_decl(cursor: &mut TokenCursor<'_, Kind>, ast: &mut Ast<'_>, parent: NodeId) -> NodeId {
    let start = cursor.advance().span;
    let fn_id = ast.append_child(parent, Node::new(typescript::FN_DECL, start));
    attach_identifier_if_present(cursor, ast, fn_id);
    let last = skip_header_then_body_or_semicolon(cursor, ast, fn_id, start);
    ast.update_span(fn_id, start.union(last));
    fn_id
}

fn parse_tagged_decl(cursor: &mut TokenCursor<'_, Kind>, ast: &mut Ast<'_>, parent: NodeId, rule: crate::span::RuleId) -> NodeId {
    let start = cursor.advance().span;
    let decl_id = ast.append_child(parent, Node::new(rule, start));
    attach_identifier_if_present(cursor, ast, decl_id);
    let last = skip_header_then_body_or_semicolon(cursor, ast, decl_id, start);
    ast.update_span(decl_id, start.union(last));
    decl_id
}

fn parse_type_alias(cursor: &mut TokenCursor<'_, Kind>, ast: &mut Ast<'_>, parent: NodeId) -> NodeId {
    let start = cursor.advance().span;
    let alias_id = ast.append_child(parent, Node::new(typescript::TYPE_ALIAS, start));
    attach_identifier_if_present(cursor, ast, alias_id);
    let mut last = start;
    while !matches!(cursor.peek_kind(), Kind::Semicolon | Kind::Eof) {
        last = cursor.advance().span;
    }
    if cursor.check(Kind::Semicolon) {
        last = cursor.advance().span;
    }
    ast.update_span(alias_id, start.union(last));
    alias_id
}

fn parse_generic_statement(cursor: &mut TokenCursor<'_, Kind>, ast: &mut Ast<'_>, parent: NodeId) -> NodeId {
    let start = cursor.peek().span;
    let stmt_id = ast.append_child(parent, Node::new(typescript::STATEMENT, start));
    let mut last = start;
    loop {
        match cursor.peek_kind() {
            Kind::Semicolon => {
                last = cursor.advance().span;
                break;
            }
            Kind::LBrace => {
                last = parse_opaque_body(cursor, ast, stmt_id);
            }
            Kind::Eof => break,
            _ => {
                last = cursor.advance().span;
            }
        }
    }
    ast.update_span(stmt_id, start.union(last));
    stmt_id
}

fn attach_identifier_if_present(cursor: &mut TokenCursor<'_, Kind>, ast: &mut Ast<'_>, parent: NodeId) {
    if cursor.check(Kind::Identifier) {
        let tok = cursor.advance();
        let payload = match tok.payload {
            Payload::Text(s) => Leaf::Text(s.to_string()),
            _ => Leaf::None,
        };
        ast.append_child(parent, Node::new(typescript::IDENTIFIER, tok.span).with_payload(payload));
    }
}

/// Shared tail for function/class/interface/enum declarations: consume
/// everything up to the body (params, heritage clauses, type
/// parameters) opaquely, then either an opaque `{...}` body or a bare
/// `;` (ambient/overload declarations have no body).
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn import_declaration_captures_module_specifier() {
        let ast = parse("import x from \"./y\";");
        assert!(ast.check_span_coverage());
        assert!(ast.check_rule_id_invariance());
        let import = ast.root().first_child().unwrap();
        assert_eq!(import.value().rule_id, typescript::IMPORT);
        let string = import.children().find(|c| c.value().rule_id == typescript::STRING).unwrap();
        assert_eq!(string.value().payload, Leaf::Text("./y".to_string()));
    }

    #[test]
    fn exported_function_declaration_nests_fn_decl_under_export() {
        let ast = parse("export function f(a: number): number { return a; }");
        let export = ast.root().first_child().unwrap();
        assert_eq!(export.value().rule_id, typescript::EXPORT);
        let fn_decl = export.first_child().unwrap();
        assert_eq!(fn_decl.value().rule_id, typescript::FN_DECL);
        let name = fn_decl.children().find(|c| c.value().rule_id == typescript::IDENTIFIER).unwrap();
        assert_eq!(name.value().payload, Leaf::Text("f".to_string()));
    }

    #[test]
    fn interface_declaration_has_opaque_body() {
        let ast = parse("interface Point { x: number; y: number; }");
        let decl = ast.root().first_child().unwrap();
        assert_eq!(decl.value().rule_id, typescript::INTERFACE_DECL);
        assert_eq!(decl.value().span, Span::new(0, "interface Point { x: number; y: number; }".len() as u32));
    }

    #[test]
    fn type_alias_runs_to_semicolon() {
        let ast = parse("type Id = string;");
        let decl = ast.root().first_child().unwrap();
        assert_eq!(decl.value().rule_id, typescript::TYPE_ALIAS);
    }
}
