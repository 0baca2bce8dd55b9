//! Recursive-descent parser for ZON (Zig Object Notation), spec.md §4.5.
//!
//! A ZON document is a single top-level value, almost always a `.{...}`
//! struct literal. Struct-literal bodies mix two entry shapes: `.field
//! = value` / `.field: value` assignments and bare positional elements
//! (arrays are just struct literals with no field names). A lone `.name`
//! with no following separator is an enum literal, not a field.

use crate::ast::{Ast, Leaf, Node};
use crate::lexer::core::Payload;
use crate::lexer::zon::{tokenize, Kind};
use crate::parser::TokenCursor;
use crate::registry::{common, zon, Language};
use crate::span::Span;

pub fn parse(source: &str) -> Ast<'_> {
    let tokens = tokenize(source);
    let mut cursor = TokenCursor::new(tokens);
    let root = Node::new(zon::DOCUMENT, Span::new(0, source.len() as u32));
    let mut ast = Ast::new(root, source, Language::Zon);
    let root_id = ast.root_id();
    if !cursor.check(Kind::Eof) {
        parse_value(&mut cursor, &mut ast, root_id);
    }
    ast
}

fn skip_comments(cursor: &mut TokenCursor<'_, Kind>, ast: &mut Ast<'_>, parent: ego_tree::NodeId) {
    loop {
        let rule = match cursor.peek_kind() {
            Kind::CommentLine => common::COMMENT_LINE,
            Kind::CommentDoc => common::COMMENT_DOC,
            _ => break,
        };
        let tok = cursor.advance();
        ast.append_child(parent, Node::new(rule, tok.span));
    }
}

fn number_payload(text: &str) -> Leaf {
    let body = text.strip_prefix('-').unwrap_or(text);
    if body.contains('.') || body.contains('e') || body.contains('E') {
        text.parse::<f64>().map(Leaf::Float).unwrap_or_else(|_| Leaf::Text(text.to_string()))
    } else if let Ok(v) = text.parse::<i64>() {
        Leaf::Int(v)
    } else {
        Leaf::Text(text.to_string())
    }
}

fn parse_value(cursor: &mut TokenCursor<'_, Kind>, ast: &mut Ast<'_>, parent: ego_tree::NodeId) -> ego_tree::NodeId {
    match cursor.peek_kind() {
        Kind::LBrace => parse_struct_literal(cursor, ast, parent),
        Kind::Dot => parse_enum_literal(cursor, ast, parent),
        Kind::String => {
            let tok = cursor.advance();
            let payload = match tok.payload {
                Payload::Text(s) => Leaf::Text(s.to_string()),
                _ => Leaf::None,
            };
            ast.append_child(parent, Node::new(zon::STRING, tok.span).with_payload(payload))
        }
        Kind::CharLiteral => {
            let tok = cursor.advance();
            let payload = match tok.payload {
                Payload::Text(s) => Leaf::Text(s.to_string()),
                _ => Leaf::None,
            };
            ast.append_child(parent, Node::new(zon::CHAR_LITERAL, tok.span).with_payload(payload))
        }
        Kind::NumberDec | Kind::NumberHex | Kind::NumberBin | Kind::NumberOct | Kind::NumberFloat => {
            let tok = cursor.advance();
            let rule = match tok.kind {
                Kind::NumberDec => zon::NUMBER_DEC,
                Kind::NumberHex => zon::NUMBER_HEX,
                Kind::NumberBin => zon::NUMBER_BIN,
                Kind::NumberOct => zon::NUMBER_OCT,
                _ => zon::NUMBER_FLOAT,
            };
            let payload = match tok.payload {
                Payload::Text(s) => number_payload(s),
                _ => Leaf::None,
            };
            ast.append_child(parent, Node::new(rule, tok.span).with_payload(payload))
        }
        Kind::BuiltinIdent => {
            let tok = cursor.advance();
            let payload = match tok.payload {
                Payload::Text(s) => Leaf::Text(s.to_string()),
                _ => Leaf::None,
            };
            ast.append_child(parent, Node::new(zon::BUILTIN_IDENT, tok.span).with_payload(payload))
        }
        Kind::Identifier => {
            let tok = cursor.advance();
            let payload = match tok.payload {
                Payload::Text(s) => Leaf::Text(s.to_string()),
                _ => Leaf::None,
            };
            ast.append_child(parent, Node::new(zon::IDENTIFIER, tok.span).with_payload(payload))
        }
        Kind::Null => {
            let tok = cursor.advance();
            ast.append_child(parent, Node::new(zon::NULL, tok.span))
        }
        Kind::Undefined => {
            let tok = cursor.advance();
            ast.append_child(parent, Node::new(zon::UNDEFINED, tok.span))
        }
        Kind::True => {
            let tok = cursor.advance();
            ast.append_child(parent, Node::new(zon::BOOL, tok.span).with_payload(Leaf::Bool(true)))
        }
        Kind::False => {
            let tok = cursor.advance();
            ast.append_child(parent, Node::new(zon::BOOL, tok.span).with_payload(Leaf::Bool(false)))
        }
        Kind::Eof => ast.append_child(parent, Node::error(common::ERROR_NODE, cursor.peek().span)),
        _ => {
            let tok = cursor.advance();
            ast.append_child(parent, Node::error(common::ERROR_NODE, tok.span))
        }
    }
}

/// A bare `.name` with no trailing `=`/`:`, used wherever a value is
/// expected (array elements, nested values) — not the field-assignment
/// form, which only [`parse_struct_literal`] produces.
fn parse_enum_literal(cursor: &mut TokenCursor<'_, Kind>, ast: &mut Ast<'_>, parent: ego_tree::NodeId) -> ego_tree::NodeId {
    let dot = cursor.advance();
    if let Some(name_tok) = cursor.eat(Kind::Identifier) {
        let payload = match name_tok.payload {
            Payload::Text(s) => Leaf::Text(s.to_string()),
            _ => Leaf::None,
        };
        ast.append_child(parent, Node::new(zon::ENUM_LITERAL, dot.span.union(name_tok.span)).with_payload(payload))
    } else {
        ast.append_child(parent, Node::error(common::ERROR_NODE, dot.span))
    }
}

fn parse_struct_literal(cursor: &mut TokenCursor<'_, Kind>, ast: &mut Ast<'_>, parent: ego_tree::NodeId) -> ego_tree::NodeId {
    let open = cursor.advance();
    let struct_id = ast.append_child(parent, Node::new(zon::STRUCT_LITERAL, open.span));
    loop {
        skip_comments(cursor, ast, struct_id);
        if cursor.check(Kind::RBrace) || cursor.is_at_end() {
            break;
        }
        if cursor.check(Kind::Dot) {
            parse_dot_entry(cursor, ast, struct_id);
        } else {
            parse_value(cursor, ast, struct_id);
        }
        skip_comments(cursor, ast, struct_id);
        if cursor.eat(Kind::Comma).is_none() {
            break;
        }
    }
    let close_span = if cursor.check(Kind::RBrace) { cursor.advance().span } else { cursor.peek().span };
    ast.update_span(struct_id, open.span.union(close_span));
    struct_id
}

/// Disambiguates `.field = value` / `.field: value` from a bare `.name`
/// enum-literal entry, both of which start with a `Dot` token inside a
/// struct-literal body.
fn parse_dot_entry(cursor: &mut TokenCursor<'_, Kind>, ast: &mut Ast<'_>, parent: ego_tree::NodeId) {
    let dot = cursor.advance();
    let Some(name_tok) = cursor.eat(Kind::Identifier) else {
        ast.append_child(parent, Node::error(common::ERROR_NODE, dot.span));
        return;
    };
    if cursor.check(Kind::Equals) || cursor.check(Kind::Colon) {
        cursor.advance();
        let field_id = ast.append_child(parent, Node::new(zon::FIELD_ASSIGNMENT, dot.span));
        let name_payload = match name_tok.payload {
            Payload::Text(s) => Leaf::Text(s.to_string()),
            _ => Leaf::None,
        };
        ast.append_child(field_id, Node::new(zon::FIELD_NAME, name_tok.span).with_payload(name_payload));
        let value_id = parse_value(cursor, ast, field_id);
        let value_span = ast.get(value_id).expect("just appended").value().span;
        ast.update_span(field_id, dot.span.union(value_span));
    } else {
        let payload = match name_tok.payload {
            Payload::Text(s) => Leaf::Text(s.to_string()),
            _ => Leaf::None,
        };
        ast.append_child(parent, Node::new(zon::ENUM_LITERAL, dot.span.union(name_tok.span)).with_payload(payload));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s3_struct_literal_with_nested_struct_and_enum_literal() {
        let ast = parse(r#".{ .name="x", .version="1.0", .kind=.release, .dependencies=.{} }"#);
        assert!(ast.check_span_coverage());
        assert!(ast.check_rule_id_invariance());
        let root = ast.root().first_child().unwrap();
        assert_eq!(root.value().rule_id, zon::STRUCT_LITERAL);
        assert_eq!(root.children().count(), 4);
    }

    #[test]
    fn positional_array_style_struct_literal() {
        let ast = parse(".{1, 2, 3}");
        let root = ast.root().first_child().unwrap();
        assert_eq!(root.children().count(), 3);
        for child in root.children() {
            assert_eq!(child.value().rule_id, zon::NUMBER_DEC);
        }
    }

    #[test]
    fn bare_enum_literal_as_array_element() {
        let ast = parse(".{.ok, .err}");
        let root = ast.root().first_child().unwrap();
        assert_eq!(root.children().count(), 2);
        for child in root.children() {
            assert_eq!(child.value().rule_id, zon::ENUM_LITERAL);
        }
    }

    #[test]
    fn malformed_field_recovers_with_error_node() {
        let ast = parse(".{ .x = }");
        let root = ast.root().first_child().unwrap();
        let field = root.first_child().unwrap();
        let value = field.children().nth(1).unwrap();
        assert_eq!(value.value().rule_id, common::ERROR_NODE);
    }
}
