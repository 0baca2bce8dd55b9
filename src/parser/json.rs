//! Recursive-descent parser for JSON/JSON5 (spec.md §4.5).

use crate::ast::{Ast, Leaf, Node};
use crate::lexer::core::Payload;
use crate::lexer::json::{tokenize, Dialect, Kind};
use crate::parser::TokenCursor;
use crate::registry::{common, json, Language};
use crate::span::Span;

pub fn parse(source: &str, dialect: Dialect) -> Ast<'_> {
    let tokens = tokenize(source, dialect);
    let mut cursor = TokenCursor::new(tokens);
    let root = Node::new(json::DOCUMENT, Span::new(0, source.len() as u32));
    let mut ast = Ast::new(root, source, Language::Json);
    let root_id = ast.root_id();
    if !cursor.check(Kind::Eof) {
        parse_value(&mut cursor, &mut ast, root_id);
    }
    ast
}

fn parse_value(cursor: &mut TokenCursor<'_, Kind>, ast: &mut Ast<'_>, parent: ego_tree::NodeId) -> ego_tree::NodeId {
    match cursor.peek_kind() {
        Kind::LBrace => parse_object(cursor, ast, parent),
        Kind::LBracket => parse_array(cursor, ast, parent),
        Kind::String => {
            let tok = cursor.advance();
            let payload = match tok.payload {
                Payload::Text(s) => Leaf::Text(s.to_string()),
                _ => Leaf::None,
            };
            ast.append_child(parent, Node::new(json::STRING, tok.span).with_payload(payload))
        }
        Kind::Number => {
            let tok = cursor.advance();
            let payload = match tok.payload {
                Payload::Float(v) => Leaf::Float(v),
                _ => Leaf::None,
            };
            ast.append_child(parent, Node::new(json::NUMBER, tok.span).with_payload(payload))
        }
        Kind::True => {
            let tok = cursor.advance();
            ast.append_child(parent, Node::new(json::BOOL, tok.span).with_payload(Leaf::Bool(true)))
        }
        Kind::False => {
            let tok = cursor.advance();
            ast.append_child(parent, Node::new(json::BOOL, tok.span).with_payload(Leaf::Bool(false)))
        }
        Kind::Null => {
            let tok = cursor.advance();
            ast.append_child(parent, Node::new(json::NULL, tok.span))
        }
        Kind::Eof => ast.append_child(parent, Node::error(common::ERROR_NODE, cursor.peek().span)),
        _ => {
            let tok = cursor.advance();
            ast.append_child(parent, Node::error(common::ERROR_NODE, tok.span))
        }
    }
}

fn parse_object(cursor: &mut TokenCursor<'_, Kind>, ast: &mut Ast<'_>, parent: ego_tree::NodeId) -> ego_tree::NodeId {
    let open = cursor.advance();
    let obj_id = ast.append_child(parent, Node::new(json::OBJECT, open.span));
    loop {
        skip_comments(cursor, ast, obj_id);
        if cursor.check(Kind::RBrace) || cursor.is_at_end() {
            break;
        }
        if matches!(cursor.peek_kind(), Kind::String | Kind::Identifier) {
            parse_field(cursor, ast, obj_id);
        } else {
            let bad = cursor.advance();
            ast.append_child(obj_id, Node::error(common::ERROR_NODE, bad.span));
        }
        skip_comments(cursor, ast, obj_id);
        if cursor.eat(Kind::Comma).is_none() {
            break;
        }
    }
    let close_span = if cursor.check(Kind::RBrace) { cursor.advance().span } else { cursor.peek().span };
    ast.update_span(obj_id, open.span.union(close_span));
    obj_id
}

/// Consumes leading comment tokens, attaching each as a sibling
/// `comment` node (spec.md S2: JSON5 input with one `/* */` comment
/// parses to an AST with exactly one comment node).
fn skip_comments(cursor: &mut TokenCursor<'_, Kind>, ast: &mut Ast<'_>, parent: ego_tree::NodeId) {
    loop {
        let rule = match cursor.peek_kind() {
            Kind::CommentLine => json::COMMENT_LINE,
            Kind::CommentBlock => json::COMMENT_BLOCK,
            _ => break,
        };
        let tok = cursor.advance();
        ast.append_child(parent, Node::new(rule, tok.span));
    }
}

fn parse_field(cursor: &mut TokenCursor<'_, Kind>, ast: &mut Ast<'_>, parent: ego_tree::NodeId) -> ego_tree::NodeId {
    let key_tok = cursor.advance();
    let key_payload = match key_tok.payload {
        Payload::Text(s) => Leaf::Text(s.to_string()),
        _ => Leaf::None,
    };
    let field_id = ast.append_child(parent, Node::new(json::FIELD, key_tok.span));
    ast.append_child(field_id, Node::new(json::KEY, key_tok.span).with_payload(key_payload));
    cursor.eat(Kind::Colon);
    let value_id = parse_value(cursor, ast, field_id);
    let value_span = ast.get(value_id).expect("just appended").value().span;
    ast.update_span(field_id, key_tok.span.union(value_span));
    field_id
}

fn parse_array(cursor: &mut TokenCursor<'_, Kind>, ast: &mut Ast<'_>, parent: ego_tree::NodeId) -> ego_tree::NodeId {
    let open = cursor.advance();
    let arr_id = ast.append_child(parent, Node::new(json::ARRAY, open.span));
    loop {
        if cursor.check(Kind::RBracket) || cursor.is_at_end() {
            break;
        }
        parse_value(cursor, ast, arr_id);
        if cursor.eat(Kind::Comma).is_none() {
            break;
        }
    }
    let close_span = if cursor.check(Kind::RBracket) { cursor.advance().span } else { cursor.peek().span };
    ast.update_span(arr_id, open.span.union(close_span));
    arr_id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexes_s1_object_shape() {
        let ast = parse(r#"{"a":1,"b":[2,3]}"#, Dialect::Strict);
        assert!(ast.check_span_coverage());
        assert!(ast.check_rule_id_invariance());
        let obj = ast.root().first_child().unwrap();
        assert_eq!(obj.value().rule_id, json::OBJECT);
        assert_eq!(obj.children().count(), 2);
    }

    #[test]
    fn s2_json5_two_fields_and_comment_token_survives_lexing() {
        let ast = parse("{a:1,/*c*/b:2,}", Dialect::Json5);
        assert!(ast.check_span_coverage());
        let obj = ast.root().first_child().unwrap();
        // The comment is its own sibling node alongside the two fields,
        // so the object has three children total, one of them a comment.
        assert_eq!(obj.children().count(), 3);
        let comments = obj.children().filter(|c| c.value().rule_id == json::COMMENT_BLOCK).count();
        assert_eq!(comments, 1);
        let fields: Vec<_> = obj.children().filter(|c| c.value().rule_id == json::FIELD).collect();
        assert_eq!(fields.len(), 2);
        let keys: Vec<_> = fields
            .iter()
            .map(|field| match &field.first_child().unwrap().value().payload {
                Leaf::Text(s) => s.clone(),
                _ => String::new(),
            })
            .collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn malformed_object_recovers_with_error_node() {
        let ast = parse(r#"{"a": }"#, Dialect::Strict);
        let obj = ast.root().first_child().unwrap();
        let field = obj.first_child().unwrap();
        let value = field.children().nth(1).unwrap();
        assert_eq!(value.value().rule_id, common::ERROR_NODE);
        assert!(value.value().is_error);
    }
}
