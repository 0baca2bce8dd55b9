//! Recursive-descent parser for CSS (spec.md §4.5): rulesets, at-rules,
//! and nesting, with declaration values kept opaque (Non-goal: no CSS
//! value-grammar parsing).
//!
//! A block's entries are ambiguous from the leading token alone — both a
//! declaration (`color: red;`) and a nested ruleset (`&:hover { ... }`)
//! start with an ident run. The call is made by bounded lookahead: an
//! entry is a nested ruleset iff a `{` appears before the next `;` or
//! `}`.

use crate::ast::{Ast, Leaf, Node};
use crate::lexer::core::Payload;
use crate::lexer::css::{tokenize, Kind};
use crate::parser::TokenCursor;
use crate::registry::{css, Language};
use crate::span::Span;

pub fn parse(source: &str) -> Ast<'_> {
    let tokens = tokenize(source);
    let mut cursor = TokenCursor::new(tokens);
    let root = Node::new(css::STYLESHEET, Span::new(0, source.len() as u32));
    let mut ast = Ast::new(root, source, Language::Css);
    let root_id = ast.root_id();
    skip_trivia(&mut cursor, &mut ast, root_id);
    while !cursor.is_at_end() {
        parse_top_level_item(&mut cursor, &mut ast, root_id);
        skip_trivia(&mut cursor, &mut ast, root_id);
    }
    ast
}

fn skip_trivia(cursor: &mut TokenCursor<'_, Kind>, ast: &mut Ast<'_>, parent: ego_tree::NodeId) {
    loop {
        match cursor.peek_kind() {
            Kind::Whitespace => {
                cursor.advance();
            }
            Kind::Comment => {
                let tok = cursor.advance();
                ast.append_child(parent, Node::new(css::COMMENT, tok.span));
            }
            _ => break,
        }
    }
}

/// True if, scanning forward from the cursor, a `{` is reached before
/// any of `;`, `}`, or end of input.
fn brace_precedes_terminator(cursor: &TokenCursor<'_, Kind>) -> bool {
    let mut i = 0;
    loop {
        match cursor.peek_nth_kind(i) {
            Kind::LBrace => return true,
            Kind::Semicolon | Kind::RBrace | Kind::Eof => return false,
            _ => i += 1,
        }
    }
}

fn parse_top_level_item(cursor: &mut TokenCursor<'_, Kind>, ast: &mut Ast<'_>, parent: ego_tree::NodeId) {
    if cursor.check(Kind::AtKeyword) {
        parse_at_rule(cursor, ast, parent);
    } else {
        parse_ruleset(cursor, ast, parent);
    }
}

fn parse_at_rule(cursor: &mut TokenCursor<'_, Kind>, ast: &mut Ast<'_>, parent: ego_tree::NodeId) {
    let at = cursor.advance();
    let at_id = ast.append_child(parent, Node::new(css::AT_RULE, at.span));
    let prelude_start = cursor.peek().span;
    let mut prelude_end = prelude_start;
    while !matches!(cursor.peek_kind(), Kind::LBrace | Kind::Semicolon | Kind::Eof) {
        prelude_end = cursor.advance().span;
    }
    if prelude_end.start >= prelude_start.start {
        ast.append_child(at_id, Node::new(css::VALUE, prelude_start.union(prelude_end)));
    }
    let end_span = if cursor.check(Kind::LBrace) {
        parse_block(cursor, ast, at_id)
    } else if cursor.check(Kind::Semicolon) {
        cursor.advance().span
    } else {
        cursor.peek().span
    };
    ast.update_span(at_id, at.span.union(end_span));
}

fn parse_ruleset(cursor: &mut TokenCursor<'_, Kind>, ast: &mut Ast<'_>, parent: ego_tree::NodeId) {
    let start = cursor.peek().span;
    let ruleset_id = ast.append_child(parent, Node::new(css::RULESET, start));
    let selector_list_id = ast.append_child(ruleset_id, Node::new(css::SELECTOR_LIST, start));
    parse_selector_list(cursor, ast, selector_list_id);
    let block_end = if cursor.check(Kind::LBrace) {
        parse_block(cursor, ast, ruleset_id)
    } else {
        cursor.peek().span
    };
    ast.update_span(ruleset_id, start.union(block_end));
}

fn parse_selector_list(cursor: &mut TokenCursor<'_, Kind>, ast: &mut Ast<'_>, parent: ego_tree::NodeId) {
    loop {
        let sel_start = cursor.peek().span;
        let mut sel_end = sel_start;
        while !matches!(cursor.peek_kind(), Kind::LBrace | Kind::Comma | Kind::Eof) {
            sel_end = cursor.advance().span;
        }
        ast.append_child(parent, Node::new(css::SELECTOR, sel_start.union(sel_end)));
        if cursor.eat(Kind::Comma).is_none() {
            break;
        }
        skip_trivia(cursor, ast, parent);
    }
}

/// Parses `{ ... }`, returning the span of the closing brace (or the
/// current token if the block is unterminated).
fn parse_block(cursor: &mut TokenCursor<'_, Kind>, ast: &mut Ast<'_>, parent: ego_tree::NodeId) -> Span {
    let open = cursor.advance();
    let block_id = ast.append_child(parent, Node::new(css::BLOCK, open.span));
    loop {
        skip_trivia(cursor, ast, block_id);
        if cursor.check(Kind::RBrace) || cursor.is_at_end() {
            break;
        }
        if cursor.check(Kind::AtKeyword) {
            parse_at_rule(cursor, ast, block_id);
        } else if brace_precedes_terminator(cursor) {
            parse_ruleset(cursor, ast, block_id);
        } else {
            parse_declaration(cursor, ast, block_id);
        }
        skip_trivia(cursor, ast, block_id);
    }
    let close_span = if cursor.check(Kind::RBrace) { cursor.advance().span } else { cursor.peek().span };
    ast.update_span(block_id, open.span.union(close_span));
    close_span
}

fn parse_declaration(cursor: &mut TokenCursor<'_, Kind>, ast: &mut Ast<'_>, parent: ego_tree::NodeId) {
    let prop_tok = cursor.advance();
    let decl_id = ast.append_child(parent, Node::new(css::DECLARATION, prop_tok.span));
    let payload = match prop_tok.payload {
        Payload::Text(s) => Leaf::Text(s.to_string()),
        _ => Leaf::None,
    };
    ast.append_child(decl_id, Node::new(css::PROPERTY, prop_tok.span).with_payload(payload));
    skip_trivia(cursor, ast, decl_id);
    cursor.eat(Kind::Colon);
    skip_trivia(cursor, ast, decl_id);
    let value_start = cursor.peek().span;
    let mut value_end = value_start;
    while !matches!(cursor.peek_kind(), Kind::Semicolon | Kind::RBrace | Kind::Eof) {
        value_end = cursor.advance().span;
    }
    if value_end.start >= value_start.start {
        ast.append_child(decl_id, Node::new(css::VALUE, value_start.union(value_end)));
    }
    let end_span = if cursor.check(Kind::Semicolon) { cursor.advance().span } else { value_end };
    ast.update_span(decl_id, prop_tok.span.union(end_span));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s4_ruleset_has_selector_list_and_two_declarations() {
        let ast = parse("a{color:red;padding:1rem}");
        assert!(ast.check_span_coverage());
        assert!(ast.check_rule_id_invariance());
        let ruleset = ast.root().first_child().unwrap();
        assert_eq!(ruleset.value().rule_id, css::RULESET);
        let block = ruleset.children().find(|c| c.value().rule_id == css::BLOCK).unwrap();
        let decls: Vec<_> = block.children().filter(|c| c.value().rule_id == css::DECLARATION).collect();
        assert_eq!(decls.len(), 2);
    }

    #[test]
    fn at_rule_with_block_nests_rulesets() {
        let ast = parse("@media screen { a { color: red; } }");
        let at_rule = ast.root().first_child().unwrap();
        assert_eq!(at_rule.value().rule_id, css::AT_RULE);
        let block = at_rule.children().find(|c| c.value().rule_id == css::BLOCK).unwrap();
        assert!(block.children().any(|c| c.value().rule_id == css::RULESET));
    }

    #[test]
    fn at_rule_without_block_terminates_on_semicolon() {
        let ast = parse("@import \"x.css\";");
        let at_rule = ast.root().first_child().unwrap();
        assert_eq!(at_rule.value().rule_id, css::AT_RULE);
        assert!(ast.check_span_coverage());
    }

    #[test]
    fn nested_ruleset_inside_block_is_distinguished_from_declaration() {
        let ast = parse("a { &:hover { color: blue; } color: red; }");
        let ruleset = ast.root().first_child().unwrap();
        let block = ruleset.children().find(|c| c.value().rule_id == css::BLOCK).unwrap();
        let nested = block.children().filter(|c| c.value().rule_id == css::RULESET).count();
        let decls = block.children().filter(|c| c.value().rule_id == css::DECLARATION).count();
        assert_eq!(nested, 1);
        assert_eq!(decls, 1);
    }
}
