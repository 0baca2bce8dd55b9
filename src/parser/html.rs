//! Recursive-descent-flavored parser for HTML (spec.md §4.5): builds a
//! DOM-like tree from the flat tag/text/comment token stream. Regions
//! are matched by tag *name*, not a fixed bracket pair, so this keeps
//! an explicit open-element stack (mirroring [`crate::scanner::scan_html`]'s
//! approach at the fact layer) rather than pure recursion — an
//! implicit end tag needs to unwind several levels of the stack at
//! once, which a straight recursive call can't express without extra
//! bookkeeping.

use ego_tree::NodeId;

use crate::ast::{Ast, Leaf, Node};
use crate::lexer::core::Payload;
use crate::lexer::html::{is_void_element, tokenize, Kind};
use crate::parser::TokenCursor;
use crate::registry::{common, html, Language};
use crate::span::Span;

struct Frame {
    node_id: NodeId,
    name: String,
    start_span: Span,
}

pub fn parse(source: &str) -> Ast<'_> {
    let tokens = tokenize(source);
    let mut cursor = TokenCursor::new(tokens);
    let root = Node::new(html::DOCUMENT, Span::new(0, source.len() as u32));
    let mut ast = Ast::new(root, source, Language::Html);
    let root_id = ast.root_id();

    let mut stack: Vec<Frame> = Vec::new();
    let mut last_span = Span::new(0, 0);

    while !cursor.is_at_end() {
        let parent = stack.last().map(|f| f.node_id).unwrap_or(root_id);
        match cursor.peek_kind() {
            Kind::Text | Kind::RawText => {
                let tok = cursor.advance();
                last_span = tok.span;
                let payload = match tok.payload {
                    Payload::Text(s) => Leaf::Text(s.to_string()),
                    _ => Leaf::None,
                };
                ast.append_child(parent, Node::new(html::TEXT, tok.span).with_payload(payload));
            }
            Kind::Comment => {
                let tok = cursor.advance();
                last_span = tok.span;
                ast.append_child(parent, Node::new(html::COMMENT, tok.span));
            }
            Kind::Doctype => {
                let tok = cursor.advance();
                last_span = tok.span;
                ast.append_child(parent, Node::new(html::DOCTYPE, tok.span));
            }
            Kind::TagOpenStart => {
                parse_open_tag(&mut cursor, &mut ast, parent, &mut stack, &mut last_span);
            }
            Kind::TagCloseStart => {
                let tok = cursor.advance();
                last_span = tok.span;
                let name = match tok.payload {
                    Payload::Text(s) => s.to_string(),
                    _ => String::new(),
                };
                if let Some(pos) = stack.iter().rposition(|f| f.name.eq_ignore_ascii_case(&name)) {
                    while stack.len() > pos + 1 {
                        let frame = stack.pop().unwrap();
                        ast.update_span(frame.node_id, frame.start_span.union(tok.span));
                    }
                    let frame = stack.pop().unwrap();
                    ast.update_span(frame.node_id, frame.start_span.union(tok.span));
                } else {
                    ast.append_child(parent, Node::error(common::ERROR_NODE, tok.span));
                }
            }
            Kind::Eof => break,
            _ => {
                let tok = cursor.advance();
                last_span = tok.span;
                ast.append_child(parent, Node::error(common::ERROR_NODE, tok.span));
            }
        }
    }

    // Unclosed elements run on to the last token seen (spec.md §4.2's
    // healed-boundary policy, applied at the AST layer).
    while let Some(frame) = stack.pop() {
        ast.update_span(frame.node_id, frame.start_span.union(last_span));
    }
    ast
}

fn parse_open_tag(
    cursor: &mut TokenCursor<'_, Kind>,
    ast: &mut Ast<'_>,
    parent: NodeId,
    stack: &mut Vec<Frame>,
    last_span: &mut Span,
) {
    let name_tok = cursor.advance();
    *last_span = name_tok.span;
    let name = match name_tok.payload {
        Payload::Text(s) => s.to_string(),
        _ => String::new(),
    };
    let element_id = ast.append_child(parent, Node::new(html::ELEMENT, name_tok.span));

    while cursor.check(Kind::AttrName) {
        let attr_name_tok = cursor.advance();
        *last_span = attr_name_tok.span;
        let attr_id = ast.append_child(element_id, Node::new(html::ATTRIBUTE, attr_name_tok.span));
        let name_payload = match attr_name_tok.payload {
            Payload::Text(s) => Leaf::Text(s.to_string()),
            _ => Leaf::None,
        };
        ast.append_child(attr_id, Node::new(html::ATTR_NAME, attr_name_tok.span).with_payload(name_payload));
        let mut attr_span = attr_name_tok.span;
        if cursor.check(Kind::AttrValue) {
            let value_tok = cursor.advance();
            *last_span = value_tok.span;
            attr_span = attr_span.union(value_tok.span);
            let value_payload = match value_tok.payload {
                Payload::Text(s) => Leaf::Text(s.to_string()),
                _ => Leaf::None,
            };
            ast.append_child(attr_id, Node::new(html::ATTR_VALUE, value_tok.span).with_payload(value_payload));
        }
        ast.update_span(attr_id, attr_span);
    }

    if cursor.check(Kind::TagSelfClose) {
        let close_tok = cursor.advance();
        *last_span = close_tok.span;
        ast.update_span(element_id, name_tok.span.union(close_tok.span));
        return;
    }
    if cursor.check(Kind::TagEnd) {
        let close_tok = cursor.advance();
        *last_span = close_tok.span;
        let open_span = name_tok.span.union(close_tok.span);
        ast.update_span(element_id, open_span);
        if is_void_element(&name) {
            return;
        }
        stack.push(Frame {
            node_id: element_id,
            name,
            start_span: open_span,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn void_elements_nest_without_children() {
        let ast = parse("<div><br><p>x</p></div>");
        assert!(ast.check_span_coverage());
        assert!(ast.check_rule_id_invariance());
        let div = ast.root().first_child().unwrap();
        let children: Vec<_> = div.children().collect();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].children().count(), 0);
    }

    #[test]
    fn attributes_attach_name_and_value() {
        let ast = parse(r#"<a href="x">link</a>"#);
        let a = ast.root().first_child().unwrap();
        let attr = a.children().find(|c| c.value().rule_id == html::ATTRIBUTE).unwrap();
        assert_eq!(attr.children().count(), 2);
    }

    #[test]
    fn implicit_end_tag_heals_unbalanced_nesting() {
        let ast = parse("<div><span>a</div>");
        assert!(ast.check_span_coverage());
        let div = ast.root().first_child().unwrap();
        let elements: Vec<_> = div.children().filter(|c| c.value().rule_id == html::ELEMENT).collect();
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].children().filter(|c| c.value().rule_id == common::ERROR_NODE).count(), 0);
    }

    #[test]
    fn stray_close_tag_becomes_error_node() {
        let ast = parse("<p>x</div>");
        let p = ast.root().first_child().unwrap();
        assert!(p.children().any(|c| c.value().rule_id == common::ERROR_NODE));
    }
}
