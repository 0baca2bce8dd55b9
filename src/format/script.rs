//! TS/Zig printer (spec.md §4.8): minimal by design, since both parsers
//! only resolve declaration-level structure (spec.md §1 Non-goals — no
//! full expression grammar). Whitespace between recognized nodes is
//! collapsed to single spaces; anything already inside an opaque body
//! is copied byte-for-byte.

use ego_tree::NodeRef;

use crate::ast::{Ast, Node};
use crate::format::{FormatOptions, LineBuilder};
use crate::registry::{typescript, zig};
use crate::span::RuleId;

pub fn format(ast: &Ast<'_>, options: &FormatOptions) -> Vec<u8> {
    let mut lb = LineBuilder::new(options);
    let opaque_body = opaque_body_id(ast.language);
    let children: Vec<_> = ast.root().children().collect();
    let last = children.len().checked_sub(1);
    for (i, child) in children.iter().enumerate() {
        render_reflow(*child, ast, &mut lb, opaque_body);
        if Some(i) != last {
            lb.newline();
        }
    }
    let mut out = lb.finish();
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out.into_bytes()
}

fn opaque_body_id(language: crate::registry::Language) -> RuleId {
    match language {
        crate::registry::Language::Zig => zig::OPAQUE_BODY,
        _ => typescript::OPAQUE_BODY,
    }
}

/// Copies `node`'s span, verbatim for an opaque-body child and with
/// internal whitespace runs collapsed to a single space everywhere else.
fn render_reflow(node: NodeRef<'_, Node>, ast: &Ast<'_>, lb: &mut LineBuilder, opaque_body: RuleId) {
    let span = node.value().span;
    let mut pos = span.start;
    for child in node.children() {
        let child_span = child.value().span;
        write_reflowed(ast.source, pos, child_span.start, lb);
        if child.value().rule_id == opaque_body {
            lb.write(ast.text(child));
        } else {
            render_reflow(child, ast, lb, opaque_body);
        }
        pos = child_span.end;
    }
    write_reflowed(ast.source, pos, span.end, lb);
}

fn write_reflowed(source: &str, start: u32, end: u32, lb: &mut LineBuilder) {
    if end <= start {
        return;
    }
    let gap = &source[start as usize..end as usize];
    let mut out = String::with_capacity(gap.len());
    let mut last_was_ws = false;
    for c in gap.chars() {
        if c.is_whitespace() {
            if !last_was_ws {
                out.push(' ');
            }
            last_was_ws = true;
        } else {
            out.push(c);
            last_was_ws = false;
        }
    }
    lb.write(&out);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extra_whitespace_around_tokens_collapses() {
        let ast = crate::parser::typescript::parse("function   f(a:number):void   {  }");
        let out = String::from_utf8(format(&ast, &FormatOptions::default())).unwrap();
        assert_eq!(out.trim_end(), "function f(a:number):void { }");
    }

    #[test]
    fn opaque_body_contents_are_preserved_verbatim() {
        let ast = crate::parser::typescript::parse("function f() { let   x = 1; }");
        let out = String::from_utf8(format(&ast, &FormatOptions::default())).unwrap();
        assert!(out.contains("{ let   x = 1; }"));
    }

    #[test]
    fn zig_fn_decl_reflows_header_whitespace() {
        let ast = crate::parser::zig::parse("pub fn   add(a: i32, b: i32) i32 { return a + b; }");
        let out = String::from_utf8(format(&ast, &FormatOptions::default())).unwrap();
        assert!(out.starts_with("pub fn add(a: i32, b: i32) i32 {"));
    }

    #[test]
    fn export_keyword_is_preserved_ahead_of_declaration() {
        let ast = crate::parser::typescript::parse("export function f():void {}");
        let out = String::from_utf8(format(&ast, &FormatOptions::default())).unwrap();
        assert!(out.starts_with("export function f"));
    }
}
