//! HTML printer (spec.md §4.8): indents nested elements, keeps
//! attributes on one line when they fit, and leaves the contents of
//! `<pre>`/`<code>`/`<script>`/`<style>` untouched (raw text the
//! parser already stores as an opaque `TEXT` child).

use ego_tree::NodeRef;

use crate::ast::{Ast, Node};
use crate::format::{FormatOptions, LineBuilder};
use crate::registry::html::*;

const PRESERVE_WHITESPACE: &[&str] = &["pre", "code", "script", "style"];

pub fn format(ast: &Ast<'_>, options: &FormatOptions) -> Vec<u8> {
    let mut lb = LineBuilder::new(options);
    let children: Vec<_> = ast.root().children().collect();
    let last = children.len().checked_sub(1);
    for (i, child) in children.iter().enumerate() {
        render_node(*child, ast, &mut lb, options);
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

fn render_node(node: NodeRef<'_, Node>, ast: &Ast<'_>, lb: &mut LineBuilder, options: &FormatOptions) {
    match node.value().rule_id {
        ELEMENT => render_element(node, ast, lb, options),
        rule if rule == TEXT || rule == COMMENT || rule == DOCTYPE => {
            lb.write(ast.text(node).trim());
        }
        _ => lb.write(ast.text(node)),
    }
}

fn render_element(node: NodeRef<'_, Node>, ast: &Ast<'_>, lb: &mut LineBuilder, options: &FormatOptions) {
    let name = element_name(ast, node);
    let attrs: Vec<_> = node.children().filter(|c| c.value().rule_id == ATTRIBUTE).collect();
    let body: Vec<_> = node.children().filter(|c| c.value().rule_id != ATTRIBUTE).collect();

    lb.write("<");
    lb.write(name);
    render_attributes(&attrs, ast, lb, options);

    if body.is_empty() && crate::lexer::html::is_void_element(name) {
        lb.write(">");
        return;
    }
    lb.write(">");

    if PRESERVE_WHITESPACE.iter().any(|p| p.eq_ignore_ascii_case(name)) {
        for child in &body {
            lb.write(ast.text(*child));
        }
        lb.write("</");
        lb.write(name);
        lb.write(">");
        return;
    }

    if body.is_empty() {
        lb.write("</");
        lb.write(name);
        lb.write(">");
        return;
    }

    lb.indent();
    for child in &body {
        lb.newline();
        render_node(*child, ast, lb, options);
    }
    lb.dedent();
    lb.newline();
    lb.write("</");
    lb.write(name);
    lb.write(">");
}

fn render_attributes(attrs: &[NodeRef<'_, Node>], ast: &Ast<'_>, lb: &mut LineBuilder, options: &FormatOptions) {
    if attrs.is_empty() {
        return;
    }
    let rendered: Vec<String> = attrs.iter().map(|a| render_attribute(*a, ast)).collect();
    let combined_len: usize = rendered.iter().map(|a| a.len() + 1).sum();
    if lb.column() + combined_len <= options.line_width {
        for a in &rendered {
            lb.write(" ");
            lb.write(a);
        }
        return;
    }
    lb.indent();
    for a in &rendered {
        lb.newline();
        lb.write(a);
    }
    lb.dedent();
    lb.newline();
}

fn render_attribute(node: NodeRef<'_, Node>, ast: &Ast<'_>) -> String {
    let mut children = node.children();
    let name = children.next().map(|n| ast.text(n)).unwrap_or("");
    match children.next() {
        Some(value) => format!("{}={}", name, ast.text(value)),
        None => name.to_string(),
    }
}

/// The tag name carried in `node`'s span but not in a payload: the
/// `ELEMENT` node's span always starts at `<` (spec.md §4.2's start-span
/// invariant under `update_span`'s union), so the name runs from there
/// to the first non-name byte.
fn element_name<'src>(ast: &Ast<'src>, node: NodeRef<'_, Node>) -> &'src str {
    let start = node.value().span.start as usize;
    let bytes = ast.source.as_bytes();
    let name_start = start + 1; // skip '<'
    let mut end = name_start;
    while end < bytes.len() && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'-' || bytes[end] == b':') {
        end += 1;
    }
    &ast.source[name_start..end]
}
