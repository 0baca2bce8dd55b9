//! JSON/ZON printer (spec.md §4.8): containers break onto one value
//! per line once their inline rendering would exceed the configured
//! line width; otherwise everything stays on one line. `sort_keys`
//! reorders an object's fields by the key's decoded text; `trailing_comma`
//! only applies to containers that actually broke onto multiple lines.

use ego_tree::NodeRef;

use crate::ast::{Ast, Leaf, Node};
use crate::format::{FormatOptions, LineBuilder};
use crate::registry::Language;

pub fn format(ast: &Ast<'_>, options: &FormatOptions) -> Vec<u8> {
    let mut lb = LineBuilder::new(options);
    if let Some(value) = ast.root().children().next() {
        render(value, ast, &mut lb, options);
    }
    let mut out = lb.finish();
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out.into_bytes()
}

fn render(node: NodeRef<'_, Node>, ast: &Ast<'_>, lb: &mut LineBuilder, options: &FormatOptions) {
    match ast.language {
        Language::Json => render_json(node, ast, lb, options),
        _ => render_zon(node, ast, lb, options),
    }
}

fn render_json(node: NodeRef<'_, Node>, ast: &Ast<'_>, lb: &mut LineBuilder, options: &FormatOptions) {
    use crate::registry::json::*;
    match node.value().rule_id {
        OBJECT => render_container(node, ast, lb, options, "{", "}", true, render_json_field, inline_json),
        ARRAY => render_container(node, ast, lb, options, "[", "]", false, |n, a, lb, o| render_json(n, a, lb, o), inline_json),
        _ => lb.write(ast.text(node)),
    }
}

fn render_json_field(node: NodeRef<'_, Node>, ast: &Ast<'_>, lb: &mut LineBuilder, options: &FormatOptions) {
    let mut children = node.children();
    let key = children.next().expect("field always has a key child");
    let value = children.next().expect("field always has a value child");
    lb.write(ast.text(key));
    lb.write(": ");
    render_json(value, ast, lb, options);
}

/// Renders `node` as it would look inlined on one line, regardless of
/// width — used both to measure a container's inline candidate and, if
/// it fits, as the text actually emitted.
fn inline_json(node: NodeRef<'_, Node>, ast: &Ast<'_>) -> String {
    use crate::registry::json::*;
    match node.value().rule_id {
        OBJECT => inline_container(node, ast, "{", "}", |c, a| {
            let mut it = c.children();
            let key = it.next().unwrap();
            let value = it.next().unwrap();
            format!("{}: {}", a.text(key), inline_json(value, a))
        }),
        ARRAY => inline_container(node, ast, "[", "]", |c, a| inline_json(c, a)),
        _ => ast.text(node).to_string(),
    }
}

fn inline_container(
    node: NodeRef<'_, Node>,
    ast: &Ast<'_>,
    open: &str,
    close: &str,
    render_child: impl Fn(NodeRef<'_, Node>, &Ast<'_>) -> String,
) -> String {
    let parts: Vec<String> = node.children().map(|c| render_child(c, ast)).collect();
    if parts.is_empty() {
        format!("{open}{close}")
    } else {
        format!("{open} {} {close}", parts.join(", "))
    }
}

fn render_zon(node: NodeRef<'_, Node>, ast: &Ast<'_>, lb: &mut LineBuilder, options: &FormatOptions) {
    use crate::registry::zon::*;
    match node.value().rule_id {
        STRUCT_LITERAL => render_container(node, ast, lb, options, ".{", "}", false, render_zon_entry, inline_zon),
        _ => lb.write(ast.text(node)),
    }
}

fn render_zon_entry(node: NodeRef<'_, Node>, ast: &Ast<'_>, lb: &mut LineBuilder, options: &FormatOptions) {
    use crate::registry::zon::FIELD_ASSIGNMENT;
    if node.value().rule_id == FIELD_ASSIGNMENT {
        let mut children = node.children();
        let name = children.next().expect("field assignment always has a name child");
        let value = children.next().expect("field assignment always has a value child");
        lb.write(".");
        lb.write(ast.text(name));
        lb.write(" = ");
        render_zon(value, ast, lb, options);
    } else {
        render_zon(node, ast, lb, options);
    }
}

fn inline_zon(node: NodeRef<'_, Node>, ast: &Ast<'_>) -> String {
    use crate::registry::zon::{FIELD_ASSIGNMENT, STRUCT_LITERAL};
    match node.value().rule_id {
        STRUCT_LITERAL => inline_container(node, ast, ".{", "}", |c, a| inline_zon(c, a)),
        FIELD_ASSIGNMENT => {
            let mut it = node.children();
            let name = it.next().unwrap();
            let value = it.next().unwrap();
            format!(".{} = {}", ast.text(name), inline_zon(value, ast))
        }
        _ => ast.text(node).to_string(),
    }
}

#[allow(clippy::too_many_arguments)]
fn render_container(
    node: NodeRef<'_, Node>,
    ast: &Ast<'_>,
    lb: &mut LineBuilder,
    options: &FormatOptions,
    open: &str,
    close: &str,
    is_object_like: bool,
    render_child: impl Fn(NodeRef<'_, Node>, &Ast<'_>, &mut LineBuilder, &FormatOptions),
    inline_child: impl Fn(NodeRef<'_, Node>, &Ast<'_>) -> String,
) {
    let mut children: Vec<NodeRef<'_, Node>> = node.children().collect();
    if options.sort_keys && is_object_like {
        children.sort_by_key(|c| sort_key_of(*c));
    }

    if children.is_empty() {
        lb.write(open);
        lb.write(close);
        return;
    }

    let inline_parts: Vec<String> = children.iter().map(|c| inline_child(*c, ast)).collect();
    let inline_content = inline_parts.join(", ");
    let inline_total = lb.column() + open.len() + 2 + inline_content.len() + close.len();

    if inline_total <= lb.line_width {
        lb.write(open);
        lb.write(" ");
        lb.write(&inline_content);
        lb.write(" ");
        lb.write(close);
        return;
    }

    lb.write(open);
    lb.indent();
    let last = children.len() - 1;
    for (i, child) in children.iter().enumerate() {
        lb.newline();
        render_child(*child, ast, lb, options);
        if i != last || options.trailing_comma {
            lb.write(",");
        }
    }
    lb.dedent();
    lb.newline();
    lb.write(close);
}

/// Decoded key text used to order object fields under `sort_keys`: the
/// first child of a `json.field` node's key, or a `zon.field_assignment`'s
/// field name. Falls back to the node's own raw span text for anything
/// else (comments interleaved in a struct literal keep their position
/// relative to each other but sort to the front alongside "").
fn sort_key_of(node: NodeRef<'_, Node>) -> String {
    use crate::registry::{json, zon};
    match node.value().rule_id {
        json::FIELD => match node.first_child().map(|k| k.value().payload.clone()) {
            Some(Leaf::Text(s)) => s,
            _ => String::new(),
        },
        zon::FIELD_ASSIGNMENT => match node.first_child().map(|k| k.value().payload.clone()) {
            Some(Leaf::Text(s)) => s,
            _ => String::new(),
        },
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::json::Dialect;

    #[test]
    fn short_object_stays_inline() {
        let ast = crate::parser::json::parse(r#"{"a":1,"b":2}"#, Dialect::Strict);
        let out = String::from_utf8(format(&ast, &FormatOptions::default())).unwrap();
        assert_eq!(out.trim_end(), r#"{ "a": 1, "b": 2 }"#);
    }

    #[test]
    fn wide_object_breaks_onto_multiple_lines() {
        let src = r#"{"alpha":1,"bravo":2,"charlie":3,"delta":4,"echo":5,"foxtrot":6}"#;
        let ast = crate::parser::json::parse(src, Dialect::Strict);
        let options = FormatOptions { line_width: 30, ..Default::default() };
        let out = String::from_utf8(format(&ast, &options)).unwrap();
        assert!(out.lines().count() > 1);
        assert!(out.contains("\"alpha\": 1"));
    }

    #[test]
    fn sort_keys_reorders_fields_lexicographically() {
        let ast = crate::parser::json::parse(r#"{"b":2,"a":1}"#, Dialect::Strict);
        let options = FormatOptions { sort_keys: true, ..Default::default() };
        let out = String::from_utf8(format(&ast, &options)).unwrap();
        assert!(out.find("\"a\"").unwrap() < out.find("\"b\"").unwrap());
    }

    #[test]
    fn trailing_comma_only_applies_when_multiline() {
        let src = r#"{"alpha":1,"bravo":2,"charlie":3,"delta":4,"echo":5,"foxtrot":6}"#;
        let ast = crate::parser::json::parse(src, Dialect::Strict);
        let options = FormatOptions { line_width: 30, trailing_comma: true, ..Default::default() };
        let out = String::from_utf8(format(&ast, &options)).unwrap();
        let last_field_line = out.lines().filter(|l| l.contains(':')).last().unwrap();
        assert!(last_field_line.trim_end().ends_with(','));
    }

    #[test]
    fn zon_struct_literal_renders_dot_brace_and_equals() {
        let ast = crate::parser::zon::parse(r#".{ .name="x" }"#);
        let out = String::from_utf8(format(&ast, &FormatOptions::default())).unwrap();
        assert_eq!(out.trim_end(), r#".{ .name = "x" }"#);
    }
}
