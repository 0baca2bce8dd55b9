//! CSS printer (spec.md §4.8): one declaration per line, a blank line
//! between top-level rules, declaration values kept verbatim (the
//! parser already treats them as opaque spans — there is no CSS value
//! grammar to re-render from parts).

use ego_tree::NodeRef;

use crate::ast::{Ast, Node};
use crate::format::{FormatOptions, LineBuilder};
use crate::registry::css::*;
use crate::span::Span;

pub fn format(ast: &Ast<'_>, options: &FormatOptions) -> Vec<u8> {
    let mut lb = LineBuilder::new(options);
    let top_level: Vec<_> = ast.root().children().collect();
    let last = top_level.len().checked_sub(1);
    for (i, item) in top_level.iter().enumerate() {
        render_top_level(*item, ast, &mut lb, options);
        if Some(i) != last {
            lb.write("\n\n");
        }
    }
    let mut out = lb.finish();
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out.into_bytes()
}

fn render_top_level(node: NodeRef<'_, Node>, ast: &Ast<'_>, lb: &mut LineBuilder, options: &FormatOptions) {
    match node.value().rule_id {
        RULESET => render_ruleset(node, ast, lb, options),
        AT_RULE => render_at_rule(node, ast, lb, options),
        _ => lb.write(ast.text(node)),
    }
}

fn render_ruleset(node: NodeRef<'_, Node>, ast: &Ast<'_>, lb: &mut LineBuilder, options: &FormatOptions) {
    if let Some(list) = node.children().find(|c| c.value().rule_id == SELECTOR_LIST) {
        let selectors: Vec<&str> = list.children().filter(|c| c.value().rule_id == SELECTOR).map(|c| ast.text(c).trim()).collect();
        lb.write(&selectors.join(", "));
    }
    lb.write(" {");
    if let Some(block) = node.children().find(|c| c.value().rule_id == BLOCK) {
        render_block_body(block, ast, lb, options);
    }
    lb.newline();
    lb.trim_trailing_blank_line();
    lb.write("\n}");
}

fn render_at_rule(node: NodeRef<'_, Node>, ast: &Ast<'_>, lb: &mut LineBuilder, options: &FormatOptions) {
    let value = node.children().find(|c| c.value().rule_id == VALUE);
    let block = node.children().find(|c| c.value().rule_id == BLOCK);
    let keyword_end = value
        .map(|v| v.value().span.start)
        .or_else(|| block.map(|b| b.value().span.start))
        .unwrap_or(node.value().span.end);
    let keyword = Span::new(node.value().span.start, keyword_end).slice(ast.source).trim();
    lb.write(keyword);
    if let Some(v) = value {
        lb.write(" ");
        lb.write(ast.text(v).trim());
    }
    match block {
        Some(b) => {
            lb.write(" {");
            render_block_body(b, ast, lb, options);
            lb.newline();
            lb.trim_trailing_blank_line();
            lb.write("\n}");
        }
        None => lb.write(";"),
    }
}

fn render_block_body(block: NodeRef<'_, Node>, ast: &Ast<'_>, lb: &mut LineBuilder, options: &FormatOptions) {
    lb.indent();
    let entries: Vec<_> = block.children().collect();
    let decl_count = entries.iter().filter(|c| c.value().rule_id == DECLARATION).count();
    let pad_properties = (3..=4).contains(&decl_count);
    let max_property_len = if pad_properties {
        entries
            .iter()
            .filter(|c| c.value().rule_id == DECLARATION)
            .filter_map(|c| c.children().find(|p| p.value().rule_id == PROPERTY))
            .map(|p| ast.text(p).trim().len())
            .max()
            .unwrap_or(0)
    } else {
        0
    };
    for entry in &entries {
        lb.newline();
        match entry.value().rule_id {
            DECLARATION => render_declaration(*entry, ast, lb, pad_properties, max_property_len),
            RULESET => render_ruleset(*entry, ast, lb, options),
            AT_RULE => render_at_rule(*entry, ast, lb, options),
            _ => lb.write(ast.text(*entry)),
        }
    }
    lb.dedent();
}

fn render_declaration(node: NodeRef<'_, Node>, ast: &Ast<'_>, lb: &mut LineBuilder, pad: bool, max_property_len: usize) {
    let property = node.children().find(|c| c.value().rule_id == PROPERTY);
    let value = node.children().find(|c| c.value().rule_id == VALUE);
    let prop_text = property.map(|p| ast.text(p).trim()).unwrap_or("");
    lb.write(prop_text);
    if pad {
        for _ in 0..max_property_len.saturating_sub(prop_text.len()) {
            lb.write(" ");
        }
    }
    lb.write(": ");
    if let Some(v) = value {
        lb.write(ast.text(v).trim());
    }
    lb.write(";");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_declarations_render_one_per_line() {
        let ast = crate::parser::css::parse("a{color:red;padding:1rem}");
        let out = String::from_utf8(format(&ast, &FormatOptions::default())).unwrap();
        assert_eq!(out, "a {\n  color: red;\n  padding: 1rem;\n}\n");
    }

    #[test]
    fn blank_line_separates_top_level_rules() {
        let ast = crate::parser::css::parse("a{color:red}b{color:blue}");
        let out = String::from_utf8(format(&ast, &FormatOptions::default())).unwrap();
        assert!(out.contains("}\n\nb {"));
    }

    #[test]
    fn at_rule_without_block_ends_in_semicolon() {
        let ast = crate::parser::css::parse("@import \"x.css\";");
        let out = String::from_utf8(format(&ast, &FormatOptions::default())).unwrap();
        assert!(out.trim_end().ends_with(';'));
        assert!(out.starts_with("@import"));
    }

    #[test]
    fn three_or_four_siblings_get_aligned_property_padding() {
        let ast = crate::parser::css::parse("a{top:0;left:0;width:10px}");
        let out = String::from_utf8(format(&ast, &FormatOptions::default())).unwrap();
        let lines: Vec<_> = out.lines().filter(|l| l.contains(':')).collect();
        let colon_columns: Vec<_> = lines.iter().map(|l| l.find(':').unwrap()).collect();
        assert_eq!(colon_columns[0], colon_columns[1]);
    }

    #[test]
    fn at_rule_with_nested_block_renders_braces() {
        let ast = crate::parser::css::parse("@media screen { a { color: red; } }");
        let out = String::from_utf8(format(&ast, &FormatOptions::default())).unwrap();
        assert!(out.starts_with("@media screen {"));
        assert!(out.contains("a {"));
    }
}
