//! Svelte printer (spec.md §4.8): each section is formatted by its own
//! language's printer; the `<script>`/`<style>` wrapper tags (and
//! whatever attributes they carry, e.g. `lang="ts"`) are kept verbatim
//! around the formatted body since [`crate::parser::svelte`] only hands
//! the inner slice to the sub-parser, not the wrapper itself.

use crate::ast::Ast;
use crate::format::FormatOptions;
use crate::parser::svelte::SvelteDocument;
use crate::registry::svelte;
use crate::span::Span;

pub fn format_svelte(doc: &SvelteDocument<'_>, options: &FormatOptions) -> Vec<u8> {
    let children: Vec<_> = doc.ast.root().children().collect();
    let last = children.len().checked_sub(1);
    let mut out = String::new();
    for (i, child) in children.iter().enumerate() {
        let span = child.value().span;
        let rendered = match child.value().rule_id {
            svelte::SCRIPT_SECTION => render_section(doc.ast.source, span, doc.script.as_ref(), options),
            svelte::STYLE_SECTION => render_section(doc.ast.source, span, doc.style.as_ref(), options),
            svelte::TEMPLATE_SECTION => render_section(doc.ast.source, span, doc.template.as_ref(), options),
            _ => span.slice(doc.ast.source).to_string(),
        };
        out.push_str(&rendered);
        if Some(i) != last {
            out.push('\n');
        }
    }
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out.into_bytes()
}

/// Formats `sub_ast`'s body and splices it back between the wrapper
/// text surrounding it in `source[span]`. The wrapper boundary is found
/// by locating the (byte-identical) body slice inside the section's
/// full text, since [`crate::parser::svelte::parse`] doesn't retain the
/// body's offsets separately from the section span.
fn render_section(source: &str, span: Span, sub_ast: Option<&Ast<'_>>, options: &FormatOptions) -> String {
    let full = span.slice(source);
    let Some(ast) = sub_ast else {
        return full.to_string();
    };
    let body = ast.source;
    match full.find(body) {
        Some(idx) => {
            let prefix = &full[..idx];
            let suffix = &full[idx + body.len()..];
            let formatted = crate::format::format(ast, options);
            let formatted = String::from_utf8_lossy(&formatted);
            format!("{prefix}{}{suffix}", formatted.trim_end_matches('\n'))
        }
        None => full.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_and_style_wrappers_are_preserved_around_formatted_bodies() {
        let doc = crate::parser::svelte::parse(r#"<script lang="ts">let   x=1;</script><style>a{color:red}</style><p>hi</p>"#);
        let out = String::from_utf8(format_svelte(&doc, &FormatOptions::default())).unwrap();
        assert!(out.starts_with(r#"<script lang="ts">"#));
        assert!(out.contains("</script>"));
        assert!(out.contains("a {\n  color: red;\n}"));
    }

    #[test]
    fn template_only_document_formats_as_html() {
        let doc = crate::parser::svelte::parse("<div><p>x</p></div>");
        let out = String::from_utf8(format_svelte(&doc, &FormatOptions::default())).unwrap();
        assert_eq!(out, "<div>\n  <p>x</p>\n</div>\n");
    }
}
