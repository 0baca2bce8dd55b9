//! Svelte parser (spec.md §4.5): decomposes a `.svelte` file into
//! `<script>`, `<style>`, and template regions via
//! [`crate::lexer::svelte`], then hands each region's own source slice
//! to the corresponding sub-parser. The top-level [`Ast`] only ever
//! carries `svelte.*` rule IDs (so property 3, rule-ID/language
//! invariance, holds for it); each section's actual content lives in
//! its own same-language [`Ast`], reachable through [`SvelteDocument`].

use crate::ast::{Ast, Node};
use crate::lexer::svelte::{tokenize, Kind, Section};
use crate::registry::{svelte, Language};
use crate::span::Span;

/// A fully parsed Svelte file: the section-boundary tree plus one
/// sub-[`Ast`] per region that was present.
pub struct SvelteDocument<'src> {
    pub ast: Ast<'src>,
    pub script: Option<Ast<'src>>,
    pub style: Option<Ast<'src>>,
    pub template: Option<Ast<'src>>,
}

pub fn parse(source: &str) -> SvelteDocument<'_> {
    let sections = tokenize(source);
    let root = Node::new(svelte::DOCUMENT, Span::new(0, source.len() as u32));
    let mut ast = Ast::new(root, source, Language::Svelte);
    let root_id = ast.root_id();

    let mut script = None;
    let mut style = None;
    let mut template = None;

    for section in &sections {
        let rule = match section.kind {
            Kind::ScriptSection => svelte::SCRIPT_SECTION,
            Kind::StyleSection => svelte::STYLE_SECTION,
            Kind::TemplateSection => svelte::TEMPLATE_SECTION,
        };
        ast.append_child(root_id, Node::new(rule, section.span));
        attach_sub_ast(source, section, &mut script, &mut style, &mut template);
    }

    SvelteDocument { ast, script, style, template }
}

fn attach_sub_ast<'src>(
    source: &'src str,
    section: &Section<'_>,
    script: &mut Option<Ast<'src>>,
    style: &mut Option<Ast<'src>>,
    template: &mut Option<Ast<'src>>,
) {
    let body = section.body_span.slice(source);
    match section.kind {
        Kind::ScriptSection => *script = Some(crate::parser::typescript::parse(body)),
        Kind::StyleSection => *style = Some(crate::parser::css::parse(body)),
        Kind::TemplateSection => *template = Some(crate::parser::html::parse(body)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_into_three_sections_each_with_its_own_ast() {
        let src = "<script>let x: number = 1;</script><style>a{color:red}</style><p>hi</p>";
        let doc = parse(src);
        assert!(doc.ast.check_span_coverage());
        assert!(doc.ast.check_rule_id_invariance());
        assert_eq!(doc.ast.root().children().count(), 3);

        let script = doc.script.expect("script section parsed");
        assert!(script.check_rule_id_invariance());
        assert_eq!(script.language, Language::TypeScript);

        let style = doc.style.expect("style section parsed");
        assert!(style.check_rule_id_invariance());
        let ruleset = style.root().first_child().unwrap();
        assert_eq!(ruleset.value().rule_id, crate::registry::css::RULESET);

        let template = doc.template.expect("template section parsed");
        assert!(template.check_rule_id_invariance());
    }

    #[test]
    fn template_only_document_has_no_script_or_style() {
        let doc = parse("<div>hello</div>");
        assert!(doc.script.is_none());
        assert!(doc.style.is_none());
        assert!(doc.template.is_some());
        assert_eq!(doc.ast.root().children().count(), 1);
    }
}
