//! Svelte streaming lexer (spec.md §4.5): decomposes a `.svelte` file
//! into `<script>`, `<style>` and template regions, then hands each
//! region's source slice to the corresponding sub-lexer (`typescript`,
//! `css`, `html`). This module owns only the top-level section split —
//! it does not re-implement any of those three grammars.

use crate::lexer::core::{Cursor, LexState, Payload, Token};
use crate::lexer::{css, html, typescript};
use crate::registry::{common, svelte};
use crate::span::{RuleId, Span};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    ScriptSection,
    StyleSection,
    TemplateSection,
    Eof,
}

impl From<Kind> for RuleId {
    fn from(k: Kind) -> RuleId {
        match k {
            Kind::ScriptSection => svelte::SCRIPT_SECTION,
            Kind::StyleSection => svelte::STYLE_SECTION,
            Kind::TemplateSection => svelte::TEMPLATE_SECTION,
            Kind::Eof => common::EOF,
        }
    }
}

/// One top-level region plus the sub-tokens its nested lexer produced,
/// already offset into the file's absolute coordinate space.
pub struct Section<'a> {
    pub kind: Kind,
    /// Full extent, including the `<script>`/`<style>` wrapper tags
    /// for those two kinds; equal to `body_span` for a template region.
    pub span: Span,
    /// Extent of the region's own source text: the wrapper-free
    /// `<script>`/`<style>` body, or the whole region for a template
    /// section. What [`crate::parser::svelte`] slices to hand each
    /// section to its own sub-parser.
    pub body_span: Span,
    pub typescript_tokens: Vec<Token<'a, typescript::Kind>>,
    pub css_tokens: Vec<Token<'a, css::Kind>>,
    pub html_tokens: Vec<Token<'a, html::Kind>>,
}

/// Splits `source` into `<script>`/`<style>`/template regions and lexes
/// each with its sub-lexer. Single-shot (not chunk-resumable): Svelte
/// files are small enough in practice that the structural split is
/// always done over the whole document at once, per spec.md §9's
/// declarations-level-only scope for this language.
pub fn tokenize(source: &'_ str) -> Vec<Section<'_>> {
    let mut sections = Vec::new();
    let mut cursor = Cursor::new(source, 0);

    loop {
        if cursor.is_eof() {
            break;
        }
        let region_start = cursor.pos();
        match find_next_tag(source, cursor.pos()) {
            Some((tag_start, tag_name, body_start, body_end, tag_end)) => {
                if tag_start > region_start {
                    sections.push(template_section(source, region_start, tag_start));
                }
                match tag_name.as_str() {
                    "script" => {
                        let body = &source[body_start..body_end];
                        let tokens = typescript::tokenize(body)
                            .into_iter()
                            .map(|t| rebase_typescript(t, body_start as u32))
                            .collect();
                        sections.push(Section {
                            kind: Kind::ScriptSection,
                            span: Span::new(tag_start as u32, tag_end as u32),
                            body_span: Span::new(body_start as u32, body_end as u32),
                            typescript_tokens: tokens,
                            css_tokens: Vec::new(),
                            html_tokens: Vec::new(),
                        });
                    }
                    "style" => {
                        let body = &source[body_start..body_end];
                        let tokens = css::tokenize(body)
                            .into_iter()
                            .map(|t| rebase_css(t, body_start as u32))
                            .collect();
                        sections.push(Section {
                            kind: Kind::StyleSection,
                            span: Span::new(tag_start as u32, tag_end as u32),
                            body_span: Span::new(body_start as u32, body_end as u32),
                            typescript_tokens: Vec::new(),
                            css_tokens: tokens,
                            html_tokens: Vec::new(),
                        });
                    }
                    _ => unreachable!("find_next_tag only matches script/style"),
                }
                cursor = Cursor::new(source, 0);
                seek(&mut cursor, tag_end);
            }
            None => {
                if cursor.pos() < source.len() {
                    sections.push(template_section(source, cursor.pos(), source.len()));
                }
                break;
            }
        }
    }

    sections
}

fn template_section(source: &str, start: usize, end: usize) -> Section<'_> {
    let body = &source[start..end];
    let tokens = html::tokenize(body)
        .into_iter()
        .map(|t| rebase_html(t, start as u32))
        .collect();
    Section {
        kind: Kind::TemplateSection,
        span: Span::new(start as u32, end as u32),
        body_span: Span::new(start as u32, end as u32),
        typescript_tokens: Vec::new(),
        css_tokens: Vec::new(),
        html_tokens: tokens,
    }
}

fn rebase_typescript<'a>(t: Token<'a, typescript::Kind>, offset: u32) -> Token<'a, typescript::Kind> {
    Token {
        span: Span::new(t.span.start + offset, t.span.end + offset),
        ..t
    }
}

fn rebase_css<'a>(t: Token<'a, css::Kind>, offset: u32) -> Token<'a, css::Kind> {
    Token {
        span: Span::new(t.span.start + offset, t.span.end + offset),
        ..t
    }
}

fn rebase_html<'a>(t: Token<'a, html::Kind>, offset: u32) -> Token<'a, html::Kind> {
    Token {
        span: Span::new(t.span.start + offset, t.span.end + offset),
        ..t
    }
}

/// Finds the next `<script ...>`/`<style ...>` tag at or after `from`,
/// returning `(tag_start, name, body_start, body_end, tag_end)`.
fn find_next_tag(source: &str, from: usize) -> Option<(usize, String, usize, usize, usize)> {
    let lower = source.to_ascii_lowercase();
    let mut i = from;
    while let Some(rel) = lower[i..].find('<') {
        let tag_start = i + rel;
        for name in ["script", "style"] {
            let opener = format!("<{}", name);
            if lower[tag_start..].starts_with(&opener) {
                let gt = source[tag_start..].find('>')? + tag_start;
                let body_start = gt + 1;
                let closer = format!("</{}>", name);
                let rel_close = lower[body_start..].find(&closer)?;
                let body_end = body_start + rel_close;
                let tag_end = body_end + closer.len();
                return Some((tag_start, name.to_string(), body_start, body_end, tag_end));
            }
        }
        i = tag_start + 1;
    }
    None
}

fn seek(cursor: &mut Cursor<'_>, pos: usize) {
    while cursor.pos() < pos && !cursor.is_eof() {
        cursor.advance();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_script_style_and_template() {
        let src = "<script>let x = 1;</script><style>a{color:red}</style><p>hi</p>";
        let sections = tokenize(src);
        let kinds: Vec<_> = sections.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, vec![Kind::ScriptSection, Kind::StyleSection, Kind::TemplateSection]);
    }

    #[test]
    fn script_section_is_lexed_as_typescript() {
        let src = "<script>const x: number = 1;</script>";
        let sections = tokenize(src);
        assert!(!sections[0].typescript_tokens.is_empty());
        assert!(sections[0].typescript_tokens.iter().any(|t| t.kind == typescript::Kind::Keyword));
    }

    #[test]
    fn template_only_document_has_single_section() {
        let sections = tokenize("<div>hello</div>");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].kind, Kind::TemplateSection);
    }
}
