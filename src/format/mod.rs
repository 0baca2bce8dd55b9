//! Formatter (C11): renders an [`Ast`] back to source text under a
//! configured style. `format(ast, options) -> bytes` is a pure function
//! of its inputs — the same AST with the same options always produces
//! the same bytes, which is what makes idempotence (`format(format(x))
//! == format(x)`) a testable property rather than an aspiration.
//!
//! Implementation model: each per-language printer walks the AST and
//! writes through a shared [`LineBuilder`] — an indentation stack, a
//! running column counter, and a configured line-width budget — rather
//! than string-concatenating ad hoc.

mod css;
mod html;
mod json_zon;
mod script;
mod svelte;

pub use svelte::format_svelte;

use crate::ast::Ast;
use crate::registry::Language;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormatOptions {
    pub line_width: usize,
    pub indent_width: usize,
    pub sort_keys: bool,
    pub trailing_comma: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        FormatOptions {
            line_width: 80,
            indent_width: 2,
            sort_keys: false,
            trailing_comma: false,
        }
    }
}

/// Renders `ast` under `options`. Dispatches on [`Ast::language`]; a
/// Svelte document isn't representable as a single [`Ast`] (its
/// sections are separate per-language trees), so it goes through
/// [`format_svelte`] instead of this entry point.
pub fn format(ast: &Ast<'_>, options: &FormatOptions) -> Vec<u8> {
    match ast.language {
        Language::Json | Language::Zon => json_zon::format(ast, options),
        Language::Css => css::format(ast, options),
        Language::Html => html::format(ast, options),
        Language::TypeScript | Language::Zig => script::format(ast, options),
        Language::Svelte | Language::Common => ast.source.as_bytes().to_vec(),
    }
}

/// Accumulates formatted output line by line: an indent stack (depth *
/// `indent_width` spaces), a column counter reset at each newline, and
/// a configured width budget a printer can consult before deciding to
/// inline versus break a container onto multiple lines.
pub struct LineBuilder {
    buf: String,
    depth: usize,
    indent_width: usize,
    column: usize,
    pub line_width: usize,
}

impl LineBuilder {
    pub fn new(options: &FormatOptions) -> Self {
        LineBuilder {
            buf: String::new(),
            depth: 0,
            indent_width: options.indent_width,
            column: 0,
            line_width: options.line_width,
        }
    }

    pub fn indent(&mut self) {
        self.depth += 1;
    }

    pub fn dedent(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn column(&self) -> usize {
        self.column
    }

    /// Writes `s` at the current column without touching indentation or
    /// line breaks — the caller is responsible for starting a fresh
    /// line first via [`LineBuilder::newline`] when one is wanted.
    pub fn write(&mut self, s: &str) {
        self.buf.push_str(s);
        match s.rfind('\n') {
            Some(idx) => self.column = s.len() - idx - 1,
            None => self.column += s.len(),
        }
    }

    /// Ends the current line and writes the indentation for the next
    /// one, so the caller's next `write` lands at the right column.
    pub fn newline(&mut self) {
        self.buf.push('\n');
        let pad = self.depth * self.indent_width;
        for _ in 0..pad {
            self.buf.push(' ');
        }
        self.column = pad;
    }

    /// Drops a trailing newline-plus-indent pair produced by a
    /// `newline()` call that turned out not to be needed (e.g. before
    /// closing a container that ended up fitting on one line).
    pub fn trim_trailing_blank_line(&mut self) {
        while self.buf.ends_with(' ') {
            self.buf.pop();
        }
        if self.buf.ends_with('\n') {
            self.buf.pop();
        }
    }

    pub fn finish(self) -> String {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_builder_tracks_column_across_embedded_newlines() {
        let options = FormatOptions::default();
        let mut lb = LineBuilder::new(&options);
        lb.write("abc");
        assert_eq!(lb.column(), 3);
        lb.write("de\nfg");
        assert_eq!(lb.column(), 2);
    }

    #[test]
    fn newline_indents_by_depth_times_indent_width() {
        let options = FormatOptions { indent_width: 4, ..Default::default() };
        let mut lb = LineBuilder::new(&options);
        lb.indent();
        lb.indent();
        lb.newline();
        assert_eq!(lb.column(), 8);
        assert!(lb.finish().ends_with("        "));
    }
}
