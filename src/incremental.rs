//! Incremental coordinator (C13, spec.md §4.10): keeps one file's
//! source, boundary facts, and derived caches in sync as edits arrive,
//! without ever reparsing more than necessary — or, for the languages
//! where region-limited reparsing isn't modeled, making that fallback
//! explicit rather than silent.
//!
//! [`Ast`] borrows the source it was built from, so a coordinator that
//! tried to own both `source: String` and a cached `Ast<'_>` pointing
//! back into it would be self-referential — but [`Node`] itself carries
//! no lifetime, so `Tree<Node>` doesn't have that problem: this
//! coordinator owns the tree directly as `self.tree`, separately from
//! `self.source`, and [`IncrementalCoordinator::ast`] just wraps a
//! clone of it around the current source rather than reparsing.
//!
//! For JSON and ZON, [`IncrementalCoordinator::apply_edit`] keeps
//! `self.tree` current with a region-limited graft: [`Self::try_converge`]
//! finds the smallest previously-scanned boundary enclosing the edit,
//! reparses only that substring, and splices the result back in,
//! shifting the spans of everything after the edit by the edit's byte
//! delta. Every other node is copied over unchanged (or shifted), never
//! retokenized. CSS's grammar shape differs between a stylesheet's
//! top-level rules and a block's declarations, and TypeScript/Zig/HTML/
//! Svelte have no region-limited story at all (function bodies are
//! opaque, Svelte is multiple documents) — those languages fall back to
//! a full reparse every edit, same as before.

use ego_tree::{NodeId, NodeRef, Tree};

use crate::ast::{Ast, Node};
use crate::diagnostics::{Diagnostic, Edit, ZzError};
use crate::facts::FactStore;
use crate::format::{self, FormatOptions};
use crate::lexer::core::{LexMode, LexState};
use crate::lexer::json::Dialect;
use crate::lint::LintRuleId;
use crate::parser;
use crate::query::{Query, QueryCache};
use crate::registry::Language;
use crate::scanner::{self, BraceLanguage};
use crate::span::Span;

/// Width of a single resume window when hunting for a lexer-state
/// checkpoint ahead of an edit.
const CHECKPOINT_STRIDE: usize = 64;

/// How far past an edit's end the convergence check resumes lexing
/// before giving up and treating the file as fully dirty.
const CONVERGENCE_BUDGET: usize = 4096;

/// One file's live incremental state. `new` performs an initial full
/// scan; after that, [`IncrementalCoordinator::apply_edit`] is the only
/// way the source changes.
pub struct IncrementalCoordinator {
    language: Language,
    dialect: Dialect,
    source: String,
    tree: Tree<Node>,
    facts: FactStore,
    generation: u32,
    query_cache: QueryCache,
    format_cache: Option<(u32, FormatOptions, Vec<u8>)>,
    last_converged: bool,
}

impl IncrementalCoordinator {
    pub fn new(language: Language, source: String) -> Self {
        let tree = Self::full_parse(language, Dialect::Strict, &source).into_tree();
        let mut coordinator = IncrementalCoordinator {
            language,
            dialect: Dialect::Strict,
            source,
            tree,
            facts: FactStore::new(),
            generation: 0,
            query_cache: QueryCache::new(64),
            format_cache: None,
            last_converged: false,
        };
        coordinator.rescan_facts();
        coordinator
    }

    /// JSON only: selects JSON5 lexing for this coordinator's lifetime.
    /// Rebuilds the tree since [`Self::new`] already parsed once with
    /// the default dialect.
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self.tree = Self::full_parse(self.language, self.dialect, &self.source).into_tree();
        self
    }

    fn full_parse(language: Language, dialect: Dialect, source: &str) -> Ast<'_> {
        match language {
            Language::Json => parser::json::parse(source, dialect),
            Language::Zon => parser::zon::parse(source),
            Language::Css => parser::css::parse(source),
            Language::Html => parser::html::parse(source),
            Language::TypeScript => parser::typescript::parse(source),
            Language::Zig => parser::zig::parse(source),
            // Svelte's sections are independent per-language Asts under
            // a SvelteDocument, not a single Ast; callers that need
            // those should go through `parser::svelte::parse` directly.
            // `Common` never appears as a coordinator's own language.
            Language::Svelte | Language::Common => parser::json::parse(source, Dialect::Strict),
        }
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Wraps the current (kept-up-to-date) tree around the current
    /// source, tagged with this coordinator's generation. Does not
    /// reparse — [`Self::apply_edit`] is what keeps `self.tree` current,
    /// either by a region-limited graft or, when one isn't possible, a
    /// full reparse at edit time.
    pub fn ast(&self) -> Ast<'_> {
        Ast::from_tree(self.tree.clone(), &self.source, self.language, self.generation)
    }

    pub fn lint(&self, enabled: &std::collections::HashSet<LintRuleId>) -> Vec<Diagnostic> {
        crate::lint::lint(&self.ast(), enabled)
    }

    /// Runs `selector` against the current tree, reusing a cached match
    /// list when the generation and selector text are unchanged.
    pub fn query(&mut self, selector: &str) -> Vec<NodeId> {
        match Query::compile(selector) {
            Some(compiled) => {
                let ast = self.ast();
                self.query_cache.query(&ast, selector, &compiled)
            }
            None => Vec::new(),
        }
    }

    /// Formats the current tree, reusing the last output when neither
    /// the generation nor the options have changed since.
    pub fn format(&mut self, options: FormatOptions) -> Vec<u8> {
        if let Some((gen, cached_options, bytes)) = &self.format_cache {
            if *gen == self.generation && *cached_options == options {
                return bytes.clone();
            }
        }
        let ast = self.ast();
        let bytes = format::format(&ast, &options);
        self.format_cache = Some((self.generation, options, bytes.clone()));
        bytes
    }

    /// Whether the most recently applied edit resumed lexing from a
    /// checkpoint and resettled before [`CONVERGENCE_BUDGET`] ran out.
    /// For JSON/ZON this also gates whether [`Self::apply_edit`] grafted
    /// a region-limited reparse instead of reparsing the whole file.
    pub fn last_edit_converged(&self) -> bool {
        self.last_converged
    }

    /// Applies one edit and returns the new generation.
    ///
    /// Steps, per spec.md §4.10:
    /// 1. locate the smallest previously-scanned boundary fact
    ///    enclosing the edit
    /// 2. for the brace/bracket languages, check whether resuming the
    ///    lexer from the nearest checkpoint before the edit resettles to
    ///    `Top` mode within budget after the edit — a converged result
    ///    means the tokens beyond that point are unaffected
    /// 3. splice the replacement into the source and bump the generation
    /// 4. rescan boundary facts (linear in tokens, always done in full —
    ///    this is the cheap layer)
    /// 5. for JSON/ZON, if step 1 found an enclosing boundary and step 2
    ///    converged, reparse only that boundary's (now-shifted) text and
    ///    graft it into `self.tree` in place of the stale subtree,
    ///    shifting every other node's span by the edit's byte delta;
    ///    otherwise reparse the whole file
    ///
    /// The query cache invalidates itself structurally (it's keyed by
    /// `ast.generation`, which just changed); the format cache is keyed
    /// the same way.
    pub fn apply_edit(&mut self, edit: Edit) -> Result<u32, ZzError> {
        let range = edit.range.unpack();
        let start = range.start as usize;
        let end = range.end as usize;
        if start > end || end > self.source.len() {
            return Err(ZzError::Unformattable {
                message: format!("edit range {}..{} out of bounds for {}-byte source", start, end, self.source.len()),
            });
        }

        let enclosing = self.smallest_enclosing_boundary(range);
        self.last_converged = self.try_converge(range, &edit.replacement);
        let delta = edit.replacement.len() as i64 - (end - start) as i64;

        let mut new_source = String::with_capacity(self.source.len() + edit.replacement.len());
        new_source.push_str(&self.source[..start]);
        new_source.push_str(&String::from_utf8_lossy(&edit.replacement));
        new_source.push_str(&self.source[end..]);
        self.source = new_source;
        // `self.facts` is rebuilt from scratch just below, so its own
        // generation counter resets every call — the coordinator keeps
        // its own monotonic counter instead of relying on it.
        self.generation += 1;
        self.rescan_facts();

        let grafted = self.last_converged
            && matches!(self.language, Language::Json | Language::Zon)
            && enclosing.is_some_and(|region| self.try_graft(region, delta));
        if !grafted {
            self.tree = Self::full_parse(self.language, self.dialect, &self.source).into_tree();
        }

        tracing::debug!(
            generation = self.generation,
            converged = self.last_converged,
            grafted,
            enclosing = ?enclosing.map(|s| (s.start, s.end)),
            "applied edit"
        );

        Ok(self.generation)
    }

    /// Reparses `region` (an old-source span) in its post-edit, shifted
    /// form and splices the result into `self.tree` in place of the
    /// node whose span matches it, shifting every other node's span by
    /// `delta`. Returns `false` (leaving `self.tree` untouched) if no
    /// node in the current tree has exactly `region`'s span, which
    /// falls back to a full reparse in the caller.
    fn try_graft(&mut self, region: Span, delta: i64) -> bool {
        if find_node_by_span(self.tree.root(), region).is_none() {
            return false;
        }
        let new_end = (region.end as i64 + delta) as u32;
        let fragment_src = &self.source[region.start as usize..new_end as usize];
        let fragment_ast = match self.language {
            Language::Json => parser::json::parse(fragment_src, self.dialect),
            Language::Zon => parser::zon::parse(fragment_src),
            _ => return false,
        };
        let Some(replacement) = fragment_ast.root().first_child() else {
            return false;
        };

        let old_root = self.tree.root();
        let mut new_root_value = old_root.value().clone();
        new_root_value.span = shift_span(new_root_value.span, region, delta);
        let mut new_tree = Tree::new(new_root_value);
        let new_root_id = new_tree.root().id();
        for child in old_root.children() {
            rebuild_node(child, &mut new_tree, new_root_id, region, delta, replacement);
        }
        self.tree = new_tree;
        true
    }

    /// The tightest boundary fact from the *previous* scan whose span
    /// fully contains `range`, smallest first. `None` means the edit
    /// falls outside every known region (e.g. a top-level insert), in
    /// which case the whole file is the relevant scope anyway.
    fn smallest_enclosing_boundary(&mut self, range: Span) -> Option<Span> {
        self.facts
            .iter_by_span(range)
            .into_iter()
            .map(|fact| fact.subject.unpack())
            .filter(|span| span.contains(range))
            .min_by_key(|span| span.len())
    }

    fn rescan_facts(&mut self) {
        let mut facts = FactStore::new();
        match self.language {
            Language::Json => {
                let tokens = crate::lexer::json::tokenize(&self.source, self.dialect);
                let projected: Vec<_> = tokens.iter().map(|t| t.project(&self.source)).collect();
                scanner::scan_generic(&projected, &BraceLanguage, &mut facts);
            }
            Language::Zon => {
                let tokens = crate::lexer::zon::tokenize(&self.source);
                let projected: Vec<_> = tokens.iter().map(|t| t.project(&self.source)).collect();
                scanner::scan_generic(&projected, &BraceLanguage, &mut facts);
            }
            Language::Css => {
                let tokens = crate::lexer::css::tokenize(&self.source);
                let projected: Vec<_> = tokens.iter().map(|t| t.project(&self.source)).collect();
                scanner::scan_generic(&projected, &BraceLanguage, &mut facts);
            }
            Language::Html => {
                let tokens = crate::lexer::html::tokenize(&self.source);
                scanner::scan_html(&tokens, &mut facts);
            }
            // TypeScript/Zig function bodies are opaque (no
            // expression-level grammar) and Svelte splits into
            // independent per-section documents, so boundary-fact
            // scoping doesn't apply to them; `apply_edit` still works,
            // it just always treats the whole file as the scope.
            Language::TypeScript | Language::Zig | Language::Svelte | Language::Common => {}
        }
        self.facts = facts;
    }

    /// Resumes tokenizing from the nearest checkpoint before `range`
    /// and reports whether it resettles into `Top` mode within
    /// [`CONVERGENCE_BUDGET`] bytes past the edit. Only implemented for
    /// the brace/bracket languages, whose `tokenize_chunk` shares a
    /// uniform `(state, chunk, base_offset, is_final[, dialect])`
    /// resumption contract; the others report non-convergence and take
    /// the full-reparse path unconditionally.
    fn try_converge(&self, range: Span, replacement: &[u8]) -> bool {
        if !matches!(self.language, Language::Json | Language::Zon | Language::Css) {
            return false;
        }
        let start = range.start as usize;
        let old_end = range.end as usize;
        let delta = replacement.len() as i64 - (old_end - start) as i64;
        let new_edit_end = (old_end as i64 + delta).max(0) as usize;

        let mut state = LexState::reset();
        let mut offset = 0usize;
        while offset < start {
            let window_end = (offset + CHECKPOINT_STRIDE).min(start);
            match self.tokenize_window(&self.source, state, offset, window_end, false) {
                Some((next_state, consumed)) if consumed > 0 => {
                    offset += consumed;
                    state = next_state;
                }
                _ => return false,
            }
        }

        let mut new_source = String::with_capacity(self.source.len() + replacement.len());
        new_source.push_str(&self.source[..start]);
        new_source.push_str(&String::from_utf8_lossy(replacement));
        new_source.push_str(&self.source[old_end..]);

        let budget_end = (new_edit_end + CONVERGENCE_BUDGET).min(new_source.len());
        let mut pos = offset;
        while pos < budget_end {
            let window_end = (pos + CHECKPOINT_STRIDE).min(new_source.len());
            let is_final = window_end == new_source.len();
            match self.tokenize_window(&new_source, state, pos, window_end, is_final) {
                Some((next_state, consumed)) if consumed > 0 => {
                    pos += consumed;
                    if pos >= new_edit_end && next_state.mode == LexMode::Top {
                        return true;
                    }
                    state = next_state;
                }
                _ => return false,
            }
        }
        false
    }

    fn tokenize_window(&self, source: &str, state: LexState, start: usize, end: usize, is_final: bool) -> Option<(LexState, usize)> {
        let chunk = &source[start..end];
        match self.language {
            Language::Json => {
                let (_, next, consumed) = crate::lexer::json::tokenize_chunk(state, chunk, start as u32, is_final, self.dialect);
                Some((next, consumed))
            }
            Language::Zon => {
                let (_, next, consumed) = crate::lexer::zon::tokenize_chunk(state, chunk, start as u32, is_final);
                Some((next, consumed))
            }
            Language::Css => {
                let (_, next, consumed) = crate::lexer::css::tokenize_chunk(state, chunk, start as u32, is_final);
                Some((next, consumed))
            }
            _ => None,
        }
    }
}

/// First node (pre-order) whose recorded span equals `target` exactly —
/// boundary facts are brace/bracket pairs, and a container node's span
/// is always its own open/close pair, so an exact match identifies the
/// stale subtree a graft should replace.
fn find_node_by_span(node: NodeRef<'_, Node>, target: Span) -> Option<NodeId> {
    if node.value().span == target {
        return Some(node.id());
    }
    node.children().find_map(|child| find_node_by_span(child, target))
}

/// Shifts `span` for a post-edit tree, given the old-source `region`
/// that was reparsed and the edit's byte `delta`:
/// - entirely before `region`: unchanged
/// - entirely after `region`: both ends shift by `delta`
/// - containing `region` (an ancestor of the grafted node, or the node
///   itself): the end widens/shrinks by `delta`, the start is untouched
fn shift_span(span: Span, region: Span, delta: i64) -> Span {
    if span.start >= region.end {
        Span::new((span.start as i64 + delta) as u32, (span.end as i64 + delta) as u32)
    } else if span.end <= region.start {
        span
    } else {
        Span::new(span.start, (span.end as i64 + delta) as u32)
    }
}

/// Copies `node` (from the stale tree) into `dest` under `dest_parent`,
/// shifting its span per [`shift_span`] — unless its span exactly
/// matches `region`, in which case `replacement` (the fragment
/// reparse's root value) is grafted in its place instead, with its own
/// (fragment-relative) spans translated to absolute offsets.
fn rebuild_node(node: NodeRef<'_, Node>, dest: &mut Tree<Node>, dest_parent: NodeId, region: Span, delta: i64, replacement: NodeRef<'_, Node>) {
    if node.value().span == region {
        graft_fragment(replacement, dest, dest_parent, region.start as i64);
        return;
    }
    let mut value = node.value().clone();
    value.span = shift_span(value.span, region, delta);
    let new_id = dest.get_mut(dest_parent).expect("parent just inserted").append(value).id();
    for child in node.children() {
        rebuild_node(child, dest, new_id, region, delta, replacement);
    }
}

fn graft_fragment(node: NodeRef<'_, Node>, dest: &mut Tree<Node>, dest_parent: NodeId, offset: i64) {
    let mut value = node.value().clone();
    value.span = Span::new((value.span.start as i64 + offset) as u32, (value.span.end as i64 + offset) as u32);
    let new_id = dest.get_mut(dest_parent).expect("parent just inserted").append(value).id();
    for child in node.children() {
        graft_fragment(child, dest, new_id, offset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edit(start: u32, end: u32, replacement: &str, generation: u32) -> Edit {
        Edit {
            range: Span::new(start, end).pack(),
            replacement: replacement.as_bytes().to_vec(),
            generation,
        }
    }

    #[test]
    fn apply_edit_bumps_generation_and_updates_source() {
        let mut coordinator = IncrementalCoordinator::new(Language::Json, r#"{"a":1}"#.to_string());
        assert_eq!(coordinator.generation(), 0);
        let gen = coordinator.apply_edit(edit(5, 6, "2", 0)).unwrap();
        assert_eq!(gen, 1);
        assert_eq!(coordinator.source(), r#"{"a":2}"#);
    }

    #[test]
    fn out_of_bounds_edit_is_rejected() {
        let mut coordinator = IncrementalCoordinator::new(Language::Json, r#"{}"#.to_string());
        assert!(coordinator.apply_edit(edit(0, 10, "x", 0)).is_err());
    }

    #[test]
    fn ast_reflects_the_edited_source() {
        let mut coordinator = IncrementalCoordinator::new(Language::Json, r#"{"a":1}"#.to_string());
        coordinator.apply_edit(edit(5, 6, "2", 0)).unwrap();
        let ast = coordinator.ast();
        assert_eq!(ast.generation, 1);
        assert_eq!(ast.source, r#"{"a":2}"#);
    }

    #[test]
    fn editing_inside_a_value_converges() {
        let mut coordinator = IncrementalCoordinator::new(Language::Json, r#"{"a":1,"b":2}"#.to_string());
        coordinator.apply_edit(edit(5, 6, "9", 0)).unwrap();
        assert!(coordinator.last_edit_converged());
    }

    #[test]
    fn introducing_an_unterminated_string_fails_to_converge() {
        let mut coordinator = IncrementalCoordinator::new(Language::Json, r#"{"a":1}"#.to_string());
        coordinator.apply_edit(edit(5, 6, "\"unterminated", 0)).unwrap();
        assert!(!coordinator.last_edit_converged());
    }

    #[test]
    fn non_brace_language_never_reports_convergence() {
        let mut coordinator = IncrementalCoordinator::new(Language::TypeScript, "let x = 1;".to_string());
        coordinator.apply_edit(edit(8, 9, "2", 0)).unwrap();
        assert!(!coordinator.last_edit_converged());
    }

    #[test]
    fn format_cache_hits_when_generation_and_options_match() {
        let mut coordinator = IncrementalCoordinator::new(Language::Json, r#"{"a":1}"#.to_string());
        let options = FormatOptions::default();
        let first = coordinator.format(options);
        let second = coordinator.format(options);
        assert_eq!(first, second);
    }

    #[test]
    fn format_cache_misses_after_an_edit() {
        let mut coordinator = IncrementalCoordinator::new(Language::Json, r#"{"a":1}"#.to_string());
        let options = FormatOptions::default();
        let before = coordinator.format(options);
        coordinator.apply_edit(edit(5, 6, "2", 0)).unwrap();
        let after = coordinator.format(options);
        assert_ne!(before, after);
    }

    #[test]
    fn smallest_enclosing_boundary_narrows_to_the_nested_object() {
        let mut coordinator = IncrementalCoordinator::new(Language::Json, r#"{"a":{"b":1},"c":2}"#.to_string());
        let hit = coordinator.smallest_enclosing_boundary(Span::new(9, 10));
        assert_eq!(hit, Some(Span::new(5, 12)));
    }
}
