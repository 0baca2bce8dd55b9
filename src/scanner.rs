//! Structural scanner (C4, Layer 1): a single pass over a projected
//! token stream that records boundary facts (one per nestable region:
//! object, array, block, tag, rule, …) and `has_parent` links between
//! them, without building an AST. This is what lets the parser (C7)
//! find the smallest enclosing region around an edit instead of always
//! reparsing the whole file.

use crate::facts::{FactStore, Value};
use crate::lexer::Projected;
use crate::span::{PredicateId, RuleId, Span};

/// One entry on the open-bracket stack: the opening token's kind and
/// span, plus the fact ID that will eventually close it (filled in on
/// pop).
struct OpenFrame {
    opener_kind: RuleId,
    opener_span: Span,
    /// Fact IDs of every boundary opened strictly after this one, so
    /// that on close we can stamp `has_parent` for all of them.
    children: Vec<u32>,
}

/// Classifies a projected token as an opener, a matching closer, or
/// neither, for the purpose of region matching. Per-language rule IDs
/// collapse onto these three outcomes so the scanning loop itself is
/// language-neutral.
pub trait BracketClass {
    /// `Some(expected_closer)` if `kind` opens a region.
    fn opens(&self, kind: RuleId) -> Option<RuleId>;
    /// `true` if `kind` is *a* closer token at all (used to detect
    /// mismatches vs. "not a bracket token").
    fn is_closer(&self, kind: RuleId) -> bool;
}

/// Bracket classification shared by the brace/bracket/paren-based
/// languages (JSON, ZON, TypeScript, Zig, CSS at the block level).
pub struct BraceLanguage;

impl BracketClass for BraceLanguage {
    fn opens(&self, kind: RuleId) -> Option<RuleId> {
        use crate::registry::{css, json, typescript, zig, zon};
        match kind {
            k if k == json::LBRACE => Some(json::RBRACE),
            k if k == json::LBRACKET => Some(json::RBRACKET),
            k if k == zon::LBRACE => Some(zon::RBRACE),
            k if k == css::LBRACE => Some(css::RBRACE),
            k if k == typescript::OPAQUE_BODY => None, // handled specially: braces share one rule id
            k if k == zig::OPAQUE_BODY => None,
            _ => None,
        }
    }

    fn is_closer(&self, kind: RuleId) -> bool {
        use crate::registry::{css, json, zon};
        matches!(kind, k if k == json::RBRACE || k == json::RBRACKET || k == zon::RBRACE || k == css::RBRACE)
    }
}

/// HTML's bracket language is tag-name based rather than a fixed
/// closer-per-opener map, so it gets its own scan function
/// (`scan_html`) instead of implementing [`BracketClass`].
pub fn scan_generic(tokens: &[Projected<'_>], lang: &impl BracketClass, facts: &mut FactStore) {
    let mut stack: Vec<OpenFrame> = Vec::new();

    for tok in tokens {
        if let Some(expected_closer) = lang.opens(tok.kind_id) {
            stack.push(OpenFrame {
                opener_kind: expected_closer,
                opener_span: tok.span,
                children: Vec::new(),
            });
            continue;
        }
        if lang.is_closer(tok.kind_id) {
            match stack.pop() {
                Some(frame) if frame.opener_kind == tok.kind_id => {
                    close_frame(facts, &mut stack, frame, tok.span);
                }
                Some(mut frame) => {
                    // Mismatched closer: record a has_error fact and
                    // heal by treating this frame as closed anyway so
                    // later regions stay usable (spec.md §4.2's
                    // "healed by popping the nearest plausible opener"
                    // policy).
                    let err_span = frame.opener_span.union(tok.span);
                    facts.append_with_confidence(
                        err_span,
                        PredicateId::HAS_ERROR,
                        Value::None,
                        crate::facts::Confidence::from_f32(0.4),
                    );
                    frame.children.clear();
                    close_frame(facts, &mut stack, frame, tok.span);
                }
                None => {
                    // Closer with nothing open: record the error but
                    // don't push a boundary fact.
                    facts.append_with_confidence(
                        tok.span,
                        PredicateId::HAS_ERROR,
                        Value::None,
                        crate::facts::Confidence::from_f32(0.4),
                    );
                }
            }
        }
    }

    // Anything left open at EOF is an unmatched opener.
    while let Some(frame) = stack.pop() {
        facts.append_with_confidence(
            frame.opener_span,
            PredicateId::HAS_ERROR,
            Value::None,
            crate::facts::Confidence::from_f32(0.3),
        );
    }
}

fn close_frame(facts: &mut FactStore, stack: &mut [OpenFrame], frame: OpenFrame, closer_span: Span) {
    let region_span = frame.opener_span.union(closer_span);
    let boundary_id = facts.append(region_span, PredicateId::IS_BOUNDARY, Value::None);
    for child_id in frame.children {
        if let Some(child) = facts.get(child_id) {
            let child_span = child.subject.unpack();
            facts.append(child_span, PredicateId::HAS_PARENT, Value::FactRef(boundary_id));
        }
    }
    if let Some(top) = stack.last_mut() {
        top.children.push(boundary_id);
    }
}

/// HTML region matching: the opener/closer pairing depends on the tag
/// *name*, not a fixed token kind, so this walks `html::Kind`-tagged
/// tokens directly rather than going through [`BracketClass`].
pub fn scan_html(tokens: &[crate::lexer::Token<'_, crate::lexer::html::Kind>], facts: &mut FactStore) {
    use crate::lexer::html::Kind;

    struct Frame {
        span_start: Span,
        name: String,
    }
    let mut stack: Vec<Frame> = Vec::new();
    let mut pending_name: Option<(String, Span)> = None;
    let mut self_closing = false;

    for tok in tokens {
        match tok.kind {
            Kind::TagOpenStart => {
                let name = match tok.payload {
                    crate::lexer::Payload::Text(s) => s.to_string(),
                    _ => String::new(),
                };
                pending_name = Some((name, tok.span));
                self_closing = false;
            }
            Kind::TagSelfClose => {
                self_closing = true;
            }
            Kind::TagEnd => {
                if let Some((name, start_span)) = pending_name.take() {
                    if self_closing || crate::lexer::html::is_void_element(&name) {
                        let region = start_span.union(tok.span);
                        facts.append(region, PredicateId::IS_BOUNDARY, Value::None);
                    } else {
                        stack.push(Frame {
                            span_start: start_span,
                            name,
                        });
                    }
                }
            }
            Kind::TagCloseStart => {
                let name = match tok.payload {
                    crate::lexer::Payload::Text(s) => s.to_string(),
                    _ => String::new(),
                };
                if let Some(pos) = stack.iter().rposition(|f| f.name.eq_ignore_ascii_case(&name)) {
                    // Heal: close everything above the matching frame too
                    // (implicit end tags), each with lower confidence.
                    while stack.len() > pos + 1 {
                        let frame = stack.pop().unwrap();
                        let region = frame.span_start.union(tok.span);
                        facts.append_with_confidence(
                            region,
                            PredicateId::IS_BOUNDARY,
                            Value::None,
                            crate::facts::Confidence::from_f32(0.6),
                        );
                    }
                    let frame = stack.pop().unwrap();
                    let region = frame.span_start.union(tok.span);
                    facts.append(region, PredicateId::IS_BOUNDARY, Value::None);
                } else {
                    facts.append_with_confidence(
                        tok.span,
                        PredicateId::HAS_ERROR,
                        Value::None,
                        crate::facts::Confidence::from_f32(0.4),
                    );
                }
            }
            _ => {}
        }
    }

    while let Some(frame) = stack.pop() {
        facts.append_with_confidence(
            frame.span_start,
            PredicateId::HAS_ERROR,
            Value::None,
            crate::facts::Confidence::from_f32(0.3),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::json;

    #[test]
    fn nested_objects_produce_boundary_and_parent_facts() {
        let tokens = json::tokenize(r#"{"a":{"b":1}}"#, json::Dialect::Strict);
        let projected: Vec<_> = tokens.iter().map(|t| t.project(r#"{"a":{"b":1}}"#)).collect();
        let mut facts = FactStore::new();
        scan_generic(&projected, &BraceLanguage, &mut facts);
        let boundaries: Vec<_> = facts.iter_by_predicate(PredicateId::IS_BOUNDARY).collect();
        assert_eq!(boundaries.len(), 2);
        let parents: Vec<_> = facts.iter_by_predicate(PredicateId::HAS_PARENT).collect();
        assert_eq!(parents.len(), 1);
    }

    #[test]
    fn mismatched_closer_produces_error_fact_and_heals() {
        let src = "[1, 2}";
        let tokens = json::tokenize(src, json::Dialect::Strict);
        let projected: Vec<_> = tokens.iter().map(|t| t.project(src)).collect();
        let mut facts = FactStore::new();
        scan_generic(&projected, &BraceLanguage, &mut facts);
        assert!(facts.iter_by_predicate(PredicateId::HAS_ERROR).count() >= 1);
    }

    #[test]
    fn html_void_elements_are_self_contained_boundaries() {
        let src = "<div><br><p>x</p></div>";
        let tokens = crate::lexer::html::tokenize(src);
        let mut facts = FactStore::new();
        scan_html(&tokens, &mut facts);
        let boundaries: Vec<_> = facts.iter_by_predicate(PredicateId::IS_BOUNDARY).collect();
        assert_eq!(boundaries.len(), 3); // br, p, div
    }
}
