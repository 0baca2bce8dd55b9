//! Fact store (C5).
//!
//! An append-only store of immutable 24-byte-logical facts with
//! secondary indexes by predicate and by span. Facts are how the
//! structural scanner (C4) records boundaries and parent links without
//! mutating the token stream or the AST.

use std::collections::HashMap;

use crate::span::{PackedSpan, PredicateId, Span};

/// Confidence, quantized into a 16-bit fixed-point fraction of `[0, 1]`.
/// Stable Rust has no `f16`; this carries the same 16-bit budget without
/// relying on an unstable float type.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Confidence(u16);

impl Confidence {
    pub const CERTAIN: Confidence = Confidence(u16::MAX);
    pub const ZERO: Confidence = Confidence(0);

    pub fn from_f32(v: f32) -> Self {
        let clamped = v.clamp(0.0, 1.0);
        Confidence((clamped * f32::from(u16::MAX)) as u16)
    }

    pub fn as_f32(self) -> f32 {
        f32::from(self.0) / f32::from(u16::MAX)
    }

    /// `confidence >= 0.9` per spec.md's confidence semantics.
    pub fn is_certain(self) -> bool {
        self.as_f32() >= 0.9
    }

    /// `confidence < 0.3` per spec.md's confidence semantics.
    pub fn is_uncertain(self) -> bool {
        self.as_f32() < 0.3
    }
}

impl Default for Confidence {
    fn default() -> Self {
        Confidence::CERTAIN
    }
}

/// The 8-byte-logical union carried by every fact's `object` field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    None,
    Int(i64),
    UInt(u64),
    Float(f64),
    Span(PackedSpan),
    FactRef(u32),
    Atom(u32),
    Bool(bool),
}

/// An immutable, append-only record: `(id, subject, predicate, object,
/// confidence)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fact {
    pub id: u32,
    pub subject: PackedSpan,
    pub predicate: PredicateId,
    pub object: Value,
    pub confidence: Confidence,
}

/// Append-only vector of facts plus by-predicate and by-span indexes.
/// IDs are dense and start at 1 (0 means "none", matching
/// [`Value::FactRef`]'s sentinel).
#[derive(Debug, Default)]
pub struct FactStore {
    facts: Vec<Fact>,
    by_predicate: HashMap<PredicateId, Vec<u32>>,
    /// Sorted by span start; rebuilt lazily whenever `generation` moves
    /// past `span_index_generation`.
    by_span: Vec<(PackedSpan, u32)>,
    span_index_generation: u32,
    generation: u32,
}

impl FactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn next_generation(&mut self) -> u32 {
        self.generation += 1;
        self.generation
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    pub fn append(&mut self, subject: Span, predicate: PredicateId, object: Value) -> u32 {
        self.append_with_confidence(subject, predicate, object, Confidence::CERTAIN)
    }

    pub fn append_with_confidence(
        &mut self,
        subject: Span,
        predicate: PredicateId,
        object: Value,
        confidence: Confidence,
    ) -> u32 {
        let id = self.facts.len() as u32 + 1;
        let fact = Fact {
            id,
            subject: subject.pack(),
            predicate,
            object,
            confidence,
        };
        self.by_predicate.entry(predicate).or_default().push(id);
        self.facts.push(fact);
        id
    }

    pub fn append_batch(&mut self, facts: impl IntoIterator<Item = (Span, PredicateId, Value)>) -> Vec<u32> {
        facts
            .into_iter()
            .map(|(s, p, v)| self.append(s, p, v))
            .collect()
    }

    pub fn get(&self, id: u32) -> Option<&Fact> {
        if id == 0 {
            return None;
        }
        self.facts.get(id as usize - 1)
    }

    pub fn iter_by_predicate(&self, predicate: PredicateId) -> impl Iterator<Item = &Fact> {
        self.by_predicate
            .get(&predicate)
            .into_iter()
            .flatten()
            .filter_map(move |id| self.get(*id))
    }

    fn ensure_span_index(&mut self) {
        if self.span_index_generation == self.generation && self.by_span.len() == self.facts.len() {
            return;
        }
        self.by_span = self.facts.iter().map(|f| (f.subject, f.id)).collect();
        self.by_span.sort_by_key(|(span, _)| span.unpack().start);
        self.span_index_generation = self.generation;
    }

    /// Facts whose subject span overlaps `range`, in ascending start order.
    pub fn iter_by_span(&mut self, range: Span) -> Vec<&Fact> {
        self.ensure_span_index();
        let start_idx = self
            .by_span
            .partition_point(|(span, _)| span.unpack().end <= range.start);
        self.by_span[start_idx..]
            .iter()
            .take_while(|(span, _)| span.unpack().start < range.end)
            .filter_map(|(_, id)| self.get(*id))
            .collect()
    }

    /// Removes facts below `min_confidence` and renumbers the remaining
    /// ones densely from 1. Must only be called at quiescence (never
    /// mid-iteration over this store).
    pub fn compact(&mut self, min_confidence: Confidence) {
        let mut kept: Vec<Fact> = self
            .facts
            .drain(..)
            .filter(|f| f.confidence.as_f32() >= min_confidence.as_f32())
            .collect();
        for (i, fact) in kept.iter_mut().enumerate() {
            fact.id = i as u32 + 1;
        }
        self.facts = kept;
        self.by_predicate.clear();
        for fact in &self.facts {
            self.by_predicate.entry(fact.predicate).or_default().push(fact.id);
        }
        self.next_generation();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_monotonic() {
        let mut store = FactStore::new();
        let a = store.append(Span::new(0, 1), PredicateId::IS_TOKEN, Value::None);
        let b = store.append(Span::new(1, 2), PredicateId::IS_TOKEN, Value::None);
        assert!(b > a);
        assert_eq!(store.get(a).unwrap().id, a);
    }

    #[test]
    fn by_span_returns_overlapping_facts_only() {
        let mut store = FactStore::new();
        store.append(Span::new(0, 5), PredicateId::IS_BOUNDARY, Value::None);
        store.append(Span::new(10, 15), PredicateId::IS_BOUNDARY, Value::None);
        let hits = store.iter_by_span(Span::new(4, 11));
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn compact_drops_low_confidence_and_renumbers() {
        let mut store = FactStore::new();
        store.append_with_confidence(Span::new(0, 1), PredicateId::HAS_ERROR, Value::None, Confidence::from_f32(0.1));
        store.append_with_confidence(Span::new(1, 2), PredicateId::HAS_ERROR, Value::None, Confidence::CERTAIN);
        store.compact(Confidence::from_f32(0.5));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(1).unwrap().subject.unpack(), Span::new(1, 2));
    }

    #[test]
    fn confidence_thresholds_match_spec() {
        assert!(Confidence::from_f32(0.95).is_certain());
        assert!(Confidence::from_f32(0.2).is_uncertain());
        assert!(!Confidence::from_f32(0.5).is_certain());
        assert!(!Confidence::from_f32(0.5).is_uncertain());
    }
}
