//! AST traversal & query (C9): pre-order/post-order walkers over the
//! arena-owned tree, plus a small CSS-like selector compiler with an
//! LRU match cache keyed by `(AST generation, query ID)`.

use std::collections::HashMap;
use std::time::Instant;

use ego_tree::NodeId;

use crate::ast::{Ast, Node};
use crate::span::RuleId;

/// What a [`Visitor`] callback tells the walker to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuation {
    Descend,
    SkipChildren,
    Stop,
}

/// Depth-first pre-order walk: the callback sees a node before its
/// children. Returns `true` if the walk ran to completion (was not
/// stopped early).
pub fn walk_pre_order<'a>(ast: &'a Ast<'a>, mut visit: impl FnMut(ego_tree::NodeRef<'a, Node>) -> Continuation) -> bool {
    fn go<'a>(node: ego_tree::NodeRef<'a, Node>, visit: &mut impl FnMut(ego_tree::NodeRef<'a, Node>) -> Continuation) -> bool {
        match visit(node) {
            Continuation::Stop => false,
            Continuation::SkipChildren => true,
            Continuation::Descend => {
                for child in node.children() {
                    if !go(child, visit) {
                        return false;
                    }
                }
                true
            }
        }
    }
    go(ast.root(), &mut visit)
}

/// Depth-first post-order walk: the callback sees a node after all its
/// children. `SkipChildren` has no meaning here (children are always
/// visited first) and is treated the same as `Descend`.
pub fn walk_post_order<'a>(ast: &'a Ast<'a>, mut visit: impl FnMut(ego_tree::NodeRef<'a, Node>) -> Continuation) -> bool {
    fn go<'a>(node: ego_tree::NodeRef<'a, Node>, visit: &mut impl FnMut(ego_tree::NodeRef<'a, Node>) -> Continuation) -> bool {
        for child in node.children() {
            if !go(child, visit) {
                return false;
            }
        }
        !matches!(visit(node), Continuation::Stop)
    }
    go(ast.root(), &mut visit)
}

/// One step of a compiled query: a rule ID to match, optionally
/// requiring a direct parent/child relationship with the previous step
/// (`rule/child-rule`), and an optional attribute predicate
/// (`rule[attribute]`) over the node's registry category name.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Step {
    rule: RuleId,
    attribute: Option<String>,
}

/// A compiled CSS-like selector: `rule/child-rule/...`, each segment
/// optionally carrying an `[attribute]` filter. Compiling parses the
/// rule names through the registry's name table once; matching never
/// re-parses the selector text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    steps: Vec<Step>,
}

impl Query {
    /// Compiles `selector` (e.g. `"json.object/json.field[key]"`) by
    /// resolving each segment's rule name against [`crate::registry`].
    /// Returns `None` if any segment names an unknown rule.
    pub fn compile(selector: &str) -> Option<Query> {
        let mut steps = Vec::new();
        for segment in selector.split('/') {
            let (name, attribute) = match segment.find('[') {
                Some(idx) if segment.ends_with(']') => (&segment[..idx], Some(segment[idx + 1..segment.len() - 1].to_string())),
                _ => (segment, None),
            };
            let rule = crate::registry::id_by_name(name)?;
            steps.push(Step { rule, attribute });
        }
        if steps.is_empty() {
            return None;
        }
        Some(Query { steps })
    }

    /// Runs this query over `ast`, returning matching node IDs in
    /// document order. A node matches the final step if it also
    /// satisfies every preceding step against one of its ancestors, in
    /// order (`a/b` matches a `b` node with some ancestor `a`, not
    /// necessarily its direct parent — spec.md's `rule/child-rule`
    /// describes containment, not strict adjacency).
    fn run(&self, ast: &Ast<'_>) -> Vec<NodeId> {
        let mut matches = Vec::new();
        walk_pre_order(ast, |node| {
            if self.matches_at(node) {
                matches.push(node.id());
            }
            Continuation::Descend
        });
        matches
    }

    fn matches_at(&self, node: ego_tree::NodeRef<'_, Node>) -> bool {
        let last = self.steps.last().expect("compiled query always has >=1 step");
        if !step_matches(last, node) {
            return false;
        }
        let mut ancestors = node.ancestors();
        for step in self.steps[..self.steps.len() - 1].iter().rev() {
            loop {
                match ancestors.next() {
                    Some(anc) if step_matches(step, anc) => break,
                    Some(_) => continue,
                    None => return false,
                }
            }
        }
        true
    }
}

fn step_matches(step: &Step, node: ego_tree::NodeRef<'_, Node>) -> bool {
    if node.value().rule_id != step.rule {
        return false;
    }
    match &step.attribute {
        None => true,
        Some(attr) => crate::registry::lookup(node.value().rule_id)
            .map(|info| info.category.name() == attr.as_str())
            .unwrap_or(false),
    }
}

/// One slot in the query cache: the cached match list plus the
/// nanosecond-timestamped last access used to break LRU eviction ties
/// correctly even under back-to-back calls within the same millisecond.
struct CacheEntry {
    matches: Vec<NodeId>,
    last_access: Instant,
}

/// LRU cache of compiled-query results, keyed by `(AST generation,
/// query text)`. A generation bump (any structural mutation of the
/// cached parse artifact) invalidates every entry for that file by
/// virtue of no longer matching the current generation key.
pub struct QueryCache {
    capacity: usize,
    entries: HashMap<(u32, String), CacheEntry>,
}

impl QueryCache {
    pub fn new(capacity: usize) -> Self {
        QueryCache { capacity, entries: HashMap::new() }
    }

    /// Runs `query` against `ast`, serving from cache when `(ast.generation,
    /// selector)` was seen before.
    pub fn query(&mut self, ast: &Ast<'_>, selector: &str, query: &Query) -> Vec<NodeId> {
        let key = (ast.generation, selector.to_string());
        if let Some(entry) = self.entries.get_mut(&key) {
            entry.last_access = Instant::now();
            return entry.matches.clone();
        }
        let matches = query.run(ast);
        self.evict_if_full();
        self.entries.insert(key, CacheEntry { matches: matches.clone(), last_access: Instant::now() });
        matches
    }

    fn evict_if_full(&mut self) {
        if self.entries.len() < self.capacity {
            return;
        }
        if let Some(lru_key) = self.entries.iter().min_by_key(|(_, e)| e.last_access).map(|(k, _)| k.clone()) {
            self.entries.remove(&lru_key);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::json;

    #[test]
    fn pre_order_visits_parent_before_children() {
        let ast = crate::parser::json::parse(r#"{"a":{"b":1}}"#, crate::lexer::json::Dialect::Strict);
        let mut order = Vec::new();
        walk_pre_order(&ast, |n| {
            order.push(n.value().rule_id);
            Continuation::Descend
        });
        assert_eq!(order[0], json::DOCUMENT);
        let obj_pos = order.iter().position(|r| *r == json::OBJECT).unwrap();
        let field_pos = order.iter().position(|r| *r == json::FIELD).unwrap();
        assert!(obj_pos < field_pos);
    }

    #[test]
    fn post_order_visits_children_before_parent() {
        let ast = crate::parser::json::parse(r#"{"a":1}"#, crate::lexer::json::Dialect::Strict);
        let mut order = Vec::new();
        walk_post_order(&ast, |n| {
            order.push(n.value().rule_id);
            Continuation::Descend
        });
        let field_pos = order.iter().position(|r| *r == json::FIELD).unwrap();
        let obj_pos = order.iter().position(|r| *r == json::OBJECT).unwrap();
        assert!(field_pos < obj_pos);
    }

    #[test]
    fn skip_children_prunes_subtree() {
        let ast = crate::parser::json::parse(r#"{"a":{"b":1}}"#, crate::lexer::json::Dialect::Strict);
        let mut seen = Vec::new();
        walk_pre_order(&ast, |n| {
            seen.push(n.value().rule_id);
            if n.value().rule_id == json::OBJECT && seen.iter().filter(|r| **r == json::OBJECT).count() == 1 {
                Continuation::SkipChildren
            } else {
                Continuation::Descend
            }
        });
        assert!(!seen.contains(&json::FIELD));
    }

    #[test]
    fn query_matches_descendant_field_under_object() {
        let ast = crate::parser::json::parse(r#"{"a":1,"b":2}"#, crate::lexer::json::Dialect::Strict);
        let query = Query::compile("json.object/json.field").unwrap();
        let matches = query.run(&ast);
        assert_eq!(matches.len(), 2);
    }

    #[test]
    fn unknown_rule_name_fails_to_compile() {
        assert!(Query::compile("not.a.real.rule").is_none());
    }

    #[test]
    fn cache_hits_return_identical_results_without_rerunning() {
        let ast = crate::parser::json::parse(r#"{"a":1}"#, crate::lexer::json::Dialect::Strict);
        let query = Query::compile("json.field").unwrap();
        let mut cache = QueryCache::new(4);
        let first = cache.query(&ast, "json.field", &query);
        let second = cache.query(&ast, "json.field", &query);
        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn cache_evicts_least_recently_used_when_full() {
        let ast = crate::parser::json::parse(r#"{"a":1}"#, crate::lexer::json::Dialect::Strict);
        let q1 = Query::compile("json.field").unwrap();
        let q2 = Query::compile("json.object").unwrap();
        let q3 = Query::compile("json.document").unwrap();
        let mut cache = QueryCache::new(2);
        cache.query(&ast, "a", &q1);
        cache.query(&ast, "b", &q2);
        cache.query(&ast, "c", &q3);
        assert_eq!(cache.len(), 2);
    }
}
