//! AST model (C8): a rule-ID-tagged node tree, span-annotated, owned by
//! an [`ego_tree::Tree`] arena. `ego-tree` gives O(1) parent/child/
//! sibling navigation and owns node storage itself, which is the
//! "arena-owned" requirement without a hand-rolled bump allocator.

use ego_tree::{NodeId, NodeRef, Tree};

use crate::diagnostics::Diagnostic;
use crate::registry::Language;
use crate::span::{RuleId, Span};

/// Kind-specific decoded leaf value, mirroring [`crate::lexer::Payload`]
/// but owned (an AST outlives the token stream it was built from).
#[derive(Debug, Clone, PartialEq)]
pub enum Leaf {
    None,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

/// One AST node: its grammar rule, source span, and optional decoded
/// leaf payload. Children live as this node's ego-tree children, not a
/// separate slice field — the tree itself is the arena.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub rule_id: RuleId,
    pub span: Span,
    pub payload: Leaf,
    /// Set by the parser's error-recovery path (spec.md §4.5); also
    /// readable via the `has_error` fact for nodes built from the
    /// scanner's healed boundaries.
    pub is_error: bool,
}

impl Node {
    pub fn new(rule_id: RuleId, span: Span) -> Self {
        Node {
            rule_id,
            span,
            payload: Leaf::None,
            is_error: false,
        }
    }

    pub fn with_payload(mut self, payload: Leaf) -> Self {
        self.payload = payload;
        self
    }

    pub fn error(rule_id: RuleId, span: Span) -> Self {
        Node {
            rule_id,
            span,
            payload: Leaf::None,
            is_error: true,
        }
    }
}

/// A complete parse result: the arena-owned tree, a borrow of the
/// source it was built from, the generation it was produced at, and
/// any diagnostics raised during parsing (syntax errors only — lint
/// diagnostics are a separate pass, C12).
pub struct Ast<'src> {
    tree: Tree<Node>,
    pub source: &'src str,
    pub language: Language,
    pub generation: u32,
    pub diagnostics: Vec<Diagnostic>,
}

impl<'src> Ast<'src> {
    pub fn new(root: Node, source: &'src str, language: Language) -> Self {
        Ast {
            tree: Tree::new(root),
            source,
            language,
            generation: 0,
            diagnostics: Vec::new(),
        }
    }

    /// Wraps an already-built tree (e.g. one kept up to date by
    /// [`crate::incremental::IncrementalCoordinator`] across edits)
    /// around a source string, instead of parsing from scratch.
    pub(crate) fn from_tree(tree: Tree<Node>, source: &'src str, language: Language, generation: u32) -> Self {
        Ast {
            tree,
            source,
            language,
            generation,
            diagnostics: Vec::new(),
        }
    }

    /// Takes ownership of this AST's tree, discarding the source borrow
    /// and diagnostics — for callers that keep the tree around longer
    /// than the `&str` it was parsed from.
    pub(crate) fn into_tree(self) -> Tree<Node> {
        self.tree
    }

    pub fn root(&self) -> NodeRef<'_, Node> {
        self.tree.root()
    }

    pub fn root_id(&self) -> NodeId {
        self.tree.root().id()
    }

    pub fn get(&self, id: NodeId) -> Option<NodeRef<'_, Node>> {
        self.tree.get(id)
    }

    /// Appends `child` as the last child of `parent`, returning the new
    /// node's ID. Used by the per-language parsers while building the
    /// tree bottom-up.
    pub fn append_child(&mut self, parent: NodeId, child: Node) -> NodeId {
        let mut parent_mut = self.tree.get_mut(parent).expect("parent node must exist in this arena");
        parent_mut.append(child).id()
    }

    /// Widens or shrinks a node's recorded span after its children have
    /// been built — parsers create a container node before parsing its
    /// contents, then call this once the closing token (or error
    /// recovery point) is known.
    pub fn update_span(&mut self, id: NodeId, span: Span) {
        if let Some(mut node_mut) = self.tree.get_mut(id) {
            node_mut.value_mut().span = span;
        }
    }

    pub fn tree(&self) -> &Tree<Node> {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut Tree<Node> {
        &mut self.tree
    }

    /// Text slice this node's span covers in the original source.
    pub fn text(&self, node: NodeRef<'_, Node>) -> &'src str {
        node.value().span.slice(self.source)
    }

    /// Property 2 (spec.md §8): every node's span is a superset of the
    /// union of its children's spans, and the root span is `[0,
    /// source.len)`.
    pub fn check_span_coverage(&self) -> bool {
        if self.root().value().span != Span::new(0, self.source.len() as u32) {
            return false;
        }
        fn check(node: NodeRef<'_, Node>) -> bool {
            let span = node.value().span;
            for child in node.children() {
                if !span.contains(child.value().span) {
                    return false;
                }
                if !check(child) {
                    return false;
                }
            }
            true
        }
        check(self.root())
    }

    /// Property 3: every node's `rule_id` resolves in the registry and
    /// belongs to this AST's language (or the common namespace).
    pub fn check_rule_id_invariance(&self) -> bool {
        fn check(node: NodeRef<'_, Node>, language: Language) -> bool {
            match crate::registry::lookup(node.value().rule_id) {
                Some(info) if info.language == language || info.language == Language::Common => {
                    node.children().all(|c| check(c, language))
                }
                _ => false,
            }
        }
        check(self.root(), self.language)
    }
}
