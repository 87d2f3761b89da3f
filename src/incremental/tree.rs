use std::collections::VecDeque;

use tracing::{debug, trace};

use crate::{alphabet::Alphabet, Show};

use super::{Edge, IncrementalError, Node, NodeId};

/// The prefix tree shared by all incremental builders. It owns the alphabet, an arena of [`Node`]s and
/// the id of the root (if it exists already). `alphabet_size` caches the size of the alphabet at the
/// last time the tree was widened, newly allocated child slots use this size. Subtrees that were cut
/// off keep their slots in the arena, `detached` counts them.
#[derive(Debug, Clone)]
pub(crate) struct PrefixTree<A: Alphabet, Q, C> {
    alphabet: A,
    alphabet_size: usize,
    nodes: Vec<Node<Q, C>>,
    root: Option<NodeId>,
    detached: usize,
}

impl<A: Alphabet, Q, C> PrefixTree<A, Q, C> {
    /// Creates a tree that does not even have a root yet.
    pub fn new(alphabet: A) -> Self {
        Self {
            alphabet_size: alphabet.size(),
            alphabet,
            nodes: vec![],
            root: None,
            detached: 0,
        }
    }

    /// Creates a tree consisting of a root with the given color.
    pub fn with_root(alphabet: A, color: Q) -> Self {
        let mut tree = Self::new(alphabet);
        tree.add_root(color);
        tree
    }

    pub fn alphabet(&self) -> &A {
        &self.alphabet
    }

    pub fn alphabet_size(&self) -> usize {
        self.alphabet_size
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Number of nodes that are reachable from the root.
    pub fn size(&self) -> usize {
        self.nodes.len() - self.detached
    }

    pub fn node(&self, id: NodeId) -> &Node<Q, C> {
        &self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node<Q, C>> {
        self.nodes.get(id.0)
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node<Q, C> {
        &mut self.nodes[id.0]
    }

    /// Creates the root, which must not exist yet.
    pub fn add_root(&mut self, color: Q) -> NodeId {
        debug_assert!(self.root.is_none(), "root exists already");
        let id = self.push(color);
        self.root = Some(id);
        id
    }

    fn push(&mut self, color: Q) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(color));
        id
    }

    /// Returns the edge leaving `node` on `symbol`, or `None` if there is no such edge or the symbol
    /// is unknown to the alphabet.
    pub fn child(&self, node: NodeId, symbol: A::Symbol) -> Option<&Edge<C>> {
        let idx = self.alphabet.symbol_index(symbol)?;
        self.node(node).child(idx)
    }

    /// Creates a new node with color `color` and attaches it to `parent` with an edge for the symbol of
    /// index `idx` that is colored with `edge_color`.
    pub fn add_child(&mut self, parent: NodeId, idx: usize, color: Q, edge_color: C) -> NodeId {
        let id = self.push(color);
        let size = self.alphabet_size;
        self.node_mut(parent).set_child(idx, size, Edge::new(id, edge_color));
        trace!("created node {} below {} for symbol index {idx}", id.show(), parent.show());
        id
    }

    /// Cuts the edge leaving `parent` for the symbol of index `idx`. Returns the nodes of the subtree
    /// that the edge led to in breadth-first order, or nothing if there was no such edge.
    pub fn detach_child(&mut self, parent: NodeId, idx: usize) -> Vec<NodeId> {
        let Some(edge) = self.node_mut(parent).take_child(idx) else {
            return vec![];
        };
        let removed = self.subtree(edge.target());
        self.detached += removed.len();
        trace!("detached {} nodes below {}", removed.len(), parent.show());
        removed
    }

    /// Cuts all edges leaving `node`, turning it into a leaf.
    pub fn detach_children(&mut self, node: NodeId) -> Vec<NodeId> {
        let indices: Vec<usize> = self.node(node).children().map(|(idx, _)| idx).collect();
        indices
            .into_iter()
            .flat_map(|idx| self.detach_child(node, idx))
            .collect()
    }

    fn subtree(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = vec![];
        let mut queue = VecDeque::from([root]);
        while let Some(id) = queue.pop_front() {
            out.push(id);
            queue.extend(self.node(id).children().map(|(_, e)| e.target()));
        }
        out
    }

    /// Translates the given word into the indices of its symbols. Fails if the word contains a
    /// symbol that is not part of the alphabet.
    pub fn indices(&self, word: &[A::Symbol]) -> Result<Vec<usize>, IncrementalError> {
        word.iter()
            .map(|sym| {
                self.alphabet
                    .symbol_index(*sym)
                    .ok_or_else(|| IncrementalError::UnknownSymbol(sym.show()))
            })
            .collect()
    }

    /// Follows the given word from the root for as long as the tree defines it. The result contains the
    /// root followed by one node per symbol that could be read, so its length is one more than the
    /// length of the longest prefix of `word` that is present in the tree. Empty if there is no root.
    pub fn walk<W: IntoIterator<Item = A::Symbol>>(&self, word: W) -> Vec<NodeId> {
        let Some(root) = self.root else {
            return vec![];
        };
        let mut out = vec![root];
        let mut current = root;
        for sym in word {
            let Some(edge) = self.child(current, sym) else {
                break;
            };
            current = edge.target();
            out.push(current);
        }
        out
    }

    /// Ensures that `symbol` is part of the alphabet and that every node can store a successor for it.
    pub fn add_alphabet_symbol(&mut self, symbol: A::Symbol) -> Result<(), IncrementalError> {
        if !self.alphabet.contains(symbol) {
            self.alphabet.add_symbol(symbol)?;
        }

        let new_size = self.alphabet.size();
        // the alphabet may have grown through another handle, compare sizes
        if self.alphabet_size < new_size {
            debug!(
                "alphabet grew from {} to {new_size} symbols with {}",
                self.alphabet_size,
                symbol.show()
            );
            if let Some(root) = self.root {
                self.ensure_input_capacity(root, new_size);
            }
            self.alphabet_size = new_size;
        }
        Ok(())
    }

    fn ensure_input_capacity(&mut self, root: NodeId, size: usize) {
        let mut worklist = vec![root];
        while let Some(id) = worklist.pop() {
            let node = self.node_mut(id);
            node.ensure_input_capacity(size);
            debug_assert!(node.is_leaf() || node.capacity() >= size);
            worklist.extend(node.children().map(|(_, e)| e.target()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::PrefixTree;
    use crate::prelude::*;

    #[test_log::test]
    fn walk_and_grow() {
        let alphabet = GrowingAlphabet::from_alphabet(&CharAlphabet::of_size(2));
        let mut tree: PrefixTree<_, u8, Void> = PrefixTree::with_root(alphabet, 0);
        let root = tree.root().unwrap();
        let a = tree.add_child(root, 0, 1, Void);
        let ab = tree.add_child(a, 1, 2, Void);
        assert_eq!(tree.walk("ab".chars()), vec![root, a, ab]);
        assert_eq!(tree.walk("ba".chars()), vec![root]);
        assert_eq!(tree.walk("aza".chars()), vec![root, a]);
        assert_eq!(tree.node(a).capacity(), 2);
        assert!(tree.node(ab).is_leaf());

        tree.add_alphabet_symbol('c').unwrap();
        tree.add_alphabet_symbol('c').unwrap();
        assert_eq!(tree.alphabet_size(), 3);
        assert_eq!(tree.node(root).capacity(), 3);
        assert_eq!(tree.node(a).capacity(), 3);
        assert!(tree.node(ab).is_leaf());

        let abc = tree.add_child(ab, 2, 3, Void);
        assert_eq!(tree.walk("abc".chars()), vec![root, a, ab, abc]);
        assert_eq!(tree.node(ab).capacity(), 3);
        assert_eq!(tree.size(), 4);
    }

    #[test_log::test]
    fn detaching_subtrees() {
        let mut tree: PrefixTree<_, u8, Void> = PrefixTree::with_root(CharAlphabet::of_size(2), 0);
        let root = tree.root().unwrap();
        let a = tree.add_child(root, 0, 1, Void);
        let b = tree.add_child(root, 1, 2, Void);
        let ab = tree.add_child(a, 1, 3, Void);
        let aa = tree.add_child(a, 0, 4, Void);
        let aab = tree.add_child(aa, 1, 5, Void);
        assert_eq!(tree.size(), 6);

        assert_eq!(tree.detach_child(root, 0), vec![a, aa, ab, aab]);
        assert_eq!(tree.size(), 2);
        assert_eq!(tree.walk("ab".chars()), vec![root]);
        assert!(tree.detach_child(root, 0).is_empty());

        let c = tree.add_child(root, 0, 6, Void);
        assert_eq!(tree.walk("a".chars()), vec![root, c]);
        assert_eq!(tree.detach_children(root), vec![c, b]);
        assert_eq!(tree.size(), 1);
    }

    #[test]
    fn unknown_symbols() {
        let tree: PrefixTree<_, u8, Void> = PrefixTree::new(CharAlphabet::of_size(2));
        assert_eq!(tree.indices(&['a', 'b', 'a']), Ok(vec![0, 1, 0]));
        assert_eq!(
            tree.indices(&['a', 'x']),
            Err(IncrementalError::UnknownSymbol("x".into()))
        );
        assert!(tree.walk("ab".chars()).is_empty());
    }
}
