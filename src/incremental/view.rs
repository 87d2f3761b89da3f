use crate::{alphabet::Alphabet, transition_system::TransitionSystem};

use super::{NodeId, PrefixTree};

/// A read-only view of the tree of an incremental builder as a [`TransitionSystem`]. The root is the
/// initial state, transitions follow the edges of the tree and the colors are those stored in the
/// tree. This makes all generic methods of [`TransitionSystem`] available for exploring the tree, for
/// example [`TransitionSystem::trace_state_colors`].
#[derive(Debug)]
pub struct TreeView<'a, A: Alphabet, Q, C> {
    tree: &'a PrefixTree<A, Q, C>,
}

impl<'a, A: Alphabet, Q, C> Clone for TreeView<'a, A, Q, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, A: Alphabet, Q, C> Copy for TreeView<'a, A, Q, C> {}

impl<'a, A: Alphabet, Q, C> TreeView<'a, A, Q, C> {
    pub(crate) fn new(tree: &'a PrefixTree<A, Q, C>) -> Self {
        Self { tree }
    }
}

impl<'a, A: Alphabet, Q: Clone, C: Clone> TransitionSystem for TreeView<'a, A, Q, C> {
    type Symbol = A::Symbol;
    type StateIndex = NodeId;
    type StateColor = Q;
    type EdgeColor = C;

    fn initial(&self) -> Option<NodeId> {
        self.tree.root()
    }

    fn transition(&self, state: NodeId, symbol: A::Symbol) -> Option<(NodeId, C)> {
        let node = self.tree.get(state)?;
        let idx = self.tree.alphabet().symbol_index(symbol)?;
        node.child(idx).map(|e| (e.target(), e.color().clone()))
    }

    fn state_color(&self, state: NodeId) -> Option<Q> {
        self.tree.get(state).map(|node| node.color().clone())
    }
}

/// An edge of a [`GraphView`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphEdge<'a, S, C> {
    /// The node that the edge leaves.
    pub source: NodeId,
    /// The symbol that the edge is labelled with.
    pub symbol: S,
    /// The color of the edge.
    pub color: &'a C,
    /// The node that the edge leads to.
    pub target: NodeId,
}

/// A read-only view of the tree of an incremental builder as a directed graph with labelled edges. This
/// is used for exporting the tree, see [`crate::dot::Dottable`].
#[derive(Debug)]
pub struct GraphView<'a, A: Alphabet, Q, C> {
    tree: &'a PrefixTree<A, Q, C>,
}

impl<'a, A: Alphabet, Q, C> Clone for GraphView<'a, A, Q, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, A: Alphabet, Q, C> Copy for GraphView<'a, A, Q, C> {}

impl<'a, A: Alphabet, Q, C> GraphView<'a, A, Q, C> {
    pub(crate) fn new(tree: &'a PrefixTree<A, Q, C>) -> Self {
        Self { tree }
    }

    /// The root of the tree, if it exists already.
    pub fn initial_node(&self) -> Option<NodeId> {
        self.tree.root()
    }

    /// Number of nodes in the graph.
    pub fn size(&self) -> usize {
        self.tree.size()
    }

    /// Returns the color of the given node.
    pub fn node_color(&self, node: NodeId) -> Option<&'a Q> {
        self.tree.get(node).map(|n| n.color())
    }

    /// Lists all nodes in depth-first order, starting from the root. On every level, the children are
    /// visited in the order of the alphabet.
    pub fn nodes(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.size());
        let mut stack: Vec<NodeId> = self.tree.root().into_iter().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            let children: Vec<NodeId> = self
                .tree
                .node(id)
                .children()
                .map(|(_, e)| e.target())
                .collect();
            stack.extend(children.into_iter().rev());
        }
        out
    }

    /// Lists the edges leaving `node`, ordered by the index of their symbol.
    pub fn outgoing_edges(&self, node: NodeId) -> Vec<GraphEdge<'a, A::Symbol, C>> {
        let tree = self.tree;
        let Some(n) = tree.get(node) else {
            return vec![];
        };
        n.children()
            .filter_map(|(idx, e)| {
                Some(GraphEdge {
                    source: node,
                    symbol: tree.alphabet().symbol(idx)?,
                    color: e.color(),
                    target: e.target(),
                })
            })
            .collect()
    }
}
