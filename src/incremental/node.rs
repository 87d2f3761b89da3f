use crate::Show;

/// Refers to a node of the tree kept by an incremental builder. Nodes stay in the arena even when
/// their subtree is cut off, so an id stays valid for as long as the builder it was obtained from
/// exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Returns the position of the node in the order of creation.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl Show for NodeId {
    fn show(&self) -> String {
        format!("n{}", self.0)
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// An edge of the tree, leading to `target` and carrying a color. Only the Mealy builder stores
/// something meaningful here, the other builders use [`crate::Void`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Edge<C> {
    target: NodeId,
    color: C,
}

impl<C> Edge<C> {
    pub(crate) fn new(target: NodeId, color: C) -> Self {
        Self { target, color }
    }

    /// The node that this edge leads to.
    pub fn target(&self) -> NodeId {
        self.target
    }

    /// The color of this edge.
    pub fn color(&self) -> &C {
        &self.color
    }
}

/// A node of the tree. It owns a state color `Q` and a lazily allocated array of outgoing edges that is
/// indexed by the alphabet index of the symbol labelling the edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node<Q, C> {
    color: Q,
    children: Option<Vec<Option<Edge<C>>>>,
}

impl<Q, C> Node<Q, C> {
    pub(crate) fn new(color: Q) -> Self {
        Self {
            color,
            children: None,
        }
    }

    /// The color stored in this node.
    pub fn color(&self) -> &Q {
        &self.color
    }

    pub(crate) fn set_color(&mut self, color: Q) {
        self.color = color;
    }

    /// Returns the edge for the symbol with index `idx`, or `None` if there is none. This is also the
    /// case if `idx` exceeds the number of slots allocated so far.
    pub fn child(&self, idx: usize) -> Option<&Edge<C>> {
        self.children.as_ref()?.get(idx)?.as_ref()
    }

    /// Iterates over all outgoing edges together with the index of the symbol they are labelled with.
    pub fn children(&self) -> impl Iterator<Item = (usize, &Edge<C>)> + '_ {
        self.children
            .iter()
            .flatten()
            .enumerate()
            .filter_map(|(i, e)| e.as_ref().map(|e| (i, e)))
    }

    /// Returns true if no slots have been allocated yet.
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Stores `edge` in the slot for index `idx`. The slots are allocated on first use with room for
    /// `alphabet_size` symbols. Callers only ever fill empty slots.
    pub(crate) fn set_child(&mut self, idx: usize, alphabet_size: usize, edge: Edge<C>) {
        let children = self
            .children
            .get_or_insert_with(|| std::iter::repeat_with(|| None).take(alphabet_size).collect());
        if idx >= children.len() {
            children.resize_with(idx + 1, || None);
        }
        debug_assert!(children[idx].is_none(), "child slot {idx} is occupied");
        children[idx] = Some(edge);
    }

    /// Empties the slot for index `idx` and returns the edge it held.
    pub(crate) fn take_child(&mut self, idx: usize) -> Option<Edge<C>> {
        self.children.as_mut()?.get_mut(idx)?.take()
    }

    /// Widens the allocated slots such that `size` symbols fit, keeping existing edges. Nodes that have
    /// not allocated their slots yet are left untouched, they allocate with the right size later.
    pub(crate) fn ensure_input_capacity(&mut self, size: usize) {
        if let Some(children) = self.children.as_mut() {
            if children.len() < size {
                children.resize_with(size, || None);
            }
        }
    }

    /// Number of allocated child slots.
    pub(crate) fn capacity(&self) -> usize {
        self.children.as_ref().map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::{Edge, Node, NodeId};
    use crate::Void;

    #[test]
    fn child_storage() {
        let mut node: Node<char, Void> = Node::new('x');
        assert!(node.is_leaf());
        assert_eq!(node.child(0), None);
        assert_eq!(node.child(17), None);

        node.ensure_input_capacity(5);
        assert!(node.is_leaf());
        assert_eq!(node.capacity(), 0);

        node.set_child(1, 3, Edge::new(NodeId(4), Void));
        assert_eq!(node.capacity(), 3);
        assert_eq!(node.child(1).map(Edge::target), Some(NodeId(4)));
        assert_eq!(node.child(0), None);
        assert_eq!(node.child(3), None);

        node.ensure_input_capacity(5);
        assert_eq!(node.capacity(), 5);
        assert_eq!(node.child(1).map(Edge::target), Some(NodeId(4)));
        node.set_child(4, 5, Edge::new(NodeId(7), Void));
        assert_eq!(
            node.children().map(|(i, e)| (i, e.target())).collect::<Vec<_>>(),
            vec![(1, NodeId(4)), (4, NodeId(7))]
        );

        node.ensure_input_capacity(2);
        assert_eq!(node.capacity(), 5);

        assert_eq!(node.take_child(1).map(|e| e.target()), Some(NodeId(4)));
        assert_eq!(node.take_child(1), None);
        assert_eq!(node.take_child(9), None);
        assert_eq!(node.children().count(), 1);
    }
}
