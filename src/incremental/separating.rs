use tracing::{debug, trace};

use crate::{alphabet::Alphabet, Show};

use super::{Edge, Node, NodeId, PrefixTree};

/// Decides how the search proceeds after reading a symbol for which the tree has information.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step<S> {
    /// Nothing to compare, continue with the next symbol at the same depth.
    Skip,
    /// The hypothesis disagrees with the tree on the word read so far.
    Diverge,
    /// Both agree, descend with the given hypothesis state (which may be absent).
    Descend(Option<S>),
}

/// One level of the depth-first search: the hypothesis state (absent if the hypothesis is undefined
/// on the word read so far), the tree node, the symbol by which the level was entered and the remaining
/// symbols that are still to be explored on this level.
struct Frame<S, Sym, I> {
    state: Option<S>,
    node: NodeId,
    incoming: Option<Sym>,
    remaining: I,
}

/// Explores the tree and a hypothesis simultaneously in a depth-first manner, trying the symbols of
/// `inputs` in order on every level. The comparison of a single transition is delegated to `step`,
/// which obtains the current hypothesis state, the symbol, the reached tree node and the tree edge
/// that was taken. As soon as `step` reports a divergence, the word leading there is returned.
///
/// The search is iterative, its stack has one frame per level and each frame holds its own copy of
/// the `inputs` iterator. Returns `None` if the whole tree was explored without divergence.
pub(crate) fn find_separating_word<A, Q, C, S, I, F>(
    tree: &PrefixTree<A, Q, C>,
    root: NodeId,
    initial: Option<S>,
    inputs: I,
    mut step: F,
) -> Option<Vec<A::Symbol>>
where
    A: Alphabet,
    S: Copy,
    I: Iterator<Item = A::Symbol> + Clone,
    F: FnMut(Option<S>, A::Symbol, &Node<Q, C>, &Edge<C>) -> Step<S>,
{
    let mut stack = vec![Frame {
        state: initial,
        node: root,
        incoming: None,
        remaining: inputs.clone(),
    }];

    while let Some(frame) = stack.last_mut() {
        let Some(sym) = frame.remaining.next() else {
            stack.pop();
            continue;
        };
        let (state, node) = (frame.state, frame.node);

        let Some(edge) = tree.child(node, sym) else {
            continue;
        };
        let target = edge.target();

        match step(state, sym, tree.node(target), edge) {
            Step::Skip => {
                trace!("skipping {} at depth {}", sym.show(), stack.len());
            }
            Step::Diverge => {
                let word = reconstruct(stack, sym);
                debug!("found separating word {}", A::Symbol::show_collection(&word));
                return Some(word);
            }
            Step::Descend(successor) => stack.push(Frame {
                state: successor,
                node: target,
                incoming: Some(sym),
                remaining: inputs.clone(),
            }),
        }
    }

    None
}

/// Builds the word that leads to the top of the stack followed by `last`. The symbols are collected
/// back to front while unwinding the stack and reversed once at the end.
fn reconstruct<S, Sym: Copy, I>(mut stack: Vec<Frame<S, Sym, I>>, last: Sym) -> Vec<Sym> {
    let mut word = Vec::with_capacity(stack.len());
    word.push(last);
    while let Some(frame) = stack.pop() {
        word.extend(frame.incoming);
    }
    word.reverse();
    word
}

#[cfg(test)]
mod tests {
    use super::{find_separating_word, reconstruct, Frame, Step};
    use crate::{
        incremental::{NodeId, PrefixTree},
        prelude::*,
    };

    fn frame(incoming: Option<char>) -> Frame<usize, char, std::vec::IntoIter<char>> {
        Frame {
            state: None,
            node: NodeId(0),
            incoming,
            remaining: vec![].into_iter(),
        }
    }

    #[test]
    fn reconstruction_order() {
        let stack = vec![frame(None), frame(Some('a')), frame(Some('c'))];
        assert_eq!(reconstruct(stack, 'b'), vec!['a', 'c', 'b']);
        assert_eq!(reconstruct(vec![frame(None)], 'x'), vec!['x']);
    }

    #[test_log::test]
    fn explores_depth_first_in_input_order() {
        let mut tree: PrefixTree<_, u8, Void> = PrefixTree::with_root(CharAlphabet::of_size(2), 0);
        let root = tree.root().unwrap();
        let b = tree.add_child(root, 1, 1, Void);
        let a = tree.add_child(root, 0, 2, Void);
        tree.add_child(a, 1, 3, Void);
        tree.add_child(b, 0, 4, Void);

        let mut visited = vec![];
        let ab = ['a', 'b'].into_iter();
        let out = find_separating_word(&tree, root, Some(0usize), ab.clone(), |q, sym, node, _| {
            visited.push((sym, *node.color()));
            Step::Descend(q)
        });
        assert_eq!(out, None);
        assert_eq!(visited, vec![('a', 2), ('b', 3), ('b', 1), ('a', 4)]);

        let ba = ['b', 'a'].into_iter();
        let out = find_separating_word(&tree, root, Some(0usize), ba, |q, _, node, _| {
            if *node.color() == 3 {
                Step::Diverge
            } else {
                Step::Descend(q)
            }
        });
        assert_eq!(out, Some(vec!['a', 'b']));

        let out = find_separating_word(&tree, root, None::<usize>, ab, |q, _, node, _| {
            if *node.color() == 2 {
                Step::Skip
            } else if *node.color() == 3 {
                Step::Diverge
            } else {
                Step::Descend(q)
            }
        });
        assert_eq!(out, None);
    }
}
