use itertools::Itertools;
use tracing::{debug, trace};

use crate::{
    alphabet::{Alphabet, CharAlphabet},
    transition_system::TransitionSystem,
    Show, Void,
};

use super::{
    separating::{self, Step},
    Acceptance, GraphView, IncrementalBuilder, IncrementalError, NodeId, PrefixTree, TreeView,
};

/// Incrementally builds a (tree-shaped) DFA from accepted and rejected words. Every node of the tree
/// stores an [`Acceptance`]. Nodes that have only been created because they lie on the path to an
/// inserted word are [`Acceptance::Unknown`], the node of an inserted word holds its acceptance.
///
/// # Example
/// ```
/// use automata_incremental::prelude::*;
///
/// let mut builder = IncrementalDfaTreeBuilder::new(CharAlphabet::of_size(2));
/// builder.insert("ab".chars(), true).unwrap();
/// assert_eq!(builder.lookup("ab".chars()), Acceptance::True);
/// assert_eq!(builder.lookup("a".chars()), Acceptance::Unknown);
/// assert!(builder.insert("ab".chars(), false).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct IncrementalDfaTreeBuilder<A: Alphabet = CharAlphabet> {
    tree: PrefixTree<A, Acceptance, Void>,
    root: NodeId,
}

impl<A: Alphabet> IncrementalDfaTreeBuilder<A> {
    /// Creates a new builder over the given alphabet. The tree initially consists of the root only,
    /// which corresponds to the empty word and is [`Acceptance::Unknown`].
    pub fn new(alphabet: A) -> Self {
        let mut tree = PrefixTree::new(alphabet);
        let root = tree.add_root(Acceptance::Unknown);
        Self { tree, root }
    }

    /// Records that `word` is accepted if `accepting` is true and rejected otherwise. All nodes on the
    /// path of `word` that do not exist yet are created as [`Acceptance::Unknown`].
    ///
    /// Fails with [`IncrementalError::UnknownSymbol`] before touching the tree if the word contains a
    /// symbol that is not part of the alphabet. Fails with [`IncrementalError::Conflict`] if the
    /// opposite acceptance has been stored for `word` before, in which case the missing nodes on
    /// the path have already been created.
    pub fn insert<W>(&mut self, word: W, accepting: bool) -> Result<(), IncrementalError>
    where
        W: IntoIterator<Item = A::Symbol>,
    {
        let word = word.into_iter().collect_vec();
        let indices = self.tree.indices(&word)?;

        let mut current = self.root;
        for idx in indices {
            current = match self.tree.node(current).child(idx).map(|e| e.target()) {
                Some(target) => target,
                None => self.tree.add_child(current, idx, Acceptance::Unknown, Void),
            };
        }

        let node = self.tree.node_mut(current);
        let stored = *node.color();
        match stored.merge(accepting) {
            Some(merged) => {
                trace!("storing {} for {}", merged.show(), A::Symbol::show_collection(&word));
                node.set_color(merged);
                Ok(())
            }
            None => {
                debug!(
                    "conflicting acceptance for {}: stored {}",
                    A::Symbol::show_collection(&word),
                    stored.show()
                );
                Err(IncrementalError::conflict(
                    &word,
                    word.len(),
                    &stored,
                    &Acceptance::from(accepting),
                ))
            }
        }
    }

    /// Returns the acceptance stored for `word`. This is [`Acceptance::Unknown`] if the word leaves
    /// the tree or if it only leads to an intermediate node.
    pub fn lookup<W>(&self, word: W) -> Acceptance
    where
        W: IntoIterator<Item = A::Symbol>,
    {
        let mut current = self.root;
        for sym in word {
            match self.tree.child(current, sym) {
                Some(edge) => current = edge.target(),
                None => return Acceptance::Unknown,
            }
        }
        *self.tree.node(current).color()
    }

    /// Looks up every prefix of `word`, starting with the empty word. The result thus has one element
    /// more than `word`, prefixes that leave the tree are [`Acceptance::Unknown`].
    pub fn lookup_prefixes<W>(&self, word: W) -> Vec<Acceptance>
    where
        W: IntoIterator<Item = A::Symbol>,
    {
        let word = word.into_iter().collect_vec();
        let mut out = self
            .tree
            .walk(word.iter().copied())
            .into_iter()
            .map(|id| *self.tree.node(id).color())
            .collect_vec();
        out.resize(word.len() + 1, Acceptance::Unknown);
        out
    }

    /// Searches for a word on which the stored information contradicts the given `hypothesis`, which
    /// is a (possibly partial) DFA whose state colors indicate acceptance. The tree is explored depth
    /// first, on every level the symbols are tried in the order in which `inputs` yields them.
    ///
    /// Words for which the tree holds [`Acceptance::Unknown`] never separate. A word on which the
    /// hypothesis is undefined is treated as rejected by it, unless `omit_undefined` is set, in
    /// which case that word and all its extensions are skipped. The empty word is returned if the
    /// stored acceptance of the empty word differs from that of the initial state of `hypothesis`.
    pub fn find_separating_word<H, I>(
        &self,
        hypothesis: &H,
        inputs: I,
        omit_undefined: bool,
    ) -> Option<Vec<A::Symbol>>
    where
        H: TransitionSystem<Symbol = A::Symbol, StateColor = bool>,
        I: IntoIterator<Item = A::Symbol>,
        I::IntoIter: Clone,
    {
        let initial = hypothesis.initial();
        if initial.is_none() && omit_undefined {
            return None;
        }

        let accepts = |q: Option<H::StateIndex>| {
            q.and_then(|q| hypothesis.state_color(q)).unwrap_or(false)
        };

        let root = self.tree.node(self.root);
        if root.color().conflicts(accepts(initial)) {
            debug!("hypothesis disagrees on the empty word");
            return Some(vec![]);
        }

        separating::find_separating_word(
            &self.tree,
            self.root,
            initial,
            inputs.into_iter(),
            |state, sym, node, _| {
                let successor = state.and_then(|q| hypothesis.successor(q, sym));
                if successor.is_none() && omit_undefined {
                    return Step::Skip;
                }
                if node.color().conflicts(accepts(successor)) {
                    Step::Diverge
                } else {
                    Step::Descend(successor)
                }
            },
        )
    }

    /// Returns a read-only view of the tree as a [`TransitionSystem`] whose states are colored with
    /// their [`Acceptance`].
    pub fn as_transition_system(&self) -> TreeView<'_, A, Acceptance, Void> {
        TreeView::new(&self.tree)
    }

    /// Returns a read-only view of the tree as a graph.
    pub fn as_graph(&self) -> GraphView<'_, A, Acceptance, Void> {
        GraphView::new(&self.tree)
    }
}

impl<A: Alphabet> IncrementalBuilder for IncrementalDfaTreeBuilder<A> {
    type Alphabet = A;

    fn alphabet(&self) -> &A {
        self.tree.alphabet()
    }

    fn size(&self) -> usize {
        self.tree.size()
    }

    fn has_definitive_information<W>(&self, word: W) -> bool
    where
        W: IntoIterator<Item = A::Symbol>,
    {
        !self.lookup(word).is_unknown()
    }

    fn add_alphabet_symbol(&mut self, symbol: A::Symbol) -> Result<(), IncrementalError> {
        self.tree.add_alphabet_symbol(symbol)
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    fn builder() -> IncrementalDfaTreeBuilder {
        let mut builder = IncrementalDfaTreeBuilder::new(CharAlphabet::of_size(3));
        builder.insert("abc".chars(), true).unwrap();
        builder
    }

    #[test_log::test]
    fn insert_and_lookup() {
        let mut builder = builder();
        assert_eq!(builder.size(), 4);
        assert_eq!(builder.lookup("abc".chars()), Acceptance::True);
        assert_eq!(builder.lookup("ab".chars()), Acceptance::Unknown);
        assert_eq!(builder.lookup("ac".chars()), Acceptance::Unknown);
        assert!(!builder.has_definitive_information("".chars()));

        builder.insert("ac".chars(), false).unwrap();
        builder.insert("acb".chars(), true).unwrap();
        builder.insert("".chars(), true).unwrap();
        assert_eq!(builder.size(), 6);

        assert_eq!(builder.lookup("ac".chars()), Acceptance::False);
        assert_eq!(builder.lookup("acb".chars()), Acceptance::True);
        assert_eq!(builder.lookup("".chars()), Acceptance::True);
        assert_eq!(builder.lookup("ab".chars()), Acceptance::Unknown);
        assert_eq!(builder.lookup("abca".chars()), Acceptance::Unknown);
        assert_eq!(builder.lookup("z".chars()), Acceptance::Unknown);
        assert!(builder.has_definitive_information("ac".chars()));
        assert!(!builder.has_definitive_information("ab".chars()));

        assert_eq!(
            builder.lookup_prefixes("acbb".chars()),
            vec![
                Acceptance::True,
                Acceptance::Unknown,
                Acceptance::False,
                Acceptance::True,
                Acceptance::Unknown
            ]
        );
        assert_eq!(builder.lookup_prefixes("".chars()), vec![Acceptance::True]);
    }

    #[test_log::test]
    fn conflicts_are_rejected() {
        let mut builder = builder();
        builder.insert("abc".chars(), true).unwrap();
        assert_eq!(builder.size(), 4);

        let err = builder.insert("abc".chars(), false).unwrap_err();
        assert!(matches!(err, IncrementalError::Conflict { position: 3, .. }));
        assert_eq!(builder.lookup("abc".chars()), Acceptance::True);

        // intermediate nodes can still be decided either way
        builder.insert("ab".chars(), false).unwrap();
        assert_eq!(builder.lookup("ab".chars()), Acceptance::False);
    }

    #[test]
    fn unknown_symbols_leave_tree_untouched() {
        let mut builder = builder();
        assert_eq!(
            builder.insert("abx".chars(), true),
            Err(IncrementalError::UnknownSymbol("x".into()))
        );
        assert_eq!(builder.size(), 4);
        assert_eq!(
            builder.add_alphabet_symbol('x'),
            Err(IncrementalError::Alphabet(AlphabetError::NotGrowable))
        );
        assert_eq!(builder.add_alphabet_symbol('a'), Ok(()));
    }

    #[test_log::test]
    fn separating_words() {
        let mut builder = builder();
        builder.insert("ac".chars(), false).unwrap();
        builder.insert("acb".chars(), true).unwrap();
        builder.insert("".chars(), true).unwrap();

        let mut hyp: HashTs<char, bool> = HashTs::new();
        let s0 = hyp.add_initial_state(true);
        let s1 = hyp.add_state(false);
        let s2 = hyp.add_state(false);
        let s3 = hyp.add_state(true);
        hyp.add_edge(s0, 'a', s1, Void);
        hyp.add_edge(s1, 'b', s2, Void);
        hyp.add_edge(s2, 'c', s3, Void);

        let alphabet = builder.alphabet().clone();
        assert_eq!(builder.find_separating_word(&hyp, alphabet.universe(), true), None);
        assert_eq!(
            builder.find_separating_word(&hyp, alphabet.universe(), false),
            Some("acb".chars().collect())
        );

        hyp.set_state_color(s3, false);
        assert_eq!(
            builder.find_separating_word(&hyp, alphabet.universe(), true),
            Some("abc".chars().collect())
        );

        hyp.set_state_color(s3, true);
        let s4 = hyp.add_state(false);
        let s5 = hyp.add_state(true);
        hyp.add_edge(s1, 'c', s4, Void);
        hyp.add_edge(s4, 'b', s5, Void);
        assert_eq!(builder.find_separating_word(&hyp, alphabet.universe(), true), None);
        assert_eq!(builder.find_separating_word(&hyp, alphabet.universe(), false), None);

        // nodes without information never separate
        hyp.set_state_color(s1, true);
        hyp.set_state_color(s2, true);
        assert_eq!(builder.find_separating_word(&hyp, alphabet.universe(), true), None);
        assert_eq!(builder.find_separating_word(&hyp, alphabet.universe(), false), None);

        // restricting the inputs restricts the search
        hyp.set_state_color(s3, false);
        assert_eq!(builder.find_separating_word(&hyp, ['a', 'c'], false), None);
        assert_eq!(
            builder.find_separating_word(&hyp, ['a', 'b', 'c'], false),
            Some("abc".chars().collect())
        );
    }

    #[test]
    fn separating_word_of_length_one() {
        let mut builder = IncrementalDfaTreeBuilder::new(CharAlphabet::of_size(2));
        builder.insert("a".chars(), true).unwrap();

        let mut hyp: HashTs<char, bool> = HashTs::new();
        let q0 = hyp.add_initial_state(true);
        let q1 = hyp.add_state(false);
        hyp.add_edge(q0, 'a', q1, Void);

        assert_eq!(
            builder.find_separating_word(&hyp, ['a', 'b'], false),
            Some(vec!['a'])
        );
    }

    #[test]
    fn separating_empty_word() {
        let mut builder = IncrementalDfaTreeBuilder::new(CharAlphabet::of_size(2));
        builder.insert("".chars(), true).unwrap();

        let empty: HashTs<char, bool> = HashTs::new();
        assert_eq!(builder.find_separating_word(&empty, ['a', 'b'], true), None);
        assert_eq!(builder.find_separating_word(&empty, ['a', 'b'], false), Some(vec![]));

        let mut hyp: HashTs<char, bool> = HashTs::new();
        hyp.add_initial_state(false);
        assert_eq!(builder.find_separating_word(&hyp, ['a', 'b'], true), Some(vec![]));
    }

    #[test_log::test]
    fn growing_alphabet() {
        let alphabet = GrowingAlphabet::from_alphabet(&CharAlphabet::of_size(3));
        let mut builder = IncrementalDfaTreeBuilder::new(alphabet);
        builder.insert("ab".chars(), true).unwrap();
        builder.add_alphabet_symbol('d').unwrap();
        builder.add_alphabet_symbol('e').unwrap();
        assert_eq!(builder.alphabet().size(), 5);

        builder.insert("abd".chars(), true).unwrap();
        builder.insert("dc".chars(), false).unwrap();
        builder.insert("ae".chars(), false).unwrap();
        assert_eq!(builder.lookup("ab".chars()), Acceptance::True);
        assert_eq!(builder.lookup("abd".chars()), Acceptance::True);
        assert_eq!(builder.lookup("dc".chars()), Acceptance::False);
        assert_eq!(builder.lookup("ae".chars()), Acceptance::False);
        assert_eq!(builder.lookup("d".chars()), Acceptance::Unknown);
        assert_eq!(builder.size(), 7);

        let mut hyp: HashTs<char, bool> = HashTs::new();
        hyp.add_initial_state(false);
        let alphabet = builder.alphabet().clone();
        assert_eq!(builder.find_separating_word(&hyp, alphabet.universe(), true), None);
        assert_eq!(
            builder.find_separating_word(&hyp, alphabet.universe(), false),
            Some("ab".chars().collect())
        );
    }

    #[test_log::test]
    fn views() {
        let mut builder = builder();
        builder.insert("ac".chars(), false).unwrap();

        let ts = builder.as_transition_system();
        let root = ts.initial().unwrap();
        assert_eq!(ts.state_color(root), Some(Acceptance::Unknown));
        assert_eq!(ts.reached_state_color("ac".chars()), Some(Acceptance::False));
        assert_eq!(ts.reached_state_color("abc".chars()), Some(Acceptance::True));
        assert_eq!(ts.reached_state_color("cc".chars()), None);

        let graph = builder.as_graph();
        assert_eq!(graph.size(), 5);
        assert_eq!(graph.initial_node(), Some(root));
        assert_eq!(graph.nodes().len(), 5);
        assert_eq!(graph.outgoing_edges(root).len(), 1);
    }
}
