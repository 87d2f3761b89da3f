use itertools::Itertools;
use tracing::{debug, trace};

use crate::{
    alphabet::{Alphabet, CharAlphabet},
    math::{Bijection, Map},
    transition_system::TransitionSystem,
    Color, Show, Void,
};

use super::{
    mealy::{lookup_outputs, separate_outputs},
    GraphView, IncrementalBuilder, IncrementalError, NodeId, PrefixTree, TreeView,
};

/// Incrementally builds a tree-shaped Mealy machine for a system whose behaviour may change over
/// time. Unlike [`super::IncrementalMealyTreeBuilder`], an observation that contradicts the stored
/// outputs is not rejected: it replaces the contradicting edge together with everything below it.
///
/// The builder remembers the queries that led to the nodes of the tree together with the order in
/// which they were inserted, so that the least recently confirmed query can be asked again, see
/// [`AdaptiveMealyTreeBuilder::oldest_query`].
#[derive(Debug, Clone)]
pub struct AdaptiveMealyTreeBuilder<A: Alphabet = CharAlphabet, O = char> {
    tree: PrefixTree<A, Void, O>,
    root: NodeId,
    queries: Map<NodeId, Vec<A::Symbol>>,
    ages: Bijection<usize, NodeId>,
    counter: usize,
}

impl<A: Alphabet, O: Color> AdaptiveMealyTreeBuilder<A, O> {
    /// Creates a builder over the given alphabet whose tree consists of the root only.
    pub fn new(alphabet: A) -> Self {
        let mut tree = PrefixTree::new(alphabet);
        let root = tree.add_root(Void);
        Self {
            tree,
            root,
            queries: Map::default(),
            ages: Bijection::new(),
            counter: 0,
        }
    }

    /// Stores the observation that reading `word` produces `outputs`, which must have the same length
    /// as `word`. Where the observation disagrees with a stored output, the stored edge and its
    /// subtree are dropped along with the queries that ended in it. Returns whether anything was
    /// overwritten.
    ///
    /// The query is recorded as the most recent one, replacing an earlier query for the same word.
    pub fn insert<W, X>(&mut self, word: W, outputs: X) -> Result<bool, IncrementalError>
    where
        W: IntoIterator<Item = A::Symbol>,
        X: IntoIterator<Item = O>,
    {
        let word = word.into_iter().collect_vec();
        let outputs = outputs.into_iter().collect_vec();
        if outputs.len() != word.len() {
            return Err(IncrementalError::OutputLength {
                expected: word.len(),
                found: outputs.len(),
            });
        }
        let indices = self.tree.indices(&word)?;

        let mut overwritten = false;
        let mut current = self.root;
        for (idx, output) in indices.into_iter().zip(outputs) {
            let existing = self
                .tree
                .node(current)
                .child(idx)
                .map(|e| (e.target(), e.color() == &output));
            current = match existing {
                Some((target, true)) => target,
                Some((_, false)) => {
                    overwritten = true;
                    self.forget(current, idx);
                    self.tree.add_child(current, idx, Void, output)
                }
                None => self.tree.add_child(current, idx, Void, output),
            };
        }

        self.ages.remove_by_right(&current);
        let _ = self.ages.insert(self.counter, current);
        self.counter += 1;
        trace!("inserted {}", A::Symbol::show_collection(&word));
        self.queries.insert(current, word);
        Ok(overwritten)
    }

    fn forget(&mut self, parent: NodeId, idx: usize) {
        let removed = self.tree.detach_child(parent, idx);
        debug!("overwriting {} nodes below {}", removed.len(), parent.show());
        for id in removed {
            self.queries.remove(&id);
            self.ages.remove_by_right(&id);
        }
    }

    /// Returns the query that has gone the longest without being inserted again, or `None` if no
    /// query is stored. Queries that were overwritten by a later observation are forgotten.
    pub fn oldest_query(&self) -> Option<&[A::Symbol]> {
        let (_, node) = self.ages.iter().next()?;
        self.queries.get(node).map(|word| word.as_slice())
    }

    /// Returns the outputs produced along `word` for as long as the tree defines them.
    pub fn lookup<W>(&self, word: W) -> Vec<O>
    where
        W: IntoIterator<Item = A::Symbol>,
    {
        let mut out = vec![];
        self.lookup_into(word, &mut out);
        out
    }

    /// Appends the outputs produced along `word` to `out` and returns whether the whole word could be
    /// read.
    pub fn lookup_into<W>(&self, word: W, out: &mut Vec<O>) -> bool
    where
        W: IntoIterator<Item = A::Symbol>,
    {
        lookup_outputs(&self.tree, self.root, word, out)
    }

    /// Searches for a word on which the Mealy machine `hypothesis` produces an output different from the
    /// current observations, with the same treatment of missing transitions as
    /// [`super::IncrementalMealyTreeBuilder::find_separating_word`].
    pub fn find_separating_word<H, I>(
        &self,
        hypothesis: &H,
        inputs: I,
        omit_undefined: bool,
    ) -> Option<Vec<A::Symbol>>
    where
        H: TransitionSystem<Symbol = A::Symbol, EdgeColor = O>,
        I: IntoIterator<Item = A::Symbol>,
        I::IntoIter: Clone,
    {
        separate_outputs(&self.tree, self.root, hypothesis, inputs, omit_undefined)
    }

    /// Returns a read-only view of the tree as a [`TransitionSystem`].
    pub fn as_transition_system(&self) -> TreeView<'_, A, Void, O> {
        TreeView::new(&self.tree)
    }

    /// Returns a read-only view of the tree as a graph.
    pub fn as_graph(&self) -> GraphView<'_, A, Void, O> {
        GraphView::new(&self.tree)
    }
}

impl<A: Alphabet, O: Color> IncrementalBuilder for AdaptiveMealyTreeBuilder<A, O> {
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
        let word = word.into_iter().collect_vec();
        self.tree.walk(word.iter().copied()).len() == word.len() + 1
    }

    fn add_alphabet_symbol(&mut self, symbol: A::Symbol) -> Result<(), IncrementalError> {
        self.tree.add_alphabet_symbol(symbol)
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn filled() -> AdaptiveMealyTreeBuilder {
        let mut builder = AdaptiveMealyTreeBuilder::new(CharAlphabet::of_size(3));
        builder.insert(chars("abc"), chars("xyz")).unwrap();
        builder.insert(chars("ac"), chars("xw")).unwrap();
        builder.insert(chars("acb"), chars("xwu")).unwrap();
        builder
    }

    #[test_log::test]
    fn lookup_after_inserts() {
        let mut builder = filled();
        assert_eq!(builder.size(), 6);
        assert!(builder.has_definitive_information(chars("ab")));
        assert!(!builder.has_definitive_information(chars("abca")));
        assert_eq!(builder.lookup(chars("abc")), chars("xyz"));
        assert_eq!(builder.lookup(chars("acb")), chars("xwu"));

        assert_eq!(builder.insert(chars("abc"), chars("xyz")), Ok(false));
        assert_eq!(builder.size(), 6);

        let mut out = vec![];
        assert!(!builder.lookup_into(chars("aababaa"), &mut out));
        assert_eq!(out, chars("x"));
    }

    #[test_log::test]
    fn contradicting_outputs_overwrite() {
        let mut builder = filled();
        assert_eq!(builder.insert(chars("ab"), chars("xv")), Ok(true));
        assert_eq!(builder.lookup(chars("abc")), chars("xv"));
        assert!(!builder.has_definitive_information(chars("abc")));
        assert_eq!(builder.lookup(chars("acb")), chars("xwu"));
        assert_eq!(builder.size(), 5);

        assert_eq!(builder.insert(chars("c"), chars("q")), Ok(false));
        assert_eq!(builder.insert(chars("cc"), chars("rr")), Ok(true));
        assert_eq!(builder.lookup(chars("cc")), chars("rr"));
        assert_eq!(builder.size(), 7);

        assert_eq!(
            builder.insert(chars("ab"), chars("x")),
            Err(IncrementalError::OutputLength {
                expected: 2,
                found: 1
            })
        );
        assert_eq!(
            builder.insert(chars("az"), chars("xy")),
            Err(IncrementalError::UnknownSymbol("z".into()))
        );
    }

    #[test_log::test]
    fn ages() {
        let mut builder = AdaptiveMealyTreeBuilder::new(CharAlphabet::of_size(3));
        assert_eq!(builder.oldest_query(), None);

        assert_eq!(builder.insert(chars("ac"), chars("xy")), Ok(false));
        assert_eq!(builder.insert(chars("abc"), chars("xwu")), Ok(false));
        assert_eq!(builder.insert(chars("abc"), chars("xyz")), Ok(true));
        assert_eq!(builder.insert(chars("ac"), chars("xw")), Ok(true));
        assert_eq!(builder.insert(chars("acb"), chars("xwu")), Ok(false));
        assert_eq!(builder.oldest_query(), Some(chars("abc").as_slice()));

        builder.insert(chars("abc"), chars("xyz")).unwrap();
        assert_eq!(builder.oldest_query(), Some(chars("ac").as_slice()));
        builder.insert(chars("ac"), chars("xw")).unwrap();
        assert_eq!(builder.oldest_query(), Some(chars("acb").as_slice()));
        builder.insert(chars("acb"), chars("xwu")).unwrap();
        assert_eq!(builder.oldest_query(), Some(chars("abc").as_slice()));
    }

    #[test_log::test]
    fn separating_words() {
        let builder = filled();
        let inputs = CharAlphabet::of_size(3);

        let mut hyp: HashTs<char, Void, char> = HashTs::new();
        assert_eq!(builder.find_separating_word(&hyp, inputs.universe(), true), None);
        assert_eq!(
            builder.find_separating_word(&hyp, inputs.universe(), false),
            Some(chars("a"))
        );

        let s0 = hyp.add_initial_state(Void);
        let s1 = hyp.add_state(Void);
        let s2 = hyp.add_state(Void);
        let s3 = hyp.add_state(Void);
        let s4 = hyp.add_state(Void);
        let s5 = hyp.add_state(Void);
        hyp.add_edge(s0, 'a', s1, 'x');
        hyp.add_edge(s1, 'b', s2, 'y');
        hyp.add_edge(s2, 'c', s3, 'z');
        hyp.add_edge(s1, 'c', s4, 'w');

        assert_eq!(builder.find_separating_word(&hyp, inputs.universe(), true), None);
        assert_eq!(
            builder.find_separating_word(&hyp, inputs.universe(), false),
            Some(chars("acb"))
        );

        hyp.add_edge(s4, 'b', s5, 'u');
        assert_eq!(builder.find_separating_word(&hyp, inputs.universe(), false), None);

        hyp.add_edge(s4, 'b', s5, 'w');
        assert_eq!(
            builder.find_separating_word(&hyp, inputs.universe(), true),
            Some(chars("acb"))
        );
    }

    #[test]
    fn separating_word_of_length_one() {
        let mut builder = AdaptiveMealyTreeBuilder::new(CharAlphabet::of_size(3));
        builder.insert(chars("a"), chars("x")).unwrap();

        let mut hyp: HashTs<char, Void, char> = HashTs::new();
        let q0 = hyp.add_initial_state(Void);
        let q1 = hyp.add_state(Void);
        hyp.add_edge(q0, 'a', q1, 'y');

        assert_eq!(
            builder.find_separating_word(&hyp, ['a', 'b', 'c'], false),
            Some(chars("a"))
        );
    }

    #[test_log::test]
    fn growing_alphabet() {
        let alphabet = GrowingAlphabet::from_alphabet(&CharAlphabet::of_size(2));
        let mut builder: AdaptiveMealyTreeBuilder<_, u32> = AdaptiveMealyTreeBuilder::new(alphabet);
        builder.insert(chars("ab"), vec![1, 2]).unwrap();
        builder.add_alphabet_symbol('c').unwrap();
        assert_eq!(builder.insert(chars("ac"), vec![1, 3]), Ok(false));
        assert_eq!(builder.insert(chars("c"), vec![5]), Ok(false));
        assert_eq!(builder.insert(chars("ac"), vec![2, 3]), Ok(true));
        assert_eq!(builder.lookup(chars("ab")), vec![2]);
        assert_eq!(builder.oldest_query(), Some(chars("c").as_slice()));
        assert_eq!(builder.size(), 4);
    }

    #[test]
    fn views() {
        let mut builder = filled();
        builder.insert(chars("ac"), chars("xv")).unwrap();
        let ts = builder.as_transition_system();
        assert_eq!(ts.trace_edge_colors(chars("ac")), Some(chars("xv")));
        assert_eq!(ts.trace_edge_colors(chars("acb")), None);

        let graph = builder.as_graph();
        assert_eq!(graph.size(), 5);
        assert_eq!(graph.nodes().len(), 5);
    }
}
