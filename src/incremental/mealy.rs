use itertools::Itertools;
use tracing::{debug, trace};

use crate::{
    alphabet::{Alphabet, CharAlphabet},
    transition_system::TransitionSystem,
    Color, Show, Void,
};

use super::{
    separating::{self, Step},
    GraphView, IncrementalBuilder, IncrementalError, NodeId, PrefixTree, TreeView,
};

/// Incrementally builds a tree-shaped Mealy machine. Outputs are stored on the edges of the tree, so
/// an observation consists of a word together with exactly one output per symbol. The root always
/// exists and carries no information.
#[derive(Debug, Clone)]
pub struct IncrementalMealyTreeBuilder<A: Alphabet = CharAlphabet, O = char> {
    tree: PrefixTree<A, Void, O>,
    root: NodeId,
}

impl<A: Alphabet, O: Color> IncrementalMealyTreeBuilder<A, O> {
    /// Creates a builder over the given alphabet whose tree consists of the root only.
    pub fn new(alphabet: A) -> Self {
        let mut tree = PrefixTree::new(alphabet);
        let root = tree.add_root(Void);
        Self { tree, root }
    }

    /// Stores the observation that reading `word` produces `outputs`, which must have the same length as
    /// `word`. Outputs of edges that exist already are compared against the observation, the first
    /// mismatch is reported as [`IncrementalError::Conflict`].
    pub fn insert<W, X>(&mut self, word: W, outputs: X) -> Result<(), IncrementalError>
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

        let mut current = self.root;
        for (position, (idx, output)) in indices.into_iter().zip(outputs).enumerate() {
            let existing = self
                .tree
                .node(current)
                .child(idx)
                .map(|e| (e.target(), e.color().clone()));
            current = match existing {
                Some((_, stored)) if stored != output => {
                    debug!(
                        "conflicting output for {} at position {}",
                        A::Symbol::show_collection(&word),
                        position + 1
                    );
                    let err = IncrementalError::conflict(&word, position + 1, &stored, &output);
                    return Err(err);
                }
                Some((target, _)) => target,
                None => self.tree.add_child(current, idx, Void, output),
            };
        }
        trace!("inserted {}", A::Symbol::show_collection(&word));
        Ok(())
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
    /// read. Stops at the first symbol for which the tree has no edge.
    pub fn lookup_into<W>(&self, word: W, out: &mut Vec<O>) -> bool
    where
        W: IntoIterator<Item = A::Symbol>,
    {
        lookup_outputs(&self.tree, self.root, word, out)
    }

    /// Searches for a word on which the Mealy machine `hypothesis` produces an output different from the
    /// observed one. Transitions that are missing in the hypothesis separate, unless `omit_undefined`
    /// is set, in which case they are skipped together with everything below them.
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

    /// Returns a read-only view of the tree as a [`TransitionSystem`] whose edges are colored with
    /// the observed outputs.
    pub fn as_transition_system(&self) -> TreeView<'_, A, Void, O> {
        TreeView::new(&self.tree)
    }

    /// Returns a read-only view of the tree as a graph.
    pub fn as_graph(&self) -> GraphView<'_, A, Void, O> {
        GraphView::new(&self.tree)
    }
}

/// Follows `word` from `root`, pushing the output of every edge taken onto `out`.
pub(crate) fn lookup_outputs<A, O, W>(
    tree: &PrefixTree<A, Void, O>,
    root: NodeId,
    word: W,
    out: &mut Vec<O>,
) -> bool
where
    A: Alphabet,
    O: Color,
    W: IntoIterator<Item = A::Symbol>,
{
    let mut current = root;
    for sym in word {
        let Some(edge) = tree.child(current, sym) else {
            return false;
        };
        out.push(edge.color().clone());
        current = edge.target();
    }
    true
}

/// Separating-word search for trees that store outputs on their edges.
pub(crate) fn separate_outputs<A, O, H, I>(
    tree: &PrefixTree<A, Void, O>,
    root: NodeId,
    hypothesis: &H,
    inputs: I,
    omit_undefined: bool,
) -> Option<Vec<A::Symbol>>
where
    A: Alphabet,
    O: Color,
    H: TransitionSystem<Symbol = A::Symbol, EdgeColor = O>,
    I: IntoIterator<Item = A::Symbol>,
    I::IntoIter: Clone,
{
    separating::find_separating_word(
        tree,
        root,
        hypothesis.initial(),
        inputs.into_iter(),
        |state, sym, _, edge| match state.and_then(|q| hypothesis.transition(q, sym)) {
            None if omit_undefined => Step::Skip,
            Some((q, output)) if &output == edge.color() => Step::Descend(Some(q)),
            _ => Step::Diverge,
        },
    )
}

impl<A: Alphabet, O: Color> IncrementalBuilder for IncrementalMealyTreeBuilder<A, O> {
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
