use itertools::Itertools;
use tracing::{debug, trace};

use crate::{
    alphabet::{Alphabet, CharAlphabet},
    transition_system::TransitionSystem,
    Color, Show, Void,
};

use super::{
    separating::{self, Step},
    GraphView, IncrementalBuilder, IncrementalError, PrefixTree, TreeView,
};

/// Incrementally builds a tree-shaped Moore machine. Every node of the tree carries an output of type
/// `O`, the output of the root is the output that the system produces on the empty word.
///
/// An observation consists of an input word of length `n` together with the `n + 1` outputs that are
/// produced along the way, the first of which belongs to the empty word. As every node on the path
/// obtains an output, the builder has definitive information on a word precisely if the word is a
/// prefix of some inserted word.
#[derive(Debug, Clone)]
pub struct IncrementalMooreTreeBuilder<A: Alphabet = CharAlphabet, O = char> {
    tree: PrefixTree<A, O, Void>,
}

impl<A: Alphabet, O: Color> IncrementalMooreTreeBuilder<A, O> {
    /// Creates an empty builder over the given alphabet. The root is created by the first insertion.
    pub fn new(alphabet: A) -> Self {
        Self {
            tree: PrefixTree::new(alphabet),
        }
    }

    /// Creates a builder whose root already carries `output`.
    pub fn with_initial_output(alphabet: A, output: O) -> Self {
        Self {
            tree: PrefixTree::with_root(alphabet, output),
        }
    }

    /// Stores the observation that reading `word` produces `outputs`. There must be exactly one output
    /// more than the word has symbols, otherwise [`IncrementalError::OutputLength`] is returned.
    ///
    /// Every output is compared against what the tree already stores for the respective prefix, the
    /// first mismatch yields an [`IncrementalError::Conflict`]. Nodes created for shorter prefixes
    /// before the mismatch was detected are kept.
    pub fn insert<W, X>(&mut self, word: W, outputs: X) -> Result<(), IncrementalError>
    where
        W: IntoIterator<Item = A::Symbol>,
        X: IntoIterator<Item = O>,
    {
        let word = word.into_iter().collect_vec();
        let outputs = outputs.into_iter().collect_vec();
        let expected = word.len() + 1;
        let Some((first, rest)) = outputs.split_first().filter(|_| outputs.len() == expected) else {
            return Err(IncrementalError::OutputLength {
                expected,
                found: outputs.len(),
            });
        };
        let indices = self.tree.indices(&word)?;

        let mut current = match self.tree.root() {
            Some(root) => {
                let stored = self.tree.node(root).color();
                if stored != first {
                    debug!("conflicting output {} for the empty word", first.show());
                    return Err(IncrementalError::conflict(&word, 0, stored, first));
                }
                root
            }
            None => self.tree.add_root(first.clone()),
        };

        for (position, (idx, output)) in indices.into_iter().zip(rest).enumerate() {
            current = match self.tree.node(current).child(idx).map(|e| e.target()) {
                Some(target) => {
                    let stored = self.tree.node(target).color();
                    if stored != output {
                        debug!(
                            "conflicting output for {} at position {}",
                            A::Symbol::show_collection(&word),
                            position + 1
                        );
                        let err = IncrementalError::conflict(&word, position + 1, stored, output);
                        return Err(err);
                    }
                    target
                }
                None => self.tree.add_child(current, idx, output.clone(), Void),
            };
        }
        trace!("inserted {}", A::Symbol::show_collection(&word));
        Ok(())
    }

    /// Returns the outputs along `word` for as long as the tree defines them, starting with the output
    /// of the root. If the full word is known, the result has one element more than the word, see
    /// [`Self::lookup_into`] for telling the two cases apart.
    pub fn lookup<W>(&self, word: W) -> Vec<O>
    where
        W: IntoIterator<Item = A::Symbol>,
    {
        let mut out = vec![];
        self.lookup_into(word, &mut out);
        out
    }

    /// Appends the outputs along `word` to `out`, starting with the output of the root. Stops as soon as
    /// the tree has no successor and returns whether the whole word could be read.
    pub fn lookup_into<W>(&self, word: W, out: &mut Vec<O>) -> bool
    where
        W: IntoIterator<Item = A::Symbol>,
    {
        let Some(mut current) = self.tree.root() else {
            return false;
        };
        out.push(self.tree.node(current).color().clone());

        for sym in word {
            let Some(edge) = self.tree.child(current, sym) else {
                return false;
            };
            current = edge.target();
            out.push(self.tree.node(current).color().clone());
        }
        true
    }

    /// Searches for a word on which the given Moore machine `hypothesis` produces an output different
    /// from the one that has been observed. The tree is explored depth first, on every level the
    /// symbols are tried in the order in which `inputs` yields them.
    ///
    /// A word that is present in the tree but undefined in the hypothesis is a separating word, unless
    /// `omit_undefined` is set, in which case it is skipped together with all its extensions. If
    /// exactly one of the tree and the hypothesis is empty, the empty word is returned (or nothing if
    /// `omit_undefined` is set). Two empty machines are never separated.
    pub fn find_separating_word<H, I>(
        &self,
        hypothesis: &H,
        inputs: I,
        omit_undefined: bool,
    ) -> Option<Vec<A::Symbol>>
    where
        H: TransitionSystem<Symbol = A::Symbol, StateColor = O>,
        I: IntoIterator<Item = A::Symbol>,
        I::IntoIter: Clone,
    {
        let (root, initial) = match (self.tree.root(), hypothesis.initial()) {
            (Some(root), Some(initial)) => (root, initial),
            (None, None) => return None,
            _ => return (!omit_undefined).then(Vec::new),
        };

        if hypothesis.state_color(initial).as_ref() != Some(self.tree.node(root).color()) {
            debug!("hypothesis disagrees on the empty word");
            return Some(vec![]);
        }

        separating::find_separating_word(
            &self.tree,
            root,
            Some(initial),
            inputs.into_iter(),
            |state, sym, node, _| match state.and_then(|q| hypothesis.successor(q, sym)) {
                None if omit_undefined => Step::Skip,
                Some(q) if hypothesis.state_color(q).as_ref() == Some(node.color()) => {
                    Step::Descend(Some(q))
                }
                _ => Step::Diverge,
            },
        )
    }

    /// Returns a read-only view of the tree as a [`TransitionSystem`] whose states are colored with
    /// their outputs.
    pub fn as_transition_system(&self) -> TreeView<'_, A, O, Void> {
        TreeView::new(&self.tree)
    }

    /// Returns a read-only view of the tree as a graph.
    pub fn as_graph(&self) -> GraphView<'_, A, O, Void> {
        GraphView::new(&self.tree)
    }
}

impl<A: Alphabet, O: Color> IncrementalBuilder for IncrementalMooreTreeBuilder<A, O> {
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
