use itertools::Itertools;
use tracing::{debug, trace};

use crate::{
    alphabet::{Alphabet, CharAlphabet},
    math::Set,
    transition_system::TransitionSystem,
    Show, Void,
};

use super::{
    separating::{self, Step},
    Acceptance, GraphView, IncrementalBuilder, IncrementalError, NodeId, PrefixTree,
};

/// Incrementally builds a tree-shaped DFA for a prefix-closed language, that is a language in which
/// every prefix of an accepted word is accepted as well. Accepting a word therefore accepts all nodes
/// on its path, and rejecting a word rejects all of its extensions.
///
/// A rejected node is a sink: it has no children in the tree and every word that reaches it is
/// rejected. Making a node rejecting cuts off everything that was stored below it.
///
/// # Example
/// ```
/// use automata_incremental::prelude::*;
///
/// let mut builder = IncrementalPcDfaTreeBuilder::new(CharAlphabet::of_size(2));
/// builder.insert("ab".chars(), true).unwrap();
/// builder.insert("ba".chars(), false).unwrap();
/// assert_eq!(builder.lookup("a".chars()), Acceptance::True);
/// assert_eq!(builder.lookup("baab".chars()), Acceptance::False);
/// assert!(builder.insert("b".chars(), true).is_ok());
/// assert!(builder.insert("bab".chars(), true).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct IncrementalPcDfaTreeBuilder<A: Alphabet = CharAlphabet> {
    tree: PrefixTree<A, Acceptance, Void>,
    root: NodeId,
}

impl<A: Alphabet> IncrementalPcDfaTreeBuilder<A> {
    /// Creates a new builder over the given alphabet, the tree consists of an
    /// [`Acceptance::Unknown`] root.
    pub fn new(alphabet: A) -> Self {
        let mut tree = PrefixTree::new(alphabet);
        let root = tree.add_root(Acceptance::Unknown);
        Self { tree, root }
    }

    /// Records that `word` is accepted if `accepting` is true and rejected otherwise.
    ///
    /// Accepting marks `word` and all of its prefixes, which fails with [`IncrementalError::Conflict`]
    /// at the first prefix that has been rejected before. Rejecting fails if `word` itself has been
    /// accepted and does nothing if a prefix of it is rejected already.
    pub fn insert<W>(&mut self, word: W, accepting: bool) -> Result<(), IncrementalError>
    where
        W: IntoIterator<Item = A::Symbol>,
    {
        let word = word.into_iter().collect_vec();
        let indices = self.tree.indices(&word)?;
        if accepting {
            self.insert_accepted(&word, indices)
        } else {
            self.insert_rejected(&word, indices)
        }
    }

    fn insert_accepted(
        &mut self,
        word: &[A::Symbol],
        indices: Vec<usize>,
    ) -> Result<(), IncrementalError> {
        let mut current = self.root;
        for (position, idx) in indices.into_iter().enumerate() {
            self.accept(current, word, position)?;
            current = match self.tree.node(current).child(idx).map(|e| e.target()) {
                Some(target) => target,
                None => self.tree.add_child(current, idx, Acceptance::True, Void),
            };
        }
        self.accept(current, word, word.len())?;
        trace!("accepted {}", A::Symbol::show_collection(word));
        Ok(())
    }

    fn accept(
        &mut self,
        node: NodeId,
        word: &[A::Symbol],
        position: usize,
    ) -> Result<(), IncrementalError> {
        let node = self.tree.node_mut(node);
        if *node.color() == Acceptance::False {
            debug!(
                "{} has a rejected prefix of length {position}",
                A::Symbol::show_collection(word)
            );
            return Err(IncrementalError::conflict(
                word,
                position,
                &Acceptance::False,
                &Acceptance::True,
            ));
        }
        node.set_color(Acceptance::True);
        Ok(())
    }

    fn insert_rejected(
        &mut self,
        word: &[A::Symbol],
        indices: Vec<usize>,
    ) -> Result<(), IncrementalError> {
        let mut current = self.root;
        for idx in indices {
            if *self.tree.node(current).color() == Acceptance::False {
                trace!("{} is rejected already", A::Symbol::show_collection(word));
                return Ok(());
            }
            current = match self.tree.node(current).child(idx).map(|e| e.target()) {
                Some(target) => target,
                None => self.tree.add_child(current, idx, Acceptance::Unknown, Void),
            };
        }

        match *self.tree.node(current).color() {
            Acceptance::True => {
                debug!("{} has been accepted before", A::Symbol::show_collection(word));
                Err(IncrementalError::conflict(
                    word,
                    word.len(),
                    &Acceptance::True,
                    &Acceptance::False,
                ))
            }
            Acceptance::False => Ok(()),
            Acceptance::Unknown => {
                self.tree.node_mut(current).set_color(Acceptance::False);
                let removed = self.tree.detach_children(current);
                trace!(
                    "rejected {}, cut off {} nodes",
                    A::Symbol::show_collection(word),
                    removed.len()
                );
                Ok(())
            }
        }
    }

    /// Returns the acceptance of `word`. A word with a rejected prefix is rejected, otherwise this is
    /// the acceptance stored for `word`, or [`Acceptance::Unknown`] if the word leaves the tree.
    pub fn lookup<W>(&self, word: W) -> Acceptance
    where
        W: IntoIterator<Item = A::Symbol>,
    {
        let mut current = self.root;
        for sym in word {
            if *self.tree.node(current).color() == Acceptance::False {
                return Acceptance::False;
            }
            match self.tree.child(current, sym) {
                Some(edge) => current = edge.target(),
                None => return Acceptance::Unknown,
            }
        }
        *self.tree.node(current).color()
    }

    /// Searches for a word on which the stored information contradicts `hypothesis`, a (possibly
    /// partial) DFA whose state colors indicate acceptance. Missing states are rejecting.
    ///
    /// Besides the words stored in the tree, this also considers the extensions of rejected words:
    /// whenever the hypothesis reaches a state from which it accepts some word on a rejected node,
    /// the rejected word is extended by such a suffix. If `omit_undefined` is set, words on which the
    /// hypothesis is undefined are skipped together with their extensions.
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

        let inputs = inputs.into_iter();
        let accepts = |q: Option<H::StateIndex>| {
            q.and_then(|q| hypothesis.state_color(q)).unwrap_or(false)
        };

        let root = *self.tree.node(self.root).color();
        if root.conflicts(accepts(initial)) {
            debug!("hypothesis disagrees on the empty word");
            return Some(vec![]);
        }

        let mut dead = Set::default();
        if root == Acceptance::False {
            return initial.and_then(|q| accepted_suffix(hypothesis, q, inputs, &mut dead));
        }

        let mut suffix = None;
        let word = separating::find_separating_word(
            &self.tree,
            self.root,
            initial,
            inputs.clone(),
            |state, sym, node, _| {
                let successor = state.and_then(|q| hypothesis.successor(q, sym));
                let stored = *node.color();
                if successor.is_none() && (omit_undefined || stored == Acceptance::False) {
                    return Step::Skip;
                }
                if stored.conflicts(accepts(successor)) {
                    return Step::Diverge;
                }
                if stored == Acceptance::False {
                    suffix = successor
                        .and_then(|q| accepted_suffix(hypothesis, q, inputs.clone(), &mut dead));
                    if suffix.is_some() {
                        return Step::Diverge;
                    }
                }
                Step::Descend(successor)
            },
        );

        word.map(|mut word| {
            word.extend(suffix.unwrap_or_default());
            word
        })
    }

    /// Returns a read-only view of the tree as a [`TransitionSystem`]. Rejected nodes loop on every
    /// symbol of the alphabet.
    pub fn as_transition_system(&self) -> PrefixClosedView<'_, A> {
        PrefixClosedView { tree: &self.tree }
    }

    /// Returns a read-only view of the tree as a graph.
    pub fn as_graph(&self) -> GraphView<'_, A, Acceptance, Void> {
        GraphView::new(&self.tree)
    }
}

/// Looks for a word that `hypothesis` accepts from `state`. States from which nothing is accepted
/// are collected in `dead` so that later calls do not explore them again.
fn accepted_suffix<H, I>(
    hypothesis: &H,
    state: H::StateIndex,
    inputs: I,
    dead: &mut Set<H::StateIndex>,
) -> Option<Vec<H::Symbol>>
where
    H: TransitionSystem<StateColor = bool>,
    I: Iterator<Item = H::Symbol> + Clone,
{
    let accepting = |q: H::StateIndex| hypothesis.state_color(q).unwrap_or(false);
    if accepting(state) {
        return Some(vec![]);
    }
    if !dead.insert(state) {
        return None;
    }

    let mut stack = vec![(state, None, inputs.clone())];
    while let Some((q, _, remaining)) = stack.last_mut() {
        let q = *q;
        let Some(sym) = remaining.next() else {
            stack.pop();
            continue;
        };
        let Some(next) = hypothesis.successor(q, sym) else {
            continue;
        };
        if accepting(next) {
            let word = stack
                .iter()
                .filter_map(|(_, incoming, _)| *incoming)
                .chain(std::iter::once(sym))
                .collect();
            return Some(word);
        }
        if dead.insert(next) {
            stack.push((next, Some(sym), inputs.clone()));
        }
    }
    None
}

/// A read-only view of a [`IncrementalPcDfaTreeBuilder`] as a [`TransitionSystem`]. It follows the
/// edges of the tree, except that rejected nodes loop on every symbol of the alphabet.
#[derive(Debug)]
pub struct PrefixClosedView<'a, A: Alphabet> {
    tree: &'a PrefixTree<A, Acceptance, Void>,
}

impl<'a, A: Alphabet> Clone for PrefixClosedView<'a, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, A: Alphabet> Copy for PrefixClosedView<'a, A> {}

impl<'a, A: Alphabet> TransitionSystem for PrefixClosedView<'a, A> {
    type Symbol = A::Symbol;
    type StateIndex = NodeId;
    type StateColor = Acceptance;
    type EdgeColor = Void;

    fn initial(&self) -> Option<NodeId> {
        self.tree.root()
    }

    fn transition(&self, state: NodeId, symbol: A::Symbol) -> Option<(NodeId, Void)> {
        let node = self.tree.get(state)?;
        let idx = self.tree.alphabet().symbol_index(symbol)?;
        if *node.color() == Acceptance::False {
            return Some((state, Void));
        }
        node.child(idx).map(|e| (e.target(), Void))
    }

    fn state_color(&self, state: NodeId) -> Option<Acceptance> {
        self.tree.get(state).map(|node| *node.color())
    }
}

impl<A: Alphabet> IncrementalBuilder for IncrementalPcDfaTreeBuilder<A> {
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
