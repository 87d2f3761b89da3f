use std::{collections::VecDeque, fmt::Debug, hash::Hash};

use crate::{alphabet::Symbol, math::Set};

mod hash_ts;
pub use hash_ts::HashTs;

/// Type alias for extracting the state color in a [`TransitionSystem`].
pub type StateColor<X> = <X as TransitionSystem>::StateColor;
/// Type alias for extracting the edge color in a [`TransitionSystem`].
pub type EdgeColor<X> = <X as TransitionSystem>::EdgeColor;
/// Type alias for extracting the state index type of a [`TransitionSystem`].
pub type StateIndex<X> = <X as TransitionSystem>::StateIndex;

/// A deterministic, possibly partial transition system with a designated initial state. States
/// may carry a color (the acceptance of a DFA state or the output of a Moore state), edges may
/// carry a color as well (the output of a Mealy transition). Transition systems that do not have
/// colors on their states or edges use [`crate::Void`].
///
/// This trait serves two purposes. Hypotheses that an incremental builder is compared against are
/// given as implementors of it, and the read-only [`crate::incremental::TreeView`] of a builder
/// implements it, so that the generic methods provided here can be used to explore the tree.
///
/// Every method deals with absence explicitly: a transition system without an initial state is
/// allowed, and so are missing transitions.
pub trait TransitionSystem {
    /// The type of symbols that label the transitions.
    type Symbol: Symbol;
    /// The type that is used to refer to states.
    type StateIndex: Copy + Eq + Hash + Debug;
    /// The type of colors on the states.
    type StateColor: Clone;
    /// The type of colors on the edges.
    type EdgeColor: Clone;

    /// Returns the initial state, if there is one.
    fn initial(&self) -> Option<Self::StateIndex>;

    /// Returns the target and the color of the transition leaving `state` on `symbol`, or `None`
    /// if no such transition exists.
    fn transition(
        &self,
        state: Self::StateIndex,
        symbol: Self::Symbol,
    ) -> Option<(Self::StateIndex, Self::EdgeColor)>;

    /// Returns the color of the given state, or `None` if the state does not exist.
    fn state_color(&self, state: Self::StateIndex) -> Option<Self::StateColor>;

    /// Returns the state that is reached from `state` on `symbol`.
    fn successor(&self, state: Self::StateIndex, symbol: Self::Symbol) -> Option<Self::StateIndex> {
        self.transition(state, symbol).map(|(q, _)| q)
    }

    /// Returns the color of the transition leaving `state` on `symbol`.
    fn edge_color(&self, state: Self::StateIndex, symbol: Self::Symbol) -> Option<Self::EdgeColor> {
        self.transition(state, symbol).map(|(_, c)| c)
    }

    /// Runs the given word from the initial state and returns the state that is reached, provided the
    /// run is defined for the whole word.
    fn reached_state_index<W: IntoIterator<Item = Self::Symbol>>(
        &self,
        word: W,
    ) -> Option<Self::StateIndex> {
        word.into_iter()
            .try_fold(self.initial()?, |q, sym| self.successor(q, sym))
    }

    /// Returns the color of the state that is reached by the given word.
    fn reached_state_color<W: IntoIterator<Item = Self::Symbol>>(
        &self,
        word: W,
    ) -> Option<Self::StateColor> {
        self.state_color(self.reached_state_index(word)?)
    }

    /// Runs the given word and collects the colors of all visited states, starting with the color of the
    /// initial state. The result thus has one element more than the word. Returns `None` if the run
    /// is not defined for the whole word.
    fn trace_state_colors<W: IntoIterator<Item = Self::Symbol>>(
        &self,
        word: W,
    ) -> Option<Vec<Self::StateColor>> {
        let mut state = self.initial()?;
        let mut out = vec![self.state_color(state)?];
        for sym in word {
            state = self.successor(state, sym)?;
            out.push(self.state_color(state)?);
        }
        Some(out)
    }

    /// Runs the given word and collects the colors of all taken transitions. Returns `None` if the
    /// run is not defined for the whole word.
    fn trace_edge_colors<W: IntoIterator<Item = Self::Symbol>>(
        &self,
        word: W,
    ) -> Option<Vec<Self::EdgeColor>> {
        let mut state = self.initial()?;
        let mut out = vec![];
        for sym in word {
            let (q, c) = self.transition(state, sym)?;
            out.push(c);
            state = q;
        }
        Some(out)
    }

    /// Collects all states that are reachable from the initial state using the given symbols, in
    /// breadth-first order.
    fn reachable_state_indices<I>(&self, inputs: I) -> Vec<Self::StateIndex>
    where
        I: IntoIterator<Item = Self::Symbol>,
        I::IntoIter: Clone,
    {
        let Some(initial) = self.initial() else {
            return vec![];
        };
        let inputs = inputs.into_iter();
        let mut seen: Set<Self::StateIndex> = Set::default();
        let mut queue = VecDeque::from([initial]);
        let mut out = vec![];
        seen.insert(initial);

        while let Some(q) = queue.pop_front() {
            out.push(q);
            for sym in inputs.clone() {
                if let Some(p) = self.successor(q, sym) {
                    if seen.insert(p) {
                        queue.push_back(p);
                    }
                }
            }
        }
        out
    }
}

impl<T: TransitionSystem> TransitionSystem for &T {
    type Symbol = T::Symbol;
    type StateIndex = T::StateIndex;
    type StateColor = T::StateColor;
    type EdgeColor = T::EdgeColor;

    fn initial(&self) -> Option<Self::StateIndex> {
        T::initial(self)
    }

    fn transition(
        &self,
        state: Self::StateIndex,
        symbol: Self::Symbol,
    ) -> Option<(Self::StateIndex, Self::EdgeColor)> {
        T::transition(self, state, symbol)
    }

    fn state_color(&self, state: Self::StateIndex) -> Option<Self::StateColor> {
        T::state_color(self, state)
    }
}
