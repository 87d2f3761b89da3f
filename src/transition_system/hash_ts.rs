use tracing::trace;

use crate::{alphabet::Symbol, math::Map, Show, Void};

use super::TransitionSystem;

/// A deterministic transition system that stores its transitions in an efficient hash map, keyed by
/// the source state and the symbol. States are referred to by their position, i.e. the `n`-th state
/// that was added has index `n`.
///
/// Depending on the choice of colors, this can be used as a DFA (`Q = bool`), as a Moore machine
/// (`Q` is the output type) or as a Mealy machine (`C` is the output type). It may be partial and it
/// may lack an initial state, which makes it convenient for building hypotheses by hand.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HashTs<S: Symbol, Q = Void, C = Void> {
    states: Vec<Q>,
    edges: Map<(usize, S), (usize, C)>,
    initial: Option<usize>,
}

impl<S: Symbol, Q, C> Default for HashTs<S, Q, C> {
    fn default() -> Self {
        Self {
            states: vec![],
            edges: Map::default(),
            initial: None,
        }
    }
}

impl<S: Symbol, Q: Clone, C: Clone> HashTs<S, Q, C> {
    /// Creates an empty transition system without states.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of states.
    pub fn size(&self) -> usize {
        self.states.len()
    }

    /// Adds a new state with the given color and returns its index.
    pub fn add_state<X: Into<Q>>(&mut self, color: X) -> usize {
        let id = self.states.len();
        self.states.push(color.into());
        id
    }

    /// Adds a new state with the given color and makes it the initial state.
    pub fn add_initial_state<X: Into<Q>>(&mut self, color: X) -> usize {
        let id = self.add_state(color);
        self.initial = Some(id);
        id
    }

    /// Designates the state with the given index as initial state.
    pub fn set_initial(&mut self, state: usize) {
        assert!(state < self.states.len(), "state {state} does not exist");
        self.initial = Some(state);
    }

    /// Changes the color of the given state.
    pub fn set_state_color<X: Into<Q>>(&mut self, state: usize, color: X) {
        assert!(state < self.states.len(), "state {state} does not exist");
        self.states[state] = color.into();
    }

    /// Adds a transition from `from` to `to` on the symbol `on` with the given color. If a transition
    /// on `on` already leaves `from`, it is replaced and the previous target and color are returned.
    pub fn add_edge<X: Into<C>>(
        &mut self,
        from: usize,
        on: S,
        to: usize,
        color: X,
    ) -> Option<(usize, C)> {
        assert!(
            from < self.states.len() && to < self.states.len(),
            "transition ({from}, {}, {to}) between states that do not exist",
            on.show()
        );
        trace!("adding transition ({from}, {}, {to})", on.show());
        self.edges.insert((from, on), (to, color.into()))
    }

    /// Removes the transition leaving `from` on `on` and returns its target and color if it existed.
    pub fn remove_edge(&mut self, from: usize, on: S) -> Option<(usize, C)> {
        self.edges.remove(&(from, on))
    }
}

impl<S: Symbol, Q: Clone, C: Clone> TransitionSystem for HashTs<S, Q, C> {
    type Symbol = S;
    type StateIndex = usize;
    type StateColor = Q;
    type EdgeColor = C;

    fn initial(&self) -> Option<usize> {
        self.initial
    }

    fn transition(&self, state: usize, symbol: S) -> Option<(usize, C)> {
        self.edges.get(&(state, symbol)).cloned()
    }

    fn state_color(&self, state: usize) -> Option<Q> {
        self.states.get(state).cloned()
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test]
    fn hash_ts_runs() {
        let mut ts: HashTs<char, char> = HashTs::new();
        assert_eq!(ts.initial(), None);
        assert_eq!(ts.trace_state_colors(vec![]), None);

        let q0 = ts.add_initial_state('-');
        let q1 = ts.add_state('x');
        let q2 = ts.add_state('y');
        ts.add_edge(q0, 'a', q1, Void);
        ts.add_edge(q1, 'b', q2, Void);
        ts.add_edge(q2, 'a', q0, Void);

        assert_eq!(ts.reached_state_index("ab".chars()), Some(q2));
        assert_eq!(ts.reached_state_index("abb".chars()), None);
        assert_eq!(
            ts.trace_state_colors("aba".chars()),
            Some(vec!['-', 'x', 'y', '-'])
        );
        assert_eq!(ts.reachable_state_indices(['a', 'b']), vec![q0, q1, q2]);

        assert_eq!(ts.add_edge(q1, 'b', q0, Void), Some((q2, Void)));
        assert_eq!(ts.reached_state_color("ab".chars()), Some('-'));
        assert_eq!(ts.remove_edge(q1, 'b'), Some((q0, Void)));
        assert_eq!(ts.successor(q1, 'b'), None);
    }

    #[test]
    fn hash_ts_edge_colors() {
        let mut ts: HashTs<char, Void, usize> = HashTs::new();
        let q0 = ts.add_initial_state(Void);
        let q1 = ts.add_state(Void);
        ts.add_edge(q0, 'a', q1, 1usize);
        ts.add_edge(q1, 'a', q0, 0usize);
        assert_eq!(ts.trace_edge_colors("aaa".chars()), Some(vec![1, 0, 1]));
        assert_eq!(ts.edge_color(q1, 'b'), None);
    }
}
