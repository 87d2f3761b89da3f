//! Library for incrementally constructing finite automata from observed behavior.
//!
//! The central structures are the tree-based incremental builders in [`incremental`]. Such a builder
//! never sees a complete automaton. Instead, a driver (typically an active learning algorithm or an
//! equivalence checker) repeatedly inserts pairs of an input word and the output that the system under
//! learning produced on it. The builder stores these observations in a prefix tree, where every word
//! that has been inserted (or that is a prefix of an inserted word) corresponds to precisely one node.
//! Observations that contradict each other are rejected with an [`incremental::IncrementalError`].
//!
//! Three flavours exist, they differ only in where outputs are stored:
//! - [`IncrementalDfaTreeBuilder`] stores a tri-state [`Acceptance`] on every node, which is
//!   [`Acceptance::Unknown`] unless a word ending in that node has been inserted.
//! - [`IncrementalMooreTreeBuilder`] stores an output on every node, including the root.
//! - [`IncrementalMealyTreeBuilder`] stores an output on every edge of the tree.
//!
//! Two variants relax the rule that stored information is final. [`IncrementalPcDfaTreeBuilder`]
//! targets prefix-closed languages, where rejecting a word rejects all of its extensions, and
//! [`AdaptiveMealyTreeBuilder`] lets newer observations overwrite older ones.
//!
//! On top of answering lookups, each builder can compare its knowledge against a candidate automaton
//! (a *hypothesis*), which is anything implementing [`TransitionSystem`]. If the hypothesis disagrees
//! with a stored observation, a separating word is returned which witnesses the difference.
//!
//! The alphabet of a builder may grow over time, see [`alphabet::GrowingAlphabet`]. Growing the
//! alphabet never invalidates previously stored information.
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// The prelude is supposed to make using this package easier. Including everything, i.e.
/// `use automata_incremental::prelude::*;` should be enough to use the package.
pub mod prelude {
    pub use super::{
        alphabet::{Alphabet, AlphabetError, CharAlphabet, GrowingAlphabet, Symbol},
        incremental::{
            Acceptance, AdaptiveMealyTreeBuilder, GraphView, IncrementalBuilder,
            IncrementalDfaTreeBuilder, IncrementalError, IncrementalMealyTreeBuilder,
            IncrementalMooreTreeBuilder, IncrementalPcDfaTreeBuilder, NodeId, PrefixClosedView,
            TreeView,
        },
        math,
        transition_system::{HashTs, TransitionSystem},
        Color, Show, Void,
    };

    #[cfg(feature = "dot")]
    pub use super::dot::Dottable;
}

/// This module contains some definitions of mathematical objects which are used throughout the crate and
/// do not really fit to the top level.
pub mod math;

mod show;
pub use show::Show;

/// Module that contains definitions for dealing with alphabets.
pub mod alphabet;
pub use alphabet::Alphabet;

/// Defines the deterministic transition systems that hypotheses are given as, together with a simple
/// hash map based implementation.
pub mod transition_system;
pub use transition_system::TransitionSystem;

/// Incremental, tree-based construction of deterministic automata.
pub mod incremental;
pub use incremental::{
    Acceptance, AdaptiveMealyTreeBuilder, IncrementalDfaTreeBuilder, IncrementalMealyTreeBuilder,
    IncrementalMooreTreeBuilder, IncrementalPcDfaTreeBuilder,
};

/// Export of graph views in the DOT format of graphviz.
#[cfg(feature = "dot")]
pub mod dot;

use std::{fmt::Debug, hash::Hash};

/// A color is simply a type that can be used to color states or transitions.
pub trait Color: Clone + Eq + Hash + Debug + Show {}

impl<T: Eq + Clone + Hash + Debug + Show> Color for T {}

/// Represents the absence of a color. The idea is that this can be used whenever a tree or a
/// transition system carries no information on its states or its edges. A DFA tree for example
/// has [`Acceptance`] values on its nodes, but its edges are colored with [`Void`].
#[derive(Hash, Eq, PartialEq, PartialOrd, Ord, Clone, Copy, Default)]
pub struct Void;

impl Debug for Void {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#")
    }
}

impl Show for Void {
    fn show(&self) -> String {
        String::new()
    }
}
