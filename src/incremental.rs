//! Incremental builders accumulate observations about a deterministic system word by word and store
//! them in a prefix tree. Words that share a prefix share all nodes along that prefix, so the tree
//! represents a prefix-closed partial function from input words to outputs.
//!
//! Nodes are created lazily, the first time an inserted word reaches them. Once a node carries a
//! concrete output, inserting a word that implies a different output at the same position fails with
//! [`IncrementalError::Conflict`]. Insertion is not transactional: nodes that were created for a
//! prefix of the word before the conflicting position was reached stay in the tree.
//!
//! Only [`IncrementalPcDfaTreeBuilder`] and [`AdaptiveMealyTreeBuilder`] ever cut subtrees off, the
//! former when a node becomes a rejecting sink and the latter when an observation overwrites an
//! older one.
use thiserror::Error;

use crate::{
    alphabet::{Alphabet, AlphabetError},
    Show,
};

mod acceptance;
pub use acceptance::Acceptance;

mod node;
pub use node::{Edge, Node, NodeId};

mod tree;
pub(crate) use tree::PrefixTree;

mod separating;

mod view;
pub use view::{GraphEdge, GraphView, TreeView};

mod dfa;
pub use dfa::IncrementalDfaTreeBuilder;

mod moore;
pub use moore::IncrementalMooreTreeBuilder;

mod mealy;
pub use mealy::IncrementalMealyTreeBuilder;

mod pc_dfa;
pub use pc_dfa::{IncrementalPcDfaTreeBuilder, PrefixClosedView};

mod adaptive_mealy;
pub use adaptive_mealy::AdaptiveMealyTreeBuilder;

/// Errors raised by the incremental builders.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IncrementalError {
    /// The inserted information contradicts what has been stored before. `position` is the length of the
    /// prefix of `word` at which the contradiction occurs.
    #[error("conflict for {word} at position {position}: stored {stored}, observed {observed}")]
    Conflict {
        /// The word that was inserted.
        word: String,
        /// Length of the prefix of `word` whose output is contradictory.
        position: usize,
        /// The output that was stored before.
        stored: String,
        /// The output implied by the insertion.
        observed: String,
    },
    /// The inserted word contains a symbol that is not part of the alphabet.
    #[error("symbol {0} is not part of the alphabet")]
    UnknownSymbol(String),
    /// The number of outputs does not fit the length of the inserted word.
    #[error("expected {expected} outputs but got {found}")]
    OutputLength {
        /// Number of outputs that the word requires.
        expected: usize,
        /// Number of outputs that were given.
        found: usize,
    },
    /// The alphabet could not be modified.
    #[error(transparent)]
    Alphabet(#[from] AlphabetError),
}

impl IncrementalError {
    pub(crate) fn conflict<S: Show, O: Show>(
        word: &[S],
        position: usize,
        stored: &O,
        observed: &O,
    ) -> Self {
        Self::Conflict {
            word: S::show_collection(word),
            position,
            stored: stored.show(),
            observed: observed.show(),
        }
    }
}

/// Functionality that all incremental builders share, regardless of where they store their outputs.
pub trait IncrementalBuilder {
    /// The alphabet over which the observed words range.
    type Alphabet: Alphabet;

    /// Returns a reference to the alphabet of the builder.
    fn alphabet(&self) -> &Self::Alphabet;

    /// Returns the number of nodes in the underlying tree that are reachable from its root.
    fn size(&self) -> usize;

    /// Returns true if the stored information suffices to determine the complete output of the system
    /// on `word`, i.e. if the word (or an extension of it) has been inserted before.
    fn has_definitive_information<W>(&self, word: W) -> bool
    where
        W: IntoIterator<Item = <Self::Alphabet as Alphabet>::Symbol>;

    /// Makes the builder aware of a new input symbol. If the alphabet does not yet contain the symbol, it
    /// is asked to grow, which fails with [`AlphabetError::NotGrowable`] for fixed alphabets. Afterwards,
    /// all existing nodes are able to store successors for the new symbol. Adding a symbol that is already
    /// known has no effect.
    fn add_alphabet_symbol(
        &mut self,
        symbol: <Self::Alphabet as Alphabet>::Symbol,
    ) -> Result<(), IncrementalError>;
}
