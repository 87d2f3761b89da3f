use std::{fmt::Debug, hash::Hash};

use itertools::Itertools;
use thiserror::Error;
use tracing::trace;

use crate::{math::Bijection, Show};

/// A symbol of an alphabet, which is also the type of the symbols in a word.
pub trait Symbol: PartialEq + Eq + Debug + Copy + Ord + PartialOrd + Hash + Show {}
impl<S: PartialEq + Eq + Debug + Copy + Ord + PartialOrd + Hash + Show> Symbol for S {}

/// Errors that an [`Alphabet`] may raise.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AlphabetError {
    /// The alphabet has a fixed set of symbols and cannot be extended.
    #[error("not a growable alphabet")]
    NotGrowable,
}

/// An alphabet abstracts a finite collection of [`Symbol`]s, each of which is associated with
/// a unique index. The indices of an alphabet of size `n` are precisely `0..n`. Incremental builders
/// use these indices to address the child slots of their nodes.
///
/// Some alphabets can grow, see [`GrowingAlphabet`]. Growing must never change the index of a
/// symbol that is already present, newly added symbols always obtain the next free index.
pub trait Alphabet: Clone + Debug {
    /// The type of symbols in this alphabet.
    type Symbol: Symbol;

    /// Type for an iterator over all symbols in the alphabet, in the order of their indices.
    type Universe<'this>: Iterator<Item = Self::Symbol> + Clone
    where
        Self: 'this;

    /// Returns an iterator over all symbols in the alphabet, ordered by their index.
    fn universe(&self) -> Self::Universe<'_>;

    /// Returns the number of symbols in the alphabet.
    fn size(&self) -> usize;

    /// Returns true if the alphabet is empty.
    fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Returns the index of the given symbol or `None` if the symbol is not part of the alphabet.
    fn symbol_index(&self, symbol: Self::Symbol) -> Option<usize>;

    /// Returns the symbol with the given index, if it exists.
    fn symbol(&self, index: usize) -> Option<Self::Symbol>;

    /// Returns true if the given symbol is present in the alphabet.
    fn contains(&self, symbol: Self::Symbol) -> bool {
        self.symbol_index(symbol).is_some()
    }

    /// Adds the given symbol to the alphabet and returns its index. If the symbol is already present,
    /// its index is returned and nothing changes. Alphabets that cannot grow return
    /// [`AlphabetError::NotGrowable`], which is also the default.
    fn add_symbol(&mut self, symbol: Self::Symbol) -> Result<usize, AlphabetError> {
        let _ = symbol;
        Err(AlphabetError::NotGrowable)
    }
}

/// Represents a fixed alphabet where a [`Symbol`] is just a single `char`. The index of a symbol
/// is its position in the alphabet.
#[derive(Clone, Hash, PartialEq, Eq, Debug, PartialOrd, Ord)]
pub struct CharAlphabet(Vec<char>);

impl CharAlphabet {
    /// Creates a new [`CharAlphabet`] alphabet of the given size. The symbols are just the first `size` letters
    /// of the alphabet, i.e. 'a' to 'z'.
    pub fn of_size(size: usize) -> Self {
        assert!(size <= 26, "Alphabet is too large");
        Self((0..size).map(|i| (b'a' + i as u8) as char).collect())
    }

    /// Creates a new [`CharAlphabet`] with the given symbols, keeping their order.
    pub fn new(symbols: Vec<char>) -> Self {
        Self(symbols.into_iter().unique().collect())
    }
}

impl std::ops::Index<usize> for CharAlphabet {
    type Output = char;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl FromIterator<char> for CharAlphabet {
    fn from_iter<T: IntoIterator<Item = char>>(iter: T) -> Self {
        Self(iter.into_iter().unique().sorted().collect())
    }
}

impl Alphabet for CharAlphabet {
    type Symbol = char;

    type Universe<'this> = std::iter::Copied<std::slice::Iter<'this, char>>
    where
        Self: 'this;

    fn universe(&self) -> Self::Universe<'_> {
        self.0.iter().copied()
    }

    fn size(&self) -> usize {
        self.0.len()
    }

    fn symbol_index(&self, symbol: char) -> Option<usize> {
        self.0.iter().position(|c| *c == symbol)
    }

    fn symbol(&self, index: usize) -> Option<char> {
        self.0.get(index).copied()
    }
}

/// An alphabet that can be extended with new symbols at any time. The mapping between symbols
/// and indices is stored as a [`Bijection`], so translating in either direction is cheap.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrowingAlphabet<S: Symbol> {
    indices: Bijection<usize, S>,
}

impl<S: Symbol> Default for GrowingAlphabet<S> {
    fn default() -> Self {
        Self {
            indices: Bijection::new(),
        }
    }
}

impl<S: Symbol> GrowingAlphabet<S> {
    /// Creates an empty growing alphabet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a growing alphabet that initially contains the symbols of `alphabet`, each with the
    /// same index it has in `alphabet`.
    pub fn from_alphabet<A: Alphabet<Symbol = S>>(alphabet: &A) -> Self {
        alphabet.universe().collect()
    }
}

impl<S: Symbol> FromIterator<S> for GrowingAlphabet<S> {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        let mut out = Self::new();
        for sym in iter {
            out.push(sym);
        }
        out
    }
}

impl<S: Symbol> GrowingAlphabet<S> {
    fn push(&mut self, symbol: S) -> usize {
        if let Some(idx) = self.indices.get_by_right(&symbol) {
            return *idx;
        }
        let idx = self.indices.len();
        let _ = self.indices.insert(idx, symbol);
        idx
    }
}

impl<S: Symbol> Alphabet for GrowingAlphabet<S> {
    type Symbol = S;

    type Universe<'this> = std::vec::IntoIter<S>
    where
        Self: 'this;

    fn universe(&self) -> Self::Universe<'_> {
        self.indices
            .iter()
            .map(|(_, sym)| *sym)
            .collect_vec()
            .into_iter()
    }

    fn size(&self) -> usize {
        self.indices.len()
    }

    fn symbol_index(&self, symbol: S) -> Option<usize> {
        self.indices.get_by_right(&symbol).copied()
    }

    fn symbol(&self, index: usize) -> Option<S> {
        self.indices.get_by_left(&index).copied()
    }

    fn add_symbol(&mut self, symbol: S) -> Result<usize, AlphabetError> {
        let idx = self.push(symbol);
        trace!("symbol {} has index {idx}", symbol.show());
        Ok(idx)
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::{Alphabet, AlphabetError, CharAlphabet, GrowingAlphabet};

    #[test]
    fn char_alphabet_indices() {
        let alph = CharAlphabet::of_size(3);
        assert_eq!(alph.universe().collect_vec(), vec!['a', 'b', 'c']);
        assert_eq!(alph.symbol_index('b'), Some(1));
        assert_eq!(alph.symbol_index('d'), None);
        assert_eq!(alph.symbol(2), Some('c'));
        assert_eq!(alph.symbol(3), None);
        assert_eq!(
            CharAlphabet::from_iter(['c', 'a', 'a']).universe().collect_vec(),
            vec!['a', 'c']
        );
    }

    #[test]
    fn char_alphabet_cannot_grow() {
        let mut alph = CharAlphabet::of_size(2);
        assert_eq!(alph.add_symbol('z'), Err(AlphabetError::NotGrowable));
        assert_eq!(alph.size(), 2);
    }

    #[test]
    fn growing_alphabet_keeps_indices() {
        let mut alph = GrowingAlphabet::from_alphabet(&CharAlphabet::of_size(3));
        assert_eq!(alph.size(), 3);
        assert_eq!(alph.add_symbol('d'), Ok(3));
        assert_eq!(alph.add_symbol('d'), Ok(3));
        assert_eq!(alph.add_symbol('a'), Ok(0));
        assert_eq!(alph.size(), 4);
        assert_eq!(alph.universe().collect_vec(), vec!['a', 'b', 'c', 'd']);
        assert_eq!(alph.symbol(3), Some('d'));
        assert_eq!(alph.symbol_index('c'), Some(2));
    }
}
