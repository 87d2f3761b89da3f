use itertools::Itertools;

/// Helper trait which can be used to display symbols, outputs and words. It is used for
/// labelling nodes and edges when exporting a tree and for rendering the values involved
/// in a conflict.
pub trait Show {
    /// Returns a human readable representation of `self`, for a symbol this should simply be the
    /// symbol itself and for an output it should be whatever makes sense to a reader.
    fn show(&self) -> String;

    /// Show a collection of the thing, for a collection of symbols this is a word. By default, the
    /// individual elements are concatenated and surrounded with quotes.
    fn show_collection<'a, I>(iter: I) -> String
    where
        Self: 'a,
        I: IntoIterator<Item = &'a Self>,
    {
        format!("\"{}\"", iter.into_iter().map(|x| x.show()).join(""))
    }
}

impl Show for char {
    fn show(&self) -> String {
        self.to_string()
    }
}

impl Show for usize {
    fn show(&self) -> String {
        self.to_string()
    }

    fn show_collection<'a, I>(iter: I) -> String
    where
        Self: 'a,
        I: IntoIterator<Item = &'a Self>,
    {
        format!("[{}]", iter.into_iter().map(|x| x.show()).join(", "))
    }
}

impl Show for u8 {
    fn show(&self) -> String {
        self.to_string()
    }
}

impl Show for u32 {
    fn show(&self) -> String {
        self.to_string()
    }
}

impl<S: Show> Show for Vec<S> {
    fn show(&self) -> String {
        S::show_collection(self.iter())
    }
}
