use crate::Show;

/// The tri-state acceptance value stored in the nodes of an [`crate::IncrementalDfaTreeBuilder`]. A
/// word is either known to be accepted, known to be rejected, or nothing is known about it yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Acceptance {
    /// The word is definitely accepted.
    True,
    /// The word is definitely rejected.
    False,
    /// No information is available.
    #[default]
    Unknown,
}

impl Acceptance {
    /// Turns a definite acceptance value into an [`Acceptance`].
    pub fn from_bool(accepting: bool) -> Self {
        if accepting {
            Acceptance::True
        } else {
            Acceptance::False
        }
    }

    /// Returns the definite value, or `None` if this is [`Acceptance::Unknown`].
    pub fn to_bool(self) -> Option<bool> {
        match self {
            Acceptance::True => Some(true),
            Acceptance::False => Some(false),
            Acceptance::Unknown => None,
        }
    }

    /// Returns true if nothing is known, i.e. `self` is [`Acceptance::Unknown`].
    pub fn is_unknown(self) -> bool {
        matches!(self, Acceptance::Unknown)
    }

    /// Checks whether the definite value `accepting` contradicts `self`. [`Acceptance::Unknown`]
    /// never conflicts, the other two values conflict with the respective other boolean.
    pub fn conflicts(self, accepting: bool) -> bool {
        match self {
            Acceptance::True => !accepting,
            Acceptance::False => accepting,
            Acceptance::Unknown => false,
        }
    }

    /// Combines `self` with the definite value `accepting`. Returns the merged value, or `None` if the
    /// two conflict.
    pub fn merge(self, accepting: bool) -> Option<Self> {
        (!self.conflicts(accepting)).then(|| Self::from_bool(accepting))
    }
}

impl From<bool> for Acceptance {
    fn from(value: bool) -> Self {
        Self::from_bool(value)
    }
}

impl Show for Acceptance {
    fn show(&self) -> String {
        match self {
            Acceptance::True => "+",
            Acceptance::False => "-",
            Acceptance::Unknown => "?",
        }
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::Acceptance;

    #[test]
    fn acceptance_merge_rule() {
        assert!(!Acceptance::Unknown.conflicts(true));
        assert!(!Acceptance::Unknown.conflicts(false));
        assert!(Acceptance::True.conflicts(false));
        assert!(!Acceptance::True.conflicts(true));
        assert!(Acceptance::False.conflicts(true));

        assert_eq!(Acceptance::Unknown.merge(false), Some(Acceptance::False));
        assert_eq!(Acceptance::True.merge(true), Some(Acceptance::True));
        assert_eq!(Acceptance::True.merge(false), None);
        assert_eq!(Acceptance::from(true).to_bool(), Some(true));
        assert_eq!(Acceptance::Unknown.to_bool(), None);
    }
}
