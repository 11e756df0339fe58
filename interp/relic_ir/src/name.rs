//! Interned identifier handles.

use std::fmt;

/// An interned identifier.
///
/// A `Name` is an index into a `StringInterner`. Equality and hashing are
/// single `u32` operations; the string itself is recovered through the
/// interner that produced it.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name(u32);

impl Name {
    /// Create a name from a raw interner index.
    ///
    /// Only the interner should call this; a `Name` forged from an arbitrary
    /// index will not resolve to a string.
    #[inline]
    pub(crate) const fn from_raw(index: u32) -> Self {
        Name(index)
    }

    /// The raw interner index.
    #[inline]
    pub(crate) const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self.0)
    }
}
