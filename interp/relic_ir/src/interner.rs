//! String interner for identifier storage.
//!
//! Provides O(1) interning and lookup with thread-safe access via a
//! read/write lock.

// Arc is needed here for SharedInterner - the interner must be shared
// between the loader, the global tables, and every Context.
#![expect(
    clippy::disallowed_types,
    reason = "Arc required for SharedInterner sharing"
)]

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::sync::Arc;

use crate::Name;

/// Trait for resolving a `Name` back to its string.
///
/// Implemented by `StringInterner`; takes `&self` so callers can stay
/// generic over owned and shared interners.
pub trait StringLookup {
    /// Resolve an interned name to its string content.
    fn lookup(&self, name: Name) -> String;
}

struct InternInner {
    /// Map from string content to index.
    map: FxHashMap<Box<str>, u32>,
    /// Storage for string contents, indexed by `Name`.
    strings: Vec<Box<str>>,
}

/// String interner.
///
/// Interning the same string twice yields the same `Name`, so identifier
/// equality on the evaluator's hot path is a `u32` compare.
pub struct StringInterner {
    inner: RwLock<InternInner>,
}

impl StringInterner {
    /// Create a new interner with the empty string pre-interned at index 0.
    pub fn new() -> Self {
        let mut map = FxHashMap::default();
        map.insert(Box::from(""), 0);
        StringInterner {
            inner: RwLock::new(InternInner {
                map,
                strings: vec![Box::from("")],
            }),
        }
    }

    /// Intern a string, returning its `Name`.
    ///
    /// Panics if the table outgrows the `u32` index space.
    pub fn intern(&self, s: &str) -> Name {
        // Fast path: already interned.
        {
            let guard = self.inner.read();
            if let Some(&index) = guard.map.get(s) {
                return Name::from_raw(index);
            }
        }

        let mut guard = self.inner.write();
        // Double-check after acquiring the write lock.
        if let Some(&index) = guard.map.get(s) {
            return Name::from_raw(index);
        }
        assert!(
            guard.strings.len() <= u32::MAX as usize,
            "string interner exhausted the u32 index space"
        );
        let index = guard.strings.len() as u32;
        guard.strings.push(Box::from(s));
        guard.map.insert(Box::from(s), index);
        Name::from_raw(index)
    }

    /// Number of interned strings.
    pub fn len(&self) -> usize {
        self.inner.read().strings.len()
    }

    /// Whether the interner is empty (never true: "" is pre-interned).
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StringLookup for StringInterner {
    fn lookup(&self, name: Name) -> String {
        let guard = self.inner.read();
        guard
            .strings
            .get(name.raw() as usize)
            .map(|s| s.to_string())
            .unwrap_or_default()
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared reference-counted interner.
///
/// Cheap to clone; all clones intern into the same table.
#[derive(Clone)]
pub struct SharedInterner(Arc<StringInterner>);

impl SharedInterner {
    /// Create a new shared interner.
    pub fn new() -> Self {
        SharedInterner(Arc::new(StringInterner::new()))
    }
}

impl Default for SharedInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for SharedInterner {
    type Target = StringInterner;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl StringLookup for SharedInterner {
    fn lookup(&self, name: Name) -> String {
        self.0.lookup(name)
    }
}
