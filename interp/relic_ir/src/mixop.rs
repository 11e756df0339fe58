//! Mixop interning.
//!
//! A mixop is a sequence of literal-atom groups naming an algebraic
//! constructor independently of its argument values, e.g. the set braces
//! `{ _ }` or the map pair `_ -> _`. Case-value equality and pattern checks
//! key off the interned `MixopId`, so two structurally identical mixops must
//! intern to the same id. The interning is an optimization only and never
//! changes observable equality.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::fmt;

use crate::Name;

/// An interned mixop handle.
///
/// Ids are dense indices into the `MixopTable` that produced them, so they
/// also provide a stable (per-table) total order used by value comparison.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MixopId(u32);

impl MixopId {
    /// The raw table index.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for MixopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MixopId({})", self.0)
    }
}

/// A mixop: groups of literal atoms surrounding the constructor's argument
/// positions. `n` groups describe a constructor of `n - 1` arguments
/// (each argument slot sits between two adjacent groups).
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Mixop {
    pub groups: Vec<Vec<Name>>,
}

struct MixopInner {
    map: FxHashMap<Mixop, u32>,
    items: Vec<Mixop>,
}

/// Structural interning table for mixops.
///
/// Interning the same atom groups twice yields the same `MixopId`.
pub struct MixopTable {
    inner: RwLock<MixopInner>,
}

impl MixopTable {
    /// Create an empty table.
    pub fn new() -> Self {
        MixopTable {
            inner: RwLock::new(MixopInner {
                map: FxHashMap::default(),
                items: Vec::new(),
            }),
        }
    }

    /// Intern a mixop, returning its id.
    ///
    /// Panics if the table outgrows the `u32` index space.
    pub fn intern(&self, mixop: Mixop) -> MixopId {
        {
            let guard = self.inner.read();
            if let Some(&id) = guard.map.get(&mixop) {
                return MixopId(id);
            }
        }

        let mut guard = self.inner.write();
        if let Some(&id) = guard.map.get(&mixop) {
            return MixopId(id);
        }
        assert!(
            guard.items.len() <= u32::MAX as usize,
            "mixop table exhausted the u32 index space"
        );
        let id = guard.items.len() as u32;
        guard.items.push(mixop.clone());
        guard.map.insert(mixop, id);
        MixopId(id)
    }

    /// Recover the atom groups of an interned mixop.
    pub fn resolve(&self, id: MixopId) -> Option<Mixop> {
        self.inner.read().items.get(id.0 as usize).cloned()
    }

    /// Number of interned mixops.
    pub fn len(&self) -> usize {
        self.inner.read().items.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MixopTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StringInterner;

    #[test]
    fn structural_interning() {
        let names = StringInterner::new();
        let lb = names.intern("{");
        let rb = names.intern("}");
        let table = MixopTable::new();

        let a = table.intern(Mixop {
            groups: vec![vec![lb], vec![rb]],
        });
        let b = table.intern(Mixop {
            groups: vec![vec![lb], vec![rb]],
        });
        assert_eq!(a, b);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn distinct_mixops_distinct_ids() {
        let names = StringInterner::new();
        let arrow = names.intern("->");
        let bar = names.intern("|-");
        let table = MixopTable::new();

        let a = table.intern(Mixop {
            groups: vec![vec![], vec![arrow], vec![]],
        });
        let b = table.intern(Mixop {
            groups: vec![vec![bar], vec![], vec![]],
        });
        assert_ne!(a, b);
    }
}
