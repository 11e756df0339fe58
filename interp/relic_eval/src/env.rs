//! Immutable array-backed environments with shared key schemas.
//!
//! An `Env<T>` maps suffixed variables to slots in a flat array. The mapping
//! from key to slot index lives in a `KeySchema` shared by every environment
//! with the same extension history: extending with an unseen key derives (or
//! reuses, memoized per schema node) a child schema; extending with a seen
//! key copies the slot array and overwrites in place. Lookups resolve the
//! slot index through the schema's hash map, so sibling environments built
//! from the same bindings pay for that map once.

use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::rc::Rc;

use relic_ir::{FuncDef, Typ, VarId};
use relic_value::Value;

/// One node of the key-schema trie.
///
/// `positions` maps every key this schema has seen to its slot index;
/// `children` memoizes the schema derived by each unseen-key extension.
struct KeySchema {
    positions: FxHashMap<VarId, u32>,
    children: RefCell<FxHashMap<VarId, Rc<KeySchema>>>,
    len: u32,
}

impl KeySchema {
    fn root() -> Rc<Self> {
        Rc::new(KeySchema {
            positions: FxHashMap::default(),
            children: RefCell::new(FxHashMap::default()),
            len: 0,
        })
    }

    fn child(self: &Rc<Self>, key: &VarId) -> Rc<KeySchema> {
        if let Some(child) = self.children.borrow().get(key) {
            return Rc::clone(child);
        }
        let mut positions = self.positions.clone();
        positions.insert(key.clone(), self.len);
        let child = Rc::new(KeySchema {
            positions,
            children: RefCell::new(FxHashMap::default()),
            len: self.len + 1,
        });
        self.children
            .borrow_mut()
            .insert(key.clone(), Rc::clone(&child));
        child
    }
}

/// Immutable map from suffixed variables to `T`.
///
/// `extend` returns a new environment and never touches the original.
pub struct Env<T> {
    schema: Rc<KeySchema>,
    slots: Vec<T>,
}

impl<T: Clone> Env<T> {
    /// An empty environment with a fresh schema root.
    pub fn new() -> Self {
        Env {
            schema: KeySchema::root(),
            slots: Vec::new(),
        }
    }

    /// A new environment with `key` bound to `value`.
    ///
    /// A seen key overwrites its slot in a copy of the array; an unseen key
    /// appends a slot under a derived (memoized) child schema.
    #[must_use]
    pub fn extend(&self, key: &VarId, value: T) -> Self {
        if let Some(&pos) = self.schema.positions.get(key) {
            let mut slots = self.slots.clone();
            slots[pos as usize] = value;
            Env {
                schema: Rc::clone(&self.schema),
                slots,
            }
        } else {
            let schema = self.schema.child(key);
            let mut slots = Vec::with_capacity(self.slots.len() + 1);
            slots.extend_from_slice(&self.slots);
            slots.push(value);
            Env { schema, slots }
        }
    }

    /// Resolve a binding. `None` on a miss; callers raise `UnboundName`.
    pub fn lookup(&self, key: &VarId) -> Option<&T> {
        self.schema
            .positions
            .get(key)
            .and_then(|&pos| self.slots.get(pos as usize))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl<T: Clone> Clone for Env<T> {
    fn clone(&self) -> Self {
        Env {
            schema: Rc::clone(&self.schema),
            slots: self.slots.clone(),
        }
    }
}

impl<T: Clone> Default for Env<T> {
    fn default() -> Self {
        Self::new()
    }
}

pub type TypeEnv = Env<Typ>;
pub type FuncEnv = Env<Rc<FuncDef>>;
pub type VarEnv = Env<Value>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use relic_ir::{Iter, StringInterner};

    fn key(interner: &StringInterner, s: &str) -> VarId {
        VarId::plain(interner.intern(s))
    }

    #[test]
    fn lookup_after_extend() {
        let names = StringInterner::new();
        let x = key(&names, "x");
        let env: VarEnv = Env::new();
        let env = env.extend(&x, Value::nat(1i64));
        assert_eq!(env.lookup(&x), Some(&Value::nat(1i64)));
    }

    #[test]
    fn extend_leaves_original_untouched() {
        let names = StringInterner::new();
        let x = key(&names, "x");
        let base: VarEnv = Env::new().extend(&x, Value::nat(1i64));
        let shadowed = base.extend(&x, Value::nat(2i64));
        assert_eq!(base.lookup(&x), Some(&Value::nat(1i64)));
        assert_eq!(shadowed.lookup(&x), Some(&Value::nat(2i64)));
    }

    #[test]
    fn unrelated_keys_are_preserved() {
        let names = StringInterner::new();
        let x = key(&names, "x");
        let y = key(&names, "y");
        let env: VarEnv = Env::new()
            .extend(&x, Value::bool(true))
            .extend(&y, Value::bool(false));
        assert_eq!(env.lookup(&x), Some(&Value::bool(true)));
        assert_eq!(env.lookup(&y), Some(&Value::bool(false)));
    }

    #[test]
    fn suffixed_keys_are_distinct() {
        let names = StringInterner::new();
        let x = key(&names, "x");
        let xs = x.suffixed(Iter::List);
        let env: VarEnv = Env::new().extend(&x, Value::nat(1i64));
        assert_eq!(env.lookup(&xs), None);
    }

    #[test]
    fn siblings_share_one_schema() {
        let names = StringInterner::new();
        let x = key(&names, "x");
        let base: VarEnv = Env::new();
        let a = base.extend(&x, Value::nat(1i64));
        let b = base.extend(&x, Value::nat(2i64));
        assert!(Rc::ptr_eq(&a.schema, &b.schema));
    }

    #[test]
    fn seen_key_extension_keeps_the_schema() {
        let names = StringInterner::new();
        let x = key(&names, "x");
        let a: VarEnv = Env::new().extend(&x, Value::nat(1i64));
        let b = a.extend(&x, Value::nat(2i64));
        assert!(Rc::ptr_eq(&a.schema, &b.schema));
        assert_eq!(a.len(), b.len());
    }
}
