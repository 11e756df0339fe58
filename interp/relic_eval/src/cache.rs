//! Relation invocation memoization.
//!
//! Caching `(relation, inputs) -> outcome` is sound because evaluation is
//! deterministic and relations are pure. The cache is disabled by default;
//! drivers opt in per `Globals`. A FIFO bound keeps memory flat on long runs.

use rustc_hash::FxHashMap;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use relic_ir::Name;
use relic_value::Value;

use crate::exec::Outcome;

type CacheKey = (Name, Vec<Value>);

const DEFAULT_CAPACITY: usize = 4096;

struct CacheInner {
    map: FxHashMap<CacheKey, Outcome>,
    order: VecDeque<CacheKey>,
}

/// FIFO-bounded memo cache for relation invocations.
pub struct InvokeCache {
    inner: RefCell<CacheInner>,
    enabled: Cell<bool>,
    capacity: usize,
}

impl InvokeCache {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        InvokeCache {
            inner: RefCell::new(CacheInner {
                map: FxHashMap::default(),
                order: VecDeque::new(),
            }),
            enabled: Cell::new(false),
            capacity: capacity.max(1),
        }
    }

    pub fn enable(&self) {
        self.enabled.set(true);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    /// Cached outcome for a key, when enabled and present.
    pub fn get(&self, rel: Name, inputs: &[Value]) -> Option<Outcome> {
        if !self.enabled.get() {
            return None;
        }
        let inner = self.inner.borrow();
        inner.map.get(&(rel, inputs.to_vec())).cloned()
    }

    /// Store an outcome, evicting the oldest entry at capacity.
    pub fn insert(&self, rel: Name, inputs: Vec<Value>, outcome: Outcome) {
        if !self.enabled.get() {
            return;
        }
        let mut inner = self.inner.borrow_mut();
        let key = (rel, inputs);
        if inner.map.contains_key(&key) {
            return;
        }
        if inner.map.len() >= self.capacity {
            if let Some(oldest) = inner.order.pop_front() {
                inner.map.remove(&oldest);
            }
        }
        inner.order.push_back(key.clone());
        inner.map.insert(key, outcome);
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().map.is_empty()
    }
}

impl Default for InvokeCache {
    fn default() -> Self {
        Self::new()
    }
}
