//! Composite value carriers: struct layouts, struct values, case values.

// StructLayout is Arc-shared so every value built from the same type
// definition reuses one field descriptor.
#![expect(
    clippy::disallowed_types,
    reason = "StructLayout is shared between all values of one struct type"
)]

use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::Arc;

use relic_ir::{MixopId, Name};

use crate::{Heap, Value};

struct LayoutInner {
    fields: Vec<Name>,
    index: FxHashMap<Name, u32>,
}

/// Shared ordered field descriptor for struct values.
///
/// Field order is the declaration order of the originating type definition;
/// projection resolves a field name to its slot index in O(1). Values built
/// from the same definition share one layout allocation.
#[derive(Clone)]
pub struct StructLayout(Arc<LayoutInner>);

impl StructLayout {
    pub fn new(fields: Vec<Name>) -> Self {
        let index = fields
            .iter()
            .enumerate()
            .map(|(i, &name)| (name, i as u32))
            .collect();
        StructLayout(Arc::new(LayoutInner { fields, index }))
    }

    /// Field names in declaration order.
    pub fn fields(&self) -> &[Name] {
        &self.0.fields
    }

    /// Slot index of a field, if present.
    pub fn index_of(&self, name: Name) -> Option<usize> {
        self.0.index.get(&name).map(|&i| i as usize)
    }

    pub fn len(&self) -> usize {
        self.0.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.fields.is_empty()
    }
}

impl PartialEq for StructLayout {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0.fields == other.0.fields
    }
}

impl Eq for StructLayout {}

impl fmt::Debug for StructLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.fields.iter()).finish()
    }
}

/// A struct value: a shared layout plus one slot per field.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct StructValue {
    pub layout: StructLayout,
    pub fields: Heap<Vec<Value>>,
}

impl StructValue {
    /// Build a struct value. The slot count must match the layout.
    pub fn new(layout: StructLayout, fields: Vec<Value>) -> Self {
        debug_assert_eq!(layout.len(), fields.len());
        StructValue {
            layout,
            fields: Heap::new(fields),
        }
    }

    /// Project a field by name.
    pub fn field(&self, name: Name) -> Option<&Value> {
        self.layout.index_of(name).and_then(|i| self.fields.get(i))
    }
}

/// An algebraic case value: an interned constructor plus its arguments.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct CaseValue {
    pub mixop: MixopId,
    pub args: Heap<Vec<Value>>,
}

impl CaseValue {
    pub fn new(mixop: MixopId, args: Vec<Value>) -> Self {
        CaseValue {
            mixop,
            args: Heap::new(args),
        }
    }
}
