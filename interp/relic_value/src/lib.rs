//! Relic runtime values.
//!
//! The evaluator's value domain: an immutable nine-variant tagged union with
//! shared heap payloads, a total structural ordering, and the shared field
//! layouts struct values are built from.
//!
//! - `Value` / `Num`: the tagged union and its numeric payload
//! - `Heap<T>`: the one place composite payloads allocate
//! - `StructLayout` / `StructValue` / `CaseValue`: composite carriers
//! - `compare` / `eq`: the total order everything else keys off

mod compare;
mod composite;
mod heap;
mod value;

pub use compare::{compare, eq};
pub use composite::{CaseValue, StructLayout, StructValue};
pub use heap::Heap;
pub use value::{Num, Value};
