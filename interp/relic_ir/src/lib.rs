//! Relic IR - abstract syntax and shared interning for the relic evaluator.
//!
//! Relic is a small, typed, first-order specification language used to encode
//! operational and typing semantics. This crate holds everything the
//! evaluator and external loaders share:
//!
//! - `Name` / `StringInterner`: interned identifiers with O(1) equality
//! - `Span`: compact source locations carried by every AST node
//! - `Mixop` / `MixopTable`: interned atom-group constructors for algebraic
//!   case values
//! - `Integer`: arbitrary-precision signed integer with a machine-word fast
//!   path
//! - the abstract syntax itself (`Typ`, `Exp`, `Instr`, `Pat`, definitions)
//!
//! The wire format and parser live outside this workspace; an external
//! loader produces these nodes from a JSON-encoded AST plus source map.

mod ast;
mod int;
mod interner;
mod mixop;
mod name;
mod span;

pub use ast::{
    CaseArm, CaseTyp, CmpOp, Def, DefTyp, Exp, ExpKind, FuncDef, Guard, Instr, InstrKind, Iter,
    IterBinding, IterSuffix, ListPat, NumKind, OptPat, Param, Pat, ProgPoint, RelDef, Typ, TypDef,
    VarId,
};
pub use int::Integer;
pub use interner::{SharedInterner, StringInterner, StringLookup};
pub use mixop::{Mixop, MixopId, MixopTable};
pub use name::Name;
pub use span::Span;
