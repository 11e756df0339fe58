//! Relic evaluation engine.
//!
//! A deterministic tree-walking evaluator for the relic specification
//! language: layered immutable environments over shared key schemas, a
//! builtin library dispatched by pre-interned name, single-attempt relation
//! invocation with `Matched`/`NotMatched` outcomes, list-zip and
//! optional-consensus iteration, optional relation memoization, and
//! program-point coverage recording.
//!
//! The typical driver:
//!
//! 1. build a [`Globals`] from a [`SharedInterner`](relic_ir::SharedInterner),
//! 2. feed it definitions through [`Globals::load_definition`],
//! 3. wrap it in a [`Ctx`] and call [`invoke_relation`] /
//!    [`invoke_function`] / [`eval_exp`].

mod builtins;
mod cache;
mod context;
mod coverage;
mod env;
pub mod errors;
mod exec;
mod stack;

pub use cache::InvokeCache;
pub use context::{BuiltinMixops, Ctx, Globals};
pub use coverage::Coverage;
pub use env::{Env, FuncEnv, TypeEnv, VarEnv};
pub use errors::{EvalError, EvalErrorKind, EvalResult, Frame, NameKind};
pub use exec::{eval_exp, eval_instrs, invoke_function, invoke_relation, Outcome, Sign};
