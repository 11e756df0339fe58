//! The evaluation engine: expressions, instructions, invocations.

mod expr;
mod instr;
mod typ;

use std::rc::Rc;

use relic_ir::{Exp, FuncDef, Instr, Name, Param, RelDef, Span, Typ, VarId};
use relic_value::Value;

pub use expr::eval_exp;

use crate::context::Ctx;
use crate::errors::{
    arity_mismatch, invalid_operation, unbound_name, EvalError, EvalErrorKind, EvalResult,
    NameKind,
};
use crate::exec::instr::{assign, exec_block, Control};
use crate::exec::typ::check_targ;
use crate::stack::ensure_sufficient_stack;

/// The sign of an instruction list: still running, returned a function
/// value, or produced relation outputs.
#[derive(Clone, Debug, PartialEq)]
pub enum Sign {
    Cont,
    Ret(Value),
    Res(Vec<Value>),
}

/// The outcome of a relation invocation. `NotMatched` is an ordinary value,
/// never an error; callers branch on it.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Matched(Vec<Value>),
    NotMatched,
}

/// Run an instruction list to its sign. Falling off the end and a failed
/// relation premise both surface as `Sign::Cont`.
pub fn eval_instrs(ctx: Ctx, instrs: &[Instr]) -> EvalResult<(Ctx, Sign)> {
    Ok(match exec_block(ctx, instrs)? {
        Control::Through(ctx) => (ctx, Sign::Cont),
        Control::Done(ctx, sign) => (ctx, sign),
        Control::Premise(ctx) => (ctx, Sign::Cont),
    })
}

/// Invoke a user function by name. A function that fails to return is a
/// specification error; there is no "not matched" for functions.
pub fn invoke_function(
    ctx: &Ctx,
    func: Name,
    targs: &[Typ],
    args: &[Exp],
    span: Span,
) -> EvalResult<Value> {
    let def = ctx
        .fenv
        .lookup(&VarId::plain(func))
        .cloned()
        .or_else(|| ctx.globals.funcdef(func))
        .ok_or_else(|| unbound_name(NameKind::Func, &ctx.name_str(func), span))?;
    let name = ctx.name_str(def.name);

    if def.params.len() != args.len() {
        return Err(arity_mismatch(&name, def.params.len(), args.len(), span));
    }
    if !def.tparams.is_empty() && def.tparams.len() != targs.len() {
        return Err(arity_mismatch(
            &format!("{name} type arguments"),
            def.tparams.len(),
            targs.len(),
            span,
        ));
    }

    let _guard = ctx.globals.enter_call(span)?;
    ensure_sufficient_stack(|| run_function(ctx, &def, targs, args, span))
        .map_err(|e| e.with_frame(&name, span))
}

fn run_function(
    ctx: &Ctx,
    def: &Rc<FuncDef>,
    targs: &[Typ],
    args: &[Exp],
    span: Span,
) -> EvalResult<Value> {
    let mut callee = ctx.localize();
    for (tparam, targ) in def.tparams.iter().zip(targs) {
        check_targ(ctx, targ, span)?;
        callee.tenv = callee.tenv.extend(&VarId::plain(*tparam), targ.clone());
    }
    for (param, arg) in def.params.iter().zip(args) {
        match param {
            Param::Exp(var) => {
                let value = eval_exp(ctx, arg)?;
                callee = callee.bind(var, value);
            }
            Param::Def(dname) => {
                // A function-typed parameter: the argument must evaluate to
                // a function reference, whose definition gets bound into the
                // callee's local function environment.
                let value = eval_exp(ctx, arg)?;
                let fname = value.as_func().ok_or_else(|| {
                    invalid_operation(
                        format!("expected a function reference, got {}", value.type_name()),
                        arg.span,
                    )
                })?;
                let fdef = ctx
                    .fenv
                    .lookup(&VarId::plain(fname))
                    .cloned()
                    .or_else(|| ctx.globals.funcdef(fname))
                    .ok_or_else(|| {
                        unbound_name(NameKind::Func, &ctx.name_str(fname), arg.span)
                    })?;
                callee.fenv = callee.fenv.extend(&VarId::plain(*dname), fdef);
            }
        }
    }

    match exec_block(callee, &def.instrs)? {
        Control::Done(_, Sign::Ret(value)) => Ok(value),
        Control::Done(_, Sign::Res(_)) => Err(invalid_operation(
            "function body produced relation outputs",
            span,
        )),
        Control::Done(_, Sign::Cont) | Control::Through(_) | Control::Premise(_) => Err(
            invalid_operation("function body did not return a value", span),
        ),
    }
}

/// Invoke a relation by name with already-evaluated input values.
pub fn invoke_relation(
    ctx: &Ctx,
    rel: Name,
    inputs: Vec<Value>,
    span: Span,
) -> EvalResult<Outcome> {
    let def = ctx
        .globals
        .reldef(rel)
        .ok_or_else(|| unbound_name(NameKind::Rel, &ctx.name_str(rel), span))?;
    invoke_relation_def(ctx, &def, inputs, span)
}

/// One single-attempt invocation: bind the declared inputs, run the body,
/// report the outcome. No backtracking ever happens here; the body's `Case`
/// commitments are final.
pub(crate) fn invoke_relation_def(
    ctx: &Ctx,
    def: &Rc<RelDef>,
    inputs: Vec<Value>,
    span: Span,
) -> EvalResult<Outcome> {
    let name = ctx.name_str(def.name);
    if inputs.len() != def.inputs.len() {
        return Err(arity_mismatch(
            &format!("{name} inputs"),
            def.inputs.len(),
            inputs.len(),
            span,
        ));
    }

    if let Some(outcome) = ctx.globals.cache.get(def.name, &inputs) {
        tracing::trace!(
            relation = %name,
            inputs = inputs.len(),
            matched = matches!(outcome, Outcome::Matched(_)),
            cached = true,
            "relation invoked"
        );
        return Ok(outcome);
    }

    let _guard = ctx.globals.enter_call(span)?;
    let outcome = ensure_sufficient_stack(|| run_relation(ctx, def, &inputs, span))
        .map_err(|e| e.with_frame(&name, span))?;
    tracing::trace!(
        relation = %name,
        inputs = inputs.len(),
        matched = matches!(outcome, Outcome::Matched(_)),
        cached = false,
        "relation invoked"
    );
    ctx.globals.cache.insert(def.name, inputs, outcome.clone());
    Ok(outcome)
}

fn run_relation(
    ctx: &Ctx,
    def: &Rc<RelDef>,
    inputs: &[Value],
    span: Span,
) -> EvalResult<Outcome> {
    let mut callee = ctx.localize().with_inputs(&def.inputs);
    for (&pos, value) in def.inputs.iter().zip(inputs) {
        let param = def.params.get(pos).ok_or_else(|| {
            invalid_operation(format!("input position {pos} out of range"), span)
        })?;
        match assign(&callee, param, value) {
            Ok(bound) => callee = bound,
            // An input that does not fit the declared pattern means the
            // relation simply does not match.
            Err(EvalError {
                kind: EvalErrorKind::PatternMatchFailure { .. },
                ..
            }) => return Ok(Outcome::NotMatched),
            Err(other) => return Err(other),
        }
    }

    match exec_block(callee, &def.instrs)? {
        Control::Done(_, Sign::Res(outputs)) => Ok(Outcome::Matched(outputs)),
        Control::Done(_, Sign::Ret(_)) => Err(invalid_operation(
            "relation body returned a function value",
            span,
        )),
        Control::Done(_, Sign::Cont) | Control::Through(_) | Control::Premise(_) => {
            Ok(Outcome::NotMatched)
        }
    }
}
