//! Instruction evaluation.
//!
//! Instruction lists fold a context left to right and stop at the first
//! terminal. Three things can end a block: a `Result`/`Return` terminal, a
//! relation premise that does not match, or falling off the end. The
//! distinction matters because a failed premise must unwind through every
//! enclosing block of the relation body, while a nested block that merely
//! falls through lets its parent continue.

use std::cmp::Ordering;

use relic_ir::{
    CmpOp, Exp, ExpKind, Guard, Instr, InstrKind, Iter, IterBinding, RelDef, Span, VarId,
};
use relic_value::{compare, eq, Value};

use crate::context::Ctx;
use crate::errors::{
    arity_mismatch, invalid_operation, not_implemented, pattern_match_failure, unbound_name,
    EvalResult, NameKind,
};
use crate::exec::expr::{eval_exp, match_pat};
use crate::exec::typ::is_subtype;
use crate::exec::{invoke_relation_def, Outcome, Sign};

/// How a block ended.
pub(crate) enum Control {
    /// Fell off the end; bindings flow to the next instruction.
    Through(Ctx),
    /// A terminal instruction produced a sign.
    Done(Ctx, Sign),
    /// A relation premise did not match.
    Premise(Ctx),
}

/// Run an instruction list, recording coverage as each instruction executes.
pub(crate) fn exec_block(mut ctx: Ctx, instrs: &[Instr]) -> EvalResult<Control> {
    for instr in instrs {
        ctx.cover.record(instr.point);
        match step(ctx, instr)? {
            Control::Through(next) => ctx = next,
            done => return Ok(done),
        }
    }
    Ok(Control::Through(ctx))
}

fn step(ctx: Ctx, instr: &Instr) -> EvalResult<Control> {
    let span = instr.span;
    match &instr.kind {
        InstrKind::If { cond, iters, then } => {
            if cond_holds(&ctx, cond, iters, span)? {
                exec_block(ctx, then)
            } else {
                Ok(Control::Through(ctx))
            }
        }
        InstrKind::Case { exp, arms } => {
            let scrutinee = eval_exp(&ctx, exp)?;
            for arm in arms {
                if guard_holds(&ctx, &scrutinee, &arm.guard, span)? {
                    // First match commits; later arms are never consulted.
                    return exec_block(ctx, &arm.body);
                }
            }
            Ok(Control::Through(ctx))
        }
        InstrKind::Let { lhs, rhs, iters } => {
            let next = eval_let(&ctx, lhs, rhs, iters, span)?;
            Ok(Control::Through(next))
        }
        InstrKind::Rule { rel, exps, iters } => {
            let def = ctx
                .globals
                .reldef(*rel)
                .ok_or_else(|| unbound_name(NameKind::Rel, &ctx.name_str(*rel), span))?;
            if exps.len() != def.arity() {
                return Err(arity_mismatch(
                    &ctx.name_str(*rel),
                    def.arity(),
                    exps.len(),
                    span,
                ));
            }
            match eval_rule(&ctx, &def, exps, iters, span)? {
                Some(next) => Ok(Control::Through(next)),
                None => Ok(Control::Premise(ctx)),
            }
        }
        InstrKind::Result(exps) => {
            let mut outputs = Vec::with_capacity(exps.len());
            for exp in exps {
                outputs.push(eval_exp(&ctx, exp)?);
            }
            Ok(Control::Done(ctx, Sign::Res(outputs)))
        }
        InstrKind::Return(exp) => {
            let value = eval_exp(&ctx, exp)?;
            Ok(Control::Done(ctx, Sign::Ret(value)))
        }
    }
}

/// Evaluate an `If` condition under its iteration bindings: a short-circuit
/// conjunction over the fan-out. The first declared binding is innermost,
/// so recursion peels from the back. Zero iterations hold vacuously.
fn cond_holds(ctx: &Ctx, cond: &Exp, iters: &[IterBinding], span: Span) -> EvalResult<bool> {
    let Some((outer, rest)) = iters.split_last() else {
        let value = eval_exp(ctx, cond)?;
        return value.as_bool().ok_or_else(|| {
            invalid_operation(
                format!("condition must be a boolean, got {}", value.type_name()),
                span,
            )
        });
    };
    match outer.iter {
        Iter::Opt => match ctx.sub_opt(&outer.vars, span)? {
            None => Ok(true),
            Some(sub) => cond_holds(&sub, cond, rest, span),
        },
        Iter::List => {
            for sub in ctx.sub_list(&outer.vars, span)? {
                if !cond_holds(&sub, cond, rest, span)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
    }
}

fn guard_holds(ctx: &Ctx, scrutinee: &Value, guard: &Guard, span: Span) -> EvalResult<bool> {
    match guard {
        Guard::Eq(exp) => Ok(eq(scrutinee, &eval_exp(ctx, exp)?)),
        Guard::NotEq(exp) => Ok(!eq(scrutinee, &eval_exp(ctx, exp)?)),
        Guard::Cmp(op, exp) => {
            let ord = compare(scrutinee, &eval_exp(ctx, exp)?);
            Ok(match op {
                CmpOp::Lt => ord == Ordering::Less,
                CmpOp::Gt => ord == Ordering::Greater,
                CmpOp::Le => ord != Ordering::Greater,
                CmpOp::Ge => ord != Ordering::Less,
            })
        }
        Guard::Sub(typ) => is_subtype(ctx, scrutinee, typ, span),
        Guard::Match(pat) => Ok(match_pat(scrutinee, pat)),
        Guard::Mem(exp) => {
            let value = eval_exp(ctx, exp)?;
            let items = value.as_list().ok_or_else(|| {
                invalid_operation(
                    format!("membership test against {}", value.type_name()),
                    span,
                )
            })?;
            Ok(items.iter().any(|item| eq(item, scrutinee)))
        }
    }
}

/// Destructure `value` into `lhs`, extending the context with the bindings.
///
/// Variables bind unconditionally; composite shapes destructure elementwise;
/// anything else evaluates and must compare equal.
pub(crate) fn assign(ctx: &Ctx, lhs: &Exp, value: &Value) -> EvalResult<Ctx> {
    let span = lhs.span;
    match &lhs.kind {
        ExpKind::Var(var) => Ok(ctx.bind(var, value.clone())),
        ExpKind::Tuple(exps) => {
            let items = value.as_tuple().ok_or_else(|| {
                pattern_match_failure(
                    format!("expected a tuple, got {}", value.type_name()),
                    span,
                )
            })?;
            assign_all(ctx, exps, items, "tuple", span)
        }
        ExpKind::List(exps) => {
            let items = value.as_list().ok_or_else(|| {
                pattern_match_failure(
                    format!("expected a list, got {}", value.type_name()),
                    span,
                )
            })?;
            assign_all(ctx, exps, items, "list", span)
        }
        ExpKind::Cons(head, tail) => {
            let items = value.as_list().ok_or_else(|| {
                pattern_match_failure(
                    format!("expected a list, got {}", value.type_name()),
                    span,
                )
            })?;
            let Some((first, rest)) = items.split_first() else {
                return Err(pattern_match_failure("cannot split an empty list", span));
            };
            let ctx = assign(ctx, head, first)?;
            assign(&ctx, tail, &Value::list(rest.to_vec()))
        }
        ExpKind::Opt(Some(inner)) => match value.as_opt() {
            Some(Some(item)) => assign(ctx, inner, item),
            Some(None) => Err(pattern_match_failure("expected a present optional", span)),
            None => Err(pattern_match_failure(
                format!("expected an optional, got {}", value.type_name()),
                span,
            )),
        },
        ExpKind::Opt(None) => match value.as_opt() {
            Some(None) => Ok(ctx.clone()),
            Some(Some(_)) => Err(pattern_match_failure("expected an absent optional", span)),
            None => Err(pattern_match_failure(
                format!("expected an optional, got {}", value.type_name()),
                span,
            )),
        },
        ExpKind::Case(mixop, exps) => {
            let case = value.as_case().ok_or_else(|| {
                pattern_match_failure(
                    format!("expected a case value, got {}", value.type_name()),
                    span,
                )
            })?;
            if case.mixop != *mixop {
                return Err(pattern_match_failure("constructor mismatch", span));
            }
            let args = case.args.clone();
            assign_all(ctx, exps, &args, "case", span)
        }
        // Anything else is a ground pattern: evaluate and require equality.
        _ => {
            let expected = eval_exp(ctx, lhs)?;
            if eq(&expected, value) {
                Ok(ctx.clone())
            } else {
                Err(pattern_match_failure(
                    format!("expected {expected}, got {value}"),
                    span,
                ))
            }
        }
    }
}

fn assign_all(
    ctx: &Ctx,
    exps: &[Exp],
    items: &[Value],
    what: &str,
    span: Span,
) -> EvalResult<Ctx> {
    if exps.len() != items.len() {
        return Err(pattern_match_failure(
            format!(
                "{what} pattern of {} against {} elements",
                exps.len(),
                items.len()
            ),
            span,
        ));
    }
    let mut ctx = ctx.clone();
    for (exp, item) in exps.iter().zip(items) {
        ctx = assign(&ctx, exp, item)?;
    }
    Ok(ctx)
}

/// Split one iteration binding's variables into guides (already bound at
/// the iterated key, driving the fan-out) and results (collected from the
/// per-element bindings afterwards).
fn partition_binding<'a>(
    ctx: &Ctx,
    binding: &'a IterBinding,
) -> (Vec<VarId>, Vec<&'a VarId>) {
    let mut guides = Vec::new();
    let mut results = Vec::new();
    for var in &binding.vars {
        if ctx.venv.lookup(&var.suffixed(binding.iter)).is_some() {
            guides.push(var.clone());
        } else {
            results.push(var);
        }
    }
    (guides, results)
}

fn collect_result(ctx: &Ctx, bound: &Ctx, var: &VarId, span: Span) -> EvalResult<Value> {
    bound
        .lookup_var(var)
        .cloned()
        .ok_or_else(|| unbound_name(NameKind::Var, &ctx.name_str(var.name), span))
}

/// A `Let`, possibly iterated. Returns the extended context.
fn eval_let(
    ctx: &Ctx,
    lhs: &Exp,
    rhs: &Exp,
    iters: &[IterBinding],
    span: Span,
) -> EvalResult<Ctx> {
    let Some((outer, rest)) = iters.split_last() else {
        let value = eval_exp(ctx, rhs)?;
        return assign(ctx, lhs, &value);
    };
    let (guides, results) = partition_binding(ctx, outer);
    if guides.is_empty() {
        return Err(invalid_operation(
            "iterated binding has no bound variables to drive it",
            span,
        ));
    }
    match outer.iter {
        Iter::List => {
            let rows = ctx.sub_list(&guides, span)?;
            let mut collected: Vec<Vec<Value>> =
                results.iter().map(|_| Vec::with_capacity(rows.len())).collect();
            for row in rows {
                let bound = eval_let(&row, lhs, rhs, rest, span)?;
                for (column, var) in collected.iter_mut().zip(&results) {
                    column.push(collect_result(ctx, &bound, var, span)?);
                }
            }
            let mut next = ctx.clone();
            for (var, column) in results.iter().zip(collected) {
                next.venv = next
                    .venv
                    .extend(&var.suffixed(Iter::List), Value::list(column));
            }
            Ok(next)
        }
        Iter::Opt => match ctx.sub_opt(&guides, span)? {
            None => {
                let mut next = ctx.clone();
                for var in &results {
                    next.venv = next.venv.extend(&var.suffixed(Iter::Opt), Value::none());
                }
                Ok(next)
            }
            Some(sub) => {
                let bound = eval_let(&sub, lhs, rhs, rest, span)?;
                let mut next = ctx.clone();
                for var in &results {
                    let value = collect_result(ctx, &bound, var, span)?;
                    next.venv = next
                        .venv
                        .extend(&var.suffixed(Iter::Opt), Value::some(value));
                }
                Ok(next)
            }
        },
    }
}

/// A `Rule` premise, possibly iterated. `None` means the premise did not
/// match and the enclosing relation reports `NotMatched`.
fn eval_rule(
    ctx: &Ctx,
    def: &std::rc::Rc<RelDef>,
    exps: &[Exp],
    iters: &[IterBinding],
    span: Span,
) -> EvalResult<Option<Ctx>> {
    let Some((outer, rest)) = iters.split_last() else {
        let mut inputs = Vec::with_capacity(def.inputs.len());
        for &pos in &def.inputs {
            let arg = exps.get(pos).ok_or_else(|| {
                invalid_operation(format!("input position {pos} out of range"), span)
            })?;
            inputs.push(eval_exp(ctx, arg)?);
        }
        return match invoke_relation_def(ctx, def, inputs, span)? {
            Outcome::NotMatched => Ok(None),
            Outcome::Matched(outputs) => {
                let out_positions: Vec<usize> =
                    (0..def.arity()).filter(|p| !def.inputs.contains(p)).collect();
                if outputs.len() != out_positions.len() {
                    return Err(arity_mismatch(
                        "relation outputs",
                        out_positions.len(),
                        outputs.len(),
                        span,
                    ));
                }
                let mut next = ctx.clone();
                for (&pos, output) in out_positions.iter().zip(&outputs) {
                    next = assign(&next, &exps[pos], output)?;
                }
                Ok(Some(next))
            }
        };
    };
    match outer.iter {
        Iter::Opt => Err(not_implemented(
            "optional iteration over relation premises",
            span,
        )),
        Iter::List => {
            let (guides, results) = partition_binding(ctx, outer);
            if guides.is_empty() {
                return Err(invalid_operation(
                    "iterated premise has no bound variables to drive it",
                    span,
                ));
            }
            let rows = ctx.sub_list(&guides, span)?;
            let mut collected: Vec<Vec<Value>> =
                results.iter().map(|_| Vec::with_capacity(rows.len())).collect();
            for row in rows {
                let Some(bound) = eval_rule(&row, def, exps, rest, span)? else {
                    return Ok(None);
                };
                for (column, var) in collected.iter_mut().zip(&results) {
                    column.push(collect_result(ctx, &bound, var, span)?);
                }
            }
            let mut next = ctx.clone();
            for (var, column) in results.iter().zip(collected) {
                next.venv = next
                    .venv
                    .extend(&var.suffixed(Iter::List), Value::list(column));
            }
            Ok(Some(next))
        }
    }
}
