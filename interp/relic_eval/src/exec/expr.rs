//! Expression evaluation.
//!
//! Strict, left-to-right, and total over the expression grammar: every
//! variant either produces a value or raises a structured error. Iterated
//! expressions fan out through the context's `sub_opt`/`sub_list` and run
//! strictly sequentially.

use relic_ir::{Exp, ExpKind, Iter, ListPat, Name, OptPat, Pat, Span, Typ, VarId};
use relic_value::Value;

use crate::builtins;
use crate::context::Ctx;
use crate::errors::{arity_mismatch, invalid_operation, unbound_name, EvalResult, NameKind};
use crate::exec::typ::{check_targ, downcast, is_subtype, upcast};
use crate::exec::{invoke_function, invoke_relation_def, Outcome};

/// Evaluate one expression to a value.
pub fn eval_exp(ctx: &Ctx, exp: &Exp) -> EvalResult<Value> {
    let span = exp.span;
    match &exp.kind {
        ExpKind::Bool(b) => Ok(Value::bool(*b)),
        ExpKind::Num(kind, int) => Ok(Value::num(int.clone(), *kind)),
        ExpKind::Text(s) => Ok(Value::text(s.clone())),
        ExpKind::Var(var) => eval_var(ctx, var, span),
        ExpKind::Tuple(exps) => Ok(Value::tuple(eval_all(ctx, exps)?)),
        ExpKind::List(exps) => Ok(Value::list(eval_all(ctx, exps)?)),
        ExpKind::Cons(head, tail) => {
            let head = eval_exp(ctx, head)?;
            let tail = eval_exp(ctx, tail)?;
            let items = tail.as_list().ok_or_else(|| {
                invalid_operation(format!("cons onto {}", tail.type_name()), span)
            })?;
            let mut out = Vec::with_capacity(items.len() + 1);
            out.push(head);
            out.extend_from_slice(items);
            Ok(Value::list(out))
        }
        ExpKind::Opt(None) => Ok(Value::none()),
        ExpKind::Opt(Some(inner)) => Ok(Value::some(eval_exp(ctx, inner)?)),
        ExpKind::Struct(fields) => {
            let names: Vec<Name> = fields.iter().map(|(name, _)| *name).collect();
            let layout = ctx.globals.struct_layout(&names);
            let mut values = Vec::with_capacity(fields.len());
            for (_, field) in fields {
                values.push(eval_exp(ctx, field)?);
            }
            Ok(Value::struct_(layout, values))
        }
        ExpKind::Dot(inner, field) => {
            let value = eval_exp(ctx, inner)?;
            let s = value.as_struct().ok_or_else(|| {
                invalid_operation(
                    format!("field access on {}", value.type_name()),
                    span,
                )
            })?;
            s.field(*field).cloned().ok_or_else(|| {
                invalid_operation(
                    format!("no field {} on struct", ctx.name_str(*field)),
                    span,
                )
            })
        }
        ExpKind::Case(mixop, exps) => Ok(Value::case(*mixop, eval_all(ctx, exps)?)),
        ExpKind::Call { func, targs, args } => eval_call(ctx, *func, targs, args, span),
        ExpKind::Hold {
            rel,
            args,
            negated,
        } => {
            let def = ctx
                .globals
                .reldef(*rel)
                .ok_or_else(|| unbound_name(NameKind::Rel, &ctx.name_str(*rel), span))?;
            if args.len() != def.arity() {
                return Err(arity_mismatch(
                    &ctx.name_str(*rel),
                    def.arity(),
                    args.len(),
                    span,
                ));
            }
            // Only the declared input positions are evaluated.
            let mut inputs = Vec::with_capacity(def.inputs.len());
            for &pos in &def.inputs {
                let arg = args.get(pos).ok_or_else(|| {
                    invalid_operation(format!("input position {pos} out of range"), span)
                })?;
                inputs.push(eval_exp(ctx, arg)?);
            }
            let outcome = invoke_relation_def(ctx, &def, inputs, span)?;
            let matched = matches!(outcome, Outcome::Matched(_));
            Ok(Value::bool(matched != *negated))
        }
        ExpKind::Iter { exp, iter, vars } => match iter {
            Iter::Opt => match ctx.sub_opt(vars, span)? {
                None => Ok(Value::none()),
                Some(sub) => Ok(Value::some(eval_exp(&sub, exp)?)),
            },
            Iter::List => {
                let subs = ctx.sub_list(vars, span)?;
                let mut out = Vec::with_capacity(subs.len());
                for sub in subs {
                    out.push(eval_exp(&sub, exp)?);
                }
                Ok(Value::list(out))
            }
        },
        ExpKind::Match(inner, pat) => {
            let value = eval_exp(ctx, inner)?;
            Ok(Value::bool(match_pat(&value, pat)))
        }
        ExpKind::Sub(inner, typ) => {
            let value = eval_exp(ctx, inner)?;
            Ok(Value::bool(is_subtype(ctx, &value, typ, span)?))
        }
        ExpKind::UpCast(inner, typ) => {
            let value = eval_exp(ctx, inner)?;
            upcast(ctx, value, typ, span)
        }
        ExpKind::DownCast(inner, typ) => {
            let value = eval_exp(ctx, inner)?;
            downcast(ctx, value, typ, span)
        }
    }
}

fn eval_all(ctx: &Ctx, exps: &[Exp]) -> EvalResult<Vec<Value>> {
    let mut out = Vec::with_capacity(exps.len());
    for exp in exps {
        out.push(eval_exp(ctx, exp)?);
    }
    Ok(out)
}

/// Variable lookup with function-reference fallback: a plain name that
/// misses the variable environment but names a function (local or global)
/// evaluates to a first-class function reference.
fn eval_var(ctx: &Ctx, var: &VarId, span: Span) -> EvalResult<Value> {
    if let Some(value) = ctx.venv.lookup(var) {
        return Ok(value.clone());
    }
    if var.iters.is_empty() {
        let plain = VarId::plain(var.name);
        if ctx.fenv.lookup(&plain).is_some() || ctx.globals.funcdef(var.name).is_some() {
            return Ok(Value::func(var.name));
        }
    }
    Err(unbound_name(NameKind::Var, &ctx.name_str(var.name), span))
}

fn eval_call(
    ctx: &Ctx,
    func: Name,
    targs: &[Typ],
    args: &[Exp],
    span: Span,
) -> EvalResult<Value> {
    for targ in targs {
        check_targ(ctx, targ, span)?;
    }
    if let Some(builtin) = ctx.globals.builtin_names.classify(func) {
        let values = eval_all(ctx, args)?;
        return builtins::dispatch(ctx, builtin, &values, span);
    }
    invoke_function(ctx, func, targs, args, span)
}

/// Shape test. A mismatched shape is `false`, never an error.
pub(crate) fn match_pat(value: &Value, pat: &Pat) -> bool {
    match pat {
        Pat::Case(mixop) => value.as_case().is_some_and(|c| c.mixop == *mixop),
        Pat::List(ListPat::Cons) => value.as_list().is_some_and(|l| !l.is_empty()),
        Pat::List(ListPat::Fixed(n)) => value.as_list().is_some_and(|l| l.len() == *n),
        Pat::List(ListPat::Nil) => value.as_list().is_some_and(|l| l.is_empty()),
        Pat::Opt(OptPat::Some) => matches!(value.as_opt(), Some(Some(_))),
        Pat::Opt(OptPat::None) => matches!(value.as_opt(), Some(None)),
    }
}
