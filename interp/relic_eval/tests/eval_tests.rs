//! End-to-end tests for the evaluation engine: builtins through `Call`
//! expressions, relation invocation, iteration, casts, and the error
//! taxonomy.

#![allow(clippy::unwrap_used)]

use std::sync::atomic::{AtomicU32, Ordering as AtomicOrdering};

use pretty_assertions::assert_eq;

use relic_eval::{
    eval_exp, eval_instrs, invoke_relation, Ctx, EvalErrorKind, Globals, NameKind, Outcome, Sign,
};
use relic_ir::{
    Def, Exp, ExpKind, FuncDef, Guard, Instr, InstrKind, Integer, Iter, IterBinding, ListPat,
    Name, NumKind, Pat, ProgPoint, RelDef, SharedInterner, Span, Typ, VarId,
};
use relic_value::Value;

static NEXT_POINT: AtomicU32 = AtomicU32::new(0);

fn new_ctx() -> Ctx {
    Ctx::new(Globals::new(SharedInterner::new()))
}

fn name(ctx: &Ctx, s: &str) -> Name {
    ctx.globals.interner.intern(s)
}

fn exp(kind: ExpKind) -> Exp {
    Exp::new(kind, Span::DUMMY)
}

fn nat(n: i64) -> Exp {
    exp(ExpKind::Num(NumKind::Nat, Integer::from(n)))
}

fn int(n: i64) -> Exp {
    exp(ExpKind::Num(NumKind::Int, Integer::from(n)))
}

fn text(s: &str) -> Exp {
    exp(ExpKind::Text(s.to_string()))
}

fn list(items: Vec<Exp>) -> Exp {
    exp(ExpKind::List(items))
}

fn var(ctx: &Ctx, s: &str) -> VarId {
    VarId::plain(name(ctx, s))
}

fn vexp(ctx: &Ctx, s: &str) -> Exp {
    exp(ExpKind::Var(var(ctx, s)))
}

fn call(ctx: &Ctx, func: &str, args: Vec<Exp>) -> Exp {
    exp(ExpKind::Call {
        func: name(ctx, func),
        targs: Vec::new(),
        args,
    })
}

fn instr(kind: InstrKind) -> Instr {
    let point = NEXT_POINT.fetch_add(1, AtomicOrdering::Relaxed);
    Instr::new(kind, Span::DUMMY, ProgPoint::new(point))
}

fn eval(ctx: &Ctx, e: &Exp) -> Value {
    eval_exp(ctx, e).unwrap()
}

// Builtins

#[test]
fn sum_of_empty_list_is_nat_zero() {
    let ctx = new_ctx();
    let result = eval(&ctx, &call(&ctx, "sum", vec![list(vec![])]));
    let num = result.as_num().unwrap();
    assert_eq!(num.int, Integer::ZERO);
    assert_eq!(num.kind, NumKind::Nat);
}

#[test]
fn sum_adds_everything() {
    let ctx = new_ctx();
    let arg = list((1..=5).map(nat).collect());
    assert_eq!(eval(&ctx, &call(&ctx, "sum", vec![arg])), Value::nat(15i64));
}

#[test]
fn bitacc_extracts_a_bit_field() {
    let ctx = new_ctx();
    let result = eval(
        &ctx,
        &call(&ctx, "bitacc", vec![nat(699_050), nat(3), nat(2)]),
    );
    assert_eq!(result, Value::nat(2i64));
}

#[test]
fn bitacc_rejects_crossed_bounds() {
    let ctx = new_ctx();
    let err = eval_exp(&ctx, &call(&ctx, "bitacc", vec![nat(1), nat(2), nat(5)])).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::InvalidOperation { .. }));
}

#[test]
fn to_int_sign_extends() {
    let ctx = new_ctx();
    let result = eval(&ctx, &call(&ctx, "to_int", vec![nat(4), nat(15)]));
    let num = result.as_num().unwrap();
    assert_eq!(num.int, Integer::from(-1i64));
    assert_eq!(num.kind, NumKind::Int);
}

#[test]
fn to_bitstr_normalizes_into_range() {
    let ctx = new_ctx();
    assert_eq!(
        eval(&ctx, &call(&ctx, "to_bitstr", vec![nat(4), int(-1)])),
        Value::nat(15i64)
    );
}

#[test]
fn strip_prefix_removes_a_real_prefix() {
    let ctx = new_ctx();
    let result = eval(
        &ctx,
        &call(&ctx, "strip_prefix", vec![text("hello_world"), text("hello_")]),
    );
    assert_eq!(result, Value::text("world"));
}

#[test]
fn strip_prefix_rejects_a_non_prefix() {
    let ctx = new_ctx();
    let err = eval_exp(
        &ctx,
        &call(&ctx, "strip_prefix", vec![text("hello"), text("bye")]),
    )
    .unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::InvalidOperation { .. }));
}

#[test]
fn builtin_arity_is_checked() {
    let ctx = new_ctx();
    let err = eval_exp(&ctx, &call(&ctx, "sum", vec![])).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::ArityMismatch { .. }));
}

fn entry_exp(ctx: &Ctx, k: Exp, v: Exp) -> Exp {
    exp(ExpKind::Case(ctx.globals.builtin_mixops.arrow, vec![k, v]))
}

fn map_exp(ctx: &Ctx, entries: Vec<Exp>) -> Exp {
    exp(ExpKind::Case(
        ctx.globals.builtin_mixops.braces,
        vec![list(entries)],
    ))
}

fn map_keys(ctx: &Ctx, map: &Value) -> Vec<Value> {
    let case = map.as_case().unwrap();
    assert_eq!(case.mixop, ctx.globals.builtin_mixops.braces);
    case.args[0]
        .as_list()
        .unwrap()
        .iter()
        .map(|e| e.as_case().unwrap().args[0].clone())
        .collect()
}

#[test]
fn add_map_inserts_in_key_order() {
    let ctx = new_ctx();
    let m = map_exp(
        &ctx,
        vec![
            entry_exp(&ctx, nat(1), text("a")),
            entry_exp(&ctx, nat(3), text("c")),
        ],
    );
    let result = eval(&ctx, &call(&ctx, "add_map", vec![m, nat(2), text("b")]));
    assert_eq!(
        map_keys(&ctx, &result),
        vec![Value::nat(1i64), Value::nat(2i64), Value::nat(3i64)]
    );
}

#[test]
fn add_map_replaces_an_equal_key() {
    let ctx = new_ctx();
    let m = map_exp(&ctx, vec![entry_exp(&ctx, nat(1), text("a"))]);
    let result = eval(&ctx, &call(&ctx, "add_map", vec![m, nat(1), text("z")]));
    let found = eval_exp(
        &ctx,
        &call(&ctx, "find_map", vec![exp_of(&result), nat(1)]),
    )
    .unwrap();
    assert_eq!(found, Value::some(Value::text("z")));
}

#[test]
fn update_map_requires_the_key() {
    let ctx = new_ctx();
    let m = map_exp(&ctx, vec![]);
    let err = eval_exp(&ctx, &call(&ctx, "update_map", vec![m, nat(1), text("x")]))
        .unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::InvalidOperation { .. }));
}

#[test]
fn set_operations_are_extensional() {
    let ctx = new_ctx();
    let braces = ctx.globals.builtin_mixops.braces;
    let a = exp(ExpKind::Case(braces, vec![list(vec![nat(1), nat(2)])]));
    let b = exp(ExpKind::Case(braces, vec![list(vec![nat(2), nat(1)])]));
    assert_eq!(
        eval(&ctx, &call(&ctx, "eq_set", vec![a.clone(), b.clone()])),
        Value::bool(true)
    );
    let union = eval(&ctx, &call(&ctx, "union_set", vec![a, b]));
    let elems = union.as_case().unwrap().args[0].as_list().unwrap().len();
    assert_eq!(elems, 2);
}

// Turn a computed value back into a literal expression for reuse in calls.
fn exp_of(value: &Value) -> Exp {
    match value {
        Value::Bool(b) => exp(ExpKind::Bool(*b)),
        Value::Num(n) => exp(ExpKind::Num(n.kind, n.int.clone())),
        Value::Text(s) => text(s),
        Value::List(items) => list(items.iter().map(exp_of).collect()),
        Value::Tuple(items) => exp(ExpKind::Tuple(items.iter().map(exp_of).collect())),
        Value::Case(c) => exp(ExpKind::Case(c.mixop, c.args.iter().map(exp_of).collect())),
        Value::Opt(None) => exp(ExpKind::Opt(None)),
        Value::Opt(Some(v)) => exp(ExpKind::Opt(Some(Box::new(exp_of(v))))),
        _ => unreachable!("not used for structs or functions in tests"),
    }
}

// Relations

/// `double(x ; y)`: one input, one output, `y = sum([x, x])`.
fn load_double(ctx: &Ctx) -> Name {
    let rel = name(ctx, "double");
    let x = vexp(ctx, "x");
    ctx.globals.load_definition(Def::Rel(RelDef {
        name: rel,
        inputs: vec![0],
        params: vec![x.clone(), vexp(ctx, "y")],
        instrs: vec![instr(InstrKind::Result(vec![call(
            ctx,
            "sum",
            vec![list(vec![x.clone(), x])],
        )]))],
    }));
    rel
}

#[test]
fn relation_matches_with_outputs() {
    let ctx = new_ctx();
    let rel = load_double(&ctx);
    let outcome = invoke_relation(&ctx, rel, vec![Value::nat(3i64)], Span::DUMMY).unwrap();
    assert_eq!(outcome, Outcome::Matched(vec![Value::nat(6i64)]));
}

#[test]
fn undefined_relation_is_unbound() {
    let ctx = new_ctx();
    let missing = name(&ctx, "nope");
    let err = invoke_relation(&ctx, missing, vec![], Span::DUMMY).unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::UnboundName {
            kind: NameKind::Rel,
            name: "nope".to_string()
        }
    );
}

#[test]
fn body_without_result_does_not_match() {
    let ctx = new_ctx();
    let rel = name(&ctx, "never");
    ctx.globals.load_definition(Def::Rel(RelDef {
        name: rel,
        inputs: vec![0],
        params: vec![vexp(&ctx, "x")],
        instrs: vec![],
    }));
    let outcome = invoke_relation(&ctx, rel, vec![Value::nat(1i64)], Span::DUMMY).unwrap();
    assert_eq!(outcome, Outcome::NotMatched);
}

#[test]
fn input_pattern_mismatch_means_not_matched() {
    let ctx = new_ctx();
    let rel = name(&ctx, "only_zero");
    ctx.globals.load_definition(Def::Rel(RelDef {
        name: rel,
        inputs: vec![0],
        params: vec![nat(0)],
        instrs: vec![instr(InstrKind::Result(vec![]))],
    }));
    let hit = invoke_relation(&ctx, rel, vec![Value::nat(0i64)], Span::DUMMY).unwrap();
    assert_eq!(hit, Outcome::Matched(vec![]));
    let miss = invoke_relation(&ctx, rel, vec![Value::nat(7i64)], Span::DUMMY).unwrap();
    assert_eq!(miss, Outcome::NotMatched);
}

/// `positive(x)`: holds iff `x` is a natural number.
fn load_positive(ctx: &Ctx) -> Name {
    let rel = name(ctx, "positive");
    ctx.globals.load_definition(Def::Rel(RelDef {
        name: rel,
        inputs: vec![0],
        params: vec![vexp(ctx, "x")],
        instrs: vec![instr(InstrKind::If {
            cond: exp(ExpKind::Sub(
                Box::new(vexp(ctx, "x")),
                Typ::Num(NumKind::Nat),
            )),
            iters: vec![],
            then: vec![instr(InstrKind::Result(vec![]))],
        })],
    }));
    rel
}

#[test]
fn failed_if_falls_through_to_not_matched() {
    let ctx = new_ctx();
    let rel = load_positive(&ctx);
    assert_eq!(
        invoke_relation(&ctx, rel, vec![Value::nat(5i64)], Span::DUMMY).unwrap(),
        Outcome::Matched(vec![])
    );
    assert_eq!(
        invoke_relation(&ctx, rel, vec![Value::int(-5i64)], Span::DUMMY).unwrap(),
        Outcome::NotMatched
    );
}

#[test]
fn failed_premise_stops_the_enclosing_relation() {
    let ctx = new_ctx();
    let positive = load_positive(&ctx);
    let rel = name(&ctx, "checked");
    ctx.globals.load_definition(Def::Rel(RelDef {
        name: rel,
        inputs: vec![0],
        params: vec![vexp(&ctx, "x"), vexp(&ctx, "y")],
        instrs: vec![
            instr(InstrKind::Rule {
                rel: positive,
                exps: vec![vexp(&ctx, "x")],
                iters: vec![],
            }),
            instr(InstrKind::Result(vec![vexp(&ctx, "x")])),
        ],
    }));
    assert_eq!(
        invoke_relation(&ctx, rel, vec![Value::nat(2i64)], Span::DUMMY).unwrap(),
        Outcome::Matched(vec![Value::nat(2i64)])
    );
    assert_eq!(
        invoke_relation(&ctx, rel, vec![Value::int(-2i64)], Span::DUMMY).unwrap(),
        Outcome::NotMatched
    );
}

#[test]
fn rule_binds_relation_outputs() {
    let ctx = new_ctx();
    let double = load_double(&ctx);
    let rel = name(&ctx, "quadruple");
    ctx.globals.load_definition(Def::Rel(RelDef {
        name: rel,
        inputs: vec![0],
        params: vec![vexp(&ctx, "x"), vexp(&ctx, "y")],
        instrs: vec![
            instr(InstrKind::Rule {
                rel: double,
                exps: vec![vexp(&ctx, "x"), vexp(&ctx, "m")],
                iters: vec![],
            }),
            instr(InstrKind::Rule {
                rel: double,
                exps: vec![vexp(&ctx, "m"), vexp(&ctx, "q")],
                iters: vec![],
            }),
            instr(InstrKind::Result(vec![vexp(&ctx, "q")])),
        ],
    }));
    assert_eq!(
        invoke_relation(&ctx, rel, vec![Value::nat(3i64)], Span::DUMMY).unwrap(),
        Outcome::Matched(vec![Value::nat(12i64)])
    );
}

#[test]
fn case_commits_to_the_first_matching_arm() {
    let ctx = new_ctx();
    let rel = name(&ctx, "classify");
    ctx.globals.load_definition(Def::Rel(RelDef {
        name: rel,
        inputs: vec![0],
        params: vec![vexp(&ctx, "x"), vexp(&ctx, "label")],
        instrs: vec![instr(InstrKind::Case {
            exp: vexp(&ctx, "x"),
            arms: vec![
                relic_ir::CaseArm {
                    guard: Guard::Cmp(relic_ir::CmpOp::Lt, nat(10)),
                    body: vec![instr(InstrKind::Result(vec![text("small")]))],
                },
                relic_ir::CaseArm {
                    guard: Guard::Cmp(relic_ir::CmpOp::Lt, nat(100)),
                    body: vec![instr(InstrKind::Result(vec![text("medium")]))],
                },
            ],
        })],
    }));
    // 5 < 10 and 5 < 100; the first arm wins and is never reconsidered.
    assert_eq!(
        invoke_relation(&ctx, rel, vec![Value::nat(5i64)], Span::DUMMY).unwrap(),
        Outcome::Matched(vec![Value::text("small")])
    );
    assert_eq!(
        invoke_relation(&ctx, rel, vec![Value::nat(50i64)], Span::DUMMY).unwrap(),
        Outcome::Matched(vec![Value::text("medium")])
    );
    // No arm matches: fall through, no result, not matched.
    assert_eq!(
        invoke_relation(&ctx, rel, vec![Value::nat(500i64)], Span::DUMMY).unwrap(),
        Outcome::NotMatched
    );
}

#[test]
fn hold_expression_yields_a_boolean() {
    let ctx = new_ctx();
    let double = load_double(&ctx);
    // The output position is never evaluated; an unbound var there is fine.
    let holds = exp(ExpKind::Hold {
        rel: double,
        args: vec![nat(3), vexp(&ctx, "unused")],
        negated: false,
    });
    assert_eq!(eval(&ctx, &holds), Value::bool(true));

    let negated = exp(ExpKind::Hold {
        rel: double,
        args: vec![nat(3), vexp(&ctx, "unused")],
        negated: true,
    });
    assert_eq!(eval(&ctx, &negated), Value::bool(false));
}

#[test]
fn out_of_range_input_position_is_an_error() {
    let ctx = new_ctx();
    // Arity 2, but the declared input position points past both parameters.
    let rel = name(&ctx, "skewed");
    ctx.globals.load_definition(Def::Rel(RelDef {
        name: rel,
        inputs: vec![7],
        params: vec![vexp(&ctx, "x"), vexp(&ctx, "y")],
        instrs: vec![instr(InstrKind::Result(vec![vexp(&ctx, "x")]))],
    }));

    let holds = exp(ExpKind::Hold {
        rel,
        args: vec![nat(1), nat(2)],
        negated: false,
    });
    let err = eval_exp(&ctx, &holds).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::InvalidOperation { .. }));
    assert!(err.message.contains("out of range"));

    let caller = name(&ctx, "caller");
    ctx.globals.load_definition(Def::Rel(RelDef {
        name: caller,
        inputs: vec![0],
        params: vec![vexp(&ctx, "a")],
        instrs: vec![
            instr(InstrKind::Rule {
                rel,
                exps: vec![vexp(&ctx, "a"), vexp(&ctx, "b")],
                iters: vec![],
            }),
            instr(InstrKind::Result(vec![])),
        ],
    }));
    let err = invoke_relation(&ctx, caller, vec![Value::nat(1i64)], Span::DUMMY).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::InvalidOperation { .. }));
    assert!(err.message.contains("out of range"));
}

#[test]
fn memoization_does_not_change_outcomes() {
    let ctx = new_ctx();
    let rel = load_double(&ctx);
    ctx.globals.enable_memo();
    let first = invoke_relation(&ctx, rel, vec![Value::nat(4i64)], Span::DUMMY).unwrap();
    let second = invoke_relation(&ctx, rel, vec![Value::nat(4i64)], Span::DUMMY).unwrap();
    assert_eq!(first, second);
    assert_eq!(first, Outcome::Matched(vec![Value::nat(8i64)]));
}

#[test]
fn coverage_records_executed_instructions() {
    let ctx = new_ctx();
    let rel = load_positive(&ctx);
    assert!(ctx.cover.is_empty());
    invoke_relation(&ctx, rel, vec![Value::nat(1i64)], Span::DUMMY).unwrap();
    assert!(!ctx.cover.is_empty());
}

// Iteration

#[test]
fn iterated_expression_maps_over_a_list() {
    let ctx = new_ctx();
    let x = var(&ctx, "x");
    let bound = ctx.bind(
        &x.suffixed(Iter::List),
        Value::list(vec![Value::nat(1i64), Value::nat(2i64), Value::nat(3i64)]),
    );
    let iterated = exp(ExpKind::Iter {
        exp: Box::new(call(&ctx, "pow2", vec![vexp(&ctx, "x")])),
        iter: Iter::List,
        vars: vec![x],
    });
    assert_eq!(
        eval(&bound, &iterated),
        Value::list(vec![Value::nat(2i64), Value::nat(4i64), Value::nat(8i64)])
    );
}

#[test]
fn iterated_let_collects_results() {
    let ctx = new_ctx();
    let x = var(&ctx, "x");
    let y = var(&ctx, "y");
    let bound = ctx.bind(
        &x.suffixed(Iter::List),
        Value::list(vec![Value::nat(1i64), Value::nat(2i64)]),
    );
    let let_instr = instr(InstrKind::Let {
        lhs: vexp(&ctx, "y"),
        rhs: call(&ctx, "pow2", vec![vexp(&ctx, "x")]),
        iters: vec![IterBinding {
            iter: Iter::List,
            vars: vec![x, y.clone()],
        }],
    });
    let (after, sign) = eval_instrs(bound, &[let_instr]).unwrap();
    assert_eq!(sign, Sign::Cont);
    assert_eq!(
        after.lookup_var(&y.suffixed(Iter::List)),
        Some(&Value::list(vec![Value::nat(2i64), Value::nat(4i64)]))
    );
}

#[test]
fn iterated_let_over_an_absent_option() {
    let ctx = new_ctx();
    let x = var(&ctx, "x");
    let y = var(&ctx, "y");
    let bound = ctx.bind(&x.suffixed(Iter::Opt), Value::none());
    let let_instr = instr(InstrKind::Let {
        lhs: vexp(&ctx, "y"),
        rhs: vexp(&ctx, "x"),
        iters: vec![IterBinding {
            iter: Iter::Opt,
            vars: vec![x, y.clone()],
        }],
    });
    let (after, _) = eval_instrs(bound, &[let_instr]).unwrap();
    assert_eq!(after.lookup_var(&y.suffixed(Iter::Opt)), Some(&Value::none()));
}

#[test]
fn iterated_rule_over_an_option_is_not_implemented() {
    let ctx = new_ctx();
    let rel = load_double(&ctx);
    let x = var(&ctx, "x");
    let y = var(&ctx, "y");
    let bound = ctx.bind(&x.suffixed(Iter::Opt), Value::some(Value::nat(1i64)));
    let rule = instr(InstrKind::Rule {
        rel,
        exps: vec![vexp(&ctx, "x"), vexp(&ctx, "y")],
        iters: vec![IterBinding {
            iter: Iter::Opt,
            vars: vec![x, y],
        }],
    });
    let err = eval_instrs(bound, &[rule]).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::NotImplemented { .. }));
}

#[test]
fn iterated_rule_collects_rows() {
    let ctx = new_ctx();
    let double = load_double(&ctx);
    let x = var(&ctx, "x");
    let y = var(&ctx, "y");
    let bound = ctx.bind(
        &x.suffixed(Iter::List),
        Value::list(vec![Value::nat(1i64), Value::nat(5i64)]),
    );
    let rule = instr(InstrKind::Rule {
        rel: double,
        exps: vec![vexp(&ctx, "x"), vexp(&ctx, "y")],
        iters: vec![IterBinding {
            iter: Iter::List,
            vars: vec![x, y.clone()],
        }],
    });
    let (after, sign) = eval_instrs(bound, &[rule]).unwrap();
    assert_eq!(sign, Sign::Cont);
    assert_eq!(
        after.lookup_var(&y.suffixed(Iter::List)),
        Some(&Value::list(vec![Value::nat(2i64), Value::nat(10i64)]))
    );
}

// Functions, casts, patterns, errors

#[test]
fn function_calls_return_values() {
    let ctx = new_ctx();
    let func = name(&ctx, "triple");
    let x = vexp(&ctx, "x");
    ctx.globals.load_definition(Def::Func(FuncDef {
        name: func,
        tparams: vec![],
        params: vec![relic_ir::Param::Exp(var(&ctx, "x"))],
        instrs: vec![instr(InstrKind::Return(call(
            &ctx,
            "sum",
            vec![list(vec![x.clone(), x.clone(), x])],
        )))],
    }));
    assert_eq!(
        eval(&ctx, &call(&ctx, "triple", vec![nat(7)])),
        Value::nat(21i64)
    );
}

#[test]
fn function_without_return_is_an_error() {
    let ctx = new_ctx();
    let func = name(&ctx, "silent");
    ctx.globals.load_definition(Def::Func(FuncDef {
        name: func,
        tparams: vec![],
        params: vec![],
        instrs: vec![],
    }));
    let err = eval_exp(&ctx, &call(&ctx, "silent", vec![])).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::InvalidOperation { .. }));
}

#[test]
fn runaway_recursion_hits_the_depth_guard() {
    let ctx = new_ctx();
    let func = name(&ctx, "omega");
    ctx.globals.load_definition(Def::Func(FuncDef {
        name: func,
        tparams: vec![],
        params: vec![],
        instrs: vec![instr(InstrKind::Return(call(&ctx, "omega", vec![])))],
    }));
    let err = eval_exp(&ctx, &call(&ctx, "omega", vec![])).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::InvalidOperation { .. }));
    assert!(err.message.contains("recursion limit"));
    assert!(!err.frames.is_empty());
}

#[test]
fn function_type_argument_is_rejected() {
    let ctx = new_ctx();
    let e = exp(ExpKind::Call {
        func: name(&ctx, "sum"),
        targs: vec![Typ::Func],
        args: vec![list(vec![])],
    });
    let err = eval_exp(&ctx, &e).unwrap_err();
    assert!(matches!(
        err.kind,
        EvalErrorKind::TypeSubstitutionError { .. }
    ));
}

#[test]
fn unbound_variable_is_reported_by_name() {
    let ctx = new_ctx();
    let err = eval_exp(&ctx, &vexp(&ctx, "ghost")).unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::UnboundName {
            kind: NameKind::Var,
            name: "ghost".to_string()
        }
    );
}

#[test]
fn match_expression_tests_shape_without_failing() {
    let ctx = new_ctx();
    let non_empty = exp(ExpKind::Match(
        Box::new(list(vec![nat(1)])),
        Pat::List(ListPat::Cons),
    ));
    assert_eq!(eval(&ctx, &non_empty), Value::bool(true));

    let wrong_shape = exp(ExpKind::Match(Box::new(nat(1)), Pat::List(ListPat::Nil)));
    assert_eq!(eval(&ctx, &wrong_shape), Value::bool(false));
}

#[test]
fn upcast_rekinds_nat_to_int() {
    let ctx = new_ctx();
    let e = exp(ExpKind::UpCast(Box::new(nat(3)), Typ::Num(NumKind::Int)));
    let num = eval(&ctx, &e);
    assert_eq!(num.as_num().unwrap().kind, NumKind::Int);
}

#[test]
fn downcast_to_nat_requires_non_negative() {
    let ctx = new_ctx();
    let ok = exp(ExpKind::DownCast(Box::new(int(4)), Typ::Num(NumKind::Nat)));
    assert_eq!(eval(&ctx, &ok).as_num().unwrap().kind, NumKind::Nat);

    let bad = exp(ExpKind::DownCast(Box::new(int(-1)), Typ::Num(NumKind::Nat)));
    let err = eval_exp(&ctx, &bad).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::InvalidOperation { .. }));
}

#[test]
fn cons_splits_in_let_and_fails_on_empty() {
    let ctx = new_ctx();
    let lhs = exp(ExpKind::Cons(
        Box::new(vexp(&ctx, "h")),
        Box::new(vexp(&ctx, "t")),
    ));
    let split = instr(InstrKind::Let {
        lhs: lhs.clone(),
        rhs: list(vec![nat(1), nat(2)]),
        iters: vec![],
    });
    let (after, _) = eval_instrs(ctx.clone(), &[split]).unwrap();
    assert_eq!(after.lookup_var(&var(&ctx, "h")), Some(&Value::nat(1i64)));
    assert_eq!(
        after.lookup_var(&var(&ctx, "t")),
        Some(&Value::list(vec![Value::nat(2i64)]))
    );

    let empty = instr(InstrKind::Let {
        lhs,
        rhs: list(vec![]),
        iters: vec![],
    });
    let err = eval_instrs(ctx, &[empty]).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::PatternMatchFailure { .. }));
}
