//! The builtin function library.
//!
//! Builtins are dispatched by pre-interned name, so the hot path never
//! resolves strings. Every operation works through structural `eq`/`compare`
//! only, and every domain violation surfaces as a structured error rather
//! than a wrong answer.

mod lists;
mod maps;
mod numeric;
mod sets;
mod text;

use std::cmp::Ordering;

use relic_ir::{Name, Span, StringInterner};
use relic_value::{Num, Value};

use crate::context::Ctx;
use crate::errors::{arity_mismatch, invalid_operation, EvalResult};

/// A resolved builtin operation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Builtin {
    Sum,
    Max,
    Min,
    Shl,
    Shr,
    Band,
    Bxor,
    Bor,
    Bneg,
    Bitacc,
    Pow2,
    ToInt,
    ToBitstr,
    StripPrefix,
    StripSuffix,
    Rev,
    Concat,
    Distinct,
    Partition,
    Assoc,
    UnionSet,
    IntersectSet,
    DiffSet,
    SubSet,
    EqSet,
    UnionsSet,
    AddMap,
    UpdateMap,
    FindMap,
    MemMap,
}

/// Pre-interned builtin names for hot-path dispatch.
pub(crate) struct BuiltinNames {
    sum: Name,
    max: Name,
    min: Name,
    shl: Name,
    shr: Name,
    band: Name,
    bxor: Name,
    bor: Name,
    bneg: Name,
    bitacc: Name,
    pow2: Name,
    to_int: Name,
    to_bitstr: Name,
    strip_prefix: Name,
    strip_suffix: Name,
    rev: Name,
    concat: Name,
    distinct: Name,
    partition: Name,
    assoc: Name,
    union_set: Name,
    intersect_set: Name,
    diff_set: Name,
    sub_set: Name,
    eq_set: Name,
    unions_set: Name,
    add_map: Name,
    update_map: Name,
    find_map: Name,
    mem_map: Name,
}

impl BuiltinNames {
    pub(crate) fn new(interner: &StringInterner) -> Self {
        BuiltinNames {
            sum: interner.intern("sum"),
            max: interner.intern("max"),
            min: interner.intern("min"),
            shl: interner.intern("shl"),
            shr: interner.intern("shr"),
            band: interner.intern("band"),
            bxor: interner.intern("bxor"),
            bor: interner.intern("bor"),
            bneg: interner.intern("bneg"),
            bitacc: interner.intern("bitacc"),
            pow2: interner.intern("pow2"),
            to_int: interner.intern("to_int"),
            to_bitstr: interner.intern("to_bitstr"),
            strip_prefix: interner.intern("strip_prefix"),
            strip_suffix: interner.intern("strip_suffix"),
            rev: interner.intern("rev_"),
            concat: interner.intern("concat_"),
            distinct: interner.intern("distinct_"),
            partition: interner.intern("partition_"),
            assoc: interner.intern("assoc_"),
            union_set: interner.intern("union_set"),
            intersect_set: interner.intern("intersect_set"),
            diff_set: interner.intern("diff_set"),
            sub_set: interner.intern("sub_set"),
            eq_set: interner.intern("eq_set"),
            unions_set: interner.intern("unions_set"),
            add_map: interner.intern("add_map"),
            update_map: interner.intern("update_map"),
            find_map: interner.intern("find_map"),
            mem_map: interner.intern("mem_map"),
        }
    }

    /// Resolve a call target to a builtin. `None` means a user function.
    pub(crate) fn classify(&self, name: Name) -> Option<Builtin> {
        let b = if name == self.sum {
            Builtin::Sum
        } else if name == self.max {
            Builtin::Max
        } else if name == self.min {
            Builtin::Min
        } else if name == self.shl {
            Builtin::Shl
        } else if name == self.shr {
            Builtin::Shr
        } else if name == self.band {
            Builtin::Band
        } else if name == self.bxor {
            Builtin::Bxor
        } else if name == self.bor {
            Builtin::Bor
        } else if name == self.bneg {
            Builtin::Bneg
        } else if name == self.bitacc {
            Builtin::Bitacc
        } else if name == self.pow2 {
            Builtin::Pow2
        } else if name == self.to_int {
            Builtin::ToInt
        } else if name == self.to_bitstr {
            Builtin::ToBitstr
        } else if name == self.strip_prefix {
            Builtin::StripPrefix
        } else if name == self.strip_suffix {
            Builtin::StripSuffix
        } else if name == self.rev {
            Builtin::Rev
        } else if name == self.concat {
            Builtin::Concat
        } else if name == self.distinct {
            Builtin::Distinct
        } else if name == self.partition {
            Builtin::Partition
        } else if name == self.assoc {
            Builtin::Assoc
        } else if name == self.union_set {
            Builtin::UnionSet
        } else if name == self.intersect_set {
            Builtin::IntersectSet
        } else if name == self.diff_set {
            Builtin::DiffSet
        } else if name == self.sub_set {
            Builtin::SubSet
        } else if name == self.eq_set {
            Builtin::EqSet
        } else if name == self.unions_set {
            Builtin::UnionsSet
        } else if name == self.add_map {
            Builtin::AddMap
        } else if name == self.update_map {
            Builtin::UpdateMap
        } else if name == self.find_map {
            Builtin::FindMap
        } else if name == self.mem_map {
            Builtin::MemMap
        } else {
            return None;
        };
        Some(b)
    }
}

/// Run a builtin on already-evaluated arguments.
pub(crate) fn dispatch(
    ctx: &Ctx,
    builtin: Builtin,
    args: &[Value],
    span: Span,
) -> EvalResult<Value> {
    match builtin {
        Builtin::Sum => numeric::sum(args1("sum", args, span)?, span),
        Builtin::Max => numeric::extremum("max", args1("max", args, span)?, Ordering::Greater, span),
        Builtin::Min => numeric::extremum("min", args1("min", args, span)?, Ordering::Less, span),
        Builtin::Shl => {
            let (a, b) = args2("shl", args, span)?;
            numeric::shl(a, b, span)
        }
        Builtin::Shr => {
            let (a, b) = args2("shr", args, span)?;
            numeric::shr(a, b, span)
        }
        Builtin::Band => {
            let (a, b) = args2("band", args, span)?;
            numeric::bitop("band", a, b, span)
        }
        Builtin::Bxor => {
            let (a, b) = args2("bxor", args, span)?;
            numeric::bitop("bxor", a, b, span)
        }
        Builtin::Bor => {
            let (a, b) = args2("bor", args, span)?;
            numeric::bitop("bor", a, b, span)
        }
        Builtin::Bneg => numeric::bneg(args1("bneg", args, span)?, span),
        Builtin::Bitacc => {
            let (n, hi, lo) = args3("bitacc", args, span)?;
            numeric::bitacc(n, hi, lo, span)
        }
        Builtin::Pow2 => numeric::pow2(args1("pow2", args, span)?, span),
        Builtin::ToInt => {
            let (width, n) = args2("to_int", args, span)?;
            numeric::to_int(width, n, span)
        }
        Builtin::ToBitstr => {
            let (width, n) = args2("to_bitstr", args, span)?;
            numeric::to_bitstr(width, n, span)
        }
        Builtin::StripPrefix => {
            let (s, p) = args2("strip_prefix", args, span)?;
            text::strip_prefix(s, p, span)
        }
        Builtin::StripSuffix => {
            let (s, p) = args2("strip_suffix", args, span)?;
            text::strip_suffix(s, p, span)
        }
        Builtin::Rev => lists::rev(args1("rev_", args, span)?, span),
        Builtin::Concat => lists::concat(args1("concat_", args, span)?, span),
        Builtin::Distinct => lists::distinct(args1("distinct_", args, span)?, span),
        Builtin::Partition => {
            let (l, n) = args2("partition_", args, span)?;
            lists::partition(l, n, span)
        }
        Builtin::Assoc => {
            let (k, l) = args2("assoc_", args, span)?;
            lists::assoc(k, l, span)
        }
        Builtin::UnionSet => {
            let (a, b) = args2("union_set", args, span)?;
            sets::union(ctx, a, b, span)
        }
        Builtin::IntersectSet => {
            let (a, b) = args2("intersect_set", args, span)?;
            sets::intersect(ctx, a, b, span)
        }
        Builtin::DiffSet => {
            let (a, b) = args2("diff_set", args, span)?;
            sets::diff(ctx, a, b, span)
        }
        Builtin::SubSet => {
            let (a, b) = args2("sub_set", args, span)?;
            sets::sub(ctx, a, b, span)
        }
        Builtin::EqSet => {
            let (a, b) = args2("eq_set", args, span)?;
            sets::set_eq(ctx, a, b, span)
        }
        Builtin::UnionsSet => sets::unions(ctx, args1("unions_set", args, span)?, span),
        Builtin::AddMap => {
            let (m, k, v) = args3("add_map", args, span)?;
            maps::add(ctx, m, k, v, span)
        }
        Builtin::UpdateMap => {
            let (m, k, v) = args3("update_map", args, span)?;
            maps::update(ctx, m, k, v, span)
        }
        Builtin::FindMap => {
            let (m, k) = args2("find_map", args, span)?;
            maps::find(ctx, m, k, span)
        }
        Builtin::MemMap => {
            let (m, k) = args2("mem_map", args, span)?;
            maps::mem(ctx, m, k, span)
        }
    }
}

fn args1<'a>(what: &str, args: &'a [Value], span: Span) -> EvalResult<&'a Value> {
    match args {
        [a] => Ok(a),
        _ => Err(arity_mismatch(what, 1, args.len(), span)),
    }
}

fn args2<'a>(what: &str, args: &'a [Value], span: Span) -> EvalResult<(&'a Value, &'a Value)> {
    match args {
        [a, b] => Ok((a, b)),
        _ => Err(arity_mismatch(what, 2, args.len(), span)),
    }
}

fn args3<'a>(
    what: &str,
    args: &'a [Value],
    span: Span,
) -> EvalResult<(&'a Value, &'a Value, &'a Value)> {
    match args {
        [a, b, c] => Ok((a, b, c)),
        _ => Err(arity_mismatch(what, 3, args.len(), span)),
    }
}

fn expect_num<'a>(what: &str, value: &'a Value, span: Span) -> EvalResult<&'a Num> {
    value
        .as_num()
        .ok_or_else(|| invalid_operation(format!("{what} expects a number, got {}", value.type_name()), span))
}

fn expect_list<'a>(what: &str, value: &'a Value, span: Span) -> EvalResult<&'a [Value]> {
    value
        .as_list()
        .ok_or_else(|| invalid_operation(format!("{what} expects a list, got {}", value.type_name()), span))
}

fn expect_text<'a>(what: &str, value: &'a Value, span: Span) -> EvalResult<&'a str> {
    value
        .as_text()
        .ok_or_else(|| invalid_operation(format!("{what} expects text, got {}", value.type_name()), span))
}
