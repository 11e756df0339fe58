//! Numeric and bit-manipulation builtins.
//!
//! All operations are exact: arbitrary-precision arithmetic underneath,
//! with the natural/integer kind tracked through results. A result keeps
//! the `Nat` kind only when every numeric input was `Nat` and the result is
//! non-negative; everything else is `Int`.

use std::cmp::Ordering;

use relic_ir::{Integer, NumKind, Span};
use relic_value::{compare, Num, Value};

use super::{expect_list, expect_num};
use crate::errors::{invalid_operation, EvalResult};

fn result_kind(int: &Integer, inputs: &[&Num]) -> NumKind {
    if !int.is_negative() && inputs.iter().all(|n| n.kind == NumKind::Nat) {
        NumKind::Nat
    } else {
        NumKind::Int
    }
}

/// `sum(list)`. The empty sum is `0 : Nat`.
pub(super) fn sum(list: &Value, span: Span) -> EvalResult<Value> {
    let items = expect_list("sum", list, span)?;
    let mut acc = Integer::ZERO;
    let mut kind = NumKind::Nat;
    for item in items {
        let n = expect_num("sum", item, span)?;
        if n.kind == NumKind::Int {
            kind = NumKind::Int;
        }
        acc = acc.add(&n.int);
    }
    Ok(Value::num(acc, kind))
}

/// `max(list)` / `min(list)`; `want` is the ordering that replaces the
/// current candidate. Empty input has no extremum.
pub(super) fn extremum(
    what: &str,
    list: &Value,
    want: Ordering,
    span: Span,
) -> EvalResult<Value> {
    let items = expect_list(what, list, span)?;
    let mut best: Option<&Value> = None;
    for item in items {
        expect_num(what, item, span)?;
        match best {
            None => best = Some(item),
            Some(current) => {
                if compare(item, current) == want {
                    best = Some(item);
                }
            }
        }
    }
    best.cloned()
        .ok_or_else(|| invalid_operation(format!("{what} of an empty list"), span))
}

/// `shl(n, amount)`.
pub(super) fn shl(n: &Value, amount: &Value, span: Span) -> EvalResult<Value> {
    let n = expect_num("shl", n, span)?;
    let amount = expect_num("shl", amount, span)?;
    let int = n
        .int
        .shl(&amount.int)
        .ok_or_else(|| invalid_operation("shift amount must be a small non-negative number", span))?;
    let kind = result_kind(&int, &[n, amount]);
    Ok(Value::num(int, kind))
}

/// `shr(n, amount)`, arithmetic.
pub(super) fn shr(n: &Value, amount: &Value, span: Span) -> EvalResult<Value> {
    let n = expect_num("shr", n, span)?;
    let amount = expect_num("shr", amount, span)?;
    let int = n
        .int
        .shr(&amount.int)
        .ok_or_else(|| invalid_operation("shift amount must be a small non-negative number", span))?;
    let kind = result_kind(&int, &[n, amount]);
    Ok(Value::num(int, kind))
}

/// `band` / `bxor` / `bor`, two's complement on negatives.
pub(super) fn bitop(what: &str, a: &Value, b: &Value, span: Span) -> EvalResult<Value> {
    let a = expect_num(what, a, span)?;
    let b = expect_num(what, b, span)?;
    let int = match what {
        "band" => a.int.bitand(&b.int),
        "bxor" => a.int.bitxor(&b.int),
        _ => a.int.bitor(&b.int),
    };
    let kind = result_kind(&int, &[a, b]);
    Ok(Value::num(int, kind))
}

/// `bneg(n)`: bitwise NOT, `-(n + 1)`.
pub(super) fn bneg(n: &Value, span: Span) -> EvalResult<Value> {
    let n = expect_num("bneg", n, span)?;
    let int = n.int.bitnot();
    let kind = if int.is_negative() {
        NumKind::Int
    } else {
        NumKind::Nat
    };
    Ok(Value::num(int, kind))
}

/// `bitacc(n, hi, lo)`: the `hi - lo + 1` bits of `n` starting at bit `lo`,
/// i.e. `(n >> lo) & (2^(hi-lo+1) - 1)`.
pub(super) fn bitacc(n: &Value, hi: &Value, lo: &Value, span: Span) -> EvalResult<Value> {
    let n = expect_num("bitacc", n, span)?;
    let hi = expect_num("bitacc", hi, span)?;
    let lo = expect_num("bitacc", lo, span)?;
    if lo.int.is_negative() || hi.int.cmp(&lo.int) == Ordering::Less {
        return Err(invalid_operation(
            format!("bitacc bounds out of order: hi {} lo {}", hi.int, lo.int),
            span,
        ));
    }
    let width = hi.int.sub(&lo.int).add(&Integer::ONE);
    let mask = Integer::ONE
        .shl(&width)
        .ok_or_else(|| invalid_operation("bitacc width too large", span))?
        .sub(&Integer::ONE);
    let shifted = n
        .int
        .shr(&lo.int)
        .ok_or_else(|| invalid_operation("bitacc offset too large", span))?;
    Ok(Value::nat(shifted.bitand(&mask)))
}

/// `pow2(n)`.
pub(super) fn pow2(n: &Value, span: Span) -> EvalResult<Value> {
    let n = expect_num("pow2", n, span)?;
    let int = Integer::ONE
        .shl(&n.int)
        .ok_or_else(|| invalid_operation("pow2 exponent must be a small non-negative number", span))?;
    Ok(Value::nat(int))
}

/// Normalize `n` into `[0, 2^width)`.
fn normalize(n: &Integer, width: &Integer, span: Span) -> EvalResult<Integer> {
    let modulus = Integer::ONE
        .shl(width)
        .ok_or_else(|| invalid_operation("bit width must be a small non-negative number", span))?;
    let rem = n
        .rem(&modulus)
        .ok_or_else(|| invalid_operation("bit width must be positive", span))?;
    if rem.is_negative() {
        Ok(rem.add(&modulus))
    } else {
        Ok(rem)
    }
}

/// `to_int(width, n)`: normalize into `[0, 2^width)` then sign-extend when
/// the top bit is set.
pub(super) fn to_int(width: &Value, n: &Value, span: Span) -> EvalResult<Value> {
    let width = expect_num("to_int", width, span)?;
    let n = expect_num("to_int", n, span)?;
    let normalized = normalize(&n.int, &width.int, span)?;
    let half = Integer::ONE
        .shl(&width.int.sub(&Integer::ONE))
        .unwrap_or(Integer::ZERO);
    let int = if !half.is_zero() && normalized.cmp(&half) != Ordering::Less {
        normalized.sub(&half.add(&half))
    } else {
        normalized
    };
    Ok(Value::int(int))
}

/// `to_bitstr(width, n)`: normalize into `[0, 2^width)`.
pub(super) fn to_bitstr(width: &Value, n: &Value, span: Span) -> EvalResult<Value> {
    let width = expect_num("to_bitstr", width, span)?;
    let n = expect_num("to_bitstr", n, span)?;
    Ok(Value::nat(normalize(&n.int, &width.int, span)?))
}
