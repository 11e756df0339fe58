//! List builtins.
//!
//! Element comparisons go through structural `eq`, making the membership
//! scans quadratic by construction; list sizes in practice are small.

use relic_ir::Span;
use relic_value::{eq, Value};

use super::{expect_list, expect_num};
use crate::errors::{invalid_operation, EvalResult};

/// `rev_(list)`.
pub(super) fn rev(list: &Value, span: Span) -> EvalResult<Value> {
    let items = expect_list("rev_", list, span)?;
    Ok(Value::list(items.iter().rev().cloned().collect()))
}

/// `concat_(list of lists)`: one-level flatten.
pub(super) fn concat(list: &Value, span: Span) -> EvalResult<Value> {
    let items = expect_list("concat_", list, span)?;
    let mut out = Vec::new();
    for item in items {
        out.extend_from_slice(expect_list("concat_", item, span)?);
    }
    Ok(Value::list(out))
}

/// `distinct_(list)`: keep the first occurrence of each element.
pub(super) fn distinct(list: &Value, span: Span) -> EvalResult<Value> {
    let items = expect_list("distinct_", list, span)?;
    let mut out: Vec<Value> = Vec::new();
    for item in items {
        if !out.iter().any(|seen| eq(seen, item)) {
            out.push(item.clone());
        }
    }
    Ok(Value::list(out))
}

/// `partition_(list, n)`: split at index `n` into a pair of lists.
pub(super) fn partition(list: &Value, n: &Value, span: Span) -> EvalResult<Value> {
    let items = expect_list("partition_", list, span)?;
    let n = expect_num("partition_", n, span)?;
    let at = n.int.to_usize().filter(|&at| at <= items.len()).ok_or_else(|| {
        invalid_operation(
            format!(
                "partition_ index {} out of bounds for a list of {}",
                n.int,
                items.len()
            ),
            span,
        )
    })?;
    let (front, back) = items.split_at(at);
    Ok(Value::tuple(vec![
        Value::list(front.to_vec()),
        Value::list(back.to_vec()),
    ]))
}

/// `assoc_(key, list of pairs)`: the value of the first pair whose key
/// compares equal, as an optional.
pub(super) fn assoc(key: &Value, list: &Value, span: Span) -> EvalResult<Value> {
    let items = expect_list("assoc_", list, span)?;
    for item in items {
        let pair = item.as_tuple().filter(|t| t.len() == 2).ok_or_else(|| {
            invalid_operation(
                format!("assoc_ expects a list of pairs, got {}", item.type_name()),
                span,
            )
        })?;
        if eq(&pair[0], key) {
            return Ok(Value::some(pair[1].clone()));
        }
    }
    Ok(Value::none())
}
