//! Text builtins.

use relic_ir::Span;
use relic_value::Value;

use super::expect_text;
use crate::errors::{invalid_operation, EvalResult};

/// `strip_prefix(s, prefix)`. The prefix must actually be one.
pub(super) fn strip_prefix(s: &Value, prefix: &Value, span: Span) -> EvalResult<Value> {
    let s = expect_text("strip_prefix", s, span)?;
    let prefix = expect_text("strip_prefix", prefix, span)?;
    match s.strip_prefix(prefix) {
        Some(rest) => Ok(Value::text(rest)),
        None => Err(invalid_operation(
            format!("{prefix:?} is not a prefix of {s:?}"),
            span,
        )),
    }
}

/// `strip_suffix(s, suffix)`. The suffix must actually be one.
pub(super) fn strip_suffix(s: &Value, suffix: &Value, span: Span) -> EvalResult<Value> {
    let s = expect_text("strip_suffix", s, span)?;
    let suffix = expect_text("strip_suffix", suffix, span)?;
    match s.strip_suffix(suffix) {
        Some(rest) => Ok(Value::text(rest)),
        None => Err(invalid_operation(
            format!("{suffix:?} is not a suffix of {s:?}"),
            span,
        )),
    }
}
