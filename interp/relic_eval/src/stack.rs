//! Stack safety for deep recursion.
//!
//! Relation and function invocations recurse through the native stack. The
//! depth guard bounds how deep; `stacker` grows the stack in segments so the
//! guard is always reached before the stack runs out.

/// Minimum stack headroom to keep available (100KB red zone).
const RED_ZONE: usize = 100 * 1024;

/// Stack space to allocate when growing (1MB).
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Ensure sufficient stack space is available before executing `f`.
#[inline]
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}
