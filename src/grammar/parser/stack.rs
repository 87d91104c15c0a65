//! Stack growth for deeply nested sources.
//!
//! Parentheses, blocks and unary chains recurse once per nesting level.
//! The recursive entry points run through `ensure_sufficient_stack`, which
//! moves onto a fresh segment when less than `RED_ZONE` bytes remain.

/// Minimum stack left before a recursive call.
const RED_ZONE: usize = 100 * 1024;

/// Size of each new stack segment.
const STACK_PER_RECURSION: usize = 1024 * 1024;

#[inline]
pub(super) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}
