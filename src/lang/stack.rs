//! Keeps the tree walking evaluator off the guard page.
//!
//! Left associative operator chains fold into trees as deep as the chain is long, so evaluating
//! `1+1+...+1` recurses once per operator. Recursive calls go through
//! [`ensure_sufficient_stack`], which moves onto a freshly allocated stack segment when the
//! current one runs low.

/// Grow once less than this much stack remains
const RED_ZONE: usize = 100 * 1024;

/// Size of each new stack segment
const STACK_PER_RECURSION: usize = 1024 * 1024;

#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// wasm manages its own stack
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[test]
fn test_deep_recursion() {
    fn count(n: u64) -> u64 {
        ensure_sufficient_stack(|| if n == 0 { 0 } else { count(n - 1) + 1 })
    }

    assert_eq!(count(100_000), 100_000);
}

#[test]
fn test_passes_result_through() {
    let res: Result<i32, &str> = ensure_sufficient_stack(|| Err("nope"));
    assert_eq!(res, Err("nope"));
}
