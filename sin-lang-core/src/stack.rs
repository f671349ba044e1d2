//! Stack growth for the recursive parts of the pipeline.
//!
//! Parsing nested expressions and evaluating nested calls both recurse on the
//! native stack. Wrapping each recursive step in [`ensure_sufficient_stack`]
//! moves the work onto a freshly allocated segment whenever less than
//! [`RED_ZONE`] bytes remain, so program depth is bounded by the interpreter's
//! own limits instead of the thread's stack size.

/// Minimum stack space to keep available before recursing.
pub const RED_ZONE: usize = 100 * 1024;

/// Stack space allocated each time the red zone is reached.
pub const STACK_PER_RECURSION: usize = 1024 * 1024;

#[inline]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

#[cfg(test)]
mod tests {
    use super::ensure_sufficient_stack;

    #[test]
    fn test_shallow_recursion() {
        fn factorial(n: u64) -> u64 {
            ensure_sufficient_stack(|| if n <= 1 { 1 } else { n * factorial(n - 1) })
        }

        assert_eq!(factorial(10), 3_628_800);
    }

    #[test]
    fn test_deep_recursion() {
        fn depth(n: u64) -> u64 {
            ensure_sufficient_stack(|| if n == 0 { 0 } else { depth(n - 1) + 1 })
        }

        assert_eq!(depth(100_000), 100_000);
    }
}
