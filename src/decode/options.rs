//! Decode configuration.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// What to do with a row or worksheet that fails to decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorMode {
    /// Log the failure and drop the unit; siblings keep decoding
    #[default]
    Lenient,
    /// Deliver the failure as an `Err` item in the stream
    Strict,
}

/// Shared flag that stops outstanding decode tasks.
///
/// Tasks check the token before each worksheet and each row; once
/// cancelled, they finish without publishing and the streams end.
///
/// A [`child`](CancellationToken::child) token is cancelled with its parent
/// but can also be cancelled on its own without touching the parent.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
    parent: Option<Arc<CancellationToken>>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// A token that also observes `self`.
    pub fn child(&self) -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            parent: Some(Arc::new(self.clone())),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
            || self.parent.as_ref().is_some_and(|p| p.is_cancelled())
    }
}

/// Options for decoding a workbook.
#[derive(Debug, Clone)]
pub struct DecodeOptions {
    /// Failure policy for rows and worksheets
    pub error_mode: ErrorMode,

    /// Worker threads; `None` defers to rayon (`RAYON_NUM_THREADS` or one
    /// per CPU)
    pub threads: Option<usize>,

    /// Row buffer capacity when a worksheet has no usable dimension hint
    pub default_row_capacity: usize,

    /// Upper bound on a row buffer sized from a dimension hint
    pub max_row_capacity: usize,

    /// Token checked at every task boundary
    pub cancellation: CancellationToken,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Lenient,
            threads: None,
            default_row_capacity: 1024,
            max_row_capacity: 65_536,
            cancellation: CancellationToken::new(),
        }
    }
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Shorthand for `with_error_mode(ErrorMode::Strict)`.
    pub fn strict(self) -> Self {
        self.with_error_mode(ErrorMode::Strict)
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads.max(1));
        self
    }

    pub fn with_default_row_capacity(mut self, capacity: usize) -> Self {
        self.default_row_capacity = capacity.max(1);
        self
    }

    pub fn with_max_row_capacity(mut self, capacity: usize) -> Self {
        self.max_row_capacity = capacity.max(1);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn is_strict(&self) -> bool {
        self.error_mode == ErrorMode::Strict
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = DecodeOptions::default();
        assert_eq!(opts.error_mode, ErrorMode::Lenient);
        assert!(opts.threads.is_none());
        assert!(!opts.cancellation.is_cancelled());
    }

    #[test]
    fn test_builder_pattern() {
        let opts = DecodeOptions::new()
            .strict()
            .with_threads(0)
            .with_default_row_capacity(0)
            .with_max_row_capacity(10);

        assert!(opts.is_strict());
        assert_eq!(opts.threads, Some(1));
        assert_eq!(opts.default_row_capacity, 1);
        assert_eq!(opts.max_row_capacity, 10);
    }

    #[test]
    fn test_cancellation_is_shared() {
        let token = CancellationToken::new();
        let opts = DecodeOptions::new().with_cancellation(token.clone());
        token.cancel();
        assert!(opts.cancellation.is_cancelled());
    }

    #[test]
    fn test_child_token() {
        let parent = CancellationToken::new();
        let first = parent.child();
        let second = parent.child();

        first.cancel();
        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
        assert!(!parent.is_cancelled());

        parent.cancel();
        assert!(second.is_cancelled());
        assert!(second.child().is_cancelled());
    }
}
