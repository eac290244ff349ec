//! Scanner configuration.
//!
//! Configuration is fixed when a [`Scanner`](crate::Scanner) is created and
//! is not part of its serialized state.

/// What to do when a push would exceed [`MAX_DEPTH`](crate::MAX_DEPTH).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OverflowPolicy {
    /// Fail the scan with [`ScanError::NestingTooDeep`](crate::ScanError).
    #[default]
    Reject,
    /// Emit the token and drop the push. Later pops may then remove the
    /// wrong logical frame.
    Truncate,
}

/// What to do with a closing delimiter that does not match the top frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DelimiterPolicy {
    /// Fail the scan with [`ScanError::MismatchedClose`](crate::ScanError).
    #[default]
    Strict,
    /// Emit the closer and leave the stack untouched.
    Lenient,
}

/// Construction-time options for a [`Scanner`](crate::Scanner).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScannerConfig {
    pub overflow: OverflowPolicy,
    pub delimiters: DelimiterPolicy,
}

impl ScannerConfig {
    /// Permissive mode: overflowing pushes are dropped and mismatched
    /// closers are accepted.
    pub const fn tolerant() -> Self {
        Self {
            overflow: OverflowPolicy::Truncate,
            delimiters: DelimiterPolicy::Lenient,
        }
    }

    #[must_use]
    pub const fn with_overflow(mut self, overflow: OverflowPolicy) -> Self {
        self.overflow = overflow;
        self
    }

    #[must_use]
    pub const fn with_delimiters(mut self, delimiters: DelimiterPolicy) -> Self {
        self.delimiters = delimiters;
        self
    }
}
