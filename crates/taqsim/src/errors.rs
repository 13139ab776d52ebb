//! # Error Types

use crate::regex::ErrorWrapper;

/// Errors from taqsim operations.
#[derive(Debug, thiserror::Error)]
pub enum TaqsimError {
    /// A rule, breakpoint, guard, or replacement pattern failed to compile.
    #[error("invalid regex {pattern:?}: {source}")]
    InvalidRegex {
        /// The offending pattern source.
        pattern: String,

        /// The underlying engine error.
        source: ErrorWrapper,
    },

    /// A replacement rule requested a regex flag outside the whitelist.
    #[error("invalid regex flags {flags:?} (allowed: \"gimsu\")")]
    InvalidFlags {
        /// The rejected flag string.
        flags: String,
    },

    /// Options that cannot be combined were both set.
    #[error("mutually exclusive options: {0}")]
    MutuallyExclusiveOptions(String),

    /// The breakpoint loop exceeded its safety ceiling.
    #[error("no progress after {iterations} iterations (cursor {cursor} of {content_len})")]
    ProgressAborted {
        /// The number of iterations performed before aborting.
        iterations: usize,

        /// The cursor position in the segment content when aborted.
        cursor: usize,

        /// The length of the content being split.
        content_len: usize,
    },
}

/// Result type for taqsim operations.
pub type TqResult<T> = std::result::Result<T, TaqsimError>;
