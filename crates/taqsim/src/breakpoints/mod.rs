//! # Breakpoint Processor
//!
//! Iterates over oversized first-pass segments and slices each into pieces
//! honoring `maxPages` (span by page-id difference), `maxContentLength`
//! (hard character cap), and the ordered breakpoint list; falls back to
//! page boundaries and Unicode-cluster-safe cut positions when no pattern
//! applies.

mod boundary;
mod process;
mod window;

pub use boundary::{BOUNDARY_SEARCH_MAX_PAGES, SegmentPageOffsets, reconstruct};
pub use process::process_segments;
pub use window::{Window, compute_window};
