#![warn(missing_docs, unused)]
//! # `taqsim` Arabic Text Segmenter
//!
//! A declarative, pattern-driven segmenter for multi-page Arabic texts.
//!
//! The input is an ordered sequence of [`Page`]s (a numeric identifier plus
//! text content); the output is an ordered sequence of [`Segment`]s, each
//! carrying a contiguous slice of the source text, attributed to a starting
//! page and (when the slice crosses pages) an ending page.
//!
//! Segmentation is driven by two declarative inputs:
//!
//! * **Split rules** ([`SplitRule`]) describe structural boundaries such as
//!   chapter headings, numbered entries, the basmala, or narrator phrases.
//!   Rule patterns are written in a small template language where
//!   `{{token}}` placeholders expand to prebuilt regex fragments
//!   (see [`tokens`]), and `fuzzy` rules match literal Arabic phrases
//!   regardless of diacritics (see [`fuzzy`]).
//! * **Breakpoints** ([`Breakpoint`]) are post-hoc constraints that force
//!   oversized segments to be broken further, honoring page-span and
//!   content-length limits (see [`breakpoints`]).
//!
//! ## Pipeline
//!
//! 1. Pages are optionally rewritten by [`preprocess`] passes.
//! 2. Page contents are joined into one buffer with a [`page_map::PageMap`]
//!    recording each page's offset range.
//! 3. Rules are compiled ([`rules`]) into a single combined alternation
//!    where captures permit, standalone regexes where they do not, and a
//!    fast line scanner for single-token fuzzy rules.
//! 4. The first-pass splitter ([`splitter`]) collects split points under
//!    priority and occurrence selection and materialises segments.
//! 5. The breakpoint processor ([`breakpoints`]) slices oversized segments
//!    at pattern boundaries, page boundaries, or safe fallback positions.
//!
//! ## Example
//!
//! ```rust
//! use taqsim::{Page, SegmentationOptions, SplitRule, segment_pages};
//!
//! let pages = vec![
//!     Page::new(1, "باب الإيمان\nحديث أول"),
//!     Page::new(2, "حديث ثان"),
//! ];
//!
//! let options = SegmentationOptions::new()
//!     .with_rules([SplitRule::line_starts_with(["{{bab}}"]).with_fuzzy(true)])
//!     .with_max_pages(3);
//!
//! let segments = segment_pages(&pages, &options)?;
//! assert_eq!(segments.len(), 1);
//! assert_eq!(segments[0].from, 1);
//! assert_eq!(segments[0].to, Some(2));
//! # Ok::<(), taqsim::TaqsimError>(())
//! ```
//!
//! ## Ancillary passes
//!
//! * [`validate`] re-derives attribution from pages + options + segments
//!   and reports discrepancies.
//! * [`recovery`] restores marker text stripped by `lineStartsAfter` rules.
//! * [`analysis`] mines common line starts to suggest candidate rules.

pub mod analysis;
pub mod breakpoints;
pub mod fuzzy;
pub mod page_map;
pub mod preprocess;
pub mod recovery;
pub mod regex;
pub mod rules;
pub mod splitter;
pub mod text;
pub mod tokens;
pub mod validate;

mod errors;
mod segmenter;
mod types;

pub use errors::{TaqsimError, TqResult};
pub use rules::{
    Breakpoint, BreakpointRule, Occurrence, PageJoiner, Prefer, RuleConstraints,
    SegmentationOptions, SplitMode, SplitRule,
};
pub use segmenter::segment_pages;
pub use types::{Meta, Page, Segment};
