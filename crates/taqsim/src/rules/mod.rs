//! # Split Rules and Breakpoints
//!
//! The declarative rule surface: [`SplitRule`] describes structural
//! boundaries, [`Breakpoint`] describes post-hoc constraints on oversized
//! segments, and [`SegmentationOptions`] bundles both with the global
//! limits. [`compiler`] normalises rules into matchable artefacts.

pub mod compiler;

mod breakpoint;
mod constraints;
mod options;
mod split_rule;

pub use breakpoint::{
    Breakpoint, BreakpointMatcher, BreakpointRule, CompiledBreakpoint, compile_breakpoints,
};
pub use constraints::{ExcludeEntry, RuleConstraints};
pub use options::{PageJoiner, Prefer, SegmentationOptions};
pub use split_rule::{Occurrence, RuleKind, SplitMode, SplitRule};
