//! # Token / Template Language
//!
//! Rule patterns are written in a small template language: `{{name}}`
//! placeholders expand to prebuilt regex fragments, `{{name:capture}}`
//! wraps the fragment in a named capture group, and `{{:capture}}` is a
//! free content capture. The token set is closed; see [`table`] for the
//! available names.

pub mod table;
mod template;

pub use table::{composite, fragment, is_token, single_token, token_names};
pub use template::{CaptureNamer, ExpandMode, Expansion, expand};
