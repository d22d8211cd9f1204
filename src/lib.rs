//! Core text engine of a terminal UI library.
//!
//! A segmented rope stores text, line breaks, and line starts; a view layer
//! projects it into wrapped virtual lines; an edit layer applies
//! cursor-driven mutation on top. Rendering, ANSI/VT emulation, and PTY
//! plumbing are external collaborators and not part of this crate.

// Crate-level lint configuration
#![warn(unsafe_code)]
#![allow(dead_code)] // Public API functions not yet used internally
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)] // Docs WIP
#![allow(clippy::missing_panics_doc)] // Docs WIP
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::use_self)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::collapsible_if)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::redundant_clone)] // Clones in tests for clarity are fine
#![allow(clippy::semicolon_if_nothing_returned)]
#![allow(clippy::needless_collect)]

pub mod color;
pub mod error;
pub mod grapheme_pool;
pub mod rope;
pub mod style;
pub mod syntax_style;
pub mod text;
pub mod unicode;

pub use color::Rgba;
pub use error::{Error, Result};
pub use grapheme_pool::{GraphemeHandle, GraphemePool};
pub use rope::{Rope, RopeItem, WalkerResult};
pub use style::{Style, TextAttributes};
pub use syntax_style::{SyntaxStyle, SyntaxStyleRegistry};
pub use text::{EditBuffer, Highlight, StyledChunk, TextBuffer, ViewEngine, VirtualChunk, VirtualLine, WrapMode};
pub use unicode::WidthMethod;
