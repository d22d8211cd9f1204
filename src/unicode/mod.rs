//! Unicode utilities for grapheme handling, display width, and text scanning.

mod grapheme;
mod scan;
mod width;

pub use grapheme::{GraphemeInfo, grapheme_indices, grapheme_info, graphemes, is_ascii_only};
pub use scan::{BreakType, LineBreakResult, classify_break, find_line_breaks};
pub use width::{
    WidthMethod, display_width_char_with_method, display_width_with_method, is_wide,
    is_zero_width,
};
