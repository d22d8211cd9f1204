//! Grapheme cluster iteration, method-aware.

use crate::unicode::width::{WidthMethod, display_width_with_method};
use unicode_segmentation::UnicodeSegmentation;

/// Grapheme metadata for layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GraphemeInfo {
    pub byte_offset: u32,
    pub byte_len: u8,
    pub col_offset: u32,
    pub width: u8,
}

const ZWJ: char = '\u{200D}';

/// Iterate over grapheme clusters in a string under the given width method.
///
/// `WcWidth`/`Unicode` use full Unicode extended grapheme cluster rules
/// (ZWJ joins a sequence into one cluster). `NoZwj` re-splits any cluster
/// that contains a ZWJ into its ZWJ-delimited pieces; clusters with no ZWJ
/// (regional-indicator flag pairs, keycap sequences, skin-tone modifiers,
/// combining marks) are untouched either way.
#[must_use]
pub fn graphemes(s: &str, method: WidthMethod) -> Vec<&str> {
    let base = s.graphemes(true);
    match method {
        WidthMethod::WcWidth | WidthMethod::Unicode => base.collect(),
        WidthMethod::NoZwj => base.flat_map(split_at_zwj).collect(),
    }
}

/// Split a single extended grapheme cluster at ZWJ boundaries, dropping the
/// ZWJ itself (it carries no width and no longer acts as a joiner).
fn split_at_zwj(cluster: &str) -> impl Iterator<Item = &str> {
    cluster.split(ZWJ).filter(|piece| !piece.is_empty())
}

/// Iterate over grapheme clusters with their starting byte offsets.
#[must_use]
pub fn grapheme_indices(s: &str, method: WidthMethod) -> Vec<(usize, &str)> {
    match method {
        WidthMethod::WcWidth | WidthMethod::Unicode => s.grapheme_indices(true).collect(),
        WidthMethod::NoZwj => {
            let mut out = Vec::new();
            for (base_offset, cluster) in s.grapheme_indices(true) {
                let mut local = 0usize;
                for piece in cluster.split(ZWJ) {
                    if !piece.is_empty() {
                        out.push((base_offset + local, piece));
                    }
                    local += piece.len() + ZWJ.len_utf8();
                }
            }
            out
        }
    }
}

/// Check if a string is ASCII-only (fast path: no clustering needed at all).
#[must_use]
pub fn is_ascii_only(s: &str) -> bool {
    s.is_ascii()
}

/// Compute grapheme info for a string, expanding tabs to the next stop.
#[must_use]
pub fn grapheme_info(s: &str, tab_width: u32, method: WidthMethod) -> Vec<GraphemeInfo> {
    let mut infos = Vec::new();
    let mut col = 0u32;
    let tab_width = tab_width.max(1);

    for (byte_offset, grapheme) in grapheme_indices(s, method) {
        let width = if grapheme == "\t" {
            let spaces = tab_width - (col % tab_width);
            spaces as u8
        } else {
            display_width_with_method(grapheme, method) as u8
        };

        infos.push(GraphemeInfo {
            byte_offset: byte_offset as u32,
            byte_len: grapheme.len() as u8,
            col_offset: col,
            width,
        });
        col += u32::from(width);
    }

    infos
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graphemes_ascii() {
        let g = graphemes("hello", WidthMethod::WcWidth);
        assert_eq!(g, vec!["h", "e", "l", "l", "o"]);
    }

    #[test]
    fn test_graphemes_emoji_joined() {
        // Family emoji (ZWJ sequence) counts as one cluster under WcWidth/Unicode.
        assert_eq!(graphemes("👨‍👩‍👧", WidthMethod::WcWidth).len(), 1);
    }

    #[test]
    fn test_graphemes_emoji_no_zwj_splits() {
        // Under NoZwj, the same sequence splits into its three components.
        assert_eq!(graphemes("👨‍👩‍👧", WidthMethod::NoZwj).len(), 3);
    }

    #[test]
    fn test_graphemes_combining_stays_joined_under_no_zwj() {
        // Combining marks don't involve ZWJ, so NoZwj leaves them alone.
        assert_eq!(graphemes("e\u{0301}", WidthMethod::NoZwj).len(), 1);
        assert_eq!(graphemes("e\u{0301}", WidthMethod::WcWidth).len(), 1);
    }

    #[test]
    fn test_graphemes_flag_stays_joined_under_no_zwj() {
        // Regional indicator pair (flag), no ZWJ involved either way.
        let flag = "\u{1F1FA}\u{1F1F8}"; // US flag
        assert_eq!(graphemes(flag, WidthMethod::NoZwj).len(), 1);
    }

    #[test]
    fn test_grapheme_info_basic() {
        let infos = grapheme_info("ab\tc", 4, WidthMethod::WcWidth);
        assert!(!infos.is_empty());
        assert_eq!(infos[0].byte_offset, 0);
        assert_eq!(infos[0].width, 1);
    }

    #[test]
    fn test_grapheme_indices_no_zwj_offsets() {
        let s = "👨‍👩"; // two people joined by one ZWJ
        let indices = grapheme_indices(s, WidthMethod::NoZwj);
        assert_eq!(indices.len(), 2);
        assert_eq!(indices[0].0, 0);
        assert_eq!(indices[1].1, "👩");
    }
}
