//! Line walking and (row, col) <-> absolute-offset conversions over the
//! segmented rope, plus per-grapheme width queries that stitch chunks back
//! together across boundaries.

use crate::rope::{Rope, WalkerResult};
use crate::text::mem_registry::MemRegistry;
use crate::text::segment::{Segment, marker_kind};
use crate::unicode::{self, WidthMethod};

/// Per-logical-line summary produced by [`walk_lines`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineInfo {
    pub line_idx: u32,
    pub width: u32,
    pub char_offset: u32,
}

/// A (row, col) position resolved from an absolute char offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Coords {
    pub row: u32,
    pub col: u32,
}

/// Visit every logical line in order.
///
/// `char_offset` is the sum of previous lines' widths, plus one per
/// preceding break when `include_newlines_in_offset` is set; it is 0 for
/// line 0 either way.
#[must_use]
pub fn walk_lines(rope: &Rope<Segment>, include_newlines_in_offset: bool) -> Vec<LineInfo> {
    if rope.marker_count(marker_kind::LINESTART) == 0 {
        return Vec::new();
    }

    let mut lines = Vec::new();
    let mut current_width = 0u32;
    let mut char_offset = 0u32;
    let mut line_idx = 0u32;
    let mut started = false;

    rope.walk(|seg, _idx, _metrics| {
        match seg {
            Segment::LineStart => {
                if started {
                    lines.push(LineInfo {
                        line_idx,
                        width: current_width,
                        char_offset,
                    });
                    char_offset += current_width;
                    if include_newlines_in_offset {
                        char_offset += 1;
                    }
                    line_idx += 1;
                    current_width = 0;
                } else {
                    started = true;
                }
            }
            Segment::Text(chunk, _) => current_width += chunk.width,
            Segment::Break | Segment::Empty => {}
        }
        WalkerResult::CONTINUE
    });

    lines.push(LineInfo {
        line_idx,
        width: current_width,
        char_offset,
    });
    lines
}

#[must_use]
pub fn get_line_count(rope: &Rope<Segment>) -> u32 {
    rope.marker_count(marker_kind::LINESTART) as u32
}

#[must_use]
pub fn get_total_width(rope: &Rope<Segment>) -> u32 {
    rope.total_weight().width
}

/// Display width of one logical line, derived from consecutive
/// `LineStart` markers' aggregated-width snapshots (no full rope walk
/// needed).
#[must_use]
pub fn line_width_at(rope: &Rope<Segment>, row: u32) -> Option<u32> {
    let count = get_line_count(rope);
    if row >= count {
        return None;
    }
    let this = rope.get_marker(marker_kind::LINESTART, row as usize)?;
    let next_width = rope
        .get_marker(marker_kind::LINESTART, row as usize + 1)
        .map_or_else(|| rope.total_weight().width, |m| m.metrics_before.width);
    Some(next_width - this.metrics_before.width)
}

#[must_use]
pub fn get_max_line_width(rope: &Rope<Segment>) -> u32 {
    (0..get_line_count(rope))
        .filter_map(|row| line_width_at(rope, row))
        .max()
        .unwrap_or(0)
}

/// Resolve `(row, col)` to an absolute char offset. `col` beyond the row's
/// width clamps to the row's width; an out-of-range row returns `None`.
#[must_use]
pub fn coords_to_offset(rope: &Rope<Segment>, row: u32, col: u32) -> Option<u32> {
    let marker = rope.get_marker(marker_kind::LINESTART, row as usize)?;
    let row_width = line_width_at(rope, row)?;
    Some(marker.metrics_before.chars + col.min(row_width))
}

/// Inverse of [`coords_to_offset`]. The offset sitting on the break between
/// line r and r+1 resolves to `{r, width(r)}`; the offset just past that
/// break resolves to `{r+1, 0}`.
#[must_use]
pub fn offset_to_coords(rope: &Rope<Segment>, offset: u32) -> Option<Coords> {
    if offset > rope.total_weight().chars {
        return None;
    }
    let line_count = get_line_count(rope);
    if line_count == 0 {
        return None;
    }

    let mut lo = 0u32;
    let mut hi = line_count - 1;
    while lo < hi {
        let mid = lo + (hi - lo + 1) / 2;
        let marker = rope.get_marker(marker_kind::LINESTART, mid as usize)?;
        if marker.metrics_before.chars <= offset {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }

    let row_start = rope
        .get_marker(marker_kind::LINESTART, lo as usize)?
        .metrics_before
        .chars;
    Some(Coords {
        row: lo,
        col: offset - row_start,
    })
}

/// One text segment belonging to a logical line, as seen by the view layer
/// when it needs chunk-level (not just flattened-text) detail.
#[derive(Clone, Copy, Debug)]
pub(crate) struct RowChunk {
    pub mem_id: u8,
    pub byte_start: u32,
    pub byte_end: u32,
    pub style: crate::style::Style,
}

/// Collect a logical line's `Text` segments in order, keeping their
/// original chunk/style boundaries (unlike [`row_text`], which flattens
/// them into one string).
pub(crate) fn collect_row_chunks(rope: &Rope<Segment>, row: u32) -> Option<Vec<RowChunk>> {
    let marker = rope.get_marker(marker_kind::LINESTART, row as usize)?;
    let mut chunks = Vec::new();
    rope.walk_from(marker.index, |seg, idx, _metrics| {
        if idx == marker.index {
            return WalkerResult::CONTINUE;
        }
        match seg {
            Segment::LineStart | Segment::Break => WalkerResult::STOP,
            Segment::Text(chunk, style) => {
                chunks.push(RowChunk {
                    mem_id: chunk.mem_id,
                    byte_start: chunk.byte_start,
                    byte_end: chunk.byte_end,
                    style: *style,
                });
                WalkerResult::CONTINUE
            }
            Segment::Empty => WalkerResult::CONTINUE,
        }
    });
    Some(chunks)
}

/// Concatenate a logical line's text-segment bytes, stitching chunks back
/// together so grapheme clustering can see across boundaries.
pub(crate) fn row_text(rope: &Rope<Segment>, registry: &MemRegistry, row: u32) -> Option<String> {
    let marker = rope.get_marker(marker_kind::LINESTART, row as usize)?;
    let mut text = String::new();
    rope.walk_from(marker.index, |seg, idx, _metrics| {
        if idx == marker.index {
            return WalkerResult::CONTINUE;
        }
        match seg {
            Segment::LineStart | Segment::Break => WalkerResult::STOP,
            Segment::Text(chunk, _) => {
                if let Some(bytes) = registry.get(chunk.mem_id) {
                    if let Ok(s) = std::str::from_utf8(
                        &bytes[chunk.byte_start as usize..chunk.byte_end as usize],
                    ) {
                        text.push_str(s);
                    }
                }
                WalkerResult::CONTINUE
            }
            Segment::Empty => WalkerResult::CONTINUE,
        }
    });
    Some(text)
}

/// Display width of the grapheme starting at `(row, col)`.
///
/// Returns `0` for an invalid row, an empty line, a column past the row's
/// end, or a column landing in the interior of a wide grapheme (the
/// alternative — reporting the full width again — was rejected since it
/// would make two consecutive columns both report non-zero width for the
/// same grapheme).
#[must_use]
pub fn grapheme_width_at(
    rope: &Rope<Segment>,
    registry: &MemRegistry,
    row: u32,
    col: u32,
    tab_width: u32,
    method: WidthMethod,
) -> u32 {
    let Some(text) = row_text(rope, registry, row) else {
        return 0;
    };
    let infos = unicode::grapheme_info(&text, tab_width, method);
    for info in &infos {
        if info.col_offset == col {
            return u32::from(info.width);
        }
        if col > info.col_offset && col < info.col_offset + u32::from(info.width) {
            return 0;
        }
    }
    0
}

/// Display width of the grapheme immediately preceding `col` on `row`.
/// `0` at `col == 0` or on an empty/invalid row; clamps to the row's last
/// grapheme when `col` is past the row's width.
#[must_use]
pub fn prev_grapheme_width(
    rope: &Rope<Segment>,
    registry: &MemRegistry,
    row: u32,
    col: u32,
    tab_width: u32,
    method: WidthMethod,
) -> u32 {
    if col == 0 {
        return 0;
    }
    let Some(text) = row_text(rope, registry, row) else {
        return 0;
    };
    let infos = unicode::grapheme_info(&text, tab_width, method);
    if infos.is_empty() {
        return 0;
    }
    let row_width: u32 = infos.iter().map(|i| u32::from(i.width)).sum();
    let target_col = col.min(row_width);

    let mut result = 0u32;
    for info in &infos {
        if info.col_offset < target_col {
            result = u32::from(info.width);
        } else {
            break;
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::TextBuffer;

    #[test]
    fn test_walk_lines_three_lines() {
        let mut buf = TextBuffer::new();
        buf.set_text("Line 1\nLine 2\nLine 3").unwrap();
        let lines = walk_lines(buf.rope(), true);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], LineInfo { line_idx: 0, width: 6, char_offset: 0 });
        assert_eq!(lines[1], LineInfo { line_idx: 1, width: 6, char_offset: 7 });
        assert_eq!(lines[2], LineInfo { line_idx: 2, width: 6, char_offset: 14 });
    }

    #[test]
    fn test_line_width_at_each_row() {
        let mut buf = TextBuffer::new();
        buf.set_text("Line 1\nLine 2\nLine 3").unwrap();
        for row in 0..3 {
            assert_eq!(line_width_at(buf.rope(), row), Some(6));
        }
        assert_eq!(line_width_at(buf.rope(), 3), None);
    }

    #[test]
    fn test_coords_offset_round_trip() {
        let mut buf = TextBuffer::new();
        buf.set_text("Line 1\nLine 2\nLine 3").unwrap();
        for row in 0..3u32 {
            for col in 0..=6u32 {
                let offset = coords_to_offset(buf.rope(), row, col).unwrap();
                let coords = offset_to_coords(buf.rope(), offset).unwrap();
                assert_eq!(coords, Coords { row, col });
            }
        }
    }

    #[test]
    fn test_offset_to_coords_break_boundary() {
        let mut buf = TextBuffer::new();
        buf.set_text("Line 1\nLine 2\nLine 3").unwrap();
        assert_eq!(offset_to_coords(buf.rope(), 6), Some(Coords { row: 0, col: 6 }));
        assert_eq!(offset_to_coords(buf.rope(), 7), Some(Coords { row: 1, col: 0 }));
    }

    #[test]
    fn test_coords_to_offset_out_of_range_row() {
        let mut buf = TextBuffer::new();
        buf.set_text("abc").unwrap();
        assert_eq!(coords_to_offset(buf.rope(), 5, 0), None);
    }

    #[test]
    fn test_coords_to_offset_clamps_col() {
        let mut buf = TextBuffer::new();
        buf.set_text("abc").unwrap();
        assert_eq!(coords_to_offset(buf.rope(), 0, 99), Some(3));
    }

    #[test]
    fn test_grapheme_width_at_emoji_unicode_mode() {
        let mut buf = TextBuffer::new();
        buf.set_text("a\u{1F600}b").unwrap(); // a + grinning face + b
        assert_eq!(
            grapheme_width_at(buf.rope(), buf.registry(), 0, 0, 4, WidthMethod::Unicode),
            1
        );
        assert_eq!(
            grapheme_width_at(buf.rope(), buf.registry(), 0, 1, 4, WidthMethod::Unicode),
            2
        );
        assert_eq!(
            grapheme_width_at(buf.rope(), buf.registry(), 0, 3, 4, WidthMethod::Unicode),
            1
        );
    }

    #[test]
    fn test_grapheme_width_at_wide_interior_returns_zero() {
        let mut buf = TextBuffer::new();
        buf.set_text("\u{1F600}").unwrap();
        assert_eq!(
            grapheme_width_at(buf.rope(), buf.registry(), 0, 1, 4, WidthMethod::Unicode),
            0
        );
    }

    #[test]
    fn test_prev_grapheme_width_basic() {
        let mut buf = TextBuffer::new();
        buf.set_text("ab").unwrap();
        assert_eq!(
            prev_grapheme_width(buf.rope(), buf.registry(), 0, 0, 4, WidthMethod::WcWidth),
            0
        );
        assert_eq!(
            prev_grapheme_width(buf.rope(), buf.registry(), 0, 2, 4, WidthMethod::WcWidth),
            1
        );
    }

    #[test]
    fn test_prev_grapheme_width_clamps_past_end() {
        let mut buf = TextBuffer::new();
        buf.set_text("ab").unwrap();
        assert_eq!(
            prev_grapheme_width(buf.rope(), buf.registry(), 0, 50, 4, WidthMethod::WcWidth),
            1
        );
    }

    #[test]
    fn test_grapheme_width_empty_row() {
        let buf = TextBuffer::new();
        assert_eq!(
            grapheme_width_at(buf.rope(), buf.registry(), 0, 0, 4, WidthMethod::WcWidth),
            0
        );
    }
}
