//! Per-client view over a [`TextBuffer`]: wrap policy, virtual-line layout,
//! and selection, recomputed lazily from the buffer's dirty-view bit.

use std::cell::RefCell;
use std::rc::Rc;

use crate::color::Rgba;
use crate::style::Style;
use crate::text::buffer::TextBuffer;
use crate::text::geometry::{self, RowChunk};
use crate::unicode::{self, GraphemeInfo};

/// Text wrapping mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WrapMode {
    /// No wrapping — one virtual line per logical line.
    #[default]
    None,
    /// Wrap at character (grapheme) boundaries.
    Char,
    /// Prefer word boundaries, falling back to char wrap within a word that
    /// alone exceeds the wrap width.
    Word,
}

/// One styled run within a [`VirtualLine`], still referencing the owning
/// mem-registry buffer rather than copying bytes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VirtualChunk {
    pub mem_id: u8,
    pub byte_start: u32,
    pub byte_end: u32,
    pub style: Style,
    pub width: u32,
}

/// One row of the wrapped view: zero or more chunks from a single logical
/// line.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VirtualLine {
    pub source_line_idx: u32,
    pub chunks: Vec<VirtualChunk>,
    pub width: u32,
    /// Absolute char offset of this virtual line's column 0.
    pub char_offset: u32,
}

#[derive(Clone, Copy, Debug)]
struct Selection {
    start: u32,
    end: u32,
    fg: Option<Rgba>,
    bg: Option<Rgba>,
}

/// A word-wrap boundary: whitespace, common punctuation, or a bracket.
fn is_word_boundary(grapheme: &str) -> bool {
    if grapheme.chars().all(char::is_whitespace) {
        return true;
    }
    matches!(
        grapheme,
        "-" | "/" | "[" | "]" | "(" | ")" | "{" | "}" | "," | "." | ";" | ":" | "?" | "!"
    )
}

fn byte_at(infos: &[GraphemeInfo], idx: usize, text_len: usize) -> usize {
    infos.get(idx).map_or(text_len, |i| i.byte_offset as usize)
}

/// Split one logical line's graphemes into `(byte_start, byte_end, width)`
/// virtual-line ranges under `wrap_width`.
fn split_into_segments(
    text: &str,
    infos: &[GraphemeInfo],
    wrap_width: u32,
    mode: WrapMode,
) -> Vec<(usize, usize, u32)> {
    let mut segments = Vec::new();
    if infos.is_empty() {
        return segments;
    }

    let mut start_idx = 0usize;
    let mut current_width = 0u32;
    let mut last_break: Option<(usize, u32)> = None;
    let mut i = 0usize;

    while i < infos.len() {
        let info = infos[i];
        let g_width = u32::from(info.width);
        let grapheme =
            &text[info.byte_offset as usize..(info.byte_offset as usize + info.byte_len as usize)];

        if mode == WrapMode::Word && is_word_boundary(grapheme) {
            last_break = Some((i + 1, current_width + g_width));
        }

        if current_width + g_width > wrap_width && current_width > 0 {
            let (break_idx, break_width) = if mode == WrapMode::Word {
                last_break.unwrap_or((i, current_width))
            } else {
                (i, current_width)
            };

            segments.push((
                byte_at(infos, start_idx, text.len()),
                byte_at(infos, break_idx, text.len()),
                break_width,
            ));

            start_idx = break_idx;
            current_width = 0;
            last_break = None;
            i = break_idx;

            if mode == WrapMode::Word {
                while start_idx < infos.len() {
                    let g = &text[infos[start_idx].byte_offset as usize
                        ..(infos[start_idx].byte_offset as usize + infos[start_idx].byte_len as usize)];
                    if g.chars().all(char::is_whitespace) {
                        start_idx += 1;
                        i = start_idx;
                    } else {
                        break;
                    }
                }
            }
            continue;
        }

        current_width += g_width;
        i += 1;
    }

    segments.push((byte_at(infos, start_idx, text.len()), text.len(), current_width));
    segments
}

/// Slice `chunks` down to the concatenated-text byte range `[seg_start,
/// seg_end)`, carrying each surviving piece's original mem-id/byte-range
/// forward.
fn materialize_chunks(
    seg_start: usize,
    seg_end: usize,
    ranges: &[(usize, usize, usize)],
    chunks: &[RowChunk],
    infos: &[GraphemeInfo],
) -> Vec<VirtualChunk> {
    let mut out = Vec::new();
    for &(cs, ce, ci) in ranges {
        let lo = cs.max(seg_start);
        let hi = ce.min(seg_end);
        if lo >= hi {
            continue;
        }
        let c = chunks[ci];
        let width = infos
            .iter()
            .filter(|info| (info.byte_offset as usize) >= lo && (info.byte_offset as usize) < hi)
            .map(|info| u32::from(info.width))
            .sum();
        out.push(VirtualChunk {
            mem_id: c.mem_id,
            byte_start: c.byte_start + (lo - cs) as u32,
            byte_end: c.byte_start + (hi - cs) as u32,
            style: c.style,
            width,
        });
    }
    out
}

fn build_virtual_lines(buf: &TextBuffer, wrap_width: Option<u32>, mode: WrapMode) -> Vec<VirtualLine> {
    let rope = buf.rope();
    let registry = buf.registry();
    let tab_width = buf.tab_width_raw();
    let method = buf.width_method_raw();

    let mut out = Vec::new();
    for line in geometry::walk_lines(rope, true) {
        let chunks = geometry::collect_row_chunks(rope, line.line_idx).unwrap_or_default();
        if chunks.is_empty() {
            out.push(VirtualLine {
                source_line_idx: line.line_idx,
                chunks: Vec::new(),
                width: 0,
                char_offset: line.char_offset,
            });
            continue;
        }

        let mut text = String::new();
        let mut ranges = Vec::new();
        for (ci, c) in chunks.iter().enumerate() {
            let start = text.len();
            if let Some(bytes) = registry.get(c.mem_id) {
                if let Ok(s) =
                    std::str::from_utf8(&bytes[c.byte_start as usize..c.byte_end as usize])
                {
                    text.push_str(s);
                }
            }
            ranges.push((start, text.len(), ci));
        }

        let infos = unicode::grapheme_info(&text, tab_width, method);
        if infos.is_empty() {
            out.push(VirtualLine {
                source_line_idx: line.line_idx,
                chunks: Vec::new(),
                width: 0,
                char_offset: line.char_offset,
            });
            continue;
        }

        match wrap_width {
            None => {
                let vchunks = materialize_chunks(0, text.len(), &ranges, &chunks, &infos);
                out.push(VirtualLine {
                    source_line_idx: line.line_idx,
                    width: line.width,
                    char_offset: line.char_offset,
                    chunks: vchunks,
                });
            }
            Some(ww) => {
                for (seg_start, seg_end, seg_width) in split_into_segments(&text, &infos, ww, mode) {
                    let vchunks = materialize_chunks(seg_start, seg_end, &ranges, &chunks, &infos);
                    let col_at_start = infos
                        .iter()
                        .find(|i| i.byte_offset as usize == seg_start)
                        .map_or(0, |i| i.col_offset);
                    out.push(VirtualLine {
                        source_line_idx: line.line_idx,
                        width: seg_width,
                        char_offset: line.char_offset + col_at_start,
                        chunks: vchunks,
                    });
                }
            }
        }
    }
    out
}

/// A registered view onto a shared [`TextBuffer`]. Multiple views, and an
/// [`super::edit::EditBuffer`], may share one buffer.
pub struct ViewEngine {
    buffer: Rc<RefCell<TextBuffer>>,
    view_id: u32,
    wrap_width: Option<u32>,
    wrap_mode: WrapMode,
    virtual_lines: Vec<VirtualLine>,
    selection: Option<Selection>,
    config_dirty: bool,
}

impl ViewEngine {
    #[must_use]
    pub fn new(buffer: Rc<RefCell<TextBuffer>>) -> Self {
        let view_id = buffer.borrow_mut().register_view();
        Self {
            buffer,
            view_id,
            wrap_width: None,
            wrap_mode: WrapMode::None,
            virtual_lines: Vec::new(),
            selection: None,
            config_dirty: true,
        }
    }

    pub fn set_wrap_width(&mut self, width: Option<u32>) {
        if self.wrap_width != width {
            self.wrap_width = width;
            self.config_dirty = true;
        }
    }

    pub fn set_wrap_mode(&mut self, mode: WrapMode) {
        if self.wrap_mode != mode {
            self.wrap_mode = mode;
            self.config_dirty = true;
        }
    }

    fn ensure_fresh(&mut self) {
        if self.config_dirty || self.buffer.borrow().is_view_dirty(self.view_id) {
            let lines = {
                let buf = self.buffer.borrow();
                build_virtual_lines(&buf, self.wrap_width, self.wrap_mode)
            };
            self.virtual_lines = lines;
            self.buffer.borrow_mut().clear_view_dirty(self.view_id);
            self.config_dirty = false;
        }
    }

    pub fn get_virtual_line_count(&mut self) -> usize {
        self.ensure_fresh();
        self.virtual_lines.len()
    }

    pub fn get_virtual_lines(&mut self) -> &[VirtualLine] {
        self.ensure_fresh();
        &self.virtual_lines
    }

    fn resolve_virtual(&self, row: u32, col: u32) -> u32 {
        if self.virtual_lines.is_empty() {
            return 0;
        }
        self.virtual_lines.get(row as usize).map_or_else(
            || {
                let last = self.virtual_lines.last().expect("checked non-empty above");
                last.char_offset + last.width
            },
            |vline| vline.char_offset + col.min(vline.width),
        )
    }

    /// If `offset` falls in the interior of a wide grapheme, push it to the
    /// cluster's start (`round_forward = false`) or end (`true`) so a
    /// selection endpoint never splits a cluster.
    fn snap_to_grapheme_boundary(&self, offset: u32, round_forward: bool) -> u32 {
        let buf = self.buffer.borrow();
        let rope = buf.rope();
        let registry = buf.registry();
        let tab_width = buf.tab_width_raw();
        let method = buf.width_method_raw();
        let Some(coords) = geometry::offset_to_coords(rope, offset) else {
            return offset;
        };
        if geometry::grapheme_width_at(rope, registry, coords.row, coords.col, tab_width, method) != 0 {
            return offset;
        }

        let mut start_col = coords.col;
        while start_col > 0
            && geometry::grapheme_width_at(rope, registry, coords.row, start_col, tab_width, method) == 0
        {
            start_col -= 1;
        }
        let cluster_width =
            geometry::grapheme_width_at(rope, registry, coords.row, start_col, tab_width, method);
        let target_col = if round_forward { start_col + cluster_width } else { start_col };
        geometry::coords_to_offset(rope, coords.row, target_col).unwrap_or(offset)
    }

    fn apply_selection(&mut self, a: u32, b: u32, fg: Option<Rgba>, bg: Option<Rgba>) {
        let (start, end) = (a.min(b), a.max(b));
        if start == end || self.buffer.borrow().rope().is_empty() {
            self.selection = None;
            return;
        }
        self.selection = Some(Selection { start, end, fg, bg });
    }

    pub fn set_local_selection(
        &mut self,
        r0: u32,
        c0: u32,
        r1: u32,
        c1: u32,
        fg: Option<Rgba>,
        bg: Option<Rgba>,
    ) {
        self.ensure_fresh();
        let (a, b) = (self.resolve_virtual(r0, c0), self.resolve_virtual(r1, c1));
        let (start, end) = (a.min(b), a.max(b));
        let start = self.snap_to_grapheme_boundary(start, false);
        let end = self.snap_to_grapheme_boundary(end, true);
        self.apply_selection(start, end, fg, bg);
    }

    pub fn reset_local_selection(&mut self) {
        self.selection = None;
    }

    pub fn set_selection(&mut self, abs_start: u32, abs_end: u32, fg: Option<Rgba>, bg: Option<Rgba>) {
        let total = self.buffer.borrow().rope().total_weight().chars;
        self.apply_selection(abs_start.min(total), abs_end.min(total), fg, bg);
    }

    #[must_use]
    pub fn pack_selection_info(&self) -> u64 {
        self.selection
            .map_or(u64::MAX, |sel| (u64::from(sel.start) << 32) | u64::from(sel.end))
    }

    /// Write the selected range's UTF-8 bytes into `out`, emitting `\n`
    /// between logical lines but not at wrap-internal boundaries.
    pub fn get_selected_text_into_buffer(&mut self, out: &mut String) -> usize {
        self.ensure_fresh();
        let start_len = out.len();
        let Some(sel) = self.selection else {
            return 0;
        };
        let buf = self.buffer.borrow();
        let rope = buf.rope();
        let registry = buf.registry();
        let (Some(start_coords), Some(end_coords)) = (
            geometry::offset_to_coords(rope, sel.start),
            geometry::offset_to_coords(rope, sel.end),
        ) else {
            return 0;
        };

        for row in start_coords.row..=end_coords.row {
            let Some(text) = geometry::row_text(rope, registry, row) else {
                continue;
            };
            let infos = unicode::grapheme_info(&text, buf.tab_width_raw(), buf.width_method_raw());
            let row_width: u32 = infos.iter().map(|i| u32::from(i.width)).sum();
            let col_lo = if row == start_coords.row { start_coords.col } else { 0 };
            let col_hi = if row == end_coords.row { end_coords.col } else { row_width };

            let byte_lo = infos
                .iter()
                .find(|i| i.col_offset >= col_lo)
                .map_or(text.len(), |i| i.byte_offset as usize);
            let byte_hi = infos
                .iter()
                .find(|i| i.col_offset >= col_hi)
                .map_or(text.len(), |i| i.byte_offset as usize);
            out.push_str(&text[byte_lo..byte_hi]);

            if row < end_coords.row {
                out.push('\n');
            }
        }
        out.len() - start_len
    }
}

impl Drop for ViewEngine {
    fn drop(&mut self) {
        self.buffer.borrow_mut().unregister_view(self.view_id);
    }
}
