//! Cursor-driven mutation on top of a shared [`TextBuffer`], including
//! placeholder lifecycle.
//!
//! Edits are applied by reconstructing the buffer's plain text, splicing the
//! requested byte range, and re-ingesting it through `TextBuffer::set_text`.
//! This keeps every mutation going through the same line-terminator-aware
//! parse `setText` already uses, at the cost of an O(n) rebuild per edit —
//! acceptable for the editor-cursor workloads this type targets, unlike the
//! O(log n) positional access the rope itself offers.

use std::cell::RefCell;
use std::rc::Rc;

use crate::color::Rgba;
use crate::style::Style;
use crate::text::buffer::TextBuffer;
use crate::unicode::{self};

/// Logical cursor position, in display-column coordinates over the live
/// (non-placeholder) text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cursor {
    pub row: u32,
    pub col: u32,
}

struct Placeholder {
    text: String,
    color: Option<Rgba>,
}

fn line_starts(text: &str) -> Vec<usize> {
    let mut starts = vec![0usize];
    for (i, b) in text.bytes().enumerate() {
        if b == b'\n' {
            starts.push(i + 1);
        }
    }
    starts
}

fn row_slice<'a>(text: &'a str, starts: &[usize], row: usize) -> (usize, &'a str) {
    let start = starts[row];
    let end = starts.get(row + 1).map_or(text.len(), |&s| s - 1);
    (start, &text[start..end])
}

/// Resolve `(row, col)` against `text`'s own line structure (not the rope's)
/// to a byte offset, clamping both row and col to the text's bounds.
fn byte_offset_for(text: &str, tab_width: u32, method: unicode::WidthMethod, row: u32, col: u32) -> usize {
    let starts = line_starts(text);
    let row = (row as usize).min(starts.len() - 1);
    let (row_start, slice) = row_slice(text, &starts, row);
    let infos = unicode::grapheme_info(slice, tab_width, method);
    infos
        .iter()
        .find(|i| i.col_offset >= col)
        .map_or(row_start + slice.len(), |i| row_start + i.byte_offset as usize)
}

fn row_width(text: &str, tab_width: u32, method: unicode::WidthMethod, row: usize) -> u32 {
    let starts = line_starts(text);
    if row >= starts.len() {
        return 0;
    }
    let (_, slice) = row_slice(text, &starts, row);
    unicode::grapheme_info(slice, tab_width, method)
        .iter()
        .map(|i| u32::from(i.width))
        .sum()
}

/// Cursor-driven editor over a shared [`TextBuffer`]: insertion, deletion,
/// and an empty-text placeholder.
pub struct EditBuffer {
    buffer: Rc<RefCell<TextBuffer>>,
    cursor: Cursor,
    placeholder: Option<Placeholder>,
    placeholder_active: bool,
    placeholder_mem_id: Option<u8>,
}

impl EditBuffer {
    #[must_use]
    pub fn new(buffer: Rc<RefCell<TextBuffer>>) -> Self {
        Self {
            buffer,
            cursor: Cursor::default(),
            placeholder: None,
            placeholder_active: false,
            placeholder_mem_id: None,
        }
    }

    fn plain_text(&self) -> String {
        let mut out = String::new();
        self.buffer.borrow().get_plain_text_into_buffer(&mut out);
        out
    }

    fn width_params(&self) -> (u32, unicode::WidthMethod) {
        let buf = self.buffer.borrow();
        (buf.tab_width(), buf.width_method())
    }

    /// Replace the live text wholesale. Clears any active placeholder.
    /// With `preserve_cursor`, clamps the existing cursor into the new text
    /// instead of resetting it to the origin.
    pub fn set_text(&mut self, text: &str, preserve_cursor: bool) {
        self.placeholder_active = false;
        self.buffer.borrow_mut().set_text(text).ok();
        if preserve_cursor {
            self.clamp_cursor();
        } else {
            self.cursor = Cursor::default();
        }
        self.reinstall_placeholder_if_empty();
    }

    fn clamp_cursor(&mut self) {
        let text = self.plain_text();
        let (tab_width, method) = self.width_params();
        let starts = line_starts(&text);
        let row = (self.cursor.row as usize).min(starts.len() - 1) as u32;
        let width = row_width(&text, tab_width, method, row as usize);
        self.cursor = Cursor {
            row,
            col: self.cursor.col.min(width),
        };
    }

    fn clear_placeholder_from_buffer(&mut self) {
        if self.placeholder_active {
            self.placeholder_active = false;
            self.buffer.borrow_mut().clear();
        }
    }

    fn reinstall_placeholder_if_empty(&mut self) {
        if self.buffer.borrow().get_length() > 0 {
            return;
        }
        let Some(placeholder) = &self.placeholder else {
            return;
        };
        let style = placeholder.color.map_or(Style::NONE, Style::fg);
        let text = placeholder.text.clone();
        let mut buf = self.buffer.borrow_mut();
        let mem_id = match self.placeholder_mem_id {
            Some(id) if buf.get_mem_buffer(id) == Some(text.as_bytes()) => id,
            _ => match buf.register_mem_buffer(text.as_bytes(), true) {
                Ok(id) => id,
                Err(_) => return,
            },
        };
        self.placeholder_mem_id = Some(mem_id);
        buf.install_placeholder(&text, mem_id, style);
        self.placeholder_active = true;
        self.cursor = Cursor::default();
    }

    /// Insert `text` at the cursor, clearing any active placeholder first.
    pub fn insert_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.clear_placeholder_from_buffer();

        let current = self.plain_text();
        let (tab_width, method) = self.width_params();
        let at = byte_offset_for(&current, tab_width, method, self.cursor.row, self.cursor.col);

        let mut spliced = String::with_capacity(current.len() + text.len());
        spliced.push_str(&current[..at]);
        spliced.push_str(text);
        spliced.push_str(&current[at..]);
        self.buffer.borrow_mut().set_text(&spliced).ok();

        let breaks = unicode::find_line_breaks(text);
        if breaks.positions.is_empty() {
            let inserted_width = unicode::grapheme_info(text, tab_width, method)
                .iter()
                .map(|i| u32::from(i.width))
                .sum::<u32>();
            self.cursor.col += inserted_width;
        } else {
            let last_break_end = breaks.positions.last().unwrap() + usize::from(*breaks.lengths.last().unwrap());
            let tail = &text[last_break_end..];
            self.cursor.row += breaks.positions.len() as u32;
            self.cursor.col = unicode::grapheme_info(tail, tab_width, method)
                .iter()
                .map(|i| u32::from(i.width))
                .sum();
        }
    }

    /// Delete one grapheme before the cursor, joining with the previous
    /// line when at column 0.
    pub fn backspace(&mut self) {
        if self.placeholder_active {
            return;
        }
        if self.cursor.col == 0 && self.cursor.row == 0 {
            return;
        }

        let current = self.plain_text();
        let (tab_width, method) = self.width_params();

        if self.cursor.col == 0 {
            let prev_row = self.cursor.row - 1;
            let prev_width = row_width(&current, tab_width, method, prev_row as usize);
            self.delete_range((prev_row, prev_width), (self.cursor.row, 0));
        } else {
            let removed = crate::text::geometry::prev_grapheme_width(
                self.buffer.borrow().rope(),
                self.buffer.borrow().registry(),
                self.cursor.row,
                self.cursor.col,
                tab_width,
                method,
            );
            let removed = removed.max(1);
            let new_col = self.cursor.col.saturating_sub(removed);
            self.delete_range((self.cursor.row, new_col), (self.cursor.row, self.cursor.col));
        }
    }

    /// Delete the half-open range `[start, end)` in `(row, col)` coordinates.
    pub fn delete_range(&mut self, start: (u32, u32), end: (u32, u32)) {
        let current = self.plain_text();
        let (tab_width, method) = self.width_params();
        let lo = byte_offset_for(&current, tab_width, method, start.0, start.1);
        let hi = byte_offset_for(&current, tab_width, method, end.0, end.1);
        let (lo, hi) = (lo.min(hi), lo.max(hi));

        let mut spliced = String::with_capacity(current.len() - (hi - lo));
        spliced.push_str(&current[..lo]);
        spliced.push_str(&current[hi..]);
        self.buffer.borrow_mut().set_text(&spliced).ok();

        self.cursor = Cursor { row: start.0, col: start.1 };
        self.clamp_cursor();
        self.reinstall_placeholder_if_empty();
    }

    pub fn set_cursor(&mut self, row: u32, col: u32) {
        self.cursor = Cursor { row, col };
        self.clamp_cursor();
    }

    /// Single-cursor accessor; any index but `0` returns `None`.
    #[must_use]
    pub fn get_cursor(&self, index: usize) -> Option<Cursor> {
        (index == 0).then_some(self.cursor)
    }

    /// Write the live text into `out`. Empty while a placeholder is active.
    pub fn get_text(&self, out: &mut String) -> usize {
        if self.placeholder_active {
            return 0;
        }
        let start_len = out.len();
        self.buffer.borrow().get_plain_text_into_buffer(out);
        out.len() - start_len
    }

    /// Install placeholder bytes, shown whenever the live text is empty.
    pub fn set_placeholder(&mut self, bytes: &str) {
        self.placeholder = Some(Placeholder {
            text: bytes.to_string(),
            color: self.placeholder.as_ref().and_then(|p| p.color),
        });
        self.placeholder_mem_id = None;
        self.reinstall_placeholder_if_empty();
    }

    pub fn set_placeholder_color(&mut self, color: Rgba) {
        if let Some(placeholder) = &mut self.placeholder {
            placeholder.color = Some(color);
        } else {
            self.placeholder = Some(Placeholder {
                text: String::new(),
                color: Some(color),
            });
        }
        self.placeholder_mem_id = None;
        self.reinstall_placeholder_if_empty();
    }
}
