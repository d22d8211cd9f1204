//! Segmented text storage: the rope of `Segment`s plus the memory registry,
//! highlight overlay, and per-view dirty tracking that sit around it.

use std::collections::HashMap;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::rope::{Rope, WalkerResult};
use crate::style::Style;
use crate::syntax_style::SyntaxStyleRegistry;
use crate::text::mem_registry::MemRegistry;
use crate::text::segment::{Segment, StyledChunk, TextChunk, TextChunkFlags, marker_kind};
use crate::unicode::{self, WidthMethod};

/// A style span attached to a line by `add_highlight_by_char_range`.
///
/// Highlights are an overlay: they never modify the underlying `Segment`s,
/// only annotate which lines a style-id range touches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Highlight {
    pub start: u32,
    pub end: u32,
    pub style_id: u32,
}

/// Owns the segmented rope, the memory registry, the highlight overlay, and
/// the set of registered views' dirty bits.
///
/// Grapheme-pool sharing and allocator plumbing from the wider engine are
/// not modeled here: nothing in this surface hands grapheme bytes to a
/// renderer, so there is no caller for a pool handle inside `TextBuffer`
/// itself.
#[derive(Debug, Default)]
pub struct TextBuffer {
    rope: Rope<Segment>,
    registry: MemRegistry,
    tab_width: u32,
    width_method: WidthMethod,
    syntax_styles: Option<Rc<SyntaxStyleRegistry>>,
    highlights: HashMap<u32, Vec<Highlight>>,
    dirty_views: Vec<bool>,
    free_view_ids: Vec<u32>,
}

impl TextBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rope: Rope::new(),
            registry: MemRegistry::new(),
            tab_width: 4,
            width_method: WidthMethod::default(),
            syntax_styles: None,
            highlights: HashMap::new(),
            dirty_views: Vec::new(),
            free_view_ids: Vec::new(),
        }
    }

    pub(crate) fn rope(&self) -> &Rope<Segment> {
        &self.rope
    }

    pub(crate) fn registry(&self) -> &MemRegistry {
        &self.registry
    }

    pub(crate) fn tab_width_raw(&self) -> u32 {
        self.tab_width
    }

    pub(crate) fn width_method_raw(&self) -> WidthMethod {
        self.width_method
    }

    /// Replace the rope's items directly. Used by `EditBuffer` for
    /// cursor-local splices that don't go through a full re-ingest.
    pub(crate) fn set_rope(&mut self, rope: Rope<Segment>) {
        self.rope = rope;
        self.mark_views_dirty();
    }

    pub fn set_tab_width(&mut self, width: u32) {
        self.tab_width = width.max(1);
    }

    #[must_use]
    pub fn tab_width(&self) -> u32 {
        self.tab_width
    }

    pub fn set_width_method(&mut self, method: WidthMethod) {
        self.width_method = method;
    }

    #[must_use]
    pub fn width_method(&self) -> WidthMethod {
        self.width_method
    }

    pub fn set_syntax_style(&mut self, registry: Rc<SyntaxStyleRegistry>) {
        self.syntax_styles = Some(registry);
    }

    #[must_use]
    pub fn syntax_styles(&self) -> Option<&Rc<SyntaxStyleRegistry>> {
        self.syntax_styles.as_ref()
    }

    fn measure_width(&self, text: &str) -> u32 {
        unicode::grapheme_info(text, self.tab_width, self.width_method)
            .iter()
            .map(|g| u32::from(g.width))
            .sum()
    }

    fn text_segment(
        &self,
        mem_id: u8,
        start: u32,
        end: u32,
        style: Style,
        placeholder: bool,
    ) -> Segment {
        let bytes = self.registry.get(mem_id).unwrap_or(&[]);
        let text = std::str::from_utf8(&bytes[start as usize..end as usize]).unwrap_or("");
        let width = self.measure_width(text);
        let mut flags = TextChunkFlags::empty();
        if unicode::is_ascii_only(text) {
            flags.insert(TextChunkFlags::ASCII_ONLY);
        }
        if placeholder {
            flags.insert(TextChunkFlags::PLACEHOLDER);
        }
        Segment::Text(
            TextChunk {
                mem_id,
                byte_start: start,
                byte_end: end,
                width,
                flags,
            },
            style,
        )
    }

    /// Replace content with `text`, recognizing `\n`, `\r\n`, and lone `\r`
    /// as a single logical break each. Preserves registry entries (calls
    /// `clear`, not `reset`).
    pub fn set_text(&mut self, text: &str) -> Result<()> {
        self.clear();
        let mem_id = self.registry.register(text.as_bytes(), true)?;
        let breaks = unicode::find_line_breaks(text);

        let mut items = Vec::new();
        let mut line_start = 0usize;
        for (&pos, &len) in breaks.positions.iter().zip(breaks.lengths.iter()) {
            items.push(Segment::LineStart);
            if pos > line_start {
                items.push(self.text_segment(
                    mem_id,
                    line_start as u32,
                    pos as u32,
                    Style::NONE,
                    false,
                ));
            }
            items.push(Segment::Break);
            line_start = pos + usize::from(len);
        }
        items.push(Segment::LineStart);
        if line_start < text.len() {
            items.push(self.text_segment(
                mem_id,
                line_start as u32,
                text.len() as u32,
                Style::NONE,
                false,
            ));
        }

        self.rope = Rope::from_slice(&items);
        self.mark_views_dirty();
        Ok(())
    }

    /// Replace content with a sequence of styled chunks, each becoming one
    /// `Text` segment on a single logical line. Embedded newlines inside a
    /// chunk are not treated as breaks — split chunks at line boundaries
    /// before calling this if per-line structure matters.
    pub fn set_styled_text(&mut self, chunks: &[StyledChunk<'_>]) -> Result<()> {
        self.clear();
        let mut concatenated = String::new();
        for chunk in chunks {
            concatenated.push_str(chunk.text);
        }
        let mem_id = self.registry.register(concatenated.as_bytes(), true)?;

        let mut items = vec![Segment::LineStart];
        let mut offset = 0u32;
        for chunk in chunks {
            let end = offset + chunk.text.len() as u32;
            if !chunk.text.is_empty() {
                items.push(self.text_segment(mem_id, offset, end, chunk.style, false));
            }
            offset = end;
        }

        self.rope = Rope::from_slice(&items);
        self.mark_views_dirty();
        Ok(())
    }

    /// Register a caller-owned buffer for later `add_line` calls.
    pub fn register_mem_buffer(&mut self, bytes: &[u8], owned: bool) -> Result<u8> {
        self.registry.register(bytes, owned)
    }

    #[must_use]
    pub fn get_mem_buffer(&self, mem_id: u8) -> Option<&[u8]> {
        self.registry.get(mem_id)
    }

    /// Append a new logical line sourced from a slice of a registered
    /// buffer. Empty slices are allowed.
    pub fn add_line(&mut self, mem_id: u8, byte_start: u32, byte_end: u32) -> Result<()> {
        let bytes = self.registry.get(mem_id).ok_or(Error::InvalidMemId)?;
        if byte_start > byte_end || byte_end as usize > bytes.len() {
            return Err(Error::IndexOutOfBounds);
        }

        let mut items = Vec::new();
        if self.rope.count() > 0 {
            items.push(Segment::Break);
        }
        items.push(Segment::LineStart);
        if byte_end > byte_start {
            items.push(self.text_segment(mem_id, byte_start, byte_end, Style::NONE, false));
        }

        self.rope.append(&items);
        self.mark_views_dirty();
        Ok(())
    }

    /// Append a placeholder-flagged line used by `EditBuffer` when the
    /// logical document is empty. Does not disturb the registry.
    pub(crate) fn install_placeholder(&mut self, bytes: &str, mem_id: u8, style: Style) {
        let items = vec![
            Segment::LineStart,
            self.text_segment(mem_id, 0, bytes.len() as u32, style, true),
        ];
        self.rope = Rope::from_slice(&items);
        self.mark_views_dirty();
    }

    /// Empty the rope. Registry entries remain valid.
    pub fn clear(&mut self) {
        self.rope = Rope::new();
        self.highlights.clear();
        self.mark_views_dirty();
    }

    /// Empty the rope and free every owned registry buffer.
    pub fn reset(&mut self) {
        self.clear();
        self.registry.reset();
    }

    pub fn register_view(&mut self) -> u32 {
        if let Some(id) = self.free_view_ids.pop() {
            self.dirty_views[id as usize] = true;
            return id;
        }
        self.dirty_views.push(true);
        (self.dirty_views.len() - 1) as u32
    }

    pub fn unregister_view(&mut self, id: u32) {
        if let Some(slot) = self.dirty_views.get_mut(id as usize) {
            *slot = false;
            self.free_view_ids.push(id);
        }
    }

    #[must_use]
    pub fn is_view_dirty(&self, id: u32) -> bool {
        self.dirty_views.get(id as usize).copied().unwrap_or(false)
    }

    pub fn clear_view_dirty(&mut self, id: u32) {
        if let Some(slot) = self.dirty_views.get_mut(id as usize) {
            *slot = false;
        }
    }

    pub fn mark_views_dirty(&mut self) {
        for slot in &mut self.dirty_views {
            *slot = true;
        }
    }

    /// Associate a highlight span with every line in `line_from..=line_to`.
    pub fn add_highlight_by_char_range(
        &mut self,
        start: u32,
        end: u32,
        line_from: u32,
        line_to: u32,
        style_id: u32,
    ) {
        let highlight = Highlight {
            start,
            end,
            style_id,
        };
        for line in line_from..=line_to {
            self.highlights.entry(line).or_default().push(highlight);
        }
    }

    #[must_use]
    pub fn get_line_highlights(&self, line: u32) -> &[Highlight] {
        self.highlights.get(&line).map_or(&[], Vec::as_slice)
    }

    /// Total characters, in the absolute-offset metric (breaks count 1).
    #[must_use]
    pub fn get_length(&self) -> u32 {
        self.rope.total_weight().chars
    }

    #[must_use]
    pub fn get_line_count(&self) -> u32 {
        self.rope.marker_count(marker_kind::LINESTART) as u32
    }

    /// Total bytes referenced by `Text` segments (not registry capacity).
    #[must_use]
    pub fn get_byte_size(&self) -> usize {
        let mut total = 0usize;
        self.rope.walk(|seg, _idx, _metrics| {
            if let Segment::Text(chunk, _) = seg {
                total += chunk.byte_len() as usize;
            }
            WalkerResult::CONTINUE
        });
        total
    }

    /// Write the plain-text rendering of the buffer (breaks as `\n`) into
    /// `out`, returning the number of bytes written.
    pub fn get_plain_text_into_buffer(&self, out: &mut String) -> usize {
        let start_len = out.len();
        self.rope.walk(|seg, _idx, _metrics| {
            match seg {
                Segment::Text(chunk, _) => {
                    if let Some(bytes) = self.registry.get(chunk.mem_id) {
                        if let Ok(text) = std::str::from_utf8(
                            &bytes[chunk.byte_start as usize..chunk.byte_end as usize],
                        ) {
                            out.push_str(text);
                        }
                    }
                }
                Segment::Break => out.push('\n'),
                Segment::LineStart | Segment::Empty => {}
            }
            WalkerResult::CONTINUE
        });
        out.len() - start_len
    }
}
