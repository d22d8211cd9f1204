//! Rope leaf type for the segmented text buffer.
//!
//! A [`Segment`] is what `Rope<Segment>` stores per leaf. Plain text is kept
//! out-of-line in a [`super::mem_registry::MemRegistry`] buffer and
//! referenced by byte range rather than copied into the leaf, so restyling
//! or splitting text never touches the underlying bytes.

use crate::rope::RopeItem;
use crate::style::Style;

/// A chunk of plain text referencing bytes owned by a registered memory
/// buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextChunk {
    /// Which registered buffer (`MemRegistry` id) owns the bytes.
    pub mem_id: u8,
    pub byte_start: u32,
    pub byte_end: u32,
    /// Display width of this chunk under the active width method.
    pub width: u32,
    pub flags: TextChunkFlags,
}

impl TextChunk {
    #[must_use]
    pub fn byte_len(&self) -> u32 {
        self.byte_end - self.byte_start
    }
}

bitflags::bitflags! {
    /// Per-chunk rendering flags independent of [`Style`].
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
    pub struct TextChunkFlags: u8 {
        /// This chunk renders as a placeholder (e.g. an empty-input hint)
        /// rather than user-entered content.
        const PLACEHOLDER = 0b0000_0001;
        /// The chunk's bytes are pure ASCII (skips grapheme clustering on
        /// width queries).
        const ASCII_ONLY = 0b0000_0010;
    }
}

/// One leaf of the text rope: either structural (line start, line break) or
/// a styled run of text.
#[derive(Clone, Debug, PartialEq)]
pub enum Segment {
    /// Marks the start of a logical line. Always the first segment of a
    /// line and carries no width.
    LineStart,
    /// A normalized line break (`\n`, `\r\n`, and lone `\r` all collapse to
    /// this single variant on ingest).
    Break,
    /// A run of text sharing one style.
    Text(TextChunk, Style),
    /// The rope's empty placeholder. `Rope::delete` leaves this behind;
    /// text-engine operations never produce it directly.
    Empty,
}

impl Segment {
    #[must_use]
    pub fn text(chunk: TextChunk, style: Style) -> Self {
        Self::Text(chunk, style)
    }

    #[must_use]
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text(..))
    }

    #[must_use]
    pub fn is_break(&self) -> bool {
        matches!(self, Self::Break)
    }

    #[must_use]
    pub fn is_line_start(&self) -> bool {
        matches!(self, Self::LineStart)
    }

    #[must_use]
    pub fn style(&self) -> Option<Style> {
        match self {
            Self::Text(_, style) => Some(*style),
            _ => None,
        }
    }
}

/// Aggregated metric carried by every rope node over `Segment`s: a monoid
/// under pointwise addition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SegmentMetrics {
    /// Sum of `TextChunk::width` over text segments; excludes breaks.
    /// Used for per-line widths.
    pub width: u32,
    /// Same as `width` but with one added per break. Used for absolute
    /// char offsets, where a break consumes exactly one offset slot.
    pub chars: u32,
    pub breaks: u32,
    pub linestarts: u32,
}

impl std::ops::Add for SegmentMetrics {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            width: self.width + rhs.width,
            chars: self.chars + rhs.chars,
            breaks: self.breaks + rhs.breaks,
            linestarts: self.linestarts + rhs.linestarts,
        }
    }
}

/// Marker kinds the rope's closed marker set recognizes for `Segment`.
pub mod marker_kind {
    pub const BREAK: u8 = 0;
    pub const LINESTART: u8 = 1;
}

impl RopeItem for Segment {
    type Metrics = SegmentMetrics;

    fn empty() -> Self {
        Self::Empty
    }

    fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    fn metrics(&self) -> Self::Metrics {
        match self {
            Self::LineStart => SegmentMetrics {
                linestarts: 1,
                ..SegmentMetrics::default()
            },
            // A break has no display width of its own, but it does occupy
            // one slot in the absolute char-offset space `chars` tracks.
            Self::Break => SegmentMetrics {
                breaks: 1,
                chars: 1,
                ..SegmentMetrics::default()
            },
            // `chars` mirrors `width` for text chunks: both are counted in
            // display-width units, so `chars` (used for absolute offsets)
            // and `width` (used for per-line width) agree on plain ASCII
            // text and only diverge once a break is folded in.
            Self::Text(chunk, _) => SegmentMetrics {
                width: chunk.width,
                chars: chunk.width,
                ..SegmentMetrics::default()
            },
            Self::Empty => SegmentMetrics::default(),
        }
    }

    fn marker_kind(&self) -> Option<u8> {
        match self {
            Self::Break => Some(marker_kind::BREAK),
            Self::LineStart => Some(marker_kind::LINESTART),
            _ => None,
        }
    }
}

/// A chunk of styled text as handed to `TextBuffer::set_styled_text`, before
/// it is interned into the memory registry and split into `Segment`s.
#[derive(Clone, Copy, Debug)]
pub struct StyledChunk<'a> {
    pub text: &'a str,
    pub style: Style,
}

impl<'a> StyledChunk<'a> {
    #[must_use]
    pub fn new(text: &'a str, style: Style) -> Self {
        Self { text, style }
    }

    #[must_use]
    pub fn plain(text: &'a str) -> Self {
        Self {
            text,
            style: Style::NONE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(mem_id: u8, start: u32, end: u32, width: u32) -> TextChunk {
        TextChunk {
            mem_id,
            byte_start: start,
            byte_end: end,
            width,
            flags: TextChunkFlags::empty(),
        }
    }

    #[test]
    fn test_text_chunk_byte_len() {
        assert_eq!(chunk(0, 2, 7, 5).byte_len(), 5);
    }

    #[test]
    fn test_metrics_for_each_variant() {
        assert_eq!(Segment::LineStart.metrics().linestarts, 1);
        assert_eq!(Segment::Break.metrics().breaks, 1);
        let m = Segment::Text(chunk(0, 0, 3, 3), Style::NONE).metrics();
        assert_eq!(m.width, 3);
        assert_eq!(m.chars, 3);
        assert_eq!(Segment::Break.metrics().chars, 1);
        assert_eq!(Segment::Empty.metrics(), SegmentMetrics::default());
    }

    #[test]
    fn test_metrics_monoid_combine() {
        let a = Segment::Break.metrics();
        let b = Segment::LineStart.metrics();
        let combined = a + b;
        assert_eq!(combined.breaks, 1);
        assert_eq!(combined.linestarts, 1);
    }

    #[test]
    fn test_rope_item_empty_contract() {
        assert!(Segment::empty().is_empty());
        assert!(!Segment::LineStart.is_empty());
    }

    #[test]
    fn test_marker_kinds() {
        assert_eq!(Segment::Break.marker_kind(), Some(marker_kind::BREAK));
        assert_eq!(
            Segment::LineStart.marker_kind(),
            Some(marker_kind::LINESTART)
        );
        assert_eq!(Segment::Empty.marker_kind(), None);
    }

    #[test]
    fn test_placeholder_flag() {
        let mut flags = TextChunkFlags::empty();
        flags.insert(TextChunkFlags::PLACEHOLDER);
        assert!(flags.contains(TextChunkFlags::PLACEHOLDER));
    }

    #[test]
    fn test_styled_chunk_plain_is_unstyled() {
        let c = StyledChunk::plain("hi");
        assert_eq!(c.style, Style::NONE);
    }
}
