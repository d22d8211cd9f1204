//! Text storage and editing with styled segments.

mod buffer;
mod edit;
mod geometry;
mod mem_registry;
mod segment;
mod view;

pub use buffer::{Highlight, TextBuffer};
pub use edit::{Cursor, EditBuffer};
pub use segment::StyledChunk;
pub use view::{VirtualChunk, VirtualLine, ViewEngine, WrapMode};
