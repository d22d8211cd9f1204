//! Error types for the text engine.

use std::fmt;

/// Result type alias for text-engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for text-engine operations.
///
/// Read-only queries never fail; only allocator-touching operations return
/// these. Positional rope/coordinate lookups that can simply miss (`get`,
/// `coords_to_offset`, `offset_to_coords`) return `Option` instead, per the
/// distinction the engine draws between "not found" and "failed".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error {
    /// Allocator exhausted, or the mem-registry is full (255 entries in use).
    OutOfMemory,
    /// `add_line` referenced an unknown or out-of-range mem id or byte slice.
    InvalidMemId,
    /// A grapheme-pool handle has an out-of-range class field.
    InvalidId,
    /// A grapheme-pool handle is stale: its slot was recycled since.
    WrongGeneration,
    /// A position or range fell outside the addressed structure.
    IndexOutOfBounds,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfMemory => write!(f, "allocator exhausted or mem-registry full"),
            Self::InvalidMemId => write!(f, "unknown mem id or out-of-range byte slice"),
            Self::InvalidId => write!(f, "grapheme handle has an invalid class id"),
            Self::WrongGeneration => write!(f, "grapheme handle is stale (slot recycled)"),
            Self::IndexOutOfBounds => write!(f, "index or range out of bounds"),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert!(Error::OutOfMemory.to_string().contains("exhausted"));
        assert!(Error::WrongGeneration.to_string().contains("stale"));
        assert!(Error::InvalidMemId.to_string().contains("mem id"));
    }
}
