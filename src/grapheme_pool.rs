//! Size-classed, generation-tagged pool for grapheme clusters.
//!
//! Stores multi-codepoint graphemes (emoji, ZWJ sequences, combining
//! characters) that a [`crate::text::segment::TextChunk`] is too coarse to
//! represent as a single `char`. Slots are bucketed into fixed size classes
//! so that clusters of similar length reuse the same free list instead of
//! fragmenting one another, and every handle carries a generation counter
//! so a stale handle into a recycled slot is detected rather than silently
//! returning the wrong grapheme.
//!
//! # Handle layout
//!
//! A [`GraphemeHandle`] packs `[class_id:3 | generation:13 | slot:16]` into
//! a single `u32`, the same bit-packing idiom the rest of this crate uses
//! for compact identifiers.

use crate::error::{Error, Result};

/// Number of size classes.
pub const NUM_CLASSES: usize = 5;

/// Max stored byte length for each size class, smallest first.
const CLASS_CAPS: [usize; NUM_CLASSES] = [8, 16, 32, 64, 128];

const SLOT_BITS: u32 = 16;
const GEN_BITS: u32 = 13;
const SLOT_MASK: u32 = (1 << SLOT_BITS) - 1;
const GEN_MASK: u32 = (1 << GEN_BITS) - 1;
const GEN_SHIFT: u32 = SLOT_BITS;
const CLASS_SHIFT: u32 = SLOT_BITS + GEN_BITS;

/// Opaque handle to a pooled grapheme cluster.
///
/// Valid only against the [`GraphemePool`] that produced it, and only until
/// that slot's generation advances (the cluster is freed and the slot
/// reused).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GraphemeHandle(u32);

impl GraphemeHandle {
    fn new(class_id: u8, generation: u16, slot: u16) -> Self {
        let packed = (u32::from(class_id) << CLASS_SHIFT)
            | ((u32::from(generation) & GEN_MASK) << GEN_SHIFT)
            | u32::from(slot);
        Self(packed)
    }

    fn class_id(self) -> u32 {
        self.0 >> CLASS_SHIFT
    }

    fn generation(self) -> u16 {
        ((self.0 >> GEN_SHIFT) & GEN_MASK) as u16
    }

    fn slot(self) -> u16 {
        (self.0 & SLOT_MASK) as u16
    }

    /// The raw packed representation, for embedding in other compact types.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Reconstruct a handle from its raw packed representation.
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }
}

#[derive(Clone, Debug)]
struct Slot {
    generation: u16,
    refcount: u32,
    width: u8,
    bytes: String,
}

impl Slot {
    fn is_free(&self) -> bool {
        self.refcount == 0
    }
}

#[derive(Clone, Debug, Default)]
struct ClassPool {
    slots: Vec<Slot>,
    free_list: Vec<u16>,
}

impl ClassPool {
    fn alloc(&mut self, bytes: &str, width: u8) -> Result<(u16, u16)> {
        if let Some(slot_idx) = self.free_list.pop() {
            let slot = &mut self.slots[slot_idx as usize];
            slot.generation = slot.generation.wrapping_add(1) & (GEN_MASK as u16);
            slot.refcount = 1;
            slot.width = width;
            slot.bytes.clear();
            slot.bytes.push_str(bytes);
            return Ok((slot_idx, slot.generation));
        }
        let slot_idx = self.slots.len();
        if slot_idx > SLOT_MASK as usize {
            return Err(Error::OutOfMemory);
        }
        self.slots.push(Slot {
            generation: 0,
            refcount: 1,
            width,
            bytes: bytes.to_owned(),
        });
        Ok((slot_idx as u16, 0))
    }

    fn get(&self, slot_idx: u16, generation: u16) -> Result<&Slot> {
        let slot = self
            .slots
            .get(slot_idx as usize)
            .ok_or(Error::InvalidId)?;
        if slot.generation != generation || slot.is_free() {
            return Err(Error::WrongGeneration);
        }
        Ok(slot)
    }

    fn get_mut(&mut self, slot_idx: u16, generation: u16) -> Result<&mut Slot> {
        let slot = self
            .slots
            .get_mut(slot_idx as usize)
            .ok_or(Error::InvalidId)?;
        if slot.generation != generation || slot.is_free() {
            return Err(Error::WrongGeneration);
        }
        Ok(slot)
    }
}

/// Pool of pooled grapheme clusters, bucketed by byte length into size
/// classes with generation-tagged, reference-counted slots.
#[derive(Clone, Debug, Default)]
pub struct GraphemePool {
    classes: [ClassPool; NUM_CLASSES],
}

impl GraphemePool {
    /// Create a new empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pick the smallest size class whose capacity fits `len` bytes.
    fn class_for_len(len: usize) -> Result<usize> {
        CLASS_CAPS
            .iter()
            .position(|&cap| len <= cap)
            .ok_or(Error::OutOfMemory)
    }

    /// Allocate a grapheme cluster with the given pre-computed display
    /// width. The initial reference count is 1.
    pub fn alloc(&mut self, grapheme: &str, width: u8) -> Result<GraphemeHandle> {
        let class = Self::class_for_len(grapheme.len())?;
        let (slot, generation) = self.classes[class].alloc(grapheme, width)?;
        Ok(GraphemeHandle::new(class as u8, generation, slot))
    }

    /// Intern a grapheme, returning an existing handle (with incremented
    /// refcount) if an identical cluster is already live in the same size
    /// class, otherwise allocating a new one.
    pub fn intern(&mut self, grapheme: &str, width: u8) -> Result<GraphemeHandle> {
        let class = Self::class_for_len(grapheme.len())?;
        let existing = self.classes[class]
            .slots
            .iter()
            .enumerate()
            .find(|(_, slot)| !slot.is_free() && slot.bytes == grapheme)
            .map(|(idx, slot)| (idx as u16, slot.generation));

        if let Some((slot, generation)) = existing {
            let handle = GraphemeHandle::new(class as u8, generation, slot);
            self.incref(handle)?;
            return Ok(handle);
        }
        self.alloc(grapheme, width)
    }

    fn class_pool(&self, handle: GraphemeHandle) -> Result<&ClassPool> {
        self.classes
            .get(handle.class_id() as usize)
            .ok_or(Error::InvalidId)
    }

    fn class_pool_mut(&mut self, handle: GraphemeHandle) -> Result<&mut ClassPool> {
        self.classes
            .get_mut(handle.class_id() as usize)
            .ok_or(Error::InvalidId)
    }

    /// Increment the reference count for a handle.
    pub fn incref(&mut self, handle: GraphemeHandle) -> Result<()> {
        let (slot, generation) = (handle.slot(), handle.generation());
        let slot = self.class_pool_mut(handle)?.get_mut(slot, generation)?;
        slot.refcount = slot.refcount.saturating_add(1);
        Ok(())
    }

    /// Decrement the reference count for a handle. Returns `true` if
    /// references remain, `false` if the slot was just freed.
    pub fn decref(&mut self, handle: GraphemeHandle) -> Result<bool> {
        let (slot_idx, generation) = (handle.slot(), handle.generation());
        let class = self.class_pool_mut(handle)?;
        let slot = class.get_mut(slot_idx, generation)?;
        slot.refcount -= 1;
        if slot.refcount == 0 {
            slot.bytes.clear();
            class.free_list.push(slot_idx);
            return Ok(false);
        }
        Ok(true)
    }

    /// Get the grapheme string for a handle.
    pub fn get(&self, handle: GraphemeHandle) -> Result<&str> {
        let (slot, generation) = (handle.slot(), handle.generation());
        Ok(self.class_pool(handle)?.get(slot, generation)?.bytes.as_str())
    }

    /// Get the cached display width for a handle.
    pub fn width(&self, handle: GraphemeHandle) -> Result<u8> {
        let (slot, generation) = (handle.slot(), handle.generation());
        Ok(self.class_pool(handle)?.get(slot, generation)?.width)
    }

    /// Get the reference count for a handle. Returns 0 for any invalid or
    /// stale handle rather than erroring, since refcount is most often
    /// polled diagnostically.
    #[must_use]
    pub fn refcount(&self, handle: GraphemeHandle) -> u32 {
        let (slot, generation) = (handle.slot(), handle.generation());
        self.class_pool(handle)
            .and_then(|c| c.get(slot, generation))
            .map_or(0, |s| s.refcount)
    }

    /// Check if a handle is currently valid (allocated, not freed, matching
    /// generation).
    #[must_use]
    pub fn is_valid(&self, handle: GraphemeHandle) -> bool {
        let (slot, generation) = (handle.slot(), handle.generation());
        self.class_pool(handle)
            .and_then(|c| c.get(slot, generation))
            .is_ok()
    }

    /// Number of live (non-freed) graphemes across all size classes.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.classes
            .iter()
            .flat_map(|c| c.slots.iter())
            .filter(|s| !s.is_free())
            .count()
    }

    /// Clear every slot in every size class, invalidating all outstanding
    /// handles (their generations no longer match anything live).
    pub fn clear(&mut self) {
        for class in &mut self.classes {
            class.slots.clear();
            class.free_list.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn w(s: &str) -> u8 {
        crate::unicode::display_width_with_method(s, crate::unicode::WidthMethod::WcWidth) as u8
    }

    #[test]
    fn test_alloc_and_get() {
        let mut pool = GraphemePool::new();
        let id = pool.alloc("👨‍👩‍👧", w("👨‍👩‍👧")).unwrap();

        assert_eq!(pool.get(id).unwrap(), "👨‍👩‍👧");
        assert_eq!(pool.refcount(id), 1);
        assert!(pool.is_valid(id));
    }

    #[test]
    fn test_incref_decref() {
        let mut pool = GraphemePool::new();
        let id = pool.alloc("test", 4).unwrap();

        pool.incref(id).unwrap();
        pool.incref(id).unwrap();
        assert_eq!(pool.refcount(id), 3);

        assert!(pool.decref(id).unwrap()); // 3 -> 2
        assert!(pool.decref(id).unwrap()); // 2 -> 1
        assert!(!pool.decref(id).unwrap()); // 1 -> 0, freed

        assert!(!pool.is_valid(id));
        assert!(matches!(pool.get(id), Err(Error::WrongGeneration)));
    }

    #[test]
    fn test_slot_reuse_bumps_generation() {
        let mut pool = GraphemePool::new();

        let id1 = pool.alloc("first", 5).unwrap();
        pool.decref(id1).unwrap();

        let id2 = pool.alloc("second", 6).unwrap();

        // Same physical slot, different generation.
        assert_ne!(id1, id2);
        assert_eq!(pool.get(id2).unwrap(), "second");
        // The old handle is now stale, not silently aliased to "second".
        assert!(matches!(pool.get(id1), Err(Error::WrongGeneration)));
    }

    #[test]
    fn test_size_classes_bucket_independently() {
        let mut pool = GraphemePool::new();
        let small = pool.alloc("a", 1).unwrap(); // class 0
        let big = pool.alloc(&"x".repeat(100), 1).unwrap(); // class 4

        assert_eq!(pool.get(small).unwrap(), "a");
        assert_eq!(pool.get(big).unwrap().len(), 100);
    }

    #[test]
    fn test_oversized_grapheme_is_out_of_memory() {
        let mut pool = GraphemePool::new();
        let huge = "x".repeat(200);
        assert_eq!(pool.alloc(&huge, 1), Err(Error::OutOfMemory));
    }

    #[test]
    fn test_intern_deduplication() {
        let mut pool = GraphemePool::new();

        let id1 = pool.intern("duplicate", 9).unwrap();
        let id2 = pool.intern("duplicate", 9).unwrap();

        assert_eq!(id1, id2);
        assert_eq!(pool.refcount(id1), 2);
        assert_eq!(pool.active_count(), 1);
    }

    #[test]
    fn test_invalid_id_handling() {
        let pool = GraphemePool::new();
        let invalid = GraphemeHandle::new(0, 0, 9999);
        assert!(matches!(pool.get(invalid), Err(Error::InvalidId)));
        assert!(!pool.is_valid(invalid));
    }

    #[test]
    fn test_invalid_class_id() {
        let pool = GraphemePool::new();
        let invalid = GraphemeHandle::new(7, 0, 0);
        assert!(matches!(pool.get(invalid), Err(Error::InvalidId)));
    }

    #[test]
    fn test_clear_invalidates_everything() {
        let mut pool = GraphemePool::new();
        let id = pool.alloc("a", 1).unwrap();
        pool.clear();
        assert!(!pool.is_valid(id));
        assert_eq!(pool.active_count(), 0);
    }

    #[test]
    fn test_raw_roundtrip() {
        let mut pool = GraphemePool::new();
        let id = pool.alloc("🎉", 2).unwrap();
        let roundtripped = GraphemeHandle::from_raw(id.raw());
        assert_eq!(id, roundtripped);
        assert_eq!(pool.get(roundtripped).unwrap(), "🎉");
    }
}
