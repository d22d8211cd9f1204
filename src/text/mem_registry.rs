//! Registry of source byte buffers referenced by `Text` segments.
//!
//! Text segments never copy bytes into the rope; they carry a `mem_id` plus
//! a byte range into whichever buffer was registered under that id. Up to
//! 255 buffers may be registered at once (the id is a `u8`), matching the
//! spec's `TextChunk::mem_id` field width.

use crate::error::{Error, Result};

const MAX_ENTRIES: usize = 255;

#[derive(Clone, Debug)]
struct MemEntry {
    bytes: Vec<u8>,
    owned: bool,
}

/// Buffer table backing `Text` segments.
///
/// `clear()` (called by `TextBuffer::clear`/`set_text`/`set_styled_text`)
/// leaves every registered id valid; only `reset()` frees owned buffers and
/// invalidates ids.
#[derive(Clone, Debug, Default)]
pub struct MemRegistry {
    entries: Vec<Option<MemEntry>>,
    free_list: Vec<u8>,
}

impl MemRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new buffer, returning its id. Fails `OutOfMemory` once
    /// 255 ids are in use.
    pub fn register(&mut self, bytes: &[u8], owned: bool) -> Result<u8> {
        let entry = Some(MemEntry {
            bytes: bytes.to_vec(),
            owned,
        });
        if let Some(id) = self.free_list.pop() {
            self.entries[id as usize] = entry;
            return Ok(id);
        }
        if self.entries.len() >= MAX_ENTRIES {
            return Err(Error::OutOfMemory);
        }
        let id = self.entries.len() as u8;
        self.entries.push(entry);
        Ok(id)
    }

    /// Fetch a previously registered buffer's bytes.
    #[must_use]
    pub fn get(&self, id: u8) -> Option<&[u8]> {
        self.entries
            .get(id as usize)
            .and_then(Option::as_ref)
            .map(|entry| entry.bytes.as_slice())
    }

    #[must_use]
    pub fn is_valid(&self, id: u8) -> bool {
        self.entries.get(id as usize).is_some_and(Option::is_some)
    }

    /// Free every owned buffer and invalidate all ids.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.free_list.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_get() {
        let mut reg = MemRegistry::new();
        let id = reg.register(b"hello", true).unwrap();
        assert_eq!(reg.get(id), Some(b"hello".as_slice()));
    }

    #[test]
    fn test_reset_invalidates_ids() {
        let mut reg = MemRegistry::new();
        let id = reg.register(b"data", true).unwrap();
        reg.reset();
        assert_eq!(reg.get(id), None);
        assert!(!reg.is_valid(id));
    }

    #[test]
    fn test_ids_survive_unrelated_inserts() {
        let mut reg = MemRegistry::new();
        let a = reg.register(b"a", false).unwrap();
        let b = reg.register(b"b", false).unwrap();
        assert_eq!(reg.get(a), Some(b"a".as_slice()));
        assert_eq!(reg.get(b), Some(b"b".as_slice()));
    }

    #[test]
    fn test_out_of_memory_after_255_entries() {
        let mut reg = MemRegistry::new();
        for _ in 0..255 {
            reg.register(b"x", false).unwrap();
        }
        assert_eq!(reg.register(b"y", false), Err(Error::OutOfMemory));
    }

    #[test]
    fn test_unknown_id_returns_none() {
        let reg = MemRegistry::new();
        assert_eq!(reg.get(0), None);
    }
}
