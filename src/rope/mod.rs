//! Generic positional rope with pluggable per-item metrics.
//!
//! `Rope<T>` stores a sequence of `T` in a persistent binary tree (see
//! [`node`]) indexed purely by position — there is no notion of "character"
//! or "byte" baked in, unlike a text-specific rope. Callers pick the item
//! type (a text engine plugs in its own segment type, say) and get back
//! O(log n) positional access plus an aggregated custom metric summed
//! bottom-up over every node.
//!
//! Rebalancing is rebuild-based rather than rotation-based: after a
//! structural edit, if the tree's height exceeds `4 * ceil(log2(count)) + 1`
//! the whole rope is flattened and rebuilt as a perfectly balanced tree in
//! one pass. This keeps the implementation simple while still bounding
//! `depth <= k * log2(count)` for a generous `k`.

mod node;

use std::collections::HashMap;
use std::rc::Rc;

pub use node::{RopeItem, WalkerResult};
use node::Node;

/// One entry in a marker bucket: the marked item's absolute index and the
/// aggregated metric accumulated strictly before it.
#[derive(Clone, Copy, Debug)]
pub struct MarkerEntry<M> {
    pub index: u32,
    pub metrics_before: M,
}

/// A cursor into a [`Rope`] that remembers the last position it visited.
///
/// Repeated edits at nearby positions (the common case for an editor
/// cursor) avoid re-deriving a fresh starting point each time; the
/// underlying descent is still a plain indexed operation; `Finger` only
/// saves callers from having to track the index themselves.
#[derive(Clone, Copy, Debug)]
pub struct Finger {
    index: u32,
}

impl Finger {
    #[must_use]
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn seek(&mut self, index: u32) {
        self.index = index;
    }
}

fn log2_ceil(n: u32) -> u32 {
    if n <= 1 {
        0
    } else {
        32 - (n - 1).leading_zeros()
    }
}

fn height_bound(count: u32) -> u32 {
    4 * log2_ceil(count) + 1
}

/// A persistent, positionally-indexed sequence of `T` with an aggregated
/// custom metric and a small closed set of marker kinds.
#[derive(Clone)]
pub struct Rope<T: RopeItem> {
    root: Rc<Node<T>>,
    markers: HashMap<u8, Vec<MarkerEntry<T::Metrics>>>,
}

impl<T: RopeItem + std::fmt::Debug> std::fmt::Debug for Rope<T>
where
    T::Metrics: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rope")
            .field("root", &self.root)
            .field("markers", &self.markers)
            .finish()
    }
}

impl<T: RopeItem> Rope<T> {
    /// An empty rope.
    #[must_use]
    pub fn new() -> Self {
        let root = Node::empty_leaf();
        let markers = HashMap::new();
        Self { root, markers }
    }

    /// Build a rope from a slice of items, filtering out any that are
    /// already the empty placeholder.
    #[must_use]
    pub fn from_slice(items: &[T]) -> Self {
        let filtered: Vec<T> = items.iter().filter(|i| !i.is_empty()).cloned().collect();
        let root = Node::from_items(&filtered);
        let mut rope = Self {
            root,
            markers: HashMap::new(),
        };
        rope.recompute_markers();
        rope
    }

    /// Build a rope containing a single item.
    #[must_use]
    pub fn from_item(item: T) -> Self {
        if item.is_empty() {
            Self::new()
        } else {
            Self::from_slice(std::slice::from_ref(&item))
        }
    }

    /// Number of non-empty items.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.root.count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Item at a given position, if in range.
    #[must_use]
    pub fn get(&self, index: u32) -> Option<&T> {
        self.root.get(index)
    }

    /// The aggregated custom metric over the whole rope.
    #[must_use]
    pub fn total_weight(&self) -> T::Metrics {
        self.root.metrics()
    }

    /// Current tree height. Exposed mainly for invariant testing.
    #[must_use]
    pub fn depth(&self) -> u32 {
        self.root.height()
    }

    fn set_root(&mut self, root: Rc<Node<T>>) {
        self.root = root;
        self.maybe_rebalance();
        self.recompute_markers();
    }

    fn maybe_rebalance(&mut self) {
        let count = self.root.count();
        if self.root.height() > height_bound(count) {
            let mut items = Vec::with_capacity(count as usize);
            self.root.collect_items(&mut items);
            self.root = Node::from_items(&items);
        }
    }

    fn recompute_markers(&mut self) {
        let mut by_kind: HashMap<u8, Vec<MarkerEntry<T::Metrics>>> = HashMap::new();
        let mut index = 0u32;
        let mut metrics = T::Metrics::default();
        self.root.walk(0, &mut index, &mut metrics, &mut |item, idx, before| {
            if let Some(kind) = item.marker_kind() {
                by_kind.entry(kind).or_default().push(MarkerEntry {
                    index: idx,
                    metrics_before: before,
                });
            }
            WalkerResult::CONTINUE
        });
        self.markers = by_kind;
    }

    /// Insert `item` at `index`, shifting everything at or after it right.
    pub fn insert(&mut self, index: u32, item: T) {
        if item.is_empty() {
            return;
        }
        let root = Node::insert(&self.root, index.min(self.count()), item);
        self.set_root(root);
    }

    /// Remove the item at `index`.
    pub fn delete(&mut self, index: u32) {
        if index >= self.count() {
            return;
        }
        let root = Node::delete(&self.root, index);
        self.set_root(root);
    }

    /// Replace the item at `index` in place.
    pub fn replace(&mut self, index: u32, item: T) {
        if index >= self.count() {
            return;
        }
        let root = Node::replace(&self.root, index, item);
        self.set_root(root);
    }

    /// Insert a run of items starting at `index`, preserving order.
    pub fn insert_slice(&mut self, index: u32, items: &[T]) {
        let mut at = index.min(self.count());
        for item in items {
            if item.is_empty() {
                continue;
            }
            let root = Node::insert(&self.root, at, item.clone());
            self.root = root;
            at += 1;
        }
        self.set_root(self.root.clone());
    }

    /// Remove items in `range`.
    pub fn delete_range(&mut self, range: std::ops::Range<u32>) {
        let count = self.count();
        let lo = range.start.min(count);
        let hi = range.end.min(count).max(lo);
        if lo == hi {
            return;
        }
        let (left, rest) = Node::split(&self.root, lo);
        let (_removed, right) = Node::split(&rest, hi - lo);
        self.set_root(Node::join(left, right));
    }

    /// Split into `(items before `at`, items from `at` on)`.
    #[must_use]
    pub fn split(&self, at: u32) -> (Self, Self) {
        let (left, right) = Node::split(&self.root, at.min(self.count()));
        let mut left_rope = Self {
            root: left,
            markers: HashMap::new(),
        };
        let mut right_rope = Self {
            root: right,
            markers: HashMap::new(),
        };
        left_rope.maybe_rebalance();
        right_rope.maybe_rebalance();
        left_rope.recompute_markers();
        right_rope.recompute_markers();
        (left_rope, right_rope)
    }

    /// Concatenate two ropes, consuming both.
    #[must_use]
    pub fn concat(mut self, other: Self) -> Self {
        self.root = Node::join(self.root, other.root);
        self.maybe_rebalance();
        self.recompute_markers();
        self
    }

    /// Append `items` to the end of the rope.
    pub fn append(&mut self, items: &[T]) {
        let count = self.count();
        self.insert_slice(count, items);
    }

    /// Prepend `items` to the start of the rope.
    pub fn prepend(&mut self, items: &[T]) {
        self.insert_slice(0, items);
    }

    /// Walk every item from the start, in order, stopping early if the
    /// callback asks to.
    pub fn walk(&self, f: impl FnMut(&T, u32, T::Metrics) -> WalkerResult) {
        self.walk_from(0, f);
    }

    /// Walk every item starting at `index`, in order.
    pub fn walk_from(&self, index: u32, mut f: impl FnMut(&T, u32, T::Metrics) -> WalkerResult) {
        let mut base_index = 0u32;
        let mut base_metrics = T::Metrics::default();
        self.root
            .walk(index, &mut base_index, &mut base_metrics, &mut f);
    }

    /// Create a finger positioned at `index`.
    #[must_use]
    pub fn make_finger(&self, index: u32) -> Finger {
        Finger {
            index: index.min(self.count()),
        }
    }

    /// Insert at the finger's position, then advance it past the new item.
    pub fn insert_at_finger(&mut self, finger: &mut Finger, item: T) {
        let at = finger.index;
        self.insert(at, item);
        finger.index = at + 1;
    }

    /// Delete the item at the finger's position; the finger does not move.
    pub fn delete_at_finger(&mut self, finger: &mut Finger) {
        self.delete(finger.index);
    }

    /// Resolve a finger back to a plain index (fingers already are one, but
    /// this mirrors the positional-cursor API other rope implementations
    /// expose).
    #[must_use]
    pub fn get_index(&self, finger: &Finger) -> u32 {
        finger.index
    }

    /// Number of markers of a given kind.
    #[must_use]
    pub fn marker_count(&self, kind: u8) -> usize {
        self.markers.get(&kind).map_or(0, Vec::len)
    }

    /// The `i`-th marker of a given kind, if present.
    #[must_use]
    pub fn get_marker(&self, kind: u8, i: usize) -> Option<MarkerEntry<T::Metrics>> {
        self.markers.get(&kind)?.get(i).copied()
    }

    /// Collect every item into a fresh `Vec`, in order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.count() as usize);
        self.root.collect_items(&mut out);
        out
    }
}

impl<T: RopeItem> Default for Rope<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    struct CharMetrics {
        len: u32,
    }

    impl std::ops::Add for CharMetrics {
        type Output = Self;
        fn add(self, rhs: Self) -> Self {
            Self {
                len: self.len + rhs.len,
            }
        }
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    struct Ch(char);

    impl RopeItem for Ch {
        type Metrics = CharMetrics;

        fn empty() -> Self {
            Ch('\0')
        }

        fn is_empty(&self) -> bool {
            self.0 == '\0'
        }

        fn metrics(&self) -> Self::Metrics {
            CharMetrics { len: 1 }
        }

        fn marker_kind(&self) -> Option<u8> {
            if self.0 == '\n' { Some(0) } else { None }
        }
    }

    fn rope_of(s: &str) -> Rope<Ch> {
        let items: Vec<Ch> = s.chars().map(Ch).collect();
        Rope::from_slice(&items)
    }

    fn rope_to_string(r: &Rope<Ch>) -> String {
        r.to_vec().into_iter().map(|c| c.0).collect()
    }

    #[test]
    fn test_new_is_empty() {
        let r: Rope<Ch> = Rope::new();
        assert_eq!(r.count(), 0);
        assert!(r.is_empty());
    }

    #[test]
    fn test_from_slice_and_get() {
        let r = rope_of("hello");
        assert_eq!(r.count(), 5);
        assert_eq!(r.get(0), Some(&Ch('h')));
        assert_eq!(r.get(4), Some(&Ch('o')));
        assert_eq!(r.get(5), None);
    }

    #[test]
    fn test_insert_and_delete() {
        let mut r = rope_of("helo");
        r.insert(3, Ch('l'));
        assert_eq!(rope_to_string(&r), "hello");
        r.delete(0);
        assert_eq!(rope_to_string(&r), "ello");
    }

    #[test]
    fn test_replace() {
        let mut r = rope_of("cat");
        r.replace(0, Ch('b'));
        assert_eq!(rope_to_string(&r), "bat");
    }

    #[test]
    fn test_split_and_concat() {
        let r = rope_of("hello world");
        let (left, right) = r.split(5);
        assert_eq!(rope_to_string(&left), "hello");
        assert_eq!(rope_to_string(&right), " world");
        let joined = left.concat(right);
        assert_eq!(rope_to_string(&joined), "hello world");
    }

    #[test]
    fn test_insert_slice_and_delete_range() {
        let mut r = rope_of("ace");
        r.insert_slice(1, &[Ch('b')]);
        assert_eq!(rope_to_string(&r), "abce");
        r.insert_slice(3, &[Ch('d')]);
        assert_eq!(rope_to_string(&r), "abcde");
        r.delete_range(1..3);
        assert_eq!(rope_to_string(&r), "ade");
    }

    #[test]
    fn test_append_prepend() {
        let mut r = rope_of("bc");
        r.append(&[Ch('d'), Ch('e')]);
        r.prepend(&[Ch('a')]);
        assert_eq!(rope_to_string(&r), "abcde");
    }

    #[test]
    fn test_total_weight() {
        let r = rope_of("abcd");
        assert_eq!(r.total_weight().len, 4);
    }

    #[test]
    fn test_walk_from_skips_earlier_items() {
        let r = rope_of("abcdef");
        let mut seen = Vec::new();
        r.walk_from(3, |item, index, _| {
            seen.push((index, item.0));
            WalkerResult::CONTINUE
        });
        assert_eq!(seen, vec![(3, 'd'), (4, 'e'), (5, 'f')]);
    }

    #[test]
    fn test_walk_can_stop_early() {
        let r = rope_of("abcdef");
        let mut seen = Vec::new();
        r.walk(|item, index, _| {
            seen.push((index, item.0));
            if item.0 == 'c' {
                WalkerResult::STOP
            } else {
                WalkerResult::CONTINUE
            }
        });
        assert_eq!(seen, vec![(0, 'a'), (1, 'b'), (2, 'c')]);
    }

    #[test]
    fn test_markers_track_newlines() {
        let r = rope_of("a\nb\nc");
        assert_eq!(r.marker_count(0), 2);
        let first = r.get_marker(0, 0).unwrap();
        assert_eq!(first.index, 1);
        assert_eq!(first.metrics_before.len, 1);
        let second = r.get_marker(0, 1).unwrap();
        assert_eq!(second.index, 3);
        assert_eq!(second.metrics_before.len, 3);
    }

    #[test]
    fn test_markers_rebuild_after_delete() {
        let mut r = rope_of("a\nb\nc");
        r.delete(1);
        assert_eq!(r.marker_count(0), 1);
        assert_eq!(rope_to_string(&r), "ab\nc");
    }

    #[test]
    fn test_finger_sequential_inserts() {
        let mut r = rope_of("ae");
        let mut finger = r.make_finger(1);
        r.insert_at_finger(&mut finger, Ch('b'));
        r.insert_at_finger(&mut finger, Ch('c'));
        r.insert_at_finger(&mut finger, Ch('d'));
        assert_eq!(rope_to_string(&r), "abcde");
        assert_eq!(r.get_index(&finger), 4);
    }

    #[test]
    fn test_depth_bound_holds_after_many_inserts() {
        let mut r: Rope<Ch> = Rope::new();
        for i in 0..500u32 {
            let ch = char::from_u32(u32::from(b'a') + (i % 26)).unwrap();
            r.insert(r.count(), Ch(ch));
        }
        let count = r.count();
        assert!(r.depth() <= height_bound(count));
    }

    #[test]
    fn test_depth_bound_holds_after_scattered_deletes() {
        let mut r: Rope<Ch> = Rope::new();
        for i in 0..300u32 {
            let ch = char::from_u32(u32::from(b'a') + (i % 26)).unwrap();
            r.insert(i / 2, Ch(ch));
        }
        for _ in 0..150 {
            if r.count() == 0 {
                break;
            }
            r.delete(r.count() / 3);
        }
        let count = r.count();
        assert!(r.depth() <= height_bound(count));
    }

    #[test]
    fn test_from_item_empty_is_empty_rope() {
        let r = Rope::from_item(Ch('\0'));
        assert!(r.is_empty());
    }
}
