//! Persistent binary tree nodes underlying [`super::Rope`].
//!
//! Leaves hold exactly one item (matching the positional contract: `count()`
//! is the number of non-empty leaves). Internal nodes cache the aggregate
//! count, the item's custom metric, and subtree height so balance checks and
//! positional descent are O(1) per level.

use std::rc::Rc;

/// An item storable in a [`super::Rope`].
///
/// A single shared "empty" value represents a hole left behind by deletion,
/// so leaves are never physically removed mid-edit — only replaced.
pub trait RopeItem: Clone {
    /// The associative, zero-having aggregate this rope tracks over items
    /// in addition to the built-in leaf count (e.g. `SegmentMetrics`).
    type Metrics: Copy + Default + std::ops::Add<Output = Self::Metrics>;

    /// The canonical empty value for this item type.
    fn empty() -> Self;

    /// Whether this value is the empty placeholder.
    fn is_empty(&self) -> bool;

    /// This item's contribution to the custom metric.
    fn metrics(&self) -> Self::Metrics;

    /// Which marker bucket (if any) this item belongs to.
    ///
    /// The rope supports a small closed set of marker kinds, identified by
    /// an arbitrary `u8` the item type assigns meaning to. Most item types
    /// have no markers at all.
    fn marker_kind(&self) -> Option<u8> {
        None
    }
}

pub enum Node<T: RopeItem> {
    Leaf(T),
    Internal {
        left: Rc<Node<T>>,
        right: Rc<Node<T>>,
        count: u32,
        metrics: T::Metrics,
        height: u32,
    },
}

// Derived `Debug` would only bind `T: Debug`, which doesn't cover the
// `T::Metrics` field — spell the bound out by hand instead.
impl<T: RopeItem + std::fmt::Debug> std::fmt::Debug for Node<T>
where
    T::Metrics: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Node::Leaf(item) => f.debug_tuple("Leaf").field(item).finish(),
            Node::Internal {
                left,
                right,
                count,
                metrics,
                height,
            } => f
                .debug_struct("Internal")
                .field("count", count)
                .field("metrics", metrics)
                .field("height", height)
                .field("left", left)
                .field("right", right)
                .finish(),
        }
    }
}

impl<T: RopeItem> Node<T> {
    pub fn empty_leaf() -> Rc<Self> {
        Rc::new(Node::Leaf(T::empty()))
    }

    pub fn leaf(item: T) -> Rc<Self> {
        Rc::new(Node::Leaf(item))
    }

    pub fn count(&self) -> u32 {
        match self {
            Node::Leaf(item) => u32::from(!item.is_empty()),
            Node::Internal { count, .. } => *count,
        }
    }

    pub fn metrics(&self) -> T::Metrics {
        match self {
            Node::Leaf(item) => item.metrics(),
            Node::Internal { metrics, .. } => *metrics,
        }
    }

    pub fn height(&self) -> u32 {
        match self {
            Node::Leaf(_) => 0,
            Node::Internal { height, .. } => *height,
        }
    }

    pub fn internal(left: Rc<Node<T>>, right: Rc<Node<T>>) -> Rc<Node<T>> {
        let count = left.count() + right.count();
        let metrics = left.metrics() + right.metrics();
        let height = 1 + left.height().max(right.height());
        Rc::new(Node::Internal {
            left,
            right,
            count,
            metrics,
            height,
        })
    }

    /// Join two subtrees, eliding a side that contributes nothing.
    pub fn join(left: Rc<Node<T>>, right: Rc<Node<T>>) -> Rc<Node<T>> {
        if left.count() == 0 {
            right
        } else if right.count() == 0 {
            left
        } else {
            Self::internal(left, right)
        }
    }

    /// Build a balanced tree from a slice of (possibly pre-filtered) items.
    pub fn from_items(items: &[T]) -> Rc<Node<T>> {
        match items.len() {
            0 => Self::empty_leaf(),
            1 => Self::leaf(items[0].clone()),
            n => {
                let mid = n / 2;
                let left = Self::from_items(&items[..mid]);
                let right = Self::from_items(&items[mid..]);
                Self::internal(left, right)
            }
        }
    }

    pub fn get(&self, index: u32) -> Option<&T> {
        match self {
            Node::Leaf(item) => {
                if index == 0 && !item.is_empty() {
                    Some(item)
                } else {
                    None
                }
            }
            Node::Internal { left, right, .. } => {
                let lc = left.count();
                if index < lc {
                    left.get(index)
                } else {
                    right.get(index - lc)
                }
            }
        }
    }

    /// Insert `item` so it becomes the `index`-th non-empty leaf.
    pub fn insert(node: &Rc<Node<T>>, index: u32, item: T) -> Rc<Node<T>> {
        match &**node {
            Node::Leaf(existing) => {
                if existing.is_empty() {
                    Self::leaf(item)
                } else if index == 0 {
                    Self::internal(Self::leaf(item), node.clone())
                } else {
                    Self::internal(node.clone(), Self::leaf(item))
                }
            }
            Node::Internal { left, right, .. } => {
                let lc = left.count();
                if index < lc {
                    Self::internal(Self::insert(left, index, item), right.clone())
                } else {
                    Self::internal(left.clone(), Self::insert(right, index - lc, item))
                }
            }
        }
    }

    /// Remove the `index`-th non-empty leaf, replacing it with the empty
    /// placeholder.
    pub fn delete(node: &Rc<Node<T>>, index: u32) -> Rc<Node<T>> {
        match &**node {
            Node::Leaf(_) => Self::empty_leaf(),
            Node::Internal { left, right, .. } => {
                let lc = left.count();
                if index < lc {
                    Self::internal(Self::delete(left, index), right.clone())
                } else {
                    Self::internal(left.clone(), Self::delete(right, index - lc))
                }
            }
        }
    }

    /// Replace the `index`-th non-empty leaf's value.
    pub fn replace(node: &Rc<Node<T>>, index: u32, item: T) -> Rc<Node<T>> {
        match &**node {
            Node::Leaf(_) => Self::leaf(item),
            Node::Internal { left, right, .. } => {
                let lc = left.count();
                if index < lc {
                    Self::internal(Self::replace(left, index, item), right.clone())
                } else {
                    Self::internal(left.clone(), Self::replace(right, index - lc, item))
                }
            }
        }
    }

    /// Split into `(items [0, at)), items [at, count))`.
    pub fn split(node: &Rc<Node<T>>, at: u32) -> (Rc<Node<T>>, Rc<Node<T>>) {
        match &**node {
            Node::Leaf(item) => {
                if item.is_empty() || at == 0 {
                    (Self::empty_leaf(), node.clone())
                } else {
                    (node.clone(), Self::empty_leaf())
                }
            }
            Node::Internal { left, right, .. } => {
                let lc = left.count();
                if at <= lc {
                    let (ll, lr) = Self::split(left, at);
                    (ll, Self::join(lr, right.clone()))
                } else {
                    let (rl, rr) = Self::split(right, at - lc);
                    (Self::join(left.clone(), rl), rr)
                }
            }
        }
    }

    /// Collect every non-empty leaf, in order.
    pub fn collect_items(&self, out: &mut Vec<T>) {
        match self {
            Node::Leaf(item) => {
                if !item.is_empty() {
                    out.push(item.clone());
                }
            }
            Node::Internal { left, right, .. } => {
                left.collect_items(out);
                right.collect_items(out);
            }
        }
    }

    /// In-order walk with early stop/skip-subtree control, tracking each
    /// item's absolute index and the aggregated metric accumulated strictly
    /// before it.
    ///
    /// Returns `false` once the callback requests a stop, so callers can
    /// short-circuit.
    pub fn walk(
        &self,
        start_index: u32,
        base_index: &mut u32,
        base_metrics: &mut T::Metrics,
        f: &mut dyn FnMut(&T, u32, T::Metrics) -> WalkerResult,
    ) -> bool {
        match self {
            Node::Leaf(item) => {
                if item.is_empty() {
                    return true;
                }
                if *base_index < start_index {
                    *base_index += 1;
                    *base_metrics = *base_metrics + item.metrics();
                    return true;
                }
                let result = f(item, *base_index, *base_metrics);
                *base_index += 1;
                *base_metrics = *base_metrics + item.metrics();
                !result.stop
            }
            Node::Internal { left, right, .. } => {
                let left_end = *base_index + left.count();
                if left_end > start_index
                    && !left.walk(start_index, base_index, base_metrics, f)
                {
                    return false;
                }
                if start_index >= left_end {
                    // `base_index`/`base_metrics` must reflect having
                    // skipped over `left` even if we never descended into
                    // it (start_index already past it).
                    *base_index = left_end;
                    *base_metrics = left.metrics();
                }
                right.walk(start_index, base_index, base_metrics, f)
            }
        }
    }
}

/// Controls an in-progress [`Node::walk`].
#[derive(Clone, Copy, Debug, Default)]
pub struct WalkerResult {
    pub stop: bool,
}

impl WalkerResult {
    pub const CONTINUE: Self = Self { stop: false };
    pub const STOP: Self = Self { stop: true };
}
