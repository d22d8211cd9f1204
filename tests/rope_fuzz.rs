//! Property tests over the generic rope: depth stays bounded and aggregated
//! metrics stay consistent across randomized structural edits.

use proptest::prelude::*;
use termrope::{Rope, RopeItem, WalkerResult};

#[derive(Clone, Debug, PartialEq, Eq)]
struct Tok(u32);

impl RopeItem for Tok {
    type Metrics = u32;

    fn empty() -> Self {
        Tok(0)
    }

    fn is_empty(&self) -> bool {
        self.0 == 0
    }

    fn metrics(&self) -> Self::Metrics {
        self.0
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

#[derive(Clone, Debug)]
enum Op {
    Insert(u32, u32),
    Delete(u32),
}

fn op_strategy(max_index: u32) -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..=max_index, 1..1000u32).prop_map(|(i, v)| Op::Insert(i, v)),
        (0..max_index).prop_map(Op::Delete),
    ]
}

proptest! {
    #[test]
    fn depth_stays_bounded_under_random_edits(ops in prop::collection::vec(op_strategy(40), 0..200)) {
        let mut rope = Rope::<Tok>::new();
        for op in ops {
            match op {
                Op::Insert(i, v) => {
                    let idx = i.min(rope.count());
                    rope.insert(idx, Tok(v.max(1)));
                }
                Op::Delete(i) => {
                    if rope.count() > 0 {
                        let idx = i % rope.count();
                        rope.delete(idx);
                    }
                }
            }
            prop_assert!(rope.depth() <= height_bound(rope.count()).max(1));
        }
    }

    #[test]
    fn count_matches_successful_walk_visits(values in prop::collection::vec(1..1000u32, 0..60)) {
        let items: Vec<Tok> = values.iter().map(|&v| Tok(v)).collect();
        let rope = Rope::<Tok>::from_slice(&items);
        prop_assert_eq!(rope.count() as usize, items.len());

        let mut visited = 0usize;
        rope.walk(|_item, _idx, _metrics| {
            visited += 1;
            WalkerResult::CONTINUE
        });
        prop_assert_eq!(visited, items.len());
    }

    #[test]
    fn total_weight_equals_sum_of_items(values in prop::collection::vec(1..1000u32, 0..60)) {
        let items: Vec<Tok> = values.iter().map(|&v| Tok(v)).collect();
        let rope = Rope::<Tok>::from_slice(&items);
        let expected: u32 = values.iter().sum();
        prop_assert_eq!(rope.total_weight(), expected);
    }

    #[test]
    fn split_concat_round_trips_to_original(values in prop::collection::vec(1..1000u32, 1..60), at in 0u32..60) {
        let items: Vec<Tok> = values.iter().map(|&v| Tok(v)).collect();
        let rope = Rope::<Tok>::from_slice(&items);
        let split_at = at.min(rope.count());
        let (left, right) = rope.split(split_at);
        let rejoined = left.concat(right);
        prop_assert_eq!(rejoined.to_vec(), items);
    }
}
