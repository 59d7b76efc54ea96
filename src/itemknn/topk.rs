use std::cmp::Reverse;

use dary_heap::OctonaryHeap;

/// Keeps the `capacity` greatest values pushed so far. The weakest retained value sits on
/// top of a min-heap: every push that overflows the capacity pops it again.
pub struct BoundedTopK<T: Ord> {
    capacity: usize,
    heap: OctonaryHeap<Reverse<T>>,
}

impl<T: Ord> BoundedTopK<T> {
    pub fn new(capacity: usize) -> Self {
        BoundedTopK {
            capacity,
            heap: OctonaryHeap::with_capacity(capacity + 1),
        }
    }

    pub fn push(&mut self, value: T) {
        if self.capacity == 0 {
            return;
        }
        self.heap.push(Reverse(value));
        if self.heap.len() > self.capacity {
            self.heap.pop();
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Weakest retained value.
    pub fn peek_min(&self) -> Option<&T> {
        self.heap.peek().map(|Reverse(value)| value)
    }

    /// Retained values, greatest first.
    pub fn into_sorted_vec(self) -> Vec<T> {
        let mut values: Vec<T> = self
            .heap
            .into_vec()
            .into_iter()
            .map(|Reverse(value)| value)
            .collect();
        values.sort_unstable_by(|a, b| b.cmp(a));
        values
    }
}

#[cfg(test)]
mod topk_test {
    use super::*;
    use crate::itemknn::ScoredItem;

    #[test]
    fn should_keep_largest_values() {
        let mut top = BoundedTopK::new(3);
        for value in [5, 1, 9, 3, 7, 2] {
            top.push(value);
        }
        assert_eq!(3, top.len());
        assert_eq!(Some(&5), top.peek_min());
        assert_eq!(vec![9, 7, 5], top.into_sorted_vec());
    }

    #[test]
    fn should_handle_zero_capacity() {
        let mut top = BoundedTopK::new(0);
        top.push(1);
        assert!(top.is_empty());
        assert!(top.into_sorted_vec().is_empty());
    }

    #[test]
    fn should_prefer_lower_order_on_ties() {
        let mut top = BoundedTopK::new(2);
        top.push(ScoredItem::new(30, 3, 0.5));
        top.push(ScoredItem::new(10, 1, 0.5));
        top.push(ScoredItem::new(40, 4, 0.9));
        top.push(ScoredItem::new(20, 2, 0.5));
        let kept: Vec<u32> = top.into_sorted_vec().iter().map(|scored| scored.item).collect();
        assert_eq!(vec![40, 10], kept);
    }
}
