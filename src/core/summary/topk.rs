//! Bounded top-K selection.

use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// A group in the top list: its digest and the size of one copy
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TopItem {
    /// Size of the representative file in bytes
    pub size: u64,
    /// Hex digest of the group
    pub digest: String,
}

/// Keeps the `capacity` largest items seen.
///
/// Backed by a min-heap so the smallest retained item is evicted first.
#[derive(Debug, Clone)]
pub struct TopK {
    heap: BinaryHeap<Reverse<TopItem>>,
    capacity: usize,
}

impl TopK {
    pub fn new(capacity: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(capacity.saturating_add(1)),
            capacity,
        }
    }

    /// Offer an item; kept only while there is room or it beats the current minimum
    pub fn push(&mut self, item: TopItem) {
        if self.capacity == 0 {
            return;
        }
        if self.heap.len() < self.capacity {
            self.heap.push(Reverse(item));
            return;
        }
        let beats_minimum = self
            .heap
            .peek()
            .is_some_and(|Reverse(min)| item.size > min.size);
        if beats_minimum {
            self.heap.pop();
            self.heap.push(Reverse(item));
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Retained items, largest first
    pub fn into_sorted_desc(self) -> Vec<TopItem> {
        // Ascending order of Reverse is descending order of the items
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|Reverse(item)| item)
            .collect()
    }
}
