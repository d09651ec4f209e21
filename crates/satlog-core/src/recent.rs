//! Fixed-capacity, sorted buffer of the most recent items.

use std::cmp::Reverse;

use chrono::{DateTime, Utc};

/// Ordering key: newest timestamp first, then file order, then line order.
///
/// Unknown timestamps sort after every known one, so they only survive in a
/// buffer that has room to spare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RecencyKey {
    timestamp: Reverse<Option<DateTime<Utc>>>,
    file_index: usize,
    line_number: u64,
}

impl RecencyKey {
    pub const fn new(timestamp: Option<DateTime<Utc>>, file_index: usize, line_number: u64) -> Self {
        Self {
            timestamp: Reverse(timestamp),
            file_index,
            line_number,
        }
    }
}

/// Keeps the `capacity` smallest-keyed items, sorted by key.
///
/// Inserts are a binary search plus a shift, so the full set is never
/// re-sorted.
#[derive(Debug, Clone)]
pub struct RecentBuffer<T> {
    capacity: usize,
    items: Vec<(RecencyKey, T)>,
}

impl<T> RecentBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            items: Vec::with_capacity(capacity),
        }
    }

    /// Offers an item; it is kept only if it ranks within capacity.
    pub fn push(&mut self, key: RecencyKey, item: T) {
        if self.items.len() >= self.capacity
            && self.items.last().is_none_or(|(last, _)| key >= *last)
        {
            return;
        }

        let pos = self.items.partition_point(|(k, _)| *k <= key);
        self.items.insert(pos, (key, item));
        self.items.truncate(self.capacity);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items from most to least recent.
    pub fn into_vec(self) -> Vec<T> {
        self.items.into_iter().map(|(_, item)| item).collect()
    }
}
