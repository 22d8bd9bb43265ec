use alloc::collections::VecDeque;
use serde::{Deserialize, Serialize};

use crate::*;

/// Immutable record of everything undo brings back.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistorySnapshot {
    pub board: BoardSnapshot,
    pub score: u64,
    pub energy: u32,
    pub player_hp: u32,
    pub enemy_hp: u32,
}

/// Bounded snapshot stack, oldest entries are evicted first.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryBuffer {
    entries: VecDeque<HistorySnapshot>,
    capacity: usize,
}

impl HistoryBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn latest(&self) -> Option<&HistorySnapshot> {
        self.entries.back()
    }

    pub fn push(&mut self, snapshot: HistorySnapshot) {
        self.entries.push_back(snapshot);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// Needs the current state plus at least one earlier one.
    pub fn can_rewind(&self) -> bool {
        self.entries.len() >= 2
    }

    /// Drops the current entry and returns the one before it, which stays on the stack.
    pub fn rewind(&mut self) -> Option<&HistorySnapshot> {
        if !self.can_rewind() {
            return None;
        }
        self.entries.pop_back();
        self.entries.back()
    }
}
