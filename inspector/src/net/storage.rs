use std::collections::VecDeque;

/// Bounded FIFO store. Pushing into a full store drops the oldest item.
pub struct FrameStorage<T> {
    vec: VecDeque<T>,
    capacity: usize,
}

impl<T: Clone> FrameStorage<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            vec: VecDeque::with_capacity(capacity.min(INITIAL_ALLOCATION_LIMIT)),
            capacity,
        }
    }

    pub fn add(&mut self, item: T) {
        self.vec.push_back(item);
        while self.vec.len() > self.capacity {
            self.vec.pop_front();
        }
    }

    pub fn amount(&self) -> usize {
        self.vec.len()
    }

    pub fn clear(&mut self) {
        self.vec.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.vec.is_empty()
    }

    /// Copy in insertion order, independent from later additions.
    pub fn snapshot(&self) -> Vec<T> {
        self.vec.iter().cloned().collect()
    }

    pub fn last(&self) -> Option<&T> {
        self.vec.back()
    }
}

// History can be configured large; memory is taken as frames arrive
const INITIAL_ALLOCATION_LIMIT: usize = 4096;
