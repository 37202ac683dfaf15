//! Priority queue of partial pipelines awaiting expansion.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use synth_rules::Pipeline;

/// A queued pipeline with its priority `cost + estimate`.
#[derive(Debug)]
pub(crate) struct Entry {
    pub(crate) priority: f64,
    // insertion order, breaks priority ties first-in first-out
    pub(crate) seq: u64,
    pub(crate) pipeline: Pipeline,
}

/// Lowest priority first, then earliest inserted. `BinaryHeap` is a max-heap, so the
/// comparison is reversed.
impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

#[derive(Debug, Default)]
pub(crate) struct Frontier {
    heap: BinaryHeap<Entry>,
    next_seq: u64,
}

impl Frontier {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, priority: f64, pipeline: Pipeline) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Entry {
            priority,
            seq,
            pipeline,
        });
    }

    pub(crate) fn pop(&mut self) -> Option<Entry> {
        self.heap.pop()
    }

    pub(crate) fn len(&self) -> usize {
        self.heap.len()
    }
}
