//! Circular singly-linked lists of frames, threaded through the `next`
//! field of the frame table entries.
//!
//! A ring is named by its tail. The head, i.e. the oldest member, is
//! `entries[tail].next`. An empty ring has no tail.

use crate::{memory::FrameTableEntry, paging::Pfn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ring {
    tail: Option<Pfn>,
}

impl Ring {
    pub fn empty() -> Self {
        Self { tail: None }
    }

    /// Links every entry into one ring in index order, so that frame 0 is
    /// the head and the last frame is the tail.
    pub fn full(entries: &mut [FrameTableEntry]) -> Self {
        let count = entries.len();
        if count == 0 {
            return Self::empty();
        }
        for (idx, entry) in entries.iter_mut().enumerate() {
            entry.next = Pfn((idx + 1) % count);
        }
        Self {
            tail: Some(Pfn(count - 1)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tail.is_none()
    }

    pub fn tail(&self) -> Option<Pfn> {
        self.tail
    }

    pub fn head(&self, entries: &[FrameTableEntry]) -> Option<Pfn> {
        self.tail.map(|tail| entries[tail.0].next)
    }

    /// Unlinks the head and returns it.
    pub fn pop_head(&mut self, entries: &mut [FrameTableEntry]) -> Option<Pfn> {
        let tail = self.tail?;
        let head = entries[tail.0].next;
        if head == tail {
            self.tail = None;
        } else {
            entries[tail.0].next = entries[head.0].next;
        }
        Some(head)
    }

    /// Links `pfn` after the current tail and makes it the new tail.
    pub fn push_tail(&mut self, entries: &mut [FrameTableEntry], pfn: Pfn) {
        match self.tail {
            None => entries[pfn.0].next = pfn,
            Some(tail) => {
                entries[pfn.0].next = entries[tail.0].next;
                entries[tail.0].next = pfn;
            }
        }
        self.tail = Some(pfn);
    }

    /// Moves the anchor onto `pfn`, which must already be in this ring.
    /// Advancing onto the head turns the old head into the tail, so the walk
    /// order rotates by one without relinking anything.
    pub fn advance_to(&mut self, pfn: Pfn) {
        debug_assert!(self.tail.is_some());
        self.tail = Some(pfn);
    }

    /// Walks the ring from head to tail. Stops after `entries.len()` steps
    /// even if the links never return to the tail.
    pub fn iter<'a>(&self, entries: &'a [FrameTableEntry]) -> RingIter<'a> {
        RingIter {
            entries,
            next: self.head(entries),
            tail: self.tail,
            remaining: entries.len(),
        }
    }

    pub fn len(&self, entries: &[FrameTableEntry]) -> usize {
        self.iter(entries).count()
    }
}

pub struct RingIter<'a> {
    entries: &'a [FrameTableEntry],
    next: Option<Pfn>,
    tail: Option<Pfn>,
    remaining: usize,
}

impl Iterator for RingIter<'_> {
    type Item = Pfn;

    fn next(&mut self) -> Option<Pfn> {
        if self.remaining == 0 {
            return None;
        }
        let current = self.next?;
        self.remaining -= 1;
        self.next = if Some(current) == self.tail {
            None
        } else {
            Some(self.entries[current.0].next)
        };
        Some(current)
    }
}
