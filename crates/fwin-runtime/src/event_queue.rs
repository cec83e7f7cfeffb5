#![forbid(unsafe_code)]

//! Per-input-stream queue of pending semantic events.
//!
//! A circular doubly linked list over an index arena. `root` is the oldest
//! entry; its `prev` is the newest. Freed nodes are chained through `next`
//! on a free list and reused before the arena grows.
//!
//! The queue is bounded: pushing onto a full queue drops the oldest entry
//! and always accepts the new one.

use fwin_core::event::Event;

const NIL: usize = usize::MAX;

#[derive(Debug, Clone)]
struct Node {
    event: Option<Event>,
    prev: usize,
    next: usize,
}

/// Bounded FIFO of events with node recycling.
#[derive(Debug, Clone)]
pub struct EventQueue {
    nodes: Vec<Node>,
    root: usize,
    free: usize,
    len: usize,
    capacity: usize,
}

impl EventQueue {
    /// Create a queue holding at most `capacity` events (minimum 1).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            nodes: Vec::new(),
            root: NIL,
            free: NIL,
            len: 0,
            capacity: capacity.max(1),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root == NIL
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Arena slots allocated so far, live or free.
    pub fn allocated(&self) -> usize {
        self.nodes.len()
    }

    fn alloc(&mut self, event: Event) -> usize {
        if self.free != NIL {
            let idx = self.free;
            self.free = self.nodes[idx].next;
            self.nodes[idx] = Node {
                event: Some(event),
                prev: idx,
                next: idx,
            };
            idx
        } else {
            let idx = self.nodes.len();
            self.nodes.push(Node {
                event: Some(event),
                prev: idx,
                next: idx,
            });
            idx
        }
    }

    fn release(&mut self, idx: usize) -> Option<Event> {
        let node = &mut self.nodes[idx];
        let event = node.event.take();
        node.prev = NIL;
        node.next = self.free;
        self.free = idx;
        event
    }

    fn unlink(&mut self, idx: usize) -> Option<Event> {
        let (prev, next) = (self.nodes[idx].prev, self.nodes[idx].next);
        if next == idx {
            self.root = NIL;
        } else {
            self.nodes[prev].next = next;
            self.nodes[next].prev = prev;
            if self.root == idx {
                self.root = next;
            }
        }
        self.len -= 1;
        self.release(idx)
    }

    /// Append `event`. Returns the entry dropped to make room, if any.
    pub fn push(&mut self, event: Event) -> Option<Event> {
        let dropped = if self.len >= self.capacity {
            let dropped = self.pop();
            tracing::warn!(capacity = self.capacity, "event queue full, dropping oldest");
            dropped
        } else {
            None
        };
        let idx = self.alloc(event);
        if self.root == NIL {
            self.root = idx;
        } else {
            let tail = self.nodes[self.root].prev;
            self.nodes[idx].prev = tail;
            self.nodes[idx].next = self.root;
            self.nodes[tail].next = idx;
            self.nodes[self.root].prev = idx;
        }
        self.len += 1;
        dropped
    }

    /// Detach and return the oldest entry.
    pub fn pop(&mut self) -> Option<Event> {
        if self.root == NIL {
            None
        } else {
            self.unlink(self.root)
        }
    }

    /// Oldest entry without removing it.
    pub fn peek(&self) -> Option<&Event> {
        (self.root != NIL)
            .then(|| self.nodes[self.root].event.as_ref())
            .flatten()
    }

    /// Iterate oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &Event> + '_ {
        let mut idx = self.root;
        let mut remaining = self.len;
        std::iter::from_fn(move || {
            if remaining == 0 {
                return None;
            }
            let node = &self.nodes[idx];
            idx = node.next;
            remaining -= 1;
            node.event.as_ref()
        })
    }

    /// Drop every entry for which `keep` is false, preserving order.
    pub fn retain(&mut self, mut keep: impl FnMut(&Event) -> bool) {
        let mut idx = self.root;
        for _ in 0..self.len {
            let next = self.nodes[idx].next;
            let keep_it = self.nodes[idx].event.as_ref().is_some_and(&mut keep);
            if !keep_it {
                self.unlink(idx);
            }
            idx = next;
        }
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        while self.pop().is_some() {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fwin_core::event::EventKind;
    use fwin_core::handle::WindowId;
    use proptest::prelude::*;
    use std::collections::VecDeque;

    fn ev(window: u32, ch: char) -> Event {
        Event::new(WindowId(window), EventKind::Char(ch))
    }

    #[test]
    fn empty_queue() {
        let mut q = EventQueue::new(4);
        assert!(q.is_empty());
        assert_eq!(q.pop(), None);
        assert_eq!(q.peek(), None);
    }

    #[test]
    fn fifo_across_windows() {
        let mut q = EventQueue::new(8);
        q.push(ev(1, 'a'));
        q.push(ev(2, 'b'));
        q.push(ev(1, 'c'));
        assert_eq!(q.pop(), Some(ev(1, 'a')));
        assert_eq!(q.pop(), Some(ev(2, 'b')));
        assert_eq!(q.pop(), Some(ev(1, 'c')));
        assert!(q.is_empty());
    }

    #[test]
    fn full_queue_drops_oldest_and_accepts_new() {
        let mut q = EventQueue::new(2);
        q.push(ev(1, 'a'));
        q.push(ev(1, 'b'));
        assert_eq!(q.push(ev(1, 'c')), Some(ev(1, 'a')));
        assert_eq!(q.len(), 2);
        assert_eq!(q.iter().cloned().collect::<Vec<_>>(), vec![ev(1, 'b'), ev(1, 'c')]);
    }

    #[test]
    fn nodes_are_recycled() {
        let mut q = EventQueue::new(16);
        for _ in 0..100 {
            q.push(ev(1, 'x'));
            q.push(ev(1, 'y'));
            q.pop();
            q.pop();
        }
        assert_eq!(q.allocated(), 2);
    }

    #[test]
    fn retain_filters_in_place() {
        let mut q = EventQueue::new(8);
        for (w, c) in [(1, 'a'), (2, 'b'), (1, 'c'), (2, 'd')] {
            q.push(ev(w, c));
        }
        q.retain(|e| e.window != WindowId(2));
        assert_eq!(q.iter().cloned().collect::<Vec<_>>(), vec![ev(1, 'a'), ev(1, 'c')]);
        q.push(ev(3, 'e'));
        assert_eq!(q.pop(), Some(ev(1, 'a')));
        assert_eq!(q.len(), 2);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Push(u32, char),
        Pop,
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => (1u32..4, proptest::char::range('a', 'z')).prop_map(|(w, c)| Op::Push(w, c)),
            2 => Just(Op::Pop),
        ]
    }

    proptest! {
        #[test]
        fn matches_bounded_deque_model(
            cap in 1usize..8,
            ops in proptest::collection::vec(op_strategy(), 0..200),
        ) {
            let mut q = EventQueue::new(cap);
            let mut model: VecDeque<Event> = VecDeque::new();
            for op in ops {
                match op {
                    Op::Push(w, c) => {
                        let expected_drop = if model.len() == cap { model.pop_front() } else { None };
                        model.push_back(ev(w, c));
                        prop_assert_eq!(q.push(ev(w, c)), expected_drop);
                    }
                    Op::Pop => prop_assert_eq!(q.pop(), model.pop_front()),
                }
                prop_assert_eq!(q.len(), model.len());
                prop_assert!(q.allocated() <= cap);
            }
            prop_assert_eq!(q.iter().cloned().collect::<Vec<_>>(), model.into_iter().collect::<Vec<_>>());
        }
    }
}
