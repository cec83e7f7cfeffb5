#![forbid(unsafe_code)]

//! Bounded queue of native notifications between the display pump and the
//! application thread.
//!
//! Coalescing happens here, at the native boundary:
//!
//! - a `Paint` merges into the most recent pending `Paint` for the same
//!   window, taking the union of the two rectangles;
//! - a `Resized` replaces the size of the most recent pending `Resized` for
//!   the same window.
//!
//! Anything else is appended; a full queue drops its oldest entry first.

use std::collections::VecDeque;

use fwin_backend::NativeMsg;

/// What [`NativeQueue::push`] did with a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    Queued,
    /// Merged into a pending paint.
    Merged,
    /// Replaced a pending resize.
    Replaced,
    /// Queued after dropping the oldest entry.
    DroppedOldest,
}

/// Bounded, coalescing queue of native messages.
#[derive(Debug)]
pub struct NativeQueue {
    ring: VecDeque<NativeMsg>,
    capacity: usize,
}

impl NativeQueue {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            ring: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.ring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    pub fn push(&mut self, msg: NativeMsg) -> PushOutcome {
        match msg {
            NativeMsg::Paint { window, rect } => {
                let pending = self.ring.iter_mut().rev().find_map(|m| match m {
                    NativeMsg::Paint { window: w, rect: r } if *w == window => Some(r),
                    _ => None,
                });
                if let Some(r) = pending {
                    *r = r.union(&rect);
                    return PushOutcome::Merged;
                }
            }
            NativeMsg::Resized {
                window,
                width,
                height,
            } => {
                let pending = self.ring.iter_mut().rev().find_map(|m| match m {
                    NativeMsg::Resized {
                        window: w,
                        width: pw,
                        height: ph,
                    } if *w == window => Some((pw, ph)),
                    _ => None,
                });
                if let Some((pw, ph)) = pending {
                    *pw = width;
                    *ph = height;
                    return PushOutcome::Replaced;
                }
            }
            _ => {}
        }
        let outcome = if self.ring.len() >= self.capacity {
            let dropped = self.ring.pop_front();
            tracing::warn!(?dropped, "native queue full, dropping oldest");
            PushOutcome::DroppedOldest
        } else {
            PushOutcome::Queued
        };
        self.ring.push_back(msg);
        outcome
    }

    pub fn pop(&mut self) -> Option<NativeMsg> {
        self.ring.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fwin_core::geometry::Rect;
    use fwin_core::handle::NativeHandle;

    const A: NativeHandle = NativeHandle(1);
    const B: NativeHandle = NativeHandle(2);

    fn paint(window: NativeHandle, x: i32, y: i32, w: i32, h: i32) -> NativeMsg {
        NativeMsg::Paint {
            window,
            rect: Rect::new(x, y, w, h),
        }
    }

    fn resized(window: NativeHandle, width: i32, height: i32) -> NativeMsg {
        NativeMsg::Resized {
            window,
            width,
            height,
        }
    }

    #[test]
    fn paints_for_same_window_union() {
        let mut q = NativeQueue::new(8);
        assert_eq!(q.push(paint(A, 0, 0, 10, 10)), PushOutcome::Queued);
        assert_eq!(q.push(paint(A, 20, 5, 5, 30)), PushOutcome::Merged);
        assert_eq!(q.push(paint(A, -5, 2, 1, 1)), PushOutcome::Merged);
        assert_eq!(q.len(), 1);
        assert_eq!(q.pop(), Some(paint(A, -5, 0, 30, 35)));
    }

    #[test]
    fn paints_for_other_windows_stay_separate() {
        let mut q = NativeQueue::new(8);
        q.push(paint(A, 0, 0, 1, 1));
        q.push(paint(B, 5, 5, 1, 1));
        assert_eq!(q.len(), 2);
    }

    #[test]
    fn resize_replaces_pending() {
        let mut q = NativeQueue::new(8);
        q.push(resized(A, 100, 100));
        q.push(NativeMsg::Focus {
            window: A,
            focused: true,
        });
        assert_eq!(q.push(resized(A, 300, 200)), PushOutcome::Replaced);
        assert_eq!(q.len(), 2);
        assert_eq!(q.pop(), Some(resized(A, 300, 200)));
    }

    #[test]
    fn resize_for_other_window_is_queued() {
        let mut q = NativeQueue::new(8);
        q.push(resized(A, 100, 100));
        assert_eq!(q.push(resized(B, 10, 10)), PushOutcome::Queued);
    }

    #[test]
    fn full_queue_drops_oldest() {
        let mut q = NativeQueue::new(2);
        q.push(NativeMsg::Char { window: A, ch: 'a' });
        q.push(NativeMsg::Char { window: A, ch: 'b' });
        assert_eq!(
            q.push(NativeMsg::Char { window: A, ch: 'c' }),
            PushOutcome::DroppedOldest
        );
        assert_eq!(q.pop(), Some(NativeMsg::Char { window: A, ch: 'b' }));
        assert_eq!(q.pop(), Some(NativeMsg::Char { window: A, ch: 'c' }));
    }

    #[test]
    fn merge_bypasses_capacity() {
        let mut q = NativeQueue::new(1);
        q.push(paint(A, 0, 0, 1, 1));
        assert_eq!(q.push(paint(A, 1, 1, 1, 1)), PushOutcome::Merged);
        assert_eq!(q.len(), 1);
    }
}
