//! Host-pumped frame queue.
//!
//! The embedding owns the real frame loop (vsync, a windowing redraw
//! request, or a test driver) and calls [`FrameQueue::run_frame`] once per
//! frame with the current timestamp. Everything registered before that pump
//! runs in registration order; callbacks registered while draining wait for
//! the next pump, which is what makes "request the next frame from inside a
//! frame callback" loop correctly.

use crate::frame_clock::FrameClock;
use crate::frame_source::{FrameCallback, FrameRequestId, FrameSource};
use smallvec::SmallVec;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::Arc;

/// Notifies the embedding that a frame pump is wanted.
pub trait FrameScheduler: Send + Sync {
    fn schedule_frame(&self);
}

/// No-op scheduler for embeddings that pump unconditionally.
#[derive(Default)]
pub struct DefaultScheduler;

impl FrameScheduler for DefaultScheduler {
    fn schedule_frame(&self) {}
}

struct FrameQueueEntry {
    id: FrameRequestId,
    callback: Option<FrameCallback>,
}

struct FrameQueueInner {
    callbacks: RefCell<VecDeque<FrameQueueEntry>>,
    next_id: Cell<FrameRequestId>,
    now_nanos: Cell<u64>,
    needs_frame: Cell<bool>,
    scheduler: Arc<dyn FrameScheduler>,
}

/// Host-pumped [`FrameSource`].
///
/// Doubles as the manual tick source in tests: drive it with synthetic
/// timestamps through [`run_frame`](FrameQueue::run_frame) and no display
/// loop is involved.
#[derive(Clone)]
pub struct FrameQueue {
    inner: Rc<FrameQueueInner>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::with_scheduler(Arc::new(DefaultScheduler))
    }

    pub fn with_scheduler(scheduler: Arc<dyn FrameScheduler>) -> Self {
        Self {
            inner: Rc::new(FrameQueueInner {
                callbacks: RefCell::new(VecDeque::new()),
                next_id: Cell::new(1),
                now_nanos: Cell::new(0),
                needs_frame: Cell::new(false),
                scheduler,
            }),
        }
    }

    /// A clock backed by this queue.
    pub fn clock(&self) -> FrameClock {
        FrameClock::new(Rc::new(self.clone()))
    }

    /// Runs one frame: advances the queue clock to `frame_time_nanos`, then
    /// invokes every callback registered before this pump, in order.
    pub fn run_frame(&self, frame_time_nanos: u64) {
        debug_assert!(
            frame_time_nanos >= self.inner.now_nanos.get(),
            "frame timestamps must be non-decreasing",
        );
        self.inner.now_nanos.set(frame_time_nanos);

        let mut pending: SmallVec<[FrameCallback; 8]> = SmallVec::new();
        {
            let mut callbacks = self.inner.callbacks.borrow_mut();
            while let Some(mut entry) = callbacks.pop_front() {
                if let Some(callback) = entry.callback.take() {
                    pending.push(callback);
                }
            }
        }
        log::trace!(
            "frame pump at {frame_time_nanos}ns, {} callback(s)",
            pending.len()
        );
        for callback in pending {
            callback(frame_time_nanos);
        }
        if self.inner.callbacks.borrow().is_empty() {
            self.inner.needs_frame.set(false);
        }
    }

    /// True while at least one request is outstanding.
    pub fn has_pending(&self) -> bool {
        !self.inner.callbacks.borrow().is_empty()
    }

    pub fn pending_frames(&self) -> usize {
        self.inner.callbacks.borrow().len()
    }

    /// True when a pump has been requested since the last idle drain.
    pub fn needs_frame(&self) -> bool {
        self.inner.needs_frame.get()
    }
}

impl Default for FrameQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSource for FrameQueue {
    fn request_frame(&self, callback: FrameCallback) -> FrameRequestId {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner
            .callbacks
            .borrow_mut()
            .push_back(FrameQueueEntry {
                id,
                callback: Some(callback),
            });
        self.inner.needs_frame.set(true);
        self.inner.scheduler.schedule_frame();
        id
    }

    fn cancel_frame(&self, id: FrameRequestId) {
        let mut callbacks = self.inner.callbacks.borrow_mut();
        if let Some(index) = callbacks.iter().position(|entry| entry.id == id) {
            callbacks.remove(index);
        }
        if callbacks.is_empty() {
            self.inner.needs_frame.set(false);
        }
    }

    fn now_nanos(&self) -> u64 {
        self.inner.now_nanos.get()
    }
}

#[cfg(test)]
#[path = "tests/frame_queue_tests.rs"]
mod tests;
