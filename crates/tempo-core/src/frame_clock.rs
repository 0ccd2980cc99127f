use crate::frame_source::{FrameRequestId, FrameSource};
use std::rc::Rc;

/// Cheap cloneable handle over a [`FrameSource`].
#[derive(Clone)]
pub struct FrameClock {
    source: Rc<dyn FrameSource>,
}

impl FrameClock {
    pub fn new(source: Rc<dyn FrameSource>) -> Self {
        Self { source }
    }

    /// Schedules `callback` for the next frame, passing the frame timestamp
    /// in nanoseconds. Dropping the returned request cancels it.
    pub fn with_frame_nanos(&self, callback: impl FnOnce(u64) + 'static) -> FrameRequest {
        let id = self.source.request_frame(Box::new(callback));
        FrameRequest::new(Rc::clone(&self.source), id)
    }

    pub fn now_nanos(&self) -> u64 {
        self.source.now_nanos()
    }
}

/// Owns one outstanding frame request; releases it on `cancel` or drop.
pub struct FrameRequest {
    source: Rc<dyn FrameSource>,
    id: Option<FrameRequestId>,
}

impl FrameRequest {
    fn new(source: Rc<dyn FrameSource>, id: FrameRequestId) -> Self {
        Self {
            source,
            id: Some(id),
        }
    }

    pub fn cancel(mut self) {
        if let Some(id) = self.id.take() {
            self.source.cancel_frame(id);
        }
    }
}

impl Drop for FrameRequest {
    fn drop(&mut self) {
        if let Some(id) = self.id.take() {
            self.source.cancel_frame(id);
        }
    }
}
