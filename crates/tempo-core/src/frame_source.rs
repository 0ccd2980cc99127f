/// Identifier for a pending frame request.
pub type FrameRequestId = u64;

/// Callback invoked with the frame timestamp in nanoseconds.
pub type FrameCallback = Box<dyn FnOnce(u64) + 'static>;

/// Host-provided per-frame callback primitive.
///
/// A source invokes each registered callback at most once, on the next frame
/// after registration, passing the frame timestamp. Timestamps are
/// monotonically non-decreasing nanoseconds.
pub trait FrameSource {
    /// Registers `callback` to run on the next frame.
    fn request_frame(&self, callback: FrameCallback) -> FrameRequestId;

    /// Removes a pending request. A no-op when the callback already ran or
    /// the id is unknown.
    fn cancel_frame(&self, id: FrameRequestId);

    /// The source's current notion of time, in nanoseconds.
    ///
    /// Lets callers timestamp events between frames, outside any frame
    /// callback.
    fn now_nanos(&self) -> u64;
}
