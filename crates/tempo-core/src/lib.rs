//! Frame scheduling substrate for Tempo.
//!
//! Everything here is driven by the host's per-frame callback primitive
//! (the `requestAnimationFrame` analog). [`FrameSource`] abstracts that
//! primitive; [`FrameQueue`] is the host-pumped implementation used both by
//! embeddings and, with synthetic timestamps, by tests.

pub mod frame_clock;
pub mod frame_queue;
pub mod frame_source;

pub use frame_clock::{FrameClock, FrameRequest};
pub use frame_queue::{DefaultScheduler, FrameQueue, FrameScheduler};
pub use frame_source::{FrameCallback, FrameRequestId, FrameSource};
