//! Frame-synchronized interval scheduler.
//!
//! [`IntervalScheduler`] repeats a callback every `interval` milliseconds,
//! driven by a [`tempo_core::FrameSource`] rather than a wall-clock timer
//! service, and reports per-frame progress through the current period for
//! driving visual indicators.

mod interval;

pub use interval::IntervalScheduler;
