use std::cell::RefCell;
use std::rc::Rc;

use tempo_core::{FrameClock, FrameRequest};

/// Fixed update cadence for the catch-up loop, independent of both the
/// display refresh rate and the configured interval length.
const TARGET_UPDATES_PER_SECOND: u64 = 60;
const FRAME_BUDGET_NANOS: u64 = 1_000_000_000 / TARGET_UPDATES_PER_SECOND;

const NANOS_PER_MILLI: u64 = 1_000_000;

type IntervalCallback = Rc<RefCell<dyn FnMut()>>;
type UpdateCallback = Rc<RefCell<dyn FnMut(f32)>>;

/// Repeats a callback at a configurable interval, driven by the host's
/// per-frame callback primitive instead of a timer service.
///
/// Two timing models are layered together. A fixed-timestep accumulator
/// decides *when* the update step runs: elapsed frame time is summed and the
/// step is invoked once per consumed budget, several times after a stall,
/// zero times when a frame arrives early. The update step itself measures
/// wall-clock progress through the current period against `interval` to
/// decide *whether* to fire, reporting the progress fraction in [0, 1] along
/// the way.
///
/// The scheduler is a cheap cloneable handle over shared state. Everything
/// runs on the single call stack of the frame callback, so every operation
/// is safe to call from inside the scheduler's own callbacks.
pub struct IntervalScheduler {
    inner: Rc<RefCell<IntervalInner>>,
}

struct IntervalInner {
    clock: FrameClock,
    interval_nanos: u64,
    on_interval: IntervalCallback,
    on_update: Option<UpdateCallback>,
    limit: Option<u32>,
    /// Start of the current period. Reset on `start`, `rewind` and every
    /// fire.
    period_start_nanos: u64,
    /// Fraction of the current period elapsed, clamped to [0, 1].
    rate: f32,
    fired_count: u32,
    paused: bool,
    /// True while a frame-request loop is active. Distinct from `paused`:
    /// the loop keeps ticking while logically paused so resuming is instant.
    running: bool,
    frame_request: Option<FrameRequest>,
    last_frame_nanos: u64,
    accumulated_nanos: u64,
}

impl IntervalScheduler {
    /// Creates a scheduler that fires `on_interval` every `interval_millis`.
    ///
    /// A zero interval is legal and means "fire on every update step".
    pub fn new(
        interval_millis: u64,
        clock: FrameClock,
        on_interval: impl FnMut() + 'static,
    ) -> Self {
        Self {
            inner: Rc::new(RefCell::new(IntervalInner {
                clock,
                interval_nanos: interval_millis * NANOS_PER_MILLI,
                on_interval: Rc::new(RefCell::new(on_interval)),
                on_update: None,
                limit: None,
                period_start_nanos: 0,
                rate: 0.0,
                fired_count: 0,
                paused: true,
                running: false,
                frame_request: None,
                last_frame_nanos: 0,
                accumulated_nanos: 0,
            })),
        }
    }

    /// Reports the progress rate to `on_update` on every update step.
    pub fn with_on_update(self, on_update: impl FnMut(f32) + 'static) -> Self {
        let on_update: UpdateCallback = Rc::new(RefCell::new(on_update));
        self.inner.borrow_mut().on_update = Some(on_update);
        self
    }

    /// Pauses the scheduler once it has fired `limit` times. Zero means no
    /// limit.
    pub fn with_limit(self, limit: u32) -> Self {
        self.inner.borrow_mut().limit = (limit > 0).then_some(limit);
        self
    }

    /// Starts the interval, or resumes it when `resume` is true.
    ///
    /// Resuming keeps the fraction of the period already elapsed, so a
    /// `pause()` / `start(true)` pair continues where it left off. A plain
    /// `start(false)` cancels first and begins a fresh period; the fired
    /// count is not reset (see [`cancel`](Self::cancel)). Idempotent while
    /// the frame loop is already running.
    pub fn start(&self, resume: bool) {
        if !resume {
            self.cancel();
        }
        {
            let mut inner = self.inner.borrow_mut();
            let now = inner.clock.now_nanos();
            let resume_offset = if resume {
                (inner.rate as f64 * inner.interval_nanos as f64) as u64
            } else {
                0
            };
            inner.period_start_nanos = now.saturating_sub(resume_offset);
            inner.paused = false;
        }
        Self::spin_up(&self.inner);
    }

    /// Suspends firing. The frame loop keeps ticking so `start(true)` can
    /// resume without re-acquiring a frame request.
    pub fn pause(&self) {
        self.inner.borrow_mut().paused = true;
    }

    /// Resets progress to the start of the period and notifies `on_update`
    /// with 0. Leaves the paused and running flags and the fired count
    /// alone.
    pub fn rewind(&self) {
        let on_update = {
            let mut inner = self.inner.borrow_mut();
            inner.period_start_nanos = inner.clock.now_nanos();
            inner.rate = 0.0;
            inner.on_update.clone()
        };
        if let Some(on_update) = on_update {
            (on_update.borrow_mut())(0.0);
        }
    }

    /// Stops firing and releases the pending frame request. No further
    /// frames are requested until the next `start`. The fired count and the
    /// step accumulator survive; a later `start` reuses them.
    pub fn cancel(&self) {
        let request = {
            let mut inner = self.inner.borrow_mut();
            inner.rate = 0.0;
            inner.paused = true;
            inner.running = false;
            inner.frame_request.take()
        };
        if let Some(request) = request {
            request.cancel();
            log::debug!("interval loop cancelled");
        }
    }

    /// Changes the period length in place. The in-flight period's rate is
    /// recomputed against the new duration on the next update step, so a
    /// visible discontinuity is expected.
    pub fn set_interval(&self, interval_millis: u64) {
        self.inner.borrow_mut().interval_nanos = interval_millis * NANOS_PER_MILLI;
    }

    pub fn is_paused(&self) -> bool {
        self.inner.borrow().paused
    }

    /// Last computed fraction of the current period, in [0, 1].
    pub fn progress(&self) -> f32 {
        self.inner.borrow().rate
    }

    /// Completed periods since construction.
    pub fn fired_count(&self) -> u32 {
        self.inner.borrow().fired_count
    }

    /// Begins the fixed-timestep frame loop. Returns early when a loop is
    /// already active, so at most one frame request is outstanding.
    fn spin_up(this: &Rc<RefCell<IntervalInner>>) {
        {
            let mut inner = this.borrow_mut();
            if inner.running {
                return;
            }
            inner.running = true;
            inner.last_frame_nanos = inner.clock.now_nanos();
            log::debug!("interval loop starting");
        }
        Self::request_frame(this);
    }

    fn request_frame(this: &Rc<RefCell<IntervalInner>>) {
        let clock = {
            let inner = this.borrow();
            if inner.frame_request.is_some() {
                return;
            }
            inner.clock.clone()
        };
        let weak = Rc::downgrade(this);
        let request = clock.with_frame_nanos(move |frame_time_nanos| {
            if let Some(strong) = weak.upgrade() {
                Self::on_frame(&strong, frame_time_nanos);
            }
        });
        this.borrow_mut().frame_request = Some(request);
    }

    fn on_frame(this: &Rc<RefCell<IntervalInner>>, frame_time_nanos: u64) {
        let steps = {
            let mut inner = this.borrow_mut();
            inner.frame_request = None;
            if !inner.running {
                return;
            }
            let delta = frame_time_nanos.saturating_sub(inner.last_frame_nanos);
            inner.last_frame_nanos = frame_time_nanos;
            inner.accumulated_nanos += delta;
            let steps = inner.accumulated_nanos / FRAME_BUDGET_NANOS;
            inner.accumulated_nanos -= steps * FRAME_BUDGET_NANOS;
            steps
        };

        // Catch-up run: zero steps when the frame arrived early, several
        // after a stall. A callback may cancel mid-run, which clears
        // `running` and ends the loop.
        for _ in 0..steps {
            if !this.borrow().running {
                break;
            }
            Self::update(this);
        }

        // `request_frame` is a no-op if a callback already re-started the
        // loop and holds a request.
        if this.borrow().running {
            Self::request_frame(this);
        }
    }

    /// The update step. Progress is measured against wall-clock time, not
    /// against the accumulator that schedules these invocations.
    fn update(this: &Rc<RefCell<IntervalInner>>) {
        let (rate, on_update, on_interval) = {
            let mut inner = this.borrow_mut();
            if inner.paused {
                return;
            }
            let rate = if inner.interval_nanos > 0 {
                let elapsed = inner
                    .clock
                    .now_nanos()
                    .saturating_sub(inner.period_start_nanos);
                (elapsed as f64 / inner.interval_nanos as f64).min(1.0) as f32
            } else {
                1.0
            };
            inner.rate = rate;
            (rate, inner.on_update.clone(), Rc::clone(&inner.on_interval))
        };

        if let Some(on_update) = on_update {
            (on_update.borrow_mut())(rate);
        }

        if rate >= 1.0 {
            (on_interval.borrow_mut())();
            let mut inner = this.borrow_mut();
            inner.period_start_nanos = inner.clock.now_nanos();
            inner.fired_count += 1;
            if let Some(limit) = inner.limit {
                if inner.fired_count >= limit {
                    inner.paused = true;
                    log::debug!("fire limit {limit} reached, pausing");
                }
            }
        }
    }
}

impl Clone for IntervalScheduler {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

#[cfg(test)]
#[path = "tests/interval_tests.rs"]
mod tests;
