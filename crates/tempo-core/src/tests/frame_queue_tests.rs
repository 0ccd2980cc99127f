use super::*;

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[test]
fn callbacks_run_in_registration_order() {
    let queue = FrameQueue::new();
    let order = Rc::new(RefCell::new(Vec::new()));
    for tag in ["a", "b", "c"] {
        let order = Rc::clone(&order);
        queue.request_frame(Box::new(move |_| order.borrow_mut().push(tag)));
    }

    queue.run_frame(1);

    assert_eq!(order.borrow().as_slice(), &["a", "b", "c"]);
    assert!(!queue.has_pending());
    assert!(!queue.needs_frame());
}

#[test]
fn cancel_removes_a_pending_callback() {
    let queue = FrameQueue::new();
    let fired = Rc::new(Cell::new(false));
    let id = {
        let fired = Rc::clone(&fired);
        queue.request_frame(Box::new(move |_| fired.set(true)))
    };

    queue.cancel_frame(id);
    queue.run_frame(1);

    assert!(!fired.get());
    assert!(!queue.needs_frame());
}

#[test]
fn cancel_of_unknown_id_is_a_no_op() {
    let queue = FrameQueue::new();
    queue.cancel_frame(42);
    queue.run_frame(1);
}

#[test]
fn callback_registered_during_drain_waits_for_next_pump() {
    let queue = FrameQueue::new();
    let times = Rc::new(RefCell::new(Vec::new()));
    {
        let requeue = queue.clone();
        let times = Rc::clone(&times);
        queue.request_frame(Box::new(move |t| {
            times.borrow_mut().push(t);
            let times = Rc::clone(&times);
            requeue.request_frame(Box::new(move |t| times.borrow_mut().push(t)));
        }));
    }

    queue.run_frame(10);
    assert_eq!(times.borrow().as_slice(), &[10]);
    assert!(queue.has_pending());

    queue.run_frame(20);
    assert_eq!(times.borrow().as_slice(), &[10, 20]);
}

#[test]
fn scheduler_is_pinged_when_a_frame_is_requested() {
    struct CountingScheduler(AtomicUsize);

    impl FrameScheduler for CountingScheduler {
        fn schedule_frame(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    let scheduler = Arc::new(CountingScheduler(AtomicUsize::new(0)));
    let queue = FrameQueue::with_scheduler(scheduler.clone());

    queue.request_frame(Box::new(|_| {}));

    assert_eq!(scheduler.0.load(Ordering::SeqCst), 1);
    assert!(queue.needs_frame());
}

#[test]
fn clock_reports_last_pump_time() {
    let queue = FrameQueue::new();
    assert_eq!(queue.now_nanos(), 0);

    queue.run_frame(5_000_000);
    assert_eq!(queue.now_nanos(), 5_000_000);
    assert_eq!(queue.clock().now_nanos(), 5_000_000);
}

#[test]
fn dropping_a_frame_request_cancels_it() {
    let queue = FrameQueue::new();
    let clock = queue.clock();
    let fired = Rc::new(Cell::new(false));
    let request = {
        let fired = Rc::clone(&fired);
        clock.with_frame_nanos(move |_| fired.set(true))
    };

    drop(request);
    queue.run_frame(1);

    assert!(!fired.get());
}

#[test]
fn explicit_cancel_of_a_frame_request() {
    let queue = FrameQueue::new();
    let clock = queue.clock();
    let fired = Rc::new(Cell::new(false));
    let request = {
        let fired = Rc::clone(&fired);
        clock.with_frame_nanos(move |_| fired.set(true))
    };

    request.cancel();
    queue.run_frame(1);

    assert!(!fired.get());
    assert_eq!(queue.pending_frames(), 0);
}
