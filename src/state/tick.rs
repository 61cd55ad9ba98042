//! Tick Queue - Work deferred until the current synchronous work completes.
//!
//! The host drains one tick per event-loop turn with [`run_tick`], after it
//! has finished dispatching the current input event. A tick runs exactly the
//! tasks that were queued before it started; tasks deferred while it runs
//! wait for the next tick.
//!
//! ```ignore
//! loop {
//!     if let Ok(event) = crossterm::event::read() {
//!         input::route_event(event.into());
//!     }
//!     tick::run_tick();
//! }
//! ```

use std::cell::RefCell;
use std::collections::VecDeque;

type Task = Box<dyn FnOnce()>;

thread_local! {
    static QUEUE: RefCell<VecDeque<Task>> = RefCell::new(VecDeque::new());
}

/// Schedule `task` for the next tick.
pub fn defer(task: impl FnOnce() + 'static) {
    QUEUE.with(|queue| queue.borrow_mut().push_back(Box::new(task)));
}

/// Number of tasks waiting for a tick.
pub fn pending_tasks() -> usize {
    QUEUE.with(|queue| queue.borrow().len())
}

/// Run one tick. Returns the number of tasks that ran.
pub fn run_tick() -> usize {
    let batch: VecDeque<Task> = QUEUE.with(|queue| std::mem::take(&mut *queue.borrow_mut()));
    let count = batch.len();
    for task in batch {
        task();
    }
    count
}

/// Run ticks until nothing is pending. Returns the number of ticks run.
pub fn run_until_idle() -> usize {
    let mut ticks = 0;
    while pending_tasks() > 0 {
        run_tick();
        ticks += 1;
    }
    ticks
}

/// Drop all pending tasks (for testing)
pub fn reset_tick_queue() {
    QUEUE.with(|queue| queue.borrow_mut().clear());
}
