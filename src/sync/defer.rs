//! Deferred job execution at turn boundaries
//!
//! Scroll propagation raises a guard that must stay up for the rest of the
//! turn it was raised in and drop at the start of the next one. The
//! [`Deferrer`] trait abstracts "run this at the next turn of the event loop"
//! so the sync machinery stays independent of the UI loop, and so tests can
//! drive turn boundaries by hand.

use std::cell::RefCell;

/// A job scheduled to run at the next turn boundary.
pub type DeferredJob = Box<dyn FnOnce()>;

/// Schedules jobs to run at the next turn of the host event loop.
pub trait Deferrer {
    /// Queue a job. It must not run before the current turn finishes.
    fn defer(&self, job: DeferredJob);
}

// ─────────────────────────────────────────────────────────────────────────────
// Frame-based Deferrer
// ─────────────────────────────────────────────────────────────────────────────

/// [`Deferrer`] backed by a queue that the frame loop drains once per frame.
///
/// One egui frame counts as one turn. Jobs deferred while the queue is being
/// drained land in the following frame, never the current one.
pub struct FrameDeferrer {
    queue: RefCell<Vec<DeferredJob>>,
}

impl Default for FrameDeferrer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDeferrer {
    /// Create an empty deferrer.
    pub fn new() -> Self {
        Self {
            queue: RefCell::new(Vec::new()),
        }
    }

    /// Number of jobs waiting for the next turn.
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Drain and run every job queued before this call.
    ///
    /// Call once at the start of each frame. Returns the number of jobs run.
    /// The queue is swapped out before running, so a job that defers another
    /// job pushes it into the next turn rather than the current drain.
    pub fn run_pending(&self) -> usize {
        let jobs: Vec<DeferredJob> = self.queue.borrow_mut().drain(..).collect();
        let count = jobs.len();
        for job in jobs {
            job();
        }
        count
    }
}

impl Deferrer for FrameDeferrer {
    fn defer(&self, job: DeferredJob) {
        self.queue.borrow_mut().push(job);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_jobs_wait_for_run_pending() {
        let deferrer = FrameDeferrer::new();
        let fired = Rc::new(Cell::new(false));

        let flag = Rc::clone(&fired);
        deferrer.defer(Box::new(move || flag.set(true)));

        assert!(!fired.get());
        assert_eq!(deferrer.pending(), 1);

        assert_eq!(deferrer.run_pending(), 1);
        assert!(fired.get());
        assert_eq!(deferrer.pending(), 0);
    }

    #[test]
    fn test_run_pending_with_empty_queue() {
        let deferrer = FrameDeferrer::new();
        assert_eq!(deferrer.run_pending(), 0);
    }

    #[test]
    fn test_jobs_run_in_defer_order() {
        let deferrer = FrameDeferrer::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        for n in 0..3 {
            let order = Rc::clone(&order);
            deferrer.defer(Box::new(move || order.borrow_mut().push(n)));
        }

        deferrer.run_pending();
        assert_eq!(*order.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn test_job_deferred_during_drain_runs_next_turn() {
        let deferrer = Rc::new(FrameDeferrer::new());
        let order = Rc::new(RefCell::new(Vec::new()));

        let outer_deferrer = Rc::clone(&deferrer);
        let outer_order = Rc::clone(&order);
        deferrer.defer(Box::new(move || {
            outer_order.borrow_mut().push("first");
            let inner_order = Rc::clone(&outer_order);
            outer_deferrer.defer(Box::new(move || inner_order.borrow_mut().push("second")));
        }));

        assert_eq!(deferrer.run_pending(), 1);
        assert_eq!(*order.borrow(), vec!["first"]);
        assert_eq!(deferrer.pending(), 1);

        assert_eq!(deferrer.run_pending(), 1);
        assert_eq!(*order.borrow(), vec!["first", "second"]);
    }
}
