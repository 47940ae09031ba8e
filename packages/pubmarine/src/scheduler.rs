//! Deferred invocation on a cooperative, single-threaded loop.
//!
//! The dispatcher never calls a handler inside `publish`. It hands each
//! invocation to a [`Scheduler`] as a [`Job`] and returns; the host's loop runs
//! the job on a later turn.
//!
//! ## Contract
//! - `run_soon` MUST NOT run the job synchronously.
//! - Fire-and-forget: nothing is returned and nothing is awaited.
//! - Execution order and cancellation belong to the scheduler.
//!
//! ## Implementations
//! - [`TaskQueue`]: a FIFO run-queue drained explicitly by the host
//!   (`run_pending` / `run_until_idle`). Suits hand-written loops and tests.
//! - [`LocalSpawner`]: posts each job to tokio's `spawn_local`; must be used
//!   from inside a [`tokio::task::LocalSet`].
//!
//! ```text
//! publish("tick") ──► run_soon(job A) ──► [ A ]
//!                 ──► run_soon(job B) ──► [ A, B ]
//! return
//! ...
//! loop turn ──► run_pending() ──► A(), B()
//! ```

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use tracing::trace;

/// A deferred unit of work.
pub type Job = Box<dyn FnOnce() + 'static>;

/// The host program's cooperative task scheduler.
pub trait Scheduler {
    /// Schedule `job` to run on a future turn of the loop.
    fn run_soon(&self, job: Job);

    /// Human-readable name (for logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl<S: Scheduler + ?Sized> Scheduler for Rc<S> {
    fn run_soon(&self, job: Job) {
        (**self).run_soon(job)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

// =============================================================================
// TaskQueue
// =============================================================================

/// Explicitly drained FIFO run-queue.
///
/// Cloning yields another handle to the same queue, so the dispatcher and the
/// host loop can share it.
///
/// # Example
///
/// ```
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use pubmarine::{Scheduler, TaskQueue};
///
/// let queue = TaskQueue::new();
/// let ran = Rc::new(Cell::new(false));
///
/// let flag = Rc::clone(&ran);
/// queue.run_soon(Box::new(move || flag.set(true)));
/// assert!(!ran.get());
///
/// assert_eq!(queue.run_pending(), 1);
/// assert!(ran.get());
/// ```
#[derive(Clone, Default)]
pub struct TaskQueue {
    jobs: Rc<RefCell<VecDeque<Job>>>,
}

impl TaskQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of jobs waiting to run.
    pub fn len(&self) -> usize {
        self.jobs.borrow().len()
    }

    /// True if no job is waiting.
    pub fn is_empty(&self) -> bool {
        self.jobs.borrow().is_empty()
    }

    /// Run one turn: every job queued before this call, in FIFO order.
    ///
    /// Jobs scheduled while the turn runs wait for the next turn. Returns the
    /// number of jobs that ran.
    pub fn run_pending(&self) -> usize {
        let batch = std::mem::take(&mut *self.jobs.borrow_mut());
        let ran = batch.len();
        for job in batch {
            job();
        }
        if ran > 0 {
            trace!(ran, "run queue turn complete");
        }
        ran
    }

    /// Run turns until the queue stays empty. Returns the total jobs run.
    pub fn run_until_idle(&self) -> usize {
        let mut total = 0;
        loop {
            let ran = self.run_pending();
            if ran == 0 {
                return total;
            }
            total += ran;
        }
    }

    /// Drop every pending job without running it. Returns how many were dropped.
    pub fn clear(&self) -> usize {
        let dropped = std::mem::take(&mut *self.jobs.borrow_mut());
        dropped.len()
    }
}

impl Scheduler for TaskQueue {
    fn run_soon(&self, job: Job) {
        self.jobs.borrow_mut().push_back(job);
    }

    fn name(&self) -> &'static str {
        "TaskQueue"
    }
}

impl fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskQueue")
            .field("pending", &self.len())
            .finish()
    }
}

// =============================================================================
// LocalSpawner
// =============================================================================

/// Schedules jobs as tokio local tasks.
///
/// # Panics
///
/// `run_soon` panics when called outside a [`tokio::task::LocalSet`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalSpawner;

impl LocalSpawner {
    /// Construct a new [`LocalSpawner`].
    pub fn new() -> Self {
        Self
    }
}

impl Scheduler for LocalSpawner {
    fn run_soon(&self, job: Job) {
        tokio::task::spawn_local(async move { job() });
    }

    fn name(&self) -> &'static str {
        "LocalSpawner"
    }
}
