//! Pending-operation registry with deadlines.
//!
//! The registry is the sole owner of every outstanding request. Callers hold
//! only the task id (embedded in the outbound envelope) and the read side of
//! a oneshot completion sink. Replies may arrive on any I/O thread; all
//! mutation happens under one per-registry lock, and completion sinks are
//! always fulfilled after the lock is released.
//!
//! A single sweeper task owns deadline expiry: any operation whose deadline
//! has passed is force-completed within one sweep interval, through the
//! tally's most-frequent-error fallback when failure replies arrived and as
//! a timeout otherwise.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use haven_types::TaskId;
use haven_wire::replies::ReplyContents;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::tally::ResponseTally;

/// Terminal state of a pending operation.
#[derive(Debug)]
pub enum Completion<R> {
    /// The tally chose this reply (quorum success or most-frequent error).
    Replied(R),
    /// The deadline fired with no reply to fall back on.
    TimedOut,
    /// The operation was cancelled locally.
    Cancelled,
}

/// The read side of an operation's completion sink.
pub type ResponseFuture<R> = oneshot::Receiver<Completion<R>>;

struct PendingOp<R> {
    deadline: Instant,
    expected_count: usize,
    tally: ResponseTally<R>,
    sink: oneshot::Sender<Completion<R>>,
}

struct Inner<R> {
    tasks: HashMap<TaskId, PendingOp<R>>,
    next_id: TaskId,
}

/// Registry of outstanding requests for one reply family.
///
/// Cheap to clone; all clones share the task map and the sweeper. Must be
/// created within a tokio runtime (the sweeper is a spawned task that stops
/// when the last clone is dropped).
pub struct Registry<R> {
    inner: Arc<Mutex<Inner<R>>>,
    _sweeper: Arc<Sweeper>,
}

impl<R> Clone for Registry<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            _sweeper: Arc::clone(&self._sweeper),
        }
    }
}

struct Sweeper(JoinHandle<()>);

impl Drop for Sweeper {
    fn drop(&mut self) {
        self.0.abort();
    }
}

impl<R: ReplyContents + Send + 'static> Registry<R> {
    /// Create a registry whose sweeper fires every `sweep_interval`.
    pub fn new(sweep_interval: Duration) -> Self {
        let inner = Arc::new(Mutex::new(Inner {
            tasks: HashMap::new(),
            next_id: 0,
        }));
        let handle = tokio::spawn(sweep_loop(Arc::downgrade(&inner), sweep_interval));
        Self {
            inner,
            _sweeper: Arc::new(Sweeper(handle)),
        }
    }

    /// Register a pending operation.
    ///
    /// Allocates a task id that is free among live entries, arms the deadline
    /// at `now + timeout`, and returns the id for embedding in the outbound
    /// envelope together with the completion future.
    pub fn add_task(
        &self,
        timeout: Duration,
        successes_required: usize,
        expected_count: usize,
    ) -> (TaskId, ResponseFuture<R>) {
        debug_assert!(successes_required >= 1);
        debug_assert!(successes_required <= expected_count);
        let expected_count = expected_count.max(successes_required).max(1);

        let (sink, future) = oneshot::channel();
        let op = PendingOp {
            deadline: Instant::now() + timeout,
            expected_count,
            tally: ResponseTally::new(successes_required),
            sink,
        };

        let task_id = {
            let mut inner = lock(&self.inner);
            let mut id = inner.next_id;
            while inner.tasks.contains_key(&id) {
                id = id.wrapping_add(1);
            }
            inner.next_id = id.wrapping_add(1);
            inner.tasks.insert(id, op);
            id
        };
        trace!(task_id, expected_count, "task registered");
        (task_id, future)
    }

    /// Feed an inbound reply to its pending operation.
    ///
    /// Unknown task ids (late or duplicate replies for a completed
    /// operation) are dropped silently.
    pub fn add_response(&self, task_id: TaskId, reply: R) {
        let fired = {
            let mut inner = lock(&self.inner);
            let Some(op) = inner.tasks.get_mut(&task_id) else {
                trace!(task_id, "reply for unknown task dropped");
                return;
            };
            if let Some(chosen) = op.tally.append(reply) {
                inner
                    .tasks
                    .remove(&task_id)
                    .map(|op| (op.sink, Completion::Replied(chosen)))
            } else if op.tally.received() >= op.expected_count {
                inner
                    .tasks
                    .remove(&task_id)
                    .map(|op| (op.sink, fallback_completion(op.tally)))
            } else {
                None
            }
        };
        if let Some((sink, completion)) = fired {
            debug!(task_id, "task completed");
            let _ = sink.send(completion);
        }
    }

    /// Cancel a pending operation, completing it with `Cancelled`.
    ///
    /// Returns false if the task was not live.
    pub fn cancel_task(&self, task_id: TaskId) -> bool {
        let removed = {
            let mut inner = lock(&self.inner);
            inner.tasks.remove(&task_id)
        };
        match removed {
            Some(op) => {
                debug!(task_id, "task cancelled");
                let _ = op.sink.send(Completion::Cancelled);
                true
            }
            None => false,
        }
    }

    /// Number of live tasks.
    pub fn len(&self) -> usize {
        lock(&self.inner).tasks.len()
    }

    /// Whether no tasks are outstanding.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn fallback_completion<R: ReplyContents>(tally: ResponseTally<R>) -> Completion<R> {
    match tally.into_most_frequent_error() {
        Some(reply) => Completion::Replied(reply),
        None => Completion::TimedOut,
    }
}

fn lock<R>(inner: &Arc<Mutex<Inner<R>>>) -> MutexGuard<'_, Inner<R>> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn sweep_loop<R: ReplyContents>(inner: Weak<Mutex<Inner<R>>>, sweep_interval: Duration) {
    let mut tick = tokio::time::interval(sweep_interval);
    tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        tick.tick().await;
        let Some(inner) = inner.upgrade() else {
            break;
        };
        let now = Instant::now();
        let fired = {
            let mut inner = inner.lock().unwrap_or_else(PoisonError::into_inner);
            let expired: Vec<TaskId> = inner
                .tasks
                .iter()
                .filter(|(_, op)| op.deadline <= now)
                .map(|(id, _)| *id)
                .collect();
            expired
                .into_iter()
                .filter_map(|id| {
                    inner
                        .tasks
                        .remove(&id)
                        .map(|op| (id, op.sink, fallback_completion(op.tally)))
                })
                .collect::<Vec<_>>()
        };
        for (task_id, sink, completion) in fired {
            debug!(task_id, "task deadline fired");
            let _ = sink.send(completion);
        }
    }
}
