//! Priority request dispatcher
//!
//! One processing loop owns the queue and is the only task that talks to the
//! endpoint, no matter how many callers enqueue work. It keeps at least
//! `min_interval` between two dispatches and backs off globally when the
//! endpoint reports throttling.
//!
//! Ordering is priority first, then arrival. An item that hit a rate limit
//! goes back to the front of its priority class, so throttling never lets
//! later work overtake it.

use crate::config::DispatcherConfig;
use crate::ports::llm_gateway::GatewayError;
use futures::future::BoxFuture;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, warn};

/// Dispatch priority. Higher runs first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Priority(pub i32);

impl Priority {
    /// Improve and review calls of a running battle
    pub const BATTLE: Priority = Priority(10);
    /// Health checks, which should never delay battle traffic
    pub const HEALTH_CHECK: Priority = Priority(-10);
}

impl Default for Priority {
    fn default() -> Self {
        Priority(0)
    }
}

/// Snapshot of the process-wide pacing state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PacingState {
    pub last_dispatch: Option<Instant>,
    pub backoff_until: Option<Instant>,
    pub consecutive_errors: u32,
    /// Items executed, re-executions after a rate limit included
    pub dispatched: u64,
    pub rate_limited: u64,
}

enum TaskOutcome {
    Finished { success: bool },
    RateLimited(GatewayError),
}

/// Type-erased queued operation
trait DispatchTask: Send {
    /// The caller stopped waiting for the result
    fn is_abandoned(&self) -> bool;

    /// Run the operation once. A rate-limited run leaves the result slot
    /// untouched so the task can be run again.
    fn run(&mut self, requeues: u32, max_requeues: u32) -> BoxFuture<'static, TaskOutcome>;
}

type ReplySlot<T> = Arc<Mutex<Option<oneshot::Sender<Result<T, GatewayError>>>>>;

struct Task<T, F> {
    op: F,
    reply: ReplySlot<T>,
}

impl<T, F, Fut> DispatchTask for Task<T, F>
where
    T: Send + 'static,
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, GatewayError>> + Send + 'static,
{
    fn is_abandoned(&self) -> bool {
        match self.reply.lock() {
            Ok(slot) => slot.as_ref().is_none_or(|tx| tx.is_closed()),
            Err(_) => true,
        }
    }

    fn run(&mut self, requeues: u32, max_requeues: u32) -> BoxFuture<'static, TaskOutcome> {
        let fut = (self.op)();
        let reply = Arc::clone(&self.reply);
        Box::pin(async move {
            let result = fut.await;
            if let Err(error) = &result
                && error.is_rate_limited()
                && requeues < max_requeues
            {
                return TaskOutcome::RateLimited(error.clone());
            }
            let success = result.is_ok();
            if let Ok(mut slot) = reply.lock()
                && let Some(tx) = slot.take()
            {
                // The caller may have gone away; nothing to do then
                let _ = tx.send(result);
            }
            TaskOutcome::Finished { success }
        })
    }
}

struct Pending {
    priority: Priority,
    task: Box<dyn DispatchTask>,
}

struct QueuedItem {
    priority: Priority,
    /// Arrival order; negative for items put back at the front
    seq: i64,
    enqueued_at: Instant,
    requeues: u32,
    task: Box<dyn DispatchTask>,
}

impl PartialEq for QueuedItem {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}

impl Eq for QueuedItem {}

impl PartialOrd for QueuedItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedItem {
    // Max-heap: higher priority first, then lower sequence number
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Handle to the dispatcher loop. Share it behind an `Arc`.
///
/// The loop stops once every handle is dropped and the queue is drained.
pub struct Dispatcher {
    sender: mpsc::UnboundedSender<Pending>,
    pacing: Arc<Mutex<PacingState>>,
    depth: Arc<AtomicUsize>,
    config: DispatcherConfig,
}

impl Dispatcher {
    /// Start the processing loop. Must be called from within a Tokio runtime.
    pub fn new(config: DispatcherConfig) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let pacing = Arc::new(Mutex::new(PacingState::default()));
        let depth = Arc::new(AtomicUsize::new(0));

        let worker = DispatchLoop {
            receiver,
            heap: BinaryHeap::new(),
            next_seq: 0,
            front_seq: -1,
            state: PacingState::default(),
            shared: Arc::clone(&pacing),
            depth: Arc::clone(&depth),
            config: config.clone(),
        };
        tokio::spawn(worker.run());

        Self {
            sender,
            pacing,
            depth,
            config,
        }
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Queue `op` and wait for its result.
    ///
    /// `op` may run more than once: it is called again after each rate-limit
    /// error until it succeeds or the requeue limit is reached. Other errors
    /// are returned as-is without a retry.
    pub async fn enqueue<T, F, Fut>(&self, priority: Priority, op: F) -> Result<T, GatewayError>
    where
        T: Send + 'static,
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, GatewayError>> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let task = Task {
            op,
            reply: Arc::new(Mutex::new(Some(tx))),
        };

        self.depth.fetch_add(1, AtomicOrdering::SeqCst);
        if self
            .sender
            .send(Pending {
                priority,
                task: Box::new(task),
            })
            .is_err()
        {
            self.depth.fetch_sub(1, AtomicOrdering::SeqCst);
            return Err(GatewayError::Transport("dispatcher is not running".into()));
        }

        rx.await
            .unwrap_or_else(|_| Err(GatewayError::Transport("dispatcher dropped the request".into())))
    }

    /// Number of items waiting or running
    pub fn queue_depth(&self) -> usize {
        self.depth.load(AtomicOrdering::SeqCst)
    }

    pub fn pacing_state(&self) -> PacingState {
        match self.pacing.lock() {
            Ok(state) => state.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

struct DispatchLoop {
    receiver: mpsc::UnboundedReceiver<Pending>,
    heap: BinaryHeap<QueuedItem>,
    next_seq: i64,
    front_seq: i64,
    state: PacingState,
    shared: Arc<Mutex<PacingState>>,
    depth: Arc<AtomicUsize>,
    config: DispatcherConfig,
}

impl DispatchLoop {
    async fn run(mut self) {
        debug!("Dispatcher loop started");
        loop {
            if self.heap.is_empty() {
                match self.receiver.recv().await {
                    Some(pending) => self.admit(pending),
                    None => break,
                }
            }
            self.drain_channel();

            if let Some(ready_at) = self.ready_at()
                && ready_at > Instant::now()
            {
                sleep_until(ready_at).await;
                // Higher-priority work may have arrived while we slept
                self.drain_channel();
            }

            let Some(mut item) = self.heap.pop() else {
                continue;
            };

            if item.task.is_abandoned() {
                debug!("Skipping abandoned request (seq {})", item.seq);
                self.depth.fetch_sub(1, AtomicOrdering::SeqCst);
                continue;
            }

            self.state.last_dispatch = Some(Instant::now());
            self.state.dispatched += 1;
            self.publish();

            debug!(
                "Dispatching request (priority {}, waited {:?})",
                item.priority.0,
                item.enqueued_at.elapsed()
            );
            let outcome = item
                .task
                .run(item.requeues, self.config.max_requeues)
                .await;

            match outcome {
                TaskOutcome::Finished { success } => {
                    if success && self.state.consecutive_errors > 0 {
                        info!(
                            "Endpoint recovered after {} rate-limit errors",
                            self.state.consecutive_errors
                        );
                    }
                    if success {
                        self.state.consecutive_errors = 0;
                        self.state.backoff_until = None;
                    }
                    self.depth.fetch_sub(1, AtomicOrdering::SeqCst);
                }
                TaskOutcome::RateLimited(error) => {
                    self.state.consecutive_errors += 1;
                    self.state.rate_limited += 1;
                    let backoff = self.config.backoff_for(self.state.consecutive_errors);
                    self.state.backoff_until = Some(Instant::now() + backoff);
                    warn!(
                        "{}, backing off {:?} (consecutive errors: {})",
                        error, backoff, self.state.consecutive_errors
                    );

                    item.requeues += 1;
                    item.seq = self.front_seq;
                    self.front_seq -= 1;
                    self.heap.push(item);
                }
            }
            self.publish();
        }
        debug!("Dispatcher loop stopped");
    }

    fn admit(&mut self, pending: Pending) {
        self.heap.push(QueuedItem {
            priority: pending.priority,
            seq: self.next_seq,
            enqueued_at: Instant::now(),
            requeues: 0,
            task: pending.task,
        });
        self.next_seq += 1;
    }

    fn drain_channel(&mut self) {
        while let Ok(pending) = self.receiver.try_recv() {
            self.admit(pending);
        }
    }

    /// Earliest instant the next dispatch may happen
    fn ready_at(&self) -> Option<Instant> {
        let paced = self
            .state
            .last_dispatch
            .map(|last| last + self.config.min_interval);
        match (paced, self.state.backoff_until) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        }
    }

    fn publish(&self) {
        if let Ok(mut shared) = self.shared.lock() {
            *shared = self.state.clone();
        }
    }
}
