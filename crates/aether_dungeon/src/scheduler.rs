//! # Two-Stage Scheduling
//!
//! Generation is split into a compute stage that runs off the primary thread
//! and a mutation stage that must run on it. The [`Scheduler`] trait is the
//! seam between the generator and the host's threading model.
//!
//! [`TokioScheduler`] runs compute work on tokio's blocking pool and hands
//! primary work over an unbounded channel. The host owns the matching
//! [`PrimaryQueue`] and drains it from its main loop with mutable access to
//! the world.

use std::future::Future;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::warn;

/// Work for a background thread.
pub type AsyncTask = Box<dyn FnOnce() + Send + 'static>;

/// Work that needs exclusive access to the world `W`.
pub type PrimaryTask<W> = Box<dyn FnOnce(&mut W) + Send + 'static>;

/// Scheduling primitives provided by the host.
pub trait Scheduler<W>: Send + Sync {
    /// Runs `work` off the primary thread.
    fn run_async(&self, work: AsyncTask);

    /// Queues `work` for the primary thread.
    fn run_on_primary(&self, work: PrimaryTask<W>);
}

/// Scheduler backed by a tokio runtime.
pub struct TokioScheduler<W> {
    handle: Handle,
    primary: mpsc::UnboundedSender<PrimaryTask<W>>,
}

impl<W> Clone for TokioScheduler<W> {
    fn clone(&self) -> Self {
        Self {
            handle: self.handle.clone(),
            primary: self.primary.clone(),
        }
    }
}

impl<W> std::fmt::Debug for TokioScheduler<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokioScheduler")
            .field("primary_closed", &self.primary.is_closed())
            .finish()
    }
}

impl<W: 'static> Scheduler<W> for TokioScheduler<W> {
    fn run_async(&self, work: AsyncTask) {
        let task = self.handle.spawn_blocking(work);
        self.handle.spawn(async move {
            if let Err(e) = task.await {
                warn!("⚠️ Background task did not complete: {}", e);
            }
        });
    }

    fn run_on_primary(&self, work: PrimaryTask<W>) {
        if self.primary.send(work).is_err() {
            warn!("⚠️ Primary queue is closed, dropping world task");
        }
    }
}

/// Creates a scheduler on `handle` together with the queue the primary
/// thread drains.
pub fn primary_channel<W>(handle: Handle) -> (TokioScheduler<W>, PrimaryQueue<W>) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (
        TokioScheduler { handle, primary: sender },
        PrimaryQueue { receiver },
    )
}

/// Receiving end of the primary-thread task queue.
pub struct PrimaryQueue<W> {
    receiver: mpsc::UnboundedReceiver<PrimaryTask<W>>,
}

impl<W> PrimaryQueue<W> {
    /// Runs every task queued so far without waiting. Returns how many ran.
    pub fn drain(&mut self, world: &mut W) -> usize {
        let mut executed = 0;
        while let Ok(task) = self.receiver.try_recv() {
            task(world);
            executed += 1;
        }
        executed
    }

    /// Waits for the next task and runs it. Returns false once every
    /// scheduler has been dropped and the queue is empty.
    pub async fn run_next(&mut self, world: &mut W) -> bool {
        match self.receiver.recv().await {
            Some(task) => {
                task(world);
                true
            }
            None => false,
        }
    }

    /// Runs tasks as they arrive until `until` completes, then returns its output.
    pub async fn run_until<F: Future>(&mut self, world: &mut W, until: F) -> F::Output {
        tokio::pin!(until);
        loop {
            tokio::select! {
                biased;
                output = &mut until => return output,
                task = self.receiver.recv() => match task {
                    Some(task) => task(world),
                    None => break,
                },
            }
        }
        until.await
    }
}
