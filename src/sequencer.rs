//! FIFO job sequencer.
//!
//! An ordering primitive shared by the request and transmission timelines: a
//! single worker task drains a queue of boxed jobs, running each one to
//! completion before starting the next. Enqueuing is synchronous, so the
//! execution order is fixed at call time; the future returned by
//! [`Sequencer::enqueue`] only observes completion and may be dropped
//! without cancelling the job.
//!
//! A job's outcome is a value delivered over a oneshot channel, never a
//! worker exit, so one failed job cannot poison the jobs behind it.

use std::future::Future;
use std::pin::Pin;

use tokio::sync::{mpsc, oneshot};

type Job = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Returned when the worker task is gone, which only happens while the
/// runtime is shutting down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SequencerClosed;

/// A FIFO timeline of asynchronous jobs.
///
/// Cloning yields another handle onto the same timeline. The worker task
/// finishes the queued jobs and exits once every handle is dropped.
#[derive(Debug, Clone)]
pub(crate) struct Sequencer {
    queue: mpsc::UnboundedSender<Job>,
}

impl Sequencer {
    /// Spawn the worker task for a new, empty timeline.
    ///
    /// Must be called within a tokio runtime.
    pub fn spawn(timeline: &'static str) -> Self {
        let (queue, mut jobs) = mpsc::unbounded_channel::<Job>();
        tokio::spawn(async move {
            while let Some(job) = jobs.recv().await {
                job.await;
            }
            tracing::trace!(timeline, "sequencer worker finished");
        });
        Self { queue }
    }

    /// Append a job to the timeline and return a future resolving to its
    /// output.
    ///
    /// The job is queued before this function returns; callers that never
    /// await the result still get their slot in the order.
    pub fn enqueue<F, T>(&self, job: F) -> impl Future<Output = Result<T, SequencerClosed>> + use<F, T>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let (done_tx, done_rx) = oneshot::channel();
        let queued = self
            .queue
            .send(Box::pin(async move {
                // The caller may have dropped its end; the job still ran.
                let _ = done_tx.send(job.await);
            }))
            .is_ok();

        async move {
            if !queued {
                return Err(SequencerClosed);
            }
            done_rx.await.map_err(|_| SequencerClosed)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn jobs_run_in_enqueue_order() {
        let seq = Sequencer::spawn("test");
        let log = Arc::new(Mutex::new(Vec::new()));

        // Later jobs sleep less; only strict FIFO keeps the log ordered.
        let mut waits = Vec::new();
        for (id, ms) in [(1u32, 30u64), (2, 20), (3, 10)] {
            let log = Arc::clone(&log);
            waits.push(seq.enqueue(async move {
                tokio::time::sleep(Duration::from_millis(ms)).await;
                log.lock().unwrap().push(id);
            }));
        }
        for wait in waits {
            wait.await.unwrap();
        }
        assert_eq!(*log.lock().unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn failed_job_does_not_poison_the_timeline() {
        let seq = Sequencer::spawn("test");

        let failing = seq.enqueue(async { Err::<(), &str>("write failed") });
        let following = seq.enqueue(async { Ok::<u32, &str>(7) });

        assert_eq!(failing.await.unwrap(), Err("write failed"));
        assert_eq!(following.await.unwrap(), Ok(7));
    }

    #[tokio::test]
    async fn dropped_observer_does_not_cancel_the_job() {
        let seq = Sequencer::spawn("test");
        let ran = Arc::new(Mutex::new(false));

        let flag = Arc::clone(&ran);
        drop(seq.enqueue(async move {
            *flag.lock().unwrap() = true;
        }));

        // A later job on the same timeline proves the first one completed.
        seq.enqueue(async {}).await.unwrap();
        assert!(*ran.lock().unwrap());
    }
}
