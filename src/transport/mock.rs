//! Recording transport for controller tests.

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::time::Instant;

use super::{Transport, TransportError};

/// Shared state observed by tests and mutated by the mock transport.
///
/// Failure injection counters burn down: `fail_opens = 1` makes exactly the
/// next open attempt fail, after which opens succeed again.
#[derive(Debug, Default)]
pub(crate) struct MockState {
    pub open_attempts: AtomicUsize,
    pub opens: AtomicUsize,
    pub closes: AtomicUsize,
    pub fail_opens: AtomicUsize,
    pub fail_writes: AtomicUsize,
    /// Every successful write: the code and the instant the write started.
    pub sent: Mutex<Vec<([u8; 3], Instant)>>,
}

impl MockState {
    pub fn handle() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn sent_codes(&self) -> Vec<[u8; 3]> {
        self.sent.lock().unwrap().iter().map(|(code, _)| *code).collect()
    }

    pub fn sent_at(&self) -> Vec<Instant> {
        self.sent.lock().unwrap().iter().map(|(_, at)| *at).collect()
    }

    fn take_failure(counter: &AtomicUsize) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[derive(Debug)]
pub(crate) struct MockTransport {
    state: Arc<MockState>,
}

impl Transport for MockTransport {
    type Config = Arc<MockState>;

    async fn open(state: &Arc<MockState>) -> Result<Self, TransportError> {
        state.open_attempts.fetch_add(1, Ordering::SeqCst);
        if MockState::take_failure(&state.fail_opens) {
            return Err(TransportError::Open(io::Error::other("injected open failure")));
        }
        state.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Self {
            state: Arc::clone(state),
        })
    }

    async fn send(&mut self, code: &[u8; 3]) -> Result<(), TransportError> {
        if MockState::take_failure(&self.state.fail_writes) {
            return Err(TransportError::Write(io::Error::other("injected write failure")));
        }
        self.state.sent.lock().unwrap().push((*code, Instant::now()));
        Ok(())
    }

    async fn close(self) {
        self.state.closes.fetch_add(1, Ordering::SeqCst);
    }
}
