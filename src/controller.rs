//! The bridge controller: public API and dispatch sequencing.
//!
//! Three independent FIFO timelines keep an acknowledgement-free receiver
//! fed in order:
//!
//! - the **request timeline** serializes the public operations
//!   ([`send_commands`](Controller::send_commands),
//!   [`pause`](Controller::pause), [`close`](Controller::close)) so that
//!   operation N+1 never begins before operation N has settled, even when
//!   callers issue operations back to back without awaiting;
//! - the **transmission timeline** serializes the individual 3-byte writes a
//!   request fans out into, inserting the pacing delay between consecutive
//!   writes;
//! - the **initialization timeline** is the fair async mutex around the
//!   transport slot: the first transmission to arrive opens the transport,
//!   everyone queued behind it reuses the stored handle.
//!
//! A failure anywhere settles exactly one job on one timeline; nothing is
//! ever poisoned and later operations proceed normally.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use crate::command::{self, Command, CommandArg};
use crate::error::{CommandError, SendError};
use crate::sequencer::Sequencer;
use crate::transport::{Transport, TransportError};

#[cfg(feature = "serial")]
use crate::transport::{SerialConfig, SerialTransport};
#[cfg(feature = "udp")]
use crate::transport::{UdpConfig, UdpTransport};

/// Default pacing and repeat parameters.
///
/// The radio hop behind the WiFi bridge drops frames freely, so the
/// datagram defaults retransmit and pace aggressively. A UART module sits
/// on a loss-free wire and needs neither.
pub mod constants {
    use std::time::Duration;

    /// Pacing delay between commands, datagram backend.
    pub const UDP_COMMAND_DELAY: Duration = Duration::from_millis(30);
    /// Times each command is transmitted, datagram backend.
    pub const UDP_COMMAND_REPEAT: u32 = 3;
    /// Pacing delay between commands, serial backend.
    pub const SERIAL_COMMAND_DELAY: Duration = Duration::ZERO;
    /// Times each command is transmitted, serial backend.
    pub const SERIAL_COMMAND_REPEAT: u32 = 1;
    /// Pause length when the caller has no particular one in mind.
    pub const DEFAULT_PAUSE: Duration = Duration::from_millis(100);
}

/// Controller configuration: a transport configuration plus the pacing
/// parameters.
///
/// `Default` is implemented per backend with the matching
/// [`constants`]; the builder-style setters override individual fields.
#[derive(Debug, Clone)]
pub struct Config<C> {
    /// Backend configuration (address/port or device/baud rate).
    pub transport: C,
    /// Minimum gap between the starts of consecutive transmissions.
    pub delay_between_commands: Duration,
    /// How many times each expanded command is transmitted.
    pub command_repeat: u32,
}

impl<C> Config<C> {
    /// Wrap a transport configuration with the datagram pacing defaults.
    pub fn with_transport(transport: C) -> Self {
        Self {
            transport,
            delay_between_commands: constants::UDP_COMMAND_DELAY,
            command_repeat: constants::UDP_COMMAND_REPEAT,
        }
    }

    /// Set the pacing delay.
    pub fn delay_between_commands(mut self, delay: Duration) -> Self {
        self.delay_between_commands = delay;
        self
    }

    /// Set the repeat count.
    pub fn command_repeat(mut self, repeat: u32) -> Self {
        self.command_repeat = repeat;
        self
    }
}

#[cfg(feature = "udp")]
impl Default for Config<UdpConfig> {
    fn default() -> Self {
        Self {
            transport: UdpConfig::default(),
            delay_between_commands: constants::UDP_COMMAND_DELAY,
            command_repeat: constants::UDP_COMMAND_REPEAT,
        }
    }
}

#[cfg(feature = "serial")]
impl Default for Config<SerialConfig> {
    fn default() -> Self {
        Self {
            transport: SerialConfig::default(),
            delay_between_commands: constants::SERIAL_COMMAND_DELAY,
            command_repeat: constants::SERIAL_COMMAND_REPEAT,
        }
    }
}

/// State shared between the controller handle and its queued jobs.
struct Shared<T: Transport> {
    /// The transport slot. `None` until the first open (or after `close`).
    transport: Mutex<Option<T>>,
    config: T::Config,
    delay: Duration,
}

impl<T: Transport> Shared<T> {
    /// Open the transport if the slot is empty. Failures are not cached:
    /// the slot stays empty and the next call re-attempts.
    async fn ensure_open(&self) -> Result<(), TransportError> {
        let mut slot = self.transport.lock().await;
        if slot.is_none() {
            *slot = Some(T::open(&self.config).await?);
        }
        Ok(())
    }

    /// One transmission: lazy open, write, pacing sleep.
    ///
    /// A failed write skips the pacing sleep; the next transmission may
    /// start immediately.
    async fn transmit(&self, code: Command) -> Result<(), TransportError> {
        let result = self.write(code).await;
        match &result {
            Ok(()) => {
                tracing::trace!(code = ?code, "command sent");
                if !self.delay.is_zero() {
                    tokio::time::sleep(self.delay).await;
                }
            }
            Err(error) => tracing::warn!(code = ?code, %error, "transmission failed"),
        }
        result
    }

    async fn write(&self, code: Command) -> Result<(), TransportError> {
        let mut slot = self.transport.lock().await;
        // Take-and-reinsert so a single borrow spans the send below.
        let transport = match slot.take() {
            Some(open) => slot.insert(open),
            None => slot.insert(T::open(&self.config).await?),
        };
        transport.send(code.as_bytes()).await
    }
}

/// Async controller for a single bridge.
///
/// Owns the transport (opened lazily, at most one live instance at a time)
/// and the sequencer tasks. All operations enqueue synchronously and return
/// a future observing completion: issuing calls back to back without
/// awaiting still executes them in strict call order.
///
/// Dropping the controller lets the queued operations finish and then shuts
/// the worker tasks down, closing the transport.
pub struct Controller<T: Transport> {
    shared: Arc<Shared<T>>,
    requests: Sequencer,
    transmissions: Sequencer,
    command_repeat: u32,
}

#[cfg(feature = "udp")]
impl Controller<UdpTransport> {
    /// Controller for a WiFi bridge over UDP.
    ///
    /// Must be called within a tokio runtime.
    pub fn udp(config: Config<UdpConfig>) -> Self {
        Self::new(config)
    }
}

#[cfg(feature = "serial")]
impl Controller<SerialTransport> {
    /// Controller for a UART bridge module on a serial line.
    ///
    /// Must be called within a tokio runtime.
    pub fn serial(config: Config<SerialConfig>) -> Self {
        Self::new(config)
    }
}

impl<T: Transport> Controller<T> {
    /// Create a controller over any [`Transport`] implementation.
    ///
    /// Begins opening the transport in the background immediately; the call
    /// itself never blocks. A failed background open is logged and retried
    /// lazily by the next send. Must be called within a tokio runtime.
    pub fn new(config: Config<T::Config>) -> Self {
        tracing::debug!(
            transport = ?config.transport,
            delay = ?config.delay_between_commands,
            repeat = config.command_repeat,
            "controller created"
        );
        let controller = Self {
            shared: Arc::new(Shared {
                transport: Mutex::new(None),
                config: config.transport,
                delay: config.delay_between_commands,
            }),
            requests: Sequencer::spawn("requests"),
            transmissions: Sequencer::spawn("transmissions"),
            command_repeat: config.command_repeat,
        };
        controller.warm_open();
        controller
    }

    /// Queue the initial open as the first request-timeline operation.
    fn warm_open(&self) {
        let shared = Arc::clone(&self.shared);
        drop(self.requests.enqueue(async move {
            if let Err(error) = shared.ensure_open().await {
                tracing::warn!(%error, "background open failed, next send will retry");
            }
        }));
    }

    /// Transmit one or more commands, each argument a single 3-byte code or
    /// a batch of codes.
    ///
    /// Arguments are validated and expanded before anything is queued: one
    /// malformed argument rejects the whole call with zero transmissions
    /// and no effect on other queued operations. On success the call
    /// occupies one slot on the request timeline; its future resolves
    /// `Ok(())` once every transmission (the expanded list, repeated
    /// `command_repeat` times) has settled. Individual open or write
    /// failures are logged and swallowed here; the receiver offers no
    /// acknowledgement that could distinguish a lost write from a dropped
    /// frame anyway.
    pub fn send_commands<I, A>(
        &self,
        commands: I,
    ) -> impl Future<Output = Result<(), SendError>> + Send + 'static
    where
        I: IntoIterator<Item = A>,
        A: TryInto<CommandArg>,
        CommandError: From<A::Error>,
    {
        let queued = self.validate_and_enqueue(commands);
        async move {
            match queued {
                Ok(settled) => settled.await,
                Err(error) => Err(error),
            }
        }
    }

    fn validate_and_enqueue<I, A>(
        &self,
        commands: I,
    ) -> Result<impl Future<Output = Result<(), SendError>> + Send + 'static, SendError>
    where
        I: IntoIterator<Item = A>,
        A: TryInto<CommandArg>,
        CommandError: From<A::Error>,
    {
        let mut args = Vec::new();
        for item in commands {
            let arg = item
                .try_into()
                .map_err(|error| SendError::Command(CommandError::from(error)))?;
            args.push(arg);
        }
        let codes = command::expand(self.command_repeat, &args);

        let shared = Arc::clone(&self.shared);
        let transmissions = self.transmissions.clone();
        let op = self.requests.enqueue(async move {
            let mut queued = Vec::with_capacity(codes.len());
            for code in codes {
                let shared = Arc::clone(&shared);
                queued.push(transmissions.enqueue(async move { shared.transmit(code).await }));
            }
            // Settle them all; outcomes only ever concerned the specific
            // transmission and were logged there.
            for sent in queued {
                let _ = sent.await;
            }
        });
        Ok(async move { op.await.map_err(|_| SendError::Shutdown) })
    }

    /// Hold the request timeline for `duration`.
    ///
    /// Purely a gap between public operations; transmission pacing is
    /// untouched and the transport is never consulted. See
    /// [`constants::DEFAULT_PAUSE`] for the conventional length.
    pub fn pause(
        &self,
        duration: Duration,
    ) -> impl Future<Output = Result<(), SendError>> + Send + 'static {
        let op = self.requests.enqueue(async move {
            tokio::time::sleep(duration).await;
        });
        async move { op.await.map_err(|_| SendError::Shutdown) }
    }

    /// Release the transport, once the operations queued ahead have
    /// settled.
    ///
    /// The controller stays usable: a later `send_commands` opens a fresh
    /// transport lazily, exactly once.
    pub fn close(&self) -> impl Future<Output = Result<(), SendError>> + Send + 'static {
        let shared = Arc::clone(&self.shared);
        let op = self.requests.enqueue(async move {
            if let Some(transport) = shared.transport.lock().await.take() {
                transport.close().await;
                tracing::debug!("transport released");
            }
        });
        async move { op.await.map_err(|_| SendError::Shutdown) }
    }
}
