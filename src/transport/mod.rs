//! Transport backends.
//!
//! The sequencing core is written once against the [`Transport`] trait; the
//! UDP datagram backend (the WiFi bridge protocol) and the serial backend
//! (UART bridge modules) only differ in how they open the channel and push
//! three bytes through it.
//!
//! The receiver never acknowledges anything, so `send` resolving merely
//! means the platform accepted the bytes. Delivery is probabilistic by
//! nature of the hardware; the controller compensates with repeats and
//! pacing.

use std::fmt;
use std::future::Future;
use std::io;

use thiserror::Error;

#[cfg(feature = "udp")]
mod udp;
#[cfg(feature = "udp")]
pub use udp::{UdpConfig, UdpTransport, DEFAULT_PORT};

#[cfg(feature = "serial")]
mod serial;
#[cfg(feature = "serial")]
pub use serial::{SerialConfig, SerialTransport, DEFAULT_BAUD_RATE, DEFAULT_DEVICE};

#[cfg(test)]
pub(crate) mod mock;

/// Errors from the transport layer.
///
/// Both kinds reach only the transmission that triggered them; they never
/// abort the transmission timeline or queued operations.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The platform failed to open the socket or port.
    #[error("failed to open transport: {0}")]
    Open(#[source] io::Error),

    /// The platform write failed.
    #[error("transport write failed: {0}")]
    Write(#[source] io::Error),

    /// The serial port could not be configured or opened.
    #[cfg(feature = "serial")]
    #[error("serial port error: {0}")]
    Serial(#[from] tokio_serial::Error),
}

/// An open/send/close capability over a byte-oriented channel.
///
/// Implementations do not need to serialize anything themselves: the
/// controller guarantees that `open` runs at most once per live handle and
/// that `send` calls never overlap in time.
pub trait Transport: Sized + Send + 'static {
    /// Backend-specific configuration (address and port, device and baud
    /// rate, ...).
    type Config: Clone + fmt::Debug + Send + Sync + 'static;

    /// Open the channel.
    fn open(config: &Self::Config) -> impl Future<Output = Result<Self, TransportError>> + Send;

    /// Transmit one command code as a single discrete write.
    fn send(&mut self, code: &[u8; 3]) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Release the channel.
    fn close(self) -> impl Future<Output = ()> + Send;
}
