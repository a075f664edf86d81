//! Serial backend for UART bridge modules.
//!
//! Bridge modules wired straight to a UART take the same 3-byte codes as
//! the WiFi bridge. The line is point to point and loss-free compared to
//! the radio hop, which is why the serial defaults for pacing and repeats
//! (picked by the controller constructors) are gentler than the UDP ones.

use tokio::io::AsyncWriteExt;
use tokio_serial::{SerialPortBuilderExt, SerialStream};

use super::{Transport, TransportError};

/// Default serial device path.
pub const DEFAULT_DEVICE: &str = "/dev/ttyS0";

/// Default baud rate of the UART bridge module.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Serial backend configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialConfig {
    /// Device path; [`DEFAULT_DEVICE`] by default.
    pub device: String,
    /// Baud rate; [`DEFAULT_BAUD_RATE`] by default.
    pub baud_rate: u32,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            device: DEFAULT_DEVICE.to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
        }
    }
}

impl SerialConfig {
    /// Configuration with the defaults (`/dev/ttyS0`, 9600 baud).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the device path.
    pub fn device(mut self, device: impl Into<String>) -> Self {
        self.device = device.into();
        self
    }

    /// Set the baud rate.
    pub fn baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }
}

/// Serial line transport to a UART bridge module.
#[derive(Debug)]
pub struct SerialTransport {
    port: SerialStream,
}

impl Transport for SerialTransport {
    type Config = SerialConfig;

    async fn open(config: &SerialConfig) -> Result<Self, TransportError> {
        let port = tokio_serial::new(&config.device, config.baud_rate).open_native_async()?;
        tracing::debug!(device = %config.device, baud = config.baud_rate, "serial port ready");
        Ok(Self { port })
    }

    async fn send(&mut self, code: &[u8; 3]) -> Result<(), TransportError> {
        self.port
            .write_all(code)
            .await
            .map_err(TransportError::Write)?;
        self.port.flush().await.map_err(TransportError::Write)?;
        Ok(())
    }

    async fn close(mut self) {
        // Drain what the OS buffered; errors at teardown are not actionable.
        let _ = self.port.flush().await;
    }
}
