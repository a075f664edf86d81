//! # milight-bridge
//!
//! Async controller for MiLight/LimitlessLED WiFi bridges and UART bridge
//! modules. The bridge speaks a trivial wire protocol (every command is an
//! opaque 3-byte code sent as one datagram or serial write) and never
//! acknowledges anything, so reliability is entirely the sender's problem:
//!
//! - each command is retransmitted `command_repeat` times;
//! - consecutive transmissions are paced `delay_between_commands` apart;
//! - all transmissions are serialized onto the single transport, which is
//!   opened lazily and at most once;
//! - the public operations ([`send_commands`](Controller::send_commands),
//!   [`pause`](Controller::pause), [`close`](Controller::close)) execute in
//!   strict call order even when issued concurrently without awaiting.
//!
//! ## Feature flags
//!
//! - `udp` (default): UDP datagram backend for WiFi bridges
//! - `serial`: serial backend for UART bridge modules (pulls in
//!   `tokio-serial`)
//!
//! ## Example
//!
//! ```no_run
//! use milight_bridge::{Config, Controller};
//!
//! #[tokio::main]
//! async fn main() {
//!     // Broadcast to any bridge on the subnet, factory port 8899.
//!     let controller = Controller::udp(Config::default());
//!
//!     // An RGBW "zone 1 on" code followed by a full-brightness code; the
//!     // codes themselves come from a higher layer.
//!     controller
//!         .send_commands([[0x45u8, 0x00, 0x55], [0x4e, 0x1b, 0x55]])
//!         .await
//!         .unwrap();
//!
//!     controller.pause(std::time::Duration::from_millis(100)).await.unwrap();
//!     controller.close().await.unwrap();
//! }
//! ```
//!
//! Diagnostics are emitted through [`tracing`]; without a subscriber
//! installed they cost nothing.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod command;
pub mod controller;
pub mod error;
pub mod transport;

mod sequencer;

pub use command::{expand, Command, CommandArg};
pub use controller::{Config, Controller};
pub use error::{CommandError, SendError};
pub use transport::{Transport, TransportError};

#[cfg(feature = "serial")]
pub use transport::{SerialConfig, SerialTransport};
#[cfg(feature = "udp")]
pub use transport::{UdpConfig, UdpTransport};
