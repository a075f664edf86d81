//! UDP datagram backend for WiFi bridges.
//!
//! Every command code goes out as its own 3-byte datagram. The factory
//! default bridge listens on port 8899 and answers to broadcast, so the
//! default configuration targets `255.255.255.255:8899`; broadcast is
//! enabled on the socket automatically whenever the target address is the
//! broadcast address.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use tokio::net::UdpSocket;

use super::{Transport, TransportError};

/// Port the bridge listens on out of the box.
pub const DEFAULT_PORT: u16 = 8899;

/// UDP backend configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UdpConfig {
    /// Bridge address; the IPv4 broadcast address by default.
    pub address: IpAddr,
    /// Bridge port; [`DEFAULT_PORT`] by default.
    pub port: u16,
}

impl Default for UdpConfig {
    fn default() -> Self {
        Self {
            address: IpAddr::V4(Ipv4Addr::BROADCAST),
            port: DEFAULT_PORT,
        }
    }
}

impl UdpConfig {
    /// Configuration with the factory defaults (broadcast, port 8899).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bridge address.
    pub fn address(mut self, address: IpAddr) -> Self {
        self.address = address;
        self
    }

    /// Set the bridge port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// The socket address commands are sent to.
    pub fn target(&self) -> SocketAddr {
        SocketAddr::new(self.address, self.port)
    }

    /// Whether this configuration addresses every bridge on the subnet.
    pub fn is_broadcast(&self) -> bool {
        matches!(self.address, IpAddr::V4(v4) if v4.is_broadcast())
    }
}

/// UDP datagram transport to a WiFi bridge.
#[derive(Debug)]
pub struct UdpTransport {
    socket: UdpSocket,
    target: SocketAddr,
}

impl Transport for UdpTransport {
    type Config = UdpConfig;

    async fn open(config: &UdpConfig) -> Result<Self, TransportError> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))
            .await
            .map_err(TransportError::Open)?;
        if config.is_broadcast() {
            socket.set_broadcast(true).map_err(TransportError::Open)?;
        }
        tracing::debug!(target = %config.target(), broadcast = config.is_broadcast(), "udp socket ready");
        Ok(Self {
            socket,
            target: config.target(),
        })
    }

    async fn send(&mut self, code: &[u8; 3]) -> Result<(), TransportError> {
        self.socket
            .send_to(code, self.target)
            .await
            .map_err(TransportError::Write)?;
        Ok(())
    }

    async fn close(self) {
        // Dropping the socket releases it; UDP has nothing to flush.
    }
}
