// crates/tunebench-runner/src/probe.rs
// ============================================================================
// Module: Readiness Probes
// Description: Connectivity checks used while awaiting readiness.
// Purpose: Distinguish a listening MySQL server from an open port.
// Dependencies: std::net, crate::interfaces
// ============================================================================

//! ## Overview
//! [`MysqlHandshakeProbe`] connects to the published MySQL port and reads
//! the first server packet. The server is ready only when that packet is a
//! protocol-10 greeting; refused connections, timeouts, and error packets
//! (for example while the server is still initializing) count as not ready.
//! [`AlwaysReady`] serves targets where a running environment is enough.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Read;
use std::net::SocketAddr;
use std::net::TcpStream;
use std::net::ToSocketAddrs;
use std::time::Duration;

use crate::interfaces::ReadinessProbe;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// First payload byte of a protocol-10 handshake packet.
pub const MYSQL_PROTOCOL_VERSION: u8 = 0x0a;

/// Default per-attempt connect and read timeout.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

// ============================================================================
// SECTION: Probes
// ============================================================================

/// Probe that treats a running environment as ready.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysReady;

impl ReadinessProbe for AlwaysReady {
    fn is_ready(&self) -> bool {
        true
    }
}

/// MySQL greeting probe.
#[derive(Debug, Clone)]
pub struct MysqlHandshakeProbe {
    /// Server host.
    host: String,
    /// Server port.
    port: u16,
    /// Per-attempt connect and read timeout.
    timeout: Duration,
}

impl MysqlHandshakeProbe {
    /// Builds a probe with the default attempt timeout.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    /// Overrides the per-attempt timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Attempts one greeting exchange against a resolved address.
    fn greet(&self, addr: &SocketAddr) -> bool {
        let Ok(mut stream) = TcpStream::connect_timeout(addr, self.timeout) else {
            return false;
        };
        if stream.set_read_timeout(Some(self.timeout)).is_err() {
            return false;
        }
        let mut header = [0_u8; 5];
        if stream.read_exact(&mut header).is_err() {
            return false;
        }
        is_greeting(&header)
    }
}

impl ReadinessProbe for MysqlHandshakeProbe {
    fn is_ready(&self) -> bool {
        let Ok(addrs) = (self.host.as_str(), self.port).to_socket_addrs() else {
            return false;
        };
        addrs.into_iter().any(|addr| self.greet(&addr))
    }
}

/// Returns true when a packet prefix is a non-empty protocol-10 greeting.
///
/// The prefix is the 3-byte little-endian payload length, the sequence id,
/// and the first payload byte.
fn is_greeting(prefix: &[u8; 5]) -> bool {
    let length = u32::from(prefix[0]) | (u32::from(prefix[1]) << 8) | (u32::from(prefix[2]) << 16);
    length > 0 && prefix[3] == 0 && prefix[4] == MYSQL_PROTOCOL_VERSION
}

// ============================================================================
// SECTION: Tests
// ============================================================================
