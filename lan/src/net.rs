//! UDP transport pump.
//!
//! A thin non-blocking layer between `LanService` and the wire. Each
//! tick the pump drains every datagram the socket has buffered into the
//! service, then flushes the service outbox back out. Nothing here ever
//! awaits, so the caller's tick cadence is preserved.

use crate::service::LanService;
use log::{debug, warn};
use shared::packet::Packet;
use std::io::{self, ErrorKind};
use std::net::SocketAddr;
use tokio::net::UdpSocket;

const MAX_DATAGRAM: usize = 2048;

pub struct LanSocket {
    socket: UdpSocket,
}

impl LanSocket {
    /// Binds a broadcast-capable socket on `bind_addr`.
    pub async fn bind(bind_addr: &str) -> io::Result<Self> {
        let socket = UdpSocket::bind(bind_addr).await?;
        socket.set_broadcast(true)?;
        Ok(Self { socket })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Drains inbound datagrams into the service, then flushes its
    /// outbox. Returns how many packets moved in each direction.
    pub fn pump(&self, service: &mut LanService, now: u64) -> io::Result<(usize, usize)> {
        let mut received = 0;
        let mut buf = [0u8; MAX_DATAGRAM];
        loop {
            match self.socket.try_recv_from(&mut buf) {
                Ok((len, from)) => match bincode::deserialize::<Packet>(&buf[..len]) {
                    Ok(packet) => {
                        service.handle_packet(&from.to_string(), packet, now);
                        received += 1;
                    }
                    Err(e) => debug!("undecodable datagram from {}: {}", from, e),
                },
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(e) => return Err(e),
            }
        }

        let mut sent = 0;
        let mut unsent = Vec::new();
        for (to, packet) in service.take_outbox() {
            let Some(target) = wire_address(&to) else {
                warn!("unroutable address {:?}", to);
                continue;
            };
            let bytes = bincode::serialize(&packet)
                .map_err(|e| io::Error::new(ErrorKind::InvalidData, e))?;
            match self.socket.try_send_to(&bytes, target) {
                Ok(_) => sent += 1,
                Err(e) if e.kind() == ErrorKind::WouldBlock => {
                    debug!("socket not writable, retrying packet to {} next tick", to);
                    unsent.push((to, packet));
                }
                Err(e) => return Err(e),
            }
        }
        service.requeue(unsent);
        Ok((received, sent))
    }
}

/// Turns a directory-style address into a routable socket address.
/// Directory entries may carry a protocol suffix after the port
/// (for example `10.0.0.1:30720-1.1`), which the wire does not want.
pub fn wire_address(address: &str) -> Option<SocketAddr> {
    let (host, tail) = address.rsplit_once(':')?;
    let digits: String = tail.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    format!("{}:{}", host, digits).parse().ok()
}
