//! OSC transmit task
//!
//! Sends each queued message to Resolume as one UDP datagram. Nothing is
//! acknowledged or retried; failures are logged and counted.

use defmt::*;
use embassy_net::udp::{PacketMetadata, SendError, UdpSocket};
use embassy_net::{IpAddress, IpEndpoint, Stack};

use herald_core::config::ResolumeConfig;
use herald_protocol::{OscClient, Transport, MAX_PACKET_SIZE};

use crate::channels::OSC_CHANNEL;

/// Datagrams the socket may hold while the radio is busy
const TX_PACKETS: usize = 8;

/// Source port of outgoing datagrams
const LOCAL_PORT: u16 = 57_000;

/// UDP socket aimed at one endpoint
struct UdpTransport<'a> {
    socket: UdpSocket<'a>,
    remote: IpEndpoint,
}

impl Transport for UdpTransport<'_> {
    type Error = SendError;

    async fn send(&mut self, datagram: &[u8]) -> Result<(), SendError> {
        self.socket.send_to(datagram, self.remote).await
    }
}

#[embassy_executor::task]
pub async fn osc_task(stack: Stack<'static>, resolume: &'static ResolumeConfig) {
    info!("OSC task started");

    // Resolume never answers, so the receive side only needs a token buffer
    let mut rx_meta = [PacketMetadata::EMPTY; 1];
    let mut rx_buffer = [0u8; 64];
    let mut tx_meta = [PacketMetadata::EMPTY; TX_PACKETS];
    let mut tx_buffer = [0u8; TX_PACKETS * MAX_PACKET_SIZE];

    let mut socket = UdpSocket::new(
        stack,
        &mut rx_meta,
        &mut rx_buffer,
        &mut tx_meta,
        &mut tx_buffer,
    );
    if let Err(e) = socket.bind(LOCAL_PORT) {
        error!("Failed to bind OSC socket: {:?}", e);
        return;
    }

    let [a, b, c, d] = resolume.host;
    let remote = IpEndpoint::new(IpAddress::v4(a, b, c, d), resolume.port);
    let mut client = OscClient::new(UdpTransport { socket, remote });

    loop {
        let message = OSC_CHANNEL.receive().await;
        match client.send(&message).await {
            Ok(()) => debug!("OSC {} sent", message.address.as_str()),
            Err(e) => warn!(
                "OSC {} not sent: {:?} ({} failed so far)",
                message.address.as_str(),
                e,
                client.failed()
            ),
        }
    }
}
