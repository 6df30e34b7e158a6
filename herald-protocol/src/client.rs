//! Fire-and-forget OSC client
//!
//! Encodes parameter updates and hands each datagram to a [`Transport`].
//! Nothing is acknowledged or retried; a failed send is counted and
//! returned so the caller can log it, and the next update simply goes out
//! on its own.

use core::future::Future;

use crate::osc::{OscError, OscMessage, MAX_PACKET_SIZE};

/// Datagram transport towards the OSC receiver
pub trait Transport {
    type Error;

    /// Hand one datagram to the network stack
    fn send(&mut self, datagram: &[u8]) -> impl Future<Output = Result<(), Self::Error>>;
}

/// Why an update did not leave the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SendError<E> {
    /// The update could not be encoded
    Encode(OscError),
    /// The transport refused the datagram
    Transport(E),
}

impl<E> From<OscError> for SendError<E> {
    fn from(e: OscError) -> Self {
        SendError::Encode(e)
    }
}

/// OSC client over any [`Transport`]
pub struct OscClient<T> {
    transport: T,
    buffer: [u8; MAX_PACKET_SIZE],
    sent: u32,
    failed: u32,
}

impl<T: Transport> OscClient<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            buffer: [0u8; MAX_PACKET_SIZE],
            sent: 0,
            failed: 0,
        }
    }

    /// Send a prepared message
    pub async fn send(&mut self, message: &OscMessage) -> Result<(), SendError<T::Error>> {
        let result = self.transmit(message).await;
        match result {
            Ok(()) => self.sent = self.sent.wrapping_add(1),
            Err(_) => self.failed = self.failed.wrapping_add(1),
        }
        result
    }

    /// Update a string parameter
    pub async fn send_text(&mut self, address: &str, text: &str) -> Result<(), SendError<T::Error>> {
        match OscMessage::text(address, text) {
            Ok(message) => self.send(&message).await,
            Err(e) => self.reject(e),
        }
    }

    /// Update a normalised float parameter (0.0..=1.0)
    pub async fn send_float(&mut self, address: &str, value: f32) -> Result<(), SendError<T::Error>> {
        match OscMessage::float(address, value) {
            Ok(message) => self.send(&message).await,
            Err(e) => self.reject(e),
        }
    }

    /// Update an integer parameter
    pub async fn send_int(&mut self, address: &str, value: i32) -> Result<(), SendError<T::Error>> {
        match OscMessage::int(address, value) {
            Ok(message) => self.send(&message).await,
            Err(e) => self.reject(e),
        }
    }

    /// Datagrams handed to the transport
    pub fn sent(&self) -> u32 {
        self.sent
    }

    /// Updates that did not go out
    pub fn failed(&self) -> u32 {
        self.failed
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn transmit(&mut self, message: &OscMessage) -> Result<(), SendError<T::Error>> {
        let len = message.encode(&mut self.buffer)?;
        self.transport
            .send(&self.buffer[..len])
            .await
            .map_err(SendError::Transport)
    }

    fn reject(&mut self, e: OscError) -> Result<(), SendError<T::Error>> {
        self.failed = self.failed.wrapping_add(1);
        Err(SendError::Encode(e))
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use embassy_futures::block_on;
    use std::vec::Vec;

    #[derive(Default)]
    struct Recorder {
        datagrams: Vec<Vec<u8>>,
        unreachable: bool,
    }

    impl Transport for Recorder {
        type Error = ();

        async fn send(&mut self, datagram: &[u8]) -> Result<(), ()> {
            if self.unreachable {
                return Err(());
            }
            self.datagrams.push(datagram.to_vec());
            Ok(())
        }
    }

    #[test]
    fn test_send_text_then_float() {
        let mut client = OscClient::new(Recorder::default());
        block_on(client.send_text("/t", "Jane")).unwrap();
        block_on(client.send_float("/o", 1.0)).unwrap();

        let sent = &client.transport().datagrams;
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].as_slice(), b"/t\0\0,s\0\0Jane\0\0\0\0");
        assert_eq!(sent[1].as_slice(), &[b'/', b'o', 0, 0, b',', b'f', 0, 0, 0x3F, 0x80, 0, 0]);
        assert_eq!(client.sent(), 2);
        assert_eq!(client.failed(), 0);
    }

    #[test]
    fn test_send_int() {
        let mut client = OscClient::new(Recorder::default());
        block_on(client.send_int("/c", 2)).unwrap();
        assert_eq!(client.transport().datagrams[0][8..], [0, 0, 0, 2]);
    }

    #[test]
    fn test_unreachable_is_counted_not_retried() {
        let mut client = OscClient::new(Recorder {
            unreachable: true,
            ..Default::default()
        });

        assert_eq!(
            block_on(client.send_float("/o", 0.0)),
            Err(SendError::Transport(()))
        );
        assert_eq!(client.failed(), 1);
        assert!(client.transport().datagrams.is_empty());
    }

    #[test]
    fn test_invalid_update_never_reaches_transport() {
        let mut client = OscClient::new(Recorder::default());
        assert_eq!(
            block_on(client.send_float("/o", 2.0)),
            Err(SendError::Encode(OscError::ValueOutOfRange))
        );
        assert_eq!(
            block_on(client.send_text("no-slash", "x")),
            Err(SendError::Encode(OscError::InvalidAddress))
        );
        assert_eq!(client.failed(), 2);
        assert_eq!(client.sent(), 0);
        assert!(client.transport().datagrams.is_empty());
    }
}
