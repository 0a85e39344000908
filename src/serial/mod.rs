//! Byte sources feeding the map loader.

#![cfg(feature = "std")]

pub mod in_memory;
pub mod stream;

/// Receive side of a serial line.
#[async_trait::async_trait]
pub trait SerialSource: Send {
    /// Next received byte, or `None` once the line is closed.
    async fn read_byte(&mut self) -> anyhow::Result<Option<u8>>;
}

pub use in_memory::{InMemorySerial, SerialSender};
pub use stream::StreamSerial;
