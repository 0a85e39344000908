#![cfg(feature = "std")]

use tokio::sync::mpsc;

use super::SerialSource;

/// Channel-backed serial line for tests and simulation.
pub struct InMemorySerial {
    rx: mpsc::UnboundedReceiver<u8>,
}

/// Transmit end of an [`InMemorySerial`].
#[derive(Clone)]
pub struct SerialSender {
    tx: mpsc::UnboundedSender<u8>,
}

impl InMemorySerial {
    pub fn pair() -> (SerialSender, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (SerialSender { tx }, Self { rx })
    }
}

impl SerialSender {
    /// Queues bytes on the line.
    pub fn send(&self, bytes: &[u8]) -> anyhow::Result<()> {
        for &b in bytes {
            self.tx
                .send(b)
                .map_err(|_| anyhow::anyhow!("Serial line closed"))?;
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl SerialSource for InMemorySerial {
    async fn read_byte(&mut self) -> anyhow::Result<Option<u8>> {
        Ok(self.rx.recv().await)
    }
}
