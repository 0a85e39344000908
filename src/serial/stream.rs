#![cfg(feature = "std")]

use tokio::io::{AsyncRead, AsyncReadExt};

use super::SerialSource;

/// Serial line backed by any async byte stream (stdin, a pipe, a socket).
pub struct StreamSerial<R> {
    inner: R,
    buf: [u8; 64],
    len: usize,
    pos: usize,
}

impl<R: AsyncRead + Unpin + Send> StreamSerial<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buf: [0; 64],
            len: 0,
            pos: 0,
        }
    }
}

#[async_trait::async_trait]
impl<R: AsyncRead + Unpin + Send> SerialSource for StreamSerial<R> {
    async fn read_byte(&mut self) -> anyhow::Result<Option<u8>> {
        if self.pos == self.len {
            self.len = self.inner.read(&mut self.buf).await?;
            self.pos = 0;
            if self.len == 0 {
                return Ok(None);
            }
        }
        let byte = self.buf[self.pos];
        self.pos += 1;
        Ok(Some(byte))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_bytes_then_eof() -> anyhow::Result<()> {
        let data: &[u8] = b"10\n";
        let mut serial = StreamSerial::new(data);
        assert_eq!(serial.read_byte().await?, Some(b'1'));
        assert_eq!(serial.read_byte().await?, Some(b'0'));
        assert_eq!(serial.read_byte().await?, Some(b'\n'));
        assert_eq!(serial.read_byte().await?, None);
        Ok(())
    }
}
