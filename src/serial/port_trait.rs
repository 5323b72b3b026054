//! Write-side trait over the VTX serial line so the sender task can be
//! tested against a recording mock instead of real hardware.

use async_trait::async_trait;
use std::io;

/// Byte sink for outgoing VTX command frames
#[async_trait]
pub trait SerialSink: Send {
    /// Write all bytes to the line
    async fn write_all(&mut self, data: &[u8]) -> io::Result<()>;

    /// Flush buffered output
    async fn flush(&mut self) -> io::Result<()>;
}

#[async_trait]
impl SerialSink for tokio_serial::SerialStream {
    async fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        use tokio::io::AsyncWriteExt;
        AsyncWriteExt::write_all(self, data).await
    }

    async fn flush(&mut self) -> io::Result<()> {
        use tokio::io::AsyncWriteExt;
        AsyncWriteExt::flush(self).await
    }
}

#[cfg(test)]
pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct MockState {
        writes: Vec<Vec<u8>>,
        write_error: Option<io::ErrorKind>,
        flush_error: Option<io::ErrorKind>,
    }

    /// Recording serial sink; clones share the same state so a test can
    /// keep a handle while the sender task owns the "port".
    #[derive(Clone, Default)]
    pub struct MockSerialPort {
        state: Arc<Mutex<MockState>>,
    }

    impl MockSerialPort {
        pub fn new() -> Self {
            Self::default()
        }

        /// Every write issued so far, in order.
        pub fn writes(&self) -> Vec<Vec<u8>> {
            self.state.lock().unwrap().writes.clone()
        }

        pub fn write_count(&self) -> usize {
            self.state.lock().unwrap().writes.len()
        }

        /// Make all subsequent writes fail with `kind`.
        pub fn fail_writes(&self, kind: io::ErrorKind) {
            self.state.lock().unwrap().write_error = Some(kind);
        }

        /// Make all subsequent flushes fail with `kind`.
        pub fn fail_flushes(&self, kind: io::ErrorKind) {
            self.state.lock().unwrap().flush_error = Some(kind);
        }
    }

    #[async_trait]
    impl SerialSink for MockSerialPort {
        async fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
            let mut state = self.state.lock().unwrap();
            if let Some(kind) = state.write_error {
                return Err(io::Error::new(kind, "mock write error"));
            }
            state.writes.push(data.to_vec());
            Ok(())
        }

        async fn flush(&mut self) -> io::Result<()> {
            let state = self.state.lock().unwrap();
            if let Some(kind) = state.flush_error {
                return Err(io::Error::new(kind, "mock flush error"));
            }
            Ok(())
        }
    }
}
