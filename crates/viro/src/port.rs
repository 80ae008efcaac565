//! Ports: opaque I/O handles.
//!
//! A port wraps a driver — console, in-memory buffer, eventually file/TCP/
//! HTTP collaborators the native library would register — behind one small
//! trait so `value.rs` and the dispatcher never need to know which backend
//! a given port uses. Drivers that need real readiness polling (network
//! sockets) are left as an external-library concern; this module only
//! standardises the contract `wait` relies on.
//!
//! Generalizes a host-hook trait pattern — write formatted print output —
//! into a broader "read/write/close an addressable resource" shape.

use crate::error::Error;

/// What every port driver must support.
pub trait PortDriver: std::fmt::Debug {
    fn write(&mut self, bytes: &[u8]) -> Result<usize, Error>;
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Error>;
    fn close(&mut self) -> Result<(), Error>;
    fn is_open(&self) -> bool;
}

/// A live I/O handle.
#[derive(Debug)]
pub struct Port {
    pub scheme: String,
    driver: Box<dyn PortDriver>,
}

impl Port {
    #[must_use]
    pub fn new(scheme: impl Into<String>, driver: Box<dyn PortDriver>) -> Self {
        Self { scheme: scheme.into(), driver }
    }

    pub fn write(&mut self, bytes: &[u8]) -> Result<usize, Error> {
        self.ensure_open()?;
        self.driver.write(bytes)
    }

    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        self.ensure_open()?;
        self.driver.read(buf)
    }

    pub fn close(&mut self) -> Result<(), Error> {
        self.driver.close()
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.driver.is_open()
    }

    /// `wait` on an open port returns immediately.
    pub fn wait(&self) -> Result<(), Error> {
        self.ensure_open()
    }

    fn ensure_open(&self) -> Result<(), Error> {
        if self.is_open() {
            Ok(())
        } else {
            Err(Error::access(crate::error::ErrorId::PortClosed, [self.scheme.clone()]))
        }
    }
}

/// Writes to the host's stdout/stderr writers; reading is unsupported
/// (returns zero bytes, mirroring a closed-for-reading stream rather than
/// erroring, since `console://` is nominally always "open").
#[derive(Debug)]
pub struct ConsolePort {
    open: bool,
}

impl Default for ConsolePort {
    fn default() -> Self {
        Self { open: true }
    }
}

impl PortDriver for ConsolePort {
    fn write(&mut self, bytes: &[u8]) -> Result<usize, Error> {
        use std::io::Write as _;
        std::io::stdout()
            .write_all(bytes)
            .map_err(|e| Error::access(crate::error::ErrorId::PortClosed, [e.to_string()]))?;
        Ok(bytes.len())
    }

    fn read(&mut self, _buf: &mut [u8]) -> Result<usize, Error> {
        Ok(0)
    }

    fn close(&mut self) -> Result<(), Error> {
        self.open = false;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }
}

/// An in-memory port over a growable byte buffer — used by tests and by
/// natives that open `memory://`-style ports for scratch I/O.
#[derive(Debug, Default)]
pub struct MemoryPort {
    buffer: Vec<u8>,
    cursor: usize,
    open: bool,
}

impl MemoryPort {
    #[must_use]
    pub fn new() -> Self {
        Self { buffer: Vec::new(), cursor: 0, open: true }
    }

    #[must_use]
    pub fn contents(&self) -> &[u8] {
        &self.buffer
    }
}

impl PortDriver for MemoryPort {
    fn write(&mut self, bytes: &[u8]) -> Result<usize, Error> {
        self.buffer.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        let remaining = &self.buffer[self.cursor..];
        let n = remaining.len().min(buf.len());
        buf[..n].copy_from_slice(&remaining[..n]);
        self.cursor += n;
        Ok(n)
    }

    fn close(&mut self) -> Result<(), Error> {
        self.open = false;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_port_rejects_io() {
        let mut port = Port::new("memory", Box::new(MemoryPort::new()));
        port.close().unwrap();
        assert!(port.write(b"x").is_err());
    }

    #[test]
    fn memory_port_round_trips() {
        let mut port = Port::new("memory", Box::new(MemoryPort::new()));
        port.write(b"hi").unwrap();
        let mut buf = [0u8; 2];
        port.read(&mut buf).unwrap();
        assert_eq!(&buf, b"hi");
    }

    #[test]
    fn wait_on_open_port_returns_immediately() {
        let port = Port::new("console", Box::new(ConsolePort::default()));
        assert!(port.wait().is_ok());
    }
}
