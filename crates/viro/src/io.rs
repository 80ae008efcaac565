//! Host I/O hooks.
//!
//! Plain `std::io::{Read, Write}` objects rather than a
//! print-formatting-specific trait, since the native ABI hands natives
//! raw writers rather than a `print`-shaped callback.

use std::io::{self, BufRead, Write};

/// Bundles the three streams an [`crate::native::EvalHandle`] exposes to
/// natives.
pub struct HostIo {
    pub input: Box<dyn BufRead>,
    pub output: Box<dyn Write>,
    pub error: Box<dyn Write>,
}

impl HostIo {
    /// Wires stdin/stdout/stderr directly — what the CLI and REPL use.
    #[must_use]
    pub fn stdio() -> Self {
        Self {
            input: Box::new(io::BufReader::new(io::stdin())),
            output: Box::new(io::stdout()),
            error: Box::new(io::stderr()),
        }
    }

    /// Discards everything written and yields no input — useful for
    /// embedding Viro where host I/O is irrelevant.
    #[must_use]
    pub fn null() -> Self {
        Self {
            input: Box::new(io::empty() as io::Empty).into_bufread(),
            output: Box::new(io::sink()),
            error: Box::new(io::sink()),
        }
    }

    /// Captures output into in-memory buffers and feeds `input` as stdin —
    /// the shape test code and `repl_error`-style fixtures want.
    #[must_use]
    pub fn captured(input: &str) -> (Self, std::rc::Rc<std::cell::RefCell<Vec<u8>>>, std::rc::Rc<std::cell::RefCell<Vec<u8>>>) {
        let stdout = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let stderr = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let io = Self {
            input: Box::new(io::Cursor::new(input.as_bytes().to_vec())),
            output: Box::new(SharedBuffer(std::rc::Rc::clone(&stdout))),
            error: Box::new(SharedBuffer(std::rc::Rc::clone(&stderr))),
        };
        (io, stdout, stderr)
    }
}

trait IntoBufRead {
    fn into_bufread(self) -> Box<dyn BufRead>;
}

impl IntoBufRead for Box<io::Empty> {
    fn into_bufread(self) -> Box<dyn BufRead> {
        Box::new(io::BufReader::new(*self))
    }
}

/// A `Write` sink that appends into a shared `Vec<u8>`, letting a test hold
/// onto the `Rc` after handing the other end to `HostIo`.
struct SharedBuffer(std::rc::Rc<std::cell::RefCell<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
