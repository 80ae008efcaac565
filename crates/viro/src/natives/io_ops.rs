//! Port I/O natives.
//!
//! `open` recognises two schemes deep enough to exercise the full
//! open/read/write/wait/close cycle without a real network/file driver
//! — `console://` wraps the host's stdout, anything else opens an
//! in-memory buffer, standing in for external port drivers left as
//! plug-ins.
//!
//! Generalizes the host-hook plumbing the REPL's own print stream uses
//! into first-class `Port` values natives can open/read/write/close.

use std::{cell::RefCell, rc::Rc};

use crate::{
    error::Error,
    frame::{FrameId, FrameRegistry},
    function::ParamSpec,
    native::{NativeFn, register_native},
    port::{ConsolePort, MemoryPort, Port},
    value::Value,
};

pub fn register(registry: &mut FrameRegistry, root: FrameId) -> Result<(), Error> {
    register_native(registry, root, "open", vec![ParamSpec::positional("spec")], native_open())?;
    register_native(registry, root, "read", vec![ParamSpec::positional("port")], native_read())?;
    register_native(registry, root, "write", vec![ParamSpec::positional("port"), ParamSpec::positional("value")], native_write())?;
    register_native(registry, root, "wait", vec![ParamSpec::positional("port")], native_wait())?;
    register_native(registry, root, "close", vec![ParamSpec::positional("port")], native_close())?;
    Ok(())
}

fn require_port(v: &Value, op: &str) -> Result<Rc<RefCell<Port>>, Error> {
    match v {
        Value::Port(p) => Ok(Rc::clone(p)),
        other => Err(Error::type_mismatch(op, "port", &other.tag().to_string())),
    }
}

fn spec_text(v: &Value, op: &str) -> Result<String, Error> {
    v.as_string().map(|s| s.snapshot().into_iter().collect()).ok_or_else(|| Error::type_mismatch(op, "string", &v.tag().to_string()))
}

/// Splits `scheme://rest` into its scheme name, defaulting to `memory` for
/// a bare path with no `://`.
fn scheme_of(spec: &str) -> &str {
    spec.split("://").next().unwrap_or(spec)
}

fn native_open() -> NativeFn {
    Rc::new(|args, _refs, _eval| {
        let spec = spec_text(&args[0], "open")?;
        let scheme = scheme_of(&spec).to_owned();
        let port = match scheme.as_str() {
            "console" => Port::new(scheme, Box::new(ConsolePort::default())),
            _ => Port::new(scheme, Box::new(MemoryPort::new())),
        };
        Ok(Value::Port(Rc::new(RefCell::new(port))))
    })
}

/// Reads whatever is currently buffered, up to a fixed chunk size — ports
/// in this representative library are either write-only (`console://`) or
/// small in-memory buffers (`memory://`), so an unbounded streaming read
/// API is unneeded.
const READ_CHUNK: usize = 64 * 1024;

fn native_read() -> NativeFn {
    Rc::new(|args, _refs, _eval| {
        let port = require_port(&args[0], "read")?;
        let mut buf = vec![0u8; READ_CHUNK];
        let n = port.borrow_mut().read(&mut buf)?;
        buf.truncate(n);
        Ok(Value::binary(buf))
    })
}

fn native_write() -> NativeFn {
    Rc::new(|args, _refs, _eval| {
        let port = require_port(&args[0], "write")?;
        let bytes = match &args[1] {
            Value::Binary(b) => b.snapshot(),
            Value::String(s) => s.snapshot().into_iter().collect::<String>().into_bytes(),
            other => other.form().into_bytes(),
        };
        let n = port.borrow_mut().write(&bytes)?;
        Ok(Value::Integer(n as i64))
    })
}

fn native_wait() -> NativeFn {
    Rc::new(|args, _refs, _eval| {
        let port = require_port(&args[0], "wait")?;
        port.borrow().wait()?;
        Ok(Value::None)
    })
}

fn native_close() -> NativeFn {
    Rc::new(|args, _refs, _eval| {
        let port = require_port(&args[0], "close")?;
        port.borrow_mut().close()?;
        Ok(Value::None)
    })
}
