//! REPL-facing error wrapper.
//!
//! Parsing and evaluation both fail with the same [`crate::error::Error`]
//! value, but a REPL/CLI driver wants to know *which stage* failed before
//! deciding how to report it (a parse error means the line was malformed
//! and nothing ran; a runtime error means some of the line's side effects
//! may already have happened). `ReplError` carries that distinction
//! without inventing a second error payload type.
//!
//! A tree-walking interpreter only has two pipeline stages that can fail
//! this way — parse and runtime — so the enum stays a two-variant tag
//! rather than a wider pipeline-stage enum.

use std::fmt;

use crate::error::Error;

/// Error type for REPL/`Runner` execution, separating failures by pipeline
/// stage.
#[derive(Debug, Clone)]
pub enum ReplError {
    /// The source text itself was malformed; evaluation never started.
    Parse(Error),
    /// Parsing succeeded; evaluation raised or propagated this error.
    Runtime(Error),
}

impl ReplError {
    /// The underlying [`Error`], regardless of which stage raised it.
    #[must_use]
    pub fn into_inner(self) -> Error {
        match self {
            Self::Parse(e) | Self::Runtime(e) => e,
        }
    }

    #[must_use]
    pub fn inner(&self) -> &Error {
        match self {
            Self::Parse(e) | Self::Runtime(e) => e,
        }
    }
}

impl fmt::Display for ReplError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(error) => write!(f, "parse error: {error}"),
            Self::Runtime(error) => write!(f, "{error}"),
        }
    }
}

impl std::error::Error for ReplError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorId;

    #[test]
    fn display_tags_the_failing_stage() {
        let err = ReplError::Parse(Error::invalid_operation("unterminated group"));
        assert!(err.to_string().starts_with("parse error:"));

        let err = ReplError::Runtime(Error::unbound_word("x"));
        assert_eq!(err.inner().id, ErrorId::UnboundWord);
    }
}
