//! The error taxonomy for the loader.
//!
//! Only [`Error::OutOfMemory`], [`Error::WrongRoot`] and [`Error::NoDebug`]
//! ever escape the crate as an `Err`. Every other recoverable condition
//! (`UNSUPPORTED_TAG`, `MALFORMED_EXPRESSION`, `DANGLING_REFERENCE`) is
//! recovered locally: a diagnostic is logged through [`crate::diagnostics`]
//! and the caller gets a best-effort value (void type, `MAX_U64`, a skipped
//! subtree) instead of a `Result::Err`.

use std::fmt;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type returned by the loader's public entry points.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A node or side-record allocation failed. The partially built subtree
    /// has already been unwound by the caller before this is returned.
    #[error("allocation failed while building the CU model")]
    OutOfMemory,

    /// A compilation unit's top DIE was not `DW_TAG_compile_unit`.
    #[error("compilation unit at offset {offset:#x} did not start with DW_TAG_compile_unit (found {found})")]
    WrongRoot {
        /// Byte offset of the CU header.
        offset: u64,
        /// The tag that was found instead, for diagnostics.
        found: String,
    },

    /// The object file has no DWARF debug sections at all.
    #[error("no DWARF debug information present in {path}")]
    NoDebug {
        /// Path of the file that was opened.
        path: String,
    },

    /// Wraps a failure to open or parse the underlying object file. This is
    /// file-driver glue; the core parse/recode/size-cache passes never
    /// produce this variant.
    #[error("failed to read object file: {0}")]
    Object(#[from] object::Error),

    /// Wraps a failure from the real DWARF provider backend. Like
    /// [`Error::Object`], this only originates in `provider::gimli_backend`.
    #[error("failed to read DWARF data: {0}")]
    Dwarf(#[from] gimli::Error),

    /// Wraps an I/O failure opening the input file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Non-fatal conditions that are recovered locally rather than propagated.
/// These never flow through [`Error`]; they exist only so call sites can
/// format a consistent diagnostic message through [`crate::diagnostics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Diagnostic<'a> {
    /// `UNSUPPORTED_TAG`: an unrecognized or unsupported DW_TAG was seen.
    UnsupportedTag(&'a str),
    /// `MALFORMED_EXPRESSION`: an unhandled DW_OP opcode in a location or
    /// offset expression.
    MalformedExpression(u64),
    /// `DANGLING_REFERENCE`: recode could not find a referenced DIE.
    DanglingReference {
        /// The DIE offset that made the reference.
        from: u64,
        /// The raw DWARF offset that could not be resolved.
        to: u64,
        /// What kind of reference this was, for the log line.
        kind: &'a str,
    },
}

impl fmt::Display for Diagnostic<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnsupportedTag(tag) => write!(f, "unsupported tag: {tag}"),
            Diagnostic::MalformedExpression(opcode) => {
                write!(f, "unhandled DW_OP opcode {opcode:#x} in expression")
            }
            Diagnostic::DanglingReference { from, to, kind } => write!(
                f,
                "dangling {kind} reference: @{from:#x} points to missing @{to:#x}"
            ),
        }
    }
}
