//! Error types.
//!
//! All failure is representable as a returned value; nothing panics in the
//! non-test paths. `EndOfStream` and `Io` mirror the two sticky stream
//! flags; the remaining `StreamError` variants are caller contract
//! violations and deliberately set neither flag (the error flag records
//! failing syscalls only).

use thiserror::Error;

/// Failure to open a stream. No stream exists when these are returned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OpenError {
    /// The mode token is not one of `r`, `r+`, `w`, `w+`, `a`, `a+`.
    /// Rejected before any syscall is attempted.
    #[error("invalid mode token `{0}`")]
    InvalidMode(String),
    /// The path contains an interior NUL byte and cannot reach the kernel.
    #[error("path contains an interior NUL byte")]
    InvalidPath,
    /// The open syscall failed (permissions, missing path, fd limits, ...).
    #[error("open failed (errno {errno})")]
    Open { errno: i32 },
}

/// Failure of an operation on an open stream.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StreamError {
    /// The source returned zero bytes; the sticky eof flag is now set.
    #[error("end of stream")]
    EndOfStream,
    /// A syscall failed; the sticky error flag is now set.
    #[error("I/O error (errno {errno})")]
    Io { errno: i32 },
    /// Direct Read↔Write transition without an intervening flush or seek.
    #[error("read/write switch without an intervening flush or seek")]
    ModeSwitch,
    /// Read attempted on a stream opened without read access.
    #[error("stream is not open for reading")]
    NotReadable,
    /// Write attempted on a stream opened without write access.
    #[error("stream is not open for writing")]
    NotWritable,
    /// `element_size * count` overflows.
    #[error("element size * count overflows")]
    SizeOverflow,
    /// The caller's buffer is smaller than `element_size * count`.
    #[error("caller buffer is smaller than element size * count")]
    ShortBuffer,
}
