//! # fdbuf-core
//!
//! The pure, platform-free half of fdbuf: the fixed-capacity buffer engine,
//! the six-token open-mode vocabulary, and the error types.
//!
//! Nothing in this crate touches a file descriptor. The `fdbuf` crate owns
//! the syscall boundary and drives this engine from its `Stream` type.

#![deny(unsafe_code)]

pub mod buffer;
pub mod error;
pub mod mode;

pub use buffer::{BUFSIZE, LastOp, StreamBuffer};
pub use error::{OpenError, StreamError};
pub use mode::{OpenFlags, Whence, flags_to_oflags, parse_mode};
