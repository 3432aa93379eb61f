//! # fdbuf
//!
//! User-space buffered I/O over raw file descriptors: stream-style
//! open/read/write/seek/flush/close with one fixed-size internal buffer
//! per stream to amortize syscall overhead.
//!
//! Single caller, single file, single-threaded: nothing here is
//! synchronized, every operation may block for the duration of its
//! syscall, and a stream exclusively owns its descriptor until close
//! or drop.
//!
//! ```
//! use fdbuf::Stream;
//!
//! let path = std::env::temp_dir().join("fdbuf-doc-example");
//! let mut out = Stream::open(&path, "w")?;
//! out.write(b"hello fd", 1, 8)?;
//! out.close()?;
//!
//! let mut inp = Stream::open(&path, "r")?;
//! let mut buf = [0u8; 8];
//! inp.read(&mut buf, 1, 8)?;
//! assert_eq!(&buf, b"hello fd");
//! # std::fs::remove_file(&path).ok();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Dropping a stream flushes buffered writes best-effort; call
//! [`Stream::close`] to observe flush failures.

#![deny(unsafe_code)]

#[allow(unsafe_code)]
pub mod fd;
pub mod stream;

pub use fdbuf_core::{BUFSIZE, OpenError, OpenFlags, StreamError, Whence};

pub use crate::fd::FileFd;
pub use crate::stream::{Descriptor, Stream};
