//! Buffered stream over an owned file descriptor.
//!
//! `Stream` amortizes syscall overhead through one fixed-capacity buffer
//! shared by the read and write paths. Four responsibilities operate on
//! that buffer: lifecycle (open/close), the refill read path, the
//! drain-with-retry write path, and position control (seek/tell).
//!
//! The last-operation tag governs which discipline owns the buffer:
//!
//! ```text
//! {None} --read_byte--> {Read}  --flush or seek--> {None}
//! {None} --write_byte-> {Write} --flush or seek--> {None}
//! ```
//!
//! A direct Read↔Write transition without an intervening flush or seek is
//! rejected with [`StreamError::ModeSwitch`] rather than silently
//! corrupting data.
//!
//! Two sticky flags distinguish "no more data" from "operation failed".
//! Once set, neither is cleared by later successful operations — only a
//! fresh open yields a clean stream.

use std::path::Path;

use log::{debug, trace};

use fdbuf_core::buffer::{BUFSIZE, LastOp, StreamBuffer};
use fdbuf_core::error::{OpenError, StreamError};
use fdbuf_core::mode::{OpenFlags, Whence, parse_mode};

use crate::fd::FileFd;

/// The seam between a stream and the operating system.
///
/// [`FileFd`] is the production implementation; tests substitute scripted
/// in-memory fakes to count syscalls and inject short writes and failures
/// deterministically.
pub trait Descriptor {
    /// Read up to `buf.len()` bytes. `Ok(0)` means end of stream.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, i32>;
    /// Write some prefix of `buf`; may accept fewer bytes than offered.
    fn write(&mut self, buf: &[u8]) -> Result<usize, i32>;
    /// Reposition; returns the resulting absolute offset.
    fn seek(&mut self, offset: i64, whence: Whence) -> Result<i64, i32>;
    /// Release the descriptor. Called at most once per stream.
    fn close(&mut self) -> Result<(), i32>;
    /// Native descriptor id, for interop and inspection only.
    fn raw_fd(&self) -> i32;
}

/// A buffered stream owning a descriptor and one fixed-capacity buffer.
///
/// Not synchronized: concurrent use from multiple threads requires
/// external mutual exclusion. Every descriptor-touching operation blocks
/// until the underlying syscall completes.
#[derive(Debug)]
pub struct Stream<D: Descriptor = FileFd> {
    desc: D,
    buf: StreamBuffer,
    flags: OpenFlags,
    /// Logical file offset of buffer position 0. Updated on refill,
    /// flush, and seek.
    base: i64,
    eof: bool,
    err: bool,
    closed: bool,
}

impl Stream<FileFd> {
    /// Open `path` with one of the six canonical mode tokens
    /// (`r`, `r+`, `w`, `w+`, `a`, `a+`).
    ///
    /// The token is validated before any syscall; newly created files get
    /// mode `0644`. The returned stream has an empty buffer, cursor 0,
    /// and both sticky flags clear.
    pub fn open(path: impl AsRef<Path>, mode: &str) -> Result<Self, OpenError> {
        let path = path.as_ref();
        let flags = parse_mode(mode).ok_or_else(|| OpenError::InvalidMode(mode.to_string()))?;
        let desc = FileFd::open(path, &flags)?;
        debug!("opened {} (mode {mode}, fd {})", path.display(), desc.raw());
        Ok(Stream::from_descriptor(desc, flags, BUFSIZE))
    }
}

impl<D: Descriptor> Stream<D> {
    /// Wrap an already-acquired descriptor.
    ///
    /// The stream takes exclusive ownership: no other code path may close
    /// the descriptor while the stream lives.
    pub fn from_descriptor(desc: D, flags: OpenFlags, capacity: usize) -> Self {
        Stream {
            desc,
            buf: StreamBuffer::new(capacity),
            flags,
            base: 0,
            eof: false,
            err: false,
            closed: false,
        }
    }

    /// Native descriptor id, for interop and inspection only.
    pub fn fileno(&self) -> i32 {
        self.desc.raw_fd()
    }

    /// True once a refill has returned zero bytes. Sticky.
    pub fn is_eof(&self) -> bool {
        self.eof
    }

    /// True once any syscall has failed. Sticky.
    pub fn has_error(&self) -> bool {
        self.err
    }

    /// Logical position: base offset plus cursor. Pure computation over
    /// in-memory state; never fails.
    pub fn tell(&self) -> i64 {
        self.base + self.buf.cursor() as i64
    }

    /// Reconcile the buffer with the descriptor.
    ///
    /// Write discipline: drain every pending byte, retrying partial
    /// writes. Read discipline: discard the prefetched bytes and advance
    /// the base past them, so the next read refetches from the
    /// descriptor's true position — no write syscall is issued.
    pub fn flush(&mut self) -> Result<(), StreamError> {
        match self.buf.last_op() {
            LastOp::Write => self.drain(),
            _ => {
                self.base += self.buf.filled() as i64;
                self.buf.reset();
                Ok(())
            }
        }
    }

    /// Drain pending write bytes to the descriptor, retrying with the
    /// unwritten suffix after every partial acceptance.
    ///
    /// Bytes accepted before a failure are persisted and stay persisted
    /// (no rollback); the unwritten suffix stays buffered for a later
    /// retry.
    fn drain(&mut self) -> Result<(), StreamError> {
        while !self.buf.pending().is_empty() {
            match self.desc.write(self.buf.pending()) {
                Ok(0) => {
                    // A descriptor accepting zero bytes forever would
                    // spin this loop; surface it as an I/O failure.
                    self.err = true;
                    return Err(StreamError::Io { errno: libc::EIO });
                }
                Ok(n) => {
                    trace!("drained {n} of {} pending bytes", self.buf.cursor());
                    self.buf.consume_pending(n);
                    self.base += n as i64;
                }
                Err(errno) => {
                    self.err = true;
                    return Err(StreamError::Io { errno });
                }
            }
        }
        self.buf.reset();
        Ok(())
    }

    /// Refill the buffer from the descriptor.
    ///
    /// Buffer position 0 comes to correspond to the descriptor's current
    /// offset, which is `filled` bytes past the previous base.
    fn refill(&mut self) -> Result<(), StreamError> {
        let consumed = self.buf.filled() as i64;
        match self.desc.read(self.buf.refill_space()) {
            Ok(0) => {
                self.eof = true;
                Err(StreamError::EndOfStream)
            }
            Ok(n) => {
                trace!("refilled {n} bytes");
                self.base += consumed;
                self.buf.mark_refilled(n);
                Ok(())
            }
            Err(errno) => {
                self.err = true;
                Err(StreamError::Io { errno })
            }
        }
    }

    /// Reposition the descriptor.
    ///
    /// Flushes first — mandatorily: pending writes must be persisted and
    /// prefetched reads discarded before the offset moves. On success the
    /// lseek result becomes the new base; on failure the error flag is
    /// set and the base is left unchanged.
    pub fn seek(&mut self, offset: i64, whence: Whence) -> Result<(), StreamError> {
        self.flush()?;
        match self.desc.seek(offset, whence) {
            Ok(abs) => {
                trace!("seeked to {abs}");
                self.base = abs;
                Ok(())
            }
            Err(errno) => {
                self.err = true;
                Err(StreamError::Io { errno })
            }
        }
    }

    /// Read one byte, refilling the buffer on demand.
    ///
    /// A zero-byte refill sets the sticky eof flag and yields
    /// [`StreamError::EndOfStream`]; once eof is set, no further syscall
    /// is issued. A failing refill sets the sticky error flag.
    pub fn read_byte(&mut self) -> Result<u8, StreamError> {
        if !self.flags.readable {
            return Err(StreamError::NotReadable);
        }
        if self.buf.last_op() == LastOp::Write {
            return Err(StreamError::ModeSwitch);
        }
        if self.eof {
            return Err(StreamError::EndOfStream);
        }
        if self.buf.readable() == 0 {
            self.refill()?;
        }
        // A successful refill guarantees at least one byte.
        self.buf.take_byte().ok_or(StreamError::EndOfStream)
    }

    /// Buffer one byte, draining first if the buffer is full.
    ///
    /// A drain failure propagates without storing the byte. No syscall is
    /// issued unless the buffer was full.
    pub fn write_byte(&mut self, byte: u8) -> Result<(), StreamError> {
        if !self.flags.writable {
            return Err(StreamError::NotWritable);
        }
        if self.buf.last_op() == LastOp::Read {
            return Err(StreamError::ModeSwitch);
        }
        if self.buf.is_full() {
            self.drain()?;
        }
        let staged = self.buf.stage_byte(byte);
        debug_assert!(staged);
        Ok(())
    }

    /// Read `count` elements of `size` bytes each into `dest`.
    ///
    /// Returns `count` on full success. If end-of-stream or an I/O error
    /// interrupts the loop, that sentinel is returned and the bytes
    /// already placed in `dest` remain there — callers must not assume
    /// the destination is untouched on failure.
    pub fn read(&mut self, dest: &mut [u8], size: usize, count: usize) -> Result<usize, StreamError> {
        let total = size.checked_mul(count).ok_or(StreamError::SizeOverflow)?;
        if dest.len() < total {
            return Err(StreamError::ShortBuffer);
        }
        for slot in dest[..total].iter_mut() {
            *slot = self.read_byte()?;
        }
        Ok(count)
    }

    /// Write `count` elements of `size` bytes each from `src`.
    ///
    /// Returns `count` on full success; a failure mid-way leaves the
    /// bytes staged so far buffered or persisted, symmetric to [`read`].
    ///
    /// [`read`]: Stream::read
    pub fn write(&mut self, src: &[u8], size: usize, count: usize) -> Result<usize, StreamError> {
        let total = size.checked_mul(count).ok_or(StreamError::SizeOverflow)?;
        if src.len() < total {
            return Err(StreamError::ShortBuffer);
        }
        for &byte in &src[..total] {
            self.write_byte(byte)?;
        }
        Ok(count)
    }

    /// Flush and release the descriptor.
    ///
    /// Consuming `self` makes double-close unrepresentable. A flush
    /// failure is propagated but the descriptor is released regardless —
    /// no leak on the error path.
    pub fn close(mut self) -> Result<(), StreamError> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<(), StreamError> {
        self.closed = true;
        let fd = self.desc.raw_fd();
        let flushed = self.flush();
        let released = self.desc.close();
        debug!("closed fd {fd}");
        flushed?;
        released.map_err(|errno| StreamError::Io { errno })
    }
}

impl<D: Descriptor> Drop for Stream<D> {
    /// Best-effort flush-and-release for streams never explicitly closed,
    /// so buffered writes are not silently lost. Failures here are logged
    /// and swallowed; callers that must observe flush errors call
    /// [`Stream::close`].
    fn drop(&mut self) {
        if !self.closed {
            if let Err(e) = self.shutdown() {
                debug!("flush on drop failed: {e}");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
