//! Fixed-capacity buffer engine.
//!
//! One buffer per stream, allocated once and reused in place. The cursor
//! and valid length share the storage between two disciplines:
//!
//! - read: `data[pos..filled]` holds bytes fetched from the descriptor but
//!   not yet delivered to the caller,
//! - write: `data[..pos]` holds bytes staged by the caller but not yet
//!   persisted to the descriptor.
//!
//! The `last_op` tag records which discipline currently owns the buffer.
//! Switching disciplines requires passing through `LastOp::None` (a flush
//! or seek); the stream layer rejects direct Read↔Write transitions.
//!
//! Invariants: `pos <= capacity`, `filled <= capacity`, and under the read
//! discipline `pos <= filled`.

/// Default buffer capacity in bytes.
pub const BUFSIZE: usize = 4096;

/// Which discipline currently owns the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LastOp {
    /// Buffer is empty and unowned; either discipline may claim it.
    #[default]
    None,
    /// Read discipline: buffered bytes came from the descriptor.
    Read,
    /// Write discipline: buffered bytes are pending persistence.
    Write,
}

/// The shared stream buffer.
#[derive(Debug)]
pub struct StreamBuffer {
    data: Vec<u8>,
    /// Cursor: consume position (read) or staging position (write).
    pos: usize,
    /// Valid length: bytes available to consume under the read discipline.
    filled: usize,
    last_op: LastOp,
}

impl StreamBuffer {
    /// Create an empty buffer with the given capacity (minimum 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            data: vec![0u8; capacity.max(1)],
            pos: 0,
            filled: 0,
            last_op: LastOp::None,
        }
    }

    /// Buffer capacity.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Current cursor position.
    pub fn cursor(&self) -> usize {
        self.pos
    }

    /// Valid length (read discipline).
    pub fn filled(&self) -> usize {
        self.filled
    }

    /// Which discipline currently owns the buffer.
    pub fn last_op(&self) -> LastOp {
        self.last_op
    }

    // -----------------------------------------------------------------------
    // Read discipline
    // -----------------------------------------------------------------------

    /// Bytes available to consume without a refill.
    pub fn readable(&self) -> usize {
        self.filled.saturating_sub(self.pos)
    }

    /// Consume one byte. `None` when the buffer is exhausted.
    pub fn take_byte(&mut self) -> Option<u8> {
        debug_assert!(self.last_op != LastOp::Write);
        if self.pos < self.filled {
            let byte = self.data[self.pos];
            self.pos += 1;
            self.last_op = LastOp::Read;
            Some(byte)
        } else {
            None
        }
    }

    /// The whole buffer, as the destination for a refill.
    pub fn refill_space(&mut self) -> &mut [u8] {
        debug_assert!(self.last_op != LastOp::Write);
        &mut self.data
    }

    /// Record a refill of `n` bytes: cursor 0, valid length `n`.
    pub fn mark_refilled(&mut self, n: usize) {
        debug_assert!(n <= self.data.len());
        self.pos = 0;
        self.filled = n;
        self.last_op = LastOp::Read;
    }

    // -----------------------------------------------------------------------
    // Write discipline
    // -----------------------------------------------------------------------

    /// True when the write discipline has filled every slot.
    pub fn is_full(&self) -> bool {
        self.pos == self.data.len()
    }

    /// Stage one byte. Returns `false` when the buffer is full.
    pub fn stage_byte(&mut self, byte: u8) -> bool {
        debug_assert!(self.last_op != LastOp::Read);
        if self.pos == self.data.len() {
            return false;
        }
        self.data[self.pos] = byte;
        self.pos += 1;
        self.last_op = LastOp::Write;
        true
    }

    /// Staged bytes not yet persisted to the descriptor.
    pub fn pending(&self) -> &[u8] {
        &self.data[..self.pos]
    }

    /// Drop the first `n` pending bytes (accepted by a partial drain),
    /// keeping the unwritten suffix in place for retry.
    pub fn consume_pending(&mut self, n: usize) {
        debug_assert!(self.last_op == LastOp::Write);
        debug_assert!(n <= self.pos);
        self.data.copy_within(n..self.pos, 0);
        self.pos -= n;
    }

    // -----------------------------------------------------------------------
    // Shared
    // -----------------------------------------------------------------------

    /// Reset to the empty state: cursor 0, valid length 0, last op `None`.
    pub fn reset(&mut self) {
        self.pos = 0;
        self.filled = 0;
        self.last_op = LastOp::None;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
