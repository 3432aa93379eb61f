//! Open-mode interpretation and seek origins.
//!
//! The six canonical fopen-style tokens map to fixed combinations of
//! access mode and creation/truncation/append behavior:
//!
//! ```text
//! token | access     | create | truncate | append
//! r     | read-only  | no     | no       | no
//! r+    | read-write | no     | no       | no
//! w     | write-only | yes    | yes      | no
//! w+    | read-write | yes    | yes      | no
//! a     | write-only | yes    | no       | yes
//! a+    | read-write | yes    | no       | yes
//! ```
//!
//! The token set is closed: anything else is rejected before a syscall
//! is attempted.

/// File open mode flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpenFlags {
    pub readable: bool,
    pub writable: bool,
    pub create: bool,
    pub truncate: bool,
    pub append: bool,
}

/// Parse one of the six canonical mode tokens.
///
/// Returns `None` for anything else, including modifier spellings like
/// `"rb"` that C stdio would accept.
pub fn parse_mode(mode: &str) -> Option<OpenFlags> {
    let flags = match mode {
        "r" => OpenFlags {
            readable: true,
            ..Default::default()
        },
        "r+" => OpenFlags {
            readable: true,
            writable: true,
            ..Default::default()
        },
        "w" => OpenFlags {
            writable: true,
            create: true,
            truncate: true,
            ..Default::default()
        },
        "w+" => OpenFlags {
            readable: true,
            writable: true,
            create: true,
            truncate: true,
            ..Default::default()
        },
        "a" => OpenFlags {
            writable: true,
            create: true,
            append: true,
            ..Default::default()
        },
        "a+" => OpenFlags {
            readable: true,
            writable: true,
            create: true,
            append: true,
            ..Default::default()
        },
        _ => return None,
    };
    Some(flags)
}

/// Convert open flags to POSIX O_* flag bits.
pub fn flags_to_oflags(flags: &OpenFlags) -> i32 {
    let mut oflags = 0i32;

    if flags.readable && flags.writable {
        oflags |= 2; // O_RDWR
    } else if flags.writable {
        oflags |= 1; // O_WRONLY
    }
    // O_RDONLY is 0, so readable-only needs no flag.

    if flags.create {
        oflags |= 0o100; // O_CREAT
    }
    if flags.truncate {
        oflags |= 0o1000; // O_TRUNC
    }
    if flags.append {
        oflags |= 0o2000; // O_APPEND
    }

    oflags
}

/// Seek origin, matching POSIX `SEEK_SET`/`SEEK_CUR`/`SEEK_END`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Whence {
    Start,
    Current,
    End,
}

impl Whence {
    /// POSIX integer value.
    pub fn as_raw(self) -> i32 {
        match self {
            Whence::Start => 0,   // SEEK_SET
            Whence::Current => 1, // SEEK_CUR
            Whence::End => 2,     // SEEK_END
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
