//! File-descriptor syscall veneer.
//!
//! Typed wrappers over the libc open/read/write/lseek/close calls,
//! returning `Result<_, errno>`. This is the only module in the crate
//! permitted to use unsafe code; everything above it operates on the
//! safe [`Descriptor`] seam.

use std::ffi::CString;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use fdbuf_core::error::OpenError;
use fdbuf_core::mode::{OpenFlags, Whence, flags_to_oflags};

use crate::stream::Descriptor;

/// Creation mode for newly created files: `rw-r--r--`.
const CREATE_MODE: libc::c_uint = 0o644;

/// Errno of the syscall that just failed, defaulting to EIO when the
/// host reports none.
fn last_errno() -> i32 {
    std::io::Error::last_os_error()
        .raw_os_error()
        .unwrap_or(libc::EIO)
}

/// An owned raw file descriptor.
///
/// Released exactly once: by [`Descriptor::close`] or, failing that, on
/// drop. No other code path may close the wrapped fd.
#[derive(Debug)]
pub struct FileFd {
    fd: i32,
}

impl FileFd {
    /// `open(2)` the path with the flag bits derived from `flags`.
    pub fn open(path: &Path, flags: &OpenFlags) -> Result<FileFd, OpenError> {
        let cpath =
            CString::new(path.as_os_str().as_bytes()).map_err(|_| OpenError::InvalidPath)?;
        // SAFETY: cpath is a valid NUL-terminated string for the duration
        // of the call.
        let fd = unsafe { libc::open(cpath.as_ptr(), flags_to_oflags(flags), CREATE_MODE) };
        if fd < 0 {
            return Err(OpenError::Open {
                errno: last_errno(),
            });
        }
        Ok(FileFd { fd })
    }

    /// The wrapped descriptor id.
    pub fn raw(&self) -> i32 {
        self.fd
    }
}

impl Descriptor for FileFd {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, i32> {
        // SAFETY: buf is a valid writable region of buf.len() bytes.
        let n = unsafe { libc::read(self.fd, buf.as_mut_ptr().cast(), buf.len()) };
        if n < 0 { Err(last_errno()) } else { Ok(n as usize) }
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize, i32> {
        // SAFETY: buf is a valid readable region of buf.len() bytes.
        let n = unsafe { libc::write(self.fd, buf.as_ptr().cast(), buf.len()) };
        if n < 0 { Err(last_errno()) } else { Ok(n as usize) }
    }

    fn seek(&mut self, offset: i64, whence: Whence) -> Result<i64, i32> {
        // SAFETY: lseek is safe on any fd value (bad fd returns EBADF).
        let off = unsafe { libc::lseek(self.fd, offset as libc::off_t, whence.as_raw()) };
        if off < 0 { Err(last_errno()) } else { Ok(off as i64) }
    }

    fn close(&mut self) -> Result<(), i32> {
        if self.fd < 0 {
            return Ok(());
        }
        // SAFETY: fd is owned and still open; ownership ends here whether
        // or not the kernel reports an error.
        let rc = unsafe { libc::close(self.fd) };
        self.fd = -1;
        if rc < 0 { Err(last_errno()) } else { Ok(()) }
    }

    fn raw_fd(&self) -> i32 {
        self.fd
    }
}

impl Drop for FileFd {
    fn drop(&mut self) {
        if self.fd >= 0 {
            // SAFETY: fd is owned and still open.
            let _ = unsafe { libc::close(self.fd) };
        }
    }
}
