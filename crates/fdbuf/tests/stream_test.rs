//! Integration test: buffered streams over real files.
//!
//! Exercises the full open/write/seek/read/close lifecycle against the
//! filesystem, with durability checked by independent reads of the
//! target file after close.
//!
//! Run: cargo test -p fdbuf --test stream_test

use fdbuf::{BUFSIZE, OpenError, Stream, StreamError, Whence};
use tempfile::TempDir;

fn scratch() -> TempDir {
    tempfile::tempdir().expect("create temp dir")
}

fn pattern(n: usize) -> Vec<u8> {
    (0..n).map(|i| (i * 31 + 7) as u8).collect()
}

// -------------------------------------------------------------------------
// Round trips
// -------------------------------------------------------------------------

#[test]
fn round_trip_across_buffer_multiples() {
    let dir = scratch();
    for n in [0, 1, 63, BUFSIZE - 1, BUFSIZE, BUFSIZE + 1, 3 * BUFSIZE + 17] {
        let path = dir.path().join(format!("rt-{n}"));
        let data = pattern(n);

        let mut out = Stream::open(&path, "w").expect("open for write");
        assert_eq!(out.write(&data, 1, n).expect("write"), n);
        out.close().expect("close writer");

        let mut inp = Stream::open(&path, "r").expect("open for read");
        let mut back = vec![0u8; n];
        if n > 0 {
            assert_eq!(inp.read(&mut back, 1, n).expect("read"), n);
        }
        assert_eq!(back, data, "round trip of {n} bytes");
        assert_eq!(inp.read_byte(), Err(StreamError::EndOfStream));
        assert!(inp.is_eof());
        assert!(!inp.has_error());
        inp.close().expect("close reader");
    }
}

#[test]
fn element_granularity_round_trip() {
    let dir = scratch();
    let path = dir.path().join("elems");
    let records = pattern(96); // 12 records of 8 bytes

    let mut out = Stream::open(&path, "w").unwrap();
    assert_eq!(out.write(&records, 8, 12).unwrap(), 12);
    out.close().unwrap();

    let mut inp = Stream::open(&path, "r").unwrap();
    let mut back = vec![0u8; 96];
    assert_eq!(inp.read(&mut back, 8, 12).unwrap(), 12);
    assert_eq!(back, records);
}

// -------------------------------------------------------------------------
// Durability
// -------------------------------------------------------------------------

#[test]
fn overflow_persists_every_byte() {
    let dir = scratch();
    let path = dir.path().join("overflow");
    let data = pattern(BUFSIZE + 1);

    let mut out = Stream::open(&path, "w").unwrap();
    out.write(&data, 1, data.len()).unwrap();
    out.close().unwrap();

    // Independent verification, bypassing the buffering layer.
    assert_eq!(std::fs::read(&path).unwrap(), data);
}

#[test]
fn close_flushes_without_explicit_flush() {
    let dir = scratch();
    let path = dir.path().join("durable");

    let mut out = Stream::open(&path, "w").unwrap();
    out.write(b"buffered, never flushed", 1, 23).unwrap();
    out.close().unwrap();

    assert_eq!(std::fs::read(&path).unwrap(), b"buffered, never flushed");
}

#[test]
fn drop_without_close_does_not_lose_writes() {
    let dir = scratch();
    let path = dir.path().join("dropped");
    {
        let mut out = Stream::open(&path, "w").unwrap();
        out.write(b"dropped", 1, 7).unwrap();
    }
    assert_eq!(std::fs::read(&path).unwrap(), b"dropped");
}

// -------------------------------------------------------------------------
// Position control
// -------------------------------------------------------------------------

#[test]
fn seek_end_then_tell_reports_file_length() {
    let dir = scratch();
    let path = dir.path().join("seek-end");
    let k = 1000;

    let mut s = Stream::open(&path, "w").unwrap();
    s.write(&pattern(k), 1, k).unwrap();
    // Buffered writes must be persisted by the mandatory pre-seek flush.
    s.seek(0, Whence::End).unwrap();
    assert_eq!(s.tell(), k as i64);
    s.close().unwrap();
}

#[test]
fn seek_repositions_reads() {
    let dir = scratch();
    let path = dir.path().join("seek-read");
    let data = pattern(2 * BUFSIZE);
    std::fs::write(&path, &data).unwrap();

    let mut s = Stream::open(&path, "r").unwrap();
    assert_eq!(s.read_byte().unwrap(), data[0]);
    s.seek(BUFSIZE as i64 + 5, Whence::Start).unwrap();
    assert_eq!(s.tell(), BUFSIZE as i64 + 5);
    assert_eq!(s.read_byte().unwrap(), data[BUFSIZE + 5]);
    s.seek(-1, Whence::End).unwrap();
    assert_eq!(s.read_byte().unwrap(), data[2 * BUFSIZE - 1]);
}

#[test]
fn tell_counts_buffered_bytes() {
    let dir = scratch();
    let path = dir.path().join("tell");

    let mut s = Stream::open(&path, "w").unwrap();
    assert_eq!(s.tell(), 0);
    s.write(b"abc", 1, 3).unwrap();
    // Nothing drained yet; the cursor alone carries the position.
    assert_eq!(s.tell(), 3);
    s.flush().unwrap();
    assert_eq!(s.tell(), 3);
}

// -------------------------------------------------------------------------
// Mode semantics
// -------------------------------------------------------------------------

#[test]
fn write_mode_truncates_existing_file() {
    let dir = scratch();
    let path = dir.path().join("trunc");
    std::fs::write(&path, b"previous contents").unwrap();

    Stream::open(&path, "w").unwrap().close().unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), b"");
}

#[test]
fn read_update_mode_overwrites_in_place() {
    let dir = scratch();
    let path = dir.path().join("update");
    std::fs::write(&path, b"hello").unwrap();

    let mut s = Stream::open(&path, "r+").unwrap();
    s.write_byte(b'H').unwrap();
    s.close().unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), b"Hello");
}

#[test]
fn append_mode_writes_at_end() {
    let dir = scratch();
    let path = dir.path().join("append");
    std::fs::write(&path, b"ab").unwrap();

    let mut s = Stream::open(&path, "a").unwrap();
    s.write(b"cd", 1, 2).unwrap();
    s.close().unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), b"abcd");
}

#[test]
fn append_update_mode_reads_from_start() {
    let dir = scratch();
    let path = dir.path().join("append-update");
    std::fs::write(&path, b"ab").unwrap();

    let mut s = Stream::open(&path, "a+").unwrap();
    let mut two = [0u8; 2];
    s.read(&mut two, 1, 2).unwrap();
    assert_eq!(&two, b"ab");
}

#[test]
fn read_mode_requires_existing_file() {
    let dir = scratch();
    let err = Stream::open(dir.path().join("absent"), "r").unwrap_err();
    // ENOENT
    assert_eq!(err, OpenError::Open { errno: 2 });
}

#[test]
fn unrecognized_mode_tokens_fail_before_any_syscall() {
    let dir = scratch();
    let path = dir.path().join("never-created");
    for bad in ["rw", "rb", "", "x"] {
        let err = Stream::open(&path, bad).unwrap_err();
        assert!(matches!(err, OpenError::InvalidMode(_)), "token {bad:?}");
    }
    // A rejected "w"-like token must not have created the file.
    assert!(!path.exists());
}

#[test]
fn interior_nul_in_path_is_rejected() {
    let err = Stream::open("bad\0path", "r").unwrap_err();
    assert_eq!(err, OpenError::InvalidPath);
}

// -------------------------------------------------------------------------
// Interop
// -------------------------------------------------------------------------

#[test]
fn fileno_exposes_a_real_descriptor() {
    let dir = scratch();
    let path = dir.path().join("fileno");
    let s = Stream::open(&path, "w").unwrap();
    // A freshly opened file lands past the three standard descriptors.
    assert!(s.fileno() > 2);
}
