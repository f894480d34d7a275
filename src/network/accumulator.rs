//! Bounded response accumulator
//!
//! Response bodies arrive as chunks of arbitrary size. [`ResponseBuffer`]
//! keeps at most `capacity - 1` bytes of them. In skip mode it discards
//! everything before a marker, holding no more than `marker.len() - 1`
//! bytes while it scans, so a long page head never competes with the
//! results for space.

use crate::search::SearchError;
use std::borrow::Cow;

/// Fill discipline of a [`ResponseBuffer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillMode {
    /// Drop bytes until the marker is seen, then record from the marker on
    SkipUntil(&'static str),
    /// Record from the first byte
    Record,
}

/// Current phase of the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Skipping,
    Recording,
}

/// Fixed-capacity byte buffer fed one chunk at a time.
///
/// Bytes that do not fit are dropped silently: callers only need the head
/// of the useful content.
#[derive(Debug)]
pub struct ResponseBuffer {
    data: Vec<u8>,
    capacity: usize,
    marker: &'static [u8],
    phase: Phase,
}

impl ResponseBuffer {
    /// Allocate a buffer of `capacity` bytes.
    ///
    /// The allocation is fallible; failure is reported as
    /// [`SearchError::OutOfMemory`] rather than aborting.
    pub fn with_capacity(capacity: usize, mode: FillMode) -> Result<Self, SearchError> {
        let (marker, phase) = match mode {
            FillMode::SkipUntil(marker) => (marker.as_bytes(), Phase::Skipping),
            FillMode::Record => (&[][..], Phase::Recording),
        };
        // the scan needs room for a retained tail plus at least one new byte
        let capacity = capacity.max(marker.len() + 2);

        let mut data = Vec::new();
        data.try_reserve_exact(capacity)
            .map_err(|_| SearchError::OutOfMemory)?;

        Ok(Self {
            data,
            capacity,
            marker,
            phase,
        })
    }

    /// Bytes that can still be appended before input is dropped
    pub fn remaining(&self) -> usize {
        self.capacity - 1 - self.data.len()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Buffer contents as text; a multi-byte sequence cut by truncation is
    /// replaced, never rejected.
    pub fn as_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.data)
    }

    /// Accept the next inbound chunk.
    pub fn feed(&mut self, chunk: &[u8]) {
        let mut rest = chunk;

        while self.phase == Phase::Skipping && !rest.is_empty() {
            let take = rest.len().min(self.remaining());
            self.data.extend_from_slice(&rest[..take]);
            rest = &rest[take..];

            match find(&self.data, self.marker) {
                Some(offset) => {
                    self.data.drain(..offset);
                    self.phase = Phase::Recording;
                }
                None => {
                    // a marker split across chunks still ends in this tail
                    let keep = self.marker.len() - 1;
                    if self.data.len() > keep {
                        let cut = self.data.len() - keep;
                        self.data.drain(..cut);
                    }
                }
            }
        }

        if self.phase == Phase::Recording {
            let take = rest.len().min(self.remaining());
            self.data.extend_from_slice(&rest[..take]);
        }
    }

    /// Discard everything up to and including the first `delimiter`.
    ///
    /// Returns `false` and leaves the buffer untouched when the delimiter is
    /// absent.
    pub fn discard_through(&mut self, delimiter: &[u8]) -> bool {
        match find(&self.data, delimiter) {
            Some(offset) => {
                self.data.drain(..offset + delimiter.len());
                true
            }
            None => false,
        }
    }

    /// Decode a `Transfer-Encoding: chunked` body in place.
    ///
    /// Stops at the terminating zero-size chunk, at a malformed size line, or
    /// where truncation cut the body short; whatever was decoded up to there
    /// is kept.
    pub fn decode_chunked(&mut self) {
        let data = &mut self.data;
        let mut read = 0;
        let mut write = 0;

        while let Some(eol) = find(&data[read..], b"\r\n").map(|p| read + p) {
            let line = String::from_utf8_lossy(&data[read..eol]);
            let digits = line.split(';').next().unwrap_or_default().trim();
            let Ok(size) = usize::from_str_radix(digits, 16) else {
                break;
            };
            read = eol + 2;
            if size == 0 {
                break;
            }

            let take = size.min(data.len() - read);
            data.copy_within(read..read + take, write);
            write += take;
            read += take;
            if take < size || read + 2 > data.len() {
                break;
            }
            read += 2;
        }

        data.truncate(write);
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARKER: &str = "class=\"results\"";

    fn skipping(capacity: usize) -> ResponseBuffer {
        ResponseBuffer::with_capacity(capacity, FillMode::SkipUntil(MARKER)).unwrap()
    }

    #[test]
    fn test_record_mode_truncates_at_capacity() {
        let mut buf = ResponseBuffer::with_capacity(8, FillMode::Record).unwrap();
        assert_eq!(buf.remaining(), 7);

        buf.feed(b"abcd");
        buf.feed(b"efghij");
        assert_eq!(buf.as_bytes(), b"abcdefg");
        assert_eq!(buf.remaining(), 0);

        buf.feed(b"more");
        assert_eq!(buf.as_bytes(), b"abcdefg");
    }

    #[test]
    fn test_marker_in_single_chunk() {
        let mut buf = skipping(256);
        buf.feed(b"<html><head>junk</head><div class=\"results\">one</div>");

        assert_eq!(buf.phase(), Phase::Recording);
        assert_eq!(buf.as_text(), "class=\"results\">one</div>");
    }

    #[test]
    fn test_marker_split_at_every_point() {
        let head = "<html>".repeat(40);
        let tail = ">first result<div>second</div>";
        let body = format!("{head}<div {MARKER}{tail}");
        let marker_start = head.len() + "<div ".len();

        for split in marker_start..=marker_start + MARKER.len() {
            let mut buf = skipping(128);
            buf.feed(&body.as_bytes()[..split]);
            buf.feed(&body.as_bytes()[split..]);

            assert_eq!(buf.phase(), Phase::Recording, "split at {split}");
            assert_eq!(buf.as_text(), format!("{MARKER}{tail}"), "split at {split}");
        }
    }

    #[test]
    fn test_marker_split_across_many_small_chunks() {
        let body = format!("{}{MARKER} payload", "x".repeat(1000));
        let mut buf = skipping(64);
        for piece in body.as_bytes().chunks(3) {
            buf.feed(piece);
        }
        assert_eq!(buf.as_text(), format!("{MARKER} payload"));
    }

    #[test]
    fn test_skip_phase_memory_is_bounded() {
        let capacity = 512;
        let junk: Vec<u8> = (0..capacity * 10).map(|i| b'a' + (i % 26) as u8).collect();

        for chunk_size in [1, 7, 100, 511, 512, 4096] {
            let mut buf = skipping(capacity);
            for piece in junk.chunks(chunk_size) {
                buf.feed(piece);
                assert_eq!(buf.phase(), Phase::Skipping);
                assert!(
                    buf.len() <= MARKER.len() - 1,
                    "chunk size {chunk_size} left {} bytes",
                    buf.len()
                );
            }
        }
    }

    #[test]
    fn test_oversized_chunk_does_not_hide_marker() {
        let capacity = 64;
        let body = format!("{}{MARKER}tail", "y".repeat(capacity * 10));
        let mut buf = skipping(capacity);
        buf.feed(body.as_bytes());

        assert_eq!(buf.phase(), Phase::Recording);
        assert_eq!(buf.as_text(), format!("{MARKER}tail"));
    }

    #[test]
    fn test_recording_after_marker_respects_capacity() {
        let mut buf = skipping(32);
        buf.feed(format!("head {MARKER}").as_bytes());
        buf.feed(&[b'z'; 100]);

        assert_eq!(buf.len(), 31);
        assert!(buf.as_bytes().starts_with(MARKER.as_bytes()));
    }

    #[test]
    fn test_discard_through() {
        let mut buf = ResponseBuffer::with_capacity(64, FillMode::Record).unwrap();
        buf.feed(b"HTTP/1.1 200 OK\r\nA: b\r\n\r\n{\"x\":1}");

        assert!(buf.discard_through(b"\r\n\r\n"));
        assert_eq!(buf.as_text(), "{\"x\":1}");
        assert!(!buf.discard_through(b"\r\n\r\n"));
        assert_eq!(buf.as_text(), "{\"x\":1}");
    }

    #[test]
    fn test_decode_chunked() {
        let mut buf = ResponseBuffer::with_capacity(128, FillMode::Record).unwrap();
        buf.feed(b"4\r\n{\"a\"\r\n6;ext=1\r\n:[1,2]\r\n1\r\n}\r\n0\r\n\r\n");
        buf.decode_chunked();
        assert_eq!(buf.as_text(), "{\"a\":[1,2]}");
    }

    #[test]
    fn test_decode_chunked_keeps_truncated_tail() {
        let mut buf = ResponseBuffer::with_capacity(128, FillMode::Record).unwrap();
        buf.feed(b"3\r\nabc\r\nA\r\ndefg");
        buf.decode_chunked();
        assert_eq!(buf.as_text(), "abcdefg");

        let mut garbled = ResponseBuffer::with_capacity(128, FillMode::Record).unwrap();
        garbled.feed(b"2\r\nok\r\nzz\r\nlost");
        garbled.decode_chunked();
        assert_eq!(garbled.as_text(), "ok");
    }

    #[test]
    fn test_tiny_capacity_is_raised_to_fit_marker() {
        let buf = skipping(4);
        assert!(buf.capacity() > MARKER.len());
    }
}
