//! Directory-listing buffer decoding.
//!
//! `FileSystem::read_dir` fills a scratch buffer with names packed back to
//! back, each followed by a NUL byte, and returns the number of bytes used:
//!
//! ```text
//! a.txt\0b.txt\0sub\0
//! ```
//!
//! The decoder walks that prefix, advancing by `strlen + 1` per entry until
//! the declared length is used up.

/// Framing problems in a listing buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ListingError {
    #[error("entry at offset {offset} is not NUL-terminated")]
    Unterminated { offset: usize },
    #[error("entry at offset {offset} is not valid UTF-8")]
    InvalidName { offset: usize },
    #[error("driver reported {declared} bytes but buffer holds {capacity}")]
    Overrun { declared: usize, capacity: usize },
}

/// Iterator over the names in a listing buffer.
///
/// Yields `Err` at most once, after which it is exhausted.
pub struct Listing<'a> {
    rest: &'a [u8],
    offset: usize,
    error: Option<ListingError>,
}

/// Decode the first `len` bytes of `buf` as a listing.
pub fn entries(buf: &[u8], len: usize) -> Listing<'_> {
    if len > buf.len() {
        return Listing {
            rest: &[],
            offset: 0,
            error: Some(ListingError::Overrun {
                declared: len,
                capacity: buf.len(),
            }),
        };
    }
    Listing {
        rest: &buf[..len],
        offset: 0,
        error: None,
    }
}

impl<'a> Iterator for Listing<'a> {
    type Item = Result<&'a str, ListingError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(err) = self.error.take() {
            return Some(Err(err));
        }
        if self.rest.is_empty() {
            return None;
        }

        let offset = self.offset;
        let Some(nul) = self.rest.iter().position(|&b| b == 0) else {
            self.rest = &[];
            return Some(Err(ListingError::Unterminated { offset }));
        };

        let name = &self.rest[..nul];
        self.rest = &self.rest[nul + 1..];
        self.offset += nul + 1;

        match core::str::from_utf8(name) {
            Ok(s) => Some(Ok(s)),
            Err(_) => {
                self.rest = &[];
                Some(Err(ListingError::InvalidName { offset }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn names(buf: &[u8]) -> Vec<Result<&str, ListingError>> {
        entries(buf, buf.len()).collect()
    }

    fn clean(buf: &[u8], len: usize) -> Vec<&str> {
        entries(buf, len).collect::<Result<_, _>>().unwrap()
    }

    #[test]
    fn two_entries() {
        let buf = b"a.txt\0b.txt\0";
        assert_eq!(buf.len(), 12);
        assert_eq!(clean(buf, 12), ["a.txt", "b.txt"]);
    }

    #[test]
    fn empty_listing() {
        assert!(names(b"").is_empty());
    }

    #[test]
    fn declared_length_limits_walk() {
        // Stale bytes past the declared length are never looked at.
        let buf = b"one\0two\0stale\0";
        assert_eq!(clean(buf, 8), ["one", "two"]);
    }

    #[test]
    fn empty_name_is_an_entry() {
        assert_eq!(clean(b"\0x\0", 3), ["", "x"]);
    }

    #[test]
    fn missing_final_nul() {
        assert_eq!(
            names(b"ok\0trunc"),
            [Ok("ok"), Err(ListingError::Unterminated { offset: 3 })]
        );
    }

    #[test]
    fn invalid_utf8_stops_decoding() {
        assert_eq!(
            names(b"a\0\xff\xfe\0b\0"),
            [Ok("a"), Err(ListingError::InvalidName { offset: 2 })]
        );
    }

    #[test]
    fn length_beyond_buffer() {
        let buf = [0u8; 4];
        let got: Vec<_> = entries(&buf, 10).collect();
        assert_eq!(
            got,
            [Err(ListingError::Overrun { declared: 10, capacity: 4 })]
        );
    }
}
