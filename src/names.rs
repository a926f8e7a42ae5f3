//! # Attribute name lists
//!
//! Every listing operation returns the *canonical run*: zero or more names,
//! each followed by a single NUL byte, with nothing else in between. The
//! byte length of a run is the sum of `name.len() + 1` over its names.
//!
//! Backends produce raw listings in one of three shapes; this module turns
//! each of them into the canonical run:
//!
//! | Raw shape | Produced by | Conversion |
//! |-----------|-------------|------------|
//! | NUL-terminated run | Linux, Darwin | none |
//! | `[len][bytes]` run | FreeBSD `extattr_list_*` | [`read_length_prefixed`] |
//! | directory entries | Solaris attribute directories | [`CanonicalWriter`] |

use std::fmt;

use crate::XattrError;

/// Rewrite a length-prefixed listing in place into the canonical run.
///
/// The input is a sequence of entries, each a one-byte length followed by
/// that many name bytes, with no terminator. Each entry is shifted left by
/// one byte over its own length byte and a NUL is written after it, so the
/// write index never passes the read index and the output has exactly the
/// input's length.
///
/// A trailing entry whose declared length runs past the end of `buf` is
/// discarded. Returns the length of the canonical run.
///
/// ```rust
/// use anyxattr_backend::names::canonicalize_length_prefixed;
///
/// let mut raw = *b"\x03foo\x05hello";
/// let len = canonicalize_length_prefixed(&mut raw);
/// assert_eq!(&raw[..len], b"foo\0hello\0");
/// ```
pub fn canonicalize_length_prefixed(buf: &mut [u8]) -> usize {
    let mut offset = 0;
    while offset < buf.len() {
        let len = buf[offset] as usize;
        let end = offset + 1 + len;
        if end > buf.len() {
            break;
        }
        buf.copy_within(offset + 1..end, offset);
        buf[offset + len] = 0;
        offset = end;
    }
    offset
}

/// Fill `buf` from a listing call that silently truncates, then canonicalize.
///
/// `raw` writes a length-prefixed run into its argument and returns the bytes
/// written, or the full size when handed an empty slice. The size is taken
/// before and after the fill; if the list changed in between, the fill is
/// discarded and the read starts over, so a truncated run is never reported
/// as complete.
///
/// Returns the canonical length, or the required size when `buf` is empty or
/// too small.
///
/// # Errors
///
/// Whatever `raw` reports.
pub fn read_length_prefixed(
    mut raw: impl FnMut(&mut [u8]) -> Result<usize, XattrError>,
    buf: &mut [u8],
) -> Result<usize, XattrError> {
    let mut required = raw(&mut [])?;
    loop {
        if buf.is_empty() || required > buf.len() {
            return Ok(required);
        }
        let filled = raw(buf)?;
        let after = raw(&mut [])?;
        if filled == required && after == required {
            return Ok(canonicalize_length_prefixed(&mut buf[..filled]));
        }
        log::trace!("attribute list changed while reading ({required} -> {after} bytes), retrying");
        required = after;
    }
}

/// Accumulates names one at a time into a caller buffer.
///
/// Names are appended NUL-terminated while they fit. The running
/// [`total`](CanonicalWriter::total) always counts every pushed name, so an
/// undersized (or empty) buffer still yields the full required size.
pub struct CanonicalWriter<'a> {
    buf: &'a mut [u8],
    written: usize,
    total: usize,
}

impl<'a> CanonicalWriter<'a> {
    /// Start writing into `buf`.
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self {
            buf,
            written: 0,
            total: 0,
        }
    }

    /// Append one name.
    pub fn push(&mut self, name: &[u8]) {
        let need = name.len() + 1;
        if self.total == self.written && self.written + need <= self.buf.len() {
            self.buf[self.written..self.written + name.len()].copy_from_slice(name);
            self.buf[self.written + name.len()] = 0;
            self.written += need;
        }
        self.total += need;
    }

    /// Bytes required for every name pushed so far.
    #[inline]
    pub fn total(&self) -> usize {
        self.total
    }

    /// Returns `true` if every pushed name was written.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.total == self.written
    }
}

/// Iterator over the names of a canonical run.
///
/// Yields each name without its terminator. Bytes after the last NUL are
/// ignored.
#[derive(Clone)]
pub struct Names<'a> {
    rest: &'a [u8],
}

impl<'a> Names<'a> {
    /// Iterate the canonical run `buf`.
    #[inline]
    pub fn new(buf: &'a [u8]) -> Self {
        Self { rest: buf }
    }
}

impl<'a> Iterator for Names<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        let nul = self.rest.iter().position(|&b| b == 0)?;
        let (name, tail) = self.rest.split_at(nul);
        self.rest = &tail[1..];
        Some(name)
    }
}

/// An owned canonical run.
///
/// Returned by the owned-buffer helpers such as
/// [`XattrExt::list_names`](crate::XattrExt::list_names).
#[derive(Clone, Default, PartialEq, Eq)]
pub struct NameList {
    buf: Vec<u8>,
}

impl NameList {
    /// Wrap a buffer that already holds a canonical run.
    ///
    /// Any bytes after the final NUL are dropped.
    pub fn from_canonical(mut buf: Vec<u8>) -> Self {
        let end = buf.iter().rposition(|&b| b == 0).map_or(0, |i| i + 1);
        buf.truncate(end);
        Self { buf }
    }

    /// The raw canonical bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Byte length of the run.
    #[inline]
    pub fn byte_len(&self) -> usize {
        self.buf.len()
    }

    /// Returns `true` if there are no names.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Number of names.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Iterate names as raw bytes.
    #[inline]
    pub fn iter(&self) -> Names<'_> {
        Names::new(&self.buf)
    }

    /// Names as strings, replacing invalid UTF-8.
    pub fn to_strings(&self) -> Vec<String> {
        self.iter()
            .map(|n| String::from_utf8_lossy(n).into_owned())
            .collect()
    }

    /// Returns `true` if `name` is in the list.
    pub fn contains(&self, name: &str) -> bool {
        self.iter().any(|n| n == name.as_bytes())
    }

    /// Consume the list, returning the canonical bytes.
    #[inline]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

impl fmt::Debug for NameList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.iter().map(String::from_utf8_lossy))
            .finish()
    }
}

impl<'a> IntoIterator for &'a NameList {
    type Item = &'a [u8];
    type IntoIter = Names<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
