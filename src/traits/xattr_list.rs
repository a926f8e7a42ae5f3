//! Enumerating attribute names.

use crate::{Target, XattrError, XattrOptions};

/// Enumerate attribute names in the canonical run format.
///
/// See [`crate::names`] for the format and the helpers backends use to
/// produce it.
pub trait XattrList: Send + Sync {
    /// Write the canonical name run into `buf`.
    ///
    /// An empty `buf` is a size probe.
    ///
    /// # Returns
    ///
    /// The byte length of the complete run. Backends may either fail an
    /// undersized buffer with [`XattrError::BufferTooSmall`] or return a
    /// total larger than `buf.len()`; the facade turns the former into the
    /// latter.
    fn list_xattr(
        &self,
        target: Target<'_>,
        buf: &mut [u8],
        options: XattrOptions,
    ) -> Result<usize, XattrError>;
}
