//! Reading attribute values.

use crate::{Target, XattrError, XattrOptions};

/// Read an attribute value from the native store.
///
/// Called by the facade after option validation; implementations can assume
/// the options are legal for their [`Capabilities`](crate::Capabilities) and
/// that `offset` is zero unless they report partial-read support.
///
/// # Object Safety
///
/// This trait is object-safe and can be used as `dyn XattrGet`.
pub trait XattrGet: Send + Sync {
    /// Copy the value of `name` into `buf`.
    ///
    /// An empty `buf` is a size probe: nothing is copied and the full value
    /// length is returned.
    ///
    /// # Returns
    ///
    /// Bytes written into `buf`, or the value length when probing.
    ///
    /// # Errors
    ///
    /// - [`XattrError::AttrNotFound`] if the attribute does not exist
    /// - [`XattrError::TargetNotFound`] if the path does not exist
    /// - [`XattrError::BufferTooSmall`] if `buf` cannot hold the value
    fn get_xattr(
        &self,
        target: Target<'_>,
        name: &str,
        buf: &mut [u8],
        offset: u32,
        options: XattrOptions,
    ) -> Result<usize, XattrError>;
}
