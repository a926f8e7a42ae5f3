//! Writing attribute values.

use crate::{Target, XattrError, XattrOptions};

/// Write an attribute value to the native store.
///
/// # Object Safety
///
/// This trait is object-safe and can be used as `dyn XattrSet`.
pub trait XattrSet: Send + Sync {
    /// Set `name` to `value`, replacing the whole value.
    ///
    /// [`XattrOptions::CREATE`] fails if the attribute exists and
    /// [`XattrOptions::REPLACE`] fails if it does not, on backends whose
    /// capabilities report `enforces_create_replace`.
    ///
    /// # Errors
    ///
    /// - [`XattrError::AlreadyExists`] under `CREATE`
    /// - [`XattrError::AttrNotFound`] under `REPLACE`
    /// - [`XattrError::TooLarge`] if the value exceeds the filesystem limit
    /// - [`XattrError::NotSupported`] if the filesystem has no xattr support
    fn set_xattr(
        &self,
        target: Target<'_>,
        name: &str,
        value: &[u8],
        options: XattrOptions,
    ) -> Result<(), XattrError>;
}
