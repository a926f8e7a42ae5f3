//! Removing attributes.

use crate::{Target, XattrError, XattrOptions};

/// Delete an attribute from the native store.
pub trait XattrRemove: Send + Sync {
    /// Remove `name`.
    ///
    /// # Errors
    ///
    /// - [`XattrError::AttrNotFound`] if the attribute does not exist
    fn remove_xattr(
        &self,
        target: Target<'_>,
        name: &str,
        options: XattrOptions,
    ) -> Result<(), XattrError>;
}
