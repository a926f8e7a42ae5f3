//! # Extension Traits
//!
//! Owned-buffer conveniences on top of [`XattrAccess`].
//!
//! ## Overview
//!
//! [`XattrExt`] hides the probe / allocate / fetch sequence that the
//! buffer-based operations require. It has a blanket implementation, so
//! every [`XattrAccess`] (including `dyn XattrAccess`) gets it for free.
//!
//! ## Available Methods
//!
//! | Method | Description |
//! |--------|-------------|
//! | [`get_value`](XattrExt::get_value) | Read a whole value into a `Vec<u8>` |
//! | [`fget_value`](XattrExt::fget_value) | Same, for an open descriptor |
//! | [`list_names`](XattrExt::list_names) | Read the name list into a [`NameList`] |
//! | [`flist_names`](XattrExt::flist_names) | Same, for an open descriptor |
//! | [`supported`](XattrExt::supported) | Check whether a path's filesystem has attributes |
//!
//! ## JSON Support (Feature-Gated)
//!
//! With the `serde` feature enabled, additional methods are available:
//!
//! | Method | Description |
//! |--------|-------------|
//! | `get_json` | Read and deserialize a JSON attribute value |
//! | `set_json` | Serialize and write a JSON attribute value |
//!
//! Enable with:
//! ```toml
//! [dependencies]
//! anyxattr-backend = { version = "0.1", features = ["serde"] }
//! ```

use std::os::fd::BorrowedFd;
use std::path::Path;

use crate::names::NameList;
use crate::{XattrAccess, XattrError, XattrOptions};

/// Probe the size, allocate, fetch; retry while the value keeps growing.
fn fetch_value(
    mut read: impl FnMut(&mut [u8]) -> Result<usize, XattrError>,
) -> Result<Vec<u8>, XattrError> {
    loop {
        let size = read(&mut [])?;
        if size == 0 {
            return Ok(Vec::new());
        }
        let mut value = vec![0; size];
        match read(&mut value) {
            Ok(n) => {
                value.truncate(n);
                return Ok(value);
            }
            Err(XattrError::BufferTooSmall { operation, .. }) => {
                log::trace!("{operation}: value grew past {size} bytes, retrying");
            }
            Err(e) => return Err(e),
        }
    }
}

fn fetch_names(
    mut list: impl FnMut(&mut [u8]) -> Result<usize, XattrError>,
) -> Result<NameList, XattrError> {
    let mut size = list(&mut [])?;
    loop {
        let mut buf = vec![0; size];
        let total = list(&mut buf)?;
        if total <= buf.len() {
            buf.truncate(total);
            return Ok(NameList::from_canonical(buf));
        }
        size = total;
    }
}

/// Extension methods for any attribute facade.
///
/// # Example
///
/// ```rust
/// use anyxattr_backend::{MemoryBackend, Xattr, XattrAccess, XattrExt, XattrOptions};
/// use std::path::Path;
///
/// let store = MemoryBackend::new();
/// store.add_path(Path::new("/photo.jpg"));
/// let xattr = Xattr::with_backend(store);
/// let path = Path::new("/photo.jpg");
///
/// xattr.set(path, "author", b"me", 0, XattrOptions::empty()).unwrap();
/// assert_eq!(xattr.get_value(path, "author", XattrOptions::empty()).unwrap(), b"me");
///
/// let names = xattr.list_names(path, XattrOptions::empty()).unwrap();
/// assert!(names.contains("author"));
/// ```
pub trait XattrExt: XattrAccess {
    /// Read the whole value of attribute `name` on `path`.
    ///
    /// # Errors
    ///
    /// Whatever [`XattrAccess::get`] reports, except that a value growing
    /// between the size probe and the read is retried rather than returned
    /// as [`XattrError::BufferTooSmall`].
    fn get_value(
        &self,
        path: &Path,
        name: &str,
        options: XattrOptions,
    ) -> Result<Vec<u8>, XattrError> {
        fetch_value(|buf| self.get(path, name, buf, 0, options))
    }

    /// Read the whole value of attribute `name` on the open file `fd`.
    fn fget_value(
        &self,
        fd: BorrowedFd<'_>,
        name: &str,
        options: XattrOptions,
    ) -> Result<Vec<u8>, XattrError> {
        fetch_value(|buf| self.fget(fd, name, buf, 0, options))
    }

    /// Read every attribute name of `path`.
    fn list_names(&self, path: &Path, options: XattrOptions) -> Result<NameList, XattrError> {
        fetch_names(|buf| self.list(path, buf, options))
    }

    /// Read every attribute name of the open file `fd`.
    fn flist_names(
        &self,
        fd: BorrowedFd<'_>,
        options: XattrOptions,
    ) -> Result<NameList, XattrError> {
        fetch_names(|buf| self.flist(fd, buf, options))
    }

    /// Check whether the filesystem holding `path` supports attributes.
    ///
    /// Probes a `user.test` attribute. A missing attribute still means the
    /// filesystem answered, so it counts as supported.
    ///
    /// # Errors
    ///
    /// Any failure other than "not supported" or "attribute not found",
    /// e.g. [`XattrError::TargetNotFound`] for a missing path.
    fn supported(&self, path: &Path) -> Result<bool, XattrError> {
        match self.get(path, "user.test", &mut [], 0, XattrOptions::empty()) {
            Ok(_) | Err(XattrError::AttrNotFound { .. }) => Ok(true),
            Err(XattrError::NotSupported { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

// Blanket implementation - any facade gets XattrExt for free
impl<A: XattrAccess + ?Sized> XattrExt for A {}

// =============================================================================
// JSON Support (Feature-Gated)
// =============================================================================

#[cfg(feature = "serde")]
mod json {
    use super::*;
    use serde::{Serialize, de::DeserializeOwned};

    /// JSON value helpers.
    ///
    /// Available when the `serde` feature is enabled.
    pub trait XattrExtJson: XattrAccess {
        /// Read attribute `name` of `path` and deserialize it as JSON.
        ///
        /// # Errors
        ///
        /// - [`XattrError::AttrNotFound`] if the attribute does not exist
        /// - [`XattrError::Deserialization`] if the value is not valid JSON for `T`
        ///
        /// # Example
        ///
        /// ```rust
        /// use anyxattr_backend::{XattrAccess, XattrError, XattrOptions};
        /// #[cfg(feature = "serde")]
        /// use anyxattr_backend::XattrExtJson;
        /// use std::path::Path;
        ///
        /// #[cfg(feature = "serde")]
        /// fn load_tags<A: XattrAccess>(xattr: &A) -> Result<Vec<String>, XattrError> {
        ///     xattr.get_json(Path::new("/doc.txt"), "tags", XattrOptions::empty())
        /// }
        /// ```
        fn get_json<T: DeserializeOwned>(
            &self,
            path: &Path,
            name: &str,
            options: XattrOptions,
        ) -> Result<T, XattrError> {
            let value = self.get_value(path, name, options)?;
            serde_json::from_slice(&value).map_err(|e| XattrError::Deserialization(e.to_string()))
        }

        /// Serialize `value` as compact JSON and store it as attribute `name`.
        ///
        /// # Errors
        ///
        /// - [`XattrError::Serialization`] if serialization failed
        /// - Other errors from the underlying [`XattrAccess::set`] call
        fn set_json<T: Serialize>(
            &self,
            path: &Path,
            name: &str,
            value: &T,
            options: XattrOptions,
        ) -> Result<(), XattrError> {
            let json =
                serde_json::to_vec(value).map_err(|e| XattrError::Serialization(e.to_string()))?;
            self.set(path, name, &json, 0, options)
        }
    }

    // Blanket implementation
    impl<A: XattrAccess + ?Sized> XattrExtJson for A {}
}

#[cfg(feature = "serde")]
pub use json::XattrExtJson;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryBackend, Xattr};
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn xattr() -> Xattr<MemoryBackend> {
        let store = MemoryBackend::new();
        store.add_path(Path::new("/file"));
        Xattr::with_backend(store)
    }

    fn path() -> &'static Path {
        Path::new("/file")
    }

    #[test]
    fn get_value_reads_whole_value() {
        let xattr = xattr();
        xattr.set(path(), "a", b"0123456789", 0, XattrOptions::empty()).unwrap();
        assert_eq!(
            xattr.get_value(path(), "a", XattrOptions::empty()).unwrap(),
            b"0123456789"
        );
    }

    #[test]
    fn get_value_of_empty_attribute() {
        let xattr = xattr();
        xattr.set(path(), "empty", b"", 0, XattrOptions::empty()).unwrap();
        assert!(xattr.get_value(path(), "empty", XattrOptions::empty()).unwrap().is_empty());
    }

    #[test]
    fn get_value_missing_is_not_found() {
        let err = xattr()
            .get_value(path(), "missing", XattrOptions::empty())
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn fetch_value_retries_when_value_grows() {
        let calls = AtomicUsize::new(0);
        let value = fetch_value(|buf| {
            let call = calls.fetch_add(1, Ordering::SeqCst);
            let size = if call == 0 { 2 } else { 4 };
            if buf.is_empty() {
                return Ok(size);
            }
            if buf.len() < size {
                return Err(XattrError::from_os(
                    "getxattr",
                    "a",
                    io::Error::from_raw_os_error(libc::ERANGE),
                ));
            }
            buf[..size].copy_from_slice(&b"abcd"[..size]);
            Ok(size)
        })
        .unwrap();
        assert_eq!(value, b"abcd");
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn list_names_collects_all() {
        let xattr = xattr();
        for name in ["b", "a", "c"] {
            xattr.set(path(), name, b"", 0, XattrOptions::empty()).unwrap();
        }
        let names = xattr.list_names(path(), XattrOptions::empty()).unwrap();
        assert_eq!(names.len(), 3);
        assert_eq!(names.byte_len(), 6);
        assert_eq!(names.to_strings(), ["a", "b", "c"]);
    }

    #[test]
    fn list_names_empty() {
        let names = xattr().list_names(path(), XattrOptions::empty()).unwrap();
        assert!(names.is_empty());
    }

    #[test]
    fn supported_on_memory_store() {
        assert!(xattr().supported(path()).unwrap());
        let err = xattr().supported(Path::new("/missing")).unwrap_err();
        assert!(matches!(err, XattrError::TargetNotFound { .. }));
    }

    #[test]
    fn xattr_ext_available_on_dyn_access() {
        let xattr = xattr();
        xattr.set(path(), "a", b"v", 0, XattrOptions::empty()).unwrap();
        let access: &dyn XattrAccess = &xattr;
        assert_eq!(access.get_value(path(), "a", XattrOptions::empty()).unwrap(), b"v");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn json_round_trip() {
        let xattr = xattr();
        xattr
            .set_json(path(), "tags", &vec!["red", "blue"], XattrOptions::empty())
            .unwrap();
        let tags: Vec<String> = xattr.get_json(path(), "tags", XattrOptions::empty()).unwrap();
        assert_eq!(tags, ["red", "blue"]);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn invalid_json_is_deserialization_error() {
        let xattr = xattr();
        xattr.set(path(), "tags", b"{not json", 0, XattrOptions::empty()).unwrap();
        let err = xattr
            .get_json::<Vec<String>>(path(), "tags", XattrOptions::empty())
            .unwrap_err();
        assert!(matches!(err, XattrError::Deserialization(_)));
    }
}
