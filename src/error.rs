//! Error types for the extended-attribute access layer.

use std::io;

/// Platform code reported when a named attribute does not exist.
#[cfg(any(
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
))]
pub(crate) const ENOATTR: i32 = libc::ENOATTR;

/// Platform code reported when a named attribute does not exist.
#[cfg(not(any(
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
)))]
pub(crate) const ENOATTR: i32 = libc::ENODATA;

/// Extended-attribute error type.
///
/// Every variant names the operation that failed (`"getxattr"`,
/// `"fsetxattr"`, ...). Variants produced by a native call keep the
/// originating [`io::Error`] as their source, so the OS error code reaches
/// the caller unmodified through [`XattrError::errno`].
///
/// # Examples
///
/// ```rust
/// use anyxattr_backend::XattrError;
///
/// let err = XattrError::InvalidArgument {
///     operation: "setxattr",
///     reason: "nonzero offset",
/// };
/// assert_eq!(err.to_string(), "setxattr: invalid argument: nonzero offset");
/// assert_eq!(err.errno(), libc::EINVAL);
/// ```
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum XattrError {
    /// Rejected before any native call was attempted.
    #[error("{operation}: invalid argument: {reason}")]
    InvalidArgument {
        /// The operation that was rejected.
        operation: &'static str,
        /// Why the arguments were rejected.
        reason: &'static str,
    },

    /// The named attribute does not exist on the target.
    #[error("{operation}: attribute not found: {name}")]
    AttrNotFound {
        /// The operation that failed.
        operation: &'static str,
        /// The attribute name.
        name: String,
        /// The native error.
        #[source]
        source: io::Error,
    },

    /// The attribute exists and the caller asked for create-only.
    #[error("{operation}: attribute already exists: {name}")]
    AlreadyExists {
        /// The operation that failed.
        operation: &'static str,
        /// The attribute name.
        name: String,
        /// The native error.
        #[source]
        source: io::Error,
    },

    /// The path (or a component of it) does not exist.
    #[error("{operation}: target not found")]
    TargetNotFound {
        /// The operation that failed.
        operation: &'static str,
        /// The native error.
        #[source]
        source: io::Error,
    },

    /// Access to the target or attribute was denied.
    #[error("{operation}: permission denied")]
    PermissionDenied {
        /// The operation that failed.
        operation: &'static str,
        /// The native error.
        #[source]
        source: io::Error,
    },

    /// The filesystem does not support extended attributes.
    #[error("{operation}: operation not supported")]
    NotSupported {
        /// The operation that failed.
        operation: &'static str,
        /// The native error.
        #[source]
        source: io::Error,
    },

    /// The value exceeds the filesystem's attribute size limit.
    #[error("{operation}: attribute value too large")]
    TooLarge {
        /// The operation that failed.
        operation: &'static str,
        /// The native error.
        #[source]
        source: io::Error,
    },

    /// The caller's buffer cannot hold the value.
    #[error("{operation}: buffer too small")]
    BufferTooSmall {
        /// The operation that failed.
        operation: &'static str,
        /// The native error.
        #[source]
        source: io::Error,
    },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Deserialization error.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// Any other native failure.
    #[error("{operation} failed: {source}")]
    Io {
        /// The operation that failed.
        operation: &'static str,
        /// The native error.
        #[source]
        source: io::Error,
    },
}

impl XattrError {
    /// Classify a native error by its OS code.
    ///
    /// `name` is the attribute involved; it is recorded on the variants that
    /// carry one.
    pub fn from_os(operation: &'static str, name: &str, source: io::Error) -> Self {
        let Some(code) = source.raw_os_error() else {
            return XattrError::Io { operation, source };
        };
        match code {
            ENOATTR => XattrError::AttrNotFound {
                operation,
                name: name.to_owned(),
                source,
            },
            libc::EEXIST => XattrError::AlreadyExists {
                operation,
                name: name.to_owned(),
                source,
            },
            libc::ENOENT | libc::ENOTDIR => XattrError::TargetNotFound { operation, source },
            libc::EPERM | libc::EACCES => XattrError::PermissionDenied { operation, source },
            libc::E2BIG => XattrError::TooLarge { operation, source },
            libc::ERANGE => XattrError::BufferTooSmall { operation, source },
            c if c == libc::ENOTSUP || c == libc::EOPNOTSUPP => {
                XattrError::NotSupported { operation, source }
            }
            _ => XattrError::Io { operation, source },
        }
    }

    /// Build an [`XattrError::AttrNotFound`] around an existing native error.
    ///
    /// Used where a backend knows from context that a failure means "no such
    /// attribute" even though the OS reported a different code.
    #[cfg(any(target_os = "solaris", target_os = "illumos"))]
    pub(crate) fn attr_not_found(operation: &'static str, name: &str, source: io::Error) -> Self {
        XattrError::AttrNotFound {
            operation,
            name: name.to_owned(),
            source,
        }
    }

    /// The OS error code for this failure.
    ///
    /// Native failures return the code the OS reported. Failures detected
    /// without a native call report `EINVAL`.
    pub fn errno(&self) -> i32 {
        match self {
            XattrError::InvalidArgument { .. }
            | XattrError::Serialization(_)
            | XattrError::Deserialization(_) => libc::EINVAL,
            XattrError::AttrNotFound { source, .. }
            | XattrError::AlreadyExists { source, .. }
            | XattrError::TargetNotFound { source, .. }
            | XattrError::PermissionDenied { source, .. }
            | XattrError::NotSupported { source, .. }
            | XattrError::TooLarge { source, .. }
            | XattrError::BufferTooSmall { source, .. }
            | XattrError::Io { source, .. } => source.raw_os_error().unwrap_or(libc::EIO),
        }
    }

    /// Returns `true` if the named attribute does not exist.
    #[inline]
    pub fn is_not_found(&self) -> bool {
        matches!(self, XattrError::AttrNotFound { .. })
    }
}

impl From<XattrError> for io::Error {
    fn from(error: XattrError) -> Self {
        io::Error::from_raw_os_error(error.errno())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn os(code: i32) -> io::Error {
        io::Error::from_raw_os_error(code)
    }

    #[test]
    fn invalid_argument_display() {
        let err = XattrError::InvalidArgument {
            operation: "fgetxattr",
            reason: "nofollow on a descriptor",
        };
        assert_eq!(
            err.to_string(),
            "fgetxattr: invalid argument: nofollow on a descriptor"
        );
    }

    #[test]
    fn attr_not_found_display() {
        let err = XattrError::from_os("getxattr", "user.comment", os(ENOATTR));
        assert_eq!(err.to_string(), "getxattr: attribute not found: user.comment");
        assert!(err.is_not_found());
    }

    #[test]
    fn from_os_classifies_common_codes() {
        assert!(matches!(
            XattrError::from_os("setxattr", "a", os(libc::EEXIST)),
            XattrError::AlreadyExists { .. }
        ));
        assert!(matches!(
            XattrError::from_os("getxattr", "a", os(libc::ENOENT)),
            XattrError::TargetNotFound { .. }
        ));
        assert!(matches!(
            XattrError::from_os("getxattr", "a", os(libc::EACCES)),
            XattrError::PermissionDenied { .. }
        ));
        assert!(matches!(
            XattrError::from_os("getxattr", "a", os(libc::ENOTSUP)),
            XattrError::NotSupported { .. }
        ));
        assert!(matches!(
            XattrError::from_os("setxattr", "a", os(libc::E2BIG)),
            XattrError::TooLarge { .. }
        ));
        assert!(matches!(
            XattrError::from_os("getxattr", "a", os(libc::ERANGE)),
            XattrError::BufferTooSmall { .. }
        ));
        assert!(matches!(
            XattrError::from_os("getxattr", "a", os(libc::EIO)),
            XattrError::Io { .. }
        ));
    }

    #[test]
    fn errno_is_preserved() {
        let err = XattrError::from_os("removexattr", "a", os(libc::EROFS));
        assert_eq!(err.errno(), libc::EROFS);

        let err = XattrError::from_os("getxattr", "a", os(ENOATTR));
        assert_eq!(err.errno(), ENOATTR);
    }

    #[test]
    fn error_without_os_code_is_io() {
        let err = XattrError::from_os("getxattr", "a", io::Error::other("boom"));
        assert!(matches!(err, XattrError::Io { .. }));
        assert_eq!(err.errno(), libc::EIO);
    }

    #[test]
    fn converts_into_io_error() {
        let err = XattrError::from_os("setxattr", "a", os(libc::EEXIST));
        let io_err: io::Error = err.into();
        assert_eq!(io_err.raw_os_error(), Some(libc::EEXIST));
    }
}
