//! Linux `*xattr(2)` backend.

use std::os::fd::AsRawFd;

use super::sys;
use crate::{
    Capabilities, Operation, Target, XattrBackend, XattrError, XattrGet, XattrList, XattrOptions,
    XattrRemove, XattrSet,
};

/// Direct translation onto the Linux syscalls.
///
/// `NOFOLLOW` selects the `l*` variants; `CREATE` and `REPLACE` map to
/// `XATTR_CREATE` and `XATTR_REPLACE`. Names carry their namespace
/// (`user.`, `trusted.`, ...), so `ROOT` is not permitted; use
/// [`Namespace::qualify`](crate::Namespace::qualify) instead.
#[derive(Debug, Default, Clone, Copy)]
pub struct LinuxBackend;

fn set_flags(options: XattrOptions) -> libc::c_int {
    if options.contains(XattrOptions::CREATE) {
        libc::XATTR_CREATE
    } else if options.contains(XattrOptions::REPLACE) {
        libc::XATTR_REPLACE
    } else {
        0
    }
}

impl XattrBackend for LinuxBackend {
    fn capabilities(&self) -> Capabilities {
        Capabilities {
            backend: "linux",
            partial_read: false,
            enforces_create_replace: true,
            nosecurity: false,
            namespace_selection: false,
        }
    }
}

impl XattrGet for LinuxBackend {
    fn get_xattr(
        &self,
        target: Target<'_>,
        name: &str,
        buf: &mut [u8],
        _offset: u32,
        options: XattrOptions,
    ) -> Result<usize, XattrError> {
        let operation = Operation::Get.name(&target);
        let c_name = sys::c_name(operation, name)?;
        let len = buf.len();
        let value = sys::buf_ptr(buf);
        let ret = match target {
            Target::Path(path) => {
                let c_path = sys::c_path(operation, path)?;
                if options.contains(XattrOptions::NOFOLLOW) {
                    // SAFETY: both strings are NUL-terminated and `value` is
                    // null or valid for `len` bytes.
                    unsafe { libc::lgetxattr(c_path.as_ptr(), c_name.as_ptr(), value, len) }
                } else {
                    // SAFETY: as above.
                    unsafe { libc::getxattr(c_path.as_ptr(), c_name.as_ptr(), value, len) }
                }
            }
            // SAFETY: the descriptor is borrowed for the call; see above.
            Target::Fd(fd) => unsafe {
                libc::fgetxattr(fd.as_raw_fd(), c_name.as_ptr(), value, len)
            },
        };
        sys::cvt_len(operation, name, ret)
    }
}

impl XattrSet for LinuxBackend {
    fn set_xattr(
        &self,
        target: Target<'_>,
        name: &str,
        value: &[u8],
        options: XattrOptions,
    ) -> Result<(), XattrError> {
        let operation = Operation::Set.name(&target);
        let c_name = sys::c_name(operation, name)?;
        let flags = set_flags(options);
        let data = value.as_ptr().cast::<libc::c_void>();
        let ret = match target {
            Target::Path(path) => {
                let c_path = sys::c_path(operation, path)?;
                if options.contains(XattrOptions::NOFOLLOW) {
                    // SAFETY: NUL-terminated strings; `data` valid for
                    // `value.len()` bytes.
                    unsafe {
                        libc::lsetxattr(c_path.as_ptr(), c_name.as_ptr(), data, value.len(), flags)
                    }
                } else {
                    // SAFETY: as above.
                    unsafe {
                        libc::setxattr(c_path.as_ptr(), c_name.as_ptr(), data, value.len(), flags)
                    }
                }
            }
            // SAFETY: as above.
            Target::Fd(fd) => unsafe {
                libc::fsetxattr(fd.as_raw_fd(), c_name.as_ptr(), data, value.len(), flags)
            },
        };
        sys::cvt(operation, name, ret)
    }
}

impl XattrRemove for LinuxBackend {
    fn remove_xattr(
        &self,
        target: Target<'_>,
        name: &str,
        options: XattrOptions,
    ) -> Result<(), XattrError> {
        let operation = Operation::Remove.name(&target);
        let c_name = sys::c_name(operation, name)?;
        let ret = match target {
            Target::Path(path) => {
                let c_path = sys::c_path(operation, path)?;
                if options.contains(XattrOptions::NOFOLLOW) {
                    // SAFETY: NUL-terminated strings.
                    unsafe { libc::lremovexattr(c_path.as_ptr(), c_name.as_ptr()) }
                } else {
                    // SAFETY: NUL-terminated strings.
                    unsafe { libc::removexattr(c_path.as_ptr(), c_name.as_ptr()) }
                }
            }
            // SAFETY: NUL-terminated name, borrowed descriptor.
            Target::Fd(fd) => unsafe { libc::fremovexattr(fd.as_raw_fd(), c_name.as_ptr()) },
        };
        sys::cvt(operation, name, ret)
    }
}

impl XattrList for LinuxBackend {
    fn list_xattr(
        &self,
        target: Target<'_>,
        buf: &mut [u8],
        options: XattrOptions,
    ) -> Result<usize, XattrError> {
        let operation = Operation::List.name(&target);
        let len = buf.len();
        let list = sys::buf_ptr(buf).cast::<libc::c_char>();
        let ret = match target {
            Target::Path(path) => {
                let c_path = sys::c_path(operation, path)?;
                if options.contains(XattrOptions::NOFOLLOW) {
                    // SAFETY: NUL-terminated path; `list` null or valid for
                    // `len` bytes.
                    unsafe { libc::llistxattr(c_path.as_ptr(), list, len) }
                } else {
                    // SAFETY: as above.
                    unsafe { libc::listxattr(c_path.as_ptr(), list, len) }
                }
            }
            // SAFETY: as above.
            Target::Fd(fd) => unsafe { libc::flistxattr(fd.as_raw_fd(), list, len) },
        };
        // The kernel already returns the canonical run.
        sys::cvt_len(operation, "", ret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_flags_translation() {
        assert_eq!(set_flags(XattrOptions::empty()), 0);
        assert_eq!(set_flags(XattrOptions::CREATE), libc::XATTR_CREATE);
        assert_eq!(
            set_flags(XattrOptions::REPLACE | XattrOptions::NOFOLLOW),
            libc::XATTR_REPLACE
        );
    }

    #[test]
    fn missing_path_is_target_not_found() {
        let path = std::path::Path::new("/nonexistent/anyxattr/test");
        let err = LinuxBackend
            .get_xattr(Target::Path(path), "user.x", &mut [], 0, XattrOptions::empty())
            .unwrap_err();
        assert!(matches!(err, XattrError::TargetNotFound { .. }), "{err:?}");
        assert_eq!(err.errno(), libc::ENOENT);
    }
}
