//! Darwin `*xattr(2)` backend.

use std::os::fd::AsRawFd;

use super::sys;
use crate::{
    Capabilities, Operation, Target, XattrBackend, XattrError, XattrGet, XattrList, XattrOptions,
    XattrRemove, XattrSet,
};

// Not exported by every libc release.
const XATTR_NOSECURITY: libc::c_int = 0x0008;

/// Direct translation onto the Darwin syscalls.
///
/// Darwin's calls already take an options bitmask and a `position`; the
/// facade bits are mapped explicitly rather than passed through, because
/// `ROOT` (`0x10`) would otherwise reach the kernel as `XATTR_NODEFAULT`.
/// There is no namespace to select, so the facade rejects `ROOT` anyway.
/// `position` is honoured by `get` (resource forks), so the backend reports
/// partial-read support.
#[derive(Debug, Default, Clone, Copy)]
pub struct DarwinBackend;

fn native_options(options: XattrOptions) -> libc::c_int {
    let mut native = 0;
    if options.contains(XattrOptions::NOFOLLOW) {
        native |= libc::XATTR_NOFOLLOW;
    }
    if options.contains(XattrOptions::CREATE) {
        native |= libc::XATTR_CREATE;
    }
    if options.contains(XattrOptions::REPLACE) {
        native |= libc::XATTR_REPLACE;
    }
    if options.contains(XattrOptions::NOSECURITY) {
        native |= XATTR_NOSECURITY;
    }
    native
}

impl XattrBackend for DarwinBackend {
    fn capabilities(&self) -> Capabilities {
        Capabilities {
            backend: "darwin",
            partial_read: true,
            enforces_create_replace: true,
            nosecurity: true,
            namespace_selection: false,
        }
    }
}

impl XattrGet for DarwinBackend {
    fn get_xattr(
        &self,
        target: Target<'_>,
        name: &str,
        buf: &mut [u8],
        offset: u32,
        options: XattrOptions,
    ) -> Result<usize, XattrError> {
        let operation = Operation::Get.name(&target);
        let c_name = sys::c_name(operation, name)?;
        let native = native_options(options);
        let len = buf.len();
        let value = sys::buf_ptr(buf);
        let ret = match target {
            Target::Path(path) => {
                let c_path = sys::c_path(operation, path)?;
                // SAFETY: NUL-terminated strings; `value` null or valid for
                // `len` bytes.
                unsafe {
                    libc::getxattr(c_path.as_ptr(), c_name.as_ptr(), value, len, offset, native)
                }
            }
            // SAFETY: as above, descriptor borrowed for the call.
            Target::Fd(fd) => unsafe {
                libc::fgetxattr(fd.as_raw_fd(), c_name.as_ptr(), value, len, offset, native)
            },
        };
        sys::cvt_len(operation, name, ret)
    }
}

impl XattrSet for DarwinBackend {
    fn set_xattr(
        &self,
        target: Target<'_>,
        name: &str,
        value: &[u8],
        options: XattrOptions,
    ) -> Result<(), XattrError> {
        let operation = Operation::Set.name(&target);
        let c_name = sys::c_name(operation, name)?;
        let native = native_options(options);
        let data = value.as_ptr().cast::<libc::c_void>();
        let ret = match target {
            Target::Path(path) => {
                let c_path = sys::c_path(operation, path)?;
                // SAFETY: NUL-terminated strings; `data` valid for
                // `value.len()` bytes.
                unsafe {
                    libc::setxattr(c_path.as_ptr(), c_name.as_ptr(), data, value.len(), 0, native)
                }
            }
            // SAFETY: as above.
            Target::Fd(fd) => unsafe {
                libc::fsetxattr(fd.as_raw_fd(), c_name.as_ptr(), data, value.len(), 0, native)
            },
        };
        sys::cvt(operation, name, ret)
    }
}

impl XattrRemove for DarwinBackend {
    fn remove_xattr(
        &self,
        target: Target<'_>,
        name: &str,
        options: XattrOptions,
    ) -> Result<(), XattrError> {
        let operation = Operation::Remove.name(&target);
        let c_name = sys::c_name(operation, name)?;
        let native = native_options(options);
        let ret = match target {
            Target::Path(path) => {
                let c_path = sys::c_path(operation, path)?;
                // SAFETY: NUL-terminated strings.
                unsafe { libc::removexattr(c_path.as_ptr(), c_name.as_ptr(), native) }
            }
            // SAFETY: NUL-terminated name, borrowed descriptor.
            Target::Fd(fd) => unsafe {
                libc::fremovexattr(fd.as_raw_fd(), c_name.as_ptr(), native)
            },
        };
        sys::cvt(operation, name, ret)
    }
}

impl XattrList for DarwinBackend {
    fn list_xattr(
        &self,
        target: Target<'_>,
        buf: &mut [u8],
        options: XattrOptions,
    ) -> Result<usize, XattrError> {
        let operation = Operation::List.name(&target);
        let native = native_options(options);
        let len = buf.len();
        let list = sys::buf_ptr(buf).cast::<libc::c_char>();
        let ret = match target {
            Target::Path(path) => {
                let c_path = sys::c_path(operation, path)?;
                // SAFETY: NUL-terminated path; `list` null or valid for `len`.
                unsafe { libc::listxattr(c_path.as_ptr(), list, len, native) }
            }
            // SAFETY: as above.
            Target::Fd(fd) => unsafe { libc::flistxattr(fd.as_raw_fd(), list, len, native) },
        };
        sys::cvt_len(operation, "", ret)
    }
}
