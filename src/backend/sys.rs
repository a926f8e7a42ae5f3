//! Helpers shared by the native backends.

use std::ffi::CString;
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use crate::XattrError;

pub(crate) fn c_path(operation: &'static str, path: &Path) -> Result<CString, XattrError> {
    CString::new(path.as_os_str().as_bytes()).map_err(|_| XattrError::InvalidArgument {
        operation,
        reason: "path contains a NUL byte",
    })
}

pub(crate) fn c_name(operation: &'static str, name: &str) -> Result<CString, XattrError> {
    CString::new(name).map_err(|_| XattrError::InvalidArgument {
        operation,
        reason: "attribute name contains a NUL byte",
    })
}

/// Null for an empty buffer, so the native call treats it as a size probe.
#[inline]
pub(crate) fn buf_ptr(buf: &mut [u8]) -> *mut libc::c_void {
    if buf.is_empty() {
        std::ptr::null_mut()
    } else {
        buf.as_mut_ptr().cast()
    }
}

/// Convert a byte-count return value, capturing `errno` on failure.
#[inline]
pub(crate) fn cvt_len(
    operation: &'static str,
    name: &str,
    ret: isize,
) -> Result<usize, XattrError> {
    if ret < 0 {
        Err(XattrError::from_os(operation, name, io::Error::last_os_error()))
    } else {
        Ok(ret as usize)
    }
}

/// Convert a status return value, capturing `errno` on failure.
#[inline]
pub(crate) fn cvt(
    operation: &'static str,
    name: &str,
    ret: libc::c_int,
) -> Result<(), XattrError> {
    if ret < 0 {
        Err(XattrError::from_os(operation, name, io::Error::last_os_error()))
    } else {
        Ok(())
    }
}
