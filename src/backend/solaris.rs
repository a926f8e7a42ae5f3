//! Solaris / illumos attribute-directory backend.
//!
//! There are no attribute syscalls. Each file has a hidden attribute
//! directory, reached with `openat(fd, ".", O_XATTR)`, and every attribute is
//! a regular file inside it. All descriptors and directory streams opened
//! here are owned values, so they are closed on every return path.

use std::ffi::{CStr, CString};
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, FromRawFd, IntoRawFd, OwnedFd};
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;
use std::ptr::NonNull;

use super::sys;
use crate::names::CanonicalWriter;
use crate::{
    Capabilities, Operation, Target, XattrBackend, XattrError, XattrGet, XattrList, XattrOptions,
    XattrRemove, XattrSet,
};

/// System attribute views present in every attribute directory.
const SYSTEM_VIEW_PREFIX: &[u8] = b"SUNWattr_";

/// Attributes emulated as files in the `O_XATTR` directory.
///
/// `NOFOLLOW` opens the target with `O_NOFOLLOW`, so a symlink fails with
/// `ELOOP` instead of being followed. The attribute directory has no
/// namespaces, so `ROOT` is not permitted.
#[derive(Debug, Default, Clone, Copy)]
pub struct AttrDirBackend;

/// The target opened as a descriptor, owned only when we opened it.
enum Anchor<'a> {
    Opened(File),
    Borrowed(BorrowedFd<'a>),
}

impl Anchor<'_> {
    fn as_fd(&self) -> BorrowedFd<'_> {
        match self {
            Anchor::Opened(file) => file.as_fd(),
            Anchor::Borrowed(fd) => *fd,
        }
    }
}

fn open_target<'a>(
    operation: &'static str,
    target: Target<'a>,
    options: XattrOptions,
) -> Result<Anchor<'a>, XattrError> {
    match target {
        Target::Fd(fd) => Ok(Anchor::Borrowed(fd)),
        Target::Path(path) => open_path(operation, path, options).map(Anchor::Opened),
    }
}

fn open_path(
    operation: &'static str,
    path: &Path,
    options: XattrOptions,
) -> Result<File, XattrError> {
    let nofollow = if options.contains(XattrOptions::NOFOLLOW) {
        libc::O_NOFOLLOW
    } else {
        0
    };
    OpenOptions::new()
        .read(true)
        .custom_flags(nofollow)
        .open(path)
        .map_err(|e| XattrError::from_os(operation, "", e))
}

/// Attribute names are single path components inside the directory.
fn check_name(operation: &'static str, name: &str) -> Result<CString, XattrError> {
    if name.contains('/') || name == "." || name == ".." {
        return Err(XattrError::InvalidArgument {
            operation,
            reason: "attribute name is not a single path component",
        });
    }
    sys::c_name(operation, name)
}

fn openat(dir: BorrowedFd<'_>, name: &CStr, flags: libc::c_int) -> io::Result<OwnedFd> {
    // SAFETY: `name` is NUL-terminated and `dir` is a live descriptor.
    let fd = unsafe {
        libc::openat(dir.as_raw_fd(), name.as_ptr(), flags, 0o644 as libc::c_uint)
    };
    if fd < 0 {
        Err(io::Error::last_os_error())
    } else {
        // SAFETY: `fd` was just returned by openat and is owned by nobody else.
        Ok(unsafe { OwnedFd::from_raw_fd(fd) })
    }
}

/// Open the attribute directory of `anchor`.
///
/// A missing directory means the attribute is missing.
fn open_attr_dir(
    operation: &'static str,
    name: &str,
    anchor: BorrowedFd<'_>,
) -> Result<OwnedFd, XattrError> {
    openat(anchor, c".", libc::O_RDONLY | libc::O_XATTR)
        .map_err(|e| not_found_on_enoent(operation, name, e))
}

fn not_found_on_enoent(operation: &'static str, name: &str, e: io::Error) -> XattrError {
    if e.raw_os_error() == Some(libc::ENOENT) {
        XattrError::attr_not_found(operation, name, e)
    } else {
        XattrError::from_os(operation, name, e)
    }
}

fn open_flags(options: XattrOptions) -> libc::c_int {
    let mut flags = libc::O_TRUNC;
    if options.contains(XattrOptions::CREATE) {
        flags |= libc::O_EXCL;
    }
    if options.contains(XattrOptions::REPLACE) {
        flags |= libc::O_RDWR;
    } else {
        flags |= libc::O_WRONLY | libc::O_CREAT;
    }
    flags
}

/// Lazy, single-pass enumeration of an attribute directory.
///
/// Skips `.`, `..` and the system attribute views.
struct AttrDirEntries {
    dir: NonNull<libc::DIR>,
}

impl AttrDirEntries {
    fn open(fd: OwnedFd) -> io::Result<Self> {
        let raw = fd.into_raw_fd();
        // SAFETY: `raw` is an open directory descriptor; on success the
        // stream owns it.
        let dir = unsafe { libc::fdopendir(raw) };
        match NonNull::new(dir) {
            Some(dir) => Ok(Self { dir }),
            None => {
                let err = io::Error::last_os_error();
                // SAFETY: fdopendir failed, so `raw` is still ours to close.
                drop(unsafe { OwnedFd::from_raw_fd(raw) });
                Err(err)
            }
        }
    }
}

impl Iterator for AttrDirEntries {
    type Item = Vec<u8>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            // SAFETY: `dir` is a live stream owned by `self`.
            let entry = unsafe { libc::readdir(self.dir.as_ptr()) };
            if entry.is_null() {
                return None;
            }
            // SAFETY: readdir returned a valid entry with a NUL-terminated name
            // that stays valid until the next readdir on this stream.
            let name = unsafe { CStr::from_ptr((*entry).d_name.as_ptr()) }.to_bytes();
            if name == b"." || name == b".." || name.starts_with(SYSTEM_VIEW_PREFIX) {
                continue;
            }
            return Some(name.to_vec());
        }
    }
}

impl Drop for AttrDirEntries {
    fn drop(&mut self) {
        // SAFETY: the stream is closed exactly once, here.
        unsafe { libc::closedir(self.dir.as_ptr()) };
    }
}

impl XattrBackend for AttrDirBackend {
    fn capabilities(&self) -> Capabilities {
        Capabilities {
            backend: "solaris",
            partial_read: false,
            enforces_create_replace: true,
            nosecurity: false,
            namespace_selection: false,
        }
    }
}

impl XattrGet for AttrDirBackend {
    fn get_xattr(
        &self,
        target: Target<'_>,
        name: &str,
        buf: &mut [u8],
        offset: u32,
        options: XattrOptions,
    ) -> Result<usize, XattrError> {
        let operation = Operation::Get.name(&target);
        let c_name = check_name(operation, name)?;
        let anchor = open_target(operation, target, options)?;
        let dir = open_attr_dir(operation, name, anchor.as_fd())?;
        let mut file = openat(dir.as_fd(), &c_name, libc::O_RDONLY)
            .map(File::from)
            .map_err(|e| not_found_on_enoent(operation, name, e))?;
        let os_err = |e| XattrError::from_os(operation, name, e);

        file.seek(SeekFrom::Start(offset.into())).map_err(os_err)?;
        let size = file.metadata().map_err(os_err)?.len();
        let remaining = size.saturating_sub(offset.into()) as usize;
        if buf.is_empty() {
            return Ok(remaining);
        }
        if remaining > buf.len() {
            return Err(os_err(io::Error::from_raw_os_error(libc::ERANGE)));
        }

        let mut filled = 0;
        while filled < remaining {
            match file.read(&mut buf[filled..remaining]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) => return Err(os_err(e)),
            }
        }
        Ok(filled)
    }
}

impl XattrSet for AttrDirBackend {
    fn set_xattr(
        &self,
        target: Target<'_>,
        name: &str,
        value: &[u8],
        options: XattrOptions,
    ) -> Result<(), XattrError> {
        let operation = Operation::Set.name(&target);
        let c_name = check_name(operation, name)?;
        let anchor = open_target(operation, target, options)?;
        let dir = open_attr_dir(operation, name, anchor.as_fd())?;
        let mut file = openat(dir.as_fd(), &c_name, open_flags(options))
            .map(File::from)
            .map_err(|e| not_found_on_enoent(operation, name, e))?;

        // Short writes advance; the first failed write aborts and leaves the
        // value partially written.
        let mut rest = value;
        while !rest.is_empty() {
            match file.write(rest) {
                Ok(0) => {
                    return Err(XattrError::from_os(
                        operation,
                        name,
                        io::Error::from(io::ErrorKind::WriteZero),
                    ));
                }
                Ok(n) => rest = &rest[n..],
                Err(e) => return Err(XattrError::from_os(operation, name, e)),
            }
        }
        Ok(())
    }
}

impl XattrRemove for AttrDirBackend {
    fn remove_xattr(
        &self,
        target: Target<'_>,
        name: &str,
        options: XattrOptions,
    ) -> Result<(), XattrError> {
        let operation = Operation::Remove.name(&target);
        let c_name = check_name(operation, name)?;
        let anchor = open_target(operation, target, options)?;
        let dir = open_attr_dir(operation, name, anchor.as_fd())?;
        // SAFETY: NUL-terminated name inside a live directory descriptor.
        let ret = unsafe { libc::unlinkat(dir.as_raw_fd(), c_name.as_ptr(), 0) };
        if ret < 0 {
            return Err(not_found_on_enoent(operation, name, io::Error::last_os_error()));
        }
        Ok(())
    }
}

impl XattrList for AttrDirBackend {
    fn list_xattr(
        &self,
        target: Target<'_>,
        buf: &mut [u8],
        options: XattrOptions,
    ) -> Result<usize, XattrError> {
        let operation = Operation::List.name(&target);
        let anchor = open_target(operation, target, options)?;
        let dir = openat(anchor.as_fd(), c".", libc::O_RDONLY | libc::O_XATTR)
            .map_err(|e| XattrError::from_os(operation, "", e))?;
        let entries =
            AttrDirEntries::open(dir).map_err(|e| XattrError::from_os(operation, "", e))?;

        let mut out = CanonicalWriter::new(buf);
        for name in entries {
            out.push(&name);
        }
        Ok(out.total())
    }
}
