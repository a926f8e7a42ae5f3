//! FreeBSD `extattr(2)` backend.

use std::ffi::CString;
use std::os::fd::{AsRawFd, RawFd};

use super::sys;
use crate::names;
use crate::{
    Capabilities, Namespace, Operation, Target, XattrBackend, XattrError, XattrGet, XattrList,
    XattrOptions, XattrRemove, XattrSet,
};

/// Namespace-qualified attribute calls.
///
/// Attribute names are passed without a namespace prefix; `ROOT` selects
/// `EXTATTR_NAMESPACE_SYSTEM`, everything else lives in
/// `EXTATTR_NAMESPACE_USER`.
///
/// The native API has no create-only or replace-only mode. `CREATE` and
/// `REPLACE` are accepted and have no effect, which
/// [`Capabilities::enforces_create_replace`] reports as `false`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExtattrBackend;

fn attr_namespace(options: XattrOptions) -> libc::c_int {
    match options.namespace() {
        Namespace::User => libc::EXTATTR_NAMESPACE_USER,
        Namespace::Trusted => libc::EXTATTR_NAMESPACE_SYSTEM,
    }
}

/// A target converted for the native calls.
enum Resolved {
    File(CString),
    Link(CString),
    Fd(RawFd),
}

impl Resolved {
    fn new(
        operation: &'static str,
        target: &Target<'_>,
        options: XattrOptions,
    ) -> Result<Self, XattrError> {
        Ok(match target {
            Target::Fd(fd) => Resolved::Fd(fd.as_raw_fd()),
            Target::Path(path) if options.contains(XattrOptions::NOFOLLOW) => {
                Resolved::Link(sys::c_path(operation, path)?)
            }
            Target::Path(path) => Resolved::File(sys::c_path(operation, path)?),
        })
    }
}

impl XattrBackend for ExtattrBackend {
    fn capabilities(&self) -> Capabilities {
        Capabilities {
            backend: "freebsd",
            partial_read: false,
            enforces_create_replace: false,
            nosecurity: false,
            namespace_selection: true,
        }
    }
}

impl XattrGet for ExtattrBackend {
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
        let name_ptr = c_name.as_ptr();
        let resolved = Resolved::new(operation, &target, options)?;
        let ns = attr_namespace(options);
        let len = buf.len();
        let data = sys::buf_ptr(buf);
        // SAFETY: NUL-terminated strings; `data` null or valid for `len`
        // bytes; the descriptor is borrowed for the call.
        let ret = unsafe {
            match &resolved {
                Resolved::File(p) => libc::extattr_get_file(p.as_ptr(), ns, name_ptr, data, len),
                Resolved::Link(p) => libc::extattr_get_link(p.as_ptr(), ns, name_ptr, data, len),
                Resolved::Fd(fd) => libc::extattr_get_fd(*fd, ns, name_ptr, data, len),
            }
        };
        sys::cvt_len(operation, name, ret)
    }
}

impl XattrSet for ExtattrBackend {
    fn set_xattr(
        &self,
        target: Target<'_>,
        name: &str,
        value: &[u8],
        options: XattrOptions,
    ) -> Result<(), XattrError> {
        let operation = Operation::Set.name(&target);
        let c_name = sys::c_name(operation, name)?;
        let name_ptr = c_name.as_ptr();
        let resolved = Resolved::new(operation, &target, options)?;
        let ns = attr_namespace(options);
        let data = value.as_ptr().cast::<libc::c_void>();
        let len = value.len();
        // SAFETY: NUL-terminated strings; `data` valid for `len` bytes.
        let ret = unsafe {
            match &resolved {
                Resolved::File(p) => libc::extattr_set_file(p.as_ptr(), ns, name_ptr, data, len),
                Resolved::Link(p) => libc::extattr_set_link(p.as_ptr(), ns, name_ptr, data, len),
                Resolved::Fd(fd) => libc::extattr_set_fd(*fd, ns, name_ptr, data, len),
            }
        };
        // extattr_set_* reports the bytes written on success.
        sys::cvt_len(operation, name, ret).map(|_| ())
    }
}

impl XattrRemove for ExtattrBackend {
    fn remove_xattr(
        &self,
        target: Target<'_>,
        name: &str,
        options: XattrOptions,
    ) -> Result<(), XattrError> {
        let operation = Operation::Remove.name(&target);
        let c_name = sys::c_name(operation, name)?;
        let name_ptr = c_name.as_ptr();
        let resolved = Resolved::new(operation, &target, options)?;
        let ns = attr_namespace(options);
        // SAFETY: NUL-terminated strings, borrowed descriptor.
        let ret = unsafe {
            match &resolved {
                Resolved::File(p) => libc::extattr_delete_file(p.as_ptr(), ns, name_ptr),
                Resolved::Link(p) => libc::extattr_delete_link(p.as_ptr(), ns, name_ptr),
                Resolved::Fd(fd) => libc::extattr_delete_fd(*fd, ns, name_ptr),
            }
        };
        sys::cvt(operation, name, ret)
    }
}

impl XattrList for ExtattrBackend {
    fn list_xattr(
        &self,
        target: Target<'_>,
        buf: &mut [u8],
        options: XattrOptions,
    ) -> Result<usize, XattrError> {
        let operation = Operation::List.name(&target);
        let ns = attr_namespace(options);
        let resolved = Resolved::new(operation, &target, options)?;

        let raw_list = |buf: &mut [u8]| -> Result<usize, XattrError> {
            let len = buf.len();
            let data = sys::buf_ptr(buf);
            // SAFETY: NUL-terminated path; `data` null or valid for `len`.
            let ret = unsafe {
                match &resolved {
                    Resolved::File(p) => libc::extattr_list_file(p.as_ptr(), ns, data, len),
                    Resolved::Link(p) => libc::extattr_list_link(p.as_ptr(), ns, data, len),
                    Resolved::Fd(fd) => libc::extattr_list_fd(*fd, ns, data, len),
                }
            };
            sys::cvt_len(operation, "", ret)
        };

        // A length-prefixed run and its canonical form have the same size.
        names::read_length_prefixed(raw_list, buf)
    }
}
