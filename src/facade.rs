//! # Attribute Access Facade
//!
//! [`Xattr`] wraps any [`XattrStore`] and exposes the eight public
//! operations through [`XattrAccess`]: get, set, remove and list, each in a
//! path-addressed and a descriptor-addressed form.
//!
//! ## Validation
//!
//! Before a backend is called, every request is checked against the
//! backend's [`Capabilities`]:
//!
//! | Rejected | Reason |
//! |----------|--------|
//! | `NOFOLLOW` on a descriptor | a descriptor has no trailing symlink |
//! | options outside [`Capabilities::permitted`] | not recognized for the operation |
//! | `ROOT` without `namespace_selection` | the namespace is part of the name |
//! | `CREATE` together with `REPLACE` | contradictory |
//! | nonzero offset on set | no backend writes at an offset |
//! | nonzero offset on get | unless the backend reports `partial_read` |
//!
//! Rejections return [`XattrError::InvalidArgument`] and have no side
//! effects.
//!
//! ## Size probes
//!
//! Passing an empty buffer to a get or list operation returns the size a
//! subsequent call needs. A list call with a buffer that is too small
//! returns the full required size, so `n > buf.len()` means "reallocate and
//! retry" on every backend.

use std::os::fd::BorrowedFd;
use std::path::Path;

use crate::{Capabilities, Operation, Target, XattrError, XattrOptions, XattrStore};

/// The public attribute operations.
///
/// Implemented by [`Xattr`]. The trait is object-safe, so binding layers can
/// hold a `&dyn XattrAccess` and substitute a mock in their own tests.
///
/// # Example
///
/// ```rust
/// use anyxattr_backend::{MemoryBackend, Xattr, XattrAccess, XattrOptions};
/// use std::path::Path;
///
/// let store = MemoryBackend::new();
/// store.add_path(Path::new("/doc.txt"));
/// let xattr = Xattr::with_backend(store);
///
/// let path = Path::new("/doc.txt");
/// xattr.set(path, "comment", b"hello", 0, XattrOptions::empty()).unwrap();
///
/// let size = xattr.get(path, "comment", &mut [], 0, XattrOptions::empty()).unwrap();
/// let mut value = vec![0; size];
/// let n = xattr.get(path, "comment", &mut value, 0, XattrOptions::empty()).unwrap();
/// assert_eq!(&value[..n], b"hello");
/// ```
pub trait XattrAccess: Send + Sync {
    /// Capabilities of the active backend.
    fn capabilities(&self) -> Capabilities;

    /// Read attribute `name` of `path` into `buf`.
    ///
    /// An empty `buf` returns the value size without copying.
    ///
    /// # Errors
    ///
    /// - [`XattrError::InvalidArgument`] for illegal options or offset
    /// - [`XattrError::AttrNotFound`] if the attribute does not exist
    /// - [`XattrError::BufferTooSmall`] if `buf` is non-empty but too small
    fn get(
        &self,
        path: &Path,
        name: &str,
        buf: &mut [u8],
        offset: u32,
        options: XattrOptions,
    ) -> Result<usize, XattrError>;

    /// Read attribute `name` of the open file `fd` into `buf`.
    fn fget(
        &self,
        fd: BorrowedFd<'_>,
        name: &str,
        buf: &mut [u8],
        offset: u32,
        options: XattrOptions,
    ) -> Result<usize, XattrError>;

    /// Set attribute `name` of `path` to `value`.
    ///
    /// `offset` must be zero.
    ///
    /// # Errors
    ///
    /// - [`XattrError::InvalidArgument`] for illegal options or a nonzero offset
    /// - [`XattrError::AlreadyExists`] under [`XattrOptions::CREATE`]
    /// - [`XattrError::AttrNotFound`] under [`XattrOptions::REPLACE`]
    fn set(
        &self,
        path: &Path,
        name: &str,
        value: &[u8],
        offset: u32,
        options: XattrOptions,
    ) -> Result<(), XattrError>;

    /// Set attribute `name` of the open file `fd` to `value`.
    fn fset(
        &self,
        fd: BorrowedFd<'_>,
        name: &str,
        value: &[u8],
        offset: u32,
        options: XattrOptions,
    ) -> Result<(), XattrError>;

    /// Remove attribute `name` from `path`.
    fn remove(&self, path: &Path, name: &str, options: XattrOptions) -> Result<(), XattrError>;

    /// Remove attribute `name` from the open file `fd`.
    fn fremove(
        &self,
        fd: BorrowedFd<'_>,
        name: &str,
        options: XattrOptions,
    ) -> Result<(), XattrError>;

    /// Write the canonical name run of `path` into `buf`.
    ///
    /// Returns the byte length of the complete run, which exceeds
    /// `buf.len()` when the buffer is too small.
    fn list(&self, path: &Path, buf: &mut [u8], options: XattrOptions)
    -> Result<usize, XattrError>;

    /// Write the canonical name run of the open file `fd` into `buf`.
    fn flist(
        &self,
        fd: BorrowedFd<'_>,
        buf: &mut [u8],
        options: XattrOptions,
    ) -> Result<usize, XattrError>;

    /// Returns `true` if `path` carries attribute `name`.
    ///
    /// Any failure, including a missing path, reads as `false`.
    fn exists(&self, path: &Path, name: &str, options: XattrOptions) -> bool {
        self.get(path, name, &mut [], 0, options).is_ok()
    }

    /// Returns `true` if the open file `fd` carries attribute `name`.
    fn fexists(&self, fd: BorrowedFd<'_>, name: &str, options: XattrOptions) -> bool {
        self.fget(fd, name, &mut [], 0, options).is_ok()
    }
}

/// Portable extended-attribute facade over a backend `B`.
///
/// Holds no state besides the backend; every call is independent.
#[derive(Debug, Default, Clone)]
pub struct Xattr<B> {
    backend: B,
}

/// The facade over this platform's native backend.
#[cfg(any(
    target_os = "linux",
    target_os = "android",
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "solaris",
    target_os = "illumos",
))]
pub type NativeXattr = Xattr<crate::NativeBackend>;

#[cfg(any(
    target_os = "linux",
    target_os = "android",
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "solaris",
    target_os = "illumos",
))]
impl Xattr<crate::NativeBackend> {
    /// The facade over this platform's native attribute API.
    pub fn native() -> Self {
        Self::with_backend(crate::NativeBackend::default())
    }
}

impl<B: XattrStore> Xattr<B> {
    /// Wrap `backend`.
    pub fn with_backend(backend: B) -> Self {
        Self { backend }
    }

    /// The wrapped backend.
    #[inline]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Unwrap the backend.
    #[inline]
    pub fn into_inner(self) -> B {
        self.backend
    }

    fn validate(
        &self,
        op: Operation,
        target: &Target<'_>,
        options: XattrOptions,
        offset: u32,
    ) -> Result<(), XattrError> {
        let caps = self.backend.capabilities();
        let operation = op.name(target);

        let reason = if target.is_fd() && options.contains(XattrOptions::NOFOLLOW) {
            Some("nofollow is not expressible on a descriptor")
        } else if !caps.permitted(op, target).contains(options) {
            Some("option not recognized for this operation")
        } else if options.contains(XattrOptions::CREATE | XattrOptions::REPLACE) {
            Some("create and replace are mutually exclusive")
        } else if offset != 0 && !(op == Operation::Get && caps.partial_read) {
            Some("nonzero offset is not supported")
        } else {
            None
        };

        match reason {
            Some(reason) => {
                log::debug!(
                    "{operation}: rejected options {:#06x} offset {offset} on {}: {reason}",
                    options.bits(),
                    caps.backend
                );
                Err(XattrError::InvalidArgument { operation, reason })
            }
            None => {
                log::trace!(
                    "{operation}: dispatch to {} with options {:#06x}",
                    caps.backend,
                    options.bits()
                );
                Ok(())
            }
        }
    }

    fn get_at(
        &self,
        target: Target<'_>,
        name: &str,
        buf: &mut [u8],
        offset: u32,
        options: XattrOptions,
    ) -> Result<usize, XattrError> {
        self.validate(Operation::Get, &target, options, offset)?;
        self.backend.get_xattr(target, name, buf, offset, options)
    }

    fn set_at(
        &self,
        target: Target<'_>,
        name: &str,
        value: &[u8],
        offset: u32,
        options: XattrOptions,
    ) -> Result<(), XattrError> {
        self.validate(Operation::Set, &target, options, offset)?;
        self.backend.set_xattr(target, name, value, options)
    }

    fn remove_at(
        &self,
        target: Target<'_>,
        name: &str,
        options: XattrOptions,
    ) -> Result<(), XattrError> {
        self.validate(Operation::Remove, &target, options, 0)?;
        self.backend.remove_xattr(target, name, options)
    }

    fn list_at(
        &self,
        target: Target<'_>,
        buf: &mut [u8],
        options: XattrOptions,
    ) -> Result<usize, XattrError> {
        self.validate(Operation::List, &target, options, 0)?;
        match self.backend.list_xattr(target, buf, options) {
            Err(XattrError::BufferTooSmall { .. }) if !buf.is_empty() => {
                self.backend.list_xattr(target, &mut [], options)
            }
            other => other,
        }
    }
}

impl<B: XattrStore> XattrAccess for Xattr<B> {
    fn capabilities(&self) -> Capabilities {
        self.backend.capabilities()
    }

    fn get(
        &self,
        path: &Path,
        name: &str,
        buf: &mut [u8],
        offset: u32,
        options: XattrOptions,
    ) -> Result<usize, XattrError> {
        self.get_at(Target::Path(path), name, buf, offset, options)
    }

    fn fget(
        &self,
        fd: BorrowedFd<'_>,
        name: &str,
        buf: &mut [u8],
        offset: u32,
        options: XattrOptions,
    ) -> Result<usize, XattrError> {
        self.get_at(Target::Fd(fd), name, buf, offset, options)
    }

    fn set(
        &self,
        path: &Path,
        name: &str,
        value: &[u8],
        offset: u32,
        options: XattrOptions,
    ) -> Result<(), XattrError> {
        self.set_at(Target::Path(path), name, value, offset, options)
    }

    fn fset(
        &self,
        fd: BorrowedFd<'_>,
        name: &str,
        value: &[u8],
        offset: u32,
        options: XattrOptions,
    ) -> Result<(), XattrError> {
        self.set_at(Target::Fd(fd), name, value, offset, options)
    }

    fn remove(&self, path: &Path, name: &str, options: XattrOptions) -> Result<(), XattrError> {
        self.remove_at(Target::Path(path), name, options)
    }

    fn fremove(
        &self,
        fd: BorrowedFd<'_>,
        name: &str,
        options: XattrOptions,
    ) -> Result<(), XattrError> {
        self.remove_at(Target::Fd(fd), name, options)
    }

    fn list(
        &self,
        path: &Path,
        buf: &mut [u8],
        options: XattrOptions,
    ) -> Result<usize, XattrError> {
        self.list_at(Target::Path(path), buf, options)
    }

    fn flist(
        &self,
        fd: BorrowedFd<'_>,
        buf: &mut [u8],
        options: XattrOptions,
    ) -> Result<usize, XattrError> {
        self.list_at(Target::Fd(fd), buf, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{XattrBackend, XattrGet, XattrList, XattrRemove, XattrSet};
    use std::fs::File;
    use std::io;
    use std::os::fd::AsFd;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts native calls and fails lists with ERANGE like Linux does.
    struct Recorder {
        caps: Capabilities,
        calls: AtomicUsize,
        list_len: usize,
    }

    impl Recorder {
        fn new() -> Self {
            Self {
                caps: Capabilities {
                    backend: "recorder",
                    partial_read: false,
                    enforces_create_replace: true,
                    nosecurity: false,
                    namespace_selection: false,
                },
                calls: AtomicUsize::new(0),
                list_len: 12,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl XattrBackend for Recorder {
        fn capabilities(&self) -> Capabilities {
            self.caps
        }
    }

    impl XattrGet for Recorder {
        fn get_xattr(
            &self,
            _: Target<'_>,
            _: &str,
            _: &mut [u8],
            _: u32,
            _: XattrOptions,
        ) -> Result<usize, XattrError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(3)
        }
    }

    impl XattrSet for Recorder {
        fn set_xattr(
            &self,
            _: Target<'_>,
            _: &str,
            _: &[u8],
            _: XattrOptions,
        ) -> Result<(), XattrError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    impl XattrRemove for Recorder {
        fn remove_xattr(&self, _: Target<'_>, _: &str, _: XattrOptions) -> Result<(), XattrError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    impl XattrList for Recorder {
        fn list_xattr(
            &self,
            target: Target<'_>,
            buf: &mut [u8],
            _: XattrOptions,
        ) -> Result<usize, XattrError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !buf.is_empty() && buf.len() < self.list_len {
                return Err(XattrError::from_os(
                    Operation::List.name(&target),
                    "",
                    io::Error::from_raw_os_error(libc::ERANGE),
                ));
            }
            Ok(self.list_len)
        }
    }

    fn path() -> &'static Path {
        Path::new("/file")
    }

    fn assert_invalid<T: std::fmt::Debug>(result: Result<T, XattrError>) {
        let err = result.unwrap_err();
        assert!(matches!(err, XattrError::InvalidArgument { .. }), "{err:?}");
        assert_eq!(err.errno(), libc::EINVAL);
    }

    #[test]
    fn valid_calls_reach_backend() {
        let xattr = Xattr::with_backend(Recorder::new());
        xattr
            .set(path(), "a", b"v", 0, XattrOptions::CREATE | XattrOptions::NOFOLLOW)
            .unwrap();
        assert_eq!(
            xattr.get(path(), "a", &mut [], 0, XattrOptions::NOFOLLOW).unwrap(),
            3
        );
        xattr.remove(path(), "a", XattrOptions::empty()).unwrap();
        assert_eq!(xattr.backend().calls(), 3);
    }

    #[test]
    fn root_without_namespace_selection_is_rejected() {
        let xattr = Xattr::with_backend(Recorder::new());
        assert_invalid(xattr.set(path(), "md5", b"v", 0, XattrOptions::ROOT));
        assert_invalid(xattr.get(path(), "md5", &mut [], 0, XattrOptions::ROOT));
        assert_invalid(xattr.remove(path(), "md5", XattrOptions::ROOT));
        assert_invalid(xattr.list(path(), &mut [], XattrOptions::ROOT));
        assert!(!xattr.exists(path(), "md5", XattrOptions::ROOT));
        assert_eq!(xattr.backend().calls(), 0);

        let mut recorder = Recorder::new();
        recorder.caps.namespace_selection = true;
        let xattr = Xattr::with_backend(recorder);
        xattr.set(path(), "md5", b"v", 0, XattrOptions::ROOT).unwrap();
        assert_eq!(xattr.backend().calls(), 1);
    }

    #[test]
    fn nonzero_set_offset_is_rejected_without_native_call() {
        let xattr = Xattr::with_backend(Recorder::new());
        assert_invalid(xattr.set(path(), "a", b"v", 4, XattrOptions::empty()));
        assert_eq!(xattr.backend().calls(), 0);
    }

    #[test]
    fn nonzero_get_offset_requires_partial_read() {
        let xattr = Xattr::with_backend(Recorder::new());
        assert_invalid(xattr.get(path(), "a", &mut [], 1, XattrOptions::empty()));

        let mut recorder = Recorder::new();
        recorder.caps.partial_read = true;
        let xattr = Xattr::with_backend(recorder);
        assert_eq!(
            xattr.get(path(), "a", &mut [], 1, XattrOptions::empty()).unwrap(),
            3
        );
        // Partial reads never extend to writes.
        assert_invalid(xattr.set(path(), "a", b"v", 1, XattrOptions::empty()));
    }

    #[test]
    fn create_only_applies_to_set() {
        let xattr = Xattr::with_backend(Recorder::new());
        assert_invalid(xattr.get(path(), "a", &mut [], 0, XattrOptions::CREATE));
        assert_invalid(xattr.remove(path(), "a", XattrOptions::REPLACE));
        assert_invalid(xattr.list(path(), &mut [], XattrOptions::CREATE));
        assert_eq!(xattr.backend().calls(), 0);
    }

    #[test]
    fn create_and_replace_conflict() {
        let xattr = Xattr::with_backend(Recorder::new());
        assert_invalid(xattr.set(
            path(),
            "a",
            b"v",
            0,
            XattrOptions::CREATE | XattrOptions::REPLACE,
        ));
    }

    #[test]
    fn unknown_bits_are_rejected() {
        let xattr = Xattr::with_backend(Recorder::new());
        let options = XattrOptions::from_bits_retain(0x0100);
        assert_invalid(xattr.get(path(), "a", &mut [], 0, options));
    }

    #[test]
    fn nosecurity_needs_backend_support() {
        let xattr = Xattr::with_backend(Recorder::new());
        assert_invalid(xattr.get(path(), "a", &mut [], 0, XattrOptions::NOSECURITY));

        let mut recorder = Recorder::new();
        recorder.caps.nosecurity = true;
        let xattr = Xattr::with_backend(recorder);
        assert!(xattr.get(path(), "a", &mut [], 0, XattrOptions::NOSECURITY).is_ok());
    }

    #[test]
    fn descriptor_nofollow_is_rejected() {
        let file = File::open("/").unwrap();
        let xattr = Xattr::with_backend(Recorder::new());
        let fd = file.as_fd();
        assert_invalid(xattr.fget(fd, "a", &mut [], 0, XattrOptions::NOFOLLOW));
        assert_invalid(xattr.fset(fd, "a", b"v", 0, XattrOptions::NOFOLLOW));
        assert_invalid(xattr.fremove(fd, "a", XattrOptions::NOFOLLOW));
        assert_invalid(xattr.flist(fd, &mut [], XattrOptions::NOFOLLOW));
        assert_eq!(xattr.backend().calls(), 0);

        xattr.fset(fd, "a", b"v", 0, XattrOptions::REPLACE).unwrap();
        assert_eq!(xattr.backend().calls(), 1);
    }

    #[test]
    fn list_too_small_reports_required_total() {
        let xattr = Xattr::with_backend(Recorder::new());
        let mut buf = [0u8; 4];
        assert_eq!(xattr.list(path(), &mut buf, XattrOptions::empty()).unwrap(), 12);
        // Failed fill plus the re-probe.
        assert_eq!(xattr.backend().calls(), 2);
    }

    #[test]
    fn exists_uses_size_probe() {
        let xattr = Xattr::with_backend(Recorder::new());
        assert!(xattr.exists(path(), "a", XattrOptions::empty()));
        assert!(!xattr.exists(path(), "a", XattrOptions::CREATE));
    }

    #[test]
    fn facade_is_object_safe() {
        let xattr = Xattr::with_backend(Recorder::new());
        let access: &dyn XattrAccess = &xattr;
        assert_eq!(access.capabilities().backend, "recorder");
    }
}
