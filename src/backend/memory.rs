//! In-process attribute store.

use std::collections::{BTreeMap, HashMap};
use std::io;
use std::os::fd::{AsRawFd, BorrowedFd, RawFd};
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::ENOATTR;
use crate::names::CanonicalWriter;
use crate::{
    Capabilities, Namespace, Operation, Target, XattrBackend, XattrError, XattrGet, XattrList,
    XattrOptions, XattrRemove, XattrSet,
};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Key {
    Path(PathBuf),
    Fd(RawFd),
}

impl From<&Target<'_>> for Key {
    fn from(target: &Target<'_>) -> Self {
        match target {
            Target::Path(path) => Key::Path(path.to_path_buf()),
            Target::Fd(fd) => Key::Fd(fd.as_raw_fd()),
        }
    }
}

type Attrs = BTreeMap<(Namespace, String), Vec<u8>>;

/// Attributes kept in memory, keyed by path or descriptor number.
///
/// Targets must be registered with [`add_path`](MemoryBackend::add_path) or
/// [`add_fd`](MemoryBackend::add_fd) before use; an unknown target fails
/// like a missing file (`ENOENT`). Every other failure uses the code a Linux
/// filesystem would report, so code written against this backend behaves
/// the same on a real one.
///
/// Symlinks do not exist here, so `NOFOLLOW` has no effect. `ROOT` selects a
/// separate namespace. Names are listed in byte order.
///
/// # Example
///
/// ```rust
/// use anyxattr_backend::{MemoryBackend, Xattr, XattrAccess, XattrOptions};
/// use std::path::Path;
///
/// let store = MemoryBackend::new();
/// store.add_path(Path::new("/a"));
/// let xattr = Xattr::with_backend(store);
///
/// xattr.set(Path::new("/a"), "x", b"1", 0, XattrOptions::empty()).unwrap();
/// assert!(xattr.exists(Path::new("/a"), "x", XattrOptions::empty()));
/// assert!(!xattr.exists(Path::new("/a"), "x", XattrOptions::ROOT));
/// ```
#[derive(Debug, Default)]
pub struct MemoryBackend {
    targets: RwLock<HashMap<Key, Attrs>>,
}

impl MemoryBackend {
    /// An empty store with no registered targets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `path` as an existing file with no attributes.
    ///
    /// Registering an existing path keeps its attributes.
    pub fn add_path(&self, path: &Path) {
        self.write().entry(Key::Path(path.to_path_buf())).or_default();
    }

    /// Register the open descriptor `fd`.
    ///
    /// Descriptors are tracked by number; attributes are not shared with the
    /// path the descriptor was opened from.
    pub fn add_fd(&self, fd: BorrowedFd<'_>) {
        self.write().entry(Key::Fd(fd.as_raw_fd())).or_default();
    }

    /// Forget `target` and its attributes.
    pub fn remove_target(&self, target: Target<'_>) {
        self.write().remove(&Key::from(&target));
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<Key, Attrs>> {
        self.targets.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<Key, Attrs>> {
        self.targets.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn os_error(operation: &'static str, name: &str, code: i32) -> XattrError {
    XattrError::from_os(operation, name, io::Error::from_raw_os_error(code))
}

fn check_name(operation: &'static str, name: &str) -> Result<(), XattrError> {
    if name.is_empty() {
        return Err(XattrError::InvalidArgument {
            operation,
            reason: "empty attribute name",
        });
    }
    Ok(())
}

fn attr_key(name: &str, options: XattrOptions) -> (Namespace, String) {
    (options.namespace(), name.to_owned())
}

impl XattrBackend for MemoryBackend {
    fn capabilities(&self) -> Capabilities {
        Capabilities {
            backend: "memory",
            partial_read: false,
            enforces_create_replace: true,
            nosecurity: false,
            namespace_selection: true,
        }
    }
}

impl XattrGet for MemoryBackend {
    fn get_xattr(
        &self,
        target: Target<'_>,
        name: &str,
        buf: &mut [u8],
        offset: u32,
        options: XattrOptions,
    ) -> Result<usize, XattrError> {
        let operation = Operation::Get.name(&target);
        check_name(operation, name)?;
        let targets = self.read();
        let attrs = targets
            .get(&Key::from(&target))
            .ok_or_else(|| os_error(operation, name, libc::ENOENT))?;
        let value = attrs
            .get(&attr_key(name, options))
            .ok_or_else(|| os_error(operation, name, ENOATTR))?;

        let value = value.get(offset as usize..).unwrap_or_default();
        if buf.is_empty() {
            return Ok(value.len());
        }
        if value.len() > buf.len() {
            return Err(os_error(operation, name, libc::ERANGE));
        }
        buf[..value.len()].copy_from_slice(value);
        Ok(value.len())
    }
}

impl XattrSet for MemoryBackend {
    fn set_xattr(
        &self,
        target: Target<'_>,
        name: &str,
        value: &[u8],
        options: XattrOptions,
    ) -> Result<(), XattrError> {
        let operation = Operation::Set.name(&target);
        check_name(operation, name)?;
        let mut targets = self.write();
        let attrs = targets
            .get_mut(&Key::from(&target))
            .ok_or_else(|| os_error(operation, name, libc::ENOENT))?;

        let key = attr_key(name, options);
        let exists = attrs.contains_key(&key);
        if exists && options.contains(XattrOptions::CREATE) {
            return Err(os_error(operation, name, libc::EEXIST));
        }
        if !exists && options.contains(XattrOptions::REPLACE) {
            return Err(os_error(operation, name, ENOATTR));
        }
        attrs.insert(key, value.to_vec());
        Ok(())
    }
}

impl XattrRemove for MemoryBackend {
    fn remove_xattr(
        &self,
        target: Target<'_>,
        name: &str,
        options: XattrOptions,
    ) -> Result<(), XattrError> {
        let operation = Operation::Remove.name(&target);
        check_name(operation, name)?;
        let mut targets = self.write();
        let attrs = targets
            .get_mut(&Key::from(&target))
            .ok_or_else(|| os_error(operation, name, libc::ENOENT))?;
        attrs
            .remove(&attr_key(name, options))
            .map(|_| ())
            .ok_or_else(|| os_error(operation, name, ENOATTR))
    }
}

impl XattrList for MemoryBackend {
    fn list_xattr(
        &self,
        target: Target<'_>,
        buf: &mut [u8],
        options: XattrOptions,
    ) -> Result<usize, XattrError> {
        let operation = Operation::List.name(&target);
        let targets = self.read();
        let attrs = targets
            .get(&Key::from(&target))
            .ok_or_else(|| os_error(operation, "", libc::ENOENT))?;

        let namespace = options.namespace();
        let probe = buf.is_empty();
        let mut out = CanonicalWriter::new(buf);
        for (_, name) in attrs.keys().filter(|(ns, _)| *ns == namespace) {
            out.push(name.as_bytes());
        }
        if !probe && !out.is_complete() {
            return Err(os_error(operation, "", libc::ERANGE));
        }
        Ok(out.total())
    }
}
