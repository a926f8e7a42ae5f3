//! # anyxattr-backend
//!
//! Portable **extended-attribute access** over the native attribute APIs of
//! Linux, Darwin, FreeBSD and Solaris.
//!
//! Extended attributes are named byte-string values attached to files in
//! addition to their contents. Every platform exposes them differently; this
//! crate offers one operation set with one option vocabulary, one name-list
//! format and one error type, and translates to whatever the host provides.
//!
//! ---
//!
//! ## Quick Start
//!
//! ```rust
//! use anyxattr_backend::{MemoryBackend, Xattr, XattrAccess, XattrExt, XattrOptions};
//! use std::path::Path;
//!
//! // Any backend works; the in-memory one runs everywhere.
//! let store = MemoryBackend::new();
//! store.add_path(Path::new("/notes.txt"));
//! let xattr = Xattr::with_backend(store);
//!
//! let path = Path::new("/notes.txt");
//! xattr.set(path, "comment", b"hello", 0, XattrOptions::CREATE)?;
//!
//! // Probe the size with an empty buffer, then read.
//! let size = xattr.get(path, "comment", &mut [], 0, XattrOptions::empty())?;
//! assert_eq!(size, 5);
//! assert_eq!(xattr.get_value(path, "comment", XattrOptions::empty())?, b"hello");
//!
//! // Names come back as a NUL-terminated run.
//! let mut names = [0u8; 64];
//! let n = xattr.list(path, &mut names, XattrOptions::empty())?;
//! assert_eq!(&names[..n], b"comment\0");
//! # Ok::<(), anyxattr_backend::XattrError>(())
//! ```
//!
//! On a supported platform, [`Xattr::native`] builds the facade over the
//! host's own API.
//!
//! ---
//!
//! ## Core Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`XattrAccess`] | The eight public operations plus `exists` |
//! | [`Xattr`] | Validating facade over any [`XattrStore`] |
//! | [`XattrOptions`] | `NOFOLLOW`, `CREATE`, `REPLACE`, `NOSECURITY`, `ROOT` |
//! | [`Capabilities`] | What a backend can express natively |
//! | [`XattrError`] | Error type carrying the operation and OS code |
//! | [`NameList`](names::NameList) | Owned canonical name list |
//!
//! ---
//!
//! ## Backends
//!
//! | Backend | Platform | Mechanism |
//! |---------|----------|-----------|
//! | `LinuxBackend` | Linux, Android | `*xattr` / `l*xattr` / `f*xattr` syscalls |
//! | `DarwinBackend` | macOS, iOS | `*xattr` syscalls with `options` and `position` |
//! | `ExtattrBackend` | FreeBSD | `extattr_*` calls, `ROOT` selects the system namespace |
//! | `AttrDirBackend` | Solaris, illumos | files in the `O_XATTR` attribute directory |
//! | [`MemoryBackend`] | everywhere | in-process maps |
//!
//! [`NativeBackend`] names the one selected for the build target.
//!
//! ---
//!
//! ## Trait Structure
//!
//! ```text
//! XattrBackend + XattrGet + XattrSet + XattrRemove + XattrList = XattrStore
//!                                                                    ↓
//!                                         Xattr<S: XattrStore>: XattrAccess
//!                                                                    ↓
//!                                                 XattrExt (blanket, owned buffers)
//! ```
//!
//! ---
//!
//! ## Error Handling
//!
//! All operations return `Result<T, XattrError>`. Errors name the operation
//! and keep the native error code:
//!
//! ```rust
//! use anyxattr_backend::XattrError;
//! use std::io;
//!
//! let os = io::Error::from_raw_os_error(libc::EACCES);
//! let err = XattrError::from_os("getxattr", "user.comment", os);
//! assert_eq!(err.to_string(), "getxattr: permission denied");
//! assert_eq!(err.errno(), libc::EACCES);
//! ```
//!
//! ---
//!
//! ## Thread Safety
//!
//! All traits require `Send + Sync` and take `&self`. The native backends are
//! stateless, so one facade can be shared across threads. Each call is
//! independent; nothing makes a probe followed by a read atomic.
//!
//! ---
//!
//! ## Logging
//!
//! Dispatch is traced through the [`log`](https://docs.rs/log) facade
//! (`trace!` per call, `debug!` when validation rejects one). Install any
//! logger to see it.
//!
//! ---
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `serde` | Serde derives for [`XattrOptions`] and [`Capabilities`], plus JSON helpers |

// Private modules
mod backend;
mod error;
mod ext;
mod facade;
mod traits;
mod types;

pub mod names;

// Public re-exports - error types
pub use error::XattrError;

// Public re-exports - core types
pub use types::{Capabilities, Namespace, Operation, Target, XattrOptions};

// Public re-exports - store traits
pub use traits::{XattrBackend, XattrGet, XattrList, XattrRemove, XattrSet, XattrStore};

// Public re-exports - facade
pub use facade::{Xattr, XattrAccess};

#[cfg(any(
    target_os = "linux",
    target_os = "android",
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "solaris",
    target_os = "illumos",
))]
pub use facade::NativeXattr;

// Public re-exports - backends
pub use backend::MemoryBackend;

#[cfg(any(
    target_os = "linux",
    target_os = "android",
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "solaris",
    target_os = "illumos",
))]
pub use backend::NativeBackend;

#[cfg(any(target_os = "linux", target_os = "android"))]
pub use backend::LinuxBackend;

#[cfg(any(target_os = "macos", target_os = "ios"))]
pub use backend::DarwinBackend;

#[cfg(target_os = "freebsd")]
pub use backend::ExtattrBackend;

#[cfg(any(target_os = "solaris", target_os = "illumos"))]
pub use backend::AttrDirBackend;

// Public re-exports - infrastructure
pub use ext::XattrExt;

// Conditional re-exports
#[cfg(feature = "serde")]
pub use ext::XattrExtJson;
