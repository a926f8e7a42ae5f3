//! # Backends
//!
//! Concrete [`XattrStore`](crate::XattrStore) implementations.
//!
//! | Backend | Platforms | Native mechanism |
//! |---------|-----------|------------------|
//! | [`LinuxBackend`] | Linux, Android | `getxattr` / `lgetxattr` / `fgetxattr` family |
//! | [`DarwinBackend`] | macOS, iOS | `getxattr` family with `position` and `options` |
//! | [`ExtattrBackend`] | FreeBSD | `extattr_*_{file,link,fd}` with namespaces |
//! | [`AttrDirBackend`] | Solaris, illumos | files in the `O_XATTR` attribute directory |
//! | [`MemoryBackend`] | everywhere | in-process maps |
//!
//! [`NativeBackend`](crate::NativeBackend) names the backend selected for
//! the build target.

mod memory;

pub use memory::MemoryBackend;

#[cfg(any(
    target_os = "linux",
    target_os = "android",
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "solaris",
    target_os = "illumos",
))]
mod sys;

#[cfg(any(target_os = "linux", target_os = "android"))]
mod linux;
#[cfg(any(target_os = "linux", target_os = "android"))]
pub use linux::LinuxBackend;

#[cfg(any(target_os = "macos", target_os = "ios"))]
mod darwin;
#[cfg(any(target_os = "macos", target_os = "ios"))]
pub use darwin::DarwinBackend;

#[cfg(target_os = "freebsd")]
mod freebsd;
#[cfg(target_os = "freebsd")]
pub use freebsd::ExtattrBackend;

#[cfg(any(target_os = "solaris", target_os = "illumos"))]
mod solaris;
#[cfg(any(target_os = "solaris", target_os = "illumos"))]
pub use solaris::AttrDirBackend;

/// The attribute backend for this build target.
#[cfg(any(target_os = "linux", target_os = "android"))]
pub type NativeBackend = LinuxBackend;

/// The attribute backend for this build target.
#[cfg(any(target_os = "macos", target_os = "ios"))]
pub type NativeBackend = DarwinBackend;

/// The attribute backend for this build target.
#[cfg(target_os = "freebsd")]
pub type NativeBackend = ExtattrBackend;

/// The attribute backend for this build target.
#[cfg(any(target_os = "solaris", target_os = "illumos"))]
pub type NativeBackend = AttrDirBackend;
