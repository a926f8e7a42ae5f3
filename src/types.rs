//! Core types for the extended-attribute access layer.

use std::borrow::Cow;
use std::os::fd::BorrowedFd;
use std::path::Path;

bitflags::bitflags! {
    /// Option flags accepted by the facade operations.
    ///
    /// The bit values are a fixed contract shared with callers; they match
    /// Darwin's native `XATTR_*` values for the first four flags. Not every
    /// flag is legal for every operation, see [`Capabilities::permitted`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct XattrOptions: u32 {
        /// Do not follow a trailing symbolic link.
        const NOFOLLOW = 0x0001;
        /// Fail if the attribute already exists.
        const CREATE = 0x0002;
        /// Fail if the attribute does not exist.
        const REPLACE = 0x0004;
        /// Bypass authorization checks (Darwin only).
        const NOSECURITY = 0x0008;
        /// Select the trusted/root namespace.
        const ROOT = 0x0010;
    }
}

impl XattrOptions {
    /// The namespace these options select.
    #[inline]
    pub fn namespace(self) -> Namespace {
        if self.contains(XattrOptions::ROOT) {
            Namespace::Trusted
        } else {
            Namespace::User
        }
    }
}

/// Attribute namespace selected by [`XattrOptions::ROOT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Namespace {
    /// Unprivileged user attributes.
    User,
    /// Privileged trusted/root attributes.
    Trusted,
}

impl Namespace {
    /// Name prefix used by platforms that encode the namespace in the name.
    #[inline]
    pub const fn prefix(self) -> &'static str {
        match self {
            Namespace::User => "user.",
            Namespace::Trusted => "trusted.",
        }
    }

    /// Prefix `name` with this namespace unless it already carries it.
    ///
    /// ```rust
    /// use anyxattr_backend::Namespace;
    ///
    /// assert_eq!(Namespace::User.qualify("comment"), "user.comment");
    /// assert_eq!(Namespace::User.qualify("user.comment"), "user.comment");
    /// assert_eq!(Namespace::Trusted.qualify("md5"), "trusted.md5");
    /// ```
    pub fn qualify(self, name: &str) -> Cow<'_, str> {
        if name.starts_with(self.prefix()) {
            Cow::Borrowed(name)
        } else {
            Cow::Owned(format!("{}{}", self.prefix(), name))
        }
    }
}

/// The object whose attributes are accessed.
#[derive(Debug, Clone, Copy)]
pub enum Target<'a> {
    /// A filesystem path; symlink handling follows [`XattrOptions::NOFOLLOW`].
    Path(&'a Path),
    /// An already-open file descriptor.
    Fd(BorrowedFd<'a>),
}

impl Target<'_> {
    /// Returns `true` for descriptor-addressed targets.
    #[inline]
    pub fn is_fd(&self) -> bool {
        matches!(self, Target::Fd(_))
    }
}

/// The four attribute operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Operation {
    /// Read a value.
    Get,
    /// Write a value.
    Set,
    /// Delete an attribute.
    Remove,
    /// Enumerate attribute names.
    List,
}

impl Operation {
    /// Conventional syscall-style name for this operation on `target`.
    ///
    /// Used as the `operation` field of [`XattrError`](crate::XattrError).
    pub const fn name(self, target: &Target<'_>) -> &'static str {
        match (self, target) {
            (Operation::Get, Target::Path(_)) => "getxattr",
            (Operation::Get, Target::Fd(_)) => "fgetxattr",
            (Operation::Set, Target::Path(_)) => "setxattr",
            (Operation::Set, Target::Fd(_)) => "fsetxattr",
            (Operation::Remove, Target::Path(_)) => "removexattr",
            (Operation::Remove, Target::Fd(_)) => "fremovexattr",
            (Operation::List, Target::Path(_)) => "listxattr",
            (Operation::List, Target::Fd(_)) => "flistxattr",
        }
    }
}

/// What a backend can express natively.
///
/// The facade consults this table to decide which options are legal before
/// calling into the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Capabilities {
    /// Short backend name, e.g. `"linux"`.
    pub backend: &'static str,
    /// `get` honours a nonzero byte offset.
    pub partial_read: bool,
    /// `CREATE` / `REPLACE` are enforced rather than accepted and ignored.
    pub enforces_create_replace: bool,
    /// [`XattrOptions::NOSECURITY`] is understood.
    pub nosecurity: bool,
    /// [`XattrOptions::ROOT`] selects a distinct namespace natively rather
    /// than through the attribute name.
    pub namespace_selection: bool,
}

impl Capabilities {
    /// Options legal for `op` on a target of the given addressing mode.
    ///
    /// `NOFOLLOW` is never legal on a descriptor: a descriptor has no
    /// trailing symlink to follow. `ROOT` is legal only where the backend
    /// selects a namespace natively; elsewhere the namespace is part of the
    /// attribute name.
    pub fn permitted(&self, op: Operation, target: &Target<'_>) -> XattrOptions {
        let mut allowed = XattrOptions::empty();
        if self.namespace_selection {
            allowed |= XattrOptions::ROOT;
        }
        if !target.is_fd() {
            allowed |= XattrOptions::NOFOLLOW;
        }
        if op == Operation::Set {
            allowed |= XattrOptions::CREATE | XattrOptions::REPLACE;
        }
        if self.nosecurity {
            allowed |= XattrOptions::NOSECURITY;
        }
        allowed
    }
}
