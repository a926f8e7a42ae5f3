//! # Store Traits
//!
//! The capability interface every attribute backend implements.
//!
//! ## Component Traits
//!
//! | Trait | Operation |
//! |-------|-----------|
//! | [`XattrBackend`] | Report [`Capabilities`] |
//! | [`XattrGet`] | Read a value |
//! | [`XattrSet`] | Write a value |
//! | [`XattrRemove`] | Delete an attribute |
//! | [`XattrList`] | Enumerate names |
//!
//! Each method takes a [`Target`](crate::Target), so one method serves both
//! the path-addressed and descriptor-addressed forms.
//!
//! ## Blanket Implementation
//!
//! [`XattrStore`] is implemented for every type implementing all five
//! component traits. Implement the components and hand the store to
//! [`Xattr::with_backend`](crate::Xattr::with_backend):
//!
//! ```rust
//! use anyxattr_backend::*;
//!
//! struct Empty;
//!
//! impl XattrBackend for Empty {
//!     fn capabilities(&self) -> Capabilities {
//!         Capabilities {
//!             backend: "empty",
//!             partial_read: false,
//!             enforces_create_replace: true,
//!             nosecurity: false,
//!             namespace_selection: false,
//!         }
//!     }
//! }
//! # impl XattrGet for Empty {
//! #     fn get_xattr(
//! #         &self,
//! #         t: Target<'_>,
//! #         n: &str,
//! #         _: &mut [u8],
//! #         _: u32,
//! #         _: XattrOptions,
//! #     ) -> Result<usize, XattrError> {
//! #         Err(unsupported(Operation::Get.name(&t), n))
//! #     }
//! # }
//! # impl XattrSet for Empty {
//! #     fn set_xattr(
//! #         &self,
//! #         t: Target<'_>,
//! #         n: &str,
//! #         _: &[u8],
//! #         _: XattrOptions,
//! #     ) -> Result<(), XattrError> {
//! #         Err(unsupported(Operation::Set.name(&t), n))
//! #     }
//! # }
//! # impl XattrRemove for Empty {
//! #     fn remove_xattr(
//! #         &self,
//! #         t: Target<'_>,
//! #         n: &str,
//! #         _: XattrOptions,
//! #     ) -> Result<(), XattrError> {
//! #         Err(unsupported(Operation::Remove.name(&t), n))
//! #     }
//! # }
//! # impl XattrList for Empty {
//! #     fn list_xattr(
//! #         &self,
//! #         _: Target<'_>,
//! #         _: &mut [u8],
//! #         _: XattrOptions,
//! #     ) -> Result<usize, XattrError> {
//! #         Ok(0)
//! #     }
//! # }
//! # fn unsupported(operation: &'static str, name: &str) -> XattrError {
//! #     XattrError::from_os(operation, name, std::io::Error::from_raw_os_error(libc::ENOTSUP))
//! # }
//!
//! // Empty now implements XattrStore.
//! let xattr = Xattr::with_backend(Empty);
//! assert_eq!(xattr.list(std::path::Path::new("/"), &mut [], XattrOptions::empty()).unwrap(), 0);
//! ```
//!
//! ## Thread Safety
//!
//! All traits require `Send + Sync` and take `&self`.

mod xattr_get;
mod xattr_list;
mod xattr_remove;
mod xattr_set;

pub use xattr_get::XattrGet;
pub use xattr_list::XattrList;
pub use xattr_remove::XattrRemove;
pub use xattr_set::XattrSet;

use crate::Capabilities;

/// Describes what a backend can express natively.
pub trait XattrBackend: Send + Sync {
    /// The backend's capability table.
    fn capabilities(&self) -> Capabilities;
}

/// A complete attribute backend.
///
/// Automatically implemented for any type implementing [`XattrBackend`],
/// [`XattrGet`], [`XattrSet`], [`XattrRemove`] and [`XattrList`].
pub trait XattrStore: XattrBackend + XattrGet + XattrSet + XattrRemove + XattrList {}

// Blanket implementation
impl<T: XattrBackend + XattrGet + XattrSet + XattrRemove + XattrList> XattrStore for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Target, XattrError, XattrOptions};

    struct Null;

    impl XattrBackend for Null {
        fn capabilities(&self) -> Capabilities {
            Capabilities {
                backend: "null",
                partial_read: false,
                enforces_create_replace: false,
                nosecurity: false,
                namespace_selection: false,
            }
        }
    }

    impl XattrGet for Null {
        fn get_xattr(
            &self,
            _: Target<'_>,
            _: &str,
            _: &mut [u8],
            _: u32,
            _: XattrOptions,
        ) -> Result<usize, XattrError> {
            Ok(0)
        }
    }

    impl XattrSet for Null {
        fn set_xattr(
            &self,
            _: Target<'_>,
            _: &str,
            _: &[u8],
            _: XattrOptions,
        ) -> Result<(), XattrError> {
            Ok(())
        }
    }

    impl XattrRemove for Null {
        fn remove_xattr(&self, _: Target<'_>, _: &str, _: XattrOptions) -> Result<(), XattrError> {
            Ok(())
        }
    }

    impl XattrList for Null {
        fn list_xattr(
            &self,
            _: Target<'_>,
            _: &mut [u8],
            _: XattrOptions,
        ) -> Result<usize, XattrError> {
            Ok(0)
        }
    }

    #[test]
    fn blanket_store_impl() {
        fn assert_store<T: XattrStore>() {}
        assert_store::<Null>();
    }

    #[test]
    fn store_is_object_safe() {
        let store: &dyn XattrStore = &Null;
        assert_eq!(store.capabilities().backend, "null");
        let path = std::path::Path::new("/");
        assert_eq!(
            store
                .list_xattr(Target::Path(path), &mut [], XattrOptions::empty())
                .unwrap(),
            0
        );
    }
}
