//! Paths used by the exported macros.
pub use alloc::boxed::Box;
pub use alloc::vec::Vec;
pub use core::any::{type_name, Any};
pub use core::option::Option::{self, None, Some};
pub use core::result::Result::Err;
