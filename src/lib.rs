//! A singly-linked list with O(1) push at both ends.
//!
//! ```
//! use singly_list::List;
//!
//! let mut list = List::new();
//! list.push_head(1);
//! list.push_tail(2);
//! list.push_head(3);
//!
//! assert_eq!(list.pop_tail(), Some(2));
//! assert_eq!(list.pop_head(), Some(3));
//! assert_eq!(list.len(), 1);
//! ```

mod error;
mod list;

#[cfg(feature = "serde")]
mod serde_impl;

pub use error::{Error, Result};
pub use list::List;
