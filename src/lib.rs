#![doc = include_str!("../README.md")]
#![deny(missing_docs)]
#![forbid(unsafe_code)]

mod cache;
mod error;
mod index;
mod list;

pub use cache::LruCache;
pub use error::{
    InvalidCapacity,
    InvariantError,
};
pub use list::{
    IntoIter,
    Iter,
};

#[cfg(not(feature = "ahash"))]
type RandomState = std::hash::RandomState;
#[cfg(feature = "ahash")]
type RandomState = ahash::RandomState;
