//! Work splitting for parallel extraction.
//!
//! Both splitters are pure: they hold no state beyond their configuration and
//! may be shared freely between concurrent callers.

pub mod error;
pub mod list;
pub mod range;

pub use list::{SplitMode, split_list, split_list_delimited};
pub use range::{RangeSplitter, split_range};
