//! Offline checker for links between the pages of a statically built site.

pub mod error;
pub mod links;
pub mod scan;

pub use error::LinkCheckError;
pub use scan::{scan, MissingLink, Report, ScanOptions};
