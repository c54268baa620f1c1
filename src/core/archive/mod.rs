mod error;
mod merge;

pub use error::{ArchiveRole, MergeError};
pub use merge::{merge_zip_streams, merge_zips, ZipMerger};
