//! Library enumeration and metadata access.
//!
//! `scan` walks the music tree and classifies files by extension, `tags`
//! reads and writes embedded metadata through lofty, and `model` holds the
//! [`Track`] snapshot the rest of the pipeline works on.

mod model;
pub mod scan;
pub mod tags;

pub use model::Track;
