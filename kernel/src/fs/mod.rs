/// Filesystem-facing helpers shared by shell commands.
pub mod listing;

pub use listing::{entries, Listing, ListingError};
