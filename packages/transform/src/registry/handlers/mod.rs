//! Bundled template handlers.

mod links;
mod structural;

pub use links::{secure_url, SecureLinkHandler, SetAttributeHandler, DEFAULT_LINK_ATTRIBUTES};
pub use structural::{PruneHandler, PruneMode, RenameHandler, UnwrapHandler};
