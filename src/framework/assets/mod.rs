//! Images referenced by materials, decoded in the background.

mod texture_store;
pub use texture_store::*;
