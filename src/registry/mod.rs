pub mod npm;

pub use npm::{NpmRegistry, is_not_found_marker};
