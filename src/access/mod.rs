pub mod hierarchy;
pub mod visibility;

pub use hierarchy::accessible_datasets;
pub use visibility::{decide_access, display_filename, is_own_data, masked_filename, AccessDecision};
