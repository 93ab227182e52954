//! Pure process helpers (no I/O)

pub mod exclude;
pub mod stat;
pub mod tree;

pub use exclude::{is_excluded, parse_exclude_list};
pub use stat::{parse_stat, process_name};
pub use tree::process_tree;
