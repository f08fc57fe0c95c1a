//! CLI command handling

pub mod dash;
pub mod output;
pub mod summary;

pub use dash::*;
pub use output::*;
pub use summary::*;
