mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from platebench for tests
pub use platebench::{
    render_report, write_report, BatchError, BatchRunner, Binarized, ItemError, Passthrough,
};
