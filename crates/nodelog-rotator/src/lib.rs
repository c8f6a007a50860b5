//! nodelog rotator - size and age based rotation of per-node log directories
//!
//! Layout handled here:
//!
//! ```text
//! <root>/<node>/node-2024-03-07T09-05-01.log
//! <root>/<node>/node-2024-03-07T11-40-22.log
//! <root>/<node>/node.log -> node-2024-03-07T11-40-22.log
//! ```

pub mod engine;
pub mod naming;
pub mod scheduler;
mod writer;

pub use engine::{check_logs, check_node, check_root, CheckReport};
pub use scheduler::{run, run_once};
pub use writer::LogWriter;
