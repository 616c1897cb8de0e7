//! Cancellation Dataset Model
//!
//! Defines the data contracts for one run of a cancellation task:
//! - **Targets:** The fixed set of target positions laid out by the task
//! - **Clicks:** Timestamped click positions in capture order
//! - **Dataset:** Participant/task metadata plus clicks and targets
//! - **Loader:** Reads the tab-delimited click log and target file
//!
//! All coordinates are integer display pixels with the origin at the
//! top-left corner of the task display.

pub mod click;
pub mod dataset;
pub mod delimited;
pub mod loader;
pub mod name;
pub mod target;

pub use click::*;
pub use dataset::*;
pub use loader::*;
pub use name::*;
pub use target::*;
