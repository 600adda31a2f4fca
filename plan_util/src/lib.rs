//! Small utilities shared by every crate in the closure planner: logging setup, a hierarchical
//! timer, OSM-style string tags, and JSON file helpers.

#[macro_use]
extern crate log;

mod io;
pub mod logger;
mod tags;
mod time;
mod utils;

pub use crate::io::{from_json, read_json, to_json, write_json};
pub use crate::tags::Tags;
pub use crate::time::{elapsed_seconds, prettyprint_time, Timer};
pub use crate::utils::{plain_list_names, prettyprint_usize};
