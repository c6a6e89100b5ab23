//! Watches time tracked in Toggl and raises a desktop notification once a goal is reached.
//! Goals are either a flat number of hours or a weekly target split across the workdays so far,
//! in which case the watcher keeps running and resumes every workday morning.
//!

pub mod cli;
pub mod config;
pub mod notify;
pub mod scheduler;
pub mod shutdown;
pub mod toggl;
pub mod utils;
