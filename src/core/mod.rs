// src/core/mod.rs

pub mod abort_router;
pub mod command_runner;
pub mod context;
pub mod error;
pub mod output;
pub mod policy;
pub mod script_runner;
pub mod section_runner;
pub mod timer;
