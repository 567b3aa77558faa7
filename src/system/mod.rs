//! # System Interaction Layer
//!
//! The boundary between the engine and the operating system.
//!
//! ## Modules
//!
//! - **`executor`**: spawns one shell command line, captures or streams its output,
//!   and waits for it while staying responsive to operator interrupts.
//! - **`signals`**: installs the interrupt listeners that feed the abort router.
//! - **`operator`**: reads answers from the person at the terminal.

pub mod executor;
pub mod operator;
pub mod signals;
