//! Formatting dispatch and external tool execution.
//!
//! This module orchestrates a formatting request end to end:
//!
//! **Dispatch:**
//! - Resolve the language label to its registered stage list (config
//!   overrides win over the built-in registry)
//! - Run the stages strictly in sequence, each feeding the next
//!
//! **Execution:**
//! - [`exec`] is the single bounded-subprocess primitive every external
//!   stage funnels through: spawn, feed input, capture output, enforce a
//!   wall-clock deadline, clean up temp files on every exit path
//!
//! The main entry point is [`format_text`].

pub mod exec;
pub mod pipeline;

pub use exec::{run_tool, InputMode, ToolOutcome, ToolSpec};
pub use pipeline::{format_text, resolve_stages, Stage};
