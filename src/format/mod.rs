//! In-process formatting stages.
//!
//! Most languages delegate to external binaries (see [`crate::process`]);
//! the stages here run entirely in process:
//! - [`json`]: deterministic JSON pretty-printer with document key order

pub mod json;

pub use json::format_json;
