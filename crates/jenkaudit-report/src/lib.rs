//! Audit summary reporting: frequency ranking and text/JSON rendering.
//!
//! Rendering takes the timestamp as an argument so the output is fully
//! determined by its inputs.

pub mod rank;
pub mod render;

pub use rank::{rank, RankedEntry};
pub use render::{render, render_json, render_stages};
