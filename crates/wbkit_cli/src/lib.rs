//! `wbkit_cli`:
//! Command-line surface over `wbkit_template`.
//!
//! - `cli`     : argument model and run orchestration
//! - `logging` : tracing subscriber setup
//! - `paths`   : output path resolution
pub mod cli;
mod logging;
pub mod paths;
