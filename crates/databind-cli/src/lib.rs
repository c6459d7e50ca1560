//! Library side of the `databind` binary: configuration, planning and output.

pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
pub mod plan;
pub mod render;
