//! CLI subcommands

pub mod classify;
pub mod replay;
pub mod status;
pub mod trace;
