//! Attestify CLI - TLS evidence binding from the command line.

pub mod commands;
