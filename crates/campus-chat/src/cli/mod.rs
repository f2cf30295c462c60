//! Thin command line client for a running chat server

pub mod client;
pub mod commands;
