pub mod capabilities;
pub mod command;
pub mod config;
pub mod connection_common;
pub mod keys;
pub mod scriptargs;
pub mod types;
