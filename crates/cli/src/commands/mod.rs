//! Command implementations for wpadctl

pub mod config;
pub mod decode;
pub mod families;
pub mod replay;
