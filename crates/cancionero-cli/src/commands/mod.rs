//! Command handlers

pub mod config;
pub mod song;
pub mod status;
pub mod sync;
