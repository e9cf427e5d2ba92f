//! Shared utilities for the Parlor server and client.

pub mod logger;
pub mod time;
