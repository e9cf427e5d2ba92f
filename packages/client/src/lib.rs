//! Terminal chat client for the Parlor room server.

pub mod error;

mod domain;
mod formatter;
mod runner;
mod session;
mod ui;

pub use runner::run_client;
