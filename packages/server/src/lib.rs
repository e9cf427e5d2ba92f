//! Per-room chat coordinator library.
//!
//! This library provides the room coordinator (session registry, bounded history,
//! broadcast, rehydration) and an axum-based WebSocket server hosting one
//! coordinator per room.

// layers
pub mod domain;
pub mod infrastructure;
pub mod runtime;
pub mod ui;
pub mod usecase;

pub mod config;

#[cfg(test)]
mod test_support;
