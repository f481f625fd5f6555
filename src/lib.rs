//! Marshrut Library
//!
//! This module exposes the core modules for use in integration tests.

pub mod api;
pub mod cache;
pub mod cli;
pub mod departures;
pub mod favorites;
pub mod schedule;
pub mod store;
pub mod theme;
