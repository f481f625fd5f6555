//! Client for the transit schedule query API
//!
//! The backend serves pre-computed schedule data from a GTFS feed database.
//! This module wraps it in typed accessors composed with the response cache,
//! so the rest of the application never sees raw JSON or network failures
//! that a cached value could cover.

mod client;
mod models;

pub use client::{ApiClient, ApiError, FetchWarning, Fetched};
pub use models::{DayType, Direction, IntervalStats, Route, Stop, TripDuration, TripDurations};
