//! # Team Betting
//!
//! Betting pools for competitions between teams, with live bet broadcasts
//! and per-competition metrics.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (betters, competitions, bets, metrics)
//! - **calculate**: Competition metrics aggregation
//! - **storage**: JSONL-backed betting store
//! - **api**: REST API endpoints and websocket broadcasts
//! - **config**: Configuration loading and validation

pub mod api;
pub mod calculate;
pub mod config;
pub mod models;
pub mod storage;

pub use models::*;
