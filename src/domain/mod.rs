//! Domain modules organized as vertical slices.
//!
//! Each sub-module contains:
//! - `mod.rs` — Rich domain types and pure logic
//! - `wire.rs` — Raw serde structs matching CoinGecko responses
//! - `convert.rs` — Conversions from wire types, with default policies
//! - `state.rs` — State containers with update methods
//! - `client.rs` — Sub-client with HTTP methods (feature `http`)

pub mod chart;
pub mod coin;
