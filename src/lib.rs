//! # coinwatch-sdk
//!
//! Data layer for a single-coin market panel: a cached CoinGecko summary
//! (price, market cap, volume, supply, ATH/ATL) and a price chart over one of
//! eight timeframes.
//!
//! ## Architecture
//!
//! The SDK is organized in layers:
//!
//! 1. **Core** — Newtypes, timeframes, domain models, freshness cache,
//!    series derivation, number formatting (always available)
//! 2. **HTTP API** — `CoinGeckoHttp` with per-endpoint retry policies
//! 3. **High-Level Client** — `CoinwatchClient` with nested sub-clients
//! 4. **Session** — `CoinSession`, a background tokio task polling one symbol
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use coinwatch_sdk::prelude::*;
//!
//! let client = CoinwatchClient::builder().build()?;
//!
//! let btc = client.coins().get(&CoinSymbol::from("BTC")).await?;
//! let chart = client.charts().series(&btc.id, Timeframe::Hour4).await?;
//! println!("{} {}", format_price(&btc.current_price), chart.percent_change());
//!
//! let mut session = client.session("BTC");
//! session.select_timeframe(Timeframe::Day30)?;
//! let panel = session.subscribe();
//! ```

// ── Layer 1: Core ────────────────────────────────────────────────────────────

/// Shared newtypes, timeframes and formatting.
pub mod shared;

/// Domain modules (vertical slices): types, wire types, conversions, state.
pub mod domain;

/// Unified SDK error types.
pub mod error;

/// API URLs, headers and environment variable names.
pub mod network;

/// Collaborator traits for summary and chart data.
pub mod source;

// ── Layer 2: HTTP API ────────────────────────────────────────────────────────

/// HTTP client with retry policies.
#[cfg(feature = "http")]
pub mod http;

// ── Layer 3: High-Level Client ───────────────────────────────────────────────

/// `CoinwatchClient` — the primary entry point.
#[cfg(feature = "http")]
pub mod client;

// ── Layer 4: Session ─────────────────────────────────────────────────────────

/// Background refresh and chart task for one displayed symbol.
#[cfg(feature = "session")]
pub mod session;

// ── Prelude ──────────────────────────────────────────────────────────────────

pub mod prelude {
    // Shared newtypes
    pub use crate::shared::{CoinId, CoinSymbol, Timeframe};

    // Formatting
    pub use crate::shared::fmt::{
        format_age, format_large_number, format_percent, format_price, format_signed_percent,
        format_signed_price, format_supply, Trend,
    };

    // Domain types — coin
    pub use crate::domain::coin::{
        CacheEntry, CacheStore, CoinSummary, FreshnessCache, MemoryStore, RefreshOutcome,
        SummaryDisplay, SummaryRefresher, SummaryState,
    };

    // Domain types — chart
    pub use crate::domain::chart::{
        derive, derive_code, percent_change, ChartApply, ChartRequest, ChartSeries, ChartState,
        PricePoint, PriceSample,
    };

    // Collaborators
    pub use crate::source::{ChartSource, SummarySource};

    // Errors
    pub use crate::error::{HttpError, SdkError};

    // Network
    pub use crate::network::{DEFAULT_API_URL, PRO_API_URL};

    // HTTP client + sub-clients
    #[cfg(feature = "http")]
    pub use crate::client::{ChartsClient, CoinsClient, CoinwatchClient, CoinwatchClientBuilder};
    #[cfg(feature = "http")]
    pub use crate::http::retry::{RetryConfig, RetryPolicy};

    // Session
    #[cfg(feature = "session")]
    pub use crate::session::{CoinSession, PanelSnapshot, SessionClock, SessionConfig, SessionEvent};
}
