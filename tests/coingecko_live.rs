//! Live tests against the CoinGecko REST API.
//!
//! All tests are `#[ignore]` because they require network access and count
//! against the public rate limit. `COINGECKO_API_URL` and `COINGECKO_API_KEY`
//! are read from the environment or a `.env` file.
//!
//! Run with:
//! ```bash
//! cargo test -p coinwatch-sdk --test coingecko_live -- --ignored
//! ```

use std::time::Duration;

use tokio::time::timeout;

use coinwatch_sdk::client::CoinwatchClientBuilder;
use coinwatch_sdk::prelude::*;

const TEST_TIMEOUT: Duration = Duration::from_secs(30);

fn live_client() -> CoinwatchClient {
    dotenvy::dotenv().ok();
    CoinwatchClientBuilder::from_env()
        .build()
        .expect("client should build")
}

#[tokio::test]
#[ignore]
async fn test_fetch_btc_summary() {
    let client = live_client();
    let btc = CoinSymbol::from("BTC");

    let summary = timeout(TEST_TIMEOUT, client.coins().get(&btc))
        .await
        .expect("timed out")
        .expect("summary should load");

    assert_eq!(summary.id, CoinId::from("bitcoin"));
    assert_eq!(summary.symbol, "btc");
    assert!(summary.current_price > rust_decimal::Decimal::ZERO);
    assert!(summary.market_cap_rank.is_some());

    let display = SummaryDisplay::from(&summary);
    assert!(display.price.starts_with('$'));
    assert!(display.market_cap.ends_with('T') || display.market_cap.ends_with('B'));

    // Second read inside the TTL is served from the cache.
    let cached = client.coins().cached(&btc).expect("entry should be cached");
    assert_eq!(cached.payload, summary);
}

#[tokio::test]
#[ignore]
async fn test_fetch_intraday_chart() {
    let client = live_client();
    let series = timeout(
        TEST_TIMEOUT,
        client
            .charts()
            .series(&CoinId::from("ethereum"), Timeframe::Hour1),
    )
    .await
    .expect("timed out")
    .expect("chart should load");

    assert!(!series.is_empty());
    assert!(series.len() <= 60);
    assert_eq!(series.points[0].index, 0);
    assert!(series
        .points
        .windows(2)
        .all(|w| w[0].timestamp_ms <= w[1].timestamp_ms));
}

#[tokio::test]
#[ignore]
async fn test_unknown_coin_is_not_found() {
    let client = live_client();
    let err = timeout(
        TEST_TIMEOUT,
        client.coins().fetch(&CoinSymbol::from("NOT-A-REAL-COIN-XYZ")),
    )
    .await
    .expect("timed out")
    .unwrap_err();

    assert!(matches!(err, SdkError::Http(HttpError::NotFound(_))));
}

#[tokio::test]
#[ignore]
async fn test_session_against_live_api() {
    let client = live_client();
    let session = client.session("SOL");

    let outcome = timeout(TEST_TIMEOUT, async {
        loop {
            if let Some(SessionEvent::SummaryRefreshed { outcome, .. }) = session.next_event().await {
                return outcome;
            }
        }
    })
    .await
    .expect("timed out");

    assert_eq!(outcome, RefreshOutcome::Fetched);
    assert_eq!(
        session.snapshot().summary.summary().unwrap().id,
        CoinId::from("solana")
    );
}
